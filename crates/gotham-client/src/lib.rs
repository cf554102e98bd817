//! Gotham Client — typed access to the investigation REST backend.
//!
//! `InvestigationApi` is the call contract; `ApiClient` implements it with
//! reqwest. Send failures surface as `Error::Transport`, non-2xx statuses as
//! `Error::Api` (404 as `Error::NotFound`) and bad bodies as `Error::Decode`.

pub mod api;
pub mod http;

pub use api::InvestigationApi;
pub use http::ApiClient;
