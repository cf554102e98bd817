//! Mini Gotham Core — entity/case data model, errors, client configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::GothamConfig;
pub use error::{Error, Result};
pub use types::*;
