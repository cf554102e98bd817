//! Runtime orchestrator — wires user actions to the backend and the store.
//!
//! Every action calls the API first and applies its result as one state
//! transition, so a failed call leaves the workspace as it was. Analytics
//! fetches carry a selection ticket and are dropped if the selection moved.

pub mod orchestrator;
pub mod types;

pub use orchestrator::Orchestrator;
pub use types::*;
