//! HTTP surface of the comparison service.
//!
//! `api_router()` returns a composable `Router`; `start_server_on()` runs it
//! in a background task with a shutdown handle.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::api_router;
pub use server::{start_server_on, ApiServer, ApiSession, ServerError};
pub use types::{ApiContext, ComparisonRequest};
