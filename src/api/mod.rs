//! HTTP surface: the report pages and a JSON API over the same pipeline.
//!
//! The router is composable: `report_router()` returns a `Router`
//! that can be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod pages;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::report_router;
pub use server::{start_report_server_on, ReportServer, ReportSession};
pub use types::ApiContext;
