//! Route handlers.
//!
//! `report` serves the HTML form; the rest are JSON under `/api/`.

pub mod health;
pub mod models;
pub mod predict;
pub mod report;
pub mod schema;
