//! Predictive maintenance service.
//!
//! Serves a pre-trained failure-type classifier over HTTP: a single-record
//! form, bulk scoring of uploaded CSV tables and CSV export of the results.

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod ml;
pub mod models;
pub mod pipeline;
pub mod translation;

pub use error::{AppError, Result};
