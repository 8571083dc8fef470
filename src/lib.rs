//! Batch mind map generation around a bounded-concurrency orchestrator.
//!
//! [`orchestrator::run_batch`] drives any fallible async transformer over an
//! ordered batch of [`item::WorkItem`]s, with at most N calls in flight via
//! [`limiter::ConcurrencyLimiter`], and returns one [`item::Outcome`] per item
//! in input order. The remaining modules supply the production pieces around
//! it: CSV input and status report, prompt construction, the Anthropic client,
//! JSON document storage and the HTTP surface.

pub mod anthropic;
pub mod cli;
pub mod config;
pub mod csv_io;
pub mod error;
pub mod generator;
pub mod item;
pub mod limiter;
pub mod mindmap;
pub mod orchestrator;
pub mod pipeline;
pub mod prompt;
pub mod server;
pub mod store;
pub mod ui;

pub use error::AppError;
pub use item::{BatchSummary, Outcome, Status, WorkItem};
pub use limiter::{ConcurrencyLimiter, DEFAULT_CONCURRENCY, LimiterError};
pub use orchestrator::run_batch;
