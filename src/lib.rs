//! Tabserve — read-only HTTP API over a static tabular dataset.
//!
//! Loads one dataset (CSV, JSONL or Parquet) into memory at startup and
//! serves windows of it: the whole thing, a size-bounded prefix, a
//! size-bounded random sample, or a 1-indexed row range.
//!
//! ## Layout
//!
//! - **Dataset store** (`data`, `format`) — immutable rows, loaded once.
//! - **Size resolver** (`size`) — `small`/`medium`/`large`/`complete` to a row count.
//! - **Windowing engine** (`window`) — prefix, random sample and range selection.
//! - **Fault simulator** (`fault`) — probabilistic 500s for the `/faulty` route.
//! - **HTTP facade** (`server`, `params`) — axum routes and the JSON envelope.

pub mod config;
pub mod data;
pub mod error;
pub mod fault;
pub mod format;
pub mod params;
pub mod server;
pub mod size;
pub mod window;
