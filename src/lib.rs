//! sermon-review: review AI-suggested edits to sermon slide decks
//!
//! The review session holds slides, analysis results and the reviewer's
//! decisions for one sermon; the sync gateway moves them to and from the
//! review service.

pub mod commands;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod progress;
pub mod review;

pub use config::Config;
pub use error::{Error, Result};
