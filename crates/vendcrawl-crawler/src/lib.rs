//! The resumable crawl engine.
//!
//! A single logical thread of control walks regions → listing pages →
//! entities, checkpointing through [`vendcrawl_progress::ProgressStore`]
//! after every unit of work. Interruption at any point — crash, signal,
//! rate-limit bailout — is recovered on the next run from the persisted
//! cursor without re-doing completed work or dropping in-flight work.

mod entity;
pub mod error;
pub mod outcome;
mod page;
mod region;
pub mod runner;

pub use error::CrawlError;
pub use outcome::{EntityOutcome, PageOutcome, SkipReason};
pub use runner::{CrawlRunner, CrawlSummary};
