//! Geocode Reconciler Library
//!
//! Selects project records that have coordinates but lack street, city or
//! zip, reverse geocodes them one at a time and writes the resolved address
//! back exactly once per record.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod reporter;
pub mod selector;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{Args, ReconcilerConfig, ReporterKind};
pub use error::{ReconcilerError, Result};
pub use pipeline::ReconciliationPipeline;
pub use reporter::{ConsoleReporter, LogReporter, Reporter};
pub use selector::select_candidates;
pub use store::{Database, RecordStore};
pub use types::*;
