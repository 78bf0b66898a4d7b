//! Trend signal collection and aggregation.
//!
//! Sources yield raw per-keyword readings; the aggregator folds them into a
//! single ranked, explained trend record. Collection does I/O (bounded by
//! per-source timeouts and retry); aggregation is pure.

pub mod aggregator;
pub mod error;
pub mod retry;
pub mod sources;

pub use aggregator::{aggregate, AggregatedTrend};
pub use error::SignalError;
pub use retry::retry_with_backoff;
pub use sources::{build_sources, collect_readings, CollectOptions, SignalSource};
