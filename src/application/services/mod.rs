pub mod result_aggregator;

pub use result_aggregator::{Aggregated, ResultAggregator, TaskPanicked};
