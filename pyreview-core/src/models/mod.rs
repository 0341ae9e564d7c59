//! Data model shared by the adapters, the aggregator and the presentation layer

pub mod complexity;
pub mod section;
pub mod source;
pub mod style;
