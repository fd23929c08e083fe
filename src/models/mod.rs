//! Core data models for exposure queries.

pub mod point;
pub mod region;
pub mod result;

pub use point::{GeoPoint, ProjectedPoint};
pub use region::{RegionAttributes, RegionCode, RegionRecord};
pub use result::{AggregateResult, DetailRow};
