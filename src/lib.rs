//! Catchment - area-weighted population exposure around a point.
//!
//! Finds the municipalities overlapping a circular buffer, measures how much
//! of each falls inside it and weights their demographic counts accordingly.

pub mod config;
pub mod demographics;
pub mod error;
pub mod exposure;
pub mod geometry;
pub mod models;
pub mod regions;
mod source;

pub use error::{ExposureError, Result};
pub use exposure::{compute, compute_with, QueryOptions, ReferenceData};
pub use models::{AggregateResult, DetailRow, GeoPoint};
