//! Demographic reference table and population aggregation.

mod aggregate;
mod table;

pub use aggregate::aggregate;
pub use table::{
    DemographicRow, DemographicTable, RegionDemographics, ALL_AGES, WORKING_AGE,
};
