//! Flare Join - flare survey / flare volume spatial join & regression
//!
//! Filters both datasets to one country, joins each survey record to the
//! nearest volume estimate within a fixed distance, and fits a normalized
//! simple linear regression on the joined records.

pub mod config;
pub mod data;
pub mod geo;
pub mod pipeline;
pub mod report;
pub mod stats;
