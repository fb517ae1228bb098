//! Stats module - numeric parsing, normalization and regression

pub mod numeric;
mod regression;

pub use regression::{
    RegressionEngine, RegressionError, RegressionFit, RegressionResult, RegressionSample,
    PREVIEW_LEN,
};
