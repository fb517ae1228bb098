//! Pipeline Configuration
//! Input locations, column layout of each input, and numeric policies.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::geo::DEFAULT_MAX_DISTANCE_KM;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// What to do with a numeric cell that does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorPolicy {
    /// Substitute 0.0 and carry on
    #[default]
    Zero,
    /// Leave the whole row out of the computation
    SkipRow,
    /// Abort the run
    Fail,
}

/// 0-based column positions of one input table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub country_col: usize,
    pub lat_col: usize,
    pub lon_col: usize,
}

/// Regression columns, addressed in the joined row (left cells, then right cells).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegressionColumns {
    pub target_col: usize,
    pub predictor_cols: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Flare survey list (CSV)
    pub survey_path: PathBuf,
    /// Flare volume estimates (workbook)
    pub volume_path: PathBuf,
    pub country: String,
    pub survey_schema: TableSchema,
    pub volume_schema: TableSchema,
    pub regression: RegressionColumns,
    pub max_distance_km: f64,
    pub on_parse_error: ParseErrorPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            survey_path: PathBuf::from("flare_list.csv"),
            volume_path: PathBuf::from("flare_volume_estimates.xlsx"),
            country: "Algeria".to_string(),
            survey_schema: TableSchema {
                country_col: 0,
                lat_col: 4,
                lon_col: 5,
            },
            volume_schema: TableSchema {
                country_col: 0,
                lat_col: 1,
                lon_col: 2,
            },
            // "Flaring Vol (million m3)" against "flr_volume", "avg_temp", "dtc_freq"
            regression: RegressionColumns {
                target_col: 10,
                predictor_cols: vec![6, 7, 8],
            },
            max_distance_km: DEFAULT_MAX_DISTANCE_KM,
            on_parse_error: ParseErrorPolicy::Zero,
        }
    }
}

impl PipelineConfig {
    /// Read a JSON config; absent fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: PipelineConfig = serde_json::from_str(
            r#"{ "country": "Libya", "on_parse_error": "skip_row", "max_distance_km": 5.0 }"#,
        )
        .unwrap();

        assert_eq!(config.country, "Libya");
        assert_eq!(config.on_parse_error, ParseErrorPolicy::SkipRow);
        assert_eq!(config.max_distance_km, 5.0);
        assert_eq!(config.survey_schema, PipelineConfig::default().survey_schema);
        assert_eq!(config.regression.predictor_cols, vec![6, 7, 8]);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let result: Result<PipelineConfig, _> =
            serde_json::from_str(r#"{ "on_parse_error": "ignore" }"#);
        assert!(result.is_err());
    }
}
