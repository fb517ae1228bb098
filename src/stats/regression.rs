//! Regression Engine Module
//! Simple linear regression of a target column on a min-max normalized
//! predictor, with coefficient of determination.

use statrs::statistics::Statistics;
use thiserror::Error;

use super::numeric::{min_max_normalize, parse_cell, CellValue};
use crate::config::ParseErrorPolicy;
use crate::data::Row;

/// Number of (target, normalized predictor) pairs kept for display.
pub const PREVIEW_LEN: usize = 10;

#[derive(Error, Debug, PartialEq)]
pub enum RegressionError {
    #[error("Insufficient data for regression analysis: no samples")]
    NoSamples,
    #[error("Insufficient data for regression analysis: sample {0} has no predictor value")]
    NoPredictor(usize),
    #[error("Predictor is constant ({0}); min-max normalization is undefined")]
    ConstantPredictor(f64),
    #[error("Target is constant; R² is undefined")]
    ConstantTarget,
    #[error("Non-finite value in sample {0}")]
    NonFinite(usize),
    #[error("Predictor range overflows f64; min-max normalization is undefined")]
    PredictorRangeOverflow,
    #[error("Regression overflowed; coefficients or R² are not finite")]
    NonFiniteFit,
    #[error("Joined record {record}: column {col} is not numeric ({value:?})")]
    UnparseableCell {
        record: usize,
        col: usize,
        value: String,
    },
}

/// One joined record reduced to numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionSample {
    pub target: f64,
    pub predictors: Vec<f64>,
}

/// Fitted model `target = alpha + beta * predictor_normalized`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionResult {
    pub alpha: f64,
    pub beta: f64,
    pub r_squared: f64,
    pub n_samples: usize,
    /// Raw predictor range used for normalization
    pub predictor_min: f64,
    pub predictor_max: f64,
}

/// A fit plus the leading (target, normalized predictor) pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionFit {
    pub result: RegressionResult,
    pub preview: Vec<(f64, f64)>,
}

/// Extracts samples from joined records and fits the model.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegressionEngine {
    on_parse_error: ParseErrorPolicy,
}

impl RegressionEngine {
    pub fn new(on_parse_error: ParseErrorPolicy) -> Self {
        Self { on_parse_error }
    }

    /// Build one sample per joined record long enough to hold `target_col`.
    ///
    /// Predictor columns beyond the end of a record are left out of that
    /// record's predictor vector.
    pub fn extract(
        &self,
        joined: &[Row],
        target_col: usize,
        predictor_cols: &[usize],
    ) -> Result<Vec<RegressionSample>, RegressionError> {
        let mut samples = Vec::with_capacity(joined.len());

        'records: for (record, row) in joined.iter().enumerate() {
            if row.len() <= target_col {
                continue;
            }

            let target = match self.parse(row, record, target_col)? {
                Some(v) => v,
                None => continue,
            };

            let mut predictors = Vec::with_capacity(predictor_cols.len());
            for &col in predictor_cols.iter().filter(|&&col| col < row.len()) {
                match self.parse(row, record, col)? {
                    Some(v) => predictors.push(v),
                    None => continue 'records,
                }
            }

            samples.push(RegressionSample { target, predictors });
        }

        log::debug!(
            "Extracted {} samples from {} joined records",
            samples.len(),
            joined.len()
        );
        Ok(samples)
    }

    /// Fit on the first predictor of every sample.
    pub fn fit(&self, samples: &[RegressionSample]) -> Result<RegressionFit, RegressionError> {
        if samples.is_empty() {
            return Err(RegressionError::NoSamples);
        }

        let mut y = Vec::with_capacity(samples.len());
        let mut x_raw = Vec::with_capacity(samples.len());
        for (i, sample) in samples.iter().enumerate() {
            let Some(&x) = sample.predictors.first() else {
                return Err(RegressionError::NoPredictor(i));
            };
            if !x.is_finite() || !sample.target.is_finite() {
                return Err(RegressionError::NonFinite(i));
            }
            y.push(sample.target);
            x_raw.push(x);
        }

        let (x, predictor_min, predictor_max) = min_max_normalize(&x_raw).ok_or_else(|| {
            if x_raw.iter().all(|&v| v == x_raw[0]) {
                RegressionError::ConstantPredictor(x_raw[0])
            } else {
                RegressionError::PredictorRangeOverflow
            }
        })?;

        // Sample covariance over sample variance; the n - 1 factors cancel
        let beta = y.iter().covariance(x.iter()) / x.iter().variance();
        let alpha = y.iter().mean() - beta * x.iter().mean();
        if !alpha.is_finite() || !beta.is_finite() {
            return Err(RegressionError::NonFiniteFit);
        }

        let y_mean = y.iter().mean();
        let (ss_total, ss_residual) = y
            .iter()
            .zip(&x)
            .fold((0.0, 0.0), |(total, residual), (&yi, &xi)| {
                let predicted = alpha + beta * xi;
                (
                    total + (yi - y_mean).powi(2),
                    residual + (yi - predicted).powi(2),
                )
            });
        if !ss_total.is_finite() || !ss_residual.is_finite() {
            return Err(RegressionError::NonFiniteFit);
        }
        if ss_total == 0.0 {
            return Err(RegressionError::ConstantTarget);
        }
        let r_squared = 1.0 - ss_residual / ss_total;
        if !r_squared.is_finite() {
            return Err(RegressionError::NonFiniteFit);
        }

        let preview = y
            .iter()
            .zip(&x)
            .take(PREVIEW_LEN)
            .map(|(&yi, &xi)| (yi, xi))
            .collect();

        let result = RegressionResult {
            alpha,
            beta,
            r_squared,
            n_samples: samples.len(),
            predictor_min,
            predictor_max,
        };
        log::debug!("Regression fit: {:?}", result);

        Ok(RegressionFit { result, preview })
    }

    fn parse(&self, row: &Row, record: usize, col: usize) -> Result<Option<f64>, RegressionError> {
        let cell = row.get(col).map(String::as_str);
        match parse_cell(cell, self.on_parse_error) {
            CellValue::Value(v) => Ok(Some(v)),
            CellValue::Skip => Ok(None),
            CellValue::Invalid => Err(RegressionError::UnparseableCell {
                record,
                col,
                value: cell.unwrap_or("").to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-6;

    fn sample(target: f64, predictor: f64) -> RegressionSample {
        RegressionSample {
            target,
            predictors: vec![predictor],
        }
    }

    fn sample_with(target: f64, predictors: &[f64]) -> RegressionSample {
        RegressionSample {
            target,
            predictors: predictors.to_vec(),
        }
    }

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn recovers_noise_free_line() {
        let samples: Vec<_> = (0..10)
            .map(|i| {
                let x = i as f64;
                sample(2.0 + 3.0 * (x / 9.0), x)
            })
            .collect();

        let fit = RegressionEngine::default().fit(&samples).unwrap();
        assert!((fit.result.alpha - 2.0).abs() < TOLERANCE);
        assert!((fit.result.beta - 3.0).abs() < TOLERANCE);
        assert!((fit.result.r_squared - 1.0).abs() < TOLERANCE);
        assert_eq!(fit.result.n_samples, 10);
        assert_eq!(fit.result.predictor_min, 0.0);
        assert_eq!(fit.result.predictor_max, 9.0);
    }

    #[test]
    fn only_first_predictor_is_used() {
        let samples = vec![
            sample_with(1.0, &[0.0, 100.0]),
            sample_with(3.0, &[10.0, -5.0]),
            sample_with(2.0, &[5.0, 42.0]),
        ];
        let fit = RegressionEngine::default().fit(&samples).unwrap();
        assert!((fit.result.alpha - 1.0).abs() < TOLERANCE);
        assert!((fit.result.beta - 2.0).abs() < TOLERANCE);
    }

    #[test]
    fn preview_is_capped() {
        let samples: Vec<_> = (0..25).map(|i| sample((i * i) as f64, i as f64)).collect();
        let fit = RegressionEngine::default().fit(&samples).unwrap();
        assert_eq!(fit.preview.len(), PREVIEW_LEN);
        assert_eq!(fit.preview[0], (0.0, 0.0));
        assert!((fit.preview[3].1 - 3.0 / 24.0).abs() < 1e-12);
    }

    #[test]
    fn poor_fit_is_still_a_result() {
        // Symmetric V shape: no linear trend at all
        let samples = vec![sample(1.0, 0.0), sample(0.0, 1.0), sample(1.0, 2.0)];
        let fit = RegressionEngine::default().fit(&samples).unwrap();
        assert!(fit.result.beta.abs() < TOLERANCE);
        assert!(fit.result.r_squared.abs() < TOLERANCE);
    }

    #[test]
    fn degenerate_inputs_are_errors() {
        let engine = RegressionEngine::default();
        assert_eq!(engine.fit(&[]), Err(RegressionError::NoSamples));

        let no_predictor = vec![sample(1.0, 1.0), sample_with(2.0, &[])];
        assert_eq!(
            engine.fit(&no_predictor),
            Err(RegressionError::NoPredictor(1))
        );

        let flat_x = vec![sample(1.0, 4.0), sample(2.0, 4.0), sample(3.0, 4.0)];
        assert_eq!(
            engine.fit(&flat_x),
            Err(RegressionError::ConstantPredictor(4.0))
        );

        let flat_y = vec![sample(5.0, 1.0), sample(5.0, 2.0)];
        assert_eq!(engine.fit(&flat_y), Err(RegressionError::ConstantTarget));

        let nan = vec![sample(1.0, 1.0), sample(f64::NAN, 2.0)];
        assert_eq!(engine.fit(&nan), Err(RegressionError::NonFinite(1)));
    }

    #[test]
    fn overflow_is_an_error_not_nan() {
        let engine = RegressionEngine::default();

        let wide_x = vec![sample(1.0, -1e308), sample(2.0, 0.0), sample(3.0, 1e308)];
        assert_eq!(
            engine.fit(&wide_x),
            Err(RegressionError::PredictorRangeOverflow)
        );

        let wide_y = vec![sample(-1e308, 0.0), sample(0.0, 1.0), sample(1e308, 2.0)];
        assert_eq!(engine.fit(&wide_y), Err(RegressionError::NonFiniteFit));
    }

    #[test]
    fn extract_skips_short_rows_and_omits_missing_predictors() {
        let joined = vec![
            row(&["a", "1.5", "10", "x"]),
            row(&["b", "2.5"]),
            row(&["c"]),
            row(&["d", "oops", "7", "8"]),
        ];

        let samples = RegressionEngine::default()
            .extract(&joined, 1, &[2, 3])
            .unwrap();
        assert_eq!(
            samples,
            vec![
                sample_with(1.5, &[10.0, 0.0]),
                sample_with(2.5, &[]),
                sample_with(0.0, &[7.0, 8.0]),
            ]
        );
    }

    #[test]
    fn extract_follows_parse_policy() {
        let joined = vec![row(&["1", "2"]), row(&["n/a", "3"]), row(&["4", ""])];

        let skipped = RegressionEngine::new(ParseErrorPolicy::SkipRow)
            .extract(&joined, 0, &[1])
            .unwrap();
        assert_eq!(skipped, vec![sample(1.0, 2.0)]);

        let failed = RegressionEngine::new(ParseErrorPolicy::Fail).extract(&joined, 0, &[1]);
        assert_eq!(
            failed,
            Err(RegressionError::UnparseableCell {
                record: 1,
                col: 0,
                value: "n/a".to_string()
            })
        );
    }
}
