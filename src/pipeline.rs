//! Analysis Pipeline
//! load → filter → geo join → extract → fit.

use anyhow::{Context, Result};

use crate::config::PipelineConfig;
use crate::data::{filter_by_value, DataLoader, Row, Table};
use crate::geo::{GeoColumns, GeoMatcher};
use crate::stats::{RegressionEngine, RegressionFit};

/// Everything the report needs from one run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub country: String,
    pub max_distance_km: f64,
    pub survey_header: Row,
    pub volume_header: Row,
    pub survey_count: usize,
    pub volume_count: usize,
    pub joined_count: usize,
    pub dangling_count: usize,
    pub fit: RegressionFit,
}

/// Load both inputs and run the analysis.
pub fn run(config: &PipelineConfig) -> Result<PipelineOutput> {
    let survey = DataLoader::load_table(&config.survey_path)
        .with_context(|| format!("loading survey list {}", config.survey_path.display()))?;
    let volume = DataLoader::load_table(&config.volume_path)
        .with_context(|| format!("loading volume estimates {}", config.volume_path.display()))?;

    analyze(config, &survey, &volume)
}

/// Run the analysis over already loaded tables.
pub fn analyze(config: &PipelineConfig, survey: &Table, volume: &Table) -> Result<PipelineOutput> {
    let survey_filtered =
        filter_by_value(survey, config.survey_schema.country_col, &config.country);
    let volume_filtered =
        filter_by_value(volume, config.volume_schema.country_col, &config.country);
    log::info!(
        "{} records: {} in survey list, {} in volume estimates",
        config.country,
        survey_filtered.len(),
        volume_filtered.len()
    );

    let join = GeoMatcher::new(config.max_distance_km)
        .with_parse_policy(config.on_parse_error)
        .join(
            &survey_filtered,
            GeoColumns::from(&config.survey_schema),
            &volume_filtered,
            GeoColumns::from(&config.volume_schema),
        )
        .context("joining survey list to volume estimates")?;
    log::info!(
        "Joined {} records within {} km, {} unmatched",
        join.matched.len(),
        config.max_distance_km,
        join.dangling.len()
    );

    let engine = RegressionEngine::new(config.on_parse_error);
    let samples = engine
        .extract(
            &join.matched,
            config.regression.target_col,
            &config.regression.predictor_cols,
        )
        .context("extracting regression samples")?;
    let fit = engine.fit(&samples).context("fitting regression")?;

    Ok(PipelineOutput {
        country: config.country.clone(),
        max_distance_km: config.max_distance_km,
        survey_header: survey.header.clone(),
        volume_header: volume.header.clone(),
        survey_count: survey_filtered.len(),
        volume_count: volume_filtered.len(),
        joined_count: join.matched.len(),
        dangling_count: join.dangling.len(),
        fit,
    })
}
