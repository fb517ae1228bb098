//! Text Report
//! Renders a pipeline run as the human-readable summary printed on stdout.

use std::io::{self, Write};

use crate::pipeline::PipelineOutput;

/// Write the report for one run. Floats use 4 decimal places.
pub fn write_report<W: Write>(out: &mut W, output: &PipelineOutput) -> io::Result<()> {
    writeln!(out, "Survey Headers: {:?}", output.survey_header)?;
    writeln!(out, "Volume Headers: {:?}", output.volume_header)?;
    writeln!(
        out,
        "Filtered {} Records in Survey List: {}",
        output.country, output.survey_count
    )?;
    writeln!(
        out,
        "Filtered {} Records in Volume Estimates: {}",
        output.country, output.volume_count
    )?;
    writeln!(
        out,
        "Joined Records (within {:.4} km): {}",
        output.max_distance_km, output.joined_count
    )?;
    writeln!(out, "Unmatched Records: {}", output.dangling_count)?;

    writeln!(out)?;
    writeln!(
        out,
        "Sample Normalized Data (First {} values):",
        output.fit.preview.len()
    )?;
    for (i, (y, x)) in output.fit.preview.iter().enumerate() {
        writeln!(
            out,
            "y[{i}] (Target): {y:.4}, x[{i}] (Normalized Predictor): {x:.4}"
        )?;
    }

    let result = &output.fit.result;
    writeln!(out)?;
    writeln!(out, "Samples: {}", result.n_samples)?;
    writeln!(
        out,
        "Predictor Range: [{:.4}, {:.4}]",
        result.predictor_min, result.predictor_max
    )?;
    writeln!(
        out,
        "Regression Model (Normalized): target = {:.4} + {:.4} * predictor_normalized",
        result.alpha, result.beta
    )?;
    writeln!(out, "R-squared: {:.4}", result.r_squared)?;
    Ok(())
}
