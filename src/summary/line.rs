use crate::{
    batch::TimestampSequence,
    error::Result,
    powerflow::{BatchOutput, LineOutput},
};

use super::{LineSummaryRow, LineSummaryTable, arg_extrema, check_shape, trapezoid};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

fn summarize_line(
    k: usize,
    timestamps: &TimestampSequence,
    elapsed_hours: &[f64],
    output: &BatchOutput,
) -> Option<LineSummaryRow> {
    let series: Vec<&LineOutput> = output.line.iter().map(|lines| &lines[k]).collect();
    let (max, min) = arg_extrema(series.iter().map(|l| l.loading))?;
    let loss_w: Vec<f64> = series.iter().map(|l| l.loss()).collect();
    Some(LineSummaryRow {
        line_id: series[0].id,
        max_time: timestamps[max],
        max_loading: series[max].loading,
        min_time: timestamps[min],
        min_loading: series[min].loading,
        energy_loss_kwh: trapezoid(&loss_w, elapsed_hours) / 1000.0,
    })
}

/// One row per line with its loading extremes over time and the energy lost.
///
/// The line order is taken from the first timestep. Loss is integrated with
/// the trapezoidal rule over the real elapsed time in hours, so a W input
/// yields kWh. Ties go to the earliest timestep. Fails with `OutputShape`
/// when the line set changes between timesteps or does not match the time axis.
pub fn summarize_lines(
    timestamps: &TimestampSequence,
    output: &BatchOutput,
) -> Result<LineSummaryTable> {
    check_shape(timestamps, output)?;
    let Some(first) = output.line.first() else {
        return Ok(LineSummaryTable::default());
    };
    let hours = timestamps.elapsed_hours();

    #[cfg(feature = "rayon")]
    let iter = (0..first.len()).into_par_iter();
    #[cfg(not(feature = "rayon"))]
    let iter = 0..first.len();

    let rows = iter
        .filter_map(|k| summarize_line(k, timestamps, &hours, output))
        .collect();
    Ok(LineSummaryTable { rows })
}
