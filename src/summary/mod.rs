//! Temporal reduction of batch power-flow output into two summary tables.
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
    batch::TimestampSequence,
    error::{PipelineError, Result},
    model::ElementId,
    powerflow::BatchOutput,
};

mod display;
mod line;
mod node;

pub use line::summarize_lines;
pub use node::summarize_nodes;

/// Voltage extremes of one timestep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSummaryRow {
    pub timestamp: NaiveDateTime,
    pub max_id: ElementId,
    pub max_pu: f64,
    pub min_id: ElementId,
    pub min_pu: f64,
}

/// Loading extremes and energy loss of one line over the whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSummaryRow {
    pub line_id: ElementId,
    pub max_time: NaiveDateTime,
    pub max_loading: f64,
    pub min_time: NaiveDateTime,
    pub min_loading: f64,
    pub energy_loss_kwh: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSummaryTable {
    pub rows: Vec<NodeSummaryRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineSummaryTable {
    pub rows: Vec<LineSummaryRow>,
}

/// Both reducers require one node and one line result set per timestamp, and
/// the same lines in the same order at every timestep.
pub(crate) fn check_shape(timestamps: &TimestampSequence, output: &BatchOutput) -> Result<()> {
    let n = timestamps.len();
    if output.node.len() != n || output.line.len() != n {
        return Err(PipelineError::OutputShape(format!(
            "{n} timestamps but {} node and {} line result sets",
            output.node.len(),
            output.line.len()
        )));
    }
    let Some(first) = output.line.first() else {
        return Ok(());
    };
    for (t, lines) in output.line.iter().enumerate().skip(1) {
        if lines.len() != first.len() || lines.iter().zip(first).any(|(a, b)| a.id != b.id) {
            return Err(PipelineError::OutputShape(format!(
                "line results at timestep {t} differ from timestep 0"
            )));
        }
    }
    Ok(())
}

/// Indices of the maximum and the minimum, first occurrence on ties.
/// `None` for an empty sequence.
pub(crate) fn arg_extrema(values: impl IntoIterator<Item = f64>) -> Option<(usize, usize)> {
    let mut iter = values.into_iter().enumerate();
    let (_, first) = iter.next()?;
    let (mut max, mut min) = ((0, first), (0, first));
    for (i, v) in iter {
        if v > max.1 {
            max = (i, v);
        }
        if v < min.1 {
            min = (i, v);
        }
    }
    Some((max.0, min.0))
}

/// Trapezoidal integral of `y` sampled at `x`. Fewer than two samples give 0.
pub fn trapezoid(y: &[f64], x: &[f64]) -> f64 {
    y.windows(2)
        .zip(x.windows(2))
        .map(|(y, x)| (x[1] - x[0]) * (y[0] + y[1]) / 2.0)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{
        powerflow::{LineOutput, NodeOutput},
        testcases::hours,
    };

    fn line(id: ElementId) -> LineOutput {
        LineOutput {
            id,
            ..Default::default()
        }
    }

    #[test]
    fn shape_must_match_time_axis() {
        let ts = TimestampSequence(hours(3));
        let output = BatchOutput {
            node: vec![vec![NodeOutput::default()]; 2],
            line: vec![vec![line(1)]; 2],
        };
        assert!(matches!(
            check_shape(&ts, &output),
            Err(PipelineError::OutputShape(_))
        ));
        assert!(matches!(
            summarize_nodes(&ts, &output),
            Err(PipelineError::OutputShape(_))
        ));
        assert!(matches!(
            summarize_lines(&ts, &output),
            Err(PipelineError::OutputShape(_))
        ));
    }

    #[test]
    fn line_set_must_stay_fixed() {
        let ts = TimestampSequence(hours(2));
        let shorter = BatchOutput {
            node: vec![vec![]; 2],
            line: vec![vec![line(1), line(2)], vec![line(1)]],
        };
        assert!(matches!(
            summarize_lines(&ts, &shorter),
            Err(PipelineError::OutputShape(_))
        ));
        let reordered = BatchOutput {
            node: vec![vec![]; 2],
            line: vec![vec![line(1), line(2)], vec![line(2), line(1)]],
        };
        assert!(check_shape(&ts, &reordered).is_err());
        let fixed = BatchOutput {
            node: vec![vec![]; 2],
            line: vec![vec![line(1), line(2)]; 2],
        };
        assert!(check_shape(&ts, &fixed).is_ok());
    }

    #[test]
    fn trapezoid_unit_steps() {
        assert_eq!(trapezoid(&[0.0, 2.0, 0.0], &[0.0, 1.0, 2.0]), 2.0);
        assert_eq!(trapezoid(&[5.0], &[0.0]), 0.0);
        assert_eq!(trapezoid(&[], &[]), 0.0);
    }

    #[test]
    fn trapezoid_constant_rate() {
        let x = [0.0, 0.5, 2.0, 3.0];
        assert!((trapezoid(&[4.0; 4], &x) - 12.0).abs() < 1e-12);
    }

    #[test]
    fn arg_extrema_first_occurrence() {
        assert_eq!(arg_extrema([1.0, 3.0, 3.0, 0.5, 0.5]), Some((1, 3)));
        assert_eq!(arg_extrema([2.0]), Some((0, 0)));
        assert_eq!(arg_extrema(std::iter::empty()), None);
    }
}
