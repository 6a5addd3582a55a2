use chrono::NaiveDateTime;

use crate::{
    batch::TimestampSequence,
    error::Result,
    powerflow::{BatchOutput, NodeOutput},
};

use super::{NodeSummaryRow, NodeSummaryTable, arg_extrema, check_shape};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

fn summarize_timestep(timestamp: NaiveDateTime, nodes: &[NodeOutput]) -> Option<NodeSummaryRow> {
    let (max, min) = arg_extrema(nodes.iter().map(|n| n.u_pu))?;
    Some(NodeSummaryRow {
        timestamp,
        max_id: nodes[max].id,
        max_pu: nodes[max].u_pu,
        min_id: nodes[min].id,
        min_pu: nodes[min].u_pu,
    })
}

/// One row per timestep with the highest and lowest node voltage (p.u.) and
/// the nodes they occur at. Ties go to the first node in dataset order.
///
/// Timesteps without node results produce no row. Fails with
/// `OutputShape` when `output` does not have one result set per timestamp.
pub fn summarize_nodes(
    timestamps: &TimestampSequence,
    output: &BatchOutput,
) -> Result<NodeSummaryTable> {
    check_shape(timestamps, output)?;
    #[cfg(feature = "rayon")]
    let iter = timestamps.0.par_iter().zip(output.node.par_iter());
    #[cfg(not(feature = "rayon"))]
    let iter = timestamps.iter().zip(output.node.iter());

    let rows = iter
        .filter_map(|(t, nodes)| summarize_timestep(*t, nodes))
        .collect();
    Ok(NodeSummaryTable { rows })
}
