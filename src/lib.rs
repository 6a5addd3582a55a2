//! Time-series power flow: per-timestep load updates on a static network,
//! batch Newton-Raphson solves, and node voltage / line loading summaries.
pub mod batch;
pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod pipeline;
pub mod powerflow;
pub mod profile;
pub mod summary;
pub mod validation;

#[cfg(test)]
mod testcases;

pub mod prelude {
    pub use crate::batch::{BatchUpdateDataset, LoadUpdate, TimestampSequence, build_batch_update};
    pub use crate::config::{PipelineConfig, SolverConfig};
    pub use crate::error::{PipelineError, Result};
    pub use crate::io::{load_network_json, load_profile_csv, read_load_profile};
    pub use crate::model::*;
    pub use crate::pipeline::{PreparedBatch, SummaryTables, TimeSeriesPowerFlow, summarize};
    pub use crate::powerflow::{
        BatchOutput, CalculationMethod, LineOutput, NewtonRaphsonSolver, NodeOutput,
        PowerFlowSolver,
    };
    pub use crate::profile::{LoadProfile, MatchedProfiles, match_profiles};
    pub use crate::summary::{
        LineSummaryRow, LineSummaryTable, NodeSummaryRow, NodeSummaryTable, summarize_lines,
        summarize_nodes,
    };
    pub use crate::validation::{ValidationError, ValidationErrors};
}
