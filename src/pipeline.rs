//! Build → validate → solve → reduce, with every stage's result passed on explicitly.
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, info_span};

use crate::{
    batch::{BatchUpdateDataset, TimestampSequence, build_batch_update},
    config::PipelineConfig,
    error::Result,
    io::{load_network_json, load_profile_csv},
    model::InputDataset,
    powerflow::{BatchOutput, NewtonRaphsonSolver, PowerFlowSolver},
    profile::{LoadProfile, match_profiles},
    summary::{LineSummaryTable, NodeSummaryTable, summarize_lines, summarize_nodes},
};

/// The two tables a run produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryTables {
    pub node: NodeSummaryTable,
    pub line: LineSummaryTable,
}

/// A batch update ready for solving, with the time axis it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedBatch {
    pub timestamps: TimestampSequence,
    pub update: BatchUpdateDataset,
}

/// Time-series power flow over one static network.
pub struct TimeSeriesPowerFlow<S: PowerFlowSolver = NewtonRaphsonSolver> {
    input: InputDataset,
    config: PipelineConfig,
    solver: S,
}

impl TimeSeriesPowerFlow {
    /// Validates `input` and sets up the default Newton-Raphson solver.
    pub fn new(input: InputDataset, config: PipelineConfig) -> Result<Self> {
        let solver = NewtonRaphsonSolver::new(&config);
        Self::with_solver(input, config, solver)
    }

    /// Reads the network from a JSON dataset file.
    pub fn from_network_file(path: impl AsRef<Path>, config: PipelineConfig) -> Result<Self> {
        Self::new(load_network_json(path)?, config)
    }
}

impl<S: PowerFlowSolver> TimeSeriesPowerFlow<S> {
    pub fn with_solver(input: InputDataset, config: PipelineConfig, solver: S) -> Result<Self> {
        solver.validate(&input, None)?;
        info!(
            nodes = input.node.len(),
            lines = input.line.len(),
            loads = input.sym_load.len(),
            "network accepted"
        );
        Ok(Self {
            input,
            config,
            solver,
        })
    }

    pub fn input(&self) -> &InputDataset {
        &self.input
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Matches the two profiles and lays them out as a batch update.
    pub fn prepare(&self, active: LoadProfile, reactive: LoadProfile) -> Result<PreparedBatch> {
        let (timestamps, update) = build_batch_update(match_profiles(active, reactive)?);
        info!(
            timesteps = update.n_timesteps(),
            loads = update.n_loads(),
            "batch update built"
        );
        Ok(PreparedBatch { timestamps, update })
    }

    /// Validates the batch against the network and solves every timestep.
    pub fn solve(&mut self, batch: &PreparedBatch) -> Result<BatchOutput> {
        self.solver.validate(&self.input, Some(&batch.update))?;
        let output = self
            .solver
            .solve(&self.input, &batch.update, self.config.solver.method)?;
        info!(timesteps = output.n_timesteps(), "batch solved");
        Ok(output)
    }

    /// Runs the whole pipeline for one pair of profiles.
    pub fn run(&mut self, active: LoadProfile, reactive: LoadProfile) -> Result<SummaryTables> {
        let span = info_span!("time_series_power_flow");
        let _guard = span.enter();
        let batch = self.prepare(active, reactive)?;
        let output = self.solve(&batch)?;
        let tables = summarize(&batch.timestamps, &output)?;
        info!(
            node_rows = tables.node.rows.len(),
            line_rows = tables.line.rows.len(),
            "summaries reduced"
        );
        Ok(tables)
    }

    pub fn run_files(
        &mut self,
        active: impl AsRef<Path>,
        reactive: impl AsRef<Path>,
    ) -> Result<SummaryTables> {
        let active = load_profile_csv(active)?;
        let reactive = load_profile_csv(reactive)?;
        self.run(active, reactive)
    }
}

/// Reduces solver output to the node and line summary tables.
pub fn summarize(timestamps: &TimestampSequence, output: &BatchOutput) -> Result<SummaryTables> {
    #[cfg(feature = "rayon")]
    let (node, line) = rayon::join(
        || summarize_nodes(timestamps, output),
        || summarize_lines(timestamps, output),
    );
    #[cfg(not(feature = "rayon"))]
    let (node, line) = (
        summarize_nodes(timestamps, output),
        summarize_lines(timestamps, output),
    );
    Ok(SummaryTables {
        node: node?,
        line: line?,
    })
}
