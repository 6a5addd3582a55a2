//! Batch Newton-Raphson power flow over a static network and per-timestep load updates.
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    batch::BatchUpdateDataset,
    config::PipelineConfig,
    error::{PipelineError, Result},
    model::InputDataset,
    validation::{validate_batch_data, validate_input_data},
};

mod dsbus_dv;
pub mod newtonpf;
mod output;
pub mod solver;
mod ybus;

pub use output::{BatchOutput, LineOutput, NodeOutput};

use newtonpf::newton_pf;
use output::{line_results, node_results};
use solver::{DefaultSolver, Solve};
use ybus::NetworkMatrices;

/// Solution method of a batch calculation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMethod {
    #[default]
    NewtonRaphson,
}

/// A batch power-flow engine: a validation entry point plus one atomic solve.
pub trait PowerFlowSolver {
    /// Checks the static dataset and, when given, the batch update against each other.
    fn validate(&self, input: &InputDataset, update: Option<&BatchUpdateDataset>) -> Result<()> {
        match update {
            Some(update) => validate_batch_data(input, update)?,
            None => validate_input_data(input)?,
        }
        Ok(())
    }

    /// Solves every timestep of `update`. Any failing timestep fails the batch.
    fn solve(
        &mut self,
        input: &InputDataset,
        update: &BatchUpdateDataset,
        method: CalculationMethod,
    ) -> Result<BatchOutput>;
}

/// Polar Newton-Raphson on a sparse `Ybus`, flat start at every timestep.
#[derive(Debug, Clone)]
pub struct NewtonRaphsonSolver<S: Solve = DefaultSolver> {
    tolerance: f64,
    max_iter: usize,
    s_base: f64,
    frequency: f64,
    linear: S,
}

impl NewtonRaphsonSolver {
    pub fn new(config: &PipelineConfig) -> Self {
        Self::with_linear_solver(config, DefaultSolver::default())
    }
}

impl<S: Solve> NewtonRaphsonSolver<S> {
    pub fn with_linear_solver(config: &PipelineConfig, linear: S) -> Self {
        Self {
            tolerance: config.solver.tolerance,
            max_iter: config.solver.max_iter,
            s_base: config.s_base,
            frequency: config.frequency,
            linear,
        }
    }
}

impl<S: Solve> PowerFlowSolver for NewtonRaphsonSolver<S> {
    fn solve(
        &mut self,
        input: &InputDataset,
        update: &BatchUpdateDataset,
        method: CalculationMethod,
    ) -> Result<BatchOutput> {
        let CalculationMethod::NewtonRaphson = method;
        let mats = NetworkMatrices::build(input, self.s_base, self.frequency);
        debug!(
            buses = mats.n_bus(),
            pq = mats.npq,
            nnz = mats.ybus.nnz(),
            "network matrices assembled"
        );
        if mats.n_bus() == 0 {
            return Err(PipelineError::SolveFailure {
                timestep: 0,
                reason: "no energized node".into(),
            });
        }
        // the Jacobian pattern only depends on the topology
        self.linear.reset();

        let mut out = BatchOutput::with_capacity(update.n_timesteps());
        for (timestep, scenario) in update.scenarios().enumerate() {
            let sbus = mats.sbus(scenario);
            let v = match newton_pf(
                &mats.ybus,
                &sbus,
                &mats.v_init,
                mats.npq,
                Some(self.tolerance),
                Some(self.max_iter),
                &mut self.linear,
            ) {
                Ok((v, iterations)) => {
                    debug!(timestep, iterations, "converged");
                    v
                }
                Err((reason, _)) => {
                    warn!(timestep, %reason, "power flow failed");
                    return Err(PipelineError::SolveFailure { timestep, reason });
                }
            };
            out.push(
                node_results(input, &mats, &v),
                line_results(input, &mats, &v),
            );
        }
        Ok(out)
    }
}
