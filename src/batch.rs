use chrono::NaiveDateTime;
use derive_more::{Deref, From, Into};
use serde::{Deserialize, Serialize};

use crate::{model::ElementId, profile::MatchedProfiles};

/// Time axis of a batch, kept for labelling extrema and for loss integration.
#[derive(Debug, Clone, Default, PartialEq, Deref, From, Into, Serialize, Deserialize)]
pub struct TimestampSequence(pub Vec<NaiveDateTime>);

impl TimestampSequence {
    /// Elapsed time of every timestamp since the first one, in hours.
    pub fn elapsed_hours(&self) -> Vec<f64> {
        let Some(&t0) = self.0.first() else {
            return Vec::new();
        };
        self.0
            .iter()
            .map(|t| (*t - t0).num_milliseconds() as f64 / 3_600_000.0)
            .collect()
    }
}

/// Per-timestep override of one symmetric load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadUpdate {
    pub id: ElementId,
    /// Active power (W).
    pub p_specified: f64,
    /// Reactive power (var).
    pub q_specified: f64,
}

/// Dense `(timesteps × loads)` batch of load updates, stored row-major.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchUpdateDataset {
    n_timesteps: usize,
    n_loads: usize,
    sym_load: Vec<LoadUpdate>,
}

impl BatchUpdateDataset {
    /// Builds a batch from one row of updates per timestep. All rows must
    /// have the same length.
    pub fn from_scenarios(rows: Vec<Vec<LoadUpdate>>) -> Option<Self> {
        let n_loads = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != n_loads) {
            return None;
        }
        Some(Self {
            n_timesteps: rows.len(),
            n_loads,
            sym_load: rows.into_iter().flatten().collect(),
        })
    }

    pub fn n_timesteps(&self) -> usize {
        self.n_timesteps
    }

    pub fn n_loads(&self) -> usize {
        self.n_loads
    }

    pub fn is_empty(&self) -> bool {
        self.n_timesteps == 0
    }

    /// Updates applied at timestep `t`.
    pub fn scenario(&self, t: usize) -> &[LoadUpdate] {
        &self.sym_load[t * self.n_loads..(t + 1) * self.n_loads]
    }

    pub fn scenarios(&self) -> impl Iterator<Item = &[LoadUpdate]> {
        (0..self.n_timesteps).map(|t| self.scenario(t))
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_timesteps, self.n_loads)
    }
}

/// Converts matched profiles into the solver's batch update layout.
pub fn build_batch_update(profiles: MatchedProfiles) -> (TimestampSequence, BatchUpdateDataset) {
    let MatchedProfiles {
        timestamps,
        load_ids,
        active,
        reactive,
    } = profiles;
    let sym_load = (0..timestamps.len())
        .flat_map(|t| {
            let active = &active;
            let reactive = &reactive;
            load_ids
                .iter()
                .enumerate()
                .map(move |(c, &id)| LoadUpdate {
                    id,
                    p_specified: active[(t, c)],
                    q_specified: reactive[(t, c)],
                })
        })
        .collect();
    let batch = BatchUpdateDataset {
        n_timesteps: timestamps.len(),
        n_loads: load_ids.len(),
        sym_load,
    };
    (TimestampSequence(timestamps), batch)
}
