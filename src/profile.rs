use chrono::NaiveDateTime;
use nalgebra::DMatrix;
use tracing::debug;

use crate::{
    error::{PipelineError, Result},
    model::ElementId,
};

/// A time-indexed load table: one row per timestamp, one column per load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadProfile {
    pub timestamps: Vec<NaiveDateTime>,
    pub load_ids: Vec<ElementId>,
    /// Shape `(timestamps.len(), load_ids.len())`.
    pub values: DMatrix<f64>,
}

impl LoadProfile {
    /// Builds a profile from row-major data, checking the shape.
    pub fn from_rows(
        timestamps: Vec<NaiveDateTime>,
        load_ids: Vec<ElementId>,
        rows: &[Vec<f64>],
    ) -> Result<Self> {
        if rows.len() != timestamps.len() {
            return Err(PipelineError::Profile(format!(
                "{} timestamps but {} rows",
                timestamps.len(),
                rows.len()
            )));
        }
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != load_ids.len())
        {
            return Err(PipelineError::Profile(format!(
                "row {idx} has {} values, expected {}",
                row.len(),
                load_ids.len()
            )));
        }
        let values = DMatrix::from_fn(timestamps.len(), load_ids.len(), |r, c| rows[r][c]);
        Ok(Self {
            timestamps,
            load_ids,
            values,
        })
    }

    pub fn n_timesteps(&self) -> usize {
        self.timestamps.len()
    }

    pub fn n_loads(&self) -> usize {
        self.load_ids.len()
    }
}

/// Active and reactive profiles that share one time axis and one column order.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedProfiles {
    pub timestamps: Vec<NaiveDateTime>,
    pub load_ids: Vec<ElementId>,
    pub active: DMatrix<f64>,
    pub reactive: DMatrix<f64>,
}

/// Pairs an active and a reactive profile.
///
/// Load IDs and timestamps must be equal element by element, in the same
/// order. A permutation of the same columns is a mismatch: values are later
/// combined by position.
pub fn match_profiles(active: LoadProfile, reactive: LoadProfile) -> Result<MatchedProfiles> {
    if active.load_ids != reactive.load_ids {
        debug!(
            active = active.n_loads(),
            reactive = reactive.n_loads(),
            "load id sequences differ"
        );
        return Err(PipelineError::ProfileMismatch);
    }
    if active.timestamps != reactive.timestamps {
        debug!(
            active = active.n_timesteps(),
            reactive = reactive.n_timesteps(),
            "timestamp sequences differ"
        );
        return Err(PipelineError::ProfileMismatch);
    }
    Ok(MatchedProfiles {
        timestamps: active.timestamps,
        load_ids: active.load_ids,
        active: active.values,
        reactive: reactive.values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testcases::hours;

    fn profile(ids: Vec<ElementId>, n: usize, scale: f64) -> LoadProfile {
        let rows: Vec<Vec<f64>> = (0..n)
            .map(|t| ids.iter().map(|&id| scale * (id as f64 + t as f64)).collect())
            .collect();
        LoadProfile::from_rows(hours(n), ids, &rows).unwrap()
    }

    #[test]
    fn identical_axes_match() {
        let m = match_profiles(profile(vec![8, 9], 3, 1.0), profile(vec![8, 9], 3, 0.1)).unwrap();
        assert_eq!(m.load_ids, vec![8, 9]);
        assert_eq!(m.timestamps.len(), 3);
        assert_eq!(m.active[(2, 1)], 11.0);
        assert!((m.reactive[(2, 1)] - 1.1).abs() < 1e-12);
    }

    #[test]
    fn reordered_columns_are_a_mismatch() {
        let res = match_profiles(profile(vec![8, 9], 3, 1.0), profile(vec![9, 8], 3, 1.0));
        assert!(matches!(res, Err(PipelineError::ProfileMismatch)));
    }

    #[test]
    fn swapped_single_load_columns_are_a_mismatch() {
        let res = match_profiles(profile(vec![8], 3, 1.0), profile(vec![9], 3, 1.0));
        assert!(matches!(res, Err(PipelineError::ProfileMismatch)));
    }

    #[test]
    fn different_timestamps_are_a_mismatch() {
        let a = profile(vec![8], 3, 1.0);
        let mut b = profile(vec![8], 3, 1.0);
        b.timestamps.swap(0, 1);
        assert!(matches!(
            match_profiles(a.clone(), b),
            Err(PipelineError::ProfileMismatch)
        ));
        let shorter = profile(vec![8], 2, 1.0);
        assert!(matches!(
            match_profiles(a, shorter),
            Err(PipelineError::ProfileMismatch)
        ));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let res = LoadProfile::from_rows(hours(2), vec![1, 2], &[vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(res, Err(PipelineError::Profile(_))));
    }
}
