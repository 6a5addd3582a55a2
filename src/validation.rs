//! Structural checks run before a solve.
//!
//! Both entry points collect every problem instead of stopping at the first
//! one, so a single run reports the full diagnostic.
use std::{collections::HashSet, fmt};

use crate::{
    batch::BatchUpdateDataset,
    model::{ElementId, InputDataset, LoadType},
};

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    DuplicateId(ElementId),
    /// `(element, attribute, referenced id)`
    MissingNode(ElementId, &'static str, ElementId),
    NonPositive(ElementId, &'static str),
    NotFinite(ElementId, &'static str),
    VoltageMismatch(ElementId),
    ZeroImpedance(ElementId),
    UnsupportedLoadType(ElementId, LoadType),
    NoEnergizedSource,
    EmptyBatch,
    UnknownLoad { timestep: usize, id: ElementId },
    UpdateNotFinite { timestep: usize, id: ElementId },
    DuplicateUpdateId { timestep: usize, id: ElementId },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "id {id} is used by more than one element"),
            Self::MissingNode(id, attr, node) => {
                write!(f, "element {id}: {attr} refers to unknown node {node}")
            }
            Self::NonPositive(id, attr) => write!(f, "element {id}: {attr} must be positive"),
            Self::NotFinite(id, attr) => write!(f, "element {id}: {attr} is not finite"),
            Self::VoltageMismatch(id) => {
                write!(f, "line {id} connects nodes with different u_rated")
            }
            Self::ZeroImpedance(id) => write!(f, "line {id} has zero series impedance"),
            Self::UnsupportedLoadType(id, t) => {
                write!(f, "sym_load {id}: load type {t:?} is not supported")
            }
            Self::NoEnergizedSource => write!(f, "no energized source in the network"),
            Self::EmptyBatch => write!(f, "batch update contains no timesteps"),
            Self::UnknownLoad { timestep, id } => {
                write!(f, "timestep {timestep}: update refers to unknown sym_load {id}")
            }
            Self::UpdateNotFinite { timestep, id } => {
                write!(f, "timestep {timestep}: update for sym_load {id} is not finite")
            }
            Self::DuplicateUpdateId { timestep, id } => {
                write!(f, "timestep {timestep}: sym_load {id} is updated more than once")
            }
        }
    }
}

/// Non-empty list of validation failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

fn into_result(errors: Vec<ValidationError>) -> Result<(), ValidationErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

fn check_finite(errors: &mut Vec<ValidationError>, id: ElementId, attrs: &[(&'static str, f64)]) {
    for &(name, value) in attrs {
        if !value.is_finite() {
            errors.push(ValidationError::NotFinite(id, name));
        }
    }
}

fn collect_input_errors(input: &InputDataset) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for id in input.element_ids() {
        if !seen.insert(id) {
            errors.push(ValidationError::DuplicateId(id));
        }
    }

    let nodes = input.node_lookup();
    for node in &input.node {
        check_finite(&mut errors, node.id, &[("u_rated", node.u_rated)]);
        if node.u_rated <= 0.0 {
            errors.push(ValidationError::NonPositive(node.id, "u_rated"));
        }
    }

    for line in &input.line {
        check_finite(
            &mut errors,
            line.id,
            &[
                ("r1", line.r1),
                ("x1", line.x1),
                ("c1", line.c1),
                ("tan1", line.tan1),
                ("i_n", line.i_n),
            ],
        );
        let from = nodes.get(&line.from_node);
        let to = nodes.get(&line.to_node);
        if from.is_none() {
            errors.push(ValidationError::MissingNode(line.id, "from_node", line.from_node));
        }
        if to.is_none() {
            errors.push(ValidationError::MissingNode(line.id, "to_node", line.to_node));
        }
        if let (Some(&f), Some(&t)) = (from, to) {
            if input.node[f].u_rated != input.node[t].u_rated {
                errors.push(ValidationError::VoltageMismatch(line.id));
            }
        }
        if line.i_n <= 0.0 {
            errors.push(ValidationError::NonPositive(line.id, "i_n"));
        }
        if line.r1 == 0.0 && line.x1 == 0.0 {
            errors.push(ValidationError::ZeroImpedance(line.id));
        }
    }

    for load in &input.sym_load {
        check_finite(
            &mut errors,
            load.id,
            &[("p_specified", load.p_specified), ("q_specified", load.q_specified)],
        );
        if !nodes.contains_key(&load.node) {
            errors.push(ValidationError::MissingNode(load.id, "node", load.node));
        }
        if load.load_type != LoadType::ConstPower {
            errors.push(ValidationError::UnsupportedLoadType(load.id, load.load_type));
        }
    }

    for source in &input.source {
        check_finite(&mut errors, source.id, &[("u_ref", source.u_ref)]);
        if !nodes.contains_key(&source.node) {
            errors.push(ValidationError::MissingNode(source.id, "node", source.node));
        }
        if source.u_ref <= 0.0 {
            errors.push(ValidationError::NonPositive(source.id, "u_ref"));
        }
    }
    if !input
        .source
        .iter()
        .any(|s| s.status != 0 && nodes.contains_key(&s.node))
    {
        errors.push(ValidationError::NoEnergizedSource);
    }
    errors
}

/// Validates the static input dataset for a power-flow calculation.
pub fn validate_input_data(input: &InputDataset) -> Result<(), ValidationErrors> {
    into_result(collect_input_errors(input))
}

/// Validates the static input dataset together with a batch of load updates.
pub fn validate_batch_data(
    input: &InputDataset,
    update: &BatchUpdateDataset,
) -> Result<(), ValidationErrors> {
    let mut errors = collect_input_errors(input);
    if update.is_empty() {
        errors.push(ValidationError::EmptyBatch);
    }
    let loads = input.load_lookup();
    for (timestep, scenario) in update.scenarios().enumerate() {
        let mut seen = HashSet::new();
        for u in scenario {
            if !seen.insert(u.id) {
                errors.push(ValidationError::DuplicateUpdateId { timestep, id: u.id });
            }
            if !loads.contains_key(&u.id) {
                errors.push(ValidationError::UnknownLoad { timestep, id: u.id });
            }
            if !u.p_specified.is_finite() || !u.q_specified.is_finite() {
                errors.push(ValidationError::UpdateNotFinite { timestep, id: u.id });
            }
        }
    }
    into_result(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{batch::LoadUpdate, testcases::two_node};

    #[test]
    fn valid_network_passes() {
        assert!(validate_input_data(&two_node()).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut net = two_node();
        net.line[0].to_node = 42;
        net.sym_load[0].id = 1;
        net.source[0].status = 0;
        let errs = validate_input_data(&net).unwrap_err().0;
        assert!(errs.contains(&ValidationError::MissingNode(3, "to_node", 42)));
        assert!(errs.contains(&ValidationError::DuplicateId(1)));
        assert!(errs.contains(&ValidationError::NoEnergizedSource));
    }

    #[test]
    fn voltage_levels_must_match() {
        let mut net = two_node();
        net.node[1].u_rated = 400.0;
        let errs = validate_input_data(&net).unwrap_err();
        assert_eq!(errs.0, vec![ValidationError::VoltageMismatch(3)]);
        assert!(errs.to_string().contains("line 3"));
    }

    #[test]
    fn batch_must_reference_known_loads() {
        let net = two_node();
        let update = BatchUpdateDataset::from_scenarios(vec![vec![LoadUpdate {
            id: 99,
            p_specified: 1.0,
            q_specified: f64::NAN,
        }]])
        .unwrap();
        let errs = validate_batch_data(&net, &update).unwrap_err().0;
        assert_eq!(
            errs,
            vec![
                ValidationError::UnknownLoad { timestep: 0, id: 99 },
                ValidationError::UpdateNotFinite { timestep: 0, id: 99 },
            ]
        );
    }

    #[test]
    fn repeated_load_in_a_timestep_is_rejected() {
        let update = |p: f64| LoadUpdate {
            id: 4,
            p_specified: p,
            q_specified: 0.0,
        };
        let batch =
            BatchUpdateDataset::from_scenarios(vec![vec![update(1e5), update(9e5)]; 2]).unwrap();
        let errs = validate_batch_data(&two_node(), &batch).unwrap_err().0;
        assert_eq!(
            errs,
            vec![
                ValidationError::DuplicateUpdateId { timestep: 0, id: 4 },
                ValidationError::DuplicateUpdateId { timestep: 1, id: 4 },
            ]
        );
    }

    #[test]
    fn empty_batch_is_rejected() {
        let errs = validate_batch_data(&two_node(), &BatchUpdateDataset::default())
            .unwrap_err()
            .0;
        assert_eq!(errs, vec![ValidationError::EmptyBatch]);
    }
}
