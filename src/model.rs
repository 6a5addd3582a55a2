//! Static network description consumed by the solver.
//!
//! Element IDs are unique across all element kinds. Electrical quantities are
//! in SI units: volts, ohms, farads, amperes, watts and var.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Element identifier as it appears in the input dataset and the load profiles.
pub type ElementId = i64;

/// Represents a node (bus) in the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: ElementId,
    /// Rated line-to-line voltage (V).
    pub u_rated: f64,
}

fn energized() -> u8 {
    1
}

/// Represents a line between two nodes with the same rated voltage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub id: ElementId,
    pub from_node: ElementId,
    pub to_node: ElementId,
    #[serde(default = "energized")]
    pub from_status: u8,
    #[serde(default = "energized")]
    pub to_status: u8,
    /// Positive-sequence series resistance (ohm).
    pub r1: f64,
    /// Positive-sequence series reactance (ohm).
    pub x1: f64,
    /// Positive-sequence shunt capacitance (F).
    #[serde(default)]
    pub c1: f64,
    /// Loss factor of the shunt capacitance.
    #[serde(default)]
    pub tan1: f64,
    /// Rated current (A).
    pub i_n: f64,
}

impl Line {
    pub fn is_energized(&self) -> bool {
        self.from_status != 0 && self.to_status != 0
    }
}

/// Voltage dependency of a symmetric load. Only constant power is solved.
///
/// Read either as a name (`"const_power"`) or as its numeric code (`0`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "LoadTypeRepr")]
pub enum LoadType {
    #[default]
    ConstPower,
    ConstImpedance,
    ConstCurrent,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LoadTypeRepr {
    Code(u8),
    Name(String),
}

impl TryFrom<LoadTypeRepr> for LoadType {
    type Error = String;

    fn try_from(repr: LoadTypeRepr) -> Result<Self, Self::Error> {
        match repr {
            LoadTypeRepr::Code(0) => Ok(LoadType::ConstPower),
            LoadTypeRepr::Code(1) => Ok(LoadType::ConstImpedance),
            LoadTypeRepr::Code(2) => Ok(LoadType::ConstCurrent),
            LoadTypeRepr::Name(name) => match name.as_str() {
                "const_power" => Ok(LoadType::ConstPower),
                "const_impedance" => Ok(LoadType::ConstImpedance),
                "const_current" => Ok(LoadType::ConstCurrent),
                _ => Err(format!("unknown load type '{name}'")),
            },
            LoadTypeRepr::Code(code) => Err(format!("unknown load type code {code}")),
        }
    }
}

/// Represents a symmetric load connected to one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymLoad {
    pub id: ElementId,
    pub node: ElementId,
    #[serde(default = "energized")]
    pub status: u8,
    #[serde(rename = "type", default)]
    pub load_type: LoadType,
    /// Consumed active power (W).
    #[serde(default)]
    pub p_specified: f64,
    /// Consumed reactive power (var).
    #[serde(default)]
    pub q_specified: f64,
}

/// Represents an ideal voltage source acting as the slack node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: ElementId,
    pub node: ElementId,
    #[serde(default = "energized")]
    pub status: u8,
    /// Reference voltage magnitude (p.u.).
    #[serde(default = "unit_voltage")]
    pub u_ref: f64,
}

fn unit_voltage() -> f64 {
    1.0
}

/// Element-keyed static input dataset.
///
/// Element kinds other than the four below are rejected when reading, since
/// dropping one would silently change the topology.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputDataset {
    #[serde(default)]
    pub node: Vec<Node>,
    #[serde(default)]
    pub line: Vec<Line>,
    #[serde(default)]
    pub sym_load: Vec<SymLoad>,
    #[serde(default)]
    pub source: Vec<Source>,
}

impl InputDataset {
    /// Maps node IDs to their position in [`InputDataset::node`].
    pub fn node_lookup(&self) -> HashMap<ElementId, usize> {
        self.node
            .iter()
            .enumerate()
            .map(|(idx, n)| (n.id, idx))
            .collect()
    }

    /// Maps load IDs to their position in [`InputDataset::sym_load`].
    pub fn load_lookup(&self) -> HashMap<ElementId, usize> {
        self.sym_load
            .iter()
            .enumerate()
            .map(|(idx, l)| (l.id, idx))
            .collect()
    }

    /// All element IDs in declaration order, nodes first.
    pub fn element_ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.node
            .iter()
            .map(|n| n.id)
            .chain(self.line.iter().map(|l| l.id))
            .chain(self.sym_load.iter().map(|l| l.id))
            .chain(self.source.iter().map(|s| s.id))
    }
}
