use nalgebra::DVector;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use super::ybus::NetworkMatrices;
use crate::model::{ElementId, InputDataset};

/// Node result of one timestep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeOutput {
    pub id: ElementId,
    pub energized: bool,
    /// Voltage magnitude (p.u.).
    pub u_pu: f64,
    /// Voltage magnitude (V).
    pub u: f64,
    /// Voltage angle (rad).
    pub u_angle: f64,
    /// Active power injected into the network (W).
    pub p: f64,
    /// Reactive power injected into the network (var).
    pub q: f64,
}

/// Line result of one timestep.
///
/// `p_from`/`p_to` are measured into the line at each terminal, so the
/// active loss is `p_from + p_to`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LineOutput {
    pub id: ElementId,
    pub energized: bool,
    /// `max(i_from, i_to) / i_n`.
    pub loading: f64,
    pub p_from: f64,
    pub q_from: f64,
    pub i_from: f64,
    pub s_from: f64,
    pub p_to: f64,
    pub q_to: f64,
    pub i_to: f64,
    pub s_to: f64,
}

impl LineOutput {
    /// Active power loss (W).
    pub fn loss(&self) -> f64 {
        self.p_from + self.p_to
    }
}

/// Per-timestep results of a batch, `node[t][i]` / `line[t][k]` in dataset order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchOutput {
    pub node: Vec<Vec<NodeOutput>>,
    pub line: Vec<Vec<LineOutput>>,
}

impl BatchOutput {
    pub fn with_capacity(n_timesteps: usize) -> Self {
        Self {
            node: Vec::with_capacity(n_timesteps),
            line: Vec::with_capacity(n_timesteps),
        }
    }

    pub fn n_timesteps(&self) -> usize {
        self.node.len()
    }

    pub fn push(&mut self, node: Vec<NodeOutput>, line: Vec<LineOutput>) {
        self.node.push(node);
        self.line.push(line);
    }
}

/// Converts converged p.u. voltages into node results.
pub(crate) fn node_results(
    input: &InputDataset,
    mats: &NetworkMatrices,
    v: &DVector<Complex64>,
) -> Vec<NodeOutput> {
    let s_bus = v
        .component_mul(&(&mats.ybus * v).conjugate())
        .map(|s| s * mats.s_base);
    input
        .node
        .iter()
        .zip(&mats.node_pos)
        .map(|(node, pos)| match pos {
            Some(pos) => NodeOutput {
                id: node.id,
                energized: true,
                u_pu: v[*pos].norm(),
                u: v[*pos].norm() * node.u_rated,
                u_angle: v[*pos].arg(),
                p: s_bus[*pos].re,
                q: s_bus[*pos].im,
            },
            None => NodeOutput {
                id: node.id,
                ..Default::default()
            },
        })
        .collect()
}

/// Converts converged p.u. voltages into terminal flows of every line.
pub(crate) fn line_results(
    input: &InputDataset,
    mats: &NetworkMatrices,
    v: &DVector<Complex64>,
) -> Vec<LineOutput> {
    input
        .line
        .iter()
        .zip(&mats.branches)
        .map(|(line, branch)| {
            let Some(b) = branch else {
                return LineOutput {
                    id: line.id,
                    ..Default::default()
                };
            };
            let (v_f, v_t) = (v[b.from], v[b.to]);
            let i_f = b.y_series * (v_f - v_t) + b.y_shunt_half * v_f;
            let i_t = b.y_series * (v_t - v_f) + b.y_shunt_half * v_t;
            let s_f = v_f * i_f.conj() * mats.s_base;
            let s_t = v_t * i_t.conj() * mats.s_base;
            let i_from = i_f.norm() * b.i_base;
            let i_to = i_t.norm() * b.i_base;
            LineOutput {
                id: line.id,
                energized: true,
                loading: i_from.max(i_to) / b.i_n,
                p_from: s_f.re,
                q_from: s_f.im,
                i_from,
                s_from: s_f.norm(),
                p_to: s_t.re,
                q_to: s_t.im,
                i_to,
                s_to: s_t.norm(),
            }
        })
        .collect()
}
