use std::{
    collections::{HashMap, VecDeque},
    f64::consts::PI,
};

use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CscMatrix};
use num_complex::Complex64;
use num_traits::{One, Zero};

use crate::{
    batch::LoadUpdate,
    model::{ElementId, InputDataset},
};

/// Per-unit equivalent of an energized line.
#[derive(Debug, Clone)]
pub(crate) struct LineBranch {
    /// Solver positions of the terminals.
    pub from: usize,
    pub to: usize,
    pub y_series: Complex64,
    /// Half of the total shunt admittance, placed at each terminal.
    pub y_shunt_half: Complex64,
    /// Current base (A).
    pub i_base: f64,
    pub i_n: f64,
}

/// Admittance matrix and bus bookkeeping derived once per batch.
///
/// Energized PQ buses occupy solver positions `0..npq`, slack buses follow.
/// Nodes that cannot reach a source through energized lines have no
/// position and are reported de-energized.
#[derive(Debug, Clone)]
pub(crate) struct NetworkMatrices {
    pub s_base: f64,
    pub npq: usize,
    pub ybus: CscMatrix<Complex64>,
    pub v_init: DVector<Complex64>,
    /// Node index -> solver position.
    pub node_pos: Vec<Option<usize>>,
    /// Line index -> branch, `None` when the line carries no current.
    pub branches: Vec<Option<LineBranch>>,
    /// Load id -> (solver position of its node, static p, static q), energized loads only.
    loads: HashMap<ElementId, (usize, f64, f64)>,
    /// Load ids in dataset order, for deterministic accumulation.
    load_order: Vec<ElementId>,
}

impl NetworkMatrices {
    pub fn build(input: &InputDataset, s_base: f64, frequency: f64) -> Self {
        let nodes = input.node_lookup();
        let n = input.node.len();

        let line_ends = |idx: usize| -> Option<(usize, usize)> {
            let line = &input.line[idx];
            if !line.is_energized() {
                return None;
            }
            Some((*nodes.get(&line.from_node)?, *nodes.get(&line.to_node)?))
        };

        let mut adjacency = vec![Vec::new(); n];
        for idx in 0..input.line.len() {
            if let Some((f, t)) = line_ends(idx) {
                adjacency[f].push(t);
                adjacency[t].push(f);
            }
        }

        // slack voltage per node, first energized source wins
        let mut slack: Vec<Option<f64>> = vec![None; n];
        for source in input.source.iter().filter(|s| s.status != 0) {
            if let Some(&idx) = nodes.get(&source.node) {
                slack[idx].get_or_insert(source.u_ref);
            }
        }

        let mut reachable = vec![false; n];
        let mut queue: VecDeque<usize> = (0..n).filter(|&i| slack[i].is_some()).collect();
        for &i in &queue {
            reachable[i] = true;
        }
        while let Some(i) = queue.pop_front() {
            for &j in &adjacency[i] {
                if !reachable[j] {
                    reachable[j] = true;
                    queue.push_back(j);
                }
            }
        }

        let mut node_pos = vec![None; n];
        let mut next = 0;
        for i in (0..n).filter(|&i| reachable[i] && slack[i].is_none()) {
            node_pos[i] = Some(next);
            next += 1;
        }
        let npq = next;
        for i in (0..n).filter(|&i| slack[i].is_some()) {
            node_pos[i] = Some(next);
            next += 1;
        }
        let n_bus = next;

        let mut v_init = DVector::from_element(n_bus, Complex64::new(1.0, 0.0));
        for (i, u_ref) in slack.iter().enumerate() {
            if let (Some(u_ref), Some(pos)) = (u_ref, node_pos[i]) {
                v_init[pos] = Complex64::new(*u_ref, 0.0);
            }
        }

        let mut coo = CooMatrix::new(n_bus, n_bus);
        for pos in 0..n_bus {
            coo.push(pos, pos, Complex64::zero());
        }
        let branches = (0..input.line.len())
            .map(|idx| {
                let (f, t) = line_ends(idx)?;
                let (from, to) = (node_pos[f]?, node_pos[t]?);
                let line = &input.line[idx];
                let u_base = input.node[f].u_rated;
                let z_base = u_base * u_base / s_base;
                let y_series = Complex64::one() / Complex64::new(line.r1, line.x1) * z_base;
                let y_shunt = 2.0 * PI * frequency * line.c1 * Complex64::new(line.tan1, 1.0) * z_base;
                let branch = LineBranch {
                    from,
                    to,
                    y_series,
                    y_shunt_half: y_shunt / 2.0,
                    i_base: s_base / (3f64.sqrt() * u_base),
                    i_n: line.i_n,
                };
                coo.push(from, from, y_series + branch.y_shunt_half);
                coo.push(to, to, y_series + branch.y_shunt_half);
                coo.push(from, to, -y_series);
                coo.push(to, from, -y_series);
                Some(branch)
            })
            .collect();

        let mut loads = HashMap::new();
        let mut load_order = Vec::new();
        for load in input.sym_load.iter().filter(|l| l.status != 0) {
            let Some(pos) = nodes.get(&load.node).and_then(|&i| node_pos[i]) else {
                continue;
            };
            loads.insert(load.id, (pos, load.p_specified, load.q_specified));
            load_order.push(load.id);
        }

        Self {
            s_base,
            npq,
            ybus: CscMatrix::from(&coo),
            v_init,
            node_pos,
            branches,
            loads,
            load_order,
        }
    }

    pub fn n_bus(&self) -> usize {
        self.v_init.len()
    }

    /// Specified bus injections in p.u. with `updates` overriding the static load values.
    pub fn sbus(&self, updates: &[LoadUpdate]) -> DVector<Complex64> {
        let overrides: HashMap<ElementId, &LoadUpdate> =
            updates.iter().map(|u| (u.id, u)).collect();
        let mut sbus = DVector::from_element(self.n_bus(), Complex64::zero());
        for id in &self.load_order {
            let (pos, p, q) = self.loads[id];
            let (p, q) = overrides
                .get(id)
                .map_or((p, q), |u| (u.p_specified, u.q_specified));
            sbus[pos] -= Complex64::new(p, q) / self.s_base;
        }
        sbus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testcases::{three_node_feeder, two_node};

    #[test]
    fn pq_buses_come_before_slack() {
        let m = NetworkMatrices::build(&three_node_feeder(), 1e6, 50.0);
        assert_eq!(m.npq, 2);
        assert_eq!(m.node_pos, vec![Some(2), Some(0), Some(1)]);
        assert_eq!(m.v_init[2], Complex64::new(1.05, 0.0));
        assert!(m.branches.iter().all(Option::is_some));
    }

    #[test]
    fn open_line_isolates_downstream_nodes() {
        let mut net = three_node_feeder();
        net.line[1].to_status = 0;
        let m = NetworkMatrices::build(&net, 1e6, 50.0);
        assert_eq!(m.npq, 1);
        assert_eq!(m.node_pos[2], None);
        assert!(m.branches[1].is_none());
        // the load on the isolated node is dropped
        let s = m.sbus(&[]);
        assert_eq!(s.len(), 2);
        assert!((s[0] - Complex64::new(-0.5, -0.1)).norm() < 1e-12);
    }

    #[test]
    fn updates_override_static_loads() {
        let m = NetworkMatrices::build(&two_node(), 1e6, 50.0);
        let s = m.sbus(&[LoadUpdate {
            id: 4,
            p_specified: 2e5,
            q_specified: -1e5,
        }]);
        assert!((s[0] - Complex64::new(-0.2, 0.1)).norm() < 1e-12);
        let s = m.sbus(&[]);
        assert!((s[0] - Complex64::new(-1.0, -0.2)).norm() < 1e-12);
    }

    #[test]
    fn series_admittance_is_per_unit() {
        let m = NetworkMatrices::build(&two_node(), 1e6, 50.0);
        let b = m.branches[0].as_ref().unwrap();
        // z_base = 100 ohm
        let expected = Complex64::new(100.0, 0.0) / Complex64::new(0.25, 0.2);
        assert!((b.y_series - expected).norm() < 1e-9);
        assert!((b.i_base - 1e6 / (3f64.sqrt() * 10e3)).abs() < 1e-9);
    }
}
