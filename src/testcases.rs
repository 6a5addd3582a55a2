//! Small networks and time axes shared by the unit tests.
use chrono::{NaiveDate, NaiveDateTime};

use crate::model::{InputDataset, Line, LoadType, Node, Source, SymLoad};

/// Hourly timestamps starting at 2024-01-01 00:00.
pub(crate) fn hours(n: usize) -> Vec<NaiveDateTime> {
    let t0 = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..n)
        .map(|h| t0 + chrono::Duration::hours(h as i64))
        .collect()
}

fn line(id: i64, from_node: i64, to_node: i64) -> Line {
    Line {
        id,
        from_node,
        to_node,
        from_status: 1,
        to_status: 1,
        r1: 0.25,
        x1: 0.2,
        c1: 10e-9,
        tan1: 0.0,
        i_n: 1000.0,
    }
}

fn load(id: i64, node: i64, p: f64, q: f64) -> SymLoad {
    SymLoad {
        id,
        node,
        status: 1,
        load_type: LoadType::ConstPower,
        p_specified: p,
        q_specified: q,
    }
}

/// Source on node 1, line 3 to node 2, load 4 on node 2. 10 kV.
pub(crate) fn two_node() -> InputDataset {
    InputDataset {
        node: vec![Node { id: 1, u_rated: 10e3 }, Node { id: 2, u_rated: 10e3 }],
        line: vec![line(3, 1, 2)],
        sym_load: vec![load(4, 2, 1e6, 2e5)],
        source: vec![Source {
            id: 5,
            node: 1,
            status: 1,
            u_ref: 1.0,
        }],
    }
}

/// Radial feeder 1 - 2 - 3 fed at node 1, with loads on nodes 2 and 3.
pub(crate) fn three_node_feeder() -> InputDataset {
    InputDataset {
        node: vec![
            Node { id: 1, u_rated: 10e3 },
            Node { id: 2, u_rated: 10e3 },
            Node { id: 3, u_rated: 10e3 },
        ],
        line: vec![line(4, 1, 2), line(5, 2, 3)],
        sym_load: vec![load(6, 2, 5e5, 1e5), load(7, 3, 5e5, 1e5)],
        source: vec![Source {
            id: 8,
            node: 1,
            status: 1,
            u_ref: 1.05,
        }],
    }
}
