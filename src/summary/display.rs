use std::fmt;

use tabled::{Table, Tabled, settings::Style};

use super::{LineSummaryRow, LineSummaryTable, NodeSummaryRow, NodeSummaryTable};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Printed row of the node voltage table, voltages rounded to 5 decimals.
#[derive(Debug, Tabled)]
struct NodeRowDisplay {
    timestamp: String,
    max_id: i64,
    max_pu: String,
    min_id: i64,
    min_pu: String,
}

impl From<&NodeSummaryRow> for NodeRowDisplay {
    fn from(row: &NodeSummaryRow) -> Self {
        Self {
            timestamp: row.timestamp.format(TIME_FORMAT).to_string(),
            max_id: row.max_id,
            max_pu: format!("{:.5}", row.max_pu),
            min_id: row.min_id,
            min_pu: format!("{:.5}", row.min_pu),
        }
    }
}

/// Printed row of the line loading table, loading to 4 decimals and energy to 3.
#[derive(Debug, Tabled)]
struct LineRowDisplay {
    line_id: i64,
    max_time: String,
    max_loading: String,
    min_time: String,
    min_loading: String,
    energy_loss_kwh: String,
}

impl From<&LineSummaryRow> for LineRowDisplay {
    fn from(row: &LineSummaryRow) -> Self {
        Self {
            line_id: row.line_id,
            max_time: row.max_time.format(TIME_FORMAT).to_string(),
            max_loading: format!("{:.4}", row.max_loading),
            min_time: row.min_time.format(TIME_FORMAT).to_string(),
            min_loading: format!("{:.4}", row.min_loading),
            energy_loss_kwh: format!("{:.3}", row.energy_loss_kwh),
        }
    }
}

impl fmt::Display for NodeSummaryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = Table::new(self.rows.iter().map(NodeRowDisplay::from))
            .with(Style::markdown())
            .to_string();
        f.write_str(&table)
    }
}

impl fmt::Display for LineSummaryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = Table::new(self.rows.iter().map(LineRowDisplay::from))
            .with(Style::markdown())
            .to_string();
        f.write_str(&table)
    }
}
