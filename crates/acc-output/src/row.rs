//! Column layout of the accessibility table.

use acc_core::Mode;
use acc_grid::ResultRow;

pub const X_COLUMN:       &str = "x";
pub const Y_COLUMN:       &str = "y";
pub const DENSITY_COLUMN: &str = "population_density";

/// `x, y, <mode>..., population_density`.
pub fn accessibility_header(modes: &[Mode]) -> Vec<String> {
    let mut header = Vec::with_capacity(modes.len() + 3);
    header.push(X_COLUMN.to_owned());
    header.push(Y_COLUMN.to_owned());
    header.extend(modes.iter().map(|m| format!("{m}_accessibility")));
    header.push(DENSITY_COLUMN.to_owned());
    header
}

/// One CSV record; a value never computed is written as an empty field.
pub fn accessibility_record(row: &ResultRow<'_>) -> Vec<String> {
    let mut record = Vec::with_capacity(row.values.len() + 3);
    record.push(row.point.coord.x.to_string());
    record.push(row.point.coord.y.to_string());
    record.extend(row.values.iter().map(|v| v.map(|v| v.to_string()).unwrap_or_default()));
    record.push(row.population_density.to_string());
    record
}
