//! Record Filter Module
//! Selects the records of one country (or any other column value).

use super::table::Table;

/// Keep the records whose `col` cell equals `target`, ignoring case.
///
/// The header is always retained. Records too short to have `col` are dropped.
pub fn filter_by_value(table: &Table, col: usize, target: &str) -> Table {
    let target = target.to_lowercase();
    let records = table
        .records
        .iter()
        .filter(|row| {
            row.get(col)
                .map(|cell| cell.to_lowercase() == target)
                .unwrap_or(false)
        })
        .cloned()
        .collect();

    let filtered = table.with_records(records);
    log::debug!(
        "Filter column {} == {:?}: kept {} of {} records",
        col,
        target,
        filtered.len(),
        table.len()
    );
    filtered
}
