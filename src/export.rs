//! Export boundary: shape the snapshot into the fixed-column tables the
//! writers consume, and the writers themselves (sectioned CSV and a JSON
//! summary). Exporting an empty snapshot is refused up front so no empty
//! files are ever produced.

use crate::reports::generate_summary;
use crate::types::{OperativeRow, PivotRow, Snapshot, StatusCountRow};
use serde::Serialize;
use std::error::Error;

pub const STATUS_SUMMARY_HEADER: [&str; 2] = ["Status", "Count"];
pub const OPERATIVE_HEADER: [&str; 4] = ["Mob_Optr", "No.of.PPM", "Completed PPM", "Pending PPM"];
pub const PIVOT_HEADER: [&str; 2] = ["WO Status", "No.of.Events"];

/// The complete input contract for any export writer. Writers never see raw
/// records, only these tables and the priority-code label.
#[derive(Debug, Clone)]
pub struct ExportTables {
    /// Status counts with the Total row filtered out; Total is a denominator
    /// for the on-screen view, not an export row.
    pub status_summary: Vec<StatusCountRow>,
    pub operative: Vec<OperativeRow>,
    pub pivots: Vec<(String, Vec<PivotRow>)>,
    pub priority_label: String,
}

/// Build the export tables, refusing when there is nothing to export.
pub fn build_export_tables(snapshot: &Snapshot) -> Result<ExportTables, Box<dyn Error>> {
    if snapshot.is_empty() {
        return Err("No data loaded; nothing to export.".into());
    }
    let status_summary = snapshot
        .status_summary
        .iter()
        .filter(|row| row.status != "Total")
        .cloned()
        .collect();
    Ok(ExportTables {
        status_summary,
        operative: snapshot.operative_table.clone(),
        pivots: snapshot.pivot_tables.clone(),
        priority_label: snapshot
            .priority
            .code_label
            .clone()
            .unwrap_or_else(|| "Other".to_string()),
    })
}

/// Write one sectioned CSV file: a title line, a header line and the rows for
/// each non-empty table, sections separated by a blank line.
pub fn write_csv_report(path: &str, tables: &ExportTables) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_path(path)?;

    let mut first = true;
    let mut section = |wtr: &mut csv::Writer<std::fs::File>,
                       title: &str,
                       header: &[&str],
                       rows: &[Vec<String>]|
     -> Result<(), Box<dyn Error>> {
        if !first {
            wtr.write_record([""])?;
        }
        first = false;
        wtr.write_record([title])?;
        wtr.write_record(header)?;
        for row in rows {
            wtr.write_record(row)?;
        }
        Ok(())
    };

    if !tables.status_summary.is_empty() {
        let rows: Vec<Vec<String>> = tables
            .status_summary
            .iter()
            .map(|r| vec![r.status.clone(), r.count.to_string()])
            .collect();
        section(&mut wtr, "Status Summary", &STATUS_SUMMARY_HEADER, &rows)?;
    }

    if !tables.operative.is_empty() {
        let rows: Vec<Vec<String>> = tables
            .operative
            .iter()
            .map(|r| {
                vec![
                    r.operative.clone(),
                    r.total.to_string(),
                    r.completed.to_string(),
                    r.pending.to_string(),
                ]
            })
            .collect();
        section(&mut wtr, "Operative Summary", &OPERATIVE_HEADER, &rows)?;
    }

    for (code, pivot) in &tables.pivots {
        let rows: Vec<Vec<String>> = pivot
            .iter()
            .map(|r| vec![r.status.clone(), r.events.to_string()])
            .collect();
        let title = format!("{} Status ({})", tables.priority_label, code);
        section(&mut wtr, &title, &PIVOT_HEADER, &rows)?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Write the JSON headline summary next to the CSV export.
pub fn write_json_summary(path: &str, snapshot: &Snapshot) -> Result<(), Box<dyn Error>> {
    write_json(path, &generate_summary(snapshot))
}
