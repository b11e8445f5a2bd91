//! The classification-and-aggregation engine.
//!
//! Everything here is a pure function of (headers, rows); nothing holds state
//! across files, so a reload recomputes every table from scratch.

use crate::types::{
    Cell, OperativeRow, PivotRow, PriorityInfo, Record, Regime, Schema, Snapshot, StatusGroups,
    SummaryStats,
};
use std::collections::HashMap;
use std::sync::Arc;

const GRAND_TOTAL: &str = "Grand Total";
const NOT_ASSIGNED: &str = "Not Assigned";
const UNKNOWN: &str = "Unknown";

/// Zip raw value-rows against the header row positionally. Short rows pad
/// with `Cell::Empty`, extra trailing cells are dropped. No header row at all
/// means no data, not a fault.
pub fn normalize_records(headers: &[String], rows: &[Vec<Cell>]) -> Vec<Record> {
    if headers.is_empty() {
        return Vec::new();
    }
    let schema = Arc::new(Schema::new(headers.to_vec()));
    rows.iter()
        .map(|row| {
            let cells = (0..schema.len())
                .map(|i| row.get(i).cloned().unwrap_or(Cell::Empty))
                .collect();
            Record::new(Arc::clone(&schema), cells)
        })
        .collect()
}

/// Decide the aggregation regime from header shape alone. The same status
/// vocabulary appears in both regimes, so only the presence of an operative
/// column or a workflow-status column tells them apart. Matching is
/// deliberately permissive substring search to tolerate header variation.
///
/// When a file matches both shapes the operative regime wins.
pub fn detect_priority(headers: &[String]) -> PriorityInfo {
    let lower: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();

    let operative = lower
        .iter()
        .any(|h| h.contains("mob_optr") || h.contains("ppm"));
    let workflow = lower
        .iter()
        .any(|h| h.contains("wo status") || h.contains("work order") || h.contains("workflow"));

    let code_label = lower
        .iter()
        .position(|h| h.contains("priority") || h.contains("code"))
        .map(|i| headers[i].clone());

    let regime = if operative {
        Regime::Operative
    } else if workflow {
        Regime::Workflow
    } else {
        Regime::Fallback
    };

    PriorityInfo { regime, code_label }
}

/// The status string of one record: "Status" first, then "WO Status", first
/// non-empty wins. Empty string when neither column carries a value.
fn record_status(record: &Record) -> String {
    let primary = record.get("Status");
    if !primary.is_empty() {
        return primary.text();
    }
    record.get("WO Status").text()
}

/// Bucket records into the five fixed status groups. Keywords are tried in a
/// fixed order, so a status matching several resolves to the first. A status
/// exactly equal to "rts" (Returned to Service) is an alias for Completed and
/// skips the keyword pass. Records matching nothing stay in Total only.
pub fn partition_status_groups(records: &[Record]) -> StatusGroups {
    let mut groups = StatusGroups {
        total: records.to_vec(),
        ..StatusGroups::default()
    };

    for record in records {
        let status = record_status(record).to_lowercase();
        if status == "rts" {
            groups.completed.push(record.clone());
        } else if status.contains("complete") {
            groups.completed.push(record.clone());
        } else if status.contains("due") {
            groups.due.push(record.clone());
        } else if status.contains("report") {
            groups.reported.push(record.clone());
        } else if status.contains("start") {
            groups.started.push(record.clone());
        }
    }
    groups
}

/// Whether a record counts as serviced for operative performance tracking.
/// Unlike the group partitioner this is an exact match: only a fully
/// "Completed" (or RTS) work order counts, everything else is pending.
fn is_completed(status: &str) -> bool {
    status.eq_ignore_ascii_case("completed") || status.eq_ignore_ascii_case("rts")
}

/// One row per distinct operative in first-seen order, then a Grand Total
/// row. Every record lands in exactly one of completed/pending, so the two
/// always sum to the total column.
pub fn operative_summary(records: &[Record]) -> Vec<OperativeRow> {
    let operative_col = records
        .first()
        .and_then(|r| r.schema().find_containing(&["optr", "operative", "mob"]));

    let mut rows: Vec<OperativeRow> = Vec::new();
    let mut by_operative: HashMap<String, usize> = HashMap::new();

    for record in records {
        let operative = match operative_col {
            Some(i) if !record.at(i).is_empty() => record.at(i).text(),
            _ => NOT_ASSIGNED.to_string(),
        };
        let completed = is_completed(&record_status(record));

        let idx = *by_operative.entry(operative.clone()).or_insert_with(|| {
            rows.push(OperativeRow {
                operative,
                total: 0,
                completed: 0,
                pending: 0,
            });
            rows.len() - 1
        });
        let row = &mut rows[idx];
        row.total += 1;
        if completed {
            row.completed += 1;
        } else {
            row.pending += 1;
        }
    }

    if !rows.is_empty() {
        let grand = OperativeRow {
            operative: GRAND_TOTAL.to_string(),
            total: rows.iter().map(|r| r.total).sum(),
            completed: rows.iter().map(|r| r.completed).sum(),
            pending: rows.iter().map(|r| r.pending).sum(),
        };
        rows.push(grand);
    }
    rows
}

/// Per priority-code value, the (workflow status, count) pivot in first-seen
/// order, each closed by a Grand Total entry. Priority-code groups themselves
/// keep first-seen order across the whole input.
pub fn workflow_pivots(records: &[Record]) -> Vec<(String, Vec<PivotRow>)> {
    let schema = match records.first() {
        Some(r) => r.schema(),
        None => return Vec::new(),
    };
    let code_col = schema.find_containing(&["priority", "code"]);
    let status_col = schema.find_containing(&["workflow", "wo status", "work order"]);

    let mut groups: Vec<(String, Vec<PivotRow>)> = Vec::new();
    let mut group_index: HashMap<String, usize> = HashMap::new();
    // (group, status) -> row position within that group
    let mut row_index: HashMap<(usize, String), usize> = HashMap::new();

    for record in records {
        let code = match code_col {
            Some(i) if !record.at(i).is_empty() => record.at(i).text(),
            _ => UNKNOWN.to_string(),
        };
        let status = match status_col {
            Some(i) if !record.at(i).is_empty() => record.at(i).text(),
            _ => UNKNOWN.to_string(),
        };

        let g = *group_index.entry(code.clone()).or_insert_with(|| {
            groups.push((code, Vec::new()));
            groups.len() - 1
        });
        let rows = &mut groups[g].1;
        match row_index.entry((g, status.clone())) {
            std::collections::hash_map::Entry::Occupied(e) => {
                rows[*e.get()].events += 1;
            }
            std::collections::hash_map::Entry::Vacant(e) => {
                e.insert(rows.len());
                rows.push(PivotRow { status, events: 1 });
            }
        }
    }

    for (_, rows) in groups.iter_mut() {
        let sum = rows.iter().map(|r| r.events).sum();
        rows.push(PivotRow {
            status: GRAND_TOTAL.to_string(),
            events: sum,
        });
    }
    groups
}

/// Run the whole pipeline for one file. The returned snapshot is complete
/// and self-contained; callers install it wholesale or not at all.
pub fn build_snapshot(headers: &[String], rows: &[Vec<Cell>]) -> Snapshot {
    let records = normalize_records(headers, rows);
    let priority = detect_priority(headers);

    let (count_table, operative_table, pivot_tables) = match priority.regime {
        Regime::Operative | Regime::Fallback => (
            partition_status_groups(&records),
            operative_summary(&records),
            Vec::new(),
        ),
        Regime::Workflow => (
            StatusGroups::totals_only(&records),
            Vec::new(),
            workflow_pivots(&records),
        ),
    };

    let status_summary = count_table.summary();
    Snapshot {
        records,
        priority,
        count_table,
        status_summary,
        operative_table,
        pivot_tables,
    }
}

/// Headline numbers for the JSON export.
pub fn generate_summary(snapshot: &Snapshot) -> SummaryStats {
    let operatives = snapshot
        .operative_table
        .iter()
        .filter(|r| r.operative != GRAND_TOTAL)
        .count();
    SummaryStats {
        generated_at: chrono::Utc::now().to_rfc3339(),
        total_records: snapshot.records.len(),
        completed: snapshot.count_table.completed.len(),
        due: snapshot.count_table.due.len(),
        reported: snapshot.count_table.reported.len(),
        started: snapshot.count_table.started.len(),
        operatives,
        priority_codes: snapshot.pivot_tables.len(),
        priority_code_label: snapshot.priority.code_label.clone(),
    }
}
