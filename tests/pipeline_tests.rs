use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use cafm_report::export::{build_export_tables, write_csv_report};
use cafm_report::loader::load_sheet;
use cafm_report::reports::build_snapshot;
use cafm_report::types::{Cell, OperativeRow, PivotRow, Regime};

fn unique_temp_path(name: &str, ext: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("cafm-report-{name}-{stamp}.{ext}"))
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn text_rows(rows: &[&[&str]]) -> Vec<Vec<Cell>> {
    rows.iter()
        .map(|row| row.iter().map(|c| Cell::Text(c.to_string())).collect())
        .collect()
}

#[test]
fn operative_scenario_produces_exact_table() {
    let h = headers(&["Priority Code", "Operative", "Status"]);
    let rows = text_rows(&[
        &["P11", "Alice", "Completed"],
        &["P11", "Bob", "Started"],
        &["P11", "Alice", "RTS"],
    ]);
    let snap = build_snapshot(&h, &rows);

    let expect = |operative: &str, total, completed, pending| OperativeRow {
        operative: operative.to_string(),
        total,
        completed,
        pending,
    };
    assert_eq!(
        snap.operative_table,
        vec![
            expect("Alice", 2, 2, 0),
            expect("Bob", 1, 0, 1),
            expect("Grand Total", 3, 2, 1),
        ]
    );
    assert!(snap.pivot_tables.is_empty());
}

#[test]
fn workflow_scenario_produces_exact_pivot() {
    let h = headers(&["Priority Code", "Workflow Status"]);
    let rows = text_rows(&[&["P12", "Open"], &["P12", "Open"], &["P12", "Closed"]]);
    let snap = build_snapshot(&h, &rows);

    assert_eq!(snap.priority.regime, Regime::Workflow);
    let expect = |status: &str, events| PivotRow {
        status: status.to_string(),
        events,
    };
    assert_eq!(snap.pivot_tables.len(), 1);
    assert_eq!(snap.pivot_tables[0].0, "P12");
    assert_eq!(
        snap.pivot_tables[0].1,
        vec![expect("Open", 2), expect("Closed", 1), expect("Grand Total", 3)]
    );
    assert!(snap.operative_table.is_empty());
}

#[test]
fn empty_input_yields_empty_artifacts() {
    let snap = build_snapshot(&headers(&["Priority Code", "Operative", "Status"]), &[]);
    assert!(snap.records.is_empty());
    assert!(snap.operative_table.is_empty());
    assert!(snap.pivot_tables.is_empty());
    assert!(snap.count_table.total.is_empty());
    for row in &snap.status_summary {
        assert_eq!(row.count, 0);
    }
}

#[test]
fn no_header_row_yields_empty_artifacts() {
    let snap = build_snapshot(&[], &text_rows(&[&["P11", "Alice", "Completed"]]));
    assert!(snap.is_empty());
}

#[test]
fn operative_grand_total_sums_all_columns() {
    let h = headers(&["Mob_Optr", "Status"]);
    let rows = text_rows(&[
        &["Alice", "Completed"],
        &["Bob", "Started"],
        &["Carol", "RTS"],
        &["Bob", "Due"],
        &["", "Completed"],
    ]);
    let snap = build_snapshot(&h, &rows);
    assert_eq!(snap.priority.regime, Regime::Operative);

    let (body, grand) = snap
        .operative_table
        .split_at(snap.operative_table.len() - 1);
    assert_eq!(grand[0].operative, "Grand Total");
    assert_eq!(grand[0].total, body.iter().map(|r| r.total).sum::<usize>());
    assert_eq!(
        grand[0].completed,
        body.iter().map(|r| r.completed).sum::<usize>()
    );
    assert_eq!(
        grand[0].pending,
        body.iter().map(|r| r.pending).sum::<usize>()
    );
    // Exhaustive split holds for every row including the grand total.
    for row in &snap.operative_table {
        assert_eq!(row.completed + row.pending, row.total);
    }
}

#[test]
fn pivot_grand_total_equals_group_size() {
    let h = headers(&["Priority Code", "Workflow Status"]);
    let rows = text_rows(&[
        &["P13", "Open"],
        &["P12", "Hold"],
        &["P13", "Open"],
        &["P13", "Closed"],
    ]);
    let snap = build_snapshot(&h, &rows);

    for (code, pivot) in &snap.pivot_tables {
        let (body, grand) = pivot.split_at(pivot.len() - 1);
        assert_eq!(grand[0].status, "Grand Total");
        let sum: usize = body.iter().map(|r| r.events).sum();
        assert_eq!(grand[0].events, sum);
        let input_count = rows
            .iter()
            .filter(|r| matches!(&r[0], Cell::Text(c) if c == code))
            .count();
        assert_eq!(grand[0].events, input_count);
    }
}

#[test]
fn rows_keep_first_seen_order() {
    let h = headers(&["Mob_Optr", "Status"]);
    let rows = text_rows(&[
        &["Zed", "Completed"],
        &["Amy", "Started"],
        &["Zed", "Due"],
        &["Mia", "Completed"],
    ]);
    let snap = build_snapshot(&h, &rows);
    let names: Vec<&str> = snap
        .operative_table
        .iter()
        .map(|r| r.operative.as_str())
        .collect();
    assert_eq!(names, vec!["Zed", "Amy", "Mia", "Grand Total"]);
}

#[test]
fn pipeline_is_idempotent() {
    let h = headers(&["Priority Code", "Workflow Status"]);
    let rows = text_rows(&[&["P12", "Open"], &["P14", "Hold"], &["P12", "Closed"]]);
    let a = build_snapshot(&h, &rows);
    let b = build_snapshot(&h, &rows);
    assert_eq!(a.status_summary, b.status_summary);
    assert_eq!(a.operative_table, b.operative_table);
    assert_eq!(a.pivot_tables, b.pivot_tables);
}

#[test]
fn export_refuses_empty_snapshot() {
    let snap = build_snapshot(&headers(&["Status"]), &[]);
    assert!(build_export_tables(&snap).is_err());
}

#[test]
fn export_tables_filter_total_row() {
    let h = headers(&["Mob_Optr", "Status"]);
    let rows = text_rows(&[&["Alice", "Completed"]]);
    let snap = build_snapshot(&h, &rows);
    let tables = build_export_tables(&snap).expect("non-empty snapshot should export");

    assert!(tables.status_summary.iter().all(|r| r.status != "Total"));
    assert_eq!(tables.status_summary.len(), 4);
    assert_eq!(tables.priority_label, "Other");
}

#[test]
fn csv_export_writes_sectioned_file() {
    let h = headers(&["Priority Code", "Mob_Optr", "Status"]);
    let rows = text_rows(&[
        &["P11", "Alice", "Completed"],
        &["P11", "Bob", "Started"],
    ]);
    let snap = build_snapshot(&h, &rows);
    let tables = build_export_tables(&snap).expect("non-empty snapshot should export");

    let path = unique_temp_path("export", "csv");
    write_csv_report(path.to_str().expect("temp path should be utf-8"), &tables)
        .expect("csv export should succeed");
    let contents = fs::read_to_string(&path).expect("export file should exist");
    let _ = fs::remove_file(&path);

    assert!(contents.contains("Status Summary"));
    assert!(contents.contains("Operative Summary"));
    assert!(contents.contains("Mob_Optr,No.of.PPM,Completed PPM,Pending PPM"));
    assert!(contents.contains("Grand Total,2,1,1"));
}

#[test]
fn csv_loader_round_trips_through_pipeline() {
    let path = unique_temp_path("load", "csv");
    fs::write(
        &path,
        "Priority Code,Operative,Status\nP11,Alice,Completed\nP11,,RTS\n,,\n",
    )
    .expect("temp csv should be writable");

    let (sheet, report) =
        load_sheet(path.to_str().expect("temp path should be utf-8")).expect("csv should load");
    let _ = fs::remove_file(&path);

    assert_eq!(sheet.headers, headers(&["Priority Code", "Operative", "Status"]));
    assert_eq!(report.total_rows, 3);
    assert_eq!(report.data_rows, 2);
    assert_eq!(report.blank_rows, 1);

    let snap = build_snapshot(&sheet.headers, &sheet.rows);
    assert_eq!(snap.operative_table.last().map(|r| r.total), Some(2));
    assert_eq!(snap.operative_table[1].operative, "Not Assigned");
    assert_eq!(snap.count_table.completed.len(), 2); // "Completed" + RTS alias
}

#[test]
fn unsupported_extension_is_rejected_before_the_core() {
    let err = load_sheet("workorders.txt").expect_err("txt should be rejected");
    assert!(err.to_string().contains("Unsupported file type"));
}
