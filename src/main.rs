// Entry point and high-level CLI flow.
//
// - Option [1] loads a work-order file, runs the aggregation pipeline and
//   installs a fresh snapshot.
// - Option [2] previews the derived tables.
// - Option [3] exports the summaries as a sectioned CSV plus a JSON summary.
// - Option [4] discards the current snapshot.
//
// Loads are serialized by construction: the menu blocks until a file is
// fully decoded and aggregated before offering another action.

use cafm_report::{export, loader, output, reports, util};
use cafm_report::types::Snapshot;
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::Mutex;

const CSV_EXPORT_PATH: &str = "cafm_summary_export.csv";
const JSON_EXPORT_PATH: &str = "cafm_summary_export.json";
const PREVIEW_ROWS: usize = 10;

// Simple in-memory session state. The snapshot is replaced wholesale on each
// successful load and cleared on reset; a failed load leaves it untouched.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { snapshot: None }));

struct AppState {
    snapshot: Option<Snapshot>,
}

/// Read a single line of input after printing a prompt.
fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Handle option [1]: decode a file and rebuild all derived tables.
fn handle_load() {
    let path = read_line("File to load (.xlsx, .xls, .xlsm, .csv): ");
    if path.is_empty() {
        println!("No file given.\n");
        return;
    }
    match loader::load_sheet(&path) {
        Ok((sheet, report)) => {
            println!(
                "Processing file... ({} rows read, {} data rows)",
                util::format_int(report.total_rows as i64),
                util::format_int(report.data_rows as i64)
            );
            if report.blank_rows > 0 {
                println!(
                    "Note: {} blank rows skipped.",
                    util::format_int(report.blank_rows as i64)
                );
            }
            let snapshot = reports::build_snapshot(&sheet.headers, &sheet.rows);
            if let Some(label) = &snapshot.priority.code_label {
                println!("Detected priority-code column: {}", label);
            }
            println!();
            let mut state = APP_STATE.lock().unwrap();
            state.snapshot = Some(snapshot);
        }
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

/// Handle option [2]: print previews of every derived table.
fn handle_view() {
    let snapshot = {
        let state = APP_STATE.lock().unwrap();
        state.snapshot.clone()
    };
    let Some(snapshot) = snapshot else {
        println!("Error: No data loaded. Please load a file first (option 1).\n");
        return;
    };

    output::preview_records("Loaded Records", &snapshot.records, PREVIEW_ROWS);
    output::preview_table("Status Summary", &snapshot.status_summary, 5);

    if !snapshot.operative_table.is_empty() {
        output::preview_table("Operative Summary", &snapshot.operative_table, PREVIEW_ROWS);
    }
    let label = snapshot.priority.code_label.as_deref().unwrap_or("Other");
    for (code, pivot) in &snapshot.pivot_tables {
        let title = format!("{} Status ({})", label, code);
        output::preview_table(&title, pivot, PREVIEW_ROWS);
    }
}

/// Handle option [3]: write the CSV and JSON exports.
fn handle_export() {
    let snapshot = {
        let state = APP_STATE.lock().unwrap();
        state.snapshot.clone()
    };
    let Some(snapshot) = snapshot else {
        println!("Error: No data loaded. Please load a file first (option 1).\n");
        return;
    };

    let tables = match export::build_export_tables(&snapshot) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Export refused: {}\n", e);
            return;
        }
    };
    if let Err(e) = export::write_csv_report(CSV_EXPORT_PATH, &tables) {
        eprintln!("Write error: {}", e);
        return;
    }
    if let Err(e) = export::write_json_summary(JSON_EXPORT_PATH, &snapshot) {
        eprintln!("Write error: {}", e);
        return;
    }
    println!("Exports written to {} and {}\n", CSV_EXPORT_PATH, JSON_EXPORT_PATH);
}

/// Handle option [4]: drop all derived tables.
fn handle_reset() {
    let mut state = APP_STATE.lock().unwrap();
    state.snapshot = None;
    println!("Session reset.\n");
}

fn main() {
    loop {
        println!("CAFM Work Order Summary");
        println!("[1] Load file");
        println!("[2] View summaries");
        println!("[3] Export summaries (CSV + JSON)");
        println!("[4] Reset");
        println!("[5] Exit\n");
        match read_line("Enter choice: ").as_str() {
            "1" => handle_load(),
            "2" => handle_view(),
            "3" => handle_export(),
            "4" => handle_reset(),
            "5" => {
                println!("Exiting the program.");
                break;
            }
            _ => {
                println!("Invalid choice. Please enter 1-5.\n");
            }
        }
    }
}
