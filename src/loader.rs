//! File decoding: turn a spreadsheet or CSV file into a header row plus raw
//! value-rows. Everything downstream works on the decoded shape only, so a
//! bad file is rejected here and never reaches the aggregation pipeline.

use crate::types::Cell;
use calamine::Reader;
use csv::ReaderBuilder;
use std::error::Error;
use std::path::Path;

/// Decoded contents of one file: the header row and the data rows, in file
/// order. Rows may be shorter or longer than the header row; the normalizer
/// squares that off.
#[derive(Debug, Clone)]
pub struct SheetData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub data_rows: usize,
    pub blank_rows: usize,
}

/// Decode a file by extension: `.xlsx`/`.xls`/`.xlsm` via calamine, `.csv`
/// via the csv crate. Anything else is rejected up front.
pub fn load_sheet(path: &str) -> Result<(SheetData, LoadReport), Box<dyn Error>> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "xlsx" | "xls" | "xlsm" => load_excel(path),
        "csv" => load_csv(path),
        other => Err(format!(
            "Unsupported file type: .{}. Supported: .xlsx, .xls, .xlsm, .csv",
            other
        )
        .into()),
    }
}

fn cell_from_data(data: &calamine::Data) -> Cell {
    match data {
        calamine::Data::Empty => Cell::Empty,
        calamine::Data::String(s) if s.trim().is_empty() => Cell::Empty,
        calamine::Data::String(s) => Cell::Text(s.clone()),
        calamine::Data::Float(f) => Cell::Number(*f),
        calamine::Data::Int(i) => Cell::Number(*i as f64),
        calamine::Data::Bool(b) => Cell::Text(b.to_string()),
        other => Cell::Text(other.to_string()),
    }
}

fn load_excel(path: &str) -> Result<(SheetData, LoadReport), Box<dyn Error>> {
    let mut workbook = calamine::open_workbook_auto(path)?;
    let names = workbook.sheet_names();
    let sheet_name = names.first().ok_or("Workbook has no sheets")?.clone();
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = match rows_iter.next() {
        Some(row) => row.iter().map(|c| cell_from_data(c).text()).collect(),
        None => Vec::new(),
    };

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    let mut blank_rows = 0usize;
    let mut total_rows = 0usize;
    for row in rows_iter {
        total_rows += 1;
        let cells: Vec<Cell> = row.iter().map(cell_from_data).collect();
        if cells.iter().all(|c| c.is_empty()) {
            blank_rows += 1;
            continue;
        }
        rows.push(cells);
    }

    let report = LoadReport {
        total_rows,
        data_rows: rows.len(),
        blank_rows,
    };
    Ok((SheetData { headers, rows }, report))
}

fn load_csv(path: &str) -> Result<(SheetData, LoadReport), Box<dyn Error>> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_path(path)?;

    let mut headers: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<Cell>> = Vec::new();
    let mut blank_rows = 0usize;
    let mut total_rows = 0usize;

    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        if i == 0 {
            headers = record.iter().map(|f| f.trim().to_string()).collect();
            continue;
        }
        total_rows += 1;
        let cells: Vec<Cell> = record
            .iter()
            .map(|f| {
                if f.trim().is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(f.to_string())
                }
            })
            .collect();
        if cells.iter().all(|c| c.is_empty()) {
            blank_rows += 1;
            continue;
        }
        rows.push(cells);
    }

    let report = LoadReport {
        total_rows,
        data_rows: rows.len(),
        blank_rows,
    };
    Ok((SheetData { headers, rows }, report))
}
