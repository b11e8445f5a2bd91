use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tabled::Tabled;

/// A single cell as handed over by the decoder. Numbers are kept as `f64`
/// because that is what spreadsheet cells actually carry; blank cells are a
/// real value, not an absence.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Trimmed textual form used by the aggregators for key/status matching.
    pub fn text(&self) -> String {
        self.to_string().trim().to_string()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            // Whole numbers print without the trailing ".0" so they read the
            // same as their spreadsheet rendering.
            Cell::Number(n) if n.fract() == 0.0 => write!(f, "{}", *n as i64),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Empty => Ok(()),
        }
    }
}

/// Column layout discovered from the header row of one file. Lookup is
/// case-insensitive; when the file carries duplicate header names the last
/// occurrence wins.
#[derive(Debug, Default)]
pub struct Schema {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Schema {
    pub fn new(names: Vec<String>) -> Self {
        let mut index = HashMap::new();
        for (i, name) in names.iter().enumerate() {
            index.insert(name.trim().to_lowercase(), i);
        }
        Schema { names, index }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Position of an exactly named column (case-insensitive).
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(&name.trim().to_lowercase()).copied()
    }

    /// First column whose name contains any of the needles, in header order.
    /// This is how the classifier and aggregators tolerate header variation
    /// across source spreadsheets ("Mob_Optr" vs "Operative", etc.).
    pub fn find_containing(&self, needles: &[&str]) -> Option<usize> {
        self.names.iter().position(|name| {
            let lower = name.to_lowercase();
            needles.iter().any(|n| lower.contains(n))
        })
    }
}

/// One normalized data row. Every schema column is present; cells a short raw
/// row did not provide are `Cell::Empty`. Aggregators rely on this and never
/// have to handle a missing field.
#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<Schema>,
    cells: Vec<Cell>,
}

const EMPTY: Cell = Cell::Empty;

impl Record {
    pub fn new(schema: Arc<Schema>, cells: Vec<Cell>) -> Self {
        debug_assert_eq!(schema.len(), cells.len());
        Record { schema, cells }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn at(&self, idx: usize) -> &Cell {
        self.cells.get(idx).unwrap_or(&EMPTY)
    }

    /// Cell under an exactly named column; `Empty` when the column does not
    /// exist in this file at all.
    pub fn get(&self, name: &str) -> &Cell {
        match self.schema.position(name) {
            Some(i) => self.at(i),
            None => &EMPTY,
        }
    }
}

/// Which aggregation applies to a loaded file, decided from headers alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    /// P11/P15-style data carrying an operative column.
    Operative,
    /// Other priority codes carrying a workflow-status column.
    Workflow,
    /// Neither shape detected; the operative aggregation applies anyway.
    Fallback,
}

#[derive(Debug, Clone)]
pub struct PriorityInfo {
    pub regime: Regime,
    /// Name of the detected priority-code column, if any.
    pub code_label: Option<String>,
}

impl Default for PriorityInfo {
    fn default() -> Self {
        PriorityInfo {
            regime: Regime::Fallback,
            code_label: None,
        }
    }
}

/// The five fixed status buckets. The four named buckets are a lossy
/// categorical view; `total` always holds the whole input and is the
/// denominator.
#[derive(Debug, Clone, Default)]
pub struct StatusGroups {
    pub completed: Vec<Record>,
    pub due: Vec<Record>,
    pub reported: Vec<Record>,
    pub started: Vec<Record>,
    pub total: Vec<Record>,
}

impl StatusGroups {
    /// Workflow-regime shape: four empty buckets, Total = everything.
    pub fn totals_only(records: &[Record]) -> Self {
        StatusGroups {
            total: records.to_vec(),
            ..StatusGroups::default()
        }
    }

    /// Counts in the fixed presentation order, Total last.
    pub fn summary(&self) -> Vec<StatusCountRow> {
        [
            ("Completed", &self.completed),
            ("Due", &self.due),
            ("Reported", &self.reported),
            ("Started", &self.started),
            ("Total", &self.total),
        ]
        .iter()
        .map(|(name, bucket)| StatusCountRow {
            status: name.to_string(),
            count: bucket.len(),
        })
        .collect()
    }
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq, Eq)]
pub struct StatusCountRow {
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq, Eq)]
pub struct OperativeRow {
    #[serde(rename = "Mob_Optr")]
    #[tabled(rename = "Mob_Optr")]
    pub operative: String,
    #[serde(rename = "No.of.PPM")]
    #[tabled(rename = "No.of.PPM")]
    pub total: usize,
    #[serde(rename = "Completed PPM")]
    #[tabled(rename = "Completed PPM")]
    pub completed: usize,
    #[serde(rename = "Pending PPM")]
    #[tabled(rename = "Pending PPM")]
    pub pending: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq, Eq)]
pub struct PivotRow {
    #[serde(rename = "WO Status")]
    #[tabled(rename = "WO Status")]
    pub status: String,
    #[serde(rename = "No.of.Events")]
    #[tabled(rename = "No.of.Events")]
    pub events: usize,
}

/// Everything derived from one loaded file. Built in full by
/// `reports::build_snapshot` and installed atomically; a failed load never
/// leaves a partially updated snapshot behind.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub records: Vec<Record>,
    pub priority: PriorityInfo,
    pub count_table: StatusGroups,
    pub status_summary: Vec<StatusCountRow>,
    pub operative_table: Vec<OperativeRow>,
    /// Per priority-code value, in first-seen order across the input.
    pub pivot_tables: Vec<(String, Vec<PivotRow>)>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub generated_at: String,
    pub total_records: usize,
    pub completed: usize,
    pub due: usize,
    pub reported: usize,
    pub started: usize,
    pub operatives: usize,
    pub priority_codes: usize,
    pub priority_code_label: Option<String>,
}
