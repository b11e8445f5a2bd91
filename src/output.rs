//! Console rendering of the derived tables as Markdown tables.

use crate::types::Record;
use tabled::builder::Builder;
use tabled::{settings::Style, Table, Tabled};

/// Print a titled preview of up to `max_rows` rows of a derived table.
pub fn preview_table<T>(title: &str, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}", title);
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}", table_str);
    if rows.len() > max_rows {
        println!("... ({} more rows)", rows.len() - max_rows);
    }
    println!();
}

/// Print raw records under their own file headers. Used for the first-rows
/// preview after a load; columns come from the file, not from a fixed shape.
pub fn preview_records(title: &str, records: &[Record], max_rows: usize) {
    println!("{}", title);
    let Some(first) = records.first() else {
        println!("(no rows)\n");
        return;
    };
    let mut builder = Builder::default();
    builder.push_record(first.schema().names().iter().cloned());
    for record in records.iter().take(max_rows) {
        builder.push_record(record.cells().iter().map(|c| c.to_string()));
    }
    let table_str = builder.build().with(Style::markdown()).to_string();
    println!("{}", table_str);
    if records.len() > max_rows {
        println!("... ({} more rows)", records.len() - max_rows);
    }
    println!();
}
