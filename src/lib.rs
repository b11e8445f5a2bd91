//! Work-order summary engine: decode a spreadsheet of maintenance records,
//! classify it by header shape, and derive status/operative/pivot summary
//! tables ready for rendering and export.

pub mod export;
pub mod loader;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;
