use num_format::{Locale, ToFormattedString};

/// Thousands-separated integer formatting for console diagnostics
/// (e.g., `9,855 rows loaded`).
pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
