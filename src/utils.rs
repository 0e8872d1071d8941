/// Comparison key for a cell. Missing cells compare as the empty string.
pub fn normalize(cell: Option<&str>) -> String {
    cell.unwrap_or_default().trim().to_lowercase()
}

/// Position of `name` in `header`, ignoring case and surrounding whitespace.
///
/// The first matching column wins.
pub fn resolve_column<S: AsRef<str>>(header: &[S], name: &str) -> Option<usize> {
    let target = normalize(Some(name));

    header
        .iter()
        .position(|column| normalize(Some(column.as_ref())) == target)
}
