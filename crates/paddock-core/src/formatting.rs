/// Format a count with thousands separators.
///
/// # Examples
///
/// ```
/// use paddock_core::formatting::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(999), "999");
/// assert_eq!(format_count(1234567), "1,234,567");
/// ```
pub fn format_count(value: usize) -> String {
    group_thousands(&value.to_string())
}

/// Render `count` followed by `noun`, adding an `s` unless the count is one.
///
/// # Examples
///
/// ```
/// use paddock_core::formatting::pluralize;
///
/// assert_eq!(pluralize(1, "folder"), "1 folder");
/// assert_eq!(pluralize(0, "table"), "0 tables");
/// assert_eq!(pluralize(12_500, "row"), "12,500 rows");
/// ```
pub fn pluralize(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", format_count(count), noun)
    } else {
        format!("{} {}s", format_count(count), noun)
    }
}

fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count_small() {
        assert_eq!(format_count(7), "7");
        assert_eq!(format_count(100), "100");
    }

    #[test]
    fn test_format_count_thousands() {
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(48_213), "48,213");
    }

    #[test]
    fn test_pluralize_singular_and_plural() {
        assert_eq!(pluralize(1, "driver"), "1 driver");
        assert_eq!(pluralize(2, "driver"), "2 drivers");
    }
}
