//! Locale-ambiguous number parsing.
//!
//! Spreadsheet exports mix `.` and `,` as thousands and decimal separators.
//! A comma is always decimal. Dots are resolved by the length of the last
//! dot-delimited group:
//!
//! | Input        | Value     |
//! |--------------|-----------|
//! | `10.000`     | `10000.0` |
//! | `10.5`       | `10.5`    |
//! | `10,00`      | `10.0`    |
//! | `1.234,56`   | `1234.56` |
//! | `10.`        | `10.0`    |

/// Parse a digit-group string into a number. `None` when the text is not
/// made of digits and separators in one of the accepted shapes.
pub fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let mut parts = raw.split(',');
    let integer = parts.next()?;
    let fraction = parts.next();
    if parts.next().is_some() {
        return None;
    }

    match fraction {
        Some(fraction) => {
            let whole: String = integer.split('.').collect();
            if !is_digits(&whole) || !is_digits(fraction) {
                return None;
            }
            format!("{whole}.{fraction}").parse().ok()
        }
        None => parse_dotted(integer),
    }
}

fn parse_dotted(text: &str) -> Option<f64> {
    let groups: Vec<&str> = text.split('.').collect();
    let (last, head) = groups.split_last()?;

    if head.is_empty() {
        return digits_value(last);
    }
    if last.is_empty() {
        return parse_dotted(&text[..text.len() - 1]);
    }
    if !head.iter().all(|g| g.chars().all(|c| c.is_ascii_digit())) {
        return None;
    }

    let whole: String = head.concat();
    if last.len() >= 3 {
        digits_value(&format!("{whole}{last}"))
    } else {
        if !is_digits(last) {
            return None;
        }
        let whole = if whole.is_empty() { "0".to_string() } else { whole };
        format!("{whole}.{last}").parse().ok()
    }
}

fn digits_value(text: &str) -> Option<f64> {
    if is_digits(text) {
        text.parse().ok()
    } else {
        None
    }
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}
