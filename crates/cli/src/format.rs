//! Console formatting helpers.

/// Group digits in threes: `1234567` -> `1,234,567`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Whole-dollar currency: `500000.0` -> `$500,000`.
pub fn currency(value: f64) -> String {
    let rounded = value.abs().round() as u64;
    if value < 0.0 && rounded > 0 {
        format!("-${}", group_thousands(rounded))
    } else {
        format!("${}", group_thousands(rounded))
    }
}

/// Optional amount, dash when absent or zero.
pub fn currency_or_dash(value: Option<f64>) -> String {
    match value {
        Some(v) if v != 0.0 => currency(v),
        _ => "—".to_string(),
    }
}

/// Percentage with the given precision: `0.0725` -> `7.25%`.
pub fn percent(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_currency() {
        assert_eq!(currency(500_000.0), "$500,000");
        assert_eq!(currency(1499.6), "$1,500");
        assert_eq!(currency(-250.0), "-$250");
        assert_eq!(currency_or_dash(None), "—");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0.0725, 2), "7.25%");
        assert_eq!(percent(0.10, 0), "10%");
    }
}
