pub const MILLIUNITS_PER_UNIT: i64 = 1000;

/// Display units to integer milliunits, rounding half-way values up.
pub fn to_milliunits(amount: f64) -> i64 {
    (amount * MILLIUNITS_PER_UNIT as f64 + 0.5).floor() as i64
}

/// 2^63, the first magnitude an `i64` cannot hold.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// Like [`to_milliunits`] but `None` for non-finite input or a result that
/// does not fit in an `i64`.
pub fn checked_milliunits(amount: f64) -> Option<i64> {
    let scaled = (amount * MILLIUNITS_PER_UNIT as f64 + 0.5).floor();
    (scaled.is_finite() && (-I64_LIMIT..I64_LIMIT).contains(&scaled)).then_some(scaled as i64)
}

pub fn from_milliunits(amount: i64) -> f64 {
    amount as f64 / MILLIUNITS_PER_UNIT as f64
}

/// Format milliunits as a dollar amount with thousands separators: $1,234.56
pub fn money(milliunits: i64) -> String {
    let val = from_milliunits(milliunits);
    let negative = val < 0.0;
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// Signed percentage for period-over-period change: +12%, -3%, 0%
pub fn percent(change: i64) -> String {
    if change > 0 {
        format!("+{change}%")
    } else {
        format!("{change}%")
    }
}

pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1_234_560), "$1,234.56");
        assert_eq!(money(-500_000), "-$500.00");
        assert_eq!(money(0), "$0.00");
        assert_eq!(money(1_000_000_990), "$1,000,000.99");
        assert_eq!(money(42_100), "$42.10");
    }

    #[test]
    fn test_to_milliunits() {
        assert_eq!(to_milliunits(1.5), 1500);
        assert_eq!(to_milliunits(-12.345), -12345);
        assert_eq!(to_milliunits(0.0), 0);
        assert_eq!(to_milliunits(19.99), 19990);
    }

    #[test]
    fn test_checked_milliunits_rejects_unrepresentable() {
        assert_eq!(checked_milliunits(-42.5), Some(-42500));
        assert_eq!(checked_milliunits(f64::NAN), None);
        assert_eq!(checked_milliunits(f64::INFINITY), None);
        assert_eq!(checked_milliunits(f64::NEG_INFINITY), None);
        assert_eq!(checked_milliunits(1e20), None);
        assert_eq!(checked_milliunits(-1e20), None);
        assert_eq!(checked_milliunits(9e15), Some(9_000_000_000_000_000_000));
    }

    #[test]
    fn test_from_milliunits() {
        assert_eq!(from_milliunits(1500), 1.5);
        assert_eq!(from_milliunits(-250), -0.25);
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(12), "+12%");
        assert_eq!(percent(-3), "-3%");
        assert_eq!(percent(0), "0%");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
