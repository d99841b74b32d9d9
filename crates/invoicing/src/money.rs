//! Presentation helpers for amounts.
//!
//! Totals are stored unrounded; rounding to cents only happens here, when an
//! amount is displayed or rendered.

/// Round to 2 decimals, half away from zero.
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// French-locale euro formatting: `1 234,56 €`.
///
/// Thousands are grouped with a regular space (not a narrow no-break space)
/// so the output survives fonts without that glyph.
pub fn format_eur(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();

    let digits = (cents / 100).to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }

    format!("{sign}{grouped},{:02} €", cents % 100)
}

/// Percentage with two decimals, e.g. `33.33%`.
pub fn format_percentage(value: f64) -> String {
    format!("{value:.2}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_cents() {
        assert_eq!(round_to_cents(10.005_1), 10.01);
        assert_eq!(round_to_cents(99.994), 99.99);
        assert_eq!(round_to_cents(-1.255_1), -1.26);
    }

    #[test]
    fn formats_euros_the_french_way() {
        assert_eq!(format_eur(0.0), "0,00 €");
        assert_eq!(format_eur(120.0), "120,00 €");
        assert_eq!(format_eur(1234.5), "1 234,50 €");
        assert_eq!(format_eur(1_234_567.891), "1 234 567,89 €");
        assert_eq!(format_eur(-45.3), "-45,30 €");
        assert_eq!(format_eur(-0.001), "0,00 €");
    }

    #[test]
    fn formats_percentages() {
        assert_eq!(format_percentage(100.0 / 3.0), "33.33%");
    }
}
