//! Input parsing and validation for dialogue steps.

use std::sync::LazyLock;

use regex::Regex;

/// Matches an amount typed with a full thousands group, e.g. `10.000`.
static GROUPED_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d{3}").unwrap());

/// Parses a Rupiah amount typed by the user.
///
/// Every `.` is a thousands separator and is stripped before parsing, so
/// `10.000` and `10000` both yield 10000, and `10.5` yields 105. A decimal
/// point is not part of the input convention.
pub fn parse_amount(text: &str) -> Option<i64> {
    let cleaned = text.trim().replace('.', "");
    let digits = cleaned
        .strip_prefix('-')
        .or_else(|| cleaned.strip_prefix('+'))
        .unwrap_or(&cleaned);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    cleaned.parse().ok()
}

/// True when the raw text already carries a full thousands group.
///
/// Used only to decide how the accepted amount is echoed back; it never
/// affects the parsed value.
pub fn is_grouped_amount(text: &str) -> bool {
    GROUPED_AMOUNT.is_match(text)
}

/// Formats an amount with `.` thousands separators: `Rp10.000`.
pub fn format_rupiah(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    out.push_str("Rp");
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

/// Echo string for an accepted amount: input typed with grouping is echoed
/// as typed, anything else is freshly formatted.
pub fn display_amount(raw: &str, amount: i64) -> String {
    if is_grouped_amount(raw) {
        format!("Rp{}", raw.trim())
    } else {
        format_rupiah(amount)
    }
}

/// Category names: letters and whitespace only, at least one letter.
pub fn is_valid_category_name(text: &str) -> bool {
    !text.trim().is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
}

/// Free-text step input. The literal `skip` (any case) and empty input both
/// mean "nothing provided".
pub fn optional_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty() && !trimmed.eq_ignore_ascii_case("skip")).then(|| trimmed.to_string())
}
