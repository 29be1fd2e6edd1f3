//! Resource quantity parsing: CPU in millicores, memory and storage in bytes.
//!
//! Accepts the notation deployment manifests use: `"250m"`, `"1"`, `"0.5"`
//! for CPU and `"512Mi"`, `"1Gi"`, `"500M"`, `"1024"` for memory.

const BINARY_SUFFIXES: [(&str, u32); 6] = [
    ("Ki", 1),
    ("Mi", 2),
    ("Gi", 3),
    ("Ti", 4),
    ("Pi", 5),
    ("Ei", 6),
];

const DECIMAL_SUFFIXES: [(&str, u32); 6] = [
    ("k", 1),
    ("M", 2),
    ("G", 3),
    ("T", 4),
    ("P", 5),
    ("E", 6),
];

/// Parse a CPU quantity into millicores. Returns `None` when malformed.
pub fn parse_cpu_millis(s: &str) -> Option<u64> {
    let s = s.trim();
    if let Some(millis) = s.strip_suffix('m') {
        if millis.is_empty() || !millis.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        return millis.parse().ok();
    }
    let value = parse_decimal(s, 1000)?;
    u64::try_from(value).ok()
}

/// Parse a memory or storage quantity into bytes. Returns `None` when malformed.
pub fn parse_memory_bytes(s: &str) -> Option<u128> {
    let s = s.trim();
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (number, suffix) = s.split_at(split);

    let multiplier: u128 = if suffix.is_empty() {
        1
    } else if let Some((_, exp)) = BINARY_SUFFIXES.iter().find(|(name, _)| *name == suffix) {
        1024u128.pow(*exp)
    } else if let Some((_, exp)) = DECIMAL_SUFFIXES.iter().find(|(name, _)| *name == suffix) {
        1000u128.pow(*exp)
    } else {
        return None;
    };

    parse_decimal(number, multiplier)
}

/// Parse `"12"` or `"1.25"` and scale it by `multiplier`, truncating any
/// fractional remainder.
fn parse_decimal(number: &str, multiplier: u128) -> Option<u128> {
    if number.is_empty() {
        return None;
    }
    let (whole, fraction) = match number.split_once('.') {
        Some((w, f)) => (w, f),
        None => (number, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    // Guard the fractional scaling below against overflow.
    if fraction.len() > 18 {
        return None;
    }

    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut total = whole.checked_mul(multiplier)?;
    if !fraction.is_empty() {
        let digits: u128 = fraction.parse().ok()?;
        let scale = 10u128.pow(fraction.len() as u32);
        total = total.checked_add(digits.checked_mul(multiplier)? / scale)?;
    }
    Some(total)
}
