use std::str;

const F64_BUF_LEN: usize = 48;
fn format_f64(g: f64) -> String {
    let mut buf = [b'\0'; F64_BUF_LEN];
    match dtoa::write(&mut buf[..], g) {
        Ok(len) => match str::from_utf8(&buf[..len]) {
            Ok(s) => s.to_string(),
            Err(..) => format!("{}", g),
        },
        Err(..) => format!("{}", g),
    }
}

#[cfg(test)]
pub(crate) fn f64_equal(f1: f64, f2: f64) -> bool {
    (f1 - f2).abs() <= f64::EPSILON
}

/// Formats a number the way a browser prints it: integral values have no
/// fractional part, non-finite values are `NaN`, `Infinity`, and `-Infinity`,
/// very large and very small magnitudes use `1e+21` / `1e-7` notation
pub fn format_number(g: f64) -> String {
    if g.is_nan() {
        return "NaN".to_string();
    }
    if g.is_infinite() {
        let s = if g > 0.0 { "Infinity" } else { "-Infinity" };
        return s.to_string();
    }
    if g == 0.0 {
        // negative zero prints as plain zero
        return "0".to_string();
    }

    let s = format_f64(g);
    let (mantissa, exp) = match s.find(|c: char| c == 'e' || c == 'E') {
        Some(p) => (&s[..p], Some(&s[p + 1..])),
        None => (s.as_str(), None),
    };
    let mantissa = mantissa.strip_suffix(".0").unwrap_or(mantissa);
    match exp {
        Some(e) if e.starts_with('-') || e.starts_with('+') => format!("{}e{}", mantissa, e),
        Some(e) => format!("{}e+{}", mantissa, e),
        None => mantissa.to_string(),
    }
}

// enough fractional digits to print any f64 exactly
const EXACT_FRAC_DIGITS: usize = 1100;

/// Formats a number with a fixed count of fractional digits, the way a
/// browser's `toFixed` does: exact ties round away from zero, non-finite
/// values and magnitudes of `1e21` and above fall back to [`format_number`]
pub fn format_fixed(g: f64, digits: usize) -> String {
    if !g.is_finite() || g.abs() >= 1e21 {
        return format_number(g);
    }

    let exact = format!("{:.*}", EXACT_FRAC_DIGITS.max(digits + 1), g.abs());
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let mut kept: Vec<u8> = int_part.bytes().chain(frac_part.bytes().take(digits)).collect();

    if frac_part.as_bytes().get(digits).map_or(false, |&d| d >= b'5') {
        let mut pos = kept.len();
        loop {
            if pos == 0 {
                kept.insert(0, b'1');
                break;
            }
            pos -= 1;
            if kept[pos] == b'9' {
                kept[pos] = b'0';
            } else {
                kept[pos] += 1;
                break;
            }
        }
    }

    let int_len = kept.len() - digits;
    let mut out = String::with_capacity(kept.len() + 2);
    if g < 0.0 {
        out.push('-');
    }
    out.extend(kept[..int_len].iter().map(|&b| b as char));
    if digits > 0 {
        out.push('.');
        out.extend(kept[int_len..].iter().map(|&b| b as char));
    }
    out
}

/// Parses the longest numeric prefix of a string. Leading whitespace is
/// skipped and anything after the number is ignored, so `"2.5kg"` gives
/// `2.5`. Returns `None` if the text does not start with a number.
/// `Infinity` with an optional sign is accepted.
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let len = bytes.len();
    let is_digit = |i: usize| i < len && bytes[i].is_ascii_digit();

    let mut end = 0;
    if end < len && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        return if bytes[0] == b'-' {
            Some(f64::NEG_INFINITY)
        } else {
            Some(f64::INFINITY)
        };
    }

    let int_start = end;
    while is_digit(end) {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < len && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut p = frac_start;
        while is_digit(p) {
            p += 1;
        }
        if p > frac_start {
            digits += p - frac_start;
            end = p;
        }
    }
    if digits == 0 {
        return None;
    }

    if end < len && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut p = end + 1;
        if p < len && (bytes[p] == b'+' || bytes[p] == b'-') {
            p += 1;
        }
        let exp_start = p;
        while is_digit(p) {
            p += 1;
        }
        if p > exp_start {
            end = p;
        }
    }

    s[..end].parse::<f64>().ok()
}
