//! Literal validators. These decide whether a `BROJ`, `ZNAK`, or
//! `NIZ_ZNAKOVA` lexeme is well-formed and, where relevant, how large it is.

/// One escape a `ZNAK`/`NIZ_ZNAKOVA` literal is allowed to use after a
/// backslash: tab, newline, null, single quote, double quote, backslash.
fn is_valid_escape(c: u8) -> bool {
    matches!(c, b't' | b'n' | b'0' | b'\'' | b'"' | b'\\')
}

/// Parses a `BROJ` lexeme as a signed 32-bit integer. `minus` applies a
/// pending unary minus carried over from a preceding `<unarni_operator>`
/// (see [`crate::walk`]'s context struct). The radix is prefix-selected:
/// a `0x`/`0X` prefix reads hex, a leading `0` followed by more digits
/// reads octal, anything else decimal.
pub fn is_valid_int(s: &str, minus: bool) -> bool {
    parse_int(s, minus).is_some()
}

pub fn parse_int(s: &str, minus: bool) -> Option<i32> {
    if s.is_empty() {
        return None;
    }
    let (radix, digits) = if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
    {
        (16, rest)
    } else if s.len() > 1 && s.as_bytes()[0] == b'0' {
        (8, &s[1..])
    } else {
        (10, s)
    };
    if digits.is_empty() {
        return None;
    }
    let magnitude = i64::from_str_radix(digits, radix).ok()?;
    let signed = if minus { -magnitude } else { magnitude };
    i32::try_from(signed).ok()
}

/// `'X'` for any byte `X` other than a quote, or `'\E'` for an allowed
/// escape `E`.
pub fn is_valid_char(s: &str) -> bool {
    let bytes = s.as_bytes();
    match bytes.len() {
        3 => bytes[0] == b'\'' && bytes[1] != b'\'' && bytes[2] == b'\'',
        4 => {
            bytes[0] == b'\''
                && bytes[1] == b'\\'
                && is_valid_escape(bytes[2])
                && bytes[3] == b'\''
        }
        _ => false,
    }
}

/// Counts the characters a `"…"` literal denotes (escapes count as one),
/// not including the implicit null terminator. `None` on a malformed
/// escape.
pub fn is_valid_char_array(s: &str) -> Option<usize> {
    let inner = s.get(1..s.len().saturating_sub(1))?;
    let bytes = inner.as_bytes();
    let mut count = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            let escape = *bytes.get(i + 1)?;
            if !is_valid_escape(escape) {
                return None;
            }
            i += 2;
        } else {
            i += 1;
        }
        count += 1;
    }
    Some(count)
}

/// An array size must be a positive decimal integer that fits the dialect's
/// fixed bound of 1024 elements.
pub fn is_valid_array_size(s: &str) -> bool {
    match s.parse::<i64>() {
        Ok(n) => (1..=1024).contains(&n),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_decimal() {
        assert!(is_valid_int("42", false));
        assert_eq!(parse_int("42", true), Some(-42));
    }

    #[test]
    fn hex_and_octal_prefixes() {
        assert_eq!(parse_int("0x1A", false), Some(26));
        assert_eq!(parse_int("010", false), Some(8));
    }

    #[test]
    fn overflow_is_rejected() {
        assert!(!is_valid_int("99999999999", false));
    }

    #[test]
    fn char_literal_forms() {
        assert!(is_valid_char("'a'"));
        assert!(is_valid_char("'\\n'"));
        assert!(!is_valid_char("''"));
        assert!(!is_valid_char("'\\q'"));
    }

    #[test]
    fn char_array_counts_escapes_as_one() {
        assert_eq!(is_valid_char_array("\"a\\nb\""), Some(3));
        assert_eq!(is_valid_char_array("\"a\\q\""), None);
    }

    #[test]
    fn array_size_bounds() {
        assert!(is_valid_array_size("1"));
        assert!(is_valid_array_size("1024"));
        assert!(!is_valid_array_size("0"));
        assert!(!is_valid_array_size("1025"));
    }
}
