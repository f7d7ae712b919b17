//! Reply parsing for the ASCII protocol.
//!
//! Replies are single lines holding one decimal number, or two for the `f`
//! feedback query. Parsing is lenient in the manner of C's `atof`/`atol`:
//! leading whitespace is skipped, the longest numeric prefix is used, trailing
//! text is ignored, and a reply with no numeric prefix reads as zero. A
//! desynchronised or timed-out exchange therefore surfaces as a silent zero.

/// Return the longest prefix of `text` that forms a decimal float.
fn float_prefix(text: &str) -> &str {
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let int_end = digits_from(end);
    let mut digit_count = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        digit_count += frac_end - (end + 1);
        end = frac_end;
    }

    if digit_count == 0 {
        return "";
    }

    // An exponent only counts when at least one digit follows it.
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    &text[..end]
}

/// Split `text` into an optional sign and the run of ASCII digits after it.
fn integer_digits(text: &str) -> (bool, &[u8]) {
    let bytes = text.as_bytes();
    let (negative, rest) = match bytes.first() {
        Some(b'-') => (true, &bytes[1..]),
        Some(b'+') => (false, &bytes[1..]),
        _ => (false, bytes),
    };
    let len = rest.iter().take_while(|b| b.is_ascii_digit()).count();
    (negative, &rest[..len])
}

/// Parse a reply as a float, yielding `0.0` when nothing numeric is present.
pub fn parse_float(text: &str) -> f32 {
    float_prefix(text.trim_start()).parse().unwrap_or(0.0)
}

/// Parse a reply as a signed integer, yielding `0` when nothing numeric is
/// present. Out-of-range values saturate.
pub fn parse_int(text: &str) -> i32 {
    let (negative, digits) = integer_digits(text.trim_start());
    let magnitude = digits.iter().fold(0i64, |acc, d| {
        acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
    });
    let value = if negative { -magnitude } else { magnitude };
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Parse a reply as an unsigned 32-bit register value such as an error mask.
///
/// A leading minus sign reinterprets the two's-complement bits, matching a
/// device that prints the register as a signed integer.
pub fn parse_mask(text: &str) -> u32 {
    let (negative, digits) = integer_digits(text.trim_start());
    let magnitude = digits.iter().fold(0u64, |acc, d| {
        acc.saturating_mul(10).saturating_add(u64::from(d - b'0'))
    });
    if negative {
        (magnitude.min(u64::from(u32::MAX)) as u32).wrapping_neg()
    } else {
        magnitude.min(u64::from(u32::MAX)) as u32
    }
}

/// Position and velocity estimates from the `f` feedback query.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Feedback {
    /// Position estimate in turns.
    pub position: f32,
    /// Velocity estimate in turns per second.
    pub velocity: f32,
}

impl Feedback {
    /// Parse a `"<pos> <vel>"` reply.
    ///
    /// Only the text before the first space is used for the position; a
    /// missing velocity reads as zero.
    pub fn parse(text: &str) -> Feedback {
        let (pos, vel) = match text.split_once(' ') {
            Some((pos, vel)) => (pos, vel),
            None => (text, ""),
        };
        Feedback {
            position: parse_float(pos),
            velocity: parse_float(vel),
        }
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_formatted_floats_parse_back(value in -10_000.0f32..10_000.0f32) {
            let text = format!("{:.4}", value);
            let parsed = parse_float(&text);
            prop_assert!((parsed - value).abs() <= 1e-3);
        }

        #[test]
        fn prop_integers_parse_back(value in any::<i32>()) {
            prop_assert_eq!(parse_int(&value.to_string()), value);
        }

        #[test]
        fn prop_arbitrary_text_never_panics(text in ".*") {
            let _ = parse_float(&text);
            let _ = parse_int(&text);
            let _ = parse_mask(&text);
            let _ = Feedback::parse(&text);
        }
    }
}
