//! Inbound payload decoding.
//!
//! MQTT payloads on the configuration topics are the ASCII text of a
//! base-10 number.  Decoding is deliberately permissive, following C
//! `strtol` / `strtod`: leading whitespace is skipped, the longest numeric
//! prefix is taken, and anything unparsable degrades to zero.  Neither
//! function can fail.
//!
//! Payloads are copied into a fixed [`heapless::String`] after an explicit
//! length check, so an oversized message can never overrun the buffer.
//! [`try_decode_int`] and [`try_decode_float`] report an oversized payload
//! as `None` so the caller can leave its state untouched; the plain
//! decoders fold that case into zero.

use heapless::String;
use log::{debug, warn};

/// Longest payload accepted for decoding.
pub const MAX_PAYLOAD_LEN: usize = 49;

type PayloadText = String<MAX_PAYLOAD_LEN>;

/// Decode a payload as a signed base-10 integer.
///
/// Out-of-range values saturate at `i32::MIN` / `i32::MAX`.
pub fn decode_int(bytes: &[u8]) -> i32 {
    try_decode_int(bytes).unwrap_or(0)
}

/// Decode a payload as a decimal floating-point literal.
pub fn decode_float(bytes: &[u8]) -> f32 {
    try_decode_float(bytes).unwrap_or(0.0)
}

/// Like [`decode_int`], but `None` when the payload exceeds
/// [`MAX_PAYLOAD_LEN`].
pub fn try_decode_int(bytes: &[u8]) -> Option<i32> {
    let text = bounded_text(bytes)?;
    let s = skip_space(&text);
    let (negative, digits) = split_sign(s);

    let mut value: i64 = 0;
    let mut seen = false;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        seen = true;
        value = (value * 10 + i64::from(b - b'0')).min(i64::from(i32::MAX) + 1);
    }
    if !seen {
        debug!("payload: '{}' is not an integer", text);
        return Some(0);
    }
    let signed = if negative { -value } else { value };
    Some(signed.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
}

/// Like [`decode_float`], but `None` when the payload exceeds
/// [`MAX_PAYLOAD_LEN`].
pub fn try_decode_float(bytes: &[u8]) -> Option<f32> {
    let text = bounded_text(bytes)?;
    let s = skip_space(&text);
    let len = float_prefix_len(s);
    if len == 0 {
        debug!("payload: '{}' is not a number", text);
        return Some(0.0);
    }
    Some(s[..len].parse::<f32>().unwrap_or(0.0))
}

/// Copy `bytes` into a bounded string.  `None` only for oversized
/// payloads; invalid UTF-8 yields empty text.
fn bounded_text(bytes: &[u8]) -> Option<PayloadText> {
    if bytes.len() > MAX_PAYLOAD_LEN {
        warn!(
            "payload: {} bytes exceeds limit of {}, ignored",
            bytes.len(),
            MAX_PAYLOAD_LEN
        );
        return None;
    }
    let mut text = PayloadText::new();
    if let Ok(s) = core::str::from_utf8(bytes) {
        let _ = text.push_str(s);
    }
    Some(text)
}

/// Leading whitespace as C `isspace` sees it: ASCII only, including VT.
fn skip_space(s: &str) -> &str {
    s.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == '\x0b')
}

fn split_sign(s: &str) -> (bool, &str) {
    match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    }
}

/// Length of the longest prefix of `s` matching
/// `[+-]? (digits [. digits?] | . digits) ([eE] [+-]? digits)?`.
fn float_prefix_len(s: &str) -> usize {
    let b = s.as_bytes();
    let mut i = 0;
    if matches!(b.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
    }
    let mut mantissa_digits = i - int_start;

    if i < b.len() && b[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < b.len() && b[j].is_ascii_digit() {
            j += 1;
        }
        mantissa_digits += j - frac_start;
        if mantissa_digits > 0 {
            i = j;
        }
    }
    if mantissa_digits == 0 {
        return 0;
    }

    // An exponent only counts if at least one digit follows it.
    if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        let mut j = i + 1;
        if j < b.len() && (b[j] == b'+' || b[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < b.len() && b[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    i
}
