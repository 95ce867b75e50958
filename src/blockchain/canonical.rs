//! Canonical JSON encoding used as the block digest preimage.
//!
//! Output is byte-identical to a sorted-key, ASCII-only JSON dump with
//! `", "` / `": "` separators, so digests stay comparable with chains
//! produced by other nodes speaking the same wire format. Numbers keep their
//! source text (serde_json `arbitrary_precision`); integers are written
//! verbatim and floats in shortest round-trip `repr` style.

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use std::borrow::Cow;
use std::io::{self, Write};

/// serde_json formatter emitting spaced separators and escaping every
/// character outside printable ASCII as `\uXXXX`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(b": ")
    }

    // Quotes, backslashes and C0 controls never reach this method; serde_json
    // escapes them through `write_char_escape`.
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            writer.write_all(fragment[start..i].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }

    fn write_number_str<W>(&mut self, writer: &mut W, value: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(normalize_number(value).as_bytes())
    }
}

/// Integers pass through untouched (no precision loss for any size); anything
/// with a fraction or exponent is rendered from its f64 value.
fn normalize_number(text: &str) -> Cow<'_, str> {
    if !text.contains(['.', 'e', 'E']) {
        return match text {
            "-0" => Cow::Borrowed("0"),
            _ => Cow::Borrowed(text),
        };
    }
    match text.parse::<f64>() {
        Ok(f) => Cow::Owned(float_repr(f)),
        Err(_) => Cow::Borrowed(text),
    }
}

/// Shortest round-trip rendering: positional for exponents in `-4..16`
/// (always with a fractional part), otherwise `d.ddde±XX`.
fn float_repr(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let sign = if f.is_sign_negative() { "-" } else { "" };
    if f == 0.0 {
        return format!("{sign}0.0");
    }

    let sci = format!("{:e}", f.abs());
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return sci;
    };

    if !(-4..16).contains(&exp) {
        let exp_sign = if exp < 0 { '-' } else { '+' };
        return format!("{sign}{mantissa}e{exp_sign}{:02}", exp.abs());
    }

    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    if exp < 0 {
        let zeros = "0".repeat((-exp - 1) as usize);
        return format!("{sign}0.{zeros}{digits}");
    }
    let int_len = exp as usize + 1;
    if digits.len() <= int_len {
        let zeros = "0".repeat(int_len - digits.len());
        format!("{sign}{digits}{zeros}.0")
    } else {
        let (int_part, frac_part) = digits.split_at(int_len);
        format!("{sign}{int_part}.{frac_part}")
    }
}

/// Encode `value` canonically.
///
/// The value is first lowered to `serde_json::Value`, whose maps are
/// `BTreeMap`s (the `preserve_order` feature is not enabled), which sorts
/// keys at every nesting level regardless of struct field order.
pub fn to_canonical_vec<T>(value: &T) -> serde_json::Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    let sorted = serde_json::to_value(value)?;
    let mut buf = Vec::with_capacity(256);
    let mut ser = Serializer::with_formatter(&mut buf, CanonicalFormatter);
    sorted.serialize(&mut ser)?;
    Ok(buf)
}
