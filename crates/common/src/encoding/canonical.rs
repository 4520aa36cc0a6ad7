use std::io;

use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter, Serializer};

use super::EncodingError;

const INDENT: &[u8] = b"  ";

/// Pretty printer matching `JSON.stringify(value, null, 2)` byte for byte.
///
/// Layout is delegated to serde_json's `PrettyFormatter`; only float
/// rendering differs, following [`js_number`].
struct CanonicalFormatter<'a>(PrettyFormatter<'a>);

impl<'a> CanonicalFormatter<'a> {
    fn new() -> Self {
        Self(PrettyFormatter::with_indent(INDENT))
    }
}

impl<'a> Formatter for CanonicalFormatter<'a> {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_value(writer)
    }

    fn write_f64<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        writer.write_all(js_number(value).as_bytes())
    }
}

/// Render a finite float the way ECMAScript `Number::toString` does.
///
/// Rust's `{:e}` already yields the shortest round-tripping digits; only
/// their placement differs. With `value = 0.d1..dk * 10^n`, plain decimal is
/// used for `-6 < n <= 21` and exponent form with an explicit sign otherwise.
fn js_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let sci = format!("{:e}", value.abs());
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let n = exponent.parse::<i32>().unwrap_or(0) + 1;

    let mut out = String::with_capacity(k as usize + 8);
    if value < 0.0 {
        out.push('-');
    }
    if k <= n && n <= 21 {
        out.push_str(&digits);
        out.extend(std::iter::repeat('0').take((n - k) as usize));
    } else if 0 < n && n <= 21 {
        out.push_str(&digits[..n as usize]);
        out.push('.');
        out.push_str(&digits[n as usize..]);
    } else if -6 < n && n <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat('0').take((-n) as usize));
        out.push_str(&digits);
    } else {
        let e = n - 1;
        out.push_str(&digits[..1]);
        if k > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        out.push('e');
        out.push(if e < 0 { '-' } else { '+' });
        out.push_str(&e.abs().to_string());
    }
    out
}

/// Serialize a message into the bytes that get hashed and signed.
///
/// Object keys keep their insertion order (serde_json is built with
/// `preserve_order`), values are indented by two spaces and keys are
/// followed by `": "`.
pub fn canonicalize<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, EncodingError> {
    let mut out = Vec::with_capacity(256);
    let mut serializer = Serializer::with_formatter(&mut out, CanonicalFormatter::new());
    value.serialize(&mut serializer)?;
    Ok(out)
}

/// [`canonicalize`], as a `String`
pub fn to_canonical_string<T: Serialize + ?Sized>(value: &T) -> Result<String, EncodingError> {
    let bytes = canonicalize(value)?;
    // the serializer only ever emits UTF-8
    Ok(String::from_utf8(bytes).expect("canonical JSON is valid UTF-8"))
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_golden_bytes() {
        let msg = json!({
            "type": "post",
            "text": "hello",
            "n": 1,
            "nested": { "a": [1, 2], "b": null },
            "empty": {},
            "list": []
        });
        let expected = "{\n  \"type\": \"post\",\n  \"text\": \"hello\",\n  \"n\": 1,\n  \"nested\": {\n    \"a\": [\n      1,\n      2\n    ],\n    \"b\": null\n  },\n  \"empty\": {},\n  \"list\": []\n}";
        assert_eq!(to_canonical_string(&msg).unwrap(), expected);
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let msg: serde_json::Value = serde_json::from_str(r#"{"z":1,"a":2,"m":3}"#).unwrap();
        assert_eq!(
            to_canonical_string(&msg).unwrap(),
            "{\n  \"z\": 1,\n  \"a\": 2,\n  \"m\": 3\n}"
        );
    }

    #[test]
    fn test_numbers_render_like_js() {
        assert_eq!(to_canonical_string(&json!(1.0)).unwrap(), "1");
        assert_eq!(to_canonical_string(&json!(-0.0)).unwrap(), "0");
        assert_eq!(to_canonical_string(&json!(1.5)).unwrap(), "1.5");
        assert_eq!(to_canonical_string(&json!(-42)).unwrap(), "-42");
        assert_eq!(
            to_canonical_string(&json!(1234567890123.0)).unwrap(),
            "1234567890123"
        );
    }

    #[test]
    fn test_exponent_boundaries_render_like_js() {
        let cases = [
            (1e-6, "0.000001"),
            (2.5e-6, "0.0000025"),
            (-2.5e-6, "-0.0000025"),
            (1e-7, "1e-7"),
            (1.25e-7, "1.25e-7"),
            (0.1, "0.1"),
            (123.456, "123.456"),
            (1e20, "100000000000000000000"),
            (1e21, "1e+21"),
            (1.5e300, "1.5e+300"),
            (-1.5e300, "-1.5e+300"),
        ];
        for (value, expected) in cases {
            assert_eq!(to_canonical_string(&json!(value)).unwrap(), expected);
        }
    }

    #[test]
    fn test_string_escaping() {
        assert_eq!(
            to_canonical_string(&json!({"s": "a\"b\n\u{1}"})).unwrap(),
            "{\n  \"s\": \"a\\\"b\\n\\u0001\"\n}"
        );
    }
}
