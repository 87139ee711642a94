//! Query string tokenizer and value parsers.

use alloc::string::String;
use alloc::vec::Vec;

use super::{ParseWarning, Request};
use crate::plan::Mode;

/// Parse an options query string into a Request + warnings.
pub(crate) fn parse_query(query: &str) -> (Request, Vec<ParseWarning>) {
    let mut req = Request::new();
    let mut warnings = Vec::new();

    for pair in split_query(query) {
        let (raw_key, raw_value) = split_pair(pair);
        let key = percent_decode(raw_key).to_ascii_lowercase();
        let value = percent_decode(raw_value);

        dispatch_key(&key, &value, &mut req, &mut warnings);
    }

    (req, warnings)
}

fn dispatch_key(key: &str, value: &str, req: &mut Request, warnings: &mut Vec<ParseWarning>) {
    match key {
        "mode" => set_or_warn(
            &mut req.mode,
            value.parse::<Mode>().ok(),
            "mode",
            value,
            "expected crop or resize",
            warnings,
        ),
        "w" | "width" => set_or_warn(
            &mut req.width,
            parse_f64(value),
            "w",
            value,
            "expected a number",
            warnings,
        ),
        "h" | "height" => set_or_warn(
            &mut req.height,
            parse_f64(value),
            "h",
            value,
            "expected a number",
            warnings,
        ),
        _ => warnings.push(ParseWarning::KeyNotRecognized {
            key: String::from(key),
            value: String::from(value),
        }),
    }
}

/// Set a field, warning on duplicate or unparseable values.
fn set_or_warn<T>(
    field: &mut Option<T>,
    parsed: Option<T>,
    key: &'static str,
    value: &str,
    reason: &'static str,
    warnings: &mut Vec<ParseWarning>,
) {
    let Some(v) = parsed else {
        warnings.push(ParseWarning::ValueInvalid {
            key,
            value: String::from(value),
            reason,
        });
        return;
    };
    if field.is_some() {
        warnings.push(ParseWarning::DuplicateKey {
            key: String::from(key),
            value: String::from(value),
        });
    }
    *field = Some(v);
}

// ---- Value parsers ----

/// Numeric value, with an optional trailing `px`. Range checks happen at resolve time.
fn parse_f64(s: &str) -> Option<f64> {
    let s = s.trim();
    let s = s.strip_suffix("px").unwrap_or(s);
    s.parse::<f64>().ok()
}

// ---- Query string tokenizer ----

/// Split query string on '&'.
fn split_query(query: &str) -> impl Iterator<Item = &str> {
    let query = query.strip_prefix('?').unwrap_or(query);
    query.split('&').filter(|s| !s.is_empty())
}

/// Split a single "key=value" pair on the first '='.
fn split_pair(pair: &str) -> (&str, &str) {
    pair.split_once('=').unwrap_or((pair, ""))
}

/// Percent-decode a URL component. Also handles '+' as space.
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                if let (Some(hi), Some(lo)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                    out.push(hi << 4 | lo);
                    i += 3;
                } else {
                    out.push(b'%');
                    i += 1;
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic() {
        let (req, warnings) = parse_query("mode=crop&w=400&h=300");
        assert_eq!(req.mode, Some(Mode::Crop));
        assert_eq!(req.width, Some(400.0));
        assert_eq!(req.height, Some(300.0));
        assert!(warnings.is_empty());
    }

    #[test]
    fn parse_aliases_and_case() {
        let (req, warnings) = parse_query("?MODE=Resize&Width=800&HEIGHT=600px");
        assert_eq!(req.mode, Some(Mode::Resize));
        assert_eq!(req.width, Some(800.0));
        assert_eq!(req.height, Some(600.0));
        assert!(warnings.is_empty());
    }

    #[test]
    fn parse_duplicate_last_wins() {
        let (req, warnings) = parse_query("w=100&w=200");
        assert_eq!(req.width, Some(200.0));
        assert_eq!(
            warnings,
            vec![ParseWarning::DuplicateKey {
                key: String::from("w"),
                value: String::from("200"),
            }]
        );
    }

    #[test]
    fn parse_invalid_value_keeps_previous() {
        let (req, warnings) = parse_query("mode=crop&mode=stretch");
        assert_eq!(req.mode, Some(Mode::Crop));
        assert!(matches!(
            warnings.as_slice(),
            [ParseWarning::ValueInvalid { key: "mode", .. }]
        ));
    }

    #[test]
    fn parse_unknown_key() {
        let (_, warnings) = parse_query("format=webp");
        assert_eq!(
            warnings,
            vec![ParseWarning::KeyNotRecognized {
                key: String::from("format"),
                value: String::from("webp"),
            }]
        );
    }

    #[test]
    fn parse_negative_is_kept_for_resolve() {
        let (req, warnings) = parse_query("w=-5");
        assert_eq!(req.width, Some(-5.0));
        assert!(warnings.is_empty());
    }

    #[test]
    fn split_skips_empty_pairs() {
        let pairs: Vec<_> = split_query("?&w=1&&h=2&").collect();
        assert_eq!(pairs, vec!["w=1", "h=2"]);
    }

    #[test]
    fn split_pair_without_value() {
        assert_eq!(split_pair("mode"), ("mode", ""));
        assert_eq!(split_pair("a=b=c"), ("a", "b=c"));
    }

    #[test]
    fn percent_decode_basics() {
        assert_eq!(percent_decode("crop%20"), "crop ");
        assert_eq!(percent_decode("a+b"), "a b");
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
        assert_eq!(percent_decode("%C3%A9"), "é");
    }
}
