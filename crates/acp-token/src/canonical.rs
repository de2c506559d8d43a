use serde_json::{Map, Value};

/// Canonical bytes of a token mapping: the exact input to hashing and signing.
///
/// Rules:
/// - Object keys sorted by Unicode code point, at every level
/// - No insignificant whitespace
/// - UTF-8, non-ASCII characters emitted as-is
/// - Numbers in serde_json's native rendering
///
/// Integers and strings are bit-exact with other ACP implementations.
/// Non-integer numbers are not rewritten to RFC 8785 form (`1.0` stays
/// `1.0`), so signed payloads should keep to integers.
pub fn canonicalize(map: &Map<String, Value>) -> Vec<u8> {
    let mut out = String::new();
    write_object(&mut out, map);
    out.into_bytes()
}

/// Canonical JSON text of any value, under the same rules as [`canonicalize`].
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_str(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => write_object(out, map),
    }
}

fn write_object(out: &mut String, map: &Map<String, Value>) {
    // UTF-8 byte order is code point order.
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));

    out.push('{');
    for (i, (key, value)) in entries.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_str(out, key);
        out.push(':');
        write_value(out, value);
    }
    out.push('}');
}

fn write_str(out: &mut String, s: &str) {
    out.push_str(&Value::from(s).to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn canon(value: Value) -> String {
        String::from_utf8(canonicalize(value.as_object().unwrap())).unwrap()
    }

    #[test]
    fn keys_sorted() {
        assert_eq!(canon(json!({"z": 1, "a": 2, "m": 3})), r#"{"a":2,"m":3,"z":1}"#);
    }

    #[test]
    fn insertion_order_irrelevant() {
        let mut first = Map::new();
        first.insert("b".into(), json!(1));
        first.insert("a".into(), json!(2));
        let mut second = Map::new();
        second.insert("a".into(), json!(2));
        second.insert("b".into(), json!(1));
        assert_eq!(canonicalize(&first), canonicalize(&second));
        assert_eq!(canonicalize(&first), br#"{"a":2,"b":1}"#);
    }

    #[test]
    fn nested_objects_sorted() {
        assert_eq!(
            canon(json!({"b": {"z": 1, "a": [{"y": 0, "x": 1}]}, "a": 0})),
            r#"{"a":0,"b":{"a":[{"x":1,"y":0}],"z":1}}"#
        );
    }

    #[test]
    fn arrays_preserve_order() {
        assert_eq!(canonical_json(&json!([3, 1, 2])), "[3,1,2]");
    }

    #[test]
    fn code_point_ordering() {
        // U+FF61 sorts before U+1F600 by code point (UTF-16 order would flip them).
        let value = json!({"\u{1F600}": 1, "\u{FF61}": 2, "z": 3, "é": 4});
        assert_eq!(canon(value), "{\"z\":3,\"é\":4,\"\u{FF61}\":2,\"\u{1F600}\":1}");
    }

    #[test]
    fn strings_escaped_minimally() {
        assert_eq!(
            canon(json!({"k": "quote \" slash \\ nl \n ctl \u{1} é"})),
            "{\"k\":\"quote \\\" slash \\\\ nl \\n ctl \\u0001 é\"}"
        );
    }

    #[test]
    fn scalars() {
        assert_eq!(canonical_json(&json!(null)), "null");
        assert_eq!(canonical_json(&json!(true)), "true");
        assert_eq!(canonical_json(&json!(-17)), "-17");
        assert_eq!(canonical_json(&json!(u64::MAX)), "18446744073709551615");
    }

    #[test]
    fn floats_keep_native_form() {
        // Not RFC 8785: JCS would print `1` here.
        assert_eq!(canonical_json(&json!(1.0)), "1.0");
        assert_eq!(canonical_json(&json!(0.5)), "0.5");
    }
}
