//! JSON-in-HTML helpers.
//!
//! Scraped pages carry their player configuration as JSON tucked into an
//! attribute or a script variable. Pulling it out is always the same
//! sequence: locate markers, slice, unescape entities, parse. Every step
//! fails soft with `None`.

use std::borrow::Cow;

use serde_json::Value;

/// Every slice delimited by `start` ... `end`, in document order.
pub fn slices_between<'a>(
    body: &'a str,
    start: &'a str,
    end: &'a str,
) -> impl Iterator<Item = &'a str> + 'a {
    let mut rest = body;
    std::iter::from_fn(move || {
        let from = rest.find(start)? + start.len();
        let tail = &rest[from..];
        let len = tail.find(end)?;
        rest = &tail[len + end.len()..];
        Some(&tail[..len])
    })
}

/// Decode HTML character references (`&quot;`, `&amp;`, `&#39;`, `&#x2F;`).
///
/// Unknown or malformed references are kept verbatim.
pub fn unescape_html(input: &str) -> Cow<'_, str> {
    if !input.contains('&') {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp..];

        let decoded = candidate
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&candidate[1..semi]).map(|ch| (ch, semi)));

        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &candidate[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);

    Cow::Owned(out)
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "quot" => Some('"'),
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Undo JSON string escaping that leaks into raw HTML (`\/`, `&`).
pub fn unescape_js(input: &str) -> Cow<'_, str> {
    if !input.contains('\\') {
        return Cow::Borrowed(input);
    }
    Cow::Owned(
        input
            .replace("\\/", "/")
            .replace("\\u0026", "&")
            .replace("\\u003d", "=")
            .replace("\\u003D", "="),
    )
}

/// Parse JSON, returning `None` on any error.
pub fn parse_json_soft(input: &str) -> Option<Value> {
    serde_json::from_str(input.trim()).ok()
}

/// A JSON value that may itself be a JSON-encoded string.
pub fn nested_json(value: &Value) -> Option<Value> {
    match value {
        Value::String(s) => parse_json_soft(s),
        Value::Object(_) | Value::Array(_) => Some(value.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn slices_in_order() {
        let body = r#"<a x="1"><b x="2">"#;
        let all: Vec<_> = slices_between(body, "x=\"", "\"").collect();
        assert_eq!(all, vec!["1", "2"]);
        assert_eq!(slices_between(body, "y=\"", "\"").next(), None);
    }

    #[test]
    fn unterminated_slice_is_none() {
        assert_eq!(slices_between("data=\"open", "data=\"", "\"").next(), None);
    }

    #[test]
    fn unescapes_named_and_numeric_entities() {
        assert_eq!(
            unescape_html("{&quot;a&quot;:&#39;b&#39;,&#x2F;&amp;&lt;&gt;}"),
            "{\"a\":'b',/&<>}"
        );
    }

    #[test]
    fn keeps_unknown_references() {
        assert_eq!(unescape_html("a & b &bogus; &#zz;"), "a & b &bogus; &#zz;");
        assert!(matches!(unescape_html("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn js_escapes() {
        assert_eq!(
            unescape_js(r"https:\/\/cdn.example\/a.mp4?x=1&y=2"),
            "https://cdn.example/a.mp4?x=1&y=2"
        );
    }

    fn blob(body: &str) -> Option<Value> {
        let raw = slices_between(body, "data-options=\"", "\"").next()?;
        parse_json_soft(&unescape_html(raw))
    }

    #[test]
    fn extracts_escaped_blob() {
        let body = r#"<div data-options="{&quot;k&quot;:1}"></div>"#;
        assert_eq!(blob(body), Some(json!({"k": 1})));
    }

    #[test]
    fn malformed_blob_is_none() {
        let body = r#"<div data-options="{&quot;k&quot;:"></div>"#;
        assert_eq!(blob(body), None);
    }

    #[test]
    fn nested_string_json() {
        let v = json!("{\"videos\":[]}");
        assert_eq!(nested_json(&v), Some(json!({"videos": []})));
        assert_eq!(nested_json(&json!(3)), None);
    }
}
