//! Reading and writing generated search data.
//!
//! The on-disk form is a JavaScript array literal, optionally wrapped in a
//! `var searchData=` assignment:
//!
//! ```text
//! var searchData=
//! [
//!   ['sgn',['sgn',['../namespacekmath.html#a1e0f',1,'kmath::sgn(T val)'], ...]],
//!   ['seq',['seq',['../namespaceseq.html',1,'']]]
//! ];
//! ```
//!
//! Each row is `[key, [label, destination...]]`. A destination is either a bare
//! target string (only as the sole destination) or `[target, flag, scope]` with
//! the flag and scope optional. The same rows written with double quotes are
//! plain JSON and load through the same path.

use super::entry::{IndexEntry, Variant};
use crate::error::LoadError;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// `var searchData=` style assignment header.
static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:var|let|const)\s+[A-Za-z_$][A-Za-z0-9_$]*\s*=")
        .expect("header pattern is valid")
});

/// Variable name the generator assigns the rows to.
pub const DEFAULT_VAR_NAME: &str = "searchData";

/// Deeper nesting than this is never produced by the generator.
const MAX_DEPTH: usize = 32;

/// Parses search data text into rows, one [`IndexEntry`] per row.
///
/// Rows are returned exactly as persisted: duplicate keys are not merged here.
pub fn parse_search_data(text: &str) -> Result<Vec<IndexEntry>, LoadError> {
    let value = parse_literal(text)?;
    rows_from_value(&value)
}

/// Parses the array literal into a JSON value without checking its shape.
pub fn parse_literal(text: &str) -> Result<Value, LoadError> {
    let start = HEADER.find(text).map_or(0, |m| m.end());

    let mut parser = Parser { text, pos: start };
    parser.skip_ws();
    let value = parser.value(0)?;

    parser.skip_ws();
    if parser.peek() == Some(b';') {
        parser.pos += 1;
        parser.skip_ws();
    }
    if parser.pos != text.len() {
        return Err(LoadError::syntax(parser.pos, "unexpected trailing content"));
    }

    Ok(value)
}

/// Validates the row structure and converts it into entries.
pub fn rows_from_value(value: &Value) -> Result<Vec<IndexEntry>, LoadError> {
    let Value::Array(rows) = value else {
        return Err(LoadError::schema(0, "top-level value must be an array of rows"));
    };

    rows.iter()
        .enumerate()
        .map(|(row, value)| parse_row(row, value))
        .collect()
}

fn parse_row(row: usize, value: &Value) -> Result<IndexEntry, LoadError> {
    let [Value::String(key), Value::Array(body)] = value.as_array().map(Vec::as_slice).unwrap_or_default()
    else {
        return Err(LoadError::schema(row, "expected [key, [label, ...]]"));
    };
    if key.is_empty() {
        return Err(LoadError::schema(row, "empty key"));
    }

    let Some((Value::String(label), destinations)) = body.split_first() else {
        return Err(LoadError::schema(row, "value must start with a label string"));
    };
    if destinations.is_empty() {
        return Err(LoadError::schema(row, format!("'{}' has no destinations", key)));
    }

    let variants = if let [Value::String(target)] = destinations {
        vec![parse_target(row, label, target, None, None)?]
    } else {
        destinations
            .iter()
            .map(|dest| parse_destination(row, label, dest))
            .collect::<Result<_, _>>()?
    };

    Ok(IndexEntry::new(key.clone(), variants))
}

fn parse_destination(row: usize, label: &str, dest: &Value) -> Result<Variant, LoadError> {
    match dest.as_array().map(Vec::as_slice) {
        Some([Value::String(target)]) => parse_target(row, label, target, None, None),
        Some([Value::String(target), flag]) => parse_target(row, label, target, Some(flag), None),
        Some([Value::String(target), flag, Value::String(scope)]) => {
            parse_target(row, label, target, Some(flag), Some(scope.as_str()))
        }
        _ => Err(LoadError::schema(
            row,
            format!("destination for '{}' must be [target, flag, scope]", label),
        )),
    }
}

fn parse_target(
    row: usize,
    label: &str,
    target: &str,
    flag: Option<&Value>,
    scope: Option<&str>,
) -> Result<Variant, LoadError> {
    if target.is_empty() {
        return Err(LoadError::schema(row, format!("empty target for '{}'", label)));
    }

    let local = match flag.map(Value::as_u64) {
        None | Some(Some(1)) => true,
        Some(Some(0)) => false,
        Some(_) => {
            return Err(LoadError::schema(row, "link flag must be 0 or 1"));
        }
    };

    let mut variant = Variant::new(label, target).with_scope(scope.unwrap_or_default());
    variant.local = local;
    Ok(variant)
}

/// A run of consecutive variants sharing a label: one persisted row.
struct Row<'a> {
    key: &'a str,
    label: &'a str,
    variants: &'a [Variant],
}

/// Splits entries into persisted rows, grouping consecutive same-label variants.
fn rows<'a>(entries: impl IntoIterator<Item = &'a IndexEntry>) -> impl Iterator<Item = Row<'a>> {
    entries.into_iter().flat_map(|entry| {
        entry
            .variants
            .chunk_by(|a, b| a.label == b.label)
            .map(move |variants| Row {
                key: &entry.key,
                label: &variants[0].label,
                variants,
            })
    })
}

/// Writes entries in the generator's JavaScript form.
pub fn write_js<'a>(entries: impl IntoIterator<Item = &'a IndexEntry>, var_name: &str) -> String {
    let mut out = format!("var {}=\n[\n", var_name);

    let mut first = true;
    for row in rows(entries) {
        if !first {
            out.push_str(",\n");
        }
        first = false;

        out.push_str("  [");
        push_js_string(&mut out, row.key);
        out.push_str(",[");
        push_js_string(&mut out, row.label);
        for variant in row.variants {
            out.push_str(",[");
            push_js_string(&mut out, &variant.target);
            out.push_str(if variant.local { ",1," } else { ",0," });
            push_js_string(&mut out, variant.scope.as_deref().unwrap_or_default());
            out.push(']');
        }
        out.push_str("]]");
    }

    out.push_str("\n];\n");
    out
}

/// Writes entries as JSON rows with the same structure as [`write_js`].
pub fn write_json<'a>(entries: impl IntoIterator<Item = &'a IndexEntry>) -> Value {
    Value::Array(
        rows(entries)
            .map(|row| {
                let mut body = vec![Value::from(row.label)];
                body.extend(row.variants.iter().map(|variant| {
                    Value::Array(vec![
                        Value::from(variant.target.as_str()),
                        Value::from(u8::from(variant.local)),
                        Value::from(variant.scope.as_deref().unwrap_or_default()),
                    ])
                }));
                Value::Array(vec![Value::from(row.key), Value::Array(body)])
            })
            .collect(),
    )
}

fn push_js_string(out: &mut String, s: &str) {
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('\'');
}

/// Recursive-descent parser over the JavaScript literal subset the generator emits.
struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn value(&mut self, depth: usize) -> Result<Value, LoadError> {
        if depth > MAX_DEPTH {
            return Err(LoadError::syntax(self.pos, "nesting too deep"));
        }

        match self.peek() {
            Some(b'[') => self.array(depth),
            Some(quote @ (b'\'' | b'"')) => self.string(quote).map(Value::String),
            Some(b'-' | b'0'..=b'9') => self.integer(),
            Some(other) => Err(LoadError::syntax(
                self.pos,
                format!("unexpected character '{}'", other as char),
            )),
            None => Err(LoadError::syntax(self.pos, "unexpected end of input")),
        }
    }

    fn array(&mut self, depth: usize) -> Result<Value, LoadError> {
        // Opening bracket
        self.pos += 1;
        let mut items = Vec::new();

        loop {
            self.skip_ws();
            if self.peek() == Some(b']') {
                self.pos += 1;
                return Ok(Value::Array(items));
            }

            items.push(self.value(depth + 1)?);

            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {}
                Some(_) => return Err(LoadError::syntax(self.pos, "expected ',' or ']'")),
                None => return Err(LoadError::syntax(self.pos, "unterminated array")),
            }
        }
    }

    fn integer(&mut self) -> Result<Value, LoadError> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }

        self.text[start..self.pos]
            .parse::<i64>()
            .map(Value::from)
            .map_err(|e| LoadError::syntax(start, format!("invalid integer: {}", e)))
    }

    fn string(&mut self, quote: u8) -> Result<String, LoadError> {
        let start = self.pos;
        // Opening quote
        self.pos += 1;
        let mut out = String::new();

        loop {
            let rest = &self.text[self.pos..];
            let Some(c) = rest.chars().next() else {
                return Err(LoadError::syntax(start, "unterminated string"));
            };

            match c {
                c if c as u32 == u32::from(quote) => {
                    self.pos += 1;
                    return Ok(out);
                }
                '\\' => {
                    self.pos += 1;
                    out.push(self.escape()?);
                }
                '\n' => return Err(LoadError::syntax(self.pos, "newline in string")),
                c => {
                    out.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
    }

    fn escape(&mut self) -> Result<char, LoadError> {
        let at = self.pos;
        let Some(c) = self.text[self.pos..].chars().next() else {
            return Err(LoadError::syntax(at, "unterminated escape"));
        };
        self.pos += c.len_utf8();

        Ok(match c {
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'b' => '\u{8}',
            'f' => '\u{c}',
            '0' => '\0',
            'x' => self.hex_char(2, at)?,
            'u' => self.hex_char(4, at)?,
            // `\\`, `\'`, `\"`, `\/` and any other escaped character stand for themselves
            other => other,
        })
    }

    fn hex_char(&mut self, digits: usize, at: usize) -> Result<char, LoadError> {
        let hex = self
            .text
            .get(self.pos..self.pos + digits)
            .ok_or_else(|| LoadError::syntax(at, "truncated hex escape"))?;
        let code = u32::from_str_radix(hex, 16)
            .map_err(|_| LoadError::syntax(at, "invalid hex escape"))?;
        self.pos += digits;

        char::from_u32(code).ok_or_else(|| LoadError::syntax(at, "escape is not a valid character"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;

    const SGN_ROW: &str = "var searchData=\n[\n  ['sgn',['sgn',\
        ['../namespacekmath.html#a1e0f',1,'kmath::sgn(T val)'],\
        ['../namespacekmath.html#af573',1,'kmath::sgn(unsigned val)']]],\n  \
        ['seq',['seq',['../namespaceseq.html',1,'']]]\n];\n";

    #[test]
    fn test_parse_generator_output() {
        let rows = parse_search_data(SGN_ROW).unwrap();
        check!(rows.len() == 2);

        check!(rows[0].key == "sgn");
        check!(rows[0].variants.len() == 2);
        check!(rows[0].variants[1].scope.as_deref() == Some("kmath::sgn(unsigned val)"));
        check!(rows[0].variants[1].target == "../namespacekmath.html#af573");

        check!(rows[1].key == "seq");
        check!(rows[1].variants[0].scope.is_none());
        check!(rows[1].variants[0].local);
    }

    #[test]
    fn test_parse_json_and_bare_literal() {
        let json = r#"[["sl", ["sl", ["../namespaceseq.html#a01ec", 0, "seq"]]]]"#;
        let rows = parse_search_data(json).unwrap();
        check!(rows[0].variants[0].label == "sl");
        check!(!rows[0].variants[0].local);
    }

    #[test]
    fn test_parse_single_target_shorthand() {
        let rows = parse_search_data("[['main',['Main Page','../index.html']]]").unwrap();
        check!(rows[0].variants == vec![Variant::new("Main Page", "../index.html")]);
    }

    #[rstest]
    #[case(r"['it\'s']", "it's")]
    #[case(r"['back\\slash']", r"back\slash")]
    #[case(r"['\x41é']", "Aé")]
    #[case(r#"["dq \"q\""]"#, r#"dq "q""#)]
    #[case(r"['\q']", "q")]
    fn test_string_escapes(#[case] input: &str, #[case] expected: &str) {
        let value = parse_literal(input).unwrap();
        check!(value[0] == expected);
    }

    #[test]
    fn test_trailing_comma_and_whitespace() {
        let value = parse_literal(" [ 'a' , 'b' , ] ; \n").unwrap();
        check!(value == serde_json::json!(["a", "b"]));
    }

    #[rstest]
    #[case("['a', 'b'", "unterminated array")]
    #[case("['abc", "unterminated string")]
    #[case("['a'] extra", "unexpected trailing content")]
    #[case("[{}]", "unexpected character")]
    #[case("", "unexpected end of input")]
    #[case("['a' 'b']", "expected ',' or ']'")]
    #[case(r"['\u12']", "invalid hex escape")]
    fn test_syntax_errors(#[case] input: &str, #[case] expected: &str) {
        let_assert!(Err(LoadError::Syntax { message, .. }) = parse_literal(input));
        check!(message.contains(expected));
    }

    #[test]
    fn test_syntax_error_offset() {
        let_assert!(Err(LoadError::Syntax { offset, .. }) = parse_literal("[1, 2, x]"));
        check!(offset == 7);
    }

    #[test]
    fn test_nesting_limit() {
        let deep = "[".repeat(MAX_DEPTH + 2);
        let_assert!(Err(LoadError::Syntax { message, .. }) = parse_literal(&deep));
        check!(message.contains("too deep"));
    }

    #[rstest]
    #[case("'rows'", 0, "array of rows")]
    #[case("[['k']]", 0, "expected [key")]
    #[case("[['ok',['ok','../a.html']], ['', ['x','../x.html']]]", 1, "empty key")]
    #[case("[['k',[1,'../k.html']]]", 0, "label string")]
    #[case("[['k',['k']]]", 0, "no destinations")]
    #[case("[['k',['k',['../k.html',2,'']]]]", 0, "0 or 1")]
    #[case("[['k',['k',['',1,'']]]]", 0, "empty target")]
    #[case("[['k',['k',['../k.html',1,'',4]]]]", 0, "[target, flag, scope]")]
    #[case("[['k',['k','../a.html','../b.html']]]", 0, "[target, flag, scope]")]
    fn test_schema_errors(#[case] input: &str, #[case] expected_row: usize, #[case] expected: &str) {
        let_assert!(Err(LoadError::Schema { row, message }) = parse_search_data(input));
        check!(row == expected_row);
        check!(message.contains(expected));
    }

    #[test]
    fn test_write_js_matches_generator_layout() {
        let rows = parse_search_data(SGN_ROW).unwrap();
        let js = write_js(&rows, DEFAULT_VAR_NAME);

        check!(js.starts_with("var searchData=\n[\n  ['sgn',['sgn',['../namespacekmath.html#a1e0f',1,'kmath::sgn(T val)'],"));
        check!(js.contains("\n  ['seq',['seq',['../namespaceseq.html',1,'']]]\n];\n"));
    }

    #[test]
    fn test_write_splits_mixed_labels_into_rows() {
        let entry = IndexEntry::new(
            "state",
            vec![
                Variant::new("State", "../a.html"),
                Variant::new("state", "../b.html"),
                Variant::new("state", "../c.html").external(),
            ],
        );

        let js = write_js([&entry], DEFAULT_VAR_NAME);
        check!(js.matches("['state',").count() == 2);

        let reloaded = parse_search_data(&js).unwrap();
        check!(reloaded.len() == 2);
        check!(reloaded[1].variants.len() == 2);
        check!(!reloaded[1].variants[1].local);
    }

    #[test]
    fn test_write_escapes_quotes() {
        let entry = IndexEntry::new(
            "operator_27",
            vec![Variant::new("operator'", "../a.html").with_scope("it's \\ here")],
        );
        let js = write_js([&entry], "data");
        check!(js.contains(r"'operator\''"));

        let reloaded = parse_search_data(&js).unwrap();
        check!(reloaded == vec![entry]);
    }

    #[test]
    fn test_json_round_trip() {
        let rows = parse_search_data(SGN_ROW).unwrap();
        let json = serde_json::to_string(&write_json(&rows)).unwrap();
        check!(parse_search_data(&json).unwrap() == rows);
    }
}
