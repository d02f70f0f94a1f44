//! Reader and writer for the JavaScript object-literal subset used by
//! `searchindex.js`.
//!
//! The format is close to JSON with three differences that matter:
//!
//! - object keys that are plain identifiers (and not JavaScript reserved
//!   words) are written without quotes: `{terms:{grasp:[3,4]}}`
//! - object entries are sorted by their rendered `key:value` text, so
//!   `tweaker1:2` sorts before `tweaker:[..]` because `1` < `:`
//! - every character outside printable ASCII is escaped as `\uXXXX`
//!
//! Writing follows those rules exactly so regenerated files are byte-identical
//! to the ones produced by documentation builders. Reading accepts the subset
//! plus single-quoted strings and trailing commas.

use serde_json::{Map, Number, Value};

use super::error::IndexFormatError;

/// Maximum nesting of arrays and objects (security: stack exhaustion)
const MAX_DEPTH: usize = 128;

const RESERVED_WORDS: &[&str] = &[
    "abstract",
    "boolean",
    "break",
    "byte",
    "case",
    "catch",
    "char",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "double",
    "else",
    "enum",
    "export",
    "extends",
    "false",
    "final",
    "finally",
    "float",
    "for",
    "function",
    "goto",
    "if",
    "implements",
    "import",
    "in",
    "instanceof",
    "int",
    "interface",
    "long",
    "native",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "short",
    "static",
    "super",
    "switch",
    "synchronized",
    "this",
    "throw",
    "throws",
    "transient",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "volatile",
    "while",
    "with",
];

/// Render a value in the index's JavaScript-literal dialect
pub fn dumps(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

/// Parse a JavaScript-literal value
pub fn loads(input: &str) -> Result<Value, IndexFormatError> {
    let mut parser = Parser { input, pos: 0, depth: 0 };
    parser.skip_whitespace();
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if parser.pos < input.len() {
        return Err(IndexFormatError::TrailingCharacters { offset: parser.pos });
    }
    Ok(value)
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_string(out, s),
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
    let mut entries: Vec<String> = map
        .iter()
        .map(|(key, value)| {
            let mut entry = String::new();
            write_key(&mut entry, key);
            entry.push(':');
            write_value(&mut entry, value);
            entry
        })
        .collect();
    entries.sort();

    out.push('{');
    out.push_str(&entries.join(","));
    out.push('}');
}

fn write_key(out: &mut String, key: &str) {
    if is_bare_key(key) {
        out.push_str(key);
    } else {
        write_string(out, key);
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*` and not a reserved word
fn is_bare_key(key: &str) -> bool {
    let mut chars = key.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !RESERVED_WORDS.contains(&key)
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ' '..='~' => out.push(c),
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04x}", unit));
                }
            }
        }
    }
    out.push('"');
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn expect(&mut self, wanted: char, expected: &'static str) -> Result<(), IndexFormatError> {
        let offset = self.pos;
        match self.bump() {
            Some(c) if c == wanted => Ok(()),
            Some(found) => Err(IndexFormatError::UnexpectedChar { found, offset, expected }),
            None => Err(IndexFormatError::UnexpectedEnd),
        }
    }

    fn parse_value(&mut self) -> Result<Value, IndexFormatError> {
        match self.peek() {
            None => Err(IndexFormatError::UnexpectedEnd),
            Some('{') => self.nested(Self::parse_object),
            Some('[') => self.nested(Self::parse_array),
            Some('"') | Some('\'') => Ok(Value::String(self.parse_string()?)),
            Some(c) if c == '-' || c.is_ascii_digit() => self.parse_number(),
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                let offset = self.pos;
                let ident = self.parse_identifier();
                match ident.as_str() {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    "null" => Ok(Value::Null),
                    _ => Err(IndexFormatError::UnknownIdentifier { ident, offset }),
                }
            }
            Some(found) => Err(IndexFormatError::UnexpectedChar {
                found,
                offset: self.pos,
                expected: "a value",
            }),
        }
    }

    fn nested(
        &mut self,
        parse: fn(&mut Self) -> Result<Value, IndexFormatError>,
    ) -> Result<Value, IndexFormatError> {
        if self.depth >= MAX_DEPTH {
            return Err(IndexFormatError::TooDeep { offset: self.pos });
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    fn parse_object(&mut self) -> Result<Value, IndexFormatError> {
        self.expect('{', "'{'")?;
        let mut map = Map::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some('}') {
                self.bump();
                return Ok(Value::Object(map));
            }

            let key = self.parse_key()?;
            self.skip_whitespace();
            self.expect(':', "':' after object key")?;
            self.skip_whitespace();
            let value = self.parse_value()?;
            map.insert(key, value);

            self.skip_whitespace();
            let offset = self.pos;
            match self.bump() {
                Some(',') => continue,
                Some('}') => return Ok(Value::Object(map)),
                Some(found) => {
                    return Err(IndexFormatError::UnexpectedChar {
                        found,
                        offset,
                        expected: "',' or '}'",
                    });
                }
                None => return Err(IndexFormatError::UnexpectedEnd),
            }
        }
    }

    fn parse_array(&mut self) -> Result<Value, IndexFormatError> {
        self.expect('[', "'['")?;
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some(']') {
                self.bump();
                return Ok(Value::Array(items));
            }

            items.push(self.parse_value()?);

            self.skip_whitespace();
            let offset = self.pos;
            match self.bump() {
                Some(',') => continue,
                Some(']') => return Ok(Value::Array(items)),
                Some(found) => {
                    return Err(IndexFormatError::UnexpectedChar {
                        found,
                        offset,
                        expected: "',' or ']'",
                    });
                }
                None => return Err(IndexFormatError::UnexpectedEnd),
            }
        }
    }

    /// Quoted string, bare identifier or bare number
    fn parse_key(&mut self) -> Result<String, IndexFormatError> {
        match self.peek() {
            Some('"') | Some('\'') => self.parse_string(),
            Some(c) if c.is_ascii_alphanumeric() || c == '_' || c == '$' => {
                Ok(self.parse_identifier())
            }
            Some(found) => Err(IndexFormatError::UnexpectedChar {
                found,
                offset: self.pos,
                expected: "an object key",
            }),
            None => Err(IndexFormatError::UnexpectedEnd),
        }
    }

    fn parse_identifier(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !(c.is_ascii_alphanumeric() || c == '_' || c == '$') {
                break;
            }
            self.pos += 1;
        }
        self.input[start..self.pos].to_string()
    }

    fn parse_string(&mut self) -> Result<String, IndexFormatError> {
        let Some(quote) = self.bump() else {
            return Err(IndexFormatError::UnexpectedEnd);
        };
        let mut out = String::new();
        loop {
            let offset = self.pos;
            match self.bump() {
                None => return Err(IndexFormatError::UnexpectedEnd),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => {
                    let escaped = match self.bump() {
                        None => return Err(IndexFormatError::UnexpectedEnd),
                        Some('"') => '"',
                        Some('\'') => '\'',
                        Some('\\') => '\\',
                        Some('/') => '/',
                        Some('b') => '\u{8}',
                        Some('f') => '\u{c}',
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('t') => '\t',
                        Some('u') => self.parse_unicode_escape(offset)?,
                        Some(_) => return Err(IndexFormatError::InvalidEscape { offset }),
                    };
                    out.push(escaped);
                }
                Some(c) => out.push(c),
            }
        }
    }

    /// Body of a `\u` escape, combining surrogate pairs
    fn parse_unicode_escape(&mut self, offset: usize) -> Result<char, IndexFormatError> {
        let high = self.parse_hex4(offset)?;
        if !(0xD800..0xDC00).contains(&high) {
            return char::from_u32(high).ok_or(IndexFormatError::InvalidEscape { offset });
        }

        if self.bump() != Some('\\') || self.bump() != Some('u') {
            return Err(IndexFormatError::InvalidEscape { offset });
        }
        let low = self.parse_hex4(offset)?;
        if !(0xDC00..0xE000).contains(&low) {
            return Err(IndexFormatError::InvalidEscape { offset });
        }
        let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
        char::from_u32(code).ok_or(IndexFormatError::InvalidEscape { offset })
    }

    fn parse_hex4(&mut self, offset: usize) -> Result<u32, IndexFormatError> {
        let end = self.pos + 4;
        if end > self.input.len() {
            return Err(IndexFormatError::UnexpectedEnd);
        }
        // from_str_radix alone would also take a sign
        let code = self
            .input
            .get(self.pos..end)
            .filter(|digits| digits.bytes().all(|b| b.is_ascii_hexdigit()))
            .and_then(|digits| u32::from_str_radix(digits, 16).ok())
            .ok_or(IndexFormatError::InvalidEscape { offset })?;
        self.pos = end;
        Ok(code)
    }

    fn parse_number(&mut self) -> Result<Value, IndexFormatError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !(c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E')) {
                break;
            }
            self.pos += 1;
        }
        let text = &self.input[start..self.pos];
        let invalid = || IndexFormatError::InvalidNumber { text: text.to_string(), offset: start };

        if let Ok(n) = text.parse::<u64>() {
            return Ok(Value::Number(Number::from(n)));
        }
        if let Ok(n) = text.parse::<i64>() {
            return Ok(Value::Number(Number::from(n)));
        }
        let f = text.parse::<f64>().map_err(|_| invalid())?;
        Number::from_f64(f).map(Value::Number).ok_or_else(invalid)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_dumps_bare_and_quoted_keys() {
        let value = json!({"grasp": 3, "100": 4, "class": [0, 1], "a_i": 6, "Axes": 0});
        assert_eq!(dumps(&value), r#"{"100":4,"class":[0,1],Axes:0,a_i:6,grasp:3}"#);
    }

    #[test]
    fn test_dumps_sorts_by_rendered_entry() {
        let value = json!({"tweaker": [2, 3], "tweaker1": 2, "tweaker2": 2});
        assert_eq!(dumps(&value), "{tweaker1:2,tweaker2:2,tweaker:[2,3]}");
    }

    #[test]
    fn test_dumps_dotted_keys_are_quoted() {
        let value = json!({"sphinx": 56, "sphinx.domains.c": 2});
        assert_eq!(dumps(&value), r#"{"sphinx.domains.c":2,sphinx:56}"#);
    }

    #[test]
    fn test_dumps_escapes_strings() {
        let value = json!(["say \"hi\"\n", "back\\slash", "tab\there"]);
        assert_eq!(dumps(&value), r#"["say \"hi\"\n","back\\slash","tab\there"]"#);
    }

    #[test]
    fn test_dumps_escapes_non_ascii() {
        assert_eq!(dumps(&json!("café")), r#""caf\u00e9""#);
        assert_eq!(dumps(&json!("𝄞")), r#""\ud834\udd1e""#);
    }

    #[test]
    fn test_dumps_scalars() {
        assert_eq!(dumps(&json!(null)), "null");
        assert_eq!(dumps(&json!(true)), "true");
        assert_eq!(dumps(&json!([])), "[]");
        assert_eq!(dumps(&json!({})), "{}");
    }

    #[test]
    fn test_loads_bare_keys() {
        let value = loads(r#"{terms:{grasp:[3,4],"int":1},titles:["Basic GRASP"]}"#).unwrap();
        assert_eq!(value, json!({"terms": {"grasp": [3, 4], "int": 1}, "titles": ["Basic GRASP"]}));
    }

    #[test]
    fn test_loads_escapes_and_surrogates() {
        let value = loads(r#"["caf\u00e9", "\ud834\udd1e", 'single \'quoted\'', "a\/b"]"#).unwrap();
        assert_eq!(value, json!(["café", "𝄞", "single 'quoted'", "a/b"]));
    }

    #[test]
    fn test_loads_numbers() {
        let value = loads("[0, -3, 2.5, 1e3]").unwrap();
        assert_eq!(value[0], json!(0));
        assert_eq!(value[1], json!(-3));
        assert_eq!(value[2], json!(2.5));
        assert_eq!(value[3], json!(1000.0));
    }

    #[test]
    fn test_loads_literals_and_trailing_commas() {
        let value = loads("{a:true, b:false, c:null, d:[1,2,],}").unwrap();
        assert_eq!(value, json!({"a": true, "b": false, "c": null, "d": [1, 2]}));
    }

    #[test]
    fn test_loads_whitespace_tolerant() {
        let value = loads(" {\n  terms : { x : 1 }\n} ").unwrap();
        assert_eq!(value, json!({"terms": {"x": 1}}));
    }

    #[test]
    fn test_loads_reports_positions() {
        match loads("{a:1;}") {
            Err(IndexFormatError::UnexpectedChar { found, offset, .. }) => {
                assert_eq!(found, ';');
                assert_eq!(offset, 4);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_loads_unknown_identifier() {
        assert!(matches!(
            loads("[undefined]"),
            Err(IndexFormatError::UnknownIdentifier { ref ident, offset: 1 }) if ident == "undefined"
        ));
    }

    #[test]
    fn test_loads_unterminated() {
        assert!(matches!(loads("{a:[1,2"), Err(IndexFormatError::UnexpectedEnd)));
        assert!(matches!(loads("\"open"), Err(IndexFormatError::UnexpectedEnd)));
    }

    #[test]
    fn test_loads_nesting_limit() {
        let ok = format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(loads(&ok).is_ok());

        let deep = format!("{}{}", "[".repeat(MAX_DEPTH + 1), "]".repeat(MAX_DEPTH + 1));
        assert!(matches!(loads(&deep), Err(IndexFormatError::TooDeep { offset: 128 })));
    }

    #[test]
    fn test_loads_trailing_garbage() {
        assert!(matches!(loads("{} x"), Err(IndexFormatError::TrailingCharacters { offset: 3 })));
    }

    #[test]
    fn test_loads_invalid_escape() {
        assert!(matches!(loads(r#""\q""#), Err(IndexFormatError::InvalidEscape { offset: 1 })));
        assert!(matches!(loads(r#""\u00zz""#), Err(IndexFormatError::InvalidEscape { offset: 1 })));
        assert!(matches!(loads("\"\\u00\u{e9}x\""), Err(IndexFormatError::InvalidEscape { offset: 1 })));
        assert!(matches!(loads(r#""\u12""#), Err(IndexFormatError::UnexpectedEnd)));
    }

    #[test]
    fn test_loads_unicode_escape_rejects_signs() {
        assert!(matches!(loads(r#""\u+041""#), Err(IndexFormatError::InvalidEscape { offset: 1 })));
        assert!(matches!(
            loads(r#""\ud83d\u+e00""#),
            Err(IndexFormatError::InvalidEscape { offset: 1 })
        ));
        assert_eq!(loads(r#""\u0041\u00e9""#).unwrap(), json!("A\u{e9}"));
    }

    #[test]
    fn test_dumps_then_loads_preserves_value() {
        let value = json!({
            "docnames": ["a", "b"],
            "terms": {"new": [0, 1], "zero": 0, "héllo": 1},
            "titles": ["Tabu \"GRASP\"", "Ünïcode"],
        });
        assert_eq!(loads(&dumps(&value)).unwrap(), value);
    }
}
