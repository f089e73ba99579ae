//! Text VDF (Valve KeyValues) parser.
//!
//! Parses the structured-text format used by `libraryfolders.vdf`,
//! `loginusers.vdf` and `appmanifest_*.acf` into an order-preserving
//! nested table. Binary VDF (shortcuts.vdf) is handled separately in
//! [`crate::shortcuts`].

use std::fs;
use std::path::Path;

use crate::ClientError;

/// A VDF node: either a string leaf or a nested table.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Table(Table),
}

impl Value {
    /// Returns the string content, if this is a leaf.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            Value::Table(_) => None,
        }
    }

    /// Returns the nested table, if this is one.
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Str(_) => None,
            Value::Table(t) => Some(t),
        }
    }
}

/// An ordered key/value table.
///
/// Keys keep file order; `loginusers.vdf` consumers depend on the
/// first entry when no user carries the most-recent flag. Lookups are
/// linear; documents here are a handful of entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table(Vec<(String, Value)>);

impl Table {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Case-insensitive lookup. Steam is inconsistent about key casing
    /// in some stores (`MostRecent` vs `mostrecent`).
    pub fn get_ignore_case(&self, key: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_table(&self, key: &str) -> Option<&Table> {
        self.get(key).and_then(Value::as_table)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A parsed VDF document (the top-level table).
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Table,
}

impl Document {
    /// Reads and parses a VDF file.
    ///
    /// A missing file is `ClientError::NotFound`; malformed content is
    /// `ClientError::Parse`.
    pub fn load(path: &Path) -> Result<Self, ClientError> {
        let data = fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ClientError::NotFound(path.to_path_buf())
            } else {
                ClientError::Io(e)
            }
        })?;
        Self::parse(&data)
    }

    /// Parses VDF text from raw bytes.
    pub fn parse(data: &[u8]) -> Result<Self, ClientError> {
        // Tolerate a UTF-8 BOM.
        let mut pos = if data.starts_with(b"\xef\xbb\xbf") { 3 } else { 0 };
        let mut root = Vec::new();

        while let Some((token, new_pos)) = next_token(data, pos)? {
            pos = new_pos;
            let key = match token {
                Token::Text(key) => key,
                Token::Close => {
                    return Err(ClientError::Parse(format!(
                        "unmatched '}}' at byte {new_pos}"
                    )));
                }
                Token::Open => {
                    return Err(ClientError::Parse(format!(
                        "expected key before '{{' at byte {new_pos}"
                    )));
                }
            };
            let (value, new_pos) = parse_value(data, pos, &key)?;
            pos = new_pos;
            root.push((key, value));
        }

        Ok(Self { root: Table(root) })
    }
}

impl std::ops::Deref for Document {
    type Target = Table;

    fn deref(&self) -> &Table {
        &self.root
    }
}

enum Token {
    Open,
    Close,
    Text(String),
}

/// Parses the value following a key: a string leaf or a braced table.
fn parse_value(data: &[u8], pos: usize, key: &str) -> Result<(Value, usize), ClientError> {
    match next_token(data, pos)? {
        Some((Token::Text(s), pos)) => Ok((Value::Str(s), pos)),
        Some((Token::Open, pos)) => {
            let (table, pos) = parse_table(data, pos)?;
            Ok((Value::Table(table), pos))
        }
        Some((Token::Close, _)) | None => Err(ClientError::Parse(format!(
            "missing value for key '{key}'"
        ))),
    }
}

/// Parses table entries until the matching '}'.
fn parse_table(data: &[u8], mut pos: usize) -> Result<(Table, usize), ClientError> {
    let mut entries = Vec::new();

    loop {
        match next_token(data, pos)? {
            Some((Token::Close, new_pos)) => return Ok((Table(entries), new_pos)),
            Some((Token::Text(key), new_pos)) => {
                let (value, new_pos) = parse_value(data, new_pos, &key)?;
                pos = new_pos;
                entries.push((key, value));
            }
            Some((Token::Open, new_pos)) => {
                return Err(ClientError::Parse(format!(
                    "expected key before '{{' at byte {new_pos}"
                )));
            }
            None => {
                return Err(ClientError::Parse(
                    "unexpected end of data inside table".into(),
                ));
            }
        }
    }
}

/// Reads the next token, skipping whitespace and `//` comments.
///
/// Returns `None` at end of input.
fn next_token(data: &[u8], mut pos: usize) -> Result<Option<(Token, usize)>, ClientError> {
    loop {
        while pos < data.len() && data[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos + 1 < data.len() && data[pos] == b'/' && data[pos + 1] == b'/' {
            while pos < data.len() && data[pos] != b'\n' {
                pos += 1;
            }
            continue;
        }
        break;
    }

    if pos >= data.len() {
        return Ok(None);
    }

    match data[pos] {
        b'{' => Ok(Some((Token::Open, pos + 1))),
        b'}' => Ok(Some((Token::Close, pos + 1))),
        b'"' => {
            let (s, pos) = read_quoted(data, pos + 1)?;
            Ok(Some((Token::Text(s), pos)))
        }
        _ => {
            let start = pos;
            while pos < data.len()
                && !data[pos].is_ascii_whitespace()
                && !matches!(data[pos], b'{' | b'}' | b'"')
            {
                pos += 1;
            }
            let s = String::from_utf8_lossy(&data[start..pos]).into_owned();
            Ok(Some((Token::Text(s), pos)))
        }
    }
}

/// Reads a quoted string starting after the opening quote.
///
/// Handles `\"`, `\\`, `\n` and `\t` escapes the way the Steam client
/// writes them.
fn read_quoted(data: &[u8], mut pos: usize) -> Result<(String, usize), ClientError> {
    let mut out = Vec::new();
    while pos < data.len() {
        match data[pos] {
            b'"' => {
                let s = String::from_utf8_lossy(&out).into_owned();
                return Ok((s, pos + 1));
            }
            b'\\' if pos + 1 < data.len() => {
                out.push(match data[pos + 1] {
                    b'n' => b'\n',
                    b't' => b'\t',
                    other => other,
                });
                pos += 2;
            }
            byte => {
                out.push(byte);
                pos += 1;
            }
        }
    }
    Err(ClientError::Parse(
        "unterminated quoted string".into(),
    ))
}
