//! Line-oriented `.properties` reader and formatting-preserving editor.
//!
//! The reader produces ordered [`Property`] records whose span metadata is
//! opaque to the resource model and consumed only by
//! [`restore_line_breaks`]. The editor performs in-place upserts: untouched
//! lines (comments, blanks, unrelated keys) are reproduced byte-for-byte,
//! and keys are never deleted.
//!
//! Values are taken verbatim; `\uXXXX` and similar escape sequences are not
//! decoded, so a merge writes back exactly what was read.

/// A single key/value record read from a `.properties` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub key: String,
    pub value: String,
    /// Raw layout of the logical line this property occupied, when parsed
    /// from a file. Absent for synthesized properties.
    pub span: Option<PropertySpan>,
}

/// Raw layout of a logical `.properties` line, continuations collapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySpan {
    /// The logical line with continuation backslashes and line breaks
    /// removed and continuation leading whitespace stripped.
    pub text: String,
    /// Byte offset in `text` where the value begins.
    pub value_start: usize,
    /// Byte offsets in `text` where the source file had a line break.
    pub newline_positions: Vec<usize>,
}

/// Re-inserts the line breaks recorded in the property's span, joined with
/// the given end-of-line sequence. Returns the plain value when the property
/// has no span or spanned a single line.
pub fn restore_line_breaks(property: &Property, eol: &str) -> String {
    let Some(span) = &property.span else {
        return property.value.clone();
    };
    if span.newline_positions.is_empty() {
        return property.value.clone();
    }

    let mut chunks = Vec::new();
    let mut previous = span.value_start;
    for &position in &span.newline_positions {
        if position <= previous || position > span.text.len() {
            continue;
        }
        chunks.push(&span.text[previous..position]);
        previous = position;
    }
    chunks.push(&span.text[previous..]);
    chunks.join(eol)
}

/// Parses `.properties` content into ordered key/value records.
///
/// Comments (`#`, `!`) and blank lines are skipped; `=` and `:` both act as
/// separators; trailing-backslash continuations are collapsed with their
/// join offsets recorded in the span.
pub fn parse(content: &str) -> Vec<Property> {
    scan(content)
        .into_iter()
        .filter_map(|scanned| match scanned {
            Scanned::Verbatim(_) => None,
            Scanned::Logical {
                text,
                newline_positions,
                ..
            } => {
                let (key, value_start) = split_key_value(&text);
                let value = text[value_start..].to_string();
                Some(Property {
                    key,
                    value,
                    span: Some(PropertySpan {
                        text,
                        value_start,
                        newline_positions,
                    }),
                })
            }
        })
        .collect()
}

/// Formatting-preserving editor over one `.properties` file.
///
/// Only upserted lines are rewritten; everything else round-trips untouched.
pub struct PropertiesEditor {
    lines: Vec<EditorLine>,
}

enum EditorLine {
    /// A comment or blank line, reproduced as-is.
    Verbatim(String),
    Entry {
        key: String,
        /// Collapsed text up to and including the separator, used when the
        /// value is rewritten.
        prefix: String,
        /// Original physical form of the logical line, emitted while the
        /// entry is untouched.
        raw: String,
        value: String,
        dirty: bool,
    },
}

impl PropertiesEditor {
    pub fn new(content: &str) -> Self {
        let lines = scan(content)
            .into_iter()
            .map(|scanned| match scanned {
                Scanned::Verbatim(line) => EditorLine::Verbatim(line),
                Scanned::Logical { raw, text, .. } => {
                    let (key, value_start) = split_key_value(&text);
                    EditorLine::Entry {
                        key,
                        prefix: text[..value_start].to_string(),
                        value: text[value_start..].to_string(),
                        raw,
                        dirty: false,
                    }
                }
            })
            .collect();
        PropertiesEditor { lines }
    }

    /// Updates the value of `key` in place, or appends `key=value` when the
    /// key is absent. Embedded line breaks are written as the `\n` escape
    /// sequence so the file stays line-oriented.
    pub fn upsert(&mut self, key: &str, value: &str) {
        let sanitized = value
            .replace("\r\n", "\n")
            .replace('\r', "\n")
            .replace('\n', "\\n");

        for line in &mut self.lines {
            if let EditorLine::Entry {
                key: existing,
                value,
                dirty,
                ..
            } = line
                && existing == key
            {
                *value = sanitized;
                *dirty = true;
                return;
            }
        }

        self.lines.push(EditorLine::Entry {
            key: key.to_string(),
            prefix: format!("{}=", key),
            raw: String::new(),
            value: sanitized,
            dirty: true,
        });
    }

    /// Looks up the current value of `key`, including pending upserts.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines.iter().find_map(|line| match line {
            EditorLine::Entry {
                key: existing,
                value,
                ..
            } if existing == key => Some(value.as_str()),
            _ => None,
        })
    }

    /// Renders the file content, rewriting only upserted entries.
    pub fn serialize(&self) -> String {
        self.lines
            .iter()
            .map(|line| match line {
                EditorLine::Verbatim(text) => text.clone(),
                EditorLine::Entry {
                    raw, prefix, value, dirty, ..
                } => {
                    if *dirty {
                        format!("{}{}", prefix, value)
                    } else {
                        raw.clone()
                    }
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

enum Scanned {
    Verbatim(String),
    Logical {
        /// Original physical lines joined with `\n`, backslashes intact.
        raw: String,
        /// Collapsed single-line content.
        text: String,
        newline_positions: Vec<usize>,
    },
}

/// Groups physical lines into comments/blanks and logical key/value lines,
/// collapsing trailing-backslash continuations.
fn scan(content: &str) -> Vec<Scanned> {
    let lines: Vec<&str> = content.lines().collect();
    let mut scanned = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index];
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            scanned.push(Scanned::Verbatim(line.to_string()));
            index += 1;
            continue;
        }

        let mut raw = String::from(line);
        let mut text = String::new();
        let mut newline_positions = Vec::new();
        let mut current = line;

        loop {
            let (content_part, continued) = strip_continuation(current);
            text.push_str(content_part);
            if !continued || index + 1 >= lines.len() {
                break;
            }
            index += 1;
            raw.push('\n');
            raw.push_str(lines[index]);
            newline_positions.push(text.len());
            current = lines[index].trim_start();
        }

        scanned.push(Scanned::Logical {
            raw,
            text,
            newline_positions,
        });
        index += 1;
    }

    scanned
}

/// Splits off a trailing continuation backslash; an even run of backslashes
/// is escaped content, not a continuation.
fn strip_continuation(line: &str) -> (&str, bool) {
    let trailing = line.chars().rev().take_while(|&c| c == '\\').count();
    if trailing % 2 == 1 {
        (&line[..line.len() - 1], true)
    } else {
        (line, false)
    }
}

/// Finds the key and the byte offset where the value begins in a collapsed
/// logical line. A line with no unescaped `=`/`:` separator is a key with an
/// empty value.
fn split_key_value(text: &str) -> (String, usize) {
    let mut escaped = false;
    for (idx, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                let key = text[..idx].trim().to_string();
                let after = &text[idx + 1..];
                let skipped = after.len() - after.trim_start_matches([' ', '\t']).len();
                return (key, idx + 1 + skipped);
            }
            _ => {}
        }
    }
    (text.trim().to_string(), text.len())
}
