//! Properties-file import and export for the mapping tables.
//!
//! Header mappings are exchanged between translator runs as
//! `com.acme.Foo=out/Foo.h` lines; prefix files use the same format and
//! also accept `:` as the separator (`com.acme: ACME`). Blank lines and
//! lines starting with `#` or `!` are ignored. Escapes follow
//! `java.util.Properties`, so anything written here loads back unchanged.

use std::io::{self, Write};

use super::{prefix_conflict_message, HeaderMappings, MappingStore, PrefixRegistration};
use crate::diagnostics::DiagnosticsSink;
use crate::errors::{PreprocessError, Result};

/// Write header mappings, one per line, in key order.
pub fn write_header_mappings<W: Write>(mappings: &HeaderMappings, mut out: W) -> io::Result<()> {
    for (qualified_name, header_path) in mappings {
        writeln!(out, "{}={}", escape_key(qualified_name), escape_value(header_path))?;
    }
    out.flush()
}

/// Parse properties text into key/value pairs in file order.
pub fn parse_properties(contents: &str) -> Result<Vec<(String, String)>> {
    let mut entries = Vec::new();

    for (index, raw) in contents.lines().enumerate() {
        let line = raw.trim_start_matches(BLANKS);
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let (key, value) = split_entry(line).ok_or_else(|| {
            PreprocessError::properties(index + 1, format!("missing '=' or ':' in {:?}", line))
        })?;
        let key = unescape(key);

        if key.is_empty() {
            return Err(PreprocessError::properties(index + 1, "empty key"));
        }
        entries.push((key, unescape(value)));
    }

    Ok(entries)
}

impl MappingStore {
    /// Merge header mappings read from properties text. Returns the
    /// number of entries read.
    pub fn load_header_mappings(&mut self, contents: &str) -> Result<usize> {
        let entries = parse_properties(contents)?;
        let count = entries.len();
        for (qualified_name, header_path) in entries {
            self.add_header_mapping(qualified_name, header_path);
        }
        Ok(count)
    }

    /// Register package prefixes read from properties text.
    ///
    /// Entries go through the same first-writer-wins policy as
    /// annotation declarations; a conflicting entry is reported to
    /// `sink` with `location` naming the prefix file. Returns the number
    /// of entries read.
    pub fn load_package_prefixes(
        &mut self,
        contents: &str,
        location: &str,
        sink: &mut dyn DiagnosticsSink,
    ) -> Result<usize> {
        let entries = parse_properties(contents)?;
        let count = entries.len();
        for (package, prefix) in entries {
            if let PrefixRegistration::Conflict { existing } =
                self.add_package_prefix(&package, &prefix)
            {
                sink.error(prefix_conflict_message(&package, &prefix, location, &existing));
            }
        }
        Ok(count)
    }
}

/// Whitespace that separates keys from values.
const BLANKS: [char; 3] = [' ', '\t', '\u{c}'];

/// Split a logical line at the first unescaped separator.
///
/// The key ends at `=`, `:` or whitespace. Blanks around the separator
/// belong to neither side; trailing blanks of the value are kept.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let mut escaped = false;
    let mut key_end = line.len();
    for (index, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = index;
                break;
            }
            c if BLANKS.contains(&c) => {
                key_end = index;
                break;
            }
            _ => {}
        }
    }

    let rest = line[key_end..].trim_start_matches(BLANKS);
    let value = rest.strip_prefix(['=', ':'])?;
    Some((&line[..key_end], value.trim_start_matches(BLANKS)))
}

fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for c in key.chars() {
        match c {
            '\\' | '=' | ':' | ' ' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            _ => push_escaped_control(&mut out, c),
        }
    }
    out
}

/// Only a leading space needs escaping in a value; later ones are kept
/// as written.
fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for (index, c) in value.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            ' ' if index == 0 => out.push_str("\\ "),
            _ => push_escaped_control(&mut out, c),
        }
    }
    out
}

fn push_escaped_control(out: &mut String, c: char) {
    match c {
        '\t' => out.push_str("\\t"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\u{c}' => out.push_str("\\f"),
        _ => out.push(c),
    }
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
