use std::{fmt, ops::Index, slice};

use serde::Serialize;

use crate::normalizer::RestoreWarning;

/// Data-quality issue found while restoring one field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldWarning {
    /// Zero-based position of the field in its record.
    pub field: usize,
    pub kind: RestoreWarning,
}

impl fmt::Display for FieldWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field {}: {}", self.field + 1, self.kind)
    }
}

/// Restored fields of one source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSet {
    line: u64,
    fields: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<FieldWarning>,
}

impl FieldSet {
    pub fn new(line: u64, fields: Vec<String>) -> Self {
        Self::with_warnings(line, fields, Vec::new())
    }

    pub fn with_warnings(line: u64, fields: Vec<String>, warnings: Vec<FieldWarning>) -> Self {
        Self {
            line,
            fields,
            warnings,
        }
    }

    /// 1-based line in the original source.
    pub fn line_number(&self) -> u64 {
        self.line
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.fields
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.fields.clone()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.fields
    }

    pub fn warnings(&self) -> &[FieldWarning] {
        &self.warnings
    }

    pub fn join(&self, separator: &str) -> String {
        self.fields.join(separator)
    }
}

impl Index<usize> for FieldSet {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.fields[index]
    }
}

impl<'a> IntoIterator for &'a FieldSet {
    type Item = &'a String;
    type IntoIter = slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl fmt::Display for FieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join(","))
    }
}
