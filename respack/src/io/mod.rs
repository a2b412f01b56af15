//! Exchange-format variants for the resource pack.
//!
//! Two formats exist: the tabular zip package handed to translators, and a
//! nested JSON document. Export works for both; ingest only for the tabular
//! one. The choice is the caller's, never derived from pack content.

pub mod json;
pub mod tabular;

use std::str::FromStr;

use crate::entry::Entry;
use crate::error::Error;

/// Options for merging a pack back into its source files.
#[derive(Debug, Clone)]
pub struct SaveOptions {
    /// Leave a target key untouched when the pack's translation is empty,
    /// rather than blanking it.
    pub ignore_if_empty: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        SaveOptions {
            ignore_if_empty: true,
        }
    }
}

/// Options shared by every exporter variant.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Name of the resulting package; the first path segment of every
    /// archive member.
    pub out_name: String,

    /// When non-empty, only export entries still missing at least one of
    /// these locales; an entry with all of them recorded is excluded.
    pub if_not_locales: Vec<String>,
}

impl ExportOptions {
    /// The inclusion filter: an entry is excluded iff a locale list is
    /// configured and the entry has all of those locales recorded (an empty
    /// translation counts as recorded).
    pub fn includes(&self, entry: &Entry) -> bool {
        self.if_not_locales.is_empty() || !entry.has_all_locales(&self.if_not_locales)
    }
}

/// The JSON variant shares the common export options.
pub type JsonExportOptions = ExportOptions;

/// The exchange formats a pack can be transcoded through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageFormat {
    /// Delimited text members inside a zip archive.
    Tabular,
    /// One nested JSON document. Export only.
    Json,
}

impl PackageFormat {
    /// File extension of the exported package.
    pub fn extension(&self) -> &'static str {
        match self {
            PackageFormat::Tabular => "zip",
            PackageFormat::Json => "json",
        }
    }
}

impl FromStr for PackageFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" | "tabular" => Ok(PackageFormat::Tabular),
            "json" => Ok(PackageFormat::Json),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}
