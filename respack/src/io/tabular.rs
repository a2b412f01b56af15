//! The tabular exchange format: one delimited-text member per bundle inside
//! a zip archive, `<out_name>/<module>/<bundle>.csv`. Each row is one
//! resource key with a column per locale.

use std::fs::File;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::bundle::Bundle;
use crate::entry::Entry;
use crate::error::Error;
use crate::events::{Event, EventSink};
use crate::io::ExportOptions;
use crate::locale::is_valid_locale;
use crate::pack::ResourcePack;

/// Literal text of the key column header. Ignored on ingest: the first
/// column is the key column whatever its header says.
pub const KEY_COLUMN_HEADER: &str = "Resource key";

lazy_static! {
    // <out_name>/<module>/<bundle>.csv, out_name possibly nested
    static ref MEMBER_PATTERN: Regex = Regex::new(r"^.+/([^/]+)/([^/]+)\.csv$").unwrap();
}

/// Delimited-text formatting configuration, supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularOptions {
    pub separator: char,
    pub quote: char,
    pub escape: char,
    pub eol: String,
}

impl Default for TabularOptions {
    fn default() -> Self {
        TabularOptions {
            separator: ';',
            quote: '"',
            escape: '"',
            eol: if cfg!(windows) { "\r\n" } else { "\n" }.to_string(),
        }
    }
}

impl TabularOptions {
    fn ascii_byte(c: char, what: &str) -> Result<u8, Error> {
        u8::try_from(c).map_err(|_| Error::config(format!("{} must be an ASCII character", what)))
    }

    fn separator_byte(&self) -> Result<u8, Error> {
        Self::ascii_byte(self.separator, "separator")
    }

    fn quote_byte(&self) -> Result<u8, Error> {
        Self::ascii_byte(self.quote, "quote character")
    }

    fn escape_byte(&self) -> Result<u8, Error> {
        Self::ascii_byte(self.escape, "escape character")
    }
}

/// Export configuration for the tabular package.
#[derive(Debug, Clone, Default)]
pub struct TabularExportOptions {
    pub export: ExportOptions,
    pub format: TabularOptions,
}

/// Ingest configuration for the tabular package.
#[derive(Debug, Clone)]
pub struct TabularImportOptions {
    pub format: TabularOptions,
    /// Root under which module directories are searched.
    pub base_dir: PathBuf,
}

/// Escapes one field for the given formatting configuration: the field is
/// wrapped in the quote character, internal quotes doubled via the escape
/// character, whenever it contains the separator, the quote, or a line
/// break. Idempotent under parse with the same configuration.
pub fn escape_field(field: &str, format: &TabularOptions) -> String {
    let needs_quoting = field.contains(format.separator)
        || field.contains(format.quote)
        || field.contains('\n')
        || field.contains('\r');
    if !needs_quoting {
        return field.to_string();
    }

    let mut escaped = String::with_capacity(field.len() + 2);
    escaped.push(format.quote);
    for c in field.chars() {
        if c == format.quote {
            escaped.push(format.escape);
        }
        escaped.push(c);
    }
    escaped.push(format.quote);
    escaped
}

/// Converts a resource pack into a zipped archive of delimited text files,
/// one member per bundle with at least one included entry.
pub struct TabularExporter<'a> {
    options: &'a TabularExportOptions,
}

impl<'a> TabularExporter<'a> {
    pub fn new(options: &'a TabularExportOptions) -> Self {
        TabularExporter { options }
    }

    /// Renders every non-empty bundle into the archive and returns the
    /// archive bytes. Bundles whose entries are all filtered out are
    /// omitted entirely.
    pub fn export(&self, pack: &ResourcePack) -> Result<Vec<u8>, Error> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for module in pack.modules() {
            for bundle in module.bundles() {
                if bundle.entry_count() == 0 {
                    continue;
                }
                let rows = self.to_rows(bundle);
                if rows.is_empty() {
                    continue;
                }
                let member = format!(
                    "{}/{}/{}.csv",
                    self.options.export.out_name,
                    module.name(),
                    bundle.name()
                );
                writer.start_file(member, SimpleFileOptions::default())?;
                writer.write_all(rows.join(&self.options.format.eol).as_bytes())?;
            }
        }

        Ok(writer.finish()?.into_inner())
    }

    /// One header row plus one row per included entry, in discovery order.
    fn to_rows(&self, bundle: &Bundle) -> Vec<String> {
        let mut rows: Vec<String> = bundle
            .entries()
            .iter()
            .filter(|entry| self.options.export.includes(entry))
            .map(|entry| self.to_row(entry, bundle.locales()))
            .collect();

        if !rows.is_empty() {
            let format = &self.options.format;
            let header = std::iter::once(KEY_COLUMN_HEADER)
                .chain(bundle.locales().iter().map(String::as_str))
                .map(|field| escape_field(field, format))
                .collect::<Vec<_>>()
                .join(&format.separator.to_string());
            rows.insert(0, header);
        }

        rows
    }

    fn to_row(&self, entry: &Entry, locales: &[String]) -> String {
        let format = &self.options.format;
        let mut fields = vec![escape_field(entry.key(), format)];
        for locale in locales {
            let text = entry
                .translation(locale)
                .map(|translation| translation.text_with_line_breaks(&format.eol))
                .unwrap_or_default();
            fields.push(escape_field(&text, format));
        }
        fields.join(&format.separator.to_string())
    }
}

enum Resolution {
    None,
    One(PathBuf),
    Ambiguous(Vec<PathBuf>),
}

/// Reads a tabular package archive back into a resource pack, resolving
/// each member's module to a directory on disk.
pub struct TabularParser<'a> {
    options: &'a TabularImportOptions,
}

impl<'a> TabularParser<'a> {
    pub fn new(options: &'a TabularImportOptions) -> Self {
        TabularParser { options }
    }

    /// Parses every member of the archive at `archive_path`. Members with an
    /// unexpected path, and all members of unknown or ambiguous modules, are
    /// reported through the sink and skipped; archive and csv failures are
    /// fatal.
    pub fn parse(&self, archive_path: &Path, sink: &dyn EventSink) -> Result<ResourcePack, Error> {
        let file = File::open(archive_path)?;
        let mut archive = ZipArchive::new(file)?;
        let mut pack = ResourcePack::new();
        let mut invalid_modules: Vec<String> = Vec::new();

        for index in 0..archive.len() {
            let mut member = archive.by_index(index)?;
            if member.is_dir() {
                continue;
            }
            let member_name = member.name().to_string();

            let Some(captures) = MEMBER_PATTERN.captures(&member_name) else {
                sink.emit(Event::InvalidMember {
                    member: member_name,
                });
                continue;
            };
            let module_name = captures[1].trim().to_string();
            let bundle_name = captures[2].trim().to_string();

            if invalid_modules.contains(&module_name) {
                continue;
            }

            if pack.module(&module_name).is_none() {
                match self.resolve_module_dir(&module_name)? {
                    Resolution::One(dir) => {
                        pack.create_module(&module_name, dir);
                    }
                    Resolution::None => {
                        sink.emit(Event::UnknownModule {
                            module: module_name.clone(),
                            base_dir: self.options.base_dir.display().to_string(),
                        });
                        invalid_modules.push(module_name);
                        continue;
                    }
                    Resolution::Ambiguous(candidates) => {
                        sink.emit(Event::AmbiguousModule {
                            module: module_name.clone(),
                            base_dir: self.options.base_dir.display().to_string(),
                            candidates: candidates
                                .iter()
                                .map(|path| path.display().to_string())
                                .collect(),
                        });
                        invalid_modules.push(module_name);
                        continue;
                    }
                }
            }

            sink.emit(Event::MemberStart {
                member: member_name.clone(),
                module: module_name.clone(),
                bundle: bundle_name.clone(),
            });

            let mut content = String::new();
            member.read_to_string(&mut content)?;
            let bundle = self.parse_member(&bundle_name, &content, &member_name, sink)?;
            let entry_count = bundle.entry_count();

            if let Some(module) = pack.module_mut(&module_name) {
                module.add_bundle(bundle);
            }

            sink.emit(Event::MemberDone {
                member: member_name,
                module: module_name,
                bundle: bundle_name,
                entry_count,
            });
        }

        Ok(pack)
    }

    /// Searches `base_dir` for directories shaped like
    /// `<module>/templates/resources` and returns the module directories
    /// found. Ambiguity is surfaced, never resolved silently.
    fn resolve_module_dir(&self, module_name: &str) -> Result<Resolution, Error> {
        let base = self.options.base_dir.display().to_string();
        let pattern = format!(
            "{}/**/{}/templates/resources",
            base.trim_end_matches('/'),
            module_name
        );

        let mut candidates: Vec<PathBuf> = Vec::new();
        for entry in glob::glob(&pattern)? {
            let path = entry?;
            if !path.is_dir() {
                continue;
            }
            // matched `<module>/templates/resources`; the anchor is two up
            let Some(anchor) = path.parent().and_then(Path::parent) else {
                continue;
            };
            if !candidates.iter().any(|existing| existing == anchor) {
                candidates.push(anchor.to_path_buf());
            }
        }

        Ok(match candidates.len() {
            0 => Resolution::None,
            1 => Resolution::One(candidates.remove(0)),
            _ => Resolution::Ambiguous(candidates),
        })
    }

    /// Parses one member's delimited content into a bundle. The first column
    /// is the key column regardless of its header text; remaining columns
    /// are kept only when they satisfy the locale grammar.
    fn parse_member(
        &self,
        bundle_name: &str,
        content: &str,
        member_name: &str,
        sink: &dyn EventSink,
    ) -> Result<Bundle, Error> {
        let format = &self.options.format;
        let mut builder = csv::ReaderBuilder::new();
        builder
            .delimiter(format.separator_byte()?)
            .quote(format.quote_byte()?)
            .has_headers(true)
            .flexible(true);
        if format.escape == format.quote {
            builder.double_quote(true);
        } else {
            builder.double_quote(false);
            builder.escape(Some(format.escape_byte()?));
        }
        let mut reader = builder.from_reader(content.as_bytes());

        let mut locale_columns: Vec<(usize, String)> = Vec::new();
        for (column, header) in reader.headers()?.iter().enumerate().skip(1) {
            if is_valid_locale(header) {
                locale_columns.push((column, header.to_string()));
            } else {
                sink.emit(Event::InvalidLocale {
                    locale: header.to_string(),
                    member: member_name.to_string(),
                });
            }
        }

        let mut bundle = Bundle::new(bundle_name);
        for record in reader.records() {
            let record = record?;
            let mut entry = Entry::new(record.get(0).unwrap_or(""));
            for (column, locale) in &locale_columns {
                entry.queue_translation(locale, record.get(*column).unwrap_or(""));
            }
            bundle.queue_entry(entry);
        }

        Ok(bundle)
    }
}
