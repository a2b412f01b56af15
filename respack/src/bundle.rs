//! A named collection of entries sharing a scope, aggregated across all the
//! per-locale source files of that scope.

use std::fs;
use std::path::{Path, PathBuf};

use crate::entry::Entry;
use crate::error::Error;
use crate::events::{Event, EventSink};
use crate::io::SaveOptions;
use crate::locale::DEFAULT_LOCALE;
use crate::properties::{PropertiesEditor, Property};

/// A single resource bundle: all the resource keys related to one part of
/// the application and their translations across every locale seen so far.
///
/// Invariant: the bundle's locale set is the union of its entries' locale
/// sets, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    name: String,
    locales: Vec<String>,
    entries: Vec<Entry>,
}

impl Bundle {
    pub fn new(name: impl Into<String>) -> Self {
        Bundle {
            name: name.into(),
            locales: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Creates a bundle seeded with one locale's resources.
    pub fn from_properties(
        name: impl Into<String>,
        locale: &str,
        resources: Vec<Property>,
    ) -> Self {
        let mut bundle = Bundle::new(name);
        bundle.add_translations(locale, resources);
        bundle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Folds one source file's resources for one locale into the bundle:
    /// existing keys gain the locale's translation, unseen keys become new
    /// entries. This is how multiple single-locale files accumulate into one
    /// multi-locale view.
    pub fn add_translations(&mut self, locale: &str, resources: Vec<Property>) {
        self.register_locale(locale);

        for resource in resources {
            match self
                .entries
                .iter_mut()
                .find(|entry| entry.key() == resource.key)
            {
                Some(entry) => entry.register_translation(locale, resource),
                None => self.entries.push(Entry::from_property(locale, resource)),
            }
        }
    }

    /// Adopts a fully populated entry wholesale (one ingested row yields one
    /// entry across all locales at once). Last write wins on key collision.
    pub fn queue_entry(&mut self, entry: Entry) {
        let locales: Vec<String> = entry.locales().map(str::to_string).collect();
        for locale in &locales {
            self.register_locale(locale);
        }

        match self
            .entries
            .iter_mut()
            .find(|existing| existing.key() == entry.key())
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    fn register_locale(&mut self, locale: &str) {
        if !self.locales.iter().any(|existing| existing == locale) {
            self.locales.push(locale.to_string());
        }
    }

    /// Locales seen across this bundle's entries, in first-seen order.
    pub fn locales(&self) -> &[String] {
        &self.locales
    }

    /// Entries in discovery order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entry(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.key() == key)
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Resolves the target file for `locale` under the module directory: the
    /// default locale maps to the unsuffixed filename, every other locale
    /// appends `_<locale>`.
    pub fn target_file(&self, directory: &Path, locale: &str) -> PathBuf {
        let file_name = if locale == DEFAULT_LOCALE {
            format!("{}.properties", self.name)
        } else {
            format!("{}_{}.properties", self.name, locale)
        };
        directory.join("templates").join("resources").join(file_name)
    }

    /// Merges every locale of this bundle into its target file under
    /// `directory`, creating files as needed. Strictly an upsert: keys absent
    /// from the bundle are never removed, and with `ignore_if_empty` set an
    /// empty translation leaves the target key untouched. A file whose
    /// content would not change is not rewritten.
    pub fn save(
        &self,
        directory: &Path,
        options: &SaveOptions,
        sink: &dyn EventSink,
    ) -> Result<(), Error> {
        for locale in &self.locales {
            let path = self.target_file(directory, locale);
            sink.emit(Event::MergeFileStart {
                path: path.display().to_string(),
            });

            let content = if path.exists() {
                fs::read_to_string(&path)?
            } else {
                String::new()
            };
            let mut editor = PropertiesEditor::new(&content);

            let mut upserts = 0;
            for entry in &self.entries {
                let text = entry.translation_or(locale, "");
                if !text.is_empty() || !options.ignore_if_empty {
                    editor.upsert(entry.key(), text);
                    upserts += 1;
                }
            }

            // leave the file untouched when the merge changed nothing
            let serialized = format!("{}\n", editor.serialize().trim_end());
            if upserts > 0 && serialized != content {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, serialized)?;
            }

            sink.emit(Event::MergeFileDone {
                path: path.display().to_string(),
                upserts,
            });
        }
        Ok(())
    }
}
