//! A single resource key and its per-locale translations.

use crate::properties::{Property, restore_line_breaks};

/// One translation for one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    /// Parsed from a source file; keeps the raw property so line breaks can
    /// be reconstructed on export.
    Resolved { text: String, raw: Property },
    /// Read from an ingested package, pending persistence; no source
    /// back-reference exists yet.
    Queued { text: String },
}

impl Translation {
    /// The translated text, regardless of origin.
    pub fn text(&self) -> &str {
        match self {
            Translation::Resolved { text, .. } => text,
            Translation::Queued { text } => text,
        }
    }

    /// The text with original line breaks restored using the given EOL
    /// sequence, when the source layout is known.
    pub fn text_with_line_breaks(&self, eol: &str) -> String {
        match self {
            Translation::Resolved { raw, .. } => restore_line_breaks(raw, eol),
            Translation::Queued { text } => text.clone(),
        }
    }
}

/// A single resource key and all its translations, keyed by locale in
/// first-seen order. The atomic unit of merge and comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    key: String,
    translations: Vec<(String, Translation)>,
}

impl Entry {
    pub fn new(key: impl Into<String>) -> Self {
        Entry {
            key: key.into(),
            translations: Vec::new(),
        }
    }

    /// Creates an entry seeded with one resolved translation.
    pub fn from_property(locale: &str, property: Property) -> Self {
        let mut entry = Entry::new(property.key.clone());
        entry.register_translation(locale, property);
        entry
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Records a resolved translation read from a source file. Last write
    /// wins when called twice for the same locale.
    pub fn register_translation(&mut self, locale: &str, property: Property) {
        self.set(
            locale,
            Translation::Resolved {
                text: property.value.clone(),
                raw: property,
            },
        );
    }

    /// Records a translation pending persistence, with no source
    /// back-reference. Last write wins per locale.
    pub fn queue_translation(&mut self, locale: &str, text: impl Into<String>) {
        self.set(locale, Translation::Queued { text: text.into() });
    }

    fn set(&mut self, locale: &str, translation: Translation) {
        if let Some(slot) = self
            .translations
            .iter_mut()
            .find(|(existing, _)| existing == locale)
        {
            slot.1 = translation;
        } else {
            self.translations.push((locale.to_string(), translation));
        }
    }

    /// Locales this entry has a translation for, in first-seen order.
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.translations.iter().map(|(locale, _)| locale.as_str())
    }

    /// True iff every given locale has a recorded translation, empty or not.
    pub fn has_all_locales<S: AsRef<str>>(&self, locales: &[S]) -> bool {
        locales
            .iter()
            .all(|locale| self.translation(locale.as_ref()).is_some())
    }

    /// The translation for `locale`, if recorded. Total over absent locales.
    pub fn translation(&self, locale: &str) -> Option<&Translation> {
        self.translations
            .iter()
            .find(|(existing, _)| existing == locale)
            .map(|(_, translation)| translation)
    }

    /// The text for `locale`, or `default` when the locale is absent.
    pub fn translation_or<'a>(&'a self, locale: &str, default: &'a str) -> &'a str {
        self.translation(locale)
            .map(Translation::text)
            .unwrap_or(default)
    }
}
