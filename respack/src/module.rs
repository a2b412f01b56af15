//! A named, filesystem-anchored container of resource bundles.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::bundle::Bundle;
use crate::error::Error;
use crate::events::EventSink;
use crate::io::SaveOptions;

/// A single module: zero or more resource bundles plus the directory they
/// live under, when known.
///
/// The anchor is populated eagerly when the module is built from source
/// files' paths and lazily when it is discovered during package ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    name: String,
    dir: Option<PathBuf>,
    bundles: Vec<Bundle>,
}

/// Per-module counts and locale union; a pure fold over the bundles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleSummary {
    pub bundle_count: usize,
    pub resource_count: usize,
    pub locales: Vec<String>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Module {
            name: name.into(),
            dir: None,
            bundles: Vec::new(),
        }
    }

    pub fn with_dir(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Module {
            name: name.into(),
            dir: Some(dir.into()),
            bundles: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The module's content root, when discovered.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn set_dir(&mut self, dir: impl Into<PathBuf>) {
        self.dir = Some(dir.into());
    }

    /// Adds a bundle, replacing any existing bundle with the same name.
    pub fn add_bundle(&mut self, bundle: Bundle) {
        match self
            .bundles
            .iter_mut()
            .find(|existing| existing.name() == bundle.name())
        {
            Some(existing) => *existing = bundle,
            None => self.bundles.push(bundle),
        }
    }

    pub fn bundle(&self, name: &str) -> Option<&Bundle> {
        self.bundles.iter().find(|bundle| bundle.name() == name)
    }

    pub fn bundle_mut(&mut self, name: &str) -> Option<&mut Bundle> {
        self.bundles.iter_mut().find(|bundle| bundle.name() == name)
    }

    /// Bundles in insertion order.
    pub fn bundles(&self) -> &[Bundle] {
        &self.bundles
    }

    /// Merges every owned bundle into this module's directory. Fails when
    /// the module was never anchored to the filesystem.
    pub fn save(&self, options: &SaveOptions, sink: &dyn EventSink) -> Result<(), Error> {
        let dir = self
            .dir
            .as_deref()
            .ok_or_else(|| Error::UnanchoredModule(self.name.clone()))?;
        for bundle in &self.bundles {
            bundle.save(dir, options, sink)?;
        }
        Ok(())
    }

    /// Counts bundles and resources and unions locales across bundles.
    pub fn summary(&self) -> ModuleSummary {
        let mut summary = ModuleSummary {
            bundle_count: 0,
            resource_count: 0,
            locales: Vec::new(),
        };
        for bundle in &self.bundles {
            summary.bundle_count += 1;
            summary.resource_count += bundle.entry_count();
            for locale in bundle.locales() {
                if !summary.locales.iter().any(|existing| existing == locale) {
                    summary.locales.push(locale.clone());
                }
            }
        }
        summary
    }
}
