//! The aggregate root: every module, bundle, and entry of one run.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::bundle::Bundle;
use crate::error::Error;
use crate::events::{Event, EventSink};
use crate::io::json::JsonExporter;
use crate::io::tabular::{TabularExportOptions, TabularImportOptions, TabularExporter, TabularParser};
use crate::io::{JsonExportOptions, SaveOptions};
use crate::locale::DEFAULT_LOCALE;
use crate::module::{Module, ModuleSummary};
use crate::properties::{self, Property};

lazy_static! {
    // <module>/templates/resources/<bundle>[_<locale>].properties
    static ref SOURCE_FILE_PATTERN: Regex = Regex::new(
        r"(?:.*/)?([^/]+)/templates/resources/([^/.]+?)(?:_([a-z]{2}(?:_[A-Z]{2})?))?\.properties$",
    )
    .unwrap();
}

/// All the resource bundles of a set of modules; the single entry and exit
/// point for building from source files, transcoding to and from the tabular
/// package, and merging back. One pack is constructed per run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourcePack {
    modules: Vec<Module>,
}

/// Pack-wide counts with a per-module breakdown; recomputed on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackSummary {
    pub modules: usize,
    pub bundles: usize,
    pub resources: usize,
    pub locales: Vec<String>,
    pub details: BTreeMap<String, ModuleSummary>,
}

/// The `(module, bundle, locale)` triple extracted from one source path.
/// Paths that do not match the expected shape degrade to empty identifiers
/// rather than failing the run.
pub(crate) fn identify_source_file(path: &str) -> (String, String, String) {
    let normalized = path.replace('\\', "/");
    match SOURCE_FILE_PATTERN.captures(&normalized) {
        Some(captures) => (
            captures[1].to_string(),
            captures[2].to_string(),
            captures
                .get(3)
                .map_or(DEFAULT_LOCALE.to_string(), |m| m.as_str().to_string()),
        ),
        None => (String::new(), String::new(), String::new()),
    }
}

/// Filesystem anchor of one source path: everything up to and including the
/// module directory. `None` when the path does not match the expected shape.
pub(crate) fn source_file_anchor(path: &str) -> Option<PathBuf> {
    let normalized = path.replace('\\', "/");
    let module = SOURCE_FILE_PATTERN.captures(&normalized)?.get(1)?;
    Some(PathBuf::from(&normalized[..module.end()]))
}

impl ResourcePack {
    pub fn new() -> Self {
        ResourcePack::default()
    }

    /// Builds a pack by reading the given `.properties` files, extracting
    /// each file's module, bundle, and locale from its path. A missing
    /// locale suffix means the default locale. Each module is anchored to
    /// the matched path prefix, so the pack can be saved right back.
    pub fn from_files<P: AsRef<Path>>(paths: &[P], sink: &dyn EventSink) -> Result<Self, Error> {
        let mut pack = ResourcePack::new();
        sink.emit(Event::BuildStart {
            file_count: paths.len(),
        });

        for (index, path) in paths.iter().enumerate() {
            let path = path.as_ref();
            let display = path.display().to_string();
            let (module, bundle, locale) = identify_source_file(&display);

            sink.emit(Event::BuildFile {
                path: display.clone(),
                module: module.clone(),
                bundle: bundle.clone(),
                locale: locale.clone(),
                index,
            });

            let content = fs::read_to_string(path)?;
            let resources = properties::parse(&content);
            let entry_count = resources.len();
            pack.add_properties(&module, &bundle, &locale, resources);

            // anchor the module to the source tree so the pack can be saved
            if let Some(anchor) = source_file_anchor(&display)
                && let Some(owner) = pack.module_mut(&module)
                && owner.dir().is_none()
            {
                owner.set_dir(anchor);
            }

            sink.emit(Event::BuildFileDone {
                path: display,
                entry_count,
            });
        }

        sink.emit(Event::BuildComplete);
        Ok(pack)
    }

    /// Builds a pack from every `.properties` file found under the given
    /// module base directories. Results are sorted so contribution order is
    /// deterministic.
    pub fn from_module_dirs<P: AsRef<Path>>(
        paths: &[P],
        sink: &dyn EventSink,
    ) -> Result<Self, Error> {
        let mut files = Vec::new();
        for path in paths {
            let base = path.as_ref().display().to_string();
            let pattern = format!(
                "{}/**/templates/resources/*.properties",
                base.trim_end_matches('/')
            );
            for entry in glob::glob(&pattern)? {
                files.push(entry?);
            }
        }
        files.sort();
        files.dedup();
        Self::from_files(&files, sink)
    }

    /// Ingests a tabular exchange package, resolving each member's module to
    /// a directory under `base_dir`. Unknown and ambiguous modules are
    /// reported through the sink and excluded for the rest of the run.
    pub fn from_tabular_package(
        archive_path: &Path,
        options: &TabularImportOptions,
        sink: &dyn EventSink,
    ) -> Result<Self, Error> {
        sink.emit(Event::IngestStart);
        let pack = TabularParser::new(options).parse(archive_path, sink)?;
        sink.emit(Event::IngestComplete);
        Ok(pack)
    }

    /// Folds one source file's worth of resources into the pack, creating
    /// the module and bundle on first sight.
    pub fn add_properties(
        &mut self,
        module_name: &str,
        bundle_name: &str,
        locale: &str,
        resources: Vec<Property>,
    ) {
        if self.module(module_name).is_none() {
            self.modules.push(Module::new(module_name));
        }
        let Some(module) = self.module_mut(module_name) else {
            return;
        };

        match module.bundle_mut(bundle_name) {
            Some(bundle) => bundle.add_translations(locale, resources),
            None => module.add_bundle(Bundle::from_properties(bundle_name, locale, resources)),
        }
    }

    /// Modules in order of first discovery.
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|module| module.name() == name)
    }

    pub fn module_mut(&mut self, name: &str) -> Option<&mut Module> {
        self.modules.iter_mut().find(|module| module.name() == name)
    }

    /// Creates an empty module anchored at `dir` and returns it. Replaces
    /// any same-named module's anchor but keeps its bundles.
    pub fn create_module(&mut self, name: &str, dir: impl Into<PathBuf>) -> &mut Module {
        let position = match self
            .modules
            .iter()
            .position(|module| module.name() == name)
        {
            Some(position) => {
                self.modules[position].set_dir(dir);
                position
            }
            None => {
                self.modules.push(Module::with_dir(name, dir));
                self.modules.len() - 1
            }
        };
        &mut self.modules[position]
    }

    /// Aggregates counts and the locale union across every module.
    pub fn summary(&self) -> PackSummary {
        let mut summary = PackSummary {
            modules: 0,
            bundles: 0,
            resources: 0,
            locales: Vec::new(),
            details: BTreeMap::new(),
        };

        for module in &self.modules {
            let module_summary = module.summary();
            summary.modules += 1;
            summary.bundles += module_summary.bundle_count;
            summary.resources += module_summary.resource_count;
            for locale in &module_summary.locales {
                if !summary.locales.iter().any(|existing| existing == locale) {
                    summary.locales.push(locale.clone());
                }
            }
            summary
                .details
                .insert(module.name().to_string(), module_summary);
        }

        summary
    }

    /// Merges the pack into its modules' source trees, one module at a time
    /// in order of first discovery.
    pub fn save(&self, options: &SaveOptions, sink: &dyn EventSink) -> Result<(), Error> {
        for module in &self.modules {
            sink.emit(Event::MergeModuleStart {
                module: module.name().to_string(),
            });
            module.save(options, sink)?;
            sink.emit(Event::MergeModuleDone {
                module: module.name().to_string(),
            });
        }
        Ok(())
    }

    /// Exports the pack as a zip archive of delimited text members, one per
    /// non-empty bundle. Returns the archive bytes.
    pub fn to_tabular_package(
        &self,
        options: &TabularExportOptions,
        sink: &dyn EventSink,
    ) -> Result<Vec<u8>, Error> {
        sink.emit(Event::ExportStart);
        let bytes = TabularExporter::new(options).export(self)?;
        sink.emit(Event::ExportComplete);
        Ok(bytes)
    }

    /// Exports the pack as one nested JSON document
    /// (`module → bundle → key → locale → text`).
    pub fn to_json(&self, options: &JsonExportOptions, sink: &dyn EventSink) -> Value {
        sink.emit(Event::ExportStart);
        let value = JsonExporter::new(options).export(self);
        sink.emit(Event::ExportComplete);
        value
    }
}
