#![forbid(unsafe_code)]
//! Round-trips key/value localization bundles through a translator-friendly
//! tabular package.
//!
//! A [`ResourcePack`] aggregates the `.properties` resource bundles of a set
//! of modules into one multi-locale view, exports them as a zip archive of
//! delimited text files (one per bundle, one column per locale), and merges
//! an edited archive back into the original files without disturbing
//! untouched entries or formatting.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use respack::{NullSink, ResourcePack, SaveOptions, TabularImportOptions, TabularOptions};
//!
//! // Export everything under ./modules for translation
//! let pack = ResourcePack::from_module_dirs(&["./modules"], &NullSink)?;
//! let bytes = pack.to_tabular_package(&Default::default(), &NullSink)?;
//! std::fs::write("resources.zip", bytes)?;
//!
//! // ...translator edits the archive's CSV files...
//!
//! // Merge the edited archive back into the source files
//! let options = TabularImportOptions {
//!     format: TabularOptions::default(),
//!     base_dir: "./modules".into(),
//! };
//! let pack = ResourcePack::from_tabular_package("resources.zip".as_ref(), &options, &NullSink)?;
//! pack.save(&SaveOptions::default(), &NullSink)?;
//! # Ok::<(), respack::Error>(())
//! ```

pub mod bundle;
pub mod entry;
pub mod error;
pub mod events;
pub mod io;
pub mod locale;
pub mod module;
pub mod pack;
pub mod properties;

// Re-export the types most callers need
pub use crate::{
    bundle::Bundle,
    entry::{Entry, Translation},
    error::Error,
    events::{Event, EventSink, NullSink},
    io::tabular::{TabularExportOptions, TabularImportOptions, TabularOptions},
    io::{ExportOptions, JsonExportOptions, PackageFormat, SaveOptions},
    locale::{DEFAULT_LOCALE, is_valid_locale},
    module::{Module, ModuleSummary},
    pack::{PackSummary, ResourcePack},
    properties::{PropertiesEditor, Property},
};
