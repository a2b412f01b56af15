//! Lifecycle events emitted while building, exporting, ingesting, and
//! merging a resource pack.
//!
//! The sink is an explicit parameter on every top-level operation rather
//! than a process-wide channel, so callers can attach a local observer (the
//! CLI prints them, tests collect them) without any shared state. Events are
//! a side channel only; they never influence return values.

/// A single lifecycle event with the payload relevant to its boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Pack construction from source files is starting.
    BuildStart { file_count: usize },
    /// One source file is about to be read.
    BuildFile {
        path: String,
        module: String,
        bundle: String,
        locale: String,
        index: usize,
    },
    /// One source file has been folded into the pack.
    BuildFileDone { path: String, entry_count: usize },
    /// Pack construction finished.
    BuildComplete,

    /// Package export is starting.
    ExportStart,
    /// Package export finished.
    ExportComplete,

    /// Package ingest is starting.
    IngestStart,
    /// An archive member path does not match `<module>/<bundle>.csv`.
    InvalidMember { member: String },
    /// A module name had no candidate directory under the base directory.
    UnknownModule { module: String, base_dir: String },
    /// A module name had more than one candidate directory; never resolved
    /// silently.
    AmbiguousModule {
        module: String,
        base_dir: String,
        candidates: Vec<String>,
    },
    /// A header column failed the locale grammar and was dropped.
    InvalidLocale { locale: String, member: String },
    /// A member is about to be parsed.
    MemberStart {
        member: String,
        module: String,
        bundle: String,
    },
    /// A member has been parsed into a bundle.
    MemberDone {
        member: String,
        module: String,
        bundle: String,
        entry_count: usize,
    },
    /// Package ingest finished.
    IngestComplete,

    /// Merge of one module into its source tree is starting.
    MergeModuleStart { module: String },
    /// Merge of one module finished.
    MergeModuleDone { module: String },
    /// One target file is about to be updated.
    MergeFileStart { path: String },
    /// One target file has been written.
    MergeFileDone { path: String, upserts: usize },
}

/// Receiver for lifecycle events.
pub trait EventSink {
    fn emit(&self, event: Event);
}

/// Sink that drops every event; the default when no observer is needed.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: Event) {}
}

impl<F: Fn(Event)> EventSink for F {
    fn emit(&self, event: Event) {
        self(event)
    }
}
