//! `depscan`: discover dependency manifests across language ecosystems and
//! describe each one in a normalized, best-effort record.
//!
//! Discovery ([`discovery`]) walks a project under an exclusion overlay and
//! keeps allow-listed manifest files. Each file is dispatched through a
//! priority-ordered [`ManifestParserRegistry`] to one of the [`parsers`],
//! and [`scan`] collects the resulting [`ManifestRecord`]s and the
//! per-manager summary.

pub mod config;
pub mod discovery;
pub mod error;
pub mod glob;
pub mod ignore;
pub mod logging;
pub mod metadata;
pub mod models;
pub mod parsers;
pub mod registry;
pub mod report;
pub mod scan;

pub use config::{load_config, Config};
pub use discovery::{is_manifest_candidate, iter_manifest_files, ManifestAllowList};
pub use error::ScanError;
pub use ignore::{GitIgnore, IgnoreMatcher};
pub use metadata::{build_summary, infer_manifest_type};
pub use models::{DependencyReport, ManifestRecord, ParsedManifest};
pub use parsers::build_parser_registry;
pub use registry::{ManifestParser, ManifestParserRegistry, ParserRegistration};
pub use scan::{collect_dependency_info, default_registry, parse_manifest, scan, Scanner};
