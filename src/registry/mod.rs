//! Parser registration and priority-ordered lookup.
//!
//! A [`ParserRegistration`] binds a [`ManifestParser`] to match criteria
//! (exact names, lowercase suffixes, glob patterns, a predicate) and a
//! priority. [`ManifestParserRegistry::resolve`] returns the parser of the
//! highest-priority registration matching a path, falling back to the
//! registry's fallback parser when nothing matches.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::error::ScanError;
use crate::glob::Glob;
use crate::models::ParsedManifest;

/// Turns one manifest file into a normalized description.
pub trait ManifestParser: Send + Sync {
    fn parse(&self, path: &Path) -> Result<ParsedManifest>;
}

impl<F> ManifestParser for F
where
    F: Fn(&Path) -> Result<ParsedManifest> + Send + Sync,
{
    fn parse(&self, path: &Path) -> Result<ParsedManifest> {
        self(path)
    }
}

pub type Predicate = fn(&Path) -> bool;

/// Associates match criteria and a priority with a parser.
///
/// A registration matches when any of its criteria is satisfied.
#[derive(Clone)]
pub struct ParserRegistration {
    parser: Arc<dyn ManifestParser>,
    names: Vec<String>,
    suffixes: Vec<String>,
    patterns: Vec<Glob>,
    predicate: Option<Predicate>,
    priority: i32,
}

impl ParserRegistration {
    pub fn new(parser: impl ManifestParser + 'static) -> Self {
        Self {
            parser: Arc::new(parser),
            names: Vec::new(),
            suffixes: Vec::new(),
            patterns: Vec::new(),
            predicate: None,
            priority: 0,
        }
    }

    /// Exact file names, e.g. `package.json`.
    pub fn names(mut self, names: &[&str]) -> Self {
        self.names.extend(names.iter().map(|s| s.to_string()));
        self
    }

    /// Final extensions including the dot, e.g. `.toml`. Compared lowercase.
    pub fn suffixes(mut self, suffixes: &[&str]) -> Self {
        self.suffixes
            .extend(suffixes.iter().map(|s| s.to_lowercase()));
        self
    }

    /// fnmatch-style patterns tested against the file name.
    pub fn patterns(mut self, patterns: &[&str]) -> Self {
        self.patterns.extend(patterns.iter().map(|p| Glob::fnmatch(p)));
        self
    }

    pub fn predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn parser(&self) -> &dyn ManifestParser {
        self.parser.as_ref()
    }

    pub fn matches(&self, path: &Path) -> bool {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if self.names.iter().any(|n| *n == name) {
            return true;
        }
        if !self.suffixes.is_empty() {
            if let Some(suffix) = lowercase_suffix(path) {
                if self.suffixes.contains(&suffix) {
                    return true;
                }
            }
        }
        if self.patterns.iter().any(|glob| glob.is_match(&name)) {
            return true;
        }
        matches!(self.predicate, Some(predicate) if predicate(path))
    }
}

/// `.ext` of the final component, lowercased.
fn lowercase_suffix(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}

/// Lookup table resolving the parser for a manifest path.
///
/// Registrations are kept sorted by descending priority; equal priorities keep
/// registration order. Build it once, then share it read-only.
#[derive(Clone, Default)]
pub struct ManifestParserRegistry {
    registrations: Vec<ParserRegistration>,
    fallback: Option<Arc<dyn ManifestParser>>,
}

impl ManifestParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fallback(parser: impl ManifestParser + 'static) -> Self {
        Self {
            registrations: Vec::new(),
            fallback: Some(Arc::new(parser)),
        }
    }

    /// Append a registration. Existing registrations are never replaced.
    pub fn register(&mut self, registration: ParserRegistration) {
        self.registrations.push(registration);
        // Stable sort: ties keep insertion order
        self.registrations
            .sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    pub fn registrations(&self) -> &[ParserRegistration] {
        &self.registrations
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    pub fn resolve(&self, path: &Path) -> Result<&dyn ManifestParser, ScanError> {
        if let Some(registration) = self.registrations.iter().find(|r| r.matches(path)) {
            return Ok(registration.parser());
        }
        self.fallback
            .as_deref()
            .ok_or_else(|| ScanError::NoParser {
                path: path.to_path_buf(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn labelled(label: &'static str) -> impl ManifestParser {
        move |_: &Path| Ok::<_, anyhow::Error>(ParsedManifest::new(label, None, None, String::new()))
    }

    fn resolved_type(registry: &ManifestParserRegistry, path: &str) -> String {
        match registry.resolve(Path::new(path)) {
            Ok(parser) => parser.parse(Path::new(path)).unwrap().manifest_type,
            Err(err) => panic!("resolution failed: {err}"),
        }
    }

    #[test]
    fn test_prefers_highest_priority_match() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let low_calls = Arc::clone(&calls);
        let high_calls = Arc::clone(&calls);

        let mut registry = ManifestParserRegistry::new();
        registry.register(
            ParserRegistration::new(move |_: &Path| {
                low_calls.lock().unwrap().push("low");
                Ok::<_, anyhow::Error>(ParsedManifest::new("low", None, None, String::new()))
            })
            .suffixes(&[".json"])
            .priority(10),
        );
        registry.register(
            ParserRegistration::new(move |_: &Path| {
                high_calls.lock().unwrap().push("high");
                Ok::<_, anyhow::Error>(ParsedManifest::new("high", None, None, String::new()))
            })
            .names(&["package.json"])
            .priority(20),
        );

        assert_eq!(resolved_type(&registry, "package.json"), "high");
        assert_eq!(*calls.lock().unwrap(), vec!["high"]);
    }

    #[test]
    fn test_priority_independent_of_registration_order() {
        let mut registry = ManifestParserRegistry::new();
        registry.register(
            ParserRegistration::new(labelled("high"))
                .names(&["package.json"])
                .priority(20),
        );
        registry.register(
            ParserRegistration::new(labelled("low"))
                .suffixes(&[".json"])
                .priority(10),
        );
        assert_eq!(resolved_type(&registry, "package.json"), "high");
        assert_eq!(resolved_type(&registry, "tsconfig.json"), "low");
    }

    #[test]
    fn test_equal_priority_keeps_registration_order() {
        let mut registry = ManifestParserRegistry::new();
        registry.register(ParserRegistration::new(labelled("first")).suffixes(&[".toml"]));
        registry.register(ParserRegistration::new(labelled("second")).names(&["a.toml"]));
        assert_eq!(resolved_type(&registry, "a.toml"), "first");
    }

    #[test]
    fn test_dedicated_parser_beats_catch_all() {
        let mut registry = ManifestParserRegistry::new();
        registry.register(
            ParserRegistration::new(labelled("generic_toml"))
                .suffixes(&[".toml"])
                .priority(10),
        );
        registry.register(
            ParserRegistration::new(labelled("cargo"))
                .names(&["Cargo.toml"])
                .priority(80),
        );
        assert_eq!(resolved_type(&registry, "crates/core/Cargo.toml"), "cargo");
        assert_eq!(resolved_type(&registry, "rustfmt.toml"), "generic_toml");
    }

    #[test]
    fn test_falls_back_when_no_match() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let fallback_seen = Arc::clone(&seen);
        let registry = ManifestParserRegistry::with_fallback(move |path: &Path| {
            fallback_seen.lock().unwrap().push(path.to_path_buf());
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            Ok::<_, anyhow::Error>(ParsedManifest::new(name, None, None, String::new()))
        });

        assert_eq!(resolved_type(&registry, "Custom.MF"), "Custom.MF");
        assert_eq!(*seen.lock().unwrap(), vec![Path::new("Custom.MF").to_path_buf()]);
    }

    #[test]
    fn test_no_match_without_fallback_fails() {
        let mut registry = ManifestParserRegistry::new();
        registry.register(ParserRegistration::new(labelled("npm")).names(&["package.json"]));
        assert!(!registry.has_fallback());
        assert!(matches!(
            registry.resolve(Path::new("Custom.MF")),
            Err(ScanError::NoParser { .. })
        ));
    }

    #[test]
    fn test_criteria_are_ored() {
        fn has_requirements(path: &Path) -> bool {
            path.to_string_lossy().to_lowercase().contains("requirements")
        }
        let registration = ParserRegistration::new(labelled("req"))
            .suffixes(&[".IN"])
            .patterns(&["*.pip"])
            .predicate(has_requirements);

        assert!(registration.matches(Path::new("dev.in")));
        assert!(registration.matches(Path::new("base.pip")));
        assert!(registration.matches(Path::new("Requirements-Prod.cfg")));
        assert!(!registration.matches(Path::new("setup.cfg")));
    }

    #[test]
    fn test_reregistration_appends() {
        let mut registry = ManifestParserRegistry::new();
        registry.register(ParserRegistration::new(labelled("a")).names(&["go.mod"]).priority(5));
        registry.register(ParserRegistration::new(labelled("b")).names(&["go.mod"]).priority(5));
        assert_eq!(registry.registrations().len(), 2);
        assert_eq!(resolved_type(&registry, "go.mod"), "a");
    }
}
