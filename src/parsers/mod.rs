//! Ecosystem manifest parsers.
//!
//! Each submodule exposes `register`, which adds its parsers to a
//! [`ManifestParserRegistry`], plus the parser functions themselves.

pub mod clojure;
pub mod dart;
pub mod dotnet;
pub mod elixir;
pub mod generic;
pub mod go;
pub mod helpers;
pub mod java;
pub mod javascript;
pub mod php;
pub mod python;
pub mod ruby;
pub mod swift;
pub mod toml_based;

use crate::registry::ManifestParserRegistry;

/// Registry with every built-in parser and the plain-text fallback.
pub fn build_parser_registry() -> ManifestParserRegistry {
    let mut registry = ManifestParserRegistry::with_fallback(generic::parse_generic_text);
    javascript::register(&mut registry);
    python::register(&mut registry);
    php::register(&mut registry);
    go::register(&mut registry);
    java::register(&mut registry);
    dotnet::register(&mut registry);
    ruby::register(&mut registry);
    swift::register(&mut registry);
    elixir::register(&mut registry);
    clojure::register(&mut registry);
    dart::register(&mut registry);
    toml_based::register(&mut registry);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn manifest_type(registry: &ManifestParserRegistry, dir: &Path, name: &str, body: &str) -> String {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        registry
            .resolve(&path)
            .unwrap()
            .parse(&path)
            .unwrap()
            .manifest_type
    }

    #[test]
    fn test_builtin_registry_dispatch() {
        let registry = build_parser_registry();
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        assert_eq!(manifest_type(&registry, root, "package.json", "{}"), "package_json");
        assert_eq!(manifest_type(&registry, root, "Cargo.toml", "[package]\n"), "Cargo.toml");
        assert_eq!(manifest_type(&registry, root, "pyproject.toml", ""), "pyproject.toml");
        assert_eq!(manifest_type(&registry, root, "Project.toml", ""), "Project.toml");
        assert_eq!(manifest_type(&registry, root, "taplo.toml", ""), "taplo.toml");
        assert_eq!(
            manifest_type(&registry, root, "requirements-dev.txt", "flask\n"),
            "requirements_txt"
        );
        assert_eq!(manifest_type(&registry, root, "App.vbproj", "<Project/>"), "vbproj_project");
        assert_eq!(manifest_type(&registry, root, "widget.gemspec", ""), "gemspec");
        assert_eq!(manifest_type(&registry, root, "go.mod", ""), "go_mod");
        assert_eq!(manifest_type(&registry, root, "Custom.MF", "x"), "Custom.MF");
    }

    #[test]
    fn test_requirements_variant_resolves_to_pip() {
        let registry = build_parser_registry();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("requirements-prod.txt");
        std::fs::write(&path, "flask==3.0.0\n").unwrap();

        let parsed = registry.resolve(&path).unwrap().parse(&path).unwrap();
        assert_eq!(parsed.manager.as_deref(), Some("pip"));
        assert_eq!(parsed.manifest_type, "requirements_txt");
        assert_eq!(
            parsed.data.unwrap(),
            serde_json::json!([{"name": "flask", "version": "3.0.0"}])
        );
    }

    #[test]
    fn test_builtin_registry_has_fallback() {
        assert!(build_parser_registry().has_fallback());
    }
}
