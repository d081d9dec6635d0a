use std::fs;
use std::path::Path;
use std::sync::Arc;

use depscan::config::ExclusionConfig;
use depscan::{
    build_parser_registry, collect_dependency_info, scan, GitIgnore, IgnoreMatcher,
    ManifestParserRegistry, ParserRegistration, ParsedManifest, Scanner,
};
use serde_json::json;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn polyglot_repo(root: &Path) {
    write(
        root,
        "frontend/package.json",
        r#"{"dependencies": {"react": "^18.2.0"}, "devDependencies": {"vite": "5.0.0"}}"#,
    );
    write(root, "frontend/node_modules/react/package.json", r#"{"name": "react"}"#);
    write(root, "frontend/package-lock.json", "{}");
    write(root, "backend/requirements.txt", "flask==3.0.0\nrequests\n# comment\n");
    write(root, "backend/requirements/dev.txt", "pytest==8.0.0\n");
    write(
        root,
        "backend/pyproject.toml",
        "[project]\nname = \"api\"\ndependencies = [\"fastapi>=0.110\"]\n",
    );
    write(root, "core/Cargo.toml", "[dependencies]\nserde = \"1\"\n");
    write(root, "core/rust-toolchain.toml", "[toolchain]\nchannel = \"stable\"\n");
    write(root, "svc/go.mod", "module svc\n\ngo 1.22\n\nrequire github.com/pkg/errors v0.9.1\n");
    write(root, "svc/App.csproj", "<Project><ItemGroup><PackageReference Include=\"Serilog\" Version=\"3.1.1\" /></ItemGroup></Project>");
    write(root, "jvm/pom.xml", "<project><dependencies></project>");
    write(root, "docs/README.md", "# docs\n");
}

#[test]
fn scans_polyglot_repository() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    polyglot_repo(root);

    let report = collect_dependency_info(root, None, 8).unwrap();
    let paths: Vec<&str> = report.manifests.iter().map(|m| m.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "backend/pyproject.toml",
            "backend/requirements/dev.txt",
            "backend/requirements.txt",
            "core/Cargo.toml",
            "frontend/package.json",
            "jvm/pom.xml",
            "svc/App.csproj",
            "svc/go.mod",
        ]
    );

    let find = |p: &str| report.manifests.iter().find(|m| m.path == p).unwrap();
    assert_eq!(find("frontend/package.json").data.as_ref().unwrap()["dependencies"]["react"], "^18.2.0");
    assert_eq!(find("backend/requirements/dev.txt").manifest_type, "requirements_txt");
    assert_eq!(find("svc/App.csproj").manifest_type, "csproj_project");

    let broken = find("jvm/pom.xml");
    assert!(broken.error.is_some());
    assert_eq!(broken.manifest_type, "pom.xml");
    assert!(broken.manager.is_none());

    assert_eq!(report.summary["pip"], vec!["backend/requirements/dev.txt", "backend/requirements.txt"]);
    assert_eq!(report.summary["unknown"], vec!["jvm/pom.xml"]);
    assert_eq!(report.summary["cargo"], vec!["core/Cargo.toml"]);
    assert_eq!(report.summary[".net"], vec!["svc/App.csproj"]);
}

#[test]
fn record_json_shape() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "Gemfile", "gem \"rails\", \"~> 7.1\"\n");

    let records = scan(dir.path(), None, 8).unwrap();
    let value = serde_json::to_value(&records[0]).unwrap();
    assert_eq!(
        value,
        json!({
            "path": "Gemfile",
            "type": "Gemfile",
            "manager": "bundler",
            "data": {"dependencies": [{"name": "rails", "version": "~> 7.1"}]},
            "raw_excerpt": "gem \"rails\", \"~> 7.1\"\n",
            "error": null
        })
    );
}

#[test]
fn gitignore_filters_discovery() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    polyglot_repo(root);
    write(root, ".gitignore", "svc/\n*.toml\n!core/Cargo.toml\n");

    let ignore: Arc<dyn IgnoreMatcher> = Arc::new(GitIgnore::from_root(root).unwrap());
    let records = scan(root, Some(ignore), 8).unwrap();
    let paths: Vec<&str> = records.iter().map(|m| m.path.as_str()).collect();
    assert!(paths.contains(&"core/Cargo.toml"));
    assert!(!paths.contains(&"backend/pyproject.toml"));
    assert!(!paths.iter().any(|p| p.starts_with("svc/")));
}

#[test]
fn custom_registration_takes_priority() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "package.json", "{}");

    let mut registry: ManifestParserRegistry = build_parser_registry();
    registry.register(
        ParserRegistration::new(|_: &Path| {
            Ok::<_, anyhow::Error>(ParsedManifest::new("custom_json", Some("custom"), None, String::new()))
        })
        .names(&["package.json"])
        .priority(200),
    );

    let records = Scanner::new(Arc::new(registry))
        .exclusions(ExclusionConfig::default())
        .scan(dir.path())
        .unwrap();
    assert_eq!(records[0].manifest_type, "custom_json");
    assert_eq!(records[0].manager.as_deref(), Some("custom"));
}

#[tokio::test]
async fn concurrent_scan_matches_sorted_sequential_scan() {
    let dir = tempfile::tempdir().unwrap();
    polyglot_repo(dir.path());

    let scanner = Scanner::new(depscan::default_registry());
    let mut sequential = scanner.scan(dir.path()).unwrap();
    sequential.sort_by(|a, b| a.path.cmp(&b.path));
    let concurrent = scanner.scan_concurrent(dir.path(), 3).await.unwrap();
    assert_eq!(sequential, concurrent);
}
