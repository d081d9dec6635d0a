use std::path::Path;

use crate::glob::Glob;
use crate::models::to_posix;

/// Decides whether a path below the scan root should be skipped.
///
/// `relative` is relative to the scan root.
pub trait IgnoreMatcher: Send + Sync {
    fn is_ignored(&self, relative: &Path, is_dir: bool) -> bool;
}

/// Gitignore-style matcher built from the rules of a single ignore file.
#[derive(Debug, Clone, Default)]
pub struct GitIgnore {
    rules: Vec<Rule>,
}

#[derive(Debug, Clone)]
struct Rule {
    glob: Glob,
    negated: bool,
    dir_only: bool,
    /// Matched against the whole relative path instead of the file name.
    anchored: bool,
}

impl GitIgnore {
    pub fn parse(content: &str) -> Self {
        let rules = content.lines().filter_map(parse_rule).collect();
        Self { rules }
    }

    /// Load `<root>/.gitignore`. Returns `None` when the file is absent or unreadable.
    pub fn from_root(root: &Path) -> Option<Self> {
        let content = std::fs::read(root.join(".gitignore")).ok()?;
        Some(Self::parse(&String::from_utf8_lossy(&content)))
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn parse_rule(line: &str) -> Option<Rule> {
    let line = line.trim_end();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (negated, mut pattern) = match line.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, line),
    };
    // `\#foo` and `\!foo` escape the leading character.
    if let Some(rest) = pattern.strip_prefix('\\') {
        pattern = rest;
    }

    let dir_only = pattern.ends_with('/');
    let pattern = pattern.trim_end_matches('/');
    let anchored = pattern.contains('/');
    let pattern = pattern.trim_start_matches('/');
    if pattern.is_empty() {
        return None;
    }

    Some(Rule {
        glob: Glob::path(pattern),
        negated,
        dir_only,
        anchored,
    })
}

impl IgnoreMatcher for GitIgnore {
    fn is_ignored(&self, relative: &Path, is_dir: bool) -> bool {
        let full = to_posix(relative);
        let name = relative
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut ignored = false;
        for rule in &self.rules {
            if rule.dir_only && !is_dir {
                continue;
            }
            let subject = if rule.anchored { &full } else { &name };
            if rule.glob.is_match(subject) {
                ignored = !rule.negated;
            }
        }
        ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comments_and_blank_lines_are_skipped() {
        let ignore = GitIgnore::parse("# comment\n\n   \n");
        assert!(ignore.is_empty());
    }

    #[test]
    fn test_bare_name_matches_at_any_depth() {
        let ignore = GitIgnore::parse("*.log\nvendor\n");
        assert!(ignore.is_ignored(Path::new("debug.log"), false));
        assert!(ignore.is_ignored(Path::new("a/b/debug.log"), false));
        assert!(ignore.is_ignored(Path::new("third_party/vendor"), true));
        assert!(!ignore.is_ignored(Path::new("src/main.rs"), false));
    }

    #[test]
    fn test_directory_only_rule() {
        let ignore = GitIgnore::parse("build/\n");
        assert!(ignore.is_ignored(Path::new("build"), true));
        assert!(!ignore.is_ignored(Path::new("build"), false));
    }

    #[test]
    fn test_anchored_rule_uses_full_path() {
        let ignore = GitIgnore::parse("/fixtures\ndocs/*.txt\n");
        assert!(ignore.is_ignored(Path::new("fixtures"), true));
        assert!(!ignore.is_ignored(Path::new("tests/fixtures"), true));
        assert!(ignore.is_ignored(Path::new("docs/requirements.txt"), false));
        assert!(!ignore.is_ignored(Path::new("docs/api/requirements.txt"), false));
    }

    #[test]
    fn test_negation_last_match_wins() {
        let ignore = GitIgnore::parse("*.txt\n!requirements.txt\n");
        assert!(ignore.is_ignored(Path::new("notes.txt"), false));
        assert!(!ignore.is_ignored(Path::new("requirements.txt"), false));
    }

    #[test]
    fn test_from_root_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(GitIgnore::from_root(dir.path()).is_none());

        std::fs::write(dir.path().join(".gitignore"), "node_modules/\n").unwrap();
        let ignore = GitIgnore::from_root(dir.path()).unwrap();
        assert!(ignore.is_ignored(Path::new("node_modules"), true));
    }
}
