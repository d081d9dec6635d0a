//! Shell-style glob patterns compiled to [`regex`].
//!
//! Two dialects are supported:
//! - [`Glob::fnmatch`]: `*` matches any run of characters, separators included.
//!   Used for manifest patterns such as `requirements*.txt` or `*.csproj`.
//! - [`Glob::path`]: `*` and `?` stop at `/`, `**` spans directories.
//!   Used for ignore-file rules.

use regex::Regex;

#[derive(Debug, Clone)]
pub struct Glob {
    pattern: String,
    matcher: Matcher,
}

#[derive(Debug, Clone)]
enum Matcher {
    Regex(Regex),
    /// Pattern that failed to compile; compared verbatim.
    Literal,
}

impl Glob {
    /// Compile an fnmatch-style pattern.
    pub fn fnmatch(pattern: &str) -> Self {
        Self::compile(pattern, false)
    }

    /// Compile a path-aware pattern where `*` does not cross `/`.
    pub fn path(pattern: &str) -> Self {
        Self::compile(pattern, true)
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Whole-string match.
    pub fn is_match(&self, text: &str) -> bool {
        match &self.matcher {
            Matcher::Regex(re) => re.is_match(text),
            Matcher::Literal => self.pattern == text,
        }
    }

    fn compile(pattern: &str, literal_separator: bool) -> Self {
        let source = format!("(?s)^{}$", translate(pattern, literal_separator));
        let matcher = match Regex::new(&source) {
            Ok(re) => Matcher::Regex(re),
            Err(_) => Matcher::Literal,
        };
        Self {
            pattern: pattern.to_string(),
            matcher,
        }
    }
}

fn translate(pattern: &str, literal_separator: bool) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '*' if literal_separator && chars.get(i + 1) == Some(&'*') => {
                if chars.get(i + 2) == Some(&'/') {
                    out.push_str("(?:.*/)?");
                    i += 3;
                } else {
                    out.push_str(".*");
                    i += 2;
                }
                continue;
            }
            '*' => out.push_str(if literal_separator { "[^/]*" } else { ".*" }),
            '?' => out.push_str(if literal_separator { "[^/]" } else { "." }),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.push_str(&translate_class(&chars[i + 1..end]));
                    i = end + 1;
                    continue;
                }
                None => out.push_str("\\["),
            },
            _ => out.push_str(&regex::escape(c.encode_utf8(&mut [0u8; 4]))),
        }
        i += 1;
    }

    out
}

/// Index of the `]` closing the class opened at `start`, if any.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start + 1;
    if chars.get(j) == Some(&'!') {
        j += 1;
    }
    // A leading `]` is part of the set.
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    while j < chars.len() && chars[j] != ']' {
        j += 1;
    }
    (j < chars.len()).then_some(j)
}

fn translate_class(body: &[char]) -> String {
    let mut out = String::from("[");
    let mut rest = body;
    if let Some(('!', tail)) = rest.split_first().map(|(c, t)| (*c, t)) {
        out.push('^');
        rest = tail;
    }
    for &c in rest {
        match c {
            '\\' | '[' | ']' | '^' | '&' | '~' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out.push(']');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnmatch_star_and_suffix() {
        let glob = Glob::fnmatch("requirements*.txt");
        assert!(glob.is_match("requirements.txt"));
        assert!(glob.is_match("requirements-prod.txt"));
        assert!(!glob.is_match("requirements.in"));
        assert!(!glob.is_match("dev-requirements.txt"));

        assert!(Glob::fnmatch("*.csproj").is_match("App.Web.csproj"));
    }

    #[test]
    fn test_fnmatch_question_mark_and_class() {
        assert!(Glob::fnmatch("file?.txt").is_match("file1.txt"));
        assert!(!Glob::fnmatch("file?.txt").is_match("file10.txt"));
        assert!(Glob::fnmatch("v[0-9].toml").is_match("v3.toml"));
        assert!(!Glob::fnmatch("v[!0-9].toml").is_match("v3.toml"));
        assert!(Glob::fnmatch("v[!0-9].toml").is_match("vx.toml"));
    }

    #[test]
    fn test_fnmatch_dots_are_literal() {
        let glob = Glob::fnmatch("setup.cfg");
        assert!(glob.is_match("setup.cfg"));
        assert!(!glob.is_match("setupxcfg"));
    }

    #[test]
    fn test_unclosed_bracket_is_literal() {
        assert!(Glob::fnmatch("a[b").is_match("a[b"));
    }

    #[test]
    fn test_path_star_stops_at_separator() {
        let glob = Glob::path("build/*.log");
        assert!(glob.is_match("build/out.log"));
        assert!(!glob.is_match("build/nested/out.log"));
    }

    #[test]
    fn test_path_double_star_spans_directories() {
        let glob = Glob::path("**/fixtures");
        assert!(glob.is_match("fixtures"));
        assert!(glob.is_match("tests/data/fixtures"));

        let glob = Glob::path("docs/**");
        assert!(glob.is_match("docs/a/b.md"));
    }
}
