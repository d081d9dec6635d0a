use std::path::Path;

use anyhow::{bail, Result};
use regex::Regex;
use serde_json::{json, Map, Value};

use super::helpers::{
    excerpt, name_version, non_empty, parse_toml, read_manifest, sections_or_none,
    table_to_json, toml_to_json, unquote,
};
use crate::models::ParsedManifest;
use crate::registry::{ManifestParserRegistry, ParserRegistration};

pub fn register(registry: &mut ManifestParserRegistry) {
    registry.register(
        ParserRegistration::new(parse_pyproject_toml)
            .names(&["pyproject.toml"])
            .priority(90),
    );
    registry.register(
        ParserRegistration::new(parse_pipfile)
            .names(&["Pipfile"])
            .priority(90),
    );
    registry.register(
        ParserRegistration::new(parse_requirements_txt)
            .suffixes(&[".txt", ".in"])
            .predicate(is_requirements_file)
            .priority(80),
    );
    registry.register(
        ParserRegistration::new(parse_setup_cfg)
            .names(&["setup.cfg"])
            .priority(80),
    );
    registry.register(
        ParserRegistration::new(parse_setup_py)
            .names(&["setup.py"])
            .priority(80),
    );
    registry.register(
        ParserRegistration::new(parse_environment_yaml)
            .names(&["environment.yml", "environment.yaml"])
            .priority(70),
    );
}

fn is_requirements_file(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase().contains("requirements"))
        .unwrap_or(false)
}

/// Parse `pyproject.toml`: PEP 621 `[project]` plus `[tool.poetry]` sections.
pub fn parse_pyproject_toml(path: &Path) -> Result<ParsedManifest> {
    let content = read_manifest(path)?;
    let table = parse_toml(&content)?;
    let mut deps = Map::new();

    if let Some(project) = table.get("project").and_then(|v| v.as_table()) {
        if let Some(list @ toml::Value::Array(_)) = project.get("dependencies") {
            deps.insert("project".to_string(), toml_to_json(list));
        }
        if let Some(optional @ toml::Value::Table(_)) = project.get("optional-dependencies") {
            deps.insert("optional".to_string(), toml_to_json(optional));
        }
    }

    let poetry = table
        .get("tool")
        .and_then(|tool| tool.get("poetry"))
        .and_then(|poetry| poetry.as_table());
    if let Some(poetry) = poetry {
        for key in ["dependencies", "dev-dependencies", "group"] {
            if let Some(section) = poetry.get(key).map(toml_to_json).and_then(non_empty) {
                deps.insert(format!("poetry_{key}"), section);
            }
        }
    }

    Ok(ParsedManifest::new(
        "pyproject.toml",
        Some("python"),
        sections_or_none(deps),
        excerpt(&content),
    ))
}

/// Parse `Pipfile`: `[packages]` and `[dev-packages]`.
pub fn parse_pipfile(path: &Path) -> Result<ParsedManifest> {
    let content = read_manifest(path)?;
    let table = parse_toml(&content)?;
    let mut deps = Map::new();

    for key in ["packages", "dev-packages"] {
        if let Some(section) = table.get(key).and_then(|v| v.as_table()) {
            deps.insert(key.to_string(), table_to_json(section));
        }
    }

    Ok(ParsedManifest::new(
        "Pipfile",
        Some("pipenv"),
        sections_or_none(deps),
        excerpt(&content),
    ))
}

/// Parse `requirements*.txt`: one `{name, version?}` entry per requirement line.
///
/// Only `==` pins yield a version. Comment lines and pip options (`-r`, `-e`,
/// `--index-url`) are skipped.
pub fn parse_requirements_txt(path: &Path) -> Result<ParsedManifest> {
    let content = read_manifest(path)?;
    let re = Regex::new(r"^([^#=<>!~;\[\s]+)(?:\[[^\]]*\])?(?:\s*==\s*([^\s#;]+))?")?;
    let mut deps = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
            continue;
        }
        if let Some(caps) = re.captures(line) {
            deps.push(name_version(&caps[1], caps.get(2).map(|m| m.as_str())));
        }
    }

    Ok(ParsedManifest::new(
        "requirements_txt",
        Some("pip"),
        non_empty(Value::Array(deps)),
        excerpt(&content),
    ))
}

/// Parse `setup.cfg`: `[metadata]`, `[options]` requirements and
/// `[options.extras_require*]` sections.
pub fn parse_setup_cfg(path: &Path) -> Result<ParsedManifest> {
    let content = read_manifest(path)?;
    let sections = parse_ini(&content)?;
    let mut data = Map::new();
    let mut extras_sections = Map::new();

    for section in &sections {
        match section.name.as_str() {
            "metadata" if !section.entries.is_empty() => {
                data.insert("metadata".to_string(), section.to_json());
            }
            "options" => {
                if let Some(install) = section.get("install_requires") {
                    let items: Vec<Value> = install
                        .lines()
                        .map(str::trim)
                        .filter(|l| !l.is_empty())
                        .map(|l| Value::String(l.to_string()))
                        .collect();
                    if let Some(items) = non_empty(Value::Array(items)) {
                        data.insert("install_requires".to_string(), items);
                    }
                }
                if let Some(extras) = section.get("extras_require").filter(|v| !v.is_empty()) {
                    data.insert("extras_require".to_string(), Value::String(extras.to_string()));
                }
            }
            name if name.starts_with("options.extras_require") && !section.entries.is_empty() => {
                extras_sections.insert(name.to_string(), section.to_json());
            }
            _ => {}
        }
    }
    if !extras_sections.is_empty() {
        data.insert(
            "extras_require_sections".to_string(),
            Value::Object(extras_sections),
        );
    }

    Ok(ParsedManifest::new(
        "setup_cfg",
        Some("python"),
        sections_or_none(data),
        excerpt(&content),
    ))
}

struct IniSection {
    name: String,
    entries: Vec<(String, String)>,
}

impl IniSection {
    fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn to_json(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }
}

/// Minimal configparser-style reader: `[section]` headers, `key = value` or
/// `key: value` pairs, indented continuation lines. Keys are lowercased.
fn parse_ini(content: &str) -> Result<Vec<IniSection>> {
    let mut sections: Vec<IniSection> = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        let continuation = raw.starts_with(|c: char| c.is_whitespace());
        if continuation {
            if let Some((_, value)) = sections.last_mut().and_then(|s| s.entries.last_mut()) {
                if !value.is_empty() {
                    value.push('\n');
                }
                value.push_str(trimmed);
                continue;
            }
        }

        if let Some(name) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            sections.push(IniSection {
                name: name.trim().to_string(),
                entries: Vec::new(),
            });
            continue;
        }

        let Some(section) = sections.last_mut() else {
            bail!("line {}: entry outside of any section", index + 1);
        };
        let Some(split) = trimmed.find(&['=', ':'][..]) else {
            bail!("line {}: expected `key = value`", index + 1);
        };
        let key = trimmed[..split].trim().to_lowercase();
        let value = trimmed[split + 1..].trim().to_string();
        section.entries.push((key, value));
    }

    Ok(sections)
}

/// Parse `setup.py`: the `install_requires` list and `extras_require` dict.
///
/// Python literals are decoded when they only contain strings, lists, tuples
/// and dicts; anything else is kept as raw source text.
pub fn parse_setup_py(path: &Path) -> Result<ParsedManifest> {
    let content = read_manifest(path)?;
    let install_re = Regex::new(r"(?s)install_requires\s*=\s*(\[.*?\])")?;
    let extras_re = Regex::new(r"(?s)extras_require\s*=\s*(\{.*?\})")?;
    let mut data = Map::new();

    let extract = |re: &Regex| -> Option<Value> {
        let source = re.captures(&content)?.get(1)?.as_str();
        let value = PyLiteral::new(source)
            .parse()
            .unwrap_or_else(|| Value::String(source.to_string()));
        non_empty(value)
    };

    if let Some(install) = extract(&install_re) {
        data.insert("install_requires".to_string(), install);
    }
    if let Some(extras) = extract(&extras_re) {
        data.insert("extras_require".to_string(), extras);
    }

    Ok(ParsedManifest::new(
        "setup_py",
        Some("python"),
        sections_or_none(data),
        excerpt(&content),
    ))
}

/// Nesting limit for [`PyLiteral`]; deeper input is kept as raw text.
const MAX_LITERAL_DEPTH: usize = 64;

/// Recursive-descent reader for the literal subset used in `setup()` calls.
struct PyLiteral<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    depth: usize,
}

impl<'a> PyLiteral<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            depth: 0,
        }
    }

    /// The whole input must be one literal.
    fn parse(mut self) -> Option<Value> {
        let value = self.value()?;
        self.skip_ws();
        self.chars.peek().is_none().then_some(value)
    }

    fn skip_ws(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
            } else if c == '#' {
                while self.chars.next_if(|&c| c != '\n').is_some() {}
            } else {
                break;
            }
        }
    }

    fn value(&mut self) -> Option<Value> {
        self.skip_ws();
        let next = *self.chars.peek()?;
        if self.depth >= MAX_LITERAL_DEPTH {
            return None;
        }
        self.depth += 1;
        let value = match next {
            '\'' | '"' => self.string().map(Value::String),
            '[' => self.sequence(']'),
            '(' => self.sequence(')'),
            '{' => self.dict(),
            _ => None,
        };
        self.depth -= 1;
        value
    }

    /// One string literal, joined with any adjacent ones (`"a" "b"`).
    fn string(&mut self) -> Option<String> {
        let mut out = String::new();
        loop {
            let quote = self.chars.next()?;
            loop {
                match self.chars.next()? {
                    '\\' => out.push(self.chars.next()?),
                    c if c == quote => break,
                    c => out.push(c),
                }
            }
            self.skip_ws();
            if !matches!(self.chars.peek(), Some('\'' | '"')) {
                return Some(out);
            }
        }
    }

    fn sequence(&mut self, close: char) -> Option<Value> {
        self.chars.next();
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.chars.next_if_eq(&close).is_some() {
                return Some(Value::Array(items));
            }
            items.push(self.value()?);
            self.skip_ws();
            if self.chars.next_if_eq(&',').is_none() {
                self.skip_ws();
                return self.chars.next_if_eq(&close).map(|_| Value::Array(items));
            }
        }
    }

    fn dict(&mut self) -> Option<Value> {
        self.chars.next();
        let mut map = Map::new();
        loop {
            self.skip_ws();
            if self.chars.next_if_eq(&'}').is_some() {
                return Some(Value::Object(map));
            }
            self.skip_ws();
            let key = self.string()?;
            self.skip_ws();
            self.chars.next_if_eq(&':')?;
            let value = self.value()?;
            map.insert(key, value);
            self.skip_ws();
            if self.chars.next_if_eq(&',').is_none() {
                self.skip_ws();
                return self.chars.next_if_eq(&'}').map(|_| Value::Object(map));
            }
        }
    }
}

/// Parse conda `environment.yml`: the top-level `dependencies:` list, with a
/// nested `pip:` list kept as `{"pip": [...]}`.
pub fn parse_environment_yaml(path: &Path) -> Result<ParsedManifest> {
    let content = read_manifest(path)?;
    let mut deps: Vec<Value> = Vec::new();
    let mut in_dependencies = false;
    let mut pip: Option<(usize, Vec<Value>)> = None;

    for raw in content.lines() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let indent = raw.len() - raw.trim_start().len();

        // A new top-level key ends the current block
        if indent == 0 && !trimmed.starts_with('-') {
            flush_pip(&mut pip, &mut deps);
            in_dependencies = trimmed == "dependencies:";
            continue;
        }
        if !in_dependencies {
            continue;
        }
        let Some(item) = trimmed.strip_prefix('-').map(str::trim) else {
            continue;
        };

        if let Some((pip_indent, items)) = pip.as_mut() {
            if indent > *pip_indent {
                items.push(Value::String(unquote(item).to_string()));
                continue;
            }
            flush_pip(&mut pip, &mut deps);
        }
        if item == "pip:" {
            pip = Some((indent, Vec::new()));
        } else if !item.is_empty() {
            deps.push(Value::String(unquote(item).to_string()));
        }
    }
    flush_pip(&mut pip, &mut deps);

    let data = non_empty(Value::Array(deps)).map(|list| json!({ "dependencies": list }));

    Ok(ParsedManifest::new(
        "environment_yaml",
        Some("conda"),
        data,
        excerpt(&content),
    ))
}

fn flush_pip(pip: &mut Option<(usize, Vec<Value>)>, deps: &mut Vec<Value>) {
    if let Some((_, items)) = pip.take() {
        deps.push(json!({ "pip": items }));
    }
}
