//! Property-file configuration.
//!
//! ```text
//! # filtered packages, any key starting with "ignore"
//! ignore.java=java.*,javax.*
//! ignore.tests=com.xyz.tests.*
//! analyzeInnerClasses=false
//! # every other key is a package and its volatility
//! com.xyz.stable=0
//! ```

use anyhow::{Context, Result};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::cli::Cli;
use crate::filter::PackageFilter;

pub const DEFAULT_PROPERTY_FILE: &str = "class-depend.properties";
pub const ANALYZE_INNER_CLASSES: &str = "analyzeInnerClasses";
const IGNORE_PREFIX: &str = "ignore";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read property file {path}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid volatility {value:?} for package {package} (expected 0, 1 or 2)")]
    InvalidVolatility { package: String, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyConfig {
    properties: IndexMap<String, String>,
}

impl PropertyConfig {
    pub fn parse(text: &str) -> Self {
        Self {
            properties: parse_properties(text),
        }
    }

    pub fn load(path: &Path) -> std::result::Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Patterns from every `ignore*` key, in file order.
    pub fn filtered_packages(&self) -> Vec<String> {
        self.properties
            .iter()
            .filter(|(key, _)| key.starts_with(IGNORE_PREFIX))
            .flat_map(|(_, value)| value.split(','))
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn package_filter(&self) -> PackageFilter {
        PackageFilter::from_patterns(self.filtered_packages())
    }

    /// Package name to volatility for every key that is not a setting.
    pub fn configured_packages(&self) -> std::result::Result<IndexMap<String, u8>, ConfigError> {
        let mut packages = IndexMap::new();
        for (key, value) in &self.properties {
            if key.starts_with(IGNORE_PREFIX) || key == ANALYZE_INNER_CLASSES {
                continue;
            }
            let volatility = value
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|v| *v <= 2)
                .ok_or_else(|| ConfigError::InvalidVolatility {
                    package: key.clone(),
                    value: value.clone(),
                })?;
            packages.insert(key.clone(), volatility);
        }
        Ok(packages)
    }

    /// Defaults to true; only a case-insensitive `true` enables it otherwise.
    pub fn analyze_inner_classes(&self) -> bool {
        self.get(ANALYZE_INNER_CLASSES)
            .is_none_or(|v| v.trim().eq_ignore_ascii_case("true"))
    }
}

pub fn default_property_file() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DEFAULT_PROPERTY_FILE))
}

/// `--config` must be readable; the default file is optional.
pub fn resolve_property_config(cli: &Cli) -> Result<PropertyConfig> {
    if let Some(path) = cli.config.as_deref() {
        return PropertyConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()));
    }
    match default_property_file() {
        Some(path) if path.is_file() => PropertyConfig::load(&path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        _ => Ok(PropertyConfig::default()),
    }
}

fn parse_properties(text: &str) -> IndexMap<String, String> {
    let mut properties = IndexMap::new();
    let mut lines = text.lines();
    while let Some(line) = lines.next() {
        let mut logical = line.trim_start().to_string();
        if logical.is_empty() || logical.starts_with('#') || logical.starts_with('!') {
            continue;
        }
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some(next) => logical.push_str(next.trim_start()),
                None => break,
            }
        }
        let (key, value) = split_entry(&logical);
        properties.insert(unescape(key), unescape(value));
    }
    properties
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || c.is_whitespace() {
            key_end = i;
            break;
        }
    }
    let key = &line[..key_end];
    let rest = line[key_end..].trim_start();
    let rest = rest
        .strip_prefix('=')
        .or_else(|| rest.strip_prefix(':'))
        .unwrap_or(rest);
    (key, rest.trim_start())
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
