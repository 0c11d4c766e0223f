//! Git configuration files
//!
//! Parses the INI dialect git uses for `.git/config`, `~/.gitconfig` and
//! `$XDG_CONFIG_HOME/git/config`:
//!
//! ```text
//! [core]
//!     repositoryformatversion = 0
//! [remote "origin"]
//!     url = https://example.com/repo.git
//! ```
//!
//! Section and key names are case-insensitive; subsection names are not.

use crate::errors::Error;
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const SECTION_REGEX: &str = r#"^\[\s*([A-Za-z0-9.-]+)(?:\s+"((?:[^"\\]|\\.)*)")?\s*\]$"#;
const ENTRY_REGEX: &str = r"^([A-Za-z][A-Za-z0-9-]*)\s*(?:=\s*(.*))?$";

/// Only repository format supported by the engine
pub const REPOSITORY_FORMAT_VERSION: u32 = 0;

/// Content written to `.git/config` by `init`
pub const DEFAULT_REPOSITORY_CONFIG: &str =
    "[core]\n\trepositoryformatversion = 0\n\tfilemode = false\n\tbare = false\n";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// `section` or `section.subsection` -> key -> value
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl Config {
    /// Read a config file that must exist
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.is_file() {
            return Err(Error::MissingConfig(path.to_path_buf()).into());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Unable to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let section_re = regex::Regex::new(SECTION_REGEX)?;
        let entry_re = regex::Regex::new(ENTRY_REGEX)?;

        let mut config = Config::default();
        let mut current: Option<String> = None;

        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(captures) = section_re.captures(line) {
                let mut name = captures[1].to_ascii_lowercase();
                if let Some(subsection) = captures.get(2) {
                    name = format!("{name}.{}", subsection.as_str());
                }
                config.sections.entry(name.clone()).or_default();
                current = Some(name);
                continue;
            }

            let (Some(section), Some(captures)) = (&current, entry_re.captures(line)) else {
                anyhow::bail!("line {}: cannot parse '{line}'", number + 1);
            };

            let key = captures[1].to_ascii_lowercase();
            // a bare key means "true"
            let value = captures
                .get(2)
                .map(|value| unquote(strip_comment(value.as_str())))
                .unwrap_or_else(|| "true".to_string());

            config
                .sections
                .entry(section.clone())
                .or_default()
                .insert(key, value);
        }

        Ok(config)
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(&section_key(section))
            .and_then(|entries| entries.get(&key.to_ascii_lowercase()))
            .map(String::as_str)
    }

    pub fn get_bool(&self, section: &str, key: &str) -> Option<bool> {
        match self.get(section, key)?.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" | "" => Some(false),
            _ => None,
        }
    }

    pub fn get_int(&self, section: &str, key: &str) -> Option<i64> {
        self.get(section, key)?.parse().ok()
    }

    /// Fail unless `core.repositoryformatversion` is the supported one
    pub fn check_format_version(&self) -> anyhow::Result<()> {
        let version = self.get_int("core", "repositoryformatversion").unwrap_or(0);
        if version != i64::from(REPOSITORY_FORMAT_VERSION) {
            let version = u32::try_from(version).unwrap_or(u32::MAX);
            return Err(Error::UnsupportedFormatVersion(version).into());
        }

        Ok(())
    }

    /// Overlay `other` on top of `self`; later files win, as in git
    pub fn merge(&mut self, other: Config) {
        for (section, entries) in other.sections {
            self.sections.entry(section).or_default().extend(entries);
        }
    }
}

/// Lowercase the section part of `section` or `section.subsection`
fn section_key(section: &str) -> String {
    match section.split_once('.') {
        Some((name, subsection)) => format!("{}.{subsection}", name.to_ascii_lowercase()),
        None => section.to_ascii_lowercase(),
    }
}

fn strip_comment(value: &str) -> &str {
    if value.starts_with('"') {
        return value.trim();
    }
    value
        .find([';', '#'])
        .map(|pos| &value[..pos])
        .unwrap_or(value)
        .trim()
}

fn unquote(value: &str) -> String {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
        .replace("\\\"", "\"")
        .replace("\\\\", "\\")
}

/// `$XDG_CONFIG_HOME/git`, falling back to `~/.config/git`
fn xdg_git_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .map(|config| config.join("git"))
}

/// User-global config files in the order git reads them
pub fn global_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(xdg) = xdg_git_dir() {
        paths.push(xdg.join("config"));
    }
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".gitconfig"));
    }
    paths
}

/// User-global ignore file, `$XDG_CONFIG_HOME/git/ignore`
pub fn global_ignore_path() -> Option<PathBuf> {
    xdg_git_dir().map(|dir| dir.join("ignore"))
}

/// Merged user-global configuration; unreadable files are skipped
pub fn global_config() -> Config {
    let mut config = Config::default();
    for path in global_config_paths() {
        if !path.is_file() {
            continue;
        }
        match Config::load(&path) {
            Ok(file_config) => config.merge(file_config),
            Err(err) => tracing::warn!(path = %path.display(), "skipping global config: {err:#}"),
        }
    }
    config
}

/// `user.name` and `user.email` from the user-global configuration
pub fn global_identity() -> Option<(Option<String>, Option<String>)> {
    let config = global_config();
    let name = config.get("user", "name").map(str::to_string);
    let email = config.get("user", "email").map(str::to_string);

    match (&name, &email) {
        (None, None) => None,
        _ => Some((name, email)),
    }
}
