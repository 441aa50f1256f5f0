//! Supported-locale discovery.
//!
//! The supported set comes from the first source that yields locales:
//! the explicit list, a key inside a config file, or a scan of a locale
//! resource directory.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::config::{LocaleConfig, ScanConfig};
use crate::utils::ConfigError;

/// Immutable set of supported locales plus the default, fixed for the process lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleRegistry {
    supported: Vec<String>,
    default: String,
}

impl LocaleRegistry {
    /// Registry over an already known list; the default must be a member
    pub fn new(supported: Vec<String>, default: Option<String>) -> Result<Self, ConfigError> {
        let supported = dedup_preserving_order(supported);
        let first = supported.first().cloned().ok_or(ConfigError::NoLocalesFound)?;

        let default = match default {
            Some(default) if !supported.contains(&default) => {
                return Err(ConfigError::DefaultNotSupported { default, supported });
            },
            Some(default) => default,
            None => first,
        };

        Ok(Self { supported, default })
    }

    /// Build the registry from configuration, reading the file system when needed
    pub fn build(config: &LocaleConfig) -> Result<Self, ConfigError> {
        let supported = if !config.locales.is_empty() {
            tracing::debug!("Using {} explicitly configured locales", config.locales.len());
            config.locales.clone()
        } else {
            discover(config)?
        };

        let registry = Self::new(supported, config.default.clone())?;
        tracing::info!(
            "Supported locales: {:?} (default: {})",
            registry.supported,
            registry.default
        );
        Ok(registry)
    }

    pub fn supported(&self) -> &[String] {
        &self.supported
    }

    pub fn default_locale(&self) -> &str {
        &self.default
    }

    pub fn is_supported(&self, locale: &str) -> bool {
        self.supported.iter().any(|l| l == locale)
    }
}

/// Config file first, then the scan directory. Both locations are validated up front.
fn discover(config: &LocaleConfig) -> Result<Vec<String>, ConfigError> {
    if let Some(dir) = &config.scan.path {
        if !dir.is_dir() {
            return Err(ConfigError::ScanDirectoryMissing(dir.clone()));
        }
    }

    if let Some(file) = &config.config_file {
        if !file.is_file() {
            return Err(ConfigError::ConfigFileMissing(file.clone()));
        }

        let locales = load_from_config_file(file, &config.config_key)?;
        if !locales.is_empty() {
            tracing::debug!("Loaded {} locales from {}", locales.len(), file.display());
            return Ok(locales);
        }
        tracing::debug!(
            "Key '{}' in {} holds no locale list, falling back to directory scan",
            config.config_key,
            file.display()
        );
    }

    match &config.scan.path {
        Some(dir) => scan_directory(dir, &config.scan),
        None => Ok(Vec::new()),
    }
}

/// Read the string list stored under a dotted key; anything else yields an empty list
pub fn load_from_config_file(path: &Path, key: &str) -> Result<Vec<String>, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;

    let is_toml = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let document: serde_json::Value = if is_toml {
        toml::from_str(&content).map_err(|e| ConfigError::parse(path, e))?
    } else {
        serde_json::from_str(&content).map_err(|e| ConfigError::parse(path, e))?
    };

    let Some(value) = lookup_dotted(&document, key) else {
        return Ok(Vec::new());
    };

    let Some(items) = value.as_array() else {
        tracing::warn!("Key '{}' in {} is not a list", key, path.display());
        return Ok(Vec::new());
    };

    let locales: Option<Vec<String>> =
        items.iter().map(|item| item.as_str().map(str::to_string)).collect();
    match locales {
        Some(locales) => Ok(locales),
        None => {
            tracing::warn!("Key '{}' in {} contains non-string entries", key, path.display());
            Ok(Vec::new())
        },
    }
}

fn lookup_dotted<'a>(document: &'a serde_json::Value, key: &str) -> Option<&'a serde_json::Value> {
    key.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(document, |value, segment| value.get(segment))
}

/// Derive locale identifiers from the immediate entries of `dir`, in enumeration order
pub fn scan_directory(dir: &Path, scan: &ScanConfig) -> Result<Vec<String>, ConfigError> {
    let suffix = format!(".{}", scan.file_type.trim_start_matches('.'));
    let mut locales = Vec::new();

    for entry in fs::read_dir(dir).map_err(|e| ConfigError::io(dir, e))? {
        let entry = entry.map_err(|e| ConfigError::io(dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();

        if name.starts_with('.') || scan.exclude.contains(&name) {
            continue;
        }

        let file_type = entry.file_type().map_err(|e| ConfigError::io(entry.path(), e))?;
        // Symlinks are classified by their target
        let is_dir = if file_type.is_symlink() { entry.path().is_dir() } else { file_type.is_dir() };

        let locale = if is_dir {
            if !scan.directories {
                continue;
            }
            name
        } else {
            match name.strip_suffix(&suffix) {
                Some(stem) if !stem.is_empty() => stem.to_string(),
                _ => continue,
            }
        };

        if scan.exclude.contains(&locale) {
            continue;
        }
        locales.push(locale);
    }

    let locales = dedup_preserving_order(locales);
    tracing::debug!("Scanned {} locales from {}", locales.len(), dir.display());
    Ok(locales)
}

fn dedup_preserving_order(locales: Vec<String>) -> Vec<String> {
    let total = locales.len();
    let mut seen = HashSet::new();
    let unique: Vec<String> =
        locales.into_iter().filter(|locale| seen.insert(locale.clone())).collect();

    if unique.len() != total {
        tracing::warn!("Dropped {} duplicate locale entries", total - unique.len());
    }
    unique
}
