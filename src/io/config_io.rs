use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::AppConfig;

/// Error type for config file operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("could not parse config.toml: {0}")]
    DocumentError(#[from] toml_edit::TomlError),
    #[error("unknown config key: {0} (expected one of: {keys})", keys = CONFIG_KEYS.join(", "))]
    UnknownKey(String),
}

/// Keys accepted by `set_config_value`, as dotted `table.key` paths
pub const CONFIG_KEYS: [&str; 4] = ["data_file", "defaults.priority", "defaults.category", "log.level"];

/// Get the config file path, respecting XDG_CONFIG_HOME
pub fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| crate::io::home_dir().join(".config"));
    config_dir.join("taskdesk").join("config.toml")
}

/// Read the config file. A missing file yields the defaults.
pub fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

/// Read the raw toml_edit document for round-trip-safe editing.
/// A missing file yields an empty document.
pub fn read_config_document(path: &Path) -> Result<toml_edit::DocumentMut, ConfigError> {
    if !path.exists() {
        return Ok(toml_edit::DocumentMut::new());
    }
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(text.parse()?)
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(path: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ConfigError> {
    crate::io::store_io::atomic_write(path, doc.to_string().as_bytes()).map_err(|e| {
        ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

/// Set a dotted key (`data_file`, `defaults.priority`, ...) in the document
pub fn set_config_value(
    doc: &mut toml_edit::DocumentMut,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    if !CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey(key.to_string()));
    }
    match key.split_once('.') {
        Some((table, field)) => {
            // A missing or non-table entry (`defaults = "High"`) is replaced
            if !doc.get(table).is_some_and(toml_edit::Item::is_table_like) {
                doc.insert(table, toml_edit::Item::Table(toml_edit::Table::new()));
            }
            if let Some(t) = doc
                .get_mut(table)
                .and_then(toml_edit::Item::as_table_like_mut)
            {
                toml_edit::TableLike::insert(t, field, toml_edit::value(value));
            }
        }
        None => {
            doc[key] = toml_edit::value(value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_config() -> &'static str {
        r#"# taskdesk settings
data_file = "/srv/tasks.json"

[defaults]
# what new tasks get
priority = "High"
"#
    }

    #[test]
    fn missing_config_is_default() {
        let tmp = TempDir::new().unwrap();
        let config = read_config(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn round_trip_preserves_comments() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, sample_config()).unwrap();

        let doc = read_config_document(&path).unwrap();
        write_config(&path, &doc).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), sample_config());
    }

    #[test]
    fn set_existing_and_new_keys() {
        let mut doc: toml_edit::DocumentMut = sample_config().parse().unwrap();
        set_config_value(&mut doc, "defaults.priority", "Low").unwrap();
        set_config_value(&mut doc, "log.level", "debug").unwrap();
        let text = doc.to_string();
        assert!(text.contains("# what new tasks get"));

        let config: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(config.defaults.priority.as_deref(), Some("Low"));
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.data_file, Some(PathBuf::from("/srv/tasks.json")));
    }

    #[test]
    fn set_replaces_non_table_entry() {
        let mut doc: toml_edit::DocumentMut = "defaults = \"High\"\n".parse().unwrap();
        set_config_value(&mut doc, "defaults.priority", "Low").unwrap();
        let config: AppConfig = toml::from_str(&doc.to_string()).unwrap();
        assert_eq!(config.defaults.priority.as_deref(), Some("Low"));
    }

    #[test]
    fn set_into_inline_table() {
        let mut doc: toml_edit::DocumentMut =
            "defaults = { category = \"Fun\" }\n".parse().unwrap();
        set_config_value(&mut doc, "defaults.priority", "Low").unwrap();
        let config: AppConfig = toml::from_str(&doc.to_string()).unwrap();
        assert_eq!(config.defaults.priority.as_deref(), Some("Low"));
        assert_eq!(config.defaults.category.as_deref(), Some("Fun"));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let mut doc = toml_edit::DocumentMut::new();
        let err = set_config_value(&mut doc, "theme.text", "#fff").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(_)));
        assert!(err.to_string().contains("defaults.priority"));
    }

    #[test]
    fn malformed_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "data_file = [").unwrap();
        assert!(matches!(read_config(&path), Err(ConfigError::ParseError(_))));
    }
}
