use crate::error::ConfigError;
use crate::lookup::LookupTables;
use crate::reader::{ColumnNames, resolve_encoding};
use crate::runtime::ConversionConfig;
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR_NAME: &str = "icsconv";
const CONFIG_FILE_NAME: &str = "config.toml";
const CURRENT_SCHEMA_VERSION: u32 = 1;
/// Code page 950 exports decode with the WHATWG `big5` encoding.
pub const DEFAULT_ENCODING: &str = "big5";

/// Result returned by [`load_config`], capturing the source and any non-fatal issues.
#[derive(Debug, Clone)]
pub struct ConfigLoadResult {
    pub config: FileConfig,
    pub warnings: Vec<String>,
    pub source: ConfigSource,
}

/// Indicates where the configuration was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// No persisted configuration was found or usable; defaults were synthesized.
    Default,
    /// Configuration was read from `config.toml`.
    File,
}

/// Disk-backed configuration schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default = "FileConfig::schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub runtime: RuntimePreferences,
    #[serde(default)]
    pub columns: ColumnNames,
    #[serde(default = "LookupTables::builtin")]
    pub tables: LookupTables,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            runtime: RuntimePreferences::default(),
            columns: ColumnNames::default(),
            tables: LookupTables::builtin(),
        }
    }
}

impl FileConfig {
    const fn schema_version() -> u32 {
        CURRENT_SCHEMA_VERSION
    }
}

/// Per-term defaults that map onto CLI flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimePreferences {
    #[serde(default)]
    pub input_path: Option<String>,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default = "RuntimePreferences::default_encoding")]
    pub encoding: String,
    #[serde(default)]
    pub tables_path: Option<String>,
}

impl Default for RuntimePreferences {
    fn default() -> Self {
        Self {
            input_path: None,
            output_path: None,
            encoding: Self::default_encoding(),
            tables_path: None,
        }
    }
}

impl RuntimePreferences {
    fn default_encoding() -> String {
        DEFAULT_ENCODING.to_string()
    }
}

/// Represents overrides sourced from CLI flags.
#[derive(Debug, Default, Clone)]
pub struct RuntimeOverrides {
    pub input: Option<String>,
    pub output: Option<String>,
    pub encoding: Option<String>,
    pub tables: Option<String>,
    pub dry_run: Option<bool>,
}

impl RuntimeOverrides {
    pub fn is_empty(&self) -> bool {
        self.input.is_none()
            && self.output.is_none()
            && self.encoding.is_none()
            && self.tables.is_none()
            && self.dry_run.is_none()
    }
}

/// Path to the configuration directory.
pub fn config_directory() -> PathBuf {
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Path to `config.toml`.
pub fn config_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

/// Load the configuration from the default location, falling back to defaults.
pub fn load_config() -> ConfigLoadResult {
    load_config_from(&config_path())
}

/// Load the configuration from `path`, falling back to defaults with warnings.
pub fn load_config_from(path: &Path) -> ConfigLoadResult {
    let mut warnings = Vec::new();

    if path.exists() {
        match fs::read_to_string(path) {
            Ok(raw) => match toml::from_str::<FileConfig>(&raw) {
                Ok(cfg) => {
                    let (cfg, mut sanitize_warnings) = sanitize_config(cfg);
                    warnings.append(&mut sanitize_warnings);
                    return ConfigLoadResult {
                        config: cfg,
                        warnings,
                        source: ConfigSource::File,
                    };
                }
                Err(err) => {
                    warnings.push(format!(
                        "Failed to parse {} as TOML: {}. Falling back to defaults.",
                        path.display(),
                        err
                    ));
                }
            },
            Err(err) => {
                warnings.push(format!(
                    "Failed to read {}: {}. Falling back to defaults.",
                    path.display(),
                    err
                ));
            }
        }
    }

    ConfigLoadResult {
        config: FileConfig::default(),
        warnings,
        source: ConfigSource::Default,
    }
}

/// Persist the configuration to the default location.
pub fn save_config(config: &FileConfig) -> Result<(), ConfigError> {
    save_config_to(&config_path(), config)
}

/// Persist the configuration to `path`, creating parent directories.
pub fn save_config_to(path: &Path, config: &FileConfig) -> Result<(), ConfigError> {
    let io_error = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    let serialized = toml::to_string_pretty(config)?;
    fs::write(path, serialized).map_err(io_error)?;
    Ok(())
}

fn sanitize_config(mut config: FileConfig) -> (FileConfig, Vec<String>) {
    let mut warnings = Vec::new();

    if config.schema_version != CURRENT_SCHEMA_VERSION {
        warnings.push(format!(
            "Unknown config schema version {}. Resetting to {}.",
            config.schema_version, CURRENT_SCHEMA_VERSION
        ));
        return (FileConfig::default(), warnings);
    }

    let encoding = config.runtime.encoding.trim();
    if encoding.is_empty() {
        warnings.push(format!(
            "Empty input encoding. Resetting to '{}'.",
            DEFAULT_ENCODING
        ));
        config.runtime.encoding = DEFAULT_ENCODING.to_string();
    } else if resolve_encoding(encoding).is_err() {
        warnings.push(format!(
            "Unknown input encoding '{}'. Resetting to '{}'.",
            encoding, DEFAULT_ENCODING
        ));
        config.runtime.encoding = DEFAULT_ENCODING.to_string();
    }

    for table in [&mut config.tables.abbreviations, &mut config.tables.locations] {
        let before = table.len();
        table.retain(|key, _| !key.trim().is_empty());
        if table.len() != before {
            warnings.push("Removed lookup table entries with blank keys.".to_string());
        }
    }

    for field in [
        &mut config.runtime.input_path,
        &mut config.runtime.output_path,
        &mut config.runtime.tables_path,
    ] {
        if field.as_deref().is_some_and(|value| value.trim().is_empty()) {
            *field = None;
        }
    }

    (config, warnings)
}

/// Merge CLI overrides over the persisted preferences.
///
/// Returns the effective run configuration, or an error message when no input
/// path is available from either source.
pub fn apply_runtime_overrides(
    config: &FileConfig,
    overrides: &RuntimeOverrides,
) -> Result<ConversionConfig, String> {
    let runtime = &config.runtime;
    let input = overrides
        .input
        .clone()
        .or_else(|| runtime.input_path.clone())
        .ok_or_else(|| {
            format!(
                "No input file given. Pass one on the command line or set runtime.input_path in {}.",
                config_path().display()
            )
        })?;

    Ok(ConversionConfig {
        input: expand_path(&input),
        output: overrides
            .output
            .as_deref()
            .or(runtime.output_path.as_deref())
            .map(expand_path),
        encoding: overrides
            .encoding
            .clone()
            .unwrap_or_else(|| runtime.encoding.clone()),
        tables_path: overrides
            .tables
            .as_deref()
            .or(runtime.tables_path.as_deref())
            .map(expand_path),
        columns: config.columns.clone(),
        dry_run: overrides.dry_run.unwrap_or(false),
    })
}

fn expand_path(value: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(value.trim()).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_builtin_tables() {
        let config = FileConfig::default();
        assert_eq!(config.runtime.encoding, DEFAULT_ENCODING);
        assert_eq!(config.tables, LookupTables::builtin());
        assert_eq!(config.columns.subject, "主旨");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let cfg: FileConfig = toml::from_str(
            "[runtime]\ninput_path = \"term.csv\"\n\n[columns]\nsubject = \"Subject\"\n",
        )
        .expect("parse");
        assert_eq!(cfg.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(cfg.runtime.input_path.as_deref(), Some("term.csv"));
        assert_eq!(cfg.runtime.encoding, DEFAULT_ENCODING);
        assert_eq!(cfg.columns.subject, "Subject");
        assert_eq!(cfg.columns.all_day, "全天");
        assert_eq!(cfg.tables.abbreviate("Urology"), "泌尿");
    }

    #[test]
    fn test_sanitize_wrong_schema_version() {
        let mut config = FileConfig::default();
        config.schema_version = 99;
        config.runtime.input_path = Some("term.csv".to_string());

        let (sanitized, warnings) = sanitize_config(config);
        assert_eq!(sanitized, FileConfig::default());
        assert!(warnings.iter().any(|w| w.contains("schema version")));
    }

    #[test]
    fn test_sanitize_bad_encoding() {
        let mut config = FileConfig::default();
        config.runtime.encoding = "not-a-codec".to_string();
        let (sanitized, warnings) = sanitize_config(config);
        assert_eq!(sanitized.runtime.encoding, DEFAULT_ENCODING);
        assert!(warnings.iter().any(|w| w.contains("not-a-codec")));

        let mut config = FileConfig::default();
        config.runtime.encoding = "  ".to_string();
        let (sanitized, warnings) = sanitize_config(config);
        assert_eq!(sanitized.runtime.encoding, DEFAULT_ENCODING);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_sanitize_blank_keys_and_paths() {
        let mut config = FileConfig::default();
        config
            .tables
            .locations
            .insert(" ".to_string(), "Room".to_string());
        config.runtime.output_path = Some("".to_string());

        let (sanitized, warnings) = sanitize_config(config);
        assert!(!sanitized.tables.locations.contains_key(" "));
        assert!(sanitized.runtime.output_path.is_none());
        assert!(warnings.iter().any(|w| w.contains("blank keys")));
    }

    #[test]
    fn test_load_config_bad_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "runtime = [not toml").expect("write");

        let result = load_config_from(&path);
        assert_eq!(result.source, ConfigSource::Default);
        assert!(result.warnings.iter().any(|w| w.contains("Falling back")));
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = load_config_from(&dir.path().join(CONFIG_FILE_NAME));
        assert_eq!(result.source, ConfigSource::Default);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_save_and_reload_round_trip_tables() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = FileConfig::default();
        config
            .tables
            .abbreviations
            .insert("Geriatrics".to_string(), "老年".to_string());
        save_config_to(&path, &config).expect("save");

        let result = load_config_from(&path);
        assert_eq!(result.source, ConfigSource::File);
        assert_eq!(result.config.tables.abbreviate("Geriatrics"), "老年");
    }

    #[test]
    fn test_apply_runtime_overrides_precedence() {
        let mut config = FileConfig::default();
        config.runtime.input_path = Some("from-config.csv".to_string());
        config.runtime.output_path = Some("config-out.csv".to_string());

        let overrides = RuntimeOverrides {
            input: Some("cli.csv".to_string()),
            encoding: Some("utf-8".to_string()),
            dry_run: Some(true),
            ..RuntimeOverrides::default()
        };
        let run = apply_runtime_overrides(&config, &overrides).expect("config");
        assert_eq!(run.input, PathBuf::from("cli.csv"));
        assert_eq!(run.output, Some(PathBuf::from("config-out.csv")));
        assert_eq!(run.encoding, "utf-8");
        assert!(run.dry_run);
        assert!(run.tables_path.is_none());
    }

    #[test]
    fn test_apply_runtime_overrides_requires_input() {
        let err = apply_runtime_overrides(&FileConfig::default(), &RuntimeOverrides::default())
            .unwrap_err();
        assert!(err.contains("input_path"));
    }
}
