//! Layered configuration: user config file, environment, CLI (CLI wins).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Base link of the wiki.
    pub base: Option<String>,
    /// User for basic authentication.
    pub user: Option<String>,
    /// Password for basic authentication. Prefer `WIKIGIT_PASSWORD`.
    pub password: Option<String>,
    /// Target repository directory.
    pub repo: Option<PathBuf>,
    pub converter: ConverterConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub program: String,
    /// `{url}` in an argument is replaced by the canonical source link.
    pub args: Vec<String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            program: "pandoc".into(),
            args: ["-f", "html", "-t", "gfm", "--metadata=source:{url}"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Tracing filter directive, e.g. `wikigit=debug`.
    pub filter: Option<String>,
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("wikigit").join("config.toml"))
}

/// Load the user config file (if any) and apply environment overrides.
pub fn load() -> crate::Result<Config> {
    let mut cfg = match config_path() {
        Some(path) if path.exists() => {
            let contents = std::fs::read_to_string(&path).map_err(|e| {
                crate::Error::Config(format!("failed to read {}: {e}", path.display()))
            })?;
            toml::from_str(&contents).map_err(|e| {
                crate::Error::Config(format!("failed to parse {}: {e}", path.display()))
            })?
        }
        _ => Config::default(),
    };
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("WIKIGIT_BASE")
        && !v.is_empty()
    {
        cfg.base = Some(v);
    }
    if let Ok(v) = std::env::var("WIKIGIT_USER")
        && !v.is_empty()
    {
        cfg.user = Some(v);
    }
    if let Ok(v) = std::env::var("WIKIGIT_PASSWORD")
        && !v.is_empty()
    {
        cfg.password = Some(v);
    }
    if let Ok(v) = std::env::var("WIKIGIT_LOG")
        && !v.is_empty()
    {
        cfg.logging.filter = Some(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_parses_partial_toml() {
        let cfg: Config = toml::from_str(
            r#"
            base = "https://wiki.example.com"

            [converter]
            program = "cat"
            args = []
            "#,
        )
        .unwrap();
        assert_eq!(cfg.base.as_deref(), Some("https://wiki.example.com"));
        assert_eq!(cfg.converter.program, "cat");
        assert!(cfg.user.is_none());
        assert!(cfg.logging.filter.is_none());
    }

    #[test]
    fn default_converter_is_pandoc_with_url_metadata() {
        let cfg = ConverterConfig::default();
        assert_eq!(cfg.program, "pandoc");
        assert!(cfg.args.iter().any(|a| a.contains("{url}")));
    }
}
