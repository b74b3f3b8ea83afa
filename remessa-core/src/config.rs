//! Configuration for remittance generation

use crate::types::PayerProfile;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Remittance configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Paying company
    #[serde(default)]
    pub payer: PayerProfile,

    /// Where files and state go
    #[serde(default)]
    pub output: OutputConfig,
}

/// Output locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for generated `.REM` files
    pub dir: PathBuf,

    /// NSA state file
    pub state_file: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./remessas"),
            state_file: PathBuf::from("./remessa-state.toml"),
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load defaults, then environment overrides
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `REMESSA_*` environment variables
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(dir) = lookup("REMESSA_OUTPUT_DIR") {
            self.output.dir = PathBuf::from(dir);
        }

        if let Some(file) = lookup("REMESSA_STATE_FILE") {
            self.output.state_file = PathBuf::from(file);
        }

        if let Some(flag) = lookup("REMESSA_PIX_ENABLED") {
            self.payer.pix_enabled = match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "sim" => true,
                "0" | "false" | "no" | "nao" => false,
                other => {
                    return Err(Error::Config(format!(
                        "REMESSA_PIX_ENABLED must be a boolean, got {:?}",
                        other
                    )))
                }
            };
        }

        Ok(())
    }

    /// Check the payer fields a file cannot do without
    pub fn validate(&self) -> Result<()> {
        let payer = &self.payer;
        let required = [
            ("payer.company_name", &payer.company_name),
            ("payer.tax_id", &payer.tax_id),
            ("payer.agreement_code", &payer.agreement_code),
            ("payer.agency", &payer.agency),
            ("payer.account", &payer.account),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(Error::Config(format!("missing {}", missing.join(", "))));
        }

        if !payer.normalized().tax_id.is_classified() {
            return Err(Error::Config(
                "payer.tax_id must have 11 (CPF) or 14 (CNPJ) digits".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[payer]
company_name = "Construtora Exemplo Ltda"
tax_id = "95.258.174/0001-65"
agreement_code = "458049"
agency = "0268"
account = "559461"
account_digit = "8"
pix_enabled = true

[output]
dir = "/var/remessas"
state_file = "/var/remessas/state.toml"
"#;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.output.dir, PathBuf::from("./remessas"));
        assert_eq!(
            config.output.state_file,
            PathBuf::from("./remessa-state.toml")
        );
        assert!(!config.payer.pix_enabled);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), SAMPLE).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.payer.agreement_code, "458049");
        assert!(config.payer.pix_enabled);
        assert_eq!(config.output.dir, PathBuf::from("/var/remessas"));
        config.validate().unwrap();
    }

    #[test]
    fn test_output_section_optional() {
        let payer_only = SAMPLE.split("[output]").next().unwrap();
        let config: Config = toml::from_str(payer_only).unwrap();
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn test_bad_file_is_config_error() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "[payer\n").unwrap();
        assert!(matches!(
            Config::from_file(file.path()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("REMESSA_OUTPUT_DIR", "/tmp/out"),
            ("REMESSA_STATE_FILE", "/tmp/out/nsa.toml"),
            ("REMESSA_PIX_ENABLED", "Sim"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.output.dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.output.state_file, PathBuf::from("/tmp/out/nsa.toml"));
        assert!(config.payer.pix_enabled);

        let result = config.apply_overrides(|key| {
            (key == "REMESSA_PIX_ENABLED").then(|| "maybe".to_string())
        });
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_payer_tax_id() {
        let mut config: Config = toml::from_str(SAMPLE).unwrap();
        config.payer.tax_id = "123".to_string();
        assert!(config.validate().is_err());

        config.payer.agency = " ".to_string();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("payer.agency"));
    }
}
