use crate::utils::error::{ImportError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional TOML configuration for the importer.
///
/// Every field is optional and only fills in flags the user did not pass;
/// an explicit flag always wins. Values may reference environment variables
/// with `${VAR}`, which keeps API keys out of the file itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    pub lookup: Option<LookupSection>,
    pub backend: Option<BackendSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LookupSection {
    pub search_url: Option<String>,
    pub tribunal: Option<String>,
    pub api_key: Option<String>,
    pub hit_size: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendSection {
    pub url: Option<String>,
    pub api_key: Option<String>,
}

impl FileConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ImportError::Io)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ImportError::InvalidConfigValue {
            field: "config".to_string(),
            value: "<toml>".to_string(),
            reason: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAMES}` with their environment values; unknown
    /// variables are left as-is so validation can point at them.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }
}
