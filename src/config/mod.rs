pub mod file;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_url, Validate,
};
use clap::Parser;
use file::FileConfig;

const DEFAULT_SEARCH_URL: &str = "https://api-publica.datajud.cnj.jus.br/api_publica/_search";
const DEFAULT_BACKEND_URL: &str = "http://localhost:3000/rest/v1";
const DEFAULT_TRIBUNAL: &str = "api_publica_tjto";
const DEFAULT_HIT_SIZE: usize = 1;

#[derive(Debug, Clone, Parser)]
#[command(name = "sigace-import")]
#[command(about = "Bulk importer of judicial processes from CSV/XLSX/text files")]
pub struct CliConfig {
    /// Input file with one process number per row
    #[arg(long)]
    pub input: String,

    /// Override format detection (csv, xlsx, xls, txt)
    #[arg(long)]
    pub format: Option<String>,

    /// TOML configuration file; explicitly passed flags override its values
    #[arg(long)]
    pub config: Option<String>,

    /// Search endpoint (default: the public DataJud gateway)
    #[arg(long)]
    pub search_url: Option<String>,

    /// Backend REST endpoint (default: http://localhost:3000/rest/v1)
    #[arg(long)]
    pub backend_url: Option<String>,

    /// Court endpoint alias sent with every search request (default: api_publica_tjto)
    #[arg(long)]
    pub tribunal: Option<String>,

    /// API key for the search endpoint
    #[arg(long)]
    pub api_key: Option<String>,

    /// API key for the backend store
    #[arg(long)]
    pub backend_key: Option<String>,

    /// Maximum hits requested per search (default: 1)
    #[arg(long)]
    pub hit_size: Option<usize>,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub yes: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("input", &self.input)?;
        if let Some(url) = &self.search_url {
            validate_url("search_url", url)?;
        }
        if let Some(url) = &self.backend_url {
            validate_url("backend_url", url)?;
        }
        if let Some(tribunal) = &self.tribunal {
            validate_non_empty_string("tribunal", tribunal)?;
        }
        if let Some(hit_size) = self.hit_size {
            validate_positive_number("hit_size", hit_size, 1)?;
        }
        Ok(())
    }
}

/// Final configuration handed to the adapters.
///
/// Precedence per field: explicitly passed flag, then the optional TOML
/// file, then the built-in default.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub search_url: String,
    pub backend_url: String,
    pub tribunal: String,
    pub lookup_api_key: Option<String>,
    pub backend_api_key: Option<String>,
    pub hit_size: usize,
}

impl ImportConfig {
    pub fn resolve(cli: &CliConfig) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::from_file(path)?,
            None => FileConfig::default(),
        };
        let lookup = file.lookup.unwrap_or_default();
        let backend = file.backend.unwrap_or_default();

        let config = Self {
            search_url: cli
                .search_url
                .clone()
                .or(lookup.search_url)
                .unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string()),
            backend_url: cli
                .backend_url
                .clone()
                .or(backend.url)
                .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string()),
            tribunal: cli
                .tribunal
                .clone()
                .or(lookup.tribunal)
                .unwrap_or_else(|| DEFAULT_TRIBUNAL.to_string()),
            lookup_api_key: cli.api_key.clone().or(lookup.api_key),
            backend_api_key: cli.backend_key.clone().or(backend.api_key),
            hit_size: cli.hit_size.or(lookup.hit_size).unwrap_or(DEFAULT_HIT_SIZE),
        };
        config.validate()?;
        Ok(config)
    }
}

impl Validate for ImportConfig {
    fn validate(&self) -> Result<()> {
        validate_url("search_url", &self.search_url)?;
        validate_url("backend_url", &self.backend_url)?;
        validate_non_empty_string("tribunal", &self.tribunal)?;
        validate_positive_number("hit_size", self.hit_size, 1)?;
        Ok(())
    }
}

impl ConfigProvider for ImportConfig {
    fn search_url(&self) -> &str {
        &self.search_url
    }

    fn backend_url(&self) -> &str {
        &self.backend_url
    }

    fn tribunal(&self) -> &str {
        &self.tribunal
    }

    fn lookup_api_key(&self) -> Option<&str> {
        self.lookup_api_key.as_deref()
    }

    fn backend_api_key(&self) -> Option<&str> {
        self.backend_api_key.as_deref()
    }

    fn hit_size(&self) -> usize {
        self.hit_size
    }
}
