use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub viewer: ViewerConfig,
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the query backend, without a trailing slash
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    pub endpoints: EndpointConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Multipart upload of a local file
    pub init: String,
    pub query: String,
    pub page: String,

    /// Dataset-by-reference variant (bucket + file name)
    pub load_dataset: String,
    pub dataset_query: String,
    pub dataset_page: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Rows per page, fixed for the whole session
    pub page_size: usize,

    /// Query text in effect right after a dataset is loaded
    pub default_query: String,

    /// Longest query accepted before anything is sent
    pub max_query_length: usize,

    /// Queries containing any of these (case-insensitive) are rejected locally
    pub blocked_keywords: Vec<String>,

    /// How many categories a categorical column lists under its header
    pub top_categories: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Fill color of histogram bars
    pub bar_color: String,

    pub bar_border_color: String,

    /// Fill color of the bar matching the hovered cell
    pub highlight_color: String,

    pub sort_glyphs: SortGlyphs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SortGlyphs {
    pub ascending: String,
    pub descending: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 60,
            endpoints: EndpointConfig::default(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            init: "/init".to_string(),
            query: "/query".to_string(),
            page: "/page".to_string(),
            load_dataset: "/dataviewer/load_dataset".to_string(),
            dataset_query: "/dataviewer/query".to_string(),
            dataset_page: "/dataviewer/page".to_string(),
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            default_query: "SELECT * FROM data".to_string(),
            max_query_length: 1000,
            blocked_keywords: [
                "drop",
                "delete",
                "insert",
                "update",
                "create",
                "alter",
                "truncate",
                "exec",
                "execute",
                "union",
                "script",
                "javascript",
                "eval",
                "system",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
            top_categories: 3,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            bar_color: "rgba(54, 162, 235, 0.5)".to_string(),
            bar_border_color: "rgba(54, 162, 235, 1)".to_string(),
            highlight_color: "rgba(255, 99, 132, 0.8)".to_string(),
            sort_glyphs: SortGlyphs::default(),
        }
    }
}

impl Default for SortGlyphs {
    fn default() -> Self {
        Self {
            ascending: "↑".to_string(),
            descending: "↓".to_string(),
        }
    }
}

impl Config {
    /// Load config from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            // Create default config if it doesn't exist
            let default_config = Self::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;
        config.normalize();
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("parquet-dataview").join("config.toml"))
    }

    fn normalize(&mut self) {
        while self.api.base_url.ends_with('/') {
            self.api.base_url.pop();
        }
        self.viewer.page_size = self.viewer.page_size.max(1);
        for keyword in &mut self.viewer.blocked_keywords {
            *keyword = keyword.to_lowercase();
        }
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# Parquet DataView Configuration File
# Location: ~/.config/parquet-dataview/config.toml (Linux)

[api]
# Query backend base URL
base_url = "http://localhost:8000"
timeout_secs = 60

[api.endpoints]
# Upload variant (multipart field "file", server-side temp path handle)
init = "/init"
query = "/query"
page = "/page"

# Dataset-by-reference variant (bucket_name + file_name handle)
load_dataset = "/dataviewer/load_dataset"
dataset_query = "/dataviewer/query"
dataset_page = "/dataviewer/page"

[viewer]
# Rows per page (fixed for the session)
page_size = 10

# Query used for paging right after a dataset is loaded
default_query = "SELECT * FROM data"

# Longest query accepted
max_query_length = 1000

# Queries mentioning any of these are rejected before sending
blocked_keywords = ["drop", "delete", "insert", "update", "create", "alter", "truncate", "exec", "execute", "union", "script", "javascript", "eval", "system"]

# Categories listed under a categorical column header
top_categories = 3

[theme]
bar_color = "rgba(54, 162, 235, 0.5)"
bar_border_color = "rgba(54, 162, 235, 1)"
highlight_color = "rgba(255, 99, 132, 0.8)"

[theme.sort_glyphs]
ascending = "↑"
descending = "↓"
"#
        .to_string()
    }
}
