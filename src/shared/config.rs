use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_API_BASE_URL: &str = "https://adminapi.modula.in";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub editor: EditorConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    #[serde(default)]
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Reload the full checklist after a successful batch save instead of
    /// keeping the locally edited items.
    pub refetch_after_save: bool,
    pub history_page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: DEFAULT_API_BASE_URL.to_string(),
                timeout_secs: 30,
                auth_token: None,
            },
            editor: EditorConfig {
                refetch_after_save: false,
                history_page_size: 50,
            },
            storage: StorageConfig {
                data_dir: default_data_dir(),
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from defaults overridden by `FIELDOPS_*` variables
    /// resolved through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = lookup("FIELDOPS_API_BASE_URL") {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                cfg.api.base_url = trimmed.to_string();
            }
        }
        if let Some(v) = lookup("FIELDOPS_API_TIMEOUT_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.api.timeout_secs = value.max(1);
            }
        }
        if let Some(v) = lookup("FIELDOPS_AUTH_TOKEN") {
            let trimmed = v.trim();
            cfg.api.auth_token = if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            };
        }
        if let Some(v) = lookup("FIELDOPS_REFETCH_AFTER_SAVE") {
            cfg.editor.refetch_after_save = parse_bool(&v, cfg.editor.refetch_after_save);
        }
        if let Some(v) = lookup("FIELDOPS_HISTORY_PAGE_SIZE") {
            if let Some(value) = parse_u64(&v) {
                cfg.editor.history_page_size = value.clamp(1, 500) as u32;
            }
        }
        if let Some(v) = lookup("FIELDOPS_DATA_DIR") {
            if !v.trim().is_empty() {
                cfg.storage.data_dir = PathBuf::from(v.trim());
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        let base = self.api.base_url.trim();
        if base.is_empty() {
            return Err("API base_url must not be empty".to_string());
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(format!("API base_url must be an http(s) URL: {base}"));
        }
        if self.api.timeout_secs == 0 {
            return Err("API timeout_secs must be greater than 0".to_string());
        }
        if self.editor.history_page_size == 0 {
            return Err("Editor history_page_size must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("fieldops"))
        .unwrap_or_else(|| PathBuf::from("./data"))
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}
