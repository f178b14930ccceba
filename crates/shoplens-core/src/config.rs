use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_"));

        Ok(Self { figment })
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Extract the typed settings. Keys the config files leave unset fall
    /// back to defaults; a malformed value is an error, not a fallback.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| anyhow::anyhow!("invalid settings: {}", e))
    }
}

fn default_catalog_path() -> String {
    "data/catalog.json".to_string()
}
fn default_queries_path() -> String {
    "data/queries.json".to_string()
}
fn default_listings_path() -> String {
    "data/listings.json".to_string()
}
fn default_index_dir() -> String {
    "data/indexes/lancedb".to_string()
}
fn default_results_dir() -> String {
    "results".to_string()
}
fn default_embedding_dim() -> usize {
    1024
}
fn default_k_wide() -> usize {
    30
}
fn default_result_cap() -> usize {
    10
}
fn default_judge_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_concurrency() -> usize {
    4
}
fn default_query_timeout_secs() -> u64 {
    60
}

/// Typed settings for the benchmark pipeline. Every field has a default so a
/// bare checkout runs without a config file; `config.toml` and `APP_*`
/// variables override per key.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,
    #[serde(default = "default_queries_path")]
    pub queries_path: String,
    #[serde(default = "default_listings_path")]
    pub listings_path: String,
    #[serde(default = "default_index_dir")]
    pub index_dir: String,
    #[serde(default = "default_results_dir")]
    pub results_dir: String,
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,
    #[serde(default = "default_k_wide")]
    pub k_wide: usize,
    #[serde(default = "default_result_cap")]
    pub result_cap: usize,
    #[serde(default = "default_judge_model")]
    pub judge_model: String,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            queries_path: default_queries_path(),
            listings_path: default_listings_path(),
            index_dir: default_index_dir(),
            results_dir: default_results_dir(),
            embedding_dim: default_embedding_dim(),
            k_wide: default_k_wide(),
            result_cap: default_result_cap(),
            judge_model: default_judge_model(),
            concurrency: default_concurrency(),
            query_timeout_secs: default_query_timeout_secs(),
        }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() {
        p
    } else {
        base.join(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_default_is_runnable() {
        let s = Settings::default();
        assert_eq!(s.result_cap, 10);
        assert!(s.k_wide > s.result_cap);
        assert!(s.concurrency >= 1);
    }
}
