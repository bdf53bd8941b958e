use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::sync::Arc;

use crate::discovery::{Discovery, HttpFetcher, TaxonomyCache};
use crate::inline::ConvertOptions;

#[derive(Clone, Debug)]
pub struct Config {
    pub taxonomy_dir: PathBuf,
    pub user_agent: String,
    pub indent: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            taxonomy_dir: PathBuf::from("taxonomies"),
            user_agent: "software@example.com".to_string(),
            indent: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let taxonomy_dir = std::env::var("IXBRL_TAXONOMY_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.taxonomy_dir);

        let user_agent = std::env::var("IXBRL_USER_AGENT").unwrap_or(defaults.user_agent);

        let indent = match std::env::var("IXBRL_INDENT") {
            Ok(value) => parse_flag(&value)
                .ok_or_else(|| anyhow!("IXBRL_INDENT must be true/false or 1/0, got {:?}", value))?,
            Err(_) => defaults.indent,
        };

        Ok(Self {
            taxonomy_dir,
            user_agent,
            indent,
        })
    }

    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            indent: self.indent,
        }
    }

    /// HTTP discovery sharing `cache`, mirroring into the taxonomy dir.
    pub fn discovery(&self, cache: Arc<TaxonomyCache>) -> Discovery<HttpFetcher> {
        Discovery::new(HttpFetcher::new(self.user_agent.clone()), cache)
            .with_taxonomy_dir(self.taxonomy_dir.clone())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" | "" => Some(false),
        _ => None,
    }
}
