//! Taxonomy discovery: fetching schemas by URL through a shared cache,
//! optionally mirroring them to disk.
//!
//! The cache is an explicit handle. Reads take a shared lock and inserts an
//! exclusive one. An entry is inserted only after its fetch completes, so two
//! tasks missing on the same URL at once may both fetch it; the later insert
//! overwrites the earlier with identical bytes.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use url::Url;

use crate::attr::{find_node_attr_non_empty, XSD};
use crate::error::{Result, XbrlError};
use crate::source::{decode_utf8, parse_document};

#[async_trait]
pub trait SchemaFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>>;
}

pub struct HttpFetcher {
    client: Client,
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            user_agent: user_agent.into(),
        }
    }
}

#[async_trait]
impl SchemaFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        log::debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(url.as_str())
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(reqwest::header::ACCEPT_ENCODING, "gzip, deflate")
            .send()
            .await
            .map_err(|e| XbrlError::Fetch(e.to_string()))?;

        log::debug!("Response status: {}", response.status());
        if !response.status().is_success() {
            return Err(XbrlError::Fetch(format!(
                "HTTP request for {} failed with status: {}",
                url,
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| XbrlError::Fetch(e.to_string()))?;
        log::debug!("Received content length: {}", body.len());
        Ok(body.to_vec())
    }
}

#[derive(Debug, Default)]
pub struct TaxonomyCache {
    entries: RwLock<HashMap<String, Arc<Vec<u8>>>>,
}

impl TaxonomyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<Arc<Vec<u8>>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(url).cloned()
    }

    pub fn insert(&self, url: &str, bytes: Arc<Vec<u8>>) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(url.to_string(), bytes);
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct Discovery<F> {
    fetcher: F,
    cache: Arc<TaxonomyCache>,
    taxonomy_dir: Option<PathBuf>,
}

impl<F: SchemaFetcher> Discovery<F> {
    pub fn new(fetcher: F, cache: Arc<TaxonomyCache>) -> Self {
        Self {
            fetcher,
            cache,
            taxonomy_dir: None,
        }
    }

    /// Mirror every fetched file under `dir`.
    pub fn with_taxonomy_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.taxonomy_dir = Some(dir.into());
        self
    }

    pub fn cache(&self) -> &Arc<TaxonomyCache> {
        &self.cache
    }

    pub async fn discover(&self, url: &str) -> Result<Arc<Vec<u8>>> {
        if let Some(bytes) = self.cache.get(url) {
            log::debug!("Cache hit for {}", url);
            return Ok(bytes);
        }

        let parsed = Url::parse(url)?;
        let bytes = self.fetcher.fetch(&parsed).await?;

        if let Some(dir) = &self.taxonomy_dir {
            let dest = url_to_filename(dir, url)?;
            if let Some(parent) = dest.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&dest, &bytes).await?;
            log::debug!("Saved {} to {:?}", url, dest);
        }

        let bytes = Arc::new(bytes);
        self.cache.insert(url, Arc::clone(&bytes));
        Ok(bytes)
    }

    /// Fetches every schema imported by `schema`, resolving relative
    /// locations against `base`. Returns the import map of `schema`; imports
    /// that cannot be fetched are logged and left out of the cache only.
    pub async fn discover_imports(
        &self,
        base: &Url,
        schema: &[u8],
    ) -> Result<BTreeMap<String, String>> {
        let imports = import_schema(schema)?;

        let targets: Vec<String> = imports
            .values()
            .filter_map(|location| match base.join(location) {
                Ok(url) => Some(url.to_string()),
                Err(e) => {
                    log::warn!("Skipping import {}: {}", location, e);
                    None
                }
            })
            .collect();

        let results = join_all(targets.iter().map(|url| self.discover(url))).await;
        for (url, result) in targets.iter().zip(results) {
            if let Err(e) = result {
                log::warn!("Failed to discover {}: {}", url, e);
            }
        }

        Ok(imports)
    }
}

/// Disk location for a fetched URL: `<root>/<scheme>/<host>/<path...>`.
pub fn url_to_filename(root: &Path, url: &str) -> Result<PathBuf> {
    let parsed = Url::parse(url)?;
    let host = parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| XbrlError::InvalidInput(format!("no host in {}", url)))?;

    let mut dest = root.join(parsed.scheme()).join(host);
    if let Some(segments) = parsed.path_segments() {
        for segment in segments.filter(|s| !s.is_empty()) {
            dest.push(segment);
        }
    }
    Ok(dest)
}

/// `namespace -> schemaLocation` for each `xs:import` of a schema that
/// names both.
pub fn import_schema(schema: &[u8]) -> Result<BTreeMap<String, String>> {
    let text = decode_utf8(schema)?;
    let doc = parse_document(text)?;

    let imports = doc
        .root_element()
        .children()
        .filter(|n| n.is_element() && n.has_tag_name((XSD, "import")))
        .filter_map(|n| {
            let namespace = find_node_attr_non_empty(n, "namespace")?;
            let location = find_node_attr_non_empty(n, "schemaLocation")?;
            Some((namespace.to_string(), location.to_string()))
        })
        .collect();
    Ok(imports)
}
