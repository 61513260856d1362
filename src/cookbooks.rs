//! Cookbook descriptor sets and the downloader that fetches their files.
use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::value::RawValue;
use tracing::{debug, warn};

use crate::api::ChefApi;

/// Cookbooks resolved for one run list, keyed by cookbook name. Each
/// descriptor stays raw JSON until a downloader decodes it.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct CookbookSet(BTreeMap<String, Box<RawValue>>);

impl CookbookSet {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.0
            .iter()
            .map(|(name, descriptor)| (name.as_str(), descriptor.as_ref()))
    }
}

/// Fetches the content of resolved cookbooks.
#[async_trait]
pub trait CookbookDownloader: Send + Sync {
    /// Downloads every cookbook in `cookbooks`. Failures are the
    /// downloader's own business; callers don't inspect the outcome.
    async fn download(&self, node_name: &str, api: &dyn ChefApi, cookbooks: &CookbookSet);
}

/// Manifest fields needed to locate cookbook files. Newer servers list every
/// file under `all_files`; older ones split them into segments.
#[derive(Debug, Default, Deserialize)]
struct CookbookManifest {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    all_files: Vec<CookbookFile>,
    #[serde(default)]
    recipes: Vec<CookbookFile>,
    #[serde(default)]
    attributes: Vec<CookbookFile>,
    #[serde(default)]
    definitions: Vec<CookbookFile>,
    #[serde(default)]
    files: Vec<CookbookFile>,
    #[serde(default)]
    libraries: Vec<CookbookFile>,
    #[serde(default)]
    providers: Vec<CookbookFile>,
    #[serde(default)]
    resources: Vec<CookbookFile>,
    #[serde(default)]
    templates: Vec<CookbookFile>,
    #[serde(default)]
    root_files: Vec<CookbookFile>,
}

impl CookbookManifest {
    fn file_urls(&self) -> impl Iterator<Item = &str> {
        let segments: [&[CookbookFile]; 10] = [
            &self.all_files,
            &self.recipes,
            &self.attributes,
            &self.definitions,
            &self.files,
            &self.libraries,
            &self.providers,
            &self.resources,
            &self.templates,
            &self.root_files,
        ];
        segments
            .into_iter()
            .flatten()
            .filter_map(|file| file.url.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct CookbookFile {
    #[serde(default)]
    url: Option<String>,
}

/// Downloads every file of every resolved cookbook through the Chef API
/// client, one after another, discarding the content.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiCookbookDownloader;

#[async_trait]
impl CookbookDownloader for ApiCookbookDownloader {
    async fn download(&self, node_name: &str, api: &dyn ChefApi, cookbooks: &CookbookSet) {
        for (name, descriptor) in cookbooks.iter() {
            let manifest: CookbookManifest = match serde_json::from_str(descriptor.get()) {
                Ok(manifest) => manifest,
                Err(err) => {
                    warn!(
                        node = node_name,
                        cookbook = name,
                        "Couldn't decode cookbook: {}",
                        err
                    );
                    continue;
                }
            };

            let mut fetched: usize = 0;
            for url in manifest.file_urls() {
                match api.probe(url).await {
                    Ok(_) => fetched = fetched.saturating_add(1),
                    Err(err) => {
                        warn!(
                            node = node_name,
                            cookbook = name,
                            "Couldn't download cookbook file: {}",
                            err
                        );
                    }
                }
            }
            debug!(
                node = node_name,
                cookbook = name,
                version = manifest.version.as_deref().unwrap_or("unknown"),
                "Downloaded {} cookbook files",
                fetched
            );
        }
    }
}
