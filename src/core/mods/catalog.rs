// ─── Mod Catalog ───
// Remote list of optional mods and their display metadata.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::error::{LauncherError, LauncherResult};

/// Display metadata for one mod. `recommended` is a badge, nothing more.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "icon", default)]
    pub icon_url: String,
    #[serde(rename = "recommanded", alias = "recommended", default)]
    pub recommended: bool,
}

/// Catalog document as served: `{ optionalMods: [...], mods: { id: {...} } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ModCatalog {
    #[serde(rename = "optionalMods")]
    pub optional_mods: Vec<String>,
    #[serde(default)]
    pub mods: HashMap<String, ModDetails>,
}

/// One optional mod; `details` is `None` when the catalog lists the id
/// without publishing its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: String,
    pub details: Option<ModDetails>,
}

impl CatalogEntry {
    pub fn is_degraded(&self) -> bool {
        self.details.is_none()
    }
}

impl ModCatalog {
    /// Catalog listing `ids` as optional, with no metadata.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            optional_mods: ids.into_iter().map(Into::into).collect(),
            mods: HashMap::new(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.optional_mods.iter().any(|m| m == id)
    }

    pub fn is_empty(&self) -> bool {
        self.optional_mods.is_empty()
    }

    /// Optional mods in catalog order, duplicates dropped.
    pub fn entries(&self) -> Vec<CatalogEntry> {
        let mut seen = std::collections::HashSet::new();
        self.optional_mods
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .map(|id| {
                let details = self.mods.get(id).cloned();
                if details.is_none() {
                    warn!("Catalog lists optional mod '{}' without metadata", id);
                }
                CatalogEntry {
                    id: id.clone(),
                    details,
                }
            })
            .collect()
    }
}

/// Where the reconciler gets its catalog from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self) -> LauncherResult<ModCatalog>;
}

/// Fetches the catalog. No caching: every call hits the network.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    url: String,
}

impl CatalogClient {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }


    /// Any transport, status or decoding failure becomes `CatalogUnavailable`,
    /// so callers can tell an unreachable catalog from an empty one.
    pub async fn fetch(&self) -> LauncherResult<ModCatalog> {
        info!("Fetching mod catalog from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| unavailable(&self.url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::CatalogUnavailable(format!(
                "{} answered HTTP {}",
                self.url,
                status.as_u16()
            )));
        }

        let catalog: ModCatalog = response
            .json()
            .await
            .map_err(|e| unavailable(&self.url, e))?;

        info!("Catalog lists {} optional mods", catalog.optional_mods.len());
        Ok(catalog)
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn fetch(&self) -> LauncherResult<ModCatalog> {
        CatalogClient::fetch(self).await
    }
}

fn unavailable(url: &str, err: reqwest::Error) -> LauncherError {
    LauncherError::CatalogUnavailable(format!("{url}: {err}"))
}
