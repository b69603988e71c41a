use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;

use crate::state::GridImage;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog request failed with status {0}")]
    Status(reqwest::StatusCode),
    #[error("catalog is empty")]
    Empty,
}

/// Provider of the full, ordered media catalog. Called once, off the UI thread.
pub trait ImageSource: Send + Sync {
    fn load_images(&self) -> Result<Vec<GridImage>>;
}

/// Reads a JSON array of `{ id, src, alt }` objects from disk.
pub struct CatalogFileSource {
    path: PathBuf,
}

impl CatalogFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ImageSource for CatalogFileSource {
    fn load_images(&self) -> Result<Vec<GridImage>> {
        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("read catalog at {}", self.path.display()))?;
        let images: Vec<GridImage> = serde_json::from_str(&data)
            .with_context(|| format!("parse catalog at {}", self.path.display()))?;
        if images.is_empty() {
            return Err(CatalogError::Empty.into());
        }
        Ok(images)
    }
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

pub struct HttpCatalogSource {
    client: Client,
    cfg: HttpConfig,
}

impl HttpCatalogSource {
    pub fn new(cfg: HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(cfg.timeout)
            .build()
            .context("catalog: build http client")?;
        Ok(Self { client, cfg })
    }
}

impl ImageSource for HttpCatalogSource {
    fn load_images(&self) -> Result<Vec<GridImage>> {
        let response = self
            .client
            .get(&self.cfg.url)
            .header(USER_AGENT, self.cfg.user_agent.as_str())
            .send()
            .context("catalog: request")?;

        if !response.status().is_success() {
            return Err(CatalogError::Status(response.status()).into());
        }

        let images: Vec<GridImage> = response.json().context("catalog: decode body")?;
        if images.is_empty() {
            return Err(CatalogError::Empty.into());
        }
        Ok(images)
    }
}

/// Built-in catalog used when no source is configured.
pub struct SampleImageSource {
    count: u32,
}

impl SampleImageSource {
    pub fn new(count: u32) -> Self {
        Self { count }
    }
}

impl Default for SampleImageSource {
    fn default() -> Self {
        Self::new(SAMPLE_OUTLETS.len() as u32)
    }
}

impl ImageSource for SampleImageSource {
    fn load_images(&self) -> Result<Vec<GridImage>> {
        Ok((1..=self.count)
            .map(|id| {
                let name = SAMPLE_OUTLETS
                    .get(id as usize - 1)
                    .map(|name| name.to_string())
                    .unwrap_or_else(|| format!("Outlet {id}"));
                GridImage {
                    id,
                    src: format!("https://static.newsstand.example/logo/{id}.png"),
                    alt: name,
                }
            })
            .collect())
    }
}

const SAMPLE_OUTLETS: [&str; 30] = [
    "Morning Ledger",
    "City Wire",
    "Harbor Times",
    "Daily Meridian",
    "Northern Post",
    "Evening Courier",
    "Metro Bulletin",
    "Valley Herald",
    "Coastal Gazette",
    "Capital Report",
    "Weekly Observer",
    "Summit Tribune",
    "Riverside Journal",
    "Union Dispatch",
    "Prairie Sentinel",
    "Atlas Review",
    "Lakeshore Record",
    "Pioneer Press",
    "Granite Chronicle",
    "Bay Examiner",
    "Frontier News",
    "Highland Register",
    "Civic Standard",
    "Lantern Daily",
    "Compass Times",
    "Beacon Star",
    "Market Monitor",
    "Signal Sun",
    "Crescent Mail",
    "Horizon Today",
];

/// Returns a uniformly shuffled copy of `items`; the input is left untouched.
pub fn shuffled<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    out.shuffle(rng);
    out
}
