use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config;
use crate::data::{self, ImageSource};
use crate::dispatcher::Dispatcher;
use crate::grid::{GridOptions, StaleCells};
use crate::loader::LoaderOptions;
use crate::logging;
use crate::state::AppState;
use crate::ui;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config_file: Option<PathBuf>,
}

pub fn run(options: RunOptions) -> Result<()> {
    let cfg = config::load(config::LoadOptions {
        config_file: options.config_file,
        env_prefix: None,
    })
    .context("load config")?;
    logging::init(&cfg.log).context("init logging")?;

    let source = image_source(&cfg.source).context("configure catalog source")?;
    let dispatcher = Dispatcher::new(AppState::with_subscriptions(
        cfg.subscriptions.names.iter().cloned(),
    ));
    let grid = GridOptions {
        stale_cells: if cfg.grid.clear_stale_cells {
            StaleCells::Clear
        } else {
            StaleCells::Keep
        },
        loader: LoaderOptions {
            shuffle_seed: cfg.grid.shuffle_seed,
        },
    };

    info!(version = crate::VERSION, "starting");
    let mut model = ui::Model::new(ui::Options {
        dispatcher,
        source,
        grid,
        tick_rate: cfg.ui.tick_rate,
    });
    model.run()
}

/// Picks the catalog source: a local file wins over a URL; with neither,
/// the built-in sample catalog is used.
pub fn image_source(cfg: &config::SourceConfig) -> Result<Arc<dyn ImageSource>> {
    if let Some(path) = cfg.catalog_file.as_ref() {
        info!(path = %path.display(), "catalog from file");
        return Ok(Arc::new(data::CatalogFileSource::new(path.clone())));
    }
    if !cfg.catalog_url.trim().is_empty() {
        info!(url = %cfg.catalog_url, "catalog from url");
        let source = data::HttpCatalogSource::new(data::HttpConfig {
            url: cfg.catalog_url.trim().to_string(),
            user_agent: cfg.user_agent.clone(),
            timeout: cfg.timeout,
        })?;
        return Ok(Arc::new(source));
    }
    Ok(Arc::new(data::SampleImageSource::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn file_source_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        fs::write(&path, r#"[{"id":7,"src":"x.png","alt":"X"}]"#).unwrap();
        let cfg = config::SourceConfig {
            catalog_file: Some(path),
            catalog_url: "http://127.0.0.1:9/catalog.json".into(),
            ..config::SourceConfig::default()
        };
        let images = image_source(&cfg).unwrap().load_images().unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].alt, "X");
    }

    #[test]
    fn falls_back_to_sample_catalog() {
        let images = image_source(&config::SourceConfig::default())
            .unwrap()
            .load_images()
            .unwrap();
        assert_eq!(images.len(), 30);
    }
}
