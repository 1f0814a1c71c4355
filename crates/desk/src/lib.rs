pub mod action;
pub mod app;
pub mod cli;
pub mod components;
pub mod config;
pub mod errors;
pub mod fetch;
pub mod pages;
pub mod tui;

use std::{sync::Arc, time::Duration};

use ::app::{AppBuilder, Application};
use color_eyre::{Result, eyre::eyre};
use grid::RouteTable;
use tracing::info;

use crate::{
    cli::{Cli, Cmd},
    config::Config,
    fetch::{Dataset, EmbeddedFixtures, FixtureSource, FsFixtures},
    pages::{PageContext, catalog},
};

pub struct Desk;

impl Application for Desk {
    const APP_ID: &'static str = "desk";
}

/// Built-in routes with the configured ones merged over them.
pub fn effective_routes(config: &Config) -> RouteTable {
    let mut routes = catalog::default_routes();
    routes.merge(config.routes.clone());
    routes
}

/// Where fixtures come from: the configured directory, the data directory
/// when it has a `fixtures/` folder, else the set compiled into the binary.
pub fn fixture_source(
    config: &Config,
    data_fixtures: std::path::PathBuf,
) -> Arc<dyn FixtureSource> {
    match &config.fixtures_dir {
        Some(dir) => Arc::new(FsFixtures::new(dir)),
        None if data_fixtures.is_dir() => Arc::new(FsFixtures::new(data_fixtures)),
        None => Arc::new(EmbeddedFixtures),
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    errors::init()?;

    let builder = AppBuilder::<Desk>::new(env!("CARGO_PKG_VERSION")).dir_overrides(
        cli.config_dir.clone().or_else(crate::config::config_dir_override),
        cli.data_dir.clone().or_else(crate::config::data_dir_override),
    );
    let mut config = Config::load(&builder.path_context().config_dir(), Desk::APP_ID)?;
    let base = builder
        .log_filter(config.log_level.clone())
        .console(false)
        .build()
        .map_err(|e| eyre!(e))?;

    let paths = base.path_context();
    let routes = effective_routes(&config);
    let source = fixture_source(&config, paths.fixtures_dir());
    info!(fixtures = %source.describe(), routes = routes.len(), "desk starting");

    match cli.command() {
        Cmd::Run {
            page,
            tick_rate,
            frame_rate,
        } => {
            if let Some(rate) = tick_rate {
                config.tick_rate = rate;
            }
            if let Some(rate) = frame_rate {
                config.frame_rate = rate;
            }
            let ctx = PageContext::new(routes, paths.exports_dir()).page_size(config.page_size);
            let pages = catalog::pages(&ctx);
            let mut app = crate::app::App::new(config, &ctx, pages, source)?;
            app.run(page.as_deref()).await?;
        }
        Cmd::Pages => {
            let ctx = PageContext::new(routes.clone(), paths.exports_dir());
            for page in catalog::pages(&ctx) {
                let path = routes.lookup(page.key()).unwrap_or("-");
                println!("{:<14} {:<18} {}", page.key(), page.title(), path);
            }
        }
        Cmd::Routes => {
            for (key, path) in routes.iter() {
                println!("{key:<14} {path}");
            }
        }
        Cmd::Check { fixture } => {
            let timeout = Duration::from_millis(config.fetch_timeout_ms);
            let dataset = fetch::fetch_dataset(source.as_ref(), &fixture, timeout).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&summary(&fixture, &dataset))?
            );
        }
    }
    Ok(())
}

/// Shape of a loaded fixture for `desk check`.
pub fn summary(fixture: &str, dataset: &Dataset) -> serde_json::Value {
    let tabs: Vec<serde_json::Value> = match dataset {
        Dataset::Table(_) => Vec::new(),
        Dataset::Tabs(tabs) => tabs
            .iter()
            .map(|(key, table)| {
                serde_json::json!({
                    "tab": key,
                    "columns": table.headers.len(),
                    "rows": table.rows.len(),
                })
            })
            .collect(),
    };
    serde_json::json!({
        "fixture": fixture,
        "rows": dataset.row_count(),
        "tabs": tabs,
    })
}
