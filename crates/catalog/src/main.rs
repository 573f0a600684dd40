use std::time::Duration;

use crate::prelude::*;
use catalog_core::pagination::{CatalogConfig, DEFAULT_BASE_URL};
use clap::Parser;

mod list;
mod prelude;
mod session;
mod show;
mod sorts;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Browse a paginated product catalog from the terminal"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Catalog API base URL
    #[clap(long, env = "CATALOG_BASE_URL", global = true, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Catalog API key
    #[clap(long, env = "CATALOG_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// Products requested per page
    #[clap(long, env = "CATALOG_PAGE_SIZE", global = true, default_value = "30")]
    page_size: u32,

    /// Request timeout in seconds
    #[clap(long, env = "CATALOG_TIMEOUT", global = true, default_value = "30")]
    timeout: u64,

    /// Whether to display additional information.
    #[clap(long, env = "CATALOG_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

impl Global {
    /// Build the client configuration from the global flags
    pub fn config(&self) -> Result<CatalogConfig> {
        let api_key = self
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| eyre!("CATALOG_API_KEY environment variable not set"))?;

        if self.page_size == 0 {
            return Err(eyre!("--page-size must be at least 1"));
        }

        Ok(CatalogConfig::new(api_key)
            .with_base_url(&self.base_url)
            .with_page_size(self.page_size))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// List catalog products, loading as many pages as requested
    List(crate::list::ListOptions),

    /// Show every field of a single product
    Show(crate::show::ShowOptions),

    /// List the available sort orders
    Sorts,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::List(options) => crate::list::run(options, app.global).await,
        SubCommands::Show(options) => crate::show::run(options, app.global).await,
        SubCommands::Sorts => crate::sorts::run(),
    }
}
