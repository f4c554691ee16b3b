use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use county_choropleth::config::AppConfig;
use county_choropleth::{data, render, server};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch both datasets and write the choropleth to the output directory
    Generate {
        #[command(flatten)]
        input: InputArgs,
        /// Also write a PNG preview
        #[arg(long)]
        png: bool,
    },
    /// Generate the map, then serve it with a region lookup API
    Serve {
        #[command(flatten)]
        input: InputArgs,
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Args)]
struct InputArgs {
    /// TOML configuration; built-in defaults when omitted
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Education records, URL or file path
    #[arg(long, value_name = "SRC")]
    education: Option<String>,
    /// County topology, URL or file path
    #[arg(long, value_name = "SRC")]
    counties: Option<String>,
    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    out: Option<PathBuf>,
}

impl InputArgs {
    fn load_config(&self) -> anyhow::Result<AppConfig> {
        let mut config = AppConfig::load(self.config.as_deref())?;
        if let Some(education) = &self.education {
            config.input.education = education.clone();
        }
        if let Some(counties) = &self.counties {
            config.input.counties = counties.clone();
        }
        if let Some(out) = &self.out {
            config.output.dir = out.clone();
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Generate { input, png } => {
            let mut app_config = input.load_config()?;
            app_config.output.png |= *png;

            // 1. Load both datasets
            let datasets = data::load(&app_config).await.context("Failed to load datasets")?;

            // 2. Join and render
            let generated = render::generate_map(&app_config, &datasets)?;

            info!(regions = generated.shapes.len(), files = generated.files.len(), "Generation complete");
        }
        Commands::Serve { input, port } => {
            let app_config = input.load_config()?;
            let datasets = data::load(&app_config).await.context("Failed to load datasets")?;
            let generated = render::generate_map(&app_config, &datasets)?;

            // The lookup API needs the resolved regions alongside their geometry.
            let state = server::AppState::new(datasets.features, generated.shapes);

            let port = port.unwrap_or(app_config.server.port);
            server::start_server(state, app_config.output.dir.clone(), port).await?;
        }
    }

    Ok(())
}
