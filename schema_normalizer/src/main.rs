use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use schema_normalizer::utils::logging::init_logging;
use schema_normalizer::{config, IntrospectionClient, Schema};

/// Read a database schema and print its normalized form
#[derive(Parser, Debug)]
#[command(name = "schema_normalizer", version, about)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "schema_normalizer.toml")]
    config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

fn render(schema: &Schema, format: Format) -> anyhow::Result<String> {
    Ok(match format {
        Format::Json => serde_json::to_string_pretty(schema)?,
        Format::Yaml => serde_yaml::to_string(schema)?,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = config::load_from_file(&args.config)
        .with_context(|| format!("loading {}", args.config))?;
    init_logging(&config.logging, args.output.is_none())?;

    let client = IntrospectionClient::new(config).await?;
    let result = client.read_schema().await;
    client.close().await;

    let rendered = render(&result?, args.format)?;
    match args.output {
        Some(path) => std::fs::write(&path, rendered)
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{}", rendered),
    }

    Ok(())
}
