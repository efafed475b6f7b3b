mod project;

use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Optional .env with ELEMENTS_CONFIG / ELEMENTS_DEBUG_AST / RUST_LOG.
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,elements_compiler=info,module_graph=info"))
        .context("log filter")?;
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();

    let Some(project_file) = std::env::args().nth(1).map(PathBuf::from) else {
        bail!("usage: elements-build <project.yaml>");
    };

    let report = project::build(&project_file)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
