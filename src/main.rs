use anyhow::Result;
use clap::Parser;
use netguard_models::cli::Cli;

fn main() -> Result<()> {
    // stdout is reserved for the JSON response
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("netguard_models=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    cli.run()
}
