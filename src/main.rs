use gadget_snark::{config::Config, orchestrator::run};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let report = run(&config)?;
    println!("{report}");
    Ok(())
}
