//! proxy-inject - checks whether a pod manifest would receive the proxy.
//!
//! Reads one `Pod` as JSON on stdin, resolves it the way the CLI injector does,
//! and prints the decision record as JSON on stdout. Refusal reasons and
//! annotation warnings are logged to stderr.
//!
//! Configuration comes from the environment:
//! - `CONTROL_PLANE_NAMESPACE` (or `POD_NAMESPACE`): evaluating control plane
//! - `PROXY_CONTAINER_NAME`, `PROXY_INIT_CONTAINER_NAME`: proxy container names

use std::io;

use tracing::info;

use proxy_inject::{ResolverConfig, cli};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("proxy_inject=info".parse()?),
        )
        .with_writer(io::stderr)
        .json()
        .init();

    run()?;
    Ok(())
}

fn run() -> proxy_inject::Result<()> {
    let config = ResolverConfig::from_env()?;
    info!(
        control_plane_namespace = %config.control_plane_namespace,
        "Evaluating pod manifest from stdin"
    );

    cli::evaluate(io::stdin().lock(), io::stdout().lock(), &config)?;
    Ok(())
}
