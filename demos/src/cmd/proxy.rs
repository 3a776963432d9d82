//! Development reverse proxy for the relying party backend.

use anyhow::Result;
use clap::Parser;
use demos::proxy::Proxy;

#[derive(Debug, Parser)]
#[command(name = "proxy", version, about = "Forward a path prefix to the relying party backend")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "PROXY_LISTEN", default_value = "127.0.0.1:3001")]
    listen: String,

    /// Path prefix to forward.
    #[arg(long, env = "PROXY_PREFIX", default_value = "/api")]
    prefix: String,

    /// Origin to forward to.
    #[arg(long, env = "PROXY_TARGET", default_value = credibil_verify::config::DEFAULT_BACKEND_URL)]
    target: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    demos::init_tracing()?;
    let args = Args::parse();

    Proxy::new(args.prefix, args.target)?.serve(&args.listen).await?;

    // block until `ctrl-c`
    Ok(tokio::signal::ctrl_c().await?)
}
