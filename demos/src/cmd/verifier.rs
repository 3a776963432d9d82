//! Interactive verifier.
//!
//! Fetches the sign-in envelope, lets the user pick a proof type, and shows
//! the wallet QR code and deep link. Wallets (or a test harness) report back
//! with `POST /proof-complete`; requests for the browser extension are printed
//! as JSON.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use credibil_verify::{Config, Event, ProofCatalog, Signals, Verifier, ViewModel};
use demos::render::render;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[derive(Debug, Parser)]
#[command(name = "verifier", version, about = "Request a zero-knowledge proof from a wallet")]
struct Args {
    /// Relying party backend issuing the sign-in envelope.
    #[arg(long, env = "VERIFY_BACKEND", default_value = credibil_verify::config::DEFAULT_BACKEND_URL)]
    backend: String,

    /// Wallet web app the deep link opens.
    #[arg(long, env = "VERIFY_WALLET", default_value = credibil_verify::channel::DEFAULT_WALLET_URL)]
    wallet: String,

    /// JSON file replacing the built-in proof catalog.
    #[arg(long, env = "VERIFY_CATALOG")]
    catalog: Option<PathBuf>,

    /// Address for the `proof-complete` callback.
    #[arg(long, env = "VERIFY_LISTEN", default_value = "127.0.0.1:3000")]
    listen: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    demos::init_tracing()?;
    let args = Args::parse();

    let catalog = match &args.catalog {
        Some(path) => ProofCatalog::from_file(path)?,
        None => ProofCatalog::builtin(),
    };
    let config = Config::default().backend_url(args.backend).wallet_url(args.wallet);
    let verifier = Verifier::new(config.clone(), catalog.clone(), Signals::new());

    let session = verifier.load(&reqwest::Client::new()).await;
    println!("{}", render(&verifier.view())?);
    if let Some(err) = session.error().filter(|e| e.is_fatal()) {
        bail!("{}", err.description());
    }

    demos::callback::serve(&args.listen, verifier.signals().clone()).await?;

    // redraw on every published snapshot
    let mut sessions = verifier.watch();
    tokio::spawn(async move {
        while sessions.changed().await.is_ok() {
            let session = sessions.borrow_and_update().clone();
            match render(&ViewModel::new(&session, &catalog, &config)) {
                Ok(out) => println!("{out}"),
                Err(e) => tracing::error!("issue rendering view: {e}"),
            }
        }
    });

    // stand in for the browser extension
    let mut request_ready = verifier.signals().subscribe_request_ready();
    tokio::spawn(async move {
        while let Some(signal) = request_ready.recv().await {
            match serde_json::to_string_pretty(&signal) {
                Ok(json) => println!("request-ready:\n{json}"),
                Err(e) => tracing::error!("issue serializing request: {e}"),
            }
        }
    });

    let (events, rx) = mpsc::channel(8);
    let options: Vec<String> =
        verifier.catalog().descriptors().iter().map(|d| d.id.clone()).collect();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let event = match line.trim() {
                "q" => break,
                "e" => Event::UseExtension,
                choice => {
                    let Some(id) = choice
                        .parse::<usize>()
                        .ok()
                        .and_then(|n| n.checked_sub(1))
                        .and_then(|i| options.get(i))
                    else {
                        println!("choose 1-{}, e, or q", options.len());
                        continue;
                    };
                    Event::Select(id.clone())
                }
            };
            if events.send(event).await.is_err() {
                break;
            }
        }
    });

    tokio::select! {
        () = verifier.run(rx) => {}
        _ = tokio::signal::ctrl_c() => {}
    }

    Ok(())
}
