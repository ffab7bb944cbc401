mod cli;
mod output;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use serde_json::json;

use docgate_auth::{
    Clock, FileRevocationStorage, LinkService, RevocationStorage, SessionService, SystemClock,
    signature_key,
};

use cli::{Cli, Commands};
use output::{print_error, print_success, print_value};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let clock = Arc::new(SystemClock);
    let store = Arc::new(FileRevocationStorage::new(&cli.revocation_file));

    match &cli.command {
        Commands::SignLink(args) => {
            let service = LinkService::new(require_secret(&cli)?, clock, store);
            let link = service.issue(&args.resource_id, args.ttl)?;
            print_value(&json!({
                "resource_id": link.resource_id,
                "expires_at_ms": link.expires_at_ms,
                "url": link.url,
            }));
        }
        Commands::RevokeSignature(args) => {
            store
                .revoke_signature(&args.resource_id, &args.signature, clock.now_ms())
                .await?;
            print_success(&format!(
                "Revoked link {}",
                signature_key(&args.resource_id, &args.signature)
            ));
        }
        Commands::RevokeSession(args) => {
            store.revoke_session(&args.jti, clock.now_ms()).await?;
            print_success(&format!("Revoked session {}", args.jti));
        }
        Commands::MintSession(args) => {
            let service = SessionService::new(require_secret(&cli)?, args.ttl, clock, store);
            let token = service.issue(&args.subject, &args.roles)?;
            println!("{token}");
        }
        Commands::VerifySession(args) => {
            let service = SessionService::new(require_secret(&cli)?, 0, clock, store);
            let claims = service.verify(&args.token).await?;
            print_value(&serde_json::to_value(&claims)?);
        }
        Commands::Revocations => {
            let snapshot = store.snapshot().await?;
            if snapshot.signatures.is_empty() && snapshot.sessions.is_empty() {
                println!("{}", "No revocations recorded.".cyan());
            } else {
                print_value(&serde_json::to_value(&snapshot)?);
            }
        }
    }

    Ok(())
}

fn require_secret(cli: &Cli) -> Result<String> {
    cli.secret
        .clone()
        .filter(|s| !s.is_empty())
        .context("signing secret required: pass --secret or set DOCGATE_AUTH_SECRET")
}
