use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "docgate")]
#[command(about = "docgate admin CLI — signed links, sessions and revocations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Signing secret shared with the server
    #[arg(long, global = true, env = "DOCGATE_AUTH_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Path to the revocation store file
    #[arg(
        long,
        global = true,
        env = "DOCGATE_REVOCATION_FILE",
        default_value = "storage/revocations.json"
    )]
    pub revocation_file: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Issue a signed download link for a document
    SignLink(SignLinkArgs),
    /// Revoke a previously issued link signature
    RevokeSignature(RevokeSignatureArgs),
    /// Revoke a session by its jti
    RevokeSession(RevokeSessionArgs),
    /// Mint a session token for a subject
    MintSession(MintSessionArgs),
    /// Verify a session token and print its claims
    VerifySession(VerifySessionArgs),
    /// List all recorded revocations
    Revocations,
}

#[derive(clap::Args)]
pub struct SignLinkArgs {
    /// Document identifier (e.g. doc-42)
    pub resource_id: String,
    /// Link lifetime in seconds
    #[arg(long, default_value_t = 300)]
    pub ttl: u64,
}

#[derive(clap::Args)]
pub struct RevokeSignatureArgs {
    /// Document identifier the link was issued for
    pub resource_id: String,
    /// The link's hex signature
    pub signature: String,
}

#[derive(clap::Args)]
pub struct RevokeSessionArgs {
    /// The session's jti claim
    pub jti: String,
}

#[derive(clap::Args)]
pub struct MintSessionArgs {
    /// Subject email
    pub subject: String,
    /// Roles to grant (lender, partner, counsel, admin)
    #[arg(long, required = true, value_delimiter = ',')]
    pub roles: Vec<String>,
    /// Session lifetime in seconds
    #[arg(long, default_value_t = 86_400)]
    pub ttl: u64,
}

#[derive(clap::Args)]
pub struct VerifySessionArgs {
    /// The session token to verify
    pub token: String,
}
