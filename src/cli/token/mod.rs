//! Token command - signs an owner JWT with the configured secret
//!
//! Owner tokens normally come from the external sign-in flow; this covers
//! local development and scripted key management.

use clap::Args;

use crate::domain::api_key::OwnerId;
use crate::infrastructure::auth::{JwtConfig, JwtGenerator, JwtService};

#[derive(Args, Debug)]
pub struct TokenArgs {
    /// Owner id placed in the `sub` claim
    #[arg(long)]
    pub owner: String,

    /// Lifetime in hours; defaults to `auth.jwt_expiration_hours`
    #[arg(long)]
    pub hours: Option<u64>,
}

/// Print a token for `args.owner` to stdout
pub async fn run(args: TokenArgs) -> anyhow::Result<()> {
    let config = super::load_config()?;

    let service = JwtService::new(JwtConfig::new(
        &config.auth.jwt_secret,
        args.hours.unwrap_or(config.auth.jwt_expiration_hours),
    ));

    println!("{}", mint(&service, &args.owner)?);

    Ok(())
}

fn mint(service: &dyn JwtGenerator, owner: &str) -> anyhow::Result<String> {
    let owner = OwnerId::new(owner)?;
    Ok(service.generate(&owner)?)
}
