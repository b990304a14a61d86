use clap::Args;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::cli::{utils::output_success, OutputFormat};
use crate::config;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(long, help = "User id the session belongs to")]
    pub user: Uuid,

    #[arg(long, help = "Display name stored in the token")]
    pub name: Option<String>,

    #[arg(long, help = "Email stored in the token")]
    pub email: Option<String>,
}

pub async fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    if !crate::is_development!() {
        tracing::warn!("minting a session token outside development");
    }

    let token = generate_jwt(Claims::new(args.user, args.name, args.email))?;
    output_success(
        &output_format,
        "Session token issued",
        Some(json!({
            "token": token,
            "user": args.user,
            "expires_in_hours": config::config().security.jwt_expiry_hours,
        })),
    )
}
