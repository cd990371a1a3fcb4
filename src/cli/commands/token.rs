use anyhow::Context;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::JwtAuthProvider;
use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct IssuedToken {
    user_id: Uuid,
    token: String,
    expires_in_hours: u64,
}

pub fn handle(user: Option<Uuid>, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    let user_id = user.unwrap_or_else(Uuid::new_v4);
    let issued = IssuedToken {
        user_id,
        token: mint(&config, user_id)?,
        expires_in_hours: config.security.jwt_expiry_hours,
    };

    // Bare token in text mode so shell scripts can capture it
    output_format.emit(&issued, |t| println!("{}", t.token))
}

pub fn mint(config: &AppConfig, user_id: Uuid) -> anyhow::Result<String> {
    JwtAuthProvider::from_config(&config.security)
        .issue(user_id)
        .context("JWT_SECRET must be set to issue tokens")
}
