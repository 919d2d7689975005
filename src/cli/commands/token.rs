use anyhow::{bail, Context};
use clap::Subcommand;
use serde_json::{json, Map, Value};

use crate::auth::TokenService;
use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Sign a token offline, as POST /jwt would")]
    Issue {
        #[arg(long, help = "JSON object to embed, e.g. '{\"email\":\"a@x.com\"}'")]
        payload: String,
    },

    #[command(about = "Verify a token and print its claims")]
    Inspect {
        #[arg(help = "Bearer token")]
        token: String,
    },
}

pub fn handle(cmd: TokenCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let tokens = TokenService::from_config(&config.security).context("token signing is not configured")?;

    match cmd {
        TokenCommands::Issue { payload } => {
            let payload = parse_payload(&payload)?;
            let token = tokens.issue(payload)?;
            match output_format {
                OutputFormat::Json => println!("{}", json!({ "token": token, "expires_in": tokens.expiry_secs() })),
                OutputFormat::Text => println!("{}", token),
            }
        }
        TokenCommands::Inspect { token } => {
            let claims = tokens.verify(&token)?;
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string(&claims)?),
                OutputFormat::Text => {
                    println!("email:   {}", claims.email.as_deref().unwrap_or("-"));
                    println!("issued:  {}", claims.iat);
                    println!("expires: {}", claims.exp);
                    for (key, value) in &claims.payload {
                        println!("{}: {}", key, value);
                    }
                }
            }
        }
    }
    Ok(())
}

fn parse_payload(raw: &str) -> anyhow::Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw).context("payload is not valid JSON")? {
        Value::Object(map) => Ok(map),
        other => bail!("payload must be a JSON object, got {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_must_be_an_object() {
        assert!(parse_payload(r#"{"email":"a@x.com"}"#).is_ok());
        assert!(parse_payload("[1,2]").is_err());
        assert!(parse_payload("{oops").is_err());
    }
}
