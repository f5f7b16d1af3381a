mod config;
mod error;
mod jwt;
mod log;
mod report;

use std::io::{self, BufRead};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::jwt::{decode, decode_header};
use crate::report::report;

#[derive(Parser)]
#[command(name = "jwtcheck")]
#[command(about = "Inspect a JWT's issue and expiry times without verifying it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Token to inspect ("-" reads it from stdin)
    token: Option<String>,

    /// Evaluate expiry against this epoch second instead of the system clock
    #[arg(long, global = true, value_name = "EPOCH")]
    now: Option<i64>,

    /// Show timestamps in UTC instead of local time
    #[arg(long, global = true)]
    utc: bool,

    /// Environment variable to read the token from
    #[arg(long, global = true, value_name = "NAME")]
    env: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the decoded header and payload as JSON
    Claims {
        /// Token to decode ("-" reads it from stdin)
        token: Option<String>,
    },
    /// Save a default token
    SetToken {
        /// The token to store
        token: String,
    },
    /// Forget the saved token
    ClearToken,
    /// Set the default environment variable to read the token from
    SetEnv {
        /// The variable name
        name: String,
    },
}

/// Where the inspected token came from
#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenSource {
    Argument,
    Stdin,
    Env(String),
    Config,
}

/// Pick the token: argument, then environment variable, then saved config
fn resolve_token<E, S>(
    arg: Option<&str>,
    env_var: &str,
    config: &Config,
    lookup_env: E,
    read_stdin: S,
) -> Result<(String, TokenSource)>
where
    E: Fn(&str) -> Option<String>,
    S: FnOnce() -> Result<String>,
{
    match arg {
        Some("-") => {
            let token = read_stdin()?;
            return Ok((token.trim().to_string(), TokenSource::Stdin));
        }
        Some(token) => return Ok((token.to_string(), TokenSource::Argument)),
        None => {}
    }

    if let Some(token) = lookup_env(env_var).filter(|t| !t.trim().is_empty()) {
        return Ok((token, TokenSource::Env(env_var.to_string())));
    }

    if let Some(token) = &config.token {
        return Ok((token.clone(), TokenSource::Config));
    }

    anyhow::bail!(
        "No token given. Pass one as an argument, set ${}, or run `jwtcheck set-token`",
        env_var
    )
}

fn read_stdin_token() -> Result<String> {
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read token from stdin")?;
    Ok(line)
}

fn load_token(arg: Option<&str>, env: Option<&str>) -> Result<String> {
    let config = Config::load()?;
    let env_var = env.unwrap_or(&config.env_var);

    let (token, source) = resolve_token(
        arg,
        env_var,
        &config,
        |name| std::env::var(name).ok(),
        read_stdin_token,
    )?;

    match source {
        TokenSource::Env(name) => log::info(&format!("Using token from ${}", name)),
        TokenSource::Config => log::info("Using saved token"),
        TokenSource::Argument | TokenSource::Stdin => {}
    }
    Ok(token)
}

fn current_time(now: Option<i64>) -> Result<DateTime<Utc>> {
    match now {
        Some(epoch) => DateTime::<Utc>::from_timestamp(epoch, 0)
            .ok_or_else(|| anyhow::anyhow!("--now {} is out of range", epoch)),
        None => Ok(Utc::now()),
    }
}

fn cmd_check(token: &str, now: DateTime<Utc>, utc: bool) -> Result<()> {
    let payload = decode(token).context("Could not decode token payload")?;

    let expired = if utc {
        let report = report(&payload, now, &Utc);
        print!("{}", report);
        report.verdict.is_expired()
    } else {
        let report = report(&payload, now, &Local);
        print!("{}", report);
        report.verdict.is_expired()
    };

    if expired {
        log::warn("Generate a new access token before using this one.");
    }
    Ok(())
}

fn cmd_claims(token: &str) -> Result<()> {
    let header = decode_header(token).context("Could not decode token header")?;
    let payload = decode(token).context("Could not decode token payload")?;

    let dump = serde_json::json!({
        "header": header,
        "payload": payload.claims(),
    });
    println!("{}", serde_json::to_string_pretty(&dump)?);
    Ok(())
}

fn cmd_set_token(token: &str, path: &Path) -> Result<()> {
    let token = token.trim();
    let payload = decode(token).context("Refusing to save a token that does not decode")?;

    let mut config = Config::load_from(path)?;
    config.token = Some(token.to_string());
    config.save_to(path)?;

    log::success(&format!(
        "Token saved for client {}",
        payload.client_id().unwrap_or("N/A")
    ));
    log::info(&format!(
        "Issuer: {}, consumer type: {}",
        payload.issuer().unwrap_or("N/A"),
        payload.token_consumer_type().unwrap_or("N/A")
    ));
    if let Some(partner) = payload.partner_id().filter(|p| !p.is_empty()) {
        log::info(&format!("Partner: {}", partner));
    }
    if let Some(url) = payload.webhook_url().filter(|u| !u.is_empty()) {
        log::info(&format!("Webhook: {}", url));
    }
    Ok(())
}

fn cmd_clear_token(path: &Path) -> Result<()> {
    let mut config = Config::load_from(path)?;
    if config.token.take().is_none() {
        log::warn("No saved token.");
        return Ok(());
    }
    config.save_to(path)?;
    log::success("Saved token removed.");
    Ok(())
}

fn cmd_set_env(name: &str, path: &Path) -> Result<()> {
    if name.is_empty() || name.contains('=') {
        anyhow::bail!("Invalid environment variable name: {:?}", name);
    }

    let mut config = Config::load_from(path)?;
    config.env_var = name.to_string();
    config.save_to(path)?;
    log::success(&format!("Token will be read from ${}", name));
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Claims { token }) => {
            let token = load_token(token.as_deref(), cli.env.as_deref())?;
            cmd_claims(&token)?;
        }
        Some(Commands::SetToken { token }) => {
            cmd_set_token(&token, &Config::config_path()?)?;
        }
        Some(Commands::ClearToken) => {
            cmd_clear_token(&Config::config_path()?)?;
        }
        Some(Commands::SetEnv { name }) => {
            cmd_set_env(&name, &Config::config_path()?)?;
        }
        None => {
            let token = load_token(cli.token.as_deref(), cli.env.as_deref())?;
            let now = current_time(cli.now)?;
            cmd_check(&token, now, cli.utc)?;
        }
    }

    Ok(())
}
