//! Command line surface: one subcommand per pairing operation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use pa_core::ports::LobbyNavigatorPort;
use pa_core::{LobbyId, UserCode};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::bootstrap::{self, AppDeps, AppPaths};

#[derive(Debug, Parser)]
#[command(name = "pair-arcade", version, about = "Pair two players by code and meet in a shared lobby")]
pub struct Cli {
    /// TOML config file (defaults to config.toml in the data directory).
    #[arg(long, env = "PAIR_ARCADE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print this device's pairing code, minting one if needed.
    Code,
    /// Pair with the partner who owns CODE.
    Pair {
        /// Partner code, any case, hyphens optional.
        code: String,
    },
    /// Wait until someone pairs with this device.
    Listen {
        /// Give up after this many seconds.
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Show the lobby, defaulting to the one joined last.
    Lobby { lobby_id: Option<String> },
    /// Relay game state: stdin lines are sent, received states are printed.
    Room { room_id: String },
    /// Delete expired sessions on the backend.
    Cleanup,
}

/// Prints where a paired listener would take the user.
struct ConsoleNavigator;

#[async_trait]
impl LobbyNavigatorPort for ConsoleNavigator {
    async fn navigate_to_lobby(
        &self,
        lobby_id: &LobbyId,
        partner_code: &UserCode,
    ) -> anyhow::Result<()> {
        println!("Paired with {partner_code}, lobby {lobby_id}");
        Ok(())
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let paths = AppPaths::resolve()?;
    if let Err(e) = bootstrap::tracing::init_tracing_subscriber(&paths.logs_dir) {
        eprintln!("Failed to initialize tracing: {e}");
    }

    let mut config = bootstrap::load_or_default(cli.config, &paths.config_path)?;
    bootstrap::apply_env_overrides(&mut config);

    let state_path = if config.state_path.as_os_str().is_empty() {
        paths.state_path.clone()
    } else {
        config.state_path.clone()
    };
    let deps = bootstrap::wire_dependencies(&config, state_path)?;
    tracing::debug!(mode = ?deps.mode(), "dependencies wired");

    match cli.command {
        Command::Code => {
            let code = deps.ensure_user_code().execute().await?;
            println!("{code}");
        }
        Command::Pair { code } => pair(&deps, &code).await?,
        Command::Listen { timeout } => listen(&deps, timeout.map(Duration::from_secs)).await?,
        Command::Lobby { lobby_id } => lobby(&deps, lobby_id).await?,
        Command::Room { room_id } => room(&deps, &room_id).await?,
        Command::Cleanup => {
            let removed = deps.cleanup_expired_sessions().execute().await;
            println!("Removed {removed} expired session(s)");
        }
    }

    Ok(())
}

async fn pair(deps: &AppDeps, partner_input: &str) -> anyhow::Result<()> {
    let my_code = deps.ensure_user_code().execute().await?;
    let result = deps
        .initiate_partner_pairing()
        .execute(&my_code, partner_input)
        .await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    match result.error_message() {
        Some(message) => bail!(message),
        None => Ok(()),
    }
}

async fn listen(deps: &AppDeps, timeout: Option<Duration>) -> anyhow::Result<()> {
    let my_code = deps.ensure_user_code().execute().await?;
    let handle = deps
        .pairing_listener(Arc::new(ConsoleNavigator))
        .start(&my_code)
        .await?;
    println!("Your code is {my_code}, waiting for a partner...");

    let deadline = async {
        match timeout {
            Some(after) => tokio::time::sleep(after).await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        event = handle.finished() => {
            if event.is_none() {
                bail!("pairing channel closed before a partner arrived");
            }
        }
        _ = tokio::signal::ctrl_c() => println!("Stopped listening"),
        _ = deadline => bail!("no partner within the timeout"),
    }
    Ok(())
}

async fn lobby(deps: &AppDeps, lobby_id: Option<String>) -> anyhow::Result<()> {
    let lobby_id = match lobby_id {
        Some(id) => LobbyId::new(id),
        None => deps
            .current_lobby()
            .execute()
            .await?
            .context("not in a lobby yet, pass a lobby id")?,
    };

    let session = deps.enter_lobby().execute(&lobby_id).await?;
    println!("{}", serde_json::to_string_pretty(&session)?);
    Ok(())
}

async fn room(deps: &AppDeps, room_id: &str) -> anyhow::Result<()> {
    let mut room = deps.join_game_room().execute(room_id).await?;
    println!("Joined {}", room.topic());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let payload = serde_json::from_str(line)
                    .unwrap_or_else(|_| Value::String(line.to_string()));
                room.send_move(payload).await?;
            }
            state = room.next_state() => match state {
                Some(state) => println!("{state}"),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    room.leave();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["pair-arcade", "pair", "abc234xyz"]).unwrap();
        assert!(matches!(cli.command, Command::Pair { ref code } if code == "abc234xyz"));

        let cli = Cli::try_parse_from(["pair-arcade", "--config", "/tmp/c.toml", "listen", "--timeout", "30"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        assert!(matches!(cli.command, Command::Listen { timeout: Some(30) }));

        let cli = Cli::try_parse_from(["pair-arcade", "lobby"]).unwrap();
        assert!(matches!(cli.command, Command::Lobby { lobby_id: None }));
    }

    #[test]
    fn pair_requires_a_code() {
        assert!(Cli::try_parse_from(["pair-arcade", "pair"]).is_err());
    }
}
