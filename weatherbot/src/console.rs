//! Local host: reads slash commands from the terminal and prints replies.

use anyhow::Context;
use async_trait::async_trait;
use inquire::{InquireError, Text};
use tracing::debug;
use weatherbot_core::{Invocation, Reply, ReplySink, WeatherBot};

use crate::render::render_reply;

/// Prints embeds to stdout and ephemeral notices to stderr.
pub struct ConsoleSink;

#[async_trait]
impl ReplySink for ConsoleSink {
    async fn send(&self, reply: Reply) -> anyhow::Result<()> {
        let text = render_reply(&reply);
        if reply.is_ephemeral() {
            eprintln!("{text}");
        } else {
            println!("{text}");
        }
        Ok(())
    }
}

pub async fn run_console(bot: WeatherBot) -> anyhow::Result<()> {
    println!("Type a command such as `/overview Springfield, IL` or `/wind city:New York region:NY`.");
    println!("`/quit` or Esc exits.");

    loop {
        let line = tokio::task::spawn_blocking(|| Text::new(">").prompt())
            .await
            .context("Prompt task failed")?;

        let line = match line {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read command"),
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "/quit" | "/exit") {
            break;
        }

        match Invocation::parse(line) {
            Ok(invocation) => {
                debug!(?invocation, "dispatching");
                bot.dispatch(&invocation, &ConsoleSink).await?;
            }
            Err(err) => eprintln!("{err}"),
        }
    }

    Ok(())
}
