//! `alterego chat`: interactive or single-message mode.

use alterego_agent::{Runtime, TurnStatus};
use alterego_core::message::Message;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    super::require_api_key(&config)?;

    let runtime = alterego_agent::build_runtime(&config)?;

    if let Some(msg) = message {
        eprint!("  Thinking...");
        let reply = runtime.engine.respond(&[], &msg).await;
        eprint!("\r              \r");
        println!("{reply}");
        return Ok(());
    }

    println!();
    println!("  AlterEgo: Interactive Mode");
    println!("  ==========================");
    println!();
    println!("  Persona:   {}", config.persona.name);
    println!("  Model:     {}", config.model);
    println!("  Notifier:  {}", runtime.notifier.name());
    println!(
        "  GitHub:    {}",
        config.profile.github_username.as_deref().unwrap_or("(none)")
    );
    println!();
    println!("  Type your message and press Enter.");
    println!("  /refresh reloads profile data, /reset clears the conversation.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    interactive(&runtime).await?;

    println!();
    println!("  Goodbye!");
    println!();
    Ok(())
}

async fn interactive(runtime: &Runtime) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut history: Vec<Message> = Vec::new();

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input {
            "" => {}
            "exit" | "quit" => break,
            "/refresh" => {
                let profile = runtime.profile.refresh_now().await;
                println!("  Profile refreshed ({} bytes).\n", profile.len());
            }
            "/reset" => {
                history.clear();
                println!("  Conversation cleared.\n");
            }
            _ => {
                eprint!("  ...");
                let outcome = runtime.engine.run_turn(&history, input).await;
                eprint!("\r     \r");
                debug!(
                    status = ?outcome.status,
                    iterations = outcome.iterations,
                    tool_rounds = outcome.tool_rounds,
                    "Turn finished"
                );

                println!();
                for line in outcome.reply.lines() {
                    println!("  {} > {line}", runtime.profile.persona().name);
                }
                println!();

                // Failed turns are not replayed
                if outcome.status != TurnStatus::ProviderFailed {
                    history.push(Message::user(input));
                    history.push(Message::assistant(&outcome.reply));
                }
            }
        }
        prompt()?;
    }

    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}
