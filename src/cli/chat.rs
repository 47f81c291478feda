use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use super::build_agent;
use crate::core::AppConfig;

const HELP: &str = "Commands: /reset clears the conversation, /history shows recent turns, /quit exits.";

pub async fn run(session_id: &str) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let config = AppConfig::default();
    let agent = build_agent(&config).await?;

    println!("Calendar booking assistant ({}). {}", agent.model(), HELP);

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line)?;

                match line {
                    "/quit" | "/exit" => break,
                    "/help" => println!("{}", HELP),
                    "/reset" => {
                        agent.reset(session_id).await;
                        println!("Conversation history cleared");
                    }
                    "/history" => println!("{}", agent.history_summary(session_id).await),
                    message => println!("{}", agent.chat(session_id, message).await),
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
