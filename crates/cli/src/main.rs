use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use bosun_agent::{AgentConfig, Assistant, Notifier};
use bosun_core::Reply;
use bosun_observability::{init_tracing, AppMetrics};
use bosun_storage::{MemoryRepository, Store, TaskRepository};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bosun")]
#[command(about = "Bosun command-dispatch assistant")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive chat session (the default).
    Chat,
    /// Route a single utterance and print the reply.
    Ask { utterance: Vec<String> },
    /// Task list shortcuts.
    Tasks {
        #[command(subcommand)]
        command: TasksCommand,
    },
    /// Store a fact without going through the chat grammar.
    Remember { key: String, value: String },
    /// Look a fact up.
    Recall { key: String },
}

#[derive(Debug, Subcommand)]
enum TasksCommand {
    Add { text: Vec<String> },
    List,
    Done { id: String },
}

/// Spoken output stand-in: fired timers print to the terminal.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        println!("\n[bosun] {message}");
        let _ = io::stdout().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("bosun_cli");
    let cli = Cli::parse();

    let assistant = build_assistant()?;

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => run_chat(assistant).await?,
        Command::Ask { utterance } => {
            let reply = assistant.handle_command(&utterance.join(" ")).await?;
            print_reply(&reply);
        }
        Command::Tasks { command } => match command {
            TasksCommand::Add { text } => {
                let reply = assistant
                    .handle_command(&format!("add task {}", text.join(" ")))
                    .await?;
                print_reply(&reply);
            }
            TasksCommand::List => {
                let tasks = assistant.store().load_tasks()?;
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            }
            TasksCommand::Done { id } => {
                let reply = assistant
                    .handle_command(&format!("mark task {id} done"))
                    .await?;
                print_reply(&reply);
            }
        },
        Command::Remember { key, value } => {
            let reply = assistant
                .handle_command(&format!("remember {key} is {value}"))
                .await?;
            print_reply(&reply);
        }
        Command::Recall { key } => {
            let memory = assistant.store().load_memory()?;
            match memory.facts.get(&key) {
                Some(value) => println!("{key} is {value}."),
                None => println!("I don't have anything saved for '{key}'."),
            }
        }
    }

    Ok(())
}

async fn run_chat(assistant: Assistant<Store>) -> Result<()> {
    println!("Bosun chat mode. Type 'quit' to shut down, 'sleep' to stand by.");

    let mut standing_by = false;
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.is_empty() {
            continue;
        }

        if standing_by {
            standing_by = false;
            println!("\nI'm listening again.\n");
            continue;
        }

        match assistant.handle_command(message).await? {
            Reply::Text(text) => println!("\n{text}\n"),
            Reply::StandBy => {
                standing_by = true;
                println!("\nStand-by mode. Say anything to wake me.\n");
            }
            Reply::Shutdown => {
                println!("\nGoodbye. Shutting down.\n");
                break;
            }
        }
    }

    Ok(())
}

fn print_reply(reply: &Reply) {
    match reply {
        Reply::Text(text) => println!("{text}"),
        Reply::StandBy => println!("Stand-by."),
        Reply::Shutdown => println!("Goodbye."),
    }
}

fn build_assistant() -> Result<Assistant<Store>> {
    let metrics = AppMetrics::shared();
    let config = AgentConfig::from_env();
    let store = Store::json_dir(&config.storage_dir)?;

    Assistant::new(
        Arc::new(store),
        metrics,
        Arc::new(ConsoleNotifier),
        config,
    )
}
