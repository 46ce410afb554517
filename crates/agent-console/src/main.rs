//! A terminal console for chatting with agents and managing knowledge bases.

#[macro_use]
extern crate tracing;

use std::env;
use std::io::Write as _;
use std::time::Duration;

use agent_console::backend::ConsoleConfigBuilder;
use agent_console::core::{Role, TranscriptEntry};
use agent_console::{
    Command, Console, ConsoleBuilder, HELP, Output, parse_max_rounds, read_line,
};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, BufReader};
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::sleep;

const BAR_CHAR: &str = "▎";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let Ok(api_token) = env::var("AGENT_CONSOLE_API_TOKEN") else {
        eprintln!("AGENT_CONSOLE_API_TOKEN environment variable is not set");
        return;
    };
    let mut config_builder = ConsoleConfigBuilder::with_api_token(api_token);
    if let Ok(base_url) = env::var("AGENT_CONSOLE_BASE_URL") {
        config_builder = config_builder.with_base_url(base_url);
    }
    if let Ok(user_email) = env::var("AGENT_CONSOLE_USER_EMAIL") {
        config_builder = config_builder.with_user_email(user_email);
    }
    let config = config_builder.build();
    debug!("using {config:?}");

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let mut console_builder = ConsoleBuilder::with_config(config)
        .on_transcript(move |entry: &TranscriptEntry| {
            event_tx.send(entry.clone()).ok();
        });
    if let Ok(max_rounds) = env::var("AGENT_CONSOLE_MAX_ROUNDS") {
        let max_rounds = match parse_max_rounds(&max_rounds) {
            Ok(max_rounds) => max_rounds,
            Err(err) => {
                eprintln!("AGENT_CONSOLE_MAX_ROUNDS: {err}");
                return;
            }
        };
        console_builder = console_builder.with_max_rounds(max_rounds);
    }
    let mut console = console_builder.build();

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .expect("spinner template is valid")
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    println!("Type /help for the list of commands.");

    let mut stdin = BufReader::new(io::stdin());

    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = read_line(&mut stdin).await else {
            break;
        };
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{}{}", BAR_CHAR.bright_red(), err);
                continue;
            }
        };
        let message = match &command {
            Command::Message(_) => "🤔 Thinking...",
            _ => "⏳ Working...",
        };

        let mut progress_bar = None;
        let result = {
            let run = console.run(command);
            tokio::pin!(run);
            loop {
                // Create a new progress bar if it has been finished.
                progress_bar
                    .get_or_insert_with(|| {
                        let progress_bar = ProgressBar::new_spinner();
                        progress_bar.set_style(progress_style.clone());
                        progress_bar.set_message(message);
                        progress_bar
                    })
                    .inc(1);

                let sleep = sleep(Duration::from_millis(100));
                select! {
                    result = &mut run => break result,
                    Some(entry) = event_rx.recv() => {
                        // Clear the spinner before printing.
                        if let Some(progress_bar) = progress_bar.take() {
                            progress_bar.finish_and_clear();
                        }
                        print_entry(&entry);
                    }
                    _ = sleep => {}
                }
            }
        };
        if let Some(progress_bar) = progress_bar.take() {
            progress_bar.finish_and_clear();
        }
        while let Ok(entry) = event_rx.try_recv() {
            print_entry(&entry);
        }

        match result {
            Ok(Output::Quit) => break,
            Ok(output) => print_output(&console, output),
            Err(err) => {
                warn!("command failed: {err:?}");
                println!("{}{}", BAR_CHAR.bright_red(), err);
            }
        }
    }
}

fn print_entry(entry: &TranscriptEntry) {
    // The operator's own messages are already on screen.
    if entry.role() == Role::Assistant {
        println!(
            "{}🤖 {}",
            BAR_CHAR.bright_cyan(),
            entry.content().bright_white()
        );
    }
}

fn print_output(console: &Console, output: Output) {
    let bar = BAR_CHAR.bright_green();
    match output {
        Output::Help => println!("{HELP}"),
        Output::Status { agent_id, chat_id } => {
            let unset = || "(none)".to_owned();
            println!("{bar}agent: {}", agent_id.unwrap_or_else(unset));
            println!("{bar}chat:  {}", chat_id.unwrap_or_else(unset));
        }
        Output::Quit => {}
        Output::Agents(agents) => {
            if agents.is_empty() {
                println!("{bar}No agents.");
            }
            for agent in agents {
                print!(
                    "{bar}{}  {}",
                    agent.id.bright_white().bold(),
                    agent.name
                );
                match agent.description {
                    Some(description) => println!(" - {description}"),
                    None => println!(),
                }
            }
        }
        Output::AgentCreated(agent_id) => {
            println!("{bar}Created agent {}.", agent_id.bright_white().bold());
        }
        Output::AgentSelected(agent_id) => {
            println!("{bar}Chatting with agent {}.", agent_id.bright_white());
        }
        Output::ConversationReset => {
            println!("{bar}The next message starts a new chat.");
        }
        Output::Chats(chats) => {
            if chats.is_empty() {
                println!("{bar}No chats yet.");
            }
            for chat in chats {
                print!("{bar}{}", chat.chat_id.bright_white().bold());
                match chat.created_at {
                    Some(created_at) => println!("  {}", created_at.dimmed()),
                    None => println!(),
                }
            }
        }
        Output::ChatOpened(chat_id) => {
            println!("{bar}Opened chat {}.", chat_id.bright_white());
            let Some(session) = console.session() else {
                return;
            };
            for entry in session.transcript().entries() {
                match entry.role() {
                    Role::User => println!(
                        "{}🙂 {}",
                        BAR_CHAR.bright_blue(),
                        entry.content()
                    ),
                    Role::Assistant => print_entry(entry),
                }
            }
        }
        Output::KnowledgeBases(knowledge_bases) => {
            if knowledge_bases.is_empty() {
                println!("{bar}No knowledge bases.");
            }
            for kb in knowledge_bases {
                print!(
                    "{bar}{}  {}",
                    kb.knowledge_base_id.bright_white().bold(),
                    kb.name
                );
                match kb.description {
                    Some(description) => println!(" - {description}"),
                    None => println!(),
                }
            }
        }
        Output::KnowledgeBaseCreated(kb_id) => {
            println!("{bar}Created knowledge base {}.", kb_id.bright_white());
        }
        Output::DocumentUploaded(document_id) => {
            println!("{bar}Uploaded document {}.", document_id.bright_white());
        }
        Output::Hits(hits) => {
            if hits.is_empty() {
                println!("{bar}No matches.");
            }
            for hit in hits {
                println!(
                    "{bar}[{}] {}",
                    hit.knowledge_base_id.dimmed(),
                    hit.content
                );
            }
        }
        Output::Answer(Some(answer)) => {
            let bar = BAR_CHAR.bright_cyan();
            println!("{bar}💡 {}", answer.bright_white());
        }
        Output::Answer(None) => println!("{bar}No answer found."),
        Output::Turn(summary) => {
            for failure in &summary.failures {
                println!("{}⚠️  {}", BAR_CHAR.bright_yellow(), failure);
            }
        }
    }
}
