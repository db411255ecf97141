//! Parlor client CLI.
//!
//! A terminal front end over the parlor client library: sign in, list
//! conversations, open one, send messages. Each invocation restores the
//! session blob, talks to the server, and prints the resulting state.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parlor_client::api::ApiClient;
use parlor_client::clock::SystemClock;
use parlor_client::config::AppConfig;
use parlor_client::flow::{AttachmentInfo, Messenger, SendOutcome};
use parlor_client::notify::Disconnected;
use parlor_client::session;
use parlor_client::state::{Direction, LocalUser, Message, SessionState};

/// Parlor Client CLI
#[derive(Parser)]
#[command(name = "parlor")]
#[command(about = "Parlor chat client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with a phone number
    Login {
        phone: String,
    },

    /// Sign out and clear the saved session
    Logout,

    /// List conversations
    Chats,

    /// Open a conversation and print its messages
    Open {
        conversation_id: String,
    },

    /// Send a message; text-only sends wait for the simulated reply
    Send {
        conversation_id: String,

        /// Message text
        text: Vec<String>,

        /// Attach a file
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "parlor_client=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let data_dir = session::data_dir()?;
    let config = AppConfig::load(&data_dir)?;
    let api = ApiClient::new(&config.http_url())?;

    match cli.command {
        Commands::Login { phone } => {
            let mut state = SessionState::new();
            let user = state.login(&phone).clone();
            session::save_user(&user)?;
            config.save(&data_dir)?;

            load_conversations(&api, &mut state).await;
            println!("Signed in as {} ({})", user.name, user.phone_number);
            println!("{} conversation(s)", state.conversations().len());
        }

        Commands::Logout => {
            session::clear_user()?;
            println!("Signed out");
        }

        Commands::Chats => {
            let mut state = restore_session()?;
            load_conversations(&api, &mut state).await;
            print_conversations(&state);
        }

        Commands::Open { conversation_id } => {
            let mut state = restore_session()?;
            load_conversations(&api, &mut state).await;
            state.select_conversation(&conversation_id);
            load_messages(&api, &mut state, &conversation_id).await;
            print_messages(state.messages());
        }

        Commands::Send { conversation_id, text, file } => {
            let mut state = restore_session()?;
            load_conversations(&api, &mut state).await;
            state.select_conversation(&conversation_id);
            load_messages(&api, &mut state, &conversation_id).await;

            let mut messenger = Messenger::new(
                api,
                Box::new(Disconnected),
                SystemClock,
                StdRng::from_entropy(),
            );

            let attachment = file.as_deref().map(AttachmentInfo::from_path);
            let (outcome, reply) = messenger
                .send(&mut state, &text.join(" "), attachment)
                .await?;

            if let SendOutcome::Persisted(message) = &outcome {
                println!("Sent {}", message.id);
            }

            if let Some(task) = reply {
                tokio::time::sleep(task.delay).await;
                messenger.deliver_reply(&mut state, &task).await;
            }

            print_messages(state.messages());
        }
    }

    Ok(())
}

fn restore_session() -> anyhow::Result<SessionState> {
    let user: LocalUser = session::load_user()
        .ok_or_else(|| anyhow::anyhow!("Not signed in; run `parlor login <phone>` first"))?;
    Ok(SessionState::restore(user))
}

async fn load_conversations(api: &ApiClient, state: &mut SessionState) {
    match api.list_conversations().await {
        Ok(conversations) => state.set_conversations(conversations),
        Err(e) => {
            tracing::error!("Failed to load conversations: {}", e);
            state.set_conversations(Vec::new());
        }
    }
}

async fn load_messages(api: &ApiClient, state: &mut SessionState, conversation_id: &str) {
    let messages = match api.list_messages(conversation_id).await {
        Ok(messages) => messages,
        Err(e) => {
            tracing::error!("Failed to load messages: {}", e);
            Vec::new()
        }
    };
    state.install_messages(conversation_id, messages);
}

fn print_conversations(state: &SessionState) {
    if state.conversations().is_empty() {
        println!("No conversations");
        return;
    }

    for conv in state.conversations() {
        let unread = if conv.unread_count > 0 {
            format!(" ({} unread)", conv.unread_count)
        } else {
            String::new()
        };
        let last = conv.last_message.as_deref().unwrap_or("");
        println!("{}  {}{}  {}", conv.conversation_id, conv.name, unread, last);
    }
}

fn print_messages(messages: &[Message]) {
    for message in messages {
        let time = message.timestamp.with_timezone(&chrono::Local).format("%H:%M");
        let who = match message.direction {
            Direction::User => "you",
            Direction::Contact => "them",
        };
        println!("[{}] {}: {}", time, who, message.text);
    }
}
