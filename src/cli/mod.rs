//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod auth;
pub mod context;
pub mod knowledge;
pub mod model_list;
pub mod personas;
pub mod prompt;
pub mod say;
pub mod settings;
pub mod threads;
pub mod workspaces;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use crate::cli::auth::{run_auth, run_deauth};
use crate::cli::context::{load_store, CliContext};
use crate::cli::knowledge::run_knowledge;
use crate::cli::model_list::list_models;
use crate::cli::personas::run_personas;
use crate::cli::say::run_say;
use crate::cli::settings::{SettingError, SettingRegistry};
use crate::cli::threads::run_thread;
use crate::cli::workspaces::run_workspace;
use crate::core::chat::ChatSession;
use crate::core::completion::CompletionBackend;
use crate::ui::chat_loop::run_chat;
use crate::ui::theme::Theme;
use crate::utils::logging::{self, LogTarget};

#[derive(Parser)]
#[command(name = "mycelial")]
#[command(version, about = "A terminal chat client with workspaces, personas and a knowledge base")]
#[command(
    long_about = "Mycelial is a full-screen terminal chat client for OpenRouter and other \
OpenAI-compatible APIs. Conversations live in threads grouped into workspaces; each workspace \
can pick a model, a persona and knowledge items to include in the system prompt.\n\n\
Authentication:\n\
  Run 'mycelial auth' to store your API key in the system keyring,\n\
  or set OPENROUTER_API_KEY.\n\n\
Controls:\n\
  Enter             Send the message\n\
  Shift/Alt+Enter   Insert a newline\n\
  Ctrl+P            Pick a persona\n\
  Ctrl+N            Start a new thread\n\
  Ctrl+Up/Down      Scroll the transcript (PageUp/PageDown for pages)\n\
  Ctrl+C            Quit"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Workspace to open, by name or id
    #[arg(short = 'w', long, global = true, value_name = "WORKSPACE")]
    pub workspace: Option<String>,

    /// Thread to open, by name or id (created when missing)
    #[arg(short = 't', long, global = true, value_name = "THREAD")]
    pub thread: Option<String>,

    /// Model to use for this session
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Send one prompt and print the reply
    Say {
        /// Prompt text; read from stdin when omitted
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
        /// Print the reply without markdown formatting
        #[arg(long)]
        plain: bool,
    },
    /// List models available for chat
    Models,
    /// Manage personas
    Personas {
        #[command(subcommand)]
        command: Option<PersonaCommands>,
    },
    /// Manage workspaces
    Workspace {
        #[command(subcommand)]
        command: Option<WorkspaceCommands>,
    },
    /// Manage threads of a workspace (-w, default current)
    Thread {
        #[command(subcommand)]
        command: Option<ThreadCommands>,
    },
    /// Manage the knowledge base
    Knowledge {
        #[command(subcommand)]
        command: Option<KnowledgeCommands>,
    },
    /// Set configuration values, or show them all when no key is given
    Set {
        key: Option<String>,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset configuration values
    Unset { key: String },
    /// Store an API key in the system keyring
    Auth,
    /// Remove the stored API key
    Deauth,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum PersonaCommands {
    /// List all personas
    List,
    /// Add a persona
    Add {
        name: String,
        /// Text placed in front of the system prompt
        #[arg(short, long, num_args = 1.., required = true)]
        prompt: Vec<String>,
        /// Swatch colour as #RRGGBB
        #[arg(short, long)]
        color: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Remove a user persona
    Remove { id: String },
    /// Show a persona in the chat picker
    Show { id: String },
    /// Hide a persona from the chat picker
    Hide { id: String },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum WorkspaceCommands {
    /// List workspaces
    List,
    /// Create a workspace
    New {
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// Rename a workspace
    Rename {
        workspace: String,
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// Delete a workspace and its threads
    Delete { workspace: String },
    /// Set the workspace's system prompt, or turn it off
    Prompt {
        workspace: String,
        #[arg(trailing_var_arg = true)]
        prompt: Vec<String>,
        #[arg(long)]
        off: bool,
    },
    /// Select a persona for the workspace; omit to clear
    Persona {
        workspace: String,
        persona: Option<String>,
    },
    /// Select a model for the workspace; omit to clear
    Model {
        workspace: String,
        model: Option<String>,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum ThreadCommands {
    /// List threads
    List,
    /// Rename a thread
    Rename {
        #[arg(value_name = "THREAD")]
        target: String,
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// Delete a thread and its messages
    Delete {
        #[arg(value_name = "THREAD")]
        target: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn is_on(self) -> bool {
        self == Toggle::On
    }
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum KnowledgeCommands {
    /// List knowledge items
    List,
    /// Add a knowledge item from text or a file
    Add {
        title: String,
        #[arg(trailing_var_arg = true)]
        content: Vec<String>,
        #[arg(short, long, conflicts_with = "content")]
        file: Option<PathBuf>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },
    /// Delete a knowledge item everywhere
    Remove { item: String },
    /// Link an item to a workspace (-w, default current) and include it in prompts
    Link { item: String },
    /// Unlink an item from a workspace (-w, default current)
    Unlink { item: String },
    /// Include or exclude one item, or all knowledge, from prompts
    Context {
        #[arg(value_enum)]
        state: Toggle,
        item: Option<String>,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let command = args.command.unwrap_or(Commands::Chat);
    let target = match command {
        Commands::Chat => LogTarget::File,
        _ => LogTarget::Stderr,
    };
    logging::init(target);

    let mut ctx = match CliContext::load() {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("❌ {err}");
            std::process::exit(1);
        }
    };

    let result = match command {
        Commands::Chat => launch_chat(&ctx, args.workspace, args.thread, args.model).await,
        Commands::Say { prompt, plain } => {
            run_say(&ctx, prompt, args.workspace, args.model, plain).await
        }
        Commands::Models => list_models(&ctx).await,
        Commands::Personas { command } => run_personas(&mut ctx, command),
        Commands::Workspace { command } => run_workspace(&ctx, command),
        Commands::Thread { command } => run_thread(command, args.workspace.as_deref()),
        Commands::Knowledge { command } => run_knowledge(command, args.workspace.as_deref()),
        Commands::Set { key, value } => run_set(&mut ctx, key, value),
        Commands::Unset { key } => run_unset(&mut ctx, &key),
        Commands::Auth => run_auth(&ctx.keys),
        Commands::Deauth => run_deauth(&ctx.keys),
    };

    if let Err(err) = result {
        match err.downcast_ref::<SettingError>() {
            Some(setting_err) => setting_err.print(),
            None => eprintln!("❌ {err}"),
        }
        std::process::exit(1);
    }
    Ok(())
}

fn run_set(
    ctx: &mut CliContext,
    key: Option<String>,
    value: Vec<String>,
) -> Result<(), Box<dyn Error>> {
    let registry = SettingRegistry::new();
    let Some(key) = key else {
        println!("Current configuration:");
        for line in registry.describe(&ctx.settings) {
            println!("{line}");
        }
        return Ok(());
    };
    let message = registry.get(&key)?.set(&value, &mut ctx.settings)?;
    ctx.settings.save().map_err(SettingError::from)?;
    println!("{message}");
    Ok(())
}

fn run_unset(ctx: &mut CliContext, key: &str) -> Result<(), Box<dyn Error>> {
    let registry = SettingRegistry::new();
    let message = registry.get(key)?.unset(&mut ctx.settings);
    ctx.settings.save().map_err(SettingError::from)?;
    println!("{message}");
    Ok(())
}

async fn launch_chat(
    ctx: &CliContext,
    workspace: Option<String>,
    thread: Option<String>,
    model: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let (mut store, path) = load_store()?;
    let current = store.open_thread(workspace.as_deref(), thread.as_deref())?;
    store.save_to_path(&path)?;
    info!(
        workspace = %current.workspace_id,
        thread = %current.thread_id,
        "Opening chat"
    );

    let api_key = ctx.api_key();
    if api_key.is_none() {
        eprintln!("⚠️  No API key configured; run `mycelial auth` to chat.");
    }
    let session = ChatSession::new(ctx.settings.clone(), store, current, api_key)
        .with_store_path(path)
        .with_model_override(model);
    let backend: Arc<dyn CompletionBackend> = Arc::new(ctx.completion_client());
    run_chat(session, backend, Theme::from_name(ctx.settings.theme_name())).await
}
