mod cmd_add;
mod cmd_list;
mod cmd_mark;
mod cmd_settings;
mod cmd_tree;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd_settings::SettingsCmd;

#[derive(Parser)]
#[command(name = "intray", version, about = "Notification inbox for tmux")]
struct Cli {
    /// Notification store (JSONL)
    #[arg(long, env = "INTRAY_STORE", global = true)]
    store: Option<PathBuf>,
    /// Settings file (JSON)
    #[arg(long, env = "INTRAY_SETTINGS", global = true)]
    settings: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record a new notification
    Add {
        /// Notification text
        message: String,
        /// tmux session id (e.g. $1)
        #[arg(long, default_value = "")]
        session: String,
        /// tmux window id (e.g. @1)
        #[arg(long, default_value = "")]
        window: String,
        /// tmux pane id (e.g. %1)
        #[arg(long, default_value = "")]
        pane: String,
        /// info, warning or error
        #[arg(long, default_value = "info")]
        level: String,
    },
    /// Show active notifications grouped as a tree
    Tree {
        /// Grouping override: none, session, window, pane, message, pane_message
        #[arg(long)]
        group_by: Option<String>,
        /// Re-fold groups to this depth (0-3)
        #[arg(long)]
        expand_level: Option<i64>,
        /// Expand every group
        #[arg(long, conflicts_with = "expand_level")]
        all: bool,
        /// Search query
        #[arg(long, short)]
        query: Option<String>,
        /// Dump the tree as JSON
        #[arg(long)]
        json: bool,
    },
    /// List notifications as a flat table
    List {
        /// Search query
        #[arg(long, short)]
        query: Option<String>,
        /// Level filter: info, warning, error
        #[arg(long)]
        level: Option<String>,
        /// Read filter: read, unread
        #[arg(long)]
        read: Option<String>,
        /// State filter: active, dismissed (default: active)
        #[arg(long)]
        state: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark notifications as read
    MarkRead {
        #[arg(required = true)]
        ids: Vec<u64>,
    },
    /// Mark notifications as unread
    MarkUnread {
        #[arg(required = true)]
        ids: Vec<u64>,
    },
    /// Dismiss notifications by id, or every match of a session/window/pane scope
    Dismiss {
        ids: Vec<u64>,
        #[arg(long)]
        session: Option<String>,
        #[arg(long)]
        window: Option<String>,
        #[arg(long)]
        pane: Option<String>,
    },
    /// Inspect or change persisted preferences
    Settings {
        #[command(subcommand)]
        cmd: SettingsCmd,
    },
}

/// Resolved file locations.
pub struct Paths {
    pub store: PathBuf,
    pub settings: PathBuf,
}

impl Paths {
    fn resolve(store: Option<PathBuf>, settings: Option<PathBuf>) -> Self {
        Self {
            store: store.unwrap_or_else(intray_store::default_store_path),
            settings: settings.unwrap_or_else(intray_store::default_settings_path),
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("INTRAY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let paths = Paths::resolve(cli.store, cli.settings);
    tracing::debug!(
        store = %paths.store.display(),
        settings = %paths.settings.display(),
        "resolved paths"
    );

    match cli.cmd {
        Command::Add {
            message,
            session,
            window,
            pane,
            level,
        } => cmd_add::execute(&paths, message, session, window, pane, &level),
        Command::Tree {
            group_by,
            expand_level,
            all,
            query,
            json,
        } => cmd_tree::execute(
            &paths,
            &cmd_tree::TreeOptions {
                group_by,
                expand_level,
                expand_all: all,
                query,
                json,
            },
        ),
        Command::List {
            query,
            level,
            read,
            state,
            json,
        } => cmd_list::execute(
            &paths,
            &cmd_list::ListOptions {
                query,
                level,
                read,
                state,
                json,
            },
        ),
        Command::MarkRead { ids } => cmd_mark::mark_read(&paths, &ids),
        Command::MarkUnread { ids } => cmd_mark::mark_unread(&paths, &ids),
        Command::Dismiss {
            ids,
            session,
            window,
            pane,
        } => {
            let scope = cmd_mark::Scope {
                session: session.unwrap_or_default(),
                window: window.unwrap_or_default(),
                pane: pane.unwrap_or_default(),
            };
            cmd_mark::dismiss(&paths, &ids, &scope)
        }
        Command::Settings { cmd } => cmd_settings::run(cmd, &paths),
    }
}
