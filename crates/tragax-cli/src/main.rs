//! tragax CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tragax", version, about = "Vocabulary trainer with flashcards and quizzes")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter config
    Init,

    /// Create an account
    Register {
        username: String,
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Log in with a username or email
    Login {
        login: String,
        #[arg(long)]
        password: String,
    },

    /// Forget the logged-in user
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Translate one or more texts
    Translate {
        /// Texts to translate, each independently
        #[arg(required = true)]
        texts: Vec<String>,

        /// Source language (default from config)
        #[arg(long)]
        from: Option<String>,

        /// Target language (default from config)
        #[arg(long)]
        to: Option<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage word lists
    #[command(subcommand)]
    List(ListCommand),

    /// Review a list with flashcards
    Learn {
        /// List id or name
        list: String,

        /// Maximum number of cards
        #[arg(long, default_value = "10")]
        count: usize,

        /// Also review items already learned
        #[arg(long)]
        include_learned: bool,

        /// Keep the list order instead of shuffling
        #[arg(long)]
        in_order: bool,
    },

    /// Take a quiz on a list
    Quiz {
        /// List id or name
        list: String,

        /// Question types, comma-separated: tf, mc, w
        #[arg(long, default_value = "mc")]
        types: String,

        /// Number of questions
        #[arg(long, default_value = "10")]
        count: usize,

        /// Skip items already learned
        #[arg(long)]
        exclude_learned: bool,

        /// Keep the list order instead of shuffling
        #[arg(long)]
        in_order: bool,
    },

    /// Show learning statistics
    Stats {
        /// Rebuild counters from stored items and results first
        #[arg(long)]
        recompute: bool,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show quiz results for a list
    Results {
        /// List id or name
        list: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ListCommand {
    /// Create a list
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },

    /// Show your lists
    Ls {
        #[arg(long)]
        json: bool,
    },

    /// Show a list's items
    Show {
        list: String,
        #[arg(long)]
        json: bool,
    },

    /// Rename a list or change its description
    Rename {
        list: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a list with its items and results
    Delete { list: String },

    /// Add an item; without a target the text is translated
    Add {
        list: String,
        source: String,
        target: Option<String>,
    },

    /// Remove an item by id or source text
    Remove { list: String, item: String },

    /// Toggle an item's learned flag
    Learned { list: String, item: String },

    /// Search your lists by name or description
    Search { query: String },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tragax=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Register {
            username,
            email,
            password,
        } => commands::account::register(config, username, email, password).await,
        Commands::Login { login, password } => {
            commands::account::login(config, login, password).await
        }
        Commands::Logout => commands::account::logout(config),
        Commands::Whoami => commands::account::whoami(config).await,
        Commands::Translate {
            texts,
            from,
            to,
            json,
        } => commands::translate::execute(config, texts, from, to, json).await,
        Commands::List(command) => commands::list::execute(config, command).await,
        Commands::Learn {
            list,
            count,
            include_learned,
            in_order,
        } => commands::learn::execute(config, list, count, include_learned, in_order).await,
        Commands::Quiz {
            list,
            types,
            count,
            exclude_learned,
            in_order,
        } => commands::quiz::execute(config, list, types, count, exclude_learned, in_order).await,
        Commands::Stats { recompute, json } => {
            commands::stats::execute(config, recompute, json).await
        }
        Commands::Results { list, json } => commands::stats::results(config, list, json).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
