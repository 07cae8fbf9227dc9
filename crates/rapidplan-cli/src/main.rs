mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "rapidplan",
    about = "Rapid task planning grounded in what the codebase actually contains",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .claude/ or .git/)
    #[arg(long, global = true, env = "RAPIDPLAN_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a rapid-mode task issue from the project template
    Rapid {
        /// One-line task description
        description: String,

        /// Create the task even when triage flags it as complex
        #[arg(long)]
        force: bool,

        /// Print the synthesized issue instead of publishing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Check whether a task is simple enough for rapid mode
    Triage { description: String },

    /// Show the detected stack, patterns, components and API endpoints
    Analyze,

    /// Check a feature description against the codebase's capabilities
    Validate { description: String },

    /// Report which of the given packages are already dependencies
    Deps {
        #[arg(required = true)]
        packages: Vec<String>,
    },

    /// Fill project details into CLAUDE.md and the task template
    Init,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Rapid {
            description,
            force,
            dry_run,
        } => cmd::rapid::run(&root, &description, force, dry_run, cli.json),
        Commands::Triage { description } => cmd::triage::run(&description, cli.json),
        Commands::Analyze => cmd::analyze::run(&root, cli.json),
        Commands::Validate { description } => cmd::validate::run(&root, &description, cli.json),
        Commands::Deps { packages } => cmd::deps::run(&root, &packages, cli.json),
        Commands::Init => cmd::init::run(&root, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
