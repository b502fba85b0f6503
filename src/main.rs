use clap::{Parser, Subcommand};
use tracing::{info, Level};

use article_transfer::commands::{self, CopyArgs, MoveArgs};
use article_transfer::config::TransferConfig;
use article_transfer::state::AppState;
use article_transfer::OrphanPolicy;

/// Copy or move documentation articles between projects.
#[derive(Parser)]
#[command(name = "article-transfer", about = "Copy or move articles between projects")]
struct Cli {
    /// Debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Per-request timeout in seconds (overrides TRANSFER_TIMEOUT_SECS).
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List target projects.
    Projects,

    /// List articles of a project (candidate parents).
    Articles {
        /// Project id, short name or name.
        project: String,
    },

    /// Show an article's location, attachments and children.
    Show {
        /// Article id or readable id.
        article: String,
    },

    /// Copy an article and its attachments, optionally with descendants.
    Copy {
        article: String,

        /// Target project id, short name or name.
        #[arg(long)]
        project: String,

        /// Target parent article; top level when omitted.
        #[arg(long)]
        parent: Option<String>,

        /// Copy child articles recursively.
        #[arg(long)]
        descendants: bool,

        /// What to do with children of an article whose copy failed.
        #[arg(long, env = "TRANSFER_ORPHAN_POLICY")]
        orphans: Option<OrphanPolicy>,

        /// Print the full outcome tree as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Move an article to another project and/or parent.
    Move {
        article: String,

        #[arg(long)]
        project: String,

        #[arg(long)]
        parent: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let mut config = TransferConfig::from_env()?;
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout.max(1);
    }
    if let Commands::Copy {
        orphans: Some(policy),
        ..
    } = &cli.command
    {
        config.orphan_policy = *policy;
    }
    info!(base_url = %config.base_url, timeout_secs = config.timeout_secs, "connecting");

    let state = AppState::connect(&config)?;

    let result = match cli.command {
        Commands::Projects => commands::projects(&state).await,
        Commands::Articles { project } => commands::articles(&state, &project).await,
        Commands::Show { article } => commands::show(&state, &article).await,
        Commands::Copy {
            article,
            project,
            parent,
            descendants,
            json,
            ..
        } => {
            commands::copy(
                &state,
                &CopyArgs {
                    article,
                    project,
                    parent,
                    include_descendants: descendants,
                    json,
                },
            )
            .await
        }
        Commands::Move {
            article,
            project,
            parent,
        } => commands::relocate(&state, &MoveArgs { article, project, parent }).await,
    };

    print!("{}", result?);
    Ok(())
}
