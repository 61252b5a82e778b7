//! `rag` - ask questions of a paper collection.
//!
//! ```text
//! rag                         # interactive session
//! rag ask "What is RAG?"      # answer once
//! rag --mode single ask "..." # one retrieval, one completion
//! rag search hybrid "query"   # run one retrieval strategy, print JSON
//! ```

mod cmd;
mod config;
mod narrate;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agentic_rag::MetadataFilter;

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "rag")]
#[command(about = "Iterative retrieval-augmented answering over a document collection")]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Print each step of the retrieval loop
    #[arg(long, short)]
    verbose: bool,

    /// Answering mode
    #[arg(long, value_enum, default_value_t = Mode::Iterative)]
    mode: Mode,

    /// Upper bound on retrieval iterations
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Retrieval service base URL (overrides RETRIEVAL_BASE_URL)
    #[arg(long)]
    retrieval_url: Option<String>,

    /// Collection to search (overrides COLLECTION_NAME)
    #[arg(long)]
    collection: Option<String>,

    #[command(flatten)]
    filter: FilterArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer one question and exit
    Ask { query: String },

    /// Run a single retrieval strategy and print its results as JSON
    Search(cmd::search::SearchArgs),

    /// Ask questions until `exit`
    Interactive,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Rewrite, retrieve, judge and iterate
    Iterative,
    /// One hybrid search and one completion
    Single,
}

/// Metadata criteria applied to every search.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only documents whose keywords contain this text
    #[arg(long)]
    keyword_text: Option<String>,

    /// Only documents whose authors contain this text
    #[arg(long)]
    author: Option<String>,

    /// Only documents whose title contains this text
    #[arg(long)]
    title: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> MetadataFilter {
        MetadataFilter {
            keyword_text: self.keyword_text.clone(),
            author: self.author.clone(),
            title: self.title.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,agentic_rag=debug,chat_client=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::from_env()?;
    if let Some(url) = cli.retrieval_url.clone() {
        settings.retrieval_base_url = url;
    }
    if let Some(collection) = cli.collection.clone() {
        settings.collection_name = collection;
    }

    match &cli.command {
        Some(Commands::Search(args)) => {
            cmd::search::run(&settings, &cli.filter.to_filter(), args).await
        }
        Some(Commands::Ask { query }) => {
            let mut session = cmd::Session::connect(&settings, &cli)?;
            cmd::ask::run(&mut session, &query).await
        }
        Some(Commands::Interactive) | None => {
            let mut session = cmd::Session::connect(&settings, &cli)?;
            cmd::interactive::run(&mut session).await
        }
    }
}
