//! Subcommands and the shared answering session.

pub mod ask;
pub mod interactive;
pub mod search;

use anyhow::{Context, Result};
use colored::Colorize;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio_util::sync::CancellationToken;

use agentic_rag::{ChatGenerator, FlowEvent, HttpSearchBackend, Orchestrator, RagConfig};
use chat_client::ChatClient;

use crate::config::Settings;
use crate::{narrate, Cli, Mode};

/// Everything needed to answer questions, built once per process.
pub struct Session {
    orchestrator: Orchestrator<HttpSearchBackend, ChatGenerator>,
    events: Option<UnboundedReceiver<FlowEvent>>,
    mode: Mode,
}

impl Session {
    pub fn connect(settings: &Settings, cli: &Cli) -> Result<Self> {
        let client = ChatClient::from_env()
            .context("LLM endpoint is not configured (set LLM_API_KEY)")?;

        let mut config = RagConfig::default();
        if let Some(max) = cli.max_iterations {
            config = config.with_max_iterations(max);
        }

        let mut orchestrator = Orchestrator::new(search_backend(settings), ChatGenerator::new(client))
            .with_config(config)
            .with_filter(&cli.filter.to_filter());

        let events = if cli.verbose {
            let (tx, rx) = unbounded_channel();
            orchestrator = orchestrator.with_events(tx);
            Some(rx)
        } else {
            None
        };

        tracing::debug!(
            retrieval_url = %settings.retrieval_base_url,
            collection = %settings.collection_name,
            filter = ?orchestrator.filter_expression(),
            mode = ?cli.mode,
            "session ready"
        );

        Ok(Self {
            orchestrator,
            events,
            mode: cli.mode,
        })
    }

    /// Answer one question. Ctrl-C stops the loop before its next iteration.
    pub async fn answer(&mut self, query: &str) -> String {
        if self.mode == Mode::Single {
            return self.orchestrator.run_single_pass(query).await;
        }

        let cancel = CancellationToken::new();
        let watcher = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    eprintln!("{}", "cancelling after the current step...".yellow());
                    cancel.cancel();
                }
            })
        };

        let run = self.orchestrator.run_with_cancel(query, &cancel);
        tokio::pin!(run);

        let report = match self.events.as_mut() {
            Some(events) => {
                let report = loop {
                    tokio::select! {
                        report = &mut run => break report,
                        Some(event) = events.recv() => println!("{}", narrate::render(&event)),
                    }
                };
                while let Ok(event) = events.try_recv() {
                    println!("{}", narrate::render(&event));
                }
                report
            }
            None => run.await,
        };

        watcher.abort();
        report.response
    }
}

/// The retrieval backend described by `settings`.
pub fn search_backend(settings: &Settings) -> HttpSearchBackend {
    HttpSearchBackend::new(settings.retrieval_base_url.as_str())
        .with_collection(settings.collection_name.as_str())
        .with_timeout(settings.retrieval_timeout)
}
