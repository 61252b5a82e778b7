//! Human-readable narration of a run, printed under `--verbose`.

use colored::Colorize;

use agentic_rag::{FlowEvent, Termination};

/// Evidence longer than this is abbreviated.
const EVIDENCE_PREVIEW_CHARS: usize = 200;

/// Render one event as a terminal line.
pub fn render(event: &FlowEvent) -> String {
    match event {
        FlowEvent::IterationStarted {
            iteration,
            max_iterations,
        } => format!("--- iteration {}/{} ---", iteration, max_iterations)
            .bright_cyan()
            .bold()
            .to_string(),
        FlowEvent::QueryRewritten {
            original,
            rewritten,
        } => {
            if original == rewritten {
                format!("query: {}", original)
            } else {
                format!("query: {} {} {}", original, "->".dimmed(), rewritten.bright_white())
            }
        }
        FlowEvent::Retrieved {
            count,
            failed_strategies,
        } => {
            let line = format!("retrieved {} unique result(s)", count);
            if *failed_strategies > 0 {
                format!(
                    "{} {}",
                    line,
                    format!("({} strategy failure(s))", failed_strategies).yellow()
                )
            } else {
                line
            }
        }
        FlowEvent::NothingRetrieved { iteration } => format!(
            "no documents retrieved in iteration {}; the collection may be empty or unreachable",
            iteration
        )
        .yellow()
        .to_string(),
        FlowEvent::EvidenceReady { evidence } => {
            let preview: String = evidence.chars().take(EVIDENCE_PREVIEW_CHARS).collect();
            let ellipsis = if evidence.chars().count() > EVIDENCE_PREVIEW_CHARS {
                "..."
            } else {
                ""
            };
            format!("evidence: {}{}", preview, ellipsis).dimmed().to_string()
        }
        FlowEvent::Judged { sufficient: true } => "judge: sufficient".green().to_string(),
        FlowEvent::Judged { sufficient: false } => "judge: insufficient".yellow().to_string(),
        FlowEvent::Finished {
            termination,
            iterations,
        } => {
            let how = match termination {
                Termination::Sufficient => "answered".green(),
                Termination::BestEffort => "answered from partial evidence".yellow(),
                Termination::IndexUnavailable => "document index unavailable".red(),
                Termination::Cancelled => "cancelled".red(),
                Termination::Fallback => "no answer produced".red(),
            };
            format!("=== finished after {} iteration(s): {} ===", iterations, how)
        }
    }
}
