//! Interactive question loop.

use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::Session;

/// Words that end the session.
const EXIT_WORDS: [&str; 3] = ["exit", "quit", "退出"];

/// What the user typed.
#[derive(Debug, PartialEq, Eq)]
pub enum Input<'a> {
    Exit,
    Blank,
    Query(&'a str),
}

pub fn classify(line: &str) -> Input<'_> {
    let line = line.trim();
    if line.is_empty() {
        Input::Blank
    } else if EXIT_WORDS.iter().any(|w| line.eq_ignore_ascii_case(w)) {
        Input::Exit
    } else {
        Input::Query(line)
    }
}

pub async fn run(session: &mut Session) -> Result<()> {
    println!("{}", "Ask a question about the collection. Type 'exit' to quit.".bright_cyan());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", ">".bright_green().bold());
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            break;
        };

        match classify(&line) {
            Input::Exit => break,
            Input::Blank => {
                println!("{}", "Please enter a question.".yellow());
            }
            Input::Query(query) => {
                let answer = session.answer(query).await;
                println!();
                println!("{}", answer);
                println!();
            }
        }
    }

    println!("{}", "Goodbye!".bright_blue());
    Ok(())
}
