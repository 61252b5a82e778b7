//! `rag ask`: answer one question.

use anyhow::{bail, Result};

use super::Session;

pub async fn run(session: &mut Session, query: &str) -> Result<()> {
    let query = query.trim();
    if query.is_empty() {
        bail!("query must not be empty");
    }

    let answer = session.answer(query).await;
    println!("{}", answer);
    Ok(())
}
