//! Event loop: terminal input and delayed opponent replies.

use serde_json::Value as JsonValue;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use opening_book::{OpeningBook, ScheduledReply};

use crate::command::Command;
use crate::error::TrainerError;
use crate::trainer::Trainer;

/// Deliver `reply` on `tx` once its delay has elapsed.
///
/// Nothing cancels the task; a reply that outlives its session is recognized
/// by its token when it arrives.
pub fn schedule_reply(tx: mpsc::Sender<ScheduledReply>, reply: ScheduledReply) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(reply.delay).await;
        if tx.send(reply).await.is_err() {
            tracing::debug!("Reply channel closed");
        }
    })
}

/// Catalog listing for `--list`.
pub fn catalog_json(book: &OpeningBook) -> JsonValue {
    let rows: Vec<JsonValue> = book
        .entries()
        .map(|e| {
            serde_json::json!({
                "key": e.key,
                "name": e.name,
                "player_color": e.player_color,
                "kind": if e.is_tree() { "tree" } else { "sequence" },
                "positions": e.line.positions(),
            })
        })
        .collect();
    serde_json::json!(rows)
}

/// Run the trainer until `quit` or end of input.
pub async fn run<I, W>(
    trainer: &mut Trainer,
    opening: Option<&str>,
    input: I,
    out: &mut W,
) -> Result<(), TrainerError>
where
    I: AsyncBufRead + Unpin,
    W: Write,
{
    let (tx, mut rx) = mpsc::channel::<ScheduledReply>(16);

    let startup = match opening {
        Some(key) => trainer.execute(Command::Open {
            key: key.to_string(),
            color: None,
        })?,
        None => trainer.execute(Command::Board)?,
    };
    for line in &startup.lines {
        writeln!(out, "{line}")?;
    }
    if let Some(reply) = startup.reply {
        schedule_reply(tx.clone(), reply);
    }

    let mut lines = input.lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let response = match line.parse::<Command>().and_then(|c| trainer.execute(c)) {
                    Ok(response) => response,
                    Err(e) => {
                        writeln!(out, "{e}")?;
                        continue;
                    }
                };
                for text in &response.lines {
                    writeln!(out, "{text}")?;
                }
                if let Some(reply) = response.reply {
                    schedule_reply(tx.clone(), reply);
                }
                if response.quit {
                    break;
                }
            }
            Some(reply) = rx.recv() => {
                let outcome = trainer.apply_reply(&reply);
                if let Some(text) = trainer.describe_reply(&outcome) {
                    writeln!(out, "{text}")?;
                }
            }
        }
        out.flush()?;
    }

    Ok(())
}
