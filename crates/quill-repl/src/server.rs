//! The request/response loop.

use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};

use quill_eval::{evaluate, Console, Namespace, Reply};

/// One request line: `{"code": "<snippet>"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub code: String,
}

/// Run the service loop until EOF on the reader.
///
/// Each input line is one request; each reply is written as one JSON line
/// and flushed before the next request is read. A malformed request line
/// is answered with an error reply and the loop continues; the evaluation
/// engine is never involved in that case.
pub fn serve<R: BufRead, W: Write>(reader: R, mut writer: W) -> anyhow::Result<()> {
    let mut ns = Namespace::new();
    let console = Console::new();

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let reply = match serde_json::from_str::<Request>(&line) {
            Ok(request) => {
                tracing::debug!(bytes = request.code.len(), "evaluating snippet");
                evaluate(&request.code, &mut ns, &console)
            }
            Err(err) => {
                tracing::warn!(error = %err, "malformed request line");
                Reply {
                    out: String::new(),
                    err: format!("malformed request: {err}"),
                }
            }
        };
        serde_json::to_writer(&mut writer, &reply)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    tracing::info!("stdin closed, shutting down");
    Ok(())
}
