#[cfg(test)]
#[path = "frames_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use futures::Stream;
use futures::StreamExt;
use tokio::sync::mpsc;

use crate::domain::models::BuilderError;
use crate::domain::models::CompletePayload;
use crate::domain::models::Event;
use crate::domain::models::Progress;
use crate::domain::models::StreamFrame;

/// Reassembles server sent event frames from arbitrarily split byte chunks.
#[derive(Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    pub fn push(&mut self, chunk: &[u8]) {
        // CRLF and LF delimited streams are treated the same.
        self.buffer
            .extend(chunk.iter().filter(|byte| return **byte != b'\r'));
    }

    /// Returns the next complete frame, if a boundary has been received.
    pub fn next_frame(&mut self) -> Option<String> {
        let boundary = self
            .buffer
            .windows(2)
            .position(|window| return window == b"\n\n")?;

        let frame = self.buffer.drain(..boundary + 2).collect::<Vec<u8>>();
        return Some(String::from_utf8_lossy(&frame[..boundary]).to_string());
    }

    /// Flushes whatever is left once the stream has ended.
    pub fn finish(&mut self) -> Option<String> {
        let rest = String::from_utf8_lossy(&self.buffer).to_string();
        self.buffer.clear();

        if rest.trim().is_empty() {
            return None;
        }

        return Some(rest);
    }
}

/// Parses one raw frame. Comment-only and keep-alive frames yield `None`.
pub fn parse_frame(raw: &str) -> Result<Option<StreamFrame>, BuilderError> {
    let mut data_lines: Vec<&str> = vec![];
    let mut other_lines: Vec<&str> = vec![];

    for line in raw.split('\n') {
        if let Some(data) = line.strip_prefix("data:") {
            data_lines.push(data.strip_prefix(' ').unwrap_or(data));
            continue;
        }
        if line.starts_with(':')
            || line.starts_with("event:")
            || line.starts_with("id:")
            || line.starts_with("retry:")
        {
            continue;
        }
        other_lines.push(line);
    }

    let payload = if data_lines.is_empty() {
        other_lines.join("\n")
    } else {
        data_lines.join("\n")
    };

    let payload = payload.trim();
    if payload.is_empty() || payload == "[DONE]" {
        return Ok(None);
    }

    return serde_json::from_str::<StreamFrame>(payload)
        .map(Some)
        .map_err(|err| return BuilderError::StreamParse(err.to_string()));
}

#[derive(Default)]
struct StreamState {
    complete: Option<CompletePayload>,
    frames: usize,
    skipped: usize,
}

impl StreamState {
    fn handle(&mut self, raw: &str, tx: &mpsc::UnboundedSender<Event>) -> Result<()> {
        self.frames += 1;
        match parse_frame(raw) {
            Ok(Some(StreamFrame::Progress { progress, message })) => {
                if self.complete.is_some() {
                    return Ok(());
                }
                tx.send(Event::GenerationProgress(Progress::new(progress, &message)))?;
            }
            Ok(Some(StreamFrame::Complete(payload))) => {
                if self.complete.is_some() {
                    tracing::warn!("Ignoring additional complete frame");
                    return Ok(());
                }
                self.complete = Some(payload);
            }
            Ok(None) => {}
            Err(err) => {
                self.skipped += 1;
                tracing::warn!(error = %err, frame = raw, "Skipping malformed frame");
            }
        }

        return Ok(());
    }
}

/// Drains a generation byte stream, forwarding progress as each chunk is
/// decoded and returning the payload of the first complete frame.
pub async fn consume_stream<S, B, E>(
    mut stream: S,
    tx: &mpsc::UnboundedSender<Event>,
) -> Result<CompletePayload>
where
    S: Stream<Item = std::result::Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let mut decoder = FrameDecoder::default();
    let mut state = StreamState::default();

    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(err) => bail!(BuilderError::Transport(err.to_string())),
        };

        decoder.push(chunk.as_ref());
        while let Some(raw) = decoder.next_frame() {
            state.handle(&raw, tx)?;
        }
    }

    if let Some(raw) = decoder.finish() {
        state.handle(&raw, tx)?;
    }

    tracing::debug!(
        frames = state.frames,
        skipped = state.skipped,
        "Generation stream ended"
    );

    if let Some(payload) = state.complete {
        return Ok(payload);
    }

    bail!(BuilderError::TerminalGeneration(format!(
        "received {} frames, none of them complete",
        state.frames
    )));
}
