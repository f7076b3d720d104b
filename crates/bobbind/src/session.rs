//! The serial session loop over the worker's input and output streams.
//!
//! One iteration reads one line, decodes it, dispatches it, and writes the
//! flushed response before the next line is considered, so responses leave
//! in request order with no interleaving. Blank lines are skipped without a
//! response. Undecodable lines are answered with an uncorrelated failure and
//! the loop continues; decode failures never end the session.
//!
//! The loop has exactly three exits, each an explicit [`SessionEnd`]
//! variant: a response carrying the shutdown flag, exhaustion of the input
//! stream (the peer closed the pipe), and an interrupt observed at an
//! iteration boundary. All three are normal terminations.

use std::fmt;
use std::io::{self, BufRead, Write};

use bobbin_embed::ModelProvider;
use thiserror::Error;
use tracing::{debug, warn};

use crate::dispatch::{DispatchError, Dispatcher, RequestEnvelope, Response, ResponseWriter};
use crate::process::InterruptFlag;

pub(crate) const SESSION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::session");

/// How the session loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionEnd {
    /// A `shutdown` request was answered.
    Shutdown,
    /// The peer closed the input stream.
    EndOfInput,
    /// A termination signal was observed between iterations.
    Interrupted,
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Shutdown => "shutdown requested",
            Self::EndOfInput => "input stream closed",
            Self::Interrupted => "interrupted",
        };
        formatter.write_str(label)
    }
}

/// Faults that end the session abnormally.
///
/// Only stream-level failures land here; per-request faults are answered as
/// failure responses and keep the loop alive.
#[derive(Debug, Error)]
pub(crate) enum SessionError {
    /// Reading from the input stream failed.
    #[error("failed to read from the request stream: {0}")]
    Read(#[source] io::Error),

    /// Writing a response to the output stream failed.
    #[error("failed to answer the peer: {0}")]
    Respond(#[source] DispatchError),
}

/// Runs the session loop until one of its termination conditions is met.
///
/// # Errors
///
/// Returns [`SessionError`] when the input stream fails or a response
/// cannot be written; per-request faults do not surface here.
pub(crate) fn run_session<R, W, P>(
    input: R,
    output: W,
    dispatcher: &mut Dispatcher<P>,
    interrupt: &InterruptFlag,
    max_request_bytes: usize,
) -> Result<SessionEnd, SessionError>
where
    R: BufRead,
    W: Write,
    P: ModelProvider,
{
    let mut lines = LineReader::new(input, max_request_bytes, interrupt.clone());
    let mut responses = ResponseWriter::new(output);

    loop {
        if interrupt.is_raised() {
            return Ok(SessionEnd::Interrupted);
        }

        let response = match lines.next_line()? {
            ReadOutcome::EndOfStream => return Ok(SessionEnd::EndOfInput),
            ReadOutcome::Interrupted => return Ok(SessionEnd::Interrupted),
            ReadOutcome::Oversize => {
                let error = DispatchError::request_too_large(max_request_bytes);
                warn!(target: SESSION_TARGET, error = %error, "dropping oversized request line");
                Response::failure(None, &error)
            }
            ReadOutcome::Line(line) => {
                if is_blank(&line) {
                    debug!(target: SESSION_TARGET, "skipping blank line");
                    continue;
                }
                match RequestEnvelope::parse(&line) {
                    Ok(envelope) => dispatcher.handle(&envelope),
                    Err(error) => {
                        warn!(target: SESSION_TARGET, error = %error, "undecodable request line");
                        Response::failure(None, &error)
                    }
                }
            }
        };

        responses
            .write_response(&response)
            .map_err(SessionError::Respond)?;

        if response.is_shutdown() {
            return Ok(SessionEnd::Shutdown);
        }
    }
}

/// One read from the input stream.
enum ReadOutcome {
    /// A complete line within the size bound (newline included, if present).
    Line(Vec<u8>),
    /// A line that exceeded the size bound; its bytes were drained and
    /// discarded up to the next newline.
    Oversize,
    /// A termination signal arrived while the read was blocked.
    Interrupted,
    /// The peer closed the stream.
    EndOfStream,
}

/// Bounded line source over a buffered reader.
///
/// Reads interrupted by a signal are retried unless the interrupt flag was
/// raised, so a termination signal wakes a worker blocked on an idle stdin.
/// A final line without a trailing newline is still delivered before
/// end-of-stream is reported.
struct LineReader<R> {
    reader: R,
    max_bytes: usize,
    interrupt: InterruptFlag,
}

impl<R: BufRead> LineReader<R> {
    fn new(reader: R, max_bytes: usize, interrupt: InterruptFlag) -> Self {
        Self {
            reader,
            max_bytes,
            interrupt,
        }
    }

    /// Produces the next read outcome.
    fn next_line(&mut self) -> Result<ReadOutcome, SessionError> {
        let mut line = Vec::new();
        let mut oversize = false;

        loop {
            let (consumed, finished, at_eof) = match self.reader.fill_buf() {
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {
                    if self.interrupt.is_raised() {
                        return Ok(ReadOutcome::Interrupted);
                    }
                    continue;
                }
                Err(error) => return Err(SessionError::Read(error)),
                Ok(available) => {
                    if available.is_empty() {
                        (0, true, true)
                    } else if let Some(position) =
                        available.iter().position(|byte| *byte == b'\n')
                    {
                        if !oversize {
                            line.extend_from_slice(&available[..=position]);
                        }
                        (position + 1, true, false)
                    } else {
                        if !oversize {
                            line.extend_from_slice(available);
                        }
                        (available.len(), false, false)
                    }
                }
            };

            self.reader.consume(consumed);

            if at_eof && line.is_empty() && !oversize {
                return Ok(ReadOutcome::EndOfStream);
            }

            if line.len() > self.max_bytes {
                oversize = true;
                line.clear();
            }

            if finished {
                return Ok(if oversize {
                    ReadOutcome::Oversize
                } else {
                    ReadOutcome::Line(line)
                });
            }
        }
    }
}

/// Whether a line holds only whitespace.
fn is_blank(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace)
}
