//! Observation stream listener
//!
//! Reads newline-delimited JSON observations (one per camera frame) from a
//! file or stdin on a dedicated thread and forwards them to the frame loop.
//! Each line uses the IPC request shape:
//!
//! ```json
//! {"type":"ingest","observation":{"landmarks":[...]},"hand_area":0.21}
//! {"type":"reset"}
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::ipc::Request;
use crate::state::Observation;

/// Events sent from the listener to the frame loop
#[derive(Debug, Clone, PartialEq)]
pub enum FrameEvent {
    /// One observation cycle
    Frame {
        observation: Observation,
        hand_area: Option<f64>,
    },
    /// Clear the stream's text and state
    Reset,
    /// The source has no more lines
    EndOfStream,
}

/// Where observation lines come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameSource {
    Stdin,
    File(PathBuf),
}

impl From<&Path> for FrameSource {
    fn from(path: &Path) -> Self {
        if path == Path::new("-") {
            FrameSource::Stdin
        } else {
            FrameSource::File(path.to_path_buf())
        }
    }
}

/// Listener that turns an observation stream into frame events
pub struct FrameListener {
    source: FrameSource,
    event_tx: mpsc::Sender<FrameEvent>,
    running: Arc<AtomicBool>,
}

impl FrameListener {
    /// Create a new frame listener
    pub fn new(source: FrameSource, event_tx: mpsc::Sender<FrameEvent>) -> Self {
        Self {
            source,
            event_tx,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start reading on a dedicated thread
    pub fn start(&self) -> Result<(), FrameError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(FrameError::AlreadyRunning);
        }

        let reader: Box<dyn BufRead + Send> = match &self.source {
            FrameSource::Stdin => Box::new(BufReader::new(std::io::stdin())),
            FrameSource::File(path) => match File::open(path) {
                Ok(file) => Box::new(BufReader::new(file)),
                Err(e) => {
                    self.running.store(false, Ordering::SeqCst);
                    return Err(FrameError::Open(path.clone(), e));
                }
            },
        };

        let event_tx = self.event_tx.clone();
        let running = Arc::clone(&self.running);

        thread::Builder::new()
            .name("frame-listener".to_string())
            .spawn(move || {
                info!("frame listener thread started");

                let lines = read_stream(reader, &event_tx, &running);
                let _ = event_tx.blocking_send(FrameEvent::EndOfStream);

                running.store(false, Ordering::SeqCst);
                info!(lines, "frame listener thread stopped");
            })
            .map_err(|e| FrameError::ThreadSpawn(e.to_string()))?;

        Ok(())
    }

    /// Stop after the current line
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check if the listener is currently running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Errors that can occur in the frame listener
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("frame listener is already running")]
    AlreadyRunning,

    #[error("failed to open frame source {0}: {1}")]
    Open(PathBuf, #[source] std::io::Error),

    #[error("failed to spawn listener thread: {0}")]
    ThreadSpawn(String),
}

/// Forward every parseable line; returns the number of lines read
fn read_stream(
    reader: impl BufRead,
    event_tx: &mpsc::Sender<FrameEvent>,
    running: &AtomicBool,
) -> usize {
    let mut count = 0;

    for line in reader.lines() {
        if !running.load(Ordering::SeqCst) {
            debug!("frame listener stopping");
            break;
        }

        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!(?e, "failed to read frame source");
                break;
            }
        };
        count += 1;

        match parse_line(&line) {
            Ok(Some(event)) => {
                if event_tx.blocking_send(event).is_err() {
                    warn!("failed to send frame event - channel closed?");
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => warn!(line = count, error = %e, "skipping malformed frame line"),
        }
    }

    count
}

/// Parse one line. Blank lines and requests that don't apply to a stream
/// yield None.
pub fn parse_line(line: &str) -> Result<Option<FrameEvent>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let event = match serde_json::from_str::<Request>(line)? {
        Request::Ingest { observation, hand_area } => Some(FrameEvent::Frame {
            observation,
            hand_area,
        }),
        Request::Reset => Some(FrameEvent::Reset),
        other => {
            debug!(?other, "ignoring non-frame request in stream");
            None
        }
    };

    Ok(event)
}
