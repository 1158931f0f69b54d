//! Background conversion
//!
//! Runs one conversion on a dedicated thread so the caller (a CLI progress
//! bar, a UI event loop) never blocks on disk or decoder I/O.
//!
//! ```text
//! Caller                         Decode Thread
//!   │  spawn_decode(request)          │
//!   │────────────────────────────────>│ decode_to_wav_with()
//!   │                                 │
//!   │  progress().recv() -> 0.25      │
//!   │<────────────────────────────────│
//!   │  ...                            │
//!   │  join() -> DecodeOutcome        │
//!   │<────────────────────────────────│
//! ```

use crate::pipeline::{decode_to_wav_with, PipelineOptions};
use crossbeam_channel::{unbounded, Receiver};
use std::io;
use std::thread::{self, JoinHandle};
use tracing::error;
use wavpipe_core::{DecodeOutcome, DecodeRequest, DecoderBackend, ErrorKind};

/// Handle to a conversion running on its own thread
pub struct DecodeJob {
    progress: Receiver<f32>,
    handle: JoinHandle<DecodeOutcome>,
}

/// Start converting `request` on a background thread
///
/// Progress fractions are delivered on [`DecodeJob::progress`] in the order
/// they were reported. The channel disconnects once the conversion ends.
///
/// # Errors
/// Returns an error if the OS refuses to spawn the thread
pub fn spawn_decode<B>(
    request: DecodeRequest,
    backend: B,
    options: PipelineOptions,
) -> io::Result<DecodeJob>
where
    B: DecoderBackend + 'static,
{
    let (progress_tx, progress_rx) = unbounded::<f32>();

    let handle = thread::Builder::new()
        .name("wavpipe-decode".to_string())
        .spawn(move || {
            // A dropped receiver only means nobody is watching
            let mut sink = |fraction: f32| {
                let _ = progress_tx.send(fraction);
            };
            DecodeOutcome::from(decode_to_wav_with(&request, &backend, &mut sink, &options))
        })?;

    Ok(DecodeJob {
        progress: progress_rx,
        handle,
    })
}

impl DecodeJob {
    /// Progress fractions from the decode thread
    pub fn progress(&self) -> &Receiver<f32> {
        &self.progress
    }

    /// Whether the decode thread has returned
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the conversion to end
    ///
    /// A panic on the decode thread is reported as a decode failure.
    pub fn join(self) -> DecodeOutcome {
        match self.handle.join() {
            Ok(outcome) => outcome,
            Err(panic) => {
                let detail = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!("Decode thread panicked: {}", detail);
                DecodeOutcome::failure(
                    ErrorKind::DecodeUnpackFailed,
                    &format!("Decode thread panicked: {}", detail),
                )
            }
        }
    }
}
