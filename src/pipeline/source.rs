//! Pipeline source stages
//!
//! The pipeline reads from a [`SourceStage`]: either the plain song file or
//! the stdout of an external mixer process that merges an effect clip into
//! the song. Injection chains stages: the current stage (plain or already
//! mixed) becomes the mixer's stdin.

use std::path::Path;
use std::pin::Pin;
use std::process::Stdio;
use std::task::{Context, Poll};

use tokio::fs::File;
use tokio::io::{self, AsyncRead, BufReader, ReadBuf};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::task::JoinHandle;

use crate::config::BroadcastConfig;
use crate::error::{Error, Result};

/// The pipeline's upstream reader
pub enum SourceStage {
    /// Plain file reader over the song
    Plain(BufReader<File>),
    /// Output of a mixer process merging a clip into the upstream source
    Mixed(MixedSource),
}

impl SourceStage {
    /// Open a plain file source
    pub async fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).await?;
        Ok(SourceStage::Plain(BufReader::new(file)))
    }
}

impl AsyncRead for SourceStage {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            SourceStage::Plain(reader) => Pin::new(reader).poll_read(cx, buf),
            SourceStage::Mixed(mixed) => Pin::new(&mut mixed.reader).poll_read(cx, buf),
        }
    }
}

/// A spawned but not yet wired mixer process
///
/// Spawning is separated from attaching so a spawn failure leaves the
/// current source untouched and the pipeline can continue un-mixed.
pub struct Mixer {
    child: Child,
    stdin: ChildStdin,
    stdout: ChildStdout,
}

impl Mixer {
    /// Spawn the configured mixer process for one clip
    pub fn spawn(config: &BroadcastConfig, clip: &Path) -> Result<Self> {
        let (program, args) = config.mixer_invocation(clip);

        let mut child = Command::new(&program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::MixerUnavailable(format!("{}: {}", program, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::MixerUnavailable("mixer stdin not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::MixerUnavailable("mixer stdout not captured".to_string()))?;

        tracing::debug!(program = %program, clip = %clip.display(), "Mixer spawned");

        Ok(Self {
            child,
            stdin,
            stdout,
        })
    }

    /// Wire the detached upstream source into the mixer
    ///
    /// A feeder task copies the upstream into the mixer's stdin; the mixer's
    /// stdout becomes the pipeline's new source. Once the clip is exhausted
    /// the mixer passes the remainder of the upstream through, so playback
    /// continues seamlessly.
    pub fn attach(self, upstream: SourceStage) -> SourceStage {
        let Mixer {
            child,
            stdin,
            stdout,
        } = self;

        let feeder = tokio::spawn(async move {
            let mut upstream = upstream;
            let mut stdin = stdin;

            if let Err(e) = io::copy(&mut upstream, &mut stdin).await {
                tracing::debug!(error = %e, "Mixer input pipe closed early");
            }
            // Dropping stdin signals EOF so the mixer flushes its tail
        });

        SourceStage::Mixed(MixedSource {
            _child: child,
            reader: BufReader::new(stdout),
            feeder,
        })
    }
}

/// Source backed by a running mixer process
pub struct MixedSource {
    /// Held for its `kill_on_drop` guarantee
    _child: Child,
    reader: BufReader<ChildStdout>,
    feeder: JoinHandle<()>,
}

impl Drop for MixedSource {
    fn drop(&mut self) {
        // Stop feeding before the child is killed; no fd leak across cycles
        self.feeder.abort();
    }
}
