//! Pipeline lifecycle and effect injection
//!
//! [`Streamer`] owns the single active pipeline. Start, stop and inject are
//! serialized by a mutex; the pipeline itself is one pump task that
//! exclusively owns the source reader and throttle, so source swaps can never
//! race a read. Control requests reach the pump over a channel and are
//! acknowledged with oneshot replies, which gives injection its explicit
//! detach-confirmed-then-rewire sequencing.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use tokio::io::AsyncReadExt;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;

use crate::config::BroadcastConfig;
use crate::error::{Error, Result};
use crate::probe;
use crate::registry::ClientRegistry;

use super::sink::BroadcastSink;
use super::source::{Mixer, SourceStage};
use super::throttle::Throttle;

/// Control requests serviced by the pump between chunks
enum PumpRequest {
    /// Splice a clip into the running broadcast
    Inject {
        clip: PathBuf,
        ack: oneshot::Sender<Result<()>>,
    },
    /// End the pipeline
    Stop { ack: oneshot::Sender<()> },
}

/// Handle to a running pipeline
struct ActivePipeline {
    control: mpsc::Sender<PumpRequest>,
    task: JoinHandle<()>,
}

/// Owner of the process-wide broadcast pipeline
///
/// At most one pipeline feeds the sink at any time: `start` replaces a
/// running pipeline after stopping it, `stop` is idempotent.
pub struct Streamer {
    config: Arc<BroadcastConfig>,
    registry: Arc<ClientRegistry>,
    active: Mutex<Option<ActivePipeline>>,
}

impl Streamer {
    /// Create a streamer broadcasting to `registry`
    pub fn new(config: Arc<BroadcastConfig>, registry: Arc<ClientRegistry>) -> Self {
        Self {
            config,
            registry,
            active: Mutex::new(None),
        }
    }

    /// Start streaming the configured default song
    pub async fn start(&self) -> Result<()> {
        let song = self.config.song_path.clone();
        self.start_source(&song).await
    }

    /// Start streaming `path`, replacing any running pipeline
    pub async fn start_source(&self, path: &Path) -> Result<()> {
        let mut active = self.active.lock().await;

        if let Some(prev) = active.take() {
            Self::shutdown(prev).await;
            tracing::info!("Previous pipeline replaced");
        }

        let bitrate = match probe::probe(&self.config, path).await {
            Ok(bitrate) => bitrate,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    fallback = self.config.fallback_bitrate,
                    "Bitrate probe failed, using fallback"
                );
                self.config.fallback_bitrate
            }
        };
        let byte_rate = (bitrate / self.config.bitrate_divisor.max(1)).max(1);

        let source = SourceStage::open(path).await?;

        let (control_tx, control_rx) = mpsc::channel(8);
        let pump = Pump {
            config: Arc::clone(&self.config),
            source: Some(source),
            throttle: Throttle::new(byte_rate),
            sink: BroadcastSink::new(Arc::clone(&self.registry)),
            control: control_rx,
        };
        let task = tokio::spawn(pump.run());

        tracing::info!(
            source = %path.display(),
            bitrate,
            byte_rate,
            "Pipeline started"
        );

        *active = Some(ActivePipeline {
            control: control_tx,
            task,
        });

        Ok(())
    }

    /// Stop the active pipeline
    ///
    /// Idempotent: stopping an idle streamer is a no-op.
    pub async fn stop(&self) {
        let mut active = self.active.lock().await;

        if let Some(prev) = active.take() {
            Self::shutdown(prev).await;
            tracing::info!("Pipeline stopped");
        }
    }

    /// Splice `clip` into the running broadcast
    ///
    /// Fails with `PipelineStopped` when nothing is streaming and with
    /// `MixerUnavailable` when the mixer process cannot be spawned; in the
    /// latter case playback continues un-mixed from the original source.
    pub async fn inject(&self, clip: &Path) -> Result<()> {
        let active = self.active.lock().await;

        let pipeline = active.as_ref().ok_or(Error::PipelineStopped)?;
        let (ack_tx, ack_rx) = oneshot::channel();

        pipeline
            .control
            .send(PumpRequest::Inject {
                clip: clip.to_path_buf(),
                ack: ack_tx,
            })
            .await
            .map_err(|_| Error::PipelineStopped)?;

        ack_rx.await.map_err(|_| Error::PipelineStopped)?
    }

    /// Whether a pipeline is currently feeding the sink
    pub async fn is_streaming(&self) -> bool {
        self.active
            .lock()
            .await
            .as_ref()
            .map(|p| !p.task.is_finished())
            .unwrap_or(false)
    }

    async fn shutdown(pipeline: ActivePipeline) {
        let (ack_tx, ack_rx) = oneshot::channel();

        // The pump may already have ended at source EOF; both sends failing
        // then is fine, awaiting the task is what matters.
        if pipeline
            .control
            .send(PumpRequest::Stop { ack: ack_tx })
            .await
            .is_ok()
        {
            let _ = ack_rx.await;
        }
        let _ = pipeline.task.await;
    }
}

/// Outcome of one pump turn
enum Step {
    Control(Option<PumpRequest>),
    Read(std::io::Result<usize>),
}

/// The pipeline task: reads, paces, fans out
struct Pump {
    config: Arc<BroadcastConfig>,
    /// `None` only transiently while a source swap is in flight
    source: Option<SourceStage>,
    throttle: Throttle,
    sink: BroadcastSink,
    control: mpsc::Receiver<PumpRequest>,
}

impl Pump {
    async fn run(mut self) {
        let mut buf = vec![0u8; self.throttle.chunk_size()];

        loop {
            let step = {
                let source = match self.source.as_mut() {
                    Some(source) => source,
                    None => return,
                };

                tokio::select! {
                    biased;
                    req = self.control.recv() => Step::Control(req),
                    res = source.read(&mut buf) => Step::Read(res),
                }
            };

            match step {
                Step::Control(Some(PumpRequest::Stop { ack })) => {
                    let _ = ack.send(());
                    return;
                }
                Step::Control(None) => return,
                Step::Control(Some(PumpRequest::Inject { clip, ack })) => {
                    let result = self.swap_in_mixer(&clip);
                    if let Err(ref e) = result {
                        tracing::error!(
                            clip = %clip.display(),
                            error = %e,
                            "Injection abandoned, continuing un-mixed"
                        );
                    }
                    let _ = ack.send(result);
                }
                Step::Read(Ok(0)) => {
                    tracing::info!("Source exhausted, pipeline ending");
                    return;
                }
                Step::Read(Ok(n)) => {
                    self.throttle.pace(n).await;
                    self.sink.send(Bytes::copy_from_slice(&buf[..n])).await;
                }
                Step::Read(Err(e)) => {
                    tracing::error!(error = %e, "Source read failed, pipeline ending");
                    return;
                }
            }
        }
    }

    /// Hot-swap the current source for a mixer merging `clip` into it
    ///
    /// Sequencing: spawn the mixer first (a failure leaves the source
    /// untouched), install a fresh throttle at the same rate, then detach the
    /// current source and wire it into the mixer's stdin. The pump owns the
    /// source, so no bytes are in flight during the swap.
    fn swap_in_mixer(&mut self, clip: &Path) -> Result<()> {
        let mixer = Mixer::spawn(&self.config, clip)?;
        let fresh = Throttle::new(self.throttle.rate());

        let upstream = self.source.take().ok_or(Error::PipelineStopped)?;
        self.source = Some(mixer.attach(upstream));
        self.throttle = fresh;

        tracing::info!(clip = %clip.display(), "Effect spliced into broadcast");
        Ok(())
    }
}
