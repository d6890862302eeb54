//! Broadcast controller
//!
//! Thin boundary between named commands and the streaming engine: start and
//! stop drive the pipeline, effect names are resolved to clips and injected,
//! anything else is acknowledged without action.

use std::sync::Arc;

use crate::command::Command;
use crate::config::BroadcastConfig;
use crate::error::Result;
use crate::fx;
use crate::pipeline::Streamer;

/// What a handled command did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Pipeline started on the default song
    Started,
    /// Pipeline stopped
    Stopped,
    /// Effect clip spliced into the broadcast
    EffectInjected(String),
    /// Command not recognized; nothing happened
    Ignored(String),
}

/// Maps inbound command names onto pipeline operations
pub struct BroadcastController {
    config: Arc<BroadcastConfig>,
    streamer: Arc<Streamer>,
}

impl BroadcastController {
    /// Create a controller driving `streamer`
    pub fn new(config: Arc<BroadcastConfig>, streamer: Arc<Streamer>) -> Self {
        Self { config, streamer }
    }

    /// Handle one raw command name
    pub async fn handle(&self, raw: &str) -> Result<CommandOutcome> {
        let command = Command::parse(raw, &self.config.effects);
        tracing::info!(command = %command, "Command received");

        match command {
            Command::Start => {
                self.streamer.start().await?;
                Ok(CommandOutcome::Started)
            }
            Command::Stop => {
                self.streamer.stop().await;
                Ok(CommandOutcome::Stopped)
            }
            Command::Effect(name) => {
                let clip = fx::resolve_effect(&self.config.fx_dir, &name).await?;
                self.streamer.inject(&clip).await?;
                Ok(CommandOutcome::EffectInjected(name))
            }
            Command::Unknown(raw) => {
                tracing::debug!(command = %raw, "Unknown command acknowledged");
                Ok(CommandOutcome::Ignored(raw))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::registry::ClientRegistry;

    use super::*;

    fn controller_with(config: BroadcastConfig) -> (BroadcastController, Arc<Streamer>) {
        let config = Arc::new(config);
        let registry = Arc::new(ClientRegistry::new(config.listener_buffer));
        let streamer = Arc::new(Streamer::new(Arc::clone(&config), registry));
        (
            BroadcastController::new(config, Arc::clone(&streamer)),
            streamer,
        )
    }

    #[tokio::test]
    async fn test_unknown_command_is_acknowledged_without_action() {
        let (controller, streamer) = controller_with(BroadcastConfig::default());

        let outcome = controller.handle("pause").await.unwrap();
        assert_eq!(outcome, CommandOutcome::Ignored("pause".to_string()));
        assert!(!streamer.is_streaming().await);
    }

    #[tokio::test]
    async fn test_stop_while_idle_is_ok() {
        let (controller, _streamer) = controller_with(BroadcastConfig::default());

        let outcome = controller.handle("stop").await.unwrap();
        assert_eq!(outcome, CommandOutcome::Stopped);
    }

    #[tokio::test]
    async fn test_effect_miss_surfaces_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("applause.mp3"), b"clip").unwrap();

        let (controller, _streamer) =
            controller_with(BroadcastConfig::default().fx_dir(dir.path()));

        // "boo" is a recognized effect command but has no clip on disk
        let result = controller.handle("boo").await;
        assert!(matches!(result, Err(Error::EffectNotFound(name)) if name == "boo"));
    }

    #[tokio::test]
    async fn test_effect_while_idle_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("applause.mp3"), b"clip").unwrap();

        let (controller, _streamer) =
            controller_with(BroadcastConfig::default().fx_dir(dir.path()));

        let result = controller.handle("applause").await;
        assert!(matches!(result, Err(Error::PipelineStopped)));
    }
}
