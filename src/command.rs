//! Inbound command parsing
//!
//! Commands arrive from the control UI as free-form names. The finite set is
//! modeled as an enum with an explicit `Unknown` fallthrough so the controller
//! can match exhaustively; unrecognized names are acknowledged, never errors.

/// A named command from the control boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start the pipeline on the default song
    Start,
    /// Stop the active pipeline
    Stop,
    /// Inject the named effect clip into the running broadcast
    Effect(String),
    /// Anything else; acknowledged without action
    Unknown(String),
}

impl Command {
    /// Parse a raw command name (case-insensitive)
    ///
    /// `effects` is the configured set of effect command names; names outside
    /// `start`/`stop`/that set fall through to `Unknown`.
    pub fn parse(raw: &str, effects: &[String]) -> Self {
        let name = raw.trim().to_lowercase();

        match name.as_str() {
            "start" => Command::Start,
            "stop" => Command::Stop,
            _ if effects.iter().any(|fx| fx.eq_ignore_ascii_case(&name)) => {
                Command::Effect(name)
            }
            _ => Command::Unknown(raw.trim().to_string()),
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Start => write!(f, "start"),
            Command::Stop => write!(f, "stop"),
            Command::Effect(name) => write!(f, "effect:{}", name),
            Command::Unknown(raw) => write!(f, "unknown:{}", raw),
        }
    }
}
