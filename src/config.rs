//! Broadcast configuration

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Default mixer argument template, token-substituted per injection.
///
/// Expands to `sox -t mp3 -v 0.99 -m - -t mp3 -v 0.1 <clip> -t mp3 -`:
/// the running song arrives on stdin, the clip is merged in at a lower
/// volume, and the merged stream leaves on stdout.
const DEFAULT_MIXER_ARGS: &[&str] = &[
    "-t",
    "{media_type}",
    "-v",
    "{song_volume}",
    "-m",
    "-",
    "-t",
    "{media_type}",
    "-v",
    "{fx_volume}",
    "{clip}",
    "-t",
    "{media_type}",
    "-",
];

/// Broadcast server configuration options
#[derive(Debug, Clone)]
pub struct BroadcastConfig {
    /// Address the HTTP boundary binds to
    pub bind_addr: SocketAddr,

    /// Default song played by the `start` command
    pub song_path: PathBuf,

    /// Directory of short effect clips
    pub fx_dir: PathBuf,

    /// Directory of static UI assets
    pub public_dir: PathBuf,

    /// Bitrate (bits/s) assumed when probing fails
    pub fallback_bitrate: u64,

    /// Divisor applied to the probed bitrate to obtain bytes/s (bits -> bytes)
    pub bitrate_divisor: u64,

    /// Relative song volume handed to the mixer
    pub song_volume: String,

    /// Relative effect-clip volume handed to the mixer
    pub fx_volume: String,

    /// Media type label for the external audio tools
    pub media_type: String,

    /// Command names resolved as effect clips
    pub effects: Vec<String>,

    /// Chunks buffered per listener before writes are dropped
    pub listener_buffer: usize,

    /// Program invoked for bitrate probing
    pub probe_program: String,

    /// Program invoked for effect mixing
    pub mixer_program: String,

    /// Mixer argument template; `{clip}`, `{media_type}`, `{song_volume}`
    /// and `{fx_volume}` are substituted at injection time
    pub mixer_args: Vec<String>,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".parse().unwrap(),
            song_path: PathBuf::from("audio/songs/conversation.mp3"),
            fx_dir: PathBuf::from("audio/fx"),
            public_dir: PathBuf::from("public"),
            fallback_bitrate: 128_000,
            bitrate_divisor: 8,
            song_volume: "0.99".to_string(),
            fx_volume: "0.1".to_string(),
            media_type: "mp3".to_string(),
            effects: [
                "applause",
                "audience_applause",
                "boo",
                "fart",
                "laughing",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            listener_buffer: 128,
            probe_program: "sox".to_string(),
            mixer_program: "sox".to_string(),
            mixer_args: DEFAULT_MIXER_ARGS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl BroadcastConfig {
    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the default song path
    pub fn song_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.song_path = path.into();
        self
    }

    /// Set the effects directory
    pub fn fx_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fx_dir = dir.into();
        self
    }

    /// Set the static assets directory
    pub fn public_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.public_dir = dir.into();
        self
    }

    /// Set the fallback bitrate in bits/s
    pub fn fallback_bitrate(mut self, bitrate: u64) -> Self {
        self.fallback_bitrate = bitrate.max(1);
        self
    }

    /// Set the per-listener chunk buffer depth
    pub fn listener_buffer(mut self, chunks: usize) -> Self {
        self.listener_buffer = chunks.max(1);
        self
    }

    /// Set the bitrate probe program
    pub fn probe_program(mut self, program: impl Into<String>) -> Self {
        self.probe_program = program.into();
        self
    }

    /// Replace the mixer invocation (program plus argument template)
    pub fn mixer_command(
        mut self,
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.mixer_program = program.into();
        self.mixer_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Build the concrete mixer invocation for one clip
    pub fn mixer_invocation(&self, clip: &Path) -> (String, Vec<String>) {
        let clip = clip.to_string_lossy();
        let args = self
            .mixer_args
            .iter()
            .map(|arg| {
                arg.replace("{media_type}", &self.media_type)
                    .replace("{song_volume}", &self.song_volume)
                    .replace("{fx_volume}", &self.fx_volume)
                    .replace("{clip}", &clip)
            })
            .collect();

        (self.mixer_program.clone(), args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BroadcastConfig::default();

        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.fallback_bitrate, 128_000);
        assert_eq!(config.bitrate_divisor, 8);
        assert_eq!(config.song_volume, "0.99");
        assert_eq!(config.fx_volume, "0.1");
        assert_eq!(config.media_type, "mp3");
        assert_eq!(config.probe_program, "sox");
        assert!(config.effects.contains(&"applause".to_string()));
    }

    #[test]
    fn test_builder_chaining() {
        let addr: SocketAddr = "127.0.0.1:8080".parse().unwrap();
        let config = BroadcastConfig::default()
            .bind(addr)
            .song_path("/tmp/song.mp3")
            .fx_dir("/tmp/fx")
            .fallback_bitrate(64_000)
            .listener_buffer(4);

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.song_path, PathBuf::from("/tmp/song.mp3"));
        assert_eq!(config.fx_dir, PathBuf::from("/tmp/fx"));
        assert_eq!(config.fallback_bitrate, 64_000);
        assert_eq!(config.listener_buffer, 4);
    }

    #[test]
    fn test_fallback_bitrate_floor() {
        let config = BroadcastConfig::default().fallback_bitrate(0);

        assert_eq!(config.fallback_bitrate, 1);
    }

    #[test]
    fn test_mixer_invocation_substitution() {
        let config = BroadcastConfig::default();
        let (program, args) = config.mixer_invocation(Path::new("/fx/applause.mp3"));

        assert_eq!(program, "sox");
        assert_eq!(
            args,
            vec![
                "-t", "mp3", "-v", "0.99", "-m", "-", "-t", "mp3", "-v", "0.1",
                "/fx/applause.mp3", "-t", "mp3", "-",
            ]
        );
    }

    #[test]
    fn test_mixer_command_override() {
        let config =
            BroadcastConfig::default().mixer_command("sh", ["-c", "cat {clip} -"]);
        let (program, args) = config.mixer_invocation(Path::new("/fx/boo.mp3"));

        assert_eq!(program, "sh");
        assert_eq!(args, vec!["-c", "cat /fx/boo.mp3 -"]);
    }
}
