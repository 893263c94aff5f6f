use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Transport-level failures on a single engine channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("failed to launch engine '{name}'")]
    Spawn {
        name: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("could not capture stdio of engine '{name}'")]
    Stdio { name: &'static str },

    #[error("write to engine '{name}' failed")]
    Write {
        name: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("channel to engine '{name}' is closed")]
    Closed { name: &'static str },
}

/// Everything the orchestration layer can fail with.
#[derive(Debug, Error)]
pub enum Error {
    /// `go_zero` was called before any network identity was set. No command
    /// reaches the engine in this case.
    #[error("neural net not initialized")]
    UninitializedNet,

    /// A request is already in flight on this engine; one listener per
    /// engine at a time.
    #[error("engine '{engine}' already has a request in flight")]
    Busy { engine: &'static str },

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error("failed to store network weights at {path}")]
    Weights {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read config {path}")]
    Config {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The hook holding this request's completion sender was dropped before
    /// a terminal line arrived.
    #[error("request on engine '{engine}' was abandoned before resolving")]
    Disconnected { engine: &'static str },

    /// `wait_timeout` elapsed. The request itself stays pending on the
    /// engine side.
    #[error("request on engine '{engine}' did not resolve in time")]
    Timeout { engine: &'static str },
}
