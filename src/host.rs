//! Host application surface consumed by database managers.

use std::path::Path;

/// What a database manager needs from the bot hosting it.
pub trait Host {
    /// Base directory that relative database paths are resolved against.
    fn config_directory(&self) -> &Path;

    /// Span that manager log events are recorded under.
    fn log_span(&self) -> tracing::Span {
        tracing::Span::current()
    }
}

impl Host for Path {
    fn config_directory(&self) -> &Path {
        self
    }
}

impl Host for std::path::PathBuf {
    fn config_directory(&self) -> &Path {
        self.as_path()
    }
}
