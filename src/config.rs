//! Engine configuration: where the binary lives and where its runs happen.

use std::path::PathBuf;

use crate::consts::DEFAULT_BINARY;

/// Configuration for [`HtdpEngine`](crate::engine::htdp::HtdpEngine).
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Path to the compiled HTDP executable.
    pub binary: PathBuf,
    /// Parent directory for per-run working areas. `None` = system temp dir.
    pub work_root: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from(DEFAULT_BINARY),
            work_root: None,
        }
    }
}

impl EngineConfig {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            ..Self::default()
        }
    }

    pub fn with_work_root(mut self, work_root: impl Into<PathBuf>) -> Self {
        self.work_root = Some(work_root.into());
        self
    }
}
