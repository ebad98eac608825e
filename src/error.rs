use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PageprocError {
    #[error("invalid process / thread ID '{0}'")]
    InvalidPid(String),
    #[error("cannot open {}: {source}", path.display())]
    PagemapUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot open {}: {source}", path.display())]
    MapsUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("error scanning {}: {source}", path.display())]
    ProcScan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("output error: {0}")]
    Output(#[source] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[source] std::io::Error),
}

impl PageprocError {
    /// True when a per-target stream could not be opened.
    ///
    /// A multi-target scan skips such targets instead of aborting.
    pub fn is_target_unavailable(&self) -> bool {
        matches!(
            self,
            Self::PagemapUnavailable { .. } | Self::MapsUnavailable { .. }
        )
    }
}
