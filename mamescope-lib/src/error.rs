use thiserror::Error;

/// Errors surfaced by the composite views and the facade.
///
/// Only the `*NotFound` variants are raised across the composite-view
/// boundary during field access — a missing entity is a caller logic error.
/// Unavailable enrichment sources (category folders, play-time stores,
/// documentation files) degrade to `None`/empty/default instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] mamescope_xml::XmlError),

    #[error("Support file error: {0}")]
    Support(#[from] mamescope_support::SupportError),

    #[error("Timer database error: {0}")]
    TimerDb(#[from] mamescope_db::TimerDbError),

    #[error("No machine named '{0}'")]
    MachineNotFound(String),

    #[error("No software list named '{0}'")]
    SoftwareListNotFound(String),

    #[error("No software named '{basename}' in list '{list}'")]
    SoftwareNotFound { list: String, basename: String },

    #[error("Could not find MAME, nothing else will work")]
    ExecutableNotFound,

    #[error("MAME exited with {status}: {stderr}")]
    Subprocess { status: String, stderr: String },

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Whether this is one of the hard lookup failures.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::MachineNotFound(_) | Self::SoftwareListNotFound(_) | Self::SoftwareNotFound { .. }
        )
    }
}
