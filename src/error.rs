//! Error handling for the mining exporter.
//!
//! Backend data anomalies never surface here; they suppress the dependent
//! value instead. The variants below cover I/O around a poll and mistakes in
//! the static descriptor tables.

/// A specialized `Result` type for exporter operations.
pub type Result<T> = std::result::Result<T, ExporterError>;

/// The main error type for exporter operations.
#[derive(Debug, thiserror::Error)]
pub enum ExporterError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Fetching the miner status document failed
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// The miner status document could not be parsed
    #[error("Failed to parse miner response: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Web server error
    #[error("Web server error: {0}")]
    WebServer(String),

    /// A descriptor table entry is malformed
    #[error("Invalid descriptor: {0}")]
    Descriptor(String),

    /// A label map does not match the frozen label list of a family
    #[error("Labels do not match for {family}: expected {expected:?}, found {found:?}")]
    LabelMismatch {
        family: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

impl ExporterError {
    /// Create a new fetch error
    pub fn fetch_error(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Create a new parse error
    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a new configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new web server error
    pub fn web_server_error(msg: impl Into<String>) -> Self {
        Self::WebServer(msg.into())
    }

    /// Create a new descriptor error
    pub fn descriptor_error(msg: impl Into<String>) -> Self {
        Self::Descriptor(msg.into())
    }

    /// Whether this error points at the descriptor tables rather than at the
    /// miner or the environment.
    pub fn is_descriptor_fault(&self) -> bool {
        matches!(self, Self::Descriptor(_) | Self::LabelMismatch { .. })
    }
}
