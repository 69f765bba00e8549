//! Error handling for contact-signal
//!
//! Every error carries a stable code and, where it helps, recovery suggestions.

use thiserror::Error;

/// Result type alias for contact-signal operations
pub type Result<T> = std::result::Result<T, ContactError>;

/// Main error type for contact-signal operations
#[derive(Error, Debug)]
pub enum ContactError {
    // File Errors
    #[error("File not found: {path}")]
    FileNotFound {
        path: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Invalid audio file: {reason}")]
    InvalidAudio {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Audio contains no samples")]
    EmptyAudio,

    // Buffer Errors
    #[error("Buffer format mismatch: {reason}")]
    FormatMismatch { reason: String },

    // Configuration Errors
    #[error("Invalid parameter '{param}': got {value}, expected {expected}")]
    InvalidParameter {
        param: String,
        value: String,
        expected: String,
    },

    // Converter Errors
    #[error("No audio converter available for {format}")]
    ConverterUnavailable { format: String },

    #[error("Audio converter failed: {reason}")]
    ConverterFailed { reason: String },

    // Job Errors
    #[error("Too many active generations (limit {limit})")]
    CapacityExceeded { limit: usize },

    #[error("Job not found: {id}")]
    JobNotFound { id: String },

    #[error("Generation worker panicked: {reason}")]
    WorkerPanicked { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ContactError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            ContactError::FileNotFound { .. } => "FILE_NOT_FOUND",
            ContactError::InvalidAudio { .. } => "INVALID_AUDIO",
            ContactError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            ContactError::EmptyAudio => "EMPTY_AUDIO",
            ContactError::FormatMismatch { .. } => "FORMAT_MISMATCH",
            ContactError::InvalidParameter { .. } => "INVALID_PARAMETER",
            ContactError::ConverterUnavailable { .. } => "CONVERTER_UNAVAILABLE",
            ContactError::ConverterFailed { .. } => "CONVERTER_FAILED",
            ContactError::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            ContactError::JobNotFound { .. } => "JOB_NOT_FOUND",
            ContactError::WorkerPanicked { .. } => "WORKER_PANICKED",
            ContactError::Io(_) => "IO_ERROR",
            ContactError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ContactError::FileNotFound { .. }
                | ContactError::InvalidAudio { .. }
                | ContactError::UnsupportedFormat { .. }
                | ContactError::InvalidParameter { .. }
                | ContactError::ConverterUnavailable { .. }
                | ContactError::CapacityExceeded { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            ContactError::FileNotFound { .. } => vec![
                "Check the file path is correct",
                "Upload the track again into the source directory",
            ],
            ContactError::InvalidAudio { .. } => vec![
                "Try converting the file to WAV format first",
                "The file may be corrupted - try re-exporting from source",
            ],
            ContactError::UnsupportedFormat { .. } => vec![
                "Convert to WAV, or install ffmpeg for MP3/FLAC/OGG support",
                "Supported extensions: mp3, mp4, wav, flac, m4a",
            ],
            ContactError::InvalidParameter { .. } => vec![
                "Frequencies must be positive numbers",
                "Tremolo depth must lie between 0.0 and 1.0",
                "Durations must be positive and at most one hour",
            ],
            ContactError::ConverterUnavailable { .. } => vec![
                "Install ffmpeg and make sure it is on PATH",
                "Set CONTACT_SIGNAL_FFMPEG to the converter binary",
                "Export as WAV instead",
            ],
            ContactError::CapacityExceeded { .. } => vec![
                "Wait for a running generation to finish",
                "Raise max_active_jobs in the configuration file",
            ],
            _ => vec![],
        }
    }
}
