//! Error types for the generator

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for generator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur anywhere in the generator
#[derive(Error, Debug)]
pub enum Error {
    /// The URL field did not pass validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The encoder could not produce an image
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Saving an exported image failed
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Writing to the clipboard failed
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),

    /// A render option was out of range or malformed
    #[error(transparent)]
    Options(#[from] OptionsError),

    /// The configuration file could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Field-level rejection of the URL input.
///
/// The `Display` text is what the view shows next to the input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Nothing but whitespace was entered
    #[error("Please enter a URL")]
    Empty,

    /// The input is not an absolute URL with a scheme and a host
    #[error("Please enter a valid URL (e.g., https://example.com)")]
    Invalid,
}

/// Failures of the encoder capability
#[derive(Error, Debug)]
pub enum EncodeError {
    /// The payload does not fit any QR version at the chosen level
    #[error("payload of {len} bytes does not fit a QR code: {reason}")]
    Symbol { len: usize, reason: String },

    /// Pixel encoding (PNG/JPEG) failed
    #[error("failed to write raster image: {0}")]
    Image(#[from] image::ImageError),

    /// The encoder task was cancelled or panicked
    #[error("encoder task did not complete: {0}")]
    Task(String),
}

/// Failures while saving an exported image
#[derive(Error, Debug)]
pub enum ExportError {
    /// The data URI could not be decoded
    #[error("malformed data URI: {0}")]
    MalformedUri(String),

    /// Writing the file failed
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The encoder failed while preparing the export
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Failures of the clipboard capability
#[derive(Error, Debug)]
pub enum ClipboardError {
    /// No clipboard tool is available on this platform
    #[error("no clipboard tool available (tried {0})")]
    Unavailable(String),

    /// The clipboard tool exited unsuccessfully
    #[error("clipboard tool `{tool}` failed: {reason}")]
    Rejected { tool: String, reason: String },
}

/// Invalid render or export options
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    /// Width outside 200..=600 or not a multiple of 50
    #[error("width {0}px is not one of 200, 250, ..., 600")]
    Width(u32),

    /// Hex color string that could not be parsed
    #[error("invalid hex color: {0}")]
    Color(String),

    /// Unknown error correction level
    #[error("unknown error correction level `{0}` (expected L, M, Q or H)")]
    Level(String),

    /// Unknown export format
    #[error("unknown export format `{0}` (expected PNG, JPEG, JPG or SVG)")]
    Format(String),
}

/// Failures while loading the configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`crate::config::Config`]
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A value parsed but is out of range
    #[error("invalid config value: {0}")]
    Invalid(String),
}
