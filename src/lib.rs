//! # scannix
//!
//! Turn a URL into a QR code image, with cosmetic options and export actions.
//!
//! `scannix` validates a URL, hands it to an encoder together with the render options (size,
//! quiet margin, colors, error correction level) and keeps the resulting image in view state.
//! From there the image can be saved as PNG, JPEG/JPG or SVG, and the source URL can be copied
//! to the clipboard. A single notification slot reports the outcome of each action.
//!
//! QR symbol encoding itself (segmentation, Reed-Solomon, masking) comes from the `qrcode`
//! crate; this crate draws the module matrix and manages the view around it.
//!
//! ## Features
//!
//! - Syntactic URL validation with field-level error messages.
//! - Widths from 200 to 600 pixels in steps of 50, four error correction levels, hex colors
//!   with optional alpha.
//! - PNG and JPEG rasters embedded as base64 data URIs, SVG documents as percent-encoded data
//!   URIs.
//! - A view controller that never runs two encodes at once and drops results that no longer
//!   match the form.
//! - Pluggable encoder, file-save and clipboard capabilities.
//!
//! ## Example
//!
//! Generate a code and save it as SVG:
//!
//! ```no_run
//! use scannix::{Config, ExportFormat, Generator, GenerateOutcome};
//!
//! #[tokio::main]
//! async fn main() {
//!     let view = Generator::new(&Config::default());
//!     view.edit(|form| {
//!         form.set_url("https://example.com");
//!         form.set_format(ExportFormat::Svg);
//!     });
//!
//!     if let GenerateOutcome::Ready = view.generate().await {
//!         view.download().await;
//!     }
//! }
//! ```
//!
//! Render straight to an image buffer:
//!
//! ```rust
//! use scannix::encoder::QrEncoder;
//! use scannix::options::RenderOptions;
//! use scannix::render::to_image_buffer;
//!
//! let options = RenderOptions::default().with_width(400).unwrap();
//! let qr = QrEncoder::new().symbol("https://example.com", &options).unwrap();
//! let img = to_image_buffer(&qr, &options);
//! assert_eq!(img.dimensions(), (400, 400));
//! ```
//!
//! ## Modules
//!
//! - [`validate`]: URL validation.
//! - [`options`]: Render options and export formats.
//! - [`render`]: Drawing an encoded symbol as pixels, SVG or terminal text.
//! - [`encoder`]: The encoder capability and data URIs.
//! - [`export`]: The file-save capability.
//! - [`clipboard`]: The clipboard capability.
//! - [`form`]: Form state and its transitions.
//! - [`notification`]: The notification slot.
//! - [`view`]: The generator view tying it all together.
//! - [`config`]: Runtime configuration.

pub mod clipboard;
pub mod config;
pub mod encoder;
pub mod error;
pub mod export;
pub mod form;
pub mod notification;
pub mod options;
pub mod render;
pub mod validate;
pub mod view;

pub use config::Config;
pub use encoder::{DataUri, Encoder, QrEncoder};
pub use error::{
    ClipboardError, ConfigError, EncodeError, Error, ExportError, OptionsError, Result,
    ValidationError,
};
pub use form::FormState;
pub use notification::{Notification, Severity};
pub use options::{ErrorCorrection, ExportFormat, HexColor, RenderOptions};
pub use view::{CopyOutcome, DownloadOutcome, GenerateOutcome, Generator, ViewSnapshot};
