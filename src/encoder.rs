//! The encoder capability: payload + options in, embeddable image out.
//!
//! [`Encoder`] is the seam between the view and whatever produces QR images. [`QrEncoder`]
//! is the default implementation; it asks the `qrcode` crate for the module matrix and draws
//! it with [`crate::render`].

use std::fmt;
use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::ImageFormat;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use qrcode::QrCode;
use tracing::debug;

use crate::error::{EncodeError, ExportError};
use crate::options::{RasterFormat, RenderOptions};
use crate::render;

/// Default JPEG quality, matching what browsers use for `canvas.toDataURL("image/jpeg")`.
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

// Characters left alone by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// An image embedded in a `data:` URI.
///
/// Raster images are base64 encoded (`data:image/png;base64,...`), SVG documents are
/// percent-encoded (`data:image/svg+xml;charset=utf-8,...`).
#[derive(Clone, PartialEq, Eq)]
pub struct DataUri(String);

impl DataUri {
    /// Embeds binary image data as base64.
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        DataUri(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
    }

    /// Embeds an SVG document, percent-encoded the way `encodeURIComponent` does it.
    pub fn from_svg(svg: &str) -> Self {
        DataUri(format!(
            "data:image/svg+xml;charset=utf-8,{}",
            utf8_percent_encode(svg, URI_COMPONENT)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn header(&self) -> &str {
        let rest = &self.0["data:".len()..];
        rest.split_once(',').map_or(rest, |(header, _)| header)
    }

    /// The media type, e.g. `image/png`.
    pub fn media_type(&self) -> &str {
        self.header().split(';').next().unwrap_or_default()
    }

    pub fn is_base64(&self) -> bool {
        self.header().split(';').any(|param| param == "base64")
    }

    /// Decodes the embedded payload back into the bytes a file would contain.
    pub fn decode(&self) -> Result<Vec<u8>, ExportError> {
        let (_, data) = self
            .0
            .split_once(',')
            .ok_or_else(|| ExportError::MalformedUri(truncated(&self.0)))?;
        if self.is_base64() {
            STANDARD
                .decode(data)
                .map_err(|err| ExportError::MalformedUri(err.to_string()))
        } else {
            Ok(percent_decode_str(data).collect())
        }
    }
}

impl fmt::Debug for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataUri({}, {} bytes)", self.media_type(), self.0.len())
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn truncated(s: &str) -> String {
    s.chars().take(32).collect()
}

/// Produces QR images for a payload.
///
/// Implementations may fail, e.g. when the payload is too long for the chosen error
/// correction level. Calls are blocking; the view runs them off the async executor.
pub trait Encoder: Send + Sync {
    /// Encodes `payload` as a raster image embedded in a data URI.
    fn encode_raster(
        &self,
        payload: &str,
        options: &RenderOptions,
        format: RasterFormat,
    ) -> Result<DataUri, EncodeError>;

    /// Encodes `payload` as a standalone SVG document.
    fn encode_vector(&self, payload: &str, options: &RenderOptions) -> Result<String, EncodeError>;
}

/// The default encoder, backed by the `qrcode` and `image` crates.
#[derive(Debug, Clone)]
pub struct QrEncoder {
    jpeg_quality: u8,
}

impl Default for QrEncoder {
    fn default() -> Self {
        QrEncoder {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl QrEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the JPEG quality (1-100).
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Builds the module matrix for `payload`.
    pub fn symbol(&self, payload: &str, options: &RenderOptions) -> Result<QrCode, EncodeError> {
        let level = options.error_correction.to_ec_level();
        QrCode::with_error_correction_level(payload.as_bytes(), level).map_err(|err| {
            EncodeError::Symbol {
                len: payload.len(),
                reason: err.to_string(),
            }
        })
    }
}

impl Encoder for QrEncoder {
    fn encode_raster(
        &self,
        payload: &str,
        options: &RenderOptions,
        format: RasterFormat,
    ) -> Result<DataUri, EncodeError> {
        let qr = self.symbol(payload, options)?;
        let mut bytes = Vec::new();
        match format {
            RasterFormat::Png => {
                let img = render::to_image_buffer(&qr, options);
                img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
            }
            RasterFormat::Jpeg => {
                let img = render::to_rgb_image_buffer(&qr, options);
                JpegEncoder::new_with_quality(&mut bytes, self.jpeg_quality).encode_image(&img)?;
            }
        }
        debug!(
            modules = qr.width(),
            bytes = bytes.len(),
            mime = format.mime(),
            "encoded raster QR code"
        );
        Ok(DataUri::from_bytes(format.mime(), &bytes))
    }

    fn encode_vector(&self, payload: &str, options: &RenderOptions) -> Result<String, EncodeError> {
        let qr = self.symbol(payload, options)?;
        debug!(modules = qr.width(), "encoded vector QR code");
        Ok(render::to_svg_string(&qr, options))
    }
}
