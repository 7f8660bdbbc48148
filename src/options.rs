//! Render and export options.
//!
//! [`RenderOptions`] carries everything the encoder needs besides the payload: the output width
//! in pixels, the quiet margin in modules, the error correction level and the two colors.
//! [`ExportFormat`] picks the file type of a download.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::OptionsError;

/// Smallest selectable output width in pixels.
pub const MIN_WIDTH: u32 = 200;
/// Largest selectable output width in pixels.
pub const MAX_WIDTH: u32 = 600;
/// Width slider granularity in pixels.
pub const WIDTH_STEP: u32 = 50;
/// Default output width in pixels.
pub const DEFAULT_WIDTH: u32 = 300;
/// Quiet margin around the symbol, in modules.
pub const QUIET_MARGIN: u32 = 2;

/// The error correction level of a QR code symbol.
///
/// Higher levels survive more damage but hold less data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorCorrection {
    /// Tolerates ~7% erroneous codewords.
    Low,
    /// Tolerates ~15% erroneous codewords.
    #[default]
    Medium,
    /// Tolerates ~25% erroneous codewords.
    Quartile,
    /// Tolerates ~30% erroneous codewords.
    High,
}

impl ErrorCorrection {
    /// Single-letter code, as used by the QR standard.
    pub fn letter(self) -> &'static str {
        match self {
            ErrorCorrection::Low => "L",
            ErrorCorrection::Medium => "M",
            ErrorCorrection::Quartile => "Q",
            ErrorCorrection::High => "H",
        }
    }

    /// Human readable label for option pickers.
    pub fn label(self) -> &'static str {
        match self {
            ErrorCorrection::Low => "Low (7%)",
            ErrorCorrection::Medium => "Medium (15%)",
            ErrorCorrection::Quartile => "Quartile (25%)",
            ErrorCorrection::High => "High (30%)",
        }
    }

    pub(crate) fn to_ec_level(self) -> qrcode::EcLevel {
        match self {
            ErrorCorrection::Low => qrcode::EcLevel::L,
            ErrorCorrection::Medium => qrcode::EcLevel::M,
            ErrorCorrection::Quartile => qrcode::EcLevel::Q,
            ErrorCorrection::High => qrcode::EcLevel::H,
        }
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

impl FromStr for ErrorCorrection {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l" | "low" => Ok(ErrorCorrection::Low),
            "m" | "medium" => Ok(ErrorCorrection::Medium),
            "q" | "quartile" => Ok(ErrorCorrection::Quartile),
            "h" | "high" => Ok(ErrorCorrection::High),
            _ => Err(OptionsError::Level(s.to_string())),
        }
    }
}

/// An sRGB color with alpha, written as a CSS-style hex string.
///
/// Accepts `#RGB`, `#RGBA`, `#RRGGBB` and `#RRGGBBAA`; the leading `#` is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor {
    rgba: [u8; 4],
}

impl HexColor {
    pub const BLACK: HexColor = HexColor { rgba: [0, 0, 0, 255] };
    pub const WHITE: HexColor = HexColor { rgba: [255, 255, 255, 255] };

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        HexColor { rgba: [r, g, b, a] }
    }

    pub fn rgba(self) -> [u8; 4] {
        self.rgba
    }

    pub fn rgb(self) -> [u8; 3] {
        [self.rgba[0], self.rgba[1], self.rgba[2]]
    }

    pub fn alpha(self) -> u8 {
        self.rgba[3]
    }

    /// `#rrggbb` without the alpha channel.
    pub fn to_rgb_hex(self) -> String {
        let [r, g, b, _] = self.rgba;
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.rgba;
        if a == 255 {
            write!(f, "#{r:02X}{g:02X}{b:02X}")
        } else {
            write!(f, "#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

impl FromStr for HexColor {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || OptionsError::Color(s.to_string());
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let expanded: String = match digits.len() {
            3 | 4 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 | 8 => digits.to_string(),
            _ => return Err(invalid()),
        };

        let mut rgba = [255u8; 4];
        for (i, slot) in rgba.iter_mut().enumerate().take(expanded.len() / 2) {
            *slot = u8::from_str_radix(&expanded[i * 2..i * 2 + 2], 16).map_err(|_| invalid())?;
        }
        Ok(HexColor { rgba })
    }
}

/// Everything the encoder needs besides the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    width: u32,
    margin: u32,
    pub error_correction: ErrorCorrection,
    pub dark: HexColor,
    pub light: HexColor,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            width: DEFAULT_WIDTH,
            margin: QUIET_MARGIN,
            error_correction: ErrorCorrection::Medium,
            dark: HexColor::BLACK,
            light: HexColor::WHITE,
        }
    }
}

impl RenderOptions {
    /// Output width (and height) in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Quiet margin in modules. Fixed at [`QUIET_MARGIN`].
    pub fn margin(&self) -> u32 {
        self.margin
    }

    /// Sets the output width. Only the slider positions 200, 250, ..., 600 are accepted.
    pub fn set_width(&mut self, width: u32) -> Result<(), OptionsError> {
        self.width = checked_width(width)?;
        Ok(())
    }

    /// Builder-style variant of [`RenderOptions::set_width`].
    pub fn with_width(mut self, width: u32) -> Result<Self, OptionsError> {
        self.set_width(width)?;
        Ok(self)
    }
}

/// Validates a width against the slider range.
pub fn checked_width(width: u32) -> Result<u32, OptionsError> {
    if (MIN_WIDTH..=MAX_WIDTH).contains(&width) && width % WIDTH_STEP == 0 {
        Ok(width)
    } else {
        Err(OptionsError::Width(width))
    }
}

/// Pixel formats the raster encoder can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    Jpeg,
}

impl RasterFormat {
    pub fn mime(self) -> &'static str {
        match self {
            RasterFormat::Png => "image/png",
            RasterFormat::Jpeg => "image/jpeg",
        }
    }
}

/// File type chosen for a download.
///
/// `Jpeg` and `Jpg` produce the same pixels and differ only in the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
    Jpg,
    Svg,
}

impl ExportFormat {
    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Png => "PNG",
            ExportFormat::Jpeg => "JPEG",
            ExportFormat::Jpg => "JPG",
            ExportFormat::Svg => "SVG",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::Jpg => "jpg",
            ExportFormat::Svg => "svg",
        }
    }

    /// Name of the downloaded file, e.g. `qr-code.jpeg`.
    pub fn filename(self) -> String {
        format!("qr-code.{}", self.extension())
    }

    /// The raster pixel format, or `None` for vector output.
    pub fn raster(self) -> Option<RasterFormat> {
        match self {
            ExportFormat::Png => Some(RasterFormat::Png),
            ExportFormat::Jpeg | ExportFormat::Jpg => Some(RasterFormat::Jpeg),
            ExportFormat::Svg => None,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<String> for ExportFormat {
    type Error = OptionsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for ExportFormat {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpeg" => Ok(ExportFormat::Jpeg),
            "jpg" => Ok(ExportFormat::Jpg),
            "svg" => Ok(ExportFormat::Svg),
            _ => Err(OptionsError::Format(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_form() {
        let options = RenderOptions::default();
        assert_eq!(options.width(), 300);
        assert_eq!(options.margin(), 2);
        assert_eq!(options.error_correction, ErrorCorrection::Medium);
        assert_eq!(options.dark, HexColor::BLACK);
        assert_eq!(options.light, HexColor::WHITE);
    }

    #[test]
    fn width_follows_the_slider_steps() {
        let mut options = RenderOptions::default();
        for width in [200, 250, 450, 600] {
            assert!(options.set_width(width).is_ok());
            assert_eq!(options.width(), width);
        }
        assert_eq!(options.set_width(150), Err(OptionsError::Width(150)));
        assert_eq!(options.set_width(650), Err(OptionsError::Width(650)));
        assert_eq!(options.set_width(320), Err(OptionsError::Width(320)));
        // rejected values leave the previous width in place
        assert_eq!(options.width(), 600);
    }

    #[test]
    fn hex_color_forms() {
        assert_eq!("#000000".parse::<HexColor>().unwrap(), HexColor::BLACK);
        assert_eq!("fff".parse::<HexColor>().unwrap(), HexColor::WHITE);
        assert_eq!(
            "#1e90ff80".parse::<HexColor>().unwrap(),
            HexColor::new(0x1e, 0x90, 0xff, 0x80)
        );
        assert_eq!("#f008".parse::<HexColor>().unwrap(), HexColor::new(255, 0, 0, 0x88));
        assert!("#12345".parse::<HexColor>().is_err());
        assert!("#zzzzzz".parse::<HexColor>().is_err());
        assert!("###fff".parse::<HexColor>().is_err());
        assert!("##ffffff".parse::<HexColor>().is_err());
        assert!("".parse::<HexColor>().is_err());
    }

    #[test]
    fn hex_color_display() {
        assert_eq!(HexColor::WHITE.to_string(), "#FFFFFF");
        assert_eq!(HexColor::new(1, 2, 3, 4).to_string(), "#01020304");
        assert_eq!(HexColor::new(0xab, 0, 0, 255).to_rgb_hex(), "#ab0000");
    }

    #[test]
    fn error_correction_parsing() {
        assert_eq!("L".parse::<ErrorCorrection>().unwrap(), ErrorCorrection::Low);
        assert_eq!("quartile".parse::<ErrorCorrection>().unwrap(), ErrorCorrection::Quartile);
        assert_eq!("h".parse::<ErrorCorrection>().unwrap(), ErrorCorrection::High);
        assert!("X".parse::<ErrorCorrection>().is_err());
        assert_eq!(ErrorCorrection::Medium.label(), "Medium (15%)");
    }

    #[test]
    fn export_format_filenames() {
        assert_eq!(ExportFormat::Png.filename(), "qr-code.png");
        assert_eq!(ExportFormat::Jpeg.filename(), "qr-code.jpeg");
        assert_eq!(ExportFormat::Jpg.filename(), "qr-code.jpg");
        assert_eq!(ExportFormat::Svg.filename(), "qr-code.svg");
        assert_eq!("JPEG".parse::<ExportFormat>().unwrap(), ExportFormat::Jpeg);
        assert_eq!("jpg".parse::<ExportFormat>().unwrap(), ExportFormat::Jpg);
        assert!("gif".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Jpg.raster(), Some(RasterFormat::Jpeg));
        assert_eq!(ExportFormat::Svg.raster(), None);
    }
}
