use image::{ImageBuffer, Rgb, RgbImage, Rgba, RgbaImage};
use qrcode::{Color, QrCode};
use std::fmt::Write as _;

use crate::options::{HexColor, RenderOptions};

/// Pixels per module when the requested width is too small to hold the symbol and its margin.
pub const FALLBACK_SCALE: u32 = 4;

/*---- Utilities ----*/

fn is_dark(qr: &QrCode, x: usize, y: usize) -> bool {
    qr[(x, y)] == Color::Dark
}

/// Side length in modules of the symbol plus its quiet margin on both sides.
fn total_modules(qr: &QrCode, margin: u32) -> u32 {
    qr.width() as u32 + 2 * margin
}

/// Side length in pixels of the raster image for `options`.
///
/// The configured width is used as-is when it can give every module at least one pixel,
/// otherwise each module is drawn [`FALLBACK_SCALE`] pixels wide.
pub fn raster_size(qr: &QrCode, options: &RenderOptions) -> u32 {
    let total = total_modules(qr, options.margin());
    if options.width() >= total {
        options.width()
    } else {
        total * FALLBACK_SCALE
    }
}

/// Maps each pixel row/column to its module row/column, or `None` inside the quiet margin.
fn pixel_to_module(qr: &QrCode, options: &RenderOptions, size_px: u32) -> Vec<Option<usize>> {
    let margin = options.margin() as u64;
    let total = total_modules(qr, options.margin()) as u64;
    let modules = qr.width() as u64;
    (0..size_px as u64)
        .map(|p| {
            let cell = p * total / size_px as u64;
            (cell >= margin && cell < margin + modules).then(|| (cell - margin) as usize)
        })
        .collect()
}

/// Draws the given QR Code into an RGBA image using the colors and geometry of `options`.
///
/// # Arguments
///
/// * `qr` - The encoded symbol.
/// * `options` - Width in pixels, quiet margin in modules and the dark/light colors.
///
/// # Returns
///
/// A square `RgbaImage` of [`raster_size`] pixels.
///
/// # Example
///
/// ```
/// use qrcode::{EcLevel, QrCode};
/// use scannix::options::RenderOptions;
/// use scannix::render::to_image_buffer;
///
/// let qr = QrCode::with_error_correction_level("https://example.com", EcLevel::M).unwrap();
/// let img = to_image_buffer(&qr, &RenderOptions::default());
/// assert_eq!(img.dimensions(), (300, 300));
/// ```
pub fn to_image_buffer(qr: &QrCode, options: &RenderOptions) -> RgbaImage {
    let size = raster_size(qr, options);
    let lookup = pixel_to_module(qr, options, size);
    let dark = Rgba(options.dark.rgba());
    let light = Rgba(options.light.rgba());

    let mut img = ImageBuffer::new(size, size);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = match (lookup[x as usize], lookup[y as usize]) {
            (Some(mx), Some(my)) if is_dark(qr, mx, my) => dark,
            _ => light,
        };
    }
    img
}

/// Same as [`to_image_buffer`] without the alpha channel, for formats that cannot store it.
pub fn to_rgb_image_buffer(qr: &QrCode, options: &RenderOptions) -> RgbImage {
    let size = raster_size(qr, options);
    let lookup = pixel_to_module(qr, options, size);
    let dark = Rgb(options.dark.rgb());
    let light = Rgb(options.light.rgb());

    let mut img = ImageBuffer::new(size, size);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = match (lookup[x as usize], lookup[y as usize]) {
            (Some(mx), Some(my)) if is_dark(qr, mx, my) => dark,
            _ => light,
        };
    }
    img
}

fn color_attribute(attribute: &str, color: HexColor) -> String {
    let mut result = format!("{attribute}=\"{}\"", color.to_rgb_hex());
    if color.alpha() < 255 {
        let opacity = f64::from(color.alpha()) / 255.0;
        let _ = write!(result, " {attribute}-opacity=\"{opacity:.2}\"");
    }
    result
}

// One horizontal stroke per run of dark modules, drawn through the middle of the row.
fn dark_runs_path(qr: &QrCode, margin: u32) -> String {
    let size = qr.width();
    let margin = margin as usize;
    let mut path = String::new();
    for y in 0..size {
        let mut x = 0;
        while x < size {
            if !is_dark(qr, x, y) {
                x += 1;
                continue;
            }
            let start = x;
            while x < size && is_dark(qr, x, y) {
                x += 1;
            }
            let _ = write!(path, "M{} {}.5h{}", start + margin, y + margin, x - start);
        }
    }
    path
}

/// Returns a string of SVG code for an image depicting the given QR Code.
///
/// The document declares `width`/`height` from `options`, a `viewBox` measured in modules
/// (symbol plus quiet margin), a background path in the light color and the dark modules as
/// horizontal strokes. A fully transparent light color omits the background.
/// The string always uses Unix newlines (\n), regardless of the platform.
pub fn to_svg_string(qr: &QrCode, options: &RenderOptions) -> String {
    let dimension = total_modules(qr, options.margin());
    let mut result = String::new();
    result += "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
    result += &format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{0}\" height=\"{0}\" viewBox=\"0 0 {1} {1}\" shape-rendering=\"crispEdges\">",
        options.width(),
        dimension
    );
    if options.light.alpha() > 0 {
        result += &format!(
            "<path {} d=\"M0 0h{1}v{1}H0z\"/>",
            color_attribute("fill", options.light),
            dimension
        );
    }
    result += &format!(
        "<path {} d=\"{}\"/>",
        color_attribute("stroke", options.dark),
        dark_runs_path(qr, options.margin())
    );
    result += "</svg>\n";
    result
}

/// Renders the given QR Code as block characters for a terminal preview.
pub fn to_console_string(qr: &QrCode, border: u32) -> String {
    let size = qr.width() as i64;
    let border = border as i64;
    let mut result = String::new();
    for y in -border..size + border {
        for x in -border..size + border {
            let inside = (0..size).contains(&x) && (0..size).contains(&y);
            let c = if inside && is_dark(qr, x as usize, y as usize) { '█' } else { ' ' };
            result.push(c);
            result.push(c);
        }
        result.push('\n');
    }
    result
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;
    use qrcode::EcLevel;

    fn sample() -> QrCode {
        QrCode::with_error_correction_level("https://example.com", EcLevel::M).unwrap()
    }

    #[test]
    fn test_to_svg_string() {
        let qr = sample();
        let svg = to_svg_string(&qr, &RenderOptions::default());

        assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(svg.contains("width=\"300\" height=\"300\""));
        let dimension = qr.width() + 4;
        assert!(svg.contains(&format!("viewBox=\"0 0 {dimension} {dimension}\"")));
        assert!(svg.contains("fill=\"#ffffff\""));
        assert!(svg.contains("stroke=\"#000000\""));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_svg_transparency() {
        let qr = sample();
        let mut options = RenderOptions::default();
        options.light = HexColor::new(255, 255, 255, 0);
        options.dark = HexColor::new(0, 0, 255, 128);
        let svg = to_svg_string(&qr, &options);

        assert!(!svg.contains("fill="), "transparent background is omitted");
        assert!(svg.contains("stroke=\"#0000ff\" stroke-opacity=\"0.50\""));
    }

    #[test]
    fn test_svg_path_starts_at_margin() {
        // The top-left finder pattern row is a run of seven dark modules.
        let qr = sample();
        let svg = to_svg_string(&qr, &RenderOptions::default());
        assert!(svg.contains("d=\"M2 2.5h7"));
    }

    #[test]
    fn test_image_buffer_uses_configured_width() {
        let qr = sample();
        for width in [200, 300, 450, 600] {
            let options = RenderOptions::default().with_width(width).unwrap();
            let img = to_image_buffer(&qr, &options);
            assert_eq!(img.dimensions(), (width, width));
        }
    }

    #[test]
    fn test_image_buffer_colors() {
        let qr = sample();
        let mut options = RenderOptions::default();
        options.dark = HexColor::new(0x11, 0x22, 0x33, 255);
        options.light = HexColor::new(0xee, 0xdd, 0xcc, 255);
        let img = to_image_buffer(&qr, &options);

        // corner is quiet margin, the finder pattern starts right after it
        assert_eq!(img.get_pixel(0, 0), &Rgba([0xee, 0xdd, 0xcc, 255]));
        let total = qr.width() as u32 + 4;
        let inside = 300 * 2 / total + 1;
        assert_eq!(img.get_pixel(inside, inside), &Rgba([0x11, 0x22, 0x33, 255]));
    }

    #[test]
    fn test_largest_symbol_fits_smallest_width() {
        // version 40 at level L is 177 modules wide, 181 with the margin
        let payload = "a".repeat(2900);
        let qr = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::L).unwrap();
        assert_eq!(qr.width(), 177);
        let options = RenderOptions::default().with_width(200).unwrap();
        assert_eq!(raster_size(&qr, &options), 200);
        assert_eq!(to_image_buffer(&qr, &options).dimensions(), (200, 200));
    }

    #[test]
    fn test_console_string() {
        let qr = sample();
        let text = to_console_string(&qr, 2);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), qr.width() + 4);
        assert!(lines[0].trim().is_empty());
        assert!(lines[2].contains('█'));
    }
}
