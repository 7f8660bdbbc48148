//! The form state of the generator view.
//!
//! Every field has its own transition method. Any edit that changes the URL or a render
//! option drops the generated image and bumps [`FormState::revision`], so an image can never
//! describe different inputs than the ones on screen.

use tracing::debug;

use crate::encoder::DataUri;
use crate::error::OptionsError;
use crate::options::{ErrorCorrection, ExportFormat, HexColor, RenderOptions};

/// Largest size, in pixels, at which the preview is displayed.
pub const DISPLAY_CAP: u32 = 256;

#[derive(Debug, Clone, Default)]
pub struct FormState {
    url: String,
    options: RenderOptions,
    format: ExportFormat,
    show_customization: bool,
    error: Option<String>,
    output: Option<DataUri>,
    revision: u64,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn show_customization(&self) -> bool {
        self.show_customization
    }

    /// The field-level error shown next to the URL input.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The generated image, present only between a successful generate and the next edit.
    pub fn output(&self) -> Option<&DataUri> {
        self.output.as_ref()
    }

    /// Counter bumped by every edit that invalidates the image.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Size at which the preview is displayed. Encoding always uses the full width.
    pub fn display_size(&self) -> u32 {
        self.options.width().min(DISPLAY_CAP)
    }

    fn invalidate(&mut self) {
        if self.output.take().is_some() {
            debug!(revision = self.revision + 1, "dropped generated image");
        }
        self.revision += 1;
    }

    /// Replaces the URL text. Always clears the field error.
    pub fn set_url(&mut self, url: impl Into<String>) {
        let url = url.into();
        self.error = None;
        if url != self.url {
            self.url = url;
            self.invalidate();
        }
    }

    pub fn set_width(&mut self, width: u32) -> Result<(), OptionsError> {
        let mut options = self.options;
        options.set_width(width)?;
        self.set_options(options);
        Ok(())
    }

    pub fn set_error_correction(&mut self, level: ErrorCorrection) {
        let mut options = self.options;
        options.error_correction = level;
        self.set_options(options);
    }

    pub fn set_dark(&mut self, color: HexColor) {
        let mut options = self.options;
        options.dark = color;
        self.set_options(options);
    }

    pub fn set_light(&mut self, color: HexColor) {
        let mut options = self.options;
        options.light = color;
        self.set_options(options);
    }

    fn set_options(&mut self, options: RenderOptions) {
        if options != self.options {
            self.options = options;
            self.invalidate();
        }
    }

    /// Picks the download format. The generated image stays valid.
    pub fn set_format(&mut self, format: ExportFormat) {
        self.format = format;
    }

    pub fn toggle_customization(&mut self) {
        self.show_customization = !self.show_customization;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Stores a freshly generated image if the form has not been edited since `revision`.
    /// Returns `false` when the image is stale and was discarded.
    pub fn store_output(&mut self, revision: u64, image: DataUri) -> bool {
        if revision != self.revision {
            return false;
        }
        self.output = Some(image);
        self.error = None;
        true
    }

    /// Clears the URL, the image and the error, and restores the default render options.
    ///
    /// The export format and the customization toggle are left alone.
    pub fn reset(&mut self) {
        self.url.clear();
        self.error = None;
        self.options = RenderOptions::default();
        self.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> DataUri {
        DataUri::from_bytes("image/png", &[1, 2, 3])
    }

    fn generated(url: &str) -> FormState {
        let mut form = FormState::new();
        form.set_url(url);
        assert!(form.store_output(form.revision(), image()));
        form
    }

    #[test]
    fn editing_the_url_clears_the_error_and_the_image() {
        let mut form = generated("https://a.com");
        form.set_error("Please enter a URL");

        form.set_url("https://a.co");
        assert_eq!(form.error(), None);
        assert!(form.output().is_none());
    }

    #[test]
    fn same_url_keeps_the_image_but_clears_the_error() {
        let mut form = generated("https://a.com");
        form.set_error("boom");
        form.set_url("https://a.com");
        assert_eq!(form.error(), None);
        assert!(form.output().is_some());
    }

    #[test]
    fn option_changes_invalidate_the_image() {
        let mut form = generated("https://a.com");
        form.set_width(400).unwrap();
        assert!(form.output().is_none());

        let mut form = generated("https://a.com");
        form.set_error_correction(ErrorCorrection::High);
        assert!(form.output().is_none());

        let mut form = generated("https://a.com");
        form.set_dark("#ff0000".parse().unwrap());
        assert!(form.output().is_none());

        let mut form = generated("https://a.com");
        form.set_light("#00ff00".parse().unwrap());
        assert!(form.output().is_none());
    }

    #[test]
    fn unchanged_options_keep_the_image() {
        let mut form = generated("https://a.com");
        form.set_width(300).unwrap();
        form.set_error_correction(ErrorCorrection::Medium);
        form.set_dark(HexColor::BLACK);
        assert!(form.output().is_some());
    }

    #[test]
    fn invalid_width_is_rejected_without_side_effects() {
        let mut form = generated("https://a.com");
        assert!(form.set_width(333).is_err());
        assert_eq!(form.options().width(), 300);
        assert!(form.output().is_some());
    }

    #[test]
    fn format_change_keeps_the_image() {
        let mut form = generated("https://a.com");
        form.set_format(ExportFormat::Svg);
        assert_eq!(form.format(), ExportFormat::Svg);
        assert!(form.output().is_some());
    }

    #[test]
    fn stale_output_is_discarded() {
        let mut form = FormState::new();
        form.set_url("https://a.com");
        let revision = form.revision();
        form.set_url("https://b.com");
        assert!(!form.store_output(revision, image()));
        assert!(form.output().is_none());
    }

    #[test]
    fn reset_restores_defaults_from_any_state() {
        let mut form = generated("https://a.com");
        form.set_width(600).unwrap();
        form.set_error_correction(ErrorCorrection::Low);
        form.set_dark("#123456".parse().unwrap());
        form.set_light("#abcdef".parse().unwrap());
        assert!(form.store_output(form.revision(), image()));
        form.set_error("Failed to generate QR code. Please try again.");
        form.set_format(ExportFormat::Jpg);

        form.reset();

        assert_eq!(form.url(), "");
        assert!(form.output().is_none());
        assert_eq!(form.error(), None);
        let options = form.options();
        assert_eq!(options.width(), 300);
        assert_eq!(options.margin(), 2);
        assert_eq!(options.error_correction, ErrorCorrection::Medium);
        assert_eq!(options.dark, HexColor::BLACK);
        assert_eq!(options.light, HexColor::WHITE);
        assert_eq!(form.format(), ExportFormat::Jpg);
    }

    #[test]
    fn display_size_is_capped() {
        let mut form = FormState::new();
        assert_eq!(form.display_size(), 256);
        form.set_width(200).unwrap();
        assert_eq!(form.display_size(), 200);
        form.set_width(600).unwrap();
        assert_eq!(form.display_size(), 256);
    }

    #[test]
    fn customization_toggle() {
        let mut form = FormState::new();
        assert!(!form.show_customization());
        form.toggle_customization();
        assert!(form.show_customization());
        form.toggle_customization();
        assert!(!form.show_customization());
    }
}
