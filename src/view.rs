//! The generator view: form state, notifications and the user-triggered actions.
//!
//! A [`Generator`] is one open view. Its state lives behind a mutex that is never held across
//! an `.await`; encoder, file-save and clipboard calls run on tokio's blocking pool. Each action
//! recovers from its own failures and reports what happened through an outcome enum, the
//! field error and the notification slot.
//!
//! The async actions need a tokio runtime.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::clipboard::{Clipboard, SystemClipboard};
use crate::config::Config;
use crate::encoder::{DataUri, Encoder, QrEncoder};
use crate::error::{ClipboardError, EncodeError, ExportError, ValidationError};
use crate::export::{DirectorySaver, FileSaver};
use crate::form::FormState;
use crate::notification::{Notification, Notifier};
use crate::options::RasterFormat;
use crate::validate::validate_url;

pub const GENERATED: &str = "QR code generated successfully!";
pub const GENERATE_FAILED: &str = "Failed to generate QR code. Please try again.";
pub const DOWNLOAD_FAILED: &str = "Failed to download QR code. Please try again.";
pub const COPIED: &str = "URL copied to clipboard!";
pub const COPY_FAILED: &str = "Failed to copy URL";

/// What [`Generator::generate`] did.
#[derive(Debug)]
pub enum GenerateOutcome {
    /// A new image is stored in the view.
    Ready,
    /// The URL field did not validate; the encoder was not called.
    Rejected(ValidationError),
    /// The encoder failed; the view shows a generic retry message.
    Failed(EncodeError),
    /// Another generate is still in flight; nothing was done.
    Busy,
    /// The form was edited while encoding; the result was dropped.
    Superseded,
}

/// What [`Generator::download`] did.
#[derive(Debug)]
pub enum DownloadOutcome {
    Saved(PathBuf),
    /// No image has been generated yet.
    NothingToExport,
    Failed(ExportError),
}

/// What [`Generator::copy_url`] did.
#[derive(Debug)]
pub enum CopyOutcome {
    Copied,
    /// No image has been generated yet.
    NothingToCopy,
    Failed(ClipboardError),
}

/// A point-in-time copy of everything a front end needs to draw the view.
#[derive(Debug, Clone)]
pub struct ViewSnapshot {
    pub form: FormState,
    pub notification: Option<Notification>,
    pub generating: bool,
}

struct ViewState {
    form: FormState,
    notifier: Notifier,
    generating: bool,
}

/// Clears the in-flight flag when the encode finishes or its future is dropped.
struct BusyGuard<'a> {
    state: &'a Mutex<ViewState>,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generating = false;
    }
}

pub struct Generator {
    state: Mutex<ViewState>,
    encoder: Arc<dyn Encoder>,
    saver: Arc<dyn FileSaver>,
    clipboard: Arc<dyn Clipboard>,
}

impl Generator {
    /// Opens a view with the default backends: [`QrEncoder`], a [`DirectorySaver`] writing to
    /// `config.output_dir` and the [`SystemClipboard`].
    pub fn new(config: &Config) -> Self {
        let generator = Generator::with_backends(
            Arc::new(QrEncoder::new().with_jpeg_quality(config.jpeg_quality)),
            Arc::new(DirectorySaver::new(&config.output_dir)),
            Arc::new(SystemClipboard::new()),
            config.notification_timeout(),
        );
        generator.edit(|form| form.set_format(config.format));
        generator
    }

    pub fn with_backends(
        encoder: Arc<dyn Encoder>,
        saver: Arc<dyn FileSaver>,
        clipboard: Arc<dyn Clipboard>,
        notification_timeout: Duration,
    ) -> Self {
        Generator {
            state: Mutex::new(ViewState {
                form: FormState::new(),
                notifier: Notifier::new(notification_timeout),
                generating: false,
            }),
            encoder,
            saver,
            clipboard,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies a form transition, e.g. `view.edit(|form| form.set_url("https://a.com"))`.
    pub fn edit<R>(&self, transition: impl FnOnce(&mut FormState) -> R) -> R {
        transition(&mut self.lock().form)
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let state = self.lock();
        ViewSnapshot {
            form: state.form.clone(),
            notification: state.notifier.visible().cloned(),
            generating: state.generating,
        }
    }

    /// Whether an encode is in flight. Front ends disable the generate trigger while it is.
    pub fn is_generating(&self) -> bool {
        self.lock().generating
    }

    pub fn output(&self) -> Option<DataUri> {
        self.lock().form.output().cloned()
    }

    pub fn notification(&self) -> Option<Notification> {
        self.lock().notifier.visible().cloned()
    }

    pub fn dismiss_notification(&self) {
        self.lock().notifier.dismiss();
    }

    /// Hides the notification once its timeout has elapsed.
    pub fn tick(&self, now: Instant) -> bool {
        self.lock().notifier.tick(now)
    }

    /// Clears the URL, the image and the field error, and restores the default options.
    pub fn reset(&self) {
        self.lock().form.reset();
        debug!("form reset");
    }

    /// Validates the URL and encodes it as a PNG with the current options.
    pub async fn generate(&self) -> GenerateOutcome {
        let (payload, options, revision) = {
            let mut state = self.lock();
            if state.generating {
                debug!("generate ignored, encode already in flight");
                return GenerateOutcome::Busy;
            }
            if let Err(err) = validate_url(state.form.url()) {
                debug!(error = %err, "url rejected");
                state.form.set_error(err.to_string());
                return GenerateOutcome::Rejected(err);
            }
            state.form.clear_error();
            state.generating = true;
            (
                state.form.url().to_string(),
                *state.form.options(),
                state.form.revision(),
            )
        };
        let _busy = BusyGuard { state: &self.state };

        let encoder = Arc::clone(&self.encoder);
        let result = tokio::task::spawn_blocking(move || {
            encoder.encode_raster(&payload, &options, RasterFormat::Png)
        })
        .await
        .unwrap_or_else(|err| Err(EncodeError::Task(err.to_string())));

        let mut state = self.lock();
        if state.form.revision() != revision {
            debug!("form edited while encoding, result dropped");
            return GenerateOutcome::Superseded;
        }
        match result {
            Ok(image) => {
                state.form.store_output(revision, image);
                state.notifier.success(GENERATED);
                info!(
                    width = options.width(),
                    level = %options.error_correction,
                    "generated QR code"
                );
                GenerateOutcome::Ready
            }
            Err(err) => {
                error!(error = %err, "failed to generate QR code");
                state.form.set_error(GENERATE_FAILED);
                GenerateOutcome::Failed(err)
            }
        }
    }

    /// Saves the current image as `qr-code.<ext>` in the selected format.
    ///
    /// Raster formats are re-encoded in the matching pixel format; SVG is encoded as a vector
    /// document and embedded as a percent-encoded data URI.
    pub async fn download(&self) -> DownloadOutcome {
        let (payload, options, format) = {
            let state = self.lock();
            if state.form.output().is_none() {
                return DownloadOutcome::NothingToExport;
            }
            (
                state.form.url().to_string(),
                *state.form.options(),
                state.form.format(),
            )
        };

        let encoder = Arc::clone(&self.encoder);
        let saver = Arc::clone(&self.saver);
        let filename = format.filename();
        let result = tokio::task::spawn_blocking(move || {
            let uri = match format.raster() {
                Some(raster) => encoder.encode_raster(&payload, &options, raster)?,
                None => DataUri::from_svg(&encoder.encode_vector(&payload, &options)?),
            };
            saver.save(&filename, &uri)
        })
        .await
        .unwrap_or_else(|err| Err(EncodeError::Task(err.to_string()).into()));

        let mut state = self.lock();
        match result {
            Ok(path) => {
                info!(path = %path.display(), %format, "downloaded QR code");
                DownloadOutcome::Saved(path)
            }
            Err(err) => {
                error!(error = %err, %format, "failed to download QR code");
                state.form.set_error(DOWNLOAD_FAILED);
                DownloadOutcome::Failed(err)
            }
        }
    }

    /// Copies the source URL (not the image) to the clipboard.
    pub async fn copy_url(&self) -> CopyOutcome {
        let url = {
            let state = self.lock();
            if state.form.output().is_none() {
                return CopyOutcome::NothingToCopy;
            }
            state.form.url().to_string()
        };

        let clipboard = Arc::clone(&self.clipboard);
        let result = tokio::task::spawn_blocking(move || clipboard.write_text(&url))
            .await
            .unwrap_or_else(|err| {
                Err(ClipboardError::Rejected {
                    tool: "clipboard task".to_string(),
                    reason: err.to_string(),
                })
            });

        let mut state = self.lock();
        match result {
            Ok(()) => {
                state.notifier.success(COPIED);
                CopyOutcome::Copied
            }
            Err(err) => {
                warn!(error = %err, "failed to copy URL");
                state.notifier.error(COPY_FAILED);
                CopyOutcome::Failed(err)
            }
        }
    }
}
