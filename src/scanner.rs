//! The scanner view.
//!
//! [`ScannerView`] links a [`PreviewLayer`] (render target) with a
//! [`CaptureController`] (capture lifecycle) and runs the caller's result
//! predicate on the thread that owns the view.
//!
//! Capture work happens on a background worker. Results are queued for the
//! owning thread and handled by [`ScannerView::pump`], which the host calls
//! from its interface loop.

use crate::capture::{CaptureController, DeviceDiscovery};
use crate::config::ScannerConfig;
use crate::feedback::{FeedbackSink, LogFeedback};
use crate::models::{Point, ScanResult};
use crate::preview::PreviewLayer;
use crate::recognizer::Recognizer;
use image::RgbImage;
use std::sync::mpsc::Receiver;

type ResultPredicate = Box<dyn FnMut(&ScanResult) -> bool>;

/// Camera preview that scans QR and data-matrix codes
pub struct ScannerView {
    config: ScannerConfig,
    preview: PreviewLayer,
    controller: CaptureController,
    results: Receiver<Vec<ScanResult>>,
    on_result: ResultPredicate,
    feedback: Box<dyn FeedbackSink>,
}

impl ScannerView {
    /// Zero-sized, unconfigured view.
    ///
    /// The default predicate rejects every result and the default feedback
    /// sink only logs.
    pub fn new(config: ScannerConfig) -> Self {
        let (controller, results) = CaptureController::new();
        Self {
            preview: PreviewLayer::new(config.video_gravity),
            config,
            controller,
            results,
            on_result: Box::new(|_: &ScanResult| false),
            feedback: Box::new(LogFeedback),
        }
    }

    /// Create and configure a view in one step.
    ///
    /// Starts scanning right away when `config.auto_start` is set.
    pub fn open<D, R>(config: ScannerConfig, discovery: &D, recognizer: R) -> Self
    where
        D: DeviceDiscovery + ?Sized,
        R: Recognizer + 'static,
    {
        let mut view = Self::new(config);
        view.configure(discovery, recognizer);
        view
    }

    /// Acquire the default video device and attach the recognizer.
    ///
    /// Failures are logged and otherwise silent: the view stays
    /// unconfigured and [`start_scan`](Self::start_scan) does nothing.
    /// Calling this on a configured view does nothing.
    pub fn configure<D, R>(&mut self, discovery: &D, recognizer: R)
    where
        D: DeviceDiscovery + ?Sized,
        R: Recognizer + 'static,
    {
        if self.controller.is_configured() {
            tracing::debug!("scanner already configured");
            return;
        }
        match self
            .controller
            .configure(&self.config, discovery, Box::new(recognizer))
        {
            Ok(()) => {
                tracing::debug!(symbologies = ?self.config.symbologies, "scanner configured");
                if self.config.auto_start {
                    self.start_scan();
                }
            }
            Err(err) => tracing::warn!(%err, "scanner setup failed, scanning disabled"),
        }
    }

    /// Whether setup succeeded
    pub fn is_configured(&self) -> bool {
        self.controller.is_configured()
    }

    /// Begin scanning. Idempotent.
    pub fn start_scan(&self) {
        self.controller.start();
    }

    /// Stop scanning. Idempotent.
    pub fn stop_scan(&self) {
        self.controller.stop();
    }

    /// Whether scanning has been started and not stopped since
    pub fn is_scanning(&self) -> bool {
        self.controller.is_running()
    }

    /// Install the result predicate.
    ///
    /// Called once per recognized symbol per frame, in recognizer order.
    /// Returning `true` accepts the result and plays feedback.
    pub fn set_on_result<F>(&mut self, on_result: F)
    where
        F: FnMut(&ScanResult) -> bool + 'static,
    {
        self.on_result = Box::new(on_result);
    }

    /// Replace the feedback sink
    pub fn set_feedback_sink<S>(&mut self, sink: S)
    where
        S: FeedbackSink + 'static,
    {
        self.feedback = Box::new(sink);
    }

    /// Handle every result queued by the capture worker.
    ///
    /// Returns the number of results passed to the predicate.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(batch) = self.results.try_recv() {
            handled += self.deliver(batch);
        }
        handled
    }

    /// Run the predicate and feedback for results obtained elsewhere, for
    /// example from a push-based platform recognizer.
    pub fn deliver<I>(&mut self, results: I) -> usize
    where
        I: IntoIterator<Item = ScanResult>,
    {
        let mut handled = 0;
        for result in results {
            handled += 1;
            if !(self.on_result)(&result) {
                continue;
            }
            tracing::debug!(symbology = ?result.symbology(), "scan result accepted");
            if let Some(kind) = self.config.feedback {
                self.feedback.trigger(kind);
            }
        }
        handled
    }

    /// Block until capture work queued so far has finished
    pub fn flush(&self) {
        self.controller.flush();
    }

    /// Configuration the view was created with
    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// The render target
    pub fn preview(&self) -> &PreviewLayer {
        &self.preview
    }

    /// The render target, for resizing
    pub fn preview_mut(&mut self) -> &mut PreviewLayer {
        &mut self.preview
    }

    /// Draw the latest captured frame into the preview bounds
    pub fn render_preview(&self) -> Option<RgbImage> {
        let frame = self.controller.latest_frame()?;
        self.preview.render(&frame)
    }

    /// Corners of a result in preview coordinates
    pub fn result_corners_in_preview(&self, result: &ScanResult) -> Option<[Point; 4]> {
        let frame_size = result.frame_size();
        let [a, b, c, d] = *result.corners();
        Some([
            self.preview.layer_point(frame_size, a)?,
            self.preview.layer_point(frame_size, b)?,
            self.preview.layer_point(frame_size, c)?,
            self.preview.layer_point(frame_size, d)?,
        ])
    }
}
