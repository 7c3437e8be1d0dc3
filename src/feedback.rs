use serde::{Deserialize, Serialize};

/// Notification played when a scan result is accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    /// Haptic pulse
    #[default]
    Vibrate,
    /// Platform system sound with the given identifier
    Sound(u32),
}

/// Haptic or audio notifier invoked on an accepted match
pub trait FeedbackSink {
    /// Play `kind` once
    fn trigger(&mut self, kind: FeedbackKind);
}

impl<F: FnMut(FeedbackKind)> FeedbackSink for F {
    fn trigger(&mut self, kind: FeedbackKind) {
        self(kind)
    }
}

/// Sink that only records the feedback in the log.
///
/// Used until a platform sink is installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFeedback;

impl FeedbackSink for LogFeedback {
    fn trigger(&mut self, kind: FeedbackKind) {
        tracing::debug!(?kind, "scan feedback");
    }
}
