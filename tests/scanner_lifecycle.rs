//! Integration tests for the scan lifecycle
//!
//! These drive a `ScannerView` end to end with a scripted camera and
//! recognizer: start/stop idempotence, result ordering, feedback on accepted
//! results, and silent setup failures.

use qrcode_view::{
    CaptureDevice, CaptureError, Decoder, Detection, FeedbackKind, FnRecognizer, Frame,
    PixelFormat, ScanResult, ScannerConfig, ScannerView, Symbology,
};
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct CameraState {
    frames: Mutex<VecDeque<Frame>>,
    starts: AtomicUsize,
    stops: AtomicUsize,
}

impl CameraState {
    fn push_frames(&self, sequences: impl IntoIterator<Item = u64>) {
        let mut frames = self.frames.lock().unwrap();
        for sequence in sequences {
            let frame = Frame::new(16, 12, PixelFormat::Luma8, vec![128; 16 * 12])
                .unwrap()
                .with_sequence(sequence);
            frames.push_back(frame);
        }
    }
}

/// Camera whose frames are fed by the test; the stream ends when empty
struct ScriptedCamera {
    state: Arc<CameraState>,
    fail_start: bool,
}

impl CaptureDevice for ScriptedCamera {
    fn name(&self) -> &str {
        "scripted"
    }

    fn start(&mut self) -> Result<(), CaptureError> {
        if self.fail_start {
            return Err(CaptureError::Device("sensor busy".to_string()));
        }
        self.state.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) {
        self.state.stops.fetch_add(1, Ordering::SeqCst);
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
        Ok(self.state.frames.lock().unwrap().pop_front())
    }
}

/// Recognizer returning canned detections keyed by frame sequence
fn scripted_recognizer(
    script: HashMap<u64, Vec<Detection>>,
) -> FnRecognizer<impl FnMut(&Frame) -> Vec<Detection> + Send> {
    FnRecognizer::new(
        vec![Symbology::Qr, Symbology::DataMatrix, Symbology::Code128],
        move |frame: &Frame| script.get(&frame.sequence()).cloned().unwrap_or_default(),
    )
}

fn open_view(
    config: ScannerConfig,
    state: &Arc<CameraState>,
    script: HashMap<u64, Vec<Detection>>,
) -> ScannerView {
    let state = Arc::clone(state);
    let discovery = move || -> Option<Box<dyn CaptureDevice>> {
        Some(Box::new(ScriptedCamera {
            state: Arc::clone(&state),
            fail_start: false,
        }))
    };
    ScannerView::open(config, &discovery, scripted_recognizer(script))
}

fn record_results(
    view: &mut ScannerView,
    accept: fn(&ScanResult) -> bool,
) -> Rc<RefCell<Vec<String>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    view.set_on_result(move |result| {
        log.borrow_mut().push(result.text().to_string());
        accept(result)
    });
    seen
}

#[test]
fn test_start_and_stop_report_state_immediately() {
    let state = Arc::new(CameraState::default());
    let view = open_view(ScannerConfig::default().manual_start(), &state, HashMap::new());
    assert!(view.is_configured());
    assert!(!view.is_scanning());

    view.start_scan();
    assert!(view.is_scanning());
    view.stop_scan();
    assert!(!view.is_scanning());
}

#[test]
fn test_start_and_stop_are_idempotent() {
    let state = Arc::new(CameraState::default());
    let view = open_view(ScannerConfig::default().manual_start(), &state, HashMap::new());

    view.start_scan();
    view.start_scan();
    view.flush();
    assert!(view.is_scanning());
    assert_eq!(state.starts.load(Ordering::SeqCst), 1);

    view.stop_scan();
    view.stop_scan();
    view.flush();
    assert!(!view.is_scanning());
    assert_eq!(state.stops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_auto_start_scans_after_setup() {
    let state = Arc::new(CameraState::default());
    let view = open_view(ScannerConfig::default(), &state, HashMap::new());
    assert!(view.is_scanning());
    view.flush();
    assert_eq!(state.starts.load(Ordering::SeqCst), 1);
}

#[test]
fn test_results_keep_recognizer_order() {
    let state = Arc::new(CameraState::default());
    state.push_frames([1, 2]);
    let script = HashMap::from([
        (
            1,
            vec![
                Detection::text(Symbology::Qr, "a"),
                Detection::text(Symbology::DataMatrix, "b"),
                Detection::text(Symbology::Qr, "c"),
            ],
        ),
        (2, vec![Detection::text(Symbology::Qr, "d")]),
    ]);
    let mut view = open_view(ScannerConfig::default().manual_start(), &state, script);
    let seen = record_results(&mut view, |_| false);

    view.start_scan();
    view.flush();
    assert_eq!(view.pump(), 4);
    assert_eq!(*seen.borrow(), vec!["a", "b", "c", "d"]);
}

#[test]
fn test_unreadable_and_unselected_symbols_are_skipped() {
    let state = Arc::new(CameraState::default());
    state.push_frames([1]);
    let script = HashMap::from([(
        1,
        vec![
            Detection::unreadable(Symbology::Qr),
            Detection::text(Symbology::Code128, "linear"),
            Detection::text(Symbology::DataMatrix, "kept"),
        ],
    )]);
    let mut view = open_view(ScannerConfig::default().manual_start(), &state, script);
    let seen = record_results(&mut view, |_| false);

    view.start_scan();
    view.flush();
    view.pump();
    assert_eq!(*seen.borrow(), vec!["kept"]);
}

#[test]
fn test_feedback_only_for_accepted_results() {
    let state = Arc::new(CameraState::default());
    state.push_frames([1]);
    let script = HashMap::from([(
        1,
        vec![
            Detection::text(Symbology::Qr, "reject"),
            Detection::text(Symbology::Qr, "accept"),
            Detection::text(Symbology::Qr, "reject"),
        ],
    )]);
    let mut view = open_view(ScannerConfig::default().manual_start(), &state, script);
    let played = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&played);
    view.set_feedback_sink(move |kind: FeedbackKind| log.borrow_mut().push(kind));
    record_results(&mut view, |result| result.text() == "accept");

    view.start_scan();
    view.flush();
    assert_eq!(view.pump(), 3);
    assert_eq!(*played.borrow(), vec![FeedbackKind::Vibrate]);
}

#[test]
fn test_restart_resumes_capture() {
    let state = Arc::new(CameraState::default());
    state.push_frames([1]);
    let script = HashMap::from([
        (1, vec![Detection::text(Symbology::Qr, "before")]),
        (2, vec![Detection::text(Symbology::Qr, "after")]),
    ]);
    let mut view = open_view(ScannerConfig::default().manual_start(), &state, script);
    let seen = record_results(&mut view, |_| false);

    view.start_scan();
    view.flush();
    view.stop_scan();
    view.flush();
    view.pump();

    state.push_frames([2]);
    view.start_scan();
    view.flush();
    view.pump();

    assert_eq!(*seen.borrow(), vec!["before", "after"]);
    assert_eq!(state.starts.load(Ordering::SeqCst), 2);
    assert_eq!(state.stops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_failed_device_start_clears_scanning() {
    let state = Arc::new(CameraState::default());
    let failing = Arc::clone(&state);
    let discovery = move || -> Option<Box<dyn CaptureDevice>> {
        Some(Box::new(ScriptedCamera {
            state: Arc::clone(&failing),
            fail_start: true,
        }))
    };
    let view = ScannerView::open(
        ScannerConfig::default().manual_start(),
        &discovery,
        scripted_recognizer(HashMap::new()),
    );

    view.start_scan();
    assert!(view.is_scanning());
    view.flush();
    assert!(!view.is_scanning());
}

#[test]
fn test_setup_failures_are_silent() {
    let no_camera = || -> Option<Box<dyn CaptureDevice>> { None };
    let view = ScannerView::open(
        ScannerConfig::default(),
        &no_camera,
        scripted_recognizer(HashMap::new()),
    );
    assert!(!view.is_configured());
    view.start_scan();
    assert!(!view.is_scanning());
    view.flush();
}

#[test]
fn test_configure_twice_keeps_first_setup() {
    let state = Arc::new(CameraState::default());
    let mut view = open_view(ScannerConfig::default().manual_start(), &state, HashMap::new());
    let no_camera = || -> Option<Box<dyn CaptureDevice>> { None };
    view.configure(&no_camera, scripted_recognizer(HashMap::new()));
    assert!(view.is_configured());
}

#[derive(Debug, PartialEq, Deserialize)]
struct Pairing {
    host: String,
    port: u16,
}

#[test]
fn test_decoders_on_scanned_text() {
    let state = Arc::new(CameraState::default());
    state.push_frames([1]);
    let script = HashMap::from([(
        1,
        vec![
            Detection::text(Symbology::Qr, r#"{"host": "10.0.0.2", "port": 8443}"#),
            Detection::text(Symbology::Qr, "https://example.com/pair"),
            Detection::text(Symbology::Qr, "{broken"),
        ],
    )]);
    let mut view = open_view(ScannerConfig::default().manual_start(), &state, script);

    let pairings = Rc::new(RefCell::new(Vec::new()));
    let urls = Rc::new(RefCell::new(Vec::new()));
    let (pairing_log, url_log) = (Rc::clone(&pairings), Rc::clone(&urls));
    let json = Decoder::<Pairing>::json();
    let url = Decoder::url();
    view.set_on_result(move |result| {
        if let Some(pairing) = json.decode(result.text()) {
            pairing_log.borrow_mut().push(pairing);
            return true;
        }
        if let Some(url) = url.decode(result.text()) {
            url_log.borrow_mut().push(url.to_string());
            return true;
        }
        false
    });

    view.start_scan();
    view.flush();
    view.pump();

    assert_eq!(
        *pairings.borrow(),
        vec![Pairing {
            host: "10.0.0.2".to_string(),
            port: 8443
        }]
    );
    assert_eq!(*urls.borrow(), vec!["https://example.com/pair"]);
}

#[test]
fn test_recognizer_reads_luma_of_color_frames() {
    let state = Arc::new(CameraState::default());
    {
        let mut frames = state.frames.lock().unwrap();
        for (sequence, level) in [(1, 20u8), (2, 230u8)] {
            let frame = Frame::new(4, 4, PixelFormat::Rgb8, vec![level; 4 * 4 * 3])
                .unwrap()
                .with_sequence(sequence);
            frames.push_back(frame);
        }
    }
    let recognizer = FnRecognizer::new(Symbology::DEFAULT_SET, |frame: &Frame| {
        let luma = frame.to_luma();
        let mean = luma.iter().map(|&v| v as usize).sum::<usize>() / luma.len();
        if mean > 128 {
            vec![Detection::text(Symbology::Qr, format!("bright-{}", frame.sequence()))]
        } else {
            Vec::new()
        }
    });
    let camera = Arc::clone(&state);
    let discovery = move || -> Option<Box<dyn CaptureDevice>> {
        Some(Box::new(ScriptedCamera {
            state: Arc::clone(&camera),
            fail_start: false,
        }))
    };
    let mut view = ScannerView::open(ScannerConfig::default(), &discovery, recognizer);
    let seen = record_results(&mut view, |_| false);

    view.flush();
    view.pump();
    assert_eq!(*seen.borrow(), vec!["bright-2"]);
}
