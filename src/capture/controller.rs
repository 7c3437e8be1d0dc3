use super::device::DeviceDiscovery;
use super::output::MetadataOutput;
use super::session::CaptureSession;
use crate::config::ScannerConfig;
use crate::dispatch::SerialQueue;
use crate::error::SetupError;
use crate::models::{Frame, ScanResult};
use crate::recognizer::Recognizer;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Running flag and generation packed into one word: `generation << 1 | running`.
///
/// Each transition is a single atomic update of both.
#[derive(Debug, Default)]
struct ScanState(AtomicU64);

impl ScanState {
    const RUNNING: u64 = 1;

    fn running_in(generation: u64) -> u64 {
        (generation << 1) | Self::RUNNING
    }

    fn is_running(&self) -> bool {
        self.0.load(Ordering::SeqCst) & Self::RUNNING != 0
    }

    /// Open a new running generation; `None` when already running.
    fn start(&self) -> Option<u64> {
        self.0
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |state| {
                (state & Self::RUNNING == 0).then(|| Self::running_in((state >> 1) + 1))
            })
            .ok()
            .map(|previous| (previous >> 1) + 1)
    }

    /// Close the running generation; `false` when not running.
    fn stop(&self) -> bool {
        self.0
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |state| {
                (state & Self::RUNNING != 0).then(|| ((state >> 1) + 1) << 1)
            })
            .is_ok()
    }

    fn is_current(&self, generation: u64) -> bool {
        self.0.load(Ordering::SeqCst) == Self::running_in(generation)
    }

    /// Clear the flag only if `generation` is still the running one.
    fn abandon(&self, generation: u64) -> bool {
        self.0
            .compare_exchange(
                Self::running_in(generation),
                generation << 1,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
    }
}

/// Drives a capture session on a background worker.
///
/// `start`/`stop` update the running flag on the calling thread and queue
/// the blocking device work on a serial worker. Each start opens a new
/// generation; a capture loop exits as soon as its generation is no longer
/// current, so a quick stop/start pair never leaves two loops pulling frames.
pub struct CaptureController {
    session: Arc<Mutex<CaptureSession>>,
    state: Arc<ScanState>,
    latest_frame: Arc<Mutex<Option<Frame>>>,
    results: Sender<Vec<ScanResult>>,
    worker: Option<SerialQueue>,
}

impl CaptureController {
    /// Unconfigured controller and the receiving end of its result channel.
    ///
    /// Each message holds the readable results of one frame.
    pub fn new() -> (Self, Receiver<Vec<ScanResult>>) {
        let (results, receiver) = mpsc::channel();
        let controller = Self {
            session: Arc::new(Mutex::new(CaptureSession::new())),
            state: Arc::new(ScanState::default()),
            latest_frame: Arc::new(Mutex::new(None)),
            results,
            worker: None,
        };
        (controller, receiver)
    }

    /// Attach the default device and a metadata output, then spawn the
    /// capture worker. Already configured controllers are left untouched.
    ///
    /// # Errors
    /// Any rejected step; the controller then stays unconfigured.
    pub fn configure<D>(
        &mut self,
        config: &ScannerConfig,
        discovery: &D,
        recognizer: Box<dyn Recognizer>,
    ) -> Result<(), SetupError>
    where
        D: DeviceDiscovery + ?Sized,
    {
        if self.worker.is_some() {
            return Ok(());
        }
        {
            let mut session = lock(&self.session);
            let device = discovery
                .default_video_device()
                .ok_or(SetupError::NoDevice)?;
            tracing::debug!(device = device.name(), "attaching capture input");
            session.add_input(device)?;
            session.add_output(MetadataOutput::new(recognizer))?;
            session
                .output_mut()
                .ok_or(SetupError::OutputRejected)?
                .set_symbologies(&config.symbologies)?;
        }
        self.worker = Some(SerialQueue::new(&config.worker_thread_name)?);
        Ok(())
    }

    /// Whether setup completed and scanning is possible
    pub fn is_configured(&self) -> bool {
        self.worker.is_some()
    }

    /// Requested running state
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Begin capturing. No-op when running or unconfigured.
    pub fn start(&self) {
        let Some(worker) = &self.worker else {
            tracing::debug!("start ignored: capture session is not configured");
            return;
        };
        let Some(generation) = self.state.start() else {
            return;
        };
        let capture = CaptureLoop {
            session: Arc::clone(&self.session),
            state: Arc::clone(&self.state),
            latest_frame: Arc::clone(&self.latest_frame),
            results: self.results.clone(),
            id: generation,
        };
        worker.dispatch(move || capture.run());
    }

    /// Halt capturing. No-op when not running.
    pub fn stop(&self) {
        let Some(worker) = &self.worker else {
            return;
        };
        if !self.state.stop() {
            return;
        }
        let session = Arc::clone(&self.session);
        worker.dispatch(move || {
            lock(&session).stop_running();
            tracing::debug!("capture stopped");
        });
    }

    /// Block until all capture work queued so far has finished.
    ///
    /// While running against a device whose stream never ends this waits
    /// until the capture is stopped from another thread.
    pub fn flush(&self) {
        if let Some(worker) = &self.worker {
            worker.barrier();
        }
    }

    /// Copy of the most recently captured frame
    pub fn latest_frame(&self) -> Option<Frame> {
        lock(&self.latest_frame).clone()
    }
}

impl Drop for CaptureController {
    fn drop(&mut self) {
        self.stop();
    }
}

struct CaptureLoop {
    session: Arc<Mutex<CaptureSession>>,
    state: Arc<ScanState>,
    latest_frame: Arc<Mutex<Option<Frame>>>,
    results: Sender<Vec<ScanResult>>,
    id: u64,
}

impl CaptureLoop {
    fn is_current(&self) -> bool {
        self.state.is_current(self.id)
    }

    fn run(self) {
        if !self.is_current() {
            return;
        }
        let mut session = lock(&self.session);
        if let Err(err) = session.start_running() {
            tracing::warn!(%err, "capture device failed to start");
            if !self.state.abandon(self.id) {
                tracing::debug!(generation = self.id, "failed start superseded by a newer request");
            }
            return;
        }
        tracing::debug!(generation = self.id, "capture started");

        while self.is_current() {
            match session.next_results() {
                Ok(Some((frame, results))) => {
                    *lock(&self.latest_frame) = Some(frame);
                    if results.is_empty() {
                        continue;
                    }
                    if self.results.send(results).is_err() {
                        tracing::debug!("result receiver dropped, ending capture");
                        break;
                    }
                }
                Ok(None) => {
                    tracing::debug!(generation = self.id, "capture stream ended");
                    break;
                }
                Err(err) => {
                    tracing::warn!(%err, "frame capture failed");
                    break;
                }
            }
        }
    }
}
