//! Hand-tracking sources: real hardware, a simulated hand and replay.
//!
//! A [`TrackingSource`] is opened on its own thread and turned into a
//! [`FrameStream`]; frames are delivered to the animation loop over a
//! channel. The loop never blocks on tracking: it calls
//! [`TrackingHandle::drain`] once per tick and gets whatever arrived, in
//! order.
//!
//! Start-up is explicit and bounded:
//!
//! ```text
//!   TrackingHandle::start(source, timeout)
//!       ├─ Ready(handle)     device opened, frames flowing
//!       ├─ Failed(reason)    device refused (missing, permission denied…)
//!       └─ TimedOut          no answer within `timeout`; the thread is told to stop
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::TrackingError;
use crate::landmarks::HandFrame;

// ════════════════════════════════════════════════════════════════════════════
// TrackingSource / FrameStream
// ════════════════════════════════════════════════════════════════════════════

/// Something that can be opened into a stream of hand frames.
pub trait TrackingSource: Send + 'static {
    /// Open the device. Runs on the tracking thread and may block.
    fn connect(self: Box<Self>) -> Result<Box<dyn FrameStream>, TrackingError>;

    fn name(&self) -> &'static str;
}

/// An opened source. Lives on the tracking thread only.
pub trait FrameStream {
    /// Block until the next tracking callback. `Ok(None)` means the callback
    /// saw no hand; `Err` ends the stream.
    fn next_frame(&mut self) -> Result<Option<HandFrame>, TrackingError>;
}

// ════════════════════════════════════════════════════════════════════════════
// TrackingHandle
// ════════════════════════════════════════════════════════════════════════════

pub enum InitOutcome {
    Ready(TrackingHandle),
    Failed(TrackingError),
    TimedOut,
}

impl std::fmt::Debug for InitOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InitOutcome::Ready(h)  => write!(f, "Ready({})", h.name),
            InitOutcome::Failed(e) => write!(f, "Failed({})", e),
            InitOutcome::TimedOut  => f.write_str("TimedOut"),
        }
    }
}

/// Running tracking thread.
pub struct TrackingHandle {
    name:    &'static str,
    rx:      Receiver<Option<HandFrame>>,
    stop:    Arc<AtomicBool>,
    stopped: bool,
}

impl TrackingHandle {
    /// Spawn `source` on its own thread and wait up to `timeout` for it to
    /// open.
    pub fn start<S: TrackingSource>(source: S, timeout: Duration) -> InitOutcome {
        let name = source.name();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), TrackingError>>();
        let (frame_tx, frame_rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);

        thread::spawn(move || tracking_thread(Box::new(source), ready_tx, frame_tx, thread_stop));

        match ready_rx.recv_timeout(timeout) {
            Ok(Ok(())) => {
                info!(source = name, "tracking ready");
                InitOutcome::Ready(TrackingHandle { name, rx: frame_rx, stop, stopped: false })
            }
            Ok(Err(e)) => {
                warn!(source = name, error = %e, "tracking failed to start");
                InitOutcome::Failed(e)
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(source = name, ?timeout, "tracking start timed out");
                stop.store(true, Ordering::SeqCst);
                InitOutcome::TimedOut
            }
            Err(RecvTimeoutError::Disconnected) => {
                InitOutcome::Failed(TrackingError::Unavailable(format!("{} exited during start-up", name)))
            }
        }
    }

    /// All frames received since the last drain, oldest first. Always empty
    /// after [`stop`](Self::stop).
    pub fn drain(&self) -> Vec<Option<HandFrame>> {
        if self.stopped { return Vec::new(); }
        let mut out = Vec::new();
        while let Ok(f) = self.rx.try_recv() { out.push(f); }
        out
    }

    /// Stop the source. Frames already queued are discarded.
    pub fn stop(&mut self) {
        if self.stopped { return; }
        self.stopped = true;
        self.stop.store(true, Ordering::SeqCst);
        while self.rx.try_recv().is_ok() {}
        debug!(source = self.name, "tracking stopped");
    }

    pub fn is_running(&self) -> bool { !self.stopped }
    pub fn name(&self) -> &'static str { self.name }
}

impl Drop for TrackingHandle {
    fn drop(&mut self) { self.stop.store(true, Ordering::SeqCst); }
}

fn tracking_thread(
    source:   Box<dyn TrackingSource>,
    ready_tx: Sender<Result<(), TrackingError>>,
    frame_tx: Sender<Option<HandFrame>>,
    stop:     Arc<AtomicBool>,
) {
    let name = source.name();
    let mut stream = match source.connect() {
        Ok(s) => s,
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };
    if ready_tx.send(Ok(())).is_err() || stop.load(Ordering::SeqCst) {
        return;
    }

    loop {
        let frame = stream.next_frame();
        if stop.load(Ordering::SeqCst) { return; }
        match frame {
            Ok(f) => {
                if frame_tx.send(f).is_err() { return; }
            }
            Err(e) => {
                info!(source = name, reason = %e, "tracking stream ended");
                return;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimTrackingSource — simulated hand driven from the window (always available)
// ════════════════════════════════════════════════════════════════════════════

/// State of the simulated hand as set by mouse and keyboard.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimHand {
    pub present:  bool,
    /// Middle-finger base position, normalised.
    pub x:        f32,
    pub y:        f32,
    /// Extended digits, thumb first.
    pub extended: [bool; 5],
}

impl Default for SimHand {
    fn default() -> Self {
        SimHand { present: false, x: 0.5, y: 0.5, extended: [true; 5] }
    }
}

/// Emits a synthetic frame for the latest [`SimHand`] at a fixed rate,
/// roughly the cadence of a camera-based tracker.
pub struct SimTrackingSource {
    pub rx:       Receiver<SimHand>,
    pub interval: Duration,
}

impl SimTrackingSource {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(50);

    pub fn new(rx: Receiver<SimHand>) -> Self {
        SimTrackingSource { rx, interval: Self::DEFAULT_INTERVAL }
    }
}

struct SimStream {
    rx:       Receiver<SimHand>,
    interval: Duration,
    hand:     SimHand,
}

impl TrackingSource for SimTrackingSource {
    fn connect(self: Box<Self>) -> Result<Box<dyn FrameStream>, TrackingError> {
        Ok(Box::new(SimStream { rx: self.rx, interval: self.interval, hand: SimHand::default() }))
    }

    fn name(&self) -> &'static str { "simulated" }
}

impl FrameStream for SimStream {
    fn next_frame(&mut self) -> Result<Option<HandFrame>, TrackingError> {
        thread::sleep(self.interval);
        // Last writer wins.
        loop {
            match self.rx.try_recv() {
                Ok(h) => self.hand = h,
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return Err(TrackingError::Disconnected),
            }
        }
        let h = self.hand;
        Ok(h.present.then(|| HandFrame::synthetic(h.x, h.y, h.extended)))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ReplayTrackingSource — fixed recording
// ════════════════════════════════════════════════════════════════════════════

/// Plays back a fixed list of callbacks, then disconnects.
pub struct ReplayTrackingSource {
    frames:   VecDeque<Option<HandFrame>>,
    interval: Duration,
}

impl ReplayTrackingSource {
    pub fn new<I: IntoIterator<Item = Option<HandFrame>>>(frames: I, interval: Duration) -> Self {
        ReplayTrackingSource { frames: frames.into_iter().collect(), interval }
    }
}

impl TrackingSource for ReplayTrackingSource {
    fn connect(self: Box<Self>) -> Result<Box<dyn FrameStream>, TrackingError> {
        Ok(self)
    }

    fn name(&self) -> &'static str { "replay" }
}

impl FrameStream for ReplayTrackingSource {
    fn next_frame(&mut self) -> Result<Option<HandFrame>, TrackingError> {
        if !self.interval.is_zero() { thread::sleep(self.interval); }
        self.frames.pop_front().ok_or(TrackingError::Disconnected)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapTrackingSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// LeapMotion controller projected onto the 21-landmark layout.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// Joints are projected top-down: Leap x → image x, Leap height → image y,
/// over a fixed interaction box above the device.
#[cfg(feature = "leap")]
pub struct LeapTrackingSource;

#[cfg(feature = "leap")]
struct LeapStream {
    connection: leaprs::Connection,
}

#[cfg(feature = "leap")]
impl TrackingSource for LeapTrackingSource {
    fn connect(self: Box<Self>) -> Result<Box<dyn FrameStream>, TrackingError> {
        use leaprs::{Connection, ConnectionConfig};

        let mut connection = Connection::create(ConnectionConfig::default())
            .map_err(|e| TrackingError::Unavailable(format!("LeapC connection: {:?}", e)))?;
        connection.open()
            .map_err(|e| TrackingError::Unavailable(format!("LeapMotion device: {:?}", e)))?;
        Ok(Box::new(LeapStream { connection }))
    }

    fn name(&self) -> &'static str { "leapmotion" }
}

#[cfg(feature = "leap")]
impl FrameStream for LeapStream {
    fn next_frame(&mut self) -> Result<Option<HandFrame>, TrackingError> {
        use leaprs::Event;

        // Interaction box, millimetres.
        const HALF_WIDTH: f32 = 200.0;
        const FLOOR:      f32 = 100.0;
        const HEIGHT:     f32 = 300.0;

        let project = |x: f32, y: f32| (
            0.5 + x / (2.0 * HALF_WIDTH),
            1.0 - (y - FLOOR) / HEIGHT,
        );

        loop {
            // A poll timeout is a callback without a hand.
            let msg = match self.connection.poll(100) {
                Ok(m)  => m,
                Err(_) => return Ok(None),
            };
            let Event::Tracking(frame) = msg.event() else { continue };
            let Some(hand) = frame.hands().next() else { return Ok(None) };

            // Wrist, then four joints per digit from thumb to pinky.
            let digits: Vec<_> = hand.digits().collect();
            let mut raw = Vec::with_capacity(1 + digits.len() * 4);
            if let Some(middle) = digits.get(2) {
                let w = middle.metacarpal().prev_joint();
                raw.push(project(w.x, w.y));
            }
            for digit in &digits {
                for p in [
                    digit.proximal().prev_joint(),
                    digit.intermediate().prev_joint(),
                    digit.distal().prev_joint(),
                    digit.distal().next_joint(),
                ] {
                    raw.push(project(p.x, p.y));
                }
            }

            return match HandFrame::from_points(&raw) {
                Ok(f)  => Ok(Some(f)),
                Err(e) => {
                    debug!(error = %e, "dropping partial leap hand");
                    Ok(None)
                }
            };
        }
    }
}
