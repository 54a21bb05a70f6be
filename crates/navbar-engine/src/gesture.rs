//! Pointer gesture classification.
//!
//! A [`GestureDetector`] watches the raw pointer stream of one interactive
//! element and turns each physical sequence into at most one of tap, hold or
//! double-tap:
//!
//! - pointer-down starts a hold timer when a hold action is bound
//! - moving further than the threshold cancels the hold timer
//! - pointer-up inside the double-tap window of a previous tap on the same
//!   target is a double-tap, and cancels that tap if it is still deferred
//! - pointer-up after the hold timer fired is a hold (or nothing, if the hold
//!   was already dispatched by the timer); with no hold action bound by then
//!   it is classified like a short press
//! - any other pointer-up is a tap, deferred by the double-tap window when a
//!   double-tap action is bound
//!
//! Bindings are re-read from the sink on every pointer-down and pointer-up, so
//! a detector follows configuration changes without being re-attached.

use std::{
    sync::{
        Arc, Weak,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use navbar_protocol::{GestureKind, TargetId};
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::timer::Timers;

/// Time a pointer must stay down before it counts as a hold.
pub const HOLD_DELAY: Duration = Duration::from_millis(500);
/// Maximum gap between two taps that form a double-tap.
pub const DOUBLE_TAP_WINDOW: Duration = Duration::from_millis(250);
/// Movement, in pixels along either axis, that turns a press into a drag.
pub const MOVE_THRESHOLD: f64 = 10.0;

/// Timing parameters for classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureTiming {
    /// Press duration that makes a hold.
    pub hold: Duration,
    /// Maximum gap between the taps of a double-tap.
    pub double_tap_window: Duration,
    /// Movement in pixels that cancels a hold.
    pub move_threshold: f64,
}

impl Default for GestureTiming {
    fn default() -> Self {
        Self {
            hold: HOLD_DELAY,
            double_tap_window: DOUBLE_TAP_WINDOW,
            move_threshold: MOVE_THRESHOLD,
        }
    }
}

/// Which gestures have something bound to them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GestureBindings {
    /// A tap action exists.
    pub tap: bool,
    /// A hold action exists; without one no hold timer runs.
    pub hold: bool,
    /// A double-tap action exists; taps are deferred while one could follow.
    pub double_tap: bool,
}

/// When a recognised hold is dispatched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HoldMode {
    /// At pointer-up, like taps and double-taps.
    #[default]
    OnRelease,
    /// As soon as the hold timer fires.
    OnTimer,
}

/// Pointer position in element coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    /// Horizontal offset.
    pub x: f64,
    /// Vertical offset.
    pub y: f64,
}

impl Point {
    /// Point at `(x, y)`.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Receiver of classified gestures.
pub trait GestureSink: Send + Sync + 'static {
    /// Handle one classified gesture.
    fn dispatch(&self, gesture: GestureKind, target: &TargetId);

    /// Bindings currently in effect, when the sink tracks them. `None` keeps
    /// whatever the detector was given.
    fn bindings(&self) -> Option<GestureBindings> {
        None
    }
}

impl<F> GestureSink for F
where
    F: Fn(GestureKind, &TargetId) + Send + Sync + 'static,
{
    fn dispatch(&self, gesture: GestureKind, target: &TargetId) {
        self(gesture, target)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Slot {
    Hold,
    PendingTap(TargetId),
}

/// Transient state of the current pointer sequence.
#[derive(Debug, Default)]
struct GestureSession {
    start: Option<Point>,
    target: Option<TargetId>,
    hold_triggered: bool,
    last_tap: Option<(Instant, TargetId)>,
}

struct Inner {
    bindings: Mutex<GestureBindings>,
    timing: GestureTiming,
    hold_mode: HoldMode,
    session: Mutex<GestureSession>,
    timers: Timers<Slot>,
    sink: Arc<dyn GestureSink>,
    detached: AtomicBool,
}

impl Inner {
    fn emit(&self, gesture: GestureKind, target: &TargetId) {
        if self.detached.load(Ordering::SeqCst) {
            return;
        }
        debug!(%gesture, %target, "gesture");
        self.sink.dispatch(gesture, target);
    }

    /// Bindings from the sink when it supplies them, else the stored ones.
    fn refresh_bindings(&self) -> GestureBindings {
        let current = self.sink.bindings();
        let mut bindings = self.bindings.lock();
        if let Some(current) = current {
            *bindings = current;
        }
        *bindings
    }

    fn on_hold_timer(&self) {
        if !self.refresh_bindings().hold {
            trace!("hold_unbound");
            return;
        }
        let target = {
            let mut s = self.session.lock();
            s.hold_triggered = true;
            s.target.clone()
        };
        trace!("hold_triggered");
        if self.hold_mode == HoldMode::OnTimer
            && let Some(target) = target
        {
            self.emit(GestureKind::Hold, &target);
        }
    }
}

/// Classifies the pointer stream of one element into gestures.
///
/// Dropping the detector detaches it.
pub struct GestureDetector {
    inner: Arc<Inner>,
}

impl GestureDetector {
    /// Detector reporting to `sink`, starting from `bindings`.
    pub fn new(
        bindings: GestureBindings,
        timing: GestureTiming,
        hold_mode: HoldMode,
        sink: impl GestureSink,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                bindings: Mutex::new(bindings),
                timing,
                hold_mode,
                session: Mutex::new(GestureSession::default()),
                timers: Timers::new(),
                sink: Arc::new(sink),
                detached: AtomicBool::new(false),
            }),
        }
    }

    /// Current bindings.
    pub fn bindings(&self) -> GestureBindings {
        *self.inner.bindings.lock()
    }

    /// Replace the bindings. A sink that supplies its own bindings overrides
    /// them at the next pointer event.
    pub fn set_bindings(&self, bindings: GestureBindings) {
        *self.inner.bindings.lock() = bindings;
    }

    /// True while a hold timer is pending.
    pub fn hold_pending(&self) -> bool {
        self.inner.timers.is_active(&Slot::Hold)
    }

    /// Start a press on `target`.
    pub fn pointer_down(&self, target: &TargetId, at: Point) {
        if self.is_detached() {
            return;
        }
        let bindings = self.inner.refresh_bindings();
        {
            let mut s = self.inner.session.lock();
            s.start = Some(at);
            s.target = Some(target.clone());
            s.hold_triggered = false;
        }
        if bindings.hold {
            let weak: Weak<Inner> = Arc::downgrade(&self.inner);
            self.inner.timers.start(Slot::Hold, self.inner.timing.hold, move || {
                if let Some(inner) = weak.upgrade() {
                    inner.on_hold_timer();
                }
            });
        }
    }

    /// Track movement of the pressed pointer.
    pub fn pointer_move(&self, at: Point) {
        if !self.hold_pending() {
            return;
        }
        let start = self.inner.session.lock().start;
        if let Some(start) = start {
            let threshold = self.inner.timing.move_threshold;
            if (at.x - start.x).abs() > threshold || (at.y - start.y).abs() > threshold {
                trace!("hold_cancelled_by_move");
                self.inner.timers.cancel(&Slot::Hold);
            }
        }
    }

    /// Release the press and classify it.
    pub fn pointer_up(&self, target: &TargetId) {
        if self.is_detached() {
            return;
        }
        let inner = &self.inner;
        inner.timers.cancel(&Slot::Hold);
        let bindings = inner.refresh_bindings();
        let now = Instant::now();

        let mut s = inner.session.lock();
        s.start = None;

        let is_double = bindings.double_tap
            && s.last_tap.as_ref().is_some_and(|(at, last)| {
                last == target && now.duration_since(*at) < inner.timing.double_tap_window
            });
        if is_double {
            inner.timers.cancel(&Slot::PendingTap(target.clone()));
            s.last_tap = None;
            s.hold_triggered = false;
            drop(s);
            inner.emit(GestureKind::DoubleTap, target);
            return;
        }

        if std::mem::take(&mut s.hold_triggered) {
            match inner.hold_mode {
                // Already dispatched when the timer fired.
                HoldMode::OnTimer => {
                    s.last_tap = None;
                    return;
                }
                HoldMode::OnRelease if bindings.hold => {
                    s.last_tap = None;
                    drop(s);
                    inner.emit(GestureKind::Hold, target);
                    return;
                }
                HoldMode::OnRelease => trace!("hold_unbound_on_release"),
            }
        }

        s.last_tap = Some((now, target.clone()));
        drop(s);
        if !bindings.tap {
            return;
        }
        if bindings.double_tap {
            let weak = Arc::downgrade(inner);
            let tap_target = target.clone();
            inner.timers.start(
                Slot::PendingTap(target.clone()),
                inner.timing.double_tap_window,
                move || {
                    if let Some(inner) = weak.upgrade() {
                        inner.emit(GestureKind::Tap, &tap_target);
                    }
                },
            );
        } else {
            inner.emit(GestureKind::Tap, target);
        }
    }

    /// The platform took the pointer away; abandon any hold in progress.
    pub fn pointer_cancel(&self) {
        self.abandon_press();
    }

    /// The pointer left the element; abandon any hold in progress.
    pub fn pointer_leave(&self) {
        self.abandon_press();
    }

    /// Stop classifying and cancel every timer.
    pub fn detach(&self) {
        if self.inner.detached.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.timers.cancel_all();
        *self.inner.session.lock() = GestureSession::default();
        trace!("gesture_detector_detached");
    }

    /// True once [`detach`](Self::detach) ran.
    pub fn is_detached(&self) -> bool {
        self.inner.detached.load(Ordering::SeqCst)
    }

    fn abandon_press(&self) {
        self.inner.timers.cancel(&Slot::Hold);
        let mut s = self.inner.session.lock();
        s.start = None;
        s.hold_triggered = false;
    }
}

impl Drop for GestureDetector {
    fn drop(&mut self) {
        self.detach();
    }
}
