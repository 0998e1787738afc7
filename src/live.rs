//! Live refresh: recompute the snapshot once per interval while it is shown.
//!
//! All passes run on the task that owns the [`LiveClock`]. Timers only post a
//! [`Trigger::Tick`] back to that task, so a pass never overlaps another one.
//! At most one timer is pending at a time: every pass cancels the previous
//! timer before doing anything else, and only a successful pass arms a new
//! one.

use std::time::Duration;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::AbortHandle;
use tracing::{debug, trace};

use crate::clock::Clock;
use crate::error::InputError;
use crate::input::BirthInput;
use crate::snapshot::Snapshot;

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

/// Deferred, cancelable callbacks.
pub trait Scheduler {
    type Handle;

    /// Run `callback` once after `delay`.
    fn schedule<F>(&mut self, delay: Duration, callback: F) -> Self::Handle
    where
        F: FnOnce() + Send + 'static;

    /// Prevent a scheduled callback from running. Canceling a callback
    /// that already ran is a no-op.
    fn cancel(&mut self, handle: Self::Handle);
}

/// Timers backed by tasks on the current tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    type Handle = AbortHandle;

    fn schedule<F>(&mut self, delay: Duration, callback: F) -> AbortHandle
    where
        F: FnOnce() + Send + 'static,
    {
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        })
        .abort_handle()
    }

    fn cancel(&mut self, handle: AbortHandle) {
        handle.abort();
    }
}

/// What starts a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// The user submitted or edited the birth details.
    Input(BirthInput),
    /// A timer armed by the pass with this generation fired.
    Tick(u64),
}

/// Outcome of one pass, handed to the renderer.
#[derive(Debug, Clone)]
pub enum Pass {
    Computed(Box<Snapshot>),
    Rejected(InputError),
}

/// Owner of the current input and of the pending refresh timer.
pub struct LiveClock<S: Scheduler, C: Clock> {
    scheduler: S,
    clock: C,
    interval: Duration,
    triggers: UnboundedSender<Trigger>,
    input: Option<BirthInput>,
    pending: Option<S::Handle>,
    generation: u64,
}

impl<S: Scheduler, C: Clock> LiveClock<S, C> {
    /// Ticks are posted to `triggers`; feed its receiver to [`drive`].
    pub fn new(scheduler: S, clock: C, triggers: UnboundedSender<Trigger>) -> Self {
        Self {
            scheduler,
            clock,
            interval: DEFAULT_INTERVAL,
            triggers,
            input: None,
            pending: None,
            generation: 0,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn input(&self) -> Option<&BirthInput> {
        self.input.as_ref()
    }

    /// Whether a refresh is scheduled.
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    #[cfg(test)]
    fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// React to a trigger. Ticks from a superseded timer are dropped and
    /// yield no pass.
    pub fn handle(&mut self, trigger: Trigger) -> Option<Pass> {
        match trigger {
            Trigger::Input(input) => {
                self.input = Some(input);
                self.pass()
            }
            Trigger::Tick(generation) if generation == self.generation => self.pass(),
            Trigger::Tick(generation) => {
                trace!(generation, current = self.generation, "dropping stale tick");
                None
            }
        }
    }

    /// Stop refreshing without forgetting the input.
    pub fn stop(&mut self) {
        self.cancel_pending();
        self.generation = self.generation.wrapping_add(1);
    }

    fn pass(&mut self) -> Option<Pass> {
        self.stop();
        let input = self.input.as_ref()?;

        match Snapshot::take(input, &self.clock) {
            Ok(snapshot) => {
                debug!(now = %snapshot.now(), generation = self.generation, "computed snapshot");
                self.arm();
                Some(Pass::Computed(Box::new(snapshot)))
            }
            Err(err) => {
                debug!(%err, "input rejected, live refresh stopped");
                Some(Pass::Rejected(err))
            }
        }
    }

    fn arm(&mut self) {
        let generation = self.generation;
        let triggers = self.triggers.clone();
        let handle = self.scheduler.schedule(self.interval, move || {
            // The receiver is gone only when the clock is being torn down.
            let _ = triggers.send(Trigger::Tick(generation));
        });
        trace!(generation, interval = ?self.interval, "armed refresh timer");
        self.pending = Some(handle);
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
            trace!(generation = self.generation, "cancelled refresh timer");
        }
    }
}

impl<S: Scheduler, C: Clock> Drop for LiveClock<S, C> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

/// Feed triggers to `clock` and every resulting pass to `render`, until the
/// trigger channel closes.
pub async fn drive<S, C, F>(
    clock: &mut LiveClock<S, C>,
    triggers: &mut UnboundedReceiver<Trigger>,
    mut render: F,
) where
    S: Scheduler,
    C: Clock,
    F: FnMut(&Pass),
{
    while let Some(trigger) = triggers.recv().await {
        if let Some(pass) = clock.handle(trigger) {
            render(&pass);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{DateTime, TimeZone, Utc};
    use tokio::sync::mpsc;

    type Callback = Box<dyn FnOnce() + Send>;

    struct Timer {
        delay: Duration,
        callback: Option<Callback>,
        cancelled: bool,
    }

    #[derive(Default)]
    struct ManualScheduler {
        timers: Vec<Timer>,
    }

    impl ManualScheduler {
        fn fire(&mut self, handle: usize) {
            if let Some(callback) = self.timers[handle].callback.take() {
                callback();
            }
        }

        fn waiting(&self) -> Vec<usize> {
            (0..self.timers.len())
                .filter(|&i| !self.timers[i].cancelled && self.timers[i].callback.is_some())
                .collect()
        }
    }

    impl Scheduler for ManualScheduler {
        type Handle = usize;

        fn schedule<F>(&mut self, delay: Duration, callback: F) -> usize
        where
            F: FnOnce() + Send + 'static,
        {
            self.timers.push(Timer {
                delay,
                callback: Some(Box::new(callback)),
                cancelled: false,
            });
            self.timers.len() - 1
        }

        fn cancel(&mut self, handle: usize) {
            self.timers[handle].cancelled = true;
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 24, 12, 0, 0).unwrap()
    }

    fn valid() -> BirthInput {
        BirthInput::new("2000-06-20").with_timezone("UTC")
    }

    fn setup() -> (
        LiveClock<ManualScheduler, FixedClock>,
        UnboundedReceiver<Trigger>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        (LiveClock::new(ManualScheduler::default(), FixedClock(now()), tx), rx)
    }

    #[test]
    fn input_pass_arms_one_timer() {
        let (mut live, _rx) = setup();
        let pass = live.handle(Trigger::Input(valid())).unwrap();

        assert!(matches!(pass, Pass::Computed(_)));
        assert!(live.is_armed());
        assert_eq!(live.scheduler_mut().waiting(), vec![0]);
        assert_eq!(live.scheduler_mut().timers[0].delay, DEFAULT_INTERVAL);
    }

    #[test]
    fn tick_recomputes_and_rearms() {
        let (mut live, mut rx) = setup();
        live.handle(Trigger::Input(valid()));

        for round in 0..3 {
            let handle = live.scheduler_mut().waiting()[0];
            live.scheduler_mut().fire(handle);
            let tick = rx.try_recv().unwrap();
            assert!(matches!(tick, Trigger::Tick(_)));

            let pass = live.handle(tick).unwrap();
            assert!(matches!(pass, Pass::Computed(_)), "round {round}");
            assert_eq!(live.scheduler_mut().waiting().len(), 1);
        }
        assert_eq!(live.scheduler_mut().timers.len(), 4);
    }

    #[test]
    fn new_input_cancels_pending_timer() {
        let (mut live, _rx) = setup();
        live.handle(Trigger::Input(valid()));
        live.handle(Trigger::Input(valid().with_time("10:00")));

        let scheduler = live.scheduler_mut();
        assert!(scheduler.timers[0].cancelled);
        assert_eq!(scheduler.waiting(), vec![1]);
        assert_eq!(live.input().unwrap().time.as_deref(), Some("10:00"));
    }

    #[test]
    fn rejected_input_stops_the_loop() {
        let (mut live, _rx) = setup();
        live.handle(Trigger::Input(valid()));

        let pass = live.handle(Trigger::Input(BirthInput::new(""))).unwrap();
        assert!(matches!(pass, Pass::Rejected(InputError::MissingDate)));
        assert!(!live.is_armed());
        assert!(live.scheduler_mut().waiting().is_empty());

        let pass = live
            .handle(Trigger::Input(BirthInput::new("2099-01-01").with_timezone("UTC")))
            .unwrap();
        assert!(matches!(pass, Pass::Rejected(InputError::FutureBirth { .. })));
        assert!(!live.is_armed());
    }

    #[test]
    fn valid_input_restarts_after_rejection() {
        let (mut live, mut rx) = setup();
        live.handle(Trigger::Input(valid()));
        live.handle(Trigger::Input(BirthInput::new("2000-13-40")));
        assert!(!live.is_armed());

        let pass = live.handle(Trigger::Input(valid())).unwrap();
        assert!(matches!(pass, Pass::Computed(_)));
        assert!(live.is_armed());
        let waiting = live.scheduler_mut().waiting();
        assert_eq!(waiting, vec![1]);

        live.scheduler_mut().fire(waiting[0]);
        let tick = rx.try_recv().unwrap();
        let pass = live.handle(tick).unwrap();
        assert!(matches!(pass, Pass::Computed(_)));
        assert!(live.is_armed());
        assert_eq!(live.scheduler_mut().waiting(), vec![2]);
    }

    #[test]
    fn stale_tick_is_dropped() {
        let (mut live, mut rx) = setup();
        live.handle(Trigger::Input(valid()));
        live.handle(Trigger::Input(valid()));

        // The first timer fires even though it was already cancelled.
        live.scheduler_mut().fire(0);
        let stale = rx.try_recv().unwrap();
        assert!(live.handle(stale).is_none());
        assert_eq!(live.scheduler_mut().waiting(), vec![1]);

        live.scheduler_mut().fire(1);
        let fresh = rx.try_recv().unwrap();
        assert!(live.handle(fresh).is_some());
    }

    #[test]
    fn tick_after_rejection_is_dropped() {
        let (mut live, mut rx) = setup();
        live.handle(Trigger::Input(valid()));
        live.handle(Trigger::Input(BirthInput::new("bogus")));

        live.scheduler_mut().fire(0);
        let stale = rx.try_recv().unwrap();
        assert!(live.handle(stale).is_none());
        assert!(!live.is_armed());
    }

    #[test]
    fn stop_cancels_without_forgetting_input() {
        let (mut live, _rx) = setup();
        live.handle(Trigger::Input(valid()));
        live.stop();

        assert!(!live.is_armed());
        assert!(live.scheduler_mut().waiting().is_empty());
        assert_eq!(live.input(), Some(&valid()));
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_scheduler_ticks_every_interval() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut live = LiveClock::new(TokioScheduler, FixedClock(now()), tx.clone());
        tx.send(Trigger::Input(valid())).unwrap();

        let mut passes = 0;
        let outcome = tokio::time::timeout(
            Duration::from_millis(3_500),
            drive(&mut live, &mut rx, |pass| {
                assert!(matches!(pass, Pass::Computed(_)));
                passes += 1;
            }),
        )
        .await;

        assert!(outcome.is_err(), "drive only ends when the channel closes");
        assert_eq!(passes, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_scheduler_cancel_prevents_tick() {
        let (tx, mut rx) = mpsc::unbounded_channel::<Trigger>();
        let mut scheduler = TokioScheduler;
        let handle = scheduler.schedule(Duration::from_millis(100), move || {
            let _ = tx.send(Trigger::Tick(7));
        });
        scheduler.cancel(handle);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
    }
}
