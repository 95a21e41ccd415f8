use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimerMode {
    /// Counts seconds up from zero.
    Stopwatch,
    /// Counts down from the given number of seconds.
    Countdown(u32),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    Tick(u32),
    /// The countdown reached zero. Sent once, and no ticks follow it.
    Finished,
}

/// Time keeping without any threads, advanced one second per [`Clock::tick`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Clock {
    mode: TimerMode,
    time: u32,
    finished: bool,
}

impl Clock {
    pub const fn new(mode: TimerMode) -> Self {
        let time = match mode {
            TimerMode::Stopwatch => 0,
            TimerMode::Countdown(seconds) => seconds,
        };
        Self {
            mode,
            time,
            finished: false,
        }
    }

    pub const fn mode(&self) -> TimerMode {
        self.mode
    }

    pub const fn time(&self) -> u32 {
        self.time
    }

    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advances one second. Returns `None` once a countdown has finished.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        if self.finished {
            return None;
        }
        match self.mode {
            TimerMode::Stopwatch => {
                self.time = self.time.saturating_add(1);
                Some(TimerEvent::Tick(self.time))
            }
            TimerMode::Countdown(_) => {
                self.time = self.time.saturating_sub(1);
                if self.time == 0 {
                    self.finished = true;
                    Some(TimerEvent::Finished)
                } else {
                    Some(TimerEvent::Tick(self.time))
                }
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.mode);
    }
}

type Callback = Arc<dyn Fn(TimerEvent) + Send + Sync>;

struct Ticker {
    task: JoinHandle<()>,
    cancelled: Arc<AtomicBool>,
}

/// Periodic ticker running as a task on the current tokio runtime.
///
/// Every period the clock advances and the callback gets the resulting event. `stop` and `reset` cancel at once: the
/// clock does not move after either returns.
pub struct Timer {
    clock: Arc<Mutex<Clock>>,
    period: Duration,
    on_event: Callback,
    ticker: Option<Ticker>,
}

impl Timer {
    pub const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

    pub fn new(mode: TimerMode, on_event: impl Fn(TimerEvent) + Send + Sync + 'static) -> Self {
        Self {
            clock: Arc::new(Mutex::new(Clock::new(mode))),
            period: Self::DEFAULT_PERIOD,
            on_event: Arc::new(on_event),
            ticker: None,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    fn clock(&self) -> MutexGuard<'_, Clock> {
        self.clock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn mode(&self) -> TimerMode {
        self.clock().mode()
    }

    pub fn get_time(&self) -> u32 {
        self.clock().time()
    }

    pub fn is_running(&self) -> bool {
        self.ticker
            .as_ref()
            .is_some_and(|ticker| !ticker.task.is_finished())
    }

    /// Starts ticking. Does nothing when already running, or when called outside a tokio runtime.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                log::error!("timer needs a tokio runtime: {}", err);
                return;
            }
        };

        let clock = Arc::clone(&self.clock);
        let on_event = Arc::clone(&self.on_event);
        let period = self.period;
        let cancelled = Arc::new(AtomicBool::new(false));
        let task_cancelled = Arc::clone(&cancelled);

        let first_tick = time::Instant::now() + period;
        let task = runtime.spawn(async move {
            let mut interval = time::interval_at(first_tick, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let event = {
                    let mut clock = clock.lock().unwrap_or_else(PoisonError::into_inner);
                    if task_cancelled.load(Ordering::Acquire) {
                        break;
                    }
                    clock.tick()
                };
                let Some(event) = event else {
                    break;
                };
                on_event(event);
                if event == TimerEvent::Finished {
                    break;
                }
            }
        });

        log::debug!("timer started in {:?}", self.mode());
        self.ticker = Some(Ticker { task, cancelled });
    }

    /// Stops ticking. Safe to call any number of times.
    pub fn stop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            // a tick running on another worker checks this under the clock lock
            let clock = self.clock();
            ticker.cancelled.store(true, Ordering::Release);
            drop(clock);
            ticker.task.abort();
            log::debug!("timer stopped at {}", self.get_time());
        }
    }

    /// Stops ticking and rewinds to the start of the current mode.
    pub fn reset(&mut self) {
        self.stop();
        self.clock().reset();
    }

    /// Stops ticking and switches to `mode`, rewound.
    pub fn set_mode(&mut self, mode: TimerMode) {
        self.stop();
        *self.clock() = Clock::new(mode);
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// `m:ss` display of a number of seconds, or `-` when there is none.
pub fn format_time(seconds: Option<u32>) -> String {
    match seconds {
        Some(seconds) => format!("{}:{:02}", seconds / 60, seconds % 60),
        None => "-".to_owned(),
    }
}
