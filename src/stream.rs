//! The pieces a long streaming pass needs from whoever drives it.
//!
//! A pass reports progress and advisories to a [Host], gives the host a chance to breathe through
//! a [Suspend] strategy, and stops early when its [CancellationToken] is cancelled. A [Context]
//! bundles the three together with the cadence at which they are consulted:
//!
//! ```
//! use lasband::stream::{CancellationToken, Context, LogHost, YieldNow};
//! let mut host = LogHost;
//! let token = CancellationToken::new();
//! let context = Context::new(&mut host)
//!     .with_suspend(YieldNow)
//!     .with_cancellation(token.clone())
//!     .with_progress_interval(1_000_000);
//! assert_eq!(2_000_000, context.suspend_interval());
//! ```

use crate::{Error, Result};
use log::{log, Level};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Points between two progress reports.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 5_000_000;

const MIB: usize = 1024 * 1024;

/// Files up to this size are read into memory in one go.
pub const DEFAULT_BUFFERED_THRESHOLD: u64 = 300 * MIB as u64;

/// Target size of one window of a chunked read.
pub const DEFAULT_INPUT_CHUNK_BYTES: usize = 100 * MIB;

/// Windows larger than this are read back to back, without suspending in between.
pub const PAUSE_LIMIT_BYTES: usize = 500 * MIB;

/// Target size of one sealed output chunk.
pub const DEFAULT_OUTPUT_CHUNK_BYTES: usize = 52 * MIB;

/// Receives progress and log messages from a streaming pass.
///
/// Both methods are fire-and-forget and default to doing nothing.
pub trait Host {
    /// Called every progress interval, and once more at the end of a pass.
    fn progress(&mut self, _done: u64, _total: u64) {}

    /// Called with human-readable messages, warnings included.
    fn log(&mut self, _message: &str) {}
}

impl Host for () {}

/// A host that forwards everything to the `log` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogHost;

impl Host for LogHost {
    fn progress(&mut self, done: u64, total: u64) {
        log!(Level::Debug, "processed {}/{} points", done, total);
    }

    fn log(&mut self, message: &str) {
        log!(Level::Info, "{}", message);
    }
}

/// A point at which a streaming pass may hand control back to its host.
pub trait Suspend {
    /// Suspends, however briefly the strategy sees fit.
    fn suspend(&mut self);
}

/// Never suspends. The right choice for command-line and server use.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSuspend;

impl Suspend for NoSuspend {
    fn suspend(&mut self) {}
}

/// Yields the current thread's time slice at every suspension point.
#[derive(Clone, Copy, Debug, Default)]
pub struct YieldNow;

impl Suspend for YieldNow {
    fn suspend(&mut self) {
        std::thread::yield_now();
    }
}

/// A shared flag that asks an in-flight pass to stop.
///
/// Clones share the flag, so one can be handed to another thread (or a signal handler) while the
/// pass holds the other.
///
/// # Examples
///
/// ```
/// use lasband::stream::CancellationToken;
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// assert!(token.check().is_ok());
/// handle.cancel();
/// assert!(token.check().is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> CancellationToken {
        CancellationToken::default()
    }

    /// Cancels every pass watching this token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Has this token been cancelled?
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Returns [Error::Cancelled] if this token has been cancelled.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Everything a streaming pass consults besides its data.
#[allow(missing_debug_implementations)]
pub struct Context<'a> {
    host: &'a mut dyn Host,
    suspend: Box<dyn Suspend + 'a>,
    cancellation: CancellationToken,
    progress_interval: u64,
    suspend_interval: Option<u64>,
}

impl<'a> Context<'a> {
    /// Creates a context that reports to `host`, never suspends, and can't be cancelled from
    /// outside.
    pub fn new(host: &'a mut dyn Host) -> Context<'a> {
        Context {
            host,
            suspend: Box::new(NoSuspend),
            cancellation: CancellationToken::new(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            suspend_interval: None,
        }
    }

    /// Sets the suspension strategy.
    pub fn with_suspend<S: Suspend + 'a>(mut self, suspend: S) -> Context<'a> {
        self.suspend = Box::new(suspend);
        self
    }

    /// Sets the cancellation token.
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Context<'a> {
        self.cancellation = cancellation;
        self
    }

    /// Sets the number of points between progress reports.
    ///
    /// Zero is treated as one.
    pub fn with_progress_interval(mut self, progress_interval: u64) -> Context<'a> {
        self.progress_interval = progress_interval.max(1);
        self
    }

    /// Sets the number of points between suspensions.
    ///
    /// Defaults to twice the progress interval.
    pub fn with_suspend_interval(mut self, suspend_interval: u64) -> Context<'a> {
        self.suspend_interval = Some(suspend_interval.max(1));
        self
    }

    /// Returns the number of points between progress reports.
    pub fn progress_interval(&self) -> u64 {
        self.progress_interval
    }

    /// Returns the number of points between suspensions.
    pub fn suspend_interval(&self) -> u64 {
        self.suspend_interval
            .unwrap_or_else(|| self.progress_interval.saturating_mul(2))
    }

    /// Returns the cancellation token.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Checks for cancellation.
    pub fn check(&self) -> Result<()> {
        self.cancellation.check()
    }

    /// Checks for cancellation, then suspends.
    pub fn suspend(&mut self) -> Result<()> {
        self.check()?;
        self.suspend.suspend();
        self.check()
    }

    /// Reports progress to the host.
    pub fn progress(&mut self, done: u64, total: u64) {
        self.host.progress(done, total);
    }

    /// Sends an informational message to the log and the host.
    pub fn info(&mut self, message: &str) {
        log!(Level::Info, "{}", message);
        self.host.log(message);
    }

    /// Sends a warning to the log and the host.
    pub fn warn(&mut self, message: &str) {
        log!(Level::Warn, "{}", message);
        self.host.log(message);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A host that remembers what it was told.
    #[derive(Debug, Default)]
    pub(crate) struct Recorder {
        pub(crate) progress: Vec<(u64, u64)>,
        pub(crate) messages: Vec<String>,
    }

    impl Host for Recorder {
        fn progress(&mut self, done: u64, total: u64) {
            self.progress.push((done, total));
        }

        fn log(&mut self, message: &str) {
            self.messages.push(message.to_string());
        }
    }

    struct Counter<'a>(&'a mut u32);

    impl Suspend for Counter<'_> {
        fn suspend(&mut self) {
            *self.0 += 1;
        }
    }

    #[test]
    fn default_intervals() {
        let mut host = ();
        let context = Context::new(&mut host);
        assert_eq!(5_000_000, context.progress_interval());
        assert_eq!(10_000_000, context.suspend_interval());
    }

    #[test]
    fn zero_interval_is_one() {
        let mut host = ();
        let context = Context::new(&mut host).with_progress_interval(0);
        assert_eq!(1, context.progress_interval());
    }

    #[test]
    fn suspend_checks_cancellation() {
        let mut host = ();
        let mut count = 0;
        let token = CancellationToken::new();
        {
            let mut context = Context::new(&mut host)
                .with_suspend(Counter(&mut count))
                .with_cancellation(token.clone());
            context.suspend().unwrap();
            token.cancel();
            assert!(matches!(context.suspend(), Err(Error::Cancelled)));
        }
        assert_eq!(1, count);
    }

    #[test]
    fn warnings_reach_the_host() {
        let mut recorder = Recorder::default();
        Context::new(&mut recorder).warn("careful");
        assert_eq!(vec!["careful".to_string()], recorder.messages);
    }
}
