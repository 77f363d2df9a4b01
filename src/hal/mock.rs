//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for all hardware and network traits,
//! enabling development and testing on desktop without physical hardware.
//!
//! Every mock is a cheap handle over shared state: cloning it gives a second
//! handle to the same pin, line or socket. A test keeps one handle for
//! inspection while the code under test owns the other.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockPin`] | [`ActionPin`] | Records every write with a timestamp |
//! | [`MockInput`] | [`InputLine`] | Scripted samples over a resting level |
//! | [`MockClock`] | [`Clock`] | Controllable time source |
//! | [`MockDelay`] | [`Delay`] | Records sleeps and advances a [`MockClock`] |
//! | [`MockListener`] | [`Listener`] | Queue of pending connections |
//! | [`MockConnection`] | [`Connection`] | Scripted reads, captured writes |
//!
//! # Example
//!
//! ```rust
//! use tcp_action::hal::{MockClock, MockDelay, MockPin};
//! use tcp_action::traits::{ActionPin, Delay, Level};
//!
//! let clock = MockClock::new();
//! let mut pin = MockPin::new(Level::Low).with_clock(clock.clone());
//! let mut delay = MockDelay::new().with_clock(clock.clone());
//!
//! pin.set_level(Level::High).unwrap();
//! delay.delay_ms(250);
//! pin.set_level(Level::Low).unwrap();
//!
//! assert_eq!(pin.writes(), vec![(0, Level::High), (250, Level::Low)]);
//! ```
//!
//! [`ActionPin`]: crate::traits::ActionPin
//! [`InputLine`]: crate::traits::InputLine
//! [`Clock`]: crate::traits::Clock
//! [`Delay`]: crate::traits::Delay
//! [`Listener`]: crate::traits::Listener
//! [`Connection`]: crate::traits::Connection

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::traits::{
    ActionPin, Clock, Connection, Delay, InputLine, Level, Listener, ReadOutcome,
};

/// Error returned by a mock that was told to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MockError;

impl core::fmt::Display for MockError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("mock failure")
    }
}

impl std::error::Error for MockError {}

/// Lock a mock's shared state, recovering from a poisoned mutex.
///
/// A test that panics while holding a handle must not cascade into every
/// other handle of the same mock.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// Time Mocks
// ============================================================================

/// Mock clock for testing time-dependent behavior.
///
/// Time only moves when told to, either directly or through a
/// [`MockDelay`] sharing the clock.
///
/// # Example
///
/// ```rust
/// use tcp_action::hal::MockClock;
/// use tcp_action::traits::Clock;
///
/// let clock = MockClock::new();
/// let view = clock.clone();
///
/// clock.advance(100);
/// assert_eq!(view.now_ms(), 100);
///
/// clock.set(1000);
/// assert_eq!(view.now_ms(), 1000);
/// ```
#[derive(Clone, Debug, Default)]
pub struct MockClock {
    now: Arc<AtomicU64>,
}

impl MockClock {
    /// Creates a new mock clock starting at time 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock clock starting at `ms`.
    pub fn starting_at(ms: u64) -> Self {
        let clock = Self::new();
        clock.set(ms);
        clock
    }

    /// Advances time by the specified milliseconds.
    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    /// Sets the current time directly.
    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Mock blocking delay.
///
/// Records every requested sleep. When attached to a [`MockClock`] the
/// sleep advances that clock instead of blocking.
#[derive(Clone, Debug, Default)]
pub struct MockDelay {
    sleeps: Arc<Mutex<Vec<u32>>>,
    clock: Option<MockClock>,
}

impl MockDelay {
    /// Creates a delay that records sleeps without moving any clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance `clock` by every sleep.
    pub fn with_clock(mut self, clock: MockClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// All sleeps requested so far, in order.
    pub fn sleeps(&self) -> Vec<u32> {
        lock(&self.sleeps).clone()
    }

    /// Sum of all sleeps requested so far.
    pub fn total_ms(&self) -> u64 {
        lock(&self.sleeps).iter().map(|&ms| u64::from(ms)).sum()
    }

    /// Forget recorded sleeps.
    pub fn clear(&self) {
        lock(&self.sleeps).clear();
    }
}

impl Delay for MockDelay {
    fn delay_ms(&mut self, ms: u32) {
        lock(&self.sleeps).push(ms);
        if let Some(clock) = &self.clock {
            clock.advance(u64::from(ms));
        }
    }
}

// ============================================================================
// GPIO Mocks
// ============================================================================

#[derive(Debug)]
struct PinInner {
    level: Level,
    writes: VecDeque<(u64, Level)>,
    write_count: usize,
    history_limit: Option<usize>,
    stuck: bool,
    failing: bool,
}

/// Mock action pin.
///
/// Records every `set_level` call as `(time, level)`. Time comes from an
/// attached [`MockClock`], or is 0 without one. Long-running users such as
/// the desktop simulator bound the record with
/// [`with_history_limit`](Self::with_history_limit).
///
/// # Example
///
/// ```rust
/// use tcp_action::hal::MockPin;
/// use tcp_action::traits::{ActionPin, Level};
///
/// let pin = MockPin::new(Level::Low);
/// let mut driver = pin.clone();
///
/// driver.set_level(Level::High).unwrap();
/// assert_eq!(pin.level(), Level::High);
/// assert_eq!(pin.write_count(), 1);
///
/// // A stuck pin accepts writes but never changes level
/// pin.set_stuck(true);
/// driver.set_level(Level::Low).unwrap();
/// assert_eq!(driver.get_level().unwrap(), Level::High);
/// ```
#[derive(Clone, Debug)]
pub struct MockPin {
    inner: Arc<Mutex<PinInner>>,
    clock: Option<MockClock>,
}

impl MockPin {
    /// Creates a pin resting at `level`.
    pub fn new(level: Level) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PinInner {
                level,
                writes: VecDeque::new(),
                write_count: 0,
                history_limit: None,
                stuck: false,
                failing: false,
            })),
            clock: None,
        }
    }

    /// Timestamp writes with `clock`.
    pub fn with_clock(mut self, clock: MockClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Keep only the most recent `limit` writes. `write_count` still
    /// counts every write.
    pub fn with_history_limit(self, limit: usize) -> Self {
        {
            let mut inner = lock(&self.inner);
            inner.history_limit = Some(limit);
            trim_history(&mut inner);
        }
        self
    }

    /// Current electrical level.
    pub fn level(&self) -> Level {
        lock(&self.inner).level
    }

    /// Change the level without recording a write, as external hardware would.
    pub fn force_level(&self, level: Level) {
        lock(&self.inner).level = level;
    }

    /// Recorded writes as `(time_ms, level)`, oldest first.
    pub fn writes(&self) -> Vec<(u64, Level)> {
        lock(&self.inner).writes.iter().copied().collect()
    }

    /// Number of writes since creation or the last `clear_writes`.
    pub fn write_count(&self) -> usize {
        lock(&self.inner).write_count
    }

    /// Forget recorded writes and reset the count.
    pub fn clear_writes(&self) {
        let mut inner = lock(&self.inner);
        inner.writes.clear();
        inner.write_count = 0;
    }

    /// When stuck, writes are recorded but the level does not change.
    pub fn set_stuck(&self, stuck: bool) {
        lock(&self.inner).stuck = stuck;
    }

    /// When failing, every operation returns [`MockError`].
    pub fn set_failing(&self, failing: bool) {
        lock(&self.inner).failing = failing;
    }
}

impl ActionPin for MockPin {
    type Error = MockError;

    fn set_level(&mut self, level: Level) -> Result<(), MockError> {
        let now = self.clock.as_ref().map_or(0, Clock::now_ms);
        let mut inner = lock(&self.inner);
        if inner.failing {
            return Err(MockError);
        }
        inner.writes.push_back((now, level));
        inner.write_count += 1;
        trim_history(&mut inner);
        if !inner.stuck {
            inner.level = level;
        }
        Ok(())
    }

    fn get_level(&mut self) -> Result<Level, MockError> {
        let inner = lock(&self.inner);
        if inner.failing {
            return Err(MockError);
        }
        Ok(inner.level)
    }
}

fn trim_history(inner: &mut PinInner) {
    if let Some(limit) = inner.history_limit {
        while inner.writes.len() > limit {
            inner.writes.pop_front();
        }
    }
}

#[derive(Debug)]
struct InputInner {
    level: Level,
    script: VecDeque<Level>,
    reads: usize,
    failing: bool,
}

/// Mock input line.
///
/// Reads drain a script of queued samples first, then return the resting
/// level.
///
/// # Example
///
/// ```rust
/// use tcp_action::hal::MockInput;
/// use tcp_action::traits::{InputLine, Level};
///
/// let line = MockInput::new(Level::High);
/// let mut reader = line.clone();
///
/// line.push_samples(&[Level::Low, Level::High]);
/// assert_eq!(reader.read().unwrap(), Level::Low);
/// assert_eq!(reader.read().unwrap(), Level::High);
/// assert_eq!(reader.read().unwrap(), Level::High); // resting level
/// assert_eq!(line.read_count(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct MockInput {
    inner: Arc<Mutex<InputInner>>,
}

impl MockInput {
    /// Creates a line resting at `level`.
    pub fn new(level: Level) -> Self {
        Self {
            inner: Arc::new(Mutex::new(InputInner {
                level,
                script: VecDeque::new(),
                reads: 0,
                failing: false,
            })),
        }
    }

    /// Change the resting level.
    pub fn set_level(&self, level: Level) {
        lock(&self.inner).level = level;
    }

    /// Queue samples returned before the resting level.
    pub fn push_samples(&self, samples: &[Level]) {
        lock(&self.inner).script.extend(samples.iter().copied());
    }

    /// Number of reads so far.
    pub fn read_count(&self) -> usize {
        lock(&self.inner).reads
    }

    /// Number of scripted samples not yet read.
    pub fn pending(&self) -> usize {
        lock(&self.inner).script.len()
    }

    /// When failing, reads return [`MockError`].
    pub fn set_failing(&self, failing: bool) {
        lock(&self.inner).failing = failing;
    }
}

impl InputLine for MockInput {
    type Error = MockError;

    fn read(&mut self) -> Result<Level, MockError> {
        let mut inner = lock(&self.inner);
        if inner.failing {
            return Err(MockError);
        }
        inner.reads += 1;
        let level = inner.level;
        Ok(inner.script.pop_front().unwrap_or(level))
    }
}

// ============================================================================
// Network Mocks
// ============================================================================

#[derive(Debug, Default)]
struct ConnInner {
    script: VecDeque<Result<ReadOutcome, MockError>>,
    written: Vec<u8>,
    closed: bool,
    hung_up: bool,
}

/// Mock client connection.
///
/// Reads follow a script of bytes, idle polls and a final hang-up. Once the
/// script is exhausted reads return [`ReadOutcome::WouldBlock`] (the client
/// is idle), or [`ReadOutcome::Closed`] after [`hang_up`](Self::hang_up).
///
/// # Example
///
/// ```rust
/// use tcp_action::hal::MockConnection;
/// use tcp_action::traits::{Connection, ReadOutcome};
///
/// let client = MockConnection::new();
/// client.send(&[0x03]);
/// client.hang_up();
///
/// let mut server_side = client.clone();
/// assert_eq!(server_side.read_byte().unwrap(), ReadOutcome::Byte(0x03));
/// server_side.write(&[0x01]).unwrap();
/// assert_eq!(server_side.read_byte().unwrap(), ReadOutcome::Closed);
///
/// assert_eq!(client.written(), vec![0x01]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct MockConnection {
    inner: Arc<Mutex<ConnInner>>,
}

impl MockConnection {
    /// Creates a connection with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes from the client.
    pub fn send(&self, bytes: &[u8]) {
        lock(&self.inner)
            .script
            .extend(bytes.iter().map(|&b| Ok(ReadOutcome::Byte(b))));
    }

    /// Queue `polls` reads that find no data.
    pub fn idle(&self, polls: usize) {
        lock(&self.inner)
            .script
            .extend(core::iter::repeat(Ok(ReadOutcome::WouldBlock)).take(polls));
    }

    /// Queue a read error.
    pub fn fail_read(&self) {
        lock(&self.inner).script.push_back(Err(MockError));
    }

    /// After the script, the client disconnects.
    pub fn hang_up(&self) {
        lock(&self.inner).hung_up = true;
    }

    /// Everything the server wrote.
    pub fn written(&self) -> Vec<u8> {
        lock(&self.inner).written.clone()
    }

    /// Whether the server closed this connection.
    pub fn is_closed(&self) -> bool {
        lock(&self.inner).closed
    }

    /// Number of scripted reads not yet consumed.
    pub fn pending(&self) -> usize {
        lock(&self.inner).script.len()
    }
}

impl Connection for MockConnection {
    type Error = MockError;

    fn read_byte(&mut self) -> Result<ReadOutcome, MockError> {
        let mut inner = lock(&self.inner);
        if inner.closed {
            return Ok(ReadOutcome::Closed);
        }
        match inner.script.pop_front() {
            Some(outcome) => outcome,
            None if inner.hung_up => Ok(ReadOutcome::Closed),
            None => Ok(ReadOutcome::WouldBlock),
        }
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), MockError> {
        let mut inner = lock(&self.inner);
        if inner.closed {
            return Err(MockError);
        }
        inner.written.extend_from_slice(bytes);
        Ok(())
    }

    fn close(&mut self) {
        lock(&self.inner).closed = true;
    }
}

/// Mock listener handing out queued connections in order.
///
/// # Example
///
/// ```rust
/// use tcp_action::hal::{MockConnection, MockListener};
/// use tcp_action::traits::Listener;
///
/// let listener = MockListener::new();
/// listener.queue(MockConnection::new());
///
/// let mut server_side = listener.clone();
/// assert!(server_side.accept().unwrap().is_some());
/// assert!(server_side.accept().unwrap().is_none());
/// assert_eq!(listener.accepted(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct MockListener {
    inner: Arc<Mutex<ListenerInner>>,
}

#[derive(Debug, Default)]
struct ListenerInner {
    pending: VecDeque<MockConnection>,
    accepted: usize,
}

impl MockListener {
    /// Creates a listener with no pending clients.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a client to be accepted.
    pub fn queue(&self, conn: MockConnection) {
        lock(&self.inner).pending.push_back(conn);
    }

    /// Number of connections accepted so far.
    pub fn accepted(&self) -> usize {
        lock(&self.inner).accepted
    }
}

impl Listener for MockListener {
    type Connection = MockConnection;
    type Error = MockError;

    fn accept(&mut self) -> Result<Option<MockConnection>, MockError> {
        let mut inner = lock(&self.inner);
        let conn = inner.pending.pop_front();
        if conn.is_some() {
            inner.accepted += 1;
        }
        Ok(conn)
    }
}
