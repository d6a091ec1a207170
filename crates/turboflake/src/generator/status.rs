use core::time::Duration;

/// The outcome of one guarded state transition: the ID (or IDs) it minted and
/// how long the caller must wait before handing them out.
///
/// The value is fully determined before any waiting happens. A non-zero
/// `wait` means the generator ran out of slots in the current tick and stamped
/// the value with a tick that the wall clock has not reached yet; it becomes
/// "true" once `wait` has elapsed.
///
/// This lets callers choose their own backoff: block the thread, suspend a
/// task, or hand the pair to something else entirely.
///
/// # Example
///
/// ```
/// use turboflake::{LockSonyflakeGenerator, MachineIds, SystemClock, TickClock, SONYFLAKE_EPOCH};
/// use core::time::Duration;
///
/// let generator = LockSonyflakeGenerator::new(
///     MachineIds::new([0]).unwrap(),
///     TickClock::with_epoch(SystemClock, Duration::from_secs(SONYFLAKE_EPOCH)),
/// );
///
/// let reservation = generator.try_next_id().unwrap();
/// if !reservation.is_ready() {
///     std::thread::sleep(reservation.wait);
/// }
/// println!("ID: {}", reservation.value);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a reservation has already consumed its slot; its value should be used"]
pub struct Reservation<T> {
    /// The minted ID or IDs.
    pub value: T,
    /// How long to wait before the value may be returned.
    pub wait: Duration,
}

impl<T> Reservation<T> {
    /// A reservation that needs no wait.
    pub const fn ready(value: T) -> Self {
        Self {
            value,
            wait: Duration::ZERO,
        }
    }

    /// Whether the value can be handed out immediately.
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.wait.is_zero()
    }

    /// Splits the reservation into the value and the wait.
    pub fn into_parts(self) -> (T, Duration) {
        (self.value, self.wait)
    }
}
