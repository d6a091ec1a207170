use core::fmt;

use portable_atomic::{AtomicU32, Ordering};

const LCG_MULTIPLIER: u32 = 32_309;
const LCG_INCREMENT: u32 = 13_799;

/// One step of the machine ID recurrence `x' = (32309 * x + 13799) mod 65536`.
///
/// The parameters satisfy the Hull-Dobell conditions, so the sequence has full
/// period: 65536 consecutive steps from any seed visit every 16-bit value
/// exactly once.
#[inline]
pub const fn machine_id_lcg(x: u32) -> u16 {
    // Arithmetic mod 2^32 agrees with the recurrence mod 2^16.
    (LCG_MULTIPLIER.wrapping_mul(x).wrapping_add(LCG_INCREMENT) & 0xFFFF) as u16
}

/// A thread-safe linear congruential generator of machine IDs.
///
/// Independent processes that cannot coordinate can each draw machine IDs
/// from their own `MachineIdLcg` (seeded from, say, a host or process
/// identifier) and get probabilistically distinct sets to pass to a
/// generator. The sequence is deterministic and **not** unpredictable.
///
/// Create one instance and share it; concurrent callers each observe a
/// distinct step of the sequence.
///
/// # Example
///
/// ```
/// use turboflake::MachineIdLcg;
///
/// let lcg = MachineIdLcg::new(0);
/// assert_eq!(lcg.next_machine_id(), 13_799);
/// assert_eq!(lcg.next_machine_id(), ((32_309 * 13_799 + 13_799) % 65_536) as u16);
/// ```
pub struct MachineIdLcg {
    state: AtomicU32,
}

impl MachineIdLcg {
    /// Creates a generator whose first output is the step after `seed`.
    pub const fn new(seed: u32) -> Self {
        Self {
            state: AtomicU32::new(seed),
        }
    }

    /// Advances the sequence and returns the new value.
    pub fn next_machine_id(&self) -> u16 {
        let mut current = self.state.load(Ordering::Relaxed);
        loop {
            let next = machine_id_lcg(current);
            match self.state.compare_exchange_weak(
                current,
                u32::from(next),
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return next,
                Err(actual) => current = actual,
            }
        }
    }

    /// Draws `n` machine IDs.
    ///
    /// With `n <= 65536` and no concurrent draws on the same instance, the
    /// values are distinct.
    pub fn next_machine_ids(&self, n: usize) -> Vec<u16> {
        (0..n).map(|_| self.next_machine_id()).collect()
    }

    /// The current state (the last value returned, or the seed).
    pub fn state(&self) -> u32 {
        self.state.load(Ordering::Relaxed)
    }
}

impl Iterator for &MachineIdLcg {
    type Item = u16;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_machine_id())
    }
}

impl fmt::Display for MachineIdLcg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MachineIdLcg({})", self.state())
    }
}

impl fmt::Debug for MachineIdLcg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineIdLcg")
            .field("state", &self.state())
            .finish()
    }
}
