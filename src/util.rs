//! Small shared utilities: the wall-clock budget timer and hash mixing.

use std::fmt;
use std::time::Duration;

use instant::Instant;

/// Monotonic elapsed-time clock used for search budgets.
///
/// Backed by a steady clock; wall-clock adjustments do not affect it.
#[derive(Clone, Debug)]
pub struct Timer {
    start_time: Instant,
}

impl Timer {
    pub fn start() -> Timer {
        Timer { start_time: Instant::now() }
    }

    pub fn restart(&mut self) {
        self.start_time = Instant::now();
    }

    pub fn seconds_elapsed(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    pub fn exceeded(&self, budget: Duration) -> bool {
        self.start_time.elapsed() > budget
    }
}

impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.2}s", self.seconds_elapsed())
    }
}

/// Folds `value` into `seed` with the 64-bit variant of the boost
/// `hash_combine` mixing step. Unlike a plain XOR, the combination is
/// order-sensitive and does not cancel on repeated values, which is what
/// the game de-duplication hash relies on.
pub fn hash_combine(seed: u64, value: u64) -> u64 {
    seed ^ value
        .wrapping_add(0x9e37_79b9_7f4a_7c15)
        .wrapping_add(seed << 6)
        .wrapping_add(seed >> 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_advances() {
        let timer = Timer::start();
        assert!(!timer.exceeded(Duration::from_secs(3600)));
        let first = timer.seconds_elapsed();
        std::thread::sleep(Duration::from_millis(5));
        assert!(timer.seconds_elapsed() > first);
        assert!(timer.exceeded(Duration::from_millis(1)));
    }

    #[test]
    fn hash_combine_is_order_sensitive() {
        let a = hash_combine(hash_combine(0, 1), 2);
        let b = hash_combine(hash_combine(0, 2), 1);
        assert_ne!(a, b);
    }

    #[test]
    fn hash_combine_does_not_cancel_pairs() {
        // seed ^ x ^ x == seed; the mixing step must not behave like that.
        let seed = 0xdead_beef;
        let twice = hash_combine(hash_combine(seed, 42), 42);
        assert_ne!(twice, seed);
    }
}
