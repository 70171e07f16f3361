//! Randomness behind the koala's coin flips and phrase picks.
//!
//! Handlers never touch an RNG directly; they roll a [`Dice`] so that tests
//! can swap in a loaded one.

use std::{ops::Deref, sync::Arc};

use rand::Rng;

// Traits.

/// Generic source of randomness that dice must implement.
pub trait GenericDice: Send + Sync + 'static {
    /// Draw a uniform number in `[0, 1)`.
    fn roll(&self) -> f64;

    /// Draw a uniform index in `0..len`; `len` is never zero.
    fn pick(&self, len: usize) -> usize;
}

// Structs.

/// Dice for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Dice {
    inner: Arc<dyn GenericDice>,
}

impl Deref for Dice {
    type Target = dyn GenericDice;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl Dice {
    pub fn new(inner: Arc<dyn GenericDice>) -> Self {
        Self { inner }
    }

    /// Dice backed by the thread-local RNG.
    pub fn thread_rng() -> Self {
        Self { inner: Arc::new(ThreadRngDice) }
    }

    /// Succeed with the given probability.
    pub fn chance(&self, probability: f64) -> bool {
        self.roll() < probability
    }

    /// Pick one entry of a non-empty pool uniformly.
    pub fn choose<'a>(&self, pool: &[&'a str]) -> &'a str {
        if pool.is_empty() {
            return "";
        }

        let index = self.pick(pool.len()).min(pool.len() - 1);
        pool[index]
    }
}

// Specific implementations.

/// Dice backed by `rand`'s thread-local generator.
struct ThreadRngDice;

impl GenericDice for ThreadRngDice {
    fn roll(&self) -> f64 {
        rand::rng().random::<f64>()
    }

    fn pick(&self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    struct Loaded(f64, usize);

    impl GenericDice for Loaded {
        fn roll(&self) -> f64 {
            self.0
        }

        fn pick(&self, _len: usize) -> usize {
            self.1
        }
    }

    #[test]
    fn test_chance_is_strictly_below_probability() {
        let dice = Dice::new(Arc::new(Loaded(0.5, 0)));

        assert!(!dice.chance(0.5));
        assert!(dice.chance(0.51));
        assert!(!dice.chance(0.0));
    }

    #[test]
    fn test_choose_clamps_out_of_range_picks() {
        let dice = Dice::new(Arc::new(Loaded(0.0, 99)));

        assert_eq!(dice.choose(&["a", "b", "c"]), "c");
        assert_eq!(dice.choose(&[]), "");
    }

    #[test]
    fn test_thread_rng_stays_in_range() {
        let dice = Dice::thread_rng();

        for _ in 0..1000 {
            let roll = dice.roll();
            assert!((0.0..1.0).contains(&roll));
            assert!(dice.pick(3) < 3);
        }

        assert!(!dice.chance(0.0));
        assert!(dice.chance(1.0));
    }
}
