// src/random.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Random sources for factories
//!
//! Factories take no arguments, so they capture their RNG. A fixed seed makes a
//! fixture run reproducible; `None` mixes wall-clock time with OS entropy.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::seq::IndexedRandom;
use rand::{Rng, RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

pub type FixtureRng = Xoshiro256PlusPlus;

/// One stream drawn from by several factories
pub type SharedRng = Rc<RefCell<FixtureRng>>;

/// Create a fixture RNG, deterministic when `seed` is set
pub fn rng(seed: Option<u64>) -> FixtureRng {
    let entropy = seed.unwrap_or_else(call_entropy);
    tracing::debug!(
        "Fixture RNG seeded: {} (entropy={})",
        if seed.is_some() {
            "deterministic"
        } else {
            "non-deterministic"
        },
        entropy
    );
    FixtureRng::seed_from_u64(entropy)
}

pub fn shared(seed: Option<u64>) -> SharedRng {
    Rc::new(RefCell::new(rng(seed)))
}

/// Uniform integer in `0..=max`
pub fn integer<R: Rng + ?Sized>(rng: &mut R, max: u64) -> u64 {
    rng.random_range(0..=max)
}

/// Uniform choice from `items`, `None` when empty
pub fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    items.choose(rng)
}

/// Per-call entropy from time + urandom
fn call_entropy() -> u64 {
    let time_entropy = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;

    let urandom_entropy: u64 = {
        let mut rng = rand::rng();
        rng.next_u64()
    };

    time_entropy.wrapping_add(urandom_entropy)
}
