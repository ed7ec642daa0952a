//! Synthetic identifier value pools for the dataset generator.
//!
//! Values are generated deterministically from a counter rather than drawn
//! from a word list, so the generator has no data files to ship and two runs
//! with the same seed produce byte-identical datasets.

use rand::Rng;
use rand::rngs::StdRng;

/// One hard-selector field name and a function that renders the `n`th
/// distinct value for it.
pub const HARD_FIELDS: &[&str] = &["email", "phone", "skype", "hostname"];

/// One soft-selector field name and a function that renders the `n`th
/// distinct value for it.
pub const SOFT_FIELDS: &[&str] = &["name", "username", "postal_address"];

/// Renders the `n`th distinct value for `field`, picking a format that looks
/// like the real thing (`user1234@example.test`, not `hard_value_1234`).
#[must_use]
pub fn render_value(field: &str, n: u64) -> String {
    match field {
        "email" => format!("user{n}@example.test"),
        "phone" => format!("+1555{n:07}"),
        "skype" => format!("skype.user.{n}"),
        "hostname" => format!("host-{n}.example.test"),
        "name" => format!("Person {n}"),
        "username" => format!("user_{n}"),
        "postal_address" => format!("{n} Example Street, Testville"),
        _ => format!("value-{n}"),
    }
}

/// Draws a fresh, never-before-used value for `field` from an
/// ever-incrementing counter, so every hard-selector value the generator
/// emits is globally unique unless a cluster deliberately reuses one.
pub struct ValueCounter {
    next: u64,
}

impl ValueCounter {
    #[must_use]
    pub fn new() -> Self {
        Self { next: 0 }
    }

    pub fn next_value(&mut self, field: &str) -> String {
        let n = self.next;
        self.next += 1;
        render_value(field, n)
    }
}

impl Default for ValueCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// A deterministic stand-in for the external character-n-gram rarity
/// scorer, which stays out of this crate's scope. Hashes `value` with the
/// standard library's `SipHash` and maps it into `[0, 1)`, so the same
/// value always scores the same but with no real linguistic meaning — fine
/// for exercising the weighting and cutoff logic, not for judging real
/// username plausibility.
#[must_use]
pub fn synthetic_rarity_score(value: &str) -> f64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    let h = hasher.finish();
    (h >> 11) as f64 / (1u64 << 53) as f64
}

/// Picks `count` values at random (with replacement) from the values
/// `render_value(field, 0..pool_size)` produces, for simulating a shared,
/// popular soft-selector value.
pub fn sample_from_pool(rng: &mut StdRng, field: &str, pool_size: u64) -> String {
    let n = rng.gen_range(0..pool_size.max(1));
    render_value(field, n)
}
