//! Deterministic and fresh-uniform pseudo-randomness for probabilistic unions.
//!
//! [`det`] gives the same `[0, 1)` value for the same input tuple on every
//! machine and every process, which is what makes a probabilistic union with
//! an evidence token idempotent (see [`crate::session::IngestSession::add_edge`]).
//! [`RandomSource`] is the injection point for the independent-sample path,
//! so tests can install a fixed cycling sequence instead of hitting the
//! process RNG (per the "test injection of the RNG" design note).
use xxhash_rust::xxh32::xxh32;

/// Separator byte joined between `det`'s argument parts before hashing.
///
/// Chosen as a control character that cannot appear in a canonical node form
/// (`"{replica}://{url}"`) or in an evidence token supplied by a caller,
/// so two different argument tuples never collide after joining.
const SEPARATOR: u8 = 0x01;

/// Returns a deterministic pseudo-random value in `[0, 1)` for the given
/// argument parts.
///
/// The parts are joined with a sentinel separator and hashed with a fixed
/// 32-bit non-cryptographic hash (`xxh32`, seed `0`). The same parts, in the
/// same order, always produce the same output, on any machine or process —
/// this is what lets [`crate::session::IngestSession::add_edge`] with an
/// evidence token be idempotent across repeated calls.
pub fn det(parts: &[&str]) -> f64 {
    let mut buf = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            buf.push(SEPARATOR);
        }
        buf.extend_from_slice(part.as_bytes());
    }
    let hash = xxh32(&buf, 0);
    f64::from(hash) / (f64::from(u32::MAX) + 1.0)
}

/// A source of independent uniform samples in `[0, 1)`.
///
/// Production code uses [`RandomSource::system`], which draws from the
/// process RNG. Tests install [`RandomSource::cycle`] to get a fixed,
/// repeatable sequence instead — the sampler is a replaceable value, not a
/// hard-coded call to a global generator.
pub struct RandomSource {
    next: Box<dyn FnMut() -> f64 + Send>,
}

impl RandomSource {
    /// A random source backed by the process CSPRNG.
    #[must_use]
    pub fn system() -> Self {
        Self {
            next: Box::new(|| rand::random::<f64>()),
        }
    }

    /// A random source that cycles through a fixed sequence of values.
    ///
    /// Useful for deterministic tests: once the sequence is exhausted it
    /// starts over from the beginning. Panics only if `values` is empty,
    /// which is a test-setup logic error, never a runtime condition.
    #[must_use]
    pub fn cycle(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "cycle() requires at least one value");
        let mut idx = 0usize;
        Self {
            next: Box::new(move || {
                let v = values[idx % values.len()];
                idx += 1;
                v
            }),
        }
    }

    /// Draws the next sample in `[0, 1)`.
    pub fn sample(&mut self) -> f64 {
        (self.next)()
    }
}

impl std::fmt::Debug for RandomSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomSource").finish_non_exhaustive()
    }
}
