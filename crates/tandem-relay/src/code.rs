//! Session code generation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Smallest code handed out.
pub const CODE_MIN: u16 = 1000;
/// Largest code handed out.
pub const CODE_MAX: u16 = 9999;
/// Number of distinct codes.
pub const CODE_SPACE: usize = (CODE_MAX - CODE_MIN) as usize + 1;

/// Source of candidate session codes.
///
/// Candidates may repeat; the session store rejects codes that are in use.
pub trait CodeSource: Send {
    fn next_code(&mut self) -> u16;
}

/// Uniform codes in `CODE_MIN..=CODE_MAX`.
pub struct RandomCodes {
    rng: StdRng,
}

impl RandomCodes {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    #[cfg(test)]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomCodes {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeSource for RandomCodes {
    fn next_code(&mut self) -> u16 {
        self.rng.gen_range(CODE_MIN..=CODE_MAX)
    }
}

/// Replays a fixed list of codes, cycling when it runs out.
#[cfg(test)]
pub(crate) struct SequenceCodes {
    codes: Vec<u16>,
    next: usize,
}

#[cfg(test)]
impl SequenceCodes {
    pub(crate) fn new(codes: &[u16]) -> Self {
        assert!(!codes.is_empty());
        Self {
            codes: codes.to_vec(),
            next: 0,
        }
    }
}

#[cfg(test)]
impl CodeSource for SequenceCodes {
    fn next_code(&mut self) -> u16 {
        let code = self.codes[self.next % self.codes.len()];
        self.next += 1;
        code
    }
}
