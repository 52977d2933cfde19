//! Source of fresh refer codes.

use crate::domain::ReferCode;

/// Produces candidate refer codes for new accounts.
///
/// Candidates may collide with existing codes; the caller retries.
pub trait ReferCodeSource: Send + Sync {
    fn next_code(&self) -> ReferCode;
}

/// Draws codes from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomReferCodes;

impl ReferCodeSource for RandomReferCodes {
    fn next_code(&self) -> ReferCode {
        ReferCode::generate(&mut rand::thread_rng())
    }
}
