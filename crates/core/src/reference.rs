//! Display references for submissions: `PREFIX-YYYYMMDD-XXXXXX`.
//!
//! The suffix is six characters from `[A-Z0-9]`. There is no collision
//! check; references are labels shown to the user, not keys.

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;

use crate::models::Reference;

/// Length of the random suffix.
pub const SUFFIX_LEN: usize = 6;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a reference for the current UTC date.
pub fn generate(prefix: &str) -> Reference {
    generate_at(prefix, Utc::now())
}

/// Generate a reference dated from `at` (UTC), using the thread-local RNG.
pub fn generate_at(prefix: &str, at: DateTime<Utc>) -> Reference {
    generate_with(prefix, at.date_naive(), &mut rand::thread_rng())
}

/// Generate a reference for `date` drawing the suffix from `rng`.
pub fn generate_with<R: Rng + ?Sized>(prefix: &str, date: NaiveDate, rng: &mut R) -> Reference {
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();

    Reference(format!("{}-{}-{}", prefix, date.format("%Y%m%d"), suffix))
}

/// Reference attached to failure responses: `ERROR-<unix millis>`.
pub fn error_reference(now: DateTime<Utc>) -> Reference {
    Reference(format!("ERROR-{}", now.timestamp_millis()))
}
