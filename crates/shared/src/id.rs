//! Opaque identifier and access code generation.

use rand::Rng;
use uuid::Uuid;

/// Characters allowed in a generated school access code.
const SCHOOL_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a generated school access code.
pub const SCHOOL_CODE_LENGTH: usize = 6;

/// Generates a new opaque identifier for items and location nodes.
///
/// Identifiers are random (UUID v4, hyphenless) and never derived from names.
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Generates a random school access code such as `K3ZP0Q`.
pub fn generate_school_code() -> String {
    let mut rng = rand::thread_rng();
    (0..SCHOOL_CODE_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..SCHOOL_CODE_CHARSET.len());
            SCHOOL_CODE_CHARSET[idx] as char
        })
        .collect()
}
