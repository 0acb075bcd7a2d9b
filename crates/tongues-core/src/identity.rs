//! Content hashing and locale-tagged stable identifiers
//!
//! `stable_id` produces compact keys for string catalogs kept outside this
//! crate. The output is a pure function of the input and of xxh3-64, so it
//! is reproducible across processes and implementations.

use xxhash_rust::xxh3::xxh3_64;

/// Character offset at which the locale is spliced into the hash
pub const LOCALE_OFFSET: usize = 3;

/// Hex-encoded xxh3-64 of arbitrary bytes
pub fn content_hash(bytes: &[u8]) -> String {
    format!("{:016x}", xxh3_64(bytes))
}

/// Hash `text` and splice the uppercased 2-letter `locale` in at offset 3
///
/// # Panics
///
/// Panics when `locale` is not exactly two ASCII characters. Callers pass
/// locales from code, so a bad one is a bug rather than bad input.
pub fn stable_id(text: &str, locale: &str) -> String {
    assert!(
        locale.len() == 2 && locale.is_ascii(),
        "stable_id locale must be exactly 2 ASCII characters, got {:?}",
        locale
    );

    let mut id = content_hash(text.as_bytes());
    id.insert_str(LOCALE_OFFSET, &locale.to_uppercase());
    id
}
