//! Public link slugs derived from a person's name.
//!
//! A slug is the page name reduced to `[a-z0-9-]` plus a random suffix:
//!
//! - `"Ayşe Öztürk"` → `"ayse-ozturk-k3x9qa"`
//! - `"  Çağrı   İnce "` → `"cagri-ince-0p2mzd"`
//! - `"☆"` → `"7hq2cv"` (nothing survives, suffix only)
//!
//! Turkish letters are transliterated before anything else is stripped, so
//! names keep their readable form. The suffix is not a uniqueness guarantee,
//! only a practical one: 36⁶ combinations per base name.

use rand::Rng;

/// Length of the random suffix.
pub const SUFFIX_LEN: usize = 6;

const SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

fn transliterate(c: char) -> char {
    match c {
        'ğ' | 'Ğ' => 'g',
        'ü' | 'Ü' => 'u',
        'ş' | 'Ş' => 's',
        'ı' | 'İ' => 'i',
        'ö' | 'Ö' => 'o',
        'ç' | 'Ç' => 'c',
        other => other,
    }
}

/// The deterministic part of a slug, without the random suffix.
///
/// May be empty when the name has no usable characters.
pub fn slug_base(name: &str) -> String {
    let filtered: String = name
        .chars()
        .map(transliterate)
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || c.is_whitespace())
        .collect();

    // Whitespace runs and hyphen runs both collapse to a single hyphen
    filtered
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Random `[a-z0-9]` suffix of [`SUFFIX_LEN`] characters.
pub fn random_suffix<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_CHARSET[rng.random_range(0..SUFFIX_CHARSET.len())] as char)
        .collect()
}

/// Generate a slug using the supplied random source.
pub fn generate_slug_with<R: Rng + ?Sized>(name: &str, rng: &mut R) -> String {
    let base = slug_base(name);
    let suffix = random_suffix(rng);
    if base.is_empty() {
        suffix
    } else {
        format!("{base}-{suffix}")
    }
}

/// Generate a slug for `name` with a thread-local random suffix.
pub fn generate_slug(name: &str) -> String {
    generate_slug_with(name, &mut rand::rng())
}

/// True if `slug` is non-empty and only contains `[a-z0-9-]`.
///
/// The suffix is not re-derived or checked.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
