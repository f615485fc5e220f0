//! ID generation utilities.

use nanoid::nanoid;
use ulid::Ulid;

/// URL-safe alphabet for public identifiers.
const PUBLIC_ID_ALPHABET: [char; 64] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I',
    'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b',
    'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u',
    'v', 'w', 'x', 'y', 'z', '-', '_',
];

/// Length of public identifiers.
pub const PUBLIC_ID_LENGTH: usize = 11;

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based storage ID.
    ///
    /// ULIDs are:
    /// - Lexicographically sortable
    /// - Monotonically increasing within the same millisecond
    /// - Shorter than UUIDs when represented as strings
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate a short public identifier used in URLs.
    #[must_use]
    pub fn generate_public_id(&self) -> String {
        nanoid!(PUBLIC_ID_LENGTH, &PUBLIC_ID_ALPHABET)
    }
}

/// Whether `candidate` could have been produced by [`IdGenerator::generate_public_id`].
#[must_use]
pub fn is_public_id(candidate: &str) -> bool {
    candidate.chars().count() == PUBLIC_ID_LENGTH
        && candidate.chars().all(|c| PUBLIC_ID_ALPHABET.contains(&c))
}
