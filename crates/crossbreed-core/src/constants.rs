/// Crossbreed system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Separator placed between the two canonical parent refs of a `CrossKey`.
/// Canonical refs never contain whitespace, so this can never occur inside one.
pub const KEY_SEPARATOR: &str = " x ";

/// Maximum length (in chars) of a parent reference.
pub const MAX_PARENT_REF_LEN: usize = 128;

/// Replacement for whitespace runs inside a canonical parent ref.
pub const WHITESPACE_REPLACEMENT: char = '_';
