/// Packed RGBA colors.
pub mod color;
/// Crate-wide error type.
pub mod error;
/// Stable content fingerprints.
pub mod fingerprint;
