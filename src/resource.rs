/// Directory-backed packs.
pub mod dir;
/// `namespace:path` identifiers.
pub mod location;
/// In-memory packs.
pub mod memory;
/// Prioritised pack stacks.
pub mod ordered;
/// The resource source trait.
pub mod source;
