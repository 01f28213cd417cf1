/// Service layer
///
/// The thumbnail module owns the whole derivation pipeline: format
/// resolution, resize computation, rendering, the optional WebP transform,
/// the orchestrating service, and its event/storage edges.
pub mod thumbnail;
