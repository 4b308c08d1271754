//! Texture handle management.
//!
//! Native texture resources are owned by a fixed-capacity slot table and referred
//! to by small integer handles. Batch descriptors carry these handles verbatim.

mod pool;

pub use pool::{DEFAULT_TEXTURE_CAPACITY, NO_TEXTURE, TextureHandle, TexturePool};
