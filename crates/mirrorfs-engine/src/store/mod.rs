//! Collaborator seams: content storage and the remote collection agent.
//!
//! The engine owns metadata; bytes and agents live elsewhere. These
//! traits are the only way the engine reaches them, so hosts can wire in
//! blob stores and fleet transports without the core knowing either.

mod memory;
mod traits;

pub use memory::MemoryContentStore;
pub use traits::{Collector, ContentKey, ContentSlice, ContentStore};
