//! `MessageStore` implementations.
//!
//! - `inmemory`: HashMap-backed store for development and tests.
//! - The production platform plugs its ORM-backed store in through the
//!   same trait.

pub mod inmemory;

pub use inmemory::InMemoryStore;
