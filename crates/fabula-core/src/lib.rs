//! Core types for Fabula: facts, world state, and the domain type graph.
//!
//! This crate defines the data model the resolution engine operates on. It is
//! independent of any definition format — you can construct a [`WorldState`]
//! programmatically or build one from the textual fact lists an adventure
//! instance ships with.

/// Error types used throughout the crate.
pub mod error;
/// Facts, fact values, and numeric fact values.
pub mod fact;
/// World-state snapshot history.
pub mod history;
/// The domain type graph: supertypes, traits, and numeric functions.
pub mod types;
/// The mutable set of facts describing the current world.
pub mod world;

pub use error::{CoreError, CoreResult};
pub use fact::{Fact, FactValue, Num};
pub use history::StateHistory;
pub use types::{FunctionDef, TypeGraph, TypeGraphBuilder};
pub use world::WorldState;
