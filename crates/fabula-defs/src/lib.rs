//! Declarative definitions for the Fabula engine.
//!
//! An adventure is loaded from JSON into the types of this crate: entity and
//! room type definitions, the domain type hierarchy with its numeric function
//! declarations, and the action and event schemas whose condition and effect
//! trees the engine interprets. Everything here is data; the interpretation
//! lives in `fabula-engine`.

/// Condition trees evaluated against a world state.
pub mod condition;
/// Effect trees applied to a world state.
pub mod effect;
/// Error types for definition loading and validation.
pub mod error;
/// Adventure, domain, and type definitions plus JSON loading.
pub mod load;
/// Action and event schemas.
pub mod schema;

pub use condition::{CompareOp, Condition, FunctionRef, NumTerm, Term};
pub use effect::{Effect, FunctionOp, IterFilter, Polarity};
pub use error::{DefsError, DefsResult};
pub use load::{AdventureDef, DomainDef, EntityTypeDef, RoomTypeDef};
pub use schema::{
    ActionSchema, BindingSource, EventParameter, EventSchema, FailureTemplate, Parameter,
    RandomizeRule,
};
