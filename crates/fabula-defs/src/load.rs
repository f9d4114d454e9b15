//! Adventure, domain, and type definitions plus JSON loading.

use std::collections::{BTreeMap, HashSet};
use std::io::Read;

use fabula_core::FunctionDef;
use serde::{Deserialize, Serialize};

use crate::error::{DefsError, DefsResult};
use crate::schema::{ActionSchema, EventSchema};

/// Definition of one entity type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTypeDef {
    /// Surface string shown to the player, e.g. `wooden box`.
    pub repr_str: String,
    /// Traits of the type; each becomes a standalone fact per instance and a
    /// supertype edge in the type graph.
    #[serde(default)]
    pub traits: Vec<String>,
    /// Adjectives an instance generator may attach. Opaque to the engine.
    #[serde(default)]
    pub possible_adjs: Vec<String>,
    /// Hidden types are excluded from room descriptions and perception.
    #[serde(default)]
    pub hidden: bool,
}

/// Definition of one room type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomTypeDef {
    /// Surface string shown to the player, e.g. `kitchen`.
    pub repr_str: String,
    /// Adjectives an instance generator may attach. Opaque to the engine.
    #[serde(default)]
    pub possible_adjs: Vec<String>,
}

/// The domain shared by all adventures: hierarchy, functions, mutability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainDef {
    /// Supertype name to its direct subtypes.
    #[serde(default)]
    pub hierarchy: BTreeMap<String, Vec<String>>,
    /// Numeric function declarations.
    #[serde(default)]
    pub functions: Vec<FunctionDef>,
    /// Predicates whose facts count as mutable, perceivable state.
    #[serde(default = "default_mutable_predicates")]
    pub mutable_predicates: Vec<String>,
}

fn default_mutable_predicates() -> Vec<String> {
    ["open", "closed", "at", "in", "on"]
        .map(str::to_string)
        .to_vec()
}

/// A complete loaded adventure: types, domain, schemas, and state lists.
///
/// The initial and goal states are flat lists of textual facts in the
/// `predicate(arg1,arg2)` form; `fabula-core` parses them. Validation runs on
/// every load and is fatal: a schema that cannot express feedback for all of
/// its failure modes never reaches a running session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdventureDef {
    /// Entity type name to its definition.
    #[serde(default)]
    pub entity_types: BTreeMap<String, EntityTypeDef>,
    /// Room type name to its definition.
    #[serde(default)]
    pub room_types: BTreeMap<String, RoomTypeDef>,
    /// The domain declarations.
    #[serde(default)]
    pub domain: DomainDef,
    /// Player action schemas.
    #[serde(default)]
    pub actions: Vec<ActionSchema>,
    /// Ambient event schemas, in declaration order.
    #[serde(default)]
    pub events: Vec<EventSchema>,
    /// Initial facts as `predicate(arg1,arg2)` strings.
    #[serde(default)]
    pub initial_state: Vec<String>,
    /// Goal facts as `predicate(arg1,arg2)` strings.
    #[serde(default)]
    pub goal_state: Vec<String>,
}

impl AdventureDef {
    /// Load and validate an adventure from a JSON string.
    pub fn from_json(json: &str) -> DefsResult<Self> {
        let def: AdventureDef = serde_json::from_str(json)?;
        def.validate()?;
        Ok(def)
    }

    /// Load and validate an adventure from a reader.
    pub fn from_reader(reader: impl Read) -> DefsResult<Self> {
        let def: AdventureDef = serde_json::from_reader(reader)?;
        def.validate()?;
        Ok(def)
    }

    /// Check schema-level consistency.
    pub fn validate(&self) -> DefsResult<()> {
        let mut action_kinds = HashSet::new();
        for action in &self.actions {
            if !action_kinds.insert(action.kind.as_str()) {
                return Err(DefsError::DuplicateSchema(action.kind.clone()));
            }
            if action.parameters.is_empty() {
                return Err(DefsError::NoParameters(action.kind.clone()));
            }
            if action.parameter_failures.len() != action.parameters.len() {
                return Err(DefsError::ParameterFailureMismatch {
                    action: action.kind.clone(),
                    templates: action.parameter_failures.len(),
                    parameters: action.parameters.len(),
                });
            }
            let leaves = action.precondition.leaf_count();
            if action.precondition_failures.len() < leaves {
                return Err(DefsError::PreconditionFailureMismatch {
                    action: action.kind.clone(),
                    templates: action.precondition_failures.len(),
                    leaves,
                });
            }
        }
        let mut event_names = HashSet::new();
        for event in &self.events {
            if !event_names.insert(event.name.as_str()) {
                return Err(DefsError::DuplicateSchema(event.name.clone()));
            }
        }
        Ok(())
    }
}
