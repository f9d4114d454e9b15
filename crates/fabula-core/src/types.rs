//! The domain type graph: supertypes, traits, and numeric functions.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Declaration of a mutable numeric state ("function") in the domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDef {
    /// The predicate carrying the numeric value, e.g. `itemcount`.
    pub predicate: String,
    /// The type whose instances own a value of this function.
    pub owner_type: String,
}

/// The static type hierarchy of a loaded domain.
///
/// Built once per session from the domain's supertype declarations plus trait
/// edges synthesized from entity definitions, then read-only. The derived
/// ancestor index is transitive, so `is_subtype` answers through any number
/// of hierarchy levels.
#[derive(Debug, Clone, Default)]
pub struct TypeGraph {
    /// subtype → all ancestor type names (transitive, including traits).
    ancestors: HashMap<String, Vec<String>>,
    /// supertype → all transitive subtypes.
    descendants: HashMap<String, Vec<String>>,
    functions: Vec<FunctionDef>,
}

impl TypeGraph {
    /// Start building a type graph.
    pub fn builder() -> TypeGraphBuilder {
        TypeGraphBuilder::default()
    }

    /// Whether `concrete` satisfies the requirement `required`.
    ///
    /// True if the names are equal or `required` is an ancestor of
    /// `concrete`. A name absent from the graph never matches; unresolved
    /// bindings therefore fail type checks instead of crashing.
    pub fn is_subtype(&self, concrete: &str, required: &str) -> bool {
        concrete == required
            || self
                .ancestors
                .get(concrete)
                .is_some_and(|a| a.iter().any(|t| t == required))
    }

    /// All ancestors of a type, if it is known to the graph.
    pub fn ancestors_of(&self, type_name: &str) -> &[String] {
        self.ancestors
            .get(type_name)
            .map_or(&[], Vec::as_slice)
    }

    /// The concrete types matching a requirement: the type itself plus every
    /// transitive subtype.
    pub fn concrete_types_of(&self, required: &str) -> Vec<String> {
        let mut types = vec![required.to_string()];
        if let Some(subs) = self.descendants.get(required) {
            types.extend(subs.iter().cloned());
        }
        types
    }

    /// The domain's numeric function declarations.
    pub fn functions(&self) -> &[FunctionDef] {
        &self.functions
    }
}

/// Builder assembling a [`TypeGraph`] from hierarchy and trait declarations.
#[derive(Debug, Default)]
pub struct TypeGraphBuilder {
    /// supertype → direct subtypes.
    edges: BTreeMap<String, Vec<String>>,
    functions: Vec<FunctionDef>,
}

impl TypeGraphBuilder {
    /// Declare that `subtype` is a direct subtype of `supertype`.
    pub fn edge(mut self, supertype: impl Into<String>, subtype: impl Into<String>) -> Self {
        self.edges
            .entry(supertype.into())
            .or_default()
            .push(subtype.into());
        self
    }

    /// Declare a whole supertype → subtypes table at once.
    pub fn hierarchy<I, S>(mut self, table: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<S>)>,
        S: Into<String>,
    {
        for (supertype, subtypes) in table {
            let entry = self.edges.entry(supertype.into()).or_default();
            entry.extend(subtypes.into_iter().map(Into::into));
        }
        self
    }

    /// Declare a trait of an entity type. Traits become additional supertype
    /// edges, so a parameter typed by a trait accepts every carrier.
    pub fn entity_trait(self, trait_name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.edge(trait_name, type_name)
    }

    /// Declare a numeric function.
    pub fn function(mut self, def: FunctionDef) -> Self {
        self.functions.push(def);
        self
    }

    /// Compute the transitive ancestor and descendant indexes.
    pub fn build(self) -> TypeGraph {
        let mut parents: HashMap<&str, Vec<&str>> = HashMap::new();
        for (supertype, subtypes) in &self.edges {
            for subtype in subtypes {
                parents.entry(subtype).or_default().push(supertype);
            }
        }

        let mut ancestors: HashMap<String, Vec<String>> = HashMap::new();
        for subtype in parents.keys() {
            let mut seen: HashSet<&str> = HashSet::new();
            let mut stack: Vec<&str> = parents[subtype].clone();
            while let Some(ancestor) = stack.pop() {
                if !seen.insert(ancestor) {
                    continue;
                }
                if let Some(grandparents) = parents.get(ancestor) {
                    stack.extend(grandparents.iter().copied());
                }
            }
            let mut list: Vec<String> = seen.into_iter().map(str::to_string).collect();
            list.sort();
            ancestors.insert((*subtype).to_string(), list);
        }

        let mut descendants: HashMap<String, Vec<String>> = HashMap::new();
        for (subtype, supers) in &ancestors {
            for supertype in supers {
                descendants
                    .entry(supertype.clone())
                    .or_default()
                    .push(subtype.clone());
            }
        }
        for subs in descendants.values_mut() {
            subs.sort();
        }

        TypeGraph {
            ancestors,
            descendants,
            functions: self.functions,
        }
    }
}
