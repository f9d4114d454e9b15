//! Facts, fact values, and numeric fact values.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// A numeric fact value.
///
/// Function facts such as `itemcount(inventory,3)` carry a number in their
/// last position. Integers and floats compare and hash by numeric value, so
/// `Int(2)` and `Float(2.0)` are the same fact argument.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Num {
    /// An integer value.
    Int(i64),
    /// A floating-point value.
    Float(f64),
}

impl Num {
    /// The value as an `f64`, for comparison and arithmetic.
    pub fn as_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }

    /// Add two numbers. Stays integral only if both sides are integers.
    pub fn add(self, other: Num) -> Num {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => Num::Int(a + b),
            (a, b) => Num::Float(a.as_f64() + b.as_f64()),
        }
    }

    /// Subtract `other` from `self`. Stays integral only if both sides are integers.
    pub fn sub(self, other: Num) -> Num {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => Num::Int(a - b),
            (a, b) => Num::Float(a.as_f64() - b.as_f64()),
        }
    }
}

impl PartialEq for Num {
    fn eq(&self, other: &Self) -> bool {
        self.as_f64().to_bits() == other.as_f64().to_bits()
    }
}

impl Eq for Num {}

impl Hash for Num {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.as_f64().to_bits());
    }
}

impl PartialOrd for Num {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.as_f64().partial_cmp(&other.as_f64())
    }
}

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Num::Int(i) => write!(f, "{i}"),
            Num::Float(x) => write!(f, "{x}"),
        }
    }
}

impl FromStr for Num {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        if s.contains('.') {
            s.parse::<f64>()
                .map(Num::Float)
                .map_err(|_| CoreError::MalformedFact(s.to_string()))
        } else {
            s.parse::<i64>()
                .map(Num::Int)
                .map_err(|_| CoreError::MalformedFact(s.to_string()))
        }
    }
}

/// One argument position of a fact: an identifier or a number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactValue {
    /// An instance identifier, type name, or free text.
    Id(String),
    /// A numeric function value.
    Num(Num),
}

impl FactValue {
    /// The identifier string, if this value is one.
    pub fn as_id(&self) -> Option<&str> {
        match self {
            FactValue::Id(s) => Some(s),
            FactValue::Num(_) => None,
        }
    }

    /// The numeric value, if this value is one.
    pub fn as_num(&self) -> Option<Num> {
        match self {
            FactValue::Id(_) => None,
            FactValue::Num(n) => Some(*n),
        }
    }
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactValue::Id(s) => write!(f, "{s}"),
            FactValue::Num(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for FactValue {
    fn from(s: &str) -> Self {
        FactValue::Id(s.to_string())
    }
}

impl From<String> for FactValue {
    fn from(s: String) -> Self {
        FactValue::Id(s)
    }
}

impl From<Num> for FactValue {
    fn from(n: Num) -> Self {
        FactValue::Num(n)
    }
}

/// An immutable tuple of one predicate and one to three arguments.
///
/// Facts are value-equal and hashable; a world state never holds two equal
/// facts. The textual form is `predicate(arg1,arg2,arg3)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fact {
    /// The predicate name.
    pub predicate: String,
    /// The argument positions, in order.
    pub args: Vec<FactValue>,
}

impl Fact {
    /// Create a fact from a predicate and argument list.
    pub fn new(predicate: impl Into<String>, args: Vec<FactValue>) -> Self {
        Self {
            predicate: predicate.into(),
            args,
        }
    }

    /// Create a one-argument fact, e.g. `takeable(apple1)`.
    pub fn unary(predicate: impl Into<String>, arg: impl Into<FactValue>) -> Self {
        Self::new(predicate, vec![arg.into()])
    }

    /// Create a two-argument fact, e.g. `at(apple1,kitchen1)`.
    pub fn binary(
        predicate: impl Into<String>,
        arg1: impl Into<FactValue>,
        arg2: impl Into<FactValue>,
    ) -> Self {
        Self::new(predicate, vec![arg1.into(), arg2.into()])
    }

    /// Create a three-argument fact.
    pub fn ternary(
        predicate: impl Into<String>,
        arg1: impl Into<FactValue>,
        arg2: impl Into<FactValue>,
        arg3: impl Into<FactValue>,
    ) -> Self {
        Self::new(predicate, vec![arg1.into(), arg2.into(), arg3.into()])
    }

    /// The argument at `idx`, if present.
    pub fn arg(&self, idx: usize) -> Option<&FactValue> {
        self.args.get(idx)
    }

    /// The identifier at argument position `idx`, if present and an id.
    pub fn id_arg(&self, idx: usize) -> Option<&str> {
        self.args.get(idx).and_then(FactValue::as_id)
    }

    /// The number at argument position `idx`, if present and numeric.
    pub fn num_arg(&self, idx: usize) -> Option<Num> {
        self.args.get(idx).and_then(FactValue::as_num)
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self.args.iter().map(ToString::to_string).collect();
        write!(f, "{}({})", self.predicate, args.join(","))
    }
}

impl FromStr for Fact {
    type Err = CoreError;

    /// Parse the textual `predicate(arg1,arg2)` form.
    ///
    /// Only the first two commas split. A third argument keeps any commas it
    /// contains, so readable-text content with prose commas lands in the tail
    /// positions and can be reassembled by joining them back.
    fn from_str(s: &str) -> CoreResult<Self> {
        let open = s
            .find('(')
            .ok_or_else(|| CoreError::MalformedFact(s.to_string()))?;
        let predicate = s[..open].trim();
        let rest = &s[open + 1..];
        let inner = rest
            .strip_suffix(')')
            .ok_or_else(|| CoreError::MalformedFact(s.to_string()))?;
        if predicate.is_empty() {
            return Err(CoreError::MalformedFact(s.to_string()));
        }
        if inner.trim().is_empty() {
            return Err(CoreError::BadArity {
                fact: s.to_string(),
                count: 0,
            });
        }
        let args: Vec<FactValue> = inner
            .splitn(3, ',')
            .map(|a| FactValue::Id(a.to_string()))
            .collect();
        Ok(Fact::new(predicate, args))
    }
}
