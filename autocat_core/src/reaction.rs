//! Reaction rules and the immutable rule set a pond draws from.
//!
//! A rule consumes one unit of each listed reactant (repeats consume
//! repeatedly), produces one unit of its product, and may require a
//! catalyst to be present. The catalyst role never changes a count.
//!
//! Rules print and parse in the same notation used for pond events:
//!
//! ```text
//! A + B -> D
//! D + A -> E (Cat: E)
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A single reaction rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    /// Consumed species, in display order
    pub reactants: Vec<String>,

    /// Produced species
    pub product: String,

    /// Required but unconsumed species
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub catalyst: Option<String>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// Checks that `name` is usable as a species identifier.
///
/// Names are non-empty runs of ASCII letters, digits and `_`. This keeps
/// them unambiguous inside the `A + B -> D (Cat: E)` notation.
pub fn validate_species(name: &str) -> Result<(), ConfigError> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Some("only ASCII letters, digits and '_' are allowed")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ConfigError::InvalidSpecies {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

impl Reaction {
    /// Creates an uncatalyzed rule.
    pub fn new<I, S>(reactants: I, product: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reactants: reactants.into_iter().map(Into::into).collect(),
            product: product.into(),
            catalyst: None,
        }
    }

    /// Requires `catalyst` to be present for this rule to fire.
    pub fn catalyzed_by(mut self, catalyst: impl Into<String>) -> Self {
        self.catalyst = Some(catalyst.into());
        self
    }

    /// Rejects rules with no reactants or malformed species names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reactants.is_empty() {
            return Err(ConfigError::EmptyReactants {
                product: self.product.clone(),
            });
        }
        for name in self.species() {
            validate_species(name)?;
        }
        Ok(())
    }

    /// True when the rule's product is also its catalyst.
    pub fn is_autocatalytic(&self) -> bool {
        self.catalyst.as_deref() == Some(self.product.as_str())
    }

    /// Every species this rule mentions, in any role, with repeats.
    pub fn species(&self) -> impl Iterator<Item = &str> {
        self.reactants
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.product.as_str()))
            .chain(self.catalyst.as_deref())
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.reactants.join(" + "), self.product)?;
        if let Some(catalyst) = &self.catalyst {
            write!(f, " (Cat: {})", catalyst)?;
        }
        Ok(())
    }
}

impl FromStr for Reaction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lhs, rhs) = s
            .split_once("->")
            .ok_or_else(|| ConfigError::parse(format!("missing '->' in {:?}", s)))?;

        let rhs = rhs.trim();
        let (product, catalyst) = match rhs.split_once('(') {
            Some((product, annotation)) => {
                let catalyst = annotation
                    .trim()
                    .strip_suffix(')')
                    .and_then(|inner| inner.trim().strip_prefix("Cat:"))
                    .map(str::trim)
                    .ok_or_else(|| {
                        ConfigError::parse(format!("expected '(Cat: <species>)' in {:?}", s))
                    })?;
                (product.trim(), Some(catalyst.to_string()))
            }
            None => (rhs, None),
        };

        let lhs = lhs.trim();
        let reactants = if lhs.is_empty() {
            Vec::new()
        } else {
            lhs.split('+').map(|r| r.trim().to_string()).collect()
        };

        let reaction = Reaction {
            reactants,
            product: product.to_string(),
            catalyst,
        };
        reaction.validate()?;
        Ok(reaction)
    }
}

/// The closed, ordered list of rules a pond samples from.
///
/// Validated once on construction; there are no mutation operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Reaction>", into = "Vec<Reaction>")]
pub struct ReactionSet {
    rules: Vec<Reaction>,
}

impl ReactionSet {
    /// Validates every rule and builds the set.
    pub fn new(rules: Vec<Reaction>) -> Result<Self, ConfigError> {
        for (index, rule) in rules.iter().enumerate() {
            rule.validate().map_err(|e| e.in_rule(index))?;
        }
        Ok(Self { rules })
    }

    /// A set with no rules. Stepping a pond built on it is a no-op.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// The starter autocatalytic set.
    ///
    /// 1. `A + B -> D`           basic synthesis
    /// 2. `D + C -> E`           initial complex formation
    /// 3. `D + A -> E (Cat: E)`  autocatalysis
    /// 4. `E -> A`               degradation, recycles feed
    pub fn canonical() -> Self {
        Self {
            rules: vec![
                Reaction::new(["A", "B"], "D"),
                Reaction::new(["D", "C"], "E"),
                Reaction::new(["D", "A"], "E").catalyzed_by("E"),
                Reaction::new(["E"], "A"),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Reaction> {
        self.rules.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Reaction> {
        self.rules.iter()
    }

    pub fn as_slice(&self) -> &[Reaction] {
        &self.rules
    }

    /// Distinct species mentioned by any rule.
    pub fn species(&self) -> BTreeSet<&str> {
        self.rules.iter().flat_map(Reaction::species).collect()
    }
}

impl TryFrom<Vec<Reaction>> for ReactionSet {
    type Error = ConfigError;

    fn try_from(rules: Vec<Reaction>) -> Result<Self, Self::Error> {
        Self::new(rules)
    }
}

impl From<ReactionSet> for Vec<Reaction> {
    fn from(set: ReactionSet) -> Self {
        set.rules
    }
}

impl<'a> IntoIterator for &'a ReactionSet {
    type Item = &'a Reaction;
    type IntoIter = std::slice::Iter<'a, Reaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
