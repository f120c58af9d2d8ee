//! Named verification scenarios.

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// The starter pond with the four canonical rules
    Canonical,

    /// No rules at all: every step is a no-op
    EmptyRules,

    /// `X -> Y` with no X: nothing ever fires
    StarvedRule,

    /// Abundant swap rules: each rule drawn ~1/N of the time
    Uniformity,

    /// `A + A -> B`: repeated reactants consume two units
    Dimerization,

    /// `S -> P (Cat: K)`: the catalyst count never moves
    CatalystConservation,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Canonical,
            ScenarioId::EmptyRules,
            ScenarioId::StarvedRule,
            ScenarioId::Uniformity,
            ScenarioId::Dimerization,
            ScenarioId::CatalystConservation,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Canonical => "canonical",
            ScenarioId::EmptyRules => "empty_rules",
            ScenarioId::StarvedRule => "starved_rule",
            ScenarioId::Uniformity => "uniformity",
            ScenarioId::Dimerization => "dimerization",
            ScenarioId::CatalystConservation => "catalyst_conservation",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Canonical => {
                "A+B->D, D+C->E, D+A->E (Cat: E), E->A from {A,B,C:500, E:1}"
            }
            ScenarioId::EmptyRules => "Empty rule set, counts and event frozen",
            ScenarioId::StarvedRule => "X->Y with X=0, nothing ever fires",
            ScenarioId::Uniformity => "4 abundant rules, each drawn with frequency ~1/4",
            ScenarioId::Dimerization => "A+A->B from odd A, one A left over",
            ScenarioId::CatalystConservation => "S->P catalysed by K, K untouched",
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "canonical" | "cas" => Ok(ScenarioId::Canonical),
            "empty_rules" | "empty" => Ok(ScenarioId::EmptyRules),
            "starved_rule" | "starved" => Ok(ScenarioId::StarvedRule),
            "uniformity" | "uniform" => Ok(ScenarioId::Uniformity),
            "dimerization" | "dimer" => Ok(ScenarioId::Dimerization),
            "catalyst_conservation" | "catalyst" => Ok(ScenarioId::CatalystConservation),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_parse_back() {
        for id in ScenarioId::all() {
            assert_eq!(id.name().parse::<ScenarioId>(), Ok(id));
            assert_eq!(id.to_string(), id.name());
        }
    }

    #[test]
    fn test_aliases_and_case() {
        assert_eq!("CAS".parse::<ScenarioId>(), Ok(ScenarioId::Canonical));
        assert_eq!("Dimer".parse::<ScenarioId>(), Ok(ScenarioId::Dimerization));
        assert!("warp".parse::<ScenarioId>().is_err());
    }
}
