//! Solver-neutral optimization model
//!
//! A [`Model`] is a list of variables (typed key, domain, bounds, objective
//! coefficient) and tagged constraints, minimised. Backends translate it into
//! their own representation; see [`crate::solver`].
//!
//! Variables are looked up by [`VarKey`]. Asking for a key that was never
//! created is a construction bug and surfaces as
//! [`ModelError::MissingVariable`] so the build aborts.

mod expr;
mod key;

pub use expr::{LinearConstraint, LinearExpr, Relation, VarId};
pub use key::VarKey;

use crate::error::{ModelError, ModelResult};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Continuous,
    Integer,
    Binary,
}

/// Variable declaration: key, domain, bounds and objective coefficient.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDef {
    pub key: VarKey,
    pub domain: Domain,
    pub lower: f64,
    pub upper: f64,
    pub objective: f64,
}

impl VariableDef {
    pub fn new(key: VarKey, domain: Domain) -> Self {
        let (lower, upper) = match domain {
            Domain::Binary => (0.0, 1.0),
            Domain::Continuous | Domain::Integer => (0.0, f64::INFINITY),
        };
        Self {
            key,
            domain,
            lower,
            upper,
            objective: 0.0,
        }
    }

    /// Non-negative integer count.
    pub fn count(key: VarKey) -> Self {
        Self::new(key, Domain::Integer)
    }

    pub fn binary(key: VarKey) -> Self {
        Self::new(key, Domain::Binary)
    }

    /// Integer without bounds in either direction.
    pub fn free_integer(key: VarKey) -> Self {
        Self::new(key, Domain::Integer).min(f64::NEG_INFINITY)
    }

    pub fn min(mut self, lower: f64) -> Self {
        self.lower = lower;
        self
    }

    pub fn max(mut self, upper: f64) -> Self {
        self.upper = upper;
        self
    }

    pub fn cost(mut self, objective: f64) -> Self {
        self.objective = objective;
        self
    }
}

/// What a constraint enforces; used for diagnostics and statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintTag {
    DepartureBalance,
    ArrivalBalance,
    NonAnticipativity,
    Assignment,
    RevisionGate,
    RevisionLimit,
    RevisionNonNegativity,
}

impl ConstraintTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintTag::DepartureBalance => "departure_balance",
            ConstraintTag::ArrivalBalance => "arrival_balance",
            ConstraintTag::NonAnticipativity => "non_anticipativity",
            ConstraintTag::Assignment => "assignment",
            ConstraintTag::RevisionGate => "revision_gate",
            ConstraintTag::RevisionLimit => "revision_limit",
            ConstraintTag::RevisionNonNegativity => "revision_non_negativity",
        }
    }
}

impl fmt::Display for ConstraintTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `trigger == active_when  =>  constraint`
///
/// `bound` caps `|lhs - rhs|` of the guarded constraint over every feasible
/// point, for backends that linearize with big-M.
#[derive(Debug, Clone, PartialEq)]
pub struct Indicator {
    pub trigger: VarId,
    pub active_when: bool,
    pub constraint: LinearConstraint,
    pub bound: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintBody {
    Linear(LinearConstraint),
    Indicator(Indicator),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub tag: ConstraintTag,
    pub body: ConstraintBody,
}

impl Constraint {
    /// Check against a full assignment of values.
    pub fn is_satisfied(&self, value_of: impl Fn(VarId) -> f64 + Copy, tolerance: f64) -> bool {
        match &self.body {
            ConstraintBody::Linear(linear) => linear.is_satisfied(value_of, tolerance),
            ConstraintBody::Indicator(indicator) => {
                let fired = (value_of(indicator.trigger) > 0.5) == indicator.active_when;
                !fired || indicator.constraint.is_satisfied(value_of, tolerance)
            }
        }
    }
}

/// Size summary of a built model.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelStats {
    pub variables: BTreeMap<Domain, usize>,
    pub constraints: BTreeMap<ConstraintTag, usize>,
}

impl ModelStats {
    pub fn num_variables(&self) -> usize {
        self.variables.values().sum()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.values().sum()
    }
}

impl fmt::Display for ModelStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} variables (", self.num_variables())?;
        let domains: Vec<String> = self
            .variables
            .iter()
            .map(|(domain, n)| format!("{domain:?}: {n}").to_lowercase())
            .collect();
        write!(f, "{}), {} constraints (", domains.join(", "), self.num_constraints())?;
        let tags: Vec<String> = self
            .constraints
            .iter()
            .map(|(tag, n)| format!("{tag}: {n}"))
            .collect();
        write!(f, "{})", tags.join(", "))
    }
}

/// Minimisation model over typed variables.
#[derive(Debug, Clone, Default)]
pub struct Model {
    name: String,
    variables: Vec<VariableDef>,
    index: HashMap<VarKey, VarId>,
    constraints: Vec<Constraint>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a variable. Each key may be declared once.
    pub fn add_variable(&mut self, def: VariableDef) -> ModelResult<VarId> {
        if self.index.contains_key(&def.key) {
            return Err(ModelError::DuplicateVariable(def.key));
        }
        let id = VarId(self.variables.len());
        self.index.insert(def.key, id);
        self.variables.push(def);
        Ok(id)
    }

    /// Handle for `key`, failing if it was never declared.
    pub fn var(&self, key: &VarKey) -> ModelResult<VarId> {
        self.index
            .get(key)
            .copied()
            .ok_or(ModelError::MissingVariable(*key))
    }

    pub fn try_var(&self, key: &VarKey) -> Option<VarId> {
        self.index.get(key).copied()
    }

    pub fn contains(&self, key: &VarKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn variable(&self, id: VarId) -> &VariableDef {
        &self.variables[id.0]
    }

    pub fn variables(&self) -> &[VariableDef] {
        &self.variables
    }

    /// Variables paired with their handles, in declaration order.
    pub fn iter_variables(&self) -> impl Iterator<Item = (VarId, &VariableDef)> + '_ {
        self.variables
            .iter()
            .enumerate()
            .map(|(idx, def)| (VarId(idx), def))
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn add_linear(&mut self, tag: ConstraintTag, constraint: LinearConstraint) {
        self.constraints.push(Constraint {
            tag,
            body: ConstraintBody::Linear(constraint),
        });
    }

    pub fn add_indicator(&mut self, tag: ConstraintTag, indicator: Indicator) {
        self.constraints.push(Constraint {
            tag,
            body: ConstraintBody::Indicator(indicator),
        });
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn constraints_tagged(&self, tag: ConstraintTag) -> impl Iterator<Item = &Constraint> + '_ {
        self.constraints.iter().filter(move |c| c.tag == tag)
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Objective as an expression over all variables with a non-zero cost.
    pub fn objective(&self) -> LinearExpr {
        let mut expr = LinearExpr::new();
        for (id, def) in self.iter_variables() {
            if def.objective != 0.0 {
                expr.add_term(id, def.objective);
            }
        }
        expr
    }

    pub fn stats(&self) -> ModelStats {
        let mut stats = ModelStats::default();
        for def in &self.variables {
            *stats.variables.entry(def.domain).or_default() += 1;
        }
        for constraint in &self.constraints {
            *stats.constraints.entry(constraint.tag).or_default() += 1;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gdp_core::ScenarioId;

    fn air(period: usize) -> VarKey {
        VarKey::Air {
            scenario: ScenarioId::new(0),
            period,
        }
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let mut model = Model::new("dup");
        model.add_variable(VariableDef::count(air(0))).unwrap();
        let err = model.add_variable(VariableDef::count(air(0))).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateVariable(key) if key == air(0)));
    }

    #[test]
    fn test_missing_key_fails_fast() {
        let model = Model::new("missing");
        let err = model.var(&air(3)).unwrap_err();
        assert!(err.to_string().contains("air[s0,t3]"));
    }

    #[test]
    fn test_objective_and_stats() {
        let mut model = Model::new("stats");
        let a = model
            .add_variable(VariableDef::count(air(0)).cost(2.0))
            .unwrap();
        let r = model
            .add_variable(VariableDef::binary(VarKey::Revision {
                scenario: ScenarioId::new(0),
                period: 1,
            }))
            .unwrap();
        model.add_linear(
            ConstraintTag::RevisionLimit,
            LinearConstraint::le(r, 1.0),
        );
        model.add_linear(
            ConstraintTag::ArrivalBalance,
            LinearConstraint::ge(a, 0.0),
        );

        assert_eq!(model.objective().terms(), &[(a, 2.0)]);
        let stats = model.stats();
        assert_eq!(stats.num_variables(), 2);
        assert_eq!(stats.variables[&Domain::Binary], 1);
        assert_eq!(stats.constraints[&ConstraintTag::RevisionLimit], 1);
        assert_eq!(model.constraints_tagged(ConstraintTag::ArrivalBalance).count(), 1);
        assert!(stats.to_string().starts_with("2 variables"));
    }

    #[test]
    fn test_variable_def_defaults() {
        let binary = VariableDef::binary(air(0));
        assert_eq!((binary.lower, binary.upper), (0.0, 1.0));
        let free = VariableDef::free_integer(air(1));
        assert!(free.lower.is_infinite() && free.lower < 0.0);
        assert!(free.upper.is_infinite());
    }

    #[test]
    fn test_indicator_only_binds_when_fired() {
        let mut model = Model::new("indicator");
        let x = model.add_variable(VariableDef::count(air(0))).unwrap();
        let b = model
            .add_variable(VariableDef::binary(VarKey::Revision {
                scenario: ScenarioId::new(0),
                period: 1,
            }))
            .unwrap();
        model.add_indicator(
            ConstraintTag::RevisionGate,
            Indicator {
                trigger: b,
                active_when: false,
                constraint: LinearConstraint::eq(x, 0.0),
                bound: 10.0,
            },
        );
        let constraint = &model.constraints()[0];
        let values = |x_val: f64, b_val: f64| move |v: VarId| if v == x { x_val } else { b_val };
        assert!(constraint.is_satisfied(values(0.0, 0.0), 1e-9));
        assert!(!constraint.is_satisfied(values(3.0, 0.0), 1e-9));
        assert!(constraint.is_satisfied(values(3.0, 1.0), 1e-9));
    }
}
