//! Linear expressions and constraints over model variables

use std::fmt;

/// Handle to a variable inside one [`super::Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub(crate) usize);

impl VarId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// `constant + Σ coefficient · variable`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
    constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constant(value: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    /// Builder-style variant of [`LinearExpr::add_term`].
    pub fn with_term(mut self, var: VarId, coefficient: f64) -> Self {
        self.add_term(var, coefficient);
        self
    }

    pub fn add_term(&mut self, var: VarId, coefficient: f64) {
        self.terms.push((var, coefficient));
    }

    pub fn add_var(&mut self, var: VarId) {
        self.add_term(var, 1.0);
    }

    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    pub fn add_expr(&mut self, other: &LinearExpr) {
        self.terms.extend_from_slice(&other.terms);
        self.constant += other.constant;
    }

    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    pub fn constant_term(&self) -> f64 {
        self.constant
    }

    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// Value under an assignment of variable values.
    pub fn evaluate(&self, value_of: impl Fn(VarId) -> f64) -> f64 {
        self.constant
            + self
                .terms
                .iter()
                .map(|&(var, coef)| coef * value_of(var))
                .sum::<f64>()
    }
}

impl From<VarId> for LinearExpr {
    fn from(var: VarId) -> Self {
        LinearExpr::new().with_term(var, 1.0)
    }
}

impl From<f64> for LinearExpr {
    fn from(value: f64) -> Self {
        LinearExpr::constant(value)
    }
}

impl FromIterator<VarId> for LinearExpr {
    fn from_iter<I: IntoIterator<Item = VarId>>(iter: I) -> Self {
        let mut expr = LinearExpr::new();
        for var in iter {
            expr.add_var(var);
        }
        expr
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Le,
    Eq,
    Ge,
}

impl Relation {
    pub fn symbol(&self) -> &'static str {
        match self {
            Relation::Le => "<=",
            Relation::Eq => "==",
            Relation::Ge => ">=",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// `lhs relation rhs`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub lhs: LinearExpr,
    pub relation: Relation,
    pub rhs: LinearExpr,
}

impl LinearConstraint {
    pub fn new(lhs: impl Into<LinearExpr>, relation: Relation, rhs: impl Into<LinearExpr>) -> Self {
        Self {
            lhs: lhs.into(),
            relation,
            rhs: rhs.into(),
        }
    }

    pub fn le(lhs: impl Into<LinearExpr>, rhs: impl Into<LinearExpr>) -> Self {
        Self::new(lhs, Relation::Le, rhs)
    }

    pub fn eq(lhs: impl Into<LinearExpr>, rhs: impl Into<LinearExpr>) -> Self {
        Self::new(lhs, Relation::Eq, rhs)
    }

    pub fn ge(lhs: impl Into<LinearExpr>, rhs: impl Into<LinearExpr>) -> Self {
        Self::new(lhs, Relation::Ge, rhs)
    }

    /// `lhs - rhs`, the quantity the relation compares against zero.
    pub fn slack(&self) -> LinearExpr {
        let mut expr = self.lhs.clone();
        for &(var, coef) in self.rhs.terms() {
            expr.add_term(var, -coef);
        }
        expr.add_constant(-self.rhs.constant_term());
        expr
    }

    pub fn is_satisfied(&self, value_of: impl Fn(VarId) -> f64, tolerance: f64) -> bool {
        let gap = self.slack().evaluate(value_of);
        match self.relation {
            Relation::Le => gap <= tolerance,
            Relation::Eq => gap.abs() <= tolerance,
            Relation::Ge => gap >= -tolerance,
        }
    }
}
