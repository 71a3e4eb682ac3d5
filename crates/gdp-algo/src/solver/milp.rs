//! `good_lp` backend
//!
//! Translates a [`Model`] into `good_lp` variables and constraints. Indicator
//! constraints are linearized with big-M rows using each indicator's bound:
//!
//! ```text
//! b == 0 => lhs - rhs (rel) 0    becomes    -M·b <= lhs - rhs <= M·b
//! b == 1 => lhs - rhs (rel) 0    becomes    -M·(1-b) <= lhs - rhs <= M·(1-b)
//! ```
//!
//! keeping only the side(s) the relation needs.

use super::{BackendKind, ModelSolution, SolveOptions, SolveStatus, SolverBackend};
use crate::error::{ModelError, ModelResult};
use crate::model::{ConstraintBody, Domain, Indicator, LinearConstraint, LinearExpr, Model, Relation};
use good_lp::{
    constraint, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel,
    Variable,
};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Model translated into `good_lp` terms.
struct Translated {
    vars: ProblemVariables,
    handles: Vec<Variable>,
    objective: Expression,
    constraints: Vec<good_lp::Constraint>,
}

fn to_expression(expr: &LinearExpr, handles: &[Variable]) -> Expression {
    let mut out = Expression::from(expr.constant_term());
    for &(var, coef) in expr.terms() {
        out += coef * handles[var.index()];
    }
    out
}

fn linear_rows(constraint: &LinearConstraint, handles: &[Variable]) -> good_lp::Constraint {
    let lhs = to_expression(&constraint.lhs, handles);
    let rhs = to_expression(&constraint.rhs, handles);
    match constraint.relation {
        Relation::Le => constraint!(lhs <= rhs),
        Relation::Eq => constraint!(lhs == rhs),
        Relation::Ge => constraint!(lhs >= rhs),
    }
}

fn big_m_rows(indicator: &Indicator, handles: &[Variable]) -> Vec<good_lp::Constraint> {
    let slack = to_expression(&indicator.constraint.slack(), handles);
    let b = handles[indicator.trigger.index()];
    let m = indicator.bound;
    // Room left to the slack: zero when the indicator fires, M otherwise.
    let (upper, lower): (Expression, Expression) = if indicator.active_when {
        (m - m * b, -m + m * b)
    } else {
        (m * b, (-m) * b)
    };

    let mut rows = Vec::with_capacity(2);
    if matches!(indicator.constraint.relation, Relation::Le | Relation::Eq) {
        rows.push(constraint!(slack.clone() <= upper));
    }
    if matches!(indicator.constraint.relation, Relation::Ge | Relation::Eq) {
        rows.push(constraint!(slack >= lower));
    }
    rows
}

fn translate(model: &Model) -> Translated {
    let mut vars = ProblemVariables::new();
    let mut handles = Vec::with_capacity(model.num_variables());
    for def in model.variables() {
        let mut definition = match def.domain {
            Domain::Continuous => variable(),
            Domain::Integer => variable().integer(),
            Domain::Binary => variable().binary(),
        };
        if def.domain != Domain::Binary {
            if def.lower.is_finite() {
                definition = definition.min(def.lower);
            }
            if def.upper.is_finite() {
                definition = definition.max(def.upper);
            }
        }
        handles.push(vars.add(definition.name(def.key.to_string())));
    }

    let objective = to_expression(&model.objective(), &handles);

    let mut constraints = Vec::with_capacity(model.num_constraints());
    for constraint in model.constraints() {
        match &constraint.body {
            ConstraintBody::Linear(linear) => constraints.push(linear_rows(linear, &handles)),
            ConstraintBody::Indicator(indicator) => {
                constraints.extend(big_m_rows(indicator, &handles))
            }
        }
    }

    Translated {
        vars,
        handles,
        objective,
        constraints,
    }
}

/// Map an engine result onto a [`ModelSolution`].
///
/// The status is whatever the engine reported: a returned solution is
/// optimal, and a stop is classified from the engine's own error.
fn finish<S: Solution>(
    outcome: Result<S, ResolutionError>,
    model: &Model,
    handles: &[Variable],
    backend: &str,
    started: Instant,
) -> ModelResult<ModelSolution> {
    let elapsed = started.elapsed();
    match outcome {
        Ok(solution) => {
            let values: Vec<f64> = handles.iter().map(|&h| solution.value(h)).collect();
            ModelSolution::with_values(SolveStatus::Optimal, backend, elapsed, model, &values)
        }
        Err(err) => Ok(ModelSolution::without_values(
            engine_status(err),
            backend,
            elapsed,
        )),
    }
}

fn engine_status(err: ResolutionError) -> SolveStatus {
    match err {
        ResolutionError::Infeasible => SolveStatus::Infeasible,
        ResolutionError::Unbounded => SolveStatus::Unbounded,
        other => {
            let message = other.to_string();
            let normalized = message.to_ascii_lowercase().replace([' ', '_'], "");
            if normalized.contains("timelimit") {
                SolveStatus::TimeLimit
            } else {
                SolveStatus::Other(message)
            }
        }
    }
}

/// Solves planning models with a `good_lp` engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoodLpBackend {
    kind: BackendKind,
}

impl GoodLpBackend {
    pub fn new(kind: BackendKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    #[cfg(feature = "solver-microlp")]
    fn solve_microlp(&self, model: &Model, options: &SolveOptions) -> ModelResult<ModelSolution> {
        use good_lp::solvers::microlp::microlp;

        // microlp has neither a time limit nor a log to forward.
        if options.time_limit.is_some() {
            warn!("microlp ignores the time limit; solving to optimality");
        }
        if options.verbose {
            debug!("microlp produces no solver log");
        }
        let started = Instant::now();
        let Translated {
            vars,
            handles,
            objective,
            constraints,
        } = translate(model);
        let mut problem = vars.minimise(objective).using(microlp);
        for row in constraints {
            problem = problem.with(row);
        }
        finish(problem.solve(), model, &handles, self.id(), started)
    }

    #[cfg(feature = "solver-highs")]
    fn solve_highs(&self, model: &Model, options: &SolveOptions) -> ModelResult<ModelSolution> {
        use good_lp::solvers::highs::highs;

        let started = Instant::now();
        let Translated {
            vars,
            handles,
            objective,
            constraints,
        } = translate(model);
        let mut problem = vars
            .minimise(objective)
            .using(highs)
            .set_verbose(options.verbose);
        if let Some(limit) = options.time_limit {
            problem = problem.set_time_limit(limit.as_secs_f64());
        }
        for row in constraints {
            problem = problem.with(row);
        }
        finish(problem.solve(), model, &handles, self.id(), started)
    }
}

impl SolverBackend for GoodLpBackend {
    fn id(&self) -> &str {
        self.kind.as_str()
    }

    fn solve(&self, model: &Model, options: &SolveOptions) -> ModelResult<ModelSolution> {
        info!(
            backend = self.id(),
            model = model.name(),
            variables = model.num_variables(),
            constraints = model.num_constraints(),
            "solving planning model"
        );
        let result = match self.kind {
            #[cfg(feature = "solver-microlp")]
            BackendKind::Microlp => self.solve_microlp(model, options),
            #[cfg(feature = "solver-highs")]
            BackendKind::Highs => self.solve_highs(model, options),
            #[allow(unreachable_patterns)]
            other => Err(ModelError::Backend(format!(
                "backend '{}' is not compiled in",
                other.as_str()
            ))),
        }?;
        info!(
            backend = self.id(),
            status = %result.status,
            objective = ?result.objective,
            elapsed_ms = result.solve_time.as_millis() as u64,
            "solve finished"
        );
        Ok(result)
    }
}

#[cfg(all(test, feature = "solver-microlp"))]
mod tests {
    use super::*;
    use crate::model::{ConstraintTag, VarKey, VariableDef};
    use gdp_core::ScenarioId;

    fn key(period: usize) -> VarKey {
        VarKey::Air {
            scenario: ScenarioId::new(0),
            period,
        }
    }

    fn revision() -> VarKey {
        VarKey::Revision {
            scenario: ScenarioId::new(0),
            period: 1,
        }
    }

    #[test]
    fn solves_small_integer_program() {
        // min x + 2y  s.t.  x + y >= 3.5 over integers  =>  x = 4, y = 0
        let mut model = Model::new("small");
        let x = model.add_variable(VariableDef::count(key(0)).cost(1.0)).unwrap();
        let y = model
            .add_variable(VariableDef::count(key(1)).max(1.0).cost(2.0))
            .unwrap();
        model.add_linear(
            ConstraintTag::ArrivalBalance,
            LinearConstraint::ge(LinearExpr::from(x).with_term(y, 1.0), 3.5),
        );

        let solution = GoodLpBackend::default()
            .solve(&model, &SolveOptions::default())
            .unwrap();
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert!((solution.objective.unwrap() - 4.0).abs() < 1e-6);
        assert!((solution.value(&key(0)).unwrap() - 4.0).abs() < 1e-6);
        assert!(solution.value(&key(1)).unwrap().abs() < 1e-6);
    }

    #[test]
    fn time_limit_is_not_reported_for_a_completed_solve() {
        let mut model = Model::new("limited");
        let x = model.add_variable(VariableDef::count(key(0)).cost(1.0)).unwrap();
        model.add_linear(ConstraintTag::ArrivalBalance, LinearConstraint::ge(x, 1.0));

        let options = SolveOptions::default()
            .with_time_limit(std::time::Duration::ZERO)
            .with_verbose(true);
        let solution = GoodLpBackend::default().solve(&model, &options).unwrap();
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert!((solution.objective.unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn engine_errors_keep_their_own_status() {
        assert_eq!(
            engine_status(ResolutionError::Infeasible),
            SolveStatus::Infeasible
        );
        assert_eq!(
            engine_status(ResolutionError::Str("Reached time limit".into())),
            SolveStatus::TimeLimit
        );
        assert_eq!(
            engine_status(ResolutionError::Other("TimeLimit")),
            SolveStatus::TimeLimit
        );
        assert!(matches!(
            engine_status(ResolutionError::Str("numerical trouble".into())),
            SolveStatus::Other(msg) if msg.contains("numerical trouble")
        ));
    }

    #[test]
    fn infeasible_model_is_a_status_not_an_error() {
        let mut model = Model::new("infeasible");
        let x = model
            .add_variable(VariableDef::count(key(0)).max(1.0))
            .unwrap();
        model.add_linear(ConstraintTag::ArrivalBalance, LinearConstraint::ge(x, 2.0));

        let solution = GoodLpBackend::default()
            .solve(&model, &SolveOptions::default())
            .unwrap();
        assert_eq!(solution.status, SolveStatus::Infeasible);
        assert!(!solution.has_values());
        assert!(solution.objective.is_none());
    }

    #[test]
    fn indicator_gates_variable_through_big_m() {
        // x must reach 2, but only an active revision (cost 5) lets it move.
        let mut model = Model::new("indicator");
        let x = model.add_variable(VariableDef::free_integer(key(0))).unwrap();
        let b = model
            .add_variable(VariableDef::binary(revision()).cost(5.0))
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
        model.add_linear(ConstraintTag::ArrivalBalance, LinearConstraint::ge(x, 2.0));

        let solution = GoodLpBackend::default()
            .solve(&model, &SolveOptions::default())
            .unwrap();
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert!((solution.value(&revision()).unwrap() - 1.0).abs() < 1e-6);
        assert!((solution.objective.unwrap() - 5.0).abs() < 1e-6);
    }
}
