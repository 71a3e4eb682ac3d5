//! Per-flight departure assignment
//!
//! Each sitting flight picks exactly one departure period per scenario, no
//! earlier than scheduled and no later than the last period that still lets
//! it land. Ground delay is charged on the assignment itself.

use super::builder::BuildContext;
use super::departure::DepartureEncoding;
use super::nonanticipativity::tie_through_period;
use crate::error::ModelResult;
use crate::model::{ConstraintTag, LinearConstraint, LinearExpr, Model, VarKey, VariableDef};
use gdp_core::{DiscreteFlight, FlightDemand, FlightId, ScenarioId};

fn assign(flight: FlightId, period: usize, scenario: ScenarioId) -> VarKey {
    VarKey::Assign {
        flight,
        period,
        scenario,
    }
}

pub(crate) struct FlightAssignment<'a> {
    /// Flights with their allowed departure window `depart_period..=last`.
    windows: Vec<(&'a DiscreteFlight, usize)>,
}

impl<'a> FlightAssignment<'a> {
    pub fn new(ctx: &BuildContext<'_>, flights: &'a FlightDemand) -> Self {
        let windows = flights
            .flights()
            .filter_map(|flight| {
                ctx.last_departure(flight.duration)
                    .filter(|&last| last >= flight.depart_period)
                    .map(|last| (flight, last))
            })
            .collect();
        Self { windows }
    }

    fn windows(&self) -> impl Iterator<Item = (&'a DiscreteFlight, usize)> + '_ {
        self.windows.iter().copied()
    }
}

impl DepartureEncoding for FlightAssignment<'_> {
    fn add_variables(&self, ctx: &BuildContext<'_>, model: &mut Model) -> ModelResult<()> {
        let ground_cost = ctx.input.costs().ground_cost;
        for scenario in ctx.scenarios() {
            for (flight, last) in self.windows() {
                for t in flight.depart_period..=last {
                    let delay = (t - flight.depart_period) as f64;
                    model.add_variable(
                        VariableDef::binary(assign(flight.id, t, scenario.id()))
                            .cost(ground_cost * delay * scenario.probability()),
                    )?;
                }
            }
        }
        Ok(())
    }

    fn add_departure_balance(&self, ctx: &BuildContext<'_>, model: &mut Model) -> ModelResult<()> {
        for scenario in ctx.scenarios() {
            for (flight, last) in self.windows() {
                let mut chosen = LinearExpr::new();
                for t in flight.depart_period..=last {
                    chosen.add_var(model.var(&assign(flight.id, t, scenario.id()))?);
                }
                model.add_linear(ConstraintTag::Assignment, LinearConstraint::eq(chosen, 1.0));
            }
        }
        Ok(())
    }

    fn arrivals(
        &self,
        _ctx: &BuildContext<'_>,
        model: &Model,
        scenario: ScenarioId,
        period: usize,
    ) -> ModelResult<LinearExpr> {
        let mut expr = LinearExpr::new();
        for (flight, last) in self.windows() {
            let departed = period
                .checked_sub(flight.duration)
                .filter(|&t| t >= flight.depart_period && t <= last);
            if let Some(t) = departed {
                expr.add_var(model.var(&assign(flight.id, t, scenario))?);
            }
        }
        Ok(expr)
    }

    fn add_nonanticipativity(&self, ctx: &BuildContext<'_>, model: &mut Model) -> ModelResult<()> {
        for (flight, last) in self.windows() {
            for t in flight.depart_period..=last {
                tie_through_period(model, ctx.tree(), t, |s| assign(flight.id, t, s))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formulation::{Formulation, ModelInput};
    use gdp_core::{AirborneLimit, CapacityScenario, CostParams, ScenarioTree};

    #[test]
    fn test_windows_end_at_last_landable_period() {
        let tree = ScenarioTree::build(
            5,
            vec![CapacityScenario::new(ScenarioId::new(0), 1.0, vec![1; 5]).unwrap()],
            0,
        )
        .unwrap();
        let flights = FlightDemand::new(5)
            .with_flight(DiscreteFlight::new(FlightId::new(0), 0, 1))
            .unwrap()
            .with_flight(DiscreteFlight::new(FlightId::new(1), 2, 2))
            .unwrap();
        let input =
            ModelInput::new(&tree, &flights, CostParams::default(), AirborneLimit::Unlimited)
                .unwrap();
        let ctx = BuildContext::new(input, Formulation::PerFlight.capabilities());
        let encoding = FlightAssignment::new(&ctx, &flights);

        let windows: Vec<(u32, usize, usize)> = encoding
            .windows()
            .map(|(flight, last)| (flight.id.value(), flight.depart_period, last))
            .collect();
        assert_eq!(windows, vec![(0, 0, 3), (1, 2, 2)]);

        let mut model = Model::new("assignment");
        encoding.add_variables(&ctx, &mut model).unwrap();
        // Both flights can only complete at t=4 by leaving at their last period.
        let landing = encoding
            .arrivals(&ctx, &model, ScenarioId::new(0), 4)
            .unwrap();
        assert_eq!(landing.terms().len(), 2);
    }
}
