use super::assignment::FlightAssignment;
use super::delta::DeltaBuckets;
use super::departure::{DepartureEncoding, DynamicBuckets};
use super::input::{DemandRef, ModelInput};
use super::plan_actual::PlanActualBuckets;
use super::{arrival, revision, Capabilities, Granularity, RevisionEncoding};
use crate::error::{ModelError, ModelResult};
use crate::model::Model;
use gdp_core::{CapacityScenario, ScenarioTree};
use tracing::debug;

/// Shared state handed to every sub-builder.
pub(crate) struct BuildContext<'a> {
    pub input: ModelInput<'a>,
    pub capabilities: Capabilities,
    /// Magnitude bound for indicator-guarded expressions: no plan quantity
    /// can exceed the number of flights in the instance.
    pub indicator_bound: f64,
}

impl<'a> BuildContext<'a> {
    pub(super) fn new(input: ModelInput<'a>, capabilities: Capabilities) -> Self {
        let indicator_bound = input.demand().total_units().max(1) as f64;
        Self {
            input,
            capabilities,
            indicator_bound,
        }
    }

    pub fn tree(&self) -> &'a ScenarioTree {
        self.input.tree()
    }

    pub fn scenarios(&self) -> &'a [CapacityScenario] {
        self.input.tree().scenarios()
    }

    pub fn num_periods(&self) -> usize {
        self.input.num_periods()
    }

    pub fn last_departure(&self, duration: usize) -> Option<usize> {
        self.input.last_departure(duration)
    }
}

/// Builds a planning model by composing the departure encoding selected by
/// the capabilities with the shared arrival, non-anticipativity and revision
/// sub-builders.
pub struct FlowModelBuilder<'a> {
    input: ModelInput<'a>,
    capabilities: Capabilities,
    name: String,
}

impl<'a> FlowModelBuilder<'a> {
    pub fn new(input: ModelInput<'a>, capabilities: Capabilities) -> Self {
        Self {
            input,
            capabilities,
            name: "gdp".to_string(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn build(&self) -> ModelResult<Model> {
        self.capabilities.validate()?;
        let ctx = BuildContext::new(self.input, self.capabilities);
        let encoding = self.encoding(&ctx)?;
        let mut model = Model::new(self.name.as_str());

        if self.capabilities.revision.is_some() {
            revision::add_variables(&ctx, &mut model)?;
        }
        encoding.add_variables(&ctx, &mut model)?;
        arrival::add_variables(&ctx, &mut model)?;

        encoding.add_departure_balance(&ctx, &mut model)?;
        arrival::add_balance(&ctx, encoding.as_ref(), &mut model)?;
        encoding.add_nonanticipativity(&ctx, &mut model)?;

        if self.capabilities.revision.is_some() {
            encoding.add_revision_gates(&ctx, &mut model)?;
            revision::add_limits(&ctx, &mut model)?;
            revision::add_nonanticipativity(&ctx, &mut model)?;
        }

        debug!(model = model.name(), stats = %model.stats(), "built planning model");
        Ok(model)
    }

    fn encoding(&self, ctx: &BuildContext<'_>) -> ModelResult<Box<dyn DepartureEncoding + 'a>> {
        match (
            self.capabilities.granularity,
            self.capabilities.revision,
            self.input.demand(),
        ) {
            (Granularity::Bucket, None, DemandRef::Aggregated(demand)) => {
                Ok(Box::new(DynamicBuckets::new(demand)))
            }
            (Granularity::Bucket, Some(RevisionEncoding::Delta), DemandRef::Aggregated(demand)) => {
                Ok(Box::new(DeltaBuckets::new(demand)))
            }
            (
                Granularity::Bucket,
                Some(RevisionEncoding::PlanActual),
                DemandRef::Aggregated(demand),
            ) => Ok(Box::new(PlanActualBuckets::new(demand))),
            (Granularity::PerFlight, None, DemandRef::PerFlight(flights)) => {
                Ok(Box::new(FlightAssignment::new(ctx, flights)))
            }
            (granularity, _, demand) => Err(ModelError::Config(format!(
                "{granularity:?} granularity cannot be built from {:?} demand",
                demand.granularity()
            ))),
        }
    }
}
