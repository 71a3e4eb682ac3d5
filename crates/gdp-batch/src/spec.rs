//! Experiment specification files
//!
//! An experiment fixes a horizon, a low-to-high scenario family, the arrival
//! demand and unit costs, then lists cases that vary lookahead, airborne
//! limit, diversion pricing, probabilities and formulations.
//!
//! ```yaml
//! name: ewr-2017-07-15
//! horizon:
//!   start: 2017-07-15T12:00:00Z
//!   end: 2017-07-15T18:00:00Z
//!   period_minutes: 15
//! scenarios:
//!   earliest_change: 4
//!   latest_change: 16
//!   low_rate: 32
//!   high_rate: 48
//! demand:
//!   inline:
//!     buckets:
//!       4: [3, 2, 4, ...]
//! cases:
//!   - name: myopic
//!     lookahead: 0
//!     formulations: [extended-diversion, per-flight-diversion]
//! ```

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Duration, Utc};
use gdp_algo::{Formulation, Granularity, ModelInput, ModelResult};
use gdp_core::{
    AggregatedDemand, AirborneLimit, CostParams, DemandAggregator, FlightDemand, Grouping,
    Horizon, LowToHigh, ScenarioTree,
};
use gdp_io::{AirportDirectory, BtsReader};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentSpec {
    pub name: String,
    pub horizon: HorizonSpec,
    pub scenarios: ScenarioSpec,
    pub demand: DemandSpec,
    #[serde(default)]
    pub costs: CostParams,
    #[serde(default)]
    pub cases: Vec<CaseSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HorizonSpec {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default = "default_period_minutes")]
    pub period_minutes: i64,
}

fn default_period_minutes() -> i64 {
    15
}

impl HorizonSpec {
    pub fn to_horizon(&self) -> Result<Horizon> {
        Ok(Horizon::new(
            self.start,
            self.end,
            Duration::minutes(self.period_minutes),
        )?)
    }
}

/// Low-to-high family parameters that do not depend on the case. Rates
/// default to the airport's IFR (low) and VFR (high) capacities when the
/// demand comes with a capacity table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub earliest_change: usize,
    pub latest_change: usize,
    pub low_rate: Option<u32>,
    pub high_rate: Option<u32>,
    #[serde(default)]
    pub grouping: Grouping,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandSpec {
    /// Departures per duration bucket (in periods), plus airborne arrivals.
    Inline {
        buckets: BTreeMap<usize, Vec<u32>>,
        #[serde(default)]
        enroute: Option<Vec<u32>>,
    },
    /// Scheduled arrivals read from a BTS on-time file.
    Bts {
        file: PathBuf,
        airport: String,
        timezones: PathBuf,
        #[serde(default)]
        capacities: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseSpec {
    pub name: String,
    #[serde(default)]
    pub lookahead: usize,
    /// Flights allowed to hold in the air per period; unlimited when absent.
    #[serde(default)]
    pub max_airborne: Option<u32>,
    /// Price a diversion as this many hours of airborne holding.
    #[serde(default)]
    pub divert_factor: Option<f64>,
    #[serde(default)]
    pub alt_probs: bool,
    #[serde(default = "default_formulations")]
    pub formulations: Vec<Formulation>,
}

fn default_formulations() -> Vec<Formulation> {
    Formulation::ALL.to_vec()
}

/// One case with its inputs built, shared by every job of the case.
#[derive(Debug)]
pub struct PreparedCase {
    pub name: String,
    pub tree: ScenarioTree,
    pub demand: Arc<AggregatedDemand>,
    pub flights: Arc<FlightDemand>,
    pub costs: CostParams,
    pub max_airborne: AirborneLimit,
    pub formulations: Vec<Formulation>,
}

impl PreparedCase {
    /// Model input for `formulation`, choosing the demand shape it consumes.
    pub fn input(&self, formulation: Formulation) -> ModelResult<ModelInput<'_>> {
        match formulation.capabilities().granularity {
            Granularity::Bucket => ModelInput::new(
                &self.tree,
                self.demand.as_ref(),
                self.costs,
                self.max_airborne,
            ),
            Granularity::PerFlight => ModelInput::new(
                &self.tree,
                self.flights.as_ref(),
                self.costs,
                self.max_airborne,
            ),
        }
    }
}

pub fn load_spec_from_path(path: &Path) -> Result<ExperimentSpec> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading experiment spec '{}'", path.display()))?;
    let mut spec: ExperimentSpec = match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            serde_yaml::from_str(&data).context("parsing experiment spec yaml")?
        }
        Some(ext) if ext.eq_ignore_ascii_case("json") => {
            serde_json::from_str(&data).context("parsing experiment spec json")?
        }
        _ => serde_yaml::from_str(&data)
            .or_else(|_| serde_json::from_str(&data))
            .context("parsing experiment spec")?,
    };
    if let Some(base) = path.parent() {
        spec.resolve_paths(base);
    }
    Ok(spec)
}

impl ExperimentSpec {
    /// Make relative data paths relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        if let DemandSpec::Bts {
            file,
            timezones,
            capacities,
            ..
        } = &mut self.demand
        {
            for path in [Some(file), Some(timezones), capacities.as_mut()]
                .into_iter()
                .flatten()
            {
                if path.is_relative() {
                    *path = base.join(&*path);
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.cases.is_empty() {
            return Err(anyhow!("experiment '{}' defines no cases", self.name));
        }
        let mut seen = HashSet::new();
        for case in &self.cases {
            if case.name.trim().is_empty() {
                return Err(anyhow!("case name cannot be empty"));
            }
            if !seen.insert(case.name.as_str()) {
                return Err(anyhow!("duplicate case '{}' in experiment", case.name));
            }
            if case.formulations.is_empty() {
                return Err(anyhow!("case '{}' lists no formulations", case.name));
            }
        }
        Ok(())
    }

    /// Build every case's tree and demand.
    pub fn prepare(&self) -> Result<Vec<Arc<PreparedCase>>> {
        self.validate()?;
        let horizon = self.horizon.to_horizon()?;
        let (demand, flights, airports) = self.load_demand(&horizon)?;
        let (demand, flights) = (Arc::new(demand), Arc::new(flights));
        let (low_rate, high_rate) = self.rates(airports.as_ref())?;
        let periods_per_hour = horizon.periods_per_hour();

        self.cases
            .iter()
            .map(|case| {
                let tree = LowToHigh::new(
                    horizon.num_periods(),
                    self.scenarios.earliest_change,
                    self.scenarios.latest_change,
                    low_rate,
                    high_rate,
                    periods_per_hour,
                )
                .with_alt_probs(case.alt_probs)
                .with_lookahead(case.lookahead)
                .with_grouping(self.scenarios.grouping)
                .build_tree()
                .with_context(|| format!("building scenario tree for case '{}'", case.name))?;

                let costs = match case.divert_factor {
                    Some(factor) => self.costs.with_divert_factor(factor, periods_per_hour),
                    None => self.costs,
                };
                Ok(Arc::new(PreparedCase {
                    name: case.name.clone(),
                    tree,
                    demand: Arc::clone(&demand),
                    flights: Arc::clone(&flights),
                    costs,
                    max_airborne: case.max_airborne.into(),
                    formulations: case.formulations.clone(),
                }))
            })
            .collect()
    }

    fn load_demand(
        &self,
        horizon: &Horizon,
    ) -> Result<(AggregatedDemand, FlightDemand, Option<(AirportDirectory, String)>)> {
        match &self.demand {
            DemandSpec::Inline { buckets, enroute } => {
                let mut demand = AggregatedDemand::new(horizon.num_periods());
                for (&duration, counts) in buckets {
                    demand = demand.with_bucket(duration, counts.clone())?;
                }
                if let Some(enroute) = enroute {
                    demand = demand.with_enroute(enroute.clone())?;
                }
                let flights = FlightDemand::from_aggregated(&demand)?;
                Ok((demand, flights, None))
            }
            DemandSpec::Bts {
                file,
                airport,
                timezones,
                capacities,
            } => {
                let airports = AirportDirectory::load(timezones, capacities.as_deref())
                    .context("loading airport directory")?;
                let scheduled = BtsReader::new(&airports)
                    .read_arrivals_path(file, airport, horizon)
                    .with_context(|| format!("reading BTS file '{}'", file.display()))?;
                let aggregator = DemandAggregator::new(*horizon);
                let demand = aggregator.aggregate(&scheduled)?;
                let flights = aggregator.flight_indexed(&scheduled)?;
                info!(
                    airport = %airport,
                    sitting = demand.total_sitting(),
                    enroute = demand.total_enroute(),
                    "loaded BTS demand"
                );
                Ok((demand, flights, Some((airports, airport.clone()))))
            }
        }
    }

    fn rates(&self, airports: Option<&(AirportDirectory, String)>) -> Result<(u32, u32)> {
        let lookup = |explicit: Option<u32>,
                      pick: fn(&AirportDirectory, &str) -> gdp_io::IoResult<u32>|
         -> Result<u32> {
            match (explicit, airports) {
                (Some(rate), _) => Ok(rate),
                (None, Some((directory, airport))) => Ok(pick(directory, airport)?),
                (None, None) => Err(anyhow!(
                    "scenario rates must be given when demand has no airport capacity table"
                )),
            }
        };
        Ok((
            lookup(self.scenarios.low_rate, AirportDirectory::ifr)?,
            lookup(self.scenarios.high_rate, AirportDirectory::vfr)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    const SPEC: &str = r#"
name: toy
horizon:
  start: 2017-07-15T12:00:00Z
  end: 2017-07-15T14:00:00Z
  period_minutes: 15
scenarios:
  earliest_change: 2
  latest_change: 6
  low_rate: 4
  high_rate: 8
demand:
  inline:
    buckets:
      1: [2, 1, 0, 2, 0, 0, 0, 0]
costs:
  air_cost: 3.0
cases:
  - name: myopic
  - name: informed
    lookahead: 4
    divert_factor: 2.0
    formulations: [extended-diversion, per-flight-diversion]
"#;

    fn write_spec(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_yaml_with_defaults() {
        let file = write_spec(".yaml", SPEC);
        let spec = load_spec_from_path(file.path()).unwrap();
        assert_eq!(spec.name, "toy");
        assert_eq!(spec.costs.air_cost, 3.0);
        assert_eq!(spec.costs.ground_cost, 1.0);
        assert_eq!(spec.cases[0].formulations.len(), Formulation::ALL.len());
        assert_eq!(spec.cases[1].lookahead, 4);
    }

    #[test]
    fn falls_back_to_json_without_extension() {
        let file = write_spec(".yaml", SPEC);
        let spec = load_spec_from_path(file.path()).unwrap();
        let json = serde_json::to_string(&spec).unwrap();
        let file = write_spec(".spec", &json);
        let reparsed = load_spec_from_path(file.path()).unwrap();
        assert_eq!(reparsed.cases.len(), 2);
    }

    #[test]
    fn prepares_cases_sharing_demand() {
        let file = write_spec(".yaml", SPEC);
        let cases = load_spec_from_path(file.path()).unwrap().prepare().unwrap();
        assert_eq!(cases.len(), 2);
        assert!(Arc::ptr_eq(&cases[0].demand, &cases[1].demand));
        assert_eq!(cases[0].tree.num_periods(), 8);
        assert_eq!(cases[0].tree.num_scenarios(), 4);
        assert_eq!(cases[0].flights.len(), 5);
        // 2 hours of airborne holding at 4 periods per hour and cost 3
        assert_eq!(cases[1].costs.divert_cost, 24.0);
        assert_eq!(cases[0].costs.divert_cost, 100.0);
    }

    #[test]
    fn rejects_duplicate_cases() {
        let body = SPEC.replace("name: informed", "name: myopic");
        let file = write_spec(".yaml", &body);
        let err = load_spec_from_path(file.path()).unwrap().prepare().unwrap_err();
        assert!(err.to_string().contains("duplicate case"));
    }

    #[test]
    fn missing_rates_need_capacity_table() {
        let body = SPEC.replace("  low_rate: 4\n", "");
        let file = write_spec(".yaml", &body);
        let err = load_spec_from_path(file.path()).unwrap().prepare().unwrap_err();
        assert!(err.to_string().contains("scenario rates"));
    }
}
