use anyhow::{anyhow, Context, Result};
use gdp_algo::{build_model, PlanSummary};
use gdp_batch::load_spec_from_path;
use gdp_cli::cli::{Commands, OutputFormat};
use tracing::info;

use super::solve_options;

pub fn handle(command: &Commands) -> Result<()> {
    let Commands::Solve {
        spec,
        case,
        formulation,
        backend,
        time_limit,
        format,
        verbose,
    } = command
    else {
        return Err(anyhow!("solve handler called with another command"));
    };

    let experiment = load_spec_from_path(spec)?;
    let cases = experiment.prepare()?;
    let prepared = match case {
        Some(name) => cases
            .iter()
            .find(|c| &c.name == name)
            .ok_or_else(|| anyhow!("experiment '{}' has no case '{name}'", experiment.name))?,
        None => cases
            .first()
            .ok_or_else(|| anyhow!("experiment '{}' defines no cases", experiment.name))?,
    };

    let input = prepared.input(*formulation)?;
    let model = build_model(&input, *formulation)
        .with_context(|| format!("building {formulation} model for '{}'", prepared.name))?;
    info!(case = %prepared.name, "{}", model.stats());

    let options = solve_options(*time_limit, *verbose)?;
    let solution = backend.build_backend()?.solve(&model, &options)?;
    let summary = PlanSummary::from_solution(&input, &solution);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Table => {
            let show = |value: Option<f64>| {
                value.map_or_else(|| "-".to_string(), |v| format!("{v:.3}"))
            };
            println!("case:                  {}", prepared.name);
            println!("formulation:           {formulation}");
            println!("backend:               {}", summary.backend);
            println!("status:                {}", summary.status);
            println!("objective:             {}", show(summary.objective));
            println!("ground periods:        {}", show(summary.expected_ground_periods));
            println!("air periods:           {}", show(summary.expected_air_periods));
            println!("diversions:            {}", show(summary.expected_diversions));
            println!("landings:              {}", show(summary.expected_landings));
            println!("first-period holds:    {}", show(summary.first_period_ground_hold));
            println!("revisions:             {}", show(summary.expected_revisions));
            println!("solve time:            {} ms", summary.solve_time_ms);
        }
    }
    Ok(())
}
