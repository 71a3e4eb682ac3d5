use anyhow::Result;
use gdp_cli::cli::{OutputFormat, ScenariosCommands};
use gdp_core::LowToHigh;
use serde_json::json;

pub fn handle(command: &ScenariosCommands) -> Result<()> {
    let ScenariosCommands::LowToHigh {
        periods,
        earliest,
        latest,
        low,
        high,
        periods_per_hour,
        alt_probs,
        lookahead,
        grouping,
        format,
    } = command;

    let tree = LowToHigh::new(*periods, *earliest, *latest, *low, *high, *periods_per_hour)
        .with_alt_probs(*alt_probs)
        .with_lookahead(*lookahead)
        .with_grouping(*grouping)
        .build_tree()?;

    match format {
        OutputFormat::Table => {
            println!("{:<10} {:<12} capacity", "scenario", "probability");
            for scenario in tree.scenarios() {
                let capacity: Vec<String> =
                    scenario.capacities().iter().map(u32::to_string).collect();
                println!(
                    "{:<10} {:<12.6} {}",
                    scenario.id(),
                    scenario.probability(),
                    capacity.join(" ")
                );
            }
            println!();
            println!(
                "nodes (lookahead {}, grouping {}):",
                tree.lookahead(),
                tree.grouping().as_str()
            );
            print!("{tree}");
        }
        OutputFormat::Json => {
            let nodes: Vec<_> = (0..tree.num_periods()).map(|t| tree.nodes(t)).collect();
            let value = json!({
                "lookahead": tree.lookahead(),
                "grouping": tree.grouping(),
                "scenarios": tree.scenarios(),
                "nodes": nodes,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}
