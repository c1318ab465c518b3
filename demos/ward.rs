use std::path::PathBuf;
use ward_contagion::{
    ContagionError, Parameters, Scenario,
    log::enable_logging,
    scenario::GraphSource,
};

static NODES: usize = 1000;
static NEIGHBOURS: usize = 6;
static REWIRE: f64 = 0.1;

/// A small-world hospital of `NODES` people with the default parameters.
fn default_scenario() -> Scenario {
    Scenario {
        parameters: Parameters::default(),
        graph: GraphSource::WattsStrogatz {
            nodes: NODES,
            k: NEIGHBOURS,
            rewire: REWIRE,
        },
        roles: None,
        centrality: None,
        immune: None,
        output_dir: None,
    }
}

fn main() -> Result<(), ContagionError> {
    enable_logging()?;

    let scenario = match std::env::args().nth(1) {
        Some(path) => Scenario::load(&PathBuf::from(path))?,
        None => default_scenario(),
    };
    let outcome = scenario.run()?;

    println!("day,proportion");
    for (day, proportion) in outcome.proportions.iter().enumerate() {
        println!("{day},{proportion:.4}");
    }
    if !outcome.immunized.is_empty() {
        println!("immunized: {}", outcome.immunized.join(", "));
    }
    println!("R0 = {:.2}", outcome.r0);
    Ok(())
}
