use clap::{Parser, ValueEnum};

use boxherd::map::Map;
use boxherd::search::Strategy;
use boxherd::solver::Solver;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    Breadth,
    Uniform,
    Greedy,
    AStar,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Breadth => Strategy::Breadth,
            StrategyArg::Uniform => Strategy::Uniform,
            StrategyArg::Greedy => Strategy::Greedy,
            StrategyArg::AStar => Strategy::AStar,
        }
    }
}

#[derive(Parser)]
#[command(name = "boxherd")]
#[command(about = "A Sokoban keystroke solver", long_about = None)]
struct Args {
    /// Path to the level file (XSB format)
    #[arg(value_name = "FILE")]
    level_file: String,

    /// Search strategy for the outer box-push search
    #[arg(short, long, value_enum, default_value = "greedy")]
    strategy: StrategyArg,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let map = match Map::from_file(&args.level_file) {
        Ok(map) => map,
        Err(err) => {
            eprintln!("Error loading level: {}", err);
            std::process::exit(1);
        }
    };

    let mut solver = Solver::new(map);
    let report = solver.solve(args.strategy.into());

    match report.plan {
        Some(plan) => {
            println!("{}", plan);
            println!("{} keys, {} states visited", plan.len(), report.visited);
        }
        None => println!("No solution ({} states visited)", report.visited),
    }
}
