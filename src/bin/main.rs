use std::path::PathBuf;

use anstream::println;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use hrsw::Stopwatch;
use human_duration::human_duration;
use indoc::indoc;
use log::info;
use owo_colors::OwoColorize;
use rustc_hash::FxHashSet;
use tracing_subscriber::EnvFilter;

use statespace::algorithms::graph_search::GraphSearch;
use statespace::cost::Cost;
use statespace::frontier::FifoFrontier;
use statespace::frontier::Frontier;
use statespace::frontier::LifoFrontier;
use statespace::problem::Problem;
use statespace::problems::cities::CityGraph;
use statespace::problems::cities::CityId;
use statespace::problems::cities::CityProblem;
use statespace::problems::labyrinth::LabyrinthProblem;
use statespace::problems::labyrinth::LabyrinthState;
use statespace::problems::pour::PourProblem;
use statespace::problems::pour::Volume;
use statespace::search::SearchResult;
use statespace::search::SearchTreeIndex;
use statespace::space::Action;
use statespace::space::State;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

const LABYRINTH: &str = indoc! {"
    S....##...
    #.....#.#.
    ##.#...##.
    .#...#..#.
    ###.###.#.
    .#...##.G#
    ####.##.#.
    #......###
    .....##...
    ##.##..##.
"};

/// Command line arguments
#[derive(Parser, Debug)]
#[clap(long_version = statespace::build::CLAP_LONG_VERSION)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Print search statistics and memory usage
    #[arg(long, env = "STATESPACE_STATS")]
    pub stats: bool,

    /// How the next node to expand gets picked
    #[arg(long, value_enum, env = "STATESPACE_STRATEGY", default_value_t = Strategy::BreadthFirst)]
    pub strategy: Strategy,

    #[command(flatten)]
    color: colorchoice_clap::Color,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum Strategy {
    BreadthFirst,
    DepthFirst,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk out of a labyrinth
    Labyrinth {
        /// Text labyrinth, using the built-in one when missing
        file: Option<PathBuf>,
        /// Start cell as `row,col`, instead of the `S` marker
        #[arg(long)]
        start: Option<LabyrinthState>,
        /// Goal cell as `row,col`, instead of the `G` marker
        #[arg(long)]
        goal: Option<LabyrinthState>,
    },
    /// Measure a volume with water jugs
    Pour {
        #[arg(long, value_delimiter = ',', default_values_t = [2, 16, 32])]
        sizes: Vec<Volume>,
        #[arg(long, value_delimiter = ',', default_values_t = [1, 1, 1])]
        initial: Vec<Volume>,
        #[arg(long, default_value_t = 13)]
        goal: Volume,
    },
    /// Drive between cities
    Cities {
        #[arg(long, env = "STATESPACE_CITY_GRAPH", default_value = "data/cities/elem.json")]
        graph: PathBuf,
        /// Keys of the cities to keep, all of them when empty
        #[arg(long, value_delimiter = ',')]
        select: Vec<String>,
        #[arg(long, default_value = "8")]
        from: String,
        #[arg(long, default_value = "15")]
        to: String,
    },
}

fn run<P, F, St, A, C>(
    problem: &P,
    frontier: F,
    stats: bool,
) -> std::io::Result<SearchResult<St, A, C>>
where
    P: Problem<St, A, C>,
    F: Frontier<SearchTreeIndex>,
    St: State,
    A: Action,
    C: Cost,
{
    let mut stopwatch = Stopwatch::new_started();
    let mut search = GraphSearch::new(problem, frontier);
    search.search();
    stopwatch.stop();

    if stats {
        println!(
            "{} {}",
            "Search time:".bold(),
            human_duration(&stopwatch.elapsed())
        );
        println!("{} {}", "Search stats:".bold(), search.statistics());
        search.write_memory_stats(std::io::stdout().lock())?;
    }
    Ok(search.into_result())
}

fn solve<P, St, A, C>(args: &Args, problem: &P) -> std::io::Result<SearchResult<St, A, C>>
where
    P: Problem<St, A, C>,
    St: State,
    A: Action,
    C: Cost,
{
    info!("Solving {problem:?} with {:?}", args.strategy);
    match args.strategy {
        Strategy::BreadthFirst => run(problem, FifoFrontier::new(), args.stats),
        Strategy::DepthFirst => run(problem, LifoFrontier::new(), args.stats),
    }
}

/// Prints the solution, or that there's none.
fn report<St, A, C>(
    result: &SearchResult<St, A, C>,
    show_state: impl Fn(&St) -> String,
    show_action: impl Fn(&A) -> String,
) where
    St: State,
    A: Action,
    C: Cost,
{
    if !result.is_found() {
        println!("{}", "No solution found.".red());
        return;
    }

    let states = result.path_states();
    let actions: Vec<String> = result.path_actions().iter().map(show_action).collect();
    println!("{}", "Solution found:".green());
    println!(
        "  - Path:    {}",
        states.iter().map(show_state).collect::<Vec<_>>().join(", ")
    );
    println!("  - Actions: {}", actions.join(" "));
    println!("  - Length:  {}", states.len().yellow());
    println!("  - Cost:    {}", result.path_cost().yellow());
}

fn main() -> std::io::Result<()> {
    let args = Args::parse();
    args.color.write_global();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match &args.command {
        Command::Labyrinth { file, start, goal } => {
            let problem = match file {
                Some(p) => LabyrinthProblem::load(p, *start, *goal),
                None => LabyrinthProblem::parse(LABYRINTH, *start, *goal),
            }
            .map_err(std::io::Error::other)?;
            println!("{problem}");

            let result = solve(&args, &problem)?;
            report(&result, |s| s.to_string(), |a| a.to_string());
        }
        Command::Pour {
            sizes,
            initial,
            goal,
        } => {
            let problem = PourProblem::new(sizes, initial, *goal).map_err(std::io::Error::other)?;
            println!("{problem}");

            let result = solve(&args, &problem)?;
            report(&result, |s| s.to_string(), |a| a.to_string());
            let target = problem.target();
            if let Some(vessel) = result
                .solution()
                .and_then(|s| s.levels().iter().position(|&l| l == target))
            {
                println!(
                    "  - Vessel:  {vessel} holds {target} of {}",
                    problem.sizes()[vessel]
                );
            }
        }
        Command::Cities {
            graph,
            select,
            from,
            to,
        } => {
            let selection: Option<FxHashSet<String>> =
                (!select.is_empty()).then(|| select.iter().cloned().collect());
            let graph =
                CityGraph::load(graph, selection.as_ref()).map_err(std::io::Error::other)?;
            let problem =
                CityProblem::from_keys(&graph, from, to).map_err(std::io::Error::other)?;
            println!("{graph}");
            println!("{problem}");

            let result = solve(&args, &problem)?;
            let label = |&c: &CityId| graph.label(c).to_string();
            report(&result, label, label);
            if result.is_found() {
                println!("  - Route:   {}", graph.route(&result.path_states()).cyan());
            }
        }
    }

    Ok(())
}
