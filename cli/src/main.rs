use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use minefield_core::*;

mod command;
mod render;
mod session;

#[derive(Parser, Debug)]
#[command(name = "minefield", version, about = "Minesweeper with a competitive rank ladder", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// File keeping best times and competitive progress
    #[arg(long, default_value = "minefield.json")]
    data: PathBuf,

    /// TOML file overriding board sizes, rank thresholds or scoring
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Climb the ranks from Beginner to Minefield King (default)
    Competitive,
    /// Free play at a chosen level, keeping best times
    Casual {
        #[arg(short, long, default_value_t = Difficulty::Easy)]
        level: Difficulty,
    },
    /// Show the best casual times
    BestTimes,
    /// Forget competitive progress
    Reset,
}

fn init_logging(verbose: &clap_verbosity_flag::Verbosity) {
    tracing_subscriber::fmt()
        .with_max_level(verbose.tracing_level_filter())
        .with_writer(std::io::stderr)
        .init();
}

fn load_rules(path: Option<&Path>) -> anyhow::Result<Rules> {
    let Some(path) = path else {
        return Ok(Rules::default());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("could not read {}", path.display()))?;
    let rules =
        Rules::from_toml_str(&text).with_context(|| format!("bad rules in {}", path.display()))?;
    log::info!("rules loaded from {}", path.display());
    Ok(rules)
}

async fn play(
    rules: Rules,
    seed: Option<u64>,
    storage: Rc<RefCell<JsonFileStore>>,
    mode: Mode,
    level: Option<Difficulty>,
) -> anyhow::Result<()> {
    let reducer = match seed {
        Some(seed) => Reducer::seeded(rules, seed),
        None => Reducer::new(rules),
    };
    let mut store = GameStore::with_reducer(GameState::new(), reducer);

    store.dispatch(Action::SetMode { mode })?;
    for (level, time) in load_best_times(&*storage.borrow()) {
        store.dispatch(Action::SetBestTime { level, time })?;
    }
    if let Some(level) = level {
        store.dispatch(Action::SetLevel { level })?;
    }
    if mode == Mode::Competitive {
        if let Some(session) = SavedSession::load_from(&*storage.borrow()) {
            log::info!("resuming as {}", session.ranking);
            store.dispatch(Action::RestoreSession { session })?;
        }
    }
    store.subscribe(session_saver(Rc::clone(&storage)));

    session::Session::new(store, storage).run().await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.verbose);
    log::debug!("seed: {:?}", args.seed);

    let rules = load_rules(args.rules.as_deref())?;
    let storage = Rc::new(RefCell::new(JsonFileStore::open(&args.data)));

    match args.command.unwrap_or(Cmd::Competitive) {
        Cmd::Competitive => play(rules, args.seed, storage, Mode::Competitive, None).await,
        Cmd::Casual { level } => play(rules, args.seed, storage, Mode::Casual, Some(level)).await,
        Cmd::BestTimes => {
            let best_times = load_best_times(&*storage.borrow());
            for difficulty in Difficulty::ALL {
                let time = best_times.get(&difficulty).map(|&time| time as u32);
                println!("{:<8}{}", difficulty.key(), format_time(time));
            }
            Ok(())
        }
        Cmd::Reset => {
            storage
                .borrow_mut()
                .remove(SavedSession::KEY)
                .context("could not forget saved progress")?;
            println!("competitive progress cleared");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn verbosity_maps_to_tracing_levels() {
        let level = |args: &[&str]| {
            Args::try_parse_from(args)
                .unwrap()
                .verbose
                .tracing_level_filter()
        };

        assert_eq!(level(&["minefield"]), LevelFilter::ERROR);
        assert_eq!(level(&["minefield", "-vv"]), LevelFilter::INFO);
        assert_eq!(level(&["minefield", "-vvv", "casual"]), LevelFilter::DEBUG);
        assert_eq!(level(&["minefield", "-q"]), LevelFilter::OFF);
    }
}
