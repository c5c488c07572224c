use std::process::ExitCode;
use clap::Parser;
use std::time::Instant;

use crossfill::grid::Grid;
use crossfill::solver::{self, SolverError};
use crossfill::word_list::VocabularyIndex;

/// Crossword grid filler
#[derive(Parser, Debug)]
#[command(
    author,
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"),
    about,
    long_about = None
)]
struct Cli {
    /// Path to the grid layout file ('_' or '.' open, '#' blocked, one row per line)
    structure: String,

    /// Path to the word list file (one `word` or `word;score` per line)
    word_list: String,

    /// Minimum score filter for scored word lists
    #[arg(short = 'm', long, default_value_t = 0)]
    min_score: i32,
}

/// Entry point of the crossfill CLI.
///
/// Delegates to [`try_main`], catching any errors and printing them
/// in a user-friendly way before exiting with a nonzero code.
fn main() -> ExitCode {
    // Set up logging
    let debug_enabled = std::env::var("CROSSFILL_DEBUG").is_ok();
    crossfill::log::init_logger(debug_enabled);

    log::info!("Starting crossfill");

    match try_main() {
        Ok(code) => code,
        Err(e) => {
            // Print the error message to stderr, with detailed formatting if it's a SolverError
            if let Some(solver_err) = e.downcast_ref::<SolverError>() {
                eprintln!("Error: {}", solver_err.display_detailed());
            } else {
                eprintln!("Error: {e}");
            }
            // Exit explicitly with a nonzero code so scripts can detect failure
            ExitCode::FAILURE
        }
    }
}

/// Core application logic for the crossfill CLI.
///
/// Steps:
/// 1. Parse CLI arguments with Clap.
/// 2. Load the grid layout and the word list from disk.
/// 3. Solve the fill problem.
/// 4. Print the filled grid (or `No solution.`) on stdout.
/// 5. Print performance metrics (timings, counts) on stderr.
///
/// An unsolvable puzzle is a negative *answer*, not a program error: it
/// prints `No solution.` and exits nonzero without an error banner. Malformed
/// inputs bubble up to [`main`] as errors.
fn try_main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let cli = Cli::parse();

    // 1. Load the grid layout and the word list from disk
    let t_load = Instant::now();
    let grid = Grid::load_from_path(&cli.structure)?;
    let vocabulary = VocabularyIndex::load_from_path(&cli.word_list, cli.min_score)?;
    let load_secs = t_load.elapsed().as_secs_f64();

    // 2. Run the fill
    let t_solve = Instant::now();
    let result = solver::solve(&grid, &vocabulary);
    let solve_secs = t_solve.elapsed().as_secs_f64();

    // 3. Print diagnostics (input sizes, timings) to stderr
    eprintln!(
        "Loaded {} words and a {}x{} grid with {} slots in {:.3}s; searched in {:.3}s.",
        vocabulary.len(),
        grid.width(),
        grid.height(),
        grid.slots().len(),
        load_secs,
        solve_secs
    );

    // 4. Print the outcome on stdout
    match result {
        Ok(assignment) => {
            print!("{}", assignment.render(&grid));
            Ok(ExitCode::SUCCESS)
        }
        Err(SolverError::Unsolvable) => {
            println!("No solution.");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(Box::new(e)),
    }
}
