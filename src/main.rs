//! Wall-Break Maze
//!
//! Command-line front end for validating levels, showing hint paths,
//! generating random mazes and publishing level files.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::warn;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use wallbreak::generator::{self, DEFAULT_WALL_DENSITY};
use wallbreak::grid::{self, Grid};
use wallbreak::level::{Level, LevelDraft, Mode};
use wallbreak::{solve, validate, PortalIndex, SolveResult, ValidationResult};

/// Validates and solves grid mazes where walls can be broken on a budget.
#[derive(Parser)]
#[command(name = "wallbreak")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log solver and validator activity (repeat for more detail).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a level or text grid and print its par values.
    Validate {
        /// A `.json` level file or a text grid.
        file: PathBuf,
        /// Break budget; defaults to the level's own budget, or 0 for text grids.
        #[arg(short, long)]
        k: Option<u32>,
        /// Print the full result as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the shortest path as a hint overlay.
    Solve {
        /// A `.json` level file or a text grid.
        file: PathBuf,
        /// Walls that may still be broken; overrides `--mode`.
        #[arg(short, long)]
        breaks: Option<u32>,
        /// Play mode whose budget to use for a level file.
        #[arg(short, long, value_enum, default_value_t = ModeArg::WallBreak)]
        mode: ModeArg,
        /// Print the full result as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print a random maze as a text grid.
    Generate {
        #[arg(long, default_value_t = 10)]
        rows: usize,
        #[arg(long, default_value_t = 10)]
        cols: usize,
        /// Chance that any free cell becomes a wall.
        #[arg(long, default_value_t = DEFAULT_WALL_DENSITY)]
        density: f64,
        /// Seed for reproducible mazes; random when omitted.
        #[arg(long)]
        seed: Option<u64>,
        /// Warn when the maze is not solvable with this many breaks.
        #[arg(short, long, default_value_t = 0)]
        k: u32,
    },
    /// Turn a text grid into a published level file.
    Publish {
        /// Text grid to publish.
        grid: PathBuf,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        creator: String,
        #[arg(short, long, default_value_t = 0)]
        k: u32,
        /// Output path; the level is printed to stdout when omitted.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    NoWallBreak,
    WallBreak,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::NoWallBreak => Mode::NoWallBreak,
            ModeArg::WallBreak => Mode::WallBreak,
        }
    }
}

/// A maze read from disk: either a full level or a bare grid.
enum Input {
    Level(Level),
    Grid(Grid),
}

impl Input {
    fn read(path: &Path) -> Result<Self> {
        if path.extension().is_some_and(|ext| ext == "json") {
            let level = Level::load(path)
                .with_context(|| format!("failed to load level {}", path.display()))?;
            return Ok(Self::Level(level));
        }
        Ok(Self::Grid(read_grid(path)?))
    }

    fn grid(&self) -> &Grid {
        match self {
            Self::Level(level) => &level.maze,
            Self::Grid(grid) => grid,
        }
    }
}

fn read_grid(path: &Path) -> Result<Grid> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read grid {}", path.display()))?;
    text.parse()
        .with_context(|| format!("failed to parse grid {}", path.display()))
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Command::Validate { file, k, json } => run_validate(&file, k, json),
        Command::Solve {
            file,
            breaks,
            mode,
            json,
        } => run_solve(&file, breaks, mode.into(), json),
        Command::Generate {
            rows,
            cols,
            density,
            seed,
            k,
        } => {
            run_generate(rows, cols, density, seed, k);
            Ok(ExitCode::SUCCESS)
        }
        Command::Publish {
            grid,
            name,
            description,
            creator,
            k,
            out,
        } => {
            let draft = LevelDraft {
                name,
                description,
                creator,
                maze: read_grid(&grid)?,
                k,
            };
            run_publish(draft, out.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Validates a maze and reports either its errors or its par values.
fn run_validate(file: &Path, k: Option<u32>, json: bool) -> Result<ExitCode> {
    let input = Input::read(file)?;
    let k = k.unwrap_or(match &input {
        Input::Level(level) => level.k,
        Input::Grid(_) => 0,
    });

    let result = validate(input.grid(), k);
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", format_validation(&result, k));
    }

    Ok(if result.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Renders a validation verdict as user-facing lines.
fn format_validation(result: &ValidationResult, k: u32) -> String {
    let mut output = String::new();
    match result.par() {
        Some(par) => {
            output.push_str("Level is valid.\n");
            match par.no_wall_break {
                Some(steps) => output.push_str(&format!("No-break par: {steps} steps\n")),
                None => output.push_str("No-break par: none (goal needs wall breaks)\n"),
            }
            output.push_str(&format!("{k}-break par: {} steps\n", par.wall_break));
        }
        None => {
            output.push_str("Level is invalid:\n");
            for error in &result.errors {
                output.push_str(&format!("- {error}\n"));
            }
        }
    }
    output
}

/// Solves a maze and prints the hint path.
fn run_solve(file: &Path, breaks: Option<u32>, mode: Mode, json: bool) -> Result<ExitCode> {
    let input = Input::read(file)?;
    let budget = breaks.unwrap_or(match &input {
        Input::Level(level) => level.budget(mode),
        Input::Grid(_) => 0,
    });

    let grid = input.grid();
    let result = solve(grid, &PortalIndex::build(grid), budget);
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", format_hint(grid, &result));
    }

    Ok(if result.reachable {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Renders a solve result as an overlay plus a summary line.
fn format_hint(grid: &Grid, result: &SolveResult) -> String {
    match result.error {
        Some(failure) => format!("No solution: {failure}\n"),
        None => format!(
            "{}{} steps, {} wall(s) broken\n",
            grid::format_path(grid, &result.path),
            result.path_length,
            result.walls_broken(grid)
        ),
    }
}

/// Prints a random maze, warning when it is not solvable with `k` breaks.
fn run_generate(rows: usize, cols: usize, density: f64, seed: Option<u64>, k: u32) {
    let mut rng = match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let maze = generator::generate(rows, cols, density, &mut rng);

    if !validate(&maze, k).valid {
        warn!("generated maze is not solvable with {k} wall break(s)");
    }
    print!("{maze}");
}

/// Publishes a draft and writes it to `out` or stdout.
fn run_publish(draft: LevelDraft, out: Option<&Path>) -> Result<()> {
    let level = Level::publish(draft).context("level cannot be published")?;
    match out {
        Some(path) => {
            level
                .save(path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&level)?),
    }
    Ok(())
}
