use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use sgf_core::game::AnyGame;
use sgf_core::go::Go;
use sgf_core::normalizer::{
    compute_canonical_hash, serialize_canonical, serialize_pretty, serialize_properties,
};
use sgf_core::parser::parse_text_with_config;
use sgf_core::{ast, Error, Game, GameCollection, ParserConfig};

/// SGF: Smart Game Format toolkit
///
/// Validate, normalize, format, hash, inspect and compare game records.
#[derive(Parser)]
#[command(name = "sgf", version, about, long_about = None)]
struct Cli {
    /// Suppress all non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Log verbosity on stderr (-v debug, -vv trace)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Deepest variation nesting accepted by the parser
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Game whose property schema is used for checking values
    #[arg(long, value_enum, default_value_t = GameKind::Go, global = true)]
    game: GameKind,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GameKind {
    /// Go (GM[1]): two-letter points, empty move = pass
    Go,
    /// Any game: coordinates are not checked
    Any,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an SGF file (syntax + property types)
    Validate {
        /// Path to .sgf file
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the canonical form of a record
    Normalize {
        /// Path to .sgf file
        file: PathBuf,
    },

    /// Format a record for reading: one node per line, variations indented
    Fmt {
        /// Path to .sgf file
        file: PathBuf,
        /// Rewrite the file in place
        #[arg(long)]
        write: bool,
    },

    /// Compute the SHA-256 of the canonical form
    Hash {
        /// Path to .sgf file
        file: PathBuf,
    },

    /// Show the node tree with pre-order numbers
    Tree {
        /// Path to .sgf file
        file: PathBuf,
        /// Output the syntax tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Structural comparison of two records
    Diff {
        /// First .sgf file
        file_a: PathBuf,
        /// Second .sgf file
        file_b: PathBuf,
    },

    /// Show version information
    Version,
}

// ── Exit codes ────────────────────────────────────────────

/// Success, or the answer to the question was "yes"
const EXIT_OK: i32 = 0;
/// Invalid record (validate) or records differ (diff)
const EXIT_NEGATIVE: i32 = 1;
/// The command could not run: unreadable file or unparsable input
const EXIT_ERROR: i32 = 2;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let mut config = ParserConfig::default();
    if let Some(depth) = cli.max_depth {
        config = config.with_max_tree_depth(depth);
    }
    log::debug!("parser config: {:?}", config);

    let exit_code = match cli.game {
        GameKind::Go => run::<Go>(&cli, &config),
        GameKind::Any => run::<AnyGame>(&cli, &config),
    };

    process::exit(exit_code);
}

fn run<G: Game>(cli: &Cli, config: &ParserConfig) -> i32 {
    let quiet = cli.quiet;
    match &cli.command {
        Commands::Validate { file, json } => cmd_validate::<G>(file, *json, quiet, config),
        Commands::Normalize { file } => cmd_normalize::<G>(file, config),
        Commands::Fmt { file, write } => cmd_fmt::<G>(file, *write, quiet, config),
        Commands::Hash { file } => cmd_hash::<G>(file, config),
        Commands::Tree { file, json } => cmd_tree::<G>(file, *json, config),
        Commands::Diff { file_a, file_b } => cmd_diff::<G>(file_a, file_b, quiet, config),
        Commands::Version => {
            println!(
                "sgf {} (sgf-core {})",
                env!("CARGO_PKG_VERSION"),
                sgf_core::VERSION
            );
            EXIT_OK
        }
    }
}

// ── Loading ───────────────────────────────────────────────

enum LoadError {
    Io(String),
    Invalid(Error),
}

fn load<G: Game>(path: &Path, config: &ParserConfig) -> Result<ast::Collection, LoadError> {
    let text = fs::read_to_string(path)
        .map_err(|e| LoadError::Io(format!("cannot read {}: {}", path.display(), e)))?;
    log::debug!("read {} bytes from {}", text.len(), path.display());
    parse_text_with_config(&text, &G::schema(), config).map_err(LoadError::Invalid)
}

/// Loads a file or reports why not; any failure maps to `EXIT_ERROR`
fn load_or_report<G: Game>(path: &Path, config: &ParserConfig) -> Result<ast::Collection, i32> {
    load::<G>(path, config).map_err(|e| {
        match e {
            LoadError::Io(message) => report_error(&message),
            LoadError::Invalid(error) => report_error(&format!("{}: {}", path.display(), error)),
        }
        EXIT_ERROR
    })
}

fn report_error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message);
}

// ── Commands ──────────────────────────────────────────────

fn cmd_validate<G: Game>(file: &Path, json: bool, quiet: bool, config: &ParserConfig) -> i32 {
    let collection = match load::<G>(file, config) {
        Ok(collection) => collection,
        Err(LoadError::Io(message)) => {
            report_error(&message);
            return EXIT_ERROR;
        }
        Err(LoadError::Invalid(error)) => {
            if json {
                println!("{}", validation_json(None, Some(&error)));
            } else {
                report_error(&format!("{}: {}", file.display(), error));
            }
            return EXIT_NEGATIVE;
        }
    };

    if json {
        println!("{}", validation_json(Some(&collection), None));
    } else if !quiet {
        println!(
            "{} {} is valid ({} game tree(s), {} node(s))",
            "✓".green().bold(),
            file.display(),
            collection.game_trees.len(),
            collection.node_count()
        );
    }
    EXIT_OK
}

fn validation_json(collection: Option<&ast::Collection>, error: Option<&Error>) -> String {
    let mut report = serde_json::json!({
        "valid": error.is_none(),
        "errors": usize::from(error.is_some()),
    });
    if let Some(collection) = collection {
        report["game_trees"] = collection.game_trees.len().into();
        report["nodes"] = collection.node_count().into();
    }
    if let Some(error) = error {
        let kind = match error {
            Error::Lex(_) => "lex",
            Error::Parse(_) => "parse",
        };
        let mut detail = serde_json::json!({
            "kind": kind,
            "message": error.to_string(),
        });
        if let Some(span) = error.span() {
            detail["line"] = span.line.into();
            detail["column"] = span.column.into();
            detail["offset"] = span.offset.into();
        }
        report["error"] = detail;
    }
    serde_json::to_string_pretty(&report).unwrap_or_else(|_| report.to_string())
}

fn cmd_normalize<G: Game>(file: &Path, config: &ParserConfig) -> i32 {
    match load_or_report::<G>(file, config) {
        Ok(collection) => {
            println!("{}", serialize_canonical(&collection));
            EXIT_OK
        }
        Err(code) => code,
    }
}

fn cmd_fmt<G: Game>(file: &Path, write: bool, quiet: bool, config: &ParserConfig) -> i32 {
    let collection = match load_or_report::<G>(file, config) {
        Ok(collection) => collection,
        Err(code) => return code,
    };
    let formatted = serialize_pretty(&collection);

    if !write {
        print!("{}", formatted);
        return EXIT_OK;
    }
    if let Err(e) = fs::write(file, &formatted) {
        report_error(&format!("cannot write {}: {}", file.display(), e));
        return EXIT_ERROR;
    }
    if !quiet {
        println!("{} formatted {}", "✓".green().bold(), file.display());
    }
    EXIT_OK
}

fn cmd_hash<G: Game>(file: &Path, config: &ParserConfig) -> i32 {
    match load_or_report::<G>(file, config) {
        Ok(collection) => {
            println!("{}", compute_canonical_hash(&collection));
            EXIT_OK
        }
        Err(code) => code,
    }
}

fn cmd_tree<G: Game>(file: &Path, json: bool, config: &ParserConfig) -> i32 {
    let syntax = match load_or_report::<G>(file, config) {
        Ok(collection) => collection,
        Err(code) => return code,
    };

    if json {
        return match serde_json::to_string_pretty(&syntax) {
            Ok(text) => {
                println!("{}", text);
                EXIT_OK
            }
            Err(e) => {
                report_error(&format!("cannot encode JSON: {}", e));
                EXIT_ERROR
            }
        };
    }

    let game = GameCollection::<G>::from_syntax(&syntax);
    for line in outline(&game) {
        println!("{}", line);
    }
    EXIT_OK
}

/// One line per node; a node stays at its parent's indent unless the parent forks
fn outline<G: Game>(game: &GameCollection<G>) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending: Vec<_> = game.roots().iter().rev().map(|&id| (id, 0usize)).collect();
    while let Some((id, indent)) = pending.pop() {
        let number = game.number(id).unwrap_or_default();
        lines.push(format!(
            "{}{} {}",
            "  ".repeat(indent),
            format!("#{}", number).cyan(),
            serialize_properties(game.properties(id))
        ));
        let children = game.children(id);
        let child_indent = if children.len() > 1 { indent + 1 } else { indent };
        pending.extend(children.iter().rev().map(|&child| (child, child_indent)));
    }
    lines
}

fn cmd_diff<G: Game>(file_a: &Path, file_b: &Path, quiet: bool, config: &ParserConfig) -> i32 {
    let (a, b) = match (
        load_or_report::<G>(file_a, config),
        load_or_report::<G>(file_b, config),
    ) {
        (Ok(a), Ok(b)) => (a, b),
        _ => return EXIT_ERROR,
    };

    let left = GameCollection::<G>::from_syntax(&a);
    let right = GameCollection::<G>::from_syntax(&b);
    if left == right {
        if !quiet {
            println!("{} records are structurally identical", "✓".green().bold());
        }
        return EXIT_OK;
    }

    println!("{}", format!("--- {}", file_a.display()).red());
    println!("{}", format!("+++ {}", file_b.display()).green());
    let old = serialize_pretty(&a);
    let new = serialize_pretty(&b);
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();
    for i in 0..old_lines.len().max(new_lines.len()) {
        match (old_lines.get(i), new_lines.get(i)) {
            (Some(l), Some(r)) if l == r => println!("  {}", l),
            (l, r) => {
                if let Some(l) = l {
                    println!("{}", format!("- {}", l).red());
                }
                if let Some(r) = r {
                    println!("{}", format!("+ {}", r).green());
                }
            }
        }
    }
    EXIT_NEGATIVE
}

// ── Logging ───────────────────────────────────────────────

mod logging {
    use log::LevelFilter;

    /// `RUST_LOG` refines the level picked by the flags
    pub fn init(verbose: u8, quiet: bool) {
        let level = match (quiet, verbose) {
            (true, _) => LevelFilter::Off,
            (false, 0) => LevelFilter::Warn,
            (false, 1) => LevelFilter::Debug,
            (false, _) => LevelFilter::Trace,
        };
        let mut builder = env_logger::Builder::new();
        builder.filter_level(level).format_timestamp(None);
        if !quiet {
            builder.parse_default_env();
        }
        // Fails only if a logger is already installed.
        let _ = builder.try_init();
    }
}
