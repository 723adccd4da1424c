//! BreakVault - move catalogue, combo generator and practice tracker
//!
//! CLI entry point with global panic handler.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use breakvault::cli::battle::BattleListFilter;
use breakvault::cli::{
    split_list, BattleCommand, BattleTagCommand, ComboCommand, GenerateCommand, GoalCommand,
    MoveCommand, OutputOptions, StageCommand, TagCommand, TransferCommand,
};
use breakvault::config::{vault_home, Config};
use breakvault::core::{EnergyLevel, TrainingStatus};
use breakvault::error::exit_codes;
use breakvault::storage::FileVaultStore;
use breakvault::vault::{BattleComboUpdate, GoalStageUpdate};

// =============================================================================
// CLI Definition
// =============================================================================

/// BreakVault - move catalogue, combo generator and practice tracker for breakers
#[derive(Parser)]
#[command(name = "breakvault")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output as JSON
    #[arg(long, short, global = true)]
    json: bool,
    /// Suppress output
    #[arg(long, short, global = true)]
    quiet: bool,
    /// Use this vault file instead of the configured one
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage moves
    Move {
        #[command(subcommand)]
        action: MoveAction,
    },

    /// Manage move tags
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },

    /// Generate a combo or draw a flashcard
    Generate {
        #[command(subcommand)]
        mode: GenerateMode,
    },

    /// Manage saved combos
    Combo {
        #[command(subcommand)]
        action: ComboAction,
    },

    /// Manage battle combos
    Battle {
        #[command(subcommand)]
        action: BattleAction,
    },

    /// Manage battle tags
    BattleTag {
        #[command(subcommand)]
        action: TagAction,
    },

    /// Manage practice goals
    Goal {
        #[command(subcommand)]
        action: GoalAction,
    },

    /// Manage goal stages and record progress
    Stage {
        #[command(subcommand)]
        action: StageAction,
    },

    /// Export the whole vault as JSON
    Export {
        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Replace the vault with an export file
    Import {
        /// Export file to read
        path: PathBuf,
    },

    /// Delete all data
    Reset {
        /// Restore the example data afterwards
        #[arg(long)]
        examples: bool,
    },
}

#[derive(Subcommand)]
enum MoveAction {
    /// List moves with their tags
    List {
        /// Only moves carrying this tag
        #[arg(long, short)]
        tag: Option<String>,
    },
    /// Show one move
    Show { key: String },
    /// Add a move
    Add {
        name: String,
        /// Tag names (comma-separated or repeated)
        #[arg(long, short)]
        tags: Vec<String>,
    },
    /// Rename a move or replace its tags
    Edit {
        key: String,
        #[arg(long)]
        name: Option<String>,
        /// New tag set; pass "" to clear
        #[arg(long, short)]
        tags: Option<Vec<String>>,
    },
    /// Delete a move
    Delete { key: String },
}

#[derive(Subcommand)]
enum TagAction {
    /// List tags
    List,
    /// Add a tag
    Add { name: String },
    /// Rename a tag
    Rename { key: String, new_name: String },
    /// Delete a tag and unlink it everywhere
    Delete { key: String },
}

#[derive(Subcommand)]
enum GenerateMode {
    /// Random combo from moves carrying any of the given tags
    Random {
        /// Tag names to draw from
        #[arg(long, short)]
        tags: Vec<String>,
        /// Combo length (random within the configured bounds if omitted)
        #[arg(long, short)]
        length: Option<usize>,
        /// Allow the same move more than once
        #[arg(long)]
        allow_repeats: bool,
        /// Random seed for reproducible combos
        #[arg(long)]
        seed: Option<u64>,
        /// Save the combo, optionally under NAME
        #[arg(long, num_args = 0..=1, default_missing_value = "")]
        save: Option<String>,
    },
    /// One move per tag, in the given order
    Structured {
        /// Tag sequence
        #[arg(required = true)]
        sequence: Vec<String>,
        /// Random seed for reproducible combos
        #[arg(long)]
        seed: Option<u64>,
        /// Save the combo, optionally under NAME
        #[arg(long, num_args = 0..=1, default_missing_value = "")]
        save: Option<String>,
    },
    /// Draw a single random move
    Flashcard {
        /// Tag names to draw from
        #[arg(long, short)]
        tags: Vec<String>,
        /// Random seed
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Subcommand)]
enum ComboAction {
    /// List saved combos, newest first
    List,
    /// Show one combo
    Show { key: String },
    /// Save a combo by hand
    Save {
        /// Combo name (defaults to a timestamp)
        #[arg(long, short, default_value = "")]
        name: String,
        /// Move names in order
        #[arg(required = true)]
        moves: Vec<String>,
    },
    /// Rename a combo or replace its moves
    Edit {
        key: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, num_args = 1..)]
        moves: Option<Vec<String>>,
    },
    /// Delete a combo
    Delete { key: String },
}

#[derive(Subcommand)]
enum BattleAction {
    /// List battle combos
    List {
        #[arg(long, short)]
        energy: Option<EnergyLevel>,
        #[arg(long, short)]
        status: Option<TrainingStatus>,
        /// Hide combos already used
        #[arg(long)]
        unused: bool,
    },
    /// Show one battle combo
    Show { key: String },
    /// Add a battle combo
    Add {
        description: String,
        #[arg(long, short, default_value = "none")]
        energy: EnergyLevel,
        #[arg(long, short, default_value = "training")]
        status: TrainingStatus,
        /// Battle tag names; unknown tags are created
        #[arg(long, short)]
        tags: Vec<String>,
    },
    /// Edit a battle combo
    Edit {
        key: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, short)]
        energy: Option<EnergyLevel>,
        #[arg(long, short)]
        status: Option<TrainingStatus>,
        /// New tag set; pass "" to clear
        #[arg(long, short)]
        tags: Option<Vec<String>>,
    },
    /// Mark a combo used or unused
    Toggle { key: String },
    /// Mark every combo unused
    Reset,
    /// Delete a battle combo
    Delete { key: String },
}

#[derive(Subcommand)]
enum GoalAction {
    /// List goals
    List {
        /// Show archived goals instead
        #[arg(long)]
        archived: bool,
    },
    /// Show a goal with its stages
    Show { key: String },
    /// Create a goal
    Create {
        title: String,
        #[arg(long, short, default_value = "")]
        description: String,
    },
    /// Edit a goal
    Edit {
        key: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, short)]
        description: Option<String>,
    },
    /// Archive a goal
    Archive { key: String },
    /// Restore an archived goal
    Unarchive { key: String },
    /// Delete a goal and its stages
    Delete { key: String },
}

#[derive(Subcommand)]
enum StageAction {
    /// Add a stage to a goal
    Add {
        /// Goal id or title
        goal: String,
        name: String,
        /// Target count
        #[arg(long, short)]
        target: u32,
        /// Unit (defaults to the configured unit)
        #[arg(long, short)]
        unit: Option<String>,
    },
    /// Edit a stage
    Edit {
        key: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, short)]
        target: Option<u32>,
        #[arg(long, short)]
        unit: Option<String>,
    },
    /// Record progress (negative amounts undo)
    Progress {
        key: String,
        #[arg(default_value_t = 1, allow_negative_numbers = true)]
        amount: i64,
    },
    /// Delete a stage
    Delete { key: String },
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    setup_panic_handler();
    setup_tracing();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("breakvault error: {}", e);
            ExitCode::from(exit_codes::ERROR as u8)
        }
    }
}

/// Log to stderr, filtered by `BREAKVAULT_LOG` (default `warn`).
fn setup_tracing() {
    let filter =
        EnvFilter::try_from_env("BREAKVAULT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Set up the global panic handler.
///
/// On panic, logs to ~/.breakvault/crash.log and exits with code 3.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("breakvault panic: {}", info);

        if let Some(home) = vault_home() {
            let _ = std::fs::create_dir_all(&home);
            let crash_log = home.join("crash.log");
            if let Ok(mut file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log)
            {
                let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
                let _ = writeln!(file, "[{}] {}", timestamp, info);
            }
        }

        std::process::exit(exit_codes::CRASH);
    }));
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = Config::load();
    if let Some(path) = cli.data_file {
        config.storage.data_file = Some(path);
    }
    let store = FileVaultStore::from_config(&config)?;
    tracing::debug!(path = %store.path().display(), "using vault file");

    let options = OutputOptions {
        json: cli.json,
        quiet: cli.quiet,
    };

    let success = match cli.command {
        Commands::Move { action } => run_move(action, store, config, &options),
        Commands::Tag { action } => run_tag(action, store, config, &options),
        Commands::Generate { mode } => run_generate(mode, store, config, &options),
        Commands::Combo { action } => run_combo(action, store, config, &options),
        Commands::Battle { action } => run_battle(action, store, config, &options),
        Commands::BattleTag { action } => run_battle_tag(action, store, config, &options),
        Commands::Goal { action } => run_goal(action, store, config, &options),
        Commands::Stage { action } => run_stage(action, store, config, &options),
        Commands::Export { output } => {
            let cmd = TransferCommand::new(store, config);
            let result = cmd.export(output.as_deref());
            emit(cmd.format_output(&result, &options));
            result.success
        }
        Commands::Import { path } => {
            let cmd = TransferCommand::new(store, config);
            let result = cmd.import(&path);
            emit(cmd.format_output(&result, &options));
            result.success
        }
        Commands::Reset { examples } => {
            let cmd = TransferCommand::new(store, config);
            let result = cmd.reset(examples);
            emit(cmd.format_output(&result, &options));
            result.success
        }
    };

    Ok(success_to_exit_code(success))
}

// =============================================================================
// Command Implementations
// =============================================================================

/// Convert a success boolean to an exit code.
fn success_to_exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::from(exit_codes::SUCCESS as u8)
    } else {
        ExitCode::from(exit_codes::ERROR as u8)
    }
}

/// Print formatted output; the text already ends with a newline.
fn emit(formatted: String) {
    if !formatted.is_empty() {
        print!("{}", formatted);
        if !formatted.ends_with('\n') {
            println!();
        }
    }
}

fn run_move(
    action: MoveAction,
    store: FileVaultStore,
    config: Config,
    options: &OutputOptions,
) -> bool {
    let cmd = MoveCommand::new(store, config);
    let output = match action {
        MoveAction::List { tag } => cmd.list(tag.as_deref()),
        MoveAction::Show { key } => cmd.show(&key),
        MoveAction::Add { name, tags } => cmd.add(&name, &split_list(&tags)),
        MoveAction::Edit { key, name, tags } => {
            let tags = tags.map(|t| split_list(&t));
            cmd.edit(&key, name.as_deref(), tags.as_deref())
        }
        MoveAction::Delete { key } => cmd.delete(&key),
    };
    emit(cmd.format_output(&output, options));
    output.success
}

fn run_tag(
    action: TagAction,
    store: FileVaultStore,
    config: Config,
    options: &OutputOptions,
) -> bool {
    let cmd = TagCommand::new(store, config);
    let output = match action {
        TagAction::List => cmd.list(),
        TagAction::Add { name } => cmd.add(&name),
        TagAction::Rename { key, new_name } => cmd.rename(&key, &new_name),
        TagAction::Delete { key } => cmd.delete(&key),
    };
    emit(cmd.format_output(&output, options));
    output.success
}

fn run_battle_tag(
    action: TagAction,
    store: FileVaultStore,
    config: Config,
    options: &OutputOptions,
) -> bool {
    let cmd = BattleTagCommand::new(store, config);
    let output = match action {
        TagAction::List => cmd.list(),
        TagAction::Add { name } => cmd.add(&name),
        TagAction::Rename { key, new_name } => cmd.rename(&key, &new_name),
        TagAction::Delete { key } => cmd.delete(&key),
    };
    emit(cmd.format_output(&output, options));
    output.success
}

fn run_generate(
    mode: GenerateMode,
    store: FileVaultStore,
    config: Config,
    options: &OutputOptions,
) -> bool {
    match mode {
        GenerateMode::Random {
            tags,
            length,
            allow_repeats,
            seed,
            save,
        } => {
            let cmd = GenerateCommand::new(store, config).with_seed(seed);
            let output = cmd.random(&split_list(&tags), length, allow_repeats, save.as_deref());
            emit(cmd.format_output(&output, options));
            output.success
        }
        GenerateMode::Structured {
            sequence,
            seed,
            save,
        } => {
            let cmd = GenerateCommand::new(store, config).with_seed(seed);
            let output = cmd.structured(&split_list(&sequence), save.as_deref());
            emit(cmd.format_output(&output, options));
            output.success
        }
        GenerateMode::Flashcard { tags, seed } => {
            let cmd = GenerateCommand::new(store, config).with_seed(seed);
            let output = cmd.flashcard(&split_list(&tags));
            emit(cmd.format_flashcard(&output, options));
            output.success
        }
    }
}

fn run_combo(
    action: ComboAction,
    store: FileVaultStore,
    config: Config,
    options: &OutputOptions,
) -> bool {
    let cmd = ComboCommand::new(store, config);
    let output = match action {
        ComboAction::List => cmd.list(),
        ComboAction::Show { key } => cmd.show(&key),
        ComboAction::Save { name, moves } => cmd.save(&name, split_list(&moves)),
        ComboAction::Edit { key, name, moves } => {
            cmd.edit(&key, name.as_deref(), moves.map(|m| split_list(&m)))
        }
        ComboAction::Delete { key } => cmd.delete(&key),
    };
    emit(cmd.format_output(&output, options));
    output.success
}

fn run_battle(
    action: BattleAction,
    store: FileVaultStore,
    config: Config,
    options: &OutputOptions,
) -> bool {
    let cmd = BattleCommand::new(store, config);
    let output = match action {
        BattleAction::List {
            energy,
            status,
            unused,
        } => cmd.list(&BattleListFilter {
            energy,
            status,
            unused_only: unused,
        }),
        BattleAction::Show { key } => cmd.show(&key),
        BattleAction::Add {
            description,
            energy,
            status,
            tags,
        } => cmd.add(&description, energy, status, &split_list(&tags)),
        BattleAction::Edit {
            key,
            description,
            energy,
            status,
            tags,
        } => cmd.edit(
            &key,
            BattleComboUpdate {
                description,
                energy,
                status,
                tag_names: tags.map(|t| split_list(&t)),
            },
        ),
        BattleAction::Toggle { key } => cmd.toggle(&key),
        BattleAction::Reset => cmd.reset(),
        BattleAction::Delete { key } => cmd.delete(&key),
    };
    emit(cmd.format_output(&output, options));
    output.success
}

fn run_goal(
    action: GoalAction,
    store: FileVaultStore,
    config: Config,
    options: &OutputOptions,
) -> bool {
    let cmd = GoalCommand::new(store, config);
    let output = match action {
        GoalAction::List { archived } => cmd.list(archived),
        GoalAction::Show { key } => cmd.show(&key),
        GoalAction::Create { title, description } => cmd.create(&title, &description),
        GoalAction::Edit {
            key,
            title,
            description,
        } => cmd.edit(&key, title.as_deref(), description.as_deref()),
        GoalAction::Archive { key } => cmd.archive(&key),
        GoalAction::Unarchive { key } => cmd.unarchive(&key),
        GoalAction::Delete { key } => cmd.delete(&key),
    };
    emit(cmd.format_output(&output, options));
    output.success
}

fn run_stage(
    action: StageAction,
    store: FileVaultStore,
    config: Config,
    options: &OutputOptions,
) -> bool {
    let cmd = StageCommand::new(store, config);
    let output = match action {
        StageAction::Add {
            goal,
            name,
            target,
            unit,
        } => cmd.add(&goal, &name, target, unit.as_deref()),
        StageAction::Edit {
            key,
            name,
            target,
            unit,
        } => cmd.edit(
            &key,
            GoalStageUpdate {
                name,
                target_count: target,
                unit,
            },
        ),
        StageAction::Progress { key, amount } => cmd.progress(&key, amount),
        StageAction::Delete { key } => cmd.delete(&key),
    };
    emit(cmd.format_output(&output, options));
    output.success
}
