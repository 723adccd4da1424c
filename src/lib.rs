//! BreakVault - move catalogue, combo generator and practice tracker
//!
//! BreakVault keeps a breaker's moves, tags, saved combos, battle rounds and
//! practice goals in one local vault document, and generates random or
//! structured combos from the catalogue.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod seed;
pub mod storage;
pub mod transfer;
pub mod util;
pub mod vault;

pub use config::Config;
pub use core::{
    BattleCombo, BattleTag, ComboRequest, EnergyLevel, GeneratedCombo, GenerationMode, Goal,
    GoalStage, Move, MoveTag, SavedCombo, TrainingStatus,
};
pub use error::{Result, VaultError};
pub use seed::SeedReport;
pub use storage::{FileVaultStore, MemoryVaultStore, VaultStore};
pub use transfer::{AppDataExport, ImportReport, EXPORT_FORMAT_VERSION};
pub use vault::{Vault, VaultCounts, VAULT_SCHEMA_VERSION};

// CLI commands
pub use cli::{
    BattleCommand, BattleTagCommand, ComboCommand, GenerateCommand, GoalCommand, MoveCommand,
    StageCommand, TagCommand, TransferCommand,
};
