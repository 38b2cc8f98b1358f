//! Clap derive structures for the `fireside` CLI.
//!
//! Defines the command tree, global flags, and the small value enums that
//! map onto API filter types.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use fireside_api::models::{AccountType, TransactionType};
use fireside_core::DashboardSection;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fireside -- Firefly III from the terminal, online or off
#[derive(Debug, Parser)]
#[command(
    name = "fireside",
    version,
    about = "Firefly III personal finance from the command line",
    long_about = "Browse accounts, transactions, budgets and bills on a Firefly III server.\n\n\
        Accounts and transactions are cached on this device, so they stay \
        readable when the server is unreachable (or with --offline).",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Output format (defaults to the `output` config setting)
    #[arg(long, short = 'o', env = "FIRESIDE_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Read cached data only; never contact the server
    #[arg(long, global = true)]
    pub offline: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with a personal access token
    Login(LoginArgs),

    /// Sign out and wipe cached data (display preferences are kept)
    Logout,

    /// Show session, cache freshness and queued transactions
    Status,

    /// List accounts
    #[command(alias = "acc")]
    Accounts(AccountsArgs),

    /// List transactions
    #[command(alias = "tx")]
    Transactions(TransactionsArgs),

    /// List budgets with spending for a period
    Budgets(PeriodArgs),

    /// List bills
    Bills(PeriodArgs),

    /// List piggy banks
    PiggyBanks,

    /// Refresh the offline cache for accounts and transactions
    Sync,

    /// Manage transactions queued while offline
    Pending(PendingArgs),

    /// Arrange dashboard sections
    #[command(alias = "dash")]
    Dashboard(DashboardArgs),

    /// Show or hide balances in tables
    Balance(BalanceArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Session ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Server root, e.g. https://firefly.example.com (defaults to `endpoint_url` in config)
    #[arg(long)]
    pub url: Option<String>,

    /// Personal access token (prompted for when omitted)
    #[arg(long, env = "FIRESIDE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

// ── Listing ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AccountKind {
    Asset,
    Expense,
    Revenue,
    Cash,
    Liabilities,
}

impl From<AccountKind> for AccountType {
    fn from(kind: AccountKind) -> Self {
        match kind {
            AccountKind::Asset => Self::Asset,
            AccountKind::Expense => Self::Expense,
            AccountKind::Revenue => Self::Revenue,
            AccountKind::Cash => Self::Cash,
            AccountKind::Liabilities => Self::Liabilities,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TransactionKind {
    Withdrawal,
    Deposit,
    Transfer,
}

impl From<TransactionKind> for TransactionType {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Withdrawal => Self::Withdrawal,
            TransactionKind::Deposit => Self::Deposit,
            TransactionKind::Transfer => Self::Transfer,
        }
    }
}

#[derive(Debug, Args)]
pub struct AccountsArgs {
    /// Only accounts of this type
    #[arg(long = "type", short = 't')]
    pub account_type: Option<AccountKind>,
}

#[derive(Debug, Args)]
pub struct TransactionsArgs {
    #[command(flatten)]
    pub period: PeriodArgs,

    /// Only transactions of this type
    #[arg(long = "type", short = 't')]
    pub transaction_type: Option<TransactionKind>,
}

/// Optional `--start`/`--end` window (YYYY-MM-DD).
#[derive(Debug, Args)]
pub struct PeriodArgs {
    /// First day of the period
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day of the period
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

// ── Pending queue ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PendingArgs {
    #[command(subcommand)]
    pub command: PendingCommand,
}

#[derive(Debug, Subcommand)]
pub enum PendingCommand {
    /// Queue a transaction for later submission
    Add(PendingAddArgs),

    /// List queued transactions
    #[command(alias = "ls")]
    List,

    /// Drop one queued transaction
    #[command(alias = "rm")]
    Remove {
        /// Queue entry ID
        id: Uuid,
    },

    /// Drop every queued transaction
    Clear,
}

#[derive(Debug, Args)]
pub struct PendingAddArgs {
    /// Amount as a positive decimal, e.g. 12.50
    #[arg(long, short = 'a')]
    pub amount: String,

    /// Description
    #[arg(long, short = 'd')]
    pub description: String,

    #[arg(long = "type", short = 't', default_value = "withdrawal")]
    pub transaction_type: TransactionKind,

    /// Booking date (defaults to today)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Source account name
    #[arg(long)]
    pub source: Option<String>,

    /// Destination account name
    #[arg(long)]
    pub destination: Option<String>,

    /// Category name
    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

// ── Dashboard ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DashboardArgs {
    #[command(subcommand)]
    pub command: DashboardCommand,
}

#[derive(Debug, Subcommand)]
pub enum DashboardCommand {
    /// Show visible sections in order, then hidden ones
    Show,

    /// Hide a section
    Hide {
        /// Section name, e.g. piggy-banks
        section: DashboardSection,
    },

    /// Show a hidden section again (appended at the end)
    Reveal { section: DashboardSection },

    /// Move a visible section to another position (1-based)
    Move { from: usize, to: usize },

    /// Restore the default layout
    Reset,
}

// ── Balance ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct BalanceArgs {
    #[command(subcommand)]
    pub command: BalanceCommand,
}

#[derive(Debug, Subcommand)]
pub enum BalanceCommand {
    /// Flip between showing and masking amounts
    Toggle,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
