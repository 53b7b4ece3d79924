//! Clap derive structures for the `rwtool` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// rwtool -- admin console for the report-distribution platform
#[derive(Debug, Parser)]
#[command(
    name = "rwtool",
    version,
    about = "Administer report domains, subscriptions and access groups",
    long_about = "Command-line console for the report-distribution platform.\n\n\
        Manage report domains, review subscription requests, map AD groups\n\
        to report folders, and browse or download the reports you can see.",
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
    /// Server profile to use
    #[arg(long, short = 'p', env = "RWTOOL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Server base URL (overrides profile)
    #[arg(long, short = 'u', env = "RWTOOL_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "RWTOOL_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds
    #[arg(long, env = "RWTOOL_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Act as this email (overrides profile)
    #[arg(long, env = "RWTOOL_EMAIL", global = true)]
    pub as_email: Option<String>,

    /// Display name sent with new requests
    #[arg(long, global = true)]
    pub as_name: Option<String>,

    /// Department sent with new requests
    #[arg(long, global = true)]
    pub as_department: Option<String>,

    /// Role hint: ADMIN, OPS or USER
    #[arg(long, global = true)]
    pub as_role: Option<String>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
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
    /// Manage report domains
    #[command(alias = "dom", alias = "d")]
    Domains(DomainsArgs),

    /// Review and file subscription requests
    #[command(alias = "req", alias = "r")]
    Requests(RequestsArgs),

    /// Manage AD user groups and their folder access
    #[command(alias = "g")]
    Groups(GroupsArgs),

    /// Browse report folders
    #[command(alias = "f")]
    Folders(FoldersArgs),

    /// View and download reports
    Reports(ReportsArgs),

    /// Manage favorite reports
    #[command(alias = "fav")]
    Favorites(FavoritesArgs),

    /// Log in, sign up, and show the current identity
    Auth(AuthArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared List Arguments ────────────────────────────────────────────

/// Client-side search and status filter shared by list commands.
#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Case-insensitive substring search
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Status filter (e.g. pending, approved, rejected, all)
    #[arg(long)]
    pub status: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DOMAINS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DomainsArgs {
    #[command(subcommand)]
    pub command: DomainsCommand,
}

#[derive(Debug, Subcommand)]
pub enum DomainsCommand {
    /// List domains
    #[command(alias = "ls")]
    List(FilterArgs),

    /// Show one domain
    Get {
        /// Domain ID
        id: String,
    },

    /// Create a domain
    Create {
        /// Domain name
        #[arg(long)]
        name: String,

        /// Description
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Update a domain
    Update {
        /// Domain ID
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a domain
    #[command(alias = "rm")]
    Delete {
        /// Domain ID
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  REQUESTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RequestsArgs {
    #[command(subcommand)]
    pub command: RequestsCommand,
}

#[derive(Debug, Subcommand)]
pub enum RequestsCommand {
    /// List subscription requests
    #[command(alias = "ls")]
    List {
        /// Only pending requests (server-side)
        #[arg(long, conflicts_with = "user")]
        pending: bool,

        /// Only requests filed by this email
        #[arg(long)]
        user: Option<String>,

        /// Only the current identity's requests
        #[arg(long, conflicts_with_all = ["pending", "user"])]
        mine: bool,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Show one request
    Get {
        /// Request ID
        id: String,
    },

    /// Request access to a domain as the current identity
    Create {
        /// Domain ID
        #[arg(long)]
        domain: String,

        /// Why access is needed
        #[arg(long)]
        reason: String,
    },

    /// Approve a pending request
    Approve {
        /// Request ID
        id: String,
    },

    /// Reject a pending request
    Reject {
        /// Request ID
        id: String,

        /// Rejection reason
        #[arg(long)]
        reason: String,
    },

    /// Approve or reject through the combined review endpoint
    Review {
        /// Request ID
        id: String,

        /// Decision
        #[arg(long, value_enum)]
        action: ReviewAction,

        /// Required when rejecting
        #[arg(long)]
        reason: Option<String>,
    },

    /// Withdraw one of your own pending requests
    Cancel {
        /// Request ID
        id: String,
    },

    /// Request counts and approval rate
    Stats,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReviewAction {
    Approve,
    Reject,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  GROUPS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct GroupsArgs {
    #[command(subcommand)]
    pub command: GroupsCommand,
}

/// Fields shared by group create and update.
#[derive(Debug, Args)]
pub struct GroupFields {
    /// AD group name
    #[arg(long)]
    pub name: Option<String>,

    /// Folder the group may read (repeatable)
    #[arg(long = "folder")]
    pub folders: Vec<String>,

    /// Associated domain name
    #[arg(long)]
    pub domain: Option<String>,

    /// Member email (repeatable)
    #[arg(long = "member")]
    pub members: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum GroupsCommand {
    /// List user groups
    #[command(alias = "ls")]
    List(FilterArgs),

    /// Show one group
    Get {
        /// Group ID
        id: i64,
    },

    /// Create a group
    Create(GroupFields),

    /// Update a group. Given lists replace the stored ones.
    Update {
        /// Group ID
        id: i64,

        #[command(flatten)]
        fields: GroupFields,
    },

    /// Delete a group
    #[command(alias = "rm")]
    Delete {
        /// Group ID
        id: i64,
    },

    /// Add a member to a group
    AddMember {
        /// Group ID
        id: i64,

        /// Member email
        email: String,
    },

    /// Remove a member from a group
    RemoveMember {
        /// Group ID
        id: i64,

        /// Member email
        email: String,
    },

    /// Groups a user belongs to
    ForUser {
        /// User email
        email: String,
    },

    /// Folders a user can read through their groups
    FoldersForUser {
        /// User email
        email: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  FOLDERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct FoldersArgs {
    #[command(subcommand)]
    pub command: FoldersCommand,
}

#[derive(Debug, Subcommand)]
pub enum FoldersCommand {
    /// List report folders
    #[command(alias = "ls")]
    List,

    /// Files in one folder
    Files {
        /// Folder name
        folder: String,
    },

    /// Files a user can see (defaults to the current identity)
    UserFiles {
        /// User email
        email: Option<String>,

        #[command(flatten)]
        filter: FilterArgs,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  REPORTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ReportsArgs {
    #[command(subcommand)]
    pub command: ReportsCommand,
}

/// Folder + file name identifying one report.
#[derive(Debug, Args)]
pub struct ReportArg {
    /// Folder containing the report
    #[arg(long)]
    pub folder: String,

    /// Report file name
    #[arg(long)]
    pub file: String,
}

#[derive(Debug, Subcommand)]
pub enum ReportsCommand {
    /// Report size, type and existence
    Metadata(ReportArg),

    /// Print the preview and download URLs
    Urls(ReportArg),

    /// Fetch the preview bytes to a file
    Preview {
        #[command(flatten)]
        report: ReportArg,

        /// Output path (default: the report's file name)
        #[arg(long, short = 'O')]
        out: Option<PathBuf>,
    },

    /// Download a report to disk
    Download {
        #[command(flatten)]
        report: ReportArg,

        /// Output path (default: the report's file name)
        #[arg(long, short = 'O')]
        out: Option<PathBuf>,
    },

    /// Download several reports as one zip archive
    Batch {
        /// FOLDER/FILE pairs (repeatable)
        #[arg(required = true, value_name = "FOLDER/FILE")]
        reports: Vec<String>,

        /// Archive name sent to the server
        #[arg(long, default_value = "reports.zip")]
        zip_name: String,

        /// Output path (default: the archive name)
        #[arg(long, short = 'O')]
        out: Option<PathBuf>,
    },

    /// Get a short-lived direct viewing link
    Presign {
        /// Report ID used in the link
        id: String,

        #[command(flatten)]
        report: ReportArg,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  FAVORITES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct FavoritesArgs {
    #[command(subcommand)]
    pub command: FavoritesCommand,
}

#[derive(Debug, Subcommand)]
pub enum FavoritesCommand {
    /// List the current identity's favorites
    #[command(alias = "ls")]
    List,

    /// Mark a report as favorite
    Add(ReportArg),

    /// Unmark a favorite report
    #[command(alias = "rm")]
    Remove(ReportArg),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  AUTH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Log in and store the session token
    Login {
        /// Account email
        #[arg(long)]
        email: Option<String>,

        /// Read the password from stdin instead of prompting
        #[arg(long)]
        password_stdin: bool,
    },

    /// Create an account
    Signup {
        /// Full name
        #[arg(long)]
        name: String,

        /// Account email
        #[arg(long)]
        email: String,

        /// 10-digit phone number
        #[arg(long)]
        phone: String,

        /// Working domain (required for USER accounts)
        #[arg(long, default_value = "")]
        domain: String,

        /// ADMIN, OPS or USER
        #[arg(long, default_value = "USER")]
        role: String,

        /// Read the password from stdin instead of prompting
        #[arg(long)]
        password_stdin: bool,
    },

    /// Forget the stored session token
    Logout,

    /// Show the identity this profile acts as
    Whoami,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key (api_url, timeout, email, name, department, role,
        /// notice_ms, validation_notice_ms)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
