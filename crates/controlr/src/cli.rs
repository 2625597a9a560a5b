//! Clap derive structures for the `controlr` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

use controlr_core::{Characteristic, ServiceRegion};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// controlr -- drive Rinnai Control-R water heaters from the command line
#[derive(Debug, Parser)]
#[command(
    name = "controlr",
    version,
    about = "Control Rinnai Control-R water heaters from the command line",
    long_about = "A CLI for Rinnai water heaters connected through the Control-R cloud.\n\n\
        Reads recirculation, temperature, and hot-water readiness, switches\n\
        recirculation, and sets the target temperature.",
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
    /// Account profile to use
    #[arg(long, short = 'p', env = "CONTROLR_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Account email (overrides profile)
    #[arg(long, short = 'e', env = "CONTROLR_EMAIL", global = true)]
    pub email: Option<String>,

    /// Service region (overrides profile)
    #[arg(long, short = 'r', env = "CONTROLR_REGION", global = true)]
    pub region: Option<Region>,

    /// Cloud base URL (overrides region)
    #[arg(long, env = "CONTROLR_BASE_URL", global = true, hide = true)]
    pub base_url: Option<String>,

    /// OEM application id (overrides profile)
    #[arg(long, env = "CONTROLR_APP_ID", global = true, hide_env = true)]
    pub app_id: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CONTROLR_OUTPUT",
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

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "CONTROLR_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
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

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Region {
    /// North America
    Us,
    /// Europe
    Eu,
    /// China
    Cn,
}

impl From<Region> for ServiceRegion {
    fn from(region: Region) -> Self {
        match region {
            Region::Us => ServiceRegion::Us,
            Region::Eu => ServiceRegion::Eu,
            Region::Cn => ServiceRegion::Cn,
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List and inspect the account's water heaters
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Read and control one water heater
    #[command(alias = "h")]
    Heater(HeaterArgs),

    /// Raw device property access
    #[command(alias = "prop")]
    Property(PropertyArgs),

    /// Poll every heater and print state changes
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List the account's water heaters
    #[command(alias = "ls")]
    List,

    /// Show one device record
    Get {
        /// Device serial number (DSN)
        serial: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  HEATER
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct HeaterArgs {
    #[command(subcommand)]
    pub command: HeaterCommand,
}

#[derive(Debug, Subcommand)]
pub enum HeaterCommand {
    /// Show every derived state of a heater
    Status {
        /// Device serial number (DSN)
        serial: String,
    },

    /// Read a single characteristic
    Get {
        /// Device serial number (DSN)
        serial: String,

        /// Characteristic, e.g. active, water-is-ready
        characteristic: Characteristic,
    },

    /// Turn recirculation on
    On {
        /// Device serial number (DSN)
        serial: String,
    },

    /// Turn recirculation off
    Off {
        /// Device serial number (DSN)
        serial: String,
    },

    /// Set the target temperature in °C
    Temp {
        /// Device serial number (DSN)
        serial: String,

        /// Target temperature (35-85 °C)
        #[arg(value_parser = clap::value_parser!(i32).range(35..=85))]
        celsius: i32,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PROPERTY
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PropertyArgs {
    #[command(subcommand)]
    pub command: PropertyCommand,
}

#[derive(Debug, Subcommand)]
pub enum PropertyCommand {
    /// Read a property value
    Get {
        /// Device serial number (DSN)
        serial: String,

        /// Property name
        name: String,
    },

    /// Write a property value
    Set {
        /// Device serial number (DSN)
        serial: String,

        /// Property name
        name: String,

        /// Value as JSON, e.g. 1, true, 120
        value: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WATCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Seconds between polls
    #[arg(long, short = 'i', default_value = "60", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// Re-list devices every N polls (0 disables)
    #[arg(long, default_value = "10")]
    pub rediscover_every: u32,
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

    /// Display current configuration (secrets masked)
    Show,

    /// Store a secret in the system keyring
    SetPassword {
        /// Profile name (defaults to active profile)
        #[arg(long)]
        profile: Option<String>,

        /// Store the OEM application secret instead of the account password
        #[arg(long)]
        app_secret: bool,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
