//! Clap derive structures for the `smlight` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use smlight_api::Setting;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// smlight -- control and monitor SMLIGHT SLZB-06x coordinators
#[derive(Debug, Parser)]
#[command(
    name = "smlight",
    version,
    about = "Control and monitor SMLIGHT SLZB-06x Zigbee coordinators",
    long_about = "Query, configure, and watch SMLIGHT SLZB-06x devices over their\n\
        local HTTP API and Server-Sent Events stream.",
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
    /// Device profile to use
    #[arg(long, short = 'p', env = "SMLIGHT_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Device hostname or ip[:port] (overrides profile)
    #[arg(long, short = 'H', env = "SMLIGHT_HOST", global = true)]
    pub host: Option<String>,

    /// Username for devices with web authentication enabled
    #[arg(long, short = 'u', env = "SMLIGHT_USERNAME", global = true)]
    pub username: Option<String>,

    /// Password for devices with web authentication enabled
    #[arg(long, env = "SMLIGHT_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SMLIGHT_OUTPUT",
        default_value = "plain",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "SMLIGHT_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default)
    Plain,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show device information
    #[command(alias = "i")]
    Info,

    /// Show live sensor readings and toggle states
    #[command(alias = "s")]
    Sensors,

    /// Stream device events until interrupted
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Send a device command
    Cmd(CmdArgs),

    /// Switch a device setting on or off
    Toggle(ToggleArgs),

    /// List available firmware releases
    #[command(alias = "fw")]
    Firmware(FirmwareArgs),

    /// Check whether the device requires credentials
    AuthCheck,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Only show events of this wire type (e.g. LOG_STR, SAVE_PARAMS)
    #[arg(long, short = 'k')]
    pub kind: Option<String>,

    /// Device runs legacy firmware (no keep-alives, long read timeout)
    #[arg(long)]
    pub legacy: bool,

    /// Exit after this many events
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CmdArgs {
    /// Command to send
    pub command: DeviceCommand,

    /// Radio index for zb-router on multi-radio devices
    #[arg(long, default_value_t = 0)]
    pub idx: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DeviceCommand {
    /// Restart the ESP32 core
    Reboot,
    /// Restart the Zigbee chip
    ZbRestart,
    /// Put the Zigbee chip into its bootloader
    ZbBootloader,
    /// Reconnect the Zigbee router
    ZbRouter,
}

// ── Toggle ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ToggleArgs {
    /// Setting to change
    pub setting: SettingArg,

    /// New state
    pub state: ToggleState,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SettingArg {
    DisableLeds,
    NightMode,
    ZbAutoupdate,
    EnableVpn,
}

impl From<SettingArg> for Setting {
    fn from(arg: SettingArg) -> Self {
        match arg {
            SettingArg::DisableLeds => Self::DisableLeds,
            SettingArg::NightMode => Self::NightMode,
            SettingArg::ZbAutoupdate => Self::ZbAutoupdate,
            SettingArg::EnableVpn => Self::EnableVpn,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ToggleState {
    On,
    Off,
}

// ── Firmware ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct FirmwareArgs {
    /// List Zigbee releases instead of core releases
    #[arg(long, short = 'z')]
    pub zigbee: bool,

    /// Release channel; "dev" includes development builds
    #[arg(long, short = 'c')]
    pub channel: Option<String>,

    /// Device model for Zigbee lookups (default: read from the device)
    #[arg(long)]
    pub device: Option<String>,

    /// Only list Zigbee releases for this radio role (0 coordinator, 1 router, 2 thread)
    #[arg(long)]
    pub zb_type: Option<i64>,

    /// Radio index on multi-radio devices
    #[arg(long, default_value_t = 0)]
    pub idx: u8,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
