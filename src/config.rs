use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "autogame-tui", about = "Terminal viewer for AutoGame events on Flow")]
pub struct Config {
    /// Path to the Flow manifest (flow.json)
    #[arg(short, long, env = "FLOW_JSON", default_value = "flow.json")]
    pub manifest: PathBuf,

    /// Network whose contract alias is used (emulator, testnet, mainnet)
    #[arg(short, long, default_value = "emulator")]
    pub network: String,

    /// Access node REST endpoint
    #[arg(short, long, env = "FLOW_ACCESS_NODE", default_value = "http://localhost:8888")]
    pub access_node: String,

    /// Contract emitting the events
    #[arg(long, default_value = "AutoGame")]
    pub contract: String,

    /// Event stream to open: an event name, a tab number (1-5) or a full A.<addr>.<Contract>.<Event> identifier
    #[arg(short, long, default_value = "BattleCreated")]
    pub event: String,

    /// Replay events from this block height instead of the latest sealed block
    #[arg(long)]
    pub start_height: Option<u64>,

    /// Poll interval in milliseconds for new sealed blocks
    #[arg(long, default_value = "1000")]
    pub poll_interval_ms: u64,

    /// Tick rate in milliseconds for UI refresh
    #[arg(long, default_value = "100")]
    pub tick_rate_ms: u64,

    /// Directory for exported event logs
    #[arg(long, default_value = ".")]
    pub export_dir: PathBuf,

    /// Directory for the log file (defaults to the user cache directory)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}
