//! CLI command definitions

use clap::{Parser, ValueEnum};
use luaglue_domain::ScriptValue;
use std::path::PathBuf;

/// Output format for the run report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// JSON output
    Json,
}

/// CLI arguments for luaglue
#[derive(Parser, Debug)]
#[command(name = "luaglue")]
#[command(author, version, about = "Run Lua scripts against a host event emitter")]
#[command(long_about = r#"
luaglue loads Lua scripts into a sandboxed VM and lets them subscribe to
host events through the `events` global (or `require("eventlib")` for
emitters of their own).

Scripts are loaded in this order:
1. The init script (SCRIPT, or scripting.init_script from config)
2. Every *.lua file in the plugin directory, alphabetically

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./luaglue.toml      Project-level config
3. ~/.config/luaglue/config.toml   Global config

Example:
  luaglue init.lua --emit ready
  luaglue --plugins ./plugins --emit tick --arg 1 --arg '"fast"'
  luaglue init.lua --list-events
"#)]
pub struct Cli {
    /// Init script to run before plugins
    pub script: Option<PathBuf>,

    /// Directory of plugins to load after the init script
    #[arg(short, long, value_name = "DIR")]
    pub plugins: Option<PathBuf>,

    /// Host events to emit after loading (can be specified multiple times)
    #[arg(short, long, value_name = "NAME")]
    pub emit: Vec<String>,

    /// Arguments passed to every emitted event, parsed as JSON when possible
    #[arg(short, long = "arg", value_name = "JSON", allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// List host events that have listeners after loading
    #[arg(short, long)]
    pub list_events: bool,

    /// Disable the global namespace sandbox
    #[arg(long)]
    pub no_sandbox: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// The `--arg` values converted to script values.
    pub fn script_args(&self) -> Vec<ScriptValue> {
        self.args.iter().map(|raw| ScriptValue::parse_arg(raw)).collect()
    }
}
