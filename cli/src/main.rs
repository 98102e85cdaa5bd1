//! CLI entrypoint for luaglue
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, anyhow, bail};
use clap::Parser;
use luaglue_application::{
    LoadScriptsInput, LoadScriptsUseCase, ScriptingEnginePort, ScriptingOptions,
};
use luaglue_infrastructure::{ConfigLoader, FileConfig};
use luaglue_presentation::{Cli, ConsoleFormatter, EventListeners, OutputFormat, RunReport};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting luaglue");

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("failed to load configuration: {}", e))?
    };

    if cli.show_config {
        print!("{}", show_config(&cli, &config)?);
        return Ok(());
    }

    let mut options = match config.to_scripting_options() {
        Ok(options) => options,
        Err(issues) => {
            for issue in &issues {
                warn!("Invalid configuration: {}", issue);
            }
            bail!("invalid configuration ({} issue(s))", issues.len());
        }
    };
    if cli.no_sandbox {
        options = options.without_sandbox();
    }

    // === Dependency Injection ===
    let engine = build_engine(&options)?;

    let input = LoadScriptsInput {
        init_script: cli.script.clone().or_else(|| config.scripting.init_script.clone()),
        plugin_dir: cli.plugins.clone().or_else(|| config.scripting.plugin_dir.clone()),
    };
    let loaded = LoadScriptsUseCase::new(Arc::clone(&engine)).execute(input)?;

    let mut report = RunReport::from_load(&loaded, engine.is_available());

    let args = cli.script_args();
    for name in &cli.emit {
        info!("Emitting '{}' with {} argument(s)", name, args.len());
        report.record_emission(name, engine.emit_event(name, args.clone()));
    }

    if cli.list_events {
        let events = engine
            .event_names()
            .into_iter()
            .map(|event| EventListeners {
                listeners: engine.listener_count(&event),
                event,
            })
            .collect();
        report = report.with_events(events);
    }

    // Output results
    let output = match cli.output {
        OutputFormat::Text => ConsoleFormatter::format(&report),
        OutputFormat::Json => ConsoleFormatter::format_json(&report),
    };

    println!("{}", output);

    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}

fn show_config(cli: &Cli, config: &FileConfig) -> Result<String> {
    let sources: Vec<(&str, String, bool)> = if cli.no_config {
        Vec::new()
    } else {
        ConfigLoader::config_sources(cli.config.as_deref())
            .into_iter()
            .map(|s| (s.label, s.path, s.found))
            .collect()
    };
    let effective = config.to_toml()?;
    Ok(ConsoleFormatter::format_config(&sources, &effective))
}

#[cfg(feature = "scripting")]
fn build_engine(options: &ScriptingOptions) -> Result<Arc<dyn ScriptingEnginePort>> {
    let engine = luaglue_infrastructure::LuaScriptingEngine::new(options)?;
    info!("Sandbox removed {} global(s)", engine.sandbox_removed().len());
    Ok(Arc::new(engine))
}

#[cfg(not(feature = "scripting"))]
fn build_engine(_options: &ScriptingOptions) -> Result<Arc<dyn ScriptingEnginePort>> {
    warn!("luaglue was built without the `scripting` feature; scripts will not run");
    Ok(Arc::new(luaglue_application::NoScriptingEngine))
}
