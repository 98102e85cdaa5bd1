//! Load scripts use case
//!
//! Runs the init script (if any), then every `*.lua` file of the plugin
//! directory in alphabetical order. A failing init script aborts; a failing
//! plugin is logged and skipped so the remaining plugins still load.
//! After each successful load the host emits `script_loaded(path)`.

use crate::ports::scripting_engine::{ScriptError, ScriptingEnginePort};
use luaglue_domain::{LifecycleEvent, ScriptValue};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that abort script loading
#[derive(Error, Debug)]
pub enum LoadScriptsError {
    #[error("init script {} failed: {source}", .path.display())]
    InitScript { path: PathBuf, source: ScriptError },

    #[error("cannot read plugin directory {}: {source}", .path.display())]
    PluginDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Input for the load scripts use case
#[derive(Debug, Clone, Default)]
pub struct LoadScriptsInput {
    pub init_script: Option<PathBuf>,
    pub plugin_dir: Option<PathBuf>,
}

impl LoadScriptsInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_init_script(mut self, path: impl Into<PathBuf>) -> Self {
        self.init_script = Some(path.into());
        self
    }

    pub fn with_plugin_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.plugin_dir = Some(path.into());
        self
    }
}

/// What was loaded, and what was skipped
#[derive(Debug, Default)]
pub struct LoadScriptsOutput {
    pub loaded: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, ScriptError)>,
}

impl LoadScriptsOutput {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Use case for loading the init script and plugins into an engine
pub struct LoadScriptsUseCase<E: ScriptingEnginePort + ?Sized> {
    engine: Arc<E>,
}

impl<E: ScriptingEnginePort + ?Sized> LoadScriptsUseCase<E> {
    pub fn new(engine: Arc<E>) -> Self {
        Self { engine }
    }

    pub fn execute(&self, input: LoadScriptsInput) -> Result<LoadScriptsOutput, LoadScriptsError> {
        let mut output = LoadScriptsOutput::default();

        if !self.engine.is_available() {
            debug!("Scripting engine unavailable, skipping script loading");
            return Ok(output);
        }

        if let Some(path) = input.init_script {
            self.engine
                .load_script(&path)
                .map_err(|source| LoadScriptsError::InitScript {
                    path: path.clone(),
                    source,
                })?;
            info!("Loaded init script {}", path.display());
            self.notify_loaded(&path);
            output.loaded.push(path);
        }

        if let Some(dir) = input.plugin_dir {
            for path in plugin_files(&dir)? {
                match self.engine.load_script(&path) {
                    Ok(()) => {
                        info!("Loaded plugin {}", path.display());
                        self.notify_loaded(&path);
                        output.loaded.push(path);
                    }
                    Err(e) => {
                        warn!("Plugin {} failed to load: {}", path.display(), e);
                        output.failed.push((path, e));
                    }
                }
            }
        }

        let ready = vec![
            ScriptValue::Integer(output.loaded.len() as i64),
            ScriptValue::Integer(output.failed.len() as i64),
        ];
        if let Err(e) = self
            .engine
            .emit_event(LifecycleEvent::ScriptsReady.as_str(), ready)
        {
            warn!("{} listener failed: {}", LifecycleEvent::ScriptsReady, e);
        }

        Ok(output)
    }

    fn notify_loaded(&self, path: &Path) {
        let args = vec![ScriptValue::String(path.display().to_string())];
        if let Err(e) = self
            .engine
            .emit_event(LifecycleEvent::ScriptLoaded.as_str(), args)
        {
            warn!("{} listener failed: {}", LifecycleEvent::ScriptLoaded, e);
        }
    }
}

/// `*.lua` files directly inside `dir`, sorted by path.
///
/// A missing directory yields no plugins.
fn plugin_files(dir: &Path) -> Result<Vec<PathBuf>, LoadScriptsError> {
    if !dir.exists() {
        debug!("Plugin directory {} does not exist", dir.display());
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(dir).map_err(|source| LoadScriptsError::PluginDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "lua"))
        .collect();
    files.sort();
    Ok(files)
}
