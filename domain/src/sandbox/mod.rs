//! Sandbox policy — which globals a host strips from a fresh VM.
//!
//! The policy is pure data: a denylist of dotted global paths such as
//! `"dofile"` or `"os.execute"`, plus a switch for blocking native module
//! loading. The infrastructure layer owns applying it to a live VM.

use thiserror::Error;

/// Globals removed when no explicit denylist is configured.
pub const DEFAULT_DENYLIST: &[&str] = &[
    "dofile",
    "loadfile",
    "load",
    "loadstring",
    "collectgarbage",
    "os.execute",
    "os.exit",
    "os.remove",
    "os.rename",
    "io.popen",
    "package.loadlib",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SandboxPolicyError {
    #[error("empty global path")]
    Empty,

    #[error("invalid global path '{path}': segment '{segment}' is not an identifier")]
    InvalidSegment { path: String, segment: String },
}

/// A dotted path into the global namespace (`os.execute` → `["os", "execute"]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlobalPath {
    segments: Vec<String>,
}

impl GlobalPath {
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Containing tables, outermost first (empty for a top-level global).
    pub fn parents(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    /// The binding removed from its parent table.
    pub fn leaf(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }
}

impl std::str::FromStr for GlobalPath {
    type Err = SandboxPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(SandboxPolicyError::Empty);
        }

        let segments: Vec<String> = trimmed.split('.').map(str::to_string).collect();
        if let Some(bad) = segments.iter().find(|seg| !is_identifier(seg)) {
            return Err(SandboxPolicyError::InvalidSegment {
                path: trimmed.to_string(),
                segment: bad.clone(),
            });
        }

        Ok(Self { segments })
    }
}

impl std::fmt::Display for GlobalPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Denylist applied to a VM's globals at initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxPolicy {
    denied: Vec<GlobalPath>,
    block_c_modules: bool,
}

impl SandboxPolicy {
    /// A policy that removes nothing.
    pub fn permissive() -> Self {
        Self {
            denied: Vec::new(),
            block_c_modules: false,
        }
    }

    /// Parse a denylist, collecting every invalid entry.
    pub fn from_denylist<I, S>(entries: I) -> Result<Self, Vec<SandboxPolicyError>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut denied = Vec::new();
        let mut errors = Vec::new();
        for entry in entries {
            match entry.as_ref().parse::<GlobalPath>() {
                Ok(path) if !denied.contains(&path) => denied.push(path),
                Ok(_) => {}
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() {
            Ok(Self {
                denied,
                block_c_modules: false,
            })
        } else {
            Err(errors)
        }
    }

    pub fn with_c_modules_blocked(mut self, block: bool) -> Self {
        self.block_c_modules = block;
        self
    }

    pub fn denied(&self) -> &[GlobalPath] {
        &self.denied
    }

    pub fn blocks_c_modules(&self) -> bool {
        self.block_c_modules
    }

    pub fn is_denied(&self, path: &str) -> bool {
        self.denied.iter().any(|p| p.to_string() == path)
    }
}

impl Default for SandboxPolicy {
    fn default() -> Self {
        let denied = DEFAULT_DENYLIST
            .iter()
            .filter_map(|entry| entry.parse().ok())
            .collect();
        Self {
            denied,
            block_c_modules: true,
        }
    }
}
