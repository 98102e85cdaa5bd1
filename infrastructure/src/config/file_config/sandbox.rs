//! Sandbox configuration from TOML (`[sandbox]` section)

use luaglue_domain::{DEFAULT_DENYLIST, SandboxPolicy, SandboxPolicyError};
use serde::{Deserialize, Serialize};

/// Raw sandbox configuration from TOML
///
/// ```toml
/// [sandbox]
/// enabled = true
/// deny = ["dofile", "loadfile", "os.execute"]
/// block_c_modules = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSandboxConfig {
    /// Apply the sandbox at all
    pub enabled: bool,
    /// Dotted global paths removed from the VM (replaces the default list)
    pub deny: Vec<String>,
    /// Extra paths removed on top of `deny`
    pub extra_deny: Vec<String>,
    /// Clear `package.loadlib` and `package.cpath`
    pub block_c_modules: bool,
}

impl Default for FileSandboxConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            deny: DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect(),
            extra_deny: Vec::new(),
            block_c_modules: true,
        }
    }
}

impl FileSandboxConfig {
    /// Resolve into a policy; `Ok(None)` when sandboxing is disabled.
    pub fn to_policy(&self) -> Result<Option<SandboxPolicy>, Vec<SandboxPolicyError>> {
        if !self.enabled {
            return Ok(None);
        }
        let policy = SandboxPolicy::from_denylist(self.deny.iter().chain(&self.extra_deny))?
            .with_c_modules_blocked(self.block_c_modules);
        Ok(Some(policy))
    }
}
