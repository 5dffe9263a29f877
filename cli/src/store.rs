//! Operator config (TOML) and the JSON state file the CLI persists the ledger in.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use restake_lp::{AdminSet, LedgerConfig, LedgerState, RestakeLp, SystemClock};
use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, warn};

// ─── Config file ──────────────────────────────────────────────────────────────

/// Contents of `--config`: the admin keys plus any `LedgerConfig` field.
///
/// ```toml
/// admins = ["<base58 pubkey>"]
/// max_pools = 20
/// protocol_fee_bps = 25
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub admins: Vec<String>,
    #[serde(flatten)]
    pub ledger: LedgerConfig,
}

impl CliConfig {
    /// Read the TOML file at `path`, or fall back to defaults when none is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            debug!("no config file given; using defaults");
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file '{}'", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid config file '{}'", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.ledger.validate()?;
        Ok(config)
    }

    pub fn admin_set(&self) -> Result<AdminSet> {
        if self.admins.is_empty() {
            warn!("no admins configured; admin commands will be rejected");
        }
        let keys = self
            .admins
            .iter()
            .map(|s| {
                Pubkey::from_str(s).map_err(|_| anyhow!("admins: '{s}' is not a base-58 pubkey"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(AdminSet::new(keys))
    }
}

// ─── State file ───────────────────────────────────────────────────────────────

pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rebuild the ledger from the state file; a missing file is an empty ledger.
    pub fn open(&self, config: &CliConfig) -> Result<RestakeLp> {
        let admins = Arc::new(config.admin_set()?);
        let clock = Arc::new(SystemClock);

        if !self.path.exists() {
            debug!(path = %self.path.display(), "state file not found; starting empty ledger");
            return Ok(RestakeLp::new(config.ledger.clone(), clock, admins)?);
        }

        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read state file '{}'", self.path.display()))?;
        let state: LedgerState = serde_json::from_str(&text)
            .with_context(|| format!("State file '{}' is corrupt", self.path.display()))?;
        Ok(RestakeLp::from_state(state, config.ledger.clone(), clock, admins)?)
    }

    /// Write the ledger back. Goes through a sibling temp file so a crash
    /// mid-write never truncates the previous state.
    pub fn save(&self, ledger: &RestakeLp) -> Result<()> {
        let text = serde_json::to_string_pretty(ledger.state())
            .context("Failed to serialize ledger state")?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create directory '{}'", dir.display()))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text).with_context(|| format!("Cannot write '{}'", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Cannot replace state file '{}'", self.path.display()))?;
        debug!(path = %self.path.display(), "state saved");
        Ok(())
    }
}
