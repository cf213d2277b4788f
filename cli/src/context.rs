use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use hashbrown::HashMap;
use scoreboard_core::{ClientId, ConfigProvider, ScoreboardManager, ZoneLookup};
use tracing::warn;

use crate::console::{ConsoleHost, ConsoleService};

/// Zone each simulated client currently stands in.
#[derive(Debug, Default)]
pub struct ZoneTable {
    zones: RwLock<HashMap<ClientId, String>>,
}

impl ZoneTable {
    pub fn set(&self, client: &ClientId, zone: &str) {
        self.zones
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(client.clone(), zone.to_string());
    }

    pub fn remove(&self, client: &ClientId) {
        self.zones
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(client);
    }
}

impl ZoneLookup for ZoneTable {
    fn zone_of(&self, client: &ClientId) -> Option<String> {
        self.zones
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(client)
            .cloned()
    }
}

/// Holds all shared state for the CLI application.
/// This is a lightweight container - logic lives in the core.
#[derive(Clone)]
pub struct CliContext {
    pub manager: Arc<ScoreboardManager>,
    pub config: Arc<ConfigProvider>,
    pub zones: Arc<ZoneTable>,
    pub console: Arc<ConsoleService>,
}

impl CliContext {
    /// Load the configuration and bring up the scoreboard against the
    /// console host. A failed load leaves the manager inert but the shell
    /// usable.
    pub fn new(config_path: Option<PathBuf>, adapter: bool) -> Result<Self, String> {
        let path = match config_path {
            Some(path) => path,
            None => ConfigProvider::default_path().map_err(|e| e.to_string())?,
        };
        let config = Arc::new(ConfigProvider::load(path).map_err(|e| e.to_string())?);

        let zones = Arc::new(ZoneTable::default());
        let manager = Arc::new(ScoreboardManager::new(
            Arc::clone(&zones) as Arc<dyn ZoneLookup>
        ));
        let console = ConsoleService::new();

        let host = ConsoleHost {
            service: Arc::clone(&console),
            adapter,
        };
        if !manager.load(&host, &config.get()) {
            warn!("Scoreboard failed to load, overlays are disabled");
        }

        Ok(Self {
            manager,
            config,
            zones,
            console,
        })
    }
}
