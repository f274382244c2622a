pub mod crud;
pub mod declarative;
pub mod kinds;

use anyhow::{Context as AnyhowContext, Result};
use ::declarative::{CancelToken, Engine, Registry};
use roskit::RestClient;
use std::path::PathBuf;
use std::sync::Arc;

use crate::Context;
use crate::config::{DeviceConfig, RoscfgConfig};
use crate::paths;
use crate::resource;
use crate::state::RoscfgState;

/// Everything a device command works with
pub struct Workspace {
    pub config: RoscfgConfig,
    pub engine: Engine,
    pub state: RoscfgState,
    pub state_path: PathBuf,
    pub cancel: CancelToken,
}

impl Workspace {
    /// Load config and state, and connect to the configured device.
    pub fn open(ctx: &Context) -> Result<Self> {
        let config_path = paths::config_file(ctx.config_path.as_deref())?;
        let config = RoscfgConfig::load(&config_path)?;

        let registry = resource::registry()?;
        config.validate(&registry)?;

        let state_path = paths::state_file(ctx.state_path.as_deref())?;
        let state = RoscfgState::load(&state_path)?;

        let engine = connect(&config.device, registry)?;

        Ok(Self {
            config,
            engine,
            state,
            state_path,
            cancel: cancel_on_interrupt()?,
        })
    }

    pub fn save_state(&mut self) -> Result<()> {
        self.state.save(&self.state_path)
    }
}

/// Build an engine over a REST client for the device.
pub fn connect(device: &DeviceConfig, registry: Registry) -> Result<Engine> {
    let client = RestClient::connect(device.connection()?).with_retry(device.retry_config());
    log::info!("Using device {} as {}", device.url, device.username);
    Ok(Engine::new(Arc::new(registry), Arc::new(client)))
}

/// A token that trips on Ctrl-C.
///
/// In-flight requests finish; nothing new is sent after the interrupt.
pub fn cancel_on_interrupt() -> Result<CancelToken> {
    let cancel = CancelToken::new();
    let handle = cancel.clone();
    ctrlc::set_handler(move || {
        log::warn!("Interrupted, cancelling remaining operations");
        handle.cancel();
    })
    .context("Failed to install Ctrl-C handler")?;
    Ok(cancel)
}
