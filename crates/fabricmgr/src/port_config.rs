//! PortConfigStore - per-port role and clock configuration

use tracing::{debug, info, instrument};

use fabric_mrpc::wire::{PortConfigGet, PortConfigSet};
use fabric_mrpc::{execute, Device};
use fabric_types::{PhysPortId, PortConfig, PortConfigInfo};

use crate::error::{FabricError, FabricResult};
use crate::ops;

/// Reads and writes port configuration on a switch.
///
/// The switch is the only store: a `set` is visible to every later `get`
/// from any handle, and nothing is remembered here between calls.
pub struct PortConfigStore<D> {
    device: D,
}

impl<D: Device> PortConfigStore<D> {
    pub fn new(device: D) -> Self {
        Self { device }
    }

    /// Writes the configuration of one physical port.
    ///
    /// `config` can only hold a settable port type, so a `FabricLink` request
    /// never reaches the device.
    #[instrument(skip(self), fields(device = %self.device.name()))]
    pub async fn set(&mut self, phys_port_id: PhysPortId, config: PortConfig) -> FabricResult<()> {
        execute(&mut self.device, &PortConfigSet::new(phys_port_id, config))
            .await
            .map_err(|e| FabricError::from_mrpc(ops::PORTCFG_SET, e))?;

        info!(
            phys_port_id,
            port_type = %config.port_type(),
            clock_mode = %config.clock_mode,
            "Port configuration applied"
        );
        Ok(())
    }

    /// Reads the configuration of one physical port as the device reports it.
    #[instrument(skip(self), fields(device = %self.device.name()))]
    pub async fn get(&mut self, phys_port_id: PhysPortId) -> FabricResult<PortConfigInfo> {
        let info = execute(&mut self.device, &PortConfigGet::new(phys_port_id))
            .await
            .map_err(|e| FabricError::from_mrpc(ops::PORTCFG_SHOW, e))?;

        debug!(phys_port_id, ?info, "Read port configuration");
        Ok(info)
    }
}
