//! BindingManager - host to endpoint-function bindings

use tracing::{info, instrument};

use fabric_mrpc::{execute, Device};
use fabric_types::{BindRequest, UnbindRequest};

use crate::error::{FabricError, FabricResult};
use crate::ops;

/// Attaches and detaches endpoint functions to host logical ports.
///
/// The binding table lives in the switch. Conflicts (a pdfid bound
/// elsewhere, an occupied host port) are decided by the device and relayed
/// as [`FabricError::DeviceRejected`].
pub struct BindingManager<D> {
    device: D,
}

impl<D: Device> BindingManager<D> {
    pub fn new(device: D) -> Self {
        Self { device }
    }

    #[instrument(skip(self), fields(device = %self.device.name(), host = %req.host))]
    pub async fn bind(&mut self, req: BindRequest) -> FabricResult<()> {
        execute(&mut self.device, &req)
            .await
            .map_err(|e| FabricError::from_mrpc(ops::GFMS_BIND, e))?;

        info!(pdfid = req.pdfid, "Endpoint function bound");
        Ok(())
    }

    #[instrument(skip(self), fields(device = %self.device.name(), host = %req.host))]
    pub async fn unbind(&mut self, req: UnbindRequest) -> FabricResult<()> {
        execute(&mut self.device, &req)
            .await
            .map_err(|e| FabricError::from_mrpc(ops::GFMS_UNBIND, e))?;

        info!("Endpoint function unbound");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PortConfigStore;
    use fabric_mrpc::sim::SimSwitch;
    use fabric_types::{ClockMode, HostRef, PortConfig, PortType};

    async fn sim_with_host_port(port: u8) -> SimSwitch {
        let sim = SimSwitch::new(8);
        let config = PortConfig::new(PortType::FabricHost, 0, ClockMode::CommonNoSsc, 0).unwrap();
        PortConfigStore::new(sim.clone())
            .set(port, config)
            .await
            .unwrap();
        sim
    }

    #[tokio::test]
    async fn test_bind_unbind() {
        let sim = sim_with_host_port(2).await;
        let mut mgr = BindingManager::new(sim.clone());
        let host = HostRef::new(0, 2, 1);

        mgr.bind(BindRequest::new(host, 0x0301)).await.unwrap();
        assert_eq!(sim.binding_at(&host), Some(0x0301));

        mgr.unbind(UnbindRequest::new(host)).await.unwrap();
        assert_eq!(sim.binding_at(&host), None);
    }

    #[tokio::test]
    async fn test_bind_rejected_on_non_host_port() {
        let sim = SimSwitch::new(8);
        let mut mgr = BindingManager::new(sim.clone());

        let err = mgr
            .bind(BindRequest::new(HostRef::new(0, 2, 1), 0x0301))
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(sim.binding_count(), 0);
    }

    #[tokio::test]
    async fn test_rebind_same_pdfid_relays_device_decision() {
        let sim = sim_with_host_port(2).await;
        let mut mgr = BindingManager::new(sim.clone());

        mgr.bind(BindRequest::new(HostRef::new(0, 2, 0), 0x10))
            .await
            .unwrap();
        let err = mgr
            .bind(BindRequest::new(HostRef::new(0, 2, 1), 0x10))
            .await
            .unwrap_err();
        assert!(matches!(err, FabricError::DeviceRejected { .. }));
        assert_eq!(sim.binding_count(), 1);
    }
}
