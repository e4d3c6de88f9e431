//! In-memory fabric switch.
//!
//! [`SimSwitch`] answers the same MRPC payloads as the firmware, against
//! volatile in-memory state: per-port configuration, per-port link state
//! and a binding table. Clones share that state, the way several handles to
//! one switch observe the same hardware.
//!
//! Rejections use the firmware codes a real switch reports:
//!
//! | Condition | Result |
//! |-----------|--------|
//! | Port beyond the switch's port count | `ERR_PORT_INVALID` |
//! | Malformed payload, bad enum value, `FabricLink` set | `ERR_PARAM_INVALID` |
//! | Unknown sub-command | `ERR_SUBCMD_INVALID` |
//! | Bind to a port that is not `FabricHost` | `ERR_PARAM_INVALID` |
//! | Bind of a pdfid that is already bound | `ERR_PARAM_INVALID` |
//! | Bind to an occupied host reference | reply status `1` |
//! | Unbind with no binding at the host reference | `ERR_PARAM_INVALID` |
//! | Link control on an `Unused` port | `ERR_ACCESS_REFUSED` |
//! | Retype of a host port that still has bindings | `ERR_ACCESS_REFUSED` |

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use byteorder::{ByteOrder, LittleEndian};
use tracing::debug;

use fabric_types::{
    ClockMode, HostRef, HotResetFlag, LinkControl, Pdfid, PhysPortId, PortConfigInfo, PortType,
};

use crate::device::Device;
use crate::error::{MrpcError, MrpcResult};
use crate::status::{MrpcCmd, MrpcStatus};
use crate::wire::{
    GFMS_REPLY_LEN, GFMS_REQ_LEN, GFMS_SUBCMD_BIND, GFMS_SUBCMD_UNBIND, PORT_CONFIG_GET_LEN,
    PORT_CONFIG_SET_LEN, PORT_CONFIG_SUBCMD_GET, PORT_CONFIG_SUBCMD_SET, PORT_CONTROL_REQ_LEN,
};

/// Index of the simulated switch in host references.
pub const SIM_SWITCH_INDEX: u8 = 0;

/// Reply status byte for a bind to a host reference that is already in use.
pub const GFMS_STATUS_HOST_BUSY: u8 = 1;

/// Link state of a simulated port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkState {
    Disabled,
    Enabled,
    Training,
    ResetAsserted,
}

/// One command received by the simulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub cmd: MrpcCmd,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone)]
struct SimPort {
    config: PortConfigInfo,
    link: LinkState,
}

impl Default for SimPort {
    fn default() -> Self {
        Self {
            config: PortConfigInfo {
                port_type: PortType::Unused.as_raw(),
                clock_source: 0,
                clock_mode: ClockMode::CommonNoSsc.as_raw(),
                hvd_instance: 0,
            },
            link: LinkState::Enabled,
        }
    }
}

#[derive(Debug)]
struct SimState {
    ports: Vec<SimPort>,
    bindings: BTreeMap<HostRef, Pdfid>,
    submissions: Vec<Submission>,
    fail_next: Option<MrpcStatus>,
}

type Reply = Result<Vec<u8>, MrpcStatus>;

impl SimState {
    fn port_mut(&mut self, id: PhysPortId) -> Result<&mut SimPort, MrpcStatus> {
        self.ports
            .get_mut(usize::from(id))
            .ok_or(MrpcStatus::PORT_INVALID)
    }

    fn handle(&mut self, cmd: MrpcCmd, payload: &[u8]) -> Reply {
        match cmd {
            MrpcCmd::GfmsBindUnbind => self.handle_gfms(payload),
            MrpcCmd::PortControl => self.handle_port_control(payload),
            MrpcCmd::PortConfig => self.handle_port_config(payload),
        }
    }

    fn handle_gfms(&mut self, payload: &[u8]) -> Reply {
        if payload.len() < GFMS_REQ_LEN {
            return Err(MrpcStatus::PARAM_INVALID);
        }
        let host = HostRef::new(payload[1], payload[2], payload[3]);
        if host.host_sw_idx != SIM_SWITCH_INDEX {
            return Err(MrpcStatus::PARAM_INVALID);
        }

        let mut reply = vec![0u8; GFMS_REPLY_LEN];
        match payload[0] {
            GFMS_SUBCMD_BIND => {
                let pdfid = LittleEndian::read_u16(&payload[4..6]);
                let port = self.port_mut(host.host_phys_port_id)?;
                if port.config.port_type != PortType::FabricHost.as_raw() {
                    return Err(MrpcStatus::PARAM_INVALID);
                }
                if self.bindings.values().any(|&bound| bound == pdfid) {
                    return Err(MrpcStatus::PARAM_INVALID);
                }
                if self.bindings.contains_key(&host) {
                    reply[0] = GFMS_STATUS_HOST_BUSY;
                } else {
                    self.bindings.insert(host, pdfid);
                }
                Ok(reply)
            }
            GFMS_SUBCMD_UNBIND => {
                self.port_mut(host.host_phys_port_id)?;
                match self.bindings.remove(&host) {
                    Some(_) => Ok(reply),
                    None => Err(MrpcStatus::PARAM_INVALID),
                }
            }
            _ => Err(MrpcStatus::SUBCMD_INVALID),
        }
    }

    fn handle_port_control(&mut self, payload: &[u8]) -> Reply {
        if payload.len() < PORT_CONTROL_REQ_LEN {
            return Err(MrpcStatus::PARAM_INVALID);
        }
        let control = LinkControl::try_from(payload[0]).map_err(|_| MrpcStatus::PARAM_INVALID)?;
        let flag = HotResetFlag::try_from(payload[2]).map_err(|_| MrpcStatus::PARAM_INVALID)?;
        let port = self.port_mut(payload[1])?;

        if port.config.port_type == PortType::Unused.as_raw() {
            return Err(MrpcStatus::ACCESS_REFUSED);
        }

        port.link = match (control, port.link) {
            (LinkControl::Disable, _) => LinkState::Disabled,
            (LinkControl::Enable, LinkState::ResetAsserted) => {
                return Err(MrpcStatus::PARAM_INVALID)
            }
            (LinkControl::Enable, _) => LinkState::Enabled,
            // Training completes before the command returns.
            (LinkControl::Retrain, LinkState::Enabled) => LinkState::Enabled,
            (LinkControl::Retrain, _) => return Err(MrpcStatus::PARAM_INVALID),
            (LinkControl::HotReset, _) if flag == HotResetFlag::Set => LinkState::ResetAsserted,
            (LinkControl::HotReset, LinkState::ResetAsserted) => LinkState::Enabled,
            (LinkControl::HotReset, current) => current,
        };
        Ok(Vec::new())
    }

    fn handle_port_config(&mut self, payload: &[u8]) -> Reply {
        match payload.first().copied() {
            Some(PORT_CONFIG_SUBCMD_SET) => {
                if payload.len() < PORT_CONFIG_SET_LEN {
                    return Err(MrpcStatus::PARAM_INVALID);
                }
                let port_type =
                    PortType::try_from(payload[2]).map_err(|_| MrpcStatus::PARAM_INVALID)?;
                if !port_type.is_settable() {
                    return Err(MrpcStatus::PARAM_INVALID);
                }
                ClockMode::try_from(payload[4]).map_err(|_| MrpcStatus::PARAM_INVALID)?;

                let phys_port_id = payload[1];
                let has_bindings = self
                    .bindings
                    .keys()
                    .any(|host| host.host_phys_port_id == phys_port_id);
                let port = self.port_mut(phys_port_id)?;
                if has_bindings && port_type != PortType::FabricHost {
                    return Err(MrpcStatus::ACCESS_REFUSED);
                }

                port.config = PortConfigInfo {
                    port_type: payload[2],
                    clock_source: payload[3],
                    clock_mode: payload[4],
                    hvd_instance: payload[5],
                };
                Ok(Vec::new())
            }
            Some(PORT_CONFIG_SUBCMD_GET) => {
                if payload.len() < PORT_CONFIG_GET_LEN {
                    return Err(MrpcStatus::PARAM_INVALID);
                }
                let config = self.port_mut(payload[1])?.config;
                Ok(vec![
                    config.port_type,
                    config.clock_source,
                    config.clock_mode,
                    config.hvd_instance,
                ])
            }
            Some(_) => Err(MrpcStatus::SUBCMD_INVALID),
            None => Err(MrpcStatus::PARAM_INVALID),
        }
    }
}

/// Simulated fabric switch implementing [`Device`].
#[derive(Debug, Clone)]
pub struct SimSwitch {
    state: Arc<Mutex<SimState>>,
}

impl SimSwitch {
    /// Creates a switch with `num_ports` unused ports and switch index 0.
    pub fn new(num_ports: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                ports: vec![SimPort::default(); num_ports],
                bindings: BTreeMap::new(),
                submissions: Vec::new(),
                fail_next: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Overwrites a port's configuration with raw values, bypassing
    /// validation. Used to model firmware reporting unknown enum values.
    pub fn inject_port_config(&self, phys_port_id: PhysPortId, config: PortConfigInfo) {
        if let Some(port) = self.lock().ports.get_mut(usize::from(phys_port_id)) {
            port.config = config;
        }
    }

    /// Makes the next submitted command fail with `status`.
    pub fn fail_next(&self, status: MrpcStatus) {
        self.lock().fail_next = Some(status);
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.lock().submissions.clone()
    }

    pub fn submission_count(&self) -> usize {
        self.lock().submissions.len()
    }

    pub fn binding_at(&self, host: &HostRef) -> Option<Pdfid> {
        self.lock().bindings.get(host).copied()
    }

    pub fn binding_count(&self) -> usize {
        self.lock().bindings.len()
    }

    pub fn link_state(&self, phys_port_id: PhysPortId) -> Option<LinkState> {
        self.lock()
            .ports
            .get(usize::from(phys_port_id))
            .map(|p| p.link)
    }
}

#[async_trait]
impl Device for SimSwitch {
    fn name(&self) -> &str {
        "sim"
    }

    async fn submit(
        &mut self,
        cmd: MrpcCmd,
        payload: &[u8],
        _reply_len: usize,
    ) -> MrpcResult<Vec<u8>> {
        let mut state = self.lock();
        state.submissions.push(Submission {
            cmd,
            payload: payload.to_vec(),
        });

        let result = match state.fail_next.take() {
            Some(status) => Err(status),
            None => state.handle(cmd, payload),
        };

        debug!(%cmd, ok = result.is_ok(), "Simulated switch handled command");
        result.map_err(|status| MrpcError::status(cmd, status))
    }
}
