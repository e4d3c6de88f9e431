//! Byte layouts of the fabric management requests.
//!
//! All multi-byte fields are little-endian. Reserved bytes are zero.
//!
//! | Request | Command | Input | Output |
//! |---------|---------|-------|--------|
//! | [`BindRequest`] | `GFMS_BIND_UNBIND` | `1, sw, phys, log, pdfid:u16, 0, 0` | `status, 0, 0, 0` |
//! | [`UnbindRequest`] | `GFMS_BIND_UNBIND` | `2, sw, phys, log, 0:u16, option, 0` | `status, 0, 0, 0` |
//! | [`LinkControlCommand`] | `PORT_CONTROL` | `type, port, flag, 0` | none |
//! | [`PortConfigSet`] | `PORT_CONFIG` | `0, port, type, clk_src, clk_mode, hvd, 0, 0` | none |
//! | [`PortConfigGet`] | `PORT_CONFIG` | `1, port, 0, 0` | `type, clk_src, clk_mode, hvd` |

use std::io::Cursor;

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};

use fabric_types::{
    BindRequest, LinkControlCommand, PhysPortId, PortConfig, PortConfigInfo, UnbindRequest,
};

use crate::error::{MrpcError, MrpcResult};
use crate::status::MrpcCmd;

/// `GFMS_BIND_UNBIND` sub-command: bind.
pub const GFMS_SUBCMD_BIND: u8 = 1;
/// `GFMS_BIND_UNBIND` sub-command: unbind.
pub const GFMS_SUBCMD_UNBIND: u8 = 2;
/// `PORT_CONFIG` sub-command: set.
pub const PORT_CONFIG_SUBCMD_SET: u8 = 0;
/// `PORT_CONFIG` sub-command: get.
pub const PORT_CONFIG_SUBCMD_GET: u8 = 1;

/// Length of the GFMS bind/unbind input payload.
pub const GFMS_REQ_LEN: usize = 8;
/// Length of the GFMS bind/unbind reply.
pub const GFMS_REPLY_LEN: usize = 4;
/// Length of the port control input payload.
pub const PORT_CONTROL_REQ_LEN: usize = 4;
/// Length of the port config set input payload.
pub const PORT_CONFIG_SET_LEN: usize = 8;
/// Length of the port config get input payload.
pub const PORT_CONFIG_GET_LEN: usize = 4;
/// Length of the port config get reply.
pub const PORT_CONFIG_REPLY_LEN: usize = 4;

/// A typed request that can be sent to a device as one MRPC command.
pub trait MrpcRequest {
    /// Decoded output of the command.
    type Reply;

    /// Command id the request is sent with.
    const CMD: MrpcCmd;

    /// Number of output bytes the command produces.
    const REPLY_LEN: usize;

    /// Encodes the input payload.
    fn encode(&self) -> Vec<u8>;

    /// Decodes the output payload. `reply` is at least `REPLY_LEN` bytes.
    fn decode_reply(reply: &[u8]) -> MrpcResult<Self::Reply>;
}

/// Reads the status byte of a GFMS reply.
///
/// The firmware may accept the command but report a failure in the reply,
/// which is relayed the same way as a non-zero return value.
fn decode_gfms_reply(reply: &[u8]) -> MrpcResult<()> {
    let mut cursor = Cursor::new(reply);
    let status = cursor
        .read_u8()
        .map_err(|_| MrpcError::short_reply(MrpcCmd::GfmsBindUnbind, GFMS_REPLY_LEN, reply.len()))?;
    if status != 0 {
        return Err(MrpcError::status(MrpcCmd::GfmsBindUnbind, u32::from(status)));
    }
    Ok(())
}

impl MrpcRequest for BindRequest {
    type Reply = ();
    const CMD: MrpcCmd = MrpcCmd::GfmsBindUnbind;
    const REPLY_LEN: usize = GFMS_REPLY_LEN;

    fn encode(&self) -> Vec<u8> {
        let mut buf = [0u8; GFMS_REQ_LEN];
        buf[0] = GFMS_SUBCMD_BIND;
        buf[1] = self.host.host_sw_idx;
        buf[2] = self.host.host_phys_port_id;
        buf[3] = self.host.host_log_port_id;
        LittleEndian::write_u16(&mut buf[4..6], self.pdfid);
        buf.to_vec()
    }

    fn decode_reply(reply: &[u8]) -> MrpcResult<()> {
        decode_gfms_reply(reply)
    }
}

impl MrpcRequest for UnbindRequest {
    type Reply = ();
    const CMD: MrpcCmd = MrpcCmd::GfmsBindUnbind;
    const REPLY_LEN: usize = GFMS_REPLY_LEN;

    fn encode(&self) -> Vec<u8> {
        // pdfid and option stay zero: the device resolves the function
        // bound at the host reference.
        let mut buf = [0u8; GFMS_REQ_LEN];
        buf[0] = GFMS_SUBCMD_UNBIND;
        buf[1] = self.host.host_sw_idx;
        buf[2] = self.host.host_phys_port_id;
        buf[3] = self.host.host_log_port_id;
        buf.to_vec()
    }

    fn decode_reply(reply: &[u8]) -> MrpcResult<()> {
        decode_gfms_reply(reply)
    }
}

impl MrpcRequest for LinkControlCommand {
    type Reply = ();
    const CMD: MrpcCmd = MrpcCmd::PortControl;
    const REPLY_LEN: usize = 0;

    fn encode(&self) -> Vec<u8> {
        vec![
            self.control.as_raw(),
            self.phys_port_id,
            self.hot_reset_flag.as_raw(),
            0,
        ]
    }

    fn decode_reply(_reply: &[u8]) -> MrpcResult<()> {
        Ok(())
    }
}

/// Port config set request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortConfigSet {
    pub phys_port_id: PhysPortId,
    pub config: PortConfig,
}

impl PortConfigSet {
    pub const fn new(phys_port_id: PhysPortId, config: PortConfig) -> Self {
        Self {
            phys_port_id,
            config,
        }
    }
}

impl MrpcRequest for PortConfigSet {
    type Reply = ();
    const CMD: MrpcCmd = MrpcCmd::PortConfig;
    const REPLY_LEN: usize = 0;

    fn encode(&self) -> Vec<u8> {
        vec![
            PORT_CONFIG_SUBCMD_SET,
            self.phys_port_id,
            self.config.port_type().as_raw(),
            self.config.clock_source,
            self.config.clock_mode.as_raw(),
            self.config.hvd_instance,
            0,
            0,
        ]
    }

    fn decode_reply(_reply: &[u8]) -> MrpcResult<()> {
        Ok(())
    }
}

/// Port config get request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortConfigGet {
    pub phys_port_id: PhysPortId,
}

impl PortConfigGet {
    pub const fn new(phys_port_id: PhysPortId) -> Self {
        Self { phys_port_id }
    }
}

impl MrpcRequest for PortConfigGet {
    type Reply = PortConfigInfo;
    const CMD: MrpcCmd = MrpcCmd::PortConfig;
    const REPLY_LEN: usize = PORT_CONFIG_REPLY_LEN;

    fn encode(&self) -> Vec<u8> {
        vec![PORT_CONFIG_SUBCMD_GET, self.phys_port_id, 0, 0]
    }

    fn decode_reply(reply: &[u8]) -> MrpcResult<PortConfigInfo> {
        let short = |_| MrpcError::short_reply(Self::CMD, Self::REPLY_LEN, reply.len());
        let mut cursor = Cursor::new(reply);
        Ok(PortConfigInfo {
            port_type: cursor.read_u8().map_err(short)?,
            clock_source: cursor.read_u8().map_err(short)?,
            clock_mode: cursor.read_u8().map_err(short)?,
            hvd_instance: cursor.read_u8().map_err(short)?,
        })
    }
}
