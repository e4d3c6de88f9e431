//! Device handles and command submission.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use byteorder::{ByteOrder, LittleEndian};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, instrument};

use crate::error::{MrpcError, MrpcResult};
use crate::status::{MrpcCmd, MrpcStatus, MRPC_MAX_DATA_LEN};
use crate::wire::MrpcRequest;

/// Size of the command id header and of the return value header.
const HEADER_LEN: usize = 4;

/// An open switch management endpoint.
///
/// Implementations execute exactly one MRPC command per call and never
/// retry. A non-zero firmware return value is reported as
/// [`MrpcError::Status`].
#[async_trait]
pub trait Device: Send {
    /// Returns a name identifying the device in logs.
    fn name(&self) -> &str;

    /// Submits one command and waits for its output payload.
    async fn submit(
        &mut self,
        cmd: MrpcCmd,
        payload: &[u8],
        reply_len: usize,
    ) -> MrpcResult<Vec<u8>>;
}

#[async_trait]
impl<D: Device + ?Sized> Device for &mut D {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn submit(
        &mut self,
        cmd: MrpcCmd,
        payload: &[u8],
        reply_len: usize,
    ) -> MrpcResult<Vec<u8>> {
        (**self).submit(cmd, payload, reply_len).await
    }
}

/// Encodes `request`, submits it to `device` and decodes the reply.
pub async fn execute<D, R>(device: &mut D, request: &R) -> MrpcResult<R::Reply>
where
    D: Device + ?Sized,
    R: MrpcRequest,
{
    let payload = request.encode();
    if payload.len() > MRPC_MAX_DATA_LEN {
        return Err(MrpcError::PayloadTooLarge {
            cmd: R::CMD,
            len: payload.len(),
            max: MRPC_MAX_DATA_LEN,
        });
    }

    debug!(
        device = %device.name(),
        cmd = %R::CMD,
        payload = ?payload,
        "Submitting MRPC command"
    );

    let reply = match device.submit(R::CMD, &payload, R::REPLY_LEN).await {
        Ok(reply) => reply,
        Err(e) => {
            if let Some(status) = e.device_status() {
                debug!(device = %device.name(), cmd = %R::CMD, %status, "Device rejected command");
            }
            return Err(e);
        }
    };

    if reply.len() < R::REPLY_LEN {
        return Err(MrpcError::short_reply(R::CMD, R::REPLY_LEN, reply.len()));
    }
    R::decode_reply(&reply)
}

/// Resolves a device argument to a device node path.
///
/// Accepts a path (`/dev/switchtec0`), a device name (`switchtec0`) or a
/// bare index (`0`).
pub fn resolve_device_path(arg: &str) -> PathBuf {
    if arg.contains('/') {
        PathBuf::from(arg)
    } else if !arg.is_empty() && arg.chars().all(|c| c.is_ascii_digit()) {
        PathBuf::from(format!("/dev/switchtec{}", arg))
    } else {
        Path::new("/dev").join(arg)
    }
}

/// Switch management character device (`/dev/switchtecN`).
///
/// A command is one `write()` of the command id followed by the input
/// payload; the answer is one `read()` of the return value followed by the
/// output payload.
pub struct CharDevice {
    name: String,
    file: tokio::fs::File,
    timeout: Duration,
}

impl CharDevice {
    /// Opens the device named by `arg`, see [`resolve_device_path`].
    pub fn open(arg: &str, timeout: Duration) -> MrpcResult<Self> {
        let path = resolve_device_path(arg);
        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| MrpcError::Open {
                path: path.display().to_string(),
                source,
            })?;

        debug!(path = %path.display(), "Opened switch device");

        Ok(Self {
            name: path.display().to_string(),
            file: tokio::fs::File::from_std(file),
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Device for CharDevice {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, payload), fields(device = %self.name))]
    async fn submit(
        &mut self,
        cmd: MrpcCmd,
        payload: &[u8],
        reply_len: usize,
    ) -> MrpcResult<Vec<u8>> {
        let mut msg = vec![0u8; HEADER_LEN + payload.len()];
        LittleEndian::write_u32(&mut msg[..HEADER_LEN], cmd.as_raw());
        msg[HEADER_LEN..].copy_from_slice(payload);

        let file = &mut self.file;
        let exchange = async move {
            file.write_all(&msg).await?;
            file.flush().await?;
            let mut reply = vec![0u8; HEADER_LEN + reply_len];
            let n = file.read(&mut reply).await?;
            reply.truncate(n);
            Ok::<_, std::io::Error>(reply)
        };

        let reply = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| MrpcError::Timeout {
                cmd,
                timeout_ms: self.timeout.as_millis() as u64,
            })?
            .map_err(|source| MrpcError::Io { cmd, source })?;

        if reply.len() < HEADER_LEN {
            return Err(MrpcError::short_reply(
                cmd,
                HEADER_LEN + reply_len,
                reply.len(),
            ));
        }

        let ret = LittleEndian::read_u32(&reply[..HEADER_LEN]);
        if ret != 0 {
            return Err(MrpcError::status(cmd, MrpcStatus::new(ret)));
        }

        Ok(reply[HEADER_LEN..].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimSwitch;
    use crate::wire::PortConfigGet;

    /// Device that answers every command with a fixed output.
    struct FixedReply(Vec<u8>);

    #[async_trait]
    impl Device for FixedReply {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn submit(&mut self, _: MrpcCmd, _: &[u8], _: usize) -> MrpcResult<Vec<u8>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_resolve_device_path() {
        assert_eq!(
            resolve_device_path("/dev/switchtec1"),
            PathBuf::from("/dev/switchtec1")
        );
        assert_eq!(
            resolve_device_path("switchtec2"),
            PathBuf::from("/dev/switchtec2")
        );
        assert_eq!(resolve_device_path("3"), PathBuf::from("/dev/switchtec3"));
        assert_eq!(
            resolve_device_path("./local/node"),
            PathBuf::from("./local/node")
        );
    }

    #[test]
    fn test_open_missing_device() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("switchtec9");

        let err = CharDevice::open(path.to_str().unwrap(), Duration::from_millis(10))
            .err()
            .unwrap();
        match err {
            MrpcError::Open { path: p, .. } => assert!(p.ends_with("switchtec9")),
            other => panic!("expected Open error, got {other:?}"),
        }
    }

    #[test]
    fn test_open_regular_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let dev = CharDevice::open(file.path().to_str().unwrap(), Duration::from_millis(250))
            .unwrap();
        assert_eq!(dev.timeout(), Duration::from_millis(250));
        assert_eq!(dev.name(), file.path().display().to_string());
    }

    #[tokio::test]
    async fn test_execute_short_reply() {
        let mut dev = FixedReply(vec![1, 2]);
        let err = execute(&mut dev, &PortConfigGet::new(0)).await.unwrap_err();
        assert!(matches!(err, MrpcError::ShortReply { actual: 2, .. }));
    }

    #[tokio::test]
    async fn test_execute_through_mut_ref() {
        let sim = SimSwitch::new(4);
        let mut handle = sim.clone();
        let mut by_ref: &mut SimSwitch = &mut handle;

        let info = execute(&mut by_ref, &PortConfigGet::new(1)).await.unwrap();
        assert_eq!(info.port_type, 0);
        assert_eq!(sim.submission_count(), 1);
    }

    /// Creates a FIFO whose pipe buffer is already full, so a blocking write
    /// to it never completes. The returned handle is non-blocking.
    #[cfg(target_os = "linux")]
    fn full_fifo(dir: &Path) -> (PathBuf, std::fs::File) {
        use std::ffi::CString;
        use std::io::Write;
        use std::os::unix::ffi::OsStrExt;
        use std::os::unix::fs::OpenOptionsExt;

        let path = dir.join("switchtec0");
        let c_path = CString::new(path.as_os_str().as_bytes()).unwrap();
        assert_eq!(unsafe { libc::mkfifo(c_path.as_ptr(), 0o600) }, 0);

        let mut fifo = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&path)
            .unwrap();
        for chunk in [4096usize, 1] {
            let buf = vec![0u8; chunk];
            loop {
                match fifo.write(&buf) {
                    Ok(_) => continue,
                    Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                    Err(e) => panic!("filling fifo: {e}"),
                }
            }
        }
        (path, fifo)
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_hung_device_times_out() {
        use std::io::Read;
        use std::time::Instant;

        let dir = tempfile::tempdir().unwrap();
        let (path, mut fifo) = full_fifo(dir.path());
        let mut dev = CharDevice::open(path.to_str().unwrap(), Duration::from_millis(100)).unwrap();

        let start = Instant::now();
        let err = execute(&mut dev, &PortConfigGet::new(0)).await.unwrap_err();
        assert!(
            matches!(
                err,
                MrpcError::Timeout {
                    cmd: MrpcCmd::PortConfig,
                    timeout_ms: 100
                }
            ),
            "{err:?}"
        );
        assert!(start.elapsed() < Duration::from_secs(5));

        // Release the abandoned write so the runtime can shut down.
        let mut buf = [0u8; 4096];
        loop {
            match fifo.read(&mut buf) {
                Ok(0) => break,
                Ok(_) => continue,
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(e) => panic!("draining fifo: {e}"),
            }
        }
    }
}
