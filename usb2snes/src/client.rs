//! High-level USB2SNES client: attachment, uploads, boot and listings.

use std::path::Path;

use usb2snes_proto::path::{RemotePath, split};
use usb2snes_proto::{Entry, EntryKind, Listing, Opcode};

use crate::connection::Connection;
use crate::files::{self, LocalFiles, TokioFs};
use crate::transport::Transport;
use crate::{Error, Result};

/// Payload bytes carried by each binary frame of an upload.
pub const BLOCK_SIZE: usize = 1024;

/// Case-insensitive marker identifying a supported device in `DeviceList`.
pub const DEVICE_MARKER: &str = "SD2SNES";

/// Whether the connection is bound to a device.
///
/// Moves from `Unattached` to `Attached` exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Attachment {
    /// No device yet; only discovery and attachment are allowed.
    Unattached,
    /// Bound to the named device.
    Attached {
        /// Device name as reported by `DeviceList`.
        device: String,
    },
}

/// A client connection to a USB2SNES daemon.
///
/// All operations take `&mut self`: the protocol allows a single outstanding
/// request, so a client must not be shared between tasks without external
/// serialization.
#[derive(Debug)]
pub struct Client<T, F = TokioFs> {
    /// Request/response engine over the transport.
    conn: Connection<T>,
    /// Upload source.
    files: F,
    /// Device binding.
    attachment: Attachment,
}

impl<T: Transport> Client<T> {
    /// Wraps an open transport, reading uploads from the local filesystem.
    pub const fn new(transport: T) -> Self {
        Self::with_files(transport, TokioFs)
    }
}

impl<T: Transport, F: LocalFiles> Client<T, F> {
    /// Wraps an open transport with a custom upload source.
    pub const fn with_files(transport: T, files: F) -> Self {
        Self {
            conn: Connection::new(transport),
            files,
            attachment: Attachment::Unattached,
        }
    }

    /// Returns the attached device name, if any.
    pub fn device(&self) -> Option<&str> {
        match &self.attachment {
            Attachment::Attached { device } => Some(device),
            Attachment::Unattached => None,
        }
    }

    /// Returns the current attachment state.
    pub const fn attachment(&self) -> &Attachment {
        &self.attachment
    }

    /// Returns a reference to the underlying transport.
    pub const fn get_ref(&self) -> &T {
        self.conn.get_ref()
    }

    /// Returns a mutable reference to the underlying transport.
    pub const fn get_mut(&mut self) -> &mut T {
        self.conn.get_mut()
    }

    /// Consumes the client, returning the transport.
    pub fn into_inner(self) -> T {
        self.conn.into_inner()
    }

    /// Returns the device names the daemon can see. Allowed before attaching.
    pub async fn device_list(&mut self) -> Result<Vec<String>> {
        self.conn.request_response(Opcode::DeviceList, &[]).await
    }

    /// Attaches to the first device whose name contains [`DEVICE_MARKER`].
    ///
    /// Returns the device name. Fails with [`Error::DeviceNotFound`] carrying
    /// the full list if none matches, and with [`Error::AlreadyAttached`] if
    /// this client is already bound.
    pub async fn find_and_attach_device(&mut self) -> Result<String> {
        if let Attachment::Attached { device } = &self.attachment {
            return Err(Error::AlreadyAttached {
                device: device.clone(),
            });
        }

        let devices = self.device_list().await?;
        let Some(device) = select_device(&devices) else {
            tracing::debug!(?devices, "no matching device");
            return Err(Error::DeviceNotFound { devices });
        };
        let device = device.to_owned();

        self.conn.send_command(Opcode::Attach, &[device.as_str()]).await?;
        tracing::info!(%device, "attached");
        self.attachment = Attachment::Attached {
            device: device.clone(),
        };
        Ok(device)
    }

    /// Uploads the local file `local` to `dest` on the device.
    ///
    /// Returns the number of bytes sent. There is no acknowledgment from the
    /// daemon; callers that need certainty should follow up with
    /// [`file_exists`](Self::file_exists). An aborted upload leaves a partial
    /// file on the device.
    pub async fn put_file(&mut self, local: impl AsRef<Path>, dest: &str) -> Result<u64> {
        let source = local.as_ref();
        self.assert_attached()?;
        let remote = RemotePath::parse(dest)?;

        let size = self.files.size(source).await?;
        let mut reader = self.files.open(source).await?;

        let size_hex = format!("{size:x}");
        self.conn
            .send_command(Opcode::PutFile, &[remote.as_str(), size_hex.as_str()])
            .await?;
        tracing::debug!(source = %source.display(), %remote, size, "streaming file");

        let mut buf = vec![0u8; BLOCK_SIZE];
        let mut transferred: u64 = 0;
        let mut chunks: u64 = 0;
        loop {
            let n = files::read_chunk(&mut reader, &mut buf).await?;
            if n == 0 {
                break;
            }
            if let Err(error) = self.conn.send_payload(buf[..n].to_vec()).await {
                return Err(if self.conn.is_open() {
                    Error::TransferFailed {
                        sent: transferred,
                        source: error,
                    }
                } else {
                    tracing::warn!(%remote, sent = transferred, "connection dropped mid-upload");
                    Error::ConnectionClosed
                });
            }
            transferred += n as u64;
            chunks += 1;
        }

        if transferred != size {
            return Err(Error::TransferSizeMismatch {
                expected: size,
                actual: transferred,
            });
        }
        tracing::info!(%remote, size, chunks, "upload complete");
        Ok(transferred)
    }

    /// Boots `path` on the device.
    ///
    /// The path is passed through unvalidated.
    pub async fn boot(&mut self, path: &str) -> Result<()> {
        self.assert_attached()?;
        self.conn.send_command(Opcode::Boot, &[path]).await
    }

    /// Lists `path` on the device, split into directories and files.
    ///
    /// An empty path means `/`. If `path` does not exist the daemon closes
    /// the connection, which surfaces as [`Error::ConnectionClosed`].
    pub async fn list_directory(&mut self, path: &str) -> Result<Listing> {
        Ok(self.list_entries(path).await?.into_iter().collect())
    }

    /// Returns `true` if `path` exists on the device and is a file.
    ///
    /// Lists the parent directory, so a missing parent closes the
    /// connection just like [`list_directory`](Self::list_directory).
    pub async fn file_exists(&mut self, path: &str) -> Result<bool> {
        let (dir, name) = split(path);
        let entries = self.list_entries(dir).await?;
        Ok(entries
            .iter()
            .find(|e| e.name == name)
            .is_some_and(|e| e.kind == EntryKind::File))
    }

    /// Issues `List` and pairs up the results.
    async fn list_entries(&mut self, path: &str) -> Result<Vec<Entry>> {
        self.assert_attached()?;
        let remote = if path.is_empty() {
            RemotePath::root()
        } else {
            RemotePath::parse(path)?
        };
        let results = self
            .conn
            .request_response(Opcode::List, &[remote.as_str()])
            .await?;
        Ok(usb2snes_proto::entries(results)?)
    }

    /// Fails unless the connection is open and a device is attached.
    fn assert_attached(&self) -> Result<&str> {
        self.conn.ensure_open()?;
        self.device().ok_or(Error::NotAttached)
    }
}

/// Picks the first device name containing [`DEVICE_MARKER`], ignoring case.
fn select_device(devices: &[String]) -> Option<&str> {
    devices
        .iter()
        .find(|d| d.to_uppercase().contains(DEVICE_MARKER))
        .map(String::as_str)
}
