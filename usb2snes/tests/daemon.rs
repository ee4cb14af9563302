//! End-to-end tests against a fake daemon on a loopback WebSocket.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use usb2snes::{Client, Error, WsTransport, path};

/// What the fake daemon saw during one session.
#[derive(Debug, Default)]
struct Daemon {
    dirs: BTreeSet<String>,
    files: BTreeMap<String, Vec<u8>>,
    attached: Option<String>,
    booted: Vec<String>,
}

impl Daemon {
    fn new() -> Self {
        let mut d = Self::default();
        d.dirs.insert("/".to_owned());
        d.dirs.insert("/games".to_owned());
        d
    }

    /// Flattened (type, name) pairs for `dir`, or `None` if it does not exist.
    fn list(&self, dir: &str) -> Option<Vec<String>> {
        if !self.dirs.contains(dir) {
            return None;
        }
        let mut out = Vec::new();
        for d in &self.dirs {
            let (parent, name) = path::split(d);
            if parent == dir && !name.is_empty() {
                out.extend(["0".to_owned(), name.to_owned()]);
            }
        }
        for f in self.files.keys() {
            let (parent, name) = path::split(f);
            if parent == dir {
                out.extend(["1".to_owned(), name.to_owned()]);
            }
        }
        Some(out)
    }
}

/// Serves a single connection and returns what it observed.
async fn spawn_daemon() -> (String, JoinHandle<Daemon>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
        let mut daemon = Daemon::new();
        // (path, declared size, received bytes)
        let mut upload: Option<(String, usize, Vec<u8>)> = None;

        while let Some(Ok(msg)) = ws.next().await {
            match msg {
                Message::Text(text) => {
                    let cmd: Value = serde_json::from_str(text.as_str()).unwrap();
                    assert_eq!(cmd["Space"], "SNES");
                    assert!(cmd["Flags"].is_null());
                    let ops: Vec<String> = cmd["Operands"]
                        .as_array()
                        .unwrap()
                        .iter()
                        .map(|v| v.as_str().unwrap().to_owned())
                        .collect();
                    match cmd["Opcode"].as_str().unwrap() {
                        "DeviceList" => {
                            let reply = json!({ "Results": ["EMUNWA", "SD2SNES COM3"] });
                            ws.send(Message::text(reply.to_string())).await.unwrap();
                        }
                        "Attach" => daemon.attached = Some(ops[0].clone()),
                        "PutFile" => {
                            let size = usize::from_str_radix(&ops[1], 16).unwrap();
                            if size == 0 {
                                daemon.files.insert(ops[0].clone(), Vec::new());
                            } else {
                                upload = Some((ops[0].clone(), size, Vec::new()));
                            }
                        }
                        "List" => match daemon.list(&ops[0]) {
                            Some(results) => {
                                let reply = json!({ "Results": results });
                                ws.send(Message::text(reply.to_string())).await.unwrap();
                            }
                            None => {
                                let _ = ws.close(None).await;
                                break;
                            }
                        },
                        "Boot" => daemon.booted.push(ops[0].clone()),
                        other => panic!("unexpected opcode {other}"),
                    }
                }
                Message::Binary(data) => {
                    let (dest, size, mut buf) = upload.take().unwrap();
                    assert!(data.len() <= usb2snes::BLOCK_SIZE);
                    buf.extend_from_slice(&data);
                    if buf.len() >= size {
                        daemon.files.insert(dest, buf);
                    } else {
                        upload = Some((dest, size, buf));
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
        daemon
    });

    (url, handle)
}

fn rom(len: usize) -> (tempfile::NamedTempFile, Vec<u8>) {
    let data: Vec<u8> = (0..len).map(|i| (i % 256) as u8).collect();
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.write_all(&data).unwrap();
    tmp.flush().unwrap();
    (tmp, data)
}

#[tokio::test]
async fn upload_verify_and_boot() {
    let (url, daemon) = spawn_daemon().await;
    let (tmp, data) = rom(2500);

    let transport = WsTransport::connect(&url).await.unwrap();
    let mut client = Client::new(transport);

    let device = client.find_and_attach_device().await.unwrap();
    assert_eq!(device, "SD2SNES COM3");

    assert!(!client.file_exists("/games/rom.sfc").await.unwrap());
    let sent = client.put_file(tmp.path(), "/games/rom.sfc").await.unwrap();
    assert_eq!(sent, 2500);
    assert!(client.file_exists("/games/rom.sfc").await.unwrap());

    let listing = client.list_directory("/").await.unwrap();
    assert_eq!(listing.dirs, vec!["games"]);
    assert!(listing.files.is_empty());

    client.boot("/games/rom.sfc").await.unwrap();
    client.get_mut().close().await.unwrap();

    let daemon = daemon.await.unwrap();
    assert_eq!(daemon.attached.as_deref(), Some("SD2SNES COM3"));
    assert_eq!(daemon.files.get("/games/rom.sfc"), Some(&data));
    assert_eq!(daemon.booted, vec!["/games/rom.sfc"]);
}

#[tokio::test]
async fn listing_missing_directory_closes_connection() {
    let (url, daemon) = spawn_daemon().await;

    let transport = WsTransport::connect(&url).await.unwrap();
    let mut client = Client::new(transport);
    client.find_and_attach_device().await.unwrap();

    let err = client.list_directory("/nowhere").await.unwrap_err();
    assert!(matches!(err, Error::ConnectionClosed), "{err:?}");
    assert!(matches!(
        client.boot("/games/rom.sfc").await,
        Err(Error::ConnectionClosed)
    ));

    let daemon = daemon.await.unwrap();
    assert!(daemon.booted.is_empty());
}
