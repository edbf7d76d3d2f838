use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;

use tracing::{info, warn};

use crate::data::source::DataSource;
use crate::data::store::SnapshotStore;

pub mod api;
pub mod routes;

/// Shared state handed to every request: the snapshot slot and the source
/// used by `POST /api/reload`.
pub struct AppState {
    pub store: Arc<SnapshotStore>,
    pub source: Box<dyn DataSource>,
}

impl AppState {
    pub fn new(store: Arc<SnapshotStore>, source: Box<dyn DataSource>) -> Self {
        Self { store, source }
    }
}

pub fn run_server(bind_addr: &str, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind_addr)?;
    info!("contatos server listening on http://{bind_addr}");

    for stream in listener.incoming() {
        match stream {
            Ok(mut stream) => {
                if let Err(err) = handle_connection(&mut stream, &state) {
                    warn!(error = %err, "request error");
                }
            }
            Err(err) => warn!(error = %err, "connection failed"),
        }
    }

    Ok(())
}

fn handle_connection(stream: &mut TcpStream, state: &AppState) -> std::io::Result<()> {
    let mut buffer = [0_u8; 16_384];
    let bytes_read = stream.read(&mut buffer)?;
    if bytes_read == 0 {
        return Ok(());
    }

    let request = String::from_utf8_lossy(&buffer[..bytes_read]);
    let mut lines = request.lines();
    let request_line = lines.next().unwrap_or_default();
    let mut request_parts = request_line.split_whitespace();
    let method = request_parts.next().unwrap_or("GET");
    let path = request_parts.next().unwrap_or("/");

    let response = routes::route_request(state, method, path);
    info!(method, path, status = response.status_code, "request");
    stream.write_all(response.to_http_string().as_bytes())?;
    stream.flush()?;
    Ok(())
}
