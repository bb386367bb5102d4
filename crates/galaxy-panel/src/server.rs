//! HTTP control API.

use std::io::Read;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use serde::{Deserialize, Serialize};
use tiny_http::{Header, Method, Request, Response, Server};

use crate::controls::ControlRow;
use crate::panel::ParameterPatch;
use crate::PanelState;

#[derive(Debug, thiserror::Error)]
pub enum PanelServerError {
    #[error("Failed to bind to port {port}: {error}")]
    BindError { port: u16, error: String },

    #[error("Failed to spawn panel server thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Serves the panel API from a background thread.
pub struct PanelServer {
    port: u16,
    actual_port: Option<u16>,
    handle: Option<JoinHandle<()>>,
}

#[derive(Deserialize)]
struct Command {
    command: String,
}

#[derive(Serialize)]
struct CommandResponse {
    executed: bool,
    command: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_seconds: f64,
}

#[derive(Serialize)]
struct ParamsResponse {
    params: galaxy_generator::GalaxyParameters,
    controls: Vec<ControlRow>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

impl PanelServer {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            actual_port: None,
            handle: None,
        }
    }

    /// Binds to `127.0.0.1:<port>` and starts answering requests.
    pub fn start(&mut self, state: Arc<Mutex<PanelState>>) -> Result<(), PanelServerError> {
        let server = Server::http(format!("127.0.0.1:{}", self.port)).map_err(|e| {
            PanelServerError::BindError {
                port: self.port,
                error: e.to_string(),
            }
        })?;

        let actual_port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .unwrap_or(self.port);
        self.actual_port = Some(actual_port);

        let handle = thread::Builder::new()
            .name("panel-http".into())
            .spawn(move || Self::run_server(server, state))?;
        self.handle = Some(handle);

        tracing::info!("Parameter panel listening on http://127.0.0.1:{actual_port}");
        Ok(())
    }

    pub fn stop(&mut self) {
        // tiny_http has no graceful shutdown; the thread may be parked in
        // incoming_requests(), so detach it instead of joining.
        if let Some(handle) = self.handle.take() {
            drop(handle);
        }
    }

    pub fn actual_port(&self) -> u16 {
        self.actual_port.unwrap_or(self.port)
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    fn run_server(server: Server, state: Arc<Mutex<PanelState>>) {
        for request in server.incoming_requests() {
            if let Err(e) = Self::handle_request(request, &state) {
                tracing::warn!("Panel server error: {e}");
            }
        }
    }

    fn handle_request(mut request: Request, state: &Arc<Mutex<PanelState>>) -> HandlerResult {
        let path = request
            .url()
            .split('?')
            .next()
            .unwrap_or_default()
            .to_string();
        tracing::debug!("{} {path}", request.method());

        let response = match (request.method(), path.as_str()) {
            (&Method::Get, "/health") => {
                let uptime_seconds = lock(state).metrics.uptime_seconds;
                json(
                    200,
                    &HealthResponse {
                        status: "ok",
                        uptime_seconds,
                    },
                )?
            }
            (&Method::Get, "/params") => {
                let state = lock(state);
                json(
                    200,
                    &ParamsResponse {
                        params: *state.panel.params(),
                        controls: state.panel.table(),
                    },
                )?
            }
            (&Method::Post, "/params") => {
                let body = read_body(&mut request)?;
                match serde_json::from_str::<ParameterPatch>(&body) {
                    Ok(patch) => {
                        let mut state = lock(state);
                        match state.panel.apply_patch(&patch) {
                            Ok(_) => {
                                state.panel.commit();
                                json(
                                    200,
                                    &ParamsResponse {
                                        params: *state.panel.params(),
                                        controls: state.panel.table(),
                                    },
                                )?
                            }
                            Err(e) => bad_request(e.to_string())?,
                        }
                    }
                    Err(e) => bad_request(e.to_string())?,
                }
            }
            (&Method::Get, "/metrics") => json(200, &lock(state).metrics)?,
            (&Method::Post, "/command") => {
                let body = read_body(&mut request)?;
                match serde_json::from_str::<Command>(&body) {
                    Ok(command) => {
                        let executed = match command.command.as_str() {
                            "quit" => {
                                lock(state).quit_requested = true;
                                true
                            }
                            "regenerate" => {
                                lock(state).panel.commit();
                                true
                            }
                            _ => false,
                        };
                        json(
                            200,
                            &CommandResponse {
                                executed,
                                command: command.command,
                            },
                        )?
                    }
                    Err(e) => bad_request(e.to_string())?,
                }
            }
            _ => Response::from_string("Not Found").with_status_code(404),
        };

        request.respond(response)?;
        Ok(())
    }
}

impl Drop for PanelServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock(state: &Mutex<PanelState>) -> MutexGuard<'_, PanelState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read_body(request: &mut Request) -> std::io::Result<String> {
    let mut body = String::new();
    request.as_reader().read_to_string(&mut body)?;
    Ok(body)
}

fn json<T: Serialize>(
    status: u16,
    value: &T,
) -> serde_json::Result<Response<std::io::Cursor<Vec<u8>>>> {
    let body = serde_json::to_string(value)?;
    let mut response = Response::from_string(body).with_status_code(status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        response.add_header(header);
    }
    Ok(response)
}

fn bad_request(error: String) -> serde_json::Result<Response<std::io::Cursor<Vec<u8>>>> {
    json(400, &ErrorResponse { error })
}
