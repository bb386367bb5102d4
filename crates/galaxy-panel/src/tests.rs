//! HTTP tests for the panel API.

use crate::{FrameMetrics, PanelServer, PanelState, ParameterPanel, parse_port};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

fn start(state: PanelState) -> (PanelServer, Arc<Mutex<PanelState>>, String) {
    let state = Arc::new(Mutex::new(state));
    let mut server = PanelServer::new(0); // port 0 = OS assigns
    server.start(state.clone()).unwrap();

    // Give server a moment to start
    thread::sleep(Duration::from_millis(100));

    let base = format!("http://127.0.0.1:{}", server.actual_port());
    (server, state, base)
}

fn post(url: &str, body: &str) -> Result<ureq::Response, ureq::Error> {
    ureq::post(url)
        .set("Content-Type", "application/json")
        .send_string(body)
}

fn body(resp: ureq::Response) -> serde_json::Value {
    let text = resp.into_string().unwrap();
    serde_json::from_str(&text).unwrap()
}

#[test]
fn test_panel_state_default() {
    let state = PanelState::default();
    assert_eq!(state.metrics.frame_count, 0);
    assert!(!state.quit_requested);
    assert!(!state.panel.has_pending_commit());
}

#[test]
fn test_parse_port() {
    assert_eq!(parse_port(Some("8080")), Some(8080));
    assert_eq!(parse_port(Some(" 0 ")), Some(0));
    assert_eq!(parse_port(Some("http")), None);
    assert_eq!(parse_port(None), None);
}

#[test]
fn test_health() {
    let (mut server, _state, base) = start(PanelState::default());
    assert!(server.is_running());

    let resp = ureq::get(&format!("{base}/health")).call().unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.header("Content-Type").unwrap(), "application/json");
    assert_eq!(body(resp)["status"], "ok");
    server.stop();
}

#[test]
fn test_get_params_lists_controls() {
    let (mut server, _state, base) = start(PanelState::default());

    let resp = ureq::get(&format!("{base}/params")).call().unwrap();
    let json = body(resp);
    assert_eq!(json["params"]["particle_count"], 100_000);
    assert_eq!(json["params"]["inner_color"], "#ff6030");

    let controls = json["controls"].as_array().unwrap();
    assert_eq!(controls.len(), 9);
    assert_eq!(controls[3]["field"], "branches");
    assert_eq!(controls[3]["min"], 2.0);
    assert!(controls[8].get("min").is_none());
    server.stop();
}

#[test]
fn test_query_string_is_ignored() {
    let (mut server, _state, base) = start(PanelState::default());
    let resp = ureq::get(&format!("{base}/params?pretty=1")).call().unwrap();
    assert_eq!(resp.status(), 200);
    server.stop();
}

#[test]
fn test_post_params_clamps_and_commits() {
    let (mut server, state, base) = start(PanelState::default());

    let resp = post(
        &format!("{base}/params"),
        r##"{"branches": 50, "radius": 7.5, "outer_color": "#ffffff"}"##,
    )
    .unwrap();
    assert_eq!(resp.status(), 200);
    let json = body(resp);
    assert_eq!(json["params"]["branches"], 20);

    let mut state = state.lock().unwrap();
    assert_eq!(state.panel.params().radius, 7.5);
    assert_eq!(state.panel.params().outer_color.to_hex(), "#ffffff");
    assert!(state.panel.take_commit());
    drop(state);
    server.stop();
}

#[test]
fn test_post_params_rejects_bad_input() {
    let (mut server, state, base) = start(PanelState::default());

    for bad in [r#"{"arms": 4}"#, r#"{"inner_color": "red"}"#, "not json"] {
        match post(&format!("{base}/params"), bad) {
            Err(ureq::Error::Status(code, resp)) => {
                assert_eq!(code, 400, "{bad}");
                assert!(body(resp)["error"].is_string());
            }
            other => panic!("expected 400 for {bad}, got {other:?}"),
        }
    }

    let state = state.lock().unwrap();
    assert!(!state.panel.has_pending_commit());
    assert_eq!(state.panel.params().branches, 3);
    drop(state);
    server.stop();
}

#[test]
fn test_metrics() {
    let (mut server, _state, base) = start(PanelState {
        panel: ParameterPanel::default(),
        metrics: FrameMetrics {
            frame_count: 100,
            frame_time_ms: 16.6,
            fps: 60.2,
            surface_width: 3840,
            surface_height: 2160,
            render_width: 2560,
            render_height: 1440,
            particle_count: 100_000,
            regeneration_count: 4,
            uptime_seconds: 1.66,
        },
        quit_requested: false,
    });

    let json = body(ureq::get(&format!("{base}/metrics")).call().unwrap());
    assert_eq!(json["frame_count"], 100);
    assert!((json["fps"].as_f64().unwrap() - 60.2).abs() < 0.01);
    assert_eq!(json["surface_width"], 3840);
    assert_eq!(json["render_width"], 2560);
    assert_eq!(json["render_height"], 1440);
    assert_eq!(json["particle_count"], 100_000);
    assert_eq!(json["regeneration_count"], 4);
    server.stop();
}

#[test]
fn test_command_quit() {
    let (mut server, state, base) = start(PanelState::default());

    let json = body(post(&format!("{base}/command"), r#"{"command": "quit"}"#).unwrap());
    assert_eq!(json["executed"], true);
    assert_eq!(json["command"], "quit");
    assert!(state.lock().unwrap().quit_requested);
    server.stop();
}

#[test]
fn test_command_regenerate_commits() {
    let (mut server, state, base) = start(PanelState::default());

    let json = body(post(&format!("{base}/command"), r#"{"command": "regenerate"}"#).unwrap());
    assert_eq!(json["executed"], true);
    assert!(state.lock().unwrap().panel.take_commit());
    server.stop();
}

#[test]
fn test_unknown_command_not_executed() {
    let (mut server, state, base) = start(PanelState::default());

    let json = body(post(&format!("{base}/command"), r#"{"command": "explode"}"#).unwrap());
    assert_eq!(json["executed"], false);
    let state = state.lock().unwrap();
    assert!(!state.quit_requested);
    assert!(!state.panel.has_pending_commit());
    drop(state);
    server.stop();
}

#[test]
fn test_unknown_endpoint_returns_404() {
    let (mut server, _state, base) = start(PanelState::default());

    let resp = ureq::get(&format!("{base}/screenshot")).call();
    if let Err(ureq::Error::Status(code, _)) = resp {
        assert_eq!(code, 404);
    } else {
        panic!("Expected 404 status error");
    }
    server.stop();
}
