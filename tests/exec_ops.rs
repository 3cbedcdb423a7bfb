mod support;

use docker_facade::{DockerError, StreamKind};
use serde_json::json;
use support::{docker, MockDaemon};

fn frame(kind: u8, payload: &[u8]) -> Vec<u8> {
    let mut v = vec![kind, 0, 0, 0];
    v.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    v.extend_from_slice(payload);
    v
}

#[test]
fn test_container_exec_creates_then_inspects() {
    let mock = MockDaemon::new();
    mock.reply(201, r#"{"Id":"ex1"}"#).reply(
        200,
        r#"{"ID":"ex1","Running":false,"ExitCode":0,"ContainerID":"123"}"#,
    );
    let d = docker(&mock);
    let exec = d
        .containers()
        .get("123")
        .exec(&json!({"Cmd": ["ls"], "AttachStdout": true}))
        .unwrap();

    assert_eq!(
        mock.lines(),
        vec!["POST /v1.45/containers/123/exec", "GET /v1.45/exec/ex1/json"]
    );
    assert_eq!(exec.uri().as_str(), "http://localhost/v1.45/exec/ex1");
    assert_eq!(exec.identity()["ContainerID"], "123");
    assert_eq!(exec.id(), Some("ex1"));
}

#[test]
fn test_container_exec_requires_201() {
    let mock = MockDaemon::new();
    mock.reply(409, r#"{"message":"container is paused"}"#);
    let d = docker(&mock);
    let err = d.containers().get("123").exec(&json!({"Cmd": ["ls"]})).unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(mock.requests().len(), 1);
}

#[test]
fn test_container_exec_after_client_dropped() {
    let mock = MockDaemon::new();
    mock.reply(201, r#"{"Id":"ex1"}"#);
    let d = docker(&mock);
    let c = d.containers().get("123");
    drop(d);
    let err = c.exec(&json!({"Cmd": ["ls"]})).unwrap_err();
    assert!(matches!(err, DockerError::Detached), "{err:?}");
}

#[test]
fn test_exec_start_streams_frames() {
    let mock = MockDaemon::new();
    let mut raw = frame(1, b"out\n");
    raw.extend(frame(2, b"err\n"));
    mock.reply(200, r#"{"ID":"ex1"}"#).reply(200, raw);
    let d = docker(&mock);
    let exec = d.execs().get("ex1").unwrap();
    let frames: Vec<_> = exec
        .start(false)
        .unwrap()
        .frames()
        .collect::<std::io::Result<_>>()
        .unwrap();

    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].kind, StreamKind::Stdout);
    assert_eq!(frames[1].payload, b"err\n");

    let start = mock.last();
    assert_eq!(support::line(&start), "POST /v1.45/exec/ex1/start");
    let body: serde_json::Value = serde_json::from_slice(start.body.as_deref().unwrap()).unwrap();
    assert_eq!(body, json!({"Detach": false, "Tty": false}));
}

#[test]
fn test_exec_resize_accepts_200_and_201() {
    let mock = MockDaemon::new();
    mock.reply(200, r#"{"ID":"ex1"}"#)
        .reply(200, "")
        .reply(201, "")
        .reply(500, "");
    let d = docker(&mock);
    let exec = d.execs().get("ex1").unwrap();
    exec.resize(40, 120).unwrap();
    exec.resize(40, 120).unwrap();
    assert_eq!(exec.resize(40, 120).unwrap_err().status(), Some(500));
    assert_eq!(support::line(&mock.last()), "POST /v1.45/exec/ex1/resize?h=40&w=120");
}

#[test]
fn test_execs_get_unknown_id() {
    let mock = MockDaemon::new();
    mock.reply(404, r#"{"message":"No such exec instance"}"#);
    let d = docker(&mock);
    assert!(d.execs().get("nope").unwrap_err().is_not_found());
}
