//! End-to-end protocol tests.
//!
//! Each test spawns the real `jscd serve` binary, writes framed
//! MessagePack requests to its stdin, closes the stream, and decodes the
//! framed responses from its stdout. Closing stdin between frames is the
//! protocol's clean shutdown; framing violations must kill the daemon
//! with a non-zero status and no partial response.

use std::io::{Read, Write};
use std::process::{Command, ExitStatus, Stdio};

use jscd::daemon::protocol::{BuildRequest, BuildResponse, Define, DefineValue, Severity};

fn frame(payload: &[u8]) -> Vec<u8> {
    let mut bytes = u32::try_from(payload.len()).expect("payload fits u32").to_be_bytes().to_vec();
    bytes.extend_from_slice(payload);
    bytes
}

fn request_frame(request: &BuildRequest) -> Vec<u8> {
    frame(&request.encode().expect("encode request"))
}

/// Feed `input` to `jscd serve`, close stdin, collect stdout and status.
fn run_session(args: &[&str], input: &[u8]) -> (ExitStatus, Vec<u8>) {
    let bin_path = assert_cmd::cargo::cargo_bin!("jscd");
    let mut child = Command::new(bin_path)
        .arg("serve")
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn jscd serve");

    // The temporary ChildStdin drops at the end of the statement, which
    // closes the pipe and signals end of stream after the last frame.
    child.stdin.take().expect("stdin is piped").write_all(input).expect("write requests");

    let mut output = Vec::new();
    child.stdout.take().expect("stdout is piped").read_to_end(&mut output).expect("read responses");
    let status = child.wait().expect("wait for daemon");
    (status, output)
}

fn decode_responses(mut bytes: &[u8]) -> Vec<BuildResponse> {
    let mut responses = Vec::new();
    while !bytes.is_empty() {
        assert!(bytes.len() >= 4, "trailing garbage instead of a length prefix");
        let len = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        assert!(bytes.len() >= 4 + len, "truncated response frame");
        responses.push(BuildResponse::decode(&bytes[4..4 + len]).expect("decode response"));
        bytes = &bytes[4 + len..];
    }
    responses
}

fn project(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    for (name, contents) in files {
        std::fs::write(dir.path().join(name), contents).expect("write fixture");
    }
    dir
}

fn request_for(dir: &tempfile::TempDir, files: &[&str]) -> BuildRequest {
    BuildRequest {
        base_directory: dir.path().display().to_string(),
        files: files.iter().map(|f| (*f).to_string()).collect(),
        ..BuildRequest::default()
    }
}

#[test]
fn test_clean_stream_closure_exits_zero() {
    let (status, output) = run_session(&[], &[]);
    assert!(status.success(), "clean EOF should be a clean shutdown");
    assert!(output.is_empty());
}

#[test]
fn test_compile_roundtrip() {
    let dir = project(&[("main.js", "var main = 1;\n"), ("util.js", "var util = 2;\n")]);
    let input = request_frame(&request_for(&dir, &["main.js", "util.js"]));

    let (status, output) = run_session(&[], &input);

    assert!(status.success());
    let responses = decode_responses(&output);
    assert_eq!(responses.len(), 1);
    assert!(responses[0].diagnostics.is_empty());
    assert_eq!(
        responses[0].code.clone().expect("code present").into_vec(),
        b"var main = 1;\nvar util = 2;\n".to_vec()
    );
    assert!(responses[0].source_map.is_none());
}

#[test]
fn test_empty_file_list_is_a_single_error() {
    let dir = project(&[]);
    let input = request_frame(&request_for(&dir, &[]));

    let (status, output) = run_session(&[], &input);

    assert!(status.success(), "a malformed request must not kill the daemon");
    let responses = decode_responses(&output);
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].diagnostics.len(), 1);
    assert_eq!(responses[0].diagnostics[0].severity, Severity::Error);
    assert_eq!(responses[0].diagnostics[0].message, "No source files");
    assert!(responses[0].code.is_none());
}

#[test]
fn test_missing_source_file_reports_and_daemon_keeps_serving() {
    let dir = project(&[("main.js", "var main = 1;\n")]);
    let mut input = request_frame(&request_for(&dir, &["gone.js"]));
    input.extend_from_slice(&request_frame(&request_for(&dir, &["main.js"])));

    let (status, output) = run_session(&[], &input);

    assert!(status.success());
    let responses = decode_responses(&output);
    assert_eq!(responses.len(), 2);

    assert!(responses[0].code.is_none());
    assert_eq!(responses[0].diagnostics.len(), 1);
    assert_eq!(responses[0].diagnostics[0].severity, Severity::Error);
    let file = responses[0].diagnostics[0].file.as_deref().expect("file attached");
    assert!(file.ends_with("gone.js"), "diagnostic names the file: {file}");

    assert!(responses[1].code.is_some());
}

#[test]
fn test_invalid_define_short_circuits() {
    let dir = project(&[("main.js", "var main = 1;\n")]);
    let mut request = request_for(&dir, &["main.js"]);
    request.defines = vec![Define { name: String::new(), value: Some(DefineValue::Boolean(true)) }];
    let input = request_frame(&request);

    let (status, output) = run_session(&[], &input);

    assert!(status.success());
    let responses = decode_responses(&output);
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].diagnostics.len(), 1);
    assert_eq!(responses[0].diagnostics[0].message, "empty name for define");
    assert!(responses[0].code.is_none());
}

#[test]
fn test_source_map_is_root_relative() {
    let dir = project(&[("main.js", "var main = 1;\n")]);
    let mut request = request_for(&dir, &["main.js"]);
    request.output_source_map = "main.js.map".to_string();
    let input = request_frame(&request);

    let (status, output) = run_session(&[], &input);

    assert!(status.success());
    let responses = decode_responses(&output);
    let map_bytes = responses[0].source_map.clone().expect("source map present");
    let map: serde_json::Value = serde_json::from_slice(&map_bytes).expect("map is JSON");
    assert_eq!(map["version"], 3);
    assert_eq!(map["file"], "main.js");
    assert_eq!(map["sources"][0], "/main.js");
}

#[test]
fn test_partial_length_prefix_is_fatal() {
    // Two of the four prefix bytes, then EOF: mid-frame desync.
    let (status, output) = run_session(&[], &[0, 0]);
    assert!(!status.success(), "mid-frame EOF must exit non-zero");
    assert!(output.is_empty(), "no response may be written after a desync");
}

#[test]
fn test_truncated_payload_is_fatal() {
    let mut input = 64u32.to_be_bytes().to_vec();
    input.extend_from_slice(b"only a few bytes");

    let (status, output) = run_session(&[], &input);
    assert!(!status.success());
    assert!(output.is_empty());
}

#[test]
fn test_oversized_frame_is_fatal() {
    let input = 2048u32.to_be_bytes().to_vec();

    let (status, output) = run_session(&["--max-frame-size", "1024"], &input);
    assert!(!status.success(), "oversized frame must exit non-zero, never truncate");
    assert!(output.is_empty());
}

#[test]
fn test_garbage_payload_is_fatal() {
    // A well-framed payload that is not a request map.
    let input = frame(&[0x2a]);

    let (status, output) = run_session(&[], &input);
    assert!(!status.success());
    assert!(output.is_empty());
}
