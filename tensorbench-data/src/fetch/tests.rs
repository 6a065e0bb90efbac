//! Unit tests for the streaming downloader.

use super::*;

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use rstest::{fixture, rstest};
use tempfile::TempDir;
use tensorbench_test_support::io::ScriptedBody;
use tensorbench_test_support::tracing::RecordingLayer;
use tracing_subscriber::layer::SubscriberExt;

const DATA_URL: &str = "http://example.test/data.zip";

#[derive(Clone)]
struct FakeResponse {
    content_length: Option<u64>,
    body: ScriptedBody,
}

struct FakeClient {
    responses: HashMap<String, FakeResponse>,
    requested: RefCell<Vec<String>>,
}

impl FakeClient {
    fn serving(url: &str, content_length: Option<u64>, body: ScriptedBody) -> Self {
        Self {
            responses: HashMap::from([(
                url.to_owned(),
                FakeResponse {
                    content_length,
                    body,
                },
            )]),
            requested: RefCell::new(Vec::new()),
        }
    }
}

impl DownloadClient for FakeClient {
    fn open(&self, url: &str) -> Result<Transfer, DataError> {
        self.requested.borrow_mut().push(url.to_owned());
        let response = self
            .responses
            .get(url)
            .cloned()
            .ok_or_else(|| DataError::Download {
                url: url.to_owned(),
                message: "404 Not Found".to_owned(),
            })?;
        Ok(Transfer {
            content_length: response.content_length,
            body: Box::new(response.body),
        })
    }
}

/// Body that claims to have filled more bytes than the buffer holds.
struct OverReportingBody;

impl Read for OverReportingBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(buf.len().saturating_add(1))
    }
}

struct OverReportingClient;

impl DownloadClient for OverReportingClient {
    fn open(&self, _url: &str) -> Result<Transfer, DataError> {
        Ok(Transfer {
            content_length: Some(100),
            body: Box::new(OverReportingBody),
        })
    }
}

/// Gzip magic followed by payload bytes that must reach disk untouched.
const ENCODED_BODY: [u8; 16] = [
    0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0xcb, 0x48, 0xcd, 0xc9, 0xc9,
    0x07,
];

/// Answers one request with `body` marked as gzip-encoded and returns the URL
/// together with a handle yielding the raw request head.
fn serve_gzip_once(body: &'static [u8]) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener must bind");
    let addr = listener.local_addr().expect("listener has an address");
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("client must connect");
        let mut reader = BufReader::new(stream.try_clone().expect("stream must clone"));
        let mut head = String::new();
        loop {
            let mut line = String::new();
            let read = reader.read_line(&mut line).expect("request must be readable");
            if read == 0 || line == "\r\n" {
                break;
            }
            head.push_str(&line);
        }
        write!(
            stream,
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nContent-Encoding: gzip\r\nConnection: close\r\n\r\n",
            body.len()
        )
        .expect("response head must be written");
        stream.write_all(body).expect("response body must be written");
        head
    });
    (format!("http://{addr}/mesh.bin"), handle)
}

#[fixture]
fn out_dir() -> TempDir {
    tempfile::tempdir().expect("temp dir must be created")
}

fn status_lines(buffer: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(buffer)
        .lines()
        .map(str::to_owned)
        .collect()
}

#[rstest]
fn writes_declared_length_to_named_file(out_dir: TempDir) {
    let client = FakeClient::serving(DATA_URL, Some(20_000), ScriptedBody::new(20_000, CHUNK_SIZE));
    let mut status = Vec::new();

    let path = download_file_with(&client, DATA_URL, Some(out_dir.path()), &mut status)
        .expect("download must succeed");

    assert_eq!(path, out_dir.path().join("data.zip"));
    let written = fs::read(&path).expect("downloaded file must be readable");
    assert_eq!(written.len(), 20_000);
    assert!(written.iter().all(|byte| *byte == ScriptedBody::FILL));
    assert!(!out_dir.path().join("data.zip.part").exists());
    assert_eq!(client.requested.borrow().as_slice(), [DATA_URL]);
}

#[rstest]
fn reports_every_ten_percent_milestone(out_dir: TempDir) {
    let total = 2 * 1_048_576;
    let client = FakeClient::serving(
        DATA_URL,
        Some(u64::try_from(total).expect("fits u64")),
        ScriptedBody::new(total, CHUNK_SIZE),
    );
    let mut status = Vec::new();

    download_file_with(&client, DATA_URL, Some(out_dir.path()), &mut status)
        .expect("download must succeed");

    let lines = status_lines(&status);
    assert_eq!(lines.len(), 11);
    assert_eq!(lines.first().map(String::as_str), Some("Downloading: data.zip"));
    assert_eq!(lines.get(1).map(String::as_str), Some(" 0.2 / 2.0 MB (10 %)"));
    assert_eq!(lines.last().map(String::as_str), Some(" 2.0 / 2.0 MB (100 %)"));
}

#[rstest]
#[case::absent(None)]
#[case::zero(Some(0))]
fn undeclared_length_skips_milestones(out_dir: TempDir, #[case] content_length: Option<u64>) {
    let client = FakeClient::serving(DATA_URL, content_length, ScriptedBody::new(1_000, 100));
    let mut status = Vec::new();

    let path = download_file_with(&client, DATA_URL, Some(out_dir.path()), &mut status)
        .expect("download must succeed without a declared length");

    assert_eq!(fs::metadata(path).expect("file exists").len(), 1_000);
    let lines = status_lines(&status);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines.get(1).map(String::as_str), Some(" 0.0 MB (size not declared)"));
}

#[rstest]
fn read_failure_removes_partial_file(out_dir: TempDir) {
    let body = ScriptedBody::new(50_000, CHUNK_SIZE).failing_after(3 * CHUNK_SIZE);
    let client = FakeClient::serving(DATA_URL, Some(50_000), body);

    let err = download_file_with(&client, DATA_URL, Some(out_dir.path()), Vec::new())
        .expect_err("scripted reset must fail the download");

    let DataError::Transfer { received, .. } = &err else {
        panic!("expected Transfer error, got {err:?}");
    };
    assert_eq!(*received, 3 * 8_192);
    assert!(!out_dir.path().join("data.zip").exists());
    assert!(!out_dir.path().join("data.zip.part").exists());
}

#[rstest]
fn short_body_is_reported_as_truncated(out_dir: TempDir) {
    let client = FakeClient::serving(DATA_URL, Some(100), ScriptedBody::new(60, 16));

    let err = download_file_with(&client, DATA_URL, Some(out_dir.path()), Vec::new())
        .expect_err("short body must fail");

    assert_eq!(err.code().as_str(), "DATA_TRUNCATED");
    assert!(!out_dir.path().join("data.zip").exists());
    assert!(!out_dir.path().join("data.zip.part").exists());
}

#[rstest]
fn failed_rename_removes_partial_file(out_dir: TempDir) {
    let blocked = out_dir.path().join("data.zip");
    fs::create_dir(&blocked).expect("blocking directory must be created");
    fs::write(blocked.join("keep.txt"), b"keep").expect("blocking directory must be populated");
    let client = FakeClient::serving(DATA_URL, Some(10), ScriptedBody::new(10, 10));

    let err = download_file_with(&client, DATA_URL, Some(out_dir.path()), Vec::new())
        .expect_err("a directory in the way must fail the download");

    assert_eq!(err.code().as_str(), "DATA_IO");
    assert!(blocked.is_dir());
    assert!(!out_dir.path().join("data.zip.part").exists());
}

#[rstest]
fn over_reported_read_fails_the_transfer(out_dir: TempDir) {
    let err = download_file_with(&OverReportingClient, DATA_URL, Some(out_dir.path()), Vec::new())
        .expect_err("a read larger than the buffer must fail");

    let DataError::Transfer { received, .. } = &err else {
        panic!("expected Transfer error, got {err:?}");
    };
    assert_eq!(*received, 0);
    assert!(!out_dir.path().join("data.zip").exists());
    assert!(!out_dir.path().join("data.zip.part").exists());
}

#[rstest]
fn writes_encoded_body_verbatim(out_dir: TempDir) {
    let (url, server) = serve_gzip_once(&ENCODED_BODY);

    let path = download_file_with(&UreqDownloadClient, &url, Some(out_dir.path()), Vec::new())
        .expect("download must succeed");
    let head = server.join().expect("server thread must finish");

    assert_eq!(fs::read(&path).expect("downloaded file must be readable"), ENCODED_BODY);
    let advertises_gzip = head.lines().any(|line| {
        let line = line.to_ascii_lowercase();
        line.starts_with("accept-encoding") && line.contains("gzip")
    });
    assert!(!advertises_gzip, "request must not negotiate compression:\n{head}");
}

#[rstest]
#[case::current_directory(None, ".")]
#[case::explicit(Some("cache/sets"), "cache/sets")]
fn resolves_destination_directory(#[case] requested: Option<&str>, #[case] expected: &str) {
    assert_eq!(destination_dir(requested.map(Path::new)), Path::new(expected));
}

#[rstest]
fn request_failure_creates_no_file(out_dir: TempDir) {
    let client = FakeClient::serving(DATA_URL, Some(1), ScriptedBody::new(1, 1));

    let err = download_file_with(
        &client,
        "http://example.test/missing.zip",
        Some(out_dir.path()),
        Vec::new(),
    )
    .expect_err("unknown URL must fail");

    assert_eq!(err.code().as_str(), "DATA_DOWNLOAD");
    assert!(!out_dir.path().join("missing.zip").exists());
}

#[rstest]
fn creates_missing_output_directory(out_dir: TempDir) {
    let nested = out_dir.path().join("cache").join("sets");
    let client = FakeClient::serving(DATA_URL, Some(10), ScriptedBody::new(10, 10));

    let path = download_file_with(&client, DATA_URL, Some(nested.as_path()), Vec::new())
        .expect("download must create the output directory");

    assert_eq!(path, nested.join("data.zip"));
}

#[rstest]
fn emits_completion_event(out_dir: TempDir) {
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let client = FakeClient::serving(DATA_URL, Some(10), ScriptedBody::new(10, 10));

    tracing::subscriber::with_default(subscriber, || {
        download_file_with(&client, DATA_URL, Some(out_dir.path()), Vec::new())
            .expect("download must succeed");
    });

    assert!(layer.has_message("download complete"));
    assert!(layer.events().iter().any(|event| {
        event.fields.contains_key("path")
            && event.fields.get("bytes").map(String::as_str) == Some("10")
    }));
}

#[rstest]
#[case("http://example.test/data.zip", "data.zip")]
#[case("https://example.test/a/b/points.ply?token=1", "points.ply")]
#[case("https://example.test/mesh.obj#frag", "mesh.obj")]
#[case("archive.zip", "archive.zip")]
fn extracts_file_name_from_url(#[case] url: &str, #[case] expected: &str) {
    assert_eq!(file_name_from_url(url).expect("URL names a file"), expected);
}

#[rstest]
#[case::trailing_slash("http://example.test/datasets/")]
#[case::parent_dir("http://example.test/..")]
#[case::empty("")]
fn rejects_urls_without_file_name(#[case] url: &str) {
    let err = file_name_from_url(url).expect_err("URL names no file");
    assert_eq!(err.code().as_str(), "DATA_INVALID_URL");
}
