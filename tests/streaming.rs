//! End-to-end tests: song lookup, range streaming, and the wire format.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

use cadenza::library::{Catalog, Song};
use cadenza::{Library, Router, Server, routes};

const SONG_LEN: usize = 1000;

struct Fixture {
    root: TempDir,
    data: Vec<u8>,
    app: Router,
}

fn song(id: i64, file_path: &str) -> Song {
    Song {
        id,
        title: format!("Track {id}"),
        artist: "Test Artist".to_owned(),
        album: None,
        duration: Some(180),
        file_path: file_path.to_owned(),
        cover_image: None,
    }
}

fn write(root: &Path, rel: &str, data: &[u8]) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, data).unwrap();
}

fn fixture() -> Fixture {
    let root = tempfile::tempdir().unwrap();
    let data: Vec<u8> = (0..SONG_LEN).map(|i| (i * 7 % 256) as u8).collect();
    write(root.path(), "songs/song-1.mp3", &data);
    write(root.path(), "covers/cover-1.png", b"\x89PNG fake");

    let catalog = Catalog::from_songs([
        song(1, "/uploads/songs/song-1.mp3"),
        song(2, "/uploads/songs/deleted.mp3"),
        song(3, "/uploads/../outside.mp3"),
    ])
    .unwrap();
    let library = Library::new(Arc::new(catalog), root.path(), 128);

    Fixture { root, data, app: routes::app(library) }
}

fn get(path: &str, range: Option<&str>) -> http::Request<Bytes> {
    let mut req = http::Request::get(path);
    if let Some(range) = range {
        req = req.header("range", range);
    }
    req.body(Bytes::new()).unwrap()
}

#[tokio::test]
async fn full_song_without_range() {
    let fx = fixture();
    let res = fx.app.handle(get("/api/songs/1/stream", None)).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.header("content-length"), Some("1000"));
    assert_eq!(res.header("content-type"), Some("audio/mpeg"));
    assert_eq!(res.into_bytes().await.unwrap(), fx.data);
}

#[tokio::test]
async fn open_ended_range_is_partial_content() {
    let fx = fixture();
    let res = fx.app.handle(get("/api/songs/1/stream", Some("bytes=0-"))).await;
    assert_eq!(res.status_code(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(res.header("content-range"), Some("bytes 0-999/1000"));
    assert_eq!(res.header("accept-ranges"), Some("bytes"));
    assert_eq!(res.header("content-length"), Some("1000"));
    assert_eq!(res.into_bytes().await.unwrap(), fx.data);
}

#[tokio::test]
async fn range_past_end_is_416() {
    let fx = fixture();
    let res = fx.app.handle(get("/api/songs/1/stream", Some("bytes=500-1500"))).await;
    assert_eq!(res.status_code(), StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(res.header("content-range"), Some("bytes */1000"));
}

#[tokio::test]
async fn unreadable_range_header_is_416_not_whole_file() {
    let fx = fixture();
    for range in [&b"bytes=\xff-1"[..], &b"bytes=abc-1"[..]] {
        let req = http::Request::get("/api/songs/1/stream")
            .header("range", http::HeaderValue::from_bytes(range).unwrap())
            .body(Bytes::new())
            .unwrap();
        let res = fx.app.handle(req).await;
        assert_eq!(res.status_code(), StatusCode::RANGE_NOT_SATISFIABLE, "{range:?}");
        assert_eq!(res.header("content-range"), Some("bytes */1000"));
    }
}

#[tokio::test]
async fn unknown_song_is_404() {
    let fx = fixture();
    for path in ["/api/songs/99/stream", "/api/songs/abc/stream"] {
        let res = fx.app.handle(get(path, None)).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND, "{path}");
        let body = res.into_bytes().await.unwrap();
        assert_eq!(&body[..], br#"{"error":"Song not found"}"#);
    }
}

#[tokio::test]
async fn song_with_missing_file_is_404() {
    let fx = fixture();
    let res = fx.app.handle(get("/api/songs/2/stream", None)).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    let body = res.into_bytes().await.unwrap();
    assert_eq!(&body[..], br#"{"error":"Song file not found"}"#);
}

#[tokio::test]
async fn song_path_outside_root_is_404() {
    let fx = fixture();
    let res = fx.app.handle(get("/api/songs/3/stream", None)).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sequential_ranges_rebuild_the_song() {
    let fx = fixture();
    let mut rebuilt = Vec::new();
    for start in (0..SONG_LEN).step_by(300) {
        let end = (start + 299).min(SONG_LEN - 1);
        let range = format!("bytes={start}-{end}");
        let res = fx.app.handle(get("/api/songs/1/stream", Some(&range))).await;
        assert_eq!(res.status_code(), StatusCode::PARTIAL_CONTENT);
        rebuilt.extend_from_slice(&res.into_bytes().await.unwrap());
    }
    assert_eq!(rebuilt, fx.data);
}

#[tokio::test]
async fn uploads_serve_covers_with_image_type() {
    let fx = fixture();
    let res = fx.app.handle(get("/uploads/covers/cover-1.png", None)).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.header("content-type"), Some("image/png"));
    assert_eq!(&res.into_bytes().await.unwrap()[..], b"\x89PNG fake");
}

#[tokio::test]
async fn uploads_support_ranges() {
    let fx = fixture();
    let res = fx.app.handle(get("/uploads/songs/song-1.mp3", Some("bytes=10-19"))).await;
    assert_eq!(res.status_code(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(&res.into_bytes().await.unwrap()[..], &fx.data[10..20]);
}

#[tokio::test]
async fn uploads_refuse_traversal() {
    let fx = fixture();
    let res = fx.app.handle(get("/uploads/songs/%2e%2e/%2e%2e/etc/passwd", None)).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn uploads_missing_file_matches_router_404() {
    let fx = fixture();
    let res = fx.app.handle(get("/uploads/songs/gone.mp3", None)).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(&res.into_bytes().await.unwrap()[..], br#"{"error":"Not found"}"#);
}

#[tokio::test]
async fn index_lists_endpoints() {
    let fx = fixture();
    let res = fx.app.handle(get("/", None)).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_slice(&res.into_bytes().await.unwrap()).unwrap();
    assert_eq!(body["endpoints"]["songs"]["stream"], "GET /api/songs/:id/stream");
}

#[tokio::test]
async fn readiness_tracks_media_root() {
    let fx = fixture();
    let res = fx.app.handle(get("/readyz", None)).await;
    assert_eq!(res.status_code(), StatusCode::OK);

    let gone = Library::new(Arc::new(Catalog::default()), "/definitely/not/here", 128);
    let res = routes::app(gone).handle(get("/readyz", None)).await;
    assert_eq!(res.status_code(), StatusCode::SERVICE_UNAVAILABLE);
}

/// Sends one HTTP/1.1 request over a real socket and returns the raw response.
async fn roundtrip(addr: std::net::SocketAddr, request: &str) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    raw
}

fn split_head(raw: &[u8]) -> (String, &[u8]) {
    let at = raw.windows(4).position(|w| w == b"\r\n\r\n").unwrap();
    (String::from_utf8_lossy(&raw[..at]).to_lowercase(), &raw[at + 4..])
}

#[tokio::test]
async fn serves_ranges_over_tcp_and_shuts_down() {
    let fx = fixture();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let server = tokio::spawn(Server::from_listener(listener).serve_with_shutdown(fx.app, async {
        let _ = stopped.await;
    }));

    let raw = roundtrip(
        addr,
        "GET /api/songs/1/stream HTTP/1.1\r\nhost: test\r\nrange: bytes=100-199\r\nconnection: close\r\n\r\n",
    )
    .await;
    let (head, body) = split_head(&raw);
    assert!(head.starts_with("http/1.1 206"), "{head}");
    assert!(head.contains("content-range: bytes 100-199/1000"), "{head}");
    assert!(head.contains("content-length: 100"), "{head}");
    assert!(head.contains("access-control-allow-origin: *"), "{head}");
    assert_eq!(body, &fx.data[100..200]);

    let raw = roundtrip(
        addr,
        "GET /api/songs/1/stream HTTP/1.1\r\nhost: test\r\nrange: bytes=0-10,20-30\r\nconnection: close\r\n\r\n",
    )
    .await;
    let (head, _) = split_head(&raw);
    assert!(head.starts_with("http/1.1 416"), "{head}");
    assert!(head.contains("content-range: bytes */1000"), "{head}");

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn client_leaving_mid_stream_does_not_disturb_server() {
    let fx = fixture();
    write(fx.root.path(), "songs/long.mp3", &vec![3u8; 8 * 1024 * 1024]);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let server = tokio::spawn(Server::from_listener(listener).serve_with_shutdown(fx.app, async {
        let _ = stopped.await;
    }));

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /uploads/songs/long.mp3 HTTP/1.1\r\nhost: test\r\n\r\n")
        .await
        .unwrap();
    let mut first = [0u8; 4096];
    let n = stream.read(&mut first).await.unwrap();
    assert!(first[..n].starts_with(b"HTTP/1.1 200"), "{}", String::from_utf8_lossy(&first[..n]));
    drop(stream);

    let raw = roundtrip(addr, "GET /healthz HTTP/1.1\r\nhost: test\r\nconnection: close\r\n\r\n").await;
    let (head, body) = split_head(&raw);
    assert!(head.starts_with("http/1.1 200"), "{head}");
    assert_eq!(body, b"ok");

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn small_request_bodies_are_still_routed() {
    let fx = fixture();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let server = tokio::spawn(Server::from_listener(listener).serve_with_shutdown(fx.app, async {
        let _ = stopped.await;
    }));

    let raw = roundtrip(
        addr,
        "GET /healthz HTTP/1.1\r\nhost: test\r\ncontent-length: 5\r\nconnection: close\r\n\r\nhello",
    )
    .await;
    let (head, _) = split_head(&raw);
    assert!(head.starts_with("http/1.1 200"), "{head}");

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();
}
