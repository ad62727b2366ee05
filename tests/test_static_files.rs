//! Tests for resolving and transmitting files from the document root

use std::fs;

use docroot::http::response::NOT_FOUND_BODY;
use docroot::static_files::{serve_file, serve_resolved, DocumentRoot, ServeError};
use tempfile::TempDir;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};

/// Returns a connected `(server, client)` pair over loopback.
async fn socket_pair() -> (TcpStream, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let client = TcpStream::connect(addr).await.unwrap();
    let (server, _) = listener.accept().await.unwrap();
    (server, client)
}

/// Splits a raw response into its header text and body bytes.
fn split_response(raw: &[u8]) -> (String, Vec<u8>) {
    let end = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response has no header terminator");
    (
        String::from_utf8_lossy(&raw[..end + 4]).into_owned(),
        raw[end + 4..].to_vec(),
    )
}

/// A temp dir holding an empty `www/` document root.
fn site() -> (TempDir, DocumentRoot) {
    let dir = tempfile::tempdir().unwrap();
    let www = dir.path().join("www");
    fs::create_dir(&www).unwrap();
    let root = DocumentRoot::open(&www).unwrap();
    (dir, root)
}

fn put(root: &DocumentRoot, name: &str, contents: impl AsRef<[u8]>) {
    fs::write(root.path().join(name), contents).unwrap();
}

#[tokio::test]
async fn test_serve_existing_file() {
    let (_dir, root) = site();
    put(&root, "index.html", "<h1>hi</h1>");
    let (mut server, mut client) = socket_pair().await;

    let sent = serve_file(&mut server, &root, "index.html").await.unwrap();
    drop(server);

    let mut raw = Vec::new();
    client.read_to_end(&mut raw).await.unwrap();
    let (header, body) = split_response(&raw);

    assert_eq!(sent, 11);
    assert_eq!(header, "HTTP/1.0 200 OK\r\nContent-Length: 11\r\n\r\n");
    assert_eq!(body, b"<h1>hi</h1>".to_vec());
}

#[tokio::test]
async fn test_serve_empty_file() {
    let (_dir, root) = site();
    put(&root, "empty.txt", "");
    let (mut server, mut client) = socket_pair().await;

    assert_eq!(serve_file(&mut server, &root, "empty.txt").await.unwrap(), 0);
    drop(server);

    let mut raw = Vec::new();
    client.read_to_end(&mut raw).await.unwrap();
    assert_eq!(raw, b"HTTP/1.0 200 OK\r\nContent-Length: 0\r\n\r\n".to_vec());
}

#[tokio::test]
async fn test_serve_large_file_in_full() {
    let contents: Vec<u8> = (0..4 * 1024 * 1024u32).map(|i| (i % 251) as u8).collect();
    let (_dir, root) = site();
    put(&root, "big.bin", &contents);
    let (mut server, mut client) = socket_pair().await;

    let reader = tokio::spawn(async move {
        let mut raw = Vec::new();
        client.read_to_end(&mut raw).await.unwrap();
        raw
    });

    let sent = serve_file(&mut server, &root, "/big.bin").await.unwrap();
    drop(server);

    let raw = reader.await.unwrap();
    let (header, body) = split_response(&raw);

    assert_eq!(sent, contents.len() as u64);
    assert!(header.contains(&format!("Content-Length: {}\r\n", contents.len())));
    assert!(body == contents);
}

#[tokio::test]
async fn test_serve_missing_file_sends_404_page() {
    let (_dir, root) = site();
    let (mut server, mut client) = socket_pair().await;

    let err = serve_file(&mut server, &root, "index.html").await.unwrap_err();
    drop(server);

    let mut raw = Vec::new();
    client.read_to_end(&mut raw).await.unwrap();
    let (header, body) = split_response(&raw);

    assert!(matches!(err, ServeError::NotFound));
    assert_eq!(
        header,
        format!("HTTP/1.0 404 Not Found\r\nContent-Length: {}\r\n\r\n", NOT_FOUND_BODY.len())
    );
    assert_eq!(body, NOT_FOUND_BODY.to_vec());
}

#[tokio::test]
async fn test_traversal_outside_root_is_rejected() {
    let (dir, root) = site();
    put(&root, "index.html", "ok");
    fs::write(dir.path().join("secret.txt"), b"top secret").unwrap();

    for path in ["../secret.txt", "/../secret.txt", "./../secret.txt", "//../secret.txt"] {
        let (mut server, mut client) = socket_pair().await;

        let err = serve_file(&mut server, &root, path).await.unwrap_err();
        drop(server);

        let mut raw = Vec::new();
        client.read_to_end(&mut raw).await.unwrap();

        assert!(matches!(err, ServeError::Traversal), "{}: {:?}", path, err);
        assert!(raw.starts_with(b"HTTP/1.0 404 Not Found\r\n"));
        assert!(!raw.windows(10).any(|w| w == b"top secret"));
    }
}

#[test]
fn test_traversal_through_existing_directory_is_rejected() {
    let (dir, root) = site();
    fs::create_dir(root.path().join("sub")).unwrap();
    fs::write(dir.path().join("secret.txt"), b"top secret").unwrap();

    assert!(matches!(
        root.resolve("sub/../../secret.txt"),
        Err(ServeError::Traversal)
    ));
    // Staying inside the root is fine
    put(&root, "inside.txt", "x");
    assert!(root.resolve("sub/../inside.txt").is_ok());
}

#[test]
fn test_traversal_to_missing_file_is_not_found() {
    let (_dir, root) = site();
    assert!(matches!(
        root.resolve("../does-not-exist"),
        Err(ServeError::NotFound)
    ));
}

#[cfg(unix)]
#[test]
fn test_symlink_out_of_root_is_rejected() {
    let (dir, root) = site();
    let secret = dir.path().join("secret.txt");
    fs::write(&secret, b"top secret").unwrap();
    std::os::unix::fs::symlink(&secret, root.path().join("link.txt")).unwrap();

    assert!(matches!(root.resolve("link.txt"), Err(ServeError::Traversal)));
}

#[tokio::test]
async fn test_file_removed_after_resolve_sends_500() {
    let (_dir, root) = site();
    put(&root, "index.html", "<h1>hi</h1>");
    let file = root.resolve("index.html").unwrap();

    // Force the check/use race: the file disappears between resolve and open
    fs::remove_file(&file.path).unwrap();

    let (mut server, mut client) = socket_pair().await;
    let err = serve_resolved(&mut server, &file).await.unwrap_err();
    drop(server);

    let mut raw = Vec::new();
    client.read_to_end(&mut raw).await.unwrap();

    assert!(matches!(err, ServeError::Open(_)));
    assert!(raw.starts_with(b"HTTP/1.0 500 Internal Server Error\r\n"));
}

#[tokio::test]
async fn test_file_truncated_after_resolve_fails_transfer() {
    let contents = vec![b'x'; 4096];
    let (_dir, root) = site();
    put(&root, "page.html", &contents);
    let file = root.resolve("page.html").unwrap();
    assert_eq!(file.size, 4096);

    fs::OpenOptions::new()
        .write(true)
        .open(&file.path)
        .unwrap()
        .set_len(100)
        .unwrap();

    let (mut server, mut client) = socket_pair().await;
    let err = serve_resolved(&mut server, &file).await.unwrap_err();
    drop(server);

    let mut raw = Vec::new();
    client.read_to_end(&mut raw).await.unwrap();

    assert!(matches!(err, ServeError::Transfer(_)));
    // The size snapshot from resolve time is what was announced
    assert!(raw.starts_with(b"HTTP/1.0 200 OK\r\nContent-Length: 4096\r\n\r\n"));
}

#[test]
fn test_open_missing_document_root_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(DocumentRoot::open(dir.path().join("nope")).is_err());
}

#[test]
fn test_create_document_root_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let www = dir.path().join("www");

    let root = DocumentRoot::create(&www).unwrap();

    assert!(www.is_dir());
    assert_eq!(root.path(), www.canonicalize().unwrap());
}

#[test]
fn test_serve_error_status_mapping() {
    use docroot::http::response::StatusCode;
    use std::io;

    assert_eq!(ServeError::NotFound.status(), StatusCode::NotFound);
    assert_eq!(ServeError::Traversal.status(), StatusCode::NotFound);
    assert_eq!(ServeError::PathTooLong.status(), StatusCode::BadRequest);
    assert_eq!(
        ServeError::Transfer(io::Error::other("boom")).status(),
        StatusCode::InternalServerError
    );
}
