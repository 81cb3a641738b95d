use std::net::SocketAddr;

use prendas::garment::Garment;
use prendas::store::MemoryStore;
use prendas::{Server, api};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

async fn roundtrip(addr: SocketAddr, raw: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.expect("connect");
    stream.write_all(raw.as_bytes()).await.expect("write");
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.expect("read");
    String::from_utf8(buf).expect("utf-8 response")
}

#[tokio::test]
async fn serves_over_tcp_and_shuts_down_gracefully() {
    let store = MemoryStore::with_garments([Garment::new(1, "Camisa Azul", "Camisas", 20.0)]);
    let server = Server::bind("127.0.0.1:0".parse().unwrap()).await.expect("bind");
    let addr = server.local_addr().expect("local addr");

    let (stop, stopped) = oneshot::channel::<()>();
    let serving = tokio::spawn(server.serve_with_shutdown(api::router(store.clone()), async move {
        let _ = stopped.await;
    }));

    let welcome = roundtrip(addr, "GET / HTTP/1.1\r\nhost: test\r\nconnection: close\r\n\r\n").await;
    assert!(welcome.starts_with("HTTP/1.1 200 OK"), "{welcome}");
    assert!(welcome.ends_with(api::WELCOME), "{welcome}");

    let body = r#"{"codigo":2,"nombre":"Falda","categoria":"Faldas","precio":30}"#;
    let created = roundtrip(
        addr,
        &format!(
            "POST /prendas HTTP/1.1\r\nhost: test\r\ncontent-type: application/json\r\n\
             content-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        ),
    )
    .await;
    assert!(created.starts_with("HTTP/1.1 201 Created"), "{created}");
    assert!(created.to_ascii_lowercase().contains("content-type: application/json; charset=utf-8"));

    let deleted = roundtrip(
        addr,
        "DELETE /prendas/1 HTTP/1.1\r\nhost: test\r\nconnection: close\r\n\r\n",
    )
    .await;
    assert!(deleted.starts_with("HTTP/1.1 204 No Content"), "{deleted}");

    let missing = roundtrip(addr, "GET /nada HTTP/1.1\r\nhost: test\r\nconnection: close\r\n\r\n").await;
    assert!(missing.starts_with("HTTP/1.1 404 Not Found"), "{missing}");
    assert!(missing.ends_with(api::PAGE_NOT_FOUND), "{missing}");

    assert_eq!(store.snapshot().await, vec![Garment::new(2, "Falda", "Faldas", 30.0)]);
    assert_eq!(store.open_connections(), 0);

    stop.send(()).expect("server still running");
    serving.await.expect("server task").expect("clean shutdown");
    assert!(TcpStream::connect(addr).await.is_err());
}
