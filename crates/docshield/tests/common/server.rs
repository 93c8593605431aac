//! Local HTTP server for testing `HttpGateway` against real requests.

#![allow(dead_code)]

use axum::Router;

/// Serves `app` on an ephemeral localhost port and returns its base URL.
pub async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    format!("http://{}", addr)
}
