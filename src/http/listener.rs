//! TCP listener with sequential port retry, and the one-shot connection
//! handler.
//!
//! Each connection is accept → read → respond → close. Requests are
//! buffered whole before parsing; there is no keep-alive.

use std::future::Future;
use std::net::{IpAddr, SocketAddr};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use super::request::{is_complete, HttpRequest};
use super::response::HttpResponse;
use super::router::route;
use crate::mcp::dispatcher::DispatcherHandle;
use crate::{AppError, Result};

const READ_CHUNK: usize = 8 * 1024;

/// Try `preferred`, then `preferred + 1`, … for at most `max_retries`
/// extra attempts. Attempts are strictly sequential.
///
/// Returns the bound resource and the port that was requested for it.
///
/// # Errors
///
/// Returns `AppError::Bind` when every attempt fails or the port range
/// runs past `u16::MAX`.
pub async fn bind_with_retry<T, F, Fut>(
    preferred: u16,
    max_retries: u16,
    mut bind: F,
) -> Result<(T, u16)>
where
    F: FnMut(u16) -> Fut,
    Fut: Future<Output = std::io::Result<T>>,
{
    let mut last_error = String::from("no attempt made");
    let mut last_port = preferred;

    for attempt in 0..=max_retries {
        let Some(port) = preferred.checked_add(attempt) else {
            break;
        };
        last_port = port;

        match bind(port).await {
            Ok(bound) => {
                if attempt > 0 {
                    info!(preferred, port, attempt, "bound to fallback port");
                }
                return Ok((bound, port));
            }
            Err(err) => {
                warn!(port, attempt, %err, "bind attempt failed");
                last_error = err.to_string();
            }
        }
    }

    Err(AppError::Bind(format!(
        "no port available in {preferred}..={last_port}: {last_error}"
    )))
}

/// Bind a TCP listener on `host`, walking up from `preferred`.
///
/// Returns the listener and the port it is actually bound to, which
/// differs from the requested one when `preferred` is `0`.
///
/// # Errors
///
/// Returns `AppError::Bind` when no port could be acquired.
pub async fn bind_listener(
    host: IpAddr,
    preferred: u16,
    max_retries: u16,
) -> Result<(TcpListener, u16)> {
    let (listener, _) = bind_with_retry(preferred, max_retries, |port| {
        TcpListener::bind(SocketAddr::new(host, port))
    })
    .await?;
    let port = listener.local_addr()?.port();
    Ok((listener, port))
}

/// Spawn the accept loop. It runs until `ct` is cancelled.
#[must_use]
pub fn spawn_accept_loop(
    listener: TcpListener,
    dispatcher: DispatcherHandle,
    max_request_bytes: usize,
    ct: CancellationToken,
) -> JoinHandle<()> {
    let port = listener.local_addr().map(|addr| addr.port()).unwrap_or_default();

    tokio::spawn(
        async move {
            loop {
                tokio::select! {
                    () = ct.cancelled() => {
                        info!("HTTP listener shutting down");
                        break;
                    }
                    accepted = listener.accept() => {
                        match accepted {
                            Ok((stream, peer)) => {
                                let dispatcher = dispatcher.clone();
                                tokio::spawn(
                                    handle_connection(stream, dispatcher, max_request_bytes)
                                        .instrument(info_span!("http_conn", %peer)),
                                );
                            }
                            Err(err) => {
                                warn!(%err, "accept failed");
                                dispatcher.log(format!("accept failed: {err}"));
                            }
                        }
                    }
                }
            }
        }
        .instrument(info_span!("http_listener", port)),
    )
}

#[derive(Debug)]
enum ReadError {
    TooLarge,
    Io(std::io::Error),
}

async fn read_request(
    stream: &mut TcpStream,
    max_bytes: usize,
) -> std::result::Result<Vec<u8>, ReadError> {
    let mut buf = Vec::with_capacity(READ_CHUNK);
    let mut chunk = vec![0u8; READ_CHUNK];

    loop {
        let n = stream.read(&mut chunk).await.map_err(ReadError::Io)?;
        if n == 0 {
            return Ok(buf);
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.len() > max_bytes {
            return Err(ReadError::TooLarge);
        }
        if is_complete(&buf) {
            return Ok(buf);
        }
    }
}

/// Serve one connection: read a request, route it, write the response,
/// then close.
pub async fn handle_connection(
    mut stream: TcpStream,
    dispatcher: DispatcherHandle,
    max_request_bytes: usize,
) {
    let response = match read_request(&mut stream, max_request_bytes).await {
        Ok(raw) => match HttpRequest::parse(&raw) {
            Ok(request) => {
                debug!(method = %request.method, target = %request.target, "request");
                dispatcher.log(format!("{} {}", request.method, request.path()));
                route(request, &dispatcher).await
            }
            Err(err) => {
                warn!(%err, "bad request");
                dispatcher.log(format!("bad request: {err}"));
                HttpResponse::text(400, format!("Bad Request: {err}"))
            }
        },
        Err(ReadError::TooLarge) => {
            warn!(limit = max_request_bytes, "request too large");
            dispatcher.log(format!("request exceeds {max_request_bytes} bytes"));
            HttpResponse::text(413, "Payload Too Large")
        }
        Err(ReadError::Io(err)) => {
            warn!(%err, "read failed");
            dispatcher.log(format!("connection read failed: {err}"));
            return;
        }
    };

    if let Err(err) = stream.write_all(&response.to_bytes()).await {
        warn!(%err, "failed to write response");
        dispatcher.log(format!("connection write failed: {err}"));
        return;
    }
    let _ = stream.shutdown().await;
}
