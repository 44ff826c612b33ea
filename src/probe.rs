use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time;

use crate::types::{Endpoint, ProbeOutcome};

/// Attempt one TCP connect to `endpoint`, bounded by `timeout`.
///
/// - A connection established in time is shut down right away and reported
///   open; a failing shutdown does not change that.
/// - Refused, unreachable, unresolvable, and timed-out attempts all report
///   not-open. The cause is only visible at `trace` level.
/// - No retries. Exactly one socket is opened and released per call.
pub async fn probe(endpoint: Endpoint, timeout: Duration) -> ProbeOutcome {
    let connect = TcpStream::connect((endpoint.host.as_str(), endpoint.port));
    let open = match time::timeout(timeout, connect).await {
        Ok(Ok(mut stream)) => {
            if let Err(e) = stream.shutdown().await {
                tracing::trace!(endpoint = %endpoint, error = %e, "shutdown after connect failed");
            }
            true
        }
        Ok(Err(e)) => {
            tracing::trace!(endpoint = %endpoint, error = %e, "connect failed");
            false
        }
        Err(_) => {
            tracing::trace!(endpoint = %endpoint, timeout_ms = timeout.as_millis() as u64, "connect timed out");
            false
        }
    };
    ProbeOutcome { endpoint, open }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn listening_port_is_open() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let outcome = probe(Endpoint::new("127.0.0.1", port), Duration::from_secs(1)).await;
        assert!(outcome.open);
        assert_eq!(outcome.endpoint.port, port);
    }

    #[tokio::test]
    async fn released_port_is_closed() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let outcome = probe(Endpoint::new("127.0.0.1", port), Duration::from_secs(1)).await;
        assert!(!outcome.open);
    }

    #[tokio::test]
    async fn unresolvable_host_is_closed() {
        let outcome = probe(Endpoint::new("no-such-host.invalid", 80), Duration::from_secs(2)).await;
        assert!(!outcome.open);
    }
}
