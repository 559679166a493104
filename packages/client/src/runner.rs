//! Client execution: reconnection with backoff and the poll fallback.
//!
//! While the live transport is down the runner polls the gateway's
//! HTTP message endpoint so the timeline keeps moving; the polling
//! stops the moment a session is re-established, so push and poll
//! never run side by side.

use std::time::Duration;

use renraku_shared::time::now_millis;
use renraku_shared::types::{Message, OrderId};

use crate::audio::AudioService;
use crate::error::ClientError;
use crate::notify::{Coordinator, Permission, TitleBadge};
use crate::reconcile::OrderTimeline;
use crate::session::{run_session, ClientContext, SessionConfig, SessionEnd};

pub const MAX_RECONNECT_ATTEMPTS: u32 = 10;

const RECONNECT_BASE: Duration = Duration::from_secs(1);
const RECONNECT_CAP: Duration = Duration::from_secs(30);
const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Everything the binary hands over.
pub struct RunnerConfig {
    pub url: String,
    pub token: Option<String>,
    pub order_id: OrderId,
    pub desktop_notifications: bool,
}

/// Run the client until the user quits or reconnection is exhausted.
pub async fn run_client(config: RunnerConfig) -> Result<(), ClientError> {
    let permission = if config.desktop_notifications {
        Permission::Granted
    } else {
        Permission::Denied
    };

    let mut ctx = ClientContext::new(
        OrderTimeline::new(config.order_id.clone()),
        Coordinator::new(permission),
        AudioService::init(),
        TitleBadge::new(std::io::stdout(), format!("renraku {}", config.order_id)),
    );

    let session_config = SessionConfig {
        url: config.url.clone(),
        token: config.token.clone(),
        order_id: config.order_id.clone(),
    };
    let http = reqwest::Client::new();
    let poll_base = http_base_from_ws_url(&config.url);

    loop {
        match run_session(&session_config, &mut ctx).await {
            Ok(SessionEnd::UserQuit) => {
                tracing::info!("Client session ended normally");
                return Ok(());
            }
            Ok(SessionEnd::ConnectionLost) => {
                // The handshake had succeeded, so the attempt counter
                // starts over.
                ctx.timeline.reset_reconnect_attempts();
                tracing::warn!("Connection lost");
            }
            Err(e) => {
                tracing::warn!("Connection failed: {}", e);
            }
        }

        let attempt = ctx.timeline.record_reconnect_attempt();
        if attempt > MAX_RECONNECT_ATTEMPTS {
            tracing::error!(
                "Failed to reconnect after {} attempts. Exiting.",
                MAX_RECONNECT_ATTEMPTS
            );
            return Err(ClientError::ReconnectExhausted(MAX_RECONNECT_ATTEMPTS));
        }

        let delay = backoff_delay(attempt);
        tracing::info!(
            "Reconnecting in {:?} (attempt {}/{})",
            delay,
            attempt,
            MAX_RECONNECT_ATTEMPTS
        );
        backoff_with_poll(&http, &poll_base, &session_config, &mut ctx, delay).await;
    }
}

/// Exponential backoff: 1s, 2s, 4s, ... capped at 30s.
fn backoff_delay(attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    RECONNECT_BASE.saturating_mul(factor).min(RECONNECT_CAP)
}

/// Wait out the backoff delay, polling the HTTP fallback along the way
/// so messages persisted while offline still become visible.
async fn backoff_with_poll(
    http: &reqwest::Client,
    poll_base: &str,
    config: &SessionConfig,
    ctx: &mut ClientContext,
    delay: Duration,
) {
    let mut remaining = delay;
    while !remaining.is_zero() {
        let chunk = remaining.min(POLL_INTERVAL);
        tokio::time::sleep(chunk).await;
        remaining -= chunk;

        match poll_messages(http, poll_base, config, &ctx.timeline).await {
            Ok(fetched) => {
                ctx.timeline.merge(fetched, now_millis());
                ctx.refresh_badge();
            }
            Err(e) => {
                tracing::debug!("Poll fallback failed: {}", e);
            }
        }
    }
}

async fn poll_messages(
    http: &reqwest::Client,
    poll_base: &str,
    config: &SessionConfig,
    timeline: &OrderTimeline,
) -> Result<Vec<Message>, ClientError> {
    let url = format!("{}/api/orders/{}/messages", poll_base, config.order_id);

    let mut request = http.get(&url);
    if let Some(token) = &config.token {
        request = request.query(&[("token", token.as_str())]);
    }
    if let Some(since_id) = timeline.last_authoritative_id() {
        request = request.query(&[("since_id", since_id)]);
    }

    let response = request
        .send()
        .await
        .map_err(|e| ClientError::Poll(e.to_string()))?;
    if !response.status().is_success() {
        return Err(ClientError::Poll(format!(
            "unexpected status {}",
            response.status()
        )));
    }
    response
        .json::<Vec<Message>>()
        .await
        .map_err(|e| ClientError::Poll(e.to_string()))
}

/// Derive the HTTP origin of the gateway from its WebSocket URL.
fn http_base_from_ws_url(ws_url: &str) -> String {
    let swapped = if let Some(rest) = ws_url.strip_prefix("wss://") {
        format!("https://{}", rest)
    } else if let Some(rest) = ws_url.strip_prefix("ws://") {
        format!("http://{}", rest)
    } else {
        ws_url.to_string()
    };

    // Drop the endpoint path, keeping scheme://host:port.
    match swapped.find("://") {
        Some(scheme_end) => match swapped[scheme_end + 3..].find('/') {
            Some(path_start) => swapped[..scheme_end + 3 + path_start].to_string(),
            None => swapped,
        },
        None => swapped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_from_one_second() {
        // given / when / then:
        assert_eq!(backoff_delay(1), Duration::from_secs(1));
        assert_eq!(backoff_delay(2), Duration::from_secs(2));
        assert_eq!(backoff_delay(3), Duration::from_secs(4));
        assert_eq!(backoff_delay(5), Duration::from_secs(16));
    }

    #[test]
    fn test_backoff_caps_at_thirty_seconds() {
        // given / when / then:
        assert_eq!(backoff_delay(6), Duration::from_secs(30));
        assert_eq!(backoff_delay(10), Duration::from_secs(30));
    }

    #[test]
    fn test_http_base_strips_scheme_and_path() {
        // given / when / then:
        assert_eq!(
            http_base_from_ws_url("ws://127.0.0.1:8080/ws"),
            "http://127.0.0.1:8080"
        );
        assert_eq!(
            http_base_from_ws_url("wss://chat.example.com/ws"),
            "https://chat.example.com"
        );
        assert_eq!(
            http_base_from_ws_url("ws://localhost:9000"),
            "http://localhost:9000"
        );
    }
}
