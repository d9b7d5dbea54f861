//! Messaging gateway seam. The transport (Twilio or otherwise) lives behind
//! [`MessagingGateway`]; the core only knows `send(to, body) -> message id`.
//!
//! The gateway is an explicitly constructed, injected dependency. Credentials
//! and routing policy are configuration passed at construction time, never
//! module-level state.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::DemoRouting;
use crate::redact::{redact_body, redact_phone};

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Gateway not configured: {0}")]
    NotConfigured(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Send timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Send one SMS. `to` is E.164. Returns the transport's message id.
    async fn send_sms(&self, to: &str, body: &str) -> Result<String, GatewayError>;
}

/// Apply the configured timeout to a gateway call. Every send in the core
/// goes through here so no external call can hang a unit of work.
pub async fn send_with_timeout(
    gateway: &Arc<dyn MessagingGateway>,
    timeout: Duration,
    to: &str,
    body: &str,
) -> Result<String, GatewayError> {
    match tokio::time::timeout(timeout, gateway.send_sms(to, body)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(to = %redact_phone(to), "SMS send timed out");
            Err(GatewayError::Timeout(timeout))
        }
    }
}

/// Demo-mode decorator: re-routes SMS for numbers outside the allowlist to a
/// single test number, prefixing the body with the redacted original
/// destination. Wraps any inner gateway.
pub struct DemoRoutedGateway {
    inner: Arc<dyn MessagingGateway>,
    routing: DemoRouting,
}

impl DemoRoutedGateway {
    pub fn new(inner: Arc<dyn MessagingGateway>, routing: DemoRouting) -> Self {
        Self { inner, routing }
    }

    fn route<'a>(&'a self, to: &'a str, body: &'a str) -> (String, String) {
        if !self.routing.enabled || self.routing.allowlist.iter().any(|n| n == to) {
            return (to.to_string(), body.to_string());
        }

        match &self.routing.route_all_to {
            Some(route_to) => {
                tracing::info!(
                    original = %redact_phone(to),
                    routed = %redact_phone(route_to),
                    "Demo routing applied"
                );
                (
                    route_to.clone(),
                    format!("[DEMO to:{}] {}", redact_phone(to), body),
                )
            }
            None => {
                tracing::warn!("Demo mode enabled but no route_all_to configured");
                (to.to_string(), body.to_string())
            }
        }
    }
}

#[async_trait]
impl MessagingGateway for DemoRoutedGateway {
    async fn send_sms(&self, to: &str, body: &str) -> Result<String, GatewayError> {
        let (final_to, final_body) = self.route(to, body);
        let message_id = self.inner.send_sms(&final_to, &final_body).await?;
        tracing::info!(
            to = %redact_phone(&final_to),
            body = %redact_body(&final_body),
            message_id = %message_id,
            "SMS sent"
        );
        Ok(message_id)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingGateway;
    use super::*;

    #[tokio::test]
    async fn demo_routing_redirects_unlisted_numbers() {
        let inner = Arc::new(RecordingGateway::new());
        let gateway = DemoRoutedGateway::new(
            inner.clone(),
            DemoRouting {
                enabled: true,
                route_all_to: Some("+18015559999".into()),
                allowlist: vec!["+18015550001".into()],
            },
        );

        gateway.send_sms("+18015550202", "hello").await.unwrap();
        let sent = inner.sent().await;
        assert_eq!(sent[0].to, "+18015559999");
        assert!(sent[0].body.starts_with("[DEMO to:+1801***]"));
    }

    #[tokio::test]
    async fn demo_routing_passes_allowlisted_numbers_through() {
        let inner = Arc::new(RecordingGateway::new());
        let gateway = DemoRoutedGateway::new(
            inner.clone(),
            DemoRouting {
                enabled: true,
                route_all_to: Some("+18015559999".into()),
                allowlist: vec!["+18015550001".into()],
            },
        );

        gateway.send_sms("+18015550001", "hello").await.unwrap();
        let sent = inner.sent().await;
        assert_eq!(sent[0].to, "+18015550001");
        assert_eq!(sent[0].body, "hello");
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_surfaces_as_gateway_error() {
        struct SlowGateway;

        #[async_trait]
        impl MessagingGateway for SlowGateway {
            async fn send_sms(&self, _to: &str, _body: &str) -> Result<String, GatewayError> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok("never".into())
            }
        }

        let gateway: Arc<dyn MessagingGateway> = Arc::new(SlowGateway);
        let result =
            send_with_timeout(&gateway, Duration::from_millis(50), "+15555550100", "hi").await;
        assert!(matches!(result, Err(GatewayError::Timeout(_))));
    }
}
