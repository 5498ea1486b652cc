use crate::config::VapidConfig;
use chronos_domain::{NotificationPayload, PushSubscription};
use reqwest::StatusCode;
use std::collections::HashSet;
use std::sync::Mutex;
use tracing::warn;

/// Four weeks, the longest TTL push services commonly accept.
const PUSH_TTL_SECS: &str = "2419200";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PushDeliveryStatus {
    Delivered,
    /// The push service reported the subscription gone (HTTP 410/404).
    /// Callers use this signal to prune the stored subscription.
    Expired,
    Failed,
}

#[async_trait::async_trait]
pub trait IPushGateway: Send + Sync {
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &NotificationPayload,
    ) -> PushDeliveryStatus;
}

/// Posts notification payloads to the subscription endpoints handed out
/// by the browser push services.
pub struct HttpPushGateway {
    client: reqwest::Client,
    vapid: Option<VapidConfig>,
}

impl HttpPushGateway {
    pub fn new(vapid: Option<VapidConfig>) -> Self {
        Self {
            client: reqwest::Client::new(),
            vapid,
        }
    }
}

#[async_trait::async_trait]
impl IPushGateway for HttpPushGateway {
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &NotificationPayload,
    ) -> PushDeliveryStatus {
        let mut req = self
            .client
            .post(&subscription.endpoint)
            .header("TTL", PUSH_TTL_SECS)
            .json(payload);
        if let Some(vapid) = &self.vapid {
            req = req.header("Crypto-Key", format!("p256ecdsa={}", vapid.public_key));
        }

        match req.send().await {
            Ok(res) if res.status().is_success() => PushDeliveryStatus::Delivered,
            Ok(res)
                if res.status() == StatusCode::GONE || res.status() == StatusCode::NOT_FOUND =>
            {
                PushDeliveryStatus::Expired
            }
            Ok(res) => {
                warn!(
                    "Push endpoint {} responded with status: {}",
                    subscription.endpoint,
                    res.status()
                );
                PushDeliveryStatus::Failed
            }
            Err(e) => {
                warn!(
                    "Unable to reach push endpoint {}: {:?}",
                    subscription.endpoint, e
                );
                PushDeliveryStatus::Failed
            }
        }
    }
}

/// Gateway double that records sends and can be told to treat endpoints
/// as expired or failing. Used by tests and local development runs.
pub struct InMemoryPushGateway {
    sent: Mutex<Vec<(String, NotificationPayload)>>,
    expired_endpoints: Mutex<HashSet<String>>,
    failing_endpoints: Mutex<HashSet<String>>,
}

impl InMemoryPushGateway {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            expired_endpoints: Mutex::new(HashSet::new()),
            failing_endpoints: Mutex::new(HashSet::new()),
        }
    }

    pub fn expire_endpoint(&self, endpoint: &str) {
        self.expired_endpoints
            .lock()
            .unwrap()
            .insert(endpoint.to_string());
    }

    pub fn fail_endpoint(&self, endpoint: &str) {
        self.failing_endpoints
            .lock()
            .unwrap()
            .insert(endpoint.to_string());
    }

    pub fn sent(&self) -> Vec<(String, NotificationPayload)> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for InMemoryPushGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IPushGateway for InMemoryPushGateway {
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &NotificationPayload,
    ) -> PushDeliveryStatus {
        if self
            .expired_endpoints
            .lock()
            .unwrap()
            .contains(&subscription.endpoint)
        {
            return PushDeliveryStatus::Expired;
        }
        if self
            .failing_endpoints
            .lock()
            .unwrap()
            .contains(&subscription.endpoint)
        {
            return PushDeliveryStatus::Failed;
        }
        self.sent
            .lock()
            .unwrap()
            .push((subscription.endpoint.clone(), payload.clone()));
        PushDeliveryStatus::Delivered
    }
}
