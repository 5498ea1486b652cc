use chronos_domain::{NotificationPayload, ID};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 16;

/// Server-sent-events hub. Channels are named; notifications for a user go
/// out on `user:{id}`. The subscription registry tracks which users hold
/// an open SSE stream so the dispatcher can decide whether emitting is
/// worthwhile at all.
pub struct SseChannel {
    inner: Mutex<SseChannelInner>,
}

struct SseChannelInner {
    subscriptions: HashMap<ID, HashSet<String>>,
    channels: HashMap<String, broadcast::Sender<NotificationPayload>>,
}

impl SseChannel {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SseChannelInner {
                subscriptions: HashMap::new(),
                channels: HashMap::new(),
            }),
        }
    }

    pub fn user_channel(user_id: &ID) -> String {
        format!("user:{}", user_id)
    }

    pub fn subscribe(&self, channel: &str) -> broadcast::Receiver<NotificationPayload> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    pub fn add_subscription(&self, user_id: &ID, channel: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .subscriptions
            .entry(user_id.clone())
            .or_insert_with(HashSet::new)
            .insert(channel.to_string());
    }

    pub fn remove_subscription(&self, user_id: &ID, channel: &str) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(channels) = inner.subscriptions.get_mut(user_id) {
            channels.remove(channel);
            if channels.is_empty() {
                inner.subscriptions.remove(user_id);
            }
        }
    }

    pub fn has_subscription(&self, user_id: &ID) -> bool {
        let inner = self.inner.lock().unwrap();
        inner
            .subscriptions
            .get(user_id)
            .map(|channels| !channels.is_empty())
            .unwrap_or(false)
    }

    pub fn emit(&self, channel: &str, payload: &NotificationPayload) {
        let inner = self.inner.lock().unwrap();
        if let Some(sender) = inner.channels.get(channel) {
            // A send error only means nobody is listening right now.
            let _ = sender.send(payload.clone());
        }
    }
}

impl Default for SseChannel {
    fn default() -> Self {
        Self::new()
    }
}
