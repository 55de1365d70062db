//! A scripted page for agent tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::AgentError;
use crate::platform::{
    NotificationPermissions, Permission, Platform, PushManager, ServiceWorkerContainer, SubscribeOptions, UserNotice,
};
use aquajal_core::push::SubscriptionKeys;
use aquajal_core::{Error, PushSubscription, Relay, RelayAck};

pub const KEY: &str = "BEl62iUYgUivxIkv69yViEuiBIa-Ib9-SkvMeAtA3LFgDzkrxZJjSgSnfckjBJuBkr3qBUYIHBQFLXYp5Nksh8U";

struct PageState {
    notifications: AtomicBool,
    push: AtomicBool,
    worker_ready: AtomicBool,
    accept_subscribe: AtomicBool,
    relay_ok: AtomicBool,
    permission: Mutex<Permission>,
    prompt_answer: Mutex<Permission>,
    subscription: Mutex<Option<PushSubscription>>,
    last_options: Mutex<Option<SubscribeOptions>>,
    relayed: Mutex<Vec<PushSubscription>>,
    alerts: Mutex<Vec<String>>,
    prompts: AtomicUsize,
    ready_calls: AtomicUsize,
    subscribe_calls: AtomicUsize,
}

pub struct FakePage {
    state: Arc<PageState>,
}

impl FakePage {
    pub fn new(permission: Permission) -> Self {
        let state = PageState {
            notifications: AtomicBool::new(true),
            push: AtomicBool::new(true),
            worker_ready: AtomicBool::new(true),
            accept_subscribe: AtomicBool::new(true),
            relay_ok: AtomicBool::new(true),
            permission: Mutex::new(permission),
            prompt_answer: Mutex::new(Permission::Default),
            subscription: Mutex::new(None),
            last_options: Mutex::new(None),
            relayed: Mutex::new(Vec::new()),
            alerts: Mutex::new(Vec::new()),
            prompts: AtomicUsize::new(0),
            ready_calls: AtomicUsize::new(0),
            subscribe_calls: AtomicUsize::new(0),
        };
        Self { state: Arc::new(state) }
    }

    pub fn granted() -> Self {
        Self::new(Permission::Granted)
    }

    pub fn without_notifications(self) -> Self {
        self.state.notifications.store(false, Ordering::SeqCst);
        self
    }

    pub fn without_push(self) -> Self {
        self.state.push.store(false, Ordering::SeqCst);
        self
    }

    pub fn with_unready_worker(self) -> Self {
        self.state.worker_ready.store(false, Ordering::SeqCst);
        self
    }

    pub fn refusing_subscriptions(self) -> Self {
        self.state.accept_subscribe.store(false, Ordering::SeqCst);
        self
    }

    pub fn with_failing_relay(self) -> Self {
        self.state.relay_ok.store(false, Ordering::SeqCst);
        self
    }

    /// What the native prompt will answer.
    pub fn answer_prompt(&self, answer: Permission) {
        *self.state.prompt_answer.lock().unwrap() = answer;
    }

    pub fn platform(&self) -> Platform {
        Platform {
            notifications: self.state.clone(),
            workers: Arc::new(FakeWorkers(self.state.clone())),
            notice: self.state.clone(),
        }
    }

    pub fn relay(&self) -> Arc<dyn Relay> {
        self.state.clone()
    }

    pub fn relayed(&self) -> Vec<PushSubscription> {
        self.state.relayed.lock().unwrap().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.state.alerts.lock().unwrap().clone()
    }

    pub fn last_options(&self) -> Option<SubscribeOptions> {
        self.state.last_options.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> usize {
        self.state.prompts.load(Ordering::SeqCst)
    }

    pub fn ready_calls(&self) -> usize {
        self.state.ready_calls.load(Ordering::SeqCst)
    }

    pub fn subscribe_calls(&self) -> usize {
        self.state.subscribe_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationPermissions for PageState {
    fn is_supported(&self) -> bool {
        self.notifications.load(Ordering::SeqCst)
    }

    fn permission(&self) -> Permission {
        *self.permission.lock().unwrap()
    }

    async fn request_permission(&self) -> Permission {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        let answer = *self.prompt_answer.lock().unwrap();
        *self.permission.lock().unwrap() = answer;
        answer
    }
}

struct FakeWorkers(Arc<PageState>);

#[async_trait]
impl ServiceWorkerContainer for FakeWorkers {
    fn supports_push(&self) -> bool {
        self.0.push.load(Ordering::SeqCst)
    }

    async fn ready(&self) -> Result<Arc<dyn PushManager>, AgentError> {
        self.0.ready_calls.fetch_add(1, Ordering::SeqCst);
        if !self.0.worker_ready.load(Ordering::SeqCst) {
            return Err(AgentError::Platform("registration failed".into()));
        }
        Ok(self.0.clone())
    }
}

#[async_trait]
impl PushManager for PageState {
    async fn get_subscription(&self) -> Result<Option<PushSubscription>, AgentError> {
        Ok(self.subscription.lock().unwrap().clone())
    }

    async fn subscribe(&self, options: SubscribeOptions) -> Result<PushSubscription, AgentError> {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_options.lock().unwrap() = Some(options);
        if !self.accept_subscribe.load(Ordering::SeqCst) {
            return Err(AgentError::Platform("permission revoked".into()));
        }

        let subscription = PushSubscription {
            endpoint: "https://push.example/send/device-1".into(),
            expiration_time: None,
            keys: SubscriptionKeys {
                p256dh: "BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA".into(),
                auth: "tBHItJI5svbpez7KI4CCXg".into(),
            },
        };
        *self.subscription.lock().unwrap() = Some(subscription.clone());
        Ok(subscription)
    }
}

impl UserNotice for PageState {
    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}

#[async_trait]
impl Relay for PageState {
    async fn relay(&self, subscription: &PushSubscription) -> Result<Option<RelayAck>, Error> {
        if !self.relay_ok.load(Ordering::SeqCst) {
            return Err(Error::HttpStatus { status: 500, url: "https://aquajal.example/notifications/subscribe".into() });
        }
        self.relayed.lock().unwrap().push(subscription.clone());
        Ok(Some(RelayAck { message: Some("Subscription successful".into()), error: None }))
    }
}
