//! # AppCore
//!
//! Owns every piece of client state: the game registry, the session
//! lifecycle, the chat feed and the purchase form. Frontends hold a
//! reference to one `AppCore`, drive it through [`crate::workflows`], push
//! host snapshots into it, and poll subscriptions to re-render.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

use crate::config::{AppConfig, ConfigError};
use crate::errors::{Action, AppError};
use crate::reactive::{Dynamic, Subscription};
use crate::runtime_bridge::{BackendGateway, OfflineGateway, PlayerId, PurchaseSchema};
use crate::views::{
    ChatFeed, ChatMessage, ChatView, GameIdentityRegistry, GameSettings, PurchaseState,
    RegistrySnapshot, SessionCreationRequest, SessionState,
};
use crate::workflows::{self, latch::InFlightLatch, CreationOutcome};

/// One latch per guarded action.
#[derive(Debug)]
pub(crate) struct Latches {
    pub(crate) create: InFlightLatch,
    pub(crate) finalize: InFlightLatch,
    pub(crate) switch: InFlightLatch,
    pub(crate) schema: InFlightLatch,
    pub(crate) offer: InFlightLatch,
}

impl Latches {
    fn new() -> Self {
        Self {
            create: InFlightLatch::new(Action::CreateOrJoin),
            finalize: InFlightLatch::new(Action::Finalize),
            switch: InFlightLatch::new(Action::Switch),
            schema: InFlightLatch::new(Action::LoadPurchaseSchema),
            offer: InFlightLatch::new(Action::PurchaseOffer),
        }
    }
}

/// Headless application core.
pub struct AppCore {
    config: AppConfig,
    gateway: Arc<dyn BackendGateway>,
    registry: Dynamic<GameIdentityRegistry>,
    session: Dynamic<SessionState>,
    chat_feed: Mutex<ChatFeed>,
    chat: Dynamic<ChatView>,
    purchase: Dynamic<PurchaseState>,
    pub(crate) latches: Latches,
}

impl AppCore {
    /// Create a core backed by `gateway`.
    pub fn new(config: AppConfig, gateway: Arc<dyn BackendGateway>) -> Result<Self, ConfigError> {
        config.validate()?;
        let chat_feed = ChatFeed::new(config.chat.scrollback);
        Ok(Self {
            config,
            gateway,
            registry: Dynamic::default(),
            session: Dynamic::default(),
            chat_feed: Mutex::new(chat_feed),
            chat: Dynamic::default(),
            purchase: Dynamic::default(),
            latches: Latches::new(),
        })
    }

    /// Create a core with no backend attached.
    pub fn offline(config: AppConfig) -> Result<Self, ConfigError> {
        Self::new(config, Arc::new(OfflineGateway))
    }

    /// Active configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub(crate) fn gateway(&self) -> &dyn BackendGateway {
        self.gateway.as_ref()
    }

    pub(crate) fn registry_cell(&self) -> &Dynamic<GameIdentityRegistry> {
        &self.registry
    }

    pub(crate) fn session_cell(&self) -> &Dynamic<SessionState> {
        &self.session
    }

    pub(crate) fn purchase_cell(&self) -> &Dynamic<PurchaseState> {
        &self.purchase
    }

    // ─── Snapshots ───────────────────────────────────────────

    /// Current registry.
    pub fn registry(&self) -> GameIdentityRegistry {
        self.registry.get()
    }

    /// Current session state.
    pub fn session(&self) -> SessionState {
        self.session.get()
    }

    /// Current chat view.
    pub fn chat(&self) -> ChatView {
        self.chat.get()
    }

    /// Current purchase form state.
    pub fn purchase(&self) -> PurchaseState {
        self.purchase.get()
    }

    // ─── Subscriptions ───────────────────────────────────────

    /// Subscribe to registry changes.
    pub fn subscribe_registry(&self) -> Subscription<GameIdentityRegistry> {
        self.registry.subscribe()
    }

    /// Subscribe to session changes.
    pub fn subscribe_session(&self) -> Subscription<SessionState> {
        self.session.subscribe()
    }

    /// Subscribe to chat changes.
    pub fn subscribe_chat(&self) -> Subscription<ChatView> {
        self.chat.subscribe()
    }

    /// Subscribe to purchase form changes.
    pub fn subscribe_purchase(&self) -> Subscription<PurchaseState> {
        self.purchase.subscribe()
    }

    // ─── Host pushes ─────────────────────────────────────────

    /// Reconcile the registry with a backend snapshot.
    pub fn apply_registry_snapshot(&self, snapshot: RegistrySnapshot) {
        debug!(
            games = snapshot.sequencers.len(),
            loaded = ?snapshot.loaded,
            "applying registry snapshot"
        );
        self.registry.update_if(|registry| {
            let before = registry.clone();
            registry.apply_snapshot(snapshot);
            *registry != before
        });
    }

    /// Replace the chat feed with `messages`.
    ///
    /// Returns `false` when the snapshot matches the previous one; the view is
    /// then left alone and subscribers are not woken.
    pub fn apply_chat_snapshot(&self, messages: Vec<ChatMessage>) -> bool {
        let mut feed = self.chat_feed.lock();
        if !feed.apply_snapshot(messages) {
            return false;
        }
        let view = feed.view().clone();
        debug!(
            entries = view.entries.len(),
            new = view.new_since_last,
            "chat feed updated"
        );
        self.chat.set(view);
        true
    }

    // ─── Actions ─────────────────────────────────────────────

    /// See [`workflows::submit_create_or_join`].
    pub async fn submit_create_or_join(
        &self,
        request: SessionCreationRequest,
    ) -> Result<CreationOutcome, AppError> {
        workflows::submit_create_or_join(self, request).await
    }

    /// See [`workflows::finalize`].
    pub async fn finalize(&self, settings: GameSettings) -> Result<(), AppError> {
        workflows::finalize(self, settings).await
    }

    /// See [`workflows::switch_active`].
    pub async fn switch_active(&self, target: &str) -> Result<(), AppError> {
        workflows::switch_active(self, target).await
    }

    /// See [`workflows::load_purchase_schema`].
    pub async fn load_purchase_schema(&self) -> Result<PurchaseSchema, AppError> {
        workflows::load_purchase_schema(self).await
    }

    /// See [`workflows::submit_purchase_offer`].
    pub async fn submit_purchase_offer(
        &self,
        from: PlayerId,
        purchase_data: serde_json::Value,
    ) -> Result<(), AppError> {
        workflows::submit_purchase_offer(self, from, purchase_data).await
    }
}

impl std::fmt::Debug for AppCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppCore")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("session", &self.session)
            .field("latches", &self.latches)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::GameHandle;

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = AppConfig::default();
        config.finalize.finish_time_ms = 0;
        assert!(AppCore::offline(config).is_err());
    }

    #[test]
    fn test_registry_snapshot_notifies_only_on_change() {
        let core = AppCore::offline(AppConfig::default()).unwrap();
        let mut sub = core.subscribe_registry();
        let snapshot = RegistrySnapshot {
            sequencers: vec![GameHandle::new("k1", "alice")],
            loaded: Some("k1".to_string()),
        };

        core.apply_registry_snapshot(snapshot.clone());
        let registry = sub.poll().unwrap();
        assert_eq!(registry.active(), Some("k1"));

        core.apply_registry_snapshot(snapshot);
        assert!(sub.poll().is_none());
    }

    #[test]
    fn test_chat_snapshot_feeds_subscription() {
        let mut config = AppConfig::default();
        config.chat.scrollback = 2;
        let core = AppCore::offline(config).unwrap();
        let mut sub = core.subscribe_chat();

        assert!(core.apply_chat_snapshot(vec![
            ChatMessage::new(1, "Bob", "hi"),
            ChatMessage::new(2, "Alice", "hey"),
            ChatMessage::new(3, "Bob", "yo"),
        ]));
        let view = sub.poll().unwrap();
        assert_eq!(view.entries.len(), 2);
        assert_eq!(view.scroll_anchor, Some(3));

        assert!(!core.apply_chat_snapshot(vec![
            ChatMessage::new(1, "Bob", "hi"),
            ChatMessage::new(2, "Alice", "hey"),
            ChatMessage::new(3, "Bob", "yo"),
        ]));
        assert!(sub.poll().is_none());
    }
}
