//! ProfileService: the single coordinator between HTTP handlers, editor
//! sessions and the snapshot store.
//!
//! All business logic flows through [`ProfileService`]; handlers are thin
//! wrappers that delegate to these methods.
//!
//! The service keeps the published snapshot that the public page renders
//! and a map of editor sessions keyed by token. Each session edits its own
//! working copy; saves always write the whole copy, so concurrent sessions
//! resolve as last-writer-wins at the store.
//!
//! Saves from one session are numbered as they start. A save that lands
//! after a newer one from the same session has overwritten the store with
//! older data, so it leaves the session dirty and is not published.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use dashmap::DashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use linkcard_core::{AuthGate, Edit, EditorSession, ProfilePatch, Snapshot};
use linkcard_storage::{SnapshotClient, StorageError};

use crate::config::SavePolicy;
use crate::error::ApiError;
use crate::schema::admin::{EditResponse, Persistence, SessionView};

/// Bounds on the editor session table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    /// Sessions kept at once; logging in past this drops the least
    /// recently used one.
    pub max_sessions: usize,
    /// Sessions untouched for this long are dropped at the next login.
    pub idle_timeout: Duration,
}

impl Default for SessionLimits {
    fn default() -> Self {
        SessionLimits {
            max_sessions: 32,
            idle_timeout: Duration::from_secs(30 * 60),
        }
    }
}

struct SessionEntry {
    session: EditorSession,
    /// Sequence number of the last save started for this session.
    saves_started: u64,
    /// Highest sequence number whose save has reached the store.
    saves_landed: u64,
    last_seen: Instant,
    /// Logical access clock used for least-recently-used eviction.
    last_touch: u64,
}

struct Published {
    ticket: u64,
    snapshot: Snapshot,
}

pub struct ProfileService {
    client: SnapshotClient,
    gate: AuthGate,
    policy: SavePolicy,
    limits: SessionLimits,
    /// What visitors see: the last snapshot loaded from or saved to the store.
    published: RwLock<Published>,
    publish_tickets: AtomicU64,
    sessions: DashMap<Uuid, SessionEntry>,
    touch_clock: AtomicU64,
}

impl ProfileService {
    /// Creates a service publishing the default snapshot until
    /// [`refresh_published`](Self::refresh_published) runs.
    pub fn new(client: SnapshotClient, gate: AuthGate, policy: SavePolicy) -> Self {
        ProfileService {
            client,
            gate,
            policy,
            limits: SessionLimits::default(),
            published: RwLock::new(Published {
                ticket: 0,
                snapshot: Snapshot::default(),
            }),
            publish_tickets: AtomicU64::new(0),
            sessions: DashMap::new(),
            touch_clock: AtomicU64::new(0),
        }
    }

    pub fn with_session_limits(mut self, limits: SessionLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn policy(&self) -> SavePolicy {
        self.policy
    }

    // -------------------------------------------------------------------
    // Published snapshot and data endpoints
    // -------------------------------------------------------------------

    /// Reloads the published snapshot from the store, falling back to the
    /// default snapshot when the load fails.
    pub async fn refresh_published(&self) -> Snapshot {
        let ticket = self.next_ticket();
        let snapshot = self.client.load_or_default().await;
        self.publish(ticket, snapshot.clone()).await;
        snapshot
    }

    pub async fn published(&self) -> Snapshot {
        self.published.read().await.snapshot.clone()
    }

    /// Reads the record straight from the store.
    pub async fn fetch_data(&self) -> Result<Snapshot, StorageError> {
        self.client.load().await
    }

    /// Upserts `snapshot` and publishes it on success.
    pub async fn save_data(&self, snapshot: Snapshot) -> Result<(), StorageError> {
        self.client.save(&snapshot).await?;
        let ticket = self.next_ticket();
        self.publish(ticket, snapshot).await;
        Ok(())
    }

    fn next_ticket(&self) -> u64 {
        self.publish_tickets.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Replaces the published snapshot unless a later ticket already did.
    async fn publish(&self, ticket: u64, snapshot: Snapshot) {
        let mut published = self.published.write().await;
        if ticket > published.ticket {
            *published = Published { ticket, snapshot };
        }
    }

    // -------------------------------------------------------------------
    // Editor sessions
    // -------------------------------------------------------------------

    /// Opens an authenticated session over the published snapshot.
    pub async fn login(&self, password: &str) -> Result<(Uuid, Snapshot), ApiError> {
        let mut session = EditorSession::new(self.published().await);
        if let Err(err) = session.authenticate(&self.gate, password) {
            tracing::warn!("editor login rejected");
            return Err(err.into());
        }
        self.evict_sessions();

        let token = Uuid::new_v4();
        let snapshot = session.snapshot().clone();
        self.sessions.insert(
            token,
            SessionEntry {
                session,
                saves_started: 0,
                saves_landed: 0,
                last_seen: Instant::now(),
                last_touch: self.tick(),
            },
        );
        tracing::info!(%token, "editor session opened");
        Ok((token, snapshot))
    }

    /// Drops the session. Unsaved edits in it are discarded.
    pub fn logout(&self, token: Uuid) -> bool {
        let removed = self.sessions.remove(&token);
        if let Some((_, entry)) = &removed {
            tracing::info!(%token, unsaved = entry.session.is_dirty(), "editor session closed");
        }
        removed.is_some()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn session_view(&self, token: Uuid) -> Result<SessionView, ApiError> {
        let mut entry = self.sessions.get_mut(&token).ok_or_else(unknown_session)?;
        self.touch(&mut entry);
        Ok(SessionView {
            snapshot: entry.session.snapshot().clone(),
            dirty: entry.session.is_dirty(),
        })
    }

    /// Applies `edit` to the session's working copy and, under the
    /// immediate policy, saves the result.
    pub async fn apply_edit(&self, token: Uuid, edit: &Edit) -> Result<EditResponse, ApiError> {
        let snapshot = {
            let mut entry = self.sessions.get_mut(&token).ok_or_else(unknown_session)?;
            self.touch(&mut entry);
            entry.session.apply(edit)?.clone()
        };
        tracing::info!(%token, kind = edit.kind(), links = snapshot.links.len(), "edit applied");

        match self.policy {
            SavePolicy::Explicit => Ok(EditResponse {
                snapshot,
                dirty: true,
                persistence: Persistence::Pending,
            }),
            SavePolicy::Immediate => Ok(self.persist(token, snapshot).await),
        }
    }

    /// Stores an uploaded image as the profile icon.
    pub async fn upload_icon(
        &self,
        token: Uuid,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<EditResponse, ApiError> {
        let data_url = icon_data_url(content_type, bytes)?;
        let edit = Edit::UpdateProfile {
            profile: ProfilePatch::user_icon(data_url),
        };
        self.apply_edit(token, &edit).await
    }

    /// Saves the session's working copy.
    pub async fn save_session(&self, token: Uuid) -> Result<EditResponse, ApiError> {
        let snapshot = self.session_view(token)?.snapshot;
        let response = self.persist(token, snapshot).await;
        match &response.persistence {
            Persistence::Failed { message } => {
                Err(ApiError::InternalError(format!("save failed: {}", message)))
            }
            _ => Ok(response),
        }
    }

    async fn persist(&self, token: Uuid, snapshot: Snapshot) -> EditResponse {
        let seq = self.begin_save(token);
        match self.client.save(&snapshot).await {
            Ok(()) => {
                let landed = self.finish_save(token, seq, &snapshot);
                if let Some(ticket) = landed.publish {
                    self.publish(ticket, snapshot.clone()).await;
                }
                EditResponse {
                    snapshot,
                    dirty: landed.dirty,
                    persistence: Persistence::Saved,
                }
            }
            Err(err) => EditResponse {
                snapshot,
                dirty: true,
                persistence: Persistence::Failed {
                    message: err.to_string(),
                },
            },
        }
    }

    /// Numbers a save for the session. `None` once the session is gone.
    fn begin_save(&self, token: Uuid) -> Option<u64> {
        let mut entry = self.sessions.get_mut(&token)?;
        entry.saves_started += 1;
        Some(entry.saves_started)
    }

    /// Records that save `seq` reached the store and works out the
    /// session's dirty state and whether the snapshot may be published.
    fn finish_save(&self, token: Uuid, seq: Option<u64>, saved: &Snapshot) -> Landed {
        let (Some(mut entry), Some(seq)) = (self.sessions.get_mut(&token), seq) else {
            return Landed {
                dirty: false,
                publish: Some(self.next_ticket()),
            };
        };

        if seq < entry.saves_landed {
            // A newer save already landed; the store now holds older data.
            entry.session.mark_dirty();
            tracing::warn!(%token, seq, newer = entry.saves_landed, "stale save overwrote a newer one");
            return Landed {
                dirty: true,
                publish: None,
            };
        }

        entry.saves_landed = seq;
        if seq == entry.saves_started && entry.session.snapshot() == saved {
            entry.session.mark_saved();
        }
        Landed {
            dirty: entry.session.is_dirty(),
            publish: Some(self.next_ticket()),
        }
    }

    fn tick(&self) -> u64 {
        self.touch_clock.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn touch(&self, entry: &mut SessionEntry) {
        entry.last_seen = Instant::now();
        entry.last_touch = self.tick();
    }

    /// Drops idle sessions, then the least recently used ones until there
    /// is room for one more.
    fn evict_sessions(&self) {
        let idle_timeout = self.limits.idle_timeout;
        let before = self.sessions.len();
        self.sessions
            .retain(|_, entry| entry.last_seen.elapsed() < idle_timeout);
        let idle = before - self.sessions.len();
        if idle > 0 {
            tracing::info!(evicted = idle, "idle editor sessions dropped");
        }

        let max = self.limits.max_sessions.max(1);
        while self.sessions.len() >= max {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|entry| entry.last_touch)
                .map(|entry| *entry.key());
            let Some(token) = oldest else { break };
            if let Some((_, entry)) = self.sessions.remove(&token) {
                tracing::info!(%token, unsaved = entry.session.is_dirty(), "editor session evicted");
            }
        }
    }
}

/// Outcome of a save that reached the store.
struct Landed {
    dirty: bool,
    /// Publish ticket, or `None` when the save was superseded.
    publish: Option<u64>,
}

fn unknown_session() -> ApiError {
    ApiError::Unauthorized("unknown or expired session".to_string())
}

/// Encodes an uploaded image as a `data:` URL.
fn icon_data_url(content_type: &str, bytes: &[u8]) -> Result<String, ApiError> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if !mime.starts_with("image/") {
        return Err(ApiError::BadRequest(format!(
            "icon upload must be an image, got '{}'",
            content_type
        )));
    }
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("icon upload is empty".to_string()));
    }
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use linkcard_core::LinkDraft;
    use linkcard_storage::{InMemoryStore, LinkEncoding, ProfileRecord, SnapshotStore};
    use tokio::sync::Notify;

    fn service(store: &Arc<InMemoryStore>, policy: SavePolicy) -> ProfileService {
        let client = SnapshotClient::new(store.clone(), LinkEncoding::Json);
        ProfileService::new(client, AuthGate::new("pw"), policy)
    }

    fn add(name: &str) -> Edit {
        Edit::AddLink {
            link: LinkDraft {
                name: name.to_string(),
                url: format!("https://{}.example", name),
                icon: "i.png".to_string(),
                comment: None,
            },
        }
    }

    #[tokio::test]
    async fn immediate_policy_writes_once_per_edit() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(&store, SavePolicy::Immediate);
        let (token, _) = service.login("pw").await.unwrap();

        for name in ["a", "b", "c"] {
            let response = service.apply_edit(token, &add(name)).await.unwrap();
            assert_eq!(response.persistence, Persistence::Saved);
            assert!(!response.dirty);
        }

        assert_eq!(store.write_count(), 3);
        assert_eq!(service.published().await.links.len(), 3);
    }

    #[tokio::test]
    async fn explicit_policy_defers_until_save() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(&store, SavePolicy::Explicit);
        let (token, _) = service.login("pw").await.unwrap();

        let response = service.apply_edit(token, &add("a")).await.unwrap();
        assert_eq!(response.persistence, Persistence::Pending);
        assert_eq!(store.write_count(), 0);
        assert!(service.published().await.links.is_empty());

        let saved = service.save_session(token).await.unwrap();
        assert_eq!(saved.persistence, Persistence::Saved);
        assert!(!saved.dirty);
        assert_eq!(store.write_count(), 1);
        assert_eq!(service.published().await.links.len(), 1);
    }

    #[tokio::test]
    async fn failed_save_keeps_edit_in_session() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(&store, SavePolicy::Immediate);
        let (token, _) = service.login("pw").await.unwrap();

        store.set_offline(true);
        let response = service.apply_edit(token, &add("a")).await.unwrap();
        assert!(matches!(response.persistence, Persistence::Failed { .. }));

        let view = service.session_view(token).unwrap();
        assert_eq!(view.snapshot.links.len(), 1);
        assert!(view.dirty);
        assert!(service.published().await.links.is_empty());

        assert!(service.save_session(token).await.is_err());

        store.set_offline(false);
        service.save_session(token).await.unwrap();
        assert!(!service.session_view(token).unwrap().dirty);
    }

    #[tokio::test]
    async fn wrong_password_opens_no_session() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(&store, SavePolicy::Immediate);
        assert!(matches!(
            service.login("nope").await,
            Err(ApiError::Unauthorized(_))
        ));
        assert_eq!(service.session_count(), 0);
    }

    #[tokio::test]
    async fn logout_invalidates_token() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(&store, SavePolicy::Immediate);
        let (token, _) = service.login("pw").await.unwrap();
        assert!(service.logout(token));
        assert!(service.session_view(token).is_err());
        assert!(!service.logout(token));
    }

    #[tokio::test]
    async fn icon_upload_sets_data_url() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(&store, SavePolicy::Explicit);
        let (token, _) = service.login("pw").await.unwrap();
        let response = service
            .upload_icon(token, "image/png", &[0x89, 0x50, 0x4e, 0x47])
            .await
            .unwrap();
        assert_eq!(
            response.snapshot.profile.user_icon,
            "data:image/png;base64,iVBORw=="
        );
    }

    /// Store whose first upsert waits until `release` is notified.
    struct HeldStore {
        inner: InMemoryStore,
        hold_next: AtomicBool,
        held: Notify,
        release: Notify,
    }

    impl HeldStore {
        fn new() -> Self {
            HeldStore {
                inner: InMemoryStore::new(),
                hold_next: AtomicBool::new(true),
                held: Notify::new(),
                release: Notify::new(),
            }
        }

        fn stored_links(&self) -> usize {
            self.inner
                .stored()
                .and_then(|record| record.links)
                .and_then(|links| links.as_array().map(Vec::len))
                .unwrap_or(0)
        }
    }

    #[async_trait]
    impl SnapshotStore for HeldStore {
        async fn fetch(&self) -> Result<ProfileRecord, StorageError> {
            self.inner.fetch().await
        }

        async fn upsert(&self, record: &ProfileRecord) -> Result<(), StorageError> {
            if self.hold_next.swap(false, AtomicOrdering::SeqCst) {
                self.held.notify_one();
                self.release.notified().await;
            }
            self.inner.upsert(record).await
        }

        fn backend(&self) -> &'static str {
            "held"
        }
    }

    #[tokio::test]
    async fn late_older_save_leaves_session_dirty() {
        let store = Arc::new(HeldStore::new());
        let client = SnapshotClient::new(store.clone(), LinkEncoding::Json);
        let service = Arc::new(ProfileService::new(
            client,
            AuthGate::new("pw"),
            SavePolicy::Immediate,
        ));
        let (token, _) = service.login("pw").await.unwrap();

        let first = tokio::spawn({
            let service = service.clone();
            async move { service.apply_edit(token, &add("a")).await }
        });
        store.held.notified().await;

        let second = service.apply_edit(token, &add("b")).await.unwrap();
        assert_eq!(second.persistence, Persistence::Saved);
        assert!(!second.dirty);
        assert_eq!(store.stored_links(), 2);

        store.release.notify_one();
        let first = first.await.unwrap().unwrap();
        assert_eq!(first.persistence, Persistence::Saved);
        assert!(first.dirty);

        // The store went back to one link; the session must say so.
        assert_eq!(store.stored_links(), 1);
        let view = service.session_view(token).unwrap();
        assert_eq!(view.snapshot.links.len(), 2);
        assert!(view.dirty);
        assert_eq!(service.published().await.links.len(), 2);

        let resaved = service.save_session(token).await.unwrap();
        assert!(!resaved.dirty);
        assert_eq!(store.stored_links(), 2);
        assert!(!service.session_view(token).unwrap().dirty);
    }

    #[tokio::test]
    async fn in_order_saves_clear_dirty() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(&store, SavePolicy::Explicit);
        let (token, _) = service.login("pw").await.unwrap();

        service.apply_edit(token, &add("a")).await.unwrap();
        service.save_session(token).await.unwrap();
        service.apply_edit(token, &add("b")).await.unwrap();
        let saved = service.save_session(token).await.unwrap();

        assert!(!saved.dirty);
        assert_eq!(service.published().await.links.len(), 2);
    }

    #[tokio::test]
    async fn login_past_cap_drops_least_recent_session() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(&store, SavePolicy::Immediate).with_session_limits(SessionLimits {
            max_sessions: 2,
            idle_timeout: Duration::from_secs(3600),
        });
        let (a, _) = service.login("pw").await.unwrap();
        let (b, _) = service.login("pw").await.unwrap();
        service.session_view(a).unwrap();

        let (c, _) = service.login("pw").await.unwrap();
        assert_eq!(service.session_count(), 2);
        assert!(service.session_view(a).is_ok());
        assert!(service.session_view(b).is_err());
        assert!(service.session_view(c).is_ok());
    }

    #[tokio::test]
    async fn idle_sessions_are_dropped_at_login() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(&store, SavePolicy::Immediate).with_session_limits(SessionLimits {
            max_sessions: 8,
            idle_timeout: Duration::ZERO,
        });
        let (a, _) = service.login("pw").await.unwrap();
        let (b, _) = service.login("pw").await.unwrap();
        assert_eq!(service.session_count(), 1);
        assert!(service.session_view(a).is_err());
        assert!(service.session_view(b).is_ok());
    }

    #[test]
    fn non_image_upload_is_rejected() {
        assert!(matches!(
            icon_data_url("text/plain", b"hi"),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            icon_data_url("image/png", b""),
            Err(ApiError::BadRequest(_))
        ));
    }
}
