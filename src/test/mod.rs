//! In-memory doubles for the repository traits and the push publisher, shared by
//! the service tests.
use std::collections::HashMap;
use std::sync::{Mutex, Once};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    api::error,
    configs::CacheStore,
    modules::{
        activity::{repository::ActivityRepository, schema::ActivityCursorEntity},
        basic_info::{
            model::BasicInfoModel, repository::BasicInfoRepository, schema::BasicInfoEntity,
        },
        friend::{
            model::{FriendSnapshot, UpdateFriendFlags},
            repository::{FriendRepo, FriendRepository, FriendRequestRepository},
            schema::{FriendEdgeEntity, FriendRequestEntity, FriendRequestStatus},
        },
        prompt::{
            repository::PromptRepository,
            schema::{PromptEntity, PromptResponseEntity},
        },
        report::{repository::ReportRepository, schema::ReportEntity},
        saved_message::{repository::SavedMessageRepository, schema::SavedMessageEntity},
        user::{
            model::{InsertUser, UpdateProfile},
            repository::UserRepository,
            schema::{UserEntity, UserRole},
        },
        websocket::{message::ServerMessage, publisher::EventPublisher},
    },
};

#[derive(Default, Clone)]
struct State {
    clock: Option<DateTime<Utc>>,
    users: HashMap<Uuid, UserEntity>,
    basic_info: HashMap<Uuid, BasicInfoEntity>,
    /// (owner_id, friend_id)
    edges: HashMap<(Uuid, Uuid), FriendEdgeEntity>,
    /// (to_user_id, from_user_id)
    requests: HashMap<(Uuid, Uuid), FriendRequestEntity>,
    prompt: Option<PromptEntity>,
    responses: HashMap<Uuid, PromptResponseEntity>,
    cursors: HashMap<Uuid, ActivityCursorEntity>,
    saved: HashMap<Uuid, SavedMessageEntity>,
    reports: Vec<ReportEntity>,
    fail_next_edge_write: bool,
}

impl State {
    /// Wall-clock time, nudged so that successive writes never share a timestamp.
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.clock {
            Some(last) if last >= now => last + chrono::Duration::nanoseconds(1),
            _ => now,
        };
        self.clock = Some(next);
        next
    }

    fn insert_edge(&mut self, owner_id: Uuid, friend: &FriendSnapshot) -> bool {
        if let Some(edge) = self.edges.get_mut(&(owner_id, friend.id)) {
            edge.username = friend.username.clone();
            edge.profile_image_url = friend.profile_image_url.clone();
            return false;
        }

        let created_at = self.tick();
        self.edges.insert(
            (owner_id, friend.id),
            FriendEdgeEntity {
                owner_id,
                friend_id: friend.id,
                username: friend.username.clone(),
                profile_image_url: friend.profile_image_url.clone(),
                is_pinned: false,
                is_muted: false,
                created_at,
            },
        );
        true
    }

    fn snapshot(&self, id: &Uuid) -> Option<FriendSnapshot> {
        self.users.get(id).map(FriendSnapshot::from)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    fn with_state<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut state)
    }

    pub fn add_user(&self, username: &str) -> Uuid {
        self.with_state(|state| {
            let now = state.tick();
            let id = Uuid::now_v7();
            state.users.insert(
                id,
                UserEntity {
                    id,
                    email: format!("{}@example.com", username.to_lowercase()),
                    username: username.to_string(),
                    hash_password: String::new(),
                    role: UserRole::User,
                    profile_image_url: None,
                    fcm_token: None,
                    has_posted: false,
                    latest_message_timestamp: None,
                    created_at: now,
                    updated_at: now,
                },
            );
            id
        })
    }

    /// Writes both edges directly, bypassing the request mailbox.
    pub fn befriend(&self, a: Uuid, b: Uuid) {
        self.with_state(|state| {
            let (Some(snap_a), Some(snap_b)) = (state.snapshot(&a), state.snapshot(&b)) else {
                panic!("befriend: unknown user");
            };
            state.insert_edge(a, &snap_b);
            state.insert_edge(b, &snap_a);
        });
    }

    pub fn snapshot(&self, id: Uuid) -> FriendSnapshot {
        self.with_state(|state| state.snapshot(&id)).expect("snapshot: unknown user")
    }

    pub fn edge_count(&self) -> usize {
        self.with_state(|state| state.edges.len())
    }

    /// Makes the next atomic accept fail halfway through its writes.
    pub fn fail_next_edge_write(&self) {
        self.with_state(|state| state.fail_next_edge_write = true);
    }
}

#[async_trait::async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError> {
        Ok(self.with_state(|state| state.users.get(id).cloned()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, error::SystemError> {
        let email = email.to_lowercase();
        Ok(self.with_state(|state| {
            state.users.values().find(|u| u.email.to_lowercase() == email).cloned()
        }))
    }

    async fn create(&self, user: &InsertUser) -> Result<Uuid, error::SystemError> {
        self.with_state(|state| {
            let taken = state.users.values().any(|u| {
                u.username.eq_ignore_ascii_case(&user.username)
                    || u.email.eq_ignore_ascii_case(&user.email)
            });
            if taken {
                return Err(error::SystemError::conflict("Username or email already exists"));
            }

            let now = state.tick();
            let id = Uuid::now_v7();
            state.users.insert(
                id,
                UserEntity {
                    id,
                    email: user.email.clone(),
                    username: user.username.clone(),
                    hash_password: user.hash_password.clone(),
                    role: UserRole::User,
                    profile_image_url: None,
                    fcm_token: None,
                    has_posted: false,
                    latest_message_timestamp: None,
                    created_at: now,
                    updated_at: now,
                },
            );
            Ok(id)
        })
    }

    async fn update_profile(
        &self,
        id: &Uuid,
        update: &UpdateProfile,
    ) -> Result<UserEntity, error::SystemError> {
        self.with_state(|state| {
            let now = state.tick();
            let user = state
                .users
                .get_mut(id)
                .ok_or_else(|| error::SystemError::not_found("User not found"))?;

            if let Some(username) = &update.username {
                user.username = username.clone();
            }
            if let Some(url) = &update.profile_image_url {
                user.profile_image_url = url.clone();
            }
            user.updated_at = now;
            Ok(user.clone())
        })
    }

    async fn set_fcm_token(&self, id: &Uuid, token: &str) -> Result<(), error::SystemError> {
        self.with_state(|state| match state.users.get_mut(id) {
            Some(user) => {
                user.fcm_token = Some(token.to_string());
                Ok(())
            }
            None => Err(error::SystemError::not_found("User not found")),
        })
    }

    async fn set_has_posted(&self, id: &Uuid, has_posted: bool) -> Result<(), error::SystemError> {
        self.with_state(|state| {
            if let Some(user) = state.users.get_mut(id) {
                user.has_posted = has_posted;
            }
        });
        Ok(())
    }

    async fn reset_has_posted_all(&self) -> Result<u64, error::SystemError> {
        Ok(self.with_state(|state| {
            let mut count = 0;
            for user in state.users.values_mut().filter(|u| u.has_posted) {
                user.has_posted = false;
                count += 1;
            }
            count
        }))
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        Ok(self.with_state(|state| {
            if state.users.remove(id).is_none() {
                return false;
            }
            state.basic_info.remove(id);
            state.edges.retain(|(owner, friend), _| owner != id && friend != id);
            state.requests.retain(|(to, from), _| to != id && from != id);
            state.responses.retain(|_, r| r.user_id != *id);
            state.cursors.remove(id);
            state.saved.retain(|_, m| !m.involves(id));
            state.reports.retain(|r| r.reporter_id != *id && r.reported_user_id != *id);
            true
        }))
    }

    async fn search_users(
        &self,
        query: &str,
        limit: i64,
    ) -> Result<Vec<UserEntity>, error::SystemError> {
        let query = query.to_lowercase();
        Ok(self.with_state(|state| {
            let mut users: Vec<_> = state
                .users
                .values()
                .filter(|u| u.username.to_lowercase().contains(&query))
                .cloned()
                .collect();
            users.sort_by(|a, b| a.username.cmp(&b.username));
            users.truncate(limit.max(0) as usize);
            users
        }))
    }
}

#[async_trait::async_trait]
impl FriendRepository for MemoryStore {
    async fn find_edge(
        &self,
        owner_id: &Uuid,
        friend_id: &Uuid,
    ) -> Result<Option<FriendEdgeEntity>, error::SystemError> {
        Ok(self.with_state(|state| state.edges.get(&(*owner_id, *friend_id)).cloned()))
    }

    async fn find_friends(
        &self,
        owner_id: &Uuid,
    ) -> Result<Vec<FriendEdgeEntity>, error::SystemError> {
        Ok(self.with_state(|state| {
            state.edges.values().filter(|e| e.owner_id == *owner_id).cloned().collect()
        }))
    }

    async fn find_friend_ids(&self, owner_id: &Uuid) -> Result<Vec<Uuid>, error::SystemError> {
        Ok(self.with_state(|state| {
            state.edges.keys().filter(|(owner, _)| owner == owner_id).map(|(_, f)| *f).collect()
        }))
    }

    async fn find_edges_to(
        &self,
        friend_id: &Uuid,
    ) -> Result<Vec<FriendEdgeEntity>, error::SystemError> {
        Ok(self.with_state(|state| {
            state.edges.values().filter(|e| e.friend_id == *friend_id).cloned().collect()
        }))
    }

    async fn upsert_edge(
        &self,
        owner_id: &Uuid,
        friend: &FriendSnapshot,
    ) -> Result<bool, error::SystemError> {
        Ok(self.with_state(|state| state.insert_edge(*owner_id, friend)))
    }

    async fn delete_edge(
        &self,
        owner_id: &Uuid,
        friend_id: &Uuid,
    ) -> Result<bool, error::SystemError> {
        Ok(self.with_state(|state| state.edges.remove(&(*owner_id, *friend_id)).is_some()))
    }

    async fn delete_friendship(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<bool, error::SystemError> {
        Ok(self.with_state(|state| {
            let ab = state.edges.remove(&(*user_id_a, *user_id_b)).is_some();
            let ba = state.edges.remove(&(*user_id_b, *user_id_a)).is_some();
            ab || ba
        }))
    }

    async fn update_flags(
        &self,
        owner_id: &Uuid,
        friend_id: &Uuid,
        flags: &UpdateFriendFlags,
    ) -> Result<Option<FriendEdgeEntity>, error::SystemError> {
        Ok(self.with_state(|state| {
            let edge = state.edges.get_mut(&(*owner_id, *friend_id))?;
            if let Some(pinned) = flags.is_pinned {
                edge.is_pinned = pinned;
            }
            if let Some(muted) = flags.is_muted {
                edge.is_muted = muted;
            }
            Some(edge.clone())
        }))
    }

    async fn propagate_profile(
        &self,
        snapshot: &FriendSnapshot,
    ) -> Result<u64, error::SystemError> {
        Ok(self.with_state(|state| {
            let mut copies = 0;
            for edge in state.edges.values_mut().filter(|e| e.friend_id == snapshot.id) {
                edge.username = snapshot.username.clone();
                edge.profile_image_url = snapshot.profile_image_url.clone();
                copies += 1;
            }
            for request in state.requests.values_mut().filter(|r| r.from_user_id == snapshot.id)
            {
                request.username = snapshot.username.clone();
                request.profile_image_url = snapshot.profile_image_url.clone();
                copies += 1;
            }
            copies
        }))
    }
}

#[async_trait::async_trait]
impl FriendRequestRepository for MemoryStore {
    async fn find_request(
        &self,
        to_user_id: &Uuid,
        from_user_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        Ok(self.with_state(|state| state.requests.get(&(*to_user_id, *from_user_id)).cloned()))
    }

    async fn find_requests_to(
        &self,
        to_user_id: &Uuid,
    ) -> Result<Vec<FriendRequestEntity>, error::SystemError> {
        Ok(self.with_state(|state| {
            let mut requests: Vec<_> =
                state.requests.values().filter(|r| r.to_user_id == *to_user_id).cloned().collect();
            requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            requests
        }))
    }

    async fn create_request(
        &self,
        to_user_id: &Uuid,
        sender: &FriendSnapshot,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        self.with_state(|state| {
            let key = (*to_user_id, sender.id);
            let pending = state.requests.contains_key(&key)
                || state.requests.contains_key(&(sender.id, *to_user_id));
            if pending {
                return Err(error::SystemError::conflict("Record already exists"));
            }

            let request = FriendRequestEntity {
                to_user_id: *to_user_id,
                from_user_id: sender.id,
                username: sender.username.clone(),
                profile_image_url: sender.profile_image_url.clone(),
                status: FriendRequestStatus::Pending,
                created_at: state.tick(),
            };
            state.requests.insert(key, request.clone());
            Ok(request)
        })
    }

    async fn delete_request(
        &self,
        to_user_id: &Uuid,
        from_user_id: &Uuid,
    ) -> Result<bool, error::SystemError> {
        Ok(self.with_state(|state| state.requests.remove(&(*to_user_id, *from_user_id)).is_some()))
    }
}

#[async_trait::async_trait]
impl FriendRepo for MemoryStore {
    /// Works on a copy of the state and swaps it in only when every write succeeded.
    async fn accept_friend_request_atomic(
        &self,
        receiver: &FriendSnapshot,
        sender: &FriendSnapshot,
    ) -> Result<FriendEdgeEntity, error::SystemError> {
        self.with_state(|state| {
            let mut tx = state.clone();

            if tx.requests.remove(&(receiver.id, sender.id)).is_none() {
                return Err(error::SystemError::not_found("Friend request not found"));
            }

            tx.insert_edge(receiver.id, sender);

            if state.fail_next_edge_write {
                state.fail_next_edge_write = false;
                return Err(error::SystemError::DatabaseError("edge write failed".into()));
            }

            tx.insert_edge(sender.id, receiver);

            let edge = tx
                .edges
                .get(&(receiver.id, sender.id))
                .cloned()
                .ok_or_else(|| error::SystemError::not_found("Friend not found"))?;

            *state = tx;
            Ok(edge)
        })
    }
}

#[async_trait::async_trait]
impl PromptRepository for MemoryStore {
    async fn find_current_prompt(&self) -> Result<Option<PromptEntity>, error::SystemError> {
        Ok(self.with_state(|state| state.prompt.clone()))
    }

    async fn set_current_prompt(&self, text: &str) -> Result<PromptEntity, error::SystemError> {
        Ok(self.with_state(|state| {
            let prompt = PromptEntity { text: text.to_string(), updated_at: state.tick() };
            state.prompt = Some(prompt.clone());
            prompt
        }))
    }

    async fn create_response(
        &self,
        user_id: &Uuid,
        text: &str,
    ) -> Result<PromptResponseEntity, error::SystemError> {
        Ok(self.with_state(|state| {
            let response = PromptResponseEntity {
                id: Uuid::now_v7(),
                user_id: *user_id,
                text: text.to_string(),
                likes: 0,
                liked_by: vec![],
                created_at: state.tick(),
            };
            state.responses.insert(response.id, response.clone());
            response
        }))
    }

    async fn find_response_by_id(
        &self,
        id: &Uuid,
    ) -> Result<Option<PromptResponseEntity>, error::SystemError> {
        Ok(self.with_state(|state| state.responses.get(id).cloned()))
    }

    async fn delete_response(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        Ok(self.with_state(|state| state.responses.remove(id).is_some()))
    }

    async fn find_latest_responses(
        &self,
        user_ids: &[Uuid],
    ) -> Result<Vec<PromptResponseEntity>, error::SystemError> {
        Ok(self.with_state(|state| {
            let mut latest: HashMap<Uuid, &PromptResponseEntity> = HashMap::new();
            for response in state.responses.values().filter(|r| user_ids.contains(&r.user_id)) {
                let entry = latest.entry(response.user_id).or_insert(response);
                if response.created_at > entry.created_at {
                    *entry = response;
                }
            }
            latest.into_values().cloned().collect()
        }))
    }

    async fn find_responses_since(
        &self,
        user_ids: &[Uuid],
        since: &DateTime<Utc>,
    ) -> Result<Vec<PromptResponseEntity>, error::SystemError> {
        Ok(self.with_state(|state| {
            state
                .responses
                .values()
                .filter(|r| user_ids.contains(&r.user_id) && r.created_at > *since)
                .cloned()
                .collect()
        }))
    }

    async fn toggle_like(
        &self,
        response_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<Option<PromptResponseEntity>, error::SystemError> {
        Ok(self.with_state(|state| {
            let response = state.responses.get_mut(response_id)?;
            if let Some(pos) = response.liked_by.iter().position(|id| id == user_id) {
                response.liked_by.remove(pos);
                response.likes -= 1;
            } else {
                response.liked_by.push(*user_id);
                response.likes += 1;
            }
            Some(response.clone())
        }))
    }
}

#[async_trait::async_trait]
impl ActivityRepository for MemoryStore {
    async fn find_cursor(
        &self,
        user_id: &Uuid,
    ) -> Result<Option<ActivityCursorEntity>, error::SystemError> {
        Ok(self.with_state(|state| state.cursors.get(user_id).cloned()))
    }

    async fn save_cursor(&self, cursor: &ActivityCursorEntity) -> Result<bool, error::SystemError> {
        Ok(self.with_state(|state| {
            let stored = state.cursors.get(&cursor.user_id).map_or(0, |c| c.version);
            if stored != cursor.version {
                return false;
            }
            let next = ActivityCursorEntity { version: cursor.version + 1, ..cursor.clone() };
            state.cursors.insert(cursor.user_id, next);
            true
        }))
    }
}

#[async_trait::async_trait]
impl BasicInfoRepository for MemoryStore {
    async fn find_by_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Option<BasicInfoEntity>, error::SystemError> {
        Ok(self.with_state(|state| state.basic_info.get(user_id).cloned()))
    }

    async fn upsert(
        &self,
        user_id: &Uuid,
        info: &BasicInfoModel,
    ) -> Result<BasicInfoEntity, error::SystemError> {
        Ok(self.with_state(|state| {
            let entity = BasicInfoEntity {
                user_id: *user_id,
                bio: info.bio.clone(),
                age: info.age,
                pronouns: info.pronouns.clone(),
                location: info.location.clone(),
                updated_at: state.tick(),
            };
            state.basic_info.insert(*user_id, entity.clone());
            entity
        }))
    }
}

#[async_trait::async_trait]
impl SavedMessageRepository for MemoryStore {
    async fn create(
        &self,
        message: &SavedMessageEntity,
    ) -> Result<SavedMessageEntity, error::SystemError> {
        self.with_state(|state| {
            if state.saved.contains_key(&message.id) {
                return Err(error::SystemError::conflict("Record already exists"));
            }
            state.saved.insert(message.id, message.clone());
            Ok(message.clone())
        })
    }

    async fn find_by_id(
        &self,
        id: &Uuid,
    ) -> Result<Option<SavedMessageEntity>, error::SystemError> {
        Ok(self.with_state(|state| state.saved.get(id).cloned()))
    }

    async fn find_between(
        &self,
        user_a: &Uuid,
        user_b: &Uuid,
        from: &DateTime<Utc>,
        to: &DateTime<Utc>,
    ) -> Result<Vec<SavedMessageEntity>, error::SystemError> {
        Ok(self.with_state(|state| {
            let mut messages: Vec<_> = state
                .saved
                .values()
                .filter(|m| {
                    ((m.from_user_id == *user_a && m.to_user_id == *user_b)
                        || (m.from_user_id == *user_b && m.to_user_id == *user_a))
                        && m.sent_at >= *from
                        && m.sent_at < *to
                })
                .cloned()
                .collect();
            messages.sort_by(|a, b| a.sent_at.cmp(&b.sent_at));
            messages
        }))
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        Ok(self.with_state(|state| state.saved.remove(id).is_some()))
    }
}

#[async_trait::async_trait]
impl ReportRepository for MemoryStore {
    async fn create(&self, report: &ReportEntity) -> Result<ReportEntity, error::SystemError> {
        Ok(self.with_state(|state| {
            let report = ReportEntity { created_at: state.tick(), ..report.clone() };
            state.reports.push(report.clone());
            report
        }))
    }

    async fn find_by_reporter(
        &self,
        reporter_id: &Uuid,
    ) -> Result<Vec<ReportEntity>, error::SystemError> {
        Ok(self.with_state(|state| {
            let mut reports: Vec<_> =
                state.reports.iter().filter(|r| r.reporter_id == *reporter_id).cloned().collect();
            reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            reports
        }))
    }

    async fn find_all(&self) -> Result<Vec<ReportEntity>, error::SystemError> {
        Ok(self.with_state(|state| {
            let mut reports = state.reports.clone();
            reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            reports
        }))
    }
}

/// Fills the variables `ENV` requires before anything reads it.
pub fn init_env() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        for (key, value) in [
            ("SECRET_KEY", "test-secret"),
            ("DATABASE_URL", "postgres://localhost/test"),
            ("REDIS_URL", "redis://127.0.0.1:6379"),
        ] {
            if std::env::var(key).is_err() {
                std::env::set_var(key, value);
            }
        }
    });
}

/// Cache without expiry.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryCache {
    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).contains_key(key)
    }
}

#[async_trait::async_trait]
impl CacheStore for MemoryCache {
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, error::SystemError> {
        Ok(self.entries.lock().unwrap_or_else(|p| p.into_inner()).get(key).cloned())
    }

    async fn set_bytes(
        &self,
        key: &str,
        value: Vec<u8>,
        _expiration: usize,
    ) -> Result<(), error::SystemError> {
        self.entries.lock().unwrap_or_else(|p| p.into_inner()).insert(key.to_string(), value);
        Ok(())
    }

    async fn take_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, error::SystemError> {
        Ok(self.entries.lock().unwrap_or_else(|p| p.into_inner()).remove(key))
    }

    async fn delete(&self, key: &str) -> Result<(), error::SystemError> {
        self.entries.lock().unwrap_or_else(|p| p.into_inner()).remove(key);
        Ok(())
    }
}

/// Captures every frame a service publishes.
#[derive(Default)]
pub struct RecordingPublisher {
    sent: Mutex<Vec<(Uuid, ServerMessage)>>,
}

impl RecordingPublisher {
    pub fn messages_for(&self, user_id: Uuid) -> Vec<ServerMessage> {
        let sent = self.sent.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        sent.iter().filter(|(to, _)| *to == user_id).map(|(_, msg)| msg.clone()).collect()
    }
}

impl EventPublisher for RecordingPublisher {
    fn send_to_user(&self, user_id: Uuid, message: ServerMessage) {
        let mut sent = self.sent.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        sent.push((user_id, message));
    }

    fn send_to_users(&self, user_ids: Vec<Uuid>, message: ServerMessage) {
        for user_id in user_ids {
            self.send_to_user(user_id, message.clone());
        }
    }
}
