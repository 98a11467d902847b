//! Session domain entity

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// Server-side record of per-client state, bound to the client by its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    id: String,

    /// Handler-owned key/value data
    pub data: HashMap<String, Value>,

    // Lifecycle
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Session {
    /// Start a session at `now` that lives for `max_age`.
    pub fn new(id: impl Into<String>, now: DateTime<Utc>, max_age: Duration) -> Self {
        Self {
            id: id.into(),
            data: HashMap::new(),
            created_at: now,
            updated_at: now,
            expires_at: deadline(now, max_age),
        }
    }

    /// Random, unguessable session id (UUID v4).
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Remaining lifetime; negative once expired.
    pub fn time_to_live(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at - now
    }

    /// Mark the session as modified.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    /// Push the expiry to `now + max_age`.
    pub fn extend(&mut self, now: DateTime<Utc>, max_age: Duration) {
        self.expires_at = deadline(now, max_age);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let previous = self.data.insert(key.into(), value);
        self.touch(Utc::now());
        previous
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.data.remove(key);
        self.touch(Utc::now());
        removed
    }
}

/// `now + max_age`, clamped to the latest representable instant.
fn deadline(now: DateTime<Utc>, max_age: Duration) -> DateTime<Utc> {
    now.checked_add_signed(max_age)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_session_derives_expiry_from_max_age() {
        let now = Utc::now();
        let session = Session::new("abc", now, Duration::minutes(30));

        assert_eq!(session.id(), "abc");
        assert_eq!(session.created_at(), now);
        assert_eq!(session.updated_at(), now);
        assert_eq!(session.expires_at(), now + Duration::minutes(30));
        assert!(session.data.is_empty());
        assert!(!session.is_expired_at(now));
    }

    #[test]
    fn session_is_expired_at_deadline() {
        let now = Utc::now();
        let session = Session::new("abc", now, Duration::seconds(2));

        assert!(!session.is_expired_at(now + Duration::seconds(1)));
        assert!(session.is_expired_at(now + Duration::seconds(2)));
        assert!(session.is_expired_at(now + Duration::seconds(3)));
    }

    #[test]
    fn extend_moves_expiry_but_not_creation() {
        let created = Utc::now() - Duration::minutes(10);
        let mut session = Session::new("abc", created, Duration::minutes(15));
        let before = session.expires_at();

        let now = Utc::now();
        session.extend(now, Duration::minutes(15));

        assert!(session.expires_at() > before);
        assert_eq!(session.created_at(), created);
    }

    #[test]
    fn huge_max_age_saturates_instead_of_overflowing() {
        let now = Utc::now();
        let mut session = Session::new("abc", now, Duration::MAX);
        assert_eq!(session.expires_at(), DateTime::<Utc>::MAX_UTC);
        assert!(!session.is_expired_at(now));

        session.extend(now, Duration::seconds(100_000_000_000_000));
        assert_eq!(session.expires_at(), DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = Session::generate_id();
        let b = Session::generate_id();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }

    #[test]
    fn json_uses_snake_case_fields() {
        let mut session = Session::new("abc", Utc::now(), Duration::hours(1));
        session.insert("user", json!({"name": "alice"}));

        let encoded = serde_json::to_value(&session).unwrap();
        assert!(encoded.get("created_at").is_some());
        assert!(encoded.get("expires_at").is_some());
        assert_eq!(encoded["data"]["user"]["name"], "alice");

        let decoded: Session = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, session);
    }
}
