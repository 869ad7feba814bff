use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::{Challenge, Verdict};

/// In-memory challenges keyed by normalized phone. Cloning shares the same map.
#[derive(Clone)]
pub struct OtpStore {
    challenges: Arc<RwLock<HashMap<String, Challenge>>>,
    max_entries: usize,
}

impl OtpStore {
    pub fn new(max_entries: usize) -> Self {
        Self {
            challenges: Arc::new(RwLock::new(HashMap::new())),
            max_entries: max_entries.max(1),
        }
    }

    /// Upserts the challenge for its phone key, replacing any earlier one.
    ///
    /// When a new key would exceed `max_entries`, expired entries are swept
    /// first and then the entry closest to expiry is evicted.
    pub async fn put(&self, challenge: Challenge) {
        let mut challenges = self.challenges.write().await;

        if !challenges.contains_key(&challenge.phone_key) && challenges.len() >= self.max_entries {
            let now = challenge.issued_at;
            challenges.retain(|_, c| !c.is_expired(now));

            if challenges.len() >= self.max_entries
                && let Some(oldest) = challenges
                    .values()
                    .min_by_key(|c| c.expires_at)
                    .map(|c| c.phone_key.clone())
            {
                log::warn!("OTP store full ({} entries), evicting oldest challenge", self.max_entries);
                challenges.remove(&oldest);
            }
        }

        challenges.insert(challenge.phone_key.clone(), challenge);
    }

    pub async fn get(&self, phone_key: &str) -> Option<Challenge> {
        self.challenges.read().await.get(phone_key).cloned()
    }

    pub async fn remove(&self, phone_key: &str) {
        self.challenges.write().await.remove(phone_key);
    }

    /// 校验验证码，成功即删除（一次性）
    ///
    /// The lookup, comparison and removal happen under one write lock, so two
    /// concurrent checks of the same code cannot both be accepted.
    pub async fn check_and_consume(&self, phone_key: &str, code: &str, now: DateTime<Utc>) -> Verdict {
        let mut challenges = self.challenges.write().await;

        let Some(challenge) = challenges.get(phone_key) else {
            return Verdict::Missing;
        };

        if challenge.is_expired(now) {
            challenges.remove(phone_key);
            return Verdict::Expired;
        }

        if challenge.code != code {
            return Verdict::Mismatch;
        }

        challenges.remove(phone_key);
        Verdict::Accepted
    }

    /// Removes every expired challenge and returns how many were dropped.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let mut challenges = self.challenges.write().await;
        let before = challenges.len();
        challenges.retain(|_, c| !c.is_expired(now));
        before - challenges.len()
    }

    pub async fn len(&self) -> usize {
        self.challenges.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.challenges.read().await.is_empty()
    }
}
