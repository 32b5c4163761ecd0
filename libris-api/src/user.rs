use uuid::Uuid;

use crate::{Time, STUB_UUID};

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn stub() -> UserId {
        UserId(STUB_UUID)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub url_avatar: Option<String>,
    pub forum_interaction_banned: bool,
    /// None on a banned user means the ban is permanent
    pub forum_ban_expires_at: Option<Time>,
}

/// Derived per check, never stored: the two profile fields are the only
/// authoritative ban state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BanStatus {
    NotBanned,
    Banned { expires_at: Option<Time> },
}

impl User {
    pub fn new(id: UserId, full_name: String) -> User {
        User {
            id,
            full_name,
            url_avatar: None,
            forum_interaction_banned: false,
            forum_ban_expires_at: None,
        }
    }

    pub fn ban_status(&self, now: Time) -> BanStatus {
        if !self.forum_interaction_banned {
            return BanStatus::NotBanned;
        }
        match self.forum_ban_expires_at {
            None => BanStatus::Banned { expires_at: None },
            Some(t) if t > now => BanStatus::Banned {
                expires_at: Some(t),
            },
            Some(_) => BanStatus::NotBanned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn banned_user(expires_at: Option<Time>) -> User {
        User {
            forum_interaction_banned: true,
            forum_ban_expires_at: expires_at,
            ..User::new(UserId::stub(), String::from("Ban Tester"))
        }
    }

    #[test]
    fn permanent_ban_ignores_clock() {
        let u = banned_user(None);
        assert_eq!(
            u.ban_status(Utc::now()),
            BanStatus::Banned { expires_at: None },
        );
        assert_eq!(
            u.ban_status(Utc::now() + Duration::days(365 * 100)),
            BanStatus::Banned { expires_at: None },
        );
    }

    #[test]
    fn expired_ban_is_lifted() {
        let past = Utc::now() - Duration::hours(1);
        assert_eq!(banned_user(Some(past)).ban_status(Utc::now()), BanStatus::NotBanned);
    }

    #[test]
    fn future_ban_is_active() {
        let future = Utc::now() + Duration::hours(1);
        assert_eq!(
            banned_user(Some(future)).ban_status(Utc::now()),
            BanStatus::Banned {
                expires_at: Some(future)
            },
        );
    }

    #[test]
    fn unbanned_flag_wins_over_expiry() {
        let mut u = banned_user(Some(Utc::now() + Duration::hours(1)));
        u.forum_interaction_banned = false;
        assert_eq!(u.ban_status(Utc::now()), BanStatus::NotBanned);
    }
}
