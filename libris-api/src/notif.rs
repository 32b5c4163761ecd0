use uuid::Uuid;

use crate::{CommentId, ForumId, Time, STUB_UUID};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NotificationId(pub Uuid);

impl NotificationId {
    pub fn stub() -> NotificationId {
        NotificationId(STUB_UUID)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub created_at: Time,
    pub read: bool,
}

/// Report filed against a comment, sent over REST (moderation is
/// entirely server-side).
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Report {
    pub forum: ForumId,
    pub comment_id: CommentId,
    pub reason: String,
}
