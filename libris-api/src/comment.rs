use uuid::Uuid;

use crate::{Time, User, STUB_UUID};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentId(pub Uuid);

impl CommentId {
    pub fn stub() -> CommentId {
        CommentId(STUB_UUID)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ReplyId(pub Uuid);

impl ReplyId {
    pub fn stub() -> ReplyId {
        ReplyId(STUB_UUID)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Reply {
    pub id: ReplyId,
    pub user: User,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: Time,
    pub like_count: i64,
    pub liked_by_me: bool,
}

/// Client-held mirror of one forum comment. Replies are newest-first,
/// nested under exactly one comment.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub user: User,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: Time,
    pub like_count: i64,
    pub liked_by_me: bool,
    pub replies: Vec<Reply>,
}

impl Comment {
    pub fn new(id: CommentId, user: User, content: String, image_url: Option<String>) -> Comment {
        Comment {
            id,
            user,
            content,
            image_url,
            created_at: chrono::Utc::now(),
            like_count: 0,
            liked_by_me: false,
            replies: Vec::new(),
        }
    }

    pub fn patch(&mut self, content: String, image_url: Option<String>) {
        self.content = content;
        self.image_url = image_url;
    }

    pub fn reply_mut(&mut self, id: &ReplyId) -> Option<&mut Reply> {
        self.replies.iter_mut().find(|r| r.id == *id)
    }
}

impl Reply {
    pub fn new(id: ReplyId, user: User, content: String, image_url: Option<String>) -> Reply {
        Reply {
            id,
            user,
            content,
            image_url,
            created_at: chrono::Utc::now(),
            like_count: 0,
            liked_by_me: false,
        }
    }

    pub fn patch(&mut self, content: String, image_url: Option<String>) {
        self.content = content;
        self.image_url = image_url;
    }
}
