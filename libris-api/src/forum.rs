use uuid::Uuid;

use crate::STUB_UUID;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize)]
pub struct ForumId(pub Uuid);

impl ForumId {
    pub fn stub() -> ForumId {
        ForumId(STUB_UUID)
    }
}

/// A discussion thread scoped to one book.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Forum {
    pub id: ForumId,
    pub book_id: u64,
    pub name: String,
    pub member_count: i64,
    pub comment_count: i64,
}

/// Per-forum like/save state, independent of the comment list. Fetched
/// once per view and replaced wholesale by toggle responses.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ForumInteraction {
    pub is_liked: bool,
    pub is_saved: bool,
    pub like_count: i64,
    pub save_count: i64,
}
