use crate::api::{Comment, CommentId, FeedMessage, ForumId};

/// What a broadcast did to the store, so the owning view can keep
/// aggregate counts in sync and surface the error channel.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Applied {
    CommentAdded(CommentId),
    CommentRemoved(CommentId),
    Changed,
    Nothing,
    Surfaced(String),
}

/// In-memory mirror of one forum's comment list, kept in sync by
/// broadcast messages. Lives for the lifetime of the discussion view;
/// a remount refetches from scratch (there is no catch-up protocol).
#[derive(Clone, Debug, PartialEq)]
pub struct DiscussionThread {
    pub forum: ForumId,
    /// Newest first
    pub comments: Vec<Comment>,
}

impl DiscussionThread {
    pub fn new(forum: ForumId) -> DiscussionThread {
        DiscussionThread {
            forum,
            comments: Vec::new(),
        }
    }

    pub fn from_fetch(forum: ForumId, comments: Vec<Comment>) -> DiscussionThread {
        DiscussionThread { forum, comments }
    }

    pub fn comment(&self, id: &CommentId) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == *id)
    }

    fn comment_mut(&mut self, id: &CommentId) -> Option<&mut Comment> {
        self.comments.iter_mut().find(|c| c.id == *id)
    }

    /// Translate one broadcast into a store mutation. The transport is
    /// at least once, so every arm has to be safe under duplicated and
    /// reordered delivery: ids are deduplicated, deletes of absent ids
    /// are no-ops, and like toggles apply the server state instead of a
    /// local delta.
    pub fn apply(&mut self, msg: FeedMessage) -> Applied {
        match msg {
            FeedMessage::Pong => Applied::Nothing,
            FeedMessage::NewComment(c) => {
                if self.comment(&c.id).is_some() {
                    tracing::warn!(id = ?c.id, "duplicate comment broadcast suppressed");
                    return Applied::Nothing;
                }
                let id = c.id;
                self.comments.insert(0, c);
                Applied::CommentAdded(id)
            }
            FeedMessage::CommentDeleted { id } => {
                let before = self.comments.len();
                self.comments.retain(|c| c.id != id);
                match self.comments.len() < before {
                    true => Applied::CommentRemoved(id),
                    false => Applied::Nothing,
                }
            }
            FeedMessage::CommentUpdated {
                id,
                content,
                image_url,
            } => match self.comment_mut(&id) {
                Some(c) => {
                    c.patch(content, image_url);
                    Applied::Changed
                }
                None => {
                    tracing::warn!(?id, "update for comment not in store");
                    Applied::Nothing
                }
            },
            FeedMessage::ReplyAdded { comment_id, reply } => {
                match self.comment_mut(&comment_id) {
                    Some(c) => {
                        if c.replies.iter().any(|r| r.id == reply.id) {
                            tracing::warn!(id = ?reply.id, "duplicate reply broadcast suppressed");
                            return Applied::Nothing;
                        }
                        c.replies.insert(0, reply);
                        Applied::Changed
                    }
                    None => {
                        tracing::warn!(?comment_id, "reply for comment not in store");
                        Applied::Nothing
                    }
                }
            }
            FeedMessage::ReplyUpdated {
                comment_id,
                id,
                content,
                image_url,
            } => match self
                .comment_mut(&comment_id)
                .and_then(|c| c.reply_mut(&id))
            {
                Some(r) => {
                    r.patch(content, image_url);
                    Applied::Changed
                }
                None => Applied::Nothing,
            },
            FeedMessage::ReplyDeleted { comment_id, id } => {
                match self.comment_mut(&comment_id) {
                    Some(c) => {
                        let before = c.replies.len();
                        c.replies.retain(|r| r.id != id);
                        match c.replies.len() < before {
                            true => Applied::Changed,
                            false => Applied::Nothing,
                        }
                    }
                    None => Applied::Nothing,
                }
            }
            FeedMessage::LikeToggled { comment_id, liked } => {
                match self.comment_mut(&comment_id) {
                    // The count only moves when the server state differs
                    // from ours, so echoes from other tabs cannot
                    // double-count.
                    Some(c) if c.liked_by_me != liked => {
                        c.liked_by_me = liked;
                        // floor at zero: a fetch claiming liked_by_me
                        // on a zero count must not render "-1 likes"
                        c.like_count = match liked {
                            true => c.like_count + 1,
                            false => (c.like_count - 1).max(0),
                        };
                        Applied::Changed
                    }
                    Some(_) => Applied::Nothing,
                    None => {
                        tracing::warn!(?comment_id, "like toggle for comment not in store");
                        Applied::Nothing
                    }
                }
            }
            FeedMessage::Error { comment_id, message } => {
                tracing::debug!(?comment_id, %message, "feed error channel");
                Applied::Surfaced(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Reply, ReplyId, User, UserId, Uuid};

    fn user() -> User {
        User::new(UserId(Uuid::new_v4()), String::from("Reader"))
    }

    fn comment(text: &str) -> Comment {
        Comment::new(CommentId(Uuid::new_v4()), user(), String::from(text), None)
    }

    fn thread() -> DiscussionThread {
        DiscussionThread::new(ForumId::stub())
    }

    #[test]
    fn new_comments_prepend_newest_first() {
        let mut t = thread();
        let first = comment("first");
        let second = comment("second");
        assert_eq!(
            t.apply(FeedMessage::NewComment(first.clone())),
            Applied::CommentAdded(first.id),
        );
        t.apply(FeedMessage::NewComment(second.clone()));
        assert_eq!(t.comments[0].id, second.id);
        assert_eq!(t.comments[1].id, first.id);
    }

    #[test]
    fn duplicate_ids_kept_once_in_first_arrival_order() {
        let mut t = thread();
        let a = comment("a");
        let b = comment("b");
        for msg in [
            FeedMessage::NewComment(a.clone()),
            FeedMessage::NewComment(b.clone()),
            FeedMessage::NewComment(a.clone()),
            FeedMessage::NewComment(b.clone()),
            FeedMessage::NewComment(a.clone()),
        ] {
            t.apply(msg);
        }
        assert_eq!(
            t.comments.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![b.id, a.id],
        );
    }

    #[test]
    fn deleting_absent_comment_is_a_noop() {
        let mut t = thread();
        t.apply(FeedMessage::NewComment(comment("kept")));
        let before = t.clone();
        assert_eq!(
            t.apply(FeedMessage::CommentDeleted {
                id: CommentId(Uuid::new_v4()),
            }),
            Applied::Nothing,
        );
        assert_eq!(t, before);
    }

    #[test]
    fn delete_reports_removal_exactly_once() {
        let mut t = thread();
        let c = comment("going away");
        t.apply(FeedMessage::NewComment(c.clone()));
        assert_eq!(
            t.apply(FeedMessage::CommentDeleted { id: c.id }),
            Applied::CommentRemoved(c.id),
        );
        assert_eq!(
            t.apply(FeedMessage::CommentDeleted { id: c.id }),
            Applied::Nothing,
        );
    }

    #[test]
    fn update_patches_content_and_image() {
        let mut t = thread();
        let c = comment("v1");
        t.apply(FeedMessage::NewComment(c.clone()));
        t.apply(FeedMessage::CommentUpdated {
            id: c.id,
            content: String::from("v2"),
            image_url: Some(String::from("https://img.example/x.jpg")),
        });
        let got = t.comment(&c.id).unwrap();
        assert_eq!(got.content, "v2");
        assert_eq!(got.image_url.as_deref(), Some("https://img.example/x.jpg"));
    }

    #[test]
    fn replies_nest_under_their_comment() {
        let mut t = thread();
        let c = comment("parent");
        t.apply(FeedMessage::NewComment(c.clone()));
        let r1 = Reply::new(ReplyId(Uuid::new_v4()), user(), String::from("r1"), None);
        let r2 = Reply::new(ReplyId(Uuid::new_v4()), user(), String::from("r2"), None);
        t.apply(FeedMessage::ReplyAdded {
            comment_id: c.id,
            reply: r1.clone(),
        });
        t.apply(FeedMessage::ReplyAdded {
            comment_id: c.id,
            reply: r2.clone(),
        });
        // duplicate delivery
        assert_eq!(
            t.apply(FeedMessage::ReplyAdded {
                comment_id: c.id,
                reply: r2.clone(),
            }),
            Applied::Nothing,
        );
        let replies = &t.comment(&c.id).unwrap().replies;
        assert_eq!(replies.iter().map(|r| r.id).collect::<Vec<_>>(), vec![r2.id, r1.id]);

        t.apply(FeedMessage::ReplyDeleted {
            comment_id: c.id,
            id: r1.id,
        });
        assert_eq!(t.comment(&c.id).unwrap().replies.len(), 1);
    }

    #[test]
    fn like_toggle_is_symmetric() {
        let mut t = thread();
        let mut c = comment("likeable");
        c.like_count = 7;
        t.apply(FeedMessage::NewComment(c.clone()));

        t.apply(FeedMessage::LikeToggled {
            comment_id: c.id,
            liked: true,
        });
        assert_eq!(t.comment(&c.id).unwrap().like_count, 8);
        assert!(t.comment(&c.id).unwrap().liked_by_me);

        // duplicated echo of the same server state must not double-count
        assert_eq!(
            t.apply(FeedMessage::LikeToggled {
                comment_id: c.id,
                liked: true,
            }),
            Applied::Nothing,
        );
        assert_eq!(t.comment(&c.id).unwrap().like_count, 8);

        t.apply(FeedMessage::LikeToggled {
            comment_id: c.id,
            liked: false,
        });
        assert_eq!(t.comment(&c.id).unwrap().like_count, 7);
        assert!(!t.comment(&c.id).unwrap().liked_by_me);
    }

    #[test]
    fn unlike_never_renders_a_negative_count() {
        let mut t = thread();
        // inconsistent server state: liked_by_me set on a zero count
        let mut c = comment("oddly liked");
        c.liked_by_me = true;
        c.like_count = 0;
        t.apply(FeedMessage::NewComment(c.clone()));

        t.apply(FeedMessage::LikeToggled {
            comment_id: c.id,
            liked: false,
        });
        assert_eq!(t.comment(&c.id).unwrap().like_count, 0);
        assert!(!t.comment(&c.id).unwrap().liked_by_me);
    }

    #[test]
    fn error_channel_surfaces_without_state_change() {
        let mut t = thread();
        t.apply(FeedMessage::NewComment(comment("stable")));
        let before = t.clone();
        assert_eq!(
            t.apply(FeedMessage::Error {
                comment_id: Some(before.comments[0].id),
                message: String::from("could not like"),
            }),
            Applied::Surfaced(String::from("could not like")),
        );
        assert_eq!(t, before);
    }
}
