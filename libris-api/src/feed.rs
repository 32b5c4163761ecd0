use anyhow::Context;

use crate::{AuthToken, Comment, CommentId, Error, ForumId, Reply, ReplyId};

/// Topic names on the messaging broker. Comment-scoped topics isolate
/// delivery of like/reply traffic to the components that care.
pub mod topic {
    use crate::{CommentId, ForumId};

    pub fn forum(forum: ForumId) -> String {
        format!("/topic/forum/{}", forum.0)
    }

    pub fn comment(forum: ForumId, comment: CommentId) -> String {
        format!("/topic/forum/{}/comment/{}", forum.0, comment.0)
    }
}

/// Broadcast messages pushed by the broker. The transport is at least
/// once: consumers must tolerate duplicated delivery of any of these.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FeedMessage {
    Pong,
    NewComment(Comment),
    CommentUpdated {
        id: CommentId,
        content: String,
        image_url: Option<String>,
    },
    CommentDeleted {
        id: CommentId,
    },
    ReplyAdded {
        comment_id: CommentId,
        reply: Reply,
    },
    ReplyUpdated {
        comment_id: CommentId,
        id: ReplyId,
        content: String,
        image_url: Option<String>,
    },
    ReplyDeleted {
        comment_id: CommentId,
        id: ReplyId,
    },
    /// `liked` is the server-confirmed state, not a delta: applying it
    /// twice must not double-count.
    LikeToggled {
        comment_id: CommentId,
        liked: bool,
    },
    Error {
        comment_id: Option<CommentId>,
        message: String,
    },
}

impl FeedMessage {
    pub fn decode(text: &str) -> anyhow::Result<FeedMessage> {
        serde_json::from_str(text).context("decoding feed message")
    }
}

/// The action key used by in-flight guards: one outstanding request per
/// kind at a time.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ActionKind {
    PostComment,
    EditComment,
    DeleteComment,
    PostReply,
    EditReply,
    DeleteReply,
    ToggleLike,
}

/// User actions published to the broker, one variant per interaction.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum ClientCommand {
    PostComment {
        forum: ForumId,
        content: String,
        image_url: Option<String>,
    },
    EditComment {
        forum: ForumId,
        id: CommentId,
        content: String,
        image_url: Option<String>,
    },
    DeleteComment {
        forum: ForumId,
        id: CommentId,
    },
    PostReply {
        forum: ForumId,
        comment_id: CommentId,
        content: String,
        image_url: Option<String>,
    },
    EditReply {
        forum: ForumId,
        comment_id: CommentId,
        id: ReplyId,
        content: String,
        image_url: Option<String>,
    },
    DeleteReply {
        forum: ForumId,
        comment_id: CommentId,
        id: ReplyId,
    },
    ToggleLike {
        forum: ForumId,
        comment_id: CommentId,
    },
}

impl ClientCommand {
    pub fn kind(&self) -> ActionKind {
        match self {
            ClientCommand::PostComment { .. } => ActionKind::PostComment,
            ClientCommand::EditComment { .. } => ActionKind::EditComment,
            ClientCommand::DeleteComment { .. } => ActionKind::DeleteComment,
            ClientCommand::PostReply { .. } => ActionKind::PostReply,
            ClientCommand::EditReply { .. } => ActionKind::EditReply,
            ClientCommand::DeleteReply { .. } => ActionKind::DeleteReply,
            ClientCommand::ToggleLike { .. } => ActionKind::ToggleLike,
        }
    }

    pub fn forum(&self) -> ForumId {
        match self {
            ClientCommand::PostComment { forum, .. }
            | ClientCommand::EditComment { forum, .. }
            | ClientCommand::DeleteComment { forum, .. }
            | ClientCommand::PostReply { forum, .. }
            | ClientCommand::EditReply { forum, .. }
            | ClientCommand::DeleteReply { forum, .. }
            | ClientCommand::ToggleLike { forum, .. } => *forum,
        }
    }

    /// Destination path the broker routes this action by.
    pub fn destination(&self) -> String {
        match self {
            ClientCommand::PostComment { forum, .. } => {
                format!("/app/forum/{}/comment", forum.0)
            }
            ClientCommand::EditComment { forum, id, .. } => {
                format!("/app/forum/{}/comment/{}/edit", forum.0, id.0)
            }
            ClientCommand::DeleteComment { forum, id } => {
                format!("/app/forum/{}/comment/{}/delete", forum.0, id.0)
            }
            ClientCommand::PostReply {
                forum, comment_id, ..
            } => format!("/app/forum/{}/comment/{}/reply", forum.0, comment_id.0),
            ClientCommand::EditReply {
                forum,
                comment_id,
                id,
                ..
            } => format!(
                "/app/forum/{}/comment/{}/reply/{}/edit",
                forum.0, comment_id.0, id.0
            ),
            ClientCommand::DeleteReply {
                forum,
                comment_id,
                id,
            } => format!(
                "/app/forum/{}/comment/{}/reply/{}/delete",
                forum.0, comment_id.0, id.0
            ),
            ClientCommand::ToggleLike { forum, comment_id } => {
                format!("/app/forum/{}/comment/{}/like", forum.0, comment_id.0)
            }
        }
    }

    // See comments on other `validate` functions throughout libris-api
    pub fn validate(&self) -> Result<(), Error> {
        match self {
            ClientCommand::PostComment {
                content, image_url, ..
            }
            | ClientCommand::EditComment {
                content, image_url, ..
            }
            | ClientCommand::PostReply {
                content, image_url, ..
            }
            | ClientCommand::EditReply {
                content, image_url, ..
            } => {
                crate::validate_string(content)?;
                if content.trim().is_empty() && image_url.is_none() {
                    return Err(Error::MissingContent);
                }
                Ok(())
            }
            ClientCommand::DeleteComment { .. }
            | ClientCommand::DeleteReply { .. }
            | ClientCommand::ToggleLike { .. } => Ok(()),
        }
    }
}

/// Frames the client writes to the messaging channel.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(tag = "frame", rename_all = "kebab-case")]
pub enum ClientFrame {
    Auth { token: AuthToken },
    Subscribe { topic: String },
    Unsubscribe { topic: String },
    Ping,
    Send { destination: String, body: ClientCommand },
}

impl ClientFrame {
    pub fn encode(&self) -> String {
        serde_json::to_string(self).expect("serializing client frame")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{User, UserId};

    #[test]
    fn decodes_tagged_new_comment() {
        let comment = Comment::new(
            CommentId::stub(),
            User::new(UserId::stub(), String::from("Reader")),
            String::from("Great book!"),
            None,
        );
        let text = serde_json::to_string(&FeedMessage::NewComment(comment.clone())).unwrap();
        assert!(text.contains(r#""type":"new-comment""#));
        assert_eq!(FeedMessage::decode(&text).unwrap(), FeedMessage::NewComment(comment));
    }

    #[test]
    fn rejects_malformed_payloads() {
        assert!(FeedMessage::decode("{}").is_err());
        assert!(FeedMessage::decode(r#"{"type": "like-toggled"}"#).is_err());
        assert!(FeedMessage::decode("not json at all").is_err());
    }

    #[test]
    fn empty_comment_without_image_is_invalid() {
        let cmd = ClientCommand::PostComment {
            forum: ForumId::stub(),
            content: String::from("   "),
            image_url: None,
        };
        assert_eq!(cmd.validate(), Err(Error::MissingContent));
    }

    #[test]
    fn empty_comment_with_image_is_valid() {
        let cmd = ClientCommand::PostComment {
            forum: ForumId::stub(),
            content: String::new(),
            image_url: Some(String::from("https://img.example/1.jpg")),
        };
        assert_eq!(cmd.validate(), Ok(()));
    }

    #[test]
    fn destinations_are_forum_scoped() {
        let forum = ForumId::stub();
        let cmd = ClientCommand::ToggleLike {
            forum,
            comment_id: CommentId::stub(),
        };
        assert_eq!(
            cmd.destination(),
            format!("/app/forum/{}/comment/{}/like", forum.0, CommentId::stub().0),
        );
        assert_eq!(topic::forum(forum), format!("/topic/forum/{}", forum.0));
    }
}
