//! In-memory stand-in for the backend + messaging broker, for tests.
//! Holds the authoritative comment state and relays every mutation as a
//! `FeedMessage` broadcast, the way the real broker does: the broadcast,
//! not the local action, is what mutates client stores.

use std::collections::{btree_map, BTreeMap, HashMap, HashSet};

use libris_api::{
    AuthToken, BanStatus, ClientCommand, Comment, CommentId, Error, FeedMessage, Forum, ForumId,
    NewSession, Reply, ReplyId, Time, User, UserId, Uuid,
};
use tokio::sync::mpsc;

pub struct MockServer {
    users: BTreeMap<UserId, DbUser>,
    forums: BTreeMap<ForumId, DbForum>,
}

#[derive(Debug)]
struct DbUser {
    profile: User,
    email: String,
    pass: String,
    /// token -> device name
    sessions: HashMap<AuthToken, String>,
}

#[derive(Debug)]
struct DbForum {
    forum: Forum,
    /// Newest first, like the client mirror
    comments: Vec<Comment>,
    comment_likes: HashMap<CommentId, HashSet<UserId>>,
    feeds: Vec<mpsc::UnboundedSender<FeedMessage>>,
}

impl DbForum {
    fn broadcast(&mut self, msg: FeedMessage) {
        tracing::trace!(forum = ?self.forum.id, ?msg, "broadcasting");
        self.feeds.retain(|f| f.send(msg.clone()).is_ok());
    }

    fn comment_mut(&mut self, id: CommentId) -> Result<&mut Comment, Error> {
        self.comments
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(Error::NotFound(id.0))
    }
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer {
            users: BTreeMap::new(),
            forums: BTreeMap::new(),
        }
    }

    pub fn admin_create_user(
        &mut self,
        profile: User,
        email: String,
        password: String,
    ) -> Result<(), Error> {
        libris_api::validate_string(&profile.full_name)?;
        libris_api::validate_string(&email)?;
        match self.users.entry(profile.id) {
            btree_map::Entry::Occupied(_) => Err(Error::Unknown(String::from("user id in use"))),
            btree_map::Entry::Vacant(entry) => {
                entry.insert(DbUser {
                    profile,
                    email,
                    pass: password,
                    sessions: HashMap::new(),
                });
                Ok(())
            }
        }
    }

    pub fn admin_create_forum(&mut self, forum: Forum) {
        self.forums.insert(
            forum.id,
            DbForum {
                forum,
                comments: Vec::new(),
                comment_likes: HashMap::new(),
                feeds: Vec::new(),
            },
        );
    }

    /// Moderation hook: `expires_at == None` is a permanent ban.
    pub fn admin_ban_user(&mut self, user: UserId, expires_at: Option<Time>) -> Result<(), Error> {
        let u = self.users.get_mut(&user).ok_or(Error::NotFound(user.0))?;
        u.profile.forum_interaction_banned = true;
        u.profile.forum_ban_expires_at = expires_at;
        Ok(())
    }

    pub fn auth(&mut self, s: NewSession) -> Result<AuthToken, Error> {
        s.validate()?;
        for u in self.users.values_mut() {
            if u.email == s.email {
                if s.password != u.pass {
                    return Err(Error::PermissionDenied);
                }
                let tok = AuthToken(Uuid::new_v4());
                u.sessions.insert(tok, s.device);
                return Ok(tok);
            }
        }
        Err(Error::PermissionDenied)
    }

    fn resolve(&self, tok: AuthToken) -> Result<&DbUser, Error> {
        self.users
            .values()
            .find(|u| u.sessions.contains_key(&tok))
            .ok_or(Error::PermissionDenied)
    }

    pub fn profile(&self, tok: AuthToken) -> Result<User, Error> {
        Ok(self.resolve(tok)?.profile.clone())
    }

    pub fn fetch_comments(&self, tok: AuthToken, forum: ForumId) -> Result<Vec<Comment>, Error> {
        self.resolve(tok)?;
        Ok(self
            .forums
            .get(&forum)
            .ok_or(Error::NotFound(forum.0))?
            .comments
            .clone())
    }

    /// Attach a feed to a forum's broadcast topic, as the websocket
    /// subscribe frame would.
    pub fn subscribe(
        &mut self,
        tok: AuthToken,
        forum: ForumId,
    ) -> Result<mpsc::UnboundedReceiver<FeedMessage>, Error> {
        self.resolve(tok)?;
        let (sender, receiver) = mpsc::unbounded_channel();
        self.forums
            .get_mut(&forum)
            .ok_or(Error::NotFound(forum.0))?
            .feeds
            .push(sender);
        Ok(receiver)
    }

    /// The broker's action endpoint: enforce the ban gate and payload
    /// validation server-side too, mutate authoritative state, then
    /// broadcast the resulting message to every subscriber.
    pub fn handle(&mut self, tok: AuthToken, cmd: ClientCommand) -> Result<(), Error> {
        let actor = self.resolve(tok)?.profile.clone();
        if let BanStatus::Banned { expires_at } = actor.ban_status(chrono::Utc::now()) {
            return Err(Error::Banned { expires_at });
        }
        cmd.validate()?;
        let forum_id = cmd.forum();
        let forum = self
            .forums
            .get_mut(&forum_id)
            .ok_or(Error::NotFound(forum_id.0))?;
        let msg = match cmd {
            ClientCommand::PostComment {
                content, image_url, ..
            } => {
                let comment =
                    Comment::new(CommentId(Uuid::new_v4()), actor, content, image_url);
                forum.comments.insert(0, comment.clone());
                forum.forum.comment_count += 1;
                FeedMessage::NewComment(comment)
            }
            ClientCommand::EditComment {
                id,
                content,
                image_url,
                ..
            } => {
                let c = forum.comment_mut(id)?;
                if c.user.id != actor.id {
                    return Err(Error::PermissionDenied);
                }
                c.patch(content.clone(), image_url.clone());
                FeedMessage::CommentUpdated {
                    id,
                    content,
                    image_url,
                }
            }
            ClientCommand::DeleteComment { id, .. } => {
                let c = forum.comment_mut(id)?;
                if c.user.id != actor.id {
                    return Err(Error::PermissionDenied);
                }
                forum.comments.retain(|c| c.id != id);
                forum.comment_likes.remove(&id);
                forum.forum.comment_count -= 1;
                FeedMessage::CommentDeleted { id }
            }
            ClientCommand::PostReply {
                comment_id,
                content,
                image_url,
                ..
            } => {
                let reply = Reply::new(ReplyId(Uuid::new_v4()), actor, content, image_url);
                forum.comment_mut(comment_id)?.replies.insert(0, reply.clone());
                FeedMessage::ReplyAdded { comment_id, reply }
            }
            ClientCommand::EditReply {
                comment_id,
                id,
                content,
                image_url,
                ..
            } => {
                let r = forum
                    .comment_mut(comment_id)?
                    .reply_mut(&id)
                    .ok_or(Error::NotFound(id.0))?;
                if r.user.id != actor.id {
                    return Err(Error::PermissionDenied);
                }
                r.patch(content.clone(), image_url.clone());
                FeedMessage::ReplyUpdated {
                    comment_id,
                    id,
                    content,
                    image_url,
                }
            }
            ClientCommand::DeleteReply { comment_id, id, .. } => {
                let c = forum.comment_mut(comment_id)?;
                if c.reply_mut(&id).map(|r| r.user.id) != Some(actor.id) {
                    return Err(Error::PermissionDenied);
                }
                c.replies.retain(|r| r.id != id);
                FeedMessage::ReplyDeleted { comment_id, id }
            }
            ClientCommand::ToggleLike { comment_id, .. } => {
                forum.comment_mut(comment_id)?;
                let likers = forum.comment_likes.entry(comment_id).or_default();
                let liked = likers.insert(actor.id);
                if !liked {
                    likers.remove(&actor.id);
                }
                let c = forum.comment_mut(comment_id)?;
                c.like_count += if liked { 1 } else { -1 };
                FeedMessage::LikeToggled { comment_id, liked }
            }
        };
        forum.broadcast(msg);
        Ok(())
    }
}

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}
