use chrono::Utc;

pub use uuid::{uuid, Uuid};
pub type Time = chrono::DateTime<Utc>;

pub const STUB_UUID: Uuid = uuid!("ffffffff-ffff-ffff-ffff-ffffffffffff");

mod auth;
pub use auth::{AuthToken, NewSession};

mod catalog;
pub use catalog::{Author, Book, BookPage};

mod challenge;
pub use challenge::ReadingChallenge;

mod comment;
pub use comment::{Comment, CommentId, Reply, ReplyId};

mod error;
pub use error::Error;

mod feed;
pub use feed::{topic, ActionKind, ClientCommand, ClientFrame, FeedMessage};

mod forum;
pub use forum::{Forum, ForumId, ForumInteraction};

mod notif;
pub use notif::{Notification, NotificationId, Report};

mod response;
pub use response::ApiResponse;

mod user;
pub use user::{BanStatus, User, UserId};

// See comments on the `validate` functions: strings cross a JSON boundary
// the backend stores verbatim, so null bytes are rejected up front.
pub fn validate_string(s: &str) -> Result<(), Error> {
    match s.contains('\0') {
        true => Err(Error::NullByteInString(s.to_string())),
        false => Ok(()),
    }
}
