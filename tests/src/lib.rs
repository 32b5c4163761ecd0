//! Shared fixtures for the cross-crate integration tests.

use libris_api::{AuthToken, Forum, ForumId, NewSession, User, UserId, Uuid};
use libris_mock_server::MockServer;

pub const EMAIL: &str = "reader@example.org";
pub const PASSWORD: &str = "correct horse";

pub fn sample_forum() -> Forum {
    Forum {
        id: ForumId(Uuid::new_v4()),
        book_id: 2600,
        name: String::from("War and Peace readers"),
        member_count: 1,
        comment_count: 0,
    }
}

/// One server with one user and one forum, logged in.
pub fn logged_in_server() -> (MockServer, AuthToken, UserId, ForumId) {
    let mut server = MockServer::new();
    let user = User::new(UserId(Uuid::new_v4()), String::from("Avid Reader"));
    let user_id = user.id;
    server
        .admin_create_user(user, String::from(EMAIL), String::from(PASSWORD))
        .expect("creating test user");
    let forum = sample_forum();
    let forum_id = forum.id;
    server.admin_create_forum(forum);
    let token = server
        .auth(NewSession::new(
            String::from(EMAIL),
            String::from(PASSWORD),
            String::from("integration-tests"),
        ))
        .expect("logging test user in");
    (server, token, user_id, forum_id)
}
