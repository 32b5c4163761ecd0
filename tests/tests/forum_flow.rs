//! End-to-end flows through dispatcher -> broker -> broadcast ->
//! reconciliation store, with the mock server playing the backend.

use chrono::{Duration, Utc};
use libris_api::{
    ActionKind, AuthToken, ClientCommand, ClientFrame, Error, FeedMessage, ForumId,
};
use libris_client::{Applied, DiscussionThread, DispatchOutcome, Dispatcher, Publish};
use libris_mock_server::MockServer;
use tests::logged_in_server;

/// Routes published frames straight into the mock broker, counting the
/// sends so duplicate submissions are observable.
struct Broker<'a> {
    server: &'a mut MockServer,
    token: AuthToken,
    published: usize,
}

impl Publish for Broker<'_> {
    fn publish(&mut self, frame: ClientFrame) {
        match frame {
            ClientFrame::Send { body, .. } => {
                self.published += 1;
                self.server
                    .handle(self.token, body)
                    .expect("broker rejected a dispatched command");
            }
            other => panic!("dispatcher published a non-send frame: {other:?}"),
        }
    }
}

fn post(forum: ForumId, content: &str) -> ClientCommand {
    ClientCommand::PostComment {
        forum,
        content: String::from(content),
        image_url: None,
    }
}

#[test]
fn posted_comment_comes_back_through_the_broadcast() {
    let (mut server, token, _user, forum) = logged_in_server();
    let mut feed = server.subscribe(token, forum).unwrap();
    let profile = server.profile(token).unwrap();

    let mut thread = DiscussionThread::new(forum);
    let mut dispatcher = Dispatcher::new();
    dispatcher.set_connected(true);

    let mut broker = Broker {
        server: &mut server,
        token,
        published: 0,
    };
    let outcome = dispatcher
        .submit(Some(&profile), Utc::now(), post(forum, "Great book!"), &mut broker)
        .unwrap();
    assert_eq!(outcome, DispatchOutcome::Sent);
    assert_eq!(broker.published, 1);

    // the broadcast is the sole source of truth: nothing was inserted
    // optimistically
    assert!(thread.comments.is_empty());

    let msg = feed.try_recv().expect("broadcast echo missing");
    let applied = thread.apply(msg.clone());
    match (&msg, applied) {
        (FeedMessage::NewComment(c), Applied::CommentAdded(id)) => {
            assert_eq!(c.id, id);
            dispatcher.complete(ActionKind::PostComment);
        }
        other => panic!("expected a new-comment broadcast, got {other:?}"),
    }
    assert_eq!(thread.comments.len(), 1);
    assert_eq!(thread.comments[0].content, "Great book!");
    assert_eq!(thread.comments[0].image_url, None);
    assert!(feed.try_recv().is_err(), "exactly one broadcast expected");

    // duplicated delivery of the same broadcast is suppressed
    assert_eq!(thread.apply(msg), Applied::Nothing);
    assert_eq!(thread.comments.len(), 1);
}

#[test]
fn double_submit_reaches_the_broker_once() {
    let (mut server, token, _user, forum) = logged_in_server();
    let profile = server.profile(token).unwrap();
    let mut dispatcher = Dispatcher::new();
    dispatcher.set_connected(true);
    let mut broker = Broker {
        server: &mut server,
        token,
        published: 0,
    };

    let first = dispatcher.submit(
        Some(&profile),
        Utc::now(),
        post(forum, "posted twice"),
        &mut broker,
    );
    let second = dispatcher.submit(
        Some(&profile),
        Utc::now(),
        post(forum, "posted twice"),
        &mut broker,
    );
    assert_eq!(first, Ok(DispatchOutcome::Sent));
    assert_eq!(second, Ok(DispatchOutcome::DroppedInFlight));
    assert_eq!(broker.published, 1);
    assert_eq!(server.fetch_comments(token, forum).unwrap().len(), 1);
}

#[test]
fn upload_window_is_guarded_end_to_end() {
    let (mut server, token, _user, forum) = logged_in_server();
    let profile = server.profile(token).unwrap();
    let mut dispatcher = Dispatcher::new();
    dispatcher.set_connected(true);
    let mut broker = Broker {
        server: &mut server,
        token,
        published: 0,
    };

    // an image post claims the guard before the upload even starts
    let shape = post(forum, "look at this cover");
    assert_eq!(
        dispatcher.begin(Some(&profile), Utc::now(), &shape),
        Ok(DispatchOutcome::Sent),
    );
    assert_eq!(broker.published, 0);

    // clicking again while the upload is running goes nowhere
    assert_eq!(
        dispatcher.begin(Some(&profile), Utc::now(), &shape),
        Ok(DispatchOutcome::DroppedInFlight),
    );
    assert_eq!(
        dispatcher.submit(Some(&profile), Utc::now(), shape.clone(), &mut broker),
        Ok(DispatchOutcome::DroppedInFlight),
    );
    assert_eq!(broker.published, 0);

    // the upload resolves into one real publish
    dispatcher.complete(ActionKind::PostComment);
    assert_eq!(
        dispatcher.submit(
            Some(&profile),
            Utc::now(),
            ClientCommand::PostComment {
                forum,
                content: String::from("look at this cover"),
                image_url: Some(String::from("https://img.example/cover.png")),
            },
            &mut broker,
        ),
        Ok(DispatchOutcome::Sent),
    );
    assert_eq!(broker.published, 1);
    let comments = broker.server.fetch_comments(token, forum).unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(
        comments[0].image_url.as_deref(),
        Some("https://img.example/cover.png"),
    );

    // a failed upload releases the guard without ever publishing
    let shape = post(forum, "another try");
    dispatcher.begin(Some(&profile), Utc::now(), &shape).unwrap();
    dispatcher.complete(ActionKind::PostComment);
    assert_eq!(
        dispatcher.submit(Some(&profile), Utc::now(), shape, &mut broker),
        Ok(DispatchOutcome::Sent),
    );
    assert_eq!(broker.published, 2);
}

#[test]
fn banned_user_is_rejected_on_both_sides() {
    let (mut server, token, user_id, forum) = logged_in_server();
    let expiry = Utc::now() + Duration::days(3);
    server.admin_ban_user(user_id, Some(expiry)).unwrap();

    // client-side gate: refreshed profile blocks before any publish
    let profile = server.profile(token).unwrap();
    let mut dispatcher = Dispatcher::new();
    dispatcher.set_connected(true);
    let mut sink = Vec::new();
    assert_eq!(
        dispatcher.submit(Some(&profile), Utc::now(), post(forum, "hi"), &mut sink),
        Err(Error::Banned {
            expires_at: Some(expiry)
        }),
    );
    assert!(sink.is_empty());

    // server-side gate catches a client with a stale profile too
    assert_eq!(
        server.handle(token, post(forum, "hi")),
        Err(Error::Banned {
            expires_at: Some(expiry)
        }),
    );
}

#[test]
fn reply_and_like_round_trip() {
    let (mut server, token, _user, forum) = logged_in_server();
    let mut feed = server.subscribe(token, forum).unwrap();
    let mut thread = DiscussionThread::new(forum);

    server.handle(token, post(forum, "parent")).unwrap();
    thread.apply(feed.try_recv().unwrap());
    let comment_id = thread.comments[0].id;

    server
        .handle(
            token,
            ClientCommand::PostReply {
                forum,
                comment_id,
                content: String::from("agreed"),
                image_url: None,
            },
        )
        .unwrap();
    thread.apply(feed.try_recv().unwrap());
    assert_eq!(thread.comments[0].replies.len(), 1);
    assert_eq!(thread.comments[0].replies[0].content, "agreed");

    server
        .handle(token, ClientCommand::ToggleLike { forum, comment_id })
        .unwrap();
    match feed.try_recv().unwrap() {
        msg @ FeedMessage::LikeToggled { liked: true, .. } => {
            thread.apply(msg);
        }
        other => panic!("expected a like broadcast, got {other:?}"),
    }
    assert_eq!(thread.comments[0].like_count, 1);
    assert!(thread.comments[0].liked_by_me);

    server
        .handle(token, ClientCommand::ToggleLike { forum, comment_id })
        .unwrap();
    thread.apply(feed.try_recv().unwrap());
    assert_eq!(thread.comments[0].like_count, 0);
    assert!(!thread.comments[0].liked_by_me);
}

#[test]
fn remount_refetch_matches_broadcast_built_state() {
    let (mut server, token, _user, forum) = logged_in_server();
    let mut feed = server.subscribe(token, forum).unwrap();
    let mut live = DiscussionThread::new(forum);

    for text in ["one", "two", "three"] {
        server.handle(token, post(forum, text)).unwrap();
        live.apply(feed.try_recv().unwrap());
    }
    server
        .handle(
            token,
            ClientCommand::DeleteComment {
                forum,
                id: live.comments[1].id,
            },
        )
        .unwrap();
    live.apply(feed.try_recv().unwrap());

    // a fresh mount fetches over REST instead of catching up
    let refetched = DiscussionThread::from_fetch(forum, server.fetch_comments(token, forum).unwrap());
    assert_eq!(refetched.comments, live.comments);
}
