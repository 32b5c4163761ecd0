use std::collections::HashSet;

use crate::api::{ActionKind, BanStatus, ClientCommand, ClientFrame, Error, Time, User};

/// Seam between the dispatcher and the messaging channel; the web layer
/// forwards frames into the feed task, tests record them.
pub trait Publish {
    fn publish(&mut self, frame: ClientFrame);
}

impl Publish for Vec<ClientFrame> {
    fn publish(&mut self, frame: ClientFrame) {
        self.push(frame);
    }
}

/// Why a submission produced no publish without being an error the user
/// should see.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DispatchOutcome {
    Sent,
    /// Connection guard: actions before the handshake completes are
    /// dropped, not queued.
    DroppedNotConnected,
    /// In-flight guard: a second submit of the same action kind while
    /// the first is unresolved.
    DroppedInFlight,
}

/// Validates and sends outbound actions. One instance per discussion
/// view, same lifetime as the store it feeds.
#[derive(Clone, Debug, Default)]
pub struct Dispatcher {
    connected: bool,
    in_flight: HashSet<ActionKind>,
}

impl Dispatcher {
    pub fn new() -> Dispatcher {
        Dispatcher::default()
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_in_flight(&self, kind: ActionKind) -> bool {
        self.in_flight.contains(&kind)
    }

    /// Clears the in-flight flag for `kind`. Called when the matching
    /// broadcast echo (or a feed error) arrives; there is no timeout,
    /// so a request that never resolves leaves the flag set.
    pub fn complete(&mut self, kind: ActionKind) {
        self.in_flight.remove(&kind);
    }

    /// Drops every pending flag. A lost connection means no echo will
    /// ever arrive for the requests that were in flight on it.
    pub fn reset(&mut self) {
        self.in_flight.clear();
    }

    /// Guard pipeline without the publish: authentication, then ban,
    /// then payload validation (all three surfaced to the user), then
    /// the silent connection and in-flight guards. On `Sent` the
    /// in-flight flag for the action's kind is claimed.
    ///
    /// For actions with an asynchronous preparation step (an image
    /// upload) that must be guarded end to end: `begin` with the
    /// eventual command's shape before starting the preparation, then
    /// `complete` plus a regular `submit` once it is done, or just
    /// `complete` when it fails.
    pub fn begin(
        &mut self,
        user: Option<&User>,
        now: Time,
        cmd: &ClientCommand,
    ) -> Result<DispatchOutcome, Error> {
        let user = user.ok_or(Error::NotLoggedIn)?;
        if let BanStatus::Banned { expires_at } = user.ban_status(now) {
            return Err(Error::Banned { expires_at });
        }
        cmd.validate()?;
        if !self.connected {
            tracing::debug!(kind = ?cmd.kind(), "dropping action while disconnected");
            return Ok(DispatchOutcome::DroppedNotConnected);
        }
        let kind = cmd.kind();
        if !self.in_flight.insert(kind) {
            tracing::debug!(?kind, "duplicate submit while request in flight");
            return Ok(DispatchOutcome::DroppedInFlight);
        }
        Ok(DispatchOutcome::Sent)
    }

    /// The full guard pipeline, then exactly one publish.
    pub fn submit(
        &mut self,
        user: Option<&User>,
        now: Time,
        cmd: ClientCommand,
        sink: &mut impl Publish,
    ) -> Result<DispatchOutcome, Error> {
        match self.begin(user, now, &cmd)? {
            DispatchOutcome::Sent => {
                sink.publish(ClientFrame::Send {
                    destination: cmd.destination(),
                    body: cmd,
                });
                Ok(DispatchOutcome::Sent)
            }
            dropped => Ok(dropped),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CommentId, ForumId, UserId, Uuid};
    use chrono::{Duration, Utc};

    fn user() -> User {
        User::new(UserId(Uuid::new_v4()), String::from("Poster"))
    }

    fn post(content: &str) -> ClientCommand {
        ClientCommand::PostComment {
            forum: ForumId::stub(),
            content: String::from(content),
            image_url: None,
        }
    }

    fn connected() -> Dispatcher {
        let mut d = Dispatcher::new();
        d.set_connected(true);
        d
    }

    #[test]
    fn unauthenticated_submit_is_an_error() {
        let mut sink = Vec::new();
        let res = connected().submit(None, Utc::now(), post("hi"), &mut sink);
        assert_eq!(res, Err(Error::NotLoggedIn));
        assert!(sink.is_empty());
    }

    #[test]
    fn banned_user_is_blocked_before_any_send() {
        let mut u = user();
        u.forum_interaction_banned = true;
        let expiry = Utc::now() + Duration::hours(2);
        u.forum_ban_expires_at = Some(expiry);
        let mut sink = Vec::new();
        let res = connected().submit(Some(&u), Utc::now(), post("hi"), &mut sink);
        assert_eq!(
            res,
            Err(Error::Banned {
                expires_at: Some(expiry)
            }),
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn expired_ban_lets_the_action_through() {
        let mut u = user();
        u.forum_interaction_banned = true;
        u.forum_ban_expires_at = Some(Utc::now() - Duration::hours(2));
        let mut sink = Vec::new();
        let res = connected().submit(Some(&u), Utc::now(), post("hi"), &mut sink);
        assert_eq!(res, Ok(DispatchOutcome::Sent));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn validation_failure_is_surfaced_not_silent() {
        let u = user();
        let mut sink = Vec::new();
        let res = connected().submit(Some(&u), Utc::now(), post("   "), &mut sink);
        assert_eq!(res, Err(Error::MissingContent));
        assert!(sink.is_empty());
    }

    #[test]
    fn disconnected_actions_are_silently_dropped() {
        let u = user();
        let mut d = Dispatcher::new();
        let mut sink = Vec::new();
        let res = d.submit(Some(&u), Utc::now(), post("hi"), &mut sink);
        assert_eq!(res, Ok(DispatchOutcome::DroppedNotConnected));
        assert!(sink.is_empty());
        // the drop must not leave an in-flight flag behind
        assert!(!d.is_in_flight(ActionKind::PostComment));
    }

    #[test]
    fn double_submit_publishes_exactly_once() {
        let u = user();
        let mut d = connected();
        let mut sink = Vec::new();
        assert_eq!(
            d.submit(Some(&u), Utc::now(), post("once"), &mut sink),
            Ok(DispatchOutcome::Sent),
        );
        assert_eq!(
            d.submit(Some(&u), Utc::now(), post("once"), &mut sink),
            Ok(DispatchOutcome::DroppedInFlight),
        );
        assert_eq!(sink.len(), 1);

        // distinct action kinds are independently guarded
        assert_eq!(
            d.submit(
                Some(&u),
                Utc::now(),
                ClientCommand::ToggleLike {
                    forum: ForumId::stub(),
                    comment_id: CommentId::stub(),
                },
                &mut sink,
            ),
            Ok(DispatchOutcome::Sent),
        );
        assert_eq!(sink.len(), 2);

        // completion re-arms the kind
        d.complete(ActionKind::PostComment);
        assert_eq!(
            d.submit(Some(&u), Utc::now(), post("again"), &mut sink),
            Ok(DispatchOutcome::Sent),
        );
        assert_eq!(sink.len(), 3);
    }

    #[test]
    fn reset_clears_every_in_flight_flag() {
        let u = user();
        let mut d = connected();
        let mut sink = Vec::new();
        d.submit(Some(&u), Utc::now(), post("hi"), &mut sink)
            .unwrap();
        assert!(d.is_in_flight(ActionKind::PostComment));
        d.reset();
        assert!(!d.is_in_flight(ActionKind::PostComment));
        assert_eq!(
            d.submit(Some(&u), Utc::now(), post("hi"), &mut sink),
            Ok(DispatchOutcome::Sent),
        );
    }

    #[test]
    fn begin_claims_the_guard_for_the_whole_preparation() {
        let u = user();
        let mut d = connected();
        let mut sink = Vec::new();
        // upload about to start: the flag is claimed, nothing published
        assert_eq!(
            d.begin(Some(&u), Utc::now(), &post("with picture")),
            Ok(DispatchOutcome::Sent),
        );
        assert!(sink.is_empty());
        // a second click mid-upload starts nothing
        assert_eq!(
            d.begin(Some(&u), Utc::now(), &post("with picture")),
            Ok(DispatchOutcome::DroppedInFlight),
        );
        assert_eq!(
            d.submit(Some(&u), Utc::now(), post("with picture"), &mut sink),
            Ok(DispatchOutcome::DroppedInFlight),
        );
        assert!(sink.is_empty());
        // upload done: hand the flag back and publish the real command
        d.complete(ActionKind::PostComment);
        assert_eq!(
            d.submit(Some(&u), Utc::now(), post("with picture"), &mut sink),
            Ok(DispatchOutcome::Sent),
        );
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn failed_preparation_releases_the_guard() {
        let u = user();
        let mut d = connected();
        let mut sink = Vec::new();
        d.begin(Some(&u), Utc::now(), &post("with picture"))
            .unwrap();
        // upload failed: nothing was sent and the kind is free again
        d.complete(ActionKind::PostComment);
        assert!(!d.is_in_flight(ActionKind::PostComment));
        assert_eq!(
            d.submit(Some(&u), Utc::now(), post("retry"), &mut sink),
            Ok(DispatchOutcome::Sent),
        );
    }

    #[test]
    fn begin_validates_before_claiming_anything() {
        let u = user();
        let mut d = connected();
        assert_eq!(d.begin(Some(&u), Utc::now(), &post("   ")), Err(Error::MissingContent));
        assert!(!d.is_in_flight(ActionKind::PostComment));
    }

    #[test]
    fn sent_frame_carries_destination_and_body() {
        let u = user();
        let mut sink = Vec::new();
        let cmd = post("Great book!");
        connected()
            .submit(Some(&u), Utc::now(), cmd.clone(), &mut sink)
            .unwrap();
        assert_eq!(
            sink,
            vec![ClientFrame::Send {
                destination: cmd.destination(),
                body: cmd,
            }],
        );
    }
}
