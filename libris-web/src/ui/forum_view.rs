use std::collections::VecDeque;

use chrono::Utc;
use futures::channel::{mpsc, oneshot};
use libris_client::{
    api::{
        topic, ActionKind, ClientCommand, ClientFrame, Comment, CommentId, FeedMessage, Forum,
        ForumId, ForumInteraction,
    },
    Applied, DiscussionThread, DispatchOutcome, Dispatcher,
};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::{
    feed::{self, ReconnectPolicy},
    ui, util, SessionInfo,
};

/// Lifecycle of the live connection. Broadcasts arriving between the
/// handshake and the initial fetch are buffered, then replayed on top
/// of the fetched list; only `Ready` lets actions through.
#[derive(Clone, PartialEq)]
pub enum ConnState {
    Disconnected,
    Connected(VecDeque<FeedMessage>),
    Ready,
    /// Reconnection is disabled and the channel is gone for good.
    Closed,
}

#[derive(Clone, PartialEq, Properties)]
pub struct ForumViewProps {
    pub session: SessionInfo,
    pub forum: Forum,
    #[prop_or(ReconnectPolicy::Spaced { seconds: 1 })]
    pub reconnect: ReconnectPolicy,
    pub on_toast: Callback<String>,
    /// Comment count changes bubble up so the forum list stays in sync.
    pub on_comment_delta: Callback<(ForumId, i64)>,
}

pub enum ForumViewMsg {
    FeedConnected(mpsc::UnboundedSender<ClientFrame>),
    ReceivedComments(Vec<Comment>),
    FeedDisconnected,
    FeedClosed,
    Broadcast(FeedMessage),

    SubmitComment(ui::CommentDraft),
    Publish(ClientCommand),
    UploadFailed(String),
    CommentAction(ui::CommentAction),

    InteractionLoaded(ForumInteraction),
    ToggleForumLike,
    ToggleForumSave,
    RestFailed(String),
    Reported,
}

/// One mounted discussion. Owns the store, the dispatcher and the feed
/// task; a remount starts from a fresh fetch (there is no catch-up
/// protocol, so nothing from the previous mount is kept).
pub struct ForumView {
    thread: DiscussionThread,
    dispatcher: Dispatcher,
    conn: ConnState,
    interaction: Option<ForumInteraction>,
    outbound: Option<mpsc::UnboundedSender<ClientFrame>>,
    feed_canceller: oneshot::Receiver<()>,
    /// Accepted submissions so far; bumping it tells the composer to
    /// let go of its draft.
    accepted: u64,
}

/// Which in-flight flag a broadcast resolves. Echoes of other users'
/// actions can also clear a flag, which only re-arms the guard early.
fn echo_kind(msg: &FeedMessage) -> Option<ActionKind> {
    match msg {
        FeedMessage::Pong | FeedMessage::Error { .. } => None,
        FeedMessage::NewComment(_) => Some(ActionKind::PostComment),
        FeedMessage::CommentUpdated { .. } => Some(ActionKind::EditComment),
        FeedMessage::CommentDeleted { .. } => Some(ActionKind::DeleteComment),
        FeedMessage::ReplyAdded { .. } => Some(ActionKind::PostReply),
        FeedMessage::ReplyUpdated { .. } => Some(ActionKind::EditReply),
        FeedMessage::ReplyDeleted { .. } => Some(ActionKind::DeleteReply),
        FeedMessage::LikeToggled { .. } => Some(ActionKind::ToggleLike),
    }
}

impl ForumView {
    fn send_frame(&self, frame: ClientFrame) {
        match &self.outbound {
            Some(out) => {
                if out.unbounded_send(frame).is_err() {
                    tracing::warn!("feed task dropped its outbound channel");
                }
            }
            None => tracing::warn!("dropping frame while disconnected"),
        }
    }

    /// Guarded submission: every messaging action funnels through the
    /// dispatcher, and only a `Sent` outcome reaches the channel.
    fn dispatch(&mut self, ctx: &Context<Self>, cmd: ClientCommand) -> bool {
        let mut frames = Vec::new();
        match self.dispatcher.submit(
            Some(&ctx.props().session.user),
            Utc::now(),
            cmd,
            &mut frames,
        ) {
            Ok(DispatchOutcome::Sent) => {
                for frame in frames {
                    self.send_frame(frame);
                }
                true
            }
            Ok(outcome) => {
                tracing::debug!(?outcome, "action dropped");
                false
            }
            Err(e) => {
                ctx.props().on_toast.emit(util::describe_error(&e));
                false
            }
        }
    }

    fn apply_feed(&mut self, ctx: &Context<Self>, msg: FeedMessage) {
        if let Some(kind) = echo_kind(&msg) {
            self.dispatcher.complete(kind);
        }
        let forum = ctx.props().forum.id;
        match self.thread.apply(msg) {
            Applied::CommentAdded(id) => {
                self.send_frame(ClientFrame::Subscribe {
                    topic: topic::comment(forum, id),
                });
                ctx.props().on_comment_delta.emit((forum, 1));
            }
            Applied::CommentRemoved(id) => {
                self.send_frame(ClientFrame::Unsubscribe {
                    topic: topic::comment(forum, id),
                });
                ctx.props().on_comment_delta.emit((forum, -1));
            }
            Applied::Surfaced(message) => {
                // no echo will come for whatever failed server-side
                self.dispatcher.reset();
                ctx.props().on_toast.emit(message);
            }
            Applied::Changed | Applied::Nothing => (),
        }
    }

    fn image_url_of(&self, id: &CommentId) -> Option<String> {
        self.thread.comment(id).and_then(|c| c.image_url.clone())
    }
}

impl Component for ForumView {
    type Message = ForumViewMsg;
    type Properties = ForumViewProps;

    fn create(ctx: &Context<Self>) -> Self {
        let (cancel_sender, feed_canceller) = oneshot::channel();
        spawn_local(feed::start_comment_feed(
            ctx.props().session.clone(),
            ctx.props().forum.id,
            ctx.props().reconnect,
            ctx.link().clone(),
            cancel_sender,
        ));

        let session = ctx.props().session.clone();
        let forum = ctx.props().forum.id;
        ctx.link().send_future(async move {
            match crate::api::fetch_interaction(&session, forum).await {
                Ok(i) => ForumViewMsg::InteractionLoaded(i),
                Err(e) => {
                    tracing::error!("failed to fetch forum interaction: {e:?}");
                    ForumViewMsg::RestFailed(String::from("Could not load forum like/save state."))
                }
            }
        });

        ForumView {
            thread: DiscussionThread::new(forum),
            dispatcher: Dispatcher::new(),
            conn: ConnState::Disconnected,
            interaction: None,
            outbound: None,
            feed_canceller,
            accepted: 0,
        }
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        if ctx.props().forum.id != old_props.forum.id {
            // dropping the previous canceller tears the old feed down
            *self = <Self as Component>::create(ctx);
        }
        true
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        let forum = ctx.props().forum.id;
        match msg {
            ForumViewMsg::FeedConnected(sender) => {
                self.outbound = Some(sender);
                self.conn = ConnState::Connected(VecDeque::new());
            }
            ForumViewMsg::ReceivedComments(comments) => {
                let buffered = match &mut self.conn {
                    ConnState::Connected(b) => std::mem::take(b),
                    _ => {
                        tracing::warn!("received comment list outside of handshake");
                        VecDeque::new()
                    }
                };
                self.thread = DiscussionThread::from_fetch(forum, comments);
                for c in &self.thread.comments {
                    self.send_frame(ClientFrame::Subscribe {
                        topic: topic::comment(forum, c.id),
                    });
                }
                self.conn = ConnState::Ready;
                self.dispatcher.set_connected(true);
                for msg in buffered {
                    self.apply_feed(ctx, msg);
                }
            }
            ForumViewMsg::FeedDisconnected => {
                self.outbound = None;
                self.conn = ConnState::Disconnected;
                self.dispatcher.set_connected(false);
                self.dispatcher.reset();
            }
            ForumViewMsg::FeedClosed => {
                self.feed_canceller.close();
                self.outbound = None;
                self.conn = ConnState::Closed;
                self.dispatcher.set_connected(false);
                self.dispatcher.reset();
            }
            ForumViewMsg::Broadcast(msg) => match &mut self.conn {
                ConnState::Connected(buffer) => buffer.push_back(msg),
                ConnState::Ready => self.apply_feed(ctx, msg),
                ConnState::Disconnected | ConnState::Closed => {
                    tracing::warn!("broadcast while disconnected, ignored")
                }
            },
            ForumViewMsg::SubmitComment(draft) => match draft.image {
                None => {
                    let sent = self.dispatch(
                        ctx,
                        ClientCommand::PostComment {
                            forum,
                            content: draft.content,
                            image_url: None,
                        },
                    );
                    if sent {
                        self.accepted += 1;
                    }
                }
                // The image goes over REST first; the messaging action
                // is only sent once the upload has yielded a url, and
                // an upload failure means no action at all. The guard
                // pipeline runs up front and holds the in-flight flag
                // for the whole upload, so the draft stays valid and a
                // second click mid-upload does nothing.
                Some(file) => {
                    let shape = ClientCommand::PostComment {
                        forum,
                        content: draft.content.clone(),
                        image_url: None,
                    };
                    match self
                        .dispatcher
                        .begin(Some(&ctx.props().session.user), Utc::now(), &shape)
                    {
                        Err(e) => {
                            ctx.props().on_toast.emit(util::describe_error(&e));
                            return true;
                        }
                        Ok(outcome) if outcome != DispatchOutcome::Sent => {
                            tracing::debug!(?outcome, "upload not started");
                            return true;
                        }
                        Ok(_) => (),
                    }
                    let session = ctx.props().session.clone();
                    let content = draft.content;
                    ctx.link().send_future(async move {
                        let name = file.name();
                        match gloo_file::futures::read_as_bytes(&file).await {
                            Err(e) => ForumViewMsg::UploadFailed(format!(
                                "Could not read the selected file: {e}"
                            )),
                            Ok(bytes) => {
                                match crate::api::upload_image(&session, &name, bytes).await {
                                    Ok(url) => ForumViewMsg::Publish(ClientCommand::PostComment {
                                        forum,
                                        content,
                                        image_url: Some(url),
                                    }),
                                    Err(e) => {
                                        tracing::error!("image upload failed: {e:?}");
                                        ForumViewMsg::UploadFailed(String::from(
                                            "Image upload failed, your comment was not posted.",
                                        ))
                                    }
                                }
                            }
                        }
                    });
                }
            },
            ForumViewMsg::Publish(cmd) => {
                // the upload held the flag; submit re-claims it until
                // the broadcast echo arrives
                self.dispatcher.complete(cmd.kind());
                if self.dispatch(ctx, cmd) {
                    self.accepted += 1;
                }
            }
            ForumViewMsg::UploadFailed(message) => {
                self.dispatcher.complete(ActionKind::PostComment);
                ctx.props().on_toast.emit(message);
            }
            ForumViewMsg::CommentAction(action) => match action {
                ui::CommentAction::ToggleLike(comment_id) => {
                    self.dispatch(ctx, ClientCommand::ToggleLike { forum, comment_id });
                }
                ui::CommentAction::Edit(id, content) => {
                    let image_url = self.image_url_of(&id);
                    self.dispatch(
                        ctx,
                        ClientCommand::EditComment {
                            forum,
                            id,
                            content,
                            image_url,
                        },
                    );
                }
                ui::CommentAction::Delete(id) => {
                    self.dispatch(ctx, ClientCommand::DeleteComment { forum, id });
                }
                ui::CommentAction::PostReply(comment_id, content) => {
                    self.dispatch(
                        ctx,
                        ClientCommand::PostReply {
                            forum,
                            comment_id,
                            content,
                            image_url: None,
                        },
                    );
                }
                ui::CommentAction::EditReply(comment_id, id, content) => {
                    let image_url = self
                        .thread
                        .comment(&comment_id)
                        .and_then(|c| c.replies.iter().find(|r| r.id == id))
                        .and_then(|r| r.image_url.clone());
                    self.dispatch(
                        ctx,
                        ClientCommand::EditReply {
                            forum,
                            comment_id,
                            id,
                            content,
                            image_url,
                        },
                    );
                }
                ui::CommentAction::DeleteReply(comment_id, id) => {
                    self.dispatch(
                        ctx,
                        ClientCommand::DeleteReply {
                            forum,
                            comment_id,
                            id,
                        },
                    );
                }
                ui::CommentAction::Report(comment_id, reason) => {
                    if reason.trim().is_empty() {
                        ctx.props()
                            .on_toast
                            .emit(String::from("A report needs a reason."));
                        return true;
                    }
                    let session = ctx.props().session.clone();
                    let report = libris_client::api::Report {
                        forum,
                        comment_id,
                        reason,
                    };
                    ctx.link().send_future(async move {
                        match crate::api::report_comment(&session, report).await {
                            Ok(_) => ForumViewMsg::Reported,
                            Err(e) => {
                                tracing::error!("failed to file report: {e:?}");
                                ForumViewMsg::RestFailed(String::from(
                                    "Could not submit the report.",
                                ))
                            }
                        }
                    });
                }
            },
            ForumViewMsg::InteractionLoaded(i) => self.interaction = Some(i),
            ForumViewMsg::ToggleForumLike | ForumViewMsg::ToggleForumSave => {
                let like = matches!(msg, ForumViewMsg::ToggleForumLike);
                let session = ctx.props().session.clone();
                ctx.link().send_future(async move {
                    let res = match like {
                        true => crate::api::toggle_forum_like(&session, forum).await,
                        false => crate::api::toggle_forum_save(&session, forum).await,
                    };
                    match res {
                        // the server's record replaces ours wholesale
                        Ok(i) => ForumViewMsg::InteractionLoaded(i),
                        Err(e) => {
                            tracing::error!("forum interaction toggle failed: {e:?}");
                            ForumViewMsg::RestFailed(String::from("Could not update the forum."))
                        }
                    }
                });
            }
            ForumViewMsg::RestFailed(message) => ctx.props().on_toast.emit(message),
            ForumViewMsg::Reported => ctx
                .props()
                .on_toast
                .emit(String::from("Report submitted, thank you.")),
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let forum = &ctx.props().forum;
        let interaction_buttons = match &self.interaction {
            None => html! {
                <div class="spinner-border spinner-border-sm" role="status"></div>
            },
            Some(i) => html! {<>
                <button
                    type="button"
                    class={ classes!("btn", "btn-sm", i.is_liked.then(|| "btn-primary")) }
                    onclick={ ctx.link().callback(|_| ForumViewMsg::ToggleForumLike) }
                >
                    { format!("{} ({})", if i.is_liked { "Liked" } else { "Like" }, i.like_count) }
                </button>
                <button
                    type="button"
                    class={ classes!("btn", "btn-sm", i.is_saved.then(|| "btn-primary")) }
                    onclick={ ctx.link().callback(|_| ForumViewMsg::ToggleForumSave) }
                >
                    { format!("{} ({})", if i.is_saved { "Saved" } else { "Save" }, i.save_count) }
                </button>
            </>},
        };

        html! {
            <div class="forum-view h-100 d-flex flex-column">
                <ui::OfflineBanner connection_state={ self.conn.clone() } />
                <div class="d-flex justify-content-between align-items-center p-3 border-bottom">
                    <div>
                        <h2>{ &forum.name }</h2>
                        <small class="text-muted">
                            { format!("{} members", forum.member_count) }
                        </small>
                    </div>
                    <div class="d-flex gap-2">
                        { interaction_buttons }
                    </div>
                </div>
                <div class="flex-fill overflow-auto p-3">
                    <ui::CommentComposer
                        on_submit={ ctx.link().callback(ForumViewMsg::SubmitComment) }
                        busy={ self.dispatcher.is_in_flight(ActionKind::PostComment) }
                        accepted={ self.accepted }
                    />
                    <ui::CommentList
                        comments={ self.thread.comments.clone() }
                        current_user={ ctx.props().session.user.id }
                        on_action={ ctx.link().callback(ForumViewMsg::CommentAction) }
                    />
                </div>
            </div>
        }
    }
}
