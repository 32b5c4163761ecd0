use libris_client::api::{Forum, ForumId, Notification, NotificationId, ReadingChallenge};
use yew::prelude::*;

use crate::{api, ui, SessionInfo};

#[derive(Clone, PartialEq, Properties)]
pub struct AppProps {
    pub session: SessionInfo,
    pub on_logout: Callback<()>,
    pub on_toast: Callback<String>,
}

pub enum AppMsg {
    Logout,

    ReceivedForums(Vec<Forum>),
    ReceivedNotifications(Vec<Notification>),
    ReceivedChallenge(ReadingChallenge),

    ShowCatalog,
    SelectForum(ForumId),
    SelectBook(u64),
    CommentDelta((ForumId, i64)),

    MarkRead(NotificationId),
    MarkedRead(NotificationId),
    JoinChallenge,
    RestFailed(String),
}

/// Logged-in shell: forum list and ambient panels in the sidebar, the
/// catalog or one discussion in the main pane.
pub struct App {
    forums: Vec<Forum>,
    selected: Option<ForumId>,
    notifications: Vec<Notification>,
    challenge: Option<ReadingChallenge>,
}

impl App {
    fn fetch_initial(ctx: &Context<Self>) {
        let session = ctx.props().session.clone();
        ctx.link().send_future(async move {
            match api::fetch_forums(&session).await {
                Ok(forums) => AppMsg::ReceivedForums(forums),
                Err(e) => {
                    tracing::error!("failed to fetch forums: {e:?}");
                    AppMsg::RestFailed(String::from("Could not load the forum list."))
                }
            }
        });
        let session = ctx.props().session.clone();
        ctx.link().send_future(async move {
            match api::fetch_notifications(&session).await {
                Ok(notifs) => AppMsg::ReceivedNotifications(notifs),
                Err(e) => {
                    tracing::error!("failed to fetch notifications: {e:?}");
                    AppMsg::RestFailed(String::from("Could not load notifications."))
                }
            }
        });
        let session = ctx.props().session.clone();
        ctx.link().send_future(async move {
            match api::fetch_challenge(&session).await {
                Ok(challenge) => AppMsg::ReceivedChallenge(challenge),
                Err(e) => {
                    tracing::error!("failed to fetch reading challenge: {e:?}");
                    AppMsg::RestFailed(String::from("Could not load the reading challenge."))
                }
            }
        });
    }
}

impl Component for App {
    type Message = AppMsg;
    type Properties = AppProps;

    fn create(ctx: &Context<Self>) -> Self {
        Self::fetch_initial(ctx);
        App {
            forums: Vec::new(),
            selected: None,
            notifications: Vec::new(),
            challenge: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            AppMsg::Logout => ctx.props().on_logout.emit(()),
            AppMsg::ReceivedForums(forums) => {
                if let Some(id) = self.selected {
                    if !forums.iter().any(|f| f.id == id) {
                        self.selected = None;
                    }
                }
                self.forums = forums;
            }
            AppMsg::ReceivedNotifications(notifs) => self.notifications = notifs,
            AppMsg::ReceivedChallenge(challenge) => self.challenge = Some(challenge),
            AppMsg::ShowCatalog => self.selected = None,
            AppMsg::SelectForum(id) => self.selected = Some(id),
            AppMsg::SelectBook(book_id) => {
                match self.forums.iter().find(|f| f.book_id == book_id) {
                    Some(f) => self.selected = Some(f.id),
                    None => ctx
                        .props()
                        .on_toast
                        .emit(String::from("No discussion forum for this book yet.")),
                }
            }
            AppMsg::CommentDelta((forum, delta)) => {
                if let Some(f) = self.forums.iter_mut().find(|f| f.id == forum) {
                    f.comment_count += delta;
                }
            }
            AppMsg::MarkRead(id) => {
                let session = ctx.props().session.clone();
                ctx.link().send_future(async move {
                    match api::mark_notification_read(&session, id).await {
                        Ok(_) => AppMsg::MarkedRead(id),
                        Err(e) => {
                            tracing::error!("failed to mark notification read: {e:?}");
                            AppMsg::RestFailed(String::from("Could not mark the notification."))
                        }
                    }
                });
                return false;
            }
            AppMsg::MarkedRead(id) => {
                if let Some(n) = self.notifications.iter_mut().find(|n| n.id == id) {
                    n.read = true;
                }
            }
            AppMsg::JoinChallenge => {
                let session = ctx.props().session.clone();
                ctx.link().send_future(async move {
                    match api::join_challenge(&session).await {
                        Ok(challenge) => AppMsg::ReceivedChallenge(challenge),
                        Err(e) => {
                            tracing::error!("failed to join challenge: {e:?}");
                            AppMsg::RestFailed(String::from("Could not join the challenge."))
                        }
                    }
                });
                return false;
            }
            AppMsg::RestFailed(message) => ctx.props().on_toast.emit(message),
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let main = match self.selected.and_then(|id| {
            self.forums.iter().find(|f| f.id == id)
        }) {
            Some(forum) => html! {
                <ui::ForumView
                    session={ ctx.props().session.clone() }
                    forum={ forum.clone() }
                    on_toast={ ctx.props().on_toast.clone() }
                    on_comment_delta={ ctx.link().callback(AppMsg::CommentDelta) }
                />
            },
            None => html! {
                <ui::BookList
                    on_select_book={ ctx.link().callback(AppMsg::SelectBook) }
                />
            },
        };

        html! {
            <div class="container-fluid vh-100">
                <div class="row h-100">
                    <nav class="col-md-3 sidebar overflow-auto p-0 d-flex flex-column">
                        <div class="d-flex justify-content-between align-items-center p-2 border-bottom">
                            <strong>{ &ctx.props().session.user.full_name }</strong>
                            <button
                                type="button"
                                class="btn btn-sm"
                                onclick={ ctx.link().callback(|_| AppMsg::Logout) }
                            >
                                { "Logout" }
                            </button>
                        </div>
                        <ui::NotificationsMenu
                            notifications={ self.notifications.clone() }
                            on_mark_read={ ctx.link().callback(AppMsg::MarkRead) }
                        />
                        <div class="list-group list-group-flush flex-fill overflow-auto">
                            <button
                                type="button"
                                class={ classes!(
                                    "list-group-item", "list-group-item-action",
                                    self.selected.is_none().then(|| "active"),
                                ) }
                                onclick={ ctx.link().callback(|_| AppMsg::ShowCatalog) }
                            >
                                { "Browse the catalog" }
                            </button>
                            { for self.forums.iter().map(|f| {
                                let id = f.id;
                                html! {
                                    <button
                                        type="button"
                                        key={ id.0.to_string() }
                                        class={ classes!(
                                            "list-group-item", "list-group-item-action",
                                            (self.selected == Some(id)).then(|| "active"),
                                        ) }
                                        onclick={ ctx.link().callback(move |_| AppMsg::SelectForum(id)) }
                                    >
                                        <div class="d-flex justify-content-between">
                                            <span>{ &f.name }</span>
                                            <small>{ f.comment_count }</small>
                                        </div>
                                    </button>
                                }
                            }) }
                        </div>
                        <ui::ChallengeCard
                            challenge={ self.challenge.clone() }
                            on_join={ ctx.link().callback(|_| AppMsg::JoinChallenge) }
                        />
                    </nav>
                    <main class="col-md-9 h-100 p-0">
                        { main }
                    </main>
                </div>
            </div>
        }
    }
}
