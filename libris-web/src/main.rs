use gloo_storage::{LocalStorage, Storage};
use libris_client::api::{AuthToken, User};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

mod api;
mod feed;
mod ui;
mod util;

lazy_static::lazy_static! {
    pub static ref CLIENT: reqwest::Client = reqwest::Client::new();
}

/// Whole session under one storage key: components never read the token
/// out of storage themselves, they get it through props.
const KEY_SESSION: &str = "session";

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct SessionInfo {
    pub host: String,
    pub token: AuthToken,
    pub user: User,
}

fn main() {
    tracing_wasm::set_as_global_default();
    yew::Renderer::<Root>::new().render();
}

pub enum RootMsg {
    SubmitLogin(ui::LoginDraft),
    LoggedIn(SessionInfo),
    LoginFailed(String),
    Logout,
    Toast(String),
    DismissToast(u64),
}

pub struct Root {
    session: Option<SessionInfo>,
    /// host and email kept from the last session, to prefill the form
    last_login: Option<(String, String)>,
    login_error: Option<String>,
    toasts: Vec<ui::Toast>,
    next_toast_id: u64,
}

impl Root {
    fn push_toast(&mut self, ctx: &Context<Self>, message: String) {
        let id = self.next_toast_id;
        self.next_toast_id += 1;
        self.toasts.push(ui::Toast { id, message });
        ctx.link().send_future(async move {
            let _ = wasm_timer::Delay::new(std::time::Duration::from_secs(5)).await;
            RootMsg::DismissToast(id)
        });
    }
}

impl Component for Root {
    type Message = RootMsg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        Root {
            session: LocalStorage::get(KEY_SESSION).ok(),
            last_login: None,
            login_error: None,
            toasts: Vec::new(),
            next_toast_id: 0,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            RootMsg::SubmitLogin(draft) => {
                self.login_error = None;
                ctx.link().send_future(async move {
                    match api::login(draft).await {
                        Ok(session) => RootMsg::LoggedIn(session),
                        Err(e) => {
                            tracing::error!("login failed: {e:?}");
                            RootMsg::LoginFailed(format!("{e}"))
                        }
                    }
                });
            }
            RootMsg::LoggedIn(session) => {
                if let Err(e) = LocalStorage::set(KEY_SESSION, &session) {
                    tracing::error!("failed saving session to local storage: {e:?}");
                }
                self.session = Some(session);
            }
            RootMsg::LoginFailed(message) => {
                self.login_error = Some(message);
            }
            RootMsg::Logout => {
                LocalStorage::delete(KEY_SESSION);
                if let Some(session) = self.session.take() {
                    self.last_login =
                        Some((session.host.clone(), session.user.full_name.clone()));
                    spawn_local(async move { api::unauth(&session).await });
                }
            }
            RootMsg::Toast(message) => self.push_toast(ctx, message),
            RootMsg::DismissToast(id) => self.toasts.retain(|t| t.id != id),
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let content = match &self.session {
            None => html! {
                <div class="container">
                    <ui::Login
                        info={ self.last_login.clone() }
                        error={ self.login_error.clone() }
                        on_submit={ ctx.link().callback(RootMsg::SubmitLogin) }
                    />
                </div>
            },
            Some(session) => html! {
                <ui::App
                    session={ session.clone() }
                    on_logout={ ctx.link().callback(|_| RootMsg::Logout) }
                    on_toast={ ctx.link().callback(RootMsg::Toast) }
                />
            },
        };
        html! {
            <>
                { content }
                <ui::Toasts
                    toasts={ self.toasts.clone() }
                    on_dismiss={ ctx.link().callback(RootMsg::DismissToast) }
                />
            </>
        }
    }
}
