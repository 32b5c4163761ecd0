use yew::prelude::*;

/// What the form hands up on submit; the password never touches local
/// storage.
#[derive(Clone, Debug, PartialEq)]
pub struct LoginDraft {
    pub host: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, PartialEq, Properties)]
pub struct LoginProps {
    /// (host, email) of the previous session, to prefill the form
    pub info: Option<(String, String)>,
    pub error: Option<String>,
    pub on_submit: Callback<LoginDraft>,
}

pub struct Login {
    host: String,
    email: String,
    password: String,
}

pub enum LoginMsg {
    HostChanged(String),
    EmailChanged(String),
    PasswordChanged(String),
    SubmitClicked,
}

impl Component for Login {
    type Message = LoginMsg;
    type Properties = LoginProps;

    fn create(ctx: &Context<Self>) -> Self {
        let (host, email) = match &ctx.props().info {
            Some((h, e)) => (h.clone(), e.clone()),
            None => (String::new(), String::new()),
        };
        Self {
            host,
            email,
            password: String::new(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            LoginMsg::HostChanged(h) => self.host = h,
            LoginMsg::EmailChanged(e) => self.email = e,
            LoginMsg::PasswordChanged(p) => self.password = p,
            LoginMsg::SubmitClicked => {
                ctx.props().on_submit.emit(LoginDraft {
                    host: self.host.clone(),
                    email: self.email.clone(),
                    password: self.password.clone(),
                });
                return false;
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        macro_rules! callback_for {
            ($msg:ident) => {
                ctx.link().callback(|e: web_sys::Event| {
                    let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                    LoginMsg::$msg(input.value())
                })
            };
        }
        html! {<>
            <div class="text-center my-4">
                <h1>{ "Libris" }</h1>
            </div>
            if let Some(e) = &ctx.props().error {
                <div class="alert alert-danger" role="alert">{ e }</div>
            }
            <form class="login-form">
                <div class="input-group mb-3">
                    <label class="input-group-text col-xl-1" for="host">{ "Host" }</label>
                    <input
                        type="url"
                        class="form-control form-control-lg"
                        id="host"
                        placeholder="https://example.org"
                        value={self.host.clone()}
                        onchange={callback_for!(HostChanged)}
                    />
                </div>
                <div class="input-group mb-3">
                    <label class="input-group-text col-xl-1" for="email">{ "Email" }</label>
                    <input
                        type="email"
                        class="form-control form-control-lg"
                        id="email"
                        placeholder="reader@example.org"
                        value={self.email.clone()}
                        onchange={callback_for!(EmailChanged)}
                    />
                </div>
                <div class="input-group mb-3">
                    <label class="input-group-text col-xl-1" for="password">{ "Password" }</label>
                    <input
                        type="password"
                        class="form-control form-control-lg"
                        id="password"
                        placeholder="password"
                        value={self.password.clone()}
                        onchange={callback_for!(PasswordChanged)}
                    />
                </div>
                <button
                    type="submit"
                    class="btn btn-primary"
                    onclick={ctx.link().callback(|_| LoginMsg::SubmitClicked)}
                >
                    { "Log in" }
                </button>
            </form>
        </>}
    }
}
