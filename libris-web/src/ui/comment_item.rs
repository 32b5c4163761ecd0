use libris_client::api::{Comment, CommentId, Reply, ReplyId, UserId};
use yew::prelude::*;

use crate::util;

/// Everything a rendered comment can ask its owning view to do. The
/// view turns these into messaging actions (guarded by the dispatcher)
/// or REST calls, never the item itself.
#[derive(Clone, Debug)]
pub enum CommentAction {
    ToggleLike(CommentId),
    Edit(CommentId, String),
    Delete(CommentId),
    PostReply(CommentId, String),
    EditReply(CommentId, ReplyId, String),
    DeleteReply(CommentId, ReplyId),
    Report(CommentId, String),
}

#[derive(Clone, PartialEq, Properties)]
pub struct CommentItemProps {
    pub comment: Comment,
    pub current_user: UserId,
    pub on_action: Callback<CommentAction>,
}

#[function_component(CommentItem)]
pub fn comment_item(p: &CommentItemProps) -> Html {
    let edit = use_state(|| None::<String>);
    let reply = use_state(|| None::<String>);
    let report = use_state(|| None::<String>);

    let c = &p.comment;
    let id = c.id;
    let mine = c.user.id == p.current_user;

    let like_label = match c.liked_by_me {
        true => "Unlike",
        false => "Like",
    };

    html! {
        <li class="list-group-item">
            <div class="d-flex justify-content-between">
                <strong>{ &c.user.full_name }</strong>
                <small class="text-muted">{ util::format_local(c.created_at) }</small>
            </div>
            { content_div(p, mine, edit.clone()) }
            if let Some(url) = &c.image_url {
                <img class="comment-image img-fluid my-2" src={ url.clone() } alt="attached image" />
            }
            <div class="d-flex gap-2 align-items-center">
                <button
                    type="button"
                    class={ classes!("btn", "btn-sm", c.liked_by_me.then(|| "btn-primary")) }
                    onclick={ p.on_action.reform(move |_| CommentAction::ToggleLike(id)) }
                >
                    { format!("{} ({})", like_label, c.like_count) }
                </button>
                <button
                    type="button"
                    class="btn btn-sm"
                    onclick={ let reply = reply.clone(); Callback::from(move |_| {
                        reply.set(Some(String::new()))
                    }) }
                >
                    { "Reply" }
                </button>
                if mine {
                    <button
                        type="button"
                        class="btn btn-sm text-danger"
                        onclick={ p.on_action.reform(move |_| CommentAction::Delete(id)) }
                    >
                        { "Delete" }
                    </button>
                } else {
                    <button
                        type="button"
                        class="btn btn-sm"
                        onclick={ let report = report.clone(); Callback::from(move |_| {
                            report.set(Some(String::new()))
                        }) }
                    >
                        { "Report" }
                    </button>
                }
            </div>
            if let Some(reason) = (*report).clone() {
                { inline_input(
                    "Why are you reporting this comment?",
                    reason,
                    report.clone(),
                    {
                        let report = report.clone();
                        p.on_action.reform(move |reason| {
                            report.set(None);
                            CommentAction::Report(id, reason)
                        })
                    },
                ) }
            }
            if let Some(draft) = (*reply).clone() {
                { inline_input(
                    "Write a reply...",
                    draft,
                    reply.clone(),
                    {
                        let reply = reply.clone();
                        p.on_action.reform(move |content| {
                            reply.set(None);
                            CommentAction::PostReply(id, content)
                        })
                    },
                ) }
            }
            if !c.replies.is_empty() {
                <ul class="list-group mt-2 ms-4">
                    { for c.replies.iter().map(|r| html! {
                        <ReplyItem
                            key={ r.id.0.to_string() }
                            comment_id={ id }
                            reply={ r.clone() }
                            current_user={ p.current_user }
                            on_action={ p.on_action.clone() }
                        />
                    }) }
                </ul>
            }
        </li>
    }
}

fn content_div(p: &CommentItemProps, mine: bool, edit: UseStateHandle<Option<String>>) -> Html {
    let id = p.comment.id;
    let current = p.comment.content.clone();
    match (*edit).clone() {
        Some(text) => {
            let on_validate = {
                let edit = edit.clone();
                p.on_action.reform(move |content| {
                    edit.set(None);
                    CommentAction::Edit(id, content)
                })
            };
            html! { { inline_input("", text, edit, on_validate) } }
        }
        None if mine => html! {
            <div
                class="comment-content py-1"
                title="Double-click to edit"
                ondblclick={ Callback::from(move |_| edit.set(Some(current.clone()))) }
            >
                { &p.comment.content }
            </div>
        },
        None => html! {
            <div class="comment-content py-1">{ &p.comment.content }</div>
        },
    }
}

#[derive(Clone, PartialEq, Properties)]
struct ReplyItemProps {
    comment_id: CommentId,
    reply: Reply,
    current_user: UserId,
    on_action: Callback<CommentAction>,
}

#[function_component(ReplyItem)]
fn reply_item(p: &ReplyItemProps) -> Html {
    let edit = use_state(|| None::<String>);
    let comment_id = p.comment_id;
    let id = p.reply.id;
    let mine = p.reply.user.id == p.current_user;
    let current = p.reply.content.clone();

    let content = match (*edit).clone() {
        Some(text) => {
            let on_validate = {
                let edit = edit.clone();
                p.on_action.reform(move |content| {
                    edit.set(None);
                    CommentAction::EditReply(comment_id, id, content)
                })
            };
            html! { { inline_input("", text, edit.clone(), on_validate) } }
        }
        None if mine => html! {
            <span
                title="Double-click to edit"
                ondblclick={ let edit = edit.clone(); Callback::from(move |_| {
                    edit.set(Some(current.clone()))
                }) }
            >
                { &p.reply.content }
            </span>
        },
        None => html! { <span>{ &p.reply.content }</span> },
    };

    html! {
        <li class="list-group-item d-flex justify-content-between align-items-center">
            <div>
                <strong class="me-2">{ &p.reply.user.full_name }</strong>
                { content }
            </div>
            if mine {
                <button
                    type="button"
                    class="btn btn-sm text-danger"
                    onclick={ p.on_action.reform(move |_| {
                        CommentAction::DeleteReply(comment_id, id)
                    }) }
                >
                    { "Delete" }
                </button>
            }
        </li>
    }
}

// Shared one-line editor. Enter validates, Escape cancels.
fn inline_input(
    placeholder: &'static str,
    text: String,
    state: UseStateHandle<Option<String>>,
    on_validate: Callback<String>,
) -> Html {
    html! {
        <input
            type="text"
            class="form-control my-1"
            placeholder={ placeholder }
            value={ text.clone() }
            onchange={ let state = state.clone(); Callback::from(move |e: web_sys::Event| {
                let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                state.set(Some(input.value()))
            }) }
            onkeyup={ Callback::from(move |e: web_sys::KeyboardEvent| {
                match &e.key() as &str {
                    "Enter" => on_validate.emit(text.clone()),
                    "Escape" => state.set(None),
                    _ => (),
                }
            }) }
        />
    }
}
