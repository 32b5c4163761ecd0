use libris_client::api::{Notification, NotificationId};
use yew::prelude::*;

use crate::util;

#[derive(Clone, PartialEq, Properties)]
pub struct NotificationsMenuProps {
    pub notifications: Vec<Notification>,
    pub on_mark_read: Callback<NotificationId>,
}

#[function_component(NotificationsMenu)]
pub fn notifications_menu(p: &NotificationsMenuProps) -> Html {
    let open = use_state(|| false);
    let unread = p.notifications.iter().filter(|n| !n.read).count();

    let list = match *open {
        false => html! {},
        true if p.notifications.is_empty() => html! {
            <p class="text-muted p-2 mb-0">{ "Nothing yet." }</p>
        },
        true => html! {
            <ul class="list-group list-group-flush">
                { for p.notifications.iter().map(|n| {
                    let id = n.id;
                    html! {
                        <li
                            key={ id.0.to_string() }
                            class={ classes!("list-group-item", n.read.then(|| "text-muted")) }
                        >
                            <div>{ &n.message }</div>
                            <div class="d-flex justify-content-between align-items-center">
                                <small class="text-muted">{ util::format_local(n.created_at) }</small>
                                if !n.read {
                                    <button
                                        type="button"
                                        class="btn btn-sm"
                                        onclick={ p.on_mark_read.reform(move |_| id) }
                                    >
                                        { "Mark read" }
                                    </button>
                                }
                            </div>
                        </li>
                    }
                }) }
            </ul>
        },
    };

    html! {
        <div class="notifications-menu border-bottom">
            <button
                type="button"
                class="btn w-100 text-start"
                onclick={ let open = open.clone(); Callback::from(move |_| open.set(!*open)) }
            >
                { match unread {
                    0 => String::from("Notifications"),
                    n => format!("Notifications ({n})"),
                } }
            </button>
            { list }
        </div>
    }
}
