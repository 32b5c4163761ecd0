use yew::prelude::*;

use crate::ui;

#[derive(Clone, PartialEq, Properties)]
pub struct OfflineBannerProps {
    pub connection_state: ui::ConnState,
}

#[function_component(OfflineBanner)]
pub fn offline_banner(p: &OfflineBannerProps) -> Html {
    let online = matches!(p.connection_state, ui::ConnState::Ready);
    let message = match p.connection_state {
        ui::ConnState::Disconnected => "Live updates lost. Trying to reconnect...",
        ui::ConnState::Connected(_) => "Catching up on the discussion...",
        ui::ConnState::Closed => "Live updates unavailable. Reload the page to reconnect.",
        ui::ConnState::Ready => "",
    };

    html! {
        <div
            class={ classes!(
                "offline-banner", online.then(|| "is-online"),
                "d-flex", "align-items-center"
            ) }
            aria-hidden={ if online { "true" } else { "false" } }
        >
            if !matches!(p.connection_state, ui::ConnState::Closed) {
                <div class="spinner-border spinner-border-sm m-2" role="status"></div>
            }
            <div>{ message }</div>
        </div>
    }
}
