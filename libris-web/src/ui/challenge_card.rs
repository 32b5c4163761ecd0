use libris_client::api::ReadingChallenge;
use yew::prelude::*;

#[derive(Clone, PartialEq, Properties)]
pub struct ChallengeCardProps {
    pub challenge: Option<ReadingChallenge>,
    pub on_join: Callback<()>,
}

#[function_component(ChallengeCard)]
pub fn challenge_card(p: &ChallengeCardProps) -> Html {
    let Some(c) = &p.challenge else {
        return html! {};
    };
    let body = match c.joined {
        false => html! {
            <button
                type="button"
                class="btn btn-sm btn-outline-primary"
                onclick={ p.on_join.reform(|_| ()) }
            >
                { format!("Join the {} challenge", c.year) }
            </button>
        },
        true => {
            let pct = c.percent_done();
            html! {<>
                <div class="progress mb-1">
                    <div
                        class="progress-bar"
                        role="progressbar"
                        style={ format!("width: {pct}%") }
                        aria-valuenow={ pct.to_string() }
                        aria-valuemin="0"
                        aria-valuemax="100"
                    >
                    </div>
                </div>
                <small class="text-muted">
                    { format!("{} of {} books read", c.books_read, c.goal) }
                </small>
            </>}
        }
    };
    html! {
        <div class="challenge-card p-2 border-top">
            <h6>{ format!("{} Reading Challenge", c.year) }</h6>
            { body }
        </div>
    }
}
