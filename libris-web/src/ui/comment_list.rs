use libris_client::api::{Comment, UserId};
use yew::prelude::*;

use crate::ui;

#[derive(Clone, PartialEq, Properties)]
pub struct CommentListProps {
    /// Newest first, straight from the store
    pub comments: Vec<Comment>,
    pub current_user: UserId,
    pub on_action: Callback<ui::CommentAction>,
}

#[function_component(CommentList)]
pub fn comment_list(p: &CommentListProps) -> Html {
    if p.comments.is_empty() {
        return html! {
            <p class="text-muted text-center my-4">{ "No comments yet. Start the discussion!" }</p>
        };
    }
    html! {
        <ul class="list-group comment-list">
            { for p.comments.iter().map(|c| html! {
                <ui::CommentItem
                    key={ c.id.0.to_string() }
                    comment={ c.clone() }
                    current_user={ p.current_user }
                    on_action={ p.on_action.clone() }
                />
            }) }
        </ul>
    }
}
