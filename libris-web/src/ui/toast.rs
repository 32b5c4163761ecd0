use yew::prelude::*;

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
}

#[derive(Clone, PartialEq, Properties)]
pub struct ToastsProps {
    pub toasts: Vec<Toast>,
    pub on_dismiss: Callback<u64>,
}

#[function_component(Toasts)]
pub fn toasts(p: &ToastsProps) -> Html {
    html! {
        <div class="toast-container position-fixed bottom-0 end-0 p-3">
            { for p.toasts.iter().map(|t| {
                let id = t.id;
                html! {
                    <div class="toast show align-items-center" role="alert" key={ id.to_string() }>
                        <div class="d-flex">
                            <div class="toast-body">{ &t.message }</div>
                            <button
                                type="button"
                                class="btn-close me-2 m-auto"
                                aria-label="Dismiss"
                                onclick={ p.on_dismiss.reform(move |_| id) }
                            >
                            </button>
                        </div>
                    </div>
                }
            }) }
        </div>
    }
}
