use yew::prelude::*;

/// Raw form contents. The image stays a browser `File` until submit
/// time; bytes are only read once the upload actually starts.
#[derive(Clone, Debug)]
pub struct CommentDraft {
    pub content: String,
    pub image: Option<gloo_file::File>,
}

#[derive(Clone, PartialEq, Properties)]
pub struct CommentComposerProps {
    pub on_submit: Callback<CommentDraft>,
    /// A submission is being uploaded or awaits its echo; posting is
    /// disabled until it resolves.
    #[prop_or_default]
    pub busy: bool,
    /// Bumped by the parent once a submission is accepted. The form
    /// keeps its contents until then, so a failed upload or a
    /// validation error leaves the draft intact.
    #[prop_or_default]
    pub accepted: u64,
}

pub struct CommentComposer {
    content: String,
    image: Option<gloo_file::File>,
    file_input: NodeRef,
}

pub enum ComposerMsg {
    ContentChanged(String),
    ImagePicked(Option<gloo_file::File>),
    SubmitClicked,
}

impl Component for CommentComposer {
    type Message = ComposerMsg;
    type Properties = CommentComposerProps;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            content: String::new(),
            image: None,
            file_input: NodeRef::default(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            ComposerMsg::ContentChanged(c) => self.content = c,
            ComposerMsg::ImagePicked(f) => self.image = f,
            ComposerMsg::SubmitClicked => {
                ctx.props().on_submit.emit(CommentDraft {
                    content: self.content.clone(),
                    image: self.image.clone(),
                });
            }
        }
        true
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        if ctx.props().accepted != old_props.accepted {
            self.content.clear();
            self.image = None;
            if let Some(input) = self.file_input.cast::<web_sys::HtmlInputElement>() {
                input.set_value("");
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let on_content = ctx.link().callback(|e: web_sys::Event| {
            let area: web_sys::HtmlTextAreaElement = e.target_unchecked_into();
            ComposerMsg::ContentChanged(area.value())
        });
        let on_file = ctx.link().callback(|e: web_sys::Event| {
            let input: web_sys::HtmlInputElement = e.target_unchecked_into();
            let file = input
                .files()
                .and_then(|fs| fs.get(0))
                .map(gloo_file::File::from);
            ComposerMsg::ImagePicked(file)
        });
        html! {
            <div class="comment-composer card p-3 mb-3">
                <textarea
                    class="form-control mb-2"
                    rows="3"
                    placeholder="Join the discussion..."
                    value={ self.content.clone() }
                    onchange={ on_content }
                >
                </textarea>
                <div class="d-flex justify-content-between">
                    <input
                        ref={ self.file_input.clone() }
                        type="file"
                        class="form-control form-control-sm w-auto"
                        accept="image/*"
                        onchange={ on_file }
                    />
                    <button
                        type="button"
                        class="btn btn-primary"
                        disabled={ ctx.props().busy }
                        onclick={ ctx.link().callback(|_| ComposerMsg::SubmitClicked) }
                    >
                        { "Post" }
                    </button>
                </div>
            </div>
        }
    }
}
