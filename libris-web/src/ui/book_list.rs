use libris_client::{api::Book, BookPager, PagerState};
use yew::prelude::*;

const SEARCH_DEBOUNCE_MS: u64 = 250;
/// Fetch the next page once the viewport is this close to the bottom.
const SCROLL_MARGIN_PX: i32 = 200;

#[derive(Clone, PartialEq, Properties)]
pub struct BookListProps {
    /// Catalog id of the clicked book; the parent resolves it to a
    /// forum (or tells the user there is none).
    pub on_select_book: Callback<u64>,
}

pub enum BookListMsg {
    SearchInput(String),
    DebounceFired(u64, String),
    Scrolled,
    PageLoaded(u32, Result<libris_client::api::BookPage, ()>),
    RetryClicked,
}

pub struct BookList {
    pager: BookPager,
    /// What the user has typed so far. The pager only learns about it
    /// after the debounce, but renders in between (a scroll fetch
    /// landing mid-typing) must not revert the input to the committed
    /// term.
    search_text: String,
    /// Bumped on every keystroke; only the latest debounce timer wins.
    search_generation: u64,
    scroller: NodeRef,
}

impl BookList {
    fn maybe_fetch(&mut self, ctx: &Context<Self>) {
        if let Some(req) = self.pager.next_request() {
            ctx.link().send_future(async move {
                match crate::api::search_books(req.search, req.page).await {
                    Ok(page) => BookListMsg::PageLoaded(req.page, Ok(page)),
                    Err(e) => {
                        tracing::error!("catalog fetch failed: {e:?}");
                        BookListMsg::PageLoaded(req.page, Err(()))
                    }
                }
            });
        }
    }

    fn near_bottom(&self) -> bool {
        match self.scroller.cast::<web_sys::Element>() {
            Some(e) => e.scroll_top() + e.client_height() + SCROLL_MARGIN_PX >= e.scroll_height(),
            None => false,
        }
    }
}

impl Component for BookList {
    type Message = BookListMsg;
    type Properties = BookListProps;

    fn create(ctx: &Context<Self>) -> Self {
        let mut this = BookList {
            pager: BookPager::new(),
            search_text: String::new(),
            search_generation: 0,
            scroller: NodeRef::default(),
        };
        this.maybe_fetch(ctx);
        this
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            BookListMsg::SearchInput(term) => {
                self.search_text = term.clone();
                self.search_generation += 1;
                let generation = self.search_generation;
                ctx.link().send_future(async move {
                    let _ = wasm_timer::Delay::new(std::time::Duration::from_millis(
                        SEARCH_DEBOUNCE_MS,
                    ))
                    .await;
                    BookListMsg::DebounceFired(generation, term)
                });
                return false;
            }
            BookListMsg::DebounceFired(generation, term) => {
                if generation != self.search_generation {
                    return false;
                }
                if self.pager.set_search(term) {
                    self.maybe_fetch(ctx);
                }
            }
            BookListMsg::Scrolled => {
                if self.near_bottom() {
                    self.maybe_fetch(ctx);
                }
                return false;
            }
            BookListMsg::PageLoaded(page, result) => {
                self.pager.apply_page(page, result);
                // keep filling until the list actually overflows
                if self.pager.state == PagerState::Idle && self.near_bottom() {
                    self.maybe_fetch(ctx);
                }
            }
            BookListMsg::RetryClicked => {
                self.pager.retry();
                self.maybe_fetch(ctx);
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let footer = match self.pager.state {
            PagerState::Fetching(_) => html! {
                <div class="text-center my-3">
                    <div class="spinner-border" role="status"></div>
                </div>
            },
            PagerState::Failed => html! {
                <div class="alert alert-warning d-flex justify-content-between align-items-center">
                    { "The catalog could not be reached." }
                    <button
                        type="button"
                        class="btn btn-sm btn-outline-secondary"
                        onclick={ ctx.link().callback(|_| BookListMsg::RetryClicked) }
                    >
                        { "Retry" }
                    </button>
                </div>
            },
            PagerState::Exhausted => html! {
                <p class="text-muted text-center my-3">{ "End of the catalog." }</p>
            },
            PagerState::Idle => html! {},
        };

        html! {
            <div class="h-100 d-flex flex-column">
                <div class="p-3 border-bottom">
                    <input
                        type="search"
                        class="form-control"
                        placeholder="Search books by title or author..."
                        value={ self.search_text.clone() }
                        oninput={ ctx.link().callback(|e: web_sys::InputEvent| {
                            let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                            BookListMsg::SearchInput(input.value())
                        }) }
                    />
                </div>
                <div
                    ref={ self.scroller.clone() }
                    class="flex-fill overflow-auto p-3"
                    onscroll={ ctx.link().callback(|_| BookListMsg::Scrolled) }
                >
                    <div class="row g-3">
                        { for self.pager.books.iter().map(|b| html! {
                            <BookCard
                                key={ b.id.to_string() }
                                book={ b.clone() }
                                on_select={ ctx.props().on_select_book.clone() }
                            />
                        }) }
                    </div>
                    { footer }
                </div>
            </div>
        }
    }
}

#[derive(Clone, PartialEq, Properties)]
pub struct BookCardProps {
    pub book: Book,
    pub on_select: Callback<u64>,
}

#[function_component(BookCard)]
pub fn book_card(p: &BookCardProps) -> Html {
    let id = p.book.id;
    let authors = p
        .book
        .authors
        .iter()
        .map(|a| a.name.clone())
        .collect::<Vec<_>>()
        .join(", ");
    html! {
        <div class="col-sm-6 col-lg-4 col-xxl-3">
            <div
                class="card h-100 book-card"
                role="button"
                onclick={ p.on_select.reform(move |_| id) }
            >
                if let Some(cover) = p.book.cover() {
                    <img class="card-img-top" src={ cover.to_string() } alt="book cover" />
                }
                <div class="card-body">
                    <h5 class="card-title">{ &p.book.title }</h5>
                    if !authors.is_empty() {
                        <p class="card-text text-muted">{ authors }</p>
                    }
                    <small class="text-muted">
                        { format!("{} downloads", p.book.download_count) }
                    </small>
                </div>
            </div>
        </div>
    }
}
