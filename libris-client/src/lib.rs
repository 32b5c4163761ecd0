mod dispatch;
pub use dispatch::{DispatchOutcome, Dispatcher, Publish};

mod pager;
pub use pager::{BookPager, PageRequest, PagerState};

mod thread;
pub use thread::{Applied, DiscussionThread};

pub mod api {
    pub use libris_api::*;
}
