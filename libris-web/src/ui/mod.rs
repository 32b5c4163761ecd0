mod app;
pub use app::App;

mod book_list;
pub use book_list::BookList;

mod challenge_card;
pub use challenge_card::ChallengeCard;

mod comment_composer;
pub use comment_composer::{CommentComposer, CommentDraft};

mod comment_item;
pub use comment_item::{CommentAction, CommentItem};

mod comment_list;
pub use comment_list::CommentList;

mod forum_view;
pub use forum_view::{ConnState, ForumView, ForumViewMsg};

mod login;
pub use login::{Login, LoginDraft};

mod notifications_menu;
pub use notifications_menu::NotificationsMenu;

mod offline_banner;
pub use offline_banner::OfflineBanner;

mod toast;
pub use toast::{Toast, Toasts};
