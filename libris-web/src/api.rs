use anyhow::Context;
use libris_client::api::{
    ApiResponse, AuthToken, BookPage, Comment, Error, Forum, ForumId, ForumInteraction,
    NewSession, Notification, NotificationId, ReadingChallenge, Report, User,
};
use serde::de::DeserializeOwned;

use crate::{ui::LoginDraft, SessionInfo};

/// Public catalog; read-only and unauthenticated, separate from the
/// forum backend.
const CATALOG_URL: &str = match option_env!("LIBRIS_CATALOG_URL") {
    Some(url) => url,
    None => "https://gutendex.com",
};

const DEVICE_NAME: &str = "libris-web";

async fn read_response<R>(resp: reqwest::Response) -> anyhow::Result<R>
where
    R: DeserializeOwned,
{
    if !resp.status().is_success() {
        let body = resp.bytes().await.context("reading error response")?;
        return Err(match Error::parse(&body) {
            Ok(e) => anyhow::Error::new(e),
            Err(_) => anyhow::anyhow!("server answered with an unparseable error"),
        });
    }
    let envelope: ApiResponse<R> = resp.json().await.context("parsing server response")?;
    Ok(envelope.into_result()?)
}

async fn fetch<R>(session: &SessionInfo, path: &str) -> anyhow::Result<R>
where
    R: DeserializeOwned,
{
    let resp = crate::CLIENT
        .get(format!("{}/api/{}", session.host, path))
        .bearer_auth(session.token.0)
        .send()
        .await
        .with_context(|| format!("fetching {path}"))?;
    read_response(resp).await
}

async fn post<R, B>(session: &SessionInfo, path: &str, body: &B) -> anyhow::Result<R>
where
    R: DeserializeOwned,
    B: serde::Serialize,
{
    let resp = crate::CLIENT
        .post(format!("{}/api/{}", session.host, path))
        .bearer_auth(session.token.0)
        .json(body)
        .send()
        .await
        .with_context(|| format!("posting to {path}"))?;
    read_response(resp).await
}

pub async fn login(draft: LoginDraft) -> anyhow::Result<SessionInfo> {
    let session = NewSession::new(draft.email, draft.password, String::from(DEVICE_NAME));
    session.validate()?;
    let resp = crate::CLIENT
        .post(format!("{}/api/auth", draft.host))
        .json(&session)
        .send()
        .await
        .context("authenticating")?;
    let token: AuthToken = read_response(resp).await?;
    let mut session = SessionInfo {
        host: draft.host,
        token,
        user: User::new(libris_client::api::UserId::stub(), String::new()),
    };
    session.user = fetch_profile(&session).await?;
    Ok(session)
}

pub async fn unauth(session: &SessionInfo) {
    let resp = crate::CLIENT
        .post(format!("{}/api/unauth", session.host))
        .bearer_auth(session.token.0)
        .send()
        .await;
    match resp {
        Err(e) => tracing::error!("failed to unauth: {:?}", e),
        Ok(resp) if !resp.status().is_success() => {
            tracing::error!("failed to unauth: response is not success {:?}", resp)
        }
        Ok(_) => (),
    }
}

pub async fn fetch_profile(session: &SessionInfo) -> anyhow::Result<User> {
    fetch(session, "whoami").await
}

pub async fn fetch_forums(session: &SessionInfo) -> anyhow::Result<Vec<Forum>> {
    fetch(session, "forums").await
}

pub async fn fetch_comments(
    session: &SessionInfo,
    forum: ForumId,
) -> anyhow::Result<Vec<Comment>> {
    fetch(session, &format!("forums/{}/comments", forum.0)).await
}

pub async fn fetch_interaction(
    session: &SessionInfo,
    forum: ForumId,
) -> anyhow::Result<ForumInteraction> {
    fetch(session, &format!("forums/{}/interaction", forum.0)).await
}

/// Toggle endpoints answer with the whole interaction record, which
/// replaces local state wholesale.
pub async fn toggle_forum_like(
    session: &SessionInfo,
    forum: ForumId,
) -> anyhow::Result<ForumInteraction> {
    post(session, &format!("forums/{}/like", forum.0), &()).await
}

pub async fn toggle_forum_save(
    session: &SessionInfo,
    forum: ForumId,
) -> anyhow::Result<ForumInteraction> {
    post(session, &format!("forums/{}/save", forum.0), &()).await
}

/// Images go over REST before the messaging action embedding the
/// returned url is sent; an upload failure means no action is sent.
pub async fn upload_image(
    session: &SessionInfo,
    filename: &str,
    bytes: Vec<u8>,
) -> anyhow::Result<String> {
    let resp = crate::CLIENT
        .post(format!("{}/api/upload-image", session.host))
        .bearer_auth(session.token.0)
        .query(&[("filename", filename)])
        .body(bytes)
        .send()
        .await
        .context("uploading image")?;
    read_response(resp).await
}

pub async fn report_comment(session: &SessionInfo, report: Report) -> anyhow::Result<bool> {
    post(session, "reports", &report).await
}

pub async fn fetch_notifications(session: &SessionInfo) -> anyhow::Result<Vec<Notification>> {
    fetch(session, "notifications").await
}

pub async fn mark_notification_read(
    session: &SessionInfo,
    id: NotificationId,
) -> anyhow::Result<bool> {
    post(session, &format!("notifications/{}/read", id.0), &()).await
}

pub async fn fetch_challenge(session: &SessionInfo) -> anyhow::Result<ReadingChallenge> {
    fetch(session, "challenge").await
}

pub async fn join_challenge(session: &SessionInfo) -> anyhow::Result<ReadingChallenge> {
    post(session, "challenge/join", &()).await
}

/// The catalog has its own envelope-less pagination contract:
/// `{results, next}`.
pub async fn search_books(search: String, page: u32) -> anyhow::Result<BookPage> {
    let mut req = crate::CLIENT
        .get(format!("{}/books", CATALOG_URL))
        .query(&[("page", page.to_string())]);
    if !search.is_empty() {
        req = req.query(&[("search", &search)]);
    }
    let resp = req.send().await.context("querying book catalog")?;
    if !resp.status().is_success() {
        anyhow::bail!("catalog answered {}", resp.status());
    }
    resp.json().await.context("parsing catalog page")
}
