use chrono::Utc;
use futures::{channel::mpsc, channel::oneshot, pin_mut, select, FutureExt, SinkExt, StreamExt};
use libris_client::api::{topic, ClientFrame, FeedMessage, ForumId, Time};
use ws_stream_wasm::{WsMessage, WsMeta};

use crate::{api, ui, SessionInfo};

// Pings will be sent every PING_INTERVAL
const PING_INTERVAL_SECS: i64 = 10;
// If the interval between two pongs is more than DISCONNECT_INTERVAL, disconnect
const DISCONNECT_INTERVAL_SECS: i64 = 20;

/// What to do when the messaging channel drops. `Never` leaves the view
/// read-only until remount; `Spaced` retries with a fixed gap between
/// attempts.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReconnectPolicy {
    Never,
    Spaced { seconds: i64 },
}

/// `http(s)://host` becomes `ws(s)://host/ws/forum`; anything else is
/// not a usable backend url.
fn ws_url(host: &str) -> Option<String> {
    host.strip_prefix("http")
        .map(|rest| format!("ws{}/ws/forum", rest))
}

async fn sleep_for(d: chrono::Duration) {
    let _ = wasm_timer::Delay::new(d.to_std().unwrap_or(std::time::Duration::from_secs(0))).await;
}

async fn sleep_until(t: Time) {
    sleep_for(t - Utc::now()).await
}

/// One feed task per mounted discussion view. Owns the websocket for
/// its whole life; the view talks back through the mpsc sender handed
/// over in `FeedConnected` and tears the task down by dropping the
/// oneshot receiver.
pub async fn start_comment_feed(
    session: SessionInfo,
    forum: ForumId,
    policy: ReconnectPolicy,
    feed_sender: yew::html::Scope<ui::ForumView>,
    mut cancel: oneshot::Sender<()>,
) {
    let Some(ws_url) = ws_url(&session.host) else {
        tracing::error!(host = %session.host, "host url is not http(s), cannot open feed");
        feed_sender.send_message(ui::ForumViewMsg::FeedClosed);
        return;
    };

    let mut first_attempt = true;
    'reconnect: loop {
        match first_attempt {
            true => first_attempt = false,
            false => {
                tracing::warn!("lost comment feed connection");
                feed_sender.send_message(ui::ForumViewMsg::FeedDisconnected);
                match policy {
                    ReconnectPolicy::Never => {
                        feed_sender.send_message(ui::ForumViewMsg::FeedClosed);
                        return;
                    }
                    ReconnectPolicy::Spaced { seconds } => {
                        sleep_for(chrono::Duration::seconds(seconds)).await;
                    }
                }
            }
        }

        // Connect and authenticate
        let mut sock = match WsMeta::connect(&ws_url, None).await {
            Ok((_, s)) => s,
            Err(e) => {
                tracing::error!("failed to open feed websocket: {e:?}");
                continue 'reconnect;
            }
        };
        let auth = ClientFrame::Auth {
            token: session.token,
        };
        if sock.send(WsMessage::Text(auth.encode())).await.is_err() {
            continue 'reconnect;
        }
        match sock.next().await {
            Some(WsMessage::Text(t)) if t == "ok" => (),
            Some(other) => {
                tracing::error!(?other, "feed handshake rejected");
                continue 'reconnect;
            }
            None => continue 'reconnect,
        }
        if sock
            .send(WsMessage::Text(
                ClientFrame::Subscribe {
                    topic: topic::forum(forum),
                }
                .encode(),
            ))
            .await
            .is_err()
        {
            continue 'reconnect;
        }
        tracing::info!("successfully authenticated to comment feed");

        // Hand the view its outbound handle, then fetch the initial
        // comment list. The view buffers broadcasts until the fetch
        // lands.
        let (outbound_sender, outbound) = mpsc::unbounded();
        feed_sender.send_message(ui::ForumViewMsg::FeedConnected(outbound_sender));
        match api::fetch_comments(&session, forum).await {
            Ok(comments) => {
                feed_sender.send_message(ui::ForumViewMsg::ReceivedComments(comments))
            }
            Err(e) => {
                tracing::error!("failed to fetch initial comments: {e:?}");
                continue 'reconnect;
            }
        }

        // Run the feed
        let mut next_ping = Utc::now();
        let mut last_pong = Utc::now();
        let mut sock = sock.fuse();
        let mut outbound = outbound.fuse();
        let mut cancellation = cancel.cancellation().fuse();
        loop {
            let delay_pong_reception =
                sleep_until(last_pong + chrono::Duration::seconds(DISCONNECT_INTERVAL_SECS)).fuse();
            let delay_ping_send = sleep_until(next_ping).fuse();
            pin_mut!(delay_ping_send, delay_pong_reception);
            select! {
                _ = cancellation => {
                    if let Err(e) = sock.into_inner().close().await {
                        tracing::warn!("error closing feed websocket: {e:?}");
                    }
                    tracing::info!("disconnected from comment feed");
                    return;
                }
                _ = delay_pong_reception => continue 'reconnect,
                _ = delay_ping_send => {
                    if sock.send(WsMessage::Text(ClientFrame::Ping.encode())).await.is_err() {
                        continue 'reconnect;
                    }
                    next_ping = next_ping + chrono::Duration::seconds(PING_INTERVAL_SECS);
                }
                frame = outbound.next() => {
                    // the view dropped its sender on unmount; cancellation
                    // will fire shortly after
                    let Some(frame) = frame else { continue };
                    let frame: ClientFrame = frame;
                    if sock.send(WsMessage::Text(frame.encode())).await.is_err() {
                        continue 'reconnect;
                    }
                }
                msg = sock.next() => {
                    let text = match msg {
                        None => continue 'reconnect,
                        Some(WsMessage::Text(t)) => t,
                        Some(WsMessage::Binary(b)) => match String::from_utf8(b) {
                            Ok(t) => t,
                            Err(_) => {
                                tracing::warn!("dropping non-utf8 feed frame");
                                continue;
                            }
                        },
                    };
                    match FeedMessage::decode(&text) {
                        Ok(FeedMessage::Pong) => last_pong = Utc::now(),
                        Ok(msg) => feed_sender.send_message(ui::ForumViewMsg::Broadcast(msg)),
                        // malformed payloads are dropped, never trusted
                        Err(e) => tracing::warn!("undecodable feed message: {e:?}"),
                    }
                }
            }
        }
    }
}
