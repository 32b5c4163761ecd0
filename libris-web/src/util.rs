use std::str::FromStr;

use libris_client::api::{Error, Time};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(inline_js = "
    export function get_timezone() {
        return Intl.DateTimeFormat().resolvedOptions().timeZone;
    }
")]
extern "C" {
    fn get_timezone() -> String;
}

lazy_static::lazy_static! {
    static ref LOCAL_TZ: chrono_tz::Tz = {
        chrono_tz::Tz::from_str(&get_timezone())
            .expect("host js timezone is not in chrono-tz database")
    };
}

pub fn local_tz() -> chrono_tz::Tz {
    *LOCAL_TZ
}

pub fn format_local(t: Time) -> String {
    t.with_timezone(&local_tz())
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

pub fn ban_message(expires_at: Option<Time>) -> String {
    match expires_at {
        None => String::from("You are permanently banned from forum interactions."),
        Some(t) => format!(
            "You are banned from forum interactions until {}.",
            format_local(t)
        ),
    }
}

/// One user-facing line per error; everything dispatcher- or REST-side
/// funnels through here before becoming a toast.
pub fn describe_error(e: &Error) -> String {
    match e {
        Error::NotLoggedIn => String::from("Please log in to interact with the forum."),
        Error::Banned { expires_at } => ban_message(*expires_at),
        Error::MissingContent => {
            String::from("A comment needs either some text or an image.")
        }
        other => format!("{other}"),
    }
}
