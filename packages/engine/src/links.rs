//! Deep-link construction for the buttons and share links the front-end
//! renders. Pure string assembly; the transport never calls back into the
//! core.

/// Entry deep link that starts the bot with the given payload.
pub fn start_link(bot_username: &str, payload: &str) -> String {
    format!("https://t.me/{bot_username}?start={payload}")
}

/// Shareable entry link for an artifact access code.
pub fn entry_link(bot_username: &str, code: &str) -> String {
    start_link(bot_username, code)
}

/// Personalized referral link carrying `ref_<user_id>`.
pub fn referral_link(bot_username: &str, user_id: i64) -> String {
    start_link(bot_username, &format!("ref_{user_id}"))
}

/// Private-channel link for a numeric channel id. Numeric ids carry a
/// `-100` transport prefix that the web link format drops.
pub fn channel_link(channel_id: &str) -> String {
    let inner = channel_id.strip_prefix("-100").unwrap_or(channel_id);
    format!("https://t.me/c/{inner}")
}
