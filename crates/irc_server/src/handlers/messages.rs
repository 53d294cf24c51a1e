//! PRIVMSG — delivery to a channel or to a single nickname.
//!
//! Protocol-error paths return `Err(IrcError::Protocol(line))` instead of
//! writing directly to the client; `dispatch::dispatch` is the one place
//! that turns that into an outbound reply, per SPEC_FULL §4.9/§7.

use crate::errors::IrcError;
use crate::replies::IrcReply;
use crate::server_state::ServerState;
use crate::user_state::Client;

/// Clamps `text` to at most `max_len` bytes, cutting at the nearest char
/// boundary so a multi-byte UTF-8 sequence is never split — matching how
/// IRC daemons bound an oversized line rather than rejecting it outright.
fn truncate_to_limit(text: &str, max_len: usize) -> &str {
    if text.len() <= max_len {
        return text;
    }
    let mut end = max_len;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

pub fn handle_privmsg(client: &Client, state: &ServerState, target: &str, text: &str) -> Result<(), IrcError> {
    let nick = client.nickname_or_star();

    if text.is_empty() {
        return Err(IrcError::Protocol(
            IrcReply::ErrNoTextToSend { nick: &nick }.format(),
        ));
    }
    let text = truncate_to_limit(text, state.config().limits.max_message_length);

    if let Some(channel) = target.strip_prefix('#').map(|_| target) {
        if !state.channels().is_member(channel, client.id) {
            return Err(IrcError::Protocol(
                IrcReply::ErrNoSuchChannel {
                    nick: &nick,
                    channel,
                }
                .format(),
            ));
        }
        let line = IrcReply::PrivMsg {
            nick: &nick,
            target: channel,
            text,
        }
        .format();
        state.deliver_to_channel_except(channel, client.id, &line);
        return Ok(());
    }

    let Some(recipient) = state.find_by_nickname(target) else {
        return Err(IrcError::Protocol(
            IrcReply::ErrNoSuchNick {
                nick: &nick,
                target,
            }
            .format(),
        ));
    };

    if recipient.id == client.id {
        return Err(IrcError::Protocol(
            IrcReply::ErrCannotSendToSelf { nick: &nick }.format(),
        ));
    }

    let line = IrcReply::PrivMsg { nick: &nick, target, text }.format();
    state.deliver_to(recipient.id, line);
    Ok(())
}
