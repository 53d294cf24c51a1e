//! JOIN/PART/WHO/LIST/LUSERS.
//!
//! ```text
//! User sends JOIN #test
//!  ├─ channel name starts with '#'?  no -> 461
//!  ├─ at the per-user channel cap and not already a member?  yes -> 405
//!  ├─ get-or-create channel (lazy; never pruned on last-leave)
//!  ├─ add to members if not already present (idempotent)
//!  ├─ echo JOIN to the joining client
//!  ├─ broadcast JOIN to the other members
//!  └─ NOTICE the joining client with the current member list
//! ```
//!
//! Protocol-error paths return `Err(IrcError::Protocol(line))` instead of
//! writing directly to the client; `dispatch::dispatch` is the one place
//! that turns that into an outbound reply, per SPEC_FULL §4.9/§7.

use crate::errors::IrcError;
use crate::parsers::channel_parser;
use crate::replies::IrcReply;
use crate::server_state::ServerState;
use crate::user_state::Client;

fn send(client: &Client, reply: IrcReply) {
    let _ = client.try_send(reply.format());
}

fn is_valid_channel(channel: &str, max_len: usize) -> bool {
    channel.len() <= max_len
        && matches!(channel_parser(channel), Ok((rest, parsed)) if rest.is_empty() && parsed == channel)
}

pub fn handle_join(client: &Client, state: &ServerState, channel: &str) -> Result<(), IrcError> {
    if !is_valid_channel(channel, state.config().get_max_channel_name_length()) {
        return Err(IrcError::Protocol(
            IrcReply::ErrNeedMoreParams {
                nick: &client.nickname_or_star(),
                command: "JOIN",
            }
            .format(),
        ));
    }

    let already_member = client.joined.contains(channel);
    if !already_member && client.joined.len() >= state.config().limits.max_channels_per_user {
        return Err(IrcError::Protocol(
            IrcReply::ErrTooManyChannels {
                nick: &client.nickname_or_star(),
                channel,
            }
            .format(),
        ));
    }

    let nick = client.nickname_or_star();
    let join_line = IrcReply::Join { nick: &nick, channel }.format();

    {
        let entry = state.channels().get_or_create(channel);
        if !entry.members.insert(client.id) {
            return Ok(()); // already a member; JOIN is idempotent
        }
    }
    client.joined.insert(channel.to_owned());

    let _ = client.try_send(join_line.clone());
    state.deliver_to_channel_except(channel, client.id, &join_line);

    let members = state
        .channels()
        .members_snapshot(channel)
        .into_iter()
        .filter_map(|id| state.client(id).and_then(|c| c.nickname()))
        .collect::<Vec<_>>()
        .join(", ");
    send(
        client,
        IrcReply::Notice {
            target: &nick,
            text: &format!("Users in {channel}: {members}"),
        },
    );
    Ok(())
}

pub fn handle_part(client: &Client, state: &ServerState, channel: &str) -> Result<(), IrcError> {
    if !state.channels().is_member(channel, client.id) {
        return Err(IrcError::Protocol(
            IrcReply::ErrNoSuchChannel {
                nick: &client.nickname_or_star(),
                channel,
            }
            .format(),
        ));
    }

    if let Some(entry) = state.channels().get(channel) {
        entry.members.remove(&client.id);
    }
    client.joined.remove(channel);

    let line = IrcReply::Part {
        nick: &client.nickname_or_star(),
        channel,
    }
    .format();
    state.deliver_to_channel_except(channel, client.id, &line);
    let _ = client.try_send(line);
    Ok(())
}

pub fn handle_who(client: &Client, state: &ServerState, target: Option<&str>) -> Result<(), IrcError> {
    let nick = client.nickname_or_star();

    if let Some(channel) = target {
        if !is_valid_channel(channel, state.config().get_max_channel_name_length()) {
            return Err(IrcError::Protocol(
                IrcReply::ErrNoSuchChannel {
                    nick: &nick,
                    channel,
                }
                .format(),
            ));
        }
        for id in state.channels().members_snapshot(channel) {
            if let Some(member) = state.client(id) {
                send(
                    client,
                    IrcReply::WhoReply {
                        nick: &nick,
                        channel,
                        target_nick: &member.nickname_or_star(),
                        target_host: &member.addr.ip().to_string(),
                    },
                );
            }
        }
        send(client, IrcReply::EndOfWho { nick: &nick, target: channel });
        return Ok(());
    }

    for id in state.all_client_ids() {
        if let Some(member) = state.client(id) {
            if member.nickname().is_none() {
                continue;
            }
            send(
                client,
                IrcReply::WhoReply {
                    nick: &nick,
                    channel: "*",
                    target_nick: &member.nickname_or_star(),
                    target_host: &member.addr.ip().to_string(),
                },
            );
        }
    }
    send(client, IrcReply::EndOfWho { nick: &nick, target: "*" });
    Ok(())
}

pub fn handle_list(client: &Client, state: &ServerState) -> Result<(), IrcError> {
    let nick = client.nickname_or_star();
    for (channel, visible, _topic) in state.channels().list_visible() {
        send(
            client,
            IrcReply::ListItem {
                nick: &nick,
                channel: &channel,
                visible,
            },
        );
    }
    send(client, IrcReply::ListEnd { nick: &nick });
    Ok(())
}

pub fn handle_lusers(client: &Client, state: &ServerState) -> Result<(), IrcError> {
    send(
        client,
        IrcReply::Lusers {
            nick: &client.nickname_or_star(),
            clients: state.nickname_count(),
            channels: state.channels().channel_count(),
        },
    );
    Ok(())
}
