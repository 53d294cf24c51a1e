//! Routes one completed, parsed line to its handler. This is the single
//! place that knows the full command table; the connection task only knows
//! how to get a line in and a [`DispatchOutcome`] out.
//!
//! Every handler returns `Result<(), IrcError>`. [`apply`] is the one place
//! that inspects the variant: a `Protocol` error is sent back to the client
//! and the connection stays open, everything else is logged and the
//! connection is torn down, per SPEC_FULL §4.9/§7.

use std::sync::Arc;

use log::warn;

use crate::errors::IrcError;
use crate::handlers::{channels, messages, miscellanneous, registration};
use crate::message::{Command, parse_line};
use crate::replies::IrcReply;
use crate::server_state::ServerState;
use crate::user_state::Client;

/// Whether the connection task should keep reading after this line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Continue,
    Disconnect,
}

/// Turns a handler's `Result` into the outcome the connection task acts on.
fn apply(client: &Client, result: Result<(), IrcError>) -> DispatchOutcome {
    match result {
        Ok(()) => DispatchOutcome::Continue,
        Err(IrcError::Protocol(line)) => {
            let _ = client.try_send(line);
            DispatchOutcome::Continue
        }
        Err(IrcError::UnknownCommand) => DispatchOutcome::Continue,
        Err(err @ (IrcError::Transport(_) | IrcError::Resource(_) | IrcError::Internal(_))) => {
            warn!("client {} disconnected: {err}", client.id);
            DispatchOutcome::Disconnect
        }
    }
}

pub fn dispatch(client: &Arc<Client>, state: &ServerState, line: &str) -> DispatchOutcome {
    match parse_line(line) {
        Ok(Command::CapLs) => apply(client, registration::handle_cap_ls(client)),
        Ok(Command::CapEnd) => apply(client, registration::handle_cap_end(client)),
        Ok(Command::Nick(nick)) => apply(client, registration::handle_nick(client, state, &nick)),
        Ok(Command::User { user, .. }) => apply(client, registration::handle_user(client, state, &user)),
        Ok(Command::Join(channel)) => apply(client, channels::handle_join(client, state, &channel)),
        Ok(Command::Part(channel)) => apply(client, channels::handle_part(client, state, &channel)),
        Ok(Command::PrivMsg { target, text }) => {
            apply(client, messages::handle_privmsg(client, state, &target, &text))
        }
        Ok(Command::Ping(token)) => apply(client, miscellanneous::handle_ping(client, &token)),
        Ok(Command::Quit(message)) => {
            let message = message.unwrap_or_else(|| format!("{} has quit", client.nickname_or_star()));
            registration::handle_quit(client, state, &message);
            DispatchOutcome::Disconnect
        }
        Ok(Command::Who(target)) => apply(client, channels::handle_who(client, state, target.as_deref())),
        Ok(Command::Mode { target, flag }) => {
            apply(client, miscellanneous::handle_mode(client, state, &target, flag.as_deref()))
        }
        Ok(Command::List) => apply(client, channels::handle_list(client, state)),
        Ok(Command::Lusers) => apply(client, channels::handle_lusers(client, state)),
        Ok(Command::Unsupported(command)) => apply(client, miscellanneous::handle_unsupported(client, &command)),
        Ok(Command::Unknown(command)) => apply(client, miscellanneous::handle_unknown_command(client, &command)),
        Err(command) => apply(
            client,
            Err(IrcError::Protocol(
                IrcReply::ErrNeedMoreParams {
                    nick: &client.nickname_or_star(),
                    command: &command,
                }
                .format(),
            )),
        ),
    }
}
