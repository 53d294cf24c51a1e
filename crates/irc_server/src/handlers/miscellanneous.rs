//! PING/PONG, MODE, and the catch-all replies for recognised-but-unsupported
//! and wholly unrecognised commands.
//!
//! Protocol-error paths return `Err(IrcError::Protocol(line))` instead of
//! writing directly to the client; `dispatch::dispatch` is the one place
//! that turns that into an outbound reply, per SPEC_FULL §4.9/§7.

use crate::errors::IrcError;
use crate::replies::IrcReply;
use crate::server_state::ServerState;
use crate::user_state::{Client, OPERATOR_MODE};

fn send(client: &Client, reply: IrcReply) {
    let _ = client.try_send(reply.format());
}

pub fn handle_ping(client: &Client, token: &str) -> Result<(), IrcError> {
    let _ = client.try_send(IrcReply::Pong { token }.format());
    Ok(())
}

/// `MODE <target> [<flag>]`. Only self-targeted user-mode queries and the
/// `+o`/`-o` toggle are recognised. Channel modes are out of scope — SPEC_FULL
/// §4.4 permits only an empty reply or 501 there, so a `#`-prefixed target
/// gets `ErrUModeUnknownFlag` (501) rather than the foreign-nickname 502.
pub fn handle_mode(client: &Client, _state: &ServerState, target: &str, flag: Option<&str>) -> Result<(), IrcError> {
    let nick = client.nickname_or_star();

    if target.starts_with('#') {
        return Err(IrcError::Protocol(
            IrcReply::ErrUModeUnknownFlag { nick: &nick }.format(),
        ));
    }

    if target != nick {
        return Err(IrcError::Protocol(
            IrcReply::ErrUnsupported { nick: &nick, command: "MODE" }.format(),
        ));
    }

    match flag {
        None => send(
            client,
            IrcReply::UModeIs {
                nick: &nick,
                modes: &client.mode(),
            },
        ),
        Some("+o") => {
            client.set_operator_mode(true);
            send(
                client,
                IrcReply::UModeIs {
                    nick: &nick,
                    modes: &client.mode(),
                },
            );
        }
        Some("-o") => {
            client.set_operator_mode(false);
            send(
                client,
                IrcReply::UModeIs {
                    nick: &nick,
                    modes: &client.mode(),
                },
            );
        }
        Some(_) => {
            return Err(IrcError::Protocol(
                IrcReply::ErrUModeUnknownFlag { nick: &nick }.format(),
            ));
        }
    }
    Ok(())
}

pub fn handle_unsupported(client: &Client, command: &str) -> Result<(), IrcError> {
    Err(IrcError::Protocol(
        IrcReply::ErrUnsupported {
            nick: &client.nickname_or_star(),
            command,
        }
        .format(),
    ))
}

pub fn handle_unknown_command(client: &Client, command: &str) -> Result<(), IrcError> {
    Err(IrcError::Protocol(
        IrcReply::ErrUnknownCommand {
            nick: &client.nickname_or_star(),
            command,
        }
        .format(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn client_with_rx() -> (Arc<Client>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(16);
        let client = Arc::new(Client::new("127.0.0.1:1".parse().unwrap(), tx));
        (client, rx)
    }

    fn protocol_line(result: Result<(), IrcError>) -> String {
        match result.unwrap_err() {
            IrcError::Protocol(line) => line,
            other => panic!("expected a protocol error, got {other:?}"),
        }
    }

    #[test]
    fn ping_replies_with_pong_and_no_prefix() {
        let (client, mut rx) = client_with_rx();
        assert!(handle_ping(&client, "xyz").is_ok());
        assert_eq!(rx.try_recv().unwrap(), "PONG :xyz\r\n");
    }

    #[test]
    fn mode_query_reports_current_modes() {
        let state = ServerState::new(Default::default());
        let (client, mut rx) = client_with_rx();
        client.set_nickname("alice");
        assert!(handle_mode(&client, &state, "alice", None).is_ok());
        let reply = rx.try_recv().unwrap();
        assert!(reply.contains(" 221 "));
    }

    #[test]
    fn mode_plus_o_sets_operator_flag() {
        let state = ServerState::new(Default::default());
        let (client, mut rx) = client_with_rx();
        client.set_nickname("alice");
        assert!(handle_mode(&client, &state, "alice", Some("+o")).is_ok());
        assert!(client.has_operator_mode());
        assert!(rx.try_recv().unwrap().contains(&format!("+{OPERATOR_MODE}")));
    }

    #[test]
    fn mode_unknown_flag_errors() {
        let state = ServerState::new(Default::default());
        let (client, _rx) = client_with_rx();
        client.set_nickname("alice");
        let line = protocol_line(handle_mode(&client, &state, "alice", Some("+z")));
        assert!(line.contains(" 501 "));
    }

    #[test]
    fn mode_for_another_nickname_is_unsupported() {
        let state = ServerState::new(Default::default());
        let (client, _rx) = client_with_rx();
        client.set_nickname("alice");
        let line = protocol_line(handle_mode(&client, &state, "bob", None));
        assert!(line.contains(" 502 "));
    }

    #[test]
    fn mode_for_a_channel_target_is_501_not_502() {
        let state = ServerState::new(Default::default());
        let (client, _rx) = client_with_rx();
        client.set_nickname("alice");
        let line = protocol_line(handle_mode(&client, &state, "#general", Some("+m")));
        assert!(line.contains(" 501 "), "expected 501, got: {line}");
    }

    #[test]
    fn unsupported_command_replies_502() {
        let (client, _rx) = client_with_rx();
        let line = protocol_line(handle_unsupported(&client, "KICK"));
        assert!(line.contains(" 502 "));
    }

    #[test]
    fn unknown_command_replies_421() {
        let (client, _rx) = client_with_rx();
        let line = protocol_line(handle_unknown_command(&client, "FROB"));
        assert!(line.contains(" 421 "));
    }
}
