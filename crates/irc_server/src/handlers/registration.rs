//! NICK/USER/CAP/QUIT — the connection state machine's transitions.
//!
//! Protocol-error paths return `Err(IrcError::Protocol(line))` instead of
//! writing directly to the client; `dispatch::dispatch` is the one place
//! that turns that into an outbound reply, per SPEC_FULL §4.9/§7.

use std::sync::Arc;

use log::info;

use crate::constants::SERVER_NAME;
use crate::errors::IrcError;
use crate::parsers::nickname_parser;
use crate::replies::IrcReply;
use crate::server_state::ServerState;
use crate::user_state::Client;

fn send(client: &Client, reply: IrcReply) {
    let _ = client.try_send(reply.format());
}

fn is_valid_nickname(candidate: &str) -> bool {
    matches!(nickname_parser(candidate), Ok((rest, parsed)) if rest.is_empty() && parsed == candidate)
}

/// Sends the welcome burst once both NICK and USER are in, per §4.3.
fn complete_registration(client: &Client, state: &ServerState) {
    client.mark_registered();
    let nick = client.nickname().expect("nickname set before registering");
    send(
        client,
        IrcReply::Welcome {
            nick: &nick,
            motd: &state.config().server.motd,
        },
    );
    info!("client {} registered as {nick}", client.id);
}

pub fn handle_cap_ls(client: &Client) -> Result<(), IrcError> {
    let _ = client.try_send(format!(":{SERVER_NAME} CAP * LS :\r\n"));
    Ok(())
}

pub fn handle_cap_end(_client: &Client) -> Result<(), IrcError> {
    // Registration does not depend on capability negotiation completing.
    Ok(())
}

pub fn handle_nick(client: &Client, state: &ServerState, candidate: &str) -> Result<(), IrcError> {
    if !is_valid_nickname(candidate) {
        return Err(IrcError::Protocol(
            IrcReply::ErrErroneousNickname {
                nick: &client.nickname_or_star(),
                attempted: candidate,
            }
            .format(),
        ));
    }

    let changed = match client.nickname() {
        Some(old) if old == candidate => return Ok(()),
        Some(old) => state.rename_nickname(&old, candidate, client.id),
        None => state.try_claim_nickname(candidate, client.id),
    };

    if !changed {
        return Err(IrcError::Protocol(
            IrcReply::ErrNicknameInUse {
                nick: &client.nickname_or_star(),
                attempted: candidate,
            }
            .format(),
        ));
    }

    let previous = client.nickname();
    client.set_nickname(candidate);

    if let Some(old) = previous.filter(|_| client.is_registered()) {
        state.broadcast_all(
            &IrcReply::NickChange {
                old_nick: &old,
                new_nick: candidate,
            }
            .format(),
        );
    } else if client.user_received() && !client.is_registered() {
        complete_registration(client, state);
    }
    Ok(())
}

pub fn handle_user(client: &Client, state: &ServerState, user: &str) -> Result<(), IrcError> {
    if client.is_registered() {
        return Err(IrcError::Protocol(
            IrcReply::ErrAlreadyRegistered {
                nick: &client.nickname_or_star(),
            }
            .format(),
        ));
    }

    client.set_ident(user);
    client.mark_user_received();

    if client.nickname().is_some() {
        complete_registration(client, state);
    }
    Ok(())
}

/// Tears down a client's presence in shared state. Idempotent: a client
/// already marked disconnected is not notified or removed twice. Not
/// error-driven — QUIT always succeeds — so this keeps returning `()`
/// rather than threading through `IrcError`.
pub fn handle_quit(client: &Arc<Client>, state: &ServerState, message: &str) {
    if !client.mark_disconnected() {
        return;
    }

    let line = IrcReply::Quit {
        nick: &client.nickname_or_star(),
        message,
    }
    .format();

    for channel in client.joined.iter() {
        state.deliver_to_channel_except(&channel, client.id, &line);
    }
    let _ = client.try_send(line);

    state.channels().remove_member_everywhere(client.id);
    if let Some(nick) = client.nickname() {
        state.release_nickname(&nick);
    }
    state.deregister_client(client.id);
    state.disconnects().record(client.addr.ip());
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn client_with_rx() -> (Arc<Client>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(16);
        let client = Arc::new(Client::new("127.0.0.1:1".parse().unwrap(), tx));
        (client, rx)
    }

    #[test]
    fn cap_ls_carries_the_server_prefix_and_no_capabilities() {
        let (client, mut rx) = client_with_rx();
        assert!(handle_cap_ls(&client).is_ok());
        assert_eq!(rx.try_recv().unwrap(), ":server CAP * LS :\r\n");
    }

    #[test]
    fn nick_then_user_completes_registration() {
        let state = ServerState::new(Default::default());
        let (client, mut rx) = client_with_rx();
        state.register_client(Arc::clone(&client));

        assert!(handle_nick(&client, &state, "alice").is_ok());
        assert!(!client.is_registered());
        assert!(handle_user(&client, &state, "alice").is_ok());
        assert!(client.is_registered());

        let welcome = rx.try_recv().unwrap();
        assert!(welcome.contains(" 001 alice "));
    }

    #[test]
    fn colliding_nickname_is_rejected() {
        let state = ServerState::new(Default::default());
        let (a, _rx_a) = client_with_rx();
        let (b, _rx_b) = client_with_rx();
        state.register_client(Arc::clone(&a));
        state.register_client(Arc::clone(&b));

        assert!(handle_nick(&a, &state, "alice").is_ok());
        let err = handle_nick(&b, &state, "alice").unwrap_err();

        assert_eq!(b.nickname(), None);
        match err {
            IrcError::Protocol(line) => assert!(line.contains(" 433 ")),
            other => panic!("expected a protocol error, got {other:?}"),
        }
    }

    #[test]
    fn invalid_nickname_rejected_with_432() {
        let state = ServerState::new(Default::default());
        let (client, _rx) = client_with_rx();
        state.register_client(Arc::clone(&client));

        let err = handle_nick(&client, &state, "9bad").unwrap_err();
        match err {
            IrcError::Protocol(line) => assert!(line.contains(" 432 ")),
            other => panic!("expected a protocol error, got {other:?}"),
        }
    }

    #[test]
    fn user_after_registration_is_rejected_without_reclaiming_nickname() {
        let state = ServerState::new(Default::default());
        let (client, mut rx) = client_with_rx();
        state.register_client(Arc::clone(&client));

        assert!(handle_nick(&client, &state, "alice").is_ok());
        assert!(handle_user(&client, &state, "alice").is_ok());
        rx.try_recv().unwrap(); // welcome

        let err = handle_user(&client, &state, "alice").unwrap_err();
        match err {
            IrcError::Protocol(line) => assert!(line.contains(" 462 ")),
            other => panic!("expected a protocol error, got {other:?}"),
        }
    }

    #[test]
    fn quit_releases_nickname_and_is_idempotent() {
        let state = ServerState::new(Default::default());
        let (client, mut rx) = client_with_rx();
        state.register_client(Arc::clone(&client));
        handle_nick(&client, &state, "alice").unwrap();
        handle_user(&client, &state, "alice").unwrap();
        rx.try_recv().unwrap();

        handle_quit(&client, &state, "bye");
        assert!(state.find_by_nickname("alice").is_none());
        assert_eq!(state.client_count(), 0);

        // Second call must not panic or double-notify.
        handle_quit(&client, &state, "bye");
        assert!(rx.try_recv().is_ok()); // the quit echo from the first call
    }
}
