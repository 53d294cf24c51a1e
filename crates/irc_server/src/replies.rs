//! Numeric and notice replies this server sends, and how each one is
//! rendered onto the wire.

use crate::constants::*;

#[derive(Debug, Clone, PartialEq)]
pub enum IrcReply<'a> {
    Welcome {
        nick: &'a str,
        motd: &'a str,
    },
    UModeIs {
        nick: &'a str,
        modes: &'a str,
    },
    Lusers {
        nick: &'a str,
        clients: usize,
        channels: usize,
    },

    Join {
        nick: &'a str,
        channel: &'a str,
    },
    Part {
        nick: &'a str,
        channel: &'a str,
    },
    NickChange {
        old_nick: &'a str,
        new_nick: &'a str,
    },
    PrivMsg {
        nick: &'a str,
        target: &'a str,
        text: &'a str,
    },
    Quit {
        nick: &'a str,
        message: &'a str,
    },
    Notice {
        target: &'a str,
        text: &'a str,
    },
    /// No server prefix: `PONG :<token>` is sent back verbatim, matching
    /// the wire examples in the protocol's own test scenarios.
    Pong {
        token: &'a str,
    },

    WhoReply {
        nick: &'a str,
        channel: &'a str,
        target_nick: &'a str,
        target_host: &'a str,
    },
    EndOfWho {
        nick: &'a str,
        target: &'a str,
    },
    ListItem {
        nick: &'a str,
        channel: &'a str,
        visible: usize,
    },
    ListEnd {
        nick: &'a str,
    },

    ErrNeedMoreParams {
        nick: &'a str,
        command: &'a str,
    },
    ErrUnknownCommand {
        nick: &'a str,
        command: &'a str,
    },
    ErrNoSuchNick {
        nick: &'a str,
        target: &'a str,
    },
    ErrNoSuchChannel {
        nick: &'a str,
        channel: &'a str,
    },
    ErrCannotSendToSelf {
        nick: &'a str,
    },
    ErrTooManyChannels {
        nick: &'a str,
        channel: &'a str,
    },
    ErrNoTextToSend {
        nick: &'a str,
    },
    ErrErroneousNickname {
        nick: &'a str,
        attempted: &'a str,
    },
    ErrNicknameInUse {
        nick: &'a str,
        attempted: &'a str,
    },
    ErrAlreadyRegistered {
        nick: &'a str,
    },
    ErrUModeUnknownFlag {
        nick: &'a str,
    },
    ErrUnsupported {
        nick: &'a str,
        command: &'a str,
    },
}

impl<'a> IrcReply<'a> {
    /// Renders the reply to a single CRLF-terminated wire line.
    pub fn format(&self) -> String {
        let body = match self {
            IrcReply::Welcome { nick, motd } => {
                format!(":{SERVER_NAME} {RPL_WELCOME_NB:03} {nick} :{motd}")
            }
            IrcReply::UModeIs { nick, modes } => {
                format!(":{SERVER_NAME} {RPL_UMODEIS_NB:03} {nick} :+{modes}")
            }
            IrcReply::Lusers { nick, clients, channels } => format!(
                ":{SERVER_NAME} {RPL_LUSERCLIENT_NB:03} {nick} :There are {clients} users on 1 server\r\n\
                 :{SERVER_NAME} {RPL_LUSERCHANNELS_NB:03} {nick} {channels} :channels formed\r\n\
                 :{SERVER_NAME} {RPL_LUSERME_NB:03} {nick} :I have {clients} clients and 1 server"
            ),

            IrcReply::Join { nick, channel } => {
                format!(":{nick} JOIN :{channel}")
            }
            IrcReply::Part { nick, channel } => {
                format!(":{nick} PART {channel}")
            }
            IrcReply::NickChange { old_nick, new_nick } => {
                format!(":{old_nick} NICK :{new_nick}")
            }
            IrcReply::PrivMsg { nick, target, text } => {
                format!(":{nick} PRIVMSG {target} :{text}")
            }
            IrcReply::Quit { nick, message } => {
                format!(":{nick} QUIT :{message}")
            }
            IrcReply::Notice { target, text } => {
                format!(":{SERVER_NAME} NOTICE {target} :{text}")
            }
            IrcReply::Pong { token } => return format!("PONG :{token}\r\n"),

            IrcReply::WhoReply { nick, channel, target_nick, target_host } => format!(
                ":{SERVER_NAME} {RPL_WHOREPLY_NB:03} {nick} {channel} {target_nick} {target_host} {SERVER_NAME} {target_nick} H :0 {target_nick}"
            ),
            IrcReply::EndOfWho { nick, target } => {
                format!(":{SERVER_NAME} {RPL_ENDOFWHO_NB:03} {nick} {target} :{RPL_ENDOFWHO_STR}")
            }
            IrcReply::ListItem { nick, channel, visible } => format!(
                ":{SERVER_NAME} {RPL_LIST_NB:03} {nick} {channel} {visible} :{RPL_LIST_NOTOPIC_STR}"
            ),
            IrcReply::ListEnd { nick } => {
                format!(":{SERVER_NAME} {RPL_LISTEND_NB:03} {nick} :{RPL_LISTEND_STR}")
            }

            IrcReply::ErrNeedMoreParams { nick, command } => format!(
                ":{SERVER_NAME} {ERR_NEEDMOREPARAMS_NB:03} {nick} {command} :{ERR_NEEDMOREPARAMS_STR}"
            ),
            IrcReply::ErrUnknownCommand { nick, command } => format!(
                ":{SERVER_NAME} {ERR_UNKNOWNCOMMAND_NB:03} {nick} {command} :{ERR_UNKNOWNCOMMAND_STR}"
            ),
            IrcReply::ErrNoSuchNick { nick, target } => {
                format!(":{SERVER_NAME} {ERR_NOSUCHNICK_NB:03} {nick} {target} :{ERR_NOSUCHNICK_STR}")
            }
            IrcReply::ErrNoSuchChannel { nick, channel } => format!(
                ":{SERVER_NAME} {ERR_NOSUCHCHANNEL_NB:03} {nick} {channel} :{ERR_NOSUCHCHANNEL_STR}"
            ),
            IrcReply::ErrCannotSendToSelf { nick } => format!(
                ":{SERVER_NAME} {ERR_CANNOTSENDTOCHAN_NB:03} {nick} :{ERR_CANNOTSENDTOCHAN_STR}"
            ),
            IrcReply::ErrTooManyChannels { nick, channel } => format!(
                ":{SERVER_NAME} {ERR_TOOMANYCHANNELS_NB:03} {nick} {channel} :{ERR_TOOMANYCHANNELS_STR}"
            ),
            IrcReply::ErrNoTextToSend { nick } => {
                format!(":{SERVER_NAME} {ERR_NOTEXTTOSEND_NB:03} {nick} :{ERR_NOTEXTTOSEND_STR}")
            }
            IrcReply::ErrErroneousNickname { nick, attempted } => format!(
                ":{SERVER_NAME} {ERR_ERRONEUSNICKNAME_NB:03} {nick} {attempted} :{ERR_ERRONEUSNICKNAME_STR}"
            ),
            IrcReply::ErrNicknameInUse { nick, attempted } => format!(
                ":{SERVER_NAME} {ERR_NICKNAMEINUSE_NB:03} {nick} {attempted} :{ERR_NICKNAMEINUSE_STR}"
            ),
            IrcReply::ErrAlreadyRegistered { nick } => format!(
                ":{SERVER_NAME} {ERR_ALREADYREGISTERED_NB:03} {nick} :{ERR_ALREADYREGISTERED_STR}"
            ),
            IrcReply::ErrUModeUnknownFlag { nick } => format!(
                ":{SERVER_NAME} {ERR_UMODEUNKNOWNFLAG_NB:03} {nick} :{ERR_UMODEUNKNOWNFLAG_STR}"
            ),
            IrcReply::ErrUnsupported { nick, command } => format!(
                ":{SERVER_NAME} {ERR_UNSUPPORTED_NB:03} {nick} {command} :{ERR_UNSUPPORTED_STR}"
            ),
        };
        format!("{body}\r\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_matches_the_protocol_example_verbatim() {
        let reply = IrcReply::Welcome {
            nick: "alice",
            motd: "Welcome to the IRC Server!",
        };
        assert_eq!(
            reply.format(),
            ":server 001 alice :Welcome to the IRC Server!\r\n"
        );
    }

    #[test]
    fn nickname_in_use_names_the_attempted_nick() {
        let reply = IrcReply::ErrNicknameInUse {
            nick: "*",
            attempted: "alice",
        };
        assert_eq!(
            reply.format(),
            ":server 433 * alice :Nickname is already in use\r\n"
        );
    }

    #[test]
    fn privmsg_uses_plain_nick_prefix_no_server_name() {
        let reply = IrcReply::PrivMsg {
            nick: "alice",
            target: "#t",
            text: "hi",
        };
        assert_eq!(reply.format(), ":alice PRIVMSG #t :hi\r\n");
    }

    #[test]
    fn too_many_channels_names_the_channel_attempted() {
        let reply = IrcReply::ErrTooManyChannels {
            nick: "alice",
            channel: "#overflow",
        };
        assert_eq!(
            reply.format(),
            ":server 405 alice #overflow :You have joined too many channels\r\n"
        );
    }

    #[test]
    fn pong_carries_no_prefix_at_all() {
        let reply = IrcReply::Pong { token: "xyz" };
        assert_eq!(reply.format(), "PONG :xyz\r\n");
    }

    #[test]
    fn every_formatted_line_ends_in_crlf() {
        let reply = IrcReply::ListEnd { nick: "alice" };
        assert!(reply.format().ends_with("\r\n"));
    }
}
