//! Tokenises a completed wire line into a [`Command`].
//!
//! ```text
//! message = [ ":" prefix SPACE ] command [ params ] crlf
//! params  = *14( SPACE middle ) [ SPACE ":" trailing ]
//! ```
//!
//! Client-originated lines never carry a prefix here (the framer already
//! stripped CRLF); this only has to split the command token from its
//! parameters and apply the trailing-parameter rule.

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CapLs,
    CapEnd,
    Nick(String),
    User {
        user: String,
        mode: String,
        realname: String,
    },
    Join(String),
    Part(String),
    PrivMsg {
        target: String,
        text: String,
    },
    Ping(String),
    Quit(Option<String>),
    Who(Option<String>),
    Mode {
        target: String,
        flag: Option<String>,
    },
    List,
    Lusers,
    /// Recognised but deliberately unsupported (KICK, MOTD) — replies 502.
    Unsupported(String),
    /// Not one of the recognised commands — replies 421.
    Unknown(String),
}

fn split_params(rest: &str) -> Vec<String> {
    let mut params = Vec::new();
    let mut remaining = rest.trim_start();
    while !remaining.is_empty() {
        if let Some(trailing) = remaining.strip_prefix(':') {
            params.push(trailing.to_owned());
            break;
        }
        match remaining.find(' ') {
            Some(idx) => {
                params.push(remaining[..idx].to_owned());
                remaining = remaining[idx + 1..].trim_start();
            }
            None => {
                params.push(remaining.to_owned());
                break;
            }
        }
    }
    params
}

fn tokenize(line: &str) -> (String, Vec<String>) {
    let mut parts = line.splitn(2, ' ');
    let command = parts.next().unwrap_or("").to_uppercase();
    let params = split_params(parts.next().unwrap_or(""));
    (command, params)
}

/// Parses a line into a [`Command`]. `Err` carries the upper-cased command
/// token for a recognised command sent with too few parameters, so the
/// caller can emit numeric 461 naming the right command.
pub fn parse_line(line: &str) -> Result<Command, String> {
    let (command, mut params) = tokenize(line);
    match command.as_str() {
        "CAP" => match params.first().map(|s| s.to_uppercase()) {
            Some(ref s) if s == "LS" => Ok(Command::CapLs),
            Some(ref s) if s == "END" => Ok(Command::CapEnd),
            _ => Err("CAP".to_owned()),
        },
        "NICK" => {
            if params.is_empty() {
                return Err("NICK".to_owned());
            }
            Ok(Command::Nick(params.remove(0)))
        }
        "USER" => {
            if params.len() < 4 {
                return Err("USER".to_owned());
            }
            Ok(Command::User {
                user: params[0].clone(),
                mode: params[1].clone(),
                realname: params[3].clone(),
            })
        }
        "JOIN" => {
            if params.is_empty() {
                return Err("JOIN".to_owned());
            }
            Ok(Command::Join(params.remove(0)))
        }
        "PART" => {
            if params.is_empty() {
                return Err("PART".to_owned());
            }
            Ok(Command::Part(params.remove(0)))
        }
        "PRIVMSG" => {
            if params.len() < 2 {
                return Err("PRIVMSG".to_owned());
            }
            Ok(Command::PrivMsg {
                target: params[0].clone(),
                text: params[1].clone(),
            })
        }
        "PING" => {
            if params.is_empty() {
                return Err("PING".to_owned());
            }
            Ok(Command::Ping(params.remove(0)))
        }
        "QUIT" => Ok(Command::Quit(params.into_iter().next())),
        "WHO" => Ok(Command::Who(params.into_iter().next())),
        "MODE" => {
            if params.is_empty() {
                return Err("MODE".to_owned());
            }
            let mut it = params.into_iter();
            let target = it.next().expect("checked non-empty above");
            Ok(Command::Mode {
                target,
                flag: it.next(),
            })
        }
        "LIST" => Ok(Command::List),
        "LUSERS" => Ok(Command::Lusers),
        "KICK" | "MOTD" => Ok(Command::Unsupported(command)),
        other => Ok(Command::Unknown(other.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nick_parses_single_param() {
        assert_eq!(parse_line("NICK alice"), Ok(Command::Nick("alice".into())));
    }

    #[test]
    fn command_is_case_insensitive() {
        assert_eq!(parse_line("nick alice"), Ok(Command::Nick("alice".into())));
    }

    #[test]
    fn user_splits_trailing_realname() {
        assert_eq!(
            parse_line("USER alice 0 * :Alice Example"),
            Ok(Command::User {
                user: "alice".into(),
                mode: "0".into(),
                realname: "Alice Example".into(),
            })
        );
    }

    #[test]
    fn user_missing_params_is_rejected() {
        assert_eq!(parse_line("USER alice"), Err("USER".to_owned()));
    }

    #[test]
    fn privmsg_preserves_spaces_in_trailing() {
        assert_eq!(
            parse_line("PRIVMSG #t :hello there friend"),
            Ok(Command::PrivMsg {
                target: "#t".into(),
                text: "hello there friend".into(),
            })
        );
    }

    #[test]
    fn privmsg_without_colon_still_takes_last_token_as_text() {
        assert_eq!(
            parse_line("PRIVMSG #t hi"),
            Ok(Command::PrivMsg {
                target: "#t".into(),
                text: "hi".into(),
            })
        );
    }

    #[test]
    fn privmsg_missing_text_is_rejected() {
        assert_eq!(parse_line("PRIVMSG #t"), Err("PRIVMSG".to_owned()));
    }

    #[test]
    fn quit_without_message_is_none() {
        assert_eq!(parse_line("QUIT"), Ok(Command::Quit(None)));
    }

    #[test]
    fn quit_with_message() {
        assert_eq!(
            parse_line("QUIT :goodbye"),
            Ok(Command::Quit(Some("goodbye".into())))
        );
    }

    #[test]
    fn who_with_no_args() {
        assert_eq!(parse_line("WHO"), Ok(Command::Who(None)));
    }

    #[test]
    fn mode_with_flag() {
        assert_eq!(
            parse_line("MODE alice +o"),
            Ok(Command::Mode {
                target: "alice".into(),
                flag: Some("+o".into()),
            })
        );
    }

    #[test]
    fn cap_ls_and_end_recognised() {
        assert_eq!(parse_line("CAP LS"), Ok(Command::CapLs));
        assert_eq!(parse_line("CAP END"), Ok(Command::CapEnd));
    }

    #[test]
    fn kick_and_motd_are_unsupported_not_unknown() {
        assert_eq!(parse_line("KICK #t alice"), Ok(Command::Unsupported("KICK".into())));
        assert_eq!(parse_line("MOTD"), Ok(Command::Unsupported("MOTD".into())));
    }

    #[test]
    fn unrecognised_command_is_unknown() {
        assert_eq!(parse_line("FROB a b"), Ok(Command::Unknown("FROB".into())));
    }
}
