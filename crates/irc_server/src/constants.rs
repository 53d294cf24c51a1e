//! Numeric reply codes and their canonical text, per RFC 2812 section 5
//! (restricted to the subset this server actually sends).

pub const SERVER_NAME: &str = "server";

//    001    RPL_WELCOME
//           "Welcome to the IRC Server!"
pub const RPL_WELCOME_NB: u16 = 1;
pub const RPL_WELCOME_STR: &str = "Welcome to the IRC Server!";

//    221    RPL_UMODEIS
pub const RPL_UMODEIS_NB: u16 = 221;

//    251    RPL_LUSERCLIENT
pub const RPL_LUSERCLIENT_NB: u16 = 251;
//    254    RPL_LUSERCHANNELS
pub const RPL_LUSERCHANNELS_NB: u16 = 254;
//    255    RPL_LUSERME
pub const RPL_LUSERME_NB: u16 = 255;

//    315    RPL_ENDOFWHO
pub const RPL_ENDOFWHO_NB: u16 = 315;
pub const RPL_ENDOFWHO_STR: &str = "End of WHO list";

//    322    RPL_LIST
pub const RPL_LIST_NB: u16 = 322;
pub const RPL_LIST_NOTOPIC_STR: &str = "No topic set";
//    323    RPL_LISTEND
pub const RPL_LISTEND_NB: u16 = 323;
pub const RPL_LISTEND_STR: &str = "End of LIST";

//    352    RPL_WHOREPLY
pub const RPL_WHOREPLY_NB: u16 = 352;

//    401    ERR_NOSUCHNICK
//           "<nickname> :No such nick/channel"
pub const ERR_NOSUCHNICK_NB: u16 = 401;
pub const ERR_NOSUCHNICK_STR: &str = "No such nickname";

//    403    ERR_NOSUCHCHANNEL
//           "<channel name> :No such channel"
pub const ERR_NOSUCHCHANNEL_NB: u16 = 403;
pub const ERR_NOSUCHCHANNEL_STR: &str = "No such channel or not a member";

//    404    ERR_CANNOTSENDTOCHAN
pub const ERR_CANNOTSENDTOCHAN_NB: u16 = 404;
pub const ERR_CANNOTSENDTOCHAN_STR: &str = "Cannot send to self";

//    405    ERR_TOOMANYCHANNELS
//           "<channel name> :You have joined too many channels"
pub const ERR_TOOMANYCHANNELS_NB: u16 = 405;
pub const ERR_TOOMANYCHANNELS_STR: &str = "You have joined too many channels";

//    412    ERR_NOTEXTTOSEND
pub const ERR_NOTEXTTOSEND_NB: u16 = 412;
pub const ERR_NOTEXTTOSEND_STR: &str = "No text to send";

//    421    ERR_UNKNOWNCOMMAND
//           "<command> :Unknown command"
pub const ERR_UNKNOWNCOMMAND_NB: u16 = 421;
pub const ERR_UNKNOWNCOMMAND_STR: &str = "Unknown command";

//    432    ERR_ERRONEUSNICKNAME
pub const ERR_ERRONEUSNICKNAME_NB: u16 = 432;
pub const ERR_ERRONEUSNICKNAME_STR: &str = "Erroneous nickname";

//    433    ERR_NICKNAMEINUSE
pub const ERR_NICKNAMEINUSE_NB: u16 = 433;
pub const ERR_NICKNAMEINUSE_STR: &str = "Nickname is already in use";

// 461    ERR_NEEDMOREPARAMS
//               "<command> :Not enough parameters"
pub const ERR_NEEDMOREPARAMS_NB: u16 = 461;
pub const ERR_NEEDMOREPARAMS_STR: &str = "Not enough parameters";

//    462    ERR_ALREADYREGISTRED
pub const ERR_ALREADYREGISTERED_NB: u16 = 462;
pub const ERR_ALREADYREGISTERED_STR: &str = "Unauthorized command (already registered)";

//    501    ERR_UMODEUNKNOWNFLAG
pub const ERR_UMODEUNKNOWNFLAG_NB: u16 = 501;
pub const ERR_UMODEUNKNOWNFLAG_STR: &str = "Unknown MODE flag";

//    502    ERR_USERSDONTMATCH (reused here for "command not supported")
pub const ERR_UNSUPPORTED_NB: u16 = 502;
pub const ERR_UNSUPPORTED_STR: &str = "Command not supported";

/// Maximum bytes retained in a client's receive buffer before the connection
/// is closed for overflowing a single unterminated line.
pub const MAX_LINE_BUFFER: usize = 8 * 1024;

/// Maximum bytes read from the socket per `recv` call.
pub const READ_CHUNK_SIZE: usize = 4096;

pub const NICKNAME_MAX_LENGTH: usize = 15;
