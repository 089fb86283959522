use alloc::string::String;

/// A frame that does not follow the command grammar.
///
/// There is no resynchronisation in the protocol, so a session that receives
/// one of these has to be torn down.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("empty frame")]
    Empty,
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("`{0}` requires a payload")]
    MissingPayload(&'static str),
    #[error("`{command}` takes no payload, got `{payload}`")]
    UnexpectedPayload {
        command: &'static str,
        payload: String,
    },
    #[error("malformed coordinates `{0}`")]
    MalformedCoordinates(String),
    #[error("malformed ship `{0}`")]
    MalformedShip(String),
    #[error("invalid player name `{0}`")]
    InvalidName(String),
}
