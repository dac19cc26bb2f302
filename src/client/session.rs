use super::response::RawReply;
use crate::ReturnCode;
use serde::Serialize;

/// Opaque session identifier issued by the camera's `SERVERWhoAmI` action.
///
/// The camera invalidates sessions server-side on its own schedule; holders
/// learn about it from return code 21, so there is deliberately no
/// client-side expiry tracking here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, derive_more::From)]
#[from(forward)]
pub struct SessionId(String);

impl SessionId {
    /// The id exactly as the camera issued it.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Fixed query-string suffix every CGI request carries.
///
/// Flattened after the action parameters, so the wire order is always
/// `action=…&<params>&session=…&tokenoverride=1&_=0`. The trailing two
/// pairs are required by the camera firmware on every request.
#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) struct RequestTrailer<'req> {
    #[serde(skip_serializing_if = "Option::is_none")]
    session: Option<&'req str>,
    tokenoverride: &'static str,
    #[serde(rename = "_")]
    cache_bust: &'static str,
}

impl<'req> RequestTrailer<'req> {
    pub(crate) fn new(session: Option<&'req SessionId>) -> Self {
        Self {
            session: session.map(SessionId::as_str),
            tokenoverride: "1",
            cache_bust: "0",
        }
    }
}

/// Whether the camera still honors the session a command was sent with.
///
/// This is the whole session lifecycle as observable by a client: a session
/// is valid until a reply says otherwise, and the only signal is return
/// code 21 in the reply's `error` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionDisposition {
    /// The reply is a regular command reply.
    Valid,
    /// The camera rejected the session; a fresh one must be obtained.
    Expired,
}

impl SessionDisposition {
    /// Classify a reply.
    pub fn of(reply: &RawReply) -> Self {
        match reply.error_return_code() {
            Some(ReturnCode::SESSION_EXPIRED) => Self::Expired,
            _ => Self::Valid,
        }
    }
}

/// Result of a session-checked write command.
#[derive(Debug)]
pub enum CommandOutcome {
    /// The camera accepted the command; its verbatim reply is attached.
    /// Firmware error objects other than the session-expired code are passed
    /// through here rather than interpreted.
    Completed(RawReply),
    /// The session had expired. A fresh id was obtained through exactly one
    /// re-authentication; the caller owns it now and must re-issue the
    /// command if still wanted.
    SessionRefreshed(SessionId),
}
