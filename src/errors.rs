use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Numeric return code reported by the camera firmware in the
/// `error."Return Code"` field of a CGI reply.
///
/// Known codes get named constants; everything else is carried through
/// verbatim, since the firmware does not document the full set.
///
/// ```
/// use nexus_cgi::ReturnCode;
///
/// assert_eq!(ReturnCode::SESSION_EXPIRED.raw(), 21);
/// assert_eq!(format!("{:?}", ReturnCode::SESSION_EXPIRED), "SESSION_EXPIRED");
/// assert_eq!(format!("{:?}", ReturnCode::new(97)), "97");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReturnCode(u32);

impl ReturnCode {
    /// Wrap a raw firmware return code.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw return code.
    pub const fn raw(self) -> u32 {
        self.0
    }
}

macro_rules! nexus_return_codes {
    ($(#[doc = $doc:literal] $name:ident = $value:literal,)*) => {
        impl ReturnCode {
            $(
                #[doc = $doc]
                pub const $name: Self = Self($value);
            )*
        }

        impl std::fmt::Debug for ReturnCode {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match *self {
                    $(
                        Self::$name => f.write_str(stringify!($name)),
                    )*
                    Self(raw) => write!(f, "{raw}"),
                }
            }
        }

        impl std::fmt::Display for ReturnCode {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Debug::fmt(self, f)
            }
        }
    };
}

nexus_return_codes! {
    #[doc = "Success"]
    OK = 0,
    #[doc = "The camera no longer recognizes the supplied session id"]
    SESSION_EXPIRED = 21,
}

/// Failure modes of the `SERVERWhoAmI` authentication handshake.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The camera answered with an empty HTTP body.
    #[error("Camera returned an empty response to SERVERWhoAmI")]
    EmptyResponse,
    /// The body was not JSON, or had no `SERVERWhoAmI.Id` field.
    #[error("Couldn't extract a session id from the camera's response: {0}")]
    Parse(#[source] serde_json::Error),
    /// The camera issued an empty session id.
    #[error("Camera returned an empty session id")]
    EmptySessionId,
}

/// Any failure surfaced by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// The authentication handshake failed.
    #[error(transparent)]
    Auth(#[from] AuthError),
    /// The HTTP request could not be completed (connection refused, DNS
    /// failure, timeout, non-success HTTP status).
    #[error("Camera request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// A typed value could not be extracted from the camera's reply.
    #[error("Couldn't parse camera reply: {0}")]
    Parse(#[source] serde_json::Error),
    /// A read command was answered with return code 21.
    ///
    /// Only write commands re-authenticate automatically; reads report the
    /// stale session to the caller instead.
    #[error("Camera session expired (return code {code})", code = ReturnCode::SESSION_EXPIRED)]
    SessionExpired,
    /// A reachability deadline elapsed before the camera answered a probe.
    ///
    /// Never produced by a gate without a deadline; plain unreachability is
    /// an expected transient that keeps being retried.
    #[error("Camera at {host} not reachable within {waited:?} ({attempts} probes)")]
    Unreachable {
        /// Host the gate was probing.
        host: String,
        /// Total time spent probing.
        waited: Duration,
        /// Number of probes sent before giving up.
        attempts: u64,
    },
}

/// Result type for camera operations.
pub type NexusResult<T = ()> = Result<T, Error>;
