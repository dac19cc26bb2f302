//! Client for the Nexus CGI control interface of FLIR pan-tilt-zoom cameras.
//!
//! Nexus cameras expose control as plain HTTP GET requests against a single
//! CGI handler: every command is an `action` query parameter plus
//! action-specific parameters, answered with a JSON object keyed by the
//! action name. This crate wraps that surface:
//!
//! - [`Client`] issues commands against one camera's [`CameraEndpoint`],
//!   performing the `SERVERWhoAmI` handshake and applying the
//!   session-expiry refresh branch to write commands.
//! - [`ReachabilityGate`] holds commands back until a freshly booted
//!   camera starts answering probes.
//! - [`pointing`] turns click positions on the video overlay into absolute
//!   azimuth/elevation targets.
//!
//! Replies come back as [`RawReply`] carrying the camera's JSON verbatim;
//! typed accessors such as [`Client::position`] parse the common ones.
//!
//! # Example
//!
//! ```no_run
//! use nexus_cgi::{CameraEndpoint, Client};
//!
//! #[tokio::main]
//! async fn main() -> eyre::Result<()> {
//!     let client = Client::new(CameraEndpoint::new("169.254.50.183"))?;
//!     let session = client.authenticate().await?;
//!
//!     let pose = client.position(&session).await?;
//!     println!("azimuth {} deg, elevation {} deg", pose.azimuth, pose.elevation);
//!     Ok(())
//! }
//! ```

mod api;
mod client;
mod endpoint;
mod errors;
mod gate;
pub mod pointing;

#[cfg(test)]
mod test_utils;

pub use api::{Action, AzimuthElevation, DEFAULT_SLEW_SPEED, PanTiltSpeed};
pub use client::{
    Client, CommandOutcome, DEFAULT_HTTP_TIMEOUT, RawReply, SessionDisposition, SessionId,
};
pub use endpoint::{CameraEndpoint, NEXUS_CGI_PATH, NEXUS_DEFAULT_PORT};
pub use errors::{AuthError, Error, NexusResult, ReturnCode};
pub use gate::{DEFAULT_PROBE_INTERVAL, Probe, ReachabilityGate, TcpProbe};
