mod params;
pub(crate) use params::{OrderedParams, action_params};

mod response;
pub use response::RawReply;

mod session;
pub(crate) use session::RequestTrailer;
pub use session::{CommandOutcome, SessionDisposition, SessionId};


use crate::api::{self, Action, AzimuthElevation, Magnification, PanTiltSpeed, WhoAmI};
use crate::{AuthError, CameraEndpoint, Error, NexusResult};
use futures::TryFutureExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::time::Duration;
use tracing::Instrument;

/// Default per-request HTTP timeout, matching the vendor tooling.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
struct RequestQuery<'req, P> {
    action: &'req str,
    #[serde(flatten)]
    params: P,
    #[serde(flatten)]
    trailer: RequestTrailer<'req>,
}

/// HTTP client bound to one camera's CGI endpoint.
///
/// All traffic is plain HTTP GET; the only credential is the session id
/// obtained from [`authenticate`](Self::authenticate), passed explicitly to
/// every command. Requests are issued one at a time by construction, since
/// each method awaits its reply before returning.
#[derive(Debug, Clone)]
pub struct Client {
    inner: reqwest::Client,
    endpoint: CameraEndpoint,
}

impl Client {
    /// Client for the given endpoint with the default HTTP timeout.
    pub fn new(endpoint: CameraEndpoint) -> NexusResult<Self> {
        Self::with_timeout(endpoint, DEFAULT_HTTP_TIMEOUT)
    }

    /// Client for the given endpoint with a custom HTTP timeout.
    pub fn with_timeout(endpoint: CameraEndpoint, timeout: Duration) -> NexusResult<Self> {
        Ok(Self {
            inner: reqwest::Client::builder().timeout(timeout).build()?,
            endpoint,
        })
    }

    /// Endpoint this client talks to.
    pub const fn endpoint(&self) -> &CameraEndpoint {
        &self.endpoint
    }

    pub(crate) fn build_request<P: Serialize>(
        &self,
        action: &str,
        session: Option<&SessionId>,
        params: P,
    ) -> reqwest::Result<reqwest::Request> {
        self.inner
            .get(self.endpoint.cgi_url())
            .query(&RequestQuery {
                action,
                params,
                trailer: RequestTrailer::new(session),
            })
            .build()
    }

    pub(crate) async fn request<P: Debug + Serialize + Send>(
        &self,
        action: &str,
        session: Option<&SessionId>,
        params: P,
    ) -> NexusResult<RawReply> {
        let span = tracing::debug_span!(
            "Nexus transaction",
            camera = %self.endpoint,
            action,
            ?params,
            session = session.map(SessionId::as_str),
        );

        async move {
            let request = self.build_request(action, session, params)?;
            tracing::debug!(url = %request.url(), "Sending CGI request");

            let response = self.inner.execute(request).await?.error_for_status()?;
            let reply = RawReply::from_text(response.text().await?);

            tracing::debug!(bytes = reply.text().len(), "Received reply");

            Ok::<_, Error>(reply)
        }
        .map_err(|err| {
            tracing::error!(%err, "Nexus request failed");
            err
        })
        .instrument(span)
        .await
    }

    /// Perform the `SERVERWhoAmI` handshake and return the session id the
    /// camera issues.
    ///
    /// No retry happens here; callers that want the refresh-on-expiry
    /// behavior get it from the write commands instead.
    pub async fn authenticate(&self) -> NexusResult<SessionId> {
        let reply = self
            .request(Action::ServerWhoAmI.as_str(), None, action_params! {})
            .await?;

        if reply.is_empty() {
            return Err(AuthError::EmptyResponse.into());
        }
        let who_am_i: WhoAmI = reply
            .section(Action::ServerWhoAmI)
            .map_err(AuthError::Parse)?;
        if who_am_i.id.is_empty() {
            return Err(AuthError::EmptySessionId.into());
        }

        let session = SessionId::from(who_am_i.id);
        tracing::debug!(%session, "Authenticated");
        Ok(session)
    }

    /// Issue a known action and pass the reply through verbatim.
    ///
    /// `params` go on the wire in the given order, between the `action`
    /// parameter and the session trailer. Firmware error objects are not
    /// interpreted here; use [`invoke_checked`](Self::invoke_checked) for
    /// the session-expiry handling write commands want.
    pub async fn invoke(
        &self,
        action: Action,
        session: Option<&SessionId>,
        params: &[(String, String)],
    ) -> NexusResult<RawReply> {
        self.request(action.as_str(), session, OrderedParams::from_pairs(params))
            .await
    }

    /// Like [`invoke`](Self::invoke), but for action names this crate does
    /// not know about (firmware revisions grow them regularly).
    pub async fn invoke_raw(
        &self,
        action: &str,
        session: Option<&SessionId>,
        params: &[(String, String)],
    ) -> NexusResult<RawReply> {
        self.request(action, session, OrderedParams::from_pairs(params))
            .await
    }

    /// Issue a write command with the session-expiry branch applied.
    pub async fn invoke_checked(
        &self,
        action: Action,
        session: &SessionId,
        params: &[(String, String)],
    ) -> NexusResult<CommandOutcome> {
        let reply = self.invoke(action, Some(session), params).await?;
        self.refresh_if_expired(action, reply).await
    }

    /// Session-expiry branch shared by all write commands: a reply carrying
    /// return code 21 triggers exactly one re-authentication, and the fresh
    /// id is handed back in place of command output.
    async fn refresh_if_expired(
        &self,
        action: Action,
        reply: RawReply,
    ) -> NexusResult<CommandOutcome> {
        match SessionDisposition::of(&reply) {
            SessionDisposition::Valid => Ok(CommandOutcome::Completed(reply)),
            SessionDisposition::Expired => {
                tracing::warn!(%action, "Camera reports an expired session, re-authenticating");
                self.authenticate()
                    .await
                    .map(CommandOutcome::SessionRefreshed)
            }
        }
    }

    async fn write<P: Debug + Serialize + Send>(
        &self,
        action: Action,
        session: &SessionId,
        params: P,
    ) -> NexusResult<CommandOutcome> {
        let reply = self.request(action.as_str(), Some(session), params).await?;
        self.refresh_if_expired(action, reply).await
    }

    /// Read commands don't re-authenticate; a stale session surfaces as
    /// [`Error::SessionExpired`] instead.
    async fn read_raw(&self, action: Action, session: &SessionId) -> NexusResult<RawReply> {
        let reply = self
            .request(action.as_str(), Some(session), action_params! {})
            .await?;
        match SessionDisposition::of(&reply) {
            SessionDisposition::Valid => Ok(reply),
            SessionDisposition::Expired => Err(Error::SessionExpired),
        }
    }

    async fn read_section<T: DeserializeOwned>(
        &self,
        action: Action,
        session: &SessionId,
    ) -> NexusResult<T> {
        self.read_raw(action, session)
            .await?
            .section(action)
            .map_err(Error::Parse)
    }

    /// Current pan/tilt pose in degrees.
    pub async fn position(&self, session: &SessionId) -> NexusResult<AzimuthElevation> {
        self.read_section(Action::PtAzimuthElevationGet, session)
            .await
    }

    /// Current pan/tilt axis speeds.
    pub async fn speed(&self, session: &SessionId) -> NexusResult<PanTiltSpeed> {
        self.read_section(Action::PtSpeedGet, session).await
    }

    /// Current zoom magnification factor.
    pub async fn magnification(&self, session: &SessionId) -> NexusResult<f64> {
        self.read_section::<Magnification>(Action::DltvFovMagnificationGet, session)
            .await
            .map(|m| m.magnification)
    }

    /// Verbatim `DLTVZoomDegreesGet` reply.
    ///
    /// The reported field layout varies across firmware revisions, so no
    /// typed view is offered.
    pub async fn zoom_degrees(&self, session: &SessionId) -> NexusResult<RawReply> {
        self.read_raw(Action::DltvZoomDegreesGet, session).await
    }

    /// Set the pan/tilt axis speeds.
    pub async fn set_speed(
        &self,
        session: &SessionId,
        azimuth_speed: i32,
        elevation_speed: i32,
    ) -> NexusResult<CommandOutcome> {
        self.write(
            Action::PtSpeedModeSet,
            session,
            action_params! {
                Azimuth_Speed: azimuth_speed,
                Elevation_Speed: elevation_speed,
            },
        )
        .await
    }

    /// Set the zoom magnification factor.
    pub async fn set_magnification(
        &self,
        session: &SessionId,
        magnification: f64,
    ) -> NexusResult<CommandOutcome> {
        self.write(
            Action::DltvFovMagnificationSet,
            session,
            action_params! {
                Magnification: magnification,
            },
        )
        .await
    }

    /// Trigger a one-shot autofocus.
    pub async fn auto_focus(&self, session: &SessionId) -> NexusResult<CommandOutcome> {
        self.write(Action::DltvAutoFocusPush, session, action_params! {})
            .await
    }

    /// Re-aim the camera so the given screen point becomes the new center.
    ///
    /// Coordinates are in the units the firmware's video overlay uses; the
    /// camera-selector parameters are fixed to the visible-light imager.
    pub async fn center_on_screen(
        &self,
        session: &SessionId,
        screen_x: f64,
        screen_y: f64,
    ) -> NexusResult<CommandOutcome> {
        self.write(
            Action::PtAzimuthElevationOnScreenSet,
            session,
            action_params! {
                ScreenX: screen_x,
                ScreenY: screen_y,
                Active_cam: api::ONSCREEN_ACTIVE_CAM,
                Cam_type: api::ONSCREEN_CAM_TYPE,
                Cam_id: api::ONSCREEN_CAM_ID,
            },
        )
        .await
    }

    /// Slew to an absolute azimuth/elevation at the given axis speeds.
    pub async fn slew_to(
        &self,
        session: &SessionId,
        azimuth: f64,
        elevation: f64,
        azimuth_speed: i32,
        elevation_speed: i32,
    ) -> NexusResult<CommandOutcome> {
        self.write(
            Action::PtAzimuthElevationSet,
            session,
            action_params! {
                Azimuth: azimuth,
                Elevation: elevation,
                Azimuth_Speed: azimuth_speed,
                Elevation_Speed: elevation_speed,
            },
        )
        .await
    }
}
