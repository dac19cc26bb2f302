use crate::endpoint::NEXUS_CGI_PATH;
use crate::{CameraEndpoint, Client, NexusResult, SessionId};
use axum::Router;
use axum::extract::{Query, RawQuery, State};
use axum::http::StatusCode;
use axum::routing::get;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// How the fake camera answers `SERVERWhoAmI`.
#[derive(Debug, Clone, Copy)]
pub(crate) enum AuthBehavior {
    /// Issue a fresh session id (the normal firmware behavior).
    Normal,
    /// Answer with an empty body.
    EmptyBody,
    /// Answer with something that isn't JSON.
    Malformed,
    /// Issue an empty session id.
    BlankId,
}

struct CameraState {
    auth_behavior: Mutex<AuthBehavior>,
    auth_calls: AtomicUsize,
    command_calls: AtomicUsize,
    valid_sessions: Mutex<HashSet<String>>,
    reply_overrides: Mutex<VecDeque<(String, String)>>,
    last_query: Mutex<Option<String>>,
}

/// In-process stand-in for a camera's Nexus CGI handler.
///
/// Listens on a random localhost port and mimics the real firmware's
/// observable behavior: `SERVERWhoAmI` mints session ids, any other action
/// issued with a session the camera didn't mint (or one that was expired
/// via [`expire_all_sessions`](Self::expire_all_sessions)) is answered with
/// return code 21. The server task is aborted on drop.
pub(crate) struct FakeCamera {
    state: Arc<CameraState>,
    endpoint: CameraEndpoint,
    server: tokio::task::JoinHandle<()>,
}

impl FakeCamera {
    pub(crate) async fn spawn() -> eyre::Result<Self> {
        let state = Arc::new(CameraState {
            auth_behavior: Mutex::new(AuthBehavior::Normal),
            auth_calls: AtomicUsize::new(0),
            command_calls: AtomicUsize::new(0),
            valid_sessions: Mutex::new(HashSet::new()),
            reply_overrides: Mutex::new(VecDeque::new()),
            last_query: Mutex::new(None),
        });

        let router = Router::new()
            .route(NEXUS_CGI_PATH, get(handle_cgi))
            .with_state(Arc::clone(&state));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let server = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, router).await {
                tracing::error!(%err, "Fake camera server failed");
            }
        });

        tracing::debug!(%addr, "Fake camera is up");

        Ok(Self {
            state,
            endpoint: CameraEndpoint::new("127.0.0.1").with_port(addr.port()),
            server,
        })
    }

    pub(crate) fn endpoint(&self) -> CameraEndpoint {
        self.endpoint.clone()
    }

    pub(crate) fn client(&self) -> NexusResult<Client> {
        Client::new(self.endpoint())
    }

    /// Number of `SERVERWhoAmI` requests seen so far.
    pub(crate) fn auth_calls(&self) -> usize {
        self.state.auth_calls.load(Ordering::Relaxed)
    }

    /// Number of non-authentication requests seen so far.
    pub(crate) fn command_calls(&self) -> usize {
        self.state.command_calls.load(Ordering::Relaxed)
    }

    pub(crate) fn set_auth_behavior(&self, behavior: AuthBehavior) {
        *self.state.auth_behavior.lock().expect("poisoned lock") = behavior;
    }

    /// Invalidate every session issued so far, as the firmware does after
    /// its idle timeout or a reboot.
    pub(crate) fn expire_all_sessions(&self) {
        self.state
            .valid_sessions
            .lock()
            .expect("poisoned lock")
            .clear();
    }

    /// Answer the next request for `action` with `body` verbatim, skipping
    /// session validation.
    pub(crate) fn push_reply_override(&self, action: &str, body: &str) {
        self.state
            .reply_overrides
            .lock()
            .expect("poisoned lock")
            .push_back((action.to_owned(), body.to_owned()));
    }

    /// Whether the camera currently considers `session` valid.
    pub(crate) fn is_valid_session(&self, session: &SessionId) -> bool {
        self.state
            .valid_sessions
            .lock()
            .expect("poisoned lock")
            .contains(session.as_str())
    }

    /// Raw query string of the most recent request.
    pub(crate) fn last_query(&self) -> Option<String> {
        self.state.last_query.lock().expect("poisoned lock").clone()
    }
}

impl Drop for FakeCamera {
    fn drop(&mut self) {
        self.server.abort();
    }
}

const SESSION_EXPIRED_BODY: &str = r#"{"error": {"Return Code": 21}}"#;

async fn handle_cgi(
    State(state): State<Arc<CameraState>>,
    RawQuery(raw_query): RawQuery,
    Query(params): Query<Vec<(String, String)>>,
) -> (StatusCode, String) {
    *state.last_query.lock().expect("poisoned lock") = raw_query;

    let find = |key: &str| {
        params
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    };

    // The real handler only answers CGI requests carrying the token-override
    // pair; anything else lands on the login page. Approximate that with a
    // hard error so a missing trailer can't go unnoticed in tests.
    if find("tokenoverride") != Some("1") || find("_") != Some("0") {
        return (
            StatusCode::BAD_REQUEST,
            "missing token override parameters".to_owned(),
        );
    }

    let Some(action) = find("action") else {
        return (StatusCode::BAD_REQUEST, "missing action".to_owned());
    };

    if action == "SERVERWhoAmI" {
        let _ = state.auth_calls.fetch_add(1, Ordering::Relaxed);
        let behavior = *state.auth_behavior.lock().expect("poisoned lock");
        let body = match behavior {
            AuthBehavior::Normal => {
                let id = format!("S{:08X}", rand::random::<u32>());
                let _ = state
                    .valid_sessions
                    .lock()
                    .expect("poisoned lock")
                    .insert(id.clone());
                format!(r#"{{"SERVERWhoAmI": {{"Id": "{id}"}}}}"#)
            }
            AuthBehavior::EmptyBody => String::new(),
            AuthBehavior::Malformed => "<html>please log in</html>".to_owned(),
            AuthBehavior::BlankId => r#"{"SERVERWhoAmI": {"Id": ""}}"#.to_owned(),
        };
        return (StatusCode::OK, body);
    }

    let _ = state.command_calls.fetch_add(1, Ordering::Relaxed);

    let scripted = {
        let mut overrides = state.reply_overrides.lock().expect("poisoned lock");
        match overrides.front() {
            Some((scripted_action, _)) if scripted_action == action => {
                overrides.pop_front().map(|(_, body)| body)
            }
            _ => None,
        }
    };
    if let Some(body) = scripted {
        return (StatusCode::OK, body);
    }

    let session_is_valid = find("session").is_some_and(|session| {
        state
            .valid_sessions
            .lock()
            .expect("poisoned lock")
            .contains(session)
    });
    if !session_is_valid {
        return (StatusCode::OK, SESSION_EXPIRED_BODY.to_owned());
    }

    (StatusCode::OK, canned_reply(action))
}

fn canned_reply(action: &str) -> String {
    match action {
        "PTAzimuthElevationGet" => {
            r#"{"PTAzimuthElevationGet": {"Azimuth": 124.3, "Elevation": -3.5}}"#.to_owned()
        }
        "PTSpeedGet" => {
            r#"{"PTSpeedGet": {"Azimuth_Speed": 180, "Elevation_Speed": 90}}"#.to_owned()
        }
        "DLTVFOVMagnificationGet" => {
            r#"{"DLTVFOVMagnificationGet": {"Magnification": 2.5}}"#.to_owned()
        }
        "DLTVZoomDegreesGet" => {
            r#"{"DLTVZoomDegreesGet": {"HFOV": 24.0, "VFOV": 18.0}}"#.to_owned()
        }
        // Write actions acknowledge with an empty object under the action
        // name; unknown actions get the same shape, which is close enough
        // for passthrough tests.
        _ => format!(r#"{{"{action}": {{}}}}"#),
    }
}
