/// Default TCP port of the camera's web server.
pub const NEXUS_DEFAULT_PORT: u16 = 80;

/// Path of the CGI handler that dispatches on the `action` query parameter.
pub const NEXUS_CGI_PATH: &str = "/Nexus.cgi";

/// Network location of one camera's Nexus CGI handler.
///
/// This is an explicit configuration value carried by the [`Client`] it is
/// constructed with; there is no implicit default camera address.
///
/// [`Client`]: crate::Client
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
#[display("{host}:{port}")]
pub struct CameraEndpoint {
    host: String,
    port: u16,
    cgi_path: String,
}

impl CameraEndpoint {
    /// Endpoint for a camera reachable at `host` (IP address or hostname)
    /// on the default port and CGI path.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: NEXUS_DEFAULT_PORT,
            cgi_path: NEXUS_CGI_PATH.to_owned(),
        }
    }

    /// Replace the TCP port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Replace the CGI handler path (must start with `/`).
    #[must_use]
    pub fn with_cgi_path(mut self, cgi_path: impl Into<String>) -> Self {
        self.cgi_path = cgi_path.into();
        self
    }

    /// Host the camera answers on.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port the camera answers on.
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Full URL of the CGI handler, without a query string.
    pub fn cgi_url(&self) -> String {
        format!(
            "http://{host}:{port}{path}",
            host = self.host,
            port = self.port,
            path = self.cgi_path
        )
    }
}
