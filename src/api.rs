use serde::Deserialize;

/// CGI actions understood by the Nexus camera firmware.
///
/// Every action maps to a single plain-HTTP GET against the CGI handler,
/// with the wire name passed as the `action` query parameter.
/// [`ServerWhoAmI`](Self::ServerWhoAmI) is the authentication handshake and
/// the only action issued without a `session` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Obtain a session id.
    ServerWhoAmI,
    /// Read the current pan/tilt angle in degrees.
    PtAzimuthElevationGet,
    /// Read the current pan/tilt axis speeds.
    PtSpeedGet,
    /// Set the pan/tilt axis speeds.
    PtSpeedModeSet,
    /// Slew to an absolute azimuth/elevation.
    PtAzimuthElevationSet,
    /// Re-aim the camera so a given screen point becomes the center.
    PtAzimuthElevationOnScreenSet,
    /// Read the zoom magnification factor.
    DltvFovMagnificationGet,
    /// Set the zoom magnification factor.
    DltvFovMagnificationSet,
    /// Read the zoomed field of view in degrees.
    DltvZoomDegreesGet,
    /// Trigger a one-shot autofocus.
    DltvAutoFocusPush,
}

impl Action {
    /// Wire name of the action, exactly as the firmware spells it.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ServerWhoAmI => "SERVERWhoAmI",
            Self::PtAzimuthElevationGet => "PTAzimuthElevationGet",
            Self::PtSpeedGet => "PTSpeedGet",
            Self::PtSpeedModeSet => "PTSpeedModeSet",
            Self::PtAzimuthElevationSet => "PTAzimuthElevationSet",
            Self::PtAzimuthElevationOnScreenSet => "PTAzimuthElevationOnScreenSet",
            Self::DltvFovMagnificationGet => "DLTVFOVMagnificationGet",
            Self::DltvFovMagnificationSet => "DLTVFOVMagnificationSet",
            Self::DltvZoomDegreesGet => "DLTVZoomDegreesGet",
            Self::DltvAutoFocusPush => "DLTVAutoFocusPush",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default axis speed for absolute slews, matching the vendor tooling.
pub const DEFAULT_SLEW_SPEED: i32 = 180;

// Fixed selector values `PTAzimuthElevationOnScreenSet` expects alongside
// the screen coordinates.
pub(crate) const ONSCREEN_ACTIVE_CAM: u8 = 0;
pub(crate) const ONSCREEN_CAM_TYPE: u8 = 4;
pub(crate) const ONSCREEN_CAM_ID: u8 = 0;

/// Body of a successful `SERVERWhoAmI` reply.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WhoAmI {
    #[serde(rename = "Id")]
    pub(crate) id: String,
}

/// Pan/tilt pose reported by `PTAzimuthElevationGet`, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AzimuthElevation {
    /// Azimuth angle.
    #[serde(rename = "Azimuth")]
    pub azimuth: f64,
    /// Elevation angle.
    #[serde(rename = "Elevation")]
    pub elevation: f64,
}

/// Axis speeds reported by `PTSpeedGet`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PanTiltSpeed {
    /// Azimuth axis speed.
    #[serde(rename = "Azimuth_Speed")]
    pub azimuth_speed: f64,
    /// Elevation axis speed.
    #[serde(rename = "Elevation_Speed")]
    pub elevation_speed: f64,
}

/// Body of a `DLTVFOVMagnificationGet` reply.
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct Magnification {
    #[serde(rename = "Magnification")]
    pub(crate) magnification: f64,
}
