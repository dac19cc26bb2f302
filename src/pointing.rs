//! Converting screen positions into pan/tilt targets.
//!
//! These helpers turn a pixel in the camera's video frame into the absolute
//! azimuth/elevation that would center that pixel, given the current pose
//! and zoomed field of view. They are pure math for callers that aim the
//! camera from detections in the video stream; nothing here talks to the
//! camera.

use crate::api::AzimuthElevation;

/// Video frame dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenSize {
    /// Frame width.
    pub width: f64,
    /// Frame height.
    pub height: f64,
}

/// Camera field of view in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldOfView {
    /// Horizontal extent.
    pub horizontal: f64,
    /// Vertical extent.
    pub vertical: f64,
}

/// Angular offset of a pixel from the optical axis, in degrees.
///
/// Returns `(azimuth_offset, elevation_offset)`. Pixel origin is the top
/// left corner, so a pixel right of center yields a positive azimuth offset
/// and a pixel above center a positive elevation offset. Assumes a linear
/// projection, which holds well enough at the magnifications where
/// centering is useful.
pub fn screen_offset_degrees(
    pixel_x: f64,
    pixel_y: f64,
    screen: ScreenSize,
    fov: FieldOfView,
) -> (f64, f64) {
    let normalized_x = (2.0 * pixel_x / screen.width) - 1.0;
    let normalized_y = 1.0 - (2.0 * pixel_y / screen.height);

    (
        normalized_x * (fov.horizontal / 2.0),
        normalized_y * (fov.vertical / 2.0),
    )
}

/// Absolute pose that would center the given angular offset, from the
/// current pose.
///
/// Azimuth wraps into `[0, 360)`; elevation is left unclamped since the
/// firmware enforces its own mechanical limits.
pub fn absolute_target(
    pose: AzimuthElevation,
    azimuth_offset: f64,
    elevation_offset: f64,
) -> AzimuthElevation {
    AzimuthElevation {
        azimuth: (pose.azimuth + azimuth_offset).rem_euclid(360.0),
        elevation: pose.elevation + elevation_offset,
    }
}
