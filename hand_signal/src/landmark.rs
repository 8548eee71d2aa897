//! 21-point hand skeleton in normalized image space.
//!
//! `x` and `y` are in `[0, 1]` with the origin at the top-left of the camera
//! image; `z` is relative depth.  Only four landmarks matter here.

use std::fmt;

use glam::Vec3;

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST:      usize = 0;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;

/// One detected hand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandLandmarks(pub [Vec3; LANDMARK_COUNT]);

impl HandLandmarks {
    /// Build from a detector's output, rejecting short or non-finite input.
    pub fn from_slice(points: &[Vec3]) -> Result<Self, LandmarkError> {
        if points.len() != LANDMARK_COUNT {
            return Err(LandmarkError::WrongCount(points.len()));
        }
        if let Some(i) = points.iter().position(|p| !p.is_finite()) {
            return Err(LandmarkError::NonFinite(i));
        }
        let mut out = [Vec3::ZERO; LANDMARK_COUNT];
        out.copy_from_slice(points);
        Ok(HandLandmarks(out))
    }

    pub fn wrist(&self)      -> Vec3 { self.0[WRIST] }
    pub fn thumb_tip(&self)  -> Vec3 { self.0[THUMB_TIP] }
    pub fn index_tip(&self)  -> Vec3 { self.0[INDEX_TIP] }
    pub fn middle_mcp(&self) -> Vec3 { self.0[MIDDLE_MCP] }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LandmarkError {
    /// Got this many points instead of 21.
    WrongCount(usize),
    /// Landmark at this index has a NaN or infinite coordinate.
    NonFinite(usize),
}

impl fmt::Display for LandmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LandmarkError::WrongCount(n) => {
                write!(f, "expected {} hand landmarks, got {}", LANDMARK_COUNT, n)
            }
            LandmarkError::NonFinite(i) => write!(f, "landmark {} is not finite", i),
        }
    }
}

impl std::error::Error for LandmarkError {}
