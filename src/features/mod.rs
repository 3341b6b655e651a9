//! Landmark frames and the features derived from them
//!
//! Turns 21 raw hand points into the centered, scale-normalized vector the
//! classifier expects, and measures hand size for repeat gating.

mod landmarks;
mod normalize;

pub use landmarks::{LandmarkFrame, Point3, RawLandmarks, FLAT_LEN, LANDMARK_COUNT};
pub use normalize::{hand_area, normalize, FeatureVector, SCALE_EPSILON};
