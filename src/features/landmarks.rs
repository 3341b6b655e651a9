//! Landmark frame types
//!
//! A frame is 21 (x, y, z) points from the upstream hand tracker. Callers may
//! send it either flat (`[x0, y0, z0, x1, ...]`) or as a list of points.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Number of tracked points per hand
pub const LANDMARK_COUNT: usize = 21;

/// Number of scalars in a flat frame
pub const FLAT_LEN: usize = LANDMARK_COUNT * 3;

/// A single 3-D landmark in normalized image coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Landmarks as they arrive on the wire, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawLandmarks {
    /// `[x0, y0, z0, x1, y1, z1, ...]`
    Flat(Vec<f64>),
    /// `[{"x":..,"y":..,"z":..}, ...]`
    Points(Vec<Point3>),
}

/// A validated frame of exactly 21 finite points
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkFrame {
    points: Vec<Point3>,
}

impl LandmarkFrame {
    /// Build a frame from per-point input
    pub fn from_points(points: Vec<Point3>) -> EngineResult<Self> {
        if points.len() != LANDMARK_COUNT {
            return Err(EngineError::InvalidInput(format!(
                "expected {} landmarks, got {}",
                LANDMARK_COUNT,
                points.len()
            )));
        }

        if let Some(idx) = points
            .iter()
            .position(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
        {
            return Err(EngineError::InvalidInput(format!(
                "landmark {} has a non-finite coordinate",
                idx
            )));
        }

        Ok(Self { points })
    }

    /// Build a frame from a flat `[x, y, z, ...]` slice
    pub fn from_flat(values: &[f64]) -> EngineResult<Self> {
        if values.len() != FLAT_LEN {
            return Err(EngineError::InvalidInput(format!(
                "expected {} values, got {}",
                FLAT_LEN,
                values.len()
            )));
        }

        let points = values
            .chunks_exact(3)
            .map(|c| Point3 { x: c[0], y: c[1], z: c[2] })
            .collect();

        Self::from_points(points)
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }
}

impl TryFrom<RawLandmarks> for LandmarkFrame {
    type Error = EngineError;

    fn try_from(raw: RawLandmarks) -> EngineResult<Self> {
        match raw {
            RawLandmarks::Flat(values) => Self::from_flat(&values),
            RawLandmarks::Points(points) => Self::from_points(points),
        }
    }
}

impl TryFrom<&RawLandmarks> for LandmarkFrame {
    type Error = EngineError;

    fn try_from(raw: &RawLandmarks) -> EngineResult<Self> {
        match raw {
            RawLandmarks::Flat(values) => Self::from_flat(values),
            RawLandmarks::Points(points) => Self::from_points(points.clone()),
        }
    }
}
