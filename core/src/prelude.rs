use serde::{Deserialize, Serialize};

/// Continuous coordinate in logical frame space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// A wall point followed from frame to frame.
///
/// `initial` is fixed at placement; `current` and `strain` are rewritten on
/// every tracking tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingPoint {
    pub id: usize,
    pub initial: Point2,
    pub current: Point2,
    pub strain: f32,
}

impl TrackingPoint {
    pub fn seeded(id: usize, at: Point2) -> Self {
        Self {
            id,
            initial: at,
            current: at,
            strain: 0.0,
        }
    }
}

/// Rectangular region of interest in logical space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Roi {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Roi {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Intersects the region with a `width` x `height` frame.
    ///
    /// Negative extents are normalised first. Returns `None` when nothing of
    /// the region remains inside the frame.
    pub fn clamp(&self, width: usize, height: usize) -> Option<Roi> {
        let (x0, x1) = ordered(self.x, self.x + self.w);
        let (y0, y1) = ordered(self.y, self.y + self.h);
        let left = x0.max(0.0);
        let top = y0.max(0.0);
        let right = x1.min(width as f32);
        let bottom = y1.min(height as f32);
        if right - left < 1.0 || bottom - top < 1.0 {
            return None;
        }
        Some(Roi::new(left, top, right - left, bottom - top))
    }

    pub fn center(&self) -> Point2 {
        Point2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Apical views combined by the biplane protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    A4c,
    A2c,
}

impl View {
    /// Fixed processing order for the biplane walk.
    pub const ALL: [View; 2] = [View::A4c, View::A2c];

    pub const fn index(self) -> usize {
        match self {
            View::A4c => 0,
            View::A2c => 1,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            View::A4c => "A4C",
            View::A2c => "A2C",
        }
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One aggregate strain reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrainSample {
    pub time: f64,
    pub value: f32,
}

/// Common error type for engine operations.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("view {0} has no region of interest")]
    MissingRoi(View),
    #[error("view {0} has not completed its analysis")]
    ViewNotCompleted(View),
    #[error("view {0} is completed; reset it first")]
    SessionCompleted(View),
    #[error("region of interest lies outside the frame")]
    InvalidRoi,
    #[error("invalid raster: {0}")]
    InvalidRaster(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("frame source failure: {0}")]
    Source(String),
    #[error("analysis cancelled")]
    Cancelled,
}

pub type EngineResult<T> = Result<T, EngineError>;
