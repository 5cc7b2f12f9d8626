//! Zone classification for the two Venn circles
//!
//! Pure geometry: no state, no I/O. Every call depends only on its arguments.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Which of the two circles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CircleId {
    A,
    B,
}

impl CircleId {
    pub const ALL: [CircleId; 2] = [CircleId::A, CircleId::B];

    /// Slot in a `[Circle; 2]`
    #[inline]
    pub fn index(self) -> usize {
        match self {
            CircleId::A => 0,
            CircleId::B => 1,
        }
    }

    /// Parse a circle name, either case
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim() {
            "A" | "a" => Some(CircleId::A),
            "B" | "b" => Some(CircleId::B),
            _ => None,
        }
    }
}

/// A Venn circle. `size` is the diameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub id: CircleId,
    pub visible: bool,
    pub center: Vec2,
    pub size: f32,
}

impl Circle {
    pub fn new(id: CircleId, center: Vec2, size: f32) -> Self {
        Self {
            id,
            visible: false,
            center,
            size,
        }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.size / 2.0
    }

    /// Closed-disk test; invisible circles contain nothing
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        self.visible && sd_circle(point, self.center, self.radius()) <= 0.0
    }
}

/// Signed distance to a circle (negative inside)
#[inline]
pub fn sd_circle(p: Vec2, center: Vec2, radius: f32) -> f32 {
    (p - center).length() - radius
}

/// Where an item sits. Serializes to exactly `A`, `B`, `AB`, `outside`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneLabel {
    A,
    B,
    AB,
    #[serde(rename = "outside")]
    Outside,
}

impl ZoneLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneLabel::A => "A",
            ZoneLabel::B => "B",
            ZoneLabel::AB => "AB",
            ZoneLabel::Outside => "outside",
        }
    }

    /// Label after swapping which circle is called A
    pub fn swapped(self) -> Self {
        match self {
            ZoneLabel::A => ZoneLabel::B,
            ZoneLabel::B => ZoneLabel::A,
            other => other,
        }
    }
}

impl std::fmt::Display for ZoneLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify an item's center point against the circle pair.
///
/// The slice order does not matter; each circle's own `id` decides which
/// label it contributes.
pub fn classify(item_center: Vec2, circles: &[Circle; 2]) -> ZoneLabel {
    let mut in_a = false;
    let mut in_b = false;
    for circle in circles {
        if circle.contains(item_center) {
            match circle.id {
                CircleId::A => in_a = true,
                CircleId::B => in_b = true,
            }
        }
    }

    match (in_a, in_b) {
        (true, true) => ZoneLabel::AB,
        (true, false) => ZoneLabel::A,
        (false, true) => ZoneLabel::B,
        (false, false) => ZoneLabel::Outside,
    }
}
