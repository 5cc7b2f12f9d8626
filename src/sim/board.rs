//! Live positions of the circles and items on the board
//!
//! Every mutation comes from a single user interaction, so nothing here
//! needs locking. `snapshot()` hands out an owned copy for classification.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::zone::{Circle, CircleId, ZoneLabel, classify};
use crate::consts::*;
use crate::error::{GameError, Result};
use crate::grid_position;
use crate::item_center;
use crate::settings::CircleSizeRange;

/// A draggable item. `position` is the top-left anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub text: String,
    pub position: Vec2,
}

impl Item {
    /// Point used for zone classification
    #[inline]
    pub fn center(&self) -> Vec2 {
        item_center(self.position)
    }

    /// Whether `point` lies on the item's box
    pub fn hit(&self, point: Vec2) -> bool {
        let local = point - self.position;
        local.x >= 0.0 && local.y >= 0.0 && local.x <= ITEM_WIDTH && local.y <= ITEM_HEIGHT
    }
}

/// Immutable view of the board at the moment it was taken
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub circles: [Circle; 2],
    pub items: Vec<Item>,
}

impl BoardSnapshot {
    /// Zone of every item, in item order
    pub fn zones(&self) -> Vec<(String, ZoneLabel)> {
        zones_of(&self.items, &self.circles)
    }
}

fn zones_of(items: &[Item], circles: &[Circle; 2]) -> Vec<(String, ZoneLabel)> {
    items
        .iter()
        .map(|item| (item.text.clone(), classify(item.center(), circles)))
        .collect()
}

/// Position tracker for one level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    circles: [Circle; 2],
    items: Vec<Item>,
    sizes: CircleSizeRange,
}

impl Board {
    pub fn new(sizes: CircleSizeRange) -> Self {
        Self {
            circles: default_circles(&sizes),
            items: Vec::new(),
            sizes,
        }
    }

    /// Fresh layout for a newly fetched level: circles hidden at their
    /// default spots, items on the grid keyed only by index.
    pub fn reset<S: AsRef<str>>(&mut self, texts: &[S]) {
        self.circles = default_circles(&self.sizes);
        self.items = texts
            .iter()
            .enumerate()
            .map(|(index, text)| Item {
                id: format!("item-{index}"),
                text: text.as_ref().to_string(),
                position: grid_position(index),
            })
            .collect();
        log::debug!("Board reset with {} items", self.items.len());
    }

    pub fn circle(&self, id: CircleId) -> &Circle {
        &self.circles[id.index()]
    }

    pub fn circles(&self) -> &[Circle; 2] {
        &self.circles
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn size_range(&self) -> &CircleSizeRange {
        &self.sizes
    }

    pub fn move_circle(&mut self, id: CircleId, center: Vec2) {
        self.circles[id.index()].center = center;
    }

    /// Set a circle's diameter, clamped to the configured range
    pub fn resize_circle(&mut self, id: CircleId, size: f32) -> f32 {
        let size = self.sizes.clamp(size);
        self.circles[id.index()].size = size;
        size
    }

    /// Flip visibility; returns the new state
    pub fn toggle_circle(&mut self, id: CircleId) -> bool {
        let circle = &mut self.circles[id.index()];
        circle.visible = !circle.visible;
        circle.visible
    }

    pub fn move_item(&mut self, id: &str, position: Vec2) -> Result<()> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| GameError::UnknownItem(id.to_string()))?;
        item.position = position;
        Ok(())
    }

    /// Zone of every item right now, in level order
    pub fn classify_items(&self) -> Vec<(String, ZoneLabel)> {
        zones_of(&self.items, &self.circles)
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            circles: self.circles,
            items: self.items.clone(),
        }
    }

    /// Topmost item under `point` (later items are drawn above earlier ones)
    pub fn item_at(&self, point: Vec2) -> Option<&Item> {
        self.items.iter().rev().find(|item| item.hit(point))
    }

    /// Visible circle under `point`, B before A (B is drawn last)
    pub fn circle_at(&self, point: Vec2) -> Option<CircleId> {
        self.circles
            .iter()
            .rev()
            .find(|circle| circle.contains(point))
            .map(|circle| circle.id)
    }
}

fn default_circles(sizes: &CircleSizeRange) -> [Circle; 2] {
    let size = sizes.clamp(DEFAULT_CIRCLE_SIZE);
    [
        Circle::new(CircleId::A, DEFAULT_CENTER_A, size),
        Circle::new(CircleId::B, DEFAULT_CENTER_B, size),
    ]
}
