//! Pointer input to board mutations
//!
//! Each pointer drives at most one drag, and an entity can only be held by
//! one pointer. Positions update live on every move, so releasing a drag
//! simply leaves the entity where it is.

use std::collections::HashMap;

use glam::Vec2;

use crate::sim::{Board, CircleId};

pub type PointerId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pointer: PointerId,
    pub kind: PointerKind,
    pub pos: Vec2,
}

impl PointerEvent {
    pub fn new(pointer: PointerId, kind: PointerKind, x: f32, y: f32) -> Self {
        Self {
            pointer,
            kind,
            pos: Vec2::new(x, y),
        }
    }
}

/// What a drag holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragTarget {
    Item(String),
    Circle(CircleId),
}

/// Effect of one pointer event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragUpdate {
    Ignored,
    Started(DragTarget),
    Moved(DragTarget),
    Released(DragTarget),
}

#[derive(Debug, Clone)]
struct Drag {
    target: DragTarget,
    /// Anchor minus pointer position at grab time
    grab_offset: Vec2,
}

#[derive(Debug, Default)]
pub struct DragController {
    drags: HashMap<PointerId, Drag>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        !self.drags.is_empty()
    }

    pub fn handle(&mut self, board: &mut Board, event: PointerEvent) -> DragUpdate {
        match event.kind {
            PointerKind::Down => self.grab(board, event),
            PointerKind::Move => self.drag(board, event),
            PointerKind::Up | PointerKind::Cancel => match self.drags.remove(&event.pointer) {
                Some(drag) => DragUpdate::Released(drag.target),
                None => DragUpdate::Ignored,
            },
        }
    }

    /// Complete every active drag at its current position
    pub fn release_all(&mut self) -> Vec<DragTarget> {
        self.drags.drain().map(|(_, drag)| drag.target).collect()
    }

    fn grab(&mut self, board: &Board, event: PointerEvent) -> DragUpdate {
        if self.drags.contains_key(&event.pointer) {
            return DragUpdate::Ignored;
        }

        // Items sit above circles
        let hit = board
            .item_at(event.pos)
            .map(|item| (DragTarget::Item(item.id.clone()), item.position))
            .or_else(|| {
                board
                    .circle_at(event.pos)
                    .map(|id| (DragTarget::Circle(id), board.circle(id).center))
            });
        let Some((target, anchor)) = hit else {
            return DragUpdate::Ignored;
        };

        if self.drags.values().any(|d| d.target == target) {
            log::debug!("{target:?} is already held by another pointer");
            return DragUpdate::Ignored;
        }

        self.drags.insert(
            event.pointer,
            Drag {
                target: target.clone(),
                grab_offset: anchor - event.pos,
            },
        );
        DragUpdate::Started(target)
    }

    fn drag(&mut self, board: &mut Board, event: PointerEvent) -> DragUpdate {
        let Some(drag) = self.drags.get(&event.pointer) else {
            return DragUpdate::Ignored;
        };
        let anchor = event.pos + drag.grab_offset;
        let target = drag.target.clone();

        match &target {
            DragTarget::Item(id) => {
                if board.move_item(id, anchor).is_err() {
                    // Item vanished with a level reset
                    self.drags.remove(&event.pointer);
                    return DragUpdate::Ignored;
                }
            }
            DragTarget::Circle(id) => board.move_circle(*id, anchor),
        }
        DragUpdate::Moved(target)
    }
}

/// Grow or shrink a circle by whole slider steps; returns the new size
pub fn resize_by(board: &mut Board, id: CircleId, steps: i32) -> f32 {
    let step = board.size_range().step;
    let size = board.circle(id).size + step * steps as f32;
    board.resize_circle(id, size)
}
