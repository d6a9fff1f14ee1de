//! Collision detection and response
//!
//! Two layers:
//! - Entity vs entity: plain AABB overlap, behind a [`BroadPhase`] seam
//! - Entity vs tilemap: per-axis swept resolution with one-way platforms

use glam::Vec2;

use super::physics::Body;
use super::tile::Tile;
use super::tilemap::{EDGE_EPSILON, Tilemap};
use crate::consts::TILE_SIZE;
use crate::pixel_to_tile;

/// Axis-aligned bounding box (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Aabb {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    /// Strict overlap test; touching edges do not intersect
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Whether the box center lies within `radius` of a point
    pub fn center_within(&self, point: Vec2, radius: f32) -> bool {
        self.center().distance_squared(point) <= radius * radius
    }
}

/// Candidate selection ahead of the narrow-phase AABB test.
///
/// Returns indices into `boxes` that might overlap `query`. Implementations
/// may over-report; callers always confirm with [`Aabb::intersects`].
pub trait BroadPhase {
    fn candidates(&self, query: &Aabb, boxes: &[Aabb], out: &mut Vec<usize>);
}

/// Every box is a candidate. Fine at tens of entities.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllPairs;

impl BroadPhase for AllPairs {
    fn candidates(&self, _query: &Aabb, boxes: &[Aabb], out: &mut Vec<usize>) {
        out.clear();
        out.extend(0..boxes.len());
    }
}

/// Indices of all boxes overlapping `query`
pub fn overlapping<B: BroadPhase>(broad: &B, query: &Aabb, boxes: &[Aabb]) -> Vec<usize> {
    let mut candidates = Vec::new();
    broad.candidates(query, boxes, &mut candidates);
    candidates.retain(|&i| boxes[i].intersects(query));
    candidates
}

/// What a body touched while moving through the tilemap
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TileContacts {
    /// Resting on a solid tile or platform after the move
    pub on_ground: bool,
    /// Came down onto the ground during this move
    pub landed: bool,
    /// Horizontal movement was stopped by a solid tile
    pub hit_wall: bool,
    /// Upward movement was stopped by a solid tile
    pub hit_ceiling: bool,
    /// Overlapping a spike tile
    pub spikes: bool,
    /// Overlapping an exit tile
    pub exit: bool,
}

/// Longest distance moved before re-checking tiles; keeps fast bodies from
/// skipping over a whole tile.
const MAX_SWEEP_STEP: f32 = TILE_SIZE * 0.5;

/// Move a body by `delta`, resolving X then Y against the tilemap.
///
/// Solid tiles stop movement on both axes. Platforms stop only a descending
/// body whose previous bottom edge was at or above the platform top. Landing
/// zeroes vertical velocity, wall contact zeroes horizontal velocity.
pub fn move_and_collide(body: &mut Body, map: &Tilemap, delta: Vec2) -> TileContacts {
    let mut contacts = TileContacts::default();
    let was_grounded = body.on_ground;

    // --- X axis ---
    let mut remaining = delta.x;
    while remaining.abs() > 0.0 {
        let step = remaining.clamp(-MAX_SWEEP_STEP, MAX_SWEEP_STEP);
        remaining -= step;
        body.pos.x += step;
        if resolve_x(body, map, step) {
            contacts.hit_wall = true;
            body.vel.x = 0.0;
            break;
        }
    }

    // --- Y axis ---
    let mut remaining = delta.y;
    while remaining.abs() > 0.0 {
        let step = remaining.clamp(-MAX_SWEEP_STEP, MAX_SWEEP_STEP);
        remaining -= step;
        let prev_bottom = body.pos.y + body.size.y;
        body.pos.y += step;
        if step > 0.0 {
            if resolve_down(body, map, prev_bottom) {
                contacts.landed = !was_grounded;
                body.vel.y = 0.0;
                break;
            }
        } else if resolve_up(body, map) {
            contacts.hit_ceiling = true;
            body.vel.y = 0.0;
            break;
        }
    }

    contacts.on_ground = probe_ground(body, map);
    body.on_ground = contacts.on_ground;

    let aabb = body.aabb();
    for (_, _, tile) in map.tiles_in_rect(aabb.x, aabb.y, aabb.w, aabb.h) {
        match tile {
            Tile::Spikes => contacts.spikes = true,
            Tile::Exit => contacts.exit = true,
            _ => {}
        }
    }

    contacts
}

/// Rows spanned by the body, for side checks
fn row_span(body: &Body) -> (i32, i32) {
    (
        pixel_to_tile(body.pos.y),
        pixel_to_tile(body.pos.y + body.size.y - EDGE_EPSILON),
    )
}

/// Columns spanned by the body, for floor/ceiling checks
fn col_span(body: &Body) -> (i32, i32) {
    (
        pixel_to_tile(body.pos.x),
        pixel_to_tile(body.pos.x + body.size.x - EDGE_EPSILON),
    )
}

/// Push the body out of solid tiles after a horizontal step. Returns true on contact.
fn resolve_x(body: &mut Body, map: &Tilemap, step: f32) -> bool {
    let (row0, row1) = row_span(body);
    if step > 0.0 {
        let col = pixel_to_tile(body.pos.x + body.size.x - EDGE_EPSILON);
        if (row0..=row1).any(|row| map.tile_at(col, row).is_solid()) {
            body.pos.x = col as f32 * TILE_SIZE - body.size.x;
            return true;
        }
    } else if step < 0.0 {
        let col = pixel_to_tile(body.pos.x);
        if (row0..=row1).any(|row| map.tile_at(col, row).is_solid()) {
            body.pos.x = (col + 1) as f32 * TILE_SIZE;
            return true;
        }
    }
    false
}

/// Snap a descending body onto the floor. Returns true on landing.
fn resolve_down(body: &mut Body, map: &Tilemap, prev_bottom: f32) -> bool {
    let (col0, col1) = col_span(body);
    let bottom = body.pos.y + body.size.y;
    let probe_y = bottom - EDGE_EPSILON;
    let row = pixel_to_tile(probe_y);
    let blocked = (col0..=col1).any(|col| {
        let px = (col as f32 + 0.5) * TILE_SIZE;
        map.is_blocked_at(px, probe_y, Some(prev_bottom))
    });
    if blocked {
        body.pos.y = row as f32 * TILE_SIZE - body.size.y;
    }
    blocked
}

/// Push a rising body down out of a solid ceiling. Platforms never block here.
fn resolve_up(body: &mut Body, map: &Tilemap) -> bool {
    let (col0, col1) = col_span(body);
    let row = pixel_to_tile(body.pos.y);
    if (col0..=col1).any(|col| map.tile_at(col, row).is_solid()) {
        body.pos.y = (row + 1) as f32 * TILE_SIZE;
        return true;
    }
    false
}

/// Whether the body's bottom edge rests exactly on a standable tile
pub fn probe_ground(body: &Body, map: &Tilemap) -> bool {
    let bottom = body.pos.y + body.size.y;
    let row = pixel_to_tile(bottom + EDGE_EPSILON);
    let row_top = row as f32 * TILE_SIZE;
    if (bottom - row_top).abs() > EDGE_EPSILON * 2.0 {
        return false;
    }
    let (col0, col1) = col_span(body);
    (col0..=col1).any(|col| map.tile_at(col, row).is_standable())
}

/// Whether there is standable ground just beyond the body's leading foot
pub fn ground_ahead(body: &Body, map: &Tilemap, direction: f32) -> bool {
    let probe_x = if direction >= 0.0 {
        body.pos.x + body.size.x + 1.0
    } else {
        body.pos.x - 1.0
    };
    let probe_y = body.pos.y + body.size.y + 1.0;
    map.tile_at_pixel(probe_x, probe_y).is_standable()
}

/// Whether a solid wall is directly beyond the body's leading side
pub fn wall_ahead(body: &Body, map: &Tilemap, direction: f32) -> bool {
    let probe_x = if direction >= 0.0 {
        body.pos.x + body.size.x + 1.0
    } else {
        body.pos.x - 1.0
    };
    let (row0, row1) = row_span(body);
    (row0..=row1).any(|row| map.tile_at(pixel_to_tile(probe_x), row).is_solid())
}
