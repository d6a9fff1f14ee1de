//! Level editor
//!
//! Edits a [`Level`] in place with snapshot undo/redo, and can hand the
//! result to a running simulation for playtesting.

pub mod form;

use std::fmt;

use crate::sim::enemy::EnemyKind;
use crate::sim::level::{EnemySpawn, Level, LevelError, PickupSpawn, TilePoint, limits};
use crate::sim::pickup::PickupKind;
use crate::sim::state::SimulationState;
use crate::sim::tile::Tile;
use crate::sim::tilemap::Tilemap;

pub use form::{EditorField, FormError, LevelProperties, PropertiesForm};

/// Undo history depth
const MAX_UNDO: usize = 100;

/// What a click on the grid does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorTool {
    Paint(Tile),
    /// Paint `Empty`
    Erase,
    PlaceEnemy(EnemyKind),
    PlacePickup(PickupKind),
    PlaceCheckpoint,
    PlayerStart,
    /// Remove any entity placed on the cell
    RemoveEntity,
}

#[derive(Debug)]
pub enum EditorError {
    Form(FormError),
    Level(LevelError),
    /// The simulation refused to start on the level slot
    Playtest(usize),
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorError::Form(e) => write!(f, "Invalid properties: {}", e),
            EditorError::Level(e) => write!(f, "Invalid level: {}", e),
            EditorError::Playtest(slot) => write!(f, "Could not start playtest in slot {}", slot),
        }
    }
}

impl std::error::Error for EditorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EditorError::Form(e) => Some(e),
            EditorError::Level(e) => Some(e),
            EditorError::Playtest(_) => None,
        }
    }
}

impl From<FormError> for EditorError {
    fn from(e: FormError) -> Self {
        EditorError::Form(e)
    }
}

impl From<LevelError> for EditorError {
    fn from(e: LevelError) -> Self {
        EditorError::Level(e)
    }
}

pub struct LevelEditor {
    /// Metadata and spawns; `data` is kept equal to `map.to_rows()`
    level: Level,
    map: Tilemap,
    pub tool: EditorTool,
    pub form: PropertiesForm,
    undo_stack: Vec<Level>,
    redo_stack: Vec<Level>,
    /// Slot in the level manager used by the last playtest
    playtest_slot: Option<usize>,
}

impl LevelEditor {
    /// Open a level for editing. Malformed input falls back to an empty room.
    pub fn new(level: Level) -> Self {
        let (level, map) = match Tilemap::from_level(&level) {
            Ok(map) => (level, map),
            Err(e) => {
                log::warn!("Cannot edit '{}': {}; starting blank", level.name, e);
                let blank = Level::bordered("Untitled", 40, 15);
                let map = Tilemap::from_level(&blank).unwrap_or_else(|_| Tilemap::new(40, 15));
                (blank, map)
            }
        };
        let form = PropertiesForm::from_properties(&properties_of(&level));
        Self {
            level,
            map,
            tool: EditorTool::Paint(Tile::Solid),
            form,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            playtest_slot: None,
        }
    }

    pub fn blank(width: u32, height: u32) -> Self {
        Self::new(Level::bordered("Untitled", width, height))
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn tilemap(&self) -> &Tilemap {
        &self.map
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Save current level state for undo
    fn save_undo(&mut self) {
        self.undo_stack.push(self.level.clone());
        self.redo_stack.clear();
        if self.undo_stack.len() > MAX_UNDO {
            self.undo_stack.remove(0);
        }
    }

    fn restore(&mut self, level: Level) {
        match Tilemap::from_level(&level) {
            Ok(map) => {
                self.map = map;
                self.form = PropertiesForm::from_properties(&properties_of(&level));
                self.level = level;
            }
            Err(e) => log::warn!("Discarding corrupt undo snapshot: {}", e),
        }
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo_stack.pop() else {
            return false;
        };
        self.redo_stack.push(self.level.clone());
        self.restore(previous);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push(self.level.clone());
        self.restore(next);
        true
    }

    /// Apply the current tool at a tile. Returns false if nothing changed.
    pub fn apply_tool(&mut self, tx: i32, ty: i32) -> bool {
        if !self.level.contains(tx, ty) {
            return false;
        }
        let point = TilePoint::new(tx, ty);
        match self.tool {
            EditorTool::Paint(tile) => self.paint(tx, ty, tile),
            EditorTool::Erase => self.paint(tx, ty, Tile::Empty),
            EditorTool::PlaceEnemy(kind) => {
                self.save_undo();
                self.clear_entities_at(point);
                self.level.enemies.push(EnemySpawn { kind, x: tx, y: ty });
                true
            }
            EditorTool::PlacePickup(kind) => {
                self.save_undo();
                self.clear_entities_at(point);
                self.level.pickups.push(PickupSpawn { kind, x: tx, y: ty });
                true
            }
            EditorTool::PlaceCheckpoint => {
                if self.level.checkpoints.contains(&point) {
                    return false;
                }
                self.save_undo();
                self.clear_entities_at(point);
                self.level.checkpoints.push(point);
                true
            }
            EditorTool::PlayerStart => {
                if self.level.player_start == point {
                    return false;
                }
                self.save_undo();
                self.level.player_start = point;
                true
            }
            EditorTool::RemoveEntity => {
                if !self.has_entity_at(point) {
                    return false;
                }
                self.save_undo();
                self.clear_entities_at(point);
                true
            }
        }
    }

    fn paint(&mut self, tx: i32, ty: i32, tile: Tile) -> bool {
        if self.map.tile_at(tx, ty) == tile {
            return false;
        }
        self.save_undo();
        self.map.set_tile(tx, ty, tile);
        self.level.data = self.map.to_rows();
        true
    }

    fn has_entity_at(&self, p: TilePoint) -> bool {
        self.level.enemies.iter().any(|e| e.x == p.x && e.y == p.y)
            || self.level.pickups.iter().any(|s| s.x == p.x && s.y == p.y)
            || self.level.checkpoints.contains(&p)
    }

    fn clear_entities_at(&mut self, p: TilePoint) {
        self.level.enemies.retain(|e| e.x != p.x || e.y != p.y);
        self.level.pickups.retain(|s| s.x != p.x || s.y != p.y);
        self.level.checkpoints.retain(|c| *c != p);
    }

    /// Resize the grid keeping the top-left region. Spawns that fall outside
    /// are dropped; the player start is pulled back inside. Dimensions are
    /// clamped to what a level may hold.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let width = width.clamp(3, limits::MAX_DIMENSION);
        let height = height.clamp(3, limits::MAX_DIMENSION);
        if width == self.level.width && height == self.level.height {
            return false;
        }
        self.save_undo();
        self.map = self.map.resized(width, height);
        let level = &mut self.level;
        level.width = width;
        level.height = height;
        level.data = self.map.to_rows();
        level.enemies.retain(|e| (e.x as u32) < width && (e.y as u32) < height);
        level.pickups.retain(|p| (p.x as u32) < width && (p.y as u32) < height);
        level.checkpoints.retain(|c| (c.x as u32) < width && (c.y as u32) < height);
        level.player_start.x = level.player_start.x.min(width as i32 - 1);
        level.player_start.y = level.player_start.y.min(height as i32 - 1);
        true
    }

    /// Commit the properties form: rename and resize
    pub fn apply_form(&mut self) -> Result<(), EditorError> {
        let props = self.form.parse()?;
        let renamed = props.name != self.level.name;
        if renamed {
            self.save_undo();
            self.level.name = props.name;
        }
        self.resize(props.width, props.height);
        self.form.focus(None);
        Ok(())
    }

    /// Validated copy of the level being edited
    pub fn build_level(&self) -> Result<Level, LevelError> {
        self.level.validate()?;
        Ok(self.level.clone())
    }

    pub fn export_json(&self) -> Result<String, LevelError> {
        self.build_level()?.to_json()
    }

    /// Replace the level with imported JSON. Bad input leaves the editor
    /// unchanged.
    pub fn import_json(&mut self, json: &str) -> Result<(), LevelError> {
        let level = Level::from_json(json)?;
        let map = Tilemap::from_level(&level)?;
        self.save_undo();
        self.form = PropertiesForm::from_properties(&properties_of(&level));
        self.level = level;
        self.map = map;
        Ok(())
    }

    /// Hot-swap the level into a simulation and start a run on it.
    /// Repeated playtests reuse the same level slot.
    pub fn playtest(&mut self, state: &mut SimulationState) -> Result<usize, EditorError> {
        let level = self.build_level()?;
        let index = match self.playtest_slot {
            Some(slot) if state.level_manager.replace_level(slot, level.clone()) => slot,
            _ => state.level_manager.push_level(level),
        };
        self.playtest_slot = Some(index);
        if !state.start_run(index) {
            return Err(EditorError::Playtest(index));
        }
        state.playtest = true;
        log::info!("Playtesting '{}' in slot {}", self.level.name, index);
        Ok(index)
    }
}

fn properties_of(level: &Level) -> LevelProperties {
    LevelProperties {
        name: level.name.clone(),
        width: level.width,
        height: level.height,
    }
}
