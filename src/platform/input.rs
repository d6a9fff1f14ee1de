//! Keyboard input collection
//!
//! Key events arrive asynchronously from the browser; the frame loop takes one
//! [`TickInput`] snapshot per frame. Held keys map to level booleans. Edge
//! actions (pause, menu, enter, weapon changes) are latched on key-down and
//! cleared by the snapshot that reports them, so each press is seen exactly
//! once no matter how many frames pass before the next snapshot.

use crate::sim::{TickInput, WeaponKind};

/// What a physical key does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Left,
    Right,
    Jump,
    ShootUp,
    ShootDown,
    Fire,
    Pause,
    Menu,
    Enter,
    NextWeapon,
    PrevWeapon,
    Select(WeaponKind),
    SkipLevel,
}

impl Action {
    /// Map a `KeyboardEvent.key` value
    pub fn from_key(key: &str) -> Option<Self> {
        let action = match key {
            "ArrowLeft" | "a" | "A" => Action::Left,
            "ArrowRight" | "d" | "D" => Action::Right,
            " " | "z" | "Z" => Action::Jump,
            "ArrowUp" | "w" | "W" => Action::ShootUp,
            "ArrowDown" | "s" | "S" => Action::ShootDown,
            "x" | "X" | "j" | "J" | "Control" => Action::Fire,
            "Escape" | "p" | "P" => Action::Pause,
            "m" | "M" => Action::Menu,
            "Enter" => Action::Enter,
            "e" | "E" | "]" => Action::NextWeapon,
            "q" | "Q" | "[" => Action::PrevWeapon,
            "+" | "=" => Action::SkipLevel,
            _ => {
                let digit = key.parse::<usize>().ok()?;
                Action::Select(WeaponKind::from_index(digit.checked_sub(1)?)?)
            }
        };
        Some(action)
    }

    /// Edge actions fire once per press; the rest are held
    pub fn is_edge(self) -> bool {
        !matches!(
            self,
            Action::Left | Action::Right | Action::Jump | Action::ShootUp | Action::ShootDown | Action::Fire
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: TickInput,
    /// Latched edges waiting for the next snapshot
    edges: TickInput,
    /// Skip-level is a debug key
    pub allow_debug: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a key-down. `repeat` is the browser's auto-repeat flag.
    /// Returns true if the key is bound (the caller should prevent default).
    pub fn key_down(&mut self, key: &str, repeat: bool) -> bool {
        let Some(action) = Action::from_key(key) else {
            return false;
        };
        if action.is_edge() {
            if !repeat {
                self.latch(action);
            }
        } else {
            self.set_held(action, true);
        }
        true
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        let Some(action) = Action::from_key(key) else {
            return false;
        };
        if !action.is_edge() {
            self.set_held(action, false);
        }
        true
    }

    /// Request a pause as if the key had been pressed (auto-pause on blur)
    pub fn request_pause(&mut self) {
        self.edges.pause = true;
    }

    /// Window lost focus: key-ups will never arrive, so drop held keys
    pub fn release_all(&mut self) {
        self.held = TickInput::default();
    }

    /// This frame's input. Consumes latched edges.
    pub fn snapshot(&mut self) -> TickInput {
        let edges = std::mem::take(&mut self.edges);
        TickInput {
            left: self.held.left,
            right: self.held.right,
            jump: self.held.jump,
            shoot_up: self.held.shoot_up,
            shoot_down: self.held.shoot_down,
            fire: self.held.fire,
            pause: edges.pause,
            menu: edges.menu,
            enter: edges.enter,
            next_weapon: edges.next_weapon,
            prev_weapon: edges.prev_weapon,
            select_weapon: edges.select_weapon,
            skip_level: edges.skip_level && self.allow_debug,
        }
    }

    fn set_held(&mut self, action: Action, down: bool) {
        match action {
            Action::Left => self.held.left = down,
            Action::Right => self.held.right = down,
            Action::Jump => self.held.jump = down,
            Action::ShootUp => self.held.shoot_up = down,
            Action::ShootDown => self.held.shoot_down = down,
            Action::Fire => self.held.fire = down,
            _ => {}
        }
    }

    fn latch(&mut self, action: Action) {
        match action {
            Action::Pause => self.edges.pause = true,
            Action::Menu => self.edges.menu = true,
            Action::Enter => self.edges.enter = true,
            Action::NextWeapon => self.edges.next_weapon = true,
            Action::PrevWeapon => self.edges.prev_weapon = true,
            Action::Select(weapon) => self.edges.select_weapon = Some(weapon),
            Action::SkipLevel => self.edges.skip_level = true,
            _ => {}
        }
    }
}
