//! Canvas 2D renderer
//!
//! Draws every sprite as a colored rectangle. Good enough to play and to
//! debug level layouts; art can replace the colors later without touching
//! the frame snapshot.

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::frame::{RenderFrame, Renderer, SpriteKind};
use crate::consts::TILE_SIZE;
use crate::sim::{EnemyKind, GamePhase, ParticleKind, PickupKind, ProjectileKind, Side, Tile};

/// Width of one repeating backdrop segment, in world pixels
const BACKDROP_SPAN: f64 = 320.0;

pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    /// Device pixels per world pixel
    scale: f64,
}

impl CanvasRenderer {
    /// Wrap a canvas. Returns None if no 2D context is available.
    pub fn new(canvas: HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self { canvas, ctx, scale: 1.0 })
    }

    fn rect(&self, color: &str, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(x, y, w, h);
    }

    fn text(&self, text: &str, x: f64, y: f64, size: u32, color: &str) {
        self.ctx.set_font(&format!("bold {}px monospace", size));
        self.ctx.set_fill_style_str(color);
        let _ = self.ctx.fill_text(text, x, y);
    }

    fn draw_hud(&self, frame: &RenderFrame, width: f64) {
        let hud = &frame.hud;
        let ammo = hud.ammo.map(|a| a.to_string()).unwrap_or_else(|| "∞".to_string());
        self.text(
            &format!(
                "HP {:>3}  AR {:>3}  {} {}  LIVES {}",
                hud.health.ceil() as i32,
                hud.armor.ceil() as i32,
                hud.weapon.as_str().to_uppercase(),
                ammo,
                hud.lives
            ),
            12.0,
            24.0,
            16,
            "#e8e8e8",
        );
        let coin_color = if hud.coin_flash > 0.0 { "#fff27a" } else { "#e0b030" };
        self.text(&format!("SCORE {}", hud.score), width - 220.0, 24.0, 16, "#e8e8e8");
        self.text(&format!("COINS {}", hud.coins), width - 220.0, 46.0, 16, coin_color);
        self.text(&hud.level_name, 12.0, 46.0, 14, "#a0a0a0");

        if let Some(fraction) = hud.boss_health {
            let bar_w = width * 0.5;
            let x = (width - bar_w) * 0.5;
            self.rect("#400000", x, 60.0, bar_w, 10.0);
            self.rect("#d02020", x, 60.0, bar_w * fraction.clamp(0.0, 1.0) as f64, 10.0);
        }
        if let Some(banner) = &hud.banner {
            self.text(banner, width * 0.5 - 160.0, 96.0, 18, "#ffd040");
        }
        if frame.playtest {
            self.text("PLAYTEST", 12.0, 68.0, 12, "#60c0ff");
        }
        if let Some(fps) = hud.fps {
            self.text(&format!("{:.0} FPS", fps), width - 80.0, 68.0, 12, "#80ff80");
        }
    }

    /// Two layers of hell-rock silhouettes scrolling slower than the world
    fn draw_backdrop(&self, frame: &RenderFrame, width: f64, height: f64) {
        for (depth, color, base) in [(0.2, "#2a0c0a", 0.55), (0.45, "#3a120c", 0.7)] {
            let shift = (frame.camera.x as f64 * depth).rem_euclid(BACKDROP_SPAN);
            let mut x = -shift;
            while x < width {
                let peak = height * base;
                self.rect(color, x, peak, BACKDROP_SPAN * 0.6, height - peak);
                self.rect(color, x + BACKDROP_SPAN * 0.6, peak + 40.0, BACKDROP_SPAN * 0.4, height - peak - 40.0);
                x += BACKDROP_SPAN;
            }
        }
    }

    fn draw_overlay(&self, frame: &RenderFrame, width: f64, height: f64) {
        let (title, hint) = match frame.phase {
            GamePhase::Menu => ("HELLRUN", "Press Enter to rip and tear"),
            GamePhase::Paused => ("PAUSED", "Esc to resume, M for menu"),
            GamePhase::GameOver => ("GAME OVER", "Enter to try again"),
            GamePhase::Victory => ("VICTORY", "Enter to play again"),
            GamePhase::Playing => return,
        };
        self.ctx.set_global_alpha(0.6);
        self.rect("#000000", 0.0, 0.0, width, height);
        self.ctx.set_global_alpha(1.0);
        self.text(title, width * 0.5 - 120.0, height * 0.45, 48, "#c02020");
        self.text(hint, width * 0.5 - 150.0, height * 0.45 + 40.0, 16, "#e8e8e8");
    }
}

impl Renderer for CanvasRenderer {
    fn resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn render(&mut self, frame: &RenderFrame) {
        let width = self.canvas.width() as f64;
        let height = self.canvas.height() as f64;
        self.scale = (width / frame.viewport.x as f64).min(height / frame.viewport.y as f64).max(0.01);
        let view_w = frame.viewport.x as f64;
        let view_h = frame.viewport.y as f64;

        self.ctx.set_global_alpha(1.0);
        self.rect(if frame.high_contrast { "#000000" } else { "#1a0808" }, 0.0, 0.0, width, height);
        if frame.backdrop {
            let _ = self.ctx.save();
            let _ = self.ctx.scale(self.scale, self.scale);
            self.draw_backdrop(frame, view_w, view_h);
            let _ = self.ctx.restore();
        }

        let _ = self.ctx.save();
        let _ = self.ctx.scale(self.scale, self.scale);
        let _ = self.ctx.translate(-frame.camera.x as f64, -frame.camera.y as f64);

        let tile = TILE_SIZE as f64;
        for t in &frame.tiles {
            let pos = t.pos();
            let (x, y) = (pos.x as f64, pos.y as f64);
            match t.tile {
                Tile::Platform => self.rect(tile_color(t.tile), x, y, tile, tile * 0.25),
                Tile::Spikes => self.rect(tile_color(t.tile), x, y + tile * 0.5, tile, tile * 0.5),
                _ => self.rect(tile_color(t.tile), x, y, tile, tile),
            }
        }

        for sprite in &frame.sprites {
            self.ctx.set_global_alpha(sprite.visual.alpha.clamp(0.0, 1.0) as f64);
            let color = if sprite.visual.flash { "#ffffff" } else { sprite_color(sprite.kind) };
            self.rect(
                color,
                sprite.pos.x as f64,
                sprite.pos.y as f64,
                sprite.size.x as f64,
                sprite.size.y as f64,
            );
            // Facing marker on actors
            if matches!(sprite.kind, SpriteKind::Player | SpriteKind::Enemy(_)) {
                let eye_x = if sprite.visual.facing >= 0.0 {
                    sprite.pos.x + sprite.size.x - 6.0
                } else {
                    sprite.pos.x + 2.0
                };
                self.rect("#ffe0a0", eye_x as f64, sprite.pos.y as f64 + 8.0, 4.0, 4.0);
            }
        }
        self.ctx.set_global_alpha(1.0);
        let _ = self.ctx.restore();

        let _ = self.ctx.save();
        let _ = self.ctx.scale(self.scale, self.scale);
        if frame.phase != GamePhase::Menu {
            self.draw_hud(frame, view_w);
        }
        self.draw_overlay(frame, view_w, view_h);
        if frame.fade_alpha > 0.0 {
            self.ctx.set_global_alpha(frame.fade_alpha.clamp(0.0, 1.0) as f64);
            self.rect("#000000", 0.0, 0.0, view_w, view_h);
            self.ctx.set_global_alpha(1.0);
        }
        let _ = self.ctx.restore();
    }
}

fn tile_color(tile: Tile) -> &'static str {
    match tile {
        Tile::Empty => "#000000",
        Tile::Solid => "#5a4a3a",
        Tile::Platform => "#8a6a3a",
        Tile::Spikes => "#b0b0b0",
        Tile::Background => "#2a1a1a",
        Tile::Exit => "#20c040",
    }
}

fn sprite_color(kind: SpriteKind) -> &'static str {
    match kind {
        SpriteKind::Player => "#3a8a3a",
        SpriteKind::Enemy(EnemyKind::Patrol) => "#a06040",
        SpriteKind::Enemy(EnemyKind::Shooter) => "#8a3a3a",
        SpriteKind::Enemy(EnemyKind::Flying) => "#c04040",
        SpriteKind::Enemy(EnemyKind::Boss) => "#7a1010",
        SpriteKind::Projectile(_, Side::Enemy) => "#ff6020",
        SpriteKind::Projectile(ProjectileKind::Plasma, _) => "#40a0ff",
        SpriteKind::Projectile(ProjectileKind::Laser, _) => "#ff40ff",
        SpriteKind::Projectile(ProjectileKind::Rocket, _) => "#ffa020",
        SpriteKind::Projectile(_, Side::Player) => "#ffff80",
        SpriteKind::Pickup(PickupKind::Health) => "#20d020",
        SpriteKind::Pickup(PickupKind::Armor) => "#2080ff",
        SpriteKind::Pickup(PickupKind::Coin) => "#ffd020",
        SpriteKind::Pickup(_) => "#d0d0d0",
        SpriteKind::Checkpoint { activated: true } => "#40ff40",
        SpriteKind::Checkpoint { activated: false } => "#606060",
        SpriteKind::Particle(ParticleKind::Blood) => "#a00000",
        SpriteKind::Particle(ParticleKind::Spark) => "#ffe060",
        SpriteKind::Particle(ParticleKind::Explosion) => "#ff8020",
        SpriteKind::Particle(ParticleKind::Coin) => "#ffd020",
    }
}
