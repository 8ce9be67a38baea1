#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Horde adapters.
//!
//! Backends never see the simulation directly. Each frame the host converts a
//! [`WorldSnapshot`] into a [`Scene`] expressed in world units, and the
//! backend draws it through a camera centred on the player.

use anyhow::Result as AnyResult;
use glam::Vec2;
use horde_core::{
    leveling, BulletKind, ExperienceKind, ItemKind, SessionState, WorldSnapshot, BOSS_RADIUS,
    ENEMY_RADIUS, EXPERIENCE_RADIUS, EXPLOSION_FRAMES, ITEM_RADIUS, PLAYER_RADIUS,
};
use std::time::Duration;
use thiserror::Error;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }

    /// Returns the same color with its alpha replaced.
    #[must_use]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            ..self
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Colors used by every backend.
pub mod palette {
    use super::Color;

    /// Ground drawn behind the decor.
    pub const BACKGROUND: Color = Color::from_rgb_u8(0, 158, 47);
    /// The player disc.
    pub const PLAYER: Color = Color::from_rgb_u8(0, 121, 241);
    /// Enemy discs.
    pub const ENEMY: Color = Color::from_rgb_u8(230, 41, 55);
    /// Every bullet shape.
    pub const BULLET: Color = Color::from_rgb_u8(255, 255, 255);
    /// The rocket and its target line.
    pub const ROCKET: Color = Color::from_rgb_u8(255, 161, 0);
    /// Single experience drops.
    pub const EXPERIENCE: Color = Color::from_rgb_u8(102, 191, 255);
    /// The overflow accumulator.
    pub const MERGED_EXPERIENCE: Color = Color::from_rgb_u8(255, 109, 194);
    /// Magnet items.
    pub const ITEM: Color = Color::from_rgb_u8(253, 249, 0);
    /// The boss disc.
    pub const BOSS: Color = Color::from_rgb_u8(112, 31, 126);
    /// The detonation marker.
    pub const EXPLOSION: Color = Color::from_rgb_u8(255, 255, 255);
    /// Remaining health.
    pub const HEALTH: Color = Color::from_rgb_u8(0, 228, 48);
    /// Missing health.
    pub const HEALTH_MISSING: Color = Color::from_rgb_u8(230, 41, 55);
    /// Filled part of the experience bar.
    pub const EXPERIENCE_BAR: Color = Color::from_rgb_u8(102, 191, 255);
    /// Empty part of the experience bar.
    pub const EXPERIENCE_BAR_EMPTY: Color = Color::from_rgb_u8(0, 121, 241);
    /// HUD and overlay text.
    pub const TEXT: Color = Color::from_rgb_u8(255, 255, 255);
    /// Dimming layer behind overlays.
    pub const SHADE: Color = Color::new(0.0, 0.0, 0.0, 0.5);
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Directions held this frame.
    pub movement: horde_core::MoveInput,
    /// Whether the pause/restart key went down this frame.
    pub pause_pressed: bool,
    /// Window size in pixels when it changed this frame.
    pub viewport: Option<Vec2>,
}

/// Width of the health bar drawn above the player and the boss.
pub const HEALTH_BAR_WIDTH: f32 = 64.0;
/// Height of the health bars.
pub const HEALTH_BAR_HEIGHT: f32 = 5.0;
/// Gap between the top of a disc and its health bar.
pub const HEALTH_BAR_GAP: f32 = 8.0;
/// Height of the experience bar along the top of the window.
pub const EXPERIENCE_BAR_HEIGHT: f32 = 10.0;
/// Circumradius of bullet polygons.
pub const BULLET_SIZE: f32 = 8.0;
/// Radius of dot-shaped bullets.
pub const BULLET_DOT_RADIUS: f32 = 4.0;
/// Circumradius of the rocket triangle.
pub const ROCKET_SIZE: f32 = 16.0;
/// Circumradius of experience hexagons.
pub const EXPERIENCE_SIZE: f32 = EXPERIENCE_RADIUS;
/// Half side of item squares.
pub const ITEM_SIZE: f32 = ITEM_RADIUS;

/// Outline used for a bullet, chosen by its kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BulletShape {
    /// Small filled circle.
    Dot,
    /// Triangle pointing along the velocity.
    Triangle,
    /// Square rotated with the velocity.
    Square,
}

impl BulletShape {
    /// Shape used to draw bullets of `kind`.
    #[must_use]
    pub const fn for_kind(kind: BulletKind) -> Self {
        match kind {
            BulletKind::HomingAccelerate => Self::Dot,
            BulletKind::HomingAverage => Self::Triangle,
            BulletKind::Straight | BulletKind::Orbit => Self::Square,
        }
    }
}

/// Rotation in degrees applied to polygons travelling with `velocity`.
#[must_use]
pub fn heading_degrees(velocity: Vec2) -> f32 {
    velocity.x.atan2(velocity.y).to_degrees()
}

/// Flat rectangle drawn beneath every entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecorRect {
    /// Top-left corner in world units.
    pub position: Vec2,
    /// Extent in world units.
    pub size: Vec2,
    /// Fill color.
    pub color: Color,
}

impl DecorRect {
    /// Square of side `size` centred on `center`.
    #[must_use]
    pub fn centered(center: Vec2, size: f32, color: Color) -> Self {
        Self {
            position: center - Vec2::splat(size / 2.0),
            size: Vec2::splat(size),
            color,
        }
    }
}

/// A disc with an optional health bar above it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneBody {
    /// Centre in world units.
    pub position: Vec2,
    /// Radius in world units.
    pub radius: f32,
    /// Remaining health as a fraction of the maximum.
    pub health: f32,
}

impl SceneBody {
    fn new(position: Vec2, radius: f32, hp: i32, max_hp: i32) -> Self {
        Self {
            position,
            radius,
            health: health_fraction(hp, max_hp),
        }
    }

    /// Top-left corner of the health bar.
    #[must_use]
    pub fn health_bar_origin(&self) -> Vec2 {
        Vec2::new(
            self.position.x - HEALTH_BAR_WIDTH / 2.0,
            self.position.y - self.radius - HEALTH_BAR_GAP,
        )
    }

    /// Width of the filled part of the health bar.
    #[must_use]
    pub fn health_bar_fill(&self) -> f32 {
        HEALTH_BAR_WIDTH * self.health
    }
}

/// A bullet ready to be drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneBullet {
    /// Centre in world units.
    pub position: Vec2,
    /// Outline for the bullet kind.
    pub shape: BulletShape,
    /// Polygon rotation in degrees.
    pub rotation_degrees: f32,
}

/// An experience pickup ready to be drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneExperience {
    /// Centre in world units.
    pub position: Vec2,
    /// Whether this is the overflow accumulator.
    pub merged: bool,
}

/// An item ready to be drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneItem {
    /// Centre in world units.
    pub position: Vec2,
    /// Item kind.
    pub kind: ItemKind,
}

/// The rocket ready to be drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneRocket {
    /// Centre in world units.
    pub position: Vec2,
    /// Triangle rotation in degrees.
    pub rotation_degrees: f32,
    /// Far end of the targeting line.
    pub target: Option<Vec2>,
}

/// The detonation marker ready to be drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneExplosion {
    /// Centre in world units.
    pub position: Vec2,
    /// Blast radius in world units.
    pub radius: f32,
    /// Opacity, fading as the marker expires.
    pub opacity: f32,
}

/// Text and progress shown in screen space.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Hud {
    /// Running time as `mm:ss`.
    pub elapsed: String,
    /// Player level.
    pub level: u32,
    /// Cumulative experience.
    pub experience: u64,
    /// Progress from the current level threshold to the next, in 0.0..=1.0.
    pub experience_progress: f32,
}

impl Hud {
    /// Lines printed in the top-left corner.
    #[must_use]
    pub fn lines(&self) -> [String; 3] {
        [
            self.elapsed.clone(),
            format!("Level: {}", self.level),
            format!("XP: {}", self.experience),
        ]
    }
}

/// Full-screen message shown when the session is not running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overlay {
    /// Waiting for the pause key.
    Paused,
    /// The player was defeated.
    GameOver,
}

impl Overlay {
    /// Headline text.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Paused => "Paused",
            Self::GameOver => "Game Over",
        }
    }

    /// Hint printed under the headline.
    #[must_use]
    pub const fn hint(self) -> &'static str {
        match self {
            Self::Paused => "Press P to resume",
            Self::GameOver => "Press P to restart",
        }
    }
}

/// Everything a backend draws in one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Static ground decoration.
    pub decor: Vec<DecorRect>,
    /// Point the camera follows.
    pub focus: Vec2,
    /// The player.
    pub player: SceneBody,
    /// Live enemies.
    pub enemies: Vec<SceneBody>,
    /// Live bullets.
    pub bullets: Vec<SceneBullet>,
    /// Live experience pickups.
    pub experience: Vec<SceneExperience>,
    /// Live items.
    pub items: Vec<SceneItem>,
    /// The rocket, if in flight.
    pub rocket: Option<SceneRocket>,
    /// The boss, if present.
    pub boss: Option<SceneBody>,
    /// The latest detonation, while visible.
    pub explosion: Option<SceneExplosion>,
    /// Screen-space text and bars.
    pub hud: Hud,
    /// Message drawn over the world when not running.
    pub overlay: Option<Overlay>,
}

impl Scene {
    /// Creates an empty scene over the provided decoration.
    #[must_use]
    pub fn new(decor: Vec<DecorRect>) -> Self {
        Self {
            decor,
            focus: Vec2::ZERO,
            player: SceneBody {
                position: Vec2::ZERO,
                radius: PLAYER_RADIUS,
                health: 1.0,
            },
            enemies: Vec::new(),
            bullets: Vec::new(),
            experience: Vec::new(),
            items: Vec::new(),
            rocket: None,
            boss: None,
            explosion: None,
            hud: Hud::default(),
            overlay: Some(Overlay::Paused),
        }
    }

    /// Replaces the dynamic content with the state captured in `snapshot`.
    ///
    /// `tick_rate` converts the frame counter into the elapsed time shown on
    /// the HUD. Decoration is left untouched.
    pub fn update(&mut self, snapshot: &WorldSnapshot, tick_rate: u32) {
        let player = &snapshot.player;
        self.focus = player.position;
        self.player = SceneBody::new(player.position, PLAYER_RADIUS, player.hp, player.max_hp);

        self.enemies.clear();
        self.enemies.extend(
            snapshot
                .enemies
                .iter()
                .map(|enemy| SceneBody::new(enemy.position, ENEMY_RADIUS, enemy.hp, enemy.init_hp)),
        );

        self.bullets.clear();
        self.bullets
            .extend(snapshot.bullets.iter().map(|bullet| SceneBullet {
                position: bullet.position,
                shape: BulletShape::for_kind(bullet.kind),
                rotation_degrees: heading_degrees(bullet.velocity),
            }));

        self.experience.clear();
        self.experience
            .extend(snapshot.experience.iter().map(|drop| SceneExperience {
                position: drop.position,
                merged: drop.kind == ExperienceKind::Merged,
            }));

        self.items.clear();
        self.items.extend(snapshot.items.iter().map(|item| SceneItem {
            position: item.position,
            kind: item.kind,
        }));

        self.rocket = snapshot.rocket.map(|rocket| SceneRocket {
            position: rocket.position,
            rotation_degrees: heading_degrees(rocket.velocity),
            target: rocket.target,
        });
        self.boss = snapshot
            .boss
            .map(|boss| SceneBody::new(boss.position, BOSS_RADIUS, boss.hp, boss.max_hp));
        self.explosion = snapshot.explosion.map(|explosion| SceneExplosion {
            position: explosion.position,
            radius: explosion.radius,
            opacity: explosion.frames_remaining.min(EXPLOSION_FRAMES) as f32
                / EXPLOSION_FRAMES as f32,
        });

        self.hud = Hud {
            elapsed: format_elapsed(snapshot.frame, tick_rate),
            level: player.level,
            experience: player.experience,
            experience_progress: experience_progress(player.experience, player.level),
        };
        self.overlay = match snapshot.session {
            SessionState::Paused => Some(Overlay::Paused),
            SessionState::Running => None,
            SessionState::GameOver => Some(Overlay::GameOver),
        };
    }
}

/// Formats `frame` running ticks as `mm:ss`.
#[must_use]
pub fn format_elapsed(frame: u64, tick_rate: u32) -> String {
    let seconds = frame / u64::from(tick_rate.max(1));
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Fraction of the way from the current level threshold to the next.
#[must_use]
pub fn experience_progress(experience: u64, level: u32) -> f32 {
    let floor = if level == 0 {
        0.0
    } else {
        leveling::threshold(level)
    };
    let ceiling = leveling::threshold(level.saturating_add(1));
    let span = ceiling - floor;
    if span <= f64::EPSILON {
        return 0.0;
    }
    ((experience as f64 - floor) / span).clamp(0.0, 1.0) as f32
}

fn health_fraction(hp: i32, max_hp: i32) -> f32 {
    if max_hp <= 0 {
        return 0.0;
    }
    (hp as f32 / max_hp as f32).clamp(0.0, 1.0)
}

/// Range the camera zoom is kept within.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomLimits {
    min: f32,
    max: f32,
}

impl ZoomLimits {
    /// Factor applied per mouse-wheel notch.
    pub const STEP: f32 = 1.1;

    /// Creates limits, rejecting empty or non-positive ranges.
    pub fn new(min: f32, max: f32) -> Result<Self, RenderingError> {
        if !(min.is_finite() && max.is_finite()) || min <= 0.0 || min > max {
            return Err(RenderingError::InvalidZoomLimits { min, max });
        }
        Ok(Self { min, max })
    }

    /// Smallest zoom factor.
    #[must_use]
    pub const fn min(&self) -> f32 {
        self.min
    }

    /// Largest zoom factor.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Zoom after scrolling `wheel` notches from `zoom`.
    #[must_use]
    pub fn apply(&self, zoom: f32, wheel: f32) -> f32 {
        if wheel == 0.0 || !wheel.is_finite() {
            return zoom.clamp(self.min, self.max);
        }
        (zoom * Self::STEP.powf(wheel.signum())).clamp(self.min, self.max)
    }
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self { min: 0.1, max: 4.0 }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Initial window size in pixels.
    pub window_size: Vec2,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, window_size: Vec2, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            window_size,
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Horde scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the wall-clock frame
    /// delta and the input captured by the adapter, and refreshes the scene
    /// before it is drawn.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, Error, PartialEq)]
pub enum RenderingError {
    /// Zoom limits must form a positive, non-empty range.
    #[error("zoom limits must satisfy 0 < min <= max (received {min}..{max})")]
    InvalidZoomLimits {
        /// Requested lower bound.
        min: f32,
        /// Requested upper bound.
        max: f32,
    },
}
