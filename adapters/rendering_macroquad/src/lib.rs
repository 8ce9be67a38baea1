#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Horde.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! The world is drawn through a [`Camera2D`] that follows the scene focus and
//! zooms with the mouse wheel. The HUD and overlays are drawn afterwards in
//! screen space.

mod sprites;

pub use sprites::SpriteKey;

use anyhow::Result;
use glam::Vec2;
use horde_core::MoveInput;
use horde_rendering::{
    palette, BulletShape, Color, FrameInput, Hud, Overlay, Presentation, RenderingBackend, Scene,
    SceneBody, ZoomLimits, BULLET_DOT_RADIUS, BULLET_SIZE, EXPERIENCE_BAR_HEIGHT,
    EXPERIENCE_SIZE, HEALTH_BAR_HEIGHT, HEALTH_BAR_WIDTH, ITEM_SIZE, ROCKET_SIZE,
};
use macroquad::{
    camera::{set_camera, set_default_camera, Camera2D},
    input::{is_key_down, is_key_pressed, mouse_wheel, KeyCode},
    math::Vec2 as MacroquadVec2,
    shapes::{draw_circle, draw_line, draw_poly, draw_rectangle},
    text::{draw_text, measure_text},
};
use std::{path::PathBuf, time::Duration};

use self::sprites::SpriteAtlas;

const HUD_MARGIN: f32 = 10.0;
const HUD_FONT_SIZE: f32 = 30.0;
const OVERLAY_TITLE_SIZE: u16 = 64;
const OVERLAY_HINT_SIZE: u16 = 28;
const ROCKET_LINE_THICKNESS: f32 = 2.0;

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    load_sprites: bool,
    manifest_path: PathBuf,
    zoom_limits: ZoomLimits,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            load_sprites: true,
            manifest_path: PathBuf::from("assets/manifest.toml"),
            zoom_limits: ZoomLimits::default(),
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame rate once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Configures whether the backend should attempt to load sprite assets.
    #[must_use]
    pub fn with_sprite_loading(mut self, enabled: bool) -> Self {
        self.load_sprites = enabled;
        self
    }

    /// Overrides the sprite manifest location.
    #[must_use]
    pub fn with_sprite_manifest(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = path.into();
        self
    }

    /// Overrides the range the mouse wheel may zoom within.
    #[must_use]
    pub fn with_zoom_limits(mut self, limits: ZoomLimits) -> Self {
        self.zoom_limits = limits;
        self
    }
}

/// Counts rendered frames and reports the rate once per second.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
}

impl FpsCounter {
    fn record_frame(&mut self, frame: Duration) -> Option<f32> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let per_second = self.frames as f32 / self.elapsed.as_secs_f32();
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(per_second)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            load_sprites,
            manifest_path,
            zoom_limits,
        } = self;

        let Presentation {
            window_title,
            window_size,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: window_size.x.round() as i32,
            window_height: window_size.y.round() as i32,
            window_resizable: true,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let sprite_atlas = if load_sprites {
                load_atlas(&manifest_path)
            } else {
                None
            };

            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();
            let mut zoom = 1.0_f32;
            let mut last_size: Option<Vec2> = None;

            loop {
                if is_key_pressed(KeyCode::Escape) {
                    break;
                }

                zoom = zoom_limits.apply(zoom, mouse_wheel().1);

                let size = Vec2::new(
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                let viewport = (last_size != Some(size)).then_some(size);
                last_size = Some(size);

                let frame_dt =
                    Duration::from_secs_f32(macroquad::time::get_frame_time().max(0.0));
                let input = FrameInput {
                    movement: poll_movement(),
                    pause_pressed: is_key_pressed(KeyCode::P) || is_key_pressed(KeyCode::Space),
                    viewport,
                };
                update_scene(frame_dt, input, &mut scene);

                macroquad::window::clear_background(background);

                set_camera(&world_camera(scene.focus, size, zoom));
                draw_world(&scene, sprite_atlas.as_ref());
                set_default_camera();

                draw_hud(&scene.hud, size);
                if let Some(overlay) = scene.overlay {
                    draw_overlay(overlay, size);
                }

                if show_fps {
                    if let Some(per_second) = fps_counter.record_frame(frame_dt) {
                        tracing::info!(fps = per_second, "frame rate");
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn load_atlas(manifest_path: &std::path::Path) -> Option<SpriteAtlas> {
    match SpriteAtlas::from_manifest_path(manifest_path) {
        Ok(atlas) => {
            tracing::info!(
                sprites = atlas.len(),
                manifest = %manifest_path.display(),
                "loaded sprite atlas"
            );
            Some(atlas)
        }
        Err(error) => {
            tracing::warn!(
                error = %format!("{error:#}"),
                "sprites unavailable, drawing primitives"
            );
            None
        }
    }
}

fn poll_movement() -> MoveInput {
    MoveInput {
        left: is_key_down(KeyCode::Left) || is_key_down(KeyCode::A),
        right: is_key_down(KeyCode::Right) || is_key_down(KeyCode::D),
        up: is_key_down(KeyCode::Up) || is_key_down(KeyCode::W),
        down: is_key_down(KeyCode::Down) || is_key_down(KeyCode::S),
    }
}

/// Camera scale mapping world units to clip space with y pointing down.
fn camera_zoom(screen: Vec2, zoom: f32) -> MacroquadVec2 {
    let width = screen.x.max(1.0);
    let height = screen.y.max(1.0);
    MacroquadVec2::new(2.0 * zoom / width, -2.0 * zoom / height)
}

fn world_camera(focus: Vec2, screen: Vec2, zoom: f32) -> Camera2D {
    Camera2D {
        target: MacroquadVec2::new(focus.x, focus.y),
        zoom: camera_zoom(screen, zoom),
        ..Camera2D::default()
    }
}

fn draw_world(scene: &Scene, atlas: Option<&SpriteAtlas>) {
    for rect in &scene.decor {
        draw_rectangle(
            rect.position.x,
            rect.position.y,
            rect.size.x,
            rect.size.y,
            to_macroquad_color(rect.color),
        );
    }

    for drop in &scene.experience {
        let color = if drop.merged {
            palette::MERGED_EXPERIENCE
        } else {
            palette::EXPERIENCE
        };
        draw_poly(
            drop.position.x,
            drop.position.y,
            6,
            EXPERIENCE_SIZE,
            0.0,
            to_macroquad_color(color),
        );
    }

    for item in &scene.items {
        draw_rectangle(
            item.position.x - ITEM_SIZE,
            item.position.y - ITEM_SIZE,
            ITEM_SIZE * 2.0,
            ITEM_SIZE * 2.0,
            to_macroquad_color(palette::ITEM),
        );
    }

    for enemy in &scene.enemies {
        draw_body(enemy, SpriteKey::Enemy, palette::ENEMY, atlas);
    }

    let bullet_color = to_macroquad_color(palette::BULLET);
    for bullet in &scene.bullets {
        let (x, y) = (bullet.position.x, bullet.position.y);
        match bullet.shape {
            BulletShape::Dot => draw_circle(x, y, BULLET_DOT_RADIUS, bullet_color),
            BulletShape::Triangle => {
                draw_poly(x, y, 3, BULLET_SIZE, bullet.rotation_degrees, bullet_color)
            }
            BulletShape::Square => {
                draw_poly(x, y, 4, BULLET_SIZE, bullet.rotation_degrees, bullet_color)
            }
        }
    }

    if let Some(explosion) = scene.explosion {
        draw_circle(
            explosion.position.x,
            explosion.position.y,
            explosion.radius,
            to_macroquad_color(palette::EXPLOSION.with_alpha(explosion.opacity)),
        );
    }

    draw_body(&scene.player, SpriteKey::Player, palette::PLAYER, atlas);
    draw_health_bar(&scene.player);

    if let Some(rocket) = scene.rocket {
        let color = to_macroquad_color(palette::ROCKET);
        draw_poly(
            rocket.position.x,
            rocket.position.y,
            3,
            ROCKET_SIZE,
            rocket.rotation_degrees,
            color,
        );
        if let Some(target) = rocket.target {
            draw_line(
                rocket.position.x,
                rocket.position.y,
                target.x,
                target.y,
                ROCKET_LINE_THICKNESS,
                color,
            );
        }
    }

    if let Some(boss) = &scene.boss {
        draw_body(boss, SpriteKey::Boss, palette::BOSS, atlas);
        draw_health_bar(boss);
    }
}

fn draw_body(body: &SceneBody, key: SpriteKey, fallback: Color, atlas: Option<&SpriteAtlas>) {
    let drawn = atlas
        .map(|atlas| atlas.draw_centered(key, body.position, body.radius))
        .unwrap_or(false);
    if !drawn {
        draw_circle(
            body.position.x,
            body.position.y,
            body.radius,
            to_macroquad_color(fallback),
        );
    }
}

fn draw_health_bar(body: &SceneBody) {
    let origin = body.health_bar_origin();
    let (filled, missing) = split_bar(HEALTH_BAR_WIDTH, body.health);
    draw_rectangle(
        origin.x,
        origin.y,
        filled,
        HEALTH_BAR_HEIGHT,
        to_macroquad_color(palette::HEALTH),
    );
    draw_rectangle(
        origin.x + filled,
        origin.y,
        missing,
        HEALTH_BAR_HEIGHT,
        to_macroquad_color(palette::HEALTH_MISSING),
    );
}

/// Splits a bar of `width` into filled and empty parts.
fn split_bar(width: f32, fraction: f32) -> (f32, f32) {
    let filled = (width * fraction.clamp(0.0, 1.0)).floor();
    (filled, width - filled)
}

/// Baseline of the HUD line at `index`, below the experience bar.
fn hud_baseline(index: usize) -> f32 {
    EXPERIENCE_BAR_HEIGHT + HUD_MARGIN + HUD_FONT_SIZE * (index as f32 + 1.0)
}

fn draw_hud(hud: &Hud, screen: Vec2) {
    let (filled, missing) = split_bar(screen.x, hud.experience_progress);
    draw_rectangle(
        0.0,
        0.0,
        filled,
        EXPERIENCE_BAR_HEIGHT,
        to_macroquad_color(palette::EXPERIENCE_BAR),
    );
    draw_rectangle(
        filled,
        0.0,
        missing,
        EXPERIENCE_BAR_HEIGHT,
        to_macroquad_color(palette::EXPERIENCE_BAR_EMPTY),
    );

    let text = to_macroquad_color(palette::TEXT);
    for (index, line) in hud.lines().iter().enumerate() {
        let _ = draw_text(line, HUD_MARGIN, hud_baseline(index), HUD_FONT_SIZE, text);
    }
}

fn draw_overlay(overlay: Overlay, screen: Vec2) {
    draw_rectangle(
        0.0,
        0.0,
        screen.x,
        screen.y,
        to_macroquad_color(palette::SHADE),
    );

    let text = to_macroquad_color(palette::TEXT);
    let center = screen / 2.0;
    let title = measure_text(overlay.title(), None, OVERLAY_TITLE_SIZE, 1.0);
    let _ = draw_text(
        overlay.title(),
        center.x - title.width / 2.0,
        center.y,
        f32::from(OVERLAY_TITLE_SIZE),
        text,
    );
    let hint = measure_text(overlay.hint(), None, OVERLAY_HINT_SIZE, 1.0);
    let _ = draw_text(
        overlay.hint(),
        center.x - hint.width / 2.0,
        center.y + f32::from(OVERLAY_TITLE_SIZE),
        f32::from(OVERLAY_HINT_SIZE),
        text,
    );
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_zoom_maps_window_to_clip_space() {
        let zoom = camera_zoom(Vec2::new(1000.0, 500.0), 1.0);
        assert!((zoom.x - 0.002).abs() < 1e-7);
        assert!((zoom.y + 0.004).abs() < 1e-7);

        let doubled = camera_zoom(Vec2::new(1000.0, 500.0), 2.0);
        assert!((doubled.x - 0.004).abs() < 1e-7);
    }

    #[test]
    fn camera_zoom_survives_collapsed_window() {
        let zoom = camera_zoom(Vec2::ZERO, 1.0);
        assert!(zoom.x.is_finite() && zoom.y.is_finite());
    }

    #[test]
    fn world_camera_targets_focus() {
        let camera = world_camera(Vec2::new(12.0, -7.0), Vec2::splat(800.0), 1.0);
        assert_eq!(camera.target, MacroquadVec2::new(12.0, -7.0));
    }

    #[test]
    fn split_bar_covers_the_full_width() {
        assert_eq!(split_bar(64.0, 0.5), (32.0, 32.0));
        assert_eq!(split_bar(64.0, 1.5), (64.0, 0.0));
        assert_eq!(split_bar(64.0, -1.0), (0.0, 64.0));
        let (filled, missing) = split_bar(1000.0, 0.3333);
        assert_eq!(filled + missing, 1000.0);
    }

    #[test]
    fn hud_lines_stack_below_the_experience_bar() {
        assert!(hud_baseline(0) > EXPERIENCE_BAR_HEIGHT);
        assert_eq!(hud_baseline(1) - hud_baseline(0), HUD_FONT_SIZE);
    }

    #[test]
    fn fps_counter_reports_once_per_second() {
        let mut counter = FpsCounter::default();
        let frame = Duration::from_millis(250);
        assert_eq!(counter.record_frame(frame), None);
        assert_eq!(counter.record_frame(frame), None);
        assert_eq!(counter.record_frame(frame), None);
        let fps = counter.record_frame(frame).expect("one second elapsed");
        assert!((fps - 4.0).abs() < 1e-4);
        assert_eq!(counter.record_frame(frame), None);
    }

    #[test]
    fn colors_convert_channel_for_channel() {
        let converted = to_macroquad_color(Color::new(0.1, 0.2, 0.3, 0.4));
        assert_eq!(converted.r, 0.1);
        assert_eq!(converted.g, 0.2);
        assert_eq!(converted.b, 0.3);
        assert_eq!(converted.a, 0.4);
    }

    #[test]
    fn backend_builder_overrides_defaults() {
        let limits = ZoomLimits::new(0.5, 1.5).expect("valid limits");
        let backend = MacroquadBackend::new()
            .with_vsync(true)
            .with_show_fps(true)
            .with_sprite_loading(false)
            .with_sprite_manifest("custom/manifest.toml")
            .with_zoom_limits(limits);
        assert_eq!(backend.swap_interval, Some(1));
        assert!(backend.show_fps);
        assert!(!backend.load_sprites);
        assert_eq!(backend.manifest_path, PathBuf::from("custom/manifest.toml"));
        assert_eq!(backend.zoom_limits, limits);
    }
}
