//! Drawing-surface abstraction.
//!
//! The compositor only ever draws through [`DrawSurface`]. The web front-end
//! implements it on top of a `CanvasRenderingContext2d`; [`crate::PixelCanvas`]
//! is a software raster with the same semantics for tests and headless runs.

use glam::Vec2;

/// Straight (non-premultiplied) color with 8-bit channels and float alpha.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Same color, different alpha.
    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Channel-wise interpolation; `t` is clamped to [0, 1].
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgba {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// CSS color string, as accepted by canvas fill/stroke styles.
    pub fn css(&self) -> String {
        format!("rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, self.a)
    }
}

/// Core/edge color pair of a radial ink gradient.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InkStops {
    pub core: Rgba,
    pub edge: Rgba,
}

impl InkStops {
    pub const fn new(core: Rgba, edge: Rgba) -> Self {
        Self { core, edge }
    }

    /// Transparent edge of the same hue as `core`.
    pub const fn fading(core: Rgba) -> Self {
        Self {
            core,
            edge: Rgba::new(core.r, core.g, core.b, 0.0),
        }
    }
}

/// Filled ellipse, optionally rotated (radians) about its center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ellipse {
    pub center: Vec2,
    pub rx: f32,
    pub ry: f32,
    pub rotation: f32,
}

impl Ellipse {
    pub fn circle(center: Vec2, r: f32) -> Self {
        Self {
            center,
            rx: r,
            ry: r,
            rotation: 0.0,
        }
    }
}

/// Radial gradient between two concentric circles.
///
/// Inside `r0` the color is `stops.core`, beyond `r1` it is `stops.edge`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadialGradient {
    pub center: Vec2,
    pub r0: f32,
    pub r1: f32,
    pub stops: InkStops,
}

impl RadialGradient {
    pub fn color_at(&self, p: Vec2) -> Rgba {
        let span = self.r1 - self.r0;
        let span = if span.abs() < f32::EPSILON { 1.0 } else { span };
        let t = (p.distance(self.center) - self.r0) / span;
        self.stops.core.lerp(self.stops.edge, t)
    }
}

/// Minimal 2D drawing context the core renders through.
///
/// `save`/`restore` scope the clip region, mirroring the canvas state stack.
pub trait DrawSurface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Reallocate to `width`×`height`; contents are unspecified until cleared.
    fn resize(&mut self, width: u32, height: u32);

    fn save(&mut self);
    fn restore(&mut self);
    fn clip_circle(&mut self, center: Vec2, radius: f32);

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Rgba);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);
    fn fill_radial(&mut self, shape: Ellipse, gradient: RadialGradient);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Rgba);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba);

    /// Copy the `size` region of `src` starting at `src_origin` to `dst`.
    fn blit(&mut self, src: &Self, src_origin: Vec2, size: Vec2, dst: Vec2);

    /// Row-major RGBA8 readback of the whole surface.
    fn read_rgba(&self) -> Vec<u8>;
}
