//! Software RGBA raster implementing [`DrawSurface`].
//!
//! Pixels are sampled at their centers and composited source-over in straight
//! alpha, which is close enough to a browser canvas for the ink model and
//! fully deterministic.

use crate::surface::{DrawSurface, Ellipse, RadialGradient, Rgba};
use glam::Vec2;

/// RGBA pixel surface that mirrors a HTML canvas.
#[derive(Clone, Debug)]
pub struct PixelCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    clips: Vec<(Vec2, f32)>,
    /// Clip depth at each `save`.
    stack: Vec<usize>,
}

impl PixelCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
            clips: Vec::new(),
            stack: Vec::new(),
        }
    }

    /// Raw RGBA bytes.
    pub fn as_rgba(&self) -> &[u8] {
        &self.pixels
    }

    /// Color at integer pixel coordinates, `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    fn clipped(&self, p: Vec2) -> bool {
        self.clips
            .iter()
            .any(|(c, r)| p.distance_squared(*c) > r * r)
    }

    // Inclusive-exclusive pixel range covering [min, max] in both axes.
    fn span(&self, min: Vec2, max: Vec2) -> Option<(u32, u32, u32, u32)> {
        let x0 = min.x.floor().max(0.0) as i64;
        let y0 = min.y.floor().max(0.0) as i64;
        let x1 = (max.x.ceil() as i64).min(self.width as i64);
        let y1 = (max.y.ceil() as i64).min(self.height as i64);
        (x0 < x1 && y0 < y1).then_some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }

    fn blend(&mut self, x: u32, y: u32, color: Rgba) {
        let src_a = color.a.clamp(0.0, 1.0);
        if src_a <= 0.0 {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let dst_a = self.pixels[i + 3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return;
        }
        let src = [color.r, color.g, color.b];
        for (c, s) in src.iter().enumerate() {
            let d = self.pixels[i + c] as f32;
            let v = (*s as f32 * src_a + d * dst_a * (1.0 - src_a)) / out_a;
            self.pixels[i + c] = v.round().clamp(0.0, 255.0) as u8;
        }
        self.pixels[i + 3] = (out_a * 255.0).round() as u8;
    }

    fn paint<F>(&mut self, min: Vec2, max: Vec2, mut shade: F)
    where
        F: FnMut(Vec2) -> Option<Rgba>,
    {
        let Some((x0, y0, x1, y1)) = self.span(min, max) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                if self.clipped(p) {
                    continue;
                }
                if let Some(color) = shade(p) {
                    self.blend(x, y, color);
                }
            }
        }
    }
}

impl DrawSurface for PixelCanvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn resize(&mut self, width: u32, height: u32) {
        *self = PixelCanvas::new(width, height);
    }

    fn save(&mut self) {
        self.stack.push(self.clips.len());
    }

    fn restore(&mut self) {
        if let Some(depth) = self.stack.pop() {
            self.clips.truncate(depth);
        }
    }

    fn clip_circle(&mut self, center: Vec2, radius: f32) {
        self.clips.push((center, radius.max(0.0)));
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Rgba) {
        self.paint(origin, origin + size, |_| Some(color));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        if radius <= 0.0 {
            return;
        }
        let r2 = radius * radius;
        let extent = Vec2::splat(radius);
        self.paint(center - extent, center + extent, |p| {
            (p.distance_squared(center) <= r2).then_some(color)
        });
    }

    fn fill_radial(&mut self, shape: Ellipse, gradient: RadialGradient) {
        if shape.rx <= 0.0 || shape.ry <= 0.0 {
            return;
        }
        let (sin, cos) = shape.rotation.sin_cos();
        let extent = Vec2::splat(shape.rx.max(shape.ry));
        self.paint(shape.center - extent, shape.center + extent, |p| {
            let d = p - shape.center;
            let u = (d.x * cos + d.y * sin) / shape.rx;
            let v = (-d.x * sin + d.y * cos) / shape.ry;
            (u * u + v * v <= 1.0).then(|| gradient.color_at(p))
        });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Rgba) {
        let half = width.max(0.0) * 0.5;
        let extent = Vec2::splat(radius + half);
        self.paint(center - extent, center + extent, |p| {
            ((p.distance(center) - radius).abs() <= half).then_some(color)
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
        let half = width.max(0.0) * 0.5;
        let seg = to - from;
        let len_sq = seg.length_squared();
        let len_sq = if len_sq == 0.0 { 1.0 } else { len_sq };
        let pad = Vec2::splat(half);
        self.paint(from.min(to) - pad, from.max(to) + pad, |p| {
            let t = ((p - from).dot(seg) / len_sq).clamp(0.0, 1.0);
            (p.distance(from + seg * t) <= half).then_some(color)
        });
    }

    fn blit(&mut self, src: &Self, src_origin: Vec2, size: Vec2, dst: Vec2) {
        let offset_x = src_origin.x.round() as i64 - dst.x.round() as i64;
        let offset_y = src_origin.y.round() as i64 - dst.y.round() as i64;
        let Some((x0, y0, x1, y1)) = self.span(dst, dst + size) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let sx = x as i64 + offset_x;
                let sy = y as i64 + offset_y;
                if sx < 0 || sy < 0 {
                    continue;
                }
                let Some([r, g, b, a]) = src.pixel(sx as u32, sy as u32) else {
                    continue;
                };
                if self.clipped(Vec2::new(x as f32 + 0.5, y as f32 + 0.5)) {
                    continue;
                }
                self.blend(x, y, Rgba::new(r, g, b, a as f32 / 255.0));
            }
        }
    }

    fn read_rgba(&self) -> Vec<u8> {
        self.pixels.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INK: Rgba = Rgba::opaque(10, 20, 30);

    #[test]
    fn fill_rect_covers_and_clamps_to_bounds() {
        let mut c = PixelCanvas::new(4, 4);
        c.fill_rect(Vec2::new(-2.0, -2.0), Vec2::new(4.0, 4.0), INK);
        assert_eq!(c.pixel(0, 0), Some([10, 20, 30, 255]));
        assert_eq!(c.pixel(1, 1), Some([10, 20, 30, 255]));
        assert_eq!(c.pixel(2, 2), Some([0, 0, 0, 0]));
    }

    #[test]
    fn clip_is_scoped_by_save_restore() {
        let mut c = PixelCanvas::new(8, 8);
        c.save();
        c.clip_circle(Vec2::new(1.0, 1.0), 1.0);
        c.fill_rect(Vec2::ZERO, Vec2::splat(8.0), INK);
        c.restore();
        assert_eq!(c.pixel(0, 0).map(|p| p[3]), Some(255));
        assert_eq!(c.pixel(6, 6).map(|p| p[3]), Some(0));

        c.fill_rect(Vec2::ZERO, Vec2::splat(8.0), INK);
        assert_eq!(c.pixel(6, 6).map(|p| p[3]), Some(255));
    }

    #[test]
    fn nested_restore_drops_only_the_inner_clip() {
        let mut c = PixelCanvas::new(8, 8);
        c.save();
        c.clip_circle(Vec2::new(4.0, 4.0), 4.0);
        c.save();
        c.clip_circle(Vec2::new(1.0, 1.0), 1.0);
        c.restore();
        c.fill_rect(Vec2::ZERO, Vec2::splat(8.0), INK);
        c.restore();
        assert_eq!(c.pixel(4, 4).map(|p| p[3]), Some(255));
        assert_eq!(c.pixel(0, 0).map(|p| p[3]), Some(0));
        assert!(c.stack.is_empty());
    }

    #[test]
    fn translucent_fill_composites_over_background() {
        let mut c = PixelCanvas::new(1, 1);
        c.fill_rect(Vec2::ZERO, Vec2::ONE, Rgba::opaque(200, 200, 200));
        c.fill_rect(Vec2::ZERO, Vec2::ONE, Rgba::new(0, 0, 0, 0.5));
        assert_eq!(c.pixel(0, 0), Some([100, 100, 100, 255]));
    }

    #[test]
    fn blit_copies_offset_region() {
        let mut src = PixelCanvas::new(4, 4);
        src.fill_rect(Vec2::new(2.0, 2.0), Vec2::ONE, INK);
        let mut dst = PixelCanvas::new(2, 2);
        dst.blit(&src, Vec2::new(1.0, 1.0), Vec2::splat(2.0), Vec2::ZERO);
        assert_eq!(dst.pixel(1, 1), Some([10, 20, 30, 255]));
        assert_eq!(dst.pixel(0, 0), Some([0, 0, 0, 0]));
    }
}
