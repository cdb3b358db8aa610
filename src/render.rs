use glam::Vec2;
use sgraffito_core::{DrawSurface, Ellipse, RadialGradient, Rgba};
use std::f64::consts::TAU;
use wasm_bindgen::JsCast;
use web_sys as web;

/// `DrawSurface` over a 2D canvas context.
///
/// Coordinates are CSS pixels; `scale` (the device pixel ratio for the
/// on-screen canvas, 1 for the ink buffer) is reapplied after every resize.
pub struct Canvas2d {
    canvas: web::HtmlCanvasElement,
    ctx: web::CanvasRenderingContext2d,
    scale: f64,
}

impl Canvas2d {
    pub fn new(canvas: web::HtmlCanvasElement, scale: f64) -> anyhow::Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| anyhow::anyhow!("{:?}", e))?
            .ok_or_else(|| anyhow::anyhow!("2d context unavailable"))?
            .dyn_into::<web::CanvasRenderingContext2d>()
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        let surface = Self { canvas, ctx, scale };
        surface.apply_scale();
        Ok(surface)
    }

    /// Detached canvas for the persistent ink buffer.
    pub fn offscreen(document: &web::Document) -> anyhow::Result<Self> {
        let canvas = document
            .create_element("canvas")
            .map_err(|e| anyhow::anyhow!("{:?}", e))?
            .dyn_into::<web::HtmlCanvasElement>()
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        Self::new(canvas, 1.0)
    }

    pub fn canvas(&self) -> &web::HtmlCanvasElement {
        &self.canvas
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
        self.apply_scale();
    }

    fn apply_scale(&self) {
        _ = self
            .ctx
            .set_transform(self.scale, 0.0, 0.0, self.scale, 0.0, 0.0);
    }

    fn arc_path(&self, center: Vec2, radius: f32) {
        self.ctx.begin_path();
        _ = self.ctx.arc(
            center.x as f64,
            center.y as f64,
            radius.max(0.0) as f64,
            0.0,
            TAU,
        );
    }
}

impl DrawSurface for Canvas2d {
    fn width(&self) -> u32 {
        self.canvas.width()
    }

    fn height(&self) -> u32 {
        self.canvas.height()
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width.max(1));
        self.canvas.set_height(height.max(1));
        self.apply_scale();
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn clip_circle(&mut self, center: Vec2, radius: f32) {
        self.arc_path(center, radius);
        self.ctx.clip();
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Rgba) {
        self.ctx.set_fill_style_str(&color.css());
        self.ctx
            .fill_rect(origin.x as f64, origin.y as f64, size.x as f64, size.y as f64);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.ctx.set_fill_style_str(&color.css());
        self.arc_path(center, radius);
        self.ctx.fill();
    }

    fn fill_radial(&mut self, shape: Ellipse, gradient: RadialGradient) {
        let c = gradient.center;
        let grad = match self.ctx.create_radial_gradient(
            c.x as f64,
            c.y as f64,
            gradient.r0.max(0.0) as f64,
            c.x as f64,
            c.y as f64,
            gradient.r1.max(0.0) as f64,
        ) {
            Ok(g) => g,
            Err(e) => {
                log::warn!("[render] radial gradient: {:?}", e);
                return;
            }
        };
        _ = grad.add_color_stop(0.0, &gradient.stops.core.css());
        _ = grad.add_color_stop(1.0, &gradient.stops.edge.css());
        self.ctx.set_fill_style_canvas_gradient(&grad);
        self.ctx.begin_path();
        _ = self.ctx.ellipse(
            shape.center.x as f64,
            shape.center.y as f64,
            shape.rx.max(0.0) as f64,
            shape.ry.max(0.0) as f64,
            shape.rotation as f64,
            0.0,
            TAU,
        );
        self.ctx.fill();
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Rgba) {
        self.ctx.set_stroke_style_str(&color.css());
        self.ctx.set_line_width(width as f64);
        self.arc_path(center, radius);
        self.ctx.stroke();
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
        self.ctx.set_stroke_style_str(&color.css());
        self.ctx.set_line_width(width as f64);
        self.ctx.set_line_cap("round");
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.stroke();
    }

    fn blit(&mut self, src: &Self, src_origin: Vec2, size: Vec2, dst: Vec2) {
        let (w, h) = (size.x as f64, size.y as f64);
        if let Err(e) = self
            .ctx
            .draw_image_with_html_canvas_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                &src.canvas,
                src_origin.x as f64,
                src_origin.y as f64,
                w,
                h,
                dst.x as f64,
                dst.y as f64,
                w,
                h,
            )
        {
            log::warn!("[render] blit: {:?}", e);
        }
    }

    fn read_rgba(&self) -> Vec<u8> {
        let (w, h) = (self.width(), self.height());
        match self.ctx.get_image_data(0.0, 0.0, w as f64, h as f64) {
            Ok(data) => data.data().0,
            Err(e) => {
                log::warn!("[render] readback: {:?}", e);
                Vec::new()
            }
        }
    }
}
