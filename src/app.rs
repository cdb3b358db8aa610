use crate::audio::{MicSource, MicStream};
use crate::constants::EXPORT_FILENAME;
use crate::orientation::{request_orientation, Orientation};
use crate::render::Canvas2d;
use crate::{dom, overlay};
use glam::Vec2;
use instant::Instant;
use sgraffito_core::{
    CapabilityState, Expressivity, PointerSample, ProfileKind, SimConfig, Simulation, SpectrumSource,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

/// Everything the page drives: the simulation, its screen and the sensors.
pub struct App {
    pub sim: Simulation<Canvas2d>,
    pub screen: Canvas2d,
    pub mic: MicSource,
    pub orientation: Orientation,
    pub document: web::Document,
    epoch: Instant,
}

pub type SharedApp = Rc<RefCell<App>>;

impl App {
    pub fn new(document: web::Document, canvas: web::HtmlCanvasElement) -> anyhow::Result<Self> {
        dom::sync_canvas_backing_size(&canvas);
        let (w, h) = dom::css_size(&canvas);
        let screen = Canvas2d::new(canvas, dom::device_pixel_ratio())?;
        let buffer = Canvas2d::offscreen(&document)?;
        let config = SimConfig {
            seed: (js_sys::Math::random() * u32::MAX as f64) as u64,
            ..SimConfig::default()
        };
        let sim = Simulation::new(buffer, Vec2::new(w as f32, h as f32), config)?;
        Ok(Self {
            sim,
            screen,
            mic: MicSource::default(),
            orientation: Orientation::default(),
            document,
            epoch: Instant::now(),
        })
    }

    /// Seconds since startup; the one clock shared by frames and pointers.
    pub fn now(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    pub fn sample(&self, id: i32, pos: Vec2, pressure: Option<f32>) -> PointerSample {
        PointerSample {
            id,
            pos,
            pressure,
            time: self.now(),
        }
    }

    pub fn frame(&mut self, dt: f32) {
        let now = self.now();
        let tilt = self.orientation.poll();
        let spectrum = if self.mic.is_active() {
            self.mic.latest_spectrum()
        } else {
            None
        };
        self.sim.frame(dt, now, spectrum, tilt);
        self.sim.render(&mut self.screen);
    }

    /// Follow a viewport change: new backing size, new world.
    pub fn resize(&mut self) {
        let canvas = self.screen.canvas().clone();
        dom::sync_canvas_backing_size(&canvas);
        self.screen.set_scale(dom::device_pixel_ratio());
        let (w, h) = dom::css_size(&canvas);
        self.sim.resize(Vec2::new(w as f32, h as f32));
    }

    pub fn select_profile(&mut self, kind: ProfileKind) {
        if let Err(e) = self.sim.set_profile(kind) {
            log::error!("[app] {}", e);
        }
        self.refresh_status();
    }

    pub fn clear(&mut self) {
        self.sim.clear();
    }

    pub fn step_expressivity(&mut self, up: bool) {
        let level: Expressivity = self.sim.expressivity().step(up);
        self.sim.set_expressivity(level);
        log::info!("[app] expressivity {}", level.label());
        self.refresh_status();
    }

    pub fn export(&self) {
        let result = self
            .sim
            .export_png()
            .map_err(anyhow::Error::from)
            .and_then(|png| dom::download_bytes(&self.document, &png, "image/png", EXPORT_FILENAME));
        if let Err(e) = result {
            log::error!("[app] export failed: {:#}", e);
        }
    }

    pub fn refresh_status(&self) {
        overlay::update_status(&self.document, self);
    }
}

/// Turn the microphone off, or request it if off.
pub fn toggle_microphone(app: &SharedApp) {
    {
        let mut a = app.borrow_mut();
        if *a.mic.state() == CapabilityState::Pending {
            return;
        }
        if a.mic.is_active() {
            a.mic.stop();
            a.refresh_status();
            return;
        }
        a.mic.set_pending();
        a.refresh_status();
    }
    let app = app.clone();
    spawn_local(async move {
        let result = MicStream::open().await;
        let mut a = app.borrow_mut();
        a.mic.attach(result);
        a.refresh_status();
    });
}

/// Turn the tilt force off, or request the sensor if off.
pub fn toggle_orientation(app: &SharedApp) {
    {
        let mut a = app.borrow_mut();
        if *a.orientation.state() == CapabilityState::Pending {
            return;
        }
        if a.orientation.state().is_active() {
            a.orientation.stop();
            a.refresh_status();
            return;
        }
        a.orientation.set_pending();
        a.refresh_status();
    }
    let app = app.clone();
    spawn_local(async move {
        let result = request_orientation().await;
        let mut a = app.borrow_mut();
        a.orientation.attach(result);
        a.refresh_status();
    });
}
