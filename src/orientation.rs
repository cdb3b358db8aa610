use glam::Vec2;
use sgraffito_core::{
    Capability, CapabilityError, CapabilityState, Granted, TiltFilter, TiltSource,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

/// Device orientation permission, including the iOS-style
/// `DeviceOrientationEvent.requestPermission()` gate when present.
pub async fn request_orientation() -> Result<Granted, CapabilityError> {
    let unsupported = CapabilityError::Unsupported(Capability::Orientation);
    let window = web::window().ok_or(unsupported.clone())?;
    let global: &JsValue = window.as_ref();
    let ctor = js_sys::Reflect::get(global, &JsValue::from_str("DeviceOrientationEvent"))
        .map_err(|_| unsupported.clone())?;
    if ctor.is_undefined() {
        return Err(unsupported);
    }

    let request = js_sys::Reflect::get(&ctor, &JsValue::from_str("requestPermission"))
        .unwrap_or(JsValue::UNDEFINED);
    let Some(request) = request.dyn_ref::<js_sys::Function>() else {
        return Ok(Granted(Capability::Orientation));
    };

    let denied = CapabilityError::Denied(Capability::Orientation);
    let promise: js_sys::Promise = request
        .call0(&ctor)
        .map_err(|_| denied.clone())?
        .dyn_into()
        .map_err(|_| denied.clone())?;
    let answer = JsFuture::from(promise).await.map_err(|_| denied.clone())?;
    if answer.as_string().as_deref() == Some("granted") {
        Ok(Granted(Capability::Orientation))
    } else {
        Err(denied)
    }
}

/// Tilt sensor as a [`TiltSource`].
#[derive(Default)]
pub struct Orientation {
    filter: Rc<RefCell<TiltFilter>>,
    listener: Option<Closure<dyn FnMut(web::DeviceOrientationEvent)>>,
    state: CapabilityState,
}

impl Orientation {
    pub fn state(&self) -> &CapabilityState {
        &self.state
    }

    pub fn set_pending(&mut self) {
        self.state = CapabilityState::Pending;
    }

    /// Store the permission outcome and start listening when granted.
    pub fn attach(&mut self, result: Result<Granted, CapabilityError>) {
        self.state = CapabilityState::from_request(result);
        if !self.state.is_active() {
            return;
        }
        let Some(window) = web::window() else {
            return;
        };
        let filter = self.filter.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::DeviceOrientationEvent| {
            filter
                .borrow_mut()
                .set_orientation(ev.beta().map(|b| b as f32), ev.gamma().map(|g| g as f32));
        }) as Box<dyn FnMut(web::DeviceOrientationEvent)>);
        _ = window
            .add_event_listener_with_callback("deviceorientation", closure.as_ref().unchecked_ref());
        self.listener = Some(closure);
    }

    pub fn stop(&mut self) {
        if let (Some(window), Some(closure)) = (web::window(), self.listener.take()) {
            _ = window.remove_event_listener_with_callback(
                "deviceorientation",
                closure.as_ref().unchecked_ref(),
            );
            log::info!("[orientation] off");
        }
        self.filter.borrow_mut().reset();
        self.state = CapabilityState::Off;
    }

    /// Smoothed tilt for this frame, `None` while the sensor is off.
    pub fn poll(&self) -> Option<Vec2> {
        self.is_active().then(|| self.tilt())
    }
}

impl TiltSource for Orientation {
    fn is_active(&self) -> bool {
        self.state.is_active() && self.listener.is_some()
    }

    fn tilt(&self) -> Vec2 {
        self.filter.borrow_mut().tick()
    }
}
