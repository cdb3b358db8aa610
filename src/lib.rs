#![cfg(target_arch = "wasm32")]
use crate::app::{App, SharedApp};
use crate::constants::*;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

mod app;
mod audio;
mod constants;
mod dom;
mod events;
mod frame;
mod orientation;
mod overlay;
mod render;

fn wire_resize(app: &SharedApp) {
    let app = app.clone();
    let resize_closure = Closure::wrap(Box::new(move || {
        if let Ok(mut a) = app.try_borrow_mut() {
            a.resize();
        }
    }) as Box<dyn FnMut()>);
    if let Some(window) = web::window() {
        _ = window
            .add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref());
    }
    resize_closure.forget();
}

fn wire_buttons(document: &web::Document, app: &SharedApp) {
    let a = app.clone();
    dom::add_click_listener(document, BTN_CLEAR_ID, move || a.borrow_mut().clear());
    let a = app.clone();
    dom::add_click_listener(document, BTN_EXPORT_ID, move || a.borrow().export());
    let a = app.clone();
    dom::add_click_listener(document, BTN_MIC_ID, move || app::toggle_microphone(&a));
    let a = app.clone();
    dom::add_click_listener(document, BTN_GYRO_ID, move || app::toggle_orientation(&a));
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("sgraffito-web starting");

    if let Err(e) = init() {
        log::error!("init error: {:?}", e);
    }
    Ok(())
}

fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| anyhow::anyhow!("missing #{}", CANVAS_ID))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;

    let app: SharedApp = Rc::new(RefCell::new(App::new(document.clone(), canvas.clone())?));
    app.borrow().refresh_status();
    overlay::show(&document);

    wire_resize(&app);
    wire_buttons(&document, &app);
    events::wire_pointer_handlers(&app, &canvas);
    events::wire_global_keydown(app.clone());

    frame::start_loop(Rc::new(RefCell::new(frame::FrameContext::new(app))));
    Ok(())
}
