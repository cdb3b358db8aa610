use crate::app::{toggle_microphone, toggle_orientation, SharedApp};
use crate::overlay;
use sgraffito_core::ProfileKind;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Mode(ProfileKind),
    Clear,
    Export,
    ToggleMic,
    ToggleGyro,
    Expressivity { up: bool },
    ToggleStatus,
}

#[inline]
pub fn action_for_key(key: &str) -> Option<KeyAction> {
    match key {
        "1" => Some(KeyAction::Mode(ProfileKind::Sumi)),
        "2" => Some(KeyAction::Mode(ProfileKind::Firework)),
        "3" => Some(KeyAction::Mode(ProfileKind::Generatif)),
        "c" | "C" => Some(KeyAction::Clear),
        "e" | "E" => Some(KeyAction::Export),
        "m" | "M" => Some(KeyAction::ToggleMic),
        "g" | "G" => Some(KeyAction::ToggleGyro),
        "[" => Some(KeyAction::Expressivity { up: false }),
        "]" => Some(KeyAction::Expressivity { up: true }),
        "h" | "H" => Some(KeyAction::ToggleStatus),
        _ => None,
    }
}

pub fn run_action(app: &SharedApp, action: KeyAction) {
    match action {
        KeyAction::Mode(kind) => app.borrow_mut().select_profile(kind),
        KeyAction::Clear => app.borrow_mut().clear(),
        KeyAction::Export => app.borrow().export(),
        KeyAction::ToggleMic => toggle_microphone(app),
        KeyAction::ToggleGyro => toggle_orientation(app),
        KeyAction::Expressivity { up } => app.borrow_mut().step_expressivity(up),
        KeyAction::ToggleStatus => overlay::toggle(&app.borrow().document),
    }
}

pub fn handle_global_keydown(ev: &web::KeyboardEvent, app: &SharedApp) {
    if ev.repeat() || ev.ctrl_key() || ev.meta_key() || ev.alt_key() {
        return;
    }
    let key = ev.key();
    if let Some(action) = action_for_key(&key) {
        log::debug!("[keys] {} -> {:?}", key, action);
        run_action(app, action);
        ev.prevent_default();
    }
}

pub fn wire_global_keydown(app: SharedApp) {
    let closure = Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
        handle_global_keydown(&ev, &app);
    }) as Box<dyn FnMut(web::KeyboardEvent)>);
    if let Some(w) = web::window() {
        _ = w.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}
