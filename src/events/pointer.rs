use crate::app::SharedApp;
use glam::Vec2;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Down,
    Move,
    Up,
}

/// Pointer position in CSS pixels relative to the canvas.
fn canvas_css_pos(ev: &web::PointerEvent, canvas: &web::HtmlCanvasElement) -> Vec2 {
    let rect = canvas.get_bounding_client_rect();
    Vec2::new(
        (ev.client_x() as f64 - rect.left()) as f32,
        (ev.client_y() as f64 - rect.top()) as f32,
    )
}

// Mice report 0 (released) or 0.5 (pressed); treat both as "no pressure data".
fn pressure(ev: &web::PointerEvent) -> Option<f32> {
    (ev.pointer_type() == "pen" || ev.pointer_type() == "touch").then(|| ev.pressure())
}

fn wire(app: &SharedApp, canvas: &web::HtmlCanvasElement, event: &str, phase: Phase) {
    let app = app.clone();
    let target = canvas.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        let pos = canvas_css_pos(&ev, &target);
        let Ok(mut a) = app.try_borrow_mut() else {
            return;
        };
        let sample = a.sample(ev.pointer_id(), pos, pressure(&ev));
        match phase {
            Phase::Down => {
                if a.sim.pointer_down(sample) {
                    _ = target.set_pointer_capture(ev.pointer_id());
                    ev.prevent_default();
                }
            }
            Phase::Move => a.sim.pointer_move(sample),
            Phase::Up => {
                a.sim.pointer_up(sample);
                _ = target.release_pointer_capture(ev.pointer_id());
            }
        }
    }) as Box<dyn FnMut(web::PointerEvent)>);
    _ = canvas.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
    closure.forget();
}

/// Pointer down/move/up on the canvas; cancel counts as release.
pub fn wire_pointer_handlers(app: &SharedApp, canvas: &web::HtmlCanvasElement) {
    wire(app, canvas, "pointerdown", Phase::Down);
    wire(app, canvas, "pointermove", Phase::Move);
    wire(app, canvas, "pointerup", Phase::Up);
    wire(app, canvas, "pointercancel", Phase::Up);
}
