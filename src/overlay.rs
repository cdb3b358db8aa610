use crate::app::App;
use crate::constants::STATUS_ID;
use sgraffito_core::CapabilityState;
use web_sys as web;

fn capability_label(state: &CapabilityState) -> String {
    match state {
        CapabilityState::Off => "off".to_string(),
        CapabilityState::Pending => "…".to_string(),
        CapabilityState::Active => "on".to_string(),
        CapabilityState::Failed(e) => e.to_string(),
    }
}

/// Mode, expressivity and sensor states in the status line.
pub fn update_status(document: &web::Document, app: &App) {
    let Some(el) = document.get_element_by_id(STATUS_ID) else {
        return;
    };
    let text = format!(
        "{} • Expressivité: {} • Micro: {} • Gyro: {}",
        app.sim.profile().label,
        app.sim.expressivity().label(),
        capability_label(app.mic.state()),
        capability_label(app.orientation.state()),
    );
    el.set_text_content(Some(&text));
}

#[inline]
pub fn show(document: &web::Document) {
    if let Some(el) = document.get_element_by_id(STATUS_ID) {
        _ = el.class_list().remove_1("hidden");
    }
}

#[inline]
pub fn toggle(document: &web::Document) {
    if let Some(el) = document.get_element_by_id(STATUS_ID) {
        _ = el.class_list().toggle("hidden");
    }
}
