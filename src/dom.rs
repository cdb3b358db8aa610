use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn add_click_listener(
    document: &web::Document,
    element_id: &str,
    mut handler: impl FnMut() + 'static,
) {
    if let Some(el) = document.get_element_by_id(element_id) {
        let closure = Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

/// CSS size of the canvas in pixels.
pub fn css_size(canvas: &web::HtmlCanvasElement) -> (f64, f64) {
    let rect = canvas.get_bounding_client_rect();
    (rect.width().max(1.0), rect.height().max(1.0))
}

pub fn device_pixel_ratio() -> f64 {
    web::window()
        .map(|w| w.device_pixel_ratio())
        .unwrap_or(1.0)
        .max(1.0)
}

/// Match the backing store to CSS size × devicePixelRatio.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) {
    let dpr = device_pixel_ratio();
    let (w, h) = css_size(canvas);
    canvas.set_width(((w * dpr) as u32).max(1));
    canvas.set_height(((h * dpr) as u32).max(1));
}

/// Offer `bytes` as a file download.
pub fn download_bytes(
    document: &web::Document,
    bytes: &[u8],
    mime: &str,
    filename: &str,
) -> anyhow::Result<()> {
    let js_err = |e: wasm_bindgen::JsValue| anyhow::anyhow!("{:?}", e);

    let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes));
    let options = web::BlobPropertyBag::new();
    options.set_type(mime);
    let blob = web::Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(js_err)?;
    let url = web::Url::create_object_url_with_blob(&blob).map_err(js_err)?;

    let anchor: web::HtmlAnchorElement = document
        .create_element("a")
        .map_err(js_err)?
        .dyn_into()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor.click();
    web::Url::revoke_object_url(&url).map_err(js_err)?;
    Ok(())
}
