//! Thin bridge to the Leaflet global loaded by `index.html`.
//!
//! Everything crossing the boundary is JSON produced from `circle_core`
//! view-models, so the JavaScript side only creates and clears layers.

use circle_core::cities::City;
use circle_core::map::{BaseLayer, CITY_OUTLINE, SELECTION_MARKER_HTML};
use circle_core::render::isochrone::IsochroneLayer;
use circle_core::render::poi::{PoiMarker, MARKER_STYLE, POPUP_MAX_WIDTH};
use circle_core::types::LatLng;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

#[wasm_bindgen(inline_js = r#"
export function createMap(element, view, source, onClick) {
  const L = window.L;
  if (!L) {
    throw new Error('Leaflet not loaded');
  }
  const map = L.map(element, {
    maxBounds: view.maxBounds,
    maxBoundsViscosity: 1.0,
    tap: true,
    touchZoom: true,
    bounceAtZoomLimits: false,
  }).setView([view.center.lat, view.center.lng], view.zoom);
  L.control.scale({ imperial: false }).addTo(map);
  const handle = {
    map,
    base: null,
    outline: null,
    marker: null,
    isochrones: L.layerGroup().addTo(map),
    pois: L.layerGroup().addTo(map),
  };
  setBaseLayer(handle, source);
  map.on('click', (e) => onClick(e.latlng.lat, e.latlng.lng));
  return handle;
}

export function setBaseLayer(handle, source) {
  const L = window.L;
  if (handle.base) {
    handle.map.removeLayer(handle.base);
  }
  const opts = { maxZoom: source.maxZoom, attribution: source.attribution };
  if (source.subdomains) {
    opts.subdomains = source.subdomains;
  }
  handle.base = L.tileLayer(source.url, opts).addTo(handle.map);
  handle.base.bringToBack();
}

export function showCity(handle, view, outline, animate) {
  const L = window.L;
  handle.map.setMaxBounds(view.maxBounds);
  if (animate) {
    handle.map.flyTo([view.center.lat, view.center.lng], view.zoom);
  } else {
    handle.map.setView([view.center.lat, view.center.lng], view.zoom);
  }
  if (handle.outline) {
    handle.map.removeLayer(handle.outline);
  }
  handle.outline = L.rectangle(view.bounds, outline).addTo(handle.map);
}

export function showIsochrones(handle, layers) {
  const L = window.L;
  handle.isochrones.clearLayers();
  for (const layer of layers) {
    L.geoJSON(layer.feature, { style: () => layer.style }).addTo(handle.isochrones);
  }
}

export function showPois(handle, markers, style, maxWidth) {
  const L = window.L;
  handle.pois.clearLayers();
  for (const m of markers) {
    L.circleMarker([m.lat, m.lng], Object.assign({ fillColor: m.fill_color }, style))
      .bindPopup(m.popup, { maxWidth })
      .addTo(handle.pois);
  }
}

export function showSelection(handle, lat, lng, html) {
  const L = window.L;
  if (handle.marker) {
    handle.map.removeLayer(handle.marker);
    handle.marker = null;
  }
  if (html == null) {
    return;
  }
  handle.marker = L.marker([lat, lng], {
    icon: L.divIcon({ className: 'custom-marker', html, iconSize: [20, 20], iconAnchor: [10, 10] }),
  }).addTo(handle.map);
}

export function centerOn(handle, lat, lng, zoom) {
  handle.map.setView([lat, lng], zoom);
}

export function invalidateSize(handle) {
  handle.map.invalidateSize();
}
"#)]
extern "C" {
    #[wasm_bindgen(catch, js_name = createMap)]
    fn create_map(
        element: &HtmlElement,
        view: JsValue,
        source: JsValue,
        on_click: &Closure<dyn FnMut(f64, f64)>,
    ) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_name = setBaseLayer)]
    fn set_base_layer(handle: &JsValue, source: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_name = showCity)]
    fn show_city(handle: &JsValue, view: JsValue, outline: JsValue, animate: bool) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_name = showIsochrones)]
    fn show_isochrones(handle: &JsValue, layers: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_name = showPois)]
    fn show_pois(handle: &JsValue, markers: JsValue, style: JsValue, max_width: u32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_name = showSelection)]
    fn show_selection(handle: &JsValue, lat: f64, lng: f64, html: Option<String>) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_name = centerOn)]
    fn center_on(handle: &JsValue, lat: f64, lng: f64, zoom: u8) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_name = invalidateSize)]
    fn invalidate_size(handle: &JsValue) -> Result<(), JsValue>;
}

/// Camera and bounds of a city, in the shapes Leaflet accepts.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CityView {
    center: LatLng,
    zoom: u8,
    bounds: [[f64; 2]; 2],
    max_bounds: [[f64; 2]; 2],
}

impl CityView {
    fn of(city: &City) -> Self {
        Self {
            center: city.center,
            zoom: city.zoom,
            bounds: city.bounds.corners(),
            max_bounds: city.max_bounds().corners(),
        }
    }
}

/// Serialize through JSON so the JS side sees plain objects.
fn to_js<T: Serialize + ?Sized>(value: &T) -> JsValue {
    match serde_json::to_string(value) {
        Ok(json) => js_sys::JSON::parse(&json).unwrap_or(JsValue::NULL),
        Err(e) => {
            log::error!("Failed to serialize map data: {e}");
            JsValue::NULL
        }
    }
}

fn report(what: &str, result: Result<(), JsValue>) {
    if let Err(e) = result {
        log::error!("Map {what} failed: {e:?}");
    }
}

pub struct MapHandle {
    inner: JsValue,
    _on_click: Closure<dyn FnMut(f64, f64)>,
}

impl MapHandle {
    pub fn new(
        element: &HtmlElement,
        city: &City,
        layer: BaseLayer,
        on_click: impl Fn(LatLng) + 'static,
    ) -> Result<Self, JsValue> {
        let on_click = Closure::<dyn FnMut(f64, f64)>::new(move |lat, lng| {
            on_click(LatLng::new(lat, lng));
        });
        let inner = create_map(
            element,
            to_js(&CityView::of(city)),
            to_js(&layer.source()),
            &on_click,
        )?;
        let handle = Self {
            inner,
            _on_click: on_click,
        };
        handle.show_city(city, false);
        Ok(handle)
    }

    pub fn set_base_layer(&self, layer: BaseLayer) {
        report("base layer", set_base_layer(&self.inner, to_js(&layer.source())));
    }

    /// Clamp panning to the padded city box, move there and redraw the
    /// dashed outline.
    pub fn show_city(&self, city: &City, animate: bool) {
        report(
            "city",
            show_city(&self.inner, to_js(&CityView::of(city)), to_js(&CITY_OUTLINE), animate),
        );
    }

    pub fn show_isochrones(&self, layers: &[IsochroneLayer]) {
        report("isochrones", show_isochrones(&self.inner, to_js(layers)));
    }

    pub fn show_pois(&self, markers: &[PoiMarker]) {
        report(
            "POIs",
            show_pois(&self.inner, to_js(markers), to_js(&MARKER_STYLE), POPUP_MAX_WIDTH),
        );
    }

    pub fn show_selection(&self, point: Option<LatLng>) {
        let result = match point {
            Some(p) => show_selection(&self.inner, p.lat, p.lng, Some(SELECTION_MARKER_HTML.to_string())),
            None => show_selection(&self.inner, 0.0, 0.0, None),
        };
        report("selection", result);
    }

    pub fn center_on(&self, point: LatLng, zoom: u8) {
        report("recenter", center_on(&self.inner, point.lat, point.lng, zoom));
    }

    pub fn invalidate_size(&self) {
        report("resize", invalidate_size(&self.inner));
    }
}
