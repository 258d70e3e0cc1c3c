use circle_core::geolocate::{GeolocationFailure, ENABLE_HIGH_ACCURACY, MAXIMUM_AGE_MS, TIMEOUT_MS};
use circle_core::types::LatLng;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{GeolocationPosition, GeolocationPositionError, PositionOptions};

/// One-shot position request. `done` runs exactly once.
pub fn locate(done: impl FnOnce(Result<LatLng, GeolocationFailure>) + 'static) {
    let Some(geolocation) = web_sys::window().and_then(|w| w.navigator().geolocation().ok()) else {
        done(Err(GeolocationFailure::Unsupported));
        return;
    };

    // Both callbacks share `done`; whichever fires first takes it.
    let done = std::rc::Rc::new(std::cell::RefCell::new(Some(done)));

    let on_success = {
        let done = done.clone();
        Closure::once(move |pos: GeolocationPosition| {
            let coords = pos.coords();
            if let Some(f) = done.borrow_mut().take() {
                f(Ok(LatLng::new(coords.latitude(), coords.longitude())));
            }
        })
    };
    let on_error = {
        let done = done.clone();
        Closure::once(move |err: GeolocationPositionError| {
            if let Some(f) = done.borrow_mut().take() {
                f(Err(GeolocationFailure::from_code(err.code())));
            }
        })
    };

    let options = PositionOptions::new();
    options.set_enable_high_accuracy(ENABLE_HIGH_ACCURACY);
    options.set_timeout(TIMEOUT_MS);
    options.set_maximum_age(MAXIMUM_AGE_MS);

    let started = geolocation.get_current_position_with_error_callback_and_options(
        on_success.as_ref().unchecked_ref(),
        Some(on_error.as_ref().unchecked_ref()),
        &options,
    );
    if let Err(e) = started {
        log::warn!("getCurrentPosition failed: {e:?}");
        if let Some(f) = done.borrow_mut().take() {
            f(Err(GeolocationFailure::Other));
        }
        return;
    }

    // The browser owns the callbacks from here on.
    on_success.forget();
    on_error.forget();
}
