#![recursion_limit = "256"]

use app::components::App;
use leptos::mount::hydrate_body;
use wasm_bindgen::prelude::wasm_bindgen;

/// Browser entry point. `tracing` events reach the console through the
/// `log` bridge, so one logger covers both.
#[wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    #[allow(clippy::expect_used)]
    console_log::init_with_level(log::Level::Info).expect("error initializing logger");

    log::info!("Hydrating booking pages");
    hydrate_body(App);
}
