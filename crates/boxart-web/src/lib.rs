//! BoxArt Web - browser and desktop front end
//!
//! Hosts the box art viewer and the customizer panel. In the browser the app
//! renders into `#boxart-canvas` and reads its configuration from the page
//! URL; the desktop binary takes a TOML file and command-line flags instead.

mod app;
pub mod config;
pub mod customizer;
pub mod file_picker;
pub mod storage;
pub mod viewer;

pub use app::run;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Entry point for WASM module
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn main() {
    // Set panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging with filtering to reduce wgpu noise
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::WARN)
            .build(),
    );

    let config = config::from_browser();
    let repository = match storage::open_repository(&config.storage_key) {
        Ok(repository) => repository,
        Err(e) => {
            // Still usable without persistence; saves report the failure
            tracing::error!("Local storage unavailable: {}", e);
            Box::new(boxart_core::JsonRecordRepository::new(
                boxart_core::MemoryStorage::new(),
                config.storage_key.clone(),
            ))
        }
    };

    app::run(config, repository);
}
