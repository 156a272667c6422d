//! The penguin meadow app: the animated scene, the penguin video slots and
//! the on-screen debug console, natively or in the browser.

mod console_overlay;
#[cfg(not(target_arch = "wasm32"))]
mod native_video;
#[cfg(target_arch = "wasm32")]
mod web;

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_penguin_meadow::MeadowScenePlugin;
use penguin_meadow::{DebugConsole, MeadowConfig, PageLog};

pub use console_overlay::{ConsoleHandle, DebugConsolePlugin};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::wasm_bindgen;

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(start))]
pub fn main() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    // No environment on the web; every knob keeps its default there.
    let config = MeadowConfig::from_env();
    build_app(&config).run();
}

fn engine_level(filter: log::LevelFilter) -> bevy::log::Level {
    use bevy::log::Level;
    match filter {
        log::LevelFilter::Off | log::LevelFilter::Error => Level::ERROR,
        log::LevelFilter::Warn => Level::WARN,
        log::LevelFilter::Info => Level::INFO,
        log::LevelFilter::Debug => Level::DEBUG,
        log::LevelFilter::Trace => Level::TRACE,
    }
}

pub fn build_app(config: &MeadowConfig) -> App {
    let page = PageLog::new(config.console_lines);
    let console = DebugConsole::new(config.log_level, vec![Box::new(page.clone())]);
    console.capture_panics();

    let mut app = App::new();
    // Must exist before LogPlugin builds its layers.
    app.insert_resource(ConsoleHandle { console, page });
    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Penguin Meadow".to_string(),
                    #[cfg(target_arch = "wasm32")]
                    canvas: Some("#bevy-canvas".to_string()),
                    fit_canvas_to_parent: true,
                    prevent_default_event_handling: false,
                    ..default()
                }),
                ..default()
            })
            .set(LogPlugin {
                level: engine_level(config.log_level),
                custom_layer: console_overlay::console_layer,
                ..default()
            }),
    )
    .add_plugins(EguiPlugin::default())
    .add_plugins(MeadowScenePlugin::from_config(config))
    .add_plugins(DebugConsolePlugin {
        visible: config.debug_console,
    });

    #[cfg(not(target_arch = "wasm32"))]
    app.add_plugins(native_video::NativeVideoPlugin::from_config(config));

    #[cfg(target_arch = "wasm32")]
    web::start(config);

    app
}
