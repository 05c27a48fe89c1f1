mod setup;
mod config_gen;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use curtain_core::audio::AudioHub;
use curtain_core::config::{CoreConfig, SystemConfig};
use curtain_core::event::InputEvent;
use curtain_core::manager::{read_script, scan_assets};
use curtain_core::renderer::driver::Driver;
use curtain_core::renderer::frame::{AnyAsset, AssetCatalog};
use curtain_core::{PlaybackController, Script, ScriptLibrary, TerminalRenderer};

const STEP_MS: u64 = 16;

fn main() {
    setup::init();
    log::info!(">>> Curtain Desktop Launcher Started <<<");

    let core_cfg = CoreConfig::from_shared();
    let Some(script) = load_script(&core_cfg.system) else {
        return;
    };

    let catalog = open_catalog(&core_cfg.system);
    let mut controller = PlaybackController::from_shared_config(open_audio());
    controller.set_idle_script(script.clone());
    controller.load_script(script);

    let mut driver = Driver::new(controller, TerminalRenderer::new(), STEP_MS).realtime(true);
    driver.pump();
    println!("Commands: play, stop, click <id>, speed <x>, voice <smooth|creature|beeper>, skip, dismiss, quit");

    loop {
        let idle_since = Instant::now();
        let Some(input) = driver.renderer_mut().read_command() else { break };
        // time spent at the prompt still counts towards click staleness
        driver.controller_mut().update(idle_since.elapsed().as_millis() as u64);
        driver.pump();

        match input {
            InputEvent::Play => match driver.run() {
                Ok(ticks) => log::debug!("Playback took {} ticks", ticks),
                Err(e) => log::error!("Play failed: {:#}", e),
            },
            other => {
                driver.controller_mut().feed(other);
                driver.pump();
                // let the clicked line finish talking
                while driver.controller().interaction().is_some() {
                    driver.step();
                }
            }
        }

        let frame = driver.controller().frame(catalog.as_ref());
        log::debug!(
            "Stage: {:?} scene {:?}, background {:?}, {} characters",
            frame.state,
            frame.scene_index,
            frame.background,
            frame.characters.len()
        );
    }
    log::info!("Bye");
}

/// `script_path` may point at one JSON file or at a directory of them.
fn load_script(sys_cfg: &SystemConfig) -> Option<Arc<Script>> {
    let path = Path::new(&sys_cfg.script_path);
    log::info!("Loading script from config: {}", sys_cfg.script_path);

    if path.is_dir() {
        let mut library = ScriptLibrary::new();
        if let Err(e) = library.load_dir(path) {
            log::error!("{:#}", e);
            return None;
        }
        let first = library.names().first().and_then(|name| library.get(name));
        if first.is_none() {
            log::error!("No scripts found in {:?}", path);
        }
        return first;
    }

    match read_script(path) {
        Ok(script) => {
            log::debug!("Loaded script '{}' with {} scenes", script.title, script.len());
            Some(Arc::new(script))
        }
        Err(e) => {
            log::error!("{:#}. Please check config.toml or file path.", e);
            None
        }
    }
}

/// Sprites and backgrounds the host can draw. Without an asset folder every
/// key is taken as present.
fn open_catalog(sys_cfg: &SystemConfig) -> Box<dyn AssetCatalog> {
    match scan_assets(&sys_cfg.assets_path) {
        Ok(assets) => {
            log::info!("Indexed {} assets from {}", assets.len(), sys_cfg.assets_path);
            Box::new(assets)
        }
        Err(e) => {
            log::warn!("{:#}. Every asset counts as present", e);
            Box::new(AnyAsset)
        }
    }
}

fn open_audio() -> AudioHub {
    #[cfg(feature = "audio")]
    {
        match curtain_audio::KiraToneSink::new() {
            Ok(sink) => return AudioHub::new(sink),
            Err(e) => log::warn!("Audio disabled: {:#}", e),
        }
    }
    log::info!("Running without audio output");
    AudioHub::silent()
}
