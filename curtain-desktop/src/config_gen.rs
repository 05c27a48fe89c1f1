use std::fs;
use std::path::Path;
use curtain_core::config::CoreConfig;

pub fn ensure_config_exists(path: &str) {
    if Path::new(path).exists() {
        return;
    }

    println!("Creating default configuration at '{}'...", path);

    let toml_str = match toml::to_string_pretty(&CoreConfig::default()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to serialize default config: {}", e);
            return;
        }
    };

    if let Err(e) = fs::write(path, toml_str) {
        eprintln!("Failed to write config file: {}", e);
    } else {
        println!("Config file created successfully.");
    }
}

#[cfg(test)]
mod tests {
    use curtain_core::config::{CoreConfig, PlaybackConfig};

    #[test]
    fn default_config_round_trips_through_toml() {
        let text = toml::to_string_pretty(&CoreConfig::default()).unwrap();
        assert!(text.contains("[playback]"));
        assert!(text.contains("backend = \"smooth_tone\""));

        let table: toml::Table = text.parse().unwrap();
        let playback: PlaybackConfig = table["playback"].clone().try_into().unwrap();
        assert_eq!(playback.choice_settle_ms, 2000);
        assert_eq!(playback.seed, None);
    }
}
