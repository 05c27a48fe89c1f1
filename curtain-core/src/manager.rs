use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;
use log::{info, warn};
use anyhow::{Result, Context};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::runtime::Script;

/// Indexes JSON scripts under a directory by file stem.
#[derive(Debug, Default)]
pub struct ScriptLibrary {
    scripts: FxHashMap<String, Arc<Script>>,
    sources: FxHashMap<String, PathBuf>,
}

impl ScriptLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_dir(&mut self, root_dir: impl AsRef<Path>) -> Result<usize> {
        let root = root_dir.as_ref();
        info!("Scanning scripts at: {:?}", root);

        let mut loaded_count = 0;
        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|e| e == "json") {
                self.load_file(path)?;
                loaded_count += 1;
            }
        }

        info!("Scripts loaded: {}", loaded_count);
        Ok(loaded_count)
    }

    /// Loads one script. Two files with the same stem are an error.
    pub fn load_file(&mut self, path: &Path) -> Result<Arc<Script>> {
        let key = path.file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .with_context(|| format!("Script path has no file name: {:?}", path))?;

        if let Some(existing) = self.sources.get(&key) {
            if existing != path {
                anyhow::bail!(
                    "Script collision detected!\n  '{}' is defined in:\n    1. {:?}\n    2. {:?}",
                    key, existing, path
                );
            }
        }

        let script = Arc::new(read_script(path)?);
        for problem in validate(&script) {
            warn!("{:?}: {}", path, problem);
        }

        self.sources.insert(key.clone(), path.to_path_buf());
        self.scripts.insert(key, script.clone());
        Ok(script)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Script>> {
        self.scripts.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.scripts.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

pub fn read_script(path: &Path) -> Result<Script> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script: {:?}", path))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse script: {:?}", path))
}

/// Problems that still let a script play but probably aren't intended.
pub fn validate(script: &Script) -> Vec<String> {
    let mut problems = Vec::new();
    if script.is_empty() {
        problems.push("script has no scenes".to_string());
    }

    for (index, scene) in script.scenes.iter().enumerate() {
        for (line_index, line) in scene.dialogues.iter().enumerate() {
            if let Some(speaker) = &line.speaker {
                if scene.speaker(speaker).is_none() {
                    problems.push(format!("scene {} line {}: unknown speaker '{}'", index, line_index, speaker));
                }
            }
            for choice in &line.choices {
                if choice.target_scene_index >= script.len() {
                    problems.push(format!(
                        "scene {} line {}: choice '{}' targets missing scene {}",
                        index, line_index, choice.label, choice.target_scene_index
                    ));
                }
            }
        }
        if scene.dialogues.iter().filter(|l| l.has_choices()).count() > 1 {
            problems.push(format!("scene {}: only the first choice line is used", index));
        }
    }
    problems
}

/// Collects file stems of every image under `root` for frame asset resolution.
pub fn scan_assets(root: impl AsRef<Path>) -> Result<FxHashSet<String>> {
    let root = root.as_ref();
    if !root.exists() {
        anyhow::bail!("Asset directory not found: {:?}", root);
    }

    let assets: FxHashSet<String> = WalkDir::new(root).into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.path().file_stem().map(|s| s.to_string_lossy().to_string()))
        .collect();
    info!("Assets indexed: {}", assets.len());
    Ok(assets)
}
