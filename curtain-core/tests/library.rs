use std::fs;

use curtain_core::ScriptLibrary;
use curtain_core::manager::{read_script, scan_assets};
use tempfile::tempdir;

const INTRO: &str = r#"{
    "title": "Intro",
    "scenes": [
        {
            "background": "park",
            "characters": [
                { "id": "anna", "name": "Anna", "sprite": { "gender": "female", "animation": "happy" } }
            ],
            "dialogues": [
                { "text": "Hello!", "speaker": "anna", "reveal_delay_millis": 200 }
            ]
        },
        { "background": "street", "duration_millis": 1500, "is_ending": true }
    ]
}"#;

#[test]
fn json_scripts_load_with_defaults() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path();
    let path = dir.join("intro.json");
    fs::write(&path, INTRO).unwrap();

    let script = read_script(&path).unwrap();
    assert_eq!(script.title, "Intro");
    assert_eq!(script.len(), 2);
    assert_eq!(script.scenes[0].duration_millis, 3000);
    assert_eq!(script.scenes[0].dialogues[0].per_glyph_delay_millis, 50);
    assert_eq!(script.scenes[0].characters[0].transform.scale, 1.0);
    assert!(script.scenes[1].is_ending);
}

#[test]
fn library_indexes_by_stem() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("intro.json"), INTRO).unwrap();
    fs::create_dir_all(dir.join("act2")).unwrap();
    fs::write(dir.join("act2").join("finale.json"), INTRO).unwrap();
    fs::write(dir.join("notes.txt"), "not a script").unwrap();

    let mut library = ScriptLibrary::new();
    assert_eq!(library.load_dir(dir).unwrap(), 2);
    assert_eq!(library.names(), vec!["finale", "intro"]);
    assert!(library.get("intro").is_some());
    assert!(library.get("notes").is_none());
}

#[test]
fn duplicate_stems_are_rejected() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("intro.json"), INTRO).unwrap();
    fs::create_dir_all(dir.join("copy")).unwrap();
    fs::write(dir.join("copy").join("intro.json"), INTRO).unwrap();

    let err = ScriptLibrary::new().load_dir(dir).unwrap_err();
    assert!(format!("{err}").contains("collision"));
}

#[test]
fn broken_json_reports_the_file() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path();
    let path = dir.join("broken.json");
    fs::write(&path, "{ \"scenes\": [").unwrap();

    let err = read_script(&path).unwrap_err();
    assert!(format!("{err}").contains("broken.json"));
}

#[test]
fn assets_are_indexed_by_stem() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("park.png"), b"").unwrap();
    fs::write(dir.join("female_idle_0.png"), b"").unwrap();

    let assets = scan_assets(dir).unwrap();
    assert!(assets.contains("park"));
    assert!(assets.contains("female_idle_0"));
    assert!(scan_assets(dir.join("missing")).is_err());
}
