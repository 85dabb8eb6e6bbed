use std::sync::Mutex;

use tempfile::NamedTempFile;

use style_mate::config::StyleMateConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "STYLEMATE_CONFIG",
        "STYLEMATE_MODEL_1",
        "STYLEMATE_MODEL_2",
        "STYLEMATE_DETECTOR",
        "STYLEMATE_CAPTURE_URL",
        "STYLEMATE_CAPTURE_FPS",
        "STYLEMATE_CATALOG",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn defaults_without_file_or_env() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = StyleMateConfig::load().expect("load config");

    assert_eq!(cfg.models.face_shape, "models/model1");
    assert_eq!(cfg.models.personal_tone, "models/model2");
    assert_eq!(cfg.detector, None);
    assert_eq!(cfg.capture.url, "stub://camera");
    assert_eq!((cfg.capture.width, cfg.capture.height), (400, 400));
    assert!(cfg.capture.mirror);
    assert_eq!(cfg.frame_interval().as_millis(), 100);
    assert!(cfg.catalog_path.is_none());
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "models": {
            "face_shape": "/opt/stylemate/face",
            "personal_tone": "/opt/stylemate/tone"
        },
        "detector": { "model": "/opt/stylemate/ultraface.onnx" },
        "capture": {
            "url": "/srv/frames",
            "width": 640,
            "height": 480,
            "target_fps": 15,
            "mirror": false
        },
        "catalog_path": "/etc/stylemate/catalog.toml"
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("STYLEMATE_CONFIG", file.path());
    std::env::set_var("STYLEMATE_MODEL_2", "stub://personal-tone");
    std::env::set_var("STYLEMATE_CAPTURE_FPS", "5");

    let cfg = StyleMateConfig::load().expect("load config");

    assert_eq!(cfg.models.face_shape, "/opt/stylemate/face");
    assert_eq!(cfg.models.personal_tone, "stub://personal-tone");
    assert_eq!(cfg.detector.as_deref(), Some("/opt/stylemate/ultraface.onnx"));
    assert_eq!(cfg.capture.url, "/srv/frames");
    assert_eq!((cfg.capture.width, cfg.capture.height), (640, 480));
    assert_eq!(cfg.capture.target_fps, 5);
    assert!(!cfg.capture.mirror);
    assert_eq!(
        cfg.catalog_path.unwrap().to_str(),
        Some("/etc/stylemate/catalog.toml")
    );

    clear_env();
}

#[test]
fn detector_can_be_disabled_from_env() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    std::io::Write::write_all(&mut file, br#"{ "detector": { "model": "stub://center" } }"#)
        .expect("write config");
    std::env::set_var("STYLEMATE_CONFIG", file.path());
    std::env::set_var("STYLEMATE_DETECTOR", "none");

    let cfg = StyleMateConfig::load().expect("load config");
    assert_eq!(cfg.detector, None);

    clear_env();
}

#[test]
fn rejects_invalid_frame_rate() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("STYLEMATE_CAPTURE_FPS", "0");
    assert!(StyleMateConfig::load().is_err());
    std::env::set_var("STYLEMATE_CAPTURE_FPS", "fast");
    assert!(StyleMateConfig::load().is_err());

    clear_env();
}
