// Tests for configuration loading and derived session parameters

use sona_meet::Config;
use std::io::Write;
use std::time::Duration;

fn write_config(dir: &tempfile::TempDir, body: &str) -> String {
    let path = dir.path().join("sona-meet.toml");
    let mut file = std::fs::File::create(&path).expect("create config file");
    file.write_all(body.as_bytes()).expect("write config file");
    dir.path().join("sona-meet").to_string_lossy().into_owned()
}

const MINIMAL: &str = r#"
[agent]
endpoint = "wss://example.invalid/live"
api_key = "test-key"
model = "models/test-live"
voice = "Puck"
system_prompt = "Be brief."
"#;

#[test]
fn test_load_minimal_config_applies_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(&dir, MINIMAL);

    let cfg = Config::load(&path).expect("config loads");

    assert_eq!(cfg.agent.model, "models/test-live");
    assert_eq!(cfg.audio.capture_sample_rate, 16_000);
    assert_eq!(cfg.audio.playback_sample_rate, 24_000);
    assert_eq!(cfg.audio.mic_block_samples, 4096);
    assert_eq!(cfg.video.snapshot_interval_ms, 500);
    assert_eq!(cfg.session.connect_timeout_secs, 15);
}

#[test]
fn test_session_config_is_derived_from_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let body = format!(
        "{}\n[session]\nconnect_timeout_secs = 3\n\n[video]\nsnapshot_interval_ms = 250\nscale = 0.25\njpeg_quality = 0.8\n",
        MINIMAL
    );
    let path = write_config(&dir, &body);

    let cfg = Config::load(&path).expect("config loads");
    let session = cfg.session_config();

    assert_eq!(session.model, "models/test-live");
    assert_eq!(session.voice, "Puck");
    assert_eq!(session.connect_timeout, Duration::from_secs(3));
    assert_eq!(session.snapshot_interval, Duration::from_millis(250));
    assert_eq!(session.video_scale, 0.25);
    assert_eq!(session.jpeg_quality, 0.8);
    assert!(session.session_id.starts_with("meeting-"));
}

#[test]
fn test_missing_agent_section_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(&dir, "[audio]\ncapture_sample_rate = 16000\n");

    assert!(Config::load(&path).is_err());
}
