#[cfg(test)]
mod tests {
    use crate::Config;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_explicit_path() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test_config.toml");

        let config_content = r#"
[ocr]
binary = "/usr/local/bin/tesseract"
language = "eng"
confidence_threshold = 0.8

[capture]
screenshots_dir = "/tmp/shots"
interface_cache_dir = "/tmp/cache"
persist_screenshots = false

[input]
type_interval = 0.1
focus_delay = 1.0
"#;
        fs::write(&config_path, config_content).unwrap();

        let config = Config::load(Some(config_path.to_str().unwrap())).unwrap();

        assert_eq!(config.ocr.binary, "/usr/local/bin/tesseract");
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.ocr.confidence_threshold, 0.8);
        assert_eq!(config.capture.screenshots_dir, "/tmp/shots");
        assert!(!config.capture.persist_screenshots);
        assert_eq!(config.input.type_interval, 0.1);
        assert_eq!(config.input.focus_delay, 1.0);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test_config.toml");

        // Only the language is set; everything else must come from defaults
        fs::write(&config_path, "[ocr]\nlanguage = \"eng\"\n").unwrap();

        let config = Config::load(Some(config_path.to_str().unwrap())).unwrap();

        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.ocr.binary, "tesseract");
        assert_eq!(config.ocr.confidence_threshold, 0.7);
        assert_eq!(config.capture.screenshots_dir, "screenshots");
        assert_eq!(config.capture.interface_cache_dir, "interface_cache");
        assert!(config.capture.persist_screenshots);
        assert_eq!(config.input.type_interval, 0.05);
        assert_eq!(config.input.focus_delay, 0.5);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test_config.toml");

        fs::write(&config_path, "[ocr]\nconfidence_threshold = 1.5\n").unwrap();

        let result = Config::load(Some(config_path.to_str().unwrap()));
        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(
            err_msg.contains("confidence threshold"),
            "Expected error about the confidence threshold, got: {}",
            err_msg
        );
    }

    #[test]
    fn test_negative_intervals_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test_config.toml");

        fs::write(&config_path, "[input]\ntype_interval = -0.5\n").unwrap();

        let result = Config::load(Some(config_path.to_str().unwrap()));
        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(
            err_msg.contains("Type interval"),
            "Expected error about the type interval, got: {}",
            err_msg
        );
    }

    #[test]
    fn test_non_finite_intervals_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test_config.toml");

        // nan, inf and absurdly large delays are all valid TOML floats;
        // none of them may survive into a Duration.
        for value in ["nan", "inf", "1e30"] {
            fs::write(&config_path, format!("[input]\nfocus_delay = {value}\n")).unwrap();
            let result = Config::load(Some(config_path.to_str().unwrap()));
            assert!(result.is_err(), "focus_delay = {value} was accepted");
        }
    }

    #[test]
    fn test_save_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("saved.toml");

        let mut config = Config::default();
        config.ocr.language = "rus".to_string();
        config.capture.persist_screenshots = false;
        config.save(&config_path).unwrap();

        let loaded = Config::load(Some(config_path.to_str().unwrap())).unwrap();
        assert_eq!(loaded.ocr.language, "rus");
        assert_eq!(loaded.ocr.confidence_threshold, 0.7);
        assert!(!loaded.capture.persist_screenshots);
    }

    #[test]
    fn test_overrides_apply() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test_config.toml");

        fs::write(&config_path, "[ocr]\nlanguage = \"rus+eng\"\n").unwrap();

        let config = Config::load_with_overrides(
            Some(config_path.to_str().unwrap()),
            Some("eng".to_string()),
            Some(0.9),
        )
        .unwrap();

        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.ocr.confidence_threshold, 0.9);
    }

    #[test]
    fn test_out_of_range_override_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test_config.toml");

        fs::write(&config_path, "[ocr]\nlanguage = \"rus+eng\"\n").unwrap();

        let result = Config::load_with_overrides(
            Some(config_path.to_str().unwrap()),
            None,
            Some(2.0),
        );
        assert!(result.is_err());
    }
}
