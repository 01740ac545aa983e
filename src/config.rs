use crate::models::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

pub fn load_config(config_path: &Path) -> Result<Config> {
    if !config_path.exists() {
        create_default_config(config_path)?;
        info!(path = %config_path.display(), "created default config file");
    }

    let config_content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

    let config: Config = toml::from_str(&config_content)
        .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

    Ok(config)
}

fn create_default_config(config_path: &Path) -> Result<()> {
    let default_config = r#"[general]
settings_dir = "settings"
master_suffix = "_master_settings.txt"
report_file = ""

[trainer]
path = "../fastText-0.9.1/fasttext"
working_dir = ""
timeout_secs = 0
positional_key = "model_type"

[grid]
search_space = "search_space.yaml"
discriminator = "model_type"
training_mode = "unsupervised"
input = "../scratch-vectorize/dataset/train_500000.txt"
output_dir = "../scratch-vectorize/word_vectors"
known_hyperparameters = [
    "model_type",
    "minCount",
    "minCountLabel",
    "wordNgrams",
    "bucket",
    "minn",
    "maxn",
    "t",
    "label",
    "lr",
    "lrUpdateRate",
    "dim",
    "ws",
    "epoch",
    "neg",
    "loss",
    "thread",
    "pretrainedVectors",
    "saveOutput",
]

[reader]
lenient = true

[driver]
continue_on_failure = true
lock_dir = ""
"#;

    fs::write(config_path, default_config)
        .with_context(|| format!("Failed to create default config file: {}", config_path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrainingMode;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_load_config_creates_default() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("gridrunner.toml");

        let config = load_config(&config_path).unwrap();
        assert!(config_path.exists());

        assert_eq!(config.general.settings_dir, PathBuf::from("settings"));
        assert_eq!(config.general.report_file, None);
        assert_eq!(config.trainer.working_dir, None);
        assert_eq!(config.grid.training_mode, TrainingMode::Unsupervised);
        assert!(config.grid.known_hyperparameters.contains(&"epoch".to_string()));
        assert!(config.reader.lenient);
        assert_eq!(config.driver.lock_dir, None);
    }

    #[test]
    fn test_load_config_existing_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.toml");
        fs::write(&config_path, "[trainer]\npath = \"/usr/local/bin/fasttext\"\n").unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.trainer.path, PathBuf::from("/usr/local/bin/fasttext"));
        assert_eq!(config.general.master_suffix, "_master_settings.txt");
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("broken.toml");
        fs::write(&config_path, "[grid\ntraining_mode = ").unwrap();

        assert!(load_config(&config_path).is_err());
    }
}
