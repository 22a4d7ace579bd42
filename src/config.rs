//! User-editable greeting content.
//!
//! Read from `~/.config/birthday/greeting.json` when present. Missing fields
//! keep their defaults and relative asset paths resolve against the
//! directory holding the file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GreetingError, Result};
use crate::music::Track;

const CONFIG_DIR: &str = ".config/birthday";
const CONFIG_FILE_NAME: &str = "greeting.json";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub path: PathBuf,
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GreetingConfig {
    pub recipient: String,
    pub headline: String,
    pub intro_message: String,
    pub card_cover: String,
    pub card_message: Vec<String>,
    pub wishes: String,
    pub music: Option<PathBuf>,
    pub fallback_music: Option<PathBuf>,
    pub photos: Vec<Photo>,
}

impl Default for GreetingConfig {
    fn default() -> Self {
        GreetingConfig {
            recipient: "Friend".to_string(),
            headline: "Happy Birthday!".to_string(),
            intro_message: "A little surprise is waiting for you.".to_string(),
            card_cover: "Open me".to_string(),
            card_message: vec![
                "Another year of laughter, adventures and cake.".to_string(),
                "May this one be the brightest yet.".to_string(),
            ],
            wishes: "Wishing you all the happiness in the world!".to_string(),
            music: Some(PathBuf::from("assets/birthday-music.mp3")),
            fallback_music: None,
            photos: (1..=6)
                .map(|i| Photo {
                    path: PathBuf::from(format!("assets/photo{i}.jpg")),
                    caption: None,
                })
                .collect(),
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    let home = std::env::var("HOME").ok()?;
    Some(PathBuf::from(home).join(CONFIG_DIR).join(CONFIG_FILE_NAME))
}

impl GreetingConfig {
    /// Loads the user's config, falling back to defaults on any problem.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Self::default();
        };
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no greeting config, using defaults");
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded greeting config");
                config
            }
            Err(err) => {
                tracing::warn!(%err, "ignoring greeting config");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| GreetingError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_json(&raw).map_err(|source| GreetingError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        if let Some(music) = self.music.as_mut() {
            resolve(music);
        }
        if let Some(music) = self.fallback_music.as_mut() {
            resolve(music);
        }
        for photo in &mut self.photos {
            resolve(&mut photo.path);
        }
    }

    pub fn primary_track(&self) -> Option<Track> {
        self.music.as_ref().map(Track::new)
    }

    pub fn fallback_track(&self) -> Option<Track> {
        self.fallback_music.as_ref().map(Track::new)
    }

    /// Shown in place of a photo that failed to load.
    pub fn placeholder_caption(&self) -> String {
        format!("Photo with {}", self.recipient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = GreetingConfig::from_json(r#"{"recipient": "Sam", "extra": 1}"#).unwrap();
        assert_eq!(config.recipient, "Sam");
        assert_eq!(config.photos.len(), 6);
        assert_eq!(config.placeholder_caption(), "Photo with Sam");
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(GreetingConfig::from_json("{ not json").is_err());
    }

    #[test]
    fn load_from_resolves_relative_assets() {
        let dir = std::env::temp_dir().join(format!("birthday-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            r#"{"music": "song.mp3", "fallback_music": "/abs/backup.mp3",
                "photos": [{"path": "a.jpg", "caption": "beach"}]}"#,
        )
        .unwrap();

        let config = GreetingConfig::load_from(&path).unwrap();
        assert_eq!(config.music, Some(dir.join("song.mp3")));
        assert_eq!(config.fallback_music, Some(PathBuf::from("/abs/backup.mp3")));
        assert_eq!(config.photos[0].path, dir.join("a.jpg"));
        assert_eq!(config.photos[0].caption.as_deref(), Some("beach"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_reports_read_error() {
        let err = GreetingConfig::load_from(Path::new("/nonexistent/greeting.json")).unwrap_err();
        assert!(matches!(err, GreetingError::ConfigRead { .. }));
    }
}
