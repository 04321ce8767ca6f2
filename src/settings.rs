// Authoring settings: which video to play and how the component is labelled.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::ViewMode;

/// Author-configurable settings for one component instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSettings {
    #[serde(default = "default_display_name")]
    pub display_name: String,
    #[serde(default = "default_video_url")]
    pub video_url: String,
    #[serde(default = "default_video_id")]
    pub video_id: String,
    #[serde(default)]
    pub mode: ViewMode,
}

fn default_display_name() -> String {
    "Video Engagement Tracker".to_string()
}

fn default_video_url() -> String {
    "https://www.learningcontainer.com/wp-content/uploads/2020/05/sample-mp4-file.mp4".to_string()
}

fn default_video_id() -> String {
    "default_video".to_string()
}

impl Default for VideoSettings {
    fn default() -> Self {
        VideoSettings {
            display_name: default_display_name(),
            video_url: default_video_url(),
            video_id: default_video_id(),
            mode: ViewMode::default(),
        }
    }
}

/// Partial update posted by the authoring view. Absent fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub status: String,
    pub message: String,
}

impl VideoSettings {
    pub fn apply(&mut self, update: SettingsUpdate) -> SettingsResponse {
        if let Some(video_url) = update.video_url {
            self.video_url = video_url;
        }
        if let Some(display_name) = update.display_name {
            self.display_name = display_name;
        }

        info!(
            video_url = %self.video_url,
            display_name = %self.display_name,
            "settings saved"
        );

        SettingsResponse {
            status: "success".to_string(),
            message: "Settings saved.".to_string(),
        }
    }

    /// Studio mode renders the authoring view in place of the player.
    pub fn shows_authoring_view(&self) -> bool {
        self.mode == ViewMode::Studio
    }
}
