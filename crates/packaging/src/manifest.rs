use serde::{Deserialize, Serialize};

/// Plugin manifest as read by the Stream Deck host application. Field names
/// and order are part of the bundle format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Manifest {
    pub actions: Vec<ManifestAction>,
    #[serde(rename = "SDKVersion")]
    pub sdk_version: u32,
    pub version: String,
    pub author: String,
    pub description: String,
    pub category: String,
    pub icon: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManifestAction {
    #[serde(rename = "UUID")]
    pub uuid: String,
    pub name: String,
    pub tooltip: String,
    pub icon: String,
    pub states: Vec<ActionState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActionState {
    pub image: String,
    pub title: String,
    pub show_title: bool,
}

impl Manifest {
    /// The single toggle action with its online and invisible states.
    pub fn steam_status_toggle() -> Self {
        let name = "Steam Status Toggle".to_string();
        Self {
            actions: vec![ManifestAction {
                uuid: "com.yourname.steamstatustoggle".into(),
                name: name.clone(),
                tooltip: "Toggle Steam Status".into(),
                icon: "images/online".into(),
                states: vec![
                    ActionState {
                        image: "images/online".into(),
                        title: "Online".into(),
                        show_title: false,
                    },
                    ActionState {
                        image: "images/invisible".into(),
                        title: "Invisible".into(),
                        show_title: false,
                    },
                ],
            }],
            sdk_version: 2,
            version: "1.0".into(),
            author: "Your Name".into(),
            description: "A plugin to toggle Steam status between Online and Invisible.".into(),
            category: "Utility".into(),
            icon: "images/online".into(),
            name,
        }
    }

    /// Two-space indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
#[path = "tests/manifest_tests.rs"]
mod tests;
