use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use shared::{domain::PresenceState, error::ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconImage {
    path: PathBuf,
    bytes: Vec<u8>,
}

impl IconImage {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// The two button images, read once when accepted and served from memory
/// afterwards.
#[derive(Debug, Clone)]
pub struct IconStore {
    online: IconImage,
    invisible: IconImage,
}

impl IconStore {
    /// Both files must exist and be readable; otherwise nothing is built.
    pub async fn load(
        online: impl AsRef<Path>,
        invisible: impl AsRef<Path>,
    ) -> Result<Self, ValidationError> {
        let online = read_icon(PresenceState::Online, online.as_ref()).await?;
        let invisible = read_icon(PresenceState::Invisible, invisible.as_ref()).await?;
        Ok(Self { online, invisible })
    }

    /// All-or-nothing: on error the current icons are kept.
    pub async fn replace(
        &mut self,
        online: impl AsRef<Path>,
        invisible: impl AsRef<Path>,
    ) -> Result<(), ValidationError> {
        *self = Self::load(online, invisible).await?;
        Ok(())
    }

    pub fn image(&self, state: PresenceState) -> &IconImage {
        match state {
            PresenceState::Online => &self.online,
            PresenceState::Invisible => &self.invisible,
        }
    }
}

async fn read_icon(state: PresenceState, path: &Path) -> Result<IconImage, ValidationError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(IconImage {
            path: path.to_path_buf(),
            bytes,
        }),
        Err(err) if err.kind() == ErrorKind::NotFound => Err(ValidationError::MissingIcon {
            state,
            path: path.to_path_buf(),
        }),
        Err(source) => Err(ValidationError::UnreadableIcon {
            state,
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
#[path = "tests/icons_tests.rs"]
mod tests;
