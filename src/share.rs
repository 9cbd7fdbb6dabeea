use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ShareError;

/// Fixed text shown by the share sheet
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareSettings {
    pub dialog_title: String,
}

impl Default for ShareSettings {
    fn default() -> Self {
        ShareSettings {
            dialog_title: "Partager l'image de la blague".to_string(),
        }
    }
}

/// What gets handed to the platform share capability
#[derive(Clone, Debug, PartialEq)]
pub struct ShareRequest {
    pub path: PathBuf,
    pub mime_type: &'static str,
    pub dialog_title: String,
    /// Uniform type identifier, e.g. `public.png`
    pub type_identifier: &'static str,
}

/// How a share attempt ended. None of these stop the exported image from
/// being displayed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    /// The device has no share capability; not an error
    Unavailable,
    Failed,
}

/// The platform's native share capability
#[async_trait]
pub trait ShareSheet: Send + Sync {
    async fn is_available(&self) -> bool;

    async fn share(&self, request: &ShareRequest) -> Result<(), ShareError>;
}

/// Shares by handing the file to the desktop's default application for it
#[derive(Clone, Debug, Default)]
pub struct SystemShare;

#[async_trait]
impl ShareSheet for SystemShare {
    async fn is_available(&self) -> bool {
        has_graphical_session()
    }

    async fn share(&self, request: &ShareRequest) -> Result<(), ShareError> {
        tracing::info!(
            path = %request.path.display(),
            mime_type = request.mime_type,
            uti = request.type_identifier,
            "{}",
            request.dialog_title
        );
        open::that_detached(&request.path)?;
        Ok(())
    }
}

#[cfg(any(target_os = "macos", target_os = "windows"))]
fn has_graphical_session() -> bool {
    true
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn has_graphical_session() -> bool {
    ["DISPLAY", "WAYLAND_DISPLAY"]
        .iter()
        .any(|var| std::env::var_os(var).is_some_and(|v| !v.is_empty()))
}

/// A device without any share capability
#[derive(Clone, Debug, Default)]
pub struct NullShare;

#[async_trait]
impl ShareSheet for NullShare {
    async fn is_available(&self) -> bool {
        false
    }

    async fn share(&self, _request: &ShareRequest) -> Result<(), ShareError> {
        Err(ShareError::Io(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "sharing is not available",
        )))
    }
}
