use serde_derive::Deserialize;
use serde_derive::Serialize;
use strum::EnumIter;
use strum::EnumVariantNames;

use super::AppModel;
use super::BuildJob;
use super::Screen;

#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumVariantNames,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "kebab-case")]
pub enum ExportTarget {
    Static,
    Pwa,
    Flutter,
    Android,
    MiniApp,
    Apk,
}

impl ExportTarget {
    pub fn description(&self) -> &'static str {
        match self {
            ExportTarget::Static => return "Static HTML bundle with a swipeable navigation shell",
            ExportTarget::Pwa => return "Installable web app with an offline cache worker",
            ExportTarget::Flutter => return "Flutter project wrapping the screens in a web view",
            ExportTarget::Android => return "Android Gradle project with a thin WebView shell",
            ExportTarget::MiniApp => return "Single reduced-chrome document for chat host embedding",
            ExportTarget::Apk => return "Cloud compiled Android APK, tracked as a build job",
        }
    }
}

/// Everything an exporter reads from the app.
pub struct ExportInput<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub screens: &'a [Screen],
    pub theme_color: &'a str,
}

impl<'a> ExportInput<'a> {
    pub fn from_model(model: &'a AppModel, theme_color: &'a str) -> ExportInput<'a> {
        return ExportInput {
            name: &model.name,
            description: &model.description,
            screens: &model.screens,
            theme_color,
        };
    }

    pub fn display_name(&self) -> String {
        if self.name.trim().is_empty() {
            return "Untitled App".to_string();
        }

        return self.name.trim().to_string();
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactFile {
    pub path: String,
    pub contents: String,
}

impl ArtifactFile {
    pub fn new(path: &str, contents: String) -> ArtifactFile {
        return ArtifactFile {
            path: path.to_string(),
            contents,
        };
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Artifact {
    Files {
        target: ExportTarget,
        files: Vec<ArtifactFile>,
    },
    /// Produced asynchronously by a remote build, see the build poller.
    Pending(BuildJob),
}

impl Artifact {
    pub fn file(&self, path: &str) -> Option<&ArtifactFile> {
        if let Artifact::Files { files, .. } = self {
            return files.iter().find(|file| return file.path == path);
        }

        return None;
    }
}
