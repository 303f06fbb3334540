mod cloud_apk;
mod mini_app;
mod native;
mod pwa;
pub mod shell;
mod static_bundle;
pub mod templates;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
pub use cloud_apk::*;
pub use mini_app::*;
pub use native::*;
pub use pwa::*;
pub use static_bundle::*;

use crate::domain::models::Artifact;
use crate::domain::models::BuilderError;
use crate::domain::models::ExportInput;
use crate::domain::models::ExportTarget;
use crate::domain::models::SharedBuildBackend;

#[async_trait]
pub trait Exporter {
    fn target(&self) -> ExportTarget;

    /// Produces the artifact for a non-empty screen set. Local targets are
    /// deterministic for a given input.
    async fn export<'a>(&self, input: &ExportInput<'a>) -> Result<Artifact>;
}

pub type BoxedExporter = Box<dyn Exporter + Send + Sync>;

pub struct ExporterManager {}

impl ExporterManager {
    /// The build backend is only needed for `ExportTarget::Apk`.
    pub fn get(
        target: ExportTarget,
        build_backend: Option<SharedBuildBackend>,
    ) -> Result<BoxedExporter> {
        match target {
            ExportTarget::Static => return Ok(Box::<StaticExporter>::default()),
            ExportTarget::Pwa => return Ok(Box::<PwaExporter>::default()),
            ExportTarget::Flutter => return Ok(Box::new(NativeExporter::new(NativeFlavor::Flutter))),
            ExportTarget::Android => return Ok(Box::new(NativeExporter::new(NativeFlavor::Android))),
            ExportTarget::MiniApp => return Ok(Box::<MiniAppExporter>::default()),
            ExportTarget::Apk => {
                if let Some(backend) = build_backend {
                    return Ok(Box::new(CloudApkExporter::new(backend)));
                }
                bail!(BuilderError::Validation(
                    "The apk target needs a build service, set build-url.".to_string()
                ));
            }
        }
    }
}

/// Runs the exporter for `target`, refusing to export an app without screens.
pub async fn export<'a>(
    target: ExportTarget,
    input: &ExportInput<'a>,
    build_backend: Option<SharedBuildBackend>,
) -> Result<Artifact> {
    if input.screens.is_empty() {
        bail!(BuilderError::Validation(
            "Nothing to export yet, generate some screens first.".to_string()
        ));
    }

    let exporter = ExporterManager::get(target, build_backend)?;
    tracing::info!(target = %target, screens = input.screens.len(), "Exporting app");

    return exporter.export(input).await;
}
