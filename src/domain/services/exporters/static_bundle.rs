#[cfg(test)]
#[path = "static_bundle_test.rs"]
mod tests;

use anyhow::Result;
use async_trait::async_trait;

use super::shell;
use super::shell::ShellOptions;
use super::Exporter;
use crate::domain::models::Artifact;
use crate::domain::models::ArtifactFile;
use crate::domain::models::ExportInput;
use crate::domain::models::ExportTarget;

const USAGE: &str = "Open index.html in any browser, or upload the folder to a static host.";
const MANIFEST_FILE: &str = "manifest.json";

#[derive(Default)]
pub struct StaticExporter {}

#[async_trait]
impl Exporter for StaticExporter {
    fn target(&self) -> ExportTarget {
        return ExportTarget::Static;
    }

    #[allow(clippy::implicit_return)]
    async fn export<'a>(&self, input: &ExportInput<'a>) -> Result<Artifact> {
        let options = ShellOptions {
            head_extra: format!("<link rel=\"manifest\" href=\"{MANIFEST_FILE}\">"),
            ..ShellOptions::default()
        };

        let mut files = shell::web_assets(input, &options)?;
        files.push(ArtifactFile::new(
            MANIFEST_FILE,
            shell::render_manifest(input)?,
        ));

        let readme = shell::usage_note(input, "static", &files, USAGE)?;
        files.push(ArtifactFile::new("README.txt", readme));

        return Ok(Artifact::Files {
            target: ExportTarget::Static,
            files,
        });
    }
}
