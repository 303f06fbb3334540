#[cfg(test)]
#[path = "native_test.rs"]
mod tests;

use anyhow::Result;
use async_trait::async_trait;

use super::shell;
use super::shell::ShellOptions;
use super::templates;
use super::Exporter;
use crate::domain::models::Artifact;
use crate::domain::models::ArtifactFile;
use crate::domain::models::ExportInput;
use crate::domain::models::ExportTarget;

const DEFAULT_ARGB: &str = "0xFF4F46E5";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NativeFlavor {
    Flutter,
    Android,
}

impl NativeFlavor {
    fn target(&self) -> ExportTarget {
        match self {
            NativeFlavor::Flutter => return ExportTarget::Flutter,
            NativeFlavor::Android => return ExportTarget::Android,
        }
    }

    /// Where the web shell lives inside the generated project.
    pub fn web_root(&self) -> &'static str {
        match self {
            NativeFlavor::Flutter => return "assets/www",
            NativeFlavor::Android => return "app/src/main/assets/www",
        }
    }
}

/// Lowercase identifier safe for Dart packages and Java package segments.
pub fn package_name(name: &str) -> String {
    let mut out = String::new();
    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }

    let out = out.trim_end_matches('_').to_string();
    if out.is_empty() {
        return "app".to_string();
    }
    if out.starts_with(|ch: char| return ch.is_ascii_digit()) {
        return format!("app_{out}");
    }

    return out;
}

pub fn application_id(name: &str) -> String {
    return format!("com.screenforge.{}", package_name(name));
}

/// `#rrggbb` (or `#rgb`) as an opaque Dart color literal.
pub fn argb_literal(color: &str) -> String {
    let hex = color.trim().trim_start_matches('#');
    let hex = match hex.len() {
        3 => hex.chars().flat_map(|ch| return [ch, ch]).collect::<String>(),
        6 => hex.to_string(),
        _ => return DEFAULT_ARGB.to_string(),
    };

    if !hex.chars().all(|ch| return ch.is_ascii_hexdigit()) {
        return DEFAULT_ARGB.to_string();
    }

    return format!("0xFF{}", hex.to_uppercase());
}

fn escape_dart(text: &str) -> String {
    return text
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('$', "\\$")
        .replace('\n', " ");
}

fn escape_double_quoted(text: &str) -> String {
    return text
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', " ");
}

fn escape_android_string(text: &str) -> String {
    return text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\'', "\\'")
        .replace('"', "\\\"");
}

fn nest(root: &str, files: Vec<ArtifactFile>) -> Vec<ArtifactFile> {
    return files
        .into_iter()
        .map(|file| return ArtifactFile::new(&format!("{root}/{}", file.path), file.contents))
        .collect();
}

fn flutter_project(input: &ExportInput) -> Result<Vec<ArtifactFile>> {
    let title = input.display_name();
    let package = package_name(&title);

    return Ok(vec![
        ArtifactFile::new(
            "pubspec.yaml",
            templates::render(
                "flutter/pubspec.yaml",
                &[
                    ("PACKAGE", &package),
                    ("DESCRIPTION", &escape_double_quoted(input.description)),
                ],
            )?,
        ),
        ArtifactFile::new(
            "lib/main.dart",
            templates::render(
                "flutter/main.dart",
                &[
                    ("TITLE", &escape_dart(&title)),
                    ("THEME_COLOR_ARGB", &argb_literal(input.theme_color)),
                ],
            )?,
        ),
    ]);
}

fn android_project(input: &ExportInput) -> Result<Vec<ArtifactFile>> {
    let title = input.display_name();
    let app_id = application_id(&title);
    let source_dir = format!("app/src/main/java/{}", app_id.replace('.', "/"));

    return Ok(vec![
        ArtifactFile::new(
            "settings.gradle",
            templates::render(
                "android/settings.gradle",
                &[("TITLE", &escape_double_quoted(&title))],
            )?,
        ),
        ArtifactFile::new(
            "build.gradle",
            templates::render("android/build.gradle", &[])?,
        ),
        ArtifactFile::new(
            "app/build.gradle",
            templates::render("android/app_build.gradle", &[("APPLICATION_ID", &app_id)])?,
        ),
        ArtifactFile::new(
            "app/src/main/AndroidManifest.xml",
            templates::render("android/AndroidManifest.xml", &[])?,
        ),
        ArtifactFile::new(
            &format!("{source_dir}/MainActivity.kt"),
            templates::render("android/MainActivity.kt", &[("APPLICATION_ID", &app_id)])?,
        ),
        ArtifactFile::new(
            "app/src/main/res/values/strings.xml",
            templates::render(
                "android/strings.xml",
                &[("TITLE", &escape_android_string(&title))],
            )?,
        ),
    ]);
}

/// Thin native project that loads the static shell from bundled assets.
pub struct NativeExporter {
    flavor: NativeFlavor,
}

impl NativeExporter {
    pub fn new(flavor: NativeFlavor) -> NativeExporter {
        return NativeExporter { flavor };
    }

    fn usage(&self) -> &'static str {
        match self.flavor {
            NativeFlavor::Flutter => return "Run `flutter create .` inside this folder to add the platform runners, then `flutter run`.",
            NativeFlavor::Android => return "Open the folder in Android Studio, or run `gradle assembleDebug` with a local Gradle install.",
        }
    }
}

#[async_trait]
impl Exporter for NativeExporter {
    fn target(&self) -> ExportTarget {
        return self.flavor.target();
    }

    #[allow(clippy::implicit_return)]
    async fn export<'a>(&self, input: &ExportInput<'a>) -> Result<Artifact> {
        let mut files = match self.flavor {
            NativeFlavor::Flutter => flutter_project(input)?,
            NativeFlavor::Android => android_project(input)?,
        };

        let web = shell::web_assets(input, &ShellOptions::default())?;
        files.extend(nest(self.flavor.web_root(), web));

        let target = self.flavor.target();
        let readme = shell::usage_note(input, &target.to_string(), &files, self.usage())?;
        files.push(ArtifactFile::new("README.txt", readme));

        return Ok(Artifact::Files { target, files });
    }
}
