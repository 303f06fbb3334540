#[cfg(test)]
#[path = "shell_test.rs"]
mod tests;

use anyhow::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_derive::Serialize;

use super::templates;
use crate::domain::models::slugify;
use crate::domain::models::ArtifactFile;
use crate::domain::models::ExportInput;
use crate::domain::models::Screen;

/// Horizontal drag distance, in CSS pixels, that switches screens.
pub const SWIPE_THRESHOLD_PX: u32 = 60;

pub const ICON_SIZES: [u32; 2] = [192, 512];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Chrome {
    /// Tab bar with every screen name.
    Full,
    /// Dot pager only, for embedding inside a host app.
    Reduced,
}

pub struct ShellOptions {
    pub chrome: Chrome,
    pub head_extra: String,
    pub body_extra: String,
}

impl Default for ShellOptions {
    fn default() -> ShellOptions {
        return ShellOptions {
            chrome: Chrome::Full,
            head_extra: "".to_string(),
            body_extra: "".to_string(),
        };
    }
}

pub fn escape_html(text: &str) -> String {
    return text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;");
}

fn is_full_document(content: &str) -> bool {
    let head = content.trim_start().as_bytes();
    return ["<!doctype", "<html"].iter().any(|prefix| {
        return head.len() >= prefix.len()
            && head[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes());
    });
}

/// A standalone HTML document for one screen. Fragments are wrapped in a
/// minimal document, full documents are kept as generated.
pub fn screen_document(screen: &Screen) -> String {
    if is_full_document(&screen.content) {
        return screen.content.to_string();
    }

    return format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n<title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(&screen.name),
        screen.content
    );
}

/// Byte offset of the last ASCII case-insensitive match of `needle`. The
/// offset always indexes into `haystack` itself.
fn rfind_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }

    return haystack
        .as_bytes()
        .windows(needle.len())
        .rposition(|window| return window.eq_ignore_ascii_case(needle));
}

fn with_bridge(document: &str, bridge: &str) -> String {
    if let Some(idx) = rfind_ignore_ascii_case(document, "</body>") {
        return format!("{}{}\n{}", &document[..idx], bridge, &document[idx..]);
    }

    return format!("{document}\n{bridge}");
}

/// Relative path of the standalone document for the screen at `index`.
pub fn screen_path(index: usize, screen: &Screen) -> String {
    return format!("screens/{:02}-{}.html", index + 1, slugify(&screen.name));
}

pub fn render_shell(input: &ExportInput, options: &ShellOptions) -> Result<String> {
    let bridge = templates::render("screen_bridge.html", &[])?;

    let frames = input
        .screens
        .iter()
        .enumerate()
        .map(|(idx, screen)| {
            let document = with_bridge(&screen_document(screen), bridge.trim_end());
            return format!(
                "<iframe class=\"screen\" data-index=\"{idx}\" title=\"{}\" srcdoc=\"{}\"></iframe>",
                escape_html(&screen.name),
                escape_html(&document)
            );
        })
        .collect::<Vec<String>>()
        .join("\n");

    let navigation = match options.chrome {
        Chrome::Full => {
            let buttons = input
                .screens
                .iter()
                .enumerate()
                .map(|(idx, screen)| {
                    return format!(
                        "<button type=\"button\" data-target=\"{idx}\">{}</button>",
                        escape_html(&screen.name)
                    );
                })
                .collect::<Vec<String>>()
                .join("\n");
            format!("<nav class=\"tabs\">\n{buttons}\n</nav>")
        }
        Chrome::Reduced => {
            let dots = input
                .screens
                .iter()
                .enumerate()
                .map(|(idx, screen)| {
                    return format!(
                        "<button type=\"button\" data-target=\"{idx}\" aria-label=\"{}\"></button>",
                        escape_html(&screen.name)
                    );
                })
                .collect::<Vec<String>>()
                .join("");
            format!("<div class=\"dots\">{dots}</div>")
        }
    };

    let chrome = match options.chrome {
        Chrome::Full => "full",
        Chrome::Reduced => "reduced",
    };

    let title = escape_html(&input.display_name());
    let description = escape_html(input.description);
    let theme_color = escape_html(input.theme_color);
    let threshold = SWIPE_THRESHOLD_PX.to_string();

    return templates::render(
        "shell.html",
        &[
            ("TITLE", &title),
            ("DESCRIPTION", &description),
            ("THEME_COLOR", &theme_color),
            ("CHROME", chrome),
            ("HEAD_EXTRA", &options.head_extra),
            ("BODY_EXTRA", &options.body_extra),
            ("SCREENS", &frames),
            ("NAVIGATION", &navigation),
            ("SWIPE_THRESHOLD", &threshold),
        ],
    );
}

#[derive(Serialize)]
struct ManifestIcon {
    src: String,
    sizes: String,
    #[serde(rename = "type")]
    mime: String,
    purpose: String,
}

#[derive(Serialize)]
struct Manifest {
    name: String,
    short_name: String,
    description: String,
    start_url: String,
    scope: String,
    display: String,
    orientation: String,
    theme_color: String,
    background_color: String,
    icons: Vec<ManifestIcon>,
}

pub fn short_name(name: &str) -> String {
    return name.chars().take(12).collect::<String>().trim().to_string();
}

pub fn icon_path(size: u32) -> String {
    return format!("icons/icon-{size}.svg");
}

pub fn render_manifest(input: &ExportInput) -> Result<String> {
    let name = input.display_name();
    let manifest = Manifest {
        short_name: short_name(&name),
        name,
        description: input.description.to_string(),
        start_url: "./index.html".to_string(),
        scope: "./".to_string(),
        display: "standalone".to_string(),
        orientation: "portrait".to_string(),
        theme_color: input.theme_color.to_string(),
        background_color: "#ffffff".to_string(),
        icons: ICON_SIZES
            .iter()
            .map(|size| {
                return ManifestIcon {
                    src: icon_path(*size),
                    sizes: format!("{size}x{size}"),
                    mime: "image/svg+xml".to_string(),
                    purpose: "any maskable".to_string(),
                };
            })
            .collect(),
    };

    return Ok(serde_json::to_string_pretty(&manifest)?);
}

pub fn render_icon(input: &ExportInput, size: u32) -> Result<String> {
    let letter = input
        .display_name()
        .chars()
        .find(|ch| return ch.is_alphanumeric())
        .map(|ch| return ch.to_uppercase().to_string())
        .unwrap_or_else(|| return "A".to_string());

    return templates::render(
        "icon.svg",
        &[
            ("SIZE", &size.to_string()),
            ("THEME_COLOR", &escape_html(input.theme_color)),
            ("LETTER", &escape_html(&letter)),
        ],
    );
}

pub fn icon_data_uri(input: &ExportInput, size: u32) -> Result<String> {
    let svg = render_icon(input, size)?;
    return Ok(format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg)));
}

/// Shell, standalone screens and icons shared by every web based target,
/// with paths relative to the web root.
pub fn web_assets(input: &ExportInput, options: &ShellOptions) -> Result<Vec<ArtifactFile>> {
    let mut files = vec![ArtifactFile::new("index.html", render_shell(input, options)?)];

    for (idx, screen) in input.screens.iter().enumerate() {
        files.push(ArtifactFile::new(
            &screen_path(idx, screen),
            screen_document(screen),
        ));
    }

    for size in ICON_SIZES {
        files.push(ArtifactFile::new(&icon_path(size), render_icon(input, size)?));
    }

    return Ok(files);
}

pub fn usage_note(
    input: &ExportInput,
    target: &str,
    files: &[ArtifactFile],
    usage: &str,
) -> Result<String> {
    let listing = files
        .iter()
        .map(|file| return format!("- {}", file.path))
        .collect::<Vec<String>>()
        .join("\n");

    let entry = input
        .screens
        .first()
        .map(|screen| return screen.name.to_string())
        .unwrap_or_default();

    return templates::render(
        "README.txt",
        &[
            ("TITLE", &input.display_name()),
            ("DESCRIPTION", input.description),
            ("TARGET", target),
            ("FILES", &listing),
            ("USAGE", usage),
            ("ENTRY", &entry),
        ],
    );
}
