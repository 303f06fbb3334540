#[cfg(test)]
#[path = "merge_test.rs"]
mod tests;

use crate::domain::models::AppModel;
use crate::domain::models::CompletePayload;
use crate::domain::models::Screen;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub appended: Vec<usize>,
    pub replaced: Vec<usize>,
    pub unchanged: Vec<usize>,
    pub is_update: bool,
}

impl MergeReport {
    pub fn has_changes(&self) -> bool {
        return !self.appended.is_empty() || !self.replaced.is_empty();
    }

    pub fn summary(&self, model: &AppModel) -> String {
        if self.is_update {
            if !self.has_changes() {
                return "No screens changed.".to_string();
            }

            let names = self
                .replaced
                .iter()
                .chain(self.appended.iter())
                .filter_map(|idx| return model.screens.get(*idx))
                .map(|screen| return screen.name.to_string())
                .collect::<Vec<String>>();

            return format!("Updated screens: {}.", names.join(", "));
        }

        let names = model
            .screens
            .iter()
            .map(|screen| return screen.name.to_string())
            .collect::<Vec<String>>();

        return format!(
            "Created {} screens for {}: {}.",
            self.appended.len(),
            model.display_name(),
            names.join(", ")
        );
    }
}

fn apply_metadata(model: &mut AppModel, payload: &CompletePayload) -> bool {
    let mut changed = false;

    if let Some(name) = &payload.app_name {
        if !name.trim().is_empty() && model.name != *name {
            model.name = name.to_string();
            changed = true;
        }
    }
    if let Some(description) = &payload.description {
        if !description.trim().is_empty() && model.description != *description {
            model.description = description.to_string();
            changed = true;
        }
    }
    if payload.blueprint.is_some() && model.blueprint != payload.blueprint {
        model.blueprint = payload.blueprint.clone();
        changed = true;
    }

    return changed;
}

/// Appends generated screens in the order returned and resets the current
/// screen to the entry screen.
pub fn apply_generation(model: &mut AppModel, payload: &CompletePayload) -> MergeReport {
    let mut report = MergeReport::default();
    let metadata_changed = apply_metadata(model, payload);

    for screen in payload.screens.iter() {
        report.appended.push(model.screens.len());
        model.screens.push(Screen::new(&screen.name, &screen.content));
    }

    model.set_current_index(0);
    if report.has_changes() || metadata_changed {
        model.version += 1;
    }

    return report;
}

/// Replaces screens by index. Identical content is left untouched, and
/// screens missing from the payload are never removed.
pub fn apply_update(model: &mut AppModel, payload: &CompletePayload) -> MergeReport {
    let mut report = MergeReport {
        is_update: true,
        ..MergeReport::default()
    };
    let metadata_changed = apply_metadata(model, payload);

    for (idx, incoming) in payload.screens.iter().enumerate() {
        if idx >= model.screens.len() {
            let mut screen = Screen::new(&incoming.name, &incoming.content);
            screen.recently_changed = true;
            model.screens.push(screen);
            report.appended.push(idx);
            continue;
        }

        let existing = &mut model.screens[idx];
        if existing.content == incoming.content {
            report.unchanged.push(idx);
            continue;
        }

        if !incoming.name.trim().is_empty() {
            existing.name = incoming.name.to_string();
        }
        existing.content = incoming.content.to_string();
        existing.recently_changed = true;
        report.replaced.push(idx);
    }

    let current = model.current_index();
    model.set_current_index(current);
    if report.has_changes() || metadata_changed {
        model.version += 1;
    }

    return report;
}

/// Placeholder inserted when a first-time generation fails, so there is
/// always a screen to look at and a prompt to retry.
pub fn fallback_screen(prompt: &str) -> Screen {
    let escaped = prompt
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");

    let content = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Welcome</title>
</head>
<body style="font-family: system-ui, sans-serif; padding: 24px; text-align: center;">
<h1>We hit a snag</h1>
<p>Your app could not be generated this time. Retry to try again.</p>
<blockquote>{escaped}</blockquote>
</body>
</html>"#
    );

    return Screen::new("Welcome", &content);
}
