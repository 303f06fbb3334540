#[cfg(test)]
#[path = "app_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;

/// One navigable unit of generated content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    pub name: String,
    pub content: String,
    /// UI hint only. Cleared by `AppModel::settle_changes`.
    #[serde(skip)]
    pub recently_changed: bool,
}

impl Screen {
    pub fn new(name: &str, content: &str) -> Screen {
        return Screen {
            name: name.to_string(),
            content: content.to_string(),
            recently_changed: false,
        };
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlueprintEntity {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

/// Data and auth requirements the generation backend inferred for the app.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    #[serde(default)]
    pub entities: Vec<BlueprintEntity>,
    #[serde(default)]
    pub auth_required: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AppStatus {
    Draft,
    Ready,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppModel {
    pub id: String,
    pub name: String,
    pub description: String,
    pub screens: Vec<Screen>,
    pub blueprint: Option<Blueprint>,
    pub version: u32,
    current_index: usize,
}

impl AppModel {
    pub fn new(id: &str) -> AppModel {
        return AppModel {
            id: id.to_string(),
            ..AppModel::default()
        };
    }

    pub fn is_empty(&self) -> bool {
        return self.screens.is_empty();
    }

    pub fn status(&self) -> AppStatus {
        if self.screens.is_empty() {
            return AppStatus::Draft;
        }

        return AppStatus::Ready;
    }

    pub fn current_index(&self) -> usize {
        return self.current_index;
    }

    pub fn current_screen(&self) -> Option<&Screen> {
        return self.screens.get(self.current_index);
    }

    /// Moves to `index`, clamped to the available screens.
    pub fn set_current_index(&mut self, index: usize) {
        if self.screens.is_empty() {
            self.current_index = 0;
            return;
        }

        self.current_index = index.min(self.screens.len() - 1);
    }

    /// Moves the current screen by `delta`, clamped to `[0, count-1]`.
    pub fn navigate(&mut self, delta: isize) {
        let target = self.current_index as isize + delta;
        if target < 0 {
            self.set_current_index(0);
            return;
        }

        self.set_current_index(target as usize);
    }

    pub fn changed_indices(&self) -> Vec<usize> {
        return self
            .screens
            .iter()
            .enumerate()
            .filter_map(|(idx, screen)| {
                if screen.recently_changed {
                    return Some(idx);
                }
                return None;
            })
            .collect();
    }

    /// Clears all "recently changed" flags once the change has been shown.
    pub fn settle_changes(&mut self) {
        for screen in self.screens.iter_mut() {
            screen.recently_changed = false;
        }
    }

    pub fn display_name(&self) -> String {
        if self.name.trim().is_empty() {
            return "Untitled App".to_string();
        }

        return self.name.trim().to_string();
    }

    pub fn to_stored(&self) -> StoredApp {
        return StoredApp {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            screens: self.screens.clone(),
            blueprint: self.blueprint.clone(),
            version: self.version,
            status: self.status(),
            updated_at: chrono::Local::now()
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, false),
        };
    }

    pub fn from_stored(stored: StoredApp) -> AppModel {
        return AppModel {
            id: stored.id,
            name: stored.name,
            description: stored.description,
            screens: stored.screens,
            blueprint: stored.blueprint,
            version: stored.version,
            current_index: 0,
        };
    }
}

/// The document persisted to the backing store for one app.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredApp {
    pub id: String,
    pub name: String,
    pub description: String,
    pub screens: Vec<Screen>,
    #[serde(default)]
    pub blueprint: Option<Blueprint>,
    #[serde(default)]
    pub version: u32,
    pub status: AppStatus,
    pub updated_at: String,
}

/// Lowercase, dash separated form of `text` for file names, cache keys and
/// package identifiers.
pub fn slugify(text: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;

    for ch in text.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch.to_ascii_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        return "app".to_string();
    }

    return slug;
}
