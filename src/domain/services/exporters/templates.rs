#[cfg(test)]
#[path = "templates_test.rs"]
mod tests;

use anyhow::anyhow;
use anyhow::Result;
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "assets/templates/"]
struct Templates;

/// Renders an embedded template, substituting `{{KEY}}` placeholders in a
/// single pass. Substituted values are never rescanned, and unknown keys are
/// left as they are.
pub fn render(name: &str, vars: &[(&str, &str)]) -> Result<String> {
    let file = Templates::get(name).ok_or_else(|| return anyhow!("Missing template {name}"))?;
    let source = String::from_utf8(file.data.into_owned())?;

    return Ok(substitute(&source, vars));
}

pub fn substitute(source: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let end = match after.find("}}") {
            Some(end) => end,
            None => {
                out.push_str(&rest[start..]);
                return out;
            }
        };

        let key = &after[..end];
        match vars.iter().find(|(name, _)| return *name == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    return out;
}
