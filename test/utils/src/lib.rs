use std::env;

pub fn insta_snapshot<F: FnOnce()>(f: F) {
    let mut settings = insta::Settings::clone_current();
    let snapshot_path = env::current_dir().unwrap().join("./test/snapshots");
    settings.set_snapshot_path(snapshot_path);
    settings.bind(f);
}

/// Screen names and bodies for a five screen fitness app, in entry order.
pub fn fitness_screens_fixture() -> Vec<(&'static str, String)> {
    return ["Home", "Workouts", "Progress", "Profile", "Settings"]
        .iter()
        .map(|name| {
            let body = format!(
                "<!DOCTYPE html>\n<html>\n<head><title>{name}</title></head>\n<body>\n<h1>{name}</h1>\n<p>{} screen</p>\n</body>\n</html>",
                name.to_lowercase()
            );
            return (*name, body);
        })
        .collect();
}

/// Joins JSON payloads into a server sent event body.
pub fn sse_body(payloads: &[String]) -> String {
    return payloads
        .iter()
        .map(|payload| {
            return format!("data: {payload}\n\n");
        })
        .collect::<Vec<String>>()
        .join("");
}
