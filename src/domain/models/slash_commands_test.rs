use super::SlashCommand;

#[test]
fn it_parse_empty_string() {
    let text = "";
    assert!(SlashCommand::parse(text).is_none());
}
#[test]
fn it_parse_space_only() {
    let text = " ";
    assert!(SlashCommand::parse(text).is_none());
}
#[test]
fn it_parse_single_slash() {
    let text = "/";
    assert!(SlashCommand::parse(text).is_none());
}
#[test]
fn it_parse_invalid_prefix() {
    let text = "!q";
    assert!(SlashCommand::parse(text).is_none());
}
#[test]
fn it_parse_prompt_text() {
    let text = "add a dark mode toggle";
    assert!(SlashCommand::parse(text).is_none());
}
#[test]
fn it_parse_valid_prefix() {
    let text = "/q";
    let cmd = SlashCommand::parse(text);
    assert!(cmd.is_some());
    assert_eq!(cmd.unwrap().command, "/q");
}

#[test]
fn it_is_quit() {
    for text in ["/q", "/quit", "/exit"] {
        let cmd = SlashCommand::parse(text).unwrap();
        assert!(cmd.is_quit());
    }
}
#[test]
fn it_is_not_is_quit() {
    let cmd = SlashCommand::parse("/help").unwrap();
    assert!(!cmd.is_quit());
}

#[test]
fn it_is_export_with_target() {
    let cmd = SlashCommand::parse("/export  pwa").unwrap();
    assert!(cmd.is_export());
    assert_eq!(cmd.args, vec!["pwa".to_string()]);
}
#[test]
fn it_is_short_export() {
    let cmd = SlashCommand::parse("/e static").unwrap();
    assert!(cmd.is_export());
}

#[test]
fn it_is_build() {
    let cmd = SlashCommand::parse("/build").unwrap();
    assert!(cmd.is_build());
    assert!(!cmd.is_cancel_build());
}
#[test]
fn it_is_cancel_build() {
    let cmd = SlashCommand::parse("/cb").unwrap();
    assert!(cmd.is_cancel_build());
    assert!(!cmd.is_build());
}

#[test]
fn it_is_retry() {
    let cmd = SlashCommand::parse("/r").unwrap();
    assert!(cmd.is_retry());
}

#[test]
fn it_is_show_with_index() {
    let cmd = SlashCommand::parse("/show 3").unwrap();
    assert!(cmd.is_show());
    assert_eq!(cmd.args, vec!["3".to_string()]);
}
#[test]
fn it_is_not_show_without_index() {
    assert!(SlashCommand::parse("/show").is_none());
}

#[test]
fn it_is_navigation() {
    assert!(SlashCommand::parse("/next").unwrap().is_next());
    assert!(SlashCommand::parse("/p").unwrap().is_prev());
    assert!(SlashCommand::parse("/screens").unwrap().is_screens());
}

#[test]
fn it_is_skip() {
    let cmd = SlashCommand::parse("/skip").unwrap();
    assert!(cmd.is_skip());
}
