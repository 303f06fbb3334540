use super::ChatLog;
use super::ChatMessage;
use super::Role;

fn log_with(count: usize) -> ChatLog {
    let mut log = ChatLog::default();
    for idx in 0..count {
        let role = if idx % 2 == 0 {
            Role::User
        } else {
            Role::Assistant
        };
        log.push(ChatMessage::new(role, &format!("message {idx}"), 0));
    }

    return log;
}

#[test]
fn it_executes_new() {
    let msg = ChatMessage::new(Role::User, "Hi there!", 2);
    assert_eq!(msg.role, Role::User);
    assert_eq!(msg.content, "Hi there!");
    assert_eq!(msg.version, 2);
    assert!(!msg.is_provisional());
}

#[test]
fn it_counts_user_turns() {
    let log = log_with(5);
    assert_eq!(log.user_turns(), 3);
    assert_eq!(log.last_user_prompt(), Some("message 4".to_string()));
}

#[test]
fn it_bounds_trailing_window() {
    let log = log_with(5);
    let trailing = log.trailing(2);

    assert_eq!(trailing.len(), 2);
    assert_eq!(trailing[0].content, "message 3");
    assert_eq!(trailing[1].content, "message 4");
    assert_eq!(log.trailing(50).len(), 5);
    assert!(log.trailing(0).is_empty());
}

#[test]
fn it_skips_provisional_in_trailing_window() {
    let mut log = log_with(1);
    log.push(ChatMessage::provisional(0));

    let trailing = log.trailing(10);
    assert_eq!(trailing.len(), 1);
    assert_eq!(trailing[0].role, Role::User);
}

#[test]
fn it_finalizes_provisional_once() {
    let mut log = log_with(1);
    log.push(ChatMessage::provisional(0));

    let finalized = log.finalize_last("Created 5 screens.", 1).unwrap();
    assert_eq!(finalized.content, "Created 5 screens.");
    assert_eq!(finalized.version, 1);
    assert!(!finalized.is_provisional());

    assert!(log.finalize_last("again", 2).is_none());
    assert_eq!(log.len(), 2);
}

#[test]
fn it_serializes_roles_lowercase() {
    let msg = ChatMessage::new(Role::Assistant, "ok", 0);
    let json = serde_json::to_string(&msg).unwrap();
    assert!(json.contains("\"role\":\"assistant\""));
    assert!(!json.contains("model"));
}
