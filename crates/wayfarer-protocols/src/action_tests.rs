use super::*;

#[test]
fn test_navigate_round_trip() {
    let action = Action::Navigate {
        url: "https://example.com".to_string(),
    };
    let json = serde_json::to_value(&action).unwrap();
    assert_eq!(json["action"], "navigate");
    assert_eq!(json["url"], "https://example.com");

    let back: Action = serde_json::from_value(json).unwrap();
    assert_eq!(back, action);
}

#[test]
fn test_select_option_discriminator_is_camel_case() {
    let action = Action::SelectOption {
        selector: "select#qty".to_string(),
        values: vec!["2".to_string()],
    };
    let json = serde_json::to_value(&action).unwrap();
    assert_eq!(json["action"], "selectOption");
    assert_eq!(json["values"][0], "2");
}

#[test]
fn test_type_deserializes() {
    let json = serde_json::json!({
        "action": "type",
        "selector": "input#email",
        "text": "foo@bar.com"
    });
    let action: Action = serde_json::from_value(json).unwrap();
    assert_eq!(action.kind(), "type");
}

#[test]
fn test_unknown_discriminator_rejected() {
    let json = serde_json::json!({
        "action": "hover",
        "selector": "#menu"
    });
    let result: Result<Action, _> = serde_json::from_value(json);
    assert!(result.is_err());
}

#[test]
fn test_select_option_without_values_rejected() {
    let json = serde_json::json!({
        "action": "selectOption",
        "selector": "select#qty"
    });
    let result: Result<Action, _> = serde_json::from_value(json);
    assert!(result.is_err());
}

#[test]
fn test_kind_for_all_variants() {
    let press = Action::Press {
        key: "Enter".to_string(),
    };
    assert_eq!(press.kind(), "press");

    let click = Action::Click {
        selector: "#buy-now".to_string(),
    };
    assert_eq!(click.kind(), "click");
}
