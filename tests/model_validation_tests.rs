use content_gate::{
    models::{LoginRequest, Plan, Role, Session},
    preferences::{Preferences, Theme},
    routes::classifier::RouteClass,
};
use uuid::Uuid;

#[test]
fn test_session_json_shape() {
    let session = Session {
        sub: Uuid::from_u128(9),
        email: "a@example.com".to_string(),
        name: "A".to_string(),
        role: Role::Moderator,
        email_verified: false,
        plan: Plan::Premium,
        super_admin: false,
    };

    let json = serde_json::to_value(&session).unwrap();
    assert_eq!(json["role"], "moderator");
    assert_eq!(json["plan"], "premium");
    assert_eq!(json["email_verified"], false);
}

#[test]
fn test_session_without_plan_defaults_to_free() {
    // Tokens issued before plans existed carry no `plan` or `super_admin` claim.
    let session: Session = serde_json::from_value(serde_json::json!({
        "sub": Uuid::from_u128(9),
        "email": "a@example.com",
        "name": "A",
        "role": "admin",
        "email_verified": true
    }))
    .unwrap();

    assert_eq!(session.plan, Plan::Free);
    assert!(!session.super_admin);
    assert!(session.is_admin());
}

#[test]
fn test_session_with_unknown_role_is_rejected() {
    let parsed = serde_json::from_value::<Session>(serde_json::json!({
        "sub": Uuid::from_u128(9),
        "email": "a@example.com",
        "name": "A",
        "role": "owner",
        "email_verified": true
    }));
    assert!(parsed.is_err());
}

#[test]
fn test_login_request_reads_camel_case_callback() {
    let request: LoginRequest = serde_json::from_str(
        r#"{"email":"a@example.com","password":"pw","callbackUrl":"/billing"}"#,
    )
    .unwrap();
    assert_eq!(request.callback_url.as_deref(), Some("/billing"));

    // Serialization omits an absent callback entirely.
    let request = LoginRequest {
        callback_url: None,
        ..request
    };
    let json = serde_json::to_string(&request).unwrap();
    assert!(!json.contains("callbackUrl"));
}

#[test]
fn test_plan_tiers_are_ordered() {
    assert!(Plan::Free < Plan::Pro);
    assert!(Plan::Pro < Plan::Premium);
}

#[test]
fn test_route_class_serialization() {
    assert_eq!(
        serde_json::to_string(&RouteClass::AdminOnly).unwrap(),
        r#""admin_only""#
    );
}

#[test]
fn test_preferences_reject_bad_locale() {
    let prefs = Preferences {
        locale: "english".to_string(),
        theme: Theme::Dark,
    };
    assert!(prefs.validate().is_err());
    assert!(Preferences::default().validate().is_ok());
}
