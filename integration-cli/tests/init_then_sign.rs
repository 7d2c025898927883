use common_token_auth::{AuthError, IntegrationAuth};
use integration_cli::{commands, init};
use serde_json::Value;

#[test]
fn template_settings_sign_tokens_but_trust_nobody() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(init::DEFAULT_ENV_FILE);
    init::write_template(&path, false).expect("write template");

    dotenvy::from_path_override(&path).expect("load template");
    let auth = IntegrationAuth::from_env().expect("template parses");
    assert_eq!(auth.config().secret(), init::PLACEHOLDER_SECRET);
    assert_eq!(auth.config().origin(), init::PLACEHOLDER_ORIGIN);
    assert_eq!(auth.config().allowed_origins().count(), 0);
    assert_eq!(auth.config().leeway().num_seconds(), 0);

    let token = commands::sign(&auth, "cli", None, None, None).expect("sign");
    let claims = auth.codec.verify(&token, None).expect("signature checks out");
    assert_eq!(claims.origin, init::PLACEHOLDER_ORIGIN);

    let err = commands::verify(&auth, &token, None).expect_err("empty allow-list");
    assert!(matches!(
        err.downcast_ref::<AuthError>(),
        Some(AuthError::OriginNotAllowed(_))
    ));

    std::env::set_var("INTEGRATION_API_ALLOWED_ORIGINS", init::PLACEHOLDER_ORIGIN);
    let trusting = IntegrationAuth::from_env().expect("env config");
    let printed = commands::verify(&trusting, &token, None).expect("now accepted");
    let raw: Value = serde_json::from_str(&printed).expect("claims json");
    assert_eq!(raw["iss"], Value::from("cli"));
}
