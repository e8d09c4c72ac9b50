use std::ffi::OsString;

use pydock_core::SecretRegistry;
use secrecy::SecretString;

fn fake_env(key: &str) -> Option<OsString> {
    match key {
        "PATH" => Some(OsString::from("/usr/bin:/bin")),
        "HOME" => Some(OsString::from("/home/builder")),
        _ => None,
    }
}

#[test]
fn empty_registry_has_no_args() {
    let secrets = SecretRegistry::new();

    assert!(secrets.is_empty());
    assert!(secrets.to_build_engine_args().is_empty());
}

#[test]
fn empty_registry_environment_has_only_inherited_and_buildkit() {
    let secrets = SecretRegistry::new();
    let env = secrets.process_environment_with(fake_env);

    let keys: Vec<&str> = env.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["PATH", "HOME", "DOCKER_BUILDKIT"]);
}

#[test]
fn args_reference_env_by_name_never_by_value() {
    let mut secrets = SecretRegistry::new();
    secrets.register("INDEX_PASSWORD", SecretString::from("supersecret"));

    let args = secrets.to_build_engine_args();

    assert_eq!(args, vec!["--secret", "id=INDEX_PASSWORD,env=INDEX_PASSWORD"]);
    assert!(args.iter().all(|a| !a.contains("supersecret")));
}

#[test]
fn args_are_ordered_by_name() {
    let mut secrets = SecretRegistry::new();
    secrets.register("ZETA", SecretString::from("z"));
    secrets.register("ALPHA", SecretString::from("a"));

    assert_eq!(
        secrets.to_build_engine_args(),
        vec!["--secret", "id=ALPHA,env=ALPHA", "--secret", "id=ZETA,env=ZETA"]
    );
    assert_eq!(secrets.names().collect::<Vec<_>>(), vec!["ALPHA", "ZETA"]);
}

#[test]
fn environment_carries_secret_values_under_their_names() {
    let mut secrets = SecretRegistry::new();
    secrets.register("INDEX_PASSWORD", SecretString::from("supersecret"));

    let env = secrets.process_environment_with(fake_env);

    assert!(env.contains(&(
        "INDEX_PASSWORD".to_owned(),
        OsString::from("supersecret")
    )));
    assert!(env.contains(&("PATH".to_owned(), OsString::from("/usr/bin:/bin"))));
    assert!(env.contains(&("DOCKER_BUILDKIT".to_owned(), OsString::from("1"))));
    assert!(!env.iter().any(|(k, _)| k == "USER"));
}

#[test]
fn register_same_name_replaces_value() {
    let mut secrets = SecretRegistry::new();
    secrets.register("TOKEN", SecretString::from("old"));
    secrets.register("TOKEN", SecretString::from("new"));

    assert_eq!(secrets.len(), 1);
    let env = secrets.process_environment_with(|_| None);
    assert!(env.contains(&("TOKEN".to_owned(), OsString::from("new"))));
}

#[test]
fn debug_output_lists_names_only() {
    let mut secrets = SecretRegistry::new();
    secrets.register("INDEX_PASSWORD", SecretString::from("supersecret"));

    let debug = format!("{secrets:?}");
    assert!(debug.contains("INDEX_PASSWORD"));
    assert!(!debug.contains("supersecret"));
}
