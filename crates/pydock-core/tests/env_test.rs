use pydock_core::{EnvVar, Error, parse_env_vars, parse_list};
use proptest::prelude::*;

fn pairs(vars: &[EnvVar]) -> Vec<(&str, &str)> {
    vars.iter()
        .map(|v| (v.name.as_str(), v.value.as_str()))
        .collect()
}

// ── parse_env_vars ──

#[test]
fn parses_single_mapping() {
    let vars = parse_env_vars(&["blub=bla"]).unwrap();
    assert_eq!(pairs(&vars), vec![("blub", "bla")]);
}

#[test]
fn parses_multiple_mappings_in_order() {
    let vars = parse_env_vars(&["blub=bla", "hello=world"]).unwrap();
    assert_eq!(pairs(&vars), vec![("blub", "bla"), ("hello", "world")]);
}

#[test]
fn parses_empty_list() {
    let vars = parse_env_vars::<&str>(&[]).unwrap();
    assert!(vars.is_empty());
}

#[test]
fn value_keeps_everything_after_first_equals() {
    let vars = parse_env_vars(&["blub=bla=fizz"]).unwrap();
    assert_eq!(pairs(&vars), vec![("blub", "bla=fizz")]);
}

#[test]
fn value_may_be_empty() {
    let vars = parse_env_vars(&["blub="]).unwrap();
    assert_eq!(pairs(&vars), vec![("blub", "")]);
}

#[test]
fn rejects_missing_name() {
    let err = parse_env_vars(&["=bla"]).unwrap_err();
    assert!(matches!(err, Error::InvalidEnvVar { ref entry } if entry == "=bla"));
}

#[test]
fn rejects_missing_equals() {
    assert!(matches!(
        parse_env_vars(&["blablub"]),
        Err(Error::InvalidEnvVar { .. })
    ));
}

#[test]
fn rejects_illegal_name_characters() {
    assert!(parse_env_vars(&["%=illegal"]).is_err());
    assert!(parse_env_vars(&["1ABC=x"]).is_err());
    assert!(parse_env_vars(&["A-B=x"]).is_err());
}

#[test]
fn rejects_multiline_value() {
    assert!(parse_env_vars(&["A=line1\nline2"]).is_err());
}

#[test]
fn one_bad_entry_fails_whole_list() {
    assert!(parse_env_vars(&["ok=1", "blablub", "fine=2"]).is_err());
}

// ── parse_list ──

#[test]
fn list_splits_on_spaces() {
    assert_eq!(parse_list("gcc libpq-dev"), vec!["gcc", "libpq-dev"]);
}

#[test]
fn list_splits_on_lines_when_multiline() {
    assert_eq!(
        parse_list("\n  requests >= 2\n  flask\n"),
        vec!["requests >= 2", "flask"]
    );
}

#[test]
fn list_drops_blank_items() {
    assert!(parse_list("   ").is_empty());
    assert_eq!(parse_list("a   b"), vec!["a", "b"]);
}

// ── Properties ──

proptest! {
    #[test]
    fn valid_mappings_round_trip(
        name in "[A-Za-z_][A-Za-z0-9_]{0,15}",
        value in "[^\n\r]{0,32}",
    ) {
        let entry = format!("{name}={value}");
        let vars = parse_env_vars(&[entry]).unwrap();
        prop_assert_eq!(vars.len(), 1);
        prop_assert_eq!(&vars[0].name, &name);
        prop_assert_eq!(&vars[0].value, &value);
    }

    #[test]
    fn entries_without_equals_are_rejected(entry in "[A-Za-z0-9_ %-]{0,24}") {
        prop_assert!(parse_env_vars(&[entry]).is_err());
    }

    #[test]
    fn names_with_leading_digit_are_rejected(
        name in "[0-9][A-Za-z0-9_]{0,8}",
        value in "[a-z]{0,8}",
    ) {
        let entry = format!("{name}={value}");
        prop_assert!(parse_env_vars(&[entry]).is_err());
    }

    #[test]
    fn list_items_are_trimmed_and_non_empty(raw in "[a-z \n]{0,40}") {
        for item in parse_list(&raw) {
            prop_assert!(!item.is_empty());
            prop_assert_eq!(item.trim(), item.as_str());
        }
    }
}
