use pydock_core::ProjectMeta;
use tempfile::TempDir;

#[test]
fn extracts_name_and_version_from_project_table() {
    let tmp = TempDir::new().unwrap();
    let toml = r#"
[project]
name = "my-api"
version = "1.2.3"
"#;
    std::fs::write(tmp.path().join("pyproject.toml"), toml).unwrap();

    let meta = ProjectMeta::from_pyproject_toml(tmp.path()).unwrap().unwrap();
    assert_eq!(meta.name, "my-api");
    assert_eq!(meta.version.as_deref(), Some("1.2.3"));
    assert_eq!(meta.image_name(), "my-api");
    assert_eq!(meta.image_tag().as_deref(), Some("1.2.3"));
}

#[test]
fn falls_back_to_poetry_table() {
    let tmp = TempDir::new().unwrap();
    let toml = r#"
[tool.poetry]
name = "poetry-app"
version = "0.3.0"
"#;
    std::fs::write(tmp.path().join("pyproject.toml"), toml).unwrap();

    let meta = ProjectMeta::from_pyproject_toml(tmp.path()).unwrap().unwrap();
    assert_eq!(meta.name, "poetry-app");
    assert_eq!(meta.version.as_deref(), Some("0.3.0"));
}

#[test]
fn image_tag_replaces_local_version_separator() {
    let meta = ProjectMeta {
        name: "app".to_owned(),
        version: Some("1.0.0+g1234abc".to_owned()),
    };

    assert_eq!(meta.image_tag().as_deref(), Some("1.0.0_g1234abc"));
}

#[test]
fn dynamic_version_has_no_tag() {
    let tmp = TempDir::new().unwrap();
    let toml = r#"
[project]
name = "dynamic"
dynamic = ["version"]
"#;
    std::fs::write(tmp.path().join("pyproject.toml"), toml).unwrap();

    let meta = ProjectMeta::from_pyproject_toml(tmp.path()).unwrap().unwrap();
    assert!(meta.version.is_none());
    assert!(meta.image_tag().is_none());
}

#[test]
fn none_when_no_pyproject() {
    let tmp = TempDir::new().unwrap();
    assert!(ProjectMeta::from_pyproject_toml(tmp.path()).unwrap().is_none());
}

#[test]
fn none_when_project_unnamed() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("pyproject.toml"),
        "[build-system]\nrequires = [\"setuptools\"]",
    )
    .unwrap();

    assert!(ProjectMeta::from_pyproject_toml(tmp.path()).unwrap().is_none());
}

#[test]
fn error_when_pyproject_invalid() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("pyproject.toml"), "[project\nname=").unwrap();

    let result = ProjectMeta::from_pyproject_toml(tmp.path());
    assert!(result.is_err());
    let err = result.unwrap_err().to_string();
    assert!(err.contains("pyproject.toml"));
}
