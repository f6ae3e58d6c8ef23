use pretty_assertions::assert_eq;
use scene_core::SceneValue;
use scene_parser::{
    ParserError, parse_config_file, parse_documents_file, parse_schema_file,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_reference_schema_file() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../schemas/scene_schema.json");
    let schema = parse_schema_file(&path).unwrap();

    assert_eq!(schema.len(), 21);
    assert_eq!(schema[0].name, "SceneID");

    let camera = schema.iter().find(|f| f.name == "Camera").unwrap();
    assert_eq!(camera.subfields.len(), 6);

    let echo = schema.iter().find(|f| f.name == "EchoScene").unwrap();
    assert_eq!(echo.input_format.as_deref(), Some("SceneID reference"));
    assert_eq!(echo.metadata.priority.as_deref(), Some("high if used"));
}

#[test]
fn test_yaml_schema_and_documents() {
    let dir = TempDir::new().unwrap();
    let schema = write(
        &dir,
        "schema.yml",
        r#"
fields:
  - name: SceneID
    type: string
    required: true
  - name: Dialogue
    type: object
    fields:
      - name: Subtitles
        type: boolean
"#,
    );
    let scenes = write(
        &dir,
        "scenes.yaml",
        r#"
- SceneID: intro
  Dialogue:
    Subtitles: true
- SceneID: outro
"#,
    );

    let schema = parse_schema_file(&schema).unwrap();
    assert_eq!(schema[1].subfields[0].field_type, "boolean");

    let documents = parse_documents_file(&scenes).unwrap();
    assert_eq!(documents.len(), 2);
    let keys: Vec<&str> = documents[0].fields().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["SceneID", "Dialogue"]);
    assert_eq!(
        documents[0].lookup("Dialogue.Subtitles"),
        vec![&SceneValue::Bool(true)]
    );
}

#[test]
fn test_config_file_formats() {
    let dir = TempDir::new().unwrap();
    let toml = write(&dir, "scenecheck.toml", "strict = true\nworkers = 1\n");
    let json = write(&dir, "scenecheck.json", r#"{ "include_advisories": false }"#);

    let from_toml = parse_config_file(&toml).unwrap();
    assert!(from_toml.strict);
    assert_eq!(from_toml.workers, Some(1));

    let from_json = parse_config_file(&json).unwrap();
    assert!(!from_json.include_advisories);
    assert!(!from_json.strict);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let result = parse_documents_file(&dir.path().join("absent.json"));
    assert!(matches!(result, Err(ParserError::IoError(_))));
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "scenes.csv", "SceneID\nintro\n");
    assert!(matches!(
        parse_documents_file(&path),
        Err(ParserError::UnsupportedFormat(ext)) if ext == "csv"
    ));
}
