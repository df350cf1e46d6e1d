use conjoint_cli::{cli, run};
use conjoint_test_utils::{COIN_TOML, VIGNETTE_TOML};
use std::fs;
use std::path::Path;

fn run_args(args: &[&str]) -> anyhow::Result<String> {
    let matches = cli().try_get_matches_from(args)?;
    let mut out = Vec::new();
    run(&matches, &mut out)?;
    Ok(String::from_utf8(out)?)
}

fn write_config(dir: &Path, body: &str) -> String {
    let path = dir.join("experiment.toml");
    fs::write(&path, body).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_generate_unique_coin() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), COIN_TOML);

    let output = run_args(&["conjoint", "generate", "--config", config.as_str(), "--count", "2", "--unique"]).unwrap();

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(output.contains("Coin=Heads"));
    assert!(output.contains("Coin=Tails"));
}

#[test]
fn test_generate_json_is_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), VIGNETTE_TOML);
    let args = ["conjoint", "generate", "--config", config.as_str(), "--seed", "9", "--json"];

    let first = run_args(&args).unwrap();
    let second = run_args(&args).unwrap();

    assert_eq!(first, second);
    let parsed: serde_json::Value = serde_json::from_str(&first).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 12);
}

#[test]
fn test_session_then_render() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), VIGNETTE_TOML);
    let store = dir.path().join("embedded.json");
    let store = store.to_string_lossy().into_owned();

    let first = run_args(&["conjoint", "session", "--config", config.as_str(), "--store", store.as_str()]).unwrap();
    let second = run_args(&["conjoint", "session", "--config", config.as_str(), "--store", store.as_str()]).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.lines().count(), 12);

    let stored: serde_json::Value = serde_json::from_str(&fs::read_to_string(&store).unwrap()).unwrap();
    assert!(stored.get("profiles").is_some());
    assert!(stored.get("profile12_Offense").is_some());

    let html = run_args(&["conjoint", "render", "--config", config.as_str(), "--store", store.as_str()]).unwrap();
    assert!(html.contains("<th>Profile 12</th>"));
}

#[test]
fn test_render_template_leaves_bad_targets() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), VIGNETTE_TOML);
    let store = dir.path().join("embedded.json");
    let store = store.to_string_lossy().into_owned();
    let template = dir.path().join("page.txt");
    fs::write(&template, "{{profile.99.Race}}").unwrap();

    run_args(&["conjoint", "session", "--config", config.as_str(), "--store", store.as_str()]).unwrap();
    let page = run_args(&[
        "conjoint",
        "render",
        "--config",
        config.as_str(),
        "--store",
        store.as_str(),
        "--template",
        &*template.to_string_lossy(),
    ])
    .unwrap();

    assert_eq!(page, "{{profile.99.Race}}");
}

#[test]
fn test_render_without_stored_set_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), VIGNETTE_TOML);
    let store = dir.path().join("empty.json");

    let err = run_args(&["conjoint", "render", "--config", config.as_str(), "--store", &*store.to_string_lossy()])
        .unwrap_err();
    assert!(err.to_string().contains("no profile set stored"));
}
