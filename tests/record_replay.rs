//! Record-replay round-trip integration test.
//!
//! Records a full export against a real project directory, removes the
//! project, then replays the cassette and checks the export behaves the same
//! without touching disk.

use std::fs;
use std::path::Path;

use export_project::cassette::format::Cassette;
use export_project::context::ServiceContext;
use export_project::export::{self, Directories, ExportOptions};
use export_project::logger::Logger;

fn write(root: &Path, name: &str, contents: &str) {
    let path = root.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn sample_project(root: &Path) {
    write(root, "package.json", r#"{"name":"replayed","dependencies":{"dep":"^1.0.0"}}"#);
    write(
        root,
        "tsconfig.json",
        r#"{"compilerOptions":{"lib":["es5"],"types":["dep"]},"include":["./src/**/*.ts"]}"#,
    );
    write(root, ".dojorc", r#"{"build-app":{}}"#);
    write(root, "src/index.html", "<main></main>");
    write(root, "src/widgets/Button.ts", "export class Button {}");
    write(root, "node_modules/typescript/lib/lib.es5.d.ts", "interface Array<T> {}");
    write(root, "node_modules/dep/package.json", r#"{"typings":"dep.d.ts","peerDependencies":{"peer":"2"}}"#);
    write(root, "node_modules/dep/dep.d.ts", "export declare const dep: 1;");
    write(root, "node_modules/@types/node/index.d.ts", "declare var process: any;");
    write(root, "node_modules/@dojo/loader/interfaces.d.ts", "duplicate");
}

#[tokio::test]
async fn record_then_replay_produces_identical_exports() {
    let workspace = tempfile::tempdir().unwrap();
    let project = workspace.path().join("project");
    sample_project(&project);
    let cassette_path = workspace.path().join("cassettes").join("export.cassette.yaml");
    let dirs = Directories::new(workspace.path().to_path_buf(), Path::new("project"));
    let options = ExportOptions { verbose: true, ..ExportOptions::default() };

    // --- Phase 1: record a live export ---
    let recording = ServiceContext::recording(&dirs.project, &cassette_path, Logger::capturing(true));
    let recorded_path = export::run(&recording, &dirs, &options).await.expect("export succeeds");
    let mut recorded_log = recording.log.lines();
    recorded_log.sort();
    let written = fs::read_to_string(&recorded_path).unwrap();
    assert_eq!(recording.finish().unwrap(), Some(cassette_path.clone()));

    let cassette = Cassette::load(&cassette_path).unwrap();
    let recorded_write = cassette
        .interactions
        .iter()
        .find(|interaction| interaction.method == "write")
        .expect("bundle write recorded");
    assert_eq!(recorded_write.input["contents"], written.as_str());

    // --- Phase 2: replay with the project gone ---
    fs::remove_dir_all(&project).unwrap();
    fs::remove_file(&recorded_path).unwrap();

    let replaying = ServiceContext::replaying(&cassette_path, Logger::capturing(true)).unwrap();
    let replayed_path = export::run(&replaying, &dirs, &options).await;
    assert_eq!(replayed_path.as_deref(), Some(recorded_path.as_path()));
    // Concurrent phases may interleave their lines differently.
    let mut replayed_log = replaying.log.lines();
    replayed_log.sort();
    assert_eq!(replayed_log, recorded_log);
    assert!(!recorded_path.exists(), "replay must not write to disk");

    // --- Phase 3: the recorded bundle has the expected shape ---
    let bundle: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(bundle["index"], "./src/index.html");
    assert_eq!(bundle["dojorc"]["build-app"], serde_json::json!({}));
    assert_eq!(bundle["dependencies"]["production"]["peer"], "2");
    let environment: Vec<&str> = bundle["environmentFiles"]
        .as_array()
        .unwrap()
        .iter()
        .map(|file| file["name"].as_str().unwrap())
        .collect();
    assert_eq!(environment.len(), 4);
    assert_eq!(environment[0], "lib.es5.d.ts");
    assert!(environment.iter().all(|name| !name.ends_with("@dojo/loader/interfaces.d.ts")));
}
