//! Tests for the `tplinc` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tplinc_cli::test_utils::TemplateProject;

fn tplinc(project: &TemplateProject) -> Command {
    let mut cmd = Command::cargo_bin("tplinc").unwrap();
    cmd.current_dir(project.root())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("TPLINC_CONFIG");
    cmd
}

fn site() -> TemplateProject {
    TemplateProject::new()
        .file("index.tpl", "<body>\n#include header.tpl\n#include debug.tpl if debug\n</body>\n")
        .file("header.tpl", "<h1>${options.title}</h1>\n")
        .file("debug.tpl", "#include header.tpl\n<pre/>\n")
}

#[test]
fn test_compile_to_stdout() {
    let project = site();

    tplinc(&project)
        .args(["compile", "index.tpl"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("module.exports = (options) => `<body>\n"))
        .stdout(predicate::str::contains("${options.debug?`<h1>${options.title}</h1>\n<pre/>\n`:\"\"}"))
        .stdout(predicate::str::contains("#include").not())
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_compile_with_output_and_dep_file() {
    let project = site();

    tplinc(&project)
        .args(["compile", "index.tpl", "-o", "dist/index.js", "--dep-file", "dist/index.d"])
        .args(["--format", "esm"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert!(project.read("dist/index.js").starts_with("export default (options) => `"));

    let deps = project.read("dist/index.d");
    assert!(deps.starts_with("dist/index.js: "));
    assert!(deps.contains("index.tpl"));
    assert!(deps.contains("header.tpl"));
    assert!(deps.contains("debug.tpl"));
    assert_eq!(deps.matches("header.tpl").count(), 1);
}

#[test]
fn test_dep_file_requires_output() {
    let project = site();

    tplinc(&project)
        .args(["compile", "index.tpl", "--dep-file", "index.d"])
        .assert()
        .failure();
}

#[test]
fn test_render_with_options() {
    let project = site();

    tplinc(&project)
        .args(["render", "index.tpl", "--options", r#"{"debug": true}"#])
        .assert()
        .success()
        .stdout("<body>\n<h1>${options.title}</h1>\n<h1>${options.title}</h1>\n<pre/>\n</body>\n");

    tplinc(&project)
        .args(["render", "index.tpl"])
        .assert()
        .success()
        .stdout("<body>\n<h1>${options.title}</h1>\n</body>\n");
}

#[test]
fn test_render_rejects_non_object_options() {
    let project = site();

    tplinc(&project)
        .args(["render", "index.tpl", "--options", "[true]"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error: Invalid render options"));
}

#[test]
fn test_tree_output() {
    let project = site();

    tplinc(&project)
        .args(["tree", "index.tpl"])
        .assert()
        .success()
        .stdout(predicate::str::contains("├── header.tpl"))
        .stdout(predicate::str::contains("└── debug.tpl if debug"))
        .stdout(predicate::str::contains("    └── header.tpl (*)"))
        .stdout(predicate::str::contains("(*) = included above"));

    tplinc(&project)
        .args(["tree", "index.tpl", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"condition\": \"debug\""));
}

#[test]
fn test_config_discovery() {
    let project = site()
        .file("tplinc.toml", "[resolve]\npaths = [\"shared\"]\nextensions = [\"tpl\"]\n\n[output]\nformat = \"function\"\noptions-ident = \"o\"\n")
        .file("pages/about.tpl", "#include footer\n")
        .file("shared/footer.tpl", "${o.year}");

    tplinc(&project)
        .args(["compile", "pages/about.tpl"])
        .assert()
        .success()
        .stdout("(o) => `${o.year}`");
}

#[test]
fn test_explicit_config_must_exist() {
    let project = site();

    tplinc(&project)
        .args(["--config", "missing.toml", "compile", "index.tpl"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn test_unresolved_reference_fails_without_output() {
    let project = TemplateProject::new()
        .file("index.tpl", "before\n#include headr.tpl\n")
        .file("header.tpl", "H");

    tplinc(&project)
        .args(["compile", "index.tpl", "-o", "out.js"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error: Could not resolve 'headr.tpl'"))
        .stderr(predicate::str::contains("header.tpl"));

    assert!(!project.path("out.js").exists());
}

#[test]
fn test_cycle_reports_include_chain() {
    let project = TemplateProject::new()
        .file("index.tpl", "#include a.tpl\n")
        .file("a.tpl", "#include index.tpl\n");

    tplinc(&project)
        .args(["compile", "index.tpl"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Circular dependency"))
        .stderr(predicate::str::contains("index.tpl -> "))
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_invalid_condition_reports_construct() {
    let project = TemplateProject::new()
        .file("index.tpl", "#include x.tpl if enabled()\n")
        .file("x.tpl", "X");

    tplinc(&project)
        .args(["compile", "index.tpl"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid condition 'enabled()'"));
}

#[test]
fn test_missing_root_template() {
    let project = TemplateProject::new();

    tplinc(&project)
        .args(["compile", "nope.tpl"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("nope.tpl"));
}
