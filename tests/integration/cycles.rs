//! Circular dependency detection.

use tplinc_cli::core::{CompileError, CompileErrorKind};
use tplinc_cli::test_utils::TemplateProject;

use super::compile_file;

#[tokio::test]
async fn test_cycle_back_to_root_names_the_root() {
    let project = TemplateProject::new()
        .file("root.tpl", "#include a.tpl\n")
        .file("a.tpl", "#include b.tpl\n")
        .file("b.tpl", "#include root.tpl\n");

    let err = compile_file(&project.path("root.tpl")).await.unwrap_err();
    assert_eq!(err.kind(), CompileErrorKind::Circular);

    let CompileError::CircularDependency {
        location,
        chain,
        ..
    } = &err
    else {
        panic!("expected a circular dependency, got {err:?}");
    };
    assert_eq!(location, &project.canonical("root.tpl"));
    assert_eq!(
        chain,
        &vec![
            project.canonical("root.tpl"),
            project.canonical("a.tpl"),
            project.canonical("b.tpl"),
            project.canonical("root.tpl"),
        ]
    );
    assert_eq!(err.referrer(), project.canonical("b.tpl").as_path());
}

#[tokio::test]
async fn test_self_include() {
    let project = TemplateProject::new()
        .file("root.tpl", "top\n#include loop.tpl\n")
        .file("loop.tpl", "#include ./loop.tpl\n");

    let err = compile_file(&project.path("root.tpl")).await.unwrap_err();
    assert_eq!(err.kind(), CompileErrorKind::Circular);
    assert!(err.to_string().contains("loop.tpl"));
}

#[tokio::test]
async fn test_conditional_cycle_is_still_an_error() {
    let project = TemplateProject::new()
        .file("root.tpl", "#include a.tpl if never\n")
        .file("a.tpl", "#include b.tpl if never\n")
        .file("b.tpl", "#include a.tpl\n");

    let err = compile_file(&project.path("root.tpl")).await.unwrap_err();
    assert_eq!(err.kind(), CompileErrorKind::Circular);
}

#[tokio::test]
async fn test_cycle_through_different_spellings() {
    let project = TemplateProject::new()
        .file("root.tpl", "#include parts/a.tpl\n")
        .file("parts/a.tpl", "#include ../parts/./b.tpl\n")
        .file("parts/b.tpl", "#include a.tpl\n");

    let err = compile_file(&project.path("root.tpl")).await.unwrap_err();
    assert_eq!(err.kind(), CompileErrorKind::Circular);
}

#[tokio::test]
async fn test_repeated_include_is_not_a_cycle() {
    let project = TemplateProject::new()
        .file("root.tpl", "#include a.tpl\n#include a.tpl\n#include b.tpl\n")
        .file("a.tpl", "A")
        .file("b.tpl", "#include a.tpl\n");

    let module = compile_file(&project.path("root.tpl")).await.unwrap();
    assert_eq!(module, "module.exports = (options) => `AAA`");
}
