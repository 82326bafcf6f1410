//! Conditional inclusion.

use serde_json::json;
use tplinc_cli::core::{CompileError, CompileErrorKind};
use tplinc_cli::test_utils::TemplateProject;

use super::{compile_file, expand_file};

#[tokio::test]
async fn test_guard_is_emitted_verbatim() {
    let project = TemplateProject::new()
        .file("root.tpl", "<nav>\n#include admin.tpl if user && (admin || !readonly)\n</nav>\n")
        .file("admin.tpl", "<a href=\"/admin\">admin</a>\n");

    let module = compile_file(&project.path("root.tpl")).await.unwrap();
    assert_eq!(
        module,
        "module.exports = (options) => `<nav>\n\
         ${(options.user&&(options.admin||!(options.readonly)))?`<a href=\"/admin\">admin</a>\n`:\"\"}\
         </nav>\n`"
    );
}

#[tokio::test]
async fn test_precedence_truth_table() {
    let project = TemplateProject::new()
        .file("root.tpl", "#include x.tpl if a && b || c\n")
        .file("x.tpl", "X");
    let expansion = expand_file(&project.path("root.tpl")).await.unwrap();

    for a in [false, true] {
        for b in [false, true] {
            for c in [false, true] {
                let expected = if (a && b) || c { "X" } else { "" };
                assert_eq!(
                    expansion.render(&json!({ "a": a, "b": b, "c": c })),
                    expected,
                    "a={a} b={b} c={c}"
                );
            }
        }
    }
}

#[tokio::test]
async fn test_comparisons_against_option_values() {
    let project = TemplateProject::new()
        .file("root.tpl", "#include prod.tpl if env === \"prod\" && tier >= 2\n")
        .file("prod.tpl", "P");
    let expansion = expand_file(&project.path("root.tpl")).await.unwrap();

    assert_eq!(expansion.render(&json!({ "env": "prod", "tier": 3 })), "P");
    assert_eq!(expansion.render(&json!({ "env": "prod", "tier": 1 })), "");
    assert_eq!(expansion.render(&json!({ "env": "dev", "tier": 3 })), "");
    assert_eq!(expansion.render(&json!({})), "");
}

#[tokio::test]
async fn test_guards_nest_through_files() {
    let project = TemplateProject::new()
        .file("root.tpl", "#include outer.tpl if a\n")
        .file("outer.tpl", "[\n#include inner.tpl if b\n]\n")
        .file("inner.tpl", "inner\n");
    let expansion = expand_file(&project.path("root.tpl")).await.unwrap();

    assert_eq!(expansion.render(&json!({ "a": true, "b": true })), "[\ninner\n]\n");
    assert_eq!(expansion.render(&json!({ "a": true })), "[\n]\n");
    assert_eq!(expansion.render(&json!({ "b": true })), "");
}

#[tokio::test]
async fn test_function_call_is_rejected() {
    let project = TemplateProject::new()
        .file("root.tpl", "#include x.tpl if enabled()\n")
        .file("x.tpl", "X");

    let err = compile_file(&project.path("root.tpl")).await.unwrap_err();
    assert_eq!(err.kind(), CompileErrorKind::ConditionParseFailure);

    let CompileError::ConditionParse {
        expression,
        reference,
        source,
        ..
    } = &err
    else {
        panic!("expected a condition error, got {err:?}");
    };
    assert_eq!(expression, "enabled()");
    assert_eq!(reference, "x.tpl");
    assert!(source.to_string().contains("function call"));
}

#[tokio::test]
async fn test_condition_errors_win_over_missing_files() {
    let project = TemplateProject::new().file("root.tpl", "#include missing.tpl if a &&\n");

    let err = compile_file(&project.path("root.tpl")).await.unwrap_err();
    assert_eq!(err.kind(), CompileErrorKind::ConditionParseFailure);
}

#[tokio::test]
async fn test_unresolved_reference_suggests_siblings() {
    let project = TemplateProject::new()
        .file("root.tpl", "ok\n#include headr.tpl\n")
        .file("header.tpl", "H");

    let err = compile_file(&project.path("root.tpl")).await.unwrap_err();
    assert_eq!(err.kind(), CompileErrorKind::Unresolved);
    assert_eq!(err.referrer(), project.canonical("root.tpl").as_path());

    let CompileError::UnresolvedReference {
        reference,
        suggestions,
        ..
    } = &err
    else {
        panic!("expected an unresolved reference, got {err:?}");
    };
    assert_eq!(reference, "headr.tpl");
    assert!(suggestions.iter().any(|s| s.ends_with("header.tpl")));
}
