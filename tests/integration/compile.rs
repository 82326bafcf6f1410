//! Splicing, diamonds and request coalescing.

use std::path::Path;
use std::time::Duration;

use serde_json::json;
use tplinc_cli::compiler::Compiler;
use tplinc_cli::directive::contains_directive;
use tplinc_cli::host::{FsHost, MemoryHost};
use tplinc_cli::test_utils::TemplateProject;
use tplinc_cli::tree::TreeBuilder;

use super::{compile_file, expand_file};

#[tokio::test]
async fn test_template_without_directives_is_wrapped_unchanged() {
    let project = TemplateProject::new().file("plain.tpl", "Hello ${options.name}!\n");

    let module = compile_file(&project.path("plain.tpl")).await.unwrap();
    assert_eq!(module, "module.exports = (options) => `Hello ${options.name}!\n`");
}

#[tokio::test]
async fn test_nested_relative_includes() {
    let project = TemplateProject::new()
        .file("pages/index.tpl", "<html>\n#include ../partials/head.tpl\n<body/>\n</html>\n")
        .file("partials/head.tpl", "<head>\n#include meta/charset.tpl\n</head>\n")
        .file("partials/meta/charset.tpl", "<meta charset=\"utf-8\">\n");

    let expansion = expand_file(&project.path("pages/index.tpl")).await.unwrap();
    assert_eq!(
        expansion.render(&json!({})),
        "<html>\n<head>\n<meta charset=\"utf-8\">\n</head>\n<body/>\n</html>\n"
    );
}

#[tokio::test]
async fn test_diamond_inclusion_expands_at_both_sites() {
    let project = TemplateProject::new()
        .file("root.tpl", "#include left.tpl\n#include right.tpl\n")
        .file("left.tpl", "L:\n#include shared.tpl\n")
        .file("right.tpl", "R:\n#include shared.tpl\n")
        .file("shared.tpl", "S\n");

    let host = FsHost::new();
    let root = tplinc_cli::compiler::load_root(&project.path("root.tpl")).await.unwrap();
    let compiler = Compiler::new(host);
    let expansion = compiler.expand(&root.text, &root.context, &root.location).await.unwrap();

    assert_eq!(expansion.render(&json!({})), "L:\nS\nR:\nS\n");
    let mut deps = compiler.host().dependencies();
    deps.sort();
    assert_eq!(
        deps,
        vec![project.canonical("left.tpl"), project.canonical("right.tpl"), project.canonical("shared.tpl")]
    );
}

#[tokio::test]
async fn test_search_paths_and_extensions() {
    let project = TemplateProject::new()
        .file("src/index.tpl", "#include banner\n")
        .file("shared/banner.tpl", "*** banner ***\n");

    let host = FsHost::new()
        .with_search_paths(vec![project.path("shared")])
        .with_extensions(["tpl"]);
    let root = tplinc_cli::compiler::load_root(&project.path("src/index.tpl")).await.unwrap();
    let expansion = Compiler::new(host)
        .expand(&root.text, &root.context, &root.location)
        .await
        .unwrap();

    assert_eq!(expansion.render(&json!({})), "*** banner ***\n");
}

#[tokio::test]
async fn test_output_never_contains_directives() {
    let project = TemplateProject::new()
        .file("root.tpl", "#include a.tpl if x\r\n#include a.tpl\r\ntail")
        .file("a.tpl", "#include b.tpl if !x\n#include b.tpl\n")
        .file("b.tpl", "b\n");

    let module = compile_file(&project.path("root.tpl")).await.unwrap();
    assert!(!contains_directive(&module));

    let expansion = expand_file(&project.path("root.tpl")).await.unwrap();
    for options in [json!({ "x": true }), json!({ "x": false })] {
        assert!(!contains_directive(&expansion.render(&options)));
    }
    assert_eq!(expansion.render(&json!({ "x": true })), "b\nb\ntail");
    assert_eq!(expansion.render(&json!({ "x": false })), "b\nb\ntail");
}

#[tokio::test]
async fn test_concurrent_references_share_one_read() {
    let host = MemoryHost::new()
        .with_read_delay(Duration::from_millis(10))
        .with_file("/site/a.tpl", "#include common.tpl\n")
        .with_file("/site/b.tpl", "#include common.tpl\n")
        .with_file("/site/c.tpl", "#include common.tpl\n")
        .with_file("/site/common.tpl", "common\n");

    let builder = TreeBuilder::new(&host);
    let tree = builder
        .build(
            "#include a.tpl\n#include b.tpl\n#include c.tpl\n#include common.tpl\n",
            Path::new("/site"),
            Path::new("/site/index.tpl"),
        )
        .await
        .unwrap();

    assert_eq!(tree.nodes().len(), 7);
    assert_eq!(host.read_count("/site/common.tpl"), 1);
    assert_eq!(host.total_reads(), 4);
    assert_eq!(builder.cache().len(), 4);
}

#[tokio::test]
async fn test_siblings_keep_source_order() {
    let mut host = MemoryHost::new().with_read_delay(Duration::from_millis(5));
    let mut root = String::new();
    for i in 0..12 {
        host = host.with_file(format!("/p/{i}.tpl"), format!("{i},"));
        root.push_str(&format!("#include {i}.tpl\n"));
    }

    let expansion = Compiler::new(host)
        .expand(&root, Path::new("/p"), Path::new("/p/root.tpl"))
        .await
        .unwrap();
    assert_eq!(expansion.render(&json!({})), "0,1,2,3,4,5,6,7,8,9,10,11,");
}
