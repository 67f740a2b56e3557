//! End-to-end tests for Kiln.
//!
//! These build a small blog in a temporary directory and inspect the output
//! tree.

use std::{fs, path::Path};

use kiln_core::{Config, Guard, RuleDecl, Step};
use kiln_generator::{BuildError, Builder};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: impl AsRef<[u8]>) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, content).expect("write");
}

fn config() -> Config {
    Config::new("Test Blog", "https://blog.example.com")
}

fn blog() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path();

    write(
        root,
        "layouts/default.html",
        "<!doctype html><title>{{ title? }} | {{ site_title }}</title><body>{{ content }}</body>\n",
    );
    write(
        root,
        "layouts/article.html",
        "<article><h1>{{ title }}</h1>{{ content }}</article>",
    );

    write(root, "content/feed.erb", "<%= atom_feed %>\n");
    write(
        root,
        "content/articles/post-1.md",
        "---\ntitle: First Post\nkind: article\nstatus: published\ncreated_at: 2024-03-01\nsummary: The first one\n---\n\
         Hello *world*.\n\n\
         :::note\nNotes render as asides.\n:::\n\n\
         :::hidden Spoiler\nThe butler did it.\n:::\n",
    );
    write(
        root,
        "content/articles/post-2.md",
        "---\ntitle: Second Post\nkind: article\nstatus: draft\ncreated_at: 2024-04-01\n---\nNot yet.\n",
    );
    write(root, "content/about.html", "---\ntitle: About\n---\n<p>About me</p>\n");
    write(root, "content/style.css", "body { color: #333; }\n");
    write(root, "content/images/dot.gif", [0x47u8, 0x49, 0x46, 0x38, 0x39, 0x61, 0x00, 0xff]);

    dir
}

fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join("output").join(relative)).expect("read output")
}

#[test]
fn test_blog_scenario() {
    let dir = blog();
    let root = dir.path();

    let stats = Builder::new(config(), root).build().expect("build");
    assert_eq!(stats.compiled, 3);
    assert_eq!(stats.suppressed, 1);
    assert_eq!(stats.passthrough, 2);

    let out = root.join("output");
    assert!(out.join("feed.xml").is_file());
    assert!(out.join("articles/post-1/index.html").is_file());
    assert!(out.join("about/index.html").is_file());
    assert!(!out.join("articles/post-2").exists());
    assert!(!out.join("feed.erb").exists());
}

#[test]
fn test_article_is_filtered_and_wrapped() {
    let dir = blog();
    let root = dir.path();
    Builder::new(config(), root).build().expect("build");

    let html = read(root, "articles/post-1/index.html");
    assert!(html.starts_with("<!doctype html><title>First Post | Test Blog</title>"));
    assert!(html.contains("<body><article><h1>First Post</h1>"));
    assert!(html.contains("<em>world</em>"));
    assert!(html.contains("<aside class=\"note\">"));
    assert!(html.contains("<p>Notes render as asides.</p>"));
    assert!(html.contains("class=\"hidden-block\""));
    assert!(html.contains(">Spoiler</button>"));
    assert!(html.contains("<p>The butler did it.</p>"));
    assert!(!html.contains(":::"));
}

#[test]
fn test_html_page_uses_default_layout() {
    let dir = blog();
    let root = dir.path();
    Builder::new(config(), root).build().expect("build");

    let html = read(root, "about/index.html");
    assert!(html.starts_with("<!doctype html><title>About | Test Blog</title>"));
    assert!(html.contains("<p>About me</p>"));
    assert!(!html.contains("<article>"));
}

#[test]
fn test_feed_lists_published_articles_only() {
    let dir = blog();
    let root = dir.path();
    Builder::new(config(), root).build().expect("build");

    let feed = read(root, "feed.xml");
    assert!(feed.contains("<rss"));
    assert!(feed.contains("First Post"));
    assert!(feed.contains("https://blog.example.com/articles/post-1/"));
    assert!(!feed.contains("Second Post"));
    assert!(!feed.contains("About"));
}

#[test]
fn test_passthrough_is_byte_identical() {
    let dir = blog();
    let root = dir.path();
    Builder::new(config(), root).build().expect("build");

    let out = root.join("output");
    assert_eq!(
        fs::read(out.join("images/dot.gif")).expect("read"),
        fs::read(root.join("content/images/dot.gif")).expect("read")
    );
    assert_eq!(
        fs::read(out.join("style.css")).expect("read"),
        fs::read(root.join("content/style.css")).expect("read")
    );
}

#[test]
fn test_publishing_a_draft() {
    let dir = blog();
    let root = dir.path();
    write(
        root,
        "content/articles/post-2.md",
        "---\ntitle: Second Post\nkind: article\ncreated_at: 2024-04-01\n---\nNow out.\n",
    );

    Builder::new(config(), root).build().expect("build");

    assert!(root.join("output/articles/post-2/index.html").is_file());
    let feed = read(root, "feed.xml");
    let second = feed.find("Second Post").expect("second in feed");
    let first = feed.find("First Post").expect("first in feed");
    assert!(second < first, "newest article comes first");
}

#[test]
fn test_duplicate_output_is_rejected_before_writing() {
    let dir = blog();
    let root = dir.path();
    write(root, "content/about/index.html", "<p>Another about</p>\n");

    let err = Builder::new(config(), root).build().unwrap_err();
    match &err {
        BuildError::OutputConflict {
            path,
            first,
            second,
        } => {
            assert_eq!(path, "/about/index.html");
            assert_eq!(first, "/about.html");
            assert_eq!(second, "/about/index.html");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!root.join("output").exists());
}

#[test]
fn test_unknown_filter_aborts_before_writing() {
    let dir = blog();
    let root = dir.path();
    let mut config = config();
    config.rules = vec![RuleDecl::new("/**/*.md").step(Step::new("kramdown"))];

    let err = Builder::new(config, root).build().unwrap_err();
    assert!(err.is_configuration());
    assert!(!root.join("output").exists());
}

#[test]
fn test_unknown_layout_aborts_before_writing() {
    let dir = blog();
    let root = dir.path();
    let mut config = config();
    config.rules = vec![RuleDecl::new("/**/*.md").layout("/sidebar.*")];

    let err = Builder::new(config, root).build().unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("/sidebar.*"));
    assert!(!root.join("output").exists());
}

#[test]
fn test_rule_order_from_config() {
    let dir = blog();
    let root = dir.path();
    let mut config = config();
    // The catch-all comes first, so the draft guard below never applies.
    config.rules = vec![
        RuleDecl::new("/**/*.md").step(Step::new("markdown")),
        RuleDecl::new("/articles/**/*.md").guard(Guard::Draft),
    ];

    Builder::new(config, root).build().expect("build");

    let html = read(root, "articles/post-2/index.html");
    assert_eq!(html, "<p>Not yet.</p>\n");
}

#[test]
fn test_config_file_rules() {
    let dir = blog();
    let root = dir.path();
    write(
        root,
        "kiln.toml",
        r#"
[site]
title = "Configured"
base_url = "https://configured.example.com"

[[rules]]
pattern = "/articles/**/*.md"
guard = { type = "draft" }
steps = [{ filter = "markdown", options = { parse_block_html = true } }]
output = { type = "routed" }

[[rules]]
pattern = "/**/*.css"
output = { type = "skip" }
"#,
    );

    let config = Config::load(&root.join("kiln.toml")).expect("config");
    let stats = Builder::new(config, root).build().expect("build");

    let out = root.join("output");
    assert!(out.join("articles/post-1/index.html").is_file());
    assert!(!out.join("articles/post-2").exists());
    assert!(!out.join("style.css").exists());
    // feed.erb and about.html are unmatched now and copied as-is.
    assert!(out.join("feed.erb").is_file());
    assert!(out.join("about.html").is_file());
    assert_eq!(stats.suppressed, 2);
}

#[test]
fn test_text_assets_are_copied_byte_for_byte() {
    let dir = blog();
    let root = dir.path();
    let notes = "---\nkey: v\n---\n\nbody\n";
    let changelog = "---\nrelease notes\n---\n- fixed things\n";
    let legacy = [b'c', b'a', b'f', 0xe9, b'\n'];
    write(root, "content/notes.txt", notes);
    write(root, "content/changelog.txt", changelog);
    write(root, "content/legacy.txt", legacy);

    Builder::new(config(), root).build().expect("build");

    let out = root.join("output");
    assert_eq!(fs::read_to_string(out.join("notes.txt")).expect("read"), notes);
    assert_eq!(fs::read_to_string(out.join("changelog.txt")).expect("read"), changelog);
    assert_eq!(fs::read(out.join("legacy.txt")).expect("read"), legacy);
}

#[test]
fn test_unreadable_article_fails_before_writing() {
    let dir = blog();
    let root = dir.path();
    write(root, "content/articles/broken.md", "---\n- not\n- a mapping\n---\nBody\n");

    let err = Builder::new(config(), root).build().unwrap_err();
    assert!(err.to_string().contains("/articles/broken.md"));
    assert!(!root.join("output").exists());
}

#[test]
fn test_file_over_directory_conflict_keeps_previous_output() {
    let dir = blog();
    let root = dir.path();
    Builder::new(config(), root).build().expect("first build");

    write(root, "content/notes", [0u8, 1, 2]);
    write(root, "content/notes.md", "Some notes.\n");

    let err = Builder::new(config(), root).build().unwrap_err();
    match &err {
        BuildError::NestedOutput { path, nested, .. } => {
            assert_eq!(path, "/notes");
            assert_eq!(nested, "/notes/index.html");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(root.join("output/about/index.html").is_file());
}

#[test]
fn test_sample_site_builds() {
    let config_path = Path::new("../../site/kiln.toml");
    if !config_path.exists() {
        // Skip if running from different working directory
        return;
    }

    let config = Config::load(config_path).expect("Config should load");
    let out = TempDir::new().expect("tempdir");
    let stats = Builder::new(config, "../../site")
        .with_output_dir(out.path())
        .build()
        .expect("build");

    assert_eq!(stats.suppressed, 1);
    assert!(out.path().join("index.html").is_file());
    assert!(out.path().join("feed.xml").is_file());
    assert!(out.path().join("about/index.html").is_file());
    assert!(out.path().join("articles/post-1/index.html").is_file());
    assert!(out.path().join("js/hidden.js").is_file());
    assert!(!out.path().join("articles/post-2").exists());
}
