use std::{fs, path::PathBuf, sync::Arc};

use life_the_game::{
    advance,
    draw::{self, App, TextRenderer},
    pattern, GridError, LoadError, Session,
};

fn fixture(name: &str, content: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("life_the_game-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

const BOOK: &str = r#"{
    "test1": [[1, 0, 0, 1], [0, 1, 1, 0], [1, 1, 0, 1], [1, 1, 0, 1]],
    "blinker": [[0, 0, 0], [1, 1, 1], [0, 0, 0]],
    "broken": [[1, 0], [1, 0, 1]]
}"#;

#[test]
fn loads_named_pattern() {
    let path = fixture("book.json", BOOK);
    let g = pattern::load(&path, pattern::DEFAULT_PATTERN).unwrap();

    assert_eq!((g.height(), g.width()), (4, 4));
    let next = advance(&g);
    assert_eq!(next.get(1, 0), Ok(false));
    assert_eq!(next.get(0, 1), Ok(true));
}

#[test]
fn missing_pattern_is_reported() {
    let path = fixture("book_missing.json", BOOK);
    let err = pattern::load(&path, "glider").unwrap_err();

    assert!(matches!(err, LoadError::PatternNotFound { ref name, .. } if name == "glider"));
    assert!(err.to_string().contains("glider"));
}

#[test]
fn malformed_pattern_is_rejected() {
    let path = fixture("book_broken.json", BOOK);
    let err = pattern::load(&path, "broken").unwrap_err();
    assert!(matches!(
        err,
        LoadError::Grid(GridError::MalformedPattern { .. })
    ));
}

#[test]
fn unreadable_file_is_reported() {
    let path = std::env::temp_dir().join("life_the_game-does-not-exist.json");
    let err = pattern::load_from(Some(path), "test1").unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
}

#[test]
fn plain_run_of_loaded_blinker() {
    let path = fixture("book_run.json", BOOK);
    let g = pattern::load(&path, "blinker").unwrap();

    let mut r = TextRenderer::new(Vec::new());
    draw::run(Arc::new(App::new(Session::new(g), Some(1), 0)), &mut r).unwrap();

    let out = String::from_utf8(r.into_inner()).unwrap();
    assert_eq!(out, "Initial board\n...\n@@@\n...\nRun 1\n.@.\n.@.\n.@.\n");
}
