//! # Text Pool Tests
//!
//! Loading message pools from literals, lists and files.

use dressbot::diagnostics::{Level, RecordingDiagnostics};
use dressbot::errors::PoolError;
use dressbot::text_pool::{
    produce_content_pool, ContentPool, FileRef, MessagePools, MessageSources, ParseMode,
    TextSource,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[cfg(test)]
mod tests {
    use super::*;

    fn file_source(path: impl Into<PathBuf>, parsemode: ParseMode) -> TextSource {
        TextSource::File(FileRef {
            path: path.into(),
            parsemode,
        })
    }

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    /// A list source comes back unchanged, empty strings included
    #[test]
    fn test_list_source_is_identity() {
        let items = vec!["one".to_string(), "".to_string(), " two ".to_string()];
        let pool =
            produce_content_pool("content", &TextSource::List(items.clone()), Path::new("."))
                .unwrap();
        assert_eq!(pool, items);
    }

    /// A literal source becomes a one-element pool
    #[test]
    fn test_literal_source_is_single_element() {
        let pool = produce_content_pool(
            "title",
            &TextSource::Literal("  spaced, with comma ".to_string()),
            Path::new("."),
        )
        .unwrap();
        assert_eq!(pool, vec!["  spaced, with comma ".to_string()]);
    }

    /// Text files are split on commas, trimmed, and empty pieces dropped
    #[test]
    fn test_text_file_split() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "content.txt", "a, b ,,c");

        let pool =
            produce_content_pool("content", &file_source(path, ParseMode::Text), Path::new("."))
                .unwrap();
        assert_eq!(pool, vec!["a", "b", "c"]);
    }

    /// JSON files must hold an array of strings
    #[test]
    fn test_json_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "content.json", r#"["x","y"]"#);

        let pool =
            produce_content_pool("content", &file_source(path, ParseMode::Json), Path::new("."))
                .unwrap();
        assert_eq!(pool, vec!["x", "y"]);
    }

    /// Malformed JSON and non-array JSON are parse errors naming the file
    #[test]
    fn test_json_file_parse_errors() {
        let dir = TempDir::new().unwrap();
        for (name, content) in [("bad.json", "[\"x\","), ("object.json", r#"{"a": "b"}"#)] {
            let path = write(&dir, name, content);
            let err = produce_content_pool(
                "wrap",
                &file_source(path.clone(), ParseMode::Json),
                Path::new("."),
            )
            .unwrap_err();
            match err {
                PoolError::Parse {
                    category,
                    path: err_path,
                    ..
                } => {
                    assert_eq!(category, "wrap");
                    assert_eq!(err_path, path);
                }
                other => panic!("expected parse error, got {other:?}"),
            }
        }
    }

    /// Non UTF-8 content is a parse error
    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latin1.txt");
        fs::write(&path, [0x66, 0x6f, 0xff, 0xfe]).unwrap();

        let err = produce_content_pool("content", &file_source(path, ParseMode::Text), dir.path())
            .unwrap_err();
        assert!(matches!(err, PoolError::Parse { .. }));
    }

    /// Relative paths that do not exist as given resolve under the assets dir
    #[test]
    fn test_relative_path_falls_back_to_assets_dir() {
        let dir = TempDir::new().unwrap();
        write(&dir, "pool-fallback-only.txt", "first, second");

        let pool = produce_content_pool(
            "content",
            &file_source("pool-fallback-only.txt", ParseMode::Text),
            dir.path(),
        )
        .unwrap();
        assert_eq!(pool, vec!["first", "second"]);
    }

    /// Missing files report every path that was tried
    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = produce_content_pool(
            "error",
            &file_source("does-not-exist.txt", ParseMode::Text),
            dir.path(),
        )
        .unwrap_err();

        match &err {
            PoolError::FileNotFound { category, tried } => {
                assert_eq!(category, "error");
                assert_eq!(tried.len(), 2);
                assert_eq!(tried[1], dir.path().join("does-not-exist.txt"));
            }
            other => panic!("expected file not found, got {other:?}"),
        }
        assert!(err.to_string().contains("does-not-exist.txt"));
    }

    /// A file with only separators yields an empty pool, which loading rejects
    #[test]
    fn test_empty_file_rejected_by_pool() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "empty.txt", " , ,\n");

        let diag = RecordingDiagnostics::new();
        let err = ContentPool::load("title", &file_source(path, ParseMode::Text), dir.path(), &diag)
            .unwrap_err();
        assert_eq!(
            err,
            PoolError::Empty {
                category: "title".to_string()
            }
        );
        assert!(diag.entries().is_empty());
    }

    /// All five categories load together; the first failure stops loading
    #[test]
    fn test_message_pools_load() {
        let dir = TempDir::new().unwrap();
        write(&dir, "content.txt", "hello {NAME}, bye {NAME}");
        write(&dir, "wrap.json", r#"["<b>{TEXT}</b>"]"#);

        let mut sources = MessageSources {
            title: TextSource::Literal("Title".to_string()),
            thumb_url: TextSource::List(vec!["https://example.org/t.jpg".to_string()]),
            content: file_source("content.txt", ParseMode::Text),
            wrap: file_source("wrap.json", ParseMode::Json),
            error: TextSource::Literal("failed".to_string()),
        };

        let diag = RecordingDiagnostics::new();
        let pools = MessagePools::load(&sources, dir.path(), &diag).unwrap();
        assert_eq!(pools.contents.as_slice(), ["hello {NAME}", "bye {NAME}"]);
        assert_eq!(pools.wraps.as_slice(), ["<b>{TEXT}</b>"]);
        assert_eq!(pools.titles.len(), 1);

        sources.error = TextSource::List(Vec::new());
        let err = MessagePools::load(&sources, dir.path(), &diag).unwrap_err();
        assert_eq!(err.category(), "error");
    }

    /// Each loaded pool is reported through the injected diagnostics
    #[test]
    fn test_pool_load_reported_through_diagnostics() {
        let dir = TempDir::new().unwrap();
        write(&dir, "content.txt", "a, b, c");

        let diag = RecordingDiagnostics::new();
        let pool = ContentPool::load(
            "content",
            &file_source("content.txt", ParseMode::Text),
            dir.path(),
            &diag,
        )
        .unwrap();
        assert_eq!(pool.len(), 3);

        let entries = diag.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, Level::Info);
        assert!(entries[0].1.contains("\"content\""));
        assert!(entries[0].1.contains("content.txt"));
        assert!(entries[0].1.contains('3'));
    }
}
