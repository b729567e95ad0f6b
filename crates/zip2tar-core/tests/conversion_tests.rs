//! End-to-end conversion tests.
//!
//! Every test drives a real conversion on a multi-threaded runtime and
//! checks the TAR bytes with the `tar` crate.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::Cursor;
use std::io::Read;
use std::io::Write;

use tempfile::NamedTempFile;
use zip2tar_core::ArchiveSource;
use zip2tar_core::ConversionError;
use zip2tar_core::ConversionEvent;
use zip2tar_core::ConversionReport;
use zip2tar_core::ConvertOptions;
use zip2tar_core::convert;
use zip2tar_core::convert_to_vec;
use zip2tar_core::test_utils::ZipTestBuilder;
use zip2tar_core::test_utils::corrupt_first;
use zip2tar_core::test_utils::create_test_zip;
use zip2tar_core::test_utils::reference_tar;
use zip2tar_core::test_utils::rename_all;

struct Outcome {
    tar: std::io::Result<Vec<u8>>,
    events: Vec<ConversionEvent>,
    result: zip2tar_core::Result<ConversionReport>,
}

async fn run(source: impl Into<ArchiveSource>, options: ConvertOptions) -> Outcome {
    let mut conversion = convert(source, options).unwrap();
    let stream = conversion.take_stream().unwrap();
    let events = conversion.take_events().unwrap();

    let reader = tokio::spawn(stream.read_all());
    let result = conversion.finish().await;
    let tar = reader.await.unwrap();

    Outcome {
        tar,
        events: events.collect().await,
        result,
    }
}

struct TarEntry {
    path: String,
    kind: tar::EntryType,
    size: u64,
    mode: u32,
    mtime: u64,
    content: Vec<u8>,
}

fn parse_tar(data: &[u8]) -> Vec<TarEntry> {
    let mut archive = tar::Archive::new(Cursor::new(data));
    archive
        .entries()
        .unwrap()
        .map(|entry| {
            let mut entry = entry.unwrap();
            let header = entry.header().clone();
            let mut content = Vec::new();
            entry.read_to_end(&mut content).unwrap();
            TarEntry {
                path: String::from_utf8(entry.path_bytes().into_owned()).unwrap(),
                kind: header.entry_type(),
                size: header.size().unwrap(),
                mode: header.mode().unwrap(),
                mtime: header.mtime().unwrap(),
                content,
            }
        })
        .collect()
}

fn named(events: &[ConversionEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|e| match e {
            ConversionEvent::Named(name) => Some(name.as_str()),
            ConversionEvent::Progress(_) => None,
        })
        .collect()
}

fn percentages(events: &[ConversionEvent]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|e| match e {
            ConversionEvent::Progress(p) => Some(*p),
            ConversionEvent::Named(_) => None,
        })
        .collect()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_output_length_matches_reference_tar() {
    let entries: [(&str, &[u8]); 4] = [
        ("docs/", b""),
        ("docs/readme.md", b"# readme\n"),
        ("docs/empty.txt", b""),
        ("data.bin", &[7u8; 1500]),
    ];
    let zip = ZipTestBuilder::new()
        .add_directory("docs/")
        .add_file("docs/readme.md", b"# readme\n")
        .add_file("docs/empty.txt", b"")
        .add_deflated_file("data.bin", &[7u8; 1500])
        .build();

    let outcome = run(zip, ConvertOptions::default()).await;
    let report = outcome.result.unwrap();
    let tar = outcome.tar.unwrap();

    assert_eq!(tar.len(), reference_tar(&entries).len());
    assert_eq!(report.tar_bytes, tar.len() as u64);
    assert_eq!(report.files, 3);
    assert_eq!(report.directories, 1);
    assert_eq!(report.content_bytes, 9 + 1500);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_entries_keep_order_content_and_metadata() {
    let zip = ZipTestBuilder::new()
        .add_directory("bin/")
        .add_file_with_mode("bin/run.sh", b"#!/bin/sh\necho hi\n", 0o755)
        .add_deflated_file("notes.txt", b"some notes, some notes, some notes")
        .build();

    let tar = convert_to_vec(zip, ConvertOptions::default()).await.unwrap();
    let entries = parse_tar(&tar);

    let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, ["bin/", "bin/run.sh", "notes.txt"]);

    assert_eq!(entries[0].kind, tar::EntryType::Directory);
    assert_eq!(entries[0].size, 0);
    assert_eq!(entries[0].mode, 0o755);

    assert_eq!(entries[1].kind, tar::EntryType::Regular);
    assert_eq!(entries[1].mode, 0o755);
    assert_eq!(entries[1].content, b"#!/bin/sh\necho hi\n");

    assert_eq!(entries[2].mode, 0o644);
    assert_eq!(entries[2].content, b"some notes, some notes, some notes");

    // 2020-06-15 12:30:00 UTC
    assert!(entries.iter().all(|e| e.mtime == 1_592_224_200));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_named_events_follow_central_directory_order() {
    let zip = ZipTestBuilder::new()
        .add_file("b.txt", b"b")
        .add_directory("a/")
        .add_file("a/c.txt", b"c")
        .build();

    let outcome = run(zip, ConvertOptions::default()).await;
    outcome.result.unwrap();

    assert_eq!(named(&outcome.events), ["b.txt", "a/", "a/c.txt"]);
    assert!(percentages(&outcome.events).is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_progress_follows_each_entry() {
    let zip = create_test_zip(vec![("1", b"1"), ("2", b"2"), ("3", b"3"), ("4", b"4")]);

    let outcome = run(zip, ConvertOptions::default().with_progress(true)).await;
    outcome.result.unwrap();

    assert_eq!(
        outcome.events,
        [
            ConversionEvent::Named("1".into()),
            ConversionEvent::Progress(25),
            ConversionEvent::Named("2".into()),
            ConversionEvent::Progress(50),
            ConversionEvent::Named("3".into()),
            ConversionEvent::Progress(75),
            ConversionEvent::Named("4".into()),
            ConversionEvent::Progress(100),
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_progress_rounds_to_nearest() {
    let zip = create_test_zip(vec![("a", b"a"), ("b", b"b"), ("c", b"c")]);

    let outcome = run(zip, ConvertOptions::default().with_progress(true)).await;
    outcome.result.unwrap();

    assert_eq!(percentages(&outcome.events), [33, 67, 100]);
}

#[tokio::test(flavor = "multi_thread")]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
async fn test_progress_skips_repeated_percentages() {
    let names: Vec<String> = (0..101).map(|i| format!("f{i:03}")).collect();
    let zip = names
        .iter()
        .fold(ZipTestBuilder::new(), |zip, name| zip.add_file(name, b"x"))
        .build();

    let outcome = run(zip, ConvertOptions::default().with_progress(true)).await;
    outcome.result.unwrap();

    let mut expected: Vec<u8> = (1..=101u32)
        .map(|written| (f64::from(written) * 100.0 / 101.0).round() as u8)
        .collect();
    expected.dedup();

    assert_eq!(percentages(&outcome.events), expected);
    assert_eq!(expected, (1..=100).collect::<Vec<u8>>());
    assert_eq!(named(&outcome.events).len(), 101);
}

fn duplicate_name_zip() -> Vec<u8> {
    let mut zip = create_test_zip(vec![("a.txt", b"one"), ("b.txt", b"two")]);
    rename_all(&mut zip, b"b.txt", b"a.txt");
    zip
}

#[tokio::test(flavor = "multi_thread")]
async fn test_duplicate_entry_names_fail() {
    for progress in [false, true] {
        let outcome = run(
            duplicate_name_zip(),
            ConvertOptions::default().with_progress(progress),
        )
        .await;

        let err = outcome.result.unwrap_err();
        assert!(matches!(err, ConversionError::InvalidArchive(_)), "{err}");
        assert!(err.to_string().contains("duplicate entry names"));
        assert!(outcome.tar.is_err());
        assert!(outcome.events.is_empty());
    }

    let err = convert_to_vec(duplicate_name_zip(), ConvertOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ConversionError::InvalidArchive(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_conversion_is_deterministic() {
    let zip = ZipTestBuilder::new()
        .add_directory("d/")
        .add_deflated_file("d/x", &[1u8; 10_000])
        .build();

    let first = convert_to_vec(zip.clone(), ConvertOptions::default())
        .await
        .unwrap();
    let second = convert_to_vec(zip, ConvertOptions::default().with_progress(true))
        .await
        .unwrap();
    assert_eq!(first, second);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_path_and_buffer_sources_match() {
    let zip = ZipTestBuilder::new()
        .add_file("a.txt", b"alpha")
        .add_deflated_file("b.txt", b"beta beta beta")
        .build();
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&zip).unwrap();
    file.flush().unwrap();

    let from_path = convert_to_vec(file.path(), ConvertOptions::default())
        .await
        .unwrap();
    let from_buffer = convert_to_vec(zip, ConvertOptions::default())
        .await
        .unwrap();
    assert_eq!(from_path, from_buffer);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_empty_archive_is_trailer_only() {
    let zip = ZipTestBuilder::new().build();

    let outcome = run(zip, ConvertOptions::default().with_progress(true)).await;
    let report = outcome.result.unwrap();
    let tar = outcome.tar.unwrap();

    assert_eq!(tar, vec![0u8; 1024]);
    assert!(outcome.events.is_empty());
    assert_eq!(report.entries(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_path_fails_with_not_found() {
    let outcome = run("definitely/missing/archive.zip", ConvertOptions::default()).await;

    let err = outcome.result.unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("definitely/missing/archive.zip"));
    assert!(outcome.tar.is_err());
    assert!(outcome.events.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_path_with_progress_fails_before_output() {
    let outcome = run(
        "definitely/missing/archive.zip",
        ConvertOptions::default().with_progress(true),
    )
    .await;

    assert!(outcome.result.unwrap_err().is_not_found());
    assert!(outcome.events.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_text_file_has_no_end_of_central_directory() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"this is a plain text file, not an archive\n")
        .unwrap();
    file.flush().unwrap();

    let outcome = run(file.path(), ConvertOptions::default()).await;

    let err = outcome.result.unwrap_err();
    assert!(matches!(err, ConversionError::MissingEndOfCentralDirectory));
    assert_eq!(
        err.to_string(),
        "end of central directory record signature not found"
    );
    assert!(outcome.tar.is_err());
}

#[test]
fn test_empty_source_is_rejected_synchronously() {
    let err = convert("", ConvertOptions::default()).unwrap_err();
    assert!(matches!(err, ConversionError::SourceRequired));

    let err = convert(Vec::new(), ConvertOptions::default()).unwrap_err();
    assert!(matches!(err, ConversionError::SourceRequired));
}

#[test]
fn test_convert_requires_runtime() {
    let zip = create_test_zip(vec![("a", b"a")]);
    let err = convert(zip, ConvertOptions::default()).unwrap_err();
    assert!(matches!(err, ConversionError::RuntimeUnavailable));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_corrupted_content_fails_with_entry_read() {
    let mut zip = ZipTestBuilder::new()
        .add_file("ok.txt", b"fine")
        .add_file("bad.txt", b"CORRUPTED-CONTENT-MARKER")
        .build();
    corrupt_first(&mut zip, b"CORRUPTED-CONTENT-MARKER");

    let outcome = run(zip, ConvertOptions::default()).await;

    let err = outcome.result.unwrap_err();
    assert!(matches!(err, ConversionError::EntryRead { .. }));
    assert_eq!(err.entry_name(), Some("bad.txt"));
    assert!(outcome.tar.is_err());
    assert_eq!(named(&outcome.events), ["ok.txt"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_convert_to_vec_reports_typed_error() {
    let mut zip = create_test_zip(vec![("bad.txt", b"ANOTHER-CORRUPTED-MARKER")]);
    corrupt_first(&mut zip, b"ANOTHER-CORRUPTED-MARKER");

    let err = convert_to_vec(zip, ConvertOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.entry_name(), Some("bad.txt"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_parent_component_fails_with_entry_write() {
    let zip = create_test_zip(vec![("../escape.txt", b"x")]);

    let err = convert_to_vec(zip, ConvertOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ConversionError::EntryWrite { .. }));
    assert_eq!(err.entry_name(), Some("../escape.txt"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dropped_stream_fails_with_output_closed() {
    let zip = ZipTestBuilder::new()
        .add_deflated_file("big.bin", &vec![0u8; 2 * 1024 * 1024])
        .build();

    let mut conversion = convert(zip, ConvertOptions::default()).unwrap();
    drop(conversion.take_stream());

    let err = conversion.finish().await.unwrap_err();
    assert!(matches!(err, ConversionError::OutputClosed));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_finish_drains_untaken_stream() {
    let zip = ZipTestBuilder::new()
        .add_deflated_file("big.bin", &vec![3u8; 2 * 1024 * 1024])
        .build();

    let conversion = convert(zip, ConvertOptions::default()).unwrap();
    let report = conversion.finish().await.unwrap();
    assert_eq!(report.content_bytes, 2 * 1024 * 1024);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_next_event_ends_after_completion() {
    let zip = create_test_zip(vec![("one", b"1"), ("two", b"2")]);

    let mut conversion = convert(zip, ConvertOptions::default().with_progress(true)).unwrap();
    let reader = tokio::spawn(conversion.take_stream().unwrap().read_all());

    let mut seen = Vec::new();
    while let Some(event) = conversion.next_event().await {
        seen.push(event);
    }
    assert_eq!(seen.len(), 4);
    assert!(conversion.take_events().is_some());
    assert!(conversion.take_events().is_none());

    conversion.finish().await.unwrap();
    reader.await.unwrap().unwrap();
}
