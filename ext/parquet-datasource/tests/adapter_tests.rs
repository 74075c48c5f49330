use bytes::Bytes;
use parquet_datasource::*;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::io::Write;
use std::sync::Arc;
use std::thread;

use test_helpers::*;

#[test]
fn test_open_requires_random_access() {
    let fs = StreamOnlyFileSystem::default();
    let ds = datasource("stream.parquet", json!({}));

    let err = ds
        .open_for_read(&fs, "stream.parquet", &OpenOptions::default())
        .unwrap_err();
    assert!(matches!(err, DatasourceError::NotSeekable { ref path, .. } if path == "stream.parquet"));
    assert_eq!(fs.stream_calls.load(Ordering::SeqCst), 0);

    let err = ds
        .read_file(&fs, "stream.parquet", &OpenOptions::default())
        .unwrap_err();
    assert!(matches!(err, DatasourceError::NotSeekable { .. }));
    assert_eq!(fs.stream_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_open_returns_seekable_handle() {
    let fs = MemoryFileSystem::new();
    fs.insert("a.parquet", Bytes::from_static(b"0123456789"));
    let ds = datasource("a.parquet", json!({}));

    let file = ds
        .open_for_read(&fs, "a.parquet", &OpenOptions::default())
        .unwrap();
    assert_eq!(file.size(), 10);
}

#[test]
fn test_read_options_idempotent() {
    let codec = Arc::new(RecordingCodec::default());
    let ds = datasource("a.parquet", json!({"use_threads": true, "x": 1})).with_codec(codec.clone());
    let file = InputFile::from_bytes(Bytes::new());

    ds.read_into_block(&file, "a.parquet").unwrap();
    ds.read_into_block(&file, "a.parquet").unwrap();

    let calls = codec.calls();
    assert_eq!(calls.len(), 2);
    for (use_threads, opts) in calls {
        assert!(use_threads);
        assert_eq!(opts, options(json!({"x": 1})));
    }
}

#[test]
fn test_use_threads_defaults_off() {
    let codec = Arc::new(RecordingCodec::default());
    let ds = datasource("a.parquet", json!({"batch_size": 5})).with_codec(codec.clone());

    ds.read_into_block(&InputFile::from_bytes(Bytes::new()), "a.parquet")
        .unwrap();
    assert_eq!(codec.calls(), vec![(false, options(json!({"batch_size": 5})))]);
}

#[test]
fn test_concurrent_reads_see_construction_options() {
    let codec = Arc::new(RecordingCodec::default());
    let ds = Arc::new(
        datasource("a.parquet", json!({"use_threads": true, "x": 1})).with_codec(codec.clone()),
    );

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ds = ds.clone();
            thread::spawn(move || {
                let file = InputFile::from_bytes(Bytes::new());
                for _ in 0..10 {
                    ds.read_into_block(&file, "a.parquet").unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let calls = codec.calls();
    assert_eq!(calls.len(), 80);
    assert!(calls
        .iter()
        .all(|(use_threads, opts)| *use_threads && *opts == options(json!({"x": 1}))));
}

#[test]
fn test_write_option_precedence() {
    let resolved = resolve_kwargs(
        &WriteOptionSpec::Concrete(options(json!({"a": 1, "b": 2}))),
        &options(json!({"b": 9})),
    )
    .unwrap();
    assert_eq!(resolved, options(json!({"a": 1, "b": 9})));

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let spec = WriteOptionSpec::deferred(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(options(json!({"a": 1})))
    });
    let resolved = resolve_kwargs(&spec, &options(json!({"a": 9, "c": 3}))).unwrap();
    assert_eq!(resolved, options(json!({"a": 9, "c": 3})));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_deferred_options_resolved_per_write() {
    let fs = MemoryFileSystem::new();
    let ds = datasource("out", json!({}));
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let spec = WriteOptionSpec::deferred(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(options(json!({"compression": "zstd"})))
    });

    for idx in 0..3 {
        let path = ds.output_file_name("write", idx);
        ds.write_file(&fs, &path, &two_row_block(), &spec, &OptionMap::new(), &OpenOptions::default())
            .unwrap();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(
        fs.paths(),
        vec![
            "write_000000.parquet".to_string(),
            "write_000001.parquet".to_string(),
            "write_000002.parquet".to_string(),
        ]
    );
}

#[test]
fn test_display_name_stable() {
    let first = datasource("a.parquet", json!({}));
    let second = datasource("b.parquet", json!({"use_threads": true}));

    for _ in 0..3 {
        assert_eq!(first.display_name(), "ParquetBulk");
        assert_eq!(second.display_name(), "ParquetBulk");
    }

    let as_dyn: Arc<dyn FileBasedDatasource> = Arc::new(first);
    assert_eq!(as_dyn.display_name(), "ParquetBulk");
}

#[test]
fn test_not_found_passthrough() {
    let fs = MemoryFileSystem::new();
    let ds = datasource("missing.parquet", json!({}));

    let err = ds
        .read_file(&fs, "missing.parquet", &OpenOptions::default())
        .unwrap_err();
    assert!(matches!(err, DatasourceError::NotFound { .. }));
    assert_eq!(err.path(), Some("missing.parquet"));
}

#[test]
fn test_corrupt_file_reports_path() {
    let fs = MemoryFileSystem::new();
    fs.insert("bad.parquet", Bytes::from_static(b"definitely not parquet"));
    let ds = datasource("bad.parquet", json!({}));

    let err = ds
        .read_file(&fs, "bad.parquet", &OpenOptions::default())
        .unwrap_err();
    match err {
        DatasourceError::Decode { path, .. } => assert_eq!(path, "bad.parquet"),
        other => panic!("expected decode error, got {:?}", other),
    }
}

#[test]
fn test_unknown_decode_option_is_decode_error() {
    let fs = MemoryFileSystem::new();
    let writer = datasource("a.parquet", json!({}));
    writer
        .write_file(&fs, "a.parquet", &two_row_block(), &WriteOptionSpec::default(), &OptionMap::new(), &OpenOptions::default())
        .unwrap();

    let reader = datasource("a.parquet", json!({"bogus": true}));
    let err = reader
        .read_file(&fs, "a.parquet", &OpenOptions::default())
        .unwrap_err();
    assert!(matches!(err, DatasourceError::Decode { .. }));
}

#[test]
fn test_mismatched_block_is_encode_error() {
    let block = Block::new(
        id_name_schema(),
        vec![vec![ParquetValue::from("one")], vec![ParquetValue::from("a")]],
    )
    .unwrap();
    let ds = datasource("out.parquet", json!({}));

    let mut sink = Vec::new();
    let err = ds
        .write_from_block(&mut sink, &block, &WriteOptionSpec::default(), &OptionMap::new())
        .unwrap_err();
    assert!(matches!(err, DatasourceError::Encode(_)));
}

#[test]
fn test_unknown_encode_option_is_encode_error() {
    let ds = datasource("out.parquet", json!({}));
    let mut sink = Vec::new();
    let err = ds
        .write_from_block(
            &mut sink,
            &two_row_block(),
            &WriteOptionSpec::default(),
            &options(json!({"not_an_option": 1})),
        )
        .unwrap_err();
    assert!(matches!(err, DatasourceError::Encode(_)));
}

struct FailingFlush(Vec<u8>);

impl Write for FailingFlush {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Err(std::io::Error::other("disk full"))
    }
}

#[test]
fn test_flush_failure_is_encode_error() {
    let ds = datasource("out.parquet", json!({}));
    let mut sink = FailingFlush(Vec::new());
    let err = ds
        .write_from_block(&mut sink, &two_row_block(), &WriteOptionSpec::default(), &OptionMap::new())
        .unwrap_err();
    assert!(matches!(err, DatasourceError::Encode(_)), "{}", err);
    assert!(err.to_string().contains("disk full"));
}

#[test]
fn test_producer_error_surfaces() {
    let ds = datasource("out.parquet", json!({}));
    let spec = WriteOptionSpec::deferred(|| Err("no worker context".into()));

    let mut sink = Vec::new();
    let err = ds
        .write_from_block(&mut sink, &two_row_block(), &spec, &OptionMap::new())
        .unwrap_err();
    assert!(matches!(err, DatasourceError::OptionProducer(_)));
    assert!(sink.is_empty());
}

#[test]
fn test_invalid_construction() {
    let err = ParquetBaseDatasource::new(vec!["a".into()], options(json!({"use_threads": 1})))
        .unwrap_err();
    assert!(matches!(err, DatasourceError::Configuration(_)));

    let err = DatasourceConfig::from_json(r#"{"paths": [], "read_table_args": {}}"#)
        .and_then(ParquetBaseDatasource::from_config)
        .unwrap_err();
    assert!(matches!(err, DatasourceError::Configuration(_)));
}
