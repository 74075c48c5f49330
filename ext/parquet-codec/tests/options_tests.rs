use bytes::Bytes;
use parquet::basic::Compression;
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet_codec::*;
use serde_json::json;

use test_helpers::*;

fn column_compression(bytes: Bytes) -> Compression {
    let reader = SerializedFileReader::new(bytes).unwrap();
    reader.metadata().row_group(0).column(0).compression()
}

#[test]
fn test_compression_options() {
    let table = create_test_table(200);

    for (name, expected) in [
        ("none", Compression::UNCOMPRESSED),
        ("snappy", Compression::SNAPPY),
        ("lz4", Compression::LZ4_RAW),
    ] {
        let bytes = encode_to_bytes(&table, json!({"compression": name}));
        assert_eq!(column_compression(bytes.clone()), expected, "codec {}", name);
        assert_eq!(decode(bytes, false, &OptionMap::new()).unwrap(), table);
    }

    let bytes = encode_to_bytes(&table, json!({"compression": "gzip", "compression_level": 9}));
    assert!(matches!(column_compression(bytes), Compression::GZIP(_)));

    let bytes = encode_to_bytes(&table, json!({"compression": "zstd"}));
    assert!(matches!(column_compression(bytes), Compression::ZSTD(_)));
}

#[test]
fn test_default_compression_is_snappy() {
    let bytes = encode_to_bytes(&create_test_table(10), json!({}));
    assert_eq!(column_compression(bytes), Compression::SNAPPY);
}

#[test]
fn test_key_value_metadata_written() {
    let bytes = encode_to_bytes(
        &create_test_table(3),
        json!({"metadata": {"producer": "etl", "version": "3"}}),
    );
    let reader = Reader::try_new(bytes).unwrap();
    let kv = reader.metadata().file_metadata().key_value_metadata().unwrap();
    assert!(kv
        .iter()
        .any(|e| e.key == "producer" && e.value.as_deref() == Some("etl")));
}

#[test]
fn test_projection_option() {
    let bytes = encode_to_bytes(&create_test_table(20), json!({}));
    let table = decode(bytes, false, &options(json!({"columns": ["active", "id"]}))).unwrap();

    let names: Vec<_> = table.schema().fields().iter().map(|f| f.name().clone()).collect();
    assert_eq!(names, vec!["id", "active"]);
    assert_eq!(table.num_rows(), 20);
}

#[test]
fn test_row_groups_option() {
    let bytes = encode_to_bytes(&create_test_table(30), json!({"row_group_size": 10}));

    let table = decode(bytes.clone(), true, &options(json!({"row_groups": [2, 0]}))).unwrap();
    let ids = &table.to_columns().unwrap()[0].1;
    assert_eq!(ids.len(), 20);
    assert_eq!(ids[0], ParquetValue::Int32(20));
    assert_eq!(ids[10], ParquetValue::Int32(0));

    let err = decode(bytes, false, &options(json!({"row_groups": [5]}))).unwrap_err();
    assert!(matches!(err, CodecError::InvalidArgument(_)));
}

#[test]
fn test_unknown_options_rejected() {
    let table = create_test_table(1);

    let err = encode(&table, Vec::new(), &options(json!({"bogus": 1}))).unwrap_err();
    assert!(err.to_string().contains("Unknown encode option 'bogus'"));

    let bytes = encode_to_bytes(&table, json!({}));
    let err = decode(bytes, false, &options(json!({"bogus": 1}))).unwrap_err();
    assert!(err.to_string().contains("Unknown decode option 'bogus'"));
}

#[test]
fn test_stray_compression_level_rejected() {
    let table = create_test_table(1);

    for opts in [
        json!({"compression_level": 22}),
        json!({"compression": "snappy", "compression_level": 22}),
        json!({"compression": "none", "compression_level": 1}),
        json!({"compression": "lz4", "compression_level": 1}),
    ] {
        let err = encode(&table, Vec::new(), &options(opts.clone())).unwrap_err();
        assert!(matches!(err, CodecError::InvalidArgument(_)), "options {}", opts);
    }

    let bytes = encode_to_bytes(&table, json!({"compression": "zstd", "compression_level": 22}));
    assert!(matches!(column_compression(bytes), Compression::ZSTD(_)));
}

#[test]
fn test_corrupt_row_group_same_error_either_way() {
    let table = create_test_table(100);
    let mut bytes = encode_to_bytes(
        &table,
        json!({"compression": "none", "row_group_size": 25}),
    )
    .to_vec();
    // first page header of the first row group
    for byte in &mut bytes[4..24] {
        *byte = 0xFF;
    }
    let bytes = Bytes::from(bytes);

    let sequential = decode(bytes.clone(), false, &OptionMap::new()).unwrap_err();
    let parallel = decode(bytes, true, &OptionMap::new()).unwrap_err();
    assert_eq!(
        std::mem::discriminant(&sequential),
        std::mem::discriminant(&parallel),
        "{} vs {}",
        sequential,
        parallel
    );
}

#[test]
fn test_corrupt_input() {
    let mut bytes = encode_to_bytes(&create_test_table(5), json!({})).to_vec();
    let len = bytes.len();
    bytes[len - 1] = b'X';

    let err = decode(Bytes::from(bytes), false, &OptionMap::new()).unwrap_err();
    assert!(matches!(err, CodecError::Parquet(_)));

    let err = decode(Bytes::from_static(b"PAR1"), true, &OptionMap::new()).unwrap_err();
    assert!(matches!(err, CodecError::Parquet(_)));
}

#[test]
fn test_schema_mismatch_on_encode() {
    let table = create_test_table(2);
    let other_schema = SchemaBuilder::new()
        .with_column(SchemaNode::primitive("id", PrimitiveType::Int64, false))
        .build()
        .unwrap();

    let mut writer = Writer::new(Vec::new(), &other_schema).unwrap();
    let err = writer.write_table(&table).unwrap_err();
    assert!(matches!(err, CodecError::Schema(_)));
}
