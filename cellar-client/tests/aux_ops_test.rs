//! Tests for the auxiliary operations: read-modify-write and row-key
//! sampling.

mod common;

use tonic::{Code, Status};

use cellar_client::ReadModifyWrite;
use cellar_proto::v2 as pb;

use common::{test_table, ScriptedTransport};

fn sample_response(key: &[u8]) -> pb::SampleRowKeysResponse {
    pb::SampleRowKeysResponse {
        row_key: key.to_vec(),
        offset_bytes: 0,
    }
}

#[tokio::test]
async fn test_read_modify_write_returns_new_cells() {
    let transport = ScriptedTransport::new();
    transport.script_read_modify_write(Ok(pb::ReadModifyWriteRowResponse {
        row: Some(pb::Row {
            key: b"counter#1".to_vec(),
            families: vec![pb::Family {
                name: "cf".to_string(),
                columns: vec![pb::Column {
                    qualifier: b"hits".to_vec(),
                    cells: vec![pb::Cell {
                        timestamp_micros: 5_000,
                        value: 9i64.to_be_bytes().to_vec(),
                        labels: vec![],
                    }],
                }],
            }],
        }),
    }));
    let table = test_table(transport.clone());

    let row = table
        .apply_read_modify_write(
            "counter#1",
            ReadModifyWrite::new()
                .increment("cf", "hits", 1)
                .append_value("cf", "log", b"+1"),
        )
        .await
        .unwrap();

    assert_eq!(row.key().as_ref(), b"counter#1");
    assert_eq!(row.family("cf")[0].column, "cf:hits");
    assert_eq!(row.family("cf")[0].value.as_ref(), &9i64.to_be_bytes()[..]);

    let requests = transport.read_modify_write_requests.lock().unwrap();
    assert_eq!(requests[0].rules.len(), 2);
    assert!(matches!(
        requests[0].rules[0].rule,
        Some(pb::read_modify_write_rule::Rule::IncrementAmount(1))
    ));
    assert!(matches!(
        requests[0].rules[1].rule,
        Some(pb::read_modify_write_rule::Rule::AppendValue(_))
    ));
}

#[tokio::test]
async fn test_read_modify_write_is_never_retried() {
    let transport = ScriptedTransport::new();
    transport.script_read_modify_write(Err(Status::unavailable("flake")));
    let table = test_table(transport.clone());

    let err = table
        .apply_read_modify_write("row", ReadModifyWrite::new().increment("cf", "n", 1))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Code::Unavailable);
    assert_eq!(
        transport.read_modify_write_requests.lock().unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_read_modify_write_without_row_is_an_error() {
    let transport = ScriptedTransport::new();
    transport.script_read_modify_write(Ok(pb::ReadModifyWriteRowResponse { row: None }));
    let table = test_table(transport.clone());

    let err = table
        .apply_read_modify_write("row", ReadModifyWrite::new().increment("cf", "n", 1))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Code::Internal);
}

#[tokio::test]
async fn test_sample_row_keys_collects_and_skips_empty() {
    let transport = ScriptedTransport::new();
    transport.script_sample(Ok(vec![
        Ok(sample_response(b"g")),
        Ok(sample_response(b"")),
        Ok(sample_response(b"p")),
    ]));
    let table = test_table(transport.clone());

    let keys = table.sample_row_keys().await.unwrap();
    assert_eq!(keys.len(), 2);
    assert_eq!(keys[0].as_ref(), b"g");
    assert_eq!(keys[1].as_ref(), b"p");
}

#[tokio::test]
async fn test_sample_row_keys_discards_partial_state_on_retry() {
    let transport = ScriptedTransport::new();
    transport.script_sample(Ok(vec![
        Ok(sample_response(b"stale")),
        Err(Status::unavailable("stream reset")),
    ]));
    transport.script_sample(Ok(vec![
        Ok(sample_response(b"g")),
        Ok(sample_response(b"p")),
    ]));
    let table = test_table(transport.clone());

    let keys = table.sample_row_keys().await.unwrap();
    // The aborted attempt's keys must not leak into the result.
    assert_eq!(keys.len(), 2);
    assert_eq!(keys[0].as_ref(), b"g");
    assert_eq!(transport.sample_requests.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_sample_row_keys_surfaces_fatal_errors() {
    let transport = ScriptedTransport::new();
    transport.script_sample(Ok(vec![Err(Status::permission_denied("nope"))]));
    let table = test_table(transport.clone());

    let err = table.sample_row_keys().await.unwrap_err();
    assert_eq!(err.code(), Code::PermissionDenied);
    assert_eq!(transport.sample_requests.lock().unwrap().len(), 1);
}
