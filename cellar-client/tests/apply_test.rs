//! Tests for single-row apply: retry classification by idempotency,
//! conditional mutations, and client-side validation.

mod common;

use tonic::{Code, Status};

use cellar_client::{Error, Filter, Mutation, Timestamp};
use cellar_proto::v2 as pb;

use common::{test_table, ScriptedTransport};

fn idempotent() -> Mutation {
    Mutation::new().set_cell("cf", "col", Timestamp(1_000), "v")
}

fn server_timed() -> Mutation {
    Mutation::new().set_cell("cf", "col", Timestamp::SERVER_TIME, "v")
}

#[tokio::test]
async fn test_idempotent_apply_retries_on_unavailable() {
    let transport = ScriptedTransport::new();
    transport.script_mutate_row(Err(Status::unavailable("flake")));
    transport.script_mutate_row(Ok(pb::MutateRowResponse {}));
    let table = test_table(transport.clone());

    let result = table.apply("row", idempotent()).await.unwrap();
    assert_eq!(result, None);
    assert_eq!(transport.mutate_row_requests.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_non_idempotent_apply_fails_fast() {
    let transport = ScriptedTransport::new();
    transport.script_mutate_row(Err(Status::unavailable("flake")));
    let table = test_table(transport.clone());

    let err = table.apply("row", server_timed()).await.unwrap_err();
    assert_eq!(err.code(), Code::Unavailable);
    assert_eq!(transport.mutate_row_requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_non_retryable_code_fails_even_when_idempotent() {
    let transport = ScriptedTransport::new();
    transport.script_mutate_row(Err(Status::invalid_argument("bad family")));
    let table = test_table(transport.clone());

    let err = table.apply("row", idempotent()).await.unwrap_err();
    assert_eq!(err.code(), Code::InvalidArgument);
    assert_eq!(transport.mutate_row_requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_apply_sends_ops_and_row_key() {
    let transport = ScriptedTransport::new();
    transport.script_mutate_row(Ok(pb::MutateRowResponse {}));
    let table = test_table(transport.clone());

    table
        .apply(
            "row#1",
            Mutation::new()
                .set_cell("cf", "col", Timestamp(1_234_567), "v")
                .delete_row(),
        )
        .await
        .unwrap();

    let requests = transport.mutate_row_requests.lock().unwrap();
    assert_eq!(requests[0].row_key, b"row#1");
    assert_eq!(requests[0].table_name, "projects/proj/instances/inst/tables/events");
    assert_eq!(requests[0].mutations.len(), 2);
    match &requests[0].mutations[0].mutation {
        Some(pb::mutation::Mutation::SetCell(set_cell)) => {
            assert_eq!(set_cell.timestamp_micros, 1_234_000);
        }
        other => panic!("expected set cell, got {other:?}"),
    }
}

#[tokio::test]
async fn test_conditional_reports_predicate_matched() {
    let transport = ScriptedTransport::new();
    transport.script_check_and_mutate(Ok(pb::CheckAndMutateRowResponse {
        predicate_matched: true,
    }));
    let table = test_table(transport.clone());

    let mutation = Mutation::conditional(
        Filter::ValueRegex("on".to_string()),
        Some(idempotent()),
        Some(Mutation::new().delete_row()),
    );
    let matched = table.apply("row", mutation).await.unwrap();
    assert_eq!(matched, Some(true));

    let requests = transport.check_and_mutate_requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].predicate_filter.is_some());
    assert_eq!(requests[0].true_mutations.len(), 1);
    assert_eq!(requests[0].false_mutations.len(), 1);
}

#[tokio::test]
async fn test_conditional_with_idempotent_branches_retries() {
    let transport = ScriptedTransport::new();
    transport.script_check_and_mutate(Err(Status::aborted("contention")));
    transport.script_check_and_mutate(Ok(pb::CheckAndMutateRowResponse {
        predicate_matched: false,
    }));
    let table = test_table(transport.clone());

    let mutation = Mutation::conditional(Filter::PassAll, Some(idempotent()), None);
    let matched = table.apply("row", mutation).await.unwrap();
    assert_eq!(matched, Some(false));
    assert_eq!(transport.check_and_mutate_requests.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_conditional_with_server_time_branch_fails_fast() {
    let transport = ScriptedTransport::new();
    transport.script_check_and_mutate(Err(Status::unavailable("flake")));
    let table = test_table(transport.clone());

    // The true branch writes a server-timed cell, so the whole conditional
    // is non-idempotent and the first failure must surface.
    let mutation = Mutation::conditional(Filter::PassAll, Some(server_timed()), Some(idempotent()));
    let err = table.apply("row", mutation).await.unwrap_err();
    assert_eq!(err.code(), Code::Unavailable);
    assert_eq!(transport.check_and_mutate_requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_nested_conditional_is_rejected_before_dispatch() {
    let transport = ScriptedTransport::new();
    let table = test_table(transport.clone());

    let inner = Mutation::conditional(Filter::PassAll, Some(idempotent()), None);
    let outer = Mutation::conditional(Filter::PassAll, Some(inner), None);

    let err = table.apply("row", outer).await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert!(transport.check_and_mutate_requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_nested_conditional_in_false_branch_is_rejected() {
    let transport = ScriptedTransport::new();
    let table = test_table(transport.clone());

    let inner = Mutation::conditional(Filter::PassAll, None, None);
    let outer = Mutation::conditional(Filter::PassAll, None, Some(inner));

    let err = table.apply("row", outer).await.unwrap_err();
    assert_eq!(err.code(), Code::InvalidArgument);
}

#[tokio::test]
async fn test_conditional_with_absent_branches_still_dispatches() {
    let transport = ScriptedTransport::new();
    transport.script_check_and_mutate(Ok(pb::CheckAndMutateRowResponse {
        predicate_matched: false,
    }));
    let table = test_table(transport.clone());

    let mutation = Mutation::conditional(Filter::PassAll, None, None);
    let matched = table.apply("row", mutation).await.unwrap();
    assert_eq!(matched, Some(false));

    let requests = transport.check_and_mutate_requests.lock().unwrap();
    assert!(requests[0].true_mutations.is_empty());
    assert!(requests[0].false_mutations.is_empty());
}
