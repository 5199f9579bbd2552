// tests/error_handling_tests.rs
mod common;

use baton::{BatonError, Bundle, Chain, ChainResult, Metadata};
use common::setup_tracing;
use serial_test::serial;
use std::sync::Arc;

// A chain whose error type IS BatonError, with anyhow-based handlers.
type PlainBundle = Bundle<String, Vec<String>, (), (), BatonError>;

async fn run_plain(chain: &Chain<String, Vec<String>>) -> (Result<ChainResult, BatonError>, Vec<String>) {
  let meta = Metadata::new(Vec::new());
  let result = chain
    .run("event".to_string(), meta.clone(), Arc::new(()), Arc::new(()))
    .await;
  (result, meta.snapshot())
}

#[tokio::test]
#[serial]
async fn test_anyhow_failure_becomes_handler_error() {
  setup_tracing();
  let chain = Chain::<String, Vec<String>>::new()
    .with(|bundle: PlainBundle| async move {
      bundle.context.write().push(format!("saw {}", bundle.args));
      bundle.advance().await
    })
    .with(|_bundle: PlainBundle| async move { Err::<(), anyhow::Error>(anyhow::anyhow!("upstream timeout")) });

  let (result, trail) = run_plain(&chain).await;

  let err = result.unwrap_err();
  assert_eq!(err.code(), BatonError::HANDLER_ERROR);
  assert!(err.to_string().contains("upstream timeout"));
  assert_eq!(trail, vec!["saw event"]);
}

#[tokio::test]
#[serial]
async fn test_duplicate_advance_keeps_code_through_anyhow() {
  setup_tracing();
  let chain = Chain::<String, Vec<String>>::new().with(|bundle: PlainBundle| async move {
    bundle.advance().await?;
    // Route the contract violation through anyhow; the code must survive.
    bundle.advance().await.map_err(anyhow::Error::from)
  });

  let (result, _) = run_plain(&chain).await;

  let err = result.unwrap_err();
  assert!(err.is_duplicate_advance());
  assert_eq!(err.code(), BatonError::DUPLICATE_ADVANCE);
}

#[tokio::test]
#[serial]
async fn test_duplicate_advance_distinct_from_business_failure() {
  setup_tracing();
  let violating = Chain::<String, Vec<String>>::new().with(|bundle: PlainBundle| async move {
    let first = bundle.advance();
    let second = bundle.advance();
    first.await?;
    second.await
  });
  let failing = Chain::<String, Vec<String>>::new()
    .with(|_bundle: PlainBundle| async move { Err::<(), BatonError>(BatonError::Internal("nope".into())) });

  let (violation, _) = run_plain(&violating).await;
  let (failure, _) = run_plain(&failing).await;

  assert_eq!(violation.unwrap_err().code(), BatonError::DUPLICATE_ADVANCE);
  let failure = failure.unwrap_err();
  assert!(!failure.is_duplicate_advance());
  assert_eq!(failure.code(), BatonError::INTERNAL);
}
