// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use baton::{handler_fn, terminal_fn, BatonError, Bundle, Chain, Handler, Metadata, Next, Terminal};
use parking_lot::Mutex;
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use tracing::Level;

// --- Types flowing through the test chains ---
#[derive(Clone, Debug, Default)]
pub struct TestEvent {
  pub name: String,
}

#[derive(Clone, Debug, Default)]
pub struct TestMeta {
  pub trail: Vec<String>,
  pub counter: u32,
  pub error_codes: Vec<&'static str>,
  pub stashed_next: Option<Next<TestError>>,
}

#[derive(Debug)]
pub struct TestClient {
  pub id: u32,
}

/// Logger handle passed through the bundle; records lines so tests can check it reached every handler.
#[derive(Debug, Default)]
pub struct RecordingLogger {
  pub lines: Mutex<Vec<String>>,
}

impl RecordingLogger {
  pub fn info(&self, line: impl Into<String>) {
    self.lines.lock().push(line.into());
  }

  pub fn lines(&self) -> Vec<String> {
    self.lines.lock().clone()
  }
}

// --- Common Error Type for Tests ---
#[derive(Debug, thiserror::Error)]
pub enum TestError {
  #[error(transparent)]
  Baton(#[from] BatonError),

  #[error("Test handler failed: {0}")]
  Handler(String),
}

impl TestError {
  /// Contract code if this is a chain error, `None` for handler failures.
  pub fn code(&self) -> Option<&'static str> {
    match self {
      TestError::Baton(e) => Some(e.code()),
      TestError::Handler(_) => None,
    }
  }
}

pub type TestChain = Chain<TestEvent, TestMeta, TestClient, RecordingLogger, TestError>;
pub type TestBundle = Bundle<TestEvent, TestMeta, TestClient, RecordingLogger, TestError>;
pub type TestHandler = Handler<TestEvent, TestMeta, TestClient, RecordingLogger, TestError>;

/// Fresh argument bundle parts for one run.
pub struct Fixture {
  pub event: TestEvent,
  pub meta: Metadata<TestMeta>,
  pub client: Arc<TestClient>,
  pub logger: Arc<RecordingLogger>,
}

impl Fixture {
  pub fn new() -> Self {
    Self {
      event: TestEvent {
        name: "push".to_string(),
      },
      meta: Metadata::new(TestMeta::default()),
      client: Arc::new(TestClient { id: 7 }),
      logger: Arc::new(RecordingLogger::default()),
    }
  }

  pub fn trail(&self) -> Vec<String> {
    self.meta.read().trail.clone()
  }

  pub async fn run(&self, chain: &TestChain) -> Result<baton::ChainResult, TestError> {
    chain
      .run(
        self.event.clone(),
        self.meta.clone(),
        Arc::clone(&self.client),
        Arc::clone(&self.logger),
      )
      .await
  }

  pub async fn run_with_terminal(&self, chain: &TestChain) -> Result<baton::ChainResult, TestError> {
    chain
      .run_with_terminal(
        self.event.clone(),
        self.meta.clone(),
        Arc::clone(&self.client),
        Arc::clone(&self.logger),
        recording_terminal(&self.meta),
      )
      .await
  }
}

fn mark(bundle: &TestBundle, label: &str) {
  let mut guard = bundle.context.write();
  guard.counter += 1;
  guard.trail.push(label.to_string());
}

// --- Common Handler Creators ---

/// Records `label`, then advances unconditionally.
pub fn advancing(label: &'static str) -> TestHandler {
  handler_fn(move |bundle: TestBundle| async move {
    mark(&bundle, label);
    tracing::debug!(target: "test_handlers", %label, index = bundle.index(), "advancing");
    bundle.advance().await
  })
}

/// Records `label` and finishes without advancing.
pub fn stopping(label: &'static str) -> TestHandler {
  handler_fn(move |bundle: TestBundle| async move {
    mark(&bundle, label);
    Ok::<(), TestError>(())
  })
}

/// Records `label:before`, awaits the rest of the chain, then records `label:after`.
pub fn wrapping(label: &'static str) -> TestHandler {
  handler_fn(move |bundle: TestBundle| async move {
    mark(&bundle, &format!("{label}:before"));
    bundle.advance().await?;
    mark(&bundle, &format!("{label}:after"));
    Ok::<(), TestError>(())
  })
}

/// Records `label` and fails without advancing.
pub fn failing(label: &'static str, message: &'static str) -> TestHandler {
  handler_fn(move |bundle: TestBundle| async move {
    mark(&bundle, label);
    tracing::warn!(target: "test_handlers", %label, "failing with: '{}'", message);
    Err::<(), TestError>(TestError::Handler(message.to_string()))
  })
}

/// Terminal that appends "terminal" to the trail and bumps [`TERMINAL_EXEC_COUNTER`].
pub fn recording_terminal(meta: &Metadata<TestMeta>) -> Terminal<TestError> {
  let meta = meta.clone();
  terminal_fn(move || async move {
    TERMINAL_EXEC_COUNTER.fetch_add(1, Ordering::SeqCst);
    meta.write().trail.push("terminal".to_string());
    Ok::<(), TestError>(())
  })
}

pub fn chain_of(handlers: Vec<TestHandler>) -> TestChain {
  handlers.into_iter().collect()
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::TRACE)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Atomic counters for checking execution counts ---
pub static TERMINAL_EXEC_COUNTER: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));

pub fn reset_counters() {
  TERMINAL_EXEC_COUNTER.store(0, Ordering::SeqCst);
}

pub fn terminal_runs() -> usize {
  TERMINAL_EXEC_COUNTER.load(Ordering::SeqCst)
}
