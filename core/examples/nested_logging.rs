// core/examples/nested_logging.rs

use baton::{terminal_fn, BatonError, Bundle, Chain, ChainResult, Metadata};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

// 1. What flows through the chain
#[derive(Debug)]
struct Request {
  path: String,
}

#[derive(Debug, Default)]
struct RequestMeta {
  user: Option<String>,
  log: Vec<String>,
}

struct ApiClient {
  base_url: String,
}

type AppBundle = Bundle<Request, RequestMeta, ApiClient, (), BatonError>;

#[tokio::main]
async fn main() -> Result<(), BatonError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Nested Logging Example ---");

  // 2. Timing middleware: wraps everything after it.
  let chain = Chain::<Request, RequestMeta, ApiClient>::new()
    .with(|bundle: AppBundle| async move {
      let started = Instant::now();
      bundle.context.write().log.push(format!("-> {}", bundle.args.path));
      bundle.advance().await?;
      bundle
        .context
        .write()
        .log
        .push(format!("<- {} in {:?}", bundle.args.path, started.elapsed()));
      Ok::<(), BatonError>(())
    })
    // 3. Auth: stops the chain for anonymous requests.
    .with(|bundle: AppBundle| async move {
      if bundle.args.path.starts_with("/public") {
        bundle.context.write().user = Some("anonymous".to_string());
        return bundle.advance().await;
      }
      bundle.context.write().log.push("rejected: no session".to_string());
      Ok(())
    })
    .with(|bundle: AppBundle| async move {
      let line = format!("fetching {}{}", bundle.client.base_url, bundle.args.path);
      bundle.context.write().log.push(line);
      bundle.advance().await
    });

  let client = Arc::new(ApiClient {
    base_url: "https://api.example.test".to_string(),
  });

  for path in ["/public/status", "/admin"] {
    let meta = Metadata::new(RequestMeta::default());
    let meta_for_terminal = meta.clone();
    let result = chain
      .run_with_terminal(
        Request { path: path.to_string() },
        meta.clone(),
        Arc::clone(&client),
        Arc::new(()),
        terminal_fn(move || async move {
          meta_for_terminal.write().log.push("responded".to_string());
          Ok::<(), BatonError>(())
        }),
      )
      .await?;

    match result {
      ChainResult::Completed => info!(%path, "completed"),
      ChainResult::Halted { at } => info!(%path, at, "halted"),
      ChainResult::Detached { reached } => info!(%path, reached, "still running detached"),
    }
    for line in meta.read().log.iter() {
      info!("  {}", line);
    }
  }

  Ok(())
}
