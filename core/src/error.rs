// baton/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BatonError {
  /// A handler advanced when its own index (or a later one) had already been advanced to.
  #[error("Advance called more than once: handler {index} advanced, but index {highest} was already reached")]
  DuplicateAdvance { index: usize, highest: usize },

  #[error("No link named '{name}' in chain")]
  LinkNotFound { name: String },

  #[error("Error in user-provided handler. Source: {source}")]
  HandlerError {
    #[source]
    source: AnyhowError,
  },

  #[error("Internal baton error: {0}")]
  Internal(String),
}

impl BatonError {
  /// Stable identifier carried by [`BatonError::DuplicateAdvance`].
  pub const DUPLICATE_ADVANCE: &'static str = "E_DUPLICATE_ADVANCE";
  pub const LINK_NOT_FOUND: &'static str = "E_LINK_NOT_FOUND";
  pub const HANDLER_ERROR: &'static str = "E_HANDLER";
  pub const INTERNAL: &'static str = "E_INTERNAL";

  /// Machine-readable code for this error, stable across releases.
  pub fn code(&self) -> &'static str {
    match self {
      BatonError::DuplicateAdvance { .. } => Self::DUPLICATE_ADVANCE,
      BatonError::LinkNotFound { .. } => Self::LINK_NOT_FOUND,
      BatonError::HandlerError { .. } => Self::HANDLER_ERROR,
      BatonError::Internal(_) => Self::INTERNAL,
    }
  }

  pub fn is_duplicate_advance(&self) -> bool {
    matches!(self, BatonError::DuplicateAdvance { .. })
  }
}

impl From<AnyhowError> for BatonError {
  fn from(err: AnyhowError) -> Self {
    // An anyhow chain that already carries a BatonError keeps its contract code.
    match err.downcast::<BatonError>() {
      Ok(baton_err) => baton_err,
      Err(source) => BatonError::HandlerError { source },
    }
  }
}

pub type BatonResult<T, E = BatonError> = std::result::Result<T, E>;
