//! Running sync collaborators from async code

use crate::error::PipelineError;
use actes_domain::CollaboratorKind;
use std::time::Duration;
use tokio::time::timeout;

/// Run a blocking collaborator call on the blocking pool, bounded by `limit`
///
/// A call that times out keeps running on its worker thread; its result is
/// discarded.
pub(crate) async fn call_blocking<T, E, F>(
    collaborator: CollaboratorKind,
    limit: Duration,
    f: F,
) -> Result<T, PipelineError>
where
    T: Send + 'static,
    E: Into<PipelineError> + Send + 'static,
    F: FnOnce() -> Result<T, E> + Send + 'static,
{
    let task = tokio::task::spawn_blocking(f);

    let joined = timeout(limit, task)
        .await
        .map_err(|_| PipelineError::Timeout {
            collaborator,
            secs: limit.as_secs(),
        })?;

    joined
        .map_err(|e| PipelineError::CollaboratorUnavailable {
            collaborator,
            message: format!("Task join error: {}", e),
        })?
        .map_err(Into::into)
}
