use inquire::InquireError;

/// Run a blocking `inquire` prompt off the async executor so background
/// tasks (the mounted feed) keep running while the user types.
///
/// Escape and Ctrl-C come back as `None`.
pub async fn prompt<T, F>(ask: F) -> anyhow::Result<Option<T>>
where
    F: FnOnce() -> Result<T, InquireError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(ask).await? {
        Ok(answer) => Ok(Some(answer)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err.into()),
    }
}
