//! Cancellable wrapper for foreign decoder calls.
//!
//! The multimedia probe and document renderer are native, blocking, and known
//! to hang on malformed input. Callers run them through [`call`], which moves
//! the work to a blocking thread and enforces a wall-clock deadline. Scoped
//! resources inside the operation (temp artifacts in particular) are cleaned
//! up by their own drop guards even when the deadline fires first.

use crate::{Error, Result};
use std::time::Duration;
use tokio::{task::spawn_blocking, time::timeout};

pub async fn call<T>(
	deadline: Duration,
	operation: impl FnOnce() -> Result<T> + Send + 'static,
) -> Result<T>
where
	T: Send + 'static,
{
	match timeout(deadline, spawn_blocking(operation)).await {
		Ok(Ok(result)) => result,
		Ok(Err(join_error)) => Err(Error::ForeignTask(join_error.to_string())),
		Err(_) => Err(Error::DeadlineExceeded),
	}
}
