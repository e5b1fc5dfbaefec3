//! Injectable retry policy for the paginated fetch loops.

use tracing::warn;

use super::RemoteError;

/// How to treat transient remote failures.
///
/// The default mirrors "keep going until the operator kills us": a flaky
/// network should never abort a run that can simply be resumed. Bounded
/// policies exist so tests can observe the terminal error deterministically.
#[derive(Clone, Copy, Debug, Default)]
pub enum RetryPolicy {
    /// Retry transient failures forever, warning each time. No backoff: a
    /// run interrupted here is safe to restart later.
    #[default]
    Unbounded,
    /// Give up after this many failed attempts.
    Limited(u32),
}

impl RetryPolicy {
    /// Run `op` until it succeeds, fails permanently, or the attempt limit
    /// is reached. Transient failures are logged, never silently dropped.
    pub fn run<T, F>(&self, what: &str, mut op: F) -> Result<T, RemoteError>
    where
        F: FnMut() -> Result<T, RemoteError>,
    {
        let mut attempts: u32 = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if e.transience().is_retryable() => {
                    attempts += 1;
                    if let RetryPolicy::Limited(max) = *self
                        && attempts >= max
                    {
                        return Err(RemoteError::RetriesExhausted {
                            attempts,
                            last: Box::new(e),
                        });
                    }
                    warn!(what, attempt = attempts, error = %e, "transient remote failure, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transient() -> RemoteError {
        RemoteError::Status {
            url: "http://wiki.test/x".into(),
            status: 503,
        }
    }

    fn permanent() -> RemoteError {
        RemoteError::Status {
            url: "http://wiki.test/x".into(),
            status: 404,
        }
    }

    #[test]
    fn transient_then_success_succeeds() {
        let mut calls = 0;
        let result = RetryPolicy::Unbounded.run("fetch", || {
            calls += 1;
            if calls < 3 { Err(transient()) } else { Ok(calls) }
        });
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn bounded_policy_surfaces_terminal_error() {
        let mut calls = 0;
        let result: Result<(), _> = RetryPolicy::Limited(4).run("fetch", || {
            calls += 1;
            Err(transient())
        });
        assert_eq!(calls, 4);
        assert!(matches!(
            result,
            Err(RemoteError::RetriesExhausted { attempts: 4, .. })
        ));
    }

    #[test]
    fn permanent_errors_are_not_retried() {
        let mut calls = 0;
        let result: Result<(), _> = RetryPolicy::Unbounded.run("fetch", || {
            calls += 1;
            Err(permanent())
        });
        assert_eq!(calls, 1);
        assert!(matches!(result, Err(RemoteError::Status { status: 404, .. })));
    }
}
