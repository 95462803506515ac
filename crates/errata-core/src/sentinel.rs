//! Detection of cancellation and deadline conditions anywhere in an error chain

use std::error::Error as StdError;
use std::io;

use thiserror::Error;

/// The caller abandoned the operation before it finished
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Error)]
#[error("operation canceled")]
pub struct Canceled;

/// The operation ran past its deadline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Error)]
#[error("deadline exceeded")]
pub struct DeadlineExceeded;

/// Iterate an error and all of its sources, outermost first
pub fn chain<'a>(err: &'a (dyn StdError + 'static)) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(Some(err), |&current| current.source())
}

/// Whether the chain contains a cancellation
///
/// Matches [`Canceled`] and cancelled tokio task joins.
#[must_use]
pub fn is_cancellation(err: &(dyn StdError + 'static)) -> bool {
    chain(err).any(|link| {
        link.is::<Canceled>()
            || link
                .downcast_ref::<tokio::task::JoinError>()
                .is_some_and(tokio::task::JoinError::is_cancelled)
    })
}

/// Whether the chain contains an elapsed deadline
///
/// Matches [`DeadlineExceeded`], tokio and tower timeout errors, and I/O
/// errors of kind `TimedOut`.
#[must_use]
pub fn is_deadline_exceeded(err: &(dyn StdError + 'static)) -> bool {
    chain(err).any(|link| {
        link.is::<DeadlineExceeded>()
            || link.is::<tokio::time::error::Elapsed>()
            || link.is::<tower::timeout::error::Elapsed>()
            || link
                .downcast_ref::<io::Error>()
                .is_some_and(|io_err| io_err.kind() == io::ErrorKind::TimedOut)
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::StatusError;

    #[test]
    fn direct_sentinels() {
        assert!(is_cancellation(&Canceled));
        assert!(!is_deadline_exceeded(&Canceled));
        assert!(is_deadline_exceeded(&DeadlineExceeded));
        assert!(!is_cancellation(&DeadlineExceeded));
    }

    #[test]
    fn wrapped_sentinels() {
        let err = StatusError::bad_request("upload interrupted").with_source(Canceled);
        assert!(is_cancellation(&err));

        let err = anyhow::Error::new(DeadlineExceeded).context("loading profile");
        assert!(is_deadline_exceeded(&*err));
    }

    #[test]
    fn unrelated_errors_match_nothing() {
        let err = StatusError::not_found("missing");
        assert!(!is_cancellation(&err));
        assert!(!is_deadline_exceeded(&err));
    }

    #[test]
    fn io_timeout_is_deadline() {
        let err = io::Error::new(io::ErrorKind::TimedOut, "read timed out");
        assert!(is_deadline_exceeded(&err));

        let err = io::Error::new(io::ErrorKind::ConnectionReset, "reset");
        assert!(!is_deadline_exceeded(&err));
    }

    #[test]
    fn chain_walks_outermost_first() {
        let err = StatusError::conflict("outer").with_source(StatusError::bad_request("inner"));
        let messages: Vec<_> = chain(&err).map(ToString::to_string).collect();
        assert_eq!(messages, ["outer", "inner"]);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_timeout_is_deadline() {
        let err = tokio::time::timeout(Duration::from_millis(10), std::future::pending::<()>())
            .await
            .unwrap_err();
        assert!(is_deadline_exceeded(&err));
    }

    #[tokio::test]
    async fn aborted_task_is_cancellation() {
        let handle = tokio::spawn(std::future::pending::<()>());
        handle.abort();
        let err = handle.await.unwrap_err();
        assert!(is_cancellation(&err));
    }
}
