//! Termination signal handling.
//!
//! Kept in its own test binary: the signals are raised against the whole
//! test process.

use std::time::Duration;

use meshrig::harness::{wait_for_shutdown, ShutdownSignal, TerminationSignal};

fn raise(signal: libc::c_int) {
    // SAFETY: signalling our own pid; handlers are installed before any raise.
    let result = unsafe { libc::kill(libc::getpid(), signal) };
    assert_eq!(result, 0);
}

#[tokio::test]
async fn test_termination_signals_end_the_wait() {
    let shutdown = ShutdownSignal::install().unwrap();
    raise(libc::SIGTERM);
    let received = tokio::time::timeout(Duration::from_secs(5), shutdown.wait())
        .await
        .unwrap();
    assert_eq!(received, TerminationSignal::Terminate);

    // Handlers stay registered for the process from here on, so raising
    // before the waiter subscribes is harmless; keep raising until it sees one.
    let waiter = tokio::spawn(wait_for_shutdown());
    let received = tokio::time::timeout(Duration::from_secs(5), async {
        while !waiter.is_finished() {
            raise(libc::SIGINT);
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        waiter.await.unwrap().unwrap()
    })
    .await
    .unwrap();
    assert_eq!(received, TerminationSignal::Interrupt);
}
