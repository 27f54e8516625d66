use async_trait::async_trait;
use bytes::Bytes;
use std::future::Future;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::{Error, Result};

/// A body that arrives in chunks
#[async_trait]
pub trait ChunkSource: Send {
    /// Total body length, if announced up front
    fn content_length(&self) -> Option<u64>;

    /// Next chunk of the body, or `None` at the end
    async fn next_chunk(&mut self) -> Result<Option<Bytes>>;
}

#[async_trait]
impl ChunkSource for reqwest::Response {
    fn content_length(&self) -> Option<u64> {
        reqwest::Response::content_length(self)
    }

    async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        Ok(self.chunk().await?)
    }
}

/// Progress report sent after every received chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    pub received: u64,
    pub total: Option<u64>,
    /// Percentage of `total`, when the length is known
    pub percent: Option<u8>,
}

impl DownloadProgress {
    fn new(received: u64, total: Option<u64>) -> Self {
        let percent = total
            .filter(|&t| t > 0)
            .map(|t| (received.saturating_mul(100) / t).min(100) as u8);
        Self {
            received,
            total,
            percent,
        }
    }
}

/// How a download ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Completed(Vec<u8>),
    Canceled,
}

/// Drain `source` into memory, reporting progress on `progress`.
///
/// The token is checked before every chunk; once it fires the partial body
/// is dropped and [`DownloadOutcome::Canceled`] is returned. A closed
/// progress receiver does not stop the download.
pub async fn download_from<S: ChunkSource>(
    mut source: S,
    cancel: &CancellationToken,
    progress: &mpsc::UnboundedSender<DownloadProgress>,
) -> Result<DownloadOutcome> {
    let total = source.content_length();
    let mut body = Vec::with_capacity(total.unwrap_or(0).min(64 * 1024 * 1024) as usize);

    loop {
        let chunk = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(received = body.len(), "download canceled");
                return Ok(DownloadOutcome::Canceled);
            }
            chunk = source.next_chunk() => chunk?,
        };

        let Some(chunk) = chunk else {
            break;
        };

        body.extend_from_slice(&chunk);
        let report = DownloadProgress::new(body.len() as u64, total);
        trace!(received = report.received, percent = ?report.percent, "chunk received");
        let _ = progress.send(report);
    }

    debug!(bytes = body.len(), "download complete");
    Ok(DownloadOutcome::Completed(body))
}

/// A download running on a background task
pub struct DownloadTask {
    /// Progress reports; closes when the download ends
    pub progress: mpsc::UnboundedReceiver<DownloadProgress>,
    /// Final result of the download
    pub result: oneshot::Receiver<Result<DownloadOutcome>>,
}

impl DownloadTask {
    pub(crate) fn spawn<F, Fut>(run: F) -> Self
    where
        F: FnOnce(mpsc::UnboundedSender<DownloadProgress>) -> Fut,
        Fut: Future<Output = Result<DownloadOutcome>> + Send + 'static,
    {
        let (progress_tx, progress) = mpsc::unbounded_channel();
        let (result_tx, result) = oneshot::channel();
        let download = run(progress_tx);

        tokio::spawn(async move {
            // The caller may have stopped waiting
            let _ = result_tx.send(download.await);
        });

        Self { progress, result }
    }

    /// Wait for the download to finish, discarding any unread progress.
    pub async fn join(self) -> Result<DownloadOutcome> {
        self.result
            .await
            .map_err(|_| Error::internal("download task ended without a result"))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;

    /// In-memory body, optionally canceling a token once a number of chunks
    /// has been served
    struct MemorySource {
        chunks: VecDeque<Bytes>,
        total: Option<u64>,
        cancel_after: Option<(usize, CancellationToken)>,
        served: usize,
    }

    impl MemorySource {
        fn new(chunks: &[&[u8]]) -> Self {
            let total = chunks.iter().map(|c| c.len() as u64).sum();
            Self {
                chunks: chunks.iter().map(|c| Bytes::copy_from_slice(c)).collect(),
                total: Some(total),
                cancel_after: None,
                served: 0,
            }
        }

        fn unknown_length(mut self) -> Self {
            self.total = None;
            self
        }

        fn cancel_after(mut self, chunks: usize, token: CancellationToken) -> Self {
            self.cancel_after = Some((chunks, token));
            self
        }
    }

    #[async_trait]
    impl ChunkSource for MemorySource {
        fn content_length(&self) -> Option<u64> {
            self.total
        }

        async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
            self.served += 1;
            if let Some((limit, token)) = &self.cancel_after {
                if self.served == *limit {
                    token.cancel();
                }
            }
            Ok(self.chunks.pop_front())
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<DownloadProgress>) -> Vec<DownloadProgress> {
        let mut reports = Vec::new();
        while let Ok(report) = rx.try_recv() {
            reports.push(report);
        }
        reports
    }

    #[tokio::test]
    async fn test_download_completes_with_progress() {
        let source = MemorySource::new(&[b"abcd", b"efgh", b"ijkl", b"mnop"]);
        let cancel = CancellationToken::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let outcome = download_from(source, &cancel, &tx).await.unwrap();
        assert_eq!(
            outcome,
            DownloadOutcome::Completed(b"abcdefghijklmnop".to_vec())
        );

        let percents: Vec<_> = drain(&mut rx).iter().map(|p| p.percent).collect();
        assert_eq!(percents, vec![Some(25), Some(50), Some(75), Some(100)]);
    }

    #[tokio::test]
    async fn test_unknown_length_has_no_percent() {
        let source = MemorySource::new(&[b"abc", b"de"]).unknown_length();
        let cancel = CancellationToken::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        download_from(source, &cancel, &tx).await.unwrap();
        let reports = drain(&mut rx);
        assert_eq!(
            reports,
            vec![
                DownloadProgress {
                    received: 3,
                    total: None,
                    percent: None
                },
                DownloadProgress {
                    received: 5,
                    total: None,
                    percent: None
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_canceled_before_start() {
        let source = MemorySource::new(&[b"abcd"]);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let outcome = download_from(source, &cancel, &tx).await.unwrap();
        assert_eq!(outcome, DownloadOutcome::Canceled);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_canceled_mid_download() {
        let cancel = CancellationToken::new();
        let source =
            MemorySource::new(&[b"aa", b"bb", b"cc", b"dd"]).cancel_after(2, cancel.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let outcome = download_from(source, &cancel, &tx).await.unwrap();
        assert_eq!(outcome, DownloadOutcome::Canceled);
        assert_eq!(drain(&mut rx).len(), 2);
    }

    #[tokio::test]
    async fn test_spawned_task_reports_result() {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let mut task = DownloadTask::spawn(move |progress| async move {
            let source = MemorySource::new(&[b"rom", b"forge"]);
            download_from(source, &token, &progress).await
        });

        let mut last = None;
        while let Some(report) = task.progress.recv().await {
            last = Some(report);
        }
        assert_eq!(last.map(|p| p.received), Some(8));
        assert_eq!(
            task.join().await.unwrap(),
            DownloadOutcome::Completed(b"romforge".to_vec())
        );
    }
}
