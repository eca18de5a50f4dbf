//! Single-reader, strictly ordered event channel for one turn.
//!
//! Producers (the orchestrator and any nested document generation) hold clones of
//! [`DataStreamWriter`]; exactly one [`DataStreamReader`] drains the channel. The
//! reader stamps each part with a sequence number in delivery order, so sequence
//! numbers are strictly increasing per turn.
//!
//! ```rust
//! use futures_util::StreamExt;
//! use qstream::{DataEvent, StreamPart, drive};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let stream = drive(|writer| async move {
//!     writer.write(StreamPart::Text("hi".into())).await.unwrap();
//!     writer.write_data(DataEvent::Finish).await.unwrap();
//! });
//! let parts: Vec<_> = stream.collect().await;
//! assert_eq!(parts.len(), 2);
//! assert_eq!(parts[1].sequence, 1);
//! # }
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use qcommon::BoxFuture;
use tokio::sync::mpsc;

use crate::{DataEvent, SequencedPart, StreamPart};

/// Channel capacity. A producer waits as soon as one part is pending, which
/// makes every write a hand-off to the reader.
pub const HANDOFF_CAPACITY: usize = 1;

/// Returned by a write after the reader is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelClosed;

impl Display for ChannelClosed {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("event channel is closed")
    }
}

impl Error for ChannelClosed {}

#[derive(Debug, Clone)]
pub struct DataStreamWriter {
    sender: mpsc::Sender<StreamPart>,
}

impl DataStreamWriter {
    pub async fn write(&self, part: StreamPart) -> Result<(), ChannelClosed> {
        self.sender.send(part).await.map_err(|_| ChannelClosed)
    }

    pub async fn write_data(&self, event: DataEvent) -> Result<(), ChannelClosed> {
        self.write(StreamPart::Data(event)).await
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

#[derive(Debug)]
pub struct DataStreamReader {
    receiver: mpsc::Receiver<StreamPart>,
    next_sequence: u64,
}

impl DataStreamReader {
    fn poll_part(&mut self, cx: &mut Context<'_>) -> Poll<Option<SequencedPart>> {
        self.receiver.poll_recv(cx).map(|part| {
            part.map(|part| {
                let sequence = self.next_sequence;
                self.next_sequence += 1;
                SequencedPart { sequence, part }
            })
        })
    }
}

impl Stream for DataStreamReader {
    type Item = SequencedPart;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.poll_part(cx)
    }
}

pub fn channel() -> (DataStreamWriter, DataStreamReader) {
    let (sender, receiver) = mpsc::channel(HANDOFF_CAPACITY);
    (
        DataStreamWriter { sender },
        DataStreamReader {
            receiver,
            next_sequence: 0,
        },
    )
}

/// Reader that also drives the producing future on the same task.
///
/// No extra task is spawned: polling the stream polls the producer whenever the
/// channel is empty. Dropping the stream drops the producer, which cancels any
/// in-flight work it was awaiting.
pub struct DrivenStream<'a> {
    reader: DataStreamReader,
    driver: Option<BoxFuture<'a, ()>>,
}

impl<'a> DrivenStream<'a> {
    pub fn new(reader: DataStreamReader, driver: BoxFuture<'a, ()>) -> Self {
        Self {
            reader,
            driver: Some(driver),
        }
    }

    pub fn is_driver_finished(&self) -> bool {
        self.driver.is_none()
    }
}

impl Stream for DrivenStream<'_> {
    type Item = SequencedPart;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.as_mut().get_mut();
        loop {
            let reader_closed = match this.reader.poll_part(cx) {
                Poll::Ready(Some(part)) => return Poll::Ready(Some(part)),
                Poll::Ready(None) => true,
                Poll::Pending => false,
            };

            let Some(driver) = this.driver.as_mut() else {
                return if reader_closed {
                    Poll::Ready(None)
                } else {
                    Poll::Pending
                };
            };

            match driver.as_mut().poll(cx) {
                // The finished driver drops its writers; drain whatever is left.
                Poll::Ready(()) => this.driver = None,
                Poll::Pending if reader_closed => return Poll::Pending,
                Poll::Pending => {
                    return match this.reader.poll_part(cx) {
                        Poll::Ready(Some(part)) => Poll::Ready(Some(part)),
                        _ => Poll::Pending,
                    };
                }
            }
        }
    }
}

/// Opens a channel and returns a stream driven by `producer`.
pub fn drive<'a, F, Fut>(producer: F) -> DrivenStream<'a>
where
    F: FnOnce(DataStreamWriter) -> Fut,
    Fut: Future<Output = ()> + Send + 'a,
{
    let (writer, reader) = channel();
    DrivenStream::new(reader, Box::pin(producer(writer)))
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;

    use super::*;

    #[tokio::test]
    async fn reader_stamps_increasing_sequence_in_fifo_order() {
        let stream = drive(|writer| async move {
            for index in 0..5 {
                writer
                    .write(StreamPart::Text(index.to_string()))
                    .await
                    .expect("write should succeed");
            }
        });

        let parts: Vec<SequencedPart> = stream.collect().await;
        let sequences: Vec<u64> = parts.iter().map(|part| part.sequence).collect();
        let texts: Vec<StreamPart> = parts.into_iter().map(|part| part.part).collect();

        assert_eq!(sequences, vec![0, 1, 2, 3, 4]);
        assert_eq!(
            texts,
            (0..5)
                .map(|index| StreamPart::Text(index.to_string()))
                .collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn nested_producers_share_one_total_order() {
        let stream = drive(|writer| async move {
            writer
                .write(StreamPart::Text("before".into()))
                .await
                .expect("write");

            let nested = writer.clone();
            nested
                .write_data(DataEvent::Title("Intro".into()))
                .await
                .expect("nested write");
            nested.write_data(DataEvent::Finish).await.expect("finish");

            writer
                .write(StreamPart::Text("after".into()))
                .await
                .expect("write");
        });

        let parts: Vec<StreamPart> = stream.map(|part| part.part).collect().await;
        assert_eq!(
            parts,
            vec![
                StreamPart::Text("before".into()),
                StreamPart::Data(DataEvent::Title("Intro".into())),
                StreamPart::Data(DataEvent::Finish),
                StreamPart::Text("after".into()),
            ]
        );
    }

    #[tokio::test]
    async fn write_after_reader_dropped_fails() {
        let (writer, reader) = channel();
        drop(reader);

        assert!(writer.is_closed());
        let error = writer
            .write(StreamPart::Text("late".into()))
            .await
            .expect_err("write should fail");
        assert_eq!(error, ChannelClosed);
    }

    #[tokio::test]
    async fn dropping_stream_cancels_producer() {
        let (probe_tx, mut probe_rx) = mpsc::unbounded_channel::<&'static str>();
        let mut stream = drive(move |writer| async move {
            writer.write(StreamPart::Text("one".into())).await.ok();
            writer.write(StreamPart::Text("two".into())).await.ok();
            std::future::pending::<()>().await;
            probe_tx.send("unreachable").ok();
        });

        let first = stream.next().await.expect("first part");
        assert_eq!(first.part, StreamPart::Text("one".into()));
        drop(stream);

        assert!(probe_rx.recv().await.is_none());
    }
}
