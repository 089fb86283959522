use tokio::sync::mpsc;

use crate::transport::{FrameReader, FrameWriter, Transport};

/// One end of an in-process connection.
pub struct InMemoryTransport {
    reader: InMemoryReader,
    writer: InMemoryWriter,
}

pub struct InMemoryReader {
    rx: mpsc::UnboundedReceiver<String>,
}

pub struct InMemoryWriter {
    tx: mpsc::UnboundedSender<String>,
}

impl InMemoryTransport {
    /// Two connected ends. Dropping one end (or its writer) closes the other
    /// end's reader.
    pub fn pair() -> (Self, Self) {
        let (tx1, rx1) = mpsc::unbounded_channel();
        let (tx2, rx2) = mpsc::unbounded_channel();
        (
            Self {
                reader: InMemoryReader { rx: rx1 },
                writer: InMemoryWriter { tx: tx2 },
            },
            Self {
                reader: InMemoryReader { rx: rx2 },
                writer: InMemoryWriter { tx: tx1 },
            },
        )
    }
}

impl Transport for InMemoryTransport {
    type Reader = InMemoryReader;
    type Writer = InMemoryWriter;

    fn into_split(self) -> (Self::Reader, Self::Writer) {
        (self.reader, self.writer)
    }
}

#[async_trait::async_trait]
impl FrameReader for InMemoryReader {
    async fn recv_frame(&mut self) -> anyhow::Result<Option<String>> {
        Ok(self.rx.recv().await)
    }
}

#[async_trait::async_trait]
impl FrameWriter for InMemoryWriter {
    async fn send_frame(&mut self, frame: &str) -> anyhow::Result<()> {
        self.tx
            .send(frame.to_string())
            .map_err(|_| anyhow::anyhow!("Channel closed"))
    }
}
