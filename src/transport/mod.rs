//! Frame transports. A frame is one complete protocol command.

/// Receiving half of a connection.
#[async_trait::async_trait]
pub trait FrameReader: Send {
    /// Waits for the next frame. Returns `Ok(None)` when the peer closed the
    /// connection cleanly between frames.
    async fn recv_frame(&mut self) -> anyhow::Result<Option<String>>;
}

/// Sending half of a connection.
#[async_trait::async_trait]
pub trait FrameWriter: Send {
    async fn send_frame(&mut self, frame: &str) -> anyhow::Result<()>;
}

/// A bidirectional connection that can be split so that reading and writing
/// run on separate tasks.
pub trait Transport: Send + 'static {
    type Reader: FrameReader + 'static;
    type Writer: FrameWriter + 'static;

    fn into_split(self) -> (Self::Reader, Self::Writer);
}

pub mod in_memory;
pub mod tcp;
