//! TCP transport.
//!
//! Each frame is written the way .NET's `BinaryWriter.Write(string)` writes a
//! string: the UTF-8 byte length as a 7-bit encoded integer (low groups
//! first, high bit set on every byte but the last) followed by the bytes.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::{timeout, Duration};

use crate::transport::{FrameReader, FrameWriter, Transport};

/// Default timeout for writing one frame (30 seconds).
const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Default maximum frame size (64 KiB). A full fleet is well under 200 bytes.
const DEFAULT_MAX_FRAME_LEN: usize = 64 * 1024;

/// A 32-bit length never needs more than five 7-bit groups.
const MAX_PREFIX_BYTES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpConfig {
    pub max_frame_len: usize,
    pub write_timeout: Duration,
}

impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

pub struct TcpTransport {
    stream: TcpStream,
    config: TcpConfig,
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> Self {
        Self::with_config(stream, TcpConfig::default())
    }

    pub fn with_config(stream: TcpStream, config: TcpConfig) -> Self {
        Self { stream, config }
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        let _ = stream.set_nodelay(true);
        Ok(Self::new(stream))
    }
}

impl Transport for TcpTransport {
    type Reader = TcpFrameReader;
    type Writer = TcpFrameWriter;

    fn into_split(self) -> (Self::Reader, Self::Writer) {
        let (read, write) = self.stream.into_split();
        (
            TcpFrameReader {
                inner: BufReader::new(read),
                max_frame_len: self.config.max_frame_len,
            },
            TcpFrameWriter {
                inner: write,
                config: self.config,
            },
        )
    }
}

pub struct TcpFrameReader {
    inner: BufReader<OwnedReadHalf>,
    max_frame_len: usize,
}

pub struct TcpFrameWriter {
    inner: OwnedWriteHalf,
    config: TcpConfig,
}

#[async_trait::async_trait]
impl FrameReader for TcpFrameReader {
    async fn recv_frame(&mut self) -> anyhow::Result<Option<String>> {
        read_frame(&mut self.inner, self.max_frame_len).await
    }
}

#[async_trait::async_trait]
impl FrameWriter for TcpFrameWriter {
    async fn send_frame(&mut self, frame: &str) -> anyhow::Result<()> {
        timeout(
            self.config.write_timeout,
            write_frame(&mut self.inner, frame, self.config.max_frame_len),
        )
        .await
        .map_err(|_| anyhow::anyhow!("Send timeout after {:?}", self.config.write_timeout))?
    }
}

fn io_error(e: std::io::Error) -> anyhow::Error {
    match e.kind() {
        std::io::ErrorKind::UnexpectedEof => anyhow::anyhow!("Connection closed mid-frame"),
        std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::ConnectionReset => {
            anyhow::anyhow!("Connection closed by peer")
        }
        _ => anyhow::anyhow!("I/O error: {}", e),
    }
}

/// Appends the 7-bit encoded form of `value` to `out`.
pub fn encode_length(mut value: u32, out: &mut Vec<u8>) {
    while value >= 0x80 {
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Reads one frame. A clean EOF before the first prefix byte yields
/// `Ok(None)`; EOF anywhere else is an error.
pub async fn read_frame<R>(reader: &mut R, max_frame_len: usize) -> anyhow::Result<Option<String>>
where
    R: AsyncRead + Unpin + Send,
{
    let mut len: u32 = 0;
    let mut shift = 0;
    for i in 0..MAX_PREFIX_BYTES {
        let byte = match reader.read_u8().await {
            Ok(b) => b,
            Err(e) if i == 0 && e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Ok(None)
            }
            Err(e) => return Err(io_error(e)),
        };
        if i == MAX_PREFIX_BYTES - 1 && byte > 0x0F {
            return Err(anyhow::anyhow!("Frame length prefix overflows 32 bits"));
        }
        len |= u32::from(byte & 0x7F) << shift;
        shift += 7;
        if byte & 0x80 == 0 {
            let len = len as usize;
            if len > max_frame_len {
                return Err(anyhow::anyhow!(
                    "Frame too large: {} bytes (max: {})",
                    len,
                    max_frame_len
                ));
            }
            let mut buf = vec![0u8; len];
            reader.read_exact(&mut buf).await.map_err(io_error)?;
            let frame = String::from_utf8(buf)
                .map_err(|e| anyhow::anyhow!("Frame is not valid UTF-8: {}", e))?;
            return Ok(Some(frame));
        }
    }
    Err(anyhow::anyhow!("Frame length prefix is longer than {} bytes", MAX_PREFIX_BYTES))
}

/// Writes one frame and flushes it.
pub async fn write_frame<W>(writer: &mut W, frame: &str, max_frame_len: usize) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    let bytes = frame.as_bytes();
    if bytes.len() > max_frame_len {
        return Err(anyhow::anyhow!(
            "Frame too large: {} bytes (max: {})",
            bytes.len(),
            max_frame_len
        ));
    }
    let mut data = Vec::with_capacity(bytes.len() + MAX_PREFIX_BYTES);
    encode_length(bytes.len() as u32, &mut data);
    data.extend_from_slice(bytes);
    writer.write_all(&data).await.map_err(io_error)?;
    writer.flush().await.map_err(io_error)?;
    Ok(())
}
