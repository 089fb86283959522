use seabattle::transport::tcp::{encode_length, read_frame, write_frame, TcpConfig, TcpTransport};
use seabattle::transport::{FrameReader, FrameWriter, Transport};
use tokio::net::TcpListener;

const MAX: usize = 64 * 1024;

fn prefix(len: u32) -> Vec<u8> {
    let mut out = Vec::new();
    encode_length(len, &mut out);
    out
}

#[test]
fn test_length_prefix_encoding() {
    assert_eq!(prefix(0), vec![0x00]);
    assert_eq!(prefix(9), vec![0x09]);
    assert_eq!(prefix(127), vec![0x7F]);
    assert_eq!(prefix(128), vec![0x80, 0x01]);
    assert_eq!(prefix(200), vec![0xC8, 0x01]);
    assert_eq!(prefix(300), vec![0xAC, 0x02]);
    assert_eq!(prefix(u32::MAX), vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_write_frame_layout() -> anyhow::Result<()> {
    let mut out = Vec::new();
    write_frame(&mut out, "yourTurn", MAX).await?;
    let mut expected = vec![8u8];
    expected.extend_from_slice(b"yourTurn");
    assert_eq!(out, expected);

    let long = "a".repeat(200);
    let mut out = Vec::new();
    write_frame(&mut out, &long, MAX).await?;
    assert_eq!(&out[..2], &[0xC8, 0x01]);
    assert_eq!(out.len(), 202);

    let mut out = Vec::new();
    assert!(write_frame(&mut out, &long, 100).await.is_err());
    assert!(out.is_empty());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_read_frames_back_to_back() -> anyhow::Result<()> {
    let mut data = Vec::new();
    write_frame(&mut data, "shoot:3'4", MAX).await?;
    write_frame(&mut data, "", MAX).await?;
    write_frame(&mut data, "name:Żaneta", MAX).await?;

    let mut input = data.as_slice();
    assert_eq!(read_frame(&mut input, MAX).await?.as_deref(), Some("shoot:3'4"));
    assert_eq!(read_frame(&mut input, MAX).await?.as_deref(), Some(""));
    assert_eq!(read_frame(&mut input, MAX).await?.as_deref(), Some("name:Żaneta"));
    assert_eq!(read_frame(&mut input, MAX).await?, None);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_malformed_input_is_rejected() {
    // Truncated payload.
    let mut input: &[u8] = &[0x05, b'y', b'o'];
    assert!(read_frame(&mut input, MAX).await.is_err());

    // Truncated prefix.
    let mut input: &[u8] = &[0x80];
    assert!(read_frame(&mut input, MAX).await.is_err());

    // Longer than allowed.
    let mut input: &[u8] = &[0xAC, 0x02];
    assert!(read_frame(&mut input, 299).await.is_err());

    // Fifth prefix byte carries more than 32 bits.
    let mut input: &[u8] = &[0xFF, 0xFF, 0xFF, 0xFF, 0x1F];
    assert!(read_frame(&mut input, MAX).await.is_err());

    // Not UTF-8.
    let mut input: &[u8] = &[0x02, 0xC3, 0x28];
    assert!(read_frame(&mut input, MAX).await.is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_tcp_round_trip() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await?;
        let (mut reader, mut writer) = TcpTransport::new(socket).into_split();
        while let Some(frame) = reader.recv_frame().await? {
            writer.send_frame(&format!("echo {}", frame)).await?;
        }
        anyhow::Ok(())
    });

    let (mut reader, mut writer) = TcpTransport::connect(addr).await?.into_split();
    let long = "x".repeat(1000);
    for frame in ["name:Tester", "leave", long.as_str()] {
        writer.send_frame(frame).await?;
        let echoed = reader.recv_frame().await?;
        assert_eq!(echoed, Some(format!("echo {}", frame)));
    }

    drop(writer);
    assert_eq!(reader.recv_frame().await?, None);
    server.await??;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_oversized_frame_is_refused_by_writer() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let accept = tokio::spawn(async move { listener.accept().await });

    let stream = tokio::net::TcpStream::connect(addr).await?;
    let config = TcpConfig {
        max_frame_len: 16,
        ..TcpConfig::default()
    };
    let (_reader, mut writer) = TcpTransport::with_config(stream, config).into_split();
    assert!(writer.send_frame(&"x".repeat(17)).await.is_err());
    writer.send_frame(&"x".repeat(16)).await?;
    accept.await??;
    Ok(())
}
