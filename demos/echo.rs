//! Echo over loopback TCP - framed request/response example.
//!
//! This example demonstrates:
//! - Encoding a serde value into a frame with `MsgPackMessage`
//! - Whole-frame reads and writes on a tokio `TcpStream`
//! - Matching responses to requests by correlation id
//! - Sampling the kernel send queue with `SendQueueLen`
//!
//! ```text
//! cargo run --example echo
//! ```

use framewire::codec::MsgPackMessage;
use framewire::protocol::{Frame, MessageType};
use framewire::transport::SendQueueLen;
use serde::{Deserialize, Serialize};
use tokio::net::{TcpListener, TcpStream};

/// Request body.
#[derive(Serialize, Deserialize, Debug, Default)]
struct EchoInput {
    message: String,
}

/// Response body.
#[derive(Serialize, Deserialize, Debug, Default)]
struct EchoOutput {
    echo: String,
}

/// Answer every `CallReq` with a `CallRes` carrying the same id.
async fn serve(listener: TcpListener) -> framewire::Result<()> {
    let (mut stream, _) = listener.accept().await?;
    let mut frame = Frame::new();

    loop {
        match frame.read_in_async(&mut stream).await {
            Ok(()) => {}
            Err(framewire::FramewireError::ConnectionClosed) => return Ok(()),
            Err(e) => return Err(e),
        }

        let mut request = MsgPackMessage::<EchoInput>::default();
        frame.read(&mut request)?;

        let response = MsgPackMessage::new(
            MessageType::CallRes,
            frame.id(),
            EchoOutput {
                echo: request.value.message,
            },
        );
        frame.write(&response)?;
        frame.write_out_async(&mut stream).await?;
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = tokio::spawn(serve(listener));

    let mut stream = TcpStream::connect(addr).await?;
    let mut frame = Frame::new();

    for (id, text) in [(1u32, "hello"), (2, "framed"), (3, "world")] {
        let request = MsgPackMessage::new(
            MessageType::CallReq,
            id,
            EchoInput {
                message: text.to_string(),
            },
        );
        frame.write(&request)?;
        println!("-> {} {}", frame.header(), frame.header().to_json()?);
        frame.write_out_async(&mut stream).await?;

        match stream.send_queue_len() {
            Ok(queued) => println!("   send queue: {} bytes", queued),
            Err(e) => println!("   send queue: {}", e),
        }

        frame.read_in_async(&mut stream).await?;
        let mut response = MsgPackMessage::<EchoOutput>::default();
        frame.read(&mut response)?;
        println!("<- {} {:?}", frame.header(), response.value);
    }

    drop(stream);
    server.await??;
    Ok(())
}
