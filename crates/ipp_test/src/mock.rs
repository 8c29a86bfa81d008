use std::net::SocketAddr;

use futures::{SinkExt as _, StreamExt as _};
use serde_json::Value;
use tokio::{
    net::{TcpListener, TcpStream},
    task::JoinHandle,
};
use tokio_tungstenite::{
    WebSocketStream, accept_hdr_async,
    tungstenite::{
        Message,
        handshake::server::{ErrorResponse, Request, Response},
    },
};

/// One step of the server side of a scripted speech session.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Send an event as a JSON text message.
    Event(Value),

    /// Send a raw text message, e.g. to test malformed input.
    Text(String),

    /// Send a close frame.
    Close,

    /// Drop the connection without a closing handshake.
    Reset,
}

/// What the server observed during a session.
#[derive(Debug, Default)]
pub struct Recording {
    /// The request path of the WebSocket upgrade.
    pub path: String,

    /// Every JSON text message received from the client, in order.
    pub messages: Vec<Value>,

    /// Whether the client sent a close frame.
    pub client_closed: bool,
}

/// A single-connection WebSocket server that plays a script.
///
/// The server waits for the client's `end` message, then sends each
/// [`Reply`] in order and keeps reading until the client goes away. A script
/// must end in something that makes the client stop (a sentinel, an error
/// event, [`Reply::Close`] or [`Reply::Reset`]).
pub struct SpeechServer {
    addr: SocketAddr,
    task: JoinHandle<Recording>,
}

impl SpeechServer {
    pub async fn start(script: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind speech server");
        let addr = listener.local_addr().expect("speech server address");
        let task = tokio::spawn(serve(listener, script));

        Self { addr, task }
    }

    /// Base URL of an API whose speech endpoint is this server.
    pub fn base_url(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }

    /// Wait for the session to end and return what the server saw.
    pub async fn finish(self) -> Recording {
        self.task.await.expect("speech server task")
    }
}

async fn serve(listener: TcpListener, script: Vec<Reply>) -> Recording {
    let (stream, _) = listener.accept().await.expect("accept speech client");

    let mut recording = Recording::default();
    let callback = |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
        recording.path = request.uri().path().to_owned();
        Ok(response)
    };

    let mut socket = accept_hdr_async(stream, callback)
        .await
        .expect("websocket handshake");

    while let Some(Ok(message)) = socket.next().await {
        let Some(value) = json(&message) else {
            continue;
        };

        let end = value["type"] == "end";
        recording.messages.push(value);
        if end {
            break;
        }
    }

    for reply in script {
        let message = match reply {
            Reply::Event(value) => Message::Text(value.to_string().into()),
            Reply::Text(text) => Message::Text(text.into()),
            Reply::Close => {
                socket.close(None).await.ok();
                break;
            }
            Reply::Reset => return recording,
        };

        if socket.send(message).await.is_err() {
            break;
        }
    }

    drain(&mut socket, &mut recording).await;
    recording
}

async fn drain(socket: &mut WebSocketStream<TcpStream>, recording: &mut Recording) {
    while let Some(Ok(message)) = socket.next().await {
        if let Message::Close(_) = message {
            recording.client_closed = true;
        } else if let Some(value) = json(&message) {
            recording.messages.push(value);
        }
    }
}

fn json(message: &Message) -> Option<Value> {
    match message {
        Message::Text(text) => serde_json::from_str(text.as_str()).ok(),
        _ => None,
    }
}
