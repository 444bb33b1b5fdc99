use std::time::Duration;

use axum::{
    extract::ws::{Message as ServerMessage, WebSocket, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
    Router,
};
use shared::{
    domain::{ConnectionState, ConnectionStatus, Generation},
    protocol::{LogKind, LogLine, TransportEvent, TransportEventKind},
};
use tokio::{
    net::TcpListener,
    sync::{mpsc, oneshot},
    time::timeout,
};

use crate::{
    endpoint::ws_endpoint, ChatSurface, ConnectionController, Connector, TransportHandle,
    WsConnector,
};

async fn echo_handler(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(echo)
}

async fn echo(mut socket: WebSocket) {
    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            ServerMessage::Text(text) => {
                if socket.send(ServerMessage::Text(text)).await.is_err() {
                    break;
                }
            }
            ServerMessage::Close(_) => break,
            _ => {}
        }
    }
}

async fn hangup_handler(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(|mut socket: WebSocket| async move {
        let _ = socket.send(ServerMessage::Text("welcome".to_string())).await;
        let _ = socket.send(ServerMessage::Close(None)).await;
    })
}

async fn spawn_server() -> String {
    let app = Router::new()
        .route("/ws", get(echo_handler))
        .route("/hangup", get(hangup_handler));
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn channel_connector() -> (WsConnector, mpsc::UnboundedReceiver<TransportEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let connector = WsConnector::new(tokio::runtime::Handle::current(), move |event| {
        let _ = tx.send(event);
    });
    (connector, rx)
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<TransportEvent>) -> TransportEvent {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("transport event within timeout")
        .expect("event channel open")
}

#[tokio::test]
async fn echo_round_trip_then_local_close() {
    let origin = spawn_server().await;
    let endpoint = ws_endpoint(&origin, "/ws").expect("endpoint");
    let (mut connector, mut rx) = channel_connector();

    let handle = connector.open(&endpoint, Generation(7));
    assert_eq!(next_event(&mut rx).await, TransportEvent::opened(Generation(7)));

    handle.send_text("hi there").expect("queue frame");
    assert_eq!(
        next_event(&mut rx).await,
        TransportEvent::message(Generation(7), "hi there")
    );

    handle.close();
    assert_eq!(next_event(&mut rx).await, TransportEvent::closed(Generation(7)));
}

#[tokio::test]
async fn refused_connection_reports_close_without_open() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let endpoint = ws_endpoint(&format!("http://{addr}"), "/ws").expect("endpoint");
    let (mut connector, mut rx) = channel_connector();
    let _handle = connector.open(&endpoint, Generation(1));

    assert_eq!(next_event(&mut rx).await, TransportEvent::closed(Generation(1)));
}

#[tokio::test]
async fn close_during_handshake_cancels_connect_with_one_close() {
    // Accepts the TCP connection but never answers the upgrade request.
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (accepted_tx, accepted_rx) = oneshot::channel();
    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.expect("accept");
        let _ = accepted_tx.send(());
        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(socket);
    });

    let endpoint = ws_endpoint(&format!("http://{addr}"), "/ws").expect("endpoint");
    let (mut connector, mut rx) = channel_connector();
    let handle = connector.open(&endpoint, Generation(9));
    timeout(Duration::from_secs(5), accepted_rx)
        .await
        .expect("handshake reached the listener")
        .expect("listener alive");

    handle.close();
    assert_eq!(next_event(&mut rx).await, TransportEvent::closed(Generation(9)));

    // Once every sender is gone the channel ends without further events.
    drop(handle);
    drop(connector);
    let rest = timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("worker finished");
    assert_eq!(rest, None);
}

#[tokio::test]
async fn peer_close_is_reported_after_pending_frames() {
    let origin = spawn_server().await;
    let endpoint = ws_endpoint(&origin, "/hangup").expect("endpoint");
    let (mut connector, mut rx) = channel_connector();
    let _handle = connector.open(&endpoint, Generation(3));

    let kinds = [
        next_event(&mut rx).await.kind,
        next_event(&mut rx).await.kind,
        next_event(&mut rx).await.kind,
    ];
    assert_eq!(
        kinds,
        [
            TransportEventKind::Opened,
            TransportEventKind::Message("welcome".to_string()),
            TransportEventKind::Closed,
        ]
    );
}

#[tokio::test]
async fn dropping_the_handle_closes_the_connection() {
    let origin = spawn_server().await;
    let endpoint = ws_endpoint(&origin, "/ws").expect("endpoint");
    let (mut connector, mut rx) = channel_connector();

    let handle = connector.open(&endpoint, Generation(1));
    assert_eq!(next_event(&mut rx).await.kind, TransportEventKind::Opened);

    drop(handle);
    assert_eq!(next_event(&mut rx).await.kind, TransportEventKind::Closed);
}

#[derive(Default)]
struct LogSurface {
    log: Vec<LogLine>,
    input: String,
    status: Option<ConnectionStatus>,
}

impl ChatSurface for LogSurface {
    fn set_indicator(&mut self, status: ConnectionStatus) {
        self.status = Some(status);
    }

    fn set_toggle_label(&mut self, _label: &str) {}

    fn append_log(&mut self, line: LogLine) {
        self.log.push(line);
    }

    fn input_text(&self) -> String {
        self.input.clone()
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn focus_input(&mut self) {}
}

#[tokio::test]
async fn controller_chats_through_a_real_socket() {
    let origin = spawn_server().await;
    let endpoint = ws_endpoint(&origin, "/ws").expect("endpoint");
    let (connector, mut rx) = channel_connector();
    let mut controller = ConnectionController::new(endpoint, connector, LogSurface::default());

    controller.start(true);
    controller.handle_event(next_event(&mut rx).await);
    assert_eq!(controller.state(), ConnectionState::Connected);

    controller.surface_mut().input = "ping over the wire".to_string();
    controller.submit();
    controller.handle_event(next_event(&mut rx).await);

    let last = controller.surface().log.last().expect("echoed line");
    assert_eq!(last.kind, LogKind::Message);
    assert_eq!(last.text, "ping over the wire");

    controller.toggle();
    controller.handle_event(next_event(&mut rx).await);
    assert_eq!(controller.state(), ConnectionState::Disconnected);
    assert_eq!(
        controller.surface().status,
        Some(ConnectionStatus::Disconnected)
    );
    assert_eq!(
        controller.surface().log.last().map(|line| line.text.as_str()),
        Some("Disconnected")
    );
}
