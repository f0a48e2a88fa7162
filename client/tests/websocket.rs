//! The session loop against a real WebSocket server on the loopback
//! interface.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use minesweeper_live_client::{
    ClientConfig, GameClient, GameId, OutboundCommand, Pos, RecordingView, TokioTimer, ViewCall,
    WebSocketConnector, codec,
};
use tokio::net::{TcpListener, TcpStream};
use tokio_test::assert_ok;
use tokio_tungstenite::{
    WebSocketStream, accept_hdr_async,
    tungstenite::{
        Message,
        handshake::server::{ErrorResponse, Request, Response},
    },
};

type ServerSocket = WebSocketStream<TcpStream>;

async fn accept(listener: &TcpListener, paths: &Arc<Mutex<Vec<String>>>) -> ServerSocket {
    let (stream, _) = listener.accept().await.expect("accept");
    let paths = paths.clone();
    accept_hdr_async(stream, move |request: &Request, response: Response| {
        paths.lock().unwrap().push(request.uri().path().to_string());
        Ok::<Response, ErrorResponse>(response)
    })
    .await
    .expect("handshake")
}

async fn next_command(socket: &mut ServerSocket) -> OutboundCommand {
    loop {
        match socket.next().await.expect("stream ended").expect("frame") {
            Message::Text(text) => {
                return codec::decode_command(text.as_str()).expect("valid command");
            }
            _ => continue,
        }
    }
}

async fn push(socket: &mut ServerSocket, text: &str) {
    socket.send(Message::text(text.to_string())).await.expect("send");
}

#[tokio::test]
async fn reconnects_over_a_real_socket() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let paths = Arc::new(Mutex::new(Vec::new()));

    let config = ClientConfig::new(&format!("http://{addr}/index.html"))
        .unwrap()
        .with_reconnect_delay(Duration::from_millis(20));
    let view = RecordingView::new();
    let game = GameClient::new(&config, WebSocketConnector, view.clone(), TokioTimer)
        .unwrap()
        .spawn();

    let mut first = accept(&listener, &paths).await;
    assert_eq!(next_command(&mut first).await, OutboundCommand::Create);
    assert_eq!(next_command(&mut first).await, OutboundCommand::Show);

    push(&mut first, r#"{"type":"id","id":"g1"}"#).await;
    push(&mut first, r#"{"type":"draw","html":"<table/>","score":5,"flags":2}"#).await;

    let mut updates = game.watch();
    updates
        .wait_for(|state| state.game_id == Some(GameId::from("g1")))
        .await
        .unwrap();

    assert_ok!(game.sweep(Pos::new(4, 2)));
    assert_eq!(
        next_command(&mut first).await,
        OutboundCommand::Sweep(Pos::new(4, 2))
    );

    // Server goes away mid-game
    first.close(None).await.unwrap();
    drop(first);

    let mut second = accept(&listener, &paths).await;
    assert_eq!(
        next_command(&mut second).await,
        OutboundCommand::Join {
            id: GameId::from("g1")
        }
    );
    assert_eq!(next_command(&mut second).await, OutboundCommand::Show);

    push(&mut second, r#"{"type":"gameover"}"#).await;
    updates.wait_for(|state| state.game_over).await.unwrap();

    // The client hangs up after a lost game
    let end = tokio::time::timeout(Duration::from_secs(2), async {
        while let Some(Ok(frame)) = second.next().await {
            if frame.is_close() {
                break;
            }
        }
    })
    .await;
    assert!(end.is_ok());

    assert_eq!(*paths.lock().unwrap(), vec!["/websession", "/websession"]);
    let calls = view.calls();
    assert!(calls.contains(&ViewCall::RenderBoard("<table/>".into())));
    assert!(calls.contains(&ViewCall::Reconnecting));
    assert_eq!(calls.last(), Some(&ViewCall::GameOverBanner));

    game.shutdown().await;
}
