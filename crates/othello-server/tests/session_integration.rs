//! End-to-end tests: real TCP clients against the listener on a loopback port.

use std::time::Duration;

use othello_core::protocol::messages::{InfoKind, MoveRequest};
use othello_core::{encode_message, EndReason, FrameReader, OthelloMessage, Outcome, Player};
use othello_server::infrastructure::network::listener::{serve, ServerOptions};
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::timeout;

const STEP: Duration = Duration::from_secs(5);

struct TestClient {
    reader: FrameReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    seq: u64,
}

impl TestClient {
    async fn connect(addr: std::net::SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect");
        let (r, w) = stream.into_split();
        Self {
            reader: FrameReader::new(r),
            writer: w,
            seq: 0,
        }
    }

    async fn recv(&mut self) -> OthelloMessage {
        timeout(STEP, self.reader.next_message())
            .await
            .expect("timed out waiting for a message")
            .expect("read error")
            .expect("unexpected end of stream")
    }

    async fn send(&mut self, msg: OthelloMessage) {
        let bytes = encode_message(&msg, self.seq).expect("encode");
        self.seq += 1;
        self.send_raw(&bytes).await;
    }

    async fn send_raw(&mut self, bytes: &[u8]) {
        self.writer.write_all(bytes).await.expect("send");
    }

    /// True once the server has closed the connection.
    async fn is_closed(&mut self) -> bool {
        matches!(
            timeout(STEP, self.reader.next_message()).await,
            Ok(Ok(None)) | Ok(Err(_))
        )
    }
}

async fn start_server() -> (std::net::SocketAddr, JoinHandle<anyhow::Result<()>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let handle = tokio::spawn(serve(listener, ServerOptions::default()));
    (addr, handle)
}

/// Connects Black and White and drains the join traffic.
async fn seated_pair(addr: std::net::SocketAddr) -> (TestClient, TestClient) {
    let mut black = TestClient::connect(addr).await;
    assert!(matches!(black.recv().await, OthelloMessage::Welcome(w) if w.player == Player::Black));
    assert!(matches!(
        black.recv().await,
        OthelloMessage::Info(i) if i.kind == InfoKind::WaitingForOpponent
    ));

    let mut white = TestClient::connect(addr).await;
    assert!(matches!(white.recv().await, OthelloMessage::Welcome(w) if w.player == Player::White));
    assert!(matches!(white.recv().await, OthelloMessage::State(s) if s.active == Some(Player::Black)));
    assert!(matches!(black.recv().await, OthelloMessage::State(s) if s.active == Some(Player::Black)));

    (black, white)
}

#[tokio::test]
async fn test_two_clients_join_and_a_move_reaches_both() {
    // Arrange
    let (addr, server) = start_server().await;
    let (mut black, mut white) = seated_pair(addr).await;

    // Act
    black
        .send(OthelloMessage::Move(MoveRequest {
            row: 2,
            col: 3,
            claimed: Player::Black,
        }))
        .await;

    // Assert
    for client in [&mut black, &mut white] {
        match client.recv().await {
            OthelloMessage::State(state) => {
                assert_eq!(state.active, Some(Player::White));
                let discs = state.board().count_discs();
                assert_eq!((discs.black, discs.white), (4, 1));
            }
            other => panic!("expected STATE, got {other:?}"),
        }
    }

    drop(black);
    drop(white);
    timeout(STEP, server).await.unwrap().unwrap().unwrap();
}

#[tokio::test]
async fn test_illegal_move_is_rejected_to_sender_only() {
    // Arrange
    let (addr, server) = start_server().await;
    let (mut black, mut white) = seated_pair(addr).await;

    // Act – (0,0) flips nothing on the opening board
    black
        .send(OthelloMessage::Move(MoveRequest {
            row: 0,
            col: 0,
            claimed: Player::Black,
        }))
        .await;

    // Assert – once Black has the rejection, White's next frame is its own chat
    assert!(matches!(
        black.recv().await,
        OthelloMessage::MoveRejected { .. }
    ));
    white.send(OthelloMessage::ChatSend("hi".into())).await;
    assert!(matches!(white.recv().await, OthelloMessage::Chat(c) if c.sender == Player::White));

    drop(black);
    drop(white);
    timeout(STEP, server).await.unwrap().unwrap().unwrap();
}

#[tokio::test]
async fn test_surrender_sends_game_over_then_closes() {
    // Arrange
    let (addr, server) = start_server().await;
    let (mut black, mut white) = seated_pair(addr).await;

    // Act
    black.send(OthelloMessage::Surrender).await;

    // Assert
    for client in [&mut black, &mut white] {
        assert!(matches!(client.recv().await, OthelloMessage::State(s) if s.active.is_none()));
        match client.recv().await {
            OthelloMessage::GameOver(result) => {
                assert_eq!(result.outcome, Outcome::Surrendered(Player::Black));
                assert_eq!(result.reason, EndReason::Surrender);
            }
            other => panic!("expected GAME_OVER, got {other:?}"),
        }
        assert!(client.is_closed().await);
    }
    timeout(STEP, server).await.unwrap().unwrap().unwrap();
}

#[tokio::test]
async fn test_disconnect_mid_game_forfeits_to_remaining_client() {
    // Arrange
    let (addr, server) = start_server().await;
    let (black, mut white) = seated_pair(addr).await;

    // Act
    drop(black);

    // Assert
    assert!(matches!(
        white.recv().await,
        OthelloMessage::Info(i) if i.kind == InfoKind::OpponentLeft { player: Player::Black }
    ));
    match white.recv().await {
        OthelloMessage::GameOver(result) => {
            assert_eq!(result.outcome, Outcome::Abandoned(Player::Black));
            assert_eq!(result.reason, EndReason::Disconnect);
            assert_eq!(result.outcome.winner(), Some(Player::White));
        }
        other => panic!("expected GAME_OVER, got {other:?}"),
    }
    assert!(white.is_closed().await);
    timeout(STEP, server).await.unwrap().unwrap().unwrap();
}

#[tokio::test]
async fn test_malformed_frame_drops_only_the_sender_and_forfeits() {
    // Arrange
    let (addr, server) = start_server().await;
    let (mut black, mut white) = seated_pair(addr).await;
    let mut garbage = encode_message(&OthelloMessage::Surrender, 0).unwrap();
    garbage[0] = 0x7F;

    // Act – an unsupported version byte
    black.send_raw(&garbage).await;

    // Assert
    assert!(matches!(
        white.recv().await,
        OthelloMessage::Info(i) if i.kind == InfoKind::OpponentLeft { player: Player::Black }
    ));
    match white.recv().await {
        OthelloMessage::GameOver(result) => {
            assert_eq!(result.outcome, Outcome::Abandoned(Player::Black));
            assert_eq!(result.reason, EndReason::Disconnect);
        }
        other => panic!("expected GAME_OVER, got {other:?}"),
    }
    assert!(white.is_closed().await);
    assert!(black.is_closed().await);
    timeout(STEP, server).await.unwrap().unwrap().unwrap();
}

#[tokio::test]
async fn test_third_client_is_turned_away() {
    // Arrange
    let (addr, server) = start_server().await;
    let (black, white) = seated_pair(addr).await;

    // Act
    let mut third = TestClient::connect(addr).await;

    // Assert
    assert!(third.is_closed().await);

    drop(black);
    drop(white);
    timeout(STEP, server).await.unwrap().unwrap().unwrap();
}
