//! Play session: runs user commands against the local view and forwards
//! the accepted ones to the server.

use std::sync::Arc;

use async_trait::async_trait;
use othello_core::OthelloMessage;
use tracing::debug;

use crate::application::commands::Command;
use crate::application::game_view::{GameView, LocalReject, ViewEvent};
use crate::infrastructure::network::ClientNetworkError;

/// Outbound side of the connection to the server.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameSender: Send + Sync {
    async fn send(&self, msg: &OthelloMessage) -> Result<(), ClientNetworkError>;
}

/// What the front end should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The intent went to the server; wait for its answer.
    Sent,
    /// The local view refused the intent; nothing was sent.
    Refused(LocalReject),
    ShowBoard,
    ShowHelp,
    Quit,
}

/// Owns the [`GameView`] and the sender for one connection.
pub struct PlaySession {
    view: GameView,
    sender: Arc<dyn GameSender>,
}

impl PlaySession {
    pub fn new(view: GameView, sender: Arc<dyn GameSender>) -> Self {
        Self { view, sender }
    }

    pub fn view(&self) -> &GameView {
        &self.view
    }

    /// Applies a message pushed by the server.
    pub fn on_message(&mut self, msg: OthelloMessage) -> Option<ViewEvent> {
        self.view.apply(msg)
    }

    /// Runs one user command.
    ///
    /// # Errors
    ///
    /// Propagates send failures; a refused intent is not an error.
    pub async fn on_command(&self, command: Command) -> Result<CommandOutcome, ClientNetworkError> {
        let msg = match command {
            Command::Move { row, col } => match self.view.check_move(row, col) {
                Ok(request) => OthelloMessage::Move(request),
                Err(reason) => return Ok(CommandOutcome::Refused(reason)),
            },
            Command::Surrender => match self.view.check_surrender() {
                Ok(()) => OthelloMessage::Surrender,
                Err(reason) => return Ok(CommandOutcome::Refused(reason)),
            },
            Command::Chat(text) => OthelloMessage::ChatSend(text),
            Command::Board => return Ok(CommandOutcome::ShowBoard),
            Command::Help => return Ok(CommandOutcome::ShowHelp),
            Command::Quit => return Ok(CommandOutcome::Quit),
        };

        debug!("sending {:?}", msg.message_type());
        self.sender.send(&msg).await?;
        Ok(CommandOutcome::Sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use othello_core::protocol::messages::{MoveRequest, StateMessage, WelcomeMessage};
    use othello_core::{Game, Player};

    fn session_for(player: Player, sender: MockGameSender) -> PlaySession {
        let mut session = PlaySession::new(GameView::new(player), Arc::new(sender));
        session.on_message(OthelloMessage::Welcome(WelcomeMessage {
            player,
            text: String::new(),
        }));
        session.on_message(OthelloMessage::State(StateMessage::from_game(&Game::new())));
        session
    }

    #[tokio::test]
    async fn test_legal_move_is_sent_with_own_colour() {
        // Arrange
        let mut sender = MockGameSender::new();
        sender
            .expect_send()
            .with(eq(OthelloMessage::Move(MoveRequest {
                row: 2,
                col: 3,
                claimed: Player::Black,
            })))
            .times(1)
            .returning(|_| Ok(()));
        let session = session_for(Player::Black, sender);

        // Act
        let outcome = session.on_command(Command::Move { row: 2, col: 3 }).await;

        // Assert
        assert_eq!(outcome.unwrap(), CommandOutcome::Sent);
    }

    #[tokio::test]
    async fn test_move_on_opponents_turn_is_not_sent() {
        let mut sender = MockGameSender::new();
        sender.expect_send().never();
        let session = session_for(Player::White, sender);

        let outcome = session.on_command(Command::Move { row: 2, col: 4 }).await;

        assert_eq!(
            outcome.unwrap(),
            CommandOutcome::Refused(LocalReject::NotYourTurn)
        );
    }

    #[tokio::test]
    async fn test_surrender_off_turn_is_not_sent() {
        let mut sender = MockGameSender::new();
        sender.expect_send().never();
        let session = session_for(Player::White, sender);

        let outcome = session.on_command(Command::Surrender).await;

        assert_eq!(
            outcome.unwrap(),
            CommandOutcome::Refused(LocalReject::NotYourTurn)
        );
    }

    #[tokio::test]
    async fn test_chat_is_sent_regardless_of_turn() {
        let mut sender = MockGameSender::new();
        sender
            .expect_send()
            .with(eq(OthelloMessage::ChatSend("hello".into())))
            .times(1)
            .returning(|_| Ok(()));
        let session = session_for(Player::White, sender);

        let outcome = session.on_command(Command::Chat("hello".into())).await;

        assert_eq!(outcome.unwrap(), CommandOutcome::Sent);
    }

    #[tokio::test]
    async fn test_send_failure_is_propagated() {
        let mut sender = MockGameSender::new();
        sender
            .expect_send()
            .returning(|_| Err(ClientNetworkError::Closed));
        let session = session_for(Player::Black, sender);

        let outcome = session.on_command(Command::Surrender).await;

        assert!(matches!(outcome, Err(ClientNetworkError::Closed)));
    }

    #[tokio::test]
    async fn test_local_commands_never_touch_the_network() {
        let mut sender = MockGameSender::new();
        sender.expect_send().never();
        let session = session_for(Player::Black, sender);

        assert_eq!(
            session.on_command(Command::Board).await.unwrap(),
            CommandOutcome::ShowBoard
        );
        assert_eq!(
            session.on_command(Command::Help).await.unwrap(),
            CommandOutcome::ShowHelp
        );
        assert_eq!(
            session.on_command(Command::Quit).await.unwrap(),
            CommandOutcome::Quit
        );
    }
}
