use minesweeper_live_common::models::GameId;

/// Logical game identity plus whether that game has ended.
///
/// Outlives individual connections: the identity is what lets a new socket
/// rejoin the game the old one was playing.
#[derive(Debug, Clone, Default)]
pub struct Session {
    identity: Option<GameId>,
    terminal: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the server-assigned identity. First write wins; returns whether
    /// this call stored it.
    pub fn set_identity(&mut self, id: GameId) -> bool {
        if self.identity.is_some() {
            return false;
        }
        self.identity = Some(id);
        true
    }

    /// Returns `true` only for the call that ended the game.
    pub fn mark_terminal(&mut self) -> bool {
        !std::mem::replace(&mut self.terminal, true)
    }

    pub fn has_identity(&self) -> bool {
        self.identity.is_some()
    }

    pub fn identity(&self) -> Option<&GameId> {
        self.identity.as_ref()
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_first_write_wins() {
        let mut session = Session::new();
        assert!(!session.has_identity());

        assert!(session.set_identity(GameId::from("A")));
        assert!(!session.set_identity(GameId::from("B")));
        assert_eq!(session.identity(), Some(&GameId::from("A")));
    }

    #[test]
    fn terminal_transition_reported_once() {
        let mut session = Session::new();
        assert!(!session.is_terminal());

        assert!(session.mark_terminal());
        assert!(!session.mark_terminal());
        assert!(session.is_terminal());
    }
}
