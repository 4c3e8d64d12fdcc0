//! Line grammar exchanged between host and guest.
//!
//! | Line | Direction |
//! |---|---|
//! | `ACK` | either |
//! | `user_choice` | host → guest |
//! | `1` / `2` | guest → host |
//! | `user_move<N>` | host → guest |
//! | `<coord>` | guest → host |
//! | `ia_move <coord>` | host → guest |
//! | `<row> <col> <mark>` | host → guest |
//! | `move_invalid` / `move_occupied` | host → guest |
//! | `<mark> gagne` / `match nul` | host → guest |
//! | `reset_choice` | host → guest |
//! | `oui` / `non` | guest → host |

use derive_more::{Display, Error};
use std::str::FromStr;
use tictactoe_core::{MAX_SIZE, Mark, Position};

/// Who moves first, as answered to `user_choice`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Starter {
    /// `1`: the human starts and plays X.
    #[display("1")]
    Human,
    /// `2`: the automated side starts and plays X.
    #[display("2")]
    Automated,
}

impl Starter {
    /// Mark bound to the human for this choice.
    pub fn human_mark(self) -> Mark {
        match self {
            Starter::Human => Mark::X,
            Starter::Automated => Mark::O,
        }
    }

    /// Mark bound to the automated side for this choice.
    pub fn automated_mark(self) -> Mark {
        self.human_mark().opponent()
    }
}

/// A reply that does not belong to the expected vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Unexpected reply {:?}", text)]
pub struct UnexpectedReply {
    /// The rejected line.
    pub text: String,
}

impl FromStr for Starter {
    type Err = UnexpectedReply;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" => Ok(Starter::Human),
            "2" => Ok(Starter::Automated),
            _ => Err(UnexpectedReply { text: s.to_string() }),
        }
    }
}

/// One protocol line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// `ACK`
    Ack,
    /// `user_choice`
    UserChoice,
    /// `1` or `2`
    StartChoice(Starter),
    /// `user_move<N>`
    UserMove(u32),
    /// `ia_move <coord>`
    AiMove(Position),
    /// `<row> <col> <mark>`
    BoardUpdate {
        /// Square that changed.
        position: Position,
        /// Mark now on it.
        mark: Mark,
    },
    /// `move_invalid`
    MoveInvalid,
    /// `move_occupied`
    MoveOccupied,
    /// `<mark> gagne`
    Won(Mark),
    /// `match nul`
    Draw,
    /// `reset_choice`
    ResetChoice,
    /// `oui` (true) or `non` (false)
    ResetAnswer(bool),
    /// Any other line, e.g. a coordinate typed by the human.
    Text(String),
}

impl Message {
    /// Classifies a received line. Never fails: unknown lines become
    /// [`Message::Text`].
    ///
    /// Coordinates inside `ia_move` are accepted for any supported board
    /// size; the receiver checks them against its own board.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line {
            "ACK" => return Message::Ack,
            "user_choice" => return Message::UserChoice,
            "move_invalid" => return Message::MoveInvalid,
            "move_occupied" => return Message::MoveOccupied,
            "match nul" => return Message::Draw,
            "reset_choice" => return Message::ResetChoice,
            "oui" => return Message::ResetAnswer(true),
            "non" => return Message::ResetAnswer(false),
            _ => {}
        }

        if let Ok(starter) = line.parse::<Starter>() {
            return Message::StartChoice(starter);
        }
        if let Some(n) = line.strip_prefix("user_move").and_then(|n| n.parse().ok()) {
            return Message::UserMove(n);
        }
        if let Some(pos) = line
            .strip_prefix("ia_move ")
            .and_then(|coord| Position::parse(coord.trim(), MAX_SIZE).ok())
        {
            return Message::AiMove(pos);
        }
        if let Some(mark) = line.strip_suffix(" gagne").and_then(|m| m.parse().ok()) {
            return Message::Won(mark);
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if let [row, col, mark] = parts.as_slice()
            && let (Ok(row), Ok(col), Ok(mark)) = (
                row.parse::<usize>(),
                col.parse::<usize>(),
                mark.parse::<Mark>(),
            )
        {
            return Message::BoardUpdate {
                position: Position::new(row, col),
                mark,
            };
        }

        Message::Text(line.to_string())
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Message::Ack => write!(f, "ACK"),
            Message::UserChoice => write!(f, "user_choice"),
            Message::StartChoice(starter) => write!(f, "{}", starter),
            Message::UserMove(n) => write!(f, "user_move{}", n),
            Message::AiMove(pos) => write!(f, "ia_move {}", pos),
            Message::BoardUpdate { position, mark } => {
                write!(f, "{} {} {}", position.row(), position.col(), mark)
            }
            Message::MoveInvalid => write!(f, "move_invalid"),
            Message::MoveOccupied => write!(f, "move_occupied"),
            Message::Won(mark) => write!(f, "{} gagne", mark),
            Message::Draw => write!(f, "match nul"),
            Message::ResetChoice => write!(f, "reset_choice"),
            Message::ResetAnswer(true) => write!(f, "oui"),
            Message::ResetAnswer(false) => write!(f, "non"),
            Message::Text(text) => write!(f, "{}", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_forms() {
        let pos = Position::new(1, 2);
        assert_eq!(Message::UserMove(3).to_string(), "user_move3");
        assert_eq!(Message::AiMove(pos).to_string(), "ia_move c2");
        assert_eq!(
            Message::BoardUpdate { position: pos, mark: Mark::O }.to_string(),
            "1 2 O"
        );
        assert_eq!(Message::Won(Mark::X).to_string(), "X gagne");
        assert_eq!(Message::Draw.to_string(), "match nul");
        assert_eq!(Message::ResetAnswer(false).to_string(), "non");
    }

    #[test]
    fn test_parse_host_messages() {
        assert_eq!(Message::parse("user_choice"), Message::UserChoice);
        assert_eq!(Message::parse("user_move12"), Message::UserMove(12));
        assert_eq!(
            Message::parse("ia_move b3"),
            Message::AiMove(Position::new(2, 1))
        );
        assert_eq!(
            Message::parse("0 2 X"),
            Message::BoardUpdate {
                position: Position::new(0, 2),
                mark: Mark::X
            }
        );
        assert_eq!(Message::parse("O gagne"), Message::Won(Mark::O));
        assert_eq!(Message::parse("match nul\r"), Message::Draw);
    }

    #[test]
    fn test_parse_guest_replies() {
        assert_eq!(Message::parse("2"), Message::StartChoice(Starter::Automated));
        assert_eq!(Message::parse("oui"), Message::ResetAnswer(true));
        assert_eq!(Message::parse("a1"), Message::Text("a1".to_string()));
        assert_eq!(Message::parse("user_movex"), Message::Text("user_movex".to_string()));
    }

    #[test]
    fn test_starter_marks() {
        assert_eq!(Starter::Human.human_mark(), Mark::X);
        assert_eq!(Starter::Automated.human_mark(), Mark::O);
        assert_eq!(Starter::Automated.automated_mark(), Mark::X);
        assert!("3".parse::<Starter>().is_err());
    }
}
