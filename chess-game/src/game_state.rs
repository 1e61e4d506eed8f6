use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use chess::{BitBoard, Board, BoardStatus, ChessMove, Color, Piece};
use thiserror::Error;

use super::{DrawReason, GameResult};

const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;
const FIVEFOLD: usize = 5;
const DARK_SQUARES: BitBoard = BitBoard(0xAA55_AA55_AA55_AA55);

#[derive(Debug, Error)]
#[error("invalid FEN {fen:?}: {reason}")]
pub struct ParseFenError {
    fen: String,
    reason: String,
}

/// A chess board plus the counters the game-over rules need.
#[derive(Clone, Debug)]
pub struct GameState {
    board: Board,
    fullmove_number: u32,
    halfmove_clock: u32,
    // Hashes of every position since the last capture or pawn move, current position last.
    history: Vec<u64>,
}

impl engine::GameState for GameState {
    fn initial() -> Self {
        Self::from_board(Board::default(), 1, 0)
    }
}

impl GameState {
    pub fn from_fen(fen: &str) -> Result<Self, ParseFenError> {
        let parse_error = |reason: String| ParseFenError {
            fen: fen.to_string(),
            reason,
        };

        let board = Board::from_str(fen).map_err(|e| parse_error(format!("{:?}", e)))?;
        let fields = fen.split_whitespace().collect::<Vec<_>>();

        let halfmove_clock = match fields.get(4) {
            Some(field) => field
                .parse::<u32>()
                .map_err(|e| parse_error(format!("halfmove clock: {}", e)))?,
            None => 0,
        };

        let fullmove_number = match fields.get(5) {
            Some(field) => field
                .parse::<u32>()
                .map_err(|e| parse_error(format!("fullmove number: {}", e)))?,
            None => 1,
        };

        Ok(Self::from_board(board, fullmove_number.max(1), halfmove_clock))
    }

    fn from_board(board: Board, fullmove_number: u32, halfmove_clock: u32) -> Self {
        Self {
            history: vec![board.get_hash()],
            board,
            fullmove_number,
            halfmove_clock,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// Piece placement and side to move, the first two FEN fields.
    pub fn placement_and_side(&self) -> String {
        let fen = self.board.to_string();
        fen.split_whitespace().take(2).collect::<Vec<_>>().join(" ")
    }

    pub fn legal_moves(&self) -> Vec<ChessMove> {
        chess::MoveGen::new_legal(&self.board).collect()
    }

    pub fn make_move(&self, action: ChessMove) -> Self {
        let moved_piece = self.board.piece_on(action.get_source());
        let is_pawn_move = moved_piece == Some(Piece::Pawn);
        let is_capture = self.board.piece_on(action.get_dest()).is_some()
            || (is_pawn_move && action.get_source().get_file() != action.get_dest().get_file());

        let board = self.board.make_move_new(action);

        let fullmove_number = if self.board.side_to_move() == Color::Black {
            self.fullmove_number + 1
        } else {
            self.fullmove_number
        };

        let (halfmove_clock, history) = if is_pawn_move || is_capture {
            (0, vec![board.get_hash()])
        } else {
            let mut history = self.history.clone();
            history.push(board.get_hash());
            (self.halfmove_clock + 1, history)
        };

        Self {
            board,
            fullmove_number,
            halfmove_clock,
            history,
        }
    }

    pub fn repetitions(&self) -> usize {
        let current = self.board.get_hash();
        self.history.iter().filter(|h| **h == current).count()
    }

    /// Neither side can ever deliver mate.
    pub fn is_insufficient_material(&self) -> bool {
        [Color::White, Color::Black]
            .into_iter()
            .all(|color| self.has_insufficient_material(color))
    }

    fn has_insufficient_material(&self, color: Color) -> bool {
        let board = &self.board;
        let own = *board.color_combined(color);
        let opponent = *board.color_combined(!color);
        let pawns = *board.pieces(Piece::Pawn);
        let knights = *board.pieces(Piece::Knight);
        let bishops = *board.pieces(Piece::Bishop);

        let heavy = *board.pieces(Piece::Rook) | *board.pieces(Piece::Queen);
        if (own & (pawns | heavy)).popcnt() > 0 {
            return false;
        }

        // A lone knight can still mate when the opponent has pieces that block its own king in.
        if (own & knights).popcnt() > 0 {
            let blockers =
                opponent & !*board.pieces(Piece::King) & !*board.pieces(Piece::Queen);
            return own.popcnt() <= 2 && blockers.popcnt() == 0;
        }

        // Bishops that all stand on one square colour cannot mate without pawns or knights.
        if (own & bishops).popcnt() > 0 {
            let same_colour = (bishops & DARK_SQUARES).popcnt() == 0
                || (bishops & !DARK_SQUARES).popcnt() == 0;
            return same_colour && pawns.popcnt() == 0 && knights.popcnt() == 0;
        }

        true
    }

    pub fn result(&self) -> Option<GameResult> {
        match self.board.status() {
            BoardStatus::Checkmate => {
                return Some(match self.side_to_move() {
                    Color::White => GameResult::BlackWins,
                    Color::Black => GameResult::WhiteWins,
                })
            }
            BoardStatus::Stalemate => return Some(GameResult::Draw(DrawReason::Stalemate)),
            BoardStatus::Ongoing => {}
        }

        if self.is_insufficient_material() {
            Some(GameResult::Draw(DrawReason::InsufficientMaterial))
        } else if self.halfmove_clock >= SEVENTY_FIVE_MOVE_PLIES {
            Some(GameResult::Draw(DrawReason::SeventyFiveMoves))
        } else if self.repetitions() >= FIVEFOLD {
            Some(GameResult::Draw(DrawReason::FivefoldRepetition))
        } else {
            None
        }
    }

    pub fn is_checkmate(&self) -> bool {
        self.board.status() == BoardStatus::Checkmate
    }
}

impl Display for GameState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.placement_and_side(),
            self.fullmove_number
        )
    }
}
