use std::sync::Arc;

use crate::*;

/// Turns `(state, action)` into the next state.
///
/// Besides the rules it only owns the generator used to deal new boards, so given the same generator seed a sequence
/// of actions always produces the same states.
#[derive(Clone, Debug)]
pub struct Reducer<G = RandomMinefieldGenerator> {
    rules: Rules,
    generator: G,
}

impl Reducer {
    pub fn new(rules: Rules) -> Self {
        Self::with_generator(rules, RandomMinefieldGenerator::default())
    }

    pub fn seeded(rules: Rules, seed: u64) -> Self {
        Self::with_generator(rules, RandomMinefieldGenerator::new(seed))
    }
}

impl<G: MinefieldGenerator> Reducer<G> {
    pub fn with_generator(rules: Rules, generator: G) -> Self {
        Self { rules, generator }
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Applies `action` to `state` and returns the new snapshot; `state` itself is left untouched.
    ///
    /// Only coordinates outside the board are errors. Moves made before the first `NewGame` change nothing.
    pub fn reduce(&mut self, state: &GameState, action: &Action) -> Result<GameState> {
        use Action::*;

        Ok(match *action {
            SetMode { mode } => GameState {
                mode,
                ..state.clone()
            },
            SetLevel { level } => GameState {
                level,
                ..state.clone()
            },
            NewGame => self.new_game(state)?,
            OpenField { row, column } => self.open_field(state, Position::new(row, column))?,
            SelectField { row, column } => self.select_field(state, Position::new(row, column))?,
            GameOverTimeUp => self.time_up(state),
            LosePointForExit => GameState {
                score: state.score.saturating_sub(self.rules.scoring.exit_penalty),
                ..state.clone()
            },
            ToggleGameOver => GameState {
                game_over_visible: !state.game_over_visible,
                ..state.clone()
            },
            HidePromotion => GameState {
                promotion_visible: false,
                previous_ranking: None,
                ..state.clone()
            },
            SetBestTime { level, time } => set_best_time(state, level, time),
            RestoreSession { session } => GameState {
                ranking: session.ranking,
                victories_count: session.victories_count,
                score: session.score,
                level: session.level,
                previous_ranking: session.previous_ranking,
                ..state.clone()
            },
            Unknown => state.clone(),
        })
    }

    fn new_game(&mut self, state: &GameState) -> Result<GameState> {
        let difficulty = state.effective_difficulty(&self.rules);
        let params = *self.rules.params(difficulty);

        let mut board = self.generator.generate(&params)?;
        let start = self
            .generator
            .find_safe_position(&board, self.rules.safe_start.attempts);
        board.open_field(start, OpenDepth::Limited(self.rules.safe_start.depth))?;

        let countdown_time = match state.mode {
            Mode::Competitive => self.rules.policy(state.ranking).countdown,
            Mode::Casual => None,
        };
        log::debug!(
            "new {:?} game on {} ({}x{}, {} mines), starting at {:?}",
            state.mode,
            difficulty,
            params.rows,
            params.columns,
            params.mines,
            start
        );

        Ok(GameState {
            board: Some(Arc::new(board)),
            start_position: Some(start),
            won: false,
            lost: false,
            is_win: false,
            game_over_visible: false,
            game_started: true,
            level: difficulty,
            countdown_time,
            ..state.clone()
        })
    }

    fn open_field(&self, state: &GameState, position: Position) -> Result<GameState> {
        if state.is_finished() {
            return Ok(state.clone());
        }

        let Some(board) = state.board() else {
            log::debug!("ignoring move at {:?} before the first game", position);
            return Ok(state.clone());
        };
        let mut board = board.clone();
        board.open_field(position, OpenDepth::Unbounded)?;

        let lost = board.had_explosion();
        let won = !lost && self.rules.win_condition.is_met(&board);
        if lost {
            board.reveal_mines();
        }

        let mut next = GameState {
            board: Some(Arc::new(board)),
            won,
            lost,
            is_win: won,
            game_started: true,
            game_over_visible: won || lost,
            ..state.clone()
        };
        if next.mode == Mode::Competitive {
            if won {
                self.record_victory(&mut next);
            } else if lost {
                self.record_defeat(&mut next);
            }
        }
        Ok(next)
    }

    fn select_field(&self, state: &GameState, position: Position) -> Result<GameState> {
        if state.is_finished() {
            return Ok(state.clone());
        }

        let Some(board) = state.board() else {
            log::debug!("ignoring flag at {:?} before the first game", position);
            return Ok(state.clone());
        };
        let mut board = board.clone();
        if !board.toggle_flag(position)?.has_update() {
            return Ok(state.clone());
        }

        let won = self.rules.win_condition.is_met(&board);
        let mut next = GameState {
            board: Some(Arc::new(board)),
            won,
            is_win: won,
            game_over_visible: won,
            ..state.clone()
        };
        if won && next.mode == Mode::Competitive {
            self.record_victory(&mut next);
        }
        Ok(next)
    }

    fn time_up(&self, state: &GameState) -> GameState {
        if state.is_finished() {
            return state.clone();
        }

        let mut next = GameState {
            lost: true,
            is_win: false,
            game_over_visible: true,
            ..state.clone()
        };
        if next.mode == Mode::Competitive {
            self.record_defeat(&mut next);
        }
        log::debug!("time ran out in {:?} mode", next.mode);
        next
    }

    /// Promotion and scoring after a competitive win.
    fn record_victory(&self, state: &mut GameState) {
        let Some(next_rank) = state.ranking.next() else {
            state.score = state.score.saturating_add(self.rules.scoring.win_points);
            return;
        };

        state.victories_count += 1;
        if state.victories_count < self.rules.policy(state.ranking).victories_needed {
            return;
        }

        let policy = self.rules.policy(next_rank);
        log::info!("promoted from {} to {}", state.ranking, next_rank);
        state.previous_ranking = Some(state.ranking);
        state.ranking = next_rank;
        state.victories_count = 0;
        state.level = policy.difficulty;
        state.countdown_time = policy.countdown;
        if next_rank.is_top() {
            state.score = 0;
        }
        state.promotion_visible = true;
    }

    /// Clock reset and penalty after a competitive loss.
    fn record_defeat(&self, state: &mut GameState) {
        state.countdown_time = self.rules.policy(state.ranking).countdown;
        if state.ranking.is_top() {
            state.score = state.score.saturating_sub(self.rules.scoring.loss_penalty);
        }
    }
}

fn set_best_time(state: &GameState, level: Difficulty, time: f64) -> GameState {
    if !(time > 0.0) {
        log::warn!("ignoring best time {} for {}", time, level);
        return state.clone();
    }
    match state.best_time(level) {
        Some(best) if best <= time => state.clone(),
        _ => {
            let mut best_times = state.best_times.clone();
            best_times.insert(level, time);
            GameState {
                best_times,
                ..state.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: Coord, column: Coord) -> Position {
        Position::new(row, column)
    }

    fn playing(board: Board, state: GameState) -> GameState {
        GameState {
            board: Some(Arc::new(board)),
            game_started: true,
            ..state
        }
    }

    fn reducer() -> Reducer {
        Reducer::seeded(Rules::default(), 1234)
    }

    #[test]
    fn new_game_opens_safe_start() {
        let mut reducer = reducer();
        let state = GameState {
            mode: Mode::Casual,
            ..GameState::new()
        };

        let next = reducer.reduce(&state, &Action::NewGame).unwrap();

        let board = next.board().unwrap();
        let start = next.start_position.unwrap();
        assert_eq!((board.rows(), board.columns(), board.mine_count()), (6, 6, 5));
        assert!(board[start].is_opened());
        assert!(!board[start].is_mined());
        assert!(next.game_started);
        assert!(!next.is_finished());
        assert_eq!(next.countdown_time, None);
    }

    #[test]
    fn reduce_leaves_input_untouched() {
        let mut reducer = reducer();
        let board = Board::with_mines(3, 3, &[pos(0, 0)]).unwrap();
        let state = playing(board, GameState::new());
        let before = state.clone();

        let next = reducer.reduce(&state, &Action::open(pos(2, 2))).unwrap();

        assert_eq!(state, before);
        assert!(!state.board().unwrap()[pos(2, 2)].is_opened());
        assert!(next.board().unwrap()[pos(2, 2)].is_opened());
    }

    #[test]
    fn finished_game_rejects_moves() {
        let mut reducer = reducer();
        let board = Board::with_mines(2, 2, &[pos(0, 0)]).unwrap();
        let state = playing(board, GameState::new());
        let lost = reducer.reduce(&state, &Action::open(pos(0, 0))).unwrap();
        assert!(lost.lost);

        assert_eq!(reducer.reduce(&lost, &Action::open(pos(1, 1))).unwrap(), lost);
        assert_eq!(reducer.reduce(&lost, &Action::select(pos(1, 1))).unwrap(), lost);
    }

    #[test]
    fn loss_reveals_every_mine() {
        let mut reducer = reducer();
        let board = Board::with_mines(3, 3, &[pos(0, 0), pos(2, 2)]).unwrap();
        let state = playing(board, GameState::new());

        let next = reducer.reduce(&state, &Action::open(pos(2, 2))).unwrap();

        let board = next.board().unwrap();
        assert!(next.lost && !next.won && !next.is_win);
        assert!(next.game_over_visible);
        assert!(board[pos(0, 0)].is_opened());
        assert!(!board[pos(0, 0)].is_exploded());
        assert!(board[pos(2, 2)].is_exploded());
    }

    #[test]
    fn moves_before_first_game_do_nothing() {
        let mut reducer = reducer();
        let state = GameState::new();

        assert_eq!(reducer.reduce(&state, &Action::open(pos(0, 0))).unwrap(), state);
        assert_eq!(reducer.reduce(&state, &Action::select(pos(0, 0))).unwrap(), state);
    }

    #[test]
    fn out_of_range_move_is_an_error() {
        let mut reducer = reducer();
        let state = playing(Board::new(2, 2).unwrap(), GameState::new());

        let result = reducer.reduce(&state, &Action::select(pos(5, 0)));

        assert!(matches!(result, Err(GameError::OutOfBounds { .. })));
    }

    #[test]
    fn flagging_last_mine_promotes() {
        let mut reducer = reducer();
        let mut board = Board::with_mines(2, 2, &[pos(0, 0)]).unwrap();
        for position in [pos(0, 1), pos(1, 0), pos(1, 1)] {
            board.open_field(position, OpenDepth::Unbounded).unwrap();
        }
        let state = playing(board, GameState::new());

        let next = reducer.reduce(&state, &Action::select(pos(0, 0))).unwrap();

        assert!(next.won && next.is_win);
        assert_eq!(next.ranking, Rank::Amateur);
        assert_eq!(next.previous_ranking, Some(Rank::Beginner));
        assert!(next.promotion_visible);
    }

    #[test]
    fn flag_on_opened_field_changes_nothing() {
        let mut reducer = reducer();
        let mut board = Board::with_mines(2, 3, &[pos(0, 0)]).unwrap();
        board.open_field(pos(1, 2), OpenDepth::Unbounded).unwrap();
        let state = playing(board, GameState::new());

        assert_eq!(reducer.reduce(&state, &Action::select(pos(1, 2))).unwrap(), state);
    }

    #[test]
    fn time_up_at_expert_resets_clock() {
        let mut reducer = reducer();
        let state = GameState {
            ranking: Rank::Expert,
            countdown_time: Some(12),
            ..playing(Board::new(2, 2).unwrap(), GameState::new())
        };

        let next = reducer.reduce(&state, &Action::GameOverTimeUp).unwrap();

        assert!(next.lost && !next.is_win && next.game_over_visible);
        assert_eq!(next.countdown_time, Some(210));
        assert_eq!(next.score, 0);
    }

    #[test]
    fn time_up_at_top_costs_a_point() {
        let mut reducer = reducer();
        let state = GameState {
            ranking: Rank::MinefieldKing,
            score: 4,
            ..playing(Board::new(2, 2).unwrap(), GameState::new())
        };

        let next = reducer.reduce(&state, &Action::GameOverTimeUp).unwrap();

        assert_eq!(next.score, 3);
        assert_eq!(next.countdown_time, Some(180));
    }

    #[test]
    fn casual_time_up_keeps_competitive_progress() {
        let mut reducer = reducer();
        let state = GameState {
            mode: Mode::Casual,
            ranking: Rank::MinefieldKing,
            score: 5,
            ..GameState::new()
        };
        let state = reducer.reduce(&state, &Action::NewGame).unwrap();
        assert_eq!(state.countdown_time, None);

        let next = reducer.reduce(&state, &Action::GameOverTimeUp).unwrap();

        assert!(next.lost && next.game_over_visible);
        assert_eq!(next.score, 5);
        assert_eq!(next.countdown_time, None);
        assert_eq!(next.ranking, Rank::MinefieldKing);
    }

    #[test]
    fn time_up_does_not_overturn_a_win() {
        let mut reducer = reducer();
        let state = GameState {
            won: true,
            is_win: true,
            ranking: Rank::MinefieldKing,
            score: 3,
            ..GameState::new()
        };

        assert_eq!(reducer.reduce(&state, &Action::GameOverTimeUp).unwrap(), state);
    }

    #[test]
    fn exit_penalty_floors_at_zero() {
        let mut reducer = reducer();
        let mut state = GameState {
            ranking: Rank::MinefieldKing,
            score: 2,
            ..GameState::new()
        };

        for expected in [1, 0, 0, 0] {
            state = reducer.reduce(&state, &Action::LosePointForExit).unwrap();
            assert_eq!(state.score, expected);
        }
    }

    #[test]
    fn best_time_only_improves() {
        let mut reducer = reducer();
        let set = |time| Action::SetBestTime {
            level: Difficulty::Medium,
            time,
        };

        let state = reducer.reduce(&GameState::new(), &set(95.0)).unwrap();
        assert_eq!(state.best_time(Difficulty::Medium), Some(95.0));
        let state = reducer.reduce(&state, &set(120.0)).unwrap();
        assert_eq!(state.best_time(Difficulty::Medium), Some(95.0));
        let state = reducer.reduce(&state, &set(61.5)).unwrap();
        assert_eq!(state.best_time(Difficulty::Medium), Some(61.5));
        assert_eq!(state.best_time(Difficulty::Easy), None);
    }

    #[test]
    fn best_time_must_be_positive() {
        let mut reducer = reducer();
        let set = |time| Action::SetBestTime {
            level: Difficulty::Hard,
            time,
        };

        let mut state = GameState::new();
        for time in [f64::NAN, -3.0, 0.0] {
            state = reducer.reduce(&state, &set(time)).unwrap();
        }
        assert_eq!(state.best_time(Difficulty::Hard), None);

        let state = reducer.reduce(&state, &set(80.0)).unwrap();
        let state = reducer.reduce(&state, &set(-1.0)).unwrap();
        assert_eq!(state.best_time(Difficulty::Hard), Some(80.0));
    }

    #[test]
    fn toggle_and_hide_touch_only_dialog_flags() {
        let mut reducer = reducer();
        let state = GameState {
            lost: true,
            game_over_visible: true,
            promotion_visible: true,
            previous_ranking: Some(Rank::Amateur),
            ranking: Rank::Expert,
            ..GameState::new()
        };

        let toggled = reducer.reduce(&state, &Action::ToggleGameOver).unwrap();
        assert!(!toggled.game_over_visible);
        assert!(toggled.lost);

        let hidden = reducer.reduce(&toggled, &Action::HidePromotion).unwrap();
        assert!(!hidden.promotion_visible);
        assert_eq!(hidden.previous_ranking, None);
        assert_eq!(hidden.ranking, Rank::Expert);
    }

    #[test]
    fn restore_session_applies_saved_progress() {
        let mut reducer = reducer();
        let session = SavedSession {
            ranking: Rank::MinefieldKing,
            victories_count: 0,
            score: 9,
            level: Difficulty::Hard,
            previous_ranking: Some(Rank::Expert),
        };

        let next = reducer
            .reduce(&GameState::new(), &Action::RestoreSession { session })
            .unwrap();

        assert_eq!(next.session(), session);
        assert!(!next.promotion_visible);
    }

    #[test]
    fn unknown_action_is_a_noop() {
        let mut reducer = reducer();
        let state = GameState {
            score: 5,
            ..GameState::new()
        };

        assert_eq!(reducer.reduce(&state, &Action::Unknown).unwrap(), state);
    }
}
