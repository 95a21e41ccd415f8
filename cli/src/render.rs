use core::fmt::Write;

use minefield_core::*;

/// Three-character counter, clamped the way a seven-segment display would be.
pub(crate) fn format_for_counter(num: i32) -> String {
    match num {
        ..-99 => "-99".to_string(),
        -99..0 => format!("-{:02}", -num),
        0..1000 => format!("{:03}", num),
        1000.. => "999".to_string(),
    }
}

const fn field_char(field: &Field) -> char {
    match (field.is_opened(), field.is_mined()) {
        (false, _) if field.is_flagged() => 'F',
        (false, _) => '#',
        (true, true) if field.is_exploded() => 'X',
        (true, true) => '*',
        (true, false) => match field.near_mines() {
            0 => '.',
            n => (b'0' + n) as char,
        },
    }
}

/// Grid with 1-based row and column labels.
pub(crate) fn board(board: &Board) -> String {
    let mut out = String::from("    ");
    for column in 1..=board.columns() {
        let _ = write!(out, "{:>3}", column);
    }
    for row in 0..board.rows() {
        let _ = write!(out, "\n{:>3} ", row + 1);
        for column in 0..board.columns() {
            let _ = write!(out, "{:>3}", field_char(&board[Position::new(row, column)]));
        }
    }
    out
}

/// One-line header: mode and rank, mines left and the clock.
pub(crate) fn status(state: &GameState, rules: &Rules, time: u32) -> String {
    let mut out = match state.mode {
        Mode::Casual => format!("casual {}", state.level),
        Mode::Competitive if state.ranking.is_top() => {
            format!("{} | score {}", state.ranking, state.score)
        }
        Mode::Competitive => format!(
            "{} | wins {}/{}",
            state.ranking,
            state.victories_count,
            rules.policy(state.ranking).victories_needed
        ),
    };
    let _ = write!(
        out,
        " | mines {} | time {}",
        format_for_counter(state.mines_left()),
        format_time(Some(time))
    );
    if let (Mode::Casual, Some(best)) = (state.mode, state.best_time(state.level)) {
        let _ = write!(out, " | best {}", format_time(Some(best as u32)));
    }
    out
}
