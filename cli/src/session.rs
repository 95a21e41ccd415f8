use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;
use std::thread;

use minefield_core::*;
use tokio::sync::mpsc;
use web_time::Instant;

use crate::command::{Command, HELP};
use crate::render;

enum Event {
    Input(String),
    InputClosed,
    Timer(TimerEvent),
}

/// Interactive loop: typed commands and timer events, one at a time, all going through the store.
pub(crate) struct Session<S: KeyValueStore> {
    store: GameStore,
    storage: Rc<RefCell<S>>,
    timer: Timer,
    started: Instant,
    events: mpsc::UnboundedReceiver<Event>,
}

impl<S: KeyValueStore> Session<S> {
    pub(crate) fn new(store: GameStore, storage: Rc<RefCell<S>>) -> Self {
        let (tx, events) = mpsc::unbounded_channel();

        let timer_tx = tx.clone();
        let timer = Timer::new(TimerMode::Stopwatch, move |event| {
            let _ = timer_tx.send(Event::Timer(event));
        });

        // blocking reads on a plain thread, since tokio's stdin cannot be cancelled at shutdown
        thread::spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(Event::Input(line)).is_err() {
                            return;
                        }
                    }
                    Err(err) => {
                        log::error!("could not read input: {}", err);
                        break;
                    }
                }
            }
            let _ = tx.send(Event::InputClosed);
        });

        Self {
            store,
            storage,
            timer,
            started: Instant::now(),
            events,
        }
    }

    pub(crate) async fn run(mut self) -> anyhow::Result<()> {
        println!("{HELP}");
        self.new_game()?;

        while let Some(event) = self.events.recv().await {
            match event {
                Event::Input(line) => match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(command) => self.execute(command)?,
                    Err(err) => println!("{err}"),
                },
                Event::InputClosed => break,
                Event::Timer(TimerEvent::Tick(left)) => {
                    if matches!(self.timer.mode(), TimerMode::Countdown(_)) && (left == 30 || left <= 5) {
                        println!("{left} seconds left");
                    }
                }
                Event::Timer(TimerEvent::Finished) => {
                    // a countdown replaced by a new game may still have its last event queued
                    if self.timer.get_time() != 0 {
                        continue;
                    }
                    if self.store.dispatch(Action::GameOverTimeUp)? {
                        println!("time is up!");
                        self.show()?;
                        self.game_over()?;
                    }
                }
            }
        }

        self.quit()
    }

    fn execute(&mut self, command: Command) -> anyhow::Result<()> {
        let action = match command {
            Command::Open(position) => Action::open(position),
            Command::Flag(position) => Action::select(position),
            Command::New => return self.new_game(),
            Command::Level(level) => {
                if self.store.state().mode != Mode::Casual {
                    println!("the level follows your rank in competitive mode");
                    return Ok(());
                }
                self.store.dispatch(Action::SetLevel { level })?;
                return self.new_game();
            }
            Command::Help => {
                println!("{HELP}");
                return Ok(());
            }
            Command::Quit => return Ok(()),
        };

        match self.store.dispatch(action) {
            Ok(false) => println!("nothing to do there"),
            Ok(true) => {
                self.show()?;
                if self.store.state().is_finished() {
                    self.game_over()?;
                }
            }
            Err(err) => println!("{err}"),
        }
        Ok(())
    }

    fn new_game(&mut self) -> anyhow::Result<()> {
        self.store.dispatch(Action::NewGame)?;

        let state = self.store.state();
        let mode = match (state.mode, state.countdown_time) {
            (Mode::Competitive, Some(seconds)) => TimerMode::Countdown(seconds),
            _ => TimerMode::Stopwatch,
        };
        self.timer.set_mode(mode);
        self.timer.start();
        self.started = Instant::now();
        self.show()
    }

    fn game_over(&mut self) -> anyhow::Result<()> {
        self.timer.stop();
        let state = self.store.state().clone();

        if state.won {
            let time = self.started.elapsed().as_secs_f64();
            println!("cleared in {:.1} seconds!", time);

            if state.mode == Mode::Casual
                && save_best_time(&mut *self.storage.borrow_mut(), state.level, time)
            {
                println!("new best time for {}", state.level);
                self.store.dispatch(Action::SetBestTime {
                    level: state.level,
                    time,
                })?;
            }
        } else {
            println!("boom, game over");
        }

        if state.promotion_visible {
            if let Some(previous) = state.previous_ranking {
                println!("promoted from {} to {}!", previous, state.ranking);
            }
            self.store.dispatch(Action::HidePromotion)?;
        } else if state.mode == Mode::Competitive && state.ranking.is_top() {
            println!("score: {}", state.score);
        }

        if state.game_over_visible {
            self.store.dispatch(Action::ToggleGameOver)?;
        }
        println!("n starts a new game, q quits");
        Ok(())
    }

    fn quit(mut self) -> anyhow::Result<()> {
        self.timer.stop();
        let state = self.store.state();
        let abandoned = state.game_started && !state.is_finished();
        if abandoned && state.mode == Mode::Competitive && state.ranking.is_top() {
            self.store.dispatch(Action::LosePointForExit)?;
            println!("leaving mid-game costs a point, score: {}", self.store.state().score);
        }
        Ok(())
    }

    fn show(&self) -> anyhow::Result<()> {
        let state = self.store.state();
        let mut out = io::stdout().lock();
        if let Some(board) = state.board() {
            writeln!(out, "{}", render::board(board))?;
        }
        writeln!(
            out,
            "{}",
            render::status(state, self.store.rules(), self.timer.get_time())
        )?;
        out.flush()?;
        Ok(())
    }
}
