use crate::*;

/// Callback run after a transition that changed the state, with the previous state, the action and the new state.
pub type Subscriber = Box<dyn FnMut(&GameState, &Action, &GameState)>;

/// Owner of the one live [`GameState`].
///
/// `dispatch` is the only way to change it. Side effects such as saving progress hang off the store as subscribers.
pub struct GameStore<G = RandomMinefieldGenerator> {
    state: GameState,
    reducer: Reducer<G>,
    subscribers: Vec<Subscriber>,
}

impl GameStore {
    pub fn new(rules: Rules) -> Self {
        Self::with_reducer(GameState::new(), Reducer::new(rules))
    }
}

impl<G: MinefieldGenerator> GameStore<G> {
    pub fn with_reducer(state: GameState, reducer: Reducer<G>) -> Self {
        Self {
            state,
            reducer,
            subscribers: Vec::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn rules(&self) -> &Rules {
        self.reducer.rules()
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&GameState, &Action, &GameState) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Runs `action` through the reducer and swaps in the result. Returns whether anything changed.
    pub fn dispatch(&mut self, action: Action) -> Result<bool> {
        let next = self.reducer.reduce(&self.state, &action)?;
        if next == self.state {
            log::trace!("{:?} left the state unchanged", action);
            return Ok(false);
        }

        let previous = core::mem::replace(&mut self.state, next);
        for subscriber in &mut self.subscribers {
            subscriber(&previous, &action, &self.state);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn store() -> GameStore {
        GameStore::with_reducer(GameState::new(), Reducer::seeded(Rules::default(), 8))
    }

    #[test]
    fn dispatch_swaps_state() {
        let mut store = store();

        assert!(store.dispatch(Action::NewGame).unwrap());

        assert!(store.state().board().is_some());
        assert!(store.state().game_started);
    }

    #[test]
    fn subscribers_see_only_real_changes() {
        let mut store = store();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        store.subscribe(move |previous, action, next| {
            log.borrow_mut()
                .push((action.clone(), previous.mode, next.mode));
        });

        store.dispatch(Action::SetMode { mode: Mode::Casual }).unwrap();
        assert!(!store.dispatch(Action::SetMode { mode: Mode::Casual }).unwrap());
        store.dispatch(Action::Unknown).unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![(
                Action::SetMode { mode: Mode::Casual },
                Mode::Competitive,
                Mode::Casual
            )]
        );
    }

    #[test]
    fn failed_dispatch_keeps_state() {
        let mut store = store();
        store.dispatch(Action::NewGame).unwrap();
        let before = store.state().clone();

        assert!(store.dispatch(Action::open(Position::new(200, 0))).is_err());
        assert_eq!(*store.state(), before);
    }
}
