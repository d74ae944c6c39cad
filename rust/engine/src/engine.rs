use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::cards::Card;
use crate::deck::Deck;
use crate::errors::GameError;
use crate::game::{GameState, Phase};
use crate::hand::{evaluate_hand, HandStrength};
use crate::logger::{ActionRecord, HandRecord, HandSequence, ShowdownInfo};
use crate::player::{Player, PlayerAction, PlayerId};
use crate::pot::{chop, uncalled_excess};
use crate::rules::{post_blinds, resolve_action, ResolvedAction, TableConfig};

pub const DEFAULT_PLAYER_NAME: &str = "Player";
pub const DEFAULT_OPPONENT_NAME: &str = "CPU";

/// Betting state machine for one heads-up table.
///
/// Owns the [`GameState`], the deck of the current hand and the table RNG.
/// Callers drive it with [`Engine::start_new_hand`] and
/// [`Engine::process_action`]; the engine deals streets, returns uncalled
/// chips, runs out the board when someone is all-in and settles the pot.
///
/// # Examples
///
/// ```
/// use headsup_engine::engine::Engine;
/// use headsup_engine::game::Phase;
/// use headsup_engine::player::{PlayerAction, PlayerId};
/// use headsup_engine::rules::TableConfig;
///
/// let mut engine = Engine::new(TableConfig::default(), Some(7));
/// engine.start_new_hand().expect("deal");
///
/// // P1 has the button: small blind, first to act preflop.
/// engine.process_action(PlayerId::P1, PlayerAction::Call).expect("call");
/// engine.process_action(PlayerId::P2, PlayerAction::Call).expect("check");
///
/// assert_eq!(engine.state().phase(), Phase::Flop);
/// assert_eq!(engine.state().community_cards().len(), 3);
/// assert_eq!(engine.state().pot(), 40);
/// ```
#[derive(Debug)]
pub struct Engine {
    state: GameState,
    deck: Deck,
    rng: ChaCha20Rng,
    seed: u64,
    config: TableConfig,
    hand_ids: HandSequence,
    record: Option<HandRecord>,
    /// Chips each seat has put into the current pot
    committed: [u32; 2],
}

impl Engine {
    /// Creates a table with both stacks at `config.starting_stack`. Without a
    /// seed a random one is drawn, and it is kept so the table can be replayed.
    pub fn new(config: TableConfig, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let deck = Deck::shuffled(&mut rng);
        let players = [
            Player::new(PlayerId::P1, DEFAULT_PLAYER_NAME, config.starting_stack),
            Player::new(PlayerId::P2, DEFAULT_OPPONENT_NAME, config.starting_stack),
        ];
        Self {
            state: GameState::new(players),
            deck,
            rng,
            seed,
            config,
            hand_ids: HandSequence::today(),
            record: None,
            committed: [0, 0],
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }
    pub fn config(&self) -> &TableConfig {
        &self.config
    }
    pub fn seed(&self) -> u64 {
        self.seed
    }
    pub fn hand_record(&self) -> Option<&HandRecord> {
        self.record.as_ref()
    }
    pub fn deck_remaining(&self) -> usize {
        self.deck.remaining()
    }

    pub fn set_player_name(&mut self, id: PlayerId, name: impl Into<String>) {
        self.state.player_mut(id).set_name(name);
    }

    /// Deals a new hand from a freshly shuffled deck.
    pub fn start_new_hand(&mut self) -> Result<(), GameError> {
        let deck = Deck::shuffled(&mut self.rng);
        self.start_new_hand_with_deck(deck)
    }

    /// Deals a new hand from `deck`: two hole cards to `P1`, two to `P2`,
    /// then the board in order. Used directly to replay a stacked deck.
    ///
    /// An unfinished hand is abandoned first and each seat gets back what it
    /// put in. When a stack is still empty after that nothing is dealt; the
    /// table stays idle and the narration asks for a reset.
    pub fn start_new_hand_with_deck(&mut self, mut deck: Deck) -> Result<(), GameError> {
        self.abandon_hand_in_progress();
        if self.state.players.iter().any(|p| p.stack() == 0) {
            tracing::warn!("refusing to deal: a player has no chips");
            self.state
                .set_message("A player has no chips left. Reset the game to continue.");
            return Ok(());
        }

        let mut draw = || deck.draw().ok_or(GameError::DeckExhausted);
        let p1_hole = [draw()?, draw()?];
        let p2_hole = [draw()?, draw()?];
        self.deck = deck;

        let state = &mut self.state;
        state.community_cards.clear();
        state.phase = Phase::Preflop;
        state.actions_this_round = 0;
        state.player_mut(PlayerId::P1).prepare_for_hand(p1_hole);
        state.player_mut(PlayerId::P2).prepare_for_hand(p2_hole);
        state.rotate_button();

        let button = state.dealer_button;
        let big = button.other();
        let (sb, bb) = post_blinds(
            &self.config,
            state.player(button).stack(),
            state.player(big).stack(),
        );
        for (seat, amount, label) in [(button, sb, "SB"), (big, bb, "BB")] {
            let posted = state.player_mut(seat).commit(amount);
            state.player_mut(seat).set_last_action(label);
            state.pot.add(posted);
            self.committed[seat.index()] += posted;
        }
        state.recompute_highest_bet();
        state.current_turn = button;

        let button_name = state.player(button).name().to_string();
        let big_name = state.player(big).name().to_string();
        state.set_message(format!(
            "New hand. {button_name} posts {sb}, {big_name} posts {bb}. {button_name} to act."
        ));

        let record = HandRecord::new(self.hand_ids.next_id(), Some(self.seed));
        tracing::info!(
            hand_id = %record.hand_id,
            button = %button,
            small_blind = sb,
            big_blind = bb,
            "hand started"
        );
        self.record = Some(record);

        // A blind that empties a stack can leave nothing to decide.
        let button_all_in = self.state.player(button).is_all_in();
        let big_all_in = self.state.player(big).is_all_in();
        if button_all_in || (big_all_in && sb >= bb) {
            self.close_round()?;
        }
        Ok(())
    }

    /// Restores both stacks to the starting amount and deals a new hand.
    pub fn reset_game(&mut self) -> Result<(), GameError> {
        let starting = self.config.starting_stack;
        for p in self.state.players.iter_mut() {
            p.clear_bet();
            p.set_stack(starting);
        }
        self.state.pot.take();
        self.committed = [0, 0];
        self.state.phase = Phase::Showdown;
        tracing::info!(starting_stack = starting, "stacks reset");

        self.start_new_hand()?;
        let dealt = self.state.message.clone();
        self.state
            .set_message(format!("Stacks reset to {starting}. {dealt}"));
        Ok(())
    }

    /// Boundary check for an incoming action: the hand must be live and it
    /// must be `id`'s turn.
    pub fn ensure_can_act(&self, id: PlayerId) -> Result<(), GameError> {
        if self.record.is_none() {
            return Err(GameError::NoHandInProgress);
        }
        if self.state.is_hand_over() {
            return Err(GameError::HandAlreadyComplete);
        }
        if self.state.current_turn != id {
            return Err(GameError::NotPlayersTurn {
                expected: self.state.current_turn,
                actual: id,
            });
        }
        Ok(())
    }

    /// Applies `action` and, unless it ended the hand, closes the betting
    /// round when it is complete.
    pub fn process_action(&mut self, id: PlayerId, action: PlayerAction) -> Result<(), GameError> {
        self.apply_action(id, action);
        if !self.state.is_hand_over() {
            self.check_round_end()?;
        }
        Ok(())
    }

    /// Applies a single action without any turn validation; see
    /// [`Engine::ensure_can_act`].
    pub fn apply_action(&mut self, id: PlayerId, action: PlayerAction) {
        let to_call = self.state.to_call(id);
        let stack = self.state.player(id).stack();
        let resolved = resolve_action(stack, to_call, action);
        self.state.actions_this_round += 1;

        let phase = self.state.phase;
        if let Some(record) = self.record.as_mut() {
            record.actions.push(ActionRecord {
                player_id: id,
                phase,
                action,
                chips: resolved.chips(),
            });
        }
        tracing::debug!(player = %id, ?action, ?resolved, phase = %phase, "action applied");

        let name = self.state.player(id).name().to_string();
        self.state.player_mut(id).set_last_action(resolved.label());

        let message = match resolved {
            ResolvedAction::Fold => {
                self.state.player_mut(id).fold();
                self.finish_on_fold(id, &name);
                return;
            }
            ResolvedAction::Check => format!("{name} checks."),
            ResolvedAction::Call(n) => format!("{name} calls {n}."),
            ResolvedAction::Raise { increment, .. } => format!("{name} raises {increment}."),
            ResolvedAction::AllIn(n) => format!("{name} is all-in for {n}!"),
        };

        let committed = self.state.player_mut(id).commit(resolved.chips());
        self.state.pot.add(committed);
        self.committed[id.index()] += committed;
        let bet = self.state.player(id).current_bet();
        if bet > self.state.highest_bet {
            self.state.highest_bet = bet;
        }

        self.state.set_message(message);
        self.state.current_turn = id.other();
    }

    /// Closes the betting round if it is complete. Returns whether it closed.
    ///
    /// A round is complete when both bets match after at least two actions,
    /// or when the bets differ but the smaller bettor has no chips left. In the latter case the uncalled part of the larger
    /// bet goes back to its owner.
    pub fn check_round_end(&mut self) -> Result<bool, GameError> {
        let bets = [
            self.state.player(PlayerId::P1).current_bet(),
            self.state.player(PlayerId::P2).current_bet(),
        ];
        let round_over = match uncalled_excess(bets) {
            None => self.state.actions_this_round >= 2,
            Some((over_idx, _)) => {
                let short = if over_idx == 0 { PlayerId::P2 } else { PlayerId::P1 };
                self.state.player(short).is_all_in()
            }
        };
        if !round_over {
            return Ok(false);
        }
        self.close_round()?;
        Ok(true)
    }

    /// Returns any uncalled chips, deals the next street (or runs the board
    /// out) and hands the turn to the non-button seat.
    fn close_round(&mut self) -> Result<(), GameError> {
        let bets = [
            self.state.player(PlayerId::P1).current_bet(),
            self.state.player(PlayerId::P2).current_bet(),
        ];
        if let Some((over_idx, excess)) = uncalled_excess(bets) {
            let over = if over_idx == 0 { PlayerId::P1 } else { PlayerId::P2 };
            let returned = self.state.pot.remove(excess);
            self.state.player_mut(over).refund(returned);
            self.committed[over_idx] -= returned;
            self.state.recompute_highest_bet();
            tracing::debug!(player = %over, returned, "uncalled chips returned");
        }

        self.advance_phase()?;
        if !self.state.is_hand_over() {
            let first = self.state.dealer_button.other();
            self.state.current_turn = first;
            let note = format!(
                "{} dealt. {} to act.",
                self.state.phase,
                self.state.player(first).name()
            );
            self.state.append_message(&note);
        }
        Ok(())
    }

    /// Moves to the next phase, dealing community cards. If either player is
    /// all-in the board is run out to showdown without stopping for bets.
    pub fn advance_phase(&mut self) -> Result<(), GameError> {
        loop {
            self.state.actions_this_round = 0;
            match self.state.phase {
                Phase::Showdown => return Ok(()),
                Phase::River => {
                    self.state.phase = Phase::Showdown;
                    return self.evaluate_winner();
                }
                _ => {}
            }

            let all_in = self.state.players.iter().any(|p| p.is_all_in());
            let next = self.state.phase.next();
            for _ in 0..next.cards_dealt_on_entry() {
                let card = self.deck.draw().ok_or(GameError::DeckExhausted)?;
                self.deal_to_board(card);
            }
            self.state.phase = next;
            self.state.highest_bet = 0;
            for p in self.state.players.iter_mut() {
                p.clear_bet();
            }
            tracing::debug!(
                phase = %next,
                board = self.state.community_cards.len(),
                all_in,
                "phase advanced"
            );

            if !all_in {
                return Ok(());
            }
        }
    }

    /// Showdown: the better seven-card hand takes the pot, an exact tie
    /// splits it. The odd chip of a split is not awarded.
    fn evaluate_winner(&mut self) -> Result<(), GameError> {
        let s1 = self.best_hand(PlayerId::P1)?;
        let s2 = self.best_hand(PlayerId::P2)?;
        let (l1, l2) = (s1.category.label(), s2.category.label());
        let pot = self.state.pot.take();
        self.committed = [0, 0];

        let (winners, message) = match s1.cmp(&s2) {
            std::cmp::Ordering::Equal => {
                let (share, odd) = chop(pot);
                for p in self.state.players.iter_mut() {
                    p.add_chips(share);
                }
                if odd > 0 {
                    tracing::debug!(odd, "odd chip of split pot left unawarded");
                }
                (
                    vec![PlayerId::P1, PlayerId::P2],
                    format!("Split pot: both players hold {l1}. Each receives {share}."),
                )
            }
            ord => {
                let (winner, win_label, lose_label) = if ord.is_gt() {
                    (PlayerId::P1, l1, l2)
                } else {
                    (PlayerId::P2, l2, l1)
                };
                self.state.player_mut(winner).add_chips(pot);
                let name = self.state.player(winner).name();
                (
                    vec![winner],
                    format!("{name} wins the pot of {pot} with {win_label} over {lose_label}."),
                )
            }
        };

        tracing::info!(?winners, pot, p1 = l1, p2 = l2, "showdown");
        self.state.set_message(message.clone());
        if let Some(record) = self.record.as_mut() {
            record.result = Some(message);
            record.showdown = Some(ShowdownInfo {
                winners,
                notes: Some(format!("{l1} vs {l2}")),
            });
        }
        Ok(())
    }

    fn finish_on_fold(&mut self, folder: PlayerId, folder_name: &str) {
        let winner = folder.other();
        let pot = self.state.pot.take();
        self.committed = [0, 0];
        self.state.player_mut(winner).add_chips(pot);
        self.state.phase = Phase::Showdown;

        let winner_name = self.state.player(winner).name();
        let message = format!("{folder_name} folds. {winner_name} wins the pot of {pot}.");
        tracing::info!(folder = %folder, winner = %winner, pot, "hand ended on fold");
        self.state.set_message(message.clone());
        if let Some(record) = self.record.as_mut() {
            record.result = Some(message);
            record.showdown = Some(ShowdownInfo {
                winners: vec![winner],
                notes: Some("fold".to_string()),
            });
        }
    }

    fn best_hand(&self, id: PlayerId) -> Result<HandStrength, GameError> {
        let board = self.state.community_cards.len();
        let cards: [Card; 7] = self
            .state
            .visible_cards(id)
            .try_into()
            .map_err(|_| GameError::IncompleteBoard(board))?;
        Ok(evaluate_hand(&cards))
    }

    fn deal_to_board(&mut self, card: Card) {
        self.state.community_cards.push(card);
        if let Some(record) = self.record.as_mut() {
            record.board.push(card);
        }
    }

    /// A hand abandoned before it finished gives every seat back what it put
    /// into the pot, so restarting mid-hand never creates or destroys chips.
    fn abandon_hand_in_progress(&mut self) {
        if self.state.is_hand_over() || self.state.pot.total() == 0 {
            return;
        }
        tracing::warn!(pot = self.state.pot.total(), "abandoning unfinished hand");
        for id in [PlayerId::P1, PlayerId::P2] {
            let returned = self.state.pot.remove(self.committed[id.index()]);
            self.state.player_mut(id).add_chips(returned);
        }
        self.state.pot.take();
        self.committed = [0, 0];
    }
}
