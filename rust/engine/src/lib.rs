//! # headsup-engine: Heads-up Hold'em Table Core
//!
//! Authoritative game logic for a two-player Texas Hold'em table: dealing,
//! betting-round progression, all-in handling and showdown evaluation.
//! Everything is synchronous and in memory; one [`engine::Engine`] backs one
//! table.
//!
//! Modules, bottom up: [`cards`], [`deck`] and [`hand`] know nothing about
//! betting; [`player`], [`rules`], [`pot`] and [`game`] hold table state;
//! [`engine`] drives it and writes the [`logger`] history. Failures are
//! [`errors::GameError`].
//!
//! ## Example
//!
//! ```rust
//! use headsup_engine::engine::Engine;
//! use headsup_engine::game::Phase;
//! use headsup_engine::player::{PlayerAction, PlayerId};
//! use headsup_engine::rules::TableConfig;
//!
//! let mut engine = Engine::new(TableConfig::default(), Some(7));
//! engine.start_new_hand()?;
//!
//! // P1 holds the button on the first hand: completes the small blind,
//! // then the big blind checks the option.
//! engine.process_action(PlayerId::P1, PlayerAction::Call)?;
//! engine.process_action(PlayerId::P2, PlayerAction::Call)?;
//!
//! let state = engine.state();
//! assert_eq!(state.phase(), Phase::Flop);
//! assert_eq!(state.pot(), 40);
//! assert_eq!(state.current_turn(), PlayerId::P2);
//! # Ok::<(), headsup_engine::errors::GameError>(())
//! ```

pub mod cards;
pub mod deck;
pub mod engine;
pub mod errors;
pub mod game;
pub mod hand;
pub mod logger;
pub mod player;
pub mod pot;
pub mod rules;
