//! # headsup-ai: Scripted Opponent
//!
//! Decision-making for the non-human seat. The opponent is a plain function of
//! the table state and one uniform roll; the [`policy::decide`] wrapper draws
//! that roll from any [`rand::Rng`], so a seeded RNG replays the same choices.
//!
//! ## Quick Start
//!
//! ```rust
//! use headsup_ai::policy::decide;
//! use headsup_engine::engine::Engine;
//! use headsup_engine::player::PlayerId;
//! use headsup_engine::rules::TableConfig;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let mut engine = Engine::new(TableConfig::default(), Some(42));
//! engine.start_new_hand().expect("deal");
//! engine
//!     .process_action(PlayerId::P1, headsup_engine::player::PlayerAction::Call)
//!     .expect("call");
//!
//! let mut rng = StdRng::seed_from_u64(1);
//! let action = decide(engine.state(), PlayerId::P2, &mut rng);
//! println!("opponent chose {:?}", action);
//! ```

pub mod policy;

pub use policy::{choose_action, classify_strength, decide, DecisionContext, HandTier};
