//! Cyber-Physical Supply Chain Cascade Simulation
//!
//! Models cascading failure risk in a three-tier supply chain
//! (manufacturer -> distributor -> customer) under three competing
//! representations: a purely physical net, an integrated cyber-physical net,
//! and a mitigated net where defensive controls adjust hazard probabilities
//! and costs. The engine fires hazards probabilistically, propagates delayed
//! cascades across the coupled nets, and accumulates comparable cost ledgers.
//!
//! ## Modules
//!
//! - `net`: static topology for the three net variants
//! - `mitigation`: control catalog and active-control registry
//! - `hazard`: hazard kinds and the firing path
//! - `scheduler`: timed event queue for cascade stages and trial ticks
//! - `ledger`: running cost totals and comparison statistics
//! - `config`: validated live-adjustable parameters
//! - `engine`: the session object tying everything together
//!
//! ## Usage
//!
//! ```bash
//! # Run one seeded 30-trial session
//! cargo run --bin run --release
//!
//! # Sweep mitigation portfolios across many seeded sessions
//! cargo run --bin portfolio --release
//! ```

pub mod config;
pub mod engine;
pub mod hazard;
pub mod ledger;
pub mod mitigation;
pub mod net;
pub mod scheduler;
