//! # Summary
//!
//! This module defines the fault-injection hook consulted by the acceptor
//! before every Prepare and Accept. An injected fault is a synthetic
//! rejection, indistinguishable to the proposer from a real one.
//!
//! The hook is supplied when a node is constructed, so tests can swap the
//! probabilistic strategy for a seeded or fully scripted one.

use std::collections::VecDeque;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::message::Phase;

/// Decides whether an acceptor call should fail synthetically.
pub trait Fault: Send + Sync {
    fn inject(&self, phase: Phase) -> bool;
}

impl<F> Fault for F where F: Fn(Phase) -> bool + Send + Sync {
    fn inject(&self, phase: Phase) -> bool {
        self(phase)
    }
}

/// Never fails.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoFault;

impl Fault for NoFault {
    fn inject(&self, _: Phase) -> bool {
        false
    }
}

/// Fails each call independently with a fixed probability.
#[derive(Debug)]
pub struct Probabilistic {
    probability: f64,
    rng: Mutex<StdRng>,
}

impl Probabilistic {
    /// Seeds from system entropy.
    pub fn new(probability: f64) -> Self {
        Self::with_rng(probability, StdRng::from_entropy())
    }

    /// Reproducible sequence of faults for a given seed.
    pub fn seeded(probability: f64, seed: u64) -> Self {
        Self::with_rng(probability, StdRng::seed_from_u64(seed))
    }

    fn with_rng(probability: f64, rng: StdRng) -> Self {
        Probabilistic {
            probability: probability.max(0.0).min(1.0),
            rng: Mutex::new(rng),
        }
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl Fault for Probabilistic {
    fn inject(&self, _: Phase) -> bool {
        self.rng.lock().gen_bool(self.probability)
    }
}

/// Replays a fixed sequence of decisions, then stops failing.
#[derive(Debug, Default)]
pub struct Scripted(Mutex<VecDeque<bool>>);

impl Scripted {
    pub fn new<I: IntoIterator<Item = bool>>(script: I) -> Self {
        Scripted(Mutex::new(script.into_iter().collect()))
    }

    /// Decisions not yet consumed.
    pub fn remaining(&self) -> usize {
        self.0.lock().len()
    }
}

impl Fault for Scripted {
    fn inject(&self, _: Phase) -> bool {
        self.0.lock().pop_front().unwrap_or(false)
    }
}
