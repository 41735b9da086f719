//! The cooperative runtime loop.
//!
//! Single-threaded, run to completion: each tick either advances the
//! connection state machine or pumps at most one inbound message through the
//! reconciliation engine. When a handler runs, nothing else is in flight.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::clock::Clock;
use crate::config::Config;
use crate::engine::{Action, Engine};
use crate::led::{self, LedStrip};
use crate::shadow::ShadowTopics;
use crate::supervisor::{ConnectionState, Supervisor};
use crate::transport::Transport;

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The supervisor ran one attempt cycle, landing on this state.
    Supervised(ConnectionState),
    /// An inbound message produced this action.
    Applied(Action),
    /// An inbound message was inert.
    Ignored,
    /// Nothing was buffered.
    Idle,
}

/// Owns every collaborator of the daemon. No globals anywhere: tests build
/// one of these from mocks and drive it tick by tick.
pub struct Runtime<T: Transport, S: LedStrip, C: Clock> {
    pub transport: T,
    pub strip: S,
    pub clock: C,
    pub supervisor: Supervisor,
    pub engine: Engine,
}

impl<T: Transport, S: LedStrip, C: Clock> Runtime<T, S, C> {
    pub fn new(config: &Config, transport: T, strip: S, clock: C) -> Self {
        // The physical strip is the capacity authority, not the config.
        let capacity = strip.capacity();
        Runtime {
            transport,
            strip,
            clock,
            supervisor: Supervisor::new(config),
            engine: Engine::new(ShadowTopics::new(&config.thing_name), capacity),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.supervisor.state()
    }

    /// Run one cooperative step.
    pub fn tick(&mut self) -> Tick {
        if self.supervisor.is_synchronized() && !self.transport.is_connected() {
            self.supervisor.mark_disconnected();
        }
        if !self.supervisor.is_synchronized() {
            let state = self.supervisor.ensure_connected(
                &mut self.transport,
                &mut self.strip,
                &mut self.clock,
            );
            return Tick::Supervised(state);
        }
        match self.transport.pump() {
            Some(msg) => {
                let (action, render_err) = self.engine.handle_and_apply(
                    msg.kind,
                    &msg.payload,
                    &mut self.strip,
                    &mut self.transport,
                );
                if let Some(e) = render_err {
                    log::warn!("apply failed: {e}");
                }
                match action {
                    Some(action) => Tick::Applied(action),
                    None => Tick::Ignored,
                }
            }
            None => Tick::Idle,
        }
    }

    /// Loop until `running` clears, then blank the strip.
    pub fn run(&mut self, running: &AtomicBool) {
        while running.load(Ordering::SeqCst) {
            self.tick();
        }
        log::info!("shutting down, blanking strip");
        if let Err(e) = led::clear(&mut self.strip) {
            log::warn!("strip clear on shutdown failed: {e}");
        }
    }
}
