//! Single-flight request gate.
//!
//! At most one navigation request is in flight per controller. A ticket is
//! handed out on acquire; only the holder of the current ticket can release.
//! Every acquire (and every [`RequestGate::supersede`]) starts a new
//! generation: responses and swaps holding an older ticket are stale.

use std::cell::{Cell, RefCell};

/// Proof of holding the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
pub struct RequestGate {
    pending: Cell<bool>,
    generation: Cell<u64>,
    in_flight: RefCell<Option<String>>,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the gate unless a request is pending.
    pub fn try_acquire(&self, href: &str) -> Option<Ticket> {
        if self.pending.get() {
            return None;
        }
        Some(self.force_acquire(href))
    }

    /// Take the gate even if it is held; the previous ticket goes stale.
    pub fn force_acquire(&self, href: &str) -> Ticket {
        let generation = self.generation.get().wrapping_add(1);
        self.generation.set(generation);
        self.pending.set(true);
        *self.in_flight.borrow_mut() = Some(href.to_string());
        Ticket(generation)
    }

    /// Release with `ticket`. Stale tickets are ignored and return `false`.
    pub fn release(&self, ticket: Ticket) -> bool {
        if ticket.0 != self.generation.get() || !self.pending.get() {
            return false;
        }
        self.pending.set(false);
        *self.in_flight.borrow_mut() = None;
        true
    }

    /// Start a generation without a request, leaving the gate open.
    ///
    /// Whatever is pending goes stale and can no longer release.
    pub fn supersede(&self) -> Ticket {
        let generation = self.generation.get().wrapping_add(1);
        self.generation.set(generation);
        self.pending.set(false);
        *self.in_flight.borrow_mut() = None;
        Ticket(generation)
    }

    /// Whether `ticket` belongs to the latest generation.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation.get()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    /// URL of the pending request.
    pub fn in_flight(&self) -> Option<String> {
        self.in_flight.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_flight() {
        let gate = RequestGate::new();
        let ticket = gate.try_acquire("/p/2").unwrap();
        assert!(gate.is_pending());
        assert_eq!(gate.in_flight().as_deref(), Some("/p/2"));

        for _ in 0..5 {
            assert!(gate.try_acquire("/p/3").is_none());
        }
        assert_eq!(gate.in_flight().as_deref(), Some("/p/2"));

        assert!(gate.release(ticket));
        assert!(!gate.is_pending());
        assert!(gate.in_flight().is_none());
        assert!(!gate.release(ticket));
    }

    #[test]
    fn test_force_acquire_invalidates_previous_ticket() {
        let gate = RequestGate::new();
        let first = gate.try_acquire("/p/2").unwrap();
        let second = gate.force_acquire("/p/1");

        assert!(!gate.release(first));
        assert!(!gate.is_current(first));
        assert!(gate.is_current(second));
        assert!(gate.is_pending());
        assert_eq!(gate.in_flight().as_deref(), Some("/p/1"));
        assert!(gate.release(second));
    }

    #[test]
    fn test_supersede_opens_gate_and_stales_pending() {
        let gate = RequestGate::new();
        let pending = gate.try_acquire("/p/3").unwrap();
        let restore = gate.supersede();

        assert!(!gate.is_pending());
        assert!(gate.in_flight().is_none());
        assert!(!gate.is_current(pending));
        assert!(gate.is_current(restore));
        assert!(!gate.release(pending));

        // a new request is accepted right away and stales the restore
        let next = gate.try_acquire("/p/1").unwrap();
        assert!(!gate.is_current(restore));
        assert!(gate.release(next));
    }
}
