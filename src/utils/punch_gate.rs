use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Per-employee in-flight marker for the punch toggle. The toggle is a
/// read-then-write on today's row, so two overlapping requests from the
/// same employee must not both get past the read; the second caller is
/// turned away instead of queued.
#[derive(Clone, Default)]
pub struct PunchGate {
    in_flight: Arc<Mutex<HashSet<u64>>>,
}

impl PunchGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` when a toggle for this employee is already mid-flight.
    pub fn acquire(&self, employee_id: u64) -> Option<PunchPermit> {
        let mut set = self.in_flight.lock().expect("punch gate poisoned");
        if set.insert(employee_id) {
            Some(PunchPermit {
                in_flight: Arc::clone(&self.in_flight),
                employee_id,
            })
        } else {
            None
        }
    }
}

/// Releases the employee's slot when dropped, whichever way the toggle
/// handler exits.
pub struct PunchPermit {
    in_flight: Arc<Mutex<HashSet<u64>>>,
    employee_id: u64,
}

impl Drop for PunchPermit {
    fn drop(&mut self) {
        if let Ok(mut set) = self.in_flight.lock() {
            set.remove(&self.employee_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_for_same_employee_is_refused() {
        let gate = PunchGate::new();
        let permit = gate.acquire(7);
        assert!(permit.is_some());
        assert!(gate.acquire(7).is_none());
        drop(permit);
    }

    #[test]
    fn dropping_the_permit_frees_the_slot() {
        let gate = PunchGate::new();
        let permit = gate.acquire(7);
        drop(permit);
        assert!(gate.acquire(7).is_some());
    }

    #[test]
    fn employees_do_not_block_each_other() {
        let gate = PunchGate::new();
        let _a = gate.acquire(1);
        assert!(gate.acquire(2).is_some());
    }

    #[test]
    fn clones_share_the_same_slots() {
        let gate = PunchGate::new();
        let clone = gate.clone();
        let _permit = gate.acquire(9);
        assert!(clone.acquire(9).is_none());
    }
}
