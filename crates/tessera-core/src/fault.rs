//! Fault barrier: keeps one broken handler from breaking the editor.
//!
//! Every resolver call runs through [`FaultBarrier::guard`]. A call faults
//! when the handler returns an error or panics. On a fault the barrier:
//!
//! 1. reports it, once per `(entity type, entity id, operation)`. The first
//!    occurrence logs an `error` event with a backtrace; repeats are silent.
//!    Reported keys live in a bounded FIFO set that is cleared when a new
//!    editing session starts.
//! 2. returns the fallback, which renders the broken-entity placeholder and
//!    cannot fail.
//!
//! A call therefore finishes after at most two attempts.
//!
//! The first [`contain`] call wraps the process panic hook: panics raised
//! inside a containment scope are silenced there, since the barrier already
//! logs them, and every other panic still reaches the previous hook. An
//! embedder that installs its own hook afterwards owns all panic output.
//!
//! # Example
//!
//! ```
//! use tessera_core::entity::EntityId;
//! use tessera_core::error::HandlerFault;
//! use tessera_core::fault::{FaultBarrier, Operation};
//!
//! let mut barrier = FaultBarrier::new(16);
//! let value = barrier.guard(
//!     "spinner",
//!     EntityId::new(1),
//!     Operation::Selection,
//!     || Err(HandlerFault::Panicked { message: "boom".into() }),
//!     || 0,
//! );
//!
//! assert_eq!(value, 0);
//! assert_eq!(barrier.reported(), 1);
//! ```

use std::backtrace::Backtrace;
use std::cell::Cell;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use tracing::error;

use crate::entity::EntityId;
use crate::error::HandlerFault;

/// What the engine was doing when a handler faulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Resolving the entity drawable.
    EntityDrawable,
    /// Resolving a node drawable.
    NodeDrawable,
    /// Resolving selection rectangles.
    Selection,
    /// Reading an accessor capability, by name.
    Accessor(&'static str),
    /// Listing placement templates.
    Placements,
    /// Building a placement from an instance.
    CloneItem,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EntityDrawable => f.write_str("entity drawable"),
            Self::NodeDrawable => f.write_str("node drawable"),
            Self::Selection => f.write_str("selection"),
            Self::Accessor(name) => write!(f, "accessor `{name}`"),
            Self::Placements => f.write_str("placements"),
            Self::CloneItem => f.write_str("clone item"),
        }
    }
}

/// Deduplication key of a fault report.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FaultKey {
    /// Entity type of the failing handler.
    pub entity_type: String,
    /// Instance being resolved.
    pub entity: EntityId,
    /// What was being resolved.
    pub operation: Operation,
}

impl FaultKey {
    /// Creates a key.
    #[must_use]
    pub fn new(entity_type: impl Into<String>, entity: EntityId, operation: Operation) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity,
            operation,
        }
    }
}

// =============================================================================
// Containment
// =============================================================================

thread_local! {
    static CONTAINING: Cell<usize> = const { Cell::new(0) };
}

static QUIET_HOOK: Once = Once::new();

fn install_quiet_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !containing() {
                previous(info);
            }
        }));
    });
}

/// True while the current thread runs inside [`contain`].
fn containing() -> bool {
    CONTAINING.with(|depth| depth.get() > 0)
}

/// Marks the current thread as containing; unwinding leaves the scope too.
struct ContainScope;

impl ContainScope {
    fn enter() -> Self {
        CONTAINING.with(|depth| depth.set(depth.get() + 1));
        Self
    }
}

impl Drop for ContainScope {
    fn drop(&mut self) {
        CONTAINING.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Runs `f`, turning a panic into a [`HandlerFault`].
///
/// The panic is not printed by the process panic hook; the barrier reports
/// it instead.
///
/// # Errors
///
/// Returns the error `f` returned, or [`HandlerFault::Panicked`].
pub fn contain<T>(f: impl FnOnce() -> Result<T, HandlerFault>) -> Result<T, HandlerFault> {
    install_quiet_hook();
    let _scope = ContainScope::enter();
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| Err(HandlerFault::from_panic(payload.as_ref())))
}

/// Contains handler faults and reports each distinct one once.
#[derive(Debug)]
pub struct FaultBarrier {
    seen: HashSet<FaultKey>,
    order: VecDeque<FaultKey>,
    capacity: usize,
    reported: u64,
}

impl FaultBarrier {
    /// Creates a barrier remembering up to `capacity` distinct faults.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            seen: HashSet::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
            reported: 0,
        }
    }

    /// Runs `attempt`; on a fault, reports it and returns `fallback()`.
    pub fn guard<T>(
        &mut self,
        entity_type: &str,
        entity: EntityId,
        operation: Operation,
        attempt: impl FnOnce() -> Result<T, HandlerFault>,
        fallback: impl FnOnce() -> T,
    ) -> T {
        match contain(attempt) {
            Ok(value) => value,
            Err(fault) => {
                self.report(FaultKey::new(entity_type, entity, operation), &fault);
                fallback()
            }
        }
    }

    /// Records a fault, logging it if this key has not been reported yet.
    /// Returns true when the fault was logged.
    pub fn report(&mut self, key: FaultKey, fault: &HandlerFault) -> bool {
        if self.seen.contains(&key) {
            return false;
        }

        error!(
            entity_type = %key.entity_type,
            entity = %key.entity,
            operation = %key.operation,
            backtrace = %Backtrace::force_capture(),
            "handler fault, drawing placeholder: {fault}"
        );

        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        self.seen.insert(key.clone());
        self.order.push_back(key);
        self.reported += 1;
        true
    }

    /// True if `key` has been reported and is still remembered.
    #[must_use]
    pub fn has_reported(&self, key: &FaultKey) -> bool {
        self.seen.contains(key)
    }

    /// Total faults logged since creation.
    #[must_use]
    pub const fn reported(&self) -> u64 {
        self.reported
    }

    /// Number of keys currently remembered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True if no keys are remembered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Forgets every reported key.
    pub fn reset(&mut self) {
        self.seen.clear();
        self.order.clear();
    }
}
