//! Aggregate root abstraction.

use uuid::Uuid;

use crate::event::DomainEvent;

/// Trait for aggregate roots whose state is driven by the events they record.
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate produces and consumes.
    type Event: DomainEvent + Clone;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Returns the current version (number of events applied).
    fn version(&self) -> i64;

    /// Apply an event to mutate internal state. Must not fail.
    fn apply(&mut self, event: &Self::Event);

    /// Returns uncommitted events produced by command handling.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Clears uncommitted events after they have been committed.
    fn clear_uncommitted_events(&mut self);

    /// Applies every uncommitted event in order and returns them.
    ///
    /// Domain methods only record events after all validation has passed, so
    /// committing is the single point where state actually changes.
    fn commit(&mut self) -> Vec<Self::Event> {
        let events = self.uncommitted_events().to_vec();
        self.clear_uncommitted_events();
        for event in &events {
            self.apply(event);
        }
        events
    }
}
