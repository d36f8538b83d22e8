/// Execute an aggregate command deterministically (no IO, no async).
///
/// The canonical decide-then-evolve lifecycle:
///
/// 1. **Decide**: `aggregate.handle(command)` returns events (pure).
/// 2. **Evolve**: each event is applied via `aggregate.apply(event)`.
///
/// The returned events are what happened; callers publish them to the bus
/// and persist the resulting state. The aggregate is mutated in place.
pub fn execute<A>(aggregate: &mut A, command: &A::Command) -> Result<Vec<A::Event>, A::Error>
where
    A: scantally_core::Aggregate,
{
    let events = A::handle(aggregate, command)?;
    for ev in &events {
        A::apply(aggregate, ev);
    }
    Ok(events)
}
