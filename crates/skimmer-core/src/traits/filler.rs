use crate::error::Result;
use crate::registry::IdentityRegistry;
use crate::traits::SourceAccessor;
use crate::types::OutputEvent;

/// One independent component of the event pipeline
///
/// A filler owns exactly one output collection for the duration of an
/// event. The pipeline drives it through `fill`, `set_refs` and `finalize`
/// in that order, with a barrier between `fill` and `set_refs` across all
/// fillers.
pub trait Filler: Send {
    /// Unique component name
    fn name(&self) -> &str;

    /// Select and project source records into the owned collection.
    ///
    /// `maps` is this component's private registry fragment; it is merged
    /// into the shared registry once every filler has returned.
    fn fill(&mut self, source: &dyn SourceAccessor, maps: &mut IdentityRegistry) -> Result<()>;

    /// Resolve cross references against the sealed, merged registry
    fn set_refs(&mut self, _maps: &IdentityRegistry) -> Result<()> {
        Ok(())
    }

    /// Move the owned collection into the output event
    fn finalize(&mut self, out: &mut OutputEvent);

    /// Drop all per-event state
    fn reset(&mut self);
}
