//! Event pipeline
//!
//! Drives every registered filler through the two phases of an event:
//!
//! 1. **Fill**: each filler selects and projects its records into a private
//!    registry fragment
//! 2. **Barrier**: fragments are merged and the registry is sealed
//! 3. **Link**: each filler resolves its references against the sealed
//!    registry
//! 4. **Finalize**: collections move into the output event
//!
//! Any error aborts the whole event. Fillers are reset before the error is
//! returned, so the next event starts clean.

use crate::context::EventContext;
use crate::fillers::{GenParticlesFiller, MuonsFiller, TausFiller, VerticesFiller};
use skimmer_core::{
    observe, ComponentStage, Filler, IdentityRegistry, OutputEvent, Result, SkimConfig,
    SkimError, SourceAccessor,
};
use std::collections::HashSet;
use std::thread;
use std::time::Instant;

/// Builder for event pipelines
///
/// # Example
///
/// ```ignore
/// let mut pipeline = EventPipelineBuilder::new()
///     .with_filler(Box::new(VerticesFiller::new(VerticesConfig::default())))
///     .with_filler(Box::new(TausFiller::new(TausConfig::default())))
///     .with_parallel(true)
///     .build()?;
///
/// let out = pipeline.process(&event)?;
/// ```
#[derive(Default)]
pub struct EventPipelineBuilder {
    fillers: Vec<Box<dyn Filler>>,
    parallel: bool,
}

impl EventPipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default fillers for every enabled section of `config`
    pub fn from_config(config: &SkimConfig) -> Self {
        let mut builder = Self::new().with_parallel(config.parallel);
        if config.vertices.enabled {
            builder = builder.with_filler(Box::new(VerticesFiller::new(config.vertices.clone())));
        }
        if config.gen_particles.enabled {
            builder = builder.with_filler(Box::new(GenParticlesFiller::new(
                config.gen_particles.clone(),
            )));
        }
        if config.taus.enabled {
            builder = builder.with_filler(Box::new(TausFiller::new(config.taus.clone())));
        }
        if config.muons.enabled {
            builder = builder.with_filler(Box::new(MuonsFiller::new(config.muons.clone())));
        }
        builder
    }

    /// Register a filler
    pub fn with_filler(mut self, filler: Box<dyn Filler>) -> Self {
        self.fillers.push(filler);
        self
    }

    /// Run each phase with one scoped thread per filler
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn build(self) -> Result<EventPipeline> {
        let mut names = HashSet::new();
        for filler in &self.fillers {
            if !names.insert(filler.name().to_string()) {
                return Err(SkimError::Config(format!(
                    "duplicate component name '{}'",
                    filler.name()
                )));
            }
        }

        tracing::info!(
            "Built pipeline with {} components ({})",
            self.fillers.len(),
            if self.parallel { "parallel" } else { "sequential" }
        );

        Ok(EventPipeline {
            fillers: self.fillers,
            parallel: self.parallel,
            stats: PipelineStats::default(),
        })
    }
}

/// Counters over the lifetime of a pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub events_processed: u64,
    pub events_failed: u64,
}

/// Fill/link pipeline over a fixed set of fillers
pub struct EventPipeline {
    fillers: Vec<Box<dyn Filler>>,
    parallel: bool,
    stats: PipelineStats,
}

impl EventPipeline {
    pub fn builder() -> EventPipelineBuilder {
        EventPipelineBuilder::new()
    }

    pub fn from_config(config: &SkimConfig) -> Result<Self> {
        config.validate()?;
        EventPipelineBuilder::from_config(config).build()
    }

    pub fn component_names(&self) -> Vec<&str> {
        self.fillers.iter().map(|f| f.name()).collect()
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Process one event.
    ///
    /// On error no output is produced and every filler is reset.
    pub fn process(&mut self, source: &dyn SourceAccessor) -> Result<OutputEvent> {
        let start = Instant::now();
        let key = source.event_key();
        let result = self.run_phases(source);
        observe::record_event(start.elapsed(), result.is_ok());

        match &result {
            Ok(out) => {
                self.stats.events_processed += 1;
                tracing::debug!(
                    "Event {}: {} vertices, {} gen particles, {} taus, {} muons",
                    key,
                    out.vertices.len(),
                    out.gen_particles.len(),
                    out.taus.len(),
                    out.muons.len()
                );
            }
            Err(e) => {
                for filler in &mut self.fillers {
                    filler.reset();
                }
                self.stats.events_failed += 1;
                tracing::warn!("Event {} aborted: {}", key, e);
            }
        }
        result
    }

    fn run_phases(&mut self, source: &dyn SourceAccessor) -> Result<OutputEvent> {
        let mut ctx = EventContext::new(
            source.event_key(),
            self.fillers.iter().map(|f| f.name().to_string()),
        );

        let fragments = self.fill_phase(source)?;
        ctx.advance_all(ComponentStage::Filled)?;

        let registry = ctx.barrier(fragments)?;
        self.link_phase(&registry)?;
        ctx.advance_all(ComponentStage::Linked)?;

        let mut out = OutputEvent::new(ctx.key());
        for filler in &mut self.fillers {
            filler.finalize(&mut out);
        }
        ctx.advance_all(ComponentStage::Finalized)?;
        Ok(out)
    }

    fn fill_phase(&mut self, source: &dyn SourceAccessor) -> Result<Vec<IdentityRegistry>> {
        if !self.parallel {
            return self
                .fillers
                .iter_mut()
                .map(|filler| -> Result<IdentityRegistry> {
                    let mut maps = IdentityRegistry::new();
                    filler.fill(source, &mut maps)?;
                    Ok(maps)
                })
                .collect();
        }

        thread::scope(|s| {
            let tasks: Vec<_> = self
                .fillers
                .iter_mut()
                .map(|filler| {
                    let name = filler.name().to_string();
                    let task = s.spawn(move || {
                        let mut maps = IdentityRegistry::new();
                        filler.fill(source, &mut maps).map(|_| maps)
                    });
                    (name, task)
                })
                .collect();
            join_all(tasks)
        })
    }

    fn link_phase(&mut self, registry: &IdentityRegistry) -> Result<()> {
        if !self.parallel {
            for filler in &mut self.fillers {
                filler.set_refs(registry)?;
            }
            return Ok(());
        }

        thread::scope(|s| {
            let tasks: Vec<_> = self
                .fillers
                .iter_mut()
                .map(|filler| {
                    let name = filler.name().to_string();
                    (name, s.spawn(move || filler.set_refs(registry)))
                })
                .collect();
            join_all(tasks).map(|_: Vec<()>| ())
        })
    }
}

/// Join every task before reporting the first failure in component order
fn join_all<T>(tasks: Vec<(String, thread::ScopedJoinHandle<'_, Result<T>>)>) -> Result<Vec<T>> {
    let joined: Vec<_> = tasks
        .into_iter()
        .map(|(name, task)| (name, task.join()))
        .collect();

    joined
        .into_iter()
        .map(|(name, outcome)| {
            outcome.unwrap_or_else(|_| Err(SkimError::ComponentPanicked(name)))
        })
        .collect()
}
