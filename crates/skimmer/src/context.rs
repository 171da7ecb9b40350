use skimmer_core::{ComponentStage, EventKey, IdentityRegistry, Result, SkimError};

/// Per-event bookkeeping: the event key and the stage of every component
///
/// Created fresh for each event and dropped with it.
#[derive(Debug)]
pub struct EventContext {
    key: EventKey,
    stages: Vec<(String, ComponentStage)>,
}

impl EventContext {
    pub fn new<I, S>(key: EventKey, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key,
            stages: components
                .into_iter()
                .map(|name| (name.into(), ComponentStage::Unfilled))
                .collect(),
        }
    }

    pub fn key(&self) -> EventKey {
        self.key
    }

    pub fn stage(&self, component: &str) -> Option<ComponentStage> {
        self.stages
            .iter()
            .find(|(name, _)| name == component)
            .map(|(_, stage)| *stage)
    }

    /// Advance one component.
    ///
    /// Linking is only allowed once every component has filled.
    pub fn advance(&mut self, component: &str, to: ComponentStage) -> Result<()> {
        if to == ComponentStage::Linked {
            if let Some((name, stage)) = self
                .stages
                .iter()
                .find(|(_, stage)| *stage < ComponentStage::Filled)
            {
                return Err(SkimError::InvalidStage {
                    component: name.clone(),
                    from: *stage,
                    to: ComponentStage::Filled,
                });
            }
        }

        let (name, stage) = self
            .stages
            .iter_mut()
            .find(|(name, _)| name == component)
            .ok_or_else(|| SkimError::Config(format!("unknown component '{}'", component)))?;
        stage.advance(name, to)
    }

    pub fn advance_all(&mut self, to: ComponentStage) -> Result<()> {
        let names: Vec<String> = self.stages.iter().map(|(name, _)| name.clone()).collect();
        for name in names {
            self.advance(&name, to)?;
        }
        Ok(())
    }

    /// The fill/link barrier: merge every fragment and seal the result
    pub fn barrier(&self, fragments: Vec<IdentityRegistry>) -> Result<IdentityRegistry> {
        if let Some((name, stage)) = self
            .stages
            .iter()
            .find(|(_, stage)| *stage != ComponentStage::Filled)
        {
            return Err(SkimError::InvalidStage {
                component: name.clone(),
                from: *stage,
                to: ComponentStage::Linked,
            });
        }

        let mut registry = IdentityRegistry::new();
        for fragment in fragments {
            registry.merge(fragment)?;
        }
        registry.seal();
        tracing::trace!("Event {}: sealed registry with {} maps", self.key, registry.len());
        Ok(registry)
    }
}
