// src/health/check.rs
use crate::probe::Probe;
use std::fmt;
use std::sync::Arc;

/// A named probe plus the policy for how its failure affects the verdict.
#[derive(Clone)]
pub struct DependencyCheck {
    name: String,
    probe: Arc<dyn Probe>,
    critical: bool,
}

impl DependencyCheck {
    /// New checks are critical unless told otherwise.
    pub fn new<P>(name: impl Into<String>, probe: P) -> Self
    where
        P: Probe + 'static,
    {
        Self::from_arc(name, Arc::new(probe))
    }

    pub fn from_arc(name: impl Into<String>, probe: Arc<dyn Probe>) -> Self {
        Self {
            name: name.into(),
            probe,
            critical: true,
        }
    }

    pub fn critical(mut self, critical: bool) -> Self {
        self.critical = critical;
        self
    }

    pub fn non_critical(self) -> Self {
        self.critical(false)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    pub fn probe(&self) -> Arc<dyn Probe> {
        self.probe.clone()
    }
}

impl fmt::Debug for DependencyCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyCheck")
            .field("name", &self.name)
            .field("probe", &self.probe.kind())
            .field("critical", &self.critical)
            .finish()
    }
}
