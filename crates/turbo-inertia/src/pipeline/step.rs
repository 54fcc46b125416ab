//! Step contract.

use std::fmt;

use async_trait::async_trait;

use crate::error::PipelineError;
use crate::exchange::Exchange;

/// Something a step can need or add to an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Session bag placed by the host's session layer.
    Session,
    /// Flash store attached to the exchange.
    Flash,
    /// Protocol core attached to the exchange.
    Protocol,
}

impl Capability {
    /// Whether the host provides this before the pipeline runs.
    pub fn is_host_provided(&self) -> bool {
        matches!(self, Self::Session)
    }

    /// Name of the facility that supplies this capability.
    pub fn supplier(&self) -> &'static str {
        match self {
            Self::Session => "session middleware",
            Self::Flash => "flash",
            Self::Protocol => "inertia",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Session => write!(f, "session"),
            Self::Flash => write!(f, "flash"),
            Self::Protocol => write!(f, "protocol"),
        }
    }
}

/// Static description of a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDescriptor {
    /// Unique step name.
    pub name: &'static str,
    /// Capabilities that must be present before the step runs.
    pub requires: Vec<Capability>,
    /// Capabilities the step adds.
    pub provides: Vec<Capability>,
}

impl StepDescriptor {
    /// Describe a step with no requirements.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            requires: Vec::new(),
            provides: Vec::new(),
        }
    }

    /// Add a requirement.
    pub fn requires(mut self, capability: Capability) -> Self {
        self.requires.push(capability);
        self
    }

    /// Add a provided capability.
    pub fn provides(mut self, capability: Capability) -> Self {
        self.provides.push(capability);
        self
    }
}

/// What happened after a step ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Run the next step.
    Continue,
    /// The step answered the request; stop.
    Terminated,
}

/// A unit of request preparation.
#[async_trait]
pub trait Step<C: Send + 'static>: Send + Sync {
    /// Name and capability contract.
    fn descriptor(&self) -> StepDescriptor;

    /// Run against one exchange.
    async fn run(&self, exchange: &mut Exchange<C>) -> Result<StepOutcome, PipelineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_builder() {
        let descriptor = StepDescriptor::new("flash")
            .requires(Capability::Session)
            .provides(Capability::Flash);

        assert_eq!(descriptor.name, "flash");
        assert_eq!(descriptor.requires, vec![Capability::Session]);
        assert_eq!(descriptor.provides, vec![Capability::Flash]);
    }

    #[test]
    fn test_capability_sources() {
        assert!(Capability::Session.is_host_provided());
        assert!(!Capability::Flash.is_host_provided());
        assert_eq!(Capability::Session.supplier(), "session middleware");
        assert_eq!(Capability::Protocol.to_string(), "protocol");
    }
}
