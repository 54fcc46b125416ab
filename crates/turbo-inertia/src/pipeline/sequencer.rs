//! Ordered step execution.

use std::collections::HashSet;
use std::fmt;

use crate::error::PipelineError;
use crate::exchange::Exchange;
use crate::pipeline::{Capability, Step, StepDescriptor, StepOutcome};

/// How a pipeline run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Every step ran; the handler may proceed.
    Ready,
    /// The reply was sent before the pipeline finished.
    Terminated {
        /// Step that answered the request, or `"host"` if it was already sent.
        by: &'static str,
    },
}

/// Runs steps in registration order.
pub struct Sequencer<C: Send + 'static> {
    steps: Vec<Box<dyn Step<C>>>,
    descriptors: Vec<StepDescriptor>,
}

impl<C: Send + 'static> Sequencer<C> {
    /// Create an empty sequencer.
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            descriptors: Vec::new(),
        }
    }

    /// Append a step.
    ///
    /// Fails when the name is taken or when the step needs a capability that
    /// no earlier step provides.
    pub fn push<S: Step<C> + 'static>(&mut self, step: S) -> Result<(), PipelineError> {
        self.push_boxed(Box::new(step))
    }

    /// Append a boxed step.
    pub fn push_boxed(&mut self, step: Box<dyn Step<C>>) -> Result<(), PipelineError> {
        let descriptor = step.descriptor();

        if self.descriptors.iter().any(|d| d.name == descriptor.name) {
            return Err(PipelineError::DuplicateStep(descriptor.name));
        }

        let provided: HashSet<Capability> = self
            .descriptors
            .iter()
            .flat_map(|d| d.provides.iter().copied())
            .collect();
        if let Some(missing) = descriptor
            .requires
            .iter()
            .find(|c| !c.is_host_provided() && !provided.contains(*c))
        {
            return Err(PipelineError::OutOfOrder {
                step: descriptor.name,
                capability: *missing,
            });
        }

        tracing::debug!(
            step = descriptor.name,
            position = self.steps.len(),
            "registered pipeline step"
        );
        self.descriptors.push(descriptor);
        self.steps.push(step);
        Ok(())
    }

    /// Registered steps, in order.
    pub fn descriptors(&self) -> &[StepDescriptor] {
        &self.descriptors
    }

    /// Step names, in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.descriptors.iter().map(|d| d.name).collect()
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether no steps are registered.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step against an exchange.
    ///
    /// Stops at the first error or at the first point where the reply has
    /// been sent.
    pub async fn run(&self, exchange: &mut Exchange<C>) -> Result<Completion, PipelineError> {
        let mut last = "host";

        for (step, descriptor) in self.steps.iter().zip(&self.descriptors) {
            if exchange.reply().is_sent() {
                tracing::debug!(
                    before = descriptor.name,
                    by = last,
                    "reply sent; stopping pipeline"
                );
                return Ok(Completion::Terminated { by: last });
            }

            if let Some(missing) = descriptor.requires.iter().find(|c| !exchange.has(**c)) {
                return Err(PipelineError::MissingDependency(format!(
                    "{} requires {}",
                    descriptor.name,
                    missing.supplier()
                )));
            }

            tracing::debug!(step = descriptor.name, "running pipeline step");
            match step.run(exchange).await? {
                StepOutcome::Continue => last = descriptor.name,
                StepOutcome::Terminated => {
                    tracing::debug!(step = descriptor.name, "step answered the request");
                    return Ok(Completion::Terminated {
                        by: descriptor.name,
                    });
                }
            }
        }

        if exchange.reply().is_sent() {
            return Ok(Completion::Terminated { by: last });
        }
        Ok(Completion::Ready)
    }
}

impl<C: Send + 'static> Default for Sequencer<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Send + 'static> fmt::Debug for Sequencer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.descriptors.iter().map(|d| d.name))
            .finish()
    }
}
