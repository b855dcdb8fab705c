use async_trait::async_trait;

/// A synchronous unit of work run against a shared pipeline context
pub trait BlockingTask<C, E>: Send + Sync {
    fn run(&self, context: &C) -> Result<(), E>;
}

/// An asynchronous unit of work run against a shared pipeline context
#[async_trait]
pub trait AsyncTask<C: Sync, E>: Send + Sync {
    async fn run(&self, context: &C) -> Result<(), E>;
}

enum Stage<C: Sync, E> {
    Blocking(Box<dyn BlockingTask<C, E>>),
    Async(Box<dyn AsyncTask<C, E>>),
}

/// Ordered list of tasks executed one after another. The first
/// task to fail stops the pipeline and its error is returned
pub struct Pipeline<C: Sync, E> {
    stages: Vec<Stage<C, E>>,
}

impl<C: Sync, E> Pipeline<C, E> {
    pub async fn run(&self, context: &C) -> Result<(), E> {
        for stage in &self.stages {
            match stage {
                Stage::Blocking(task) => task.run(context)?,
                Stage::Async(task) => task.run(context).await?,
            }
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }
}

pub struct PipelineBuilder<C: Sync, E> {
    stages: Vec<Stage<C, E>>,
}

impl<C: Sync, E> PipelineBuilder<C, E> {
    pub fn new() -> Self {
        PipelineBuilder { stages: Vec::new() }
    }

    pub fn with_blocking(mut self, task: Box<dyn BlockingTask<C, E>>) -> Self {
        self.stages.push(Stage::Blocking(task));
        self
    }

    pub fn with_async(mut self, task: Box<dyn AsyncTask<C, E>>) -> Self {
        self.stages.push(Stage::Async(task));
        self
    }

    /// Returns `None` when no tasks were added
    pub fn build(self) -> Option<Pipeline<C, E>> {
        if self.stages.is_empty() {
            return None;
        }

        Some(Pipeline {
            stages: self.stages,
        })
    }
}

impl<C: Sync, E> Default for PipelineBuilder<C, E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Error, bail};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Trace {
        steps: Mutex<Vec<&'static str>>,
    }

    struct Step(&'static str);

    impl BlockingTask<Trace, Error> for Step {
        fn run(&self, context: &Trace) -> Result<(), Error> {
            context.steps.lock().push(self.0);
            Ok(())
        }
    }

    struct AsyncStep(&'static str);

    #[async_trait]
    impl AsyncTask<Trace, Error> for AsyncStep {
        async fn run(&self, context: &Trace) -> Result<(), Error> {
            tokio::task::yield_now().await;
            context.steps.lock().push(self.0);
            Ok(())
        }
    }

    struct Fail;

    impl BlockingTask<Trace, Error> for Fail {
        fn run(&self, _context: &Trace) -> Result<(), Error> {
            bail!("stop here")
        }
    }

    #[test]
    fn test_empty_builder_builds_nothing() {
        assert!(PipelineBuilder::<Trace, Error>::new().build().is_none());
    }

    #[tokio::test]
    async fn test_runs_tasks_in_order() {
        let pipeline = PipelineBuilder::new()
            .with_blocking(Box::new(Step("a")))
            .with_async(Box::new(AsyncStep("b")))
            .with_blocking(Box::new(Step("c")))
            .build()
            .unwrap();

        let trace = Trace::default();
        pipeline.run(&trace).await.unwrap();

        assert_eq!(pipeline.len(), 3);
        assert_eq!(*trace.steps.lock(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_failure_stops_remaining_tasks() {
        let pipeline = PipelineBuilder::new()
            .with_blocking(Box::new(Step("a")))
            .with_blocking(Box::new(Fail))
            .with_blocking(Box::new(Step("never")))
            .build()
            .unwrap();

        let trace = Trace::default();
        assert!(pipeline.run(&trace).await.is_err());
        assert_eq!(*trace.steps.lock(), vec!["a"]);
    }
}
