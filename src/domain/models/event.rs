use super::BuildJob;
use super::BuilderError;
use super::GenerationResult;
use super::Progress;

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    GenerationStarted(),
    GenerationProgress(Progress),
    GenerationFinished(GenerationResult),
    GenerationFailed(BuilderError),
    BuildSubmitted(BuildJob),
    BuildUpdated(BuildJob),
    BuildSubmitFailed(BuilderError),
}
