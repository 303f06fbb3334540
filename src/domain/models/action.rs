use super::BuildRequest;
use super::GenerationRequest;

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Generate(GenerationRequest),
    SubmitBuild(BuildRequest),
    /// Stops tracking the current build. The remote build keeps running.
    CancelBuild(),
}
