use pysecure_core::ProjectBundle;

use crate::GenerateError;

/// Turn the raw model output into a bundle. The body must be exactly one
/// JSON document of the bundle shape; nothing is stripped or repaired.
pub fn parse_response(raw: &str) -> Result<ProjectBundle, GenerateError> {
    if raw.trim().is_empty() {
        return Err(GenerateError::EmptyResponse);
    }
    ProjectBundle::from_json(raw).map_err(GenerateError::Malformed)
}
