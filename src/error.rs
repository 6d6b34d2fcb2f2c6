use thiserror::Error;

/// Failures at the engine's I/O boundaries.
///
/// Every variant carries the identity of the offending input so callers can
/// report it; the entity collection and history are left untouched whenever
/// one of these is returned. Constraint violations are not errors (they
/// resolve by silent revert, see [`crate::constraint::TransformOutcome`]),
/// and history boundary conditions are reported as no-ops, never through
/// this type.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("failed to parse scene payload '{source_name}': {source}")]
    ImportParse {
        source_name: String,
        #[source]
        source: gltf::Error,
    },

    #[error("failed to fetch '{url}': {reason}")]
    ImportNetwork { url: String, reason: String },

    #[error("failed to decode texture image: {source}")]
    TextureDecode {
        #[from]
        source: image::ImageError,
    },

    #[error("failed to serialize scene export: {reason}")]
    ExportSerialization { reason: String },
}

impl EditError {
    pub(crate) fn export(reason: impl Into<String>) -> Self {
        EditError::ExportSerialization { reason: reason.into() }
    }

    pub(crate) fn network(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        EditError::ImportNetwork { url: url.into(), reason: reason.to_string() }
    }
}
