//! Error kinds of an ingestion session.
//!
//! All fallible functions return `anyhow::Result`. Errors that callers need to tell apart are
//! created from an [`IngestError`] and can be recovered with `err.downcast_ref::<IngestError>()`.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
	/// The dataset is missing, can not be opened or has no layers.
	DatasetOpen { path: String, reason: String },
	/// Reading from a layer failed. Fatal for the current call only.
	LayerRead { layer: String, reason: String },
	/// The provider delivered a geometry in an encoding the engine can not decode.
	UnsupportedGeometryEncoding { format: String },
	/// The geometry could not be decoded.
	MalformedGeometry { reason: String },
	/// An operation was called in a state where it is not valid.
	IllegalState(&'static str),
}

impl IngestError {
	/// Returns `true` for errors that only affect a single feature.
	pub fn is_per_feature(&self) -> bool {
		matches!(
			self,
			IngestError::UnsupportedGeometryEncoding { .. } | IngestError::MalformedGeometry { .. }
		)
	}
}

impl fmt::Display for IngestError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			IngestError::DatasetOpen { path, reason } => write!(f, "failed to open dataset '{path}': {reason}"),
			IngestError::LayerRead { layer, reason } => write!(f, "failed to read layer '{layer}': {reason}"),
			IngestError::UnsupportedGeometryEncoding { format } => {
				write!(f, "unsupported geometry encoding '{format}'")
			}
			IngestError::MalformedGeometry { reason } => write!(f, "malformed geometry: {reason}"),
			IngestError::IllegalState(msg) => write!(f, "illegal state: {msg}"),
		}
	}
}

impl std::error::Error for IngestError {}
