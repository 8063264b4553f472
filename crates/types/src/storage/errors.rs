//! Error types for storage operations

use thiserror::Error;

/// Storage error type
#[derive(Debug, Error)]
pub enum StorageError {
	#[error("Record not found: {id}")]
	NotFound { id: String },
	#[error("Record already exists: {id}")]
	Duplicate { id: String },
	#[error("Connection error: {message}")]
	Connection { message: String },
	#[error("Serialization error: {message}")]
	Serialization { message: String },
	#[error("Storage operation failed: {message}")]
	Operation { message: String },
}

impl StorageError {
	pub fn not_found(id: impl Into<String>) -> Self {
		StorageError::NotFound { id: id.into() }
	}

	pub fn duplicate(id: impl Into<String>) -> Self {
		StorageError::Duplicate { id: id.into() }
	}

	pub fn operation(message: impl Into<String>) -> Self {
		StorageError::Operation {
			message: message.into(),
		}
	}
}
