use crate::domain::transaction::TransactionRequest;
use crate::error::{PermitError, Result};
use serde_json::Value;
use std::io::Read;

/// Reads create requests from a stream of JSON objects.
///
/// Objects may be newline-delimited or simply concatenated. Each object is
/// parsed into a [`serde_json::Value`] first, so an object with the wrong
/// shape yields one `Err` and reading continues with the next one. Invalid
/// JSON syntax ends the stream after its error.
pub struct RequestReader<R: Read> {
    source: R,
}

impl<R: Read> RequestReader<R> {
    /// Creates a new `RequestReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        Self { source }
    }

    /// Returns an iterator that lazily reads and deserializes requests.
    pub fn requests(self) -> impl Iterator<Item = Result<TransactionRequest>> {
        serde_json::Deserializer::from_reader(self.source)
            .into_iter::<Value>()
            .map(|value| {
                let value = value?;
                serde_json::from_value(value).map_err(PermitError::from)
            })
    }
}
