//! Lazily produced model output.

use crate::error::ModelError;
use core::pin::Pin;
use core::task::{Context, Poll};
use futures::stream::{self, Stream, StreamExt};

type BoxedTextStream = Pin<Box<dyn Stream<Item = Result<String, ModelError>> + Send>>;

/// A pull-based sequence of text fragments produced by a model.
///
/// Fragments are yielded in the order the provider emits them. Dropping the
/// stream abandons any in-flight request. A stream cannot be restarted:
/// executing the model again issues a fresh request.
pub struct TextStream {
    inner: BoxedTextStream,
}

impl TextStream {
    /// Wraps a stream of fragments.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<String, ModelError>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }

    /// A stream that yields nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(stream::empty())
    }

    /// Drains the stream and concatenates every fragment.
    ///
    /// # Errors
    ///
    /// Returns the first error yielded by the stream.
    pub async fn text(mut self) -> Result<String, ModelError> {
        let mut text = String::new();
        while let Some(fragment) = self.next().await {
            text.push_str(&fragment?);
        }
        Ok(text)
    }
}

impl Stream for TextStream {
    type Item = Result<String, ModelError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl core::fmt::Debug for TextStream {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TextStream").finish_non_exhaustive()
    }
}
