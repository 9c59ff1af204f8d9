//! Turns an upstream completion stream into rewrite tokens

use super::ports::{RewriteError, StreamToken, TokenStream};
use futures::stream::Stream;
use inference_providers::{CompletionError, SSEEvent, StreamingResult};
use std::{
    pin::Pin,
    task::{ready, Context, Poll},
};

/// Stream adapter from parsed upstream events to [`StreamToken`]s
///
/// Emits one `Token` per non-empty delta, then `Done` when the upstream ends.
/// Malformed events are skipped. Any other upstream error is passed on and
/// ends the stream without `Done`.
pub struct TokenRelay<S> {
    inner: S,
    tokens: usize,
    finished: bool,
}

impl<S> TokenRelay<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            tokens: 0,
            finished: false,
        }
    }
}

impl<S> Stream for TokenRelay<S>
where
    S: Stream<Item = Result<SSEEvent, CompletionError>> + Unpin,
{
    type Item = Result<StreamToken, RewriteError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if self.finished {
                return Poll::Ready(None);
            }

            match ready!(Pin::new(&mut self.inner).poll_next(cx)) {
                Some(Ok(event)) => match event.chunk.delta_content() {
                    Some(content) if !content.is_empty() => {
                        self.tokens += 1;
                        return Poll::Ready(Some(Ok(StreamToken::Token(content.to_string()))));
                    }
                    // Role-only, usage-only and finish chunks carry no text
                    _ => continue,
                },
                Some(Err(CompletionError::InvalidResponse(message))) => {
                    tracing::warn!(error = %message, "Skipping malformed upstream event");
                    continue;
                }
                Some(Err(e)) => {
                    self.finished = true;
                    tracing::error!(
                        error = %e,
                        tokens = self.tokens,
                        "Upstream stream failed mid-response"
                    );
                    return Poll::Ready(Some(Err(e.into())));
                }
                None => {
                    self.finished = true;
                    tracing::debug!(tokens = self.tokens, "Upstream stream completed");
                    return Poll::Ready(Some(Ok(StreamToken::Done)));
                }
            }
        }
    }
}

/// Relay an upstream completion stream as rewrite tokens
pub fn relay_tokens(upstream: StreamingResult) -> TokenStream {
    Box::pin(TokenRelay::new(upstream))
}
