//! SSE re-framing of provider delta streams.
//!
//! The provider delivers incremental text fragments; the SSE wire format
//! terminates each frame at the first newline. This module splits each
//! fragment on its embedded newlines and emits one `data:` frame per
//! segment, with a blank-payload marker frame between segments so the
//! consuming renderer can distinguish an intentional line break from SSE's
//! own event-separator blank line.
//!
//! Fragments are split independently; a logical line spanning two fragments
//! is emitted as two frames. Product owners have been asked whether that is
//! intended (see DESIGN.md); until then the behavior is kept as-is.

use crate::services::providers::ChatStream;
use bytes::Bytes;
use futures::StreamExt;
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Marker frame signalling "end of visual line, insert a line break":
/// an empty payload with one trailing space.
pub const LINE_BREAK_FRAME: &str = "data:  \n\n";

/// Wrap one payload segment as an SSE frame.
fn frame(segment: &str) -> String {
    format!("data: {}\n\n", segment)
}

/// Convert one delta fragment into zero or more SSE frames.
///
/// Empty fragments produce nothing. Every segment before the last is
/// followed by a [`LINE_BREAK_FRAME`]; an empty trailing segment (the
/// fragment ended exactly on a newline) produces no frame of its own.
pub fn reframe_fragment(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let segments: Vec<&str> = text.split('\n').collect();
    let last = segments.len() - 1;

    let mut frames = Vec::new();
    for (i, segment) in segments.iter().enumerate() {
        if i < last {
            frames.push(frame(segment));
            frames.push(LINE_BREAK_FRAME.to_string());
        } else if !segment.is_empty() {
            frames.push(frame(segment));
        }
    }

    frames
}

/// Adapt a provider delta stream into an SSE response body.
///
/// Frames are forwarded as produced, never batched, so the client observes
/// incremental delivery. If the provider stream fails mid-iteration, exactly
/// one terminal error frame is emitted and the body ends; there is no retry
/// or resume.
pub fn sse_body(mut deltas: ChatStream) -> ReceiverStream<Result<Bytes, Infallible>> {
    let (tx, rx) = mpsc::channel::<Result<Bytes, Infallible>>(32);

    tokio::spawn(async move {
        while let Some(item) = deltas.next().await {
            match item {
                Ok(fragment) => {
                    for frame in reframe_fragment(&fragment) {
                        if tx.send(Ok(Bytes::from(frame))).await.is_err() {
                            // Client went away; dropping `deltas` aborts the
                            // upstream provider request.
                            return;
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Provider stream failed mid-response");
                    let _ = tx
                        .send(Ok(Bytes::from(format!("data: Error: {}\n\n", e))))
                        .await;
                    return;
                }
            }
        }
    });

    ReceiverStream::new(rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::ProviderError;

    /// Rebuild the original fragment text from emitted frames: marker frames
    /// become newlines, payload frames contribute their payload.
    fn reconstruct(frames: &[String]) -> String {
        let mut text = String::new();
        for f in frames {
            if f == LINE_BREAK_FRAME {
                text.push('\n');
            } else {
                let payload = f
                    .strip_prefix("data: ")
                    .and_then(|rest| rest.strip_suffix("\n\n"))
                    .expect("frame shape");
                text.push_str(payload);
            }
        }
        text
    }

    #[test]
    fn fragment_without_newline_is_one_frame() {
        assert_eq!(reframe_fragment("hello"), vec!["data: hello\n\n"]);
    }

    #[test]
    fn empty_fragment_emits_nothing() {
        assert!(reframe_fragment("").is_empty());
    }

    #[test]
    fn embedded_newline_yields_three_frames() {
        assert_eq!(
            reframe_fragment("A\nB"),
            vec!["data: A\n\n", "data:  \n\n", "data: B\n\n"]
        );
    }

    #[test]
    fn trailing_newline_yields_two_frames() {
        assert_eq!(
            reframe_fragment("A\n"),
            vec!["data: A\n\n", "data:  \n\n"]
        );
    }

    #[test]
    fn lone_newline_yields_empty_payload_then_marker() {
        assert_eq!(reframe_fragment("\n"), vec!["data: \n\n", "data:  \n\n"]);
    }

    #[test]
    fn fragments_are_split_independently() {
        // A line spanning a fragment boundary is NOT merged: two newline-less
        // fragments produce two separate frames, not one.
        let mut frames = reframe_fragment("AB");
        frames.extend(reframe_fragment("CD\n"));
        assert_eq!(
            frames,
            vec!["data: AB\n\n", "data: CD\n\n", "data:  \n\n"]
        );
    }

    #[test]
    fn reconstruction_roundtrips_single_fragments() {
        for text in ["A\nB", "A\n", "\nA", "one\ntwo\nthree", "no newline"] {
            assert_eq!(reconstruct(&reframe_fragment(text)), text);
        }
    }

    async fn collect_body(deltas: ChatStream) -> Vec<String> {
        sse_body(deltas)
            .map(|chunk| String::from_utf8(chunk.unwrap().to_vec()).unwrap())
            .collect()
            .await
    }

    #[tokio::test]
    async fn body_preserves_fragment_order() {
        let deltas: ChatStream = Box::pin(tokio_stream::iter(vec![
            Ok("### Sum".to_string()),
            Ok("mary\n".to_string()),
            Ok(String::new()),
            Ok("- BP elevated".to_string()),
        ]));

        let frames = collect_body(deltas).await;
        assert_eq!(
            frames,
            vec![
                "data: ### Sum\n\n",
                "data: mary\n\n",
                "data:  \n\n",
                "data: - BP elevated\n\n",
            ]
        );
    }

    #[tokio::test]
    async fn mid_stream_failure_emits_one_error_frame_and_stops() {
        let deltas: ChatStream = Box::pin(tokio_stream::iter(vec![
            Ok("partial".to_string()),
            Err(ProviderError::ApiError("boom".to_string())),
            Ok("never delivered".to_string()),
        ]));

        let frames = collect_body(deltas).await;
        assert_eq!(
            frames,
            vec!["data: partial\n\n", "data: Error: API error: boom\n\n"]
        );
    }
}
