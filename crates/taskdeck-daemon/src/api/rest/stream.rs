//! Newline-delimited JSON progress responses

use axum::{
    body::Body,
    http::header,
    response::{IntoResponse, Response},
};
use futures_util::stream;
use std::convert::Infallible;
use taskdeck_engine::ProgressStream;

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Stream one JSON line per progress message; the body ends with the run.
///
/// Dropping the response does not cancel the run.
pub fn ndjson_response(progress: ProgressStream) -> Response {
    let lines = stream::unfold(progress, |mut progress| async move {
        let message = progress.next().await?;
        let mut line = serde_json::to_string(&message).unwrap_or_default();
        line.push('\n');
        Some((Ok::<_, Infallible>(line), progress))
    });

    (
        [
            (header::CONTENT_TYPE, NDJSON_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(lines),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdeck_engine::progress_channel;
    use taskdeck_types::ProgressEvent;

    #[tokio::test]
    async fn test_lines_follow_wire_format() {
        let (mut tx, rx) = progress_channel(8);
        tx.emit(ProgressEvent::new(1, 2)).await;
        tx.emit(ProgressEvent::new(2, 2)).await;
        drop(tx);

        let response = ndjson_response(rx);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            NDJSON_CONTENT_TYPE
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(
            std::str::from_utf8(&body).unwrap(),
            "{\"type\":\"progress\",\"progress\":{\"current\":1,\"total\":2}}\n\
             {\"type\":\"progress\",\"progress\":{\"current\":2,\"total\":2}}\n"
        );
    }
}
