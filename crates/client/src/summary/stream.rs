// Summary stream consumer: one NDJSON response per session, dispatched to a
// handler until done, error, end of body or cancellation.

use std::future::Future;
use std::pin::Pin;

use bookmemory_common::protocol::summary::{
    DecodeError, NdjsonDecoder, StreamError, StreamEvent,
};
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::Method;
use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Response body as a stream of byte chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// Failure below the HTTP status level: connect, TLS, body read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self(err.to_string())
    }
}

/// Caller overrides for the summary request.
#[derive(Debug, Clone, Default)]
pub struct SummaryRequest {
    /// Defaults to `POST`.
    pub method: Option<Method>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl SummaryRequest {
    pub fn method(&self) -> Method {
        self.method.clone().unwrap_or(Method::POST)
    }
}

pub struct SummaryResponse {
    pub status: u16,
    /// `None` when the response has no readable body.
    pub body: Option<ByteStream>,
}

/// Opens the summary stream for a bookmark. Implemented over HTTP by
/// [`crate::api::HttpBookmarkApi`].
pub trait SummaryTransport: Send + Sync + 'static {
    fn open(
        &self,
        bookmark_id: &str,
        request: &SummaryRequest,
    ) -> impl Future<Output = Result<SummaryResponse, TransportError>> + Send;
}

/// Receives the events of one stream session.
pub trait SummaryEvents {
    fn on_chunk(&mut self, chunk: &str);

    fn on_complete(&mut self);

    /// Terminal failure. No further callbacks follow.
    fn on_error(&mut self, error: StreamError);

    /// An `{error}` event arrived inside the stream. Returning the error ends
    /// the session through [`SummaryEvents::on_error`]; returning `Ok` keeps
    /// reading.
    fn on_event_error(&mut self, error: StreamError) -> Result<(), StreamError> {
        Err(error)
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    Completed,
    Failed(StreamError),
    /// Cancelled by the caller. No terminal callback fired.
    Aborted,
}

enum Step {
    Continue,
    Finished(StreamOutcome),
}

/// Run one summary session to its end.
///
/// Once `cancel` fires no callback is invoked. The body is dropped on every
/// exit path, which releases the connection.
pub async fn stream_summary<T, H>(
    transport: &T,
    bookmark_id: &str,
    request: &SummaryRequest,
    cancel: &CancellationToken,
    events: &mut H,
) -> StreamOutcome
where
    T: SummaryTransport,
    H: SummaryEvents,
{
    let opened = tokio::select! {
        biased;
        _ = cancel.cancelled() => return aborted(bookmark_id),
        opened = transport.open(bookmark_id, request) => opened,
    };

    let response = match opened {
        Ok(response) => response,
        Err(err) => {
            let message = if err.0.is_empty() { "Network error".to_string() } else { err.0 };
            return fail(cancel, events, StreamError::internal(message));
        }
    };

    if !(200..300).contains(&response.status) {
        drop(response.body);
        return fail(cancel, events, StreamError::http(response.status));
    }

    let Some(mut body) = response.body else {
        return fail(cancel, events, StreamError::internal("Missing response body"));
    };

    debug!(bookmark = %bookmark_id, "summary stream open");
    let outcome = read_events(&mut body, cancel, events).await;
    drop(body);

    if outcome == StreamOutcome::Aborted {
        return aborted(bookmark_id);
    }
    outcome
}

async fn read_events<H: SummaryEvents>(
    body: &mut ByteStream,
    cancel: &CancellationToken,
    events: &mut H,
) -> StreamOutcome {
    let mut decoder = NdjsonDecoder::new();

    loop {
        while let Some(decoded) = decoder.next_value() {
            if let Step::Finished(outcome) = dispatch(decoded, cancel, events) {
                return outcome;
            }
        }

        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return StreamOutcome::Aborted,
            next = body.next() => next,
        };

        match next {
            Some(Ok(bytes)) => decoder.push(&bytes),
            Some(Err(err)) => {
                let message = if err.0.is_empty() { "Streaming error".to_string() } else { err.0 };
                return fail(cancel, events, StreamError::internal(message));
            }
            None => break,
        }
    }

    if let Some(decoded) = decoder.finish() {
        if let Step::Finished(outcome) = dispatch(decoded, cancel, events) {
            return outcome;
        }
    }

    // Body ended without `done`.
    if cancel.is_cancelled() {
        return StreamOutcome::Aborted;
    }
    events.on_complete();
    StreamOutcome::Completed
}

fn dispatch<H: SummaryEvents>(
    decoded: Result<Value, DecodeError>,
    cancel: &CancellationToken,
    events: &mut H,
) -> Step {
    if cancel.is_cancelled() {
        return Step::Finished(StreamOutcome::Aborted);
    }

    let value = match decoded {
        Ok(value) => value,
        Err(err) => return Step::Finished(fail(cancel, events, StreamError::from(err))),
    };

    match StreamEvent::from_value(value) {
        StreamEvent::Error(error) => match events.on_event_error(error) {
            Ok(()) => Step::Continue,
            Err(error) => {
                events.on_error(error.clone());
                Step::Finished(StreamOutcome::Failed(error))
            }
        },
        StreamEvent::Chunk(chunk) => {
            events.on_chunk(&chunk);
            Step::Continue
        }
        StreamEvent::Done => {
            events.on_complete();
            Step::Finished(StreamOutcome::Completed)
        }
        StreamEvent::Unknown(_) => Step::Continue,
    }
}

fn fail<H: SummaryEvents>(
    cancel: &CancellationToken,
    events: &mut H,
    error: StreamError,
) -> StreamOutcome {
    if cancel.is_cancelled() {
        return StreamOutcome::Aborted;
    }
    events.on_error(error.clone());
    StreamOutcome::Failed(error)
}

fn aborted(bookmark_id: &str) -> StreamOutcome {
    debug!(bookmark = %bookmark_id, "summary stream aborted");
    StreamOutcome::Aborted
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use bookmemory_common::protocol::summary::{HTTP_ERROR, INTERNAL};
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc;

    pub(crate) enum Scripted {
        Body(Vec<Result<Bytes, TransportError>>),
        Live(mpsc::UnboundedReceiver<Result<Bytes, TransportError>>),
        Status(u16),
        NoBody,
        ConnectError(String),
    }

    /// Transport that returns scripted responses in order and records the
    /// requests it was asked to open.
    #[derive(Clone, Default)]
    pub(crate) struct MockTransport {
        responses: Arc<Mutex<Vec<Scripted>>>,
        opened: Arc<Mutex<Vec<String>>>,
    }

    impl MockTransport {
        pub(crate) fn push(&self, scripted: Scripted) {
            self.responses.lock().unwrap().push(scripted);
        }

        pub(crate) fn lines(&self, lines: &[&str]) {
            let body = lines.iter().map(|line| Ok(Bytes::from(format!("{line}\n")))).collect();
            self.push(Scripted::Body(body));
        }

        /// Body whose chunks are sent by the test while the session runs.
        pub(crate) fn live(&self) -> mpsc::UnboundedSender<Result<Bytes, TransportError>> {
            let (tx, rx) = mpsc::unbounded_channel();
            self.push(Scripted::Live(rx));
            tx
        }

        pub(crate) fn opened(&self) -> Vec<String> {
            self.opened.lock().unwrap().clone()
        }
    }

    impl SummaryTransport for MockTransport {
        async fn open(
            &self,
            bookmark_id: &str,
            _request: &SummaryRequest,
        ) -> Result<SummaryResponse, TransportError> {
            self.opened.lock().unwrap().push(bookmark_id.to_string());
            let scripted = {
                let mut responses = self.responses.lock().unwrap();
                if responses.is_empty() {
                    Scripted::Body(Vec::new())
                } else {
                    responses.remove(0)
                }
            };
            match scripted {
                Scripted::Body(chunks) => Ok(SummaryResponse {
                    status: 200,
                    body: Some(Box::pin(futures_util::stream::iter(chunks))),
                }),
                Scripted::Live(rx) => {
                    let body = futures_util::stream::unfold(rx, |mut rx| async move {
                        rx.recv().await.map(|item| (item, rx))
                    });
                    Ok(SummaryResponse { status: 200, body: Some(Box::pin(body)) })
                }
                Scripted::Status(status) => Ok(SummaryResponse {
                    status,
                    body: Some(Box::pin(futures_util::stream::empty())),
                }),
                Scripted::NoBody => Ok(SummaryResponse { status: 200, body: None }),
                Scripted::ConnectError(message) => Err(TransportError(message)),
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Chunk(String),
        Complete,
        Error(StreamError),
        EventError(StreamError),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
        recover: bool,
    }

    impl Recorder {
        fn recovering() -> Self {
            Self { calls: Vec::new(), recover: true }
        }
    }

    impl SummaryEvents for Recorder {
        fn on_chunk(&mut self, chunk: &str) {
            self.calls.push(Call::Chunk(chunk.to_string()));
        }

        fn on_complete(&mut self) {
            self.calls.push(Call::Complete);
        }

        fn on_error(&mut self, error: StreamError) {
            self.calls.push(Call::Error(error));
        }

        fn on_event_error(&mut self, error: StreamError) -> Result<(), StreamError> {
            if self.recover {
                self.calls.push(Call::EventError(error));
                Ok(())
            } else {
                Err(error)
            }
        }
    }

    async fn run(transport: &MockTransport, recorder: &mut Recorder) -> StreamOutcome {
        let cancel = CancellationToken::new();
        stream_summary(transport, "b1", &SummaryRequest::default(), &cancel, recorder).await
    }

    #[tokio::test]
    async fn chunks_then_done() {
        let transport = MockTransport::default();
        transport.lines(&[r#"{"chunk":"Hello"}"#, r#"{"chunk":", world"}"#, r#"{"done":true}"#]);

        let mut recorder = Recorder::default();
        assert_eq!(run(&transport, &mut recorder).await, StreamOutcome::Completed);
        assert_eq!(
            recorder.calls,
            vec![Call::Chunk("Hello".into()), Call::Chunk(", world".into()), Call::Complete]
        );
        assert_eq!(transport.opened(), vec!["b1"]);
    }

    #[tokio::test]
    async fn stream_end_without_done_completes_once() {
        let transport = MockTransport::default();
        transport.lines(&[r#"{"chunk":"a"}"#, r#"{"chunk":"b"}"#]);

        let mut recorder = Recorder::default();
        assert_eq!(run(&transport, &mut recorder).await, StreamOutcome::Completed);
        assert_eq!(
            recorder.calls,
            vec![Call::Chunk("a".into()), Call::Chunk("b".into()), Call::Complete]
        );
    }

    #[tokio::test]
    async fn error_event_halts_stream() {
        let transport = MockTransport::default();
        transport.lines(&[
            r#"{"chunk":"a"}"#,
            r#"{"error":{"code":"X","message":"m"}}"#,
            r#"{"chunk":"b"}"#,
        ]);

        let mut recorder = Recorder::default();
        let outcome = run(&transport, &mut recorder).await;
        assert_eq!(outcome, StreamOutcome::Failed(StreamError::new("X", "m")));
        assert_eq!(
            recorder.calls,
            vec![Call::Chunk("a".into()), Call::Error(StreamError::new("X", "m"))]
        );
    }

    #[tokio::test]
    async fn recoverable_error_event_keeps_reading() {
        let transport = MockTransport::default();
        transport.lines(&[
            r#"{"chunk":"a"}"#,
            r#"{"error":{"code":"X","message":"m"}}"#,
            r#"{"chunk":"b"}"#,
        ]);

        let mut recorder = Recorder::recovering();
        assert_eq!(run(&transport, &mut recorder).await, StreamOutcome::Completed);
        assert_eq!(
            recorder.calls,
            vec![
                Call::Chunk("a".into()),
                Call::EventError(StreamError::new("X", "m")),
                Call::Chunk("b".into()),
                Call::Complete,
            ]
        );
    }

    #[tokio::test]
    async fn unknown_events_are_skipped() {
        let transport = MockTransport::default();
        transport.lines(&[r#"{"progress":0.5}"#, r#"{"chunk":"a"}"#, "42", r#"{"done":true}"#]);

        let mut recorder = Recorder::default();
        run(&transport, &mut recorder).await;
        assert_eq!(recorder.calls, vec![Call::Chunk("a".into()), Call::Complete]);
    }

    #[tokio::test]
    async fn events_after_done_are_ignored() {
        let transport = MockTransport::default();
        transport.lines(&[r#"{"done":true}"#, r#"{"chunk":"late"}"#]);

        let mut recorder = Recorder::default();
        run(&transport, &mut recorder).await;
        assert_eq!(recorder.calls, vec![Call::Complete]);
    }

    #[tokio::test]
    async fn lines_split_across_chunks() {
        let transport = MockTransport::default();
        transport.push(Scripted::Body(vec![
            Ok(Bytes::from_static(b"{\"chu")),
            Ok(Bytes::from_static(b"nk\":\"a\"}\n{\"chunk\"")),
            Ok(Bytes::from_static(b":\"b\"}")),
        ]));

        let mut recorder = Recorder::default();
        run(&transport, &mut recorder).await;
        assert_eq!(
            recorder.calls,
            vec![Call::Chunk("a".into()), Call::Chunk("b".into()), Call::Complete]
        );
    }

    #[tokio::test]
    async fn http_failure_reports_status() {
        let transport = MockTransport::default();
        transport.push(Scripted::Status(404));

        let mut recorder = Recorder::default();
        let outcome = run(&transport, &mut recorder).await;
        let expected = StreamError::new(HTTP_ERROR, "Failed to stream summary (404)");
        assert_eq!(outcome, StreamOutcome::Failed(expected.clone()));
        assert_eq!(recorder.calls, vec![Call::Error(expected)]);
    }

    #[tokio::test]
    async fn network_failure_is_internal() {
        let transport = MockTransport::default();
        transport.push(Scripted::ConnectError("connection refused".into()));

        let mut recorder = Recorder::default();
        run(&transport, &mut recorder).await;
        assert_eq!(
            recorder.calls,
            vec![Call::Error(StreamError::new(INTERNAL, "connection refused"))]
        );
    }

    #[tokio::test]
    async fn missing_body_is_internal() {
        let transport = MockTransport::default();
        transport.push(Scripted::NoBody);

        let mut recorder = Recorder::default();
        run(&transport, &mut recorder).await;
        assert_eq!(
            recorder.calls,
            vec![Call::Error(StreamError::new(INTERNAL, "Missing response body"))]
        );
    }

    #[tokio::test]
    async fn malformed_line_is_internal_and_stops() {
        let transport = MockTransport::default();
        transport.lines(&[r#"{"chunk":"a"}"#, "{oops", r#"{"chunk":"b"}"#]);

        let mut recorder = Recorder::default();
        let outcome = run(&transport, &mut recorder).await;
        assert!(matches!(outcome, StreamOutcome::Failed(ref err) if err.code == INTERNAL));
        assert_eq!(recorder.calls.len(), 2);
        assert_eq!(recorder.calls[0], Call::Chunk("a".into()));
    }

    #[tokio::test]
    async fn read_error_is_internal() {
        let transport = MockTransport::default();
        transport.push(Scripted::Body(vec![
            Ok(Bytes::from_static(b"{\"chunk\":\"a\"}\n")),
            Err(TransportError("connection reset".into())),
        ]));

        let mut recorder = Recorder::default();
        run(&transport, &mut recorder).await;
        assert_eq!(
            recorder.calls,
            vec![
                Call::Chunk("a".into()),
                Call::Error(StreamError::new(INTERNAL, "connection reset")),
            ]
        );
    }

    #[tokio::test]
    async fn cancelled_mid_stream_fires_no_callbacks() {
        let transport = MockTransport::default();
        let body = transport.live();
        let cancel = CancellationToken::new();
        let recorder = Arc::new(Mutex::new(Recorder::default()));

        let task = {
            let transport = transport.clone();
            let cancel = cancel.clone();
            let recorder = recorder.clone();
            tokio::spawn(async move {
                let mut local = Recorder::default();
                let outcome = stream_summary(
                    &transport,
                    "b1",
                    &SummaryRequest::default(),
                    &cancel,
                    &mut local,
                )
                .await;
                *recorder.lock().unwrap() = local;
                outcome
            })
        };

        body.send(Ok(Bytes::from_static(b"{\"chunk\":\"a\"}\n"))).unwrap();
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;

        cancel.cancel();
        // Would complete and fail the stream if the consumer kept reading.
        body.send(Ok(Bytes::from_static(b"{\"done\":true}\n"))).unwrap();
        drop(body);

        assert_eq!(task.await.unwrap(), StreamOutcome::Aborted);
        let calls = recorder.lock().unwrap().calls.clone();
        assert!(!calls.contains(&Call::Complete));
        assert!(!calls.iter().any(|call| matches!(call, Call::Error(_))));
    }

    #[tokio::test]
    async fn cancelled_before_open_is_silent() {
        let transport = MockTransport::default();
        transport.lines(&[r#"{"done":true}"#]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut recorder = Recorder::default();
        let outcome =
            stream_summary(&transport, "b1", &SummaryRequest::default(), &cancel, &mut recorder)
                .await;
        assert_eq!(outcome, StreamOutcome::Aborted);
        assert!(recorder.calls.is_empty());
        assert!(transport.opened().is_empty());
    }

    #[test]
    fn default_method_is_post() {
        assert_eq!(SummaryRequest::default().method(), Method::POST);
        let get = SummaryRequest { method: Some(Method::GET), ..Default::default() };
        assert_eq!(get.method(), Method::GET);
    }
}
