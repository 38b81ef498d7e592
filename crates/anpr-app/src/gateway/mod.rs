//! Engine gateway
//!
//! Mediates every configuration and recognition call to the engine. Until
//! `initialize` succeeds, calls are queued; the successful `initialize` flips
//! the gateway to [`EngineState::Ready`] and replays the queue in submission
//! order before releasing the lock, so later calls can never overtake it.
//!
//! All calls, queued or not, go through one mutex. Ready-state recognitions
//! therefore run one at a time on the calling thread.

mod command;
mod handle;

pub use handle::RecognitionHandle;

use anpr_domain::{dispatch, AlprEngine, DetectionMask, InitParams, RecognitionRequest, RecognizeArg};
use anpr_types::{Error, Result};
use command::{Operation, QueuedCommand};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Readiness of the engine behind a gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Ready,
}

struct GatewayInner<E> {
    engine: E,
    state: EngineState,
    queue: VecDeque<QueuedCommand>,
    next_ordinal: u64,
}

impl<E: AlprEngine> GatewayInner<E> {
    fn submit(&mut self, operation: Operation) {
        let command = QueuedCommand {
            ordinal: self.take_ordinal(),
            operation,
        };

        match self.state {
            EngineState::Ready => command.execute(&mut self.engine),
            EngineState::Uninitialized => {
                tracing::debug!(ordinal = command.ordinal, "engine not ready, command queued");
                self.queue.push_back(command);
            }
        }
    }

    fn take_ordinal(&mut self) -> u64 {
        let ordinal = self.next_ordinal;
        self.next_ordinal += 1;
        ordinal
    }
}

/// Queue-then-replay front for an [`AlprEngine`]
pub struct EngineGateway<E: AlprEngine> {
    inner: Mutex<GatewayInner<E>>,
}

impl<E: AlprEngine> EngineGateway<E> {
    pub fn new(engine: E) -> Self {
        Self {
            inner: Mutex::new(GatewayInner {
                engine,
                state: EngineState::Uninitialized,
                queue: VecDeque::new(),
                next_ordinal: 0,
            }),
        }
    }

    pub fn state(&self) -> EngineState {
        self.inner.lock().state
    }

    pub fn is_ready(&self) -> bool {
        self.state() == EngineState::Ready
    }

    /// Number of calls waiting for initialization
    pub fn pending_commands(&self) -> usize {
        self.inner.lock().queue.len()
    }

    /// Initialize the engine and replay every queued call in order.
    ///
    /// Calling this on a ready gateway is a no-op. A failed attempt leaves
    /// the gateway uninitialized with its queue intact, so it may be retried.
    pub fn initialize(&self, params: InitParams) -> Result<()> {
        let mut inner = self.inner.lock();

        if inner.state == EngineState::Ready {
            tracing::info!(country = %params.country, "engine already initialized, ignoring");
            return Ok(());
        }

        tracing::info!(
            country = %params.country,
            top_n = ?params.effective_top_n(),
            region = ?params.effective_region(),
            "initializing engine"
        );

        if let Err(e) = inner.engine.initialize(&params) {
            tracing::error!(error = %e, pending = inner.queue.len(), "engine initialization failed");
            return Err(match e {
                Error::InitializationFailed(_) => e,
                other => Error::InitializationFailed(other.to_string()),
            });
        }

        inner.state = EngineState::Ready;

        let inner = &mut *inner;
        let drained = inner.queue.len();
        while let Some(command) = inner.queue.pop_front() {
            command.execute(&mut inner.engine);
        }

        tracing::info!(replayed = drained, "engine ready");
        Ok(())
    }

    pub fn set_country(&self, country: impl Into<String>) {
        self.inner.lock().submit(Operation::SetCountry(country.into()));
    }

    pub fn set_top_n(&self, top_n: u32) {
        self.inner.lock().submit(Operation::SetTopN(top_n));
    }

    pub fn set_default_region(&self, region: impl Into<String>) {
        self.inner.lock().submit(Operation::SetDefaultRegion(region.into()));
    }

    pub fn set_detect_region(&self, enabled: bool) {
        self.inner.lock().submit(Operation::SetDetectRegion(enabled));
    }

    pub fn set_prewarp(&self, prewarp: impl Into<String>) {
        self.inner.lock().submit(Operation::SetPrewarp(prewarp.into()));
    }

    /// Set the detection mask from a raw buffer. Size mismatches are
    /// rejected here and never queued.
    pub fn set_mask(&self, pixels: Vec<u8>, bytes_per_pixel: u32, width: u32, height: u32) -> Result<()> {
        let mask = DetectionMask::new(pixels, bytes_per_pixel, width, height)?;
        self.set_detection_mask(mask);
        Ok(())
    }

    pub fn set_detection_mask(&self, mask: DetectionMask) {
        self.inner.lock().submit(Operation::SetMask(mask));
    }

    /// Submit a recognition. Runs now when ready, otherwise when the gate opens.
    pub fn recognize(&self, request: RecognitionRequest) -> RecognitionHandle {
        let mut inner = self.inner.lock();
        let (slot, handle) = RecognitionHandle::channel(inner.next_ordinal);
        inner.submit(Operation::Recognize { request, slot });
        handle
    }

    /// Overloaded entry point: classify host arguments, then submit.
    ///
    /// Unrecognized argument shapes fail immediately and are never queued.
    pub fn recognize_args(&self, args: Vec<RecognizeArg>) -> Result<RecognitionHandle> {
        let request = dispatch(args)?;
        Ok(self.recognize(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anpr_types::Rect;
    use std::sync::Arc;

    type Log = Arc<Mutex<Vec<String>>>;

    /// Engine that records every call and echoes a counter in `frame_number`.
    /// Raw-pixel requests fail; empty byte buffers produce a non-JSON payload.
    struct RecordingEngine {
        log: Log,
        failures_left: usize,
        init_calls: usize,
        recognitions: i64,
    }

    impl RecordingEngine {
        fn new(log: Log) -> Self {
            Self {
                log,
                failures_left: 0,
                init_calls: 0,
                recognitions: 0,
            }
        }

        fn failing(log: Log, failures: usize) -> Self {
            Self {
                failures_left: failures,
                ..Self::new(log)
            }
        }

        fn record(&self, entry: String) {
            self.log.lock().push(entry);
        }
    }

    impl AlprEngine for RecordingEngine {
        fn initialize(&mut self, params: &InitParams) -> Result<()> {
            self.init_calls += 1;
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(Error::InitializationFailed("runtime data missing".to_string()));
            }
            self.record(format!("init:{}", params.country));
            Ok(())
        }

        fn set_country(&mut self, country: &str) {
            self.record(format!("country:{}", country));
        }

        fn set_top_n(&mut self, top_n: u32) {
            self.record(format!("topn:{}", top_n));
        }

        fn set_default_region(&mut self, region: &str) {
            self.record(format!("region:{}", region));
        }

        fn set_detect_region(&mut self, enabled: bool) {
            self.record(format!("detect:{}", enabled));
        }

        fn set_prewarp(&mut self, prewarp: &str) {
            self.record(format!("prewarp:{}", prewarp));
        }

        fn set_mask(&mut self, mask: &DetectionMask) {
            self.record(format!("mask:{}x{}", mask.width(), mask.height()));
        }

        fn recognize(&mut self, request: &RecognitionRequest) -> Result<String> {
            self.recognitions += 1;
            self.record(format!("recognize:{}", request.kind()));
            match request {
                RecognitionRequest::ByRawPixels { .. } => {
                    return Err(Error::RecognitionFailed("frame rejected".to_string()))
                }
                RecognitionRequest::ByImageBytes(bytes) if bytes.is_empty() => {
                    return Ok("engine crashed".to_string())
                }
                _ => {}
            }
            Ok(format!(
                r#"{{"epoch_time":0,"frame_number":{},"img_width":1,"img_height":1,
                    "total_processing_time_ms":0.0,"plates":[],"regionsOfInterest":[]}}"#,
                self.recognitions
            ))
        }
    }

    fn log_of(log: &Log) -> Vec<String> {
        log.lock().clone()
    }

    #[test]
    fn test_calls_before_init_are_queued_then_replayed_in_order() {
        let log = Log::default();
        let gateway = EngineGateway::new(RecordingEngine::new(log.clone()));

        gateway.set_top_n(5);
        gateway.set_country("eu");
        gateway.set_default_region("de");
        gateway.set_detect_region(true);
        gateway.set_prewarp("planar,1,2");
        gateway.set_mask(vec![0; 4], 1, 2, 2).unwrap();
        let mut early = gateway.recognize(RecognitionRequest::from_path("plate.jpg"));

        assert_eq!(gateway.state(), EngineState::Uninitialized);
        assert_eq!(gateway.pending_commands(), 7);
        assert!(log_of(&log).is_empty());
        assert!(early.try_result().is_none());

        gateway.initialize(InitParams::new("us")).unwrap();
        gateway.set_top_n(1);

        assert!(gateway.is_ready());
        assert_eq!(gateway.pending_commands(), 0);
        assert_eq!(
            log_of(&log),
            vec![
                "init:us",
                "topn:5",
                "country:eu",
                "region:de",
                "detect:true",
                "prewarp:planar,1,2",
                "mask:2x2",
                "recognize:file",
                "topn:1",
            ]
        );
        assert_eq!(early.try_result().unwrap().unwrap().frame_number, 1);
    }

    #[test]
    fn test_pre_init_recognition_resolves_before_post_init_one() {
        let log = Log::default();
        let gateway = EngineGateway::new(RecordingEngine::new(log));

        let early = gateway.recognize(RecognitionRequest::ByImageBytes(vec![1, 2]));
        gateway.initialize(InitParams::new("us")).unwrap();
        let late = gateway
            .recognize_args(vec![vec![3u8].into(), vec![Rect::new(0, 0, 1, 1)].into()])
            .unwrap();

        assert!(early.ordinal() < late.ordinal());
        let early = early.wait().unwrap();
        let late = late.wait().unwrap();
        assert!(early.frame_number < late.frame_number);
    }

    #[test]
    fn test_failed_init_keeps_queue_for_retry() {
        let log = Log::default();
        let gateway = EngineGateway::new(RecordingEngine::failing(log.clone(), 1));

        gateway.set_country("eu");
        let mut handle = gateway.recognize(RecognitionRequest::from_path("a.jpg"));

        let err = gateway.initialize(InitParams::new("us")).unwrap_err();
        assert!(matches!(err, Error::InitializationFailed(_)));
        assert_eq!(gateway.state(), EngineState::Uninitialized);
        assert_eq!(gateway.pending_commands(), 2);
        assert!(handle.try_result().is_none());

        gateway.initialize(InitParams::new("us")).unwrap();
        assert_eq!(log_of(&log), vec!["init:us", "country:eu", "recognize:file"]);
        assert!(handle.try_result().unwrap().is_ok());
    }

    #[test]
    fn test_drain_continues_after_failed_recognition() {
        let log = Log::default();
        let gateway = EngineGateway::new(RecordingEngine::new(log.clone()));

        let rejected = gateway.recognize(RecognitionRequest::ByRawPixels {
            pixels: vec![0; 4],
            width: 2,
            height: 2,
            regions: Vec::new(),
        });
        let garbled = gateway.recognize(RecognitionRequest::ByImageBytes(Vec::new()));
        gateway.set_country("eu");
        let good = gateway.recognize(RecognitionRequest::from_path("a.jpg"));

        gateway.initialize(InitParams::new("us")).unwrap();

        assert_eq!(
            log_of(&log),
            vec![
                "init:us",
                "recognize:raw-pixels",
                "recognize:bytes",
                "country:eu",
                "recognize:file",
            ]
        );
        assert!(matches!(rejected.wait(), Err(Error::RecognitionFailed(_))));
        assert!(matches!(garbled.wait(), Err(Error::Json(_))));
        assert_eq!(good.wait().unwrap().frame_number, 3);
    }

    #[test]
    fn test_second_initialize_is_noop() {
        let log = Log::default();
        let gateway = EngineGateway::new(RecordingEngine::new(log.clone()));

        gateway.initialize(InitParams::new("us")).unwrap();
        gateway.initialize(InitParams::new("eu")).unwrap();

        assert!(gateway.is_ready());
        assert_eq!(log_of(&log), vec!["init:us"]);
        assert_eq!(gateway.inner.lock().engine.init_calls, 1);
    }

    #[test]
    fn test_invalid_arguments_are_never_queued() {
        let gateway = EngineGateway::new(RecordingEngine::new(Log::default()));

        let err = gateway
            .recognize_args(vec![vec![1u8].into(), "oops".into()])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(gateway.set_mask(vec![0; 3], 1, 2, 2).is_err());
        assert_eq!(gateway.pending_commands(), 0);
    }

    #[test]
    fn test_dropping_gateway_resolves_queued_handles() {
        let gateway = EngineGateway::new(RecordingEngine::new(Log::default()));
        let handle = gateway.recognize(RecognitionRequest::from_path("a.jpg"));
        drop(gateway);
        assert!(matches!(handle.wait(), Err(Error::HandleDropped)));
    }

    #[test]
    fn test_concurrent_submitters_and_initializer() {
        let log = Log::default();
        let gateway = Arc::new(EngineGateway::new(RecordingEngine::new(log.clone())));
        let per_thread = 50u32;

        std::thread::scope(|scope| {
            for worker in 0..4u32 {
                let gateway = Arc::clone(&gateway);
                scope.spawn(move || {
                    for i in 0..per_thread {
                        gateway.set_top_n(worker * 1000 + i);
                    }
                });
            }
            let gateway = Arc::clone(&gateway);
            scope.spawn(move || {
                gateway.initialize(InitParams::new("us")).unwrap();
            });
        });

        let entries = log_of(&log);
        assert_eq!(entries.len(), 1 + 4 * per_thread as usize);
        assert_eq!(gateway.pending_commands(), 0);

        for worker in 0..4u32 {
            let seen: Vec<u32> = entries
                .iter()
                .filter_map(|e| e.strip_prefix("topn:"))
                .filter_map(|n| n.parse::<u32>().ok())
                .filter(|n| n / 1000 == worker)
                .collect();
            let expected: Vec<u32> = (0..per_thread).map(|i| worker * 1000 + i).collect();
            assert_eq!(seen, expected);
        }
    }

    #[tokio::test]
    async fn test_handle_can_be_awaited() {
        let gateway = Arc::new(EngineGateway::new(RecordingEngine::new(Log::default())));
        let handle = gateway.recognize(RecognitionRequest::from_path("a.jpg"));

        let initializer = Arc::clone(&gateway);
        tokio::task::spawn_blocking(move || initializer.initialize(InitParams::new("us")))
            .await
            .unwrap()
            .unwrap();

        let result = handle.await.unwrap();
        assert_eq!(result.frame_number, 1);
    }
}
