#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use kyc_document_eval::infrastructure::ModelError;
use kyc_document_eval::services::{ExtractionService, RetryPolicy};
use kyc_document_eval::{CancellationSource, Config, FieldMapping, VisionModel, VisionRequest};

/// 按脚本依次返回结果的模型桩；脚本耗尽后重复 `fallback`
pub struct ScriptedModel {
    responses: Mutex<VecDeque<Result<String, String>>>,
    fallback: Option<String>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Option<Duration>,
    cancel_on_call: Option<(usize, Arc<CancellationSource>)>,
    requests: Mutex<Vec<VisionRequest>>,
}

impl ScriptedModel {
    pub fn new(responses: Vec<Result<&str, &str>>) -> Self {
        Self {
            responses: Mutex::new(
                responses
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            fallback: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            delay: None,
            cancel_on_call: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn always(response: &str) -> Self {
        let mut model = Self::new(Vec::new());
        model.fallback = Some(response.to_string());
        model
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// 第 `call` 次调用时触发取消
    pub fn cancel_on_call(mut self, call: usize, source: Arc<CancellationSource>) -> Self {
        self.cancel_on_call = Some((call, source));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<VisionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisionModel for ScriptedModel {
    fn model_name(&self) -> &str {
        "scripted-vision"
    }

    async fn complete(&self, request: &VisionRequest) -> Result<String, ModelError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(request.clone());

        if let Some((at, source)) = &self.cancel_on_call {
            if *at == call {
                source.cancel();
            }
        }

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(e)) => Err(ModelError::Other(e)),
            None => match &self.fallback {
                Some(text) => Ok(text.clone()),
                None => Err(ModelError::Other("脚本已耗尽".to_string())),
            },
        }
    }
}

pub fn test_config() -> Config {
    Config {
        api_key: "test-key".to_string(),
        max_attempts: 5,
        retry_delay_ms: 0,
        request_timeout_secs: 5,
        ..Config::default()
    }
}

pub fn extraction_service(model: Arc<ScriptedModel>, config: &Config) -> ExtractionService {
    ExtractionService::new(model, RetryPolicy::from_config(config))
}

pub fn mapping(pairs: &[(&str, &str)]) -> FieldMapping {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// 4x2 纯色 PNG
pub fn sample_png() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(4, 2, image::Rgb([10, 20, 30]));
    let mut buffer = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, image::ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}
