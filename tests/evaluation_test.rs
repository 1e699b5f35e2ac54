mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{extraction_service, mapping, sample_png, test_config, ScriptedModel};
use kyc_document_eval::models::ImageExtension;
use kyc_document_eval::orchestrator::{EvaluationJob, EvaluationRun, RunState};
use kyc_document_eval::{
    AppError, CancellationSource, ConfigError, DocumentType, EncodedImage, EvaluationDriver,
};

const EXACT: &str = r#"{"LN": "BENJAMIN", "FN": "FRANKLIN"}"#;
const PARTIAL: &str = r#"{"LN": "benjamin", "FN": "WRONG"}"#;

fn job(iterations: usize) -> EvaluationJob {
    EvaluationJob::new(
        mapping(&[("LN", "BENJAMIN"), ("FN", "FRANKLIN")]),
        EncodedImage::encode(&sample_png(), ImageExtension::Png),
        DocumentType::Passport,
        iterations,
    )
}

#[tokio::test]
async fn test_five_iterations_with_two_exact_matches() {
    let config = test_config();
    let model = Arc::new(ScriptedModel::new(vec![
        Ok(EXACT),
        Ok(PARTIAL),
        Ok(EXACT),
        Ok(PARTIAL),
        Ok(PARTIAL),
    ]));
    let driver = EvaluationDriver::new(extraction_service(model.clone(), &config), &config);

    let source = CancellationSource::new();
    let report = driver
        .run(job(5).with_case_name("franklin"), &source.token())
        .await
        .unwrap();

    let summary = &report.summary;
    assert_eq!(summary.total_iterations, 5);
    assert_eq!(summary.exact_matches, 2);
    assert_eq!(summary.partial_match_count, 3);
    assert!((summary.exact_match_rate - 40.0).abs() < 1e-9);
    assert!((summary.average_match_percentage - 70.0).abs() < 1e-9);
    assert!((summary.match_percentage_std_dev - 24.494_897).abs() < 1e-4);

    assert_eq!(model.calls(), 5);
    assert_eq!(report.case_name.as_deref(), Some("franklin"));
    assert_eq!(report.model, "scripted-vision");
    assert_eq!(report.iterations, 5);
}

#[tokio::test]
async fn test_prompt_and_image_sent_on_every_iteration() {
    let config = test_config();
    let model = Arc::new(ScriptedModel::always(EXACT));
    let driver = EvaluationDriver::new(extraction_service(model.clone(), &config), &config);
    let job = job(3);
    let expected_url = job.image.data_url();
    let expected_user = job.prompt.user.clone();

    driver
        .run(job, &CancellationSource::new().token())
        .await
        .unwrap();

    let requests = model.requests();
    assert_eq!(requests.len(), 3);
    for request in requests {
        assert_eq!(request.image_data_url, expected_url);
        assert_eq!(request.user_prompt, expected_user);
    }
}

#[tokio::test]
async fn test_hard_failure_aborts_without_summary() {
    let config = test_config();
    // 第 3 次迭代连续失败 max_attempts 次
    let mut script = vec![Ok(EXACT), Ok(PARTIAL)];
    script.extend(std::iter::repeat(Err("服务不可用")).take(config.max_attempts));
    script.push(Ok(EXACT));
    let model = Arc::new(ScriptedModel::new(script));
    let driver = EvaluationDriver::new(extraction_service(model.clone(), &config), &config);

    let mut run = EvaluationRun::new(job(5));
    let err = driver
        .drive(&mut run, &CancellationSource::new().token())
        .await
        .unwrap_err();

    match err {
        AppError::Aborted {
            iteration,
            completed,
            source,
        } => {
            assert_eq!(iteration, 3);
            assert_eq!(completed, 2);
            assert_eq!(source.attempts, config.max_attempts);
        }
        other => panic!("期望 Aborted，实际: {:?}", other),
    }

    assert_eq!(run.state(), RunState::Aborted { iteration: 3 });
    assert!(run.state().is_terminal());
    assert_eq!(run.tracker().state().total_iterations(), 2);
    assert_eq!(run.tracker().state().exact_matches(), 1);
    assert_eq!(model.calls(), 2 + config.max_attempts);
}

#[tokio::test]
async fn test_transient_failures_are_retried_within_iteration() {
    let config = test_config();
    let model = Arc::new(ScriptedModel::new(vec![
        Err("超时"),
        Ok("not json at all"),
        Ok(EXACT),
        Ok(EXACT),
    ]));
    let driver = EvaluationDriver::new(extraction_service(model.clone(), &config), &config);

    let report = driver
        .run(job(2), &CancellationSource::new().token())
        .await
        .unwrap();

    assert_eq!(report.summary.exact_matches, 2);
    assert_eq!(model.calls(), 4);
}

#[tokio::test]
async fn test_iteration_count_is_validated_before_any_call() {
    let config = test_config();
    let model = Arc::new(ScriptedModel::always(EXACT));
    let driver = EvaluationDriver::new(extraction_service(model.clone(), &config), &config);
    let token = CancellationSource::new().token();

    for iterations in [0, config.max_iterations + 1] {
        let err = driver.run(job(iterations), &token).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Config(ConfigError::InvalidIterationCount { .. })
        ));
    }
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_run_can_only_be_driven_once() {
    let config = test_config();
    let model = Arc::new(ScriptedModel::always(EXACT));
    let driver = EvaluationDriver::new(extraction_service(model.clone(), &config), &config);
    let token = CancellationSource::new().token();

    let mut run = EvaluationRun::new(job(1));
    driver.drive(&mut run, &token).await.unwrap();
    assert_eq!(run.state(), RunState::Completed);

    let err = driver.drive(&mut run, &token).await.unwrap_err();
    assert!(matches!(err, AppError::Config(ConfigError::InvalidSetting { .. })));
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let config = test_config();
    let model = Arc::new(ScriptedModel::always(EXACT));
    let driver = EvaluationDriver::new(extraction_service(model.clone(), &config), &config);

    let source = CancellationSource::new();
    source.cancel();
    let mut run = EvaluationRun::new(job(5));
    let err = driver.drive(&mut run, &source.token()).await.unwrap_err();

    assert!(matches!(err, AppError::Cancelled { completed: 0 }));
    assert_eq!(run.state(), RunState::Cancelled);
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_cancelled_mid_run_stops_at_iteration_boundary() {
    let config = test_config();
    let source = Arc::new(CancellationSource::new());
    let model = Arc::new(ScriptedModel::always(EXACT).cancel_on_call(2, Arc::clone(&source)));
    let driver = EvaluationDriver::new(extraction_service(model.clone(), &config), &config);

    let mut run = EvaluationRun::new(job(5));
    let err = driver.drive(&mut run, &source.token()).await.unwrap_err();

    assert!(matches!(err, AppError::Cancelled { completed: 2 }));
    assert_eq!(run.tracker().state().total_iterations(), 2);
    assert_eq!(model.calls(), 2);
}

#[tokio::test]
async fn test_cancel_interrupts_in_flight_call() {
    let config = test_config();
    let source = Arc::new(CancellationSource::new());
    let model = Arc::new(
        ScriptedModel::always(EXACT)
            .with_delay(Duration::from_secs(5))
            .cancel_on_call(1, Arc::clone(&source)),
    );
    let driver = EvaluationDriver::new(extraction_service(model.clone(), &config), &config);

    let mut run = EvaluationRun::new(job(3));
    let started = std::time::Instant::now();
    let err = tokio::time::timeout(
        Duration::from_secs(2),
        driver.drive(&mut run, &source.token()),
    )
    .await
    .expect("取消应打断进行中的调用")
    .unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(matches!(err, AppError::Cancelled { completed: 0 }));
    assert_eq!(run.state(), RunState::Cancelled);
    assert_eq!(run.tracker().state().total_iterations(), 0);
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn test_abort_under_concurrency_keeps_preceding_results() {
    let config = kyc_document_eval::Config {
        eval_concurrency: 3,
        ..test_config()
    };
    // 前两次调用成功，之后全部失败；失败落在哪次迭代取决于调度，
    // 但追踪器必须恰好保留该迭代之前的结果
    let model = Arc::new(
        ScriptedModel::new(vec![Ok(EXACT), Ok(EXACT)]).with_delay(Duration::from_millis(10)),
    );
    let driver = EvaluationDriver::new(extraction_service(model.clone(), &config), &config);

    let mut run = EvaluationRun::new(job(6));
    let err = driver
        .drive(&mut run, &CancellationSource::new().token())
        .await
        .unwrap_err();

    let AppError::Aborted {
        iteration,
        completed,
        ..
    } = &err
    else {
        panic!("期望 Aborted，实际: {:?}", err);
    };
    let (iteration, completed) = (*iteration, *completed);
    assert!((1..=3).contains(&iteration), "iteration = {}", iteration);
    assert_eq!(completed, iteration - 1);
    assert_eq!(run.state(), RunState::Aborted { iteration });
    assert_eq!(run.tracker().state().total_iterations(), iteration - 1);
    assert!(model.max_in_flight() > 1);
}

#[tokio::test]
async fn test_bounded_concurrency_keeps_every_iteration() {
    let config = kyc_document_eval::Config {
        eval_concurrency: 3,
        ..test_config()
    };
    let model = Arc::new(ScriptedModel::always(EXACT).with_delay(Duration::from_millis(20)));
    let driver = EvaluationDriver::new(extraction_service(model.clone(), &config), &config);

    let report = driver
        .run(job(9), &CancellationSource::new().token())
        .await
        .unwrap();

    assert_eq!(report.summary.total_iterations, 9);
    assert_eq!(report.summary.exact_matches, 9);
    assert!(model.max_in_flight() > 1);
    assert!(model.max_in_flight() <= 3);
}

#[tokio::test]
async fn test_sequential_by_default() {
    let config = test_config();
    let model = Arc::new(ScriptedModel::always(EXACT).with_delay(Duration::from_millis(5)));
    let driver = EvaluationDriver::new(extraction_service(model.clone(), &config), &config);

    driver
        .run(job(4), &CancellationSource::new().token())
        .await
        .unwrap();

    assert_eq!(model.max_in_flight(), 1);
}
