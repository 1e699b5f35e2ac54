mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, warn};

use kyc_document_eval::services::parse_expected_mapping;
use kyc_document_eval::{
    logger, App, CancellationSource, Config, EvaluateRequest, EvaluationReport, ImageSource,
};

use crate::cli::{ClassifyArgs, Cli, Commands, EvaluateArgs};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // 加载配置
    let mut config = Config::from_env();
    config.verbose_logging |= cli.verbose;

    // 初始化日志
    logger::init(config.verbose_logging);

    if let Err(err) = run(cli, config).await {
        error!("❌ {}", err);
        for cause in err.chain().skip(1) {
            error!("   原因: {}", cause);
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    let app = App::initialize(config)?;

    match cli.command {
        Commands::Classify(args) => classify(&app, args).await,
        Commands::Evaluate(args) => evaluate(&app, args).await,
    }
}

async fn classify(app: &App, args: ClassifyArgs) -> Result<()> {
    let image = ImageSource::read(&args.image).await?;
    let result = app.classify(&image, args.rotation).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn evaluate(app: &App, args: EvaluateArgs) -> Result<()> {
    // Ctrl-C 触发协作式取消
    let source = CancellationSource::new();
    let cancel = source.token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("收到中断信号，正在取消评估...");
            source.cancel();
        }
    });

    let report = match (args.case, args.image, args.expected) {
        (Some(case_path), _, _) => app.evaluate_case_file(&case_path, &cancel).await?,
        (None, Some(image_path), Some(expected)) => {
            let expected = parse_expected_mapping(&expected)?;
            let image = ImageSource::read(&image_path).await?;
            app.evaluate(
                EvaluateRequest {
                    case_name: None,
                    image,
                    rotation: args.rotation,
                    expected,
                    document: args.document.into(),
                    iterations: args.iterations,
                },
                &cancel,
            )
            .await?
        }
        _ => anyhow::bail!("需要 --case，或同时提供 --image 和 --expected"),
    };

    print_report(&report, args.report.as_deref()).await
}

async fn print_report(report: &EvaluationReport, path: Option<&std::path::Path>) -> Result<()> {
    let json = report.to_json_pretty()?;
    println!("{}", json);

    if let Some(path) = path {
        tokio::fs::write(path, &json)
            .await
            .with_context(|| format!("无法写入报告: {}", path.display()))?;
    }
    Ok(())
}
