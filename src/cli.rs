use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use kyc_document_eval::DocumentType;

#[derive(Parser, Debug)]
#[command(
    name = "kyc-eval",
    version,
    about = "KYC document classification, field extraction and extraction evaluation"
)]
pub struct Cli {
    /// 输出 debug 级别日志
    #[arg(long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 分类证件并抽取字段
    Classify(ClassifyArgs),
    /// 反复抽取同一张证件并与期望输出比较
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ClassifyArgs {
    #[arg(long)]
    pub image: PathBuf,

    /// 逆时针旋转角度: 0, 90, 180, 270, 360
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub rotation: i64,
}

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// TOML 评估用例文件（与 --image/--expected 互斥）
    #[arg(long, conflicts_with_all = ["image", "expected", "iterations", "rotation", "document"])]
    pub case: Option<PathBuf>,

    #[arg(long, required_unless_present = "case")]
    pub image: Option<PathBuf>,

    /// 期望输出，如 "{'LN': 'BENJAMIN', 'FN': 'FRANKLIN'}"
    #[arg(long, required_unless_present = "case")]
    pub expected: Option<String>,

    #[arg(long, default_value_t = 10)]
    pub iterations: usize,

    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub rotation: i64,

    #[arg(long, value_enum, default_value_t = DocumentArg::Passport)]
    pub document: DocumentArg,

    /// 同时将 JSON 报告写入该文件
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentArg {
    Passport,
    #[value(name = "drivers_licence")]
    DriversLicence,
}

impl From<DocumentArg> for DocumentType {
    fn from(arg: DocumentArg) -> Self {
        match arg {
            DocumentArg::Passport => DocumentType::Passport,
            DocumentArg::DriversLicence => DocumentType::DriversLicence,
        }
    }
}
