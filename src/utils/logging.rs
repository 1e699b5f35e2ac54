/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use tracing::info;

use crate::services::PerformanceSummary;

/// 记录评估启动信息
///
/// # 参数
/// - `model_name`: 模型名称
/// - `iterations`: 迭代次数
/// - `concurrency`: 最大并发数
pub fn log_evaluation_start(model_name: &str, iterations: usize, concurrency: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 评估模式启动");
    info!("🤖 模型: {}", model_name);
    info!("🔁 迭代次数: {}", iterations);
    if concurrency > 1 {
        info!("📊 最大并发数: {}", concurrency);
    }
    info!("{}", "=".repeat(60));
}

/// 记录单次迭代结果
pub fn log_iteration(iteration: usize, total: usize, match_percentage: f64) {
    let marker = if match_percentage == 100.0 { "✅" } else { "➖" };
    info!(
        "{} 第 {}/{} 次迭代: 匹配率 {:.1}%",
        marker, iteration, total, match_percentage
    );
}

/// 打印最终统计信息
pub fn log_summary(summary: &PerformanceSummary) {
    info!("\n{}", "=".repeat(60));
    info!("📊 评估完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("🔁 总迭代: {}", summary.total_iterations);
    info!(
        "✅ 完全匹配: {} ({:.1}%)",
        summary.exact_matches, summary.exact_match_rate
    );
    info!("➖ 部分匹配: {}", summary.partial_match_count);
    info!(
        "📈 平均匹配率: {:.1}% (标准差 {:.1})",
        summary.average_match_percentage, summary.match_percentage_std_dev
    );
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
