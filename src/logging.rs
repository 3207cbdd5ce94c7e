// ==========================================
// 元器件库存系统 - 日志初始化
// ==========================================
// tracing-subscriber fmt 输出到 stderr（stdout 留给 CLI 的 JSON 结果）
// RUST_LOG 控制级别，COMPONENT_STOCK_LOG_FORMAT=json 切换为 JSON 行
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 日志格式环境变量
pub const LOG_FORMAT_ENV: &str = "COMPONENT_STOCK_LOG_FORMAT";

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// 解析环境变量值；未设置或无法识别时为 Text
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: info），如 RUST_LOG=component_stock=debug
/// - COMPONENT_STOCK_LOG_FORMAT: text（默认）/ json
///
/// # 示例
/// ```no_run
/// use component_stock::logging;
/// logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let format = LogFormat::from_env_value(std::env::var(LOG_FORMAT_ENV).ok().as_deref());

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };

    // 宿主进程已安装全局 subscriber 时沿用宿主的
    if let Err(err) = result {
        tracing::warn!("日志系统已初始化，跳过: {}", err);
    }
}

/// 初始化测试环境的日志系统
///
/// 同一测试进程内会被多次调用，只有第一次生效
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_env_value() {
        assert_eq!(LogFormat::from_env_value(None), LogFormat::Text);
        assert_eq!(LogFormat::from_env_value(Some(" JSON ")), LogFormat::Json);
        assert_eq!(LogFormat::from_env_value(Some("pretty")), LogFormat::Text);
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_test();
        init();
    }
}
