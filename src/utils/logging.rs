// 日志工具模块
//
// 封装 flexi_logger 的初始化和关闭操作，确保异步日志正确 flush

use crate::config::LogConfig;
use flexi_logger::{
    Cleanup, Criterion, FileSpec, LogSpecification, Logger, LoggerHandle, Naming, WriteMode,
};
use std::sync::Mutex;

/// 已安装的日志器；关闭后句柄仍保留，flexi_logger 的全局日志器只能安装一次
struct LoggerState {
    handle: LoggerHandle,
    active: bool,
}

/// 全局日志状态，用于程序退出时 flush
static LOGGER: Mutex<Option<LoggerState>> = Mutex::new(None);

/// 初始化日志系统
///
/// 已初始化时直接返回。`shutdown` 之后再次调用只恢复日志级别，
/// 输出文件沿用第一次初始化时的配置
///
/// # Examples
/// ```no_run
/// use fedquery::config::Config;
/// use fedquery::utils::logging;
///
/// let config = Config::default();
/// logging::init(&config.log).expect("日志初始化失败");
/// ```
pub fn init(config: &LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut guard = LOGGER.lock().map_err(|e| e.to_string())?;

    if let Some(state) = guard.as_mut() {
        if !state.active {
            state.handle.set_new_spec(LogSpecification::parse(&config.level)?);
            state.active = true;
            log::info!("日志系统已恢复, 级别: {}", config.level);
        }
        return Ok(());
    }

    let handle = Logger::try_with_str(&config.level)?
        .log_to_file(
            FileSpec::default()
                .basename(&config.file)
                .directory(&config.dir),
        )
        .rotate(
            Criterion::Size(config.max_file_size),
            Naming::Numbers,
            Cleanup::KeepLogFiles(config.max_files),
        )
        .write_mode(WriteMode::Async)
        .append()
        .start()?;
    *guard = Some(LoggerState {
        handle,
        active: true,
    });

    log::info!("日志系统初始化完成: {}/{}", config.dir, config.file);
    Ok(())
}

/// 刷新并关闭日志输出
///
/// 阻塞直到异步日志线程写完当前内容，之后不再输出日志
pub fn shutdown() {
    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(state) = guard.as_mut().filter(|state| state.active) {
            state.handle.flush();
            state.handle.set_new_spec(LogSpecification::off());
            state.active = false;
        }
    }
}

/// 检查日志系统是否处于开启状态
pub fn is_initialized() -> bool {
    LOGGER
        .lock()
        .map(|guard| guard.as_ref().map_or(false, |state| state.active))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_logging_reinit_after_shutdown() {
        let dir = tempfile::tempdir().expect("Failed to create temporary dir");
        let config = LogConfig {
            level: "debug".to_string(),
            dir: dir.path().to_string_lossy().into_owned(),
            ..LogConfig::default()
        };

        let result = init(&config);
        assert!(result.is_ok(), "日志初始化失败: {:?}", result.err());
        assert!(is_initialized());

        log::debug!("测试日志消息");

        shutdown();
        assert!(!is_initialized());

        let result = init(&config);
        assert!(result.is_ok(), "关闭后重新初始化失败: {:?}", result.err());
        assert!(is_initialized());
        log::debug!("重新初始化后的日志消息");

        shutdown();
        assert!(!is_initialized());
    }
}
