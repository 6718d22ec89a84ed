use chrono::Local;
use directories::ProjectDirs;
use fern::Dispatch;
use log::LevelFilter;
use std::fs;
use std::path::PathBuf;

use crate::app_settings::LogSettings;

fn get_log_file_path() -> Result<PathBuf, String> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "LrcExtended", "LrcExtended") {
        let log_dir = proj_dirs.data_local_dir();
        if !log_dir.exists() {
            fs::create_dir_all(log_dir)
                .map_err(|e| format!("无法创建日志目录 {log_dir:?}: {e}"))?;
        }
        Ok(log_dir.join("lrc_extended.log"))
    } else {
        Err("无法获取项目日志目录".to_string())
    }
}

/// 统一的日志行格式：`[时间][级别] 消息`
fn base_dispatch(level: LevelFilter) -> Dispatch {
    Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                message
            ))
        })
        .level(level)
}

/// 初始化全局日志记录器：标准错误输出，加上可选的日志文件。
///
/// 初始化失败只在标准错误上报告，不会中断程序。
pub fn init_global_logger(settings: &LogSettings) {
    let console = base_dispatch(settings.console_log_level).chain(std::io::stderr());
    let mut root = Dispatch::new().chain(console);

    if settings.enable_file_log {
        match get_log_file_path() {
            Ok(log_file_path) => match fern::log_file(&log_file_path) {
                Ok(log_file) => {
                    root = root.chain(base_dispatch(settings.file_log_level).chain(log_file));
                }
                Err(e) => {
                    eprintln!("无法打开日志文件 {log_file_path:?}: {e}。文件日志将被禁用。");
                }
            },
            Err(e) => eprintln!("获取日志文件路径失败: {e}。文件日志将被禁用。"),
        }
    }

    if let Err(e) = root.apply() {
        eprintln!("日志记录器初始化失败: {e}");
    } else {
        log::debug!("日志记录器已初始化。");
    }
}
