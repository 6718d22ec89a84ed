use directories::ProjectDirs;
use ini::{Ini, Properties};
use log::LevelFilter;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::active_span::ResolverOptions;
use crate::timing_reflow::ReflowOptions;

const LOGGING_SECTION: &str = "Logging";
const REFLOW_SECTION: &str = "Reflow";
const RESOLVER_SECTION: &str = "Resolver";

#[derive(Debug, Clone, PartialEq)]
pub struct LogSettings {
    pub enable_file_log: bool,
    pub file_log_level: LevelFilter,
    pub console_log_level: LevelFilter,
}

impl Default for LogSettings {
    fn default() -> Self {
        LogSettings {
            enable_file_log: false, // 默认不写日志文件
            file_log_level: LevelFilter::Info,
            console_log_level: LevelFilter::Warn,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppSettings {
    pub log_settings: LogSettings,
    pub reflow: ReflowOptions,
    pub resolver: ResolverOptions,
}

/// 读取一个非负的秒数，缺失或无效时使用默认值。
fn read_seconds(section: Option<&Properties>, key: &str, default: f64) -> f64 {
    match section.and_then(|s| s.get(key)) {
        Some(raw) => match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => value,
            _ => {
                log::warn!("配置项 {key} 的值 '{raw}' 无效，使用默认值 {default}。");
                default
            }
        },
        None => default,
    }
}

fn read_level(section: Option<&Properties>, key: &str, default: LevelFilter) -> LevelFilter {
    section
        .and_then(|s| s.get(key))
        .and_then(|s| LevelFilter::from_str(s.trim()).ok())
        .unwrap_or(default)
}

impl AppSettings {
    pub fn config_path() -> Option<PathBuf> {
        if let Some(proj_dirs) = ProjectDirs::from("com", "LrcExtended", "LrcExtended") {
            let config_dir = proj_dirs.data_local_dir();
            if !config_dir.exists() {
                if let Err(e) = fs::create_dir_all(config_dir) {
                    log::error!("无法创建配置目录 {config_dir:?}: {e}");
                    return None;
                }
            }
            Some(config_dir.join("lrc_extended.ini"))
        } else {
            log::error!("无法获取项目配置目录路径。");
            None
        }
    }

    /// 从默认位置加载配置。文件不存在时写出一份默认配置；任何失败都退回默认值。
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            log::warn!("无法确定配置文件路径。将使用运行时默认配置。");
            return AppSettings::default();
        };

        if !path.exists() {
            log::info!("配置文件 {path:?} 未找到。将创建并使用默认配置。");
            let default_settings = AppSettings::default();
            if let Err(e) = default_settings.save_to(&path) {
                log::error!("无法保存初始默认配置文件到 {path:?}: {e}");
            }
            return default_settings;
        }

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("加载配置文件 {path:?} 失败: {e}。将使用默认配置。");
                AppSettings::default()
            }
        }
    }

    /// 从指定的 INI 文件加载配置，单个无效的键退回该键的默认值。
    pub fn load_from(path: &Path) -> Result<Self, ini::Error> {
        let conf = Ini::load_from_file(path)?;
        let defaults = AppSettings::default();

        let log_section = conf.section(Some(LOGGING_SECTION));
        let log_settings = LogSettings {
            enable_file_log: log_section
                .and_then(|s| s.get("EnableFileLog"))
                .and_then(|s| s.trim().parse::<bool>().ok())
                .unwrap_or(defaults.log_settings.enable_file_log),
            file_log_level: read_level(
                log_section,
                "FileLogLevel",
                defaults.log_settings.file_log_level,
            ),
            console_log_level: read_level(
                log_section,
                "ConsoleLogLevel",
                defaults.log_settings.console_log_level,
            ),
        };

        let reflow_section = conf.section(Some(REFLOW_SECTION));
        let reflow = ReflowOptions {
            min_gap: read_seconds(reflow_section, "MinGap", defaults.reflow.min_gap),
            tail_fallback: read_seconds(
                reflow_section,
                "TailFallback",
                defaults.reflow.tail_fallback,
            ),
        };

        let resolver_section = conf.section(Some(RESOLVER_SECTION));
        let d = defaults.resolver;
        let resolver = ResolverOptions {
            line_lead_in: read_seconds(resolver_section, "LineLeadIn", d.line_lead_in),
            line_linger: read_seconds(resolver_section, "LineLinger", d.line_linger),
            token_tolerance: read_seconds(resolver_section, "TokenTolerance", d.token_tolerance),
            line_tail: read_seconds(resolver_section, "LineTail", d.line_tail),
            token_tail: read_seconds(resolver_section, "TokenTail", d.token_tail),
            min_window: read_seconds(resolver_section, "MinWindow", d.min_window),
        };

        log::info!("从 {path:?} 加载配置成功。");
        Ok(AppSettings {
            log_settings,
            reflow,
            resolver,
        })
    }

    pub fn save(&self) -> Result<(), ini::Error> {
        match Self::config_path() {
            Some(path) => self.save_to(&path),
            None => {
                let err_msg = "无法确定配置文件路径，保存失败。".to_string();
                log::error!("{err_msg}");
                Err(ini::Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    err_msg,
                )))
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ini::Error> {
        let mut conf = Ini::new();
        conf.with_section(Some(LOGGING_SECTION))
            .set(
                "EnableFileLog",
                self.log_settings.enable_file_log.to_string(),
            )
            .set("FileLogLevel", self.log_settings.file_log_level.to_string())
            .set(
                "ConsoleLogLevel",
                self.log_settings.console_log_level.to_string(),
            );

        conf.with_section(Some(REFLOW_SECTION))
            .set("MinGap", self.reflow.min_gap.to_string())
            .set("TailFallback", self.reflow.tail_fallback.to_string());

        let r = &self.resolver;
        conf.with_section(Some(RESOLVER_SECTION))
            .set("LineLeadIn", r.line_lead_in.to_string())
            .set("LineLinger", r.line_linger.to_string())
            .set("TokenTolerance", r.token_tolerance.to_string())
            .set("LineTail", r.line_tail.to_string())
            .set("TokenTail", r.token_tail.to_string())
            .set("MinWindow", r.min_window.to_string());

        match conf.write_to_file(path) {
            Ok(()) => {
                log::info!("配置已保存到 {path:?}。");
                Ok(())
            }
            Err(write_error) => {
                log::error!("保存配置到 {path:?} 失败: {write_error}");
                Err(ini::Error::Io(write_error))
            }
        }
    }
}
