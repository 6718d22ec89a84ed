//! `lrcx`：LRC 扩展格式歌词的命令行工具。
//!
//! 用法：
//!   lrcx show <文件> [--json]                         显示整理后的文档
//!   lrcx resolve <文件> --at <秒>...                  输出指定时刻的当前行和当前词
//!   lrcx frames <文件> --fps <帧率> --duration <秒>   逐帧输出定位结果 (JSON Lines)
//!   lrcx format <文件>                                输出整理后的 LRC 文本

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use log::LevelFilter;
use lrc_extended::app_settings::AppSettings;
use lrc_extended::error::{AppError, AppResult};
use lrc_extended::utils::format_lrc_time;
use lrc_extended::{
    FrameSampler, LyricsDocument, ReflowOptions, generate_lrc, logger, parse, reflow, resolve,
};

#[derive(Parser, Debug)]
#[command(name = "lrcx", version, about = "LRC 扩展格式歌词的解析、整理与定位工具")]
struct Cli {
    /// 使用指定的配置文件代替默认位置
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 显示整理后的文档
    Show {
        path: PathBuf,
        /// 以 JSON 输出
        #[arg(long)]
        json: bool,
    },
    /// 输出指定时刻的当前行和当前词
    Resolve {
        path: PathBuf,
        /// 查询时间 (秒)，可重复
        #[arg(long = "at", required = true, allow_negative_numbers = true)]
        times: Vec<f64>,
    },
    /// 逐帧输出定位结果
    Frames {
        path: PathBuf,
        #[arg(long, default_value_t = 30.0)]
        fps: f64,
        #[arg(long)]
        duration: f64,
    },
    /// 输出整理后的 LRC 文本
    Format { path: PathBuf },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => AppSettings::load_from(path).unwrap_or_else(|e| {
            eprintln!("加载配置文件 {path:?} 失败: {e}。将使用默认配置。");
            AppSettings::default()
        }),
        None => AppSettings::load(),
    };
    if cli.verbose {
        settings.log_settings.console_log_level = LevelFilter::Debug;
    }
    logger::init_global_logger(&settings.log_settings);

    match run(&cli, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn load_document(path: &Path, options: &ReflowOptions) -> AppResult<LyricsDocument> {
    let text = fs::read_to_string(path)?;
    let doc = reflow(&parse(&text), options);
    log::info!(
        "已加载 {path:?}: {} 行, {} 个词。",
        doc.lines.len(),
        doc.token_count()
    );
    Ok(doc)
}

fn run(cli: &Cli, settings: &AppSettings) -> AppResult<()> {
    match &cli.command {
        Command::Show { path, json } => {
            let doc = load_document(path, &settings.reflow)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                print_document(&doc);
            }
        }
        Command::Resolve { path, times } => {
            let doc = load_document(path, &settings.reflow)?;
            for &time in times {
                match resolve(&doc, time, &settings.resolver) {
                    Some(span) => {
                        let line = &doc.lines[span.line];
                        let word = span
                            .token
                            .and_then(|j| line.tokens.get(j))
                            .map_or("-", |t| t.text.as_str());
                        println!("{time:.3}\t行 {}\t词 {word}\t{}", span.line, line.text());
                    }
                    None => println!("{time:.3}\t-"),
                }
            }
        }
        Command::Frames {
            path,
            fps,
            duration,
        } => {
            if fps.is_nan() || *fps <= 0.0 {
                return Err(AppError::Custom(format!("帧率必须大于 0: {fps}")));
            }
            let doc = load_document(path, &settings.reflow)?;
            for sample in FrameSampler::new(&doc, *fps, *duration, settings.resolver) {
                println!("{}", serde_json::to_string(&sample)?);
            }
        }
        Command::Format { path } => {
            let doc = load_document(path, &settings.reflow)?;
            println!("{}", generate_lrc(&doc));
        }
    }
    Ok(())
}

fn print_document(doc: &LyricsDocument) {
    for (label, value) in [
        ("标题", &doc.title),
        ("歌手", &doc.artist),
        ("专辑", &doc.album),
        ("制作", &doc.by),
    ] {
        if let Some(value) = value {
            println!("{label}: {value}");
        }
    }
    for (i, line) in doc.lines.iter().enumerate() {
        let time = if line.has_time() {
            format_lrc_time(line.start_time)
        } else {
            "--:--.--".to_string()
        };
        match &line.label {
            Some(label) => println!("{i:>4} [{time}] <{label}>"),
            None => {
                let words: Vec<String> = line
                    .tokens
                    .iter()
                    .map(|t| format!("{}@{:.2}", t.text, t.time))
                    .collect();
                println!("{i:>4} [{time}] {}", words.join(" "));
            }
        }
    }
}
