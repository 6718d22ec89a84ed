//! LRC 扩展格式（逐字时间戳、段落标签）的卡拉OK歌词核心。
//!
//! 处理流程：原始文本 → [`parse`] → [`reflow`] → 每次播放时钟更新时调用 [`resolve`]。
//! 三个入口都是纯函数，文档是一个值，每次编辑后整体重新生成。

pub mod active_span;
pub mod app_settings;
pub mod error;
pub mod frame_sampler;
pub mod logger;
pub mod lrc_generator;
pub mod lrc_parser;
pub mod timing_reflow;
pub mod types;
pub mod utils;

pub use active_span::{
    ActiveSpan, ResolverOptions, next_timed_start, resolve, resolve_line, resolve_token,
};
pub use frame_sampler::{FrameSample, FrameSampler};
pub use lrc_generator::generate_lrc;
pub use lrc_parser::parse;
pub use timing_reflow::{ReflowOptions, reflow};
pub use types::{HeaderKey, LyricLine, LyricsDocument, NO_TIME, Token};
pub use utils::split_lyric_lines;
