//! # LRC 扩展格式解析器
//!
//! 把手写的带时间戳歌词文本转换为 [`LyricsDocument`]。支持：
//!
//! - 头部标签 `[ti:..]`、`[ar:..]`、`[al:..]`、`[by:..]`（不区分大小写，后出现的覆盖先出现的）
//! - 行时间戳 `[mm:ss]`、`[mm:ss.ff]` 或行首不带括号的 `mm:ss.ff`
//! - 逐字时间戳 `<mm:ss.ff>词`
//! - 段落标签 `[Chorus]` 或 `[mm:ss.ff][Chorus]`
//!
//! 解析永远不会失败：编辑过程中的半成品文本会被尽量解析，无法识别的行直接忽略。

use once_cell::sync::Lazy;
use regex::Regex;
use std::str::FromStr;

use crate::types::{HeaderKey, LyricLine, LyricsDocument, NO_TIME, Token};
use crate::utils::{parse_time_parts, split_lyric_lines};

/// 头部元数据标签，例如 `[ti:歌曲名]`
static HEADER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\[(ti|ar|al|by):([^\]]*)\]$").expect("未能编译 HEADER_REGEX")
});

/// 行时间戳后紧跟段落标签，例如 `[00:12.34][Chorus]`
static TIMED_LABEL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[(\d+):(\d+(?:[.,]\d*)?)\]\[([^\[\]]*)\]$").expect("未能编译 TIMED_LABEL_REGEX")
});

/// 整行只有一对方括号，例如 `[Chorus]`
static BRACKETED_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[([^\[\]]*)\]$").expect("未能编译 BRACKETED_REGEX"));

/// 方括号内是否是一个时间，用来区分标签和时间戳
static TIME_TEXT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+:\d+(?:[.,]\d*)?\s*$").expect("未能编译 TIME_TEXT_REGEX"));

/// 行首的行时间戳：`[mm:ss(.ff)]` 或不带括号的 `mm:ss.ff`
static LINE_TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\[(\d+):(\d+(?:[.,]\d*)?)\]|(\d+):(\d+[.,]\d+))")
        .expect("未能编译 LINE_TIME_REGEX")
});

/// 紧跟在第一个行时间戳后面的额外行时间戳，例如 `[00:10.00][00:42.00]副歌`
static EXTRA_LINE_TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[(\d+):(\d+(?:[.,]\d*)?)\]").expect("未能编译 EXTRA_LINE_TIME_REGEX")
});

/// 逐字时间戳，例如 `<00:12.34>`
static WORD_TAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(\d+):(\d+(?:[.,]\d*)?)>").expect("未能编译 WORD_TAG_REGEX"));

/// 单行的分类结果。各分类按优先级依次匹配，互相排斥。
#[derive(Debug, Clone, PartialEq)]
enum LineKind<'a> {
    Header(HeaderKey, &'a str),
    TimedLabel(f64, &'a str),
    BareLabel(&'a str),
    Timed { times: Vec<f64>, remainder: &'a str },
    Ignored,
}

/// 解析过程中的状态。
#[derive(Default)]
struct ParseState {
    doc: LyricsDocument,
    last_timed_start: Option<f64>,
}

impl ParseState {
    fn anchor(&self) -> f64 {
        self.last_timed_start.unwrap_or(NO_TIME)
    }

    fn push_label(&mut self, anchor: f64, label: &str) {
        self.doc.lines.push(LyricLine::label(anchor, label));
    }
}

/// 解析 LRC 扩展格式文本。
///
/// 空行被跳过；头部标签写入文档元数据；其余的行按下列优先级分类：
/// 头部 > 时间戳+标签 > 纯标签 > 时间行。无法识别的行被忽略。
pub fn parse(text: &str) -> LyricsDocument {
    let mut state = ParseState::default();

    for (line_num, raw_line) in split_lyric_lines(text).enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        match classify_line(line) {
            LineKind::Header(key, value) => {
                let value = value.trim();
                if value.is_empty() {
                    apply_empty_header(&mut state.doc, key);
                } else {
                    state.doc.set_metadata(key, value);
                }
            }
            LineKind::TimedLabel(time, label) => {
                state.push_label(time, label);
                state.last_timed_start = Some(time);
            }
            LineKind::BareLabel(label) => {
                let anchor = state.anchor();
                state.push_label(anchor, label);
            }
            LineKind::Timed { times, remainder } => {
                parse_timed_line(&mut state, &times, remainder, line_num + 1);
            }
            LineKind::Ignored => {
                log::debug!("[LRC 解析] 行 {}: 跳过未识别的行: '{}'", line_num + 1, line);
            }
        }
    }

    state.doc
}

/// 空值的头部标签清除对应字段。
fn apply_empty_header(doc: &mut LyricsDocument, key: HeaderKey) {
    match key {
        HeaderKey::Title => doc.title = None,
        HeaderKey::Artist => doc.artist = None,
        HeaderKey::Album => doc.album = None,
        HeaderKey::By => doc.by = None,
    }
}

fn classify_line(line: &str) -> LineKind<'_> {
    if let Some(caps) = HEADER_REGEX.captures(line) {
        let key_str = caps.get(1).map_or("", |m| m.as_str());
        let value = caps.get(2).map_or("", |m| m.as_str());
        if let Ok(key) = HeaderKey::from_str(key_str) {
            return LineKind::Header(key, value);
        }
    }

    if let Some(caps) = TIMED_LABEL_REGEX.captures(line) {
        let label = caps.get(3).map_or("", |m| m.as_str()).trim();
        if !label.is_empty() && !TIME_TEXT_REGEX.is_match(label) {
            let time = parse_time_parts(&caps[1], &caps[2]);
            return LineKind::TimedLabel(time, label);
        }
    }

    if let Some(label) = bracketed_label(line) {
        return LineKind::BareLabel(label);
    }

    if let Some(caps) = LINE_TIME_REGEX.captures(line) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        let first_time = match (caps.get(1), caps.get(2)) {
            (Some(min), Some(sec)) => parse_time_parts(min.as_str(), sec.as_str()),
            _ => parse_time_parts(
                caps.get(3).map_or("", |m| m.as_str()),
                caps.get(4).map_or("", |m| m.as_str()),
            ),
        };

        let mut times = vec![first_time];
        let mut remainder = &line[whole.end..];
        while let Some(extra) = EXTRA_LINE_TIME_REGEX.captures(remainder) {
            times.push(parse_time_parts(&extra[1], &extra[2]));
            let end = extra.get(0).map_or(0, |m| m.end());
            remainder = &remainder[end..];
        }

        return LineKind::Timed {
            times,
            remainder: remainder.trim(),
        };
    }

    LineKind::Ignored
}

/// 如果整段文本是一对方括号包住的非时间文本，返回去掉括号并 trim 后的标签。
fn bracketed_label(text: &str) -> Option<&str> {
    let caps = BRACKETED_REGEX.captures(text)?;
    let inner = caps.get(1)?.as_str().trim();
    if inner.is_empty() || TIME_TEXT_REGEX.is_match(inner) {
        None
    } else {
        Some(inner)
    }
}

fn parse_timed_line(state: &mut ParseState, times: &[f64], remainder: &str, line_num: usize) {
    // 时间戳后只剩一个方括号标签时，按标签行处理
    if let Some(label) = bracketed_label(remainder) {
        for &time in times {
            state.push_label(time, label);
            state.last_timed_start = Some(time);
        }
        return;
    }

    let start_time = times[0];
    if WORD_TAG_REGEX.is_match(remainder) {
        if times.len() > 1 {
            log::debug!(
                "[LRC 解析] 行 {}: 逐字行带有 {} 个行时间戳，仅使用第一个。",
                line_num,
                times.len()
            );
        }
        state.doc.lines.push(LyricLine {
            start_time,
            tokens: parse_word_tokens(remainder, start_time),
            label: None,
        });
        state.last_timed_start = Some(start_time);
        return;
    }

    // 没有逐字时间戳：整行作为一个从行时间开始的词
    for &time in times {
        let mut line = LyricLine::timed(time);
        if !remainder.is_empty() {
            line.tokens.push(Token::new(time, remainder));
        }
        state.doc.lines.push(line);
        state.last_timed_start = Some(time);
    }
}

/// 扫描 `<mm:ss.ff>词` 序列。
///
/// 每个词从时间戳之后一直延伸到下一个 `<` 或行尾，trim 后为空的词被丢弃。
/// 第一个逐字时间戳之前的文字视为从行时间开始演唱。
fn parse_word_tokens(remainder: &str, line_start: f64) -> Vec<Token> {
    let mut tokens = Vec::new();

    let first_tag_start = WORD_TAG_REGEX.find(remainder).map_or(0, |m| m.start());
    let prefix = remainder[..first_tag_start].trim();
    if !prefix.is_empty() {
        tokens.push(Token::new(line_start, prefix));
    }

    for caps in WORD_TAG_REGEX.captures_iter(remainder) {
        let Some(tag) = caps.get(0) else { continue };
        let time = parse_time_parts(&caps[1], &caps[2]);
        let text_start = tag.end();
        let text_end = remainder[text_start..]
            .find('<')
            .map_or(remainder.len(), |offset| text_start + offset);
        let text = remainder[text_start..text_end].trim();
        if !text.is_empty() {
            tokens.push(Token::new(time, text));
        }
    }

    tokens
}
