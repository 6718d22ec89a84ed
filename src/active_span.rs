//! # 当前行 / 当前词定位
//!
//! 给定文档和播放时间，找出应当高亮的行以及行内的词。播放时钟通常按屏幕刷新率采样，
//! 所以行级窗口前后都留有余量（提前出现、稍后消失），词级窗口则很窄，保证逐字高亮准确。

use serde::{Deserialize, Serialize};

use crate::types::{LyricLine, LyricsDocument};

/// 定位时使用的各项容差 (秒)。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolverOptions {
    /// 行窗口向前扩展的时间
    pub line_lead_in: f64,
    /// 行窗口向后延长的时间
    pub line_linger: f64,
    /// 词窗口两端的容差
    pub token_tolerance: f64,
    /// 最后一行没有后继时的默认持续时间
    pub line_tail: f64,
    /// 最后一个词没有后继时的默认持续时间
    pub token_tail: f64,
    /// 行窗口的最小长度
    pub min_window: f64,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            line_lead_in: 0.15,
            line_linger: 0.20,
            token_tolerance: 0.02,
            line_tail: 0.5,
            token_tail: 0.35,
            min_window: 0.02,
        }
    }
}

/// 某一时刻正在播放的行和词。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSpan {
    /// 在 `LyricsDocument::lines` 中的下标
    pub line: usize,
    /// 在该行 `tokens` 中的下标，不在任何词的窗口内时为 `None`
    pub token: Option<usize>,
}

/// 参与定位的行的时间窗口（未加容差）。
#[derive(Debug, Clone, Copy)]
struct LineWindow {
    index: usize,
    start: f64,
    next_start: f64,
}

fn line_windows(doc: &LyricsDocument, options: &ResolverOptions) -> Vec<LineWindow> {
    let timed: Vec<usize> = doc.timed_line_indices();

    timed
        .iter()
        .enumerate()
        .map(|(pos, &index)| {
            let line = &doc.lines[index];
            let start = line.effective_start();
            let next_start = timed
                .get(pos + 1)
                .map(|&next| doc.lines[next].effective_start())
                .unwrap_or_else(|| line.last_time() + options.line_tail);
            LineWindow {
                index,
                start,
                next_start: next_start.max(start + options.min_window),
            }
        })
        .collect()
}

/// 找出 `time` 时刻的当前行，返回其在 `doc.lines` 中的下标。
///
/// 段落标签和没有锚定时间的行永远不会成为当前行。文档中没有任何计时行时返回 `None`。
/// 早于第一行时返回第一行（预显示），晚于所有窗口时返回最后一行（歌词开始后不再留白）。
pub fn resolve_line(doc: &LyricsDocument, time: f64, options: &ResolverOptions) -> Option<usize> {
    let windows = line_windows(doc, options);
    let first = windows.first()?;

    let hit = windows.iter().find(|w| {
        time >= w.start - options.line_lead_in && time <= w.next_start + options.line_linger
    });
    if let Some(w) = hit {
        return Some(w.index);
    }

    if time < first.start - options.line_lead_in {
        return Some(first.index);
    }

    windows.last().map(|w| w.index)
}

/// 找出行内 `time` 时刻的当前词。
///
/// 最后一个词的窗口以 `next_line_start` 结束；调用方不提供时使用 `token_tail`。
pub fn resolve_token(
    line: &LyricLine,
    time: f64,
    next_line_start: Option<f64>,
    options: &ResolverOptions,
) -> Option<usize> {
    let tolerance = options.token_tolerance;
    line.tokens.iter().enumerate().position(|(j, token)| {
        let end = match line.tokens.get(j + 1) {
            Some(next) => next.time,
            None => next_line_start.unwrap_or(token.time + options.token_tail),
        }
        .max(token.time);
        time >= token.time - tolerance && time <= end + tolerance
    })
}

/// 在 `doc.lines` 中位于 `index` 之后的下一个计时行的起始时间。
pub fn next_timed_start(doc: &LyricsDocument, index: usize) -> Option<f64> {
    doc.lines
        .iter()
        .skip(index + 1)
        .find(|line| line.is_timed())
        .map(LyricLine::effective_start)
}

/// 同时定位当前行和当前词。
pub fn resolve(doc: &LyricsDocument, time: f64, options: &ResolverOptions) -> Option<ActiveSpan> {
    let line = resolve_line(doc, time, options)?;
    let token = resolve_token(
        &doc.lines[line],
        time,
        next_timed_start(doc, line),
        options,
    );
    Some(ActiveSpan { line, token })
}
