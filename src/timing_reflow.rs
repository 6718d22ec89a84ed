//! # 时间轴整理
//!
//! 对解析后的文档做一次规范化：保证每行内的逐字时间单调递增（相邻两个词至少相隔
//! `min_gap`），并且最后一个词不会越过下一行的开始时间。越界的行按比例压缩，
//! 保留原本的节奏而不是把后面的词全部截到同一时刻。

use serde::{Deserialize, Serialize};

use crate::types::{LyricLine, LyricsDocument, Token};

/// 比较浮点时间时允许的误差，保证整理结果再次整理时保持不变。
const TIME_EPSILON: f64 = 1e-9;

/// 时间轴整理的参数。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReflowOptions {
    /// 相邻两个词之间的最小间隔 (秒)
    pub min_gap: f64,
    /// 找不到下一行时，行结束时间 = 最后一个词的时间 + 该值 (秒)
    pub tail_fallback: f64,
}

impl Default for ReflowOptions {
    fn default() -> Self {
        Self {
            min_gap: 0.02,
            tail_fallback: 0.5,
        }
    }
}

/// 整理文档的时间轴，返回新的文档，不修改输入。
///
/// 多次调用的结果与调用一次相同。
pub fn reflow(doc: &LyricsDocument, options: &ReflowOptions) -> LyricsDocument {
    let mut result = doc.clone();
    let min_gap = options.min_gap.max(0.0);

    for i in 0..result.lines.len() {
        if result.lines[i].tokens.is_empty() {
            continue;
        }

        let line_start = result.lines[i].effective_start();
        let line_end = next_line_start(&result.lines[i + 1..], line_start)
            .unwrap_or_else(|| result.lines[i].last_time() + options.tail_fallback);

        reflow_line(&mut result.lines[i], line_end, min_gap);
    }

    result
}

/// 向后查找下一个有逐字时间或有正的行时间戳的行，返回它的起始时间。
///
/// 没有锚定时间的标签行会被跳过；锚定在本行开始时间或更早的标签行
/// （即沿用上一行时间的 `[Chorus]`）也不作为结束边界。
fn next_line_start(following: &[LyricLine], line_start: f64) -> Option<f64> {
    following
        .iter()
        .find(|line| {
            if !line.tokens.is_empty() {
                return true;
            }
            if line.is_label() {
                line.start_time > 0.0 && line.start_time > line_start
            } else {
                line.start_time > 0.0
            }
        })
        .map(LyricLine::effective_start)
}

/// 一行内 `token_count` 个词实际允许的最晚结束时间。
///
/// 下界保证窗口不会退化：即使下一行的时间早于本行（乱序输入），
/// 也要给每个间隔留出 `min_gap`。
pub fn effective_line_end(line_start: f64, line_end: f64, token_count: usize, min_gap: f64) -> f64 {
    let gaps = token_count.saturating_sub(1).max(1) as f64;
    line_end.max(line_start + gaps * min_gap)
}

fn reflow_line(line: &mut LyricLine, line_end: f64, min_gap: f64) {
    let tokens = &mut line.tokens;
    let Some(first_time) = tokens.first().map(|t| t.time) else {
        return;
    };
    let end = effective_line_end(first_time, line_end, tokens.len(), min_gap);

    // 第一遍：强制单调递增
    enforce_min_gap(tokens, min_gap);

    let last_time = tokens.last().map_or(first_time, |t| t.time);
    if last_time <= end + TIME_EPSILON {
        return;
    }

    // 第二遍：最后一个词越界，按比例压缩整行
    let span = (last_time - first_time).max(min_gap);
    let scale = (end - first_time) / span;
    log::debug!(
        "[时间轴整理] 行 {:.3}s 越界 ({:.3}s > {:.3}s)，压缩比例 {:.4}",
        first_time,
        last_time,
        end,
        scale
    );
    for token in tokens.iter_mut().skip(1) {
        token.time = first_time + (token.time - first_time) * scale;
    }

    // 压缩后过小的间隔可能低于 min_gap：先向前补足，再以行尾为上限向回收紧。
    // 总跨度至少是 (n-1) * min_gap，所以第一个词不会被移动。
    enforce_min_gap(tokens, min_gap);
    if let Some(last) = tokens.last_mut() {
        last.time = last.time.min(end);
    }
    for j in (1..tokens.len()).rev() {
        let ceiling = tokens[j].time - min_gap;
        if tokens[j - 1].time > ceiling + TIME_EPSILON {
            tokens[j - 1].time = ceiling;
        }
    }
}

fn enforce_min_gap(tokens: &mut [Token], min_gap: f64) {
    for j in 1..tokens.len() {
        let floor = tokens[j - 1].time + min_gap;
        if tokens[j].time < floor - TIME_EPSILON {
            log::trace!(
                "[时间轴整理] 词 '{}' 的时间 {:.3} 早于前一个词，调整为 {:.3}",
                tokens[j].text,
                tokens[j].time,
                floor
            );
            tokens[j].time = floor;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lrc_parser::parse;
    use crate::types::NO_TIME;

    const EPS: f64 = 1e-6;

    fn line_with(times: &[f64]) -> LyricLine {
        LyricLine {
            start_time: times.first().copied().unwrap_or(NO_TIME),
            tokens: times
                .iter()
                .enumerate()
                .map(|(i, t)| Token::new(*t, format!("w{i}")))
                .collect(),
            label: None,
        }
    }

    fn times(line: &LyricLine) -> Vec<f64> {
        line.tokens.iter().map(|t| t.time).collect()
    }

    #[test]
    fn test_compression_preserves_order() {
        let doc = LyricsDocument {
            lines: vec![line_with(&[0.0, 1.0, 10.0]), LyricLine::timed(2.0)],
            ..Default::default()
        };
        let out = reflow(&doc, &ReflowOptions::default());
        let t = times(&out.lines[0]);
        assert!((t[0] - 0.0).abs() < EPS);
        assert!((t[1] - 0.2).abs() < EPS);
        assert!((t[2] - 2.0).abs() < EPS);
        assert!(t[0] < t[1] && t[1] < t[2]);
    }

    #[test]
    fn test_monotonic_fix() {
        let doc = LyricsDocument {
            lines: vec![line_with(&[1.0, 0.5, 1.0, 3.0])],
            ..Default::default()
        };
        let out = reflow(&doc, &ReflowOptions::default());
        let t = times(&out.lines[0]);
        assert!((t[1] - 1.02).abs() < EPS);
        assert!((t[2] - 1.04).abs() < EPS);
        assert!((t[3] - 3.0).abs() < EPS);
    }

    #[test]
    fn test_input_not_mutated() {
        let doc = LyricsDocument {
            lines: vec![line_with(&[1.0, 0.5])],
            ..Default::default()
        };
        let before = doc.clone();
        let _ = reflow(&doc, &ReflowOptions::default());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_skips_unanchored_labels_when_finding_line_end() {
        let doc = LyricsDocument {
            lines: vec![
                line_with(&[0.0, 5.0]),
                LyricLine::label(NO_TIME, "Chorus"),
                LyricLine::timed(3.0),
            ],
            ..Default::default()
        };
        let out = reflow(&doc, &ReflowOptions::default());
        assert!((out.lines[0].tokens[1].time - 3.0).abs() < EPS);
        assert_eq!(out.lines[1], doc.lines[1]);
    }

    #[test]
    fn test_label_anchored_to_previous_line_is_not_a_bound() {
        let doc = parse("[00:01.00]<00:01.00>a<00:02.00>b\n[Chorus]\n[00:04.00]c");
        let out = reflow(&doc, &ReflowOptions::default());
        assert_eq!(out.lines[0], doc.lines[0]);
    }

    #[test]
    fn test_timed_label_is_a_bound() {
        let doc = parse("[00:01.00]<00:01.00>a<00:05.00>b\n[00:03.00][Chorus]");
        let out = reflow(&doc, &ReflowOptions::default());
        assert!((out.lines[0].tokens[1].time - 3.0).abs() < EPS);
    }

    #[test]
    fn test_tail_fallback_for_last_line() {
        let doc = LyricsDocument {
            lines: vec![line_with(&[4.0, 4.0, 4.0])],
            ..Default::default()
        };
        let out = reflow(&doc, &ReflowOptions::default());
        let t = times(&out.lines[0]);
        assert!((t[2] - 4.04).abs() < EPS);
    }

    #[test]
    fn test_out_of_order_next_line_gets_minimum_window() {
        let doc = LyricsDocument {
            lines: vec![line_with(&[5.0, 6.0, 7.0]), line_with(&[1.0])],
            ..Default::default()
        };
        let out = reflow(&doc, &ReflowOptions::default());
        let t = times(&out.lines[0]);
        assert!((t[0] - 5.0).abs() < EPS);
        assert!((t[2] - 5.04).abs() < EPS);
        assert!(t[2] - t[1] >= 0.02 - EPS);
        assert!(t[1] - t[0] >= 0.02 - EPS);
    }

    #[test]
    fn test_uneven_gaps_keep_min_gap_after_compression() {
        let doc = LyricsDocument {
            lines: vec![line_with(&[0.0, 0.02, 10.0]), LyricLine::timed(1.0)],
            ..Default::default()
        };
        let out = reflow(&doc, &ReflowOptions::default());
        let t = times(&out.lines[0]);
        assert!(t[1] - t[0] >= 0.02 - EPS);
        assert!(t[2] - t[1] >= 0.02 - EPS);
        assert!((t[2] - 1.0).abs() < EPS);
    }

    #[test]
    fn test_idempotent() {
        let text = "[00:01.00]<00:01.00>a<00:00.50>b<00:09.00>c\n\
                    [Chorus]\n\
                    [00:02.00]<00:02.00>d<00:02.00>e<00:02.00>f\n\
                    [00:03.00]plain\n\
                    [00:02.50]<00:02.50>x<00:02.50>y<00:02.50>z<00:02.51>w";
        let once = reflow(&parse(text), &ReflowOptions::default());
        let twice = reflow(&once, &ReflowOptions::default());
        assert_eq!(once, twice);
    }
}
