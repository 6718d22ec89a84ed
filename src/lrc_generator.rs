use std::fmt::Write as FmtWrite; // 用于向 String 写入格式化文本

use strum::IntoEnumIterator;

use crate::types::{HeaderKey, LyricLine, LyricsDocument};
use crate::utils::{approx_eq, format_lrc_time};

/// 判断单个词是否与行时间戳重合，用于还原未分词的整行。
const SAME_TIME_EPSILON: f64 = 0.005;

/// 把文档重新生成为 LRC 扩展格式文本。
///
/// 输出顺序：头部标签（ti, ar, al, by），然后按文档顺序输出每一行。
/// 对输出再次调用 [`crate::lrc_parser::parse`] 可以得到（精确到百分秒的）同一文档。
pub fn generate_lrc(doc: &LyricsDocument) -> String {
    let mut output = String::new();

    for key in HeaderKey::iter() {
        if let Some(value) = doc.metadata(key) {
            // 向 String 写入不会失败
            let _ = writeln!(output, "[{key}:{value}]");
        }
    }

    let mut last_timed_start: Option<f64> = None;
    for line in &doc.lines {
        if let Some(text) = generate_line(line, &mut last_timed_start) {
            output.push_str(&text);
            output.push('\n');
        }
    }

    // 清理末尾多余的换行符
    while output.ends_with('\n') {
        output.pop();
    }
    output
}

fn generate_line(line: &LyricLine, last_timed_start: &mut Option<f64>) -> Option<String> {
    if let Some(label) = &line.label {
        if !line.has_time() {
            return Some(format!("[{label}]"));
        }
        let same_anchor =
            last_timed_start.is_some_and(|last| approx_eq(last, line.start_time, SAME_TIME_EPSILON));
        if same_anchor {
            return Some(format!("[{label}]"));
        }
        *last_timed_start = Some(line.start_time);
        return Some(format!("[{}][{}]", format_lrc_time(line.start_time), label));
    }

    let start = if line.has_time() {
        line.start_time
    } else {
        line.tokens.first()?.time
    };
    *last_timed_start = Some(start);

    let mut text = format!("[{}]", format_lrc_time(start));
    match line.tokens.as_slice() {
        [] => {}
        // 以 `[` 开头的文本会被重新解析成标签或时间戳，必须保留逐字时间戳
        [single]
            if approx_eq(single.time, start, SAME_TIME_EPSILON) && !single.text.starts_with('[') =>
        {
            text.push_str(&single.text);
        }
        tokens => {
            let words: Vec<String> = tokens
                .iter()
                .map(|t| format!("<{}>{}", format_lrc_time(t.time), t.text))
                .collect();
            text.push_str(&words.join(" "));
        }
    }
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lrc_parser::parse;
    use crate::types::{NO_TIME, Token};

    #[test]
    fn test_generate_basic() {
        let doc = parse(
            "[ar:Artist]\n[ti:Song]\n[Intro]\n[00:10.00]<00:10.00>Hello<00:11.50>World\n[00:12.00]Just text",
        );
        let text = generate_lrc(&doc);
        assert_eq!(
            text,
            "[ti:Song]\n[ar:Artist]\n[Intro]\n[00:10.00]<00:10.00>Hello <00:11.50>World\n[00:12.00]Just text"
        );
    }

    #[test]
    fn test_labels_keep_their_anchor() {
        let input = "[00:01.00]a\n[Chorus]\n[00:05.00][Verse]\n[00:06.00]";
        let doc = parse(input);
        assert_eq!(generate_lrc(&doc), input);
    }

    #[test]
    fn test_roundtrip_through_parser() {
        let doc = parse(
            "[by:me]\n[Intro]\n[00:00.50]<00:00.50>a<00:01.25>b\n[00:03.00][Chorus]\n[00:03.00]<00:03.10>c\n[Bridge]\n[01:05.99]d",
        );
        let again = parse(&generate_lrc(&doc));
        assert_eq!(again, doc);
    }

    #[test]
    fn test_roundtrip_bracketed_word_keeps_word_tag() {
        let doc = parse("[00:01.00] <00:01.00>[x]");
        assert_eq!(doc.lines[0].tokens, vec![Token::new(1.0, "[x]")]);

        let text = generate_lrc(&doc);
        assert_eq!(text, "[00:01.00]<00:01.00>[x]");
        assert_eq!(parse(&text), doc);
    }

    #[test]
    fn test_roundtrip_bracket_prefixed_text() {
        let doc = LyricsDocument {
            lines: vec![LyricLine {
                start_time: 3.0,
                tokens: vec![Token::new(3.0, "[00:09.00]not a time")],
                label: None,
            }],
            ..Default::default()
        };
        assert_eq!(parse(&generate_lrc(&doc)), doc);
    }

    #[test]
    fn test_untimed_token_line_uses_first_token() {
        let doc = LyricsDocument {
            lines: vec![LyricLine {
                start_time: NO_TIME,
                tokens: vec![Token::new(2.0, "x"), Token::new(2.5, "y")],
                label: None,
            }],
            ..Default::default()
        };
        assert_eq!(generate_lrc(&doc), "[00:02.00]<00:02.00>x <00:02.50>y");
    }
}
