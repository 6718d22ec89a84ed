/// 把文本按行切分，统一处理 `\r\n`、单独的 `\r` 和 `\n` 三种换行。
///
/// 返回的每一行都保留原样（不做 trim）。解析器和需要逐行检查的调用方
/// （例如“单行字数过多”提示）都应使用这个函数，保证行号一致。
pub fn split_lyric_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(text);
    std::iter::from_fn(move || {
        let current = rest?;
        match current.find(['\r', '\n']) {
            Some(pos) => {
                let line = &current[..pos];
                let skip = if current[pos..].starts_with("\r\n") { 2 } else { 1 };
                rest = Some(&current[pos + skip..]);
                Some(line)
            }
            None => {
                rest = None;
                // 文本末尾的换行不产生额外的空行
                if current.is_empty() && !text.is_empty() {
                    None
                } else {
                    Some(current)
                }
            }
        }
    })
}

/// 把 `mm` 和 `ss[.ff]` 两段数字转换为秒。
///
/// 秒的小数分隔符可以是 `.` 或 `,`。任何一段无法解析时按 0 处理，不会失败。
pub fn parse_time_parts(minutes: &str, seconds: &str) -> f64 {
    let minutes: f64 = minutes.trim().parse::<u64>().map_or(0.0, |m| m as f64);
    let seconds: f64 = seconds
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|s| s.is_finite() && *s >= 0.0)
        .unwrap_or(0.0);
    minutes * 60.0 + seconds
}

/// 把秒格式化为 `mm:ss.ff`（百分秒，四舍五入）。负数按 0 处理。
pub fn format_lrc_time(seconds: f64) -> String {
    let centis = if seconds.is_finite() && seconds > 0.0 {
        (seconds * 100.0).round() as u64
    } else {
        0
    };
    let minutes = centis / 6000;
    let secs = (centis % 6000) / 100;
    let cs = centis % 100;
    format!("{minutes:02}:{secs:02}.{cs:02}")
}

/// 判断两个时间是否在给定误差内相等。
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() <= epsilon
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_mixed_line_endings() {
        let lines: Vec<&str> = split_lyric_lines("a\r\nb\rc\nd").collect();
        assert_eq!(lines, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_split_keeps_inner_blank_lines() {
        let lines: Vec<&str> = split_lyric_lines("a\n\n b \n").collect();
        assert_eq!(lines, vec!["a", "", " b "]);
        assert_eq!(split_lyric_lines("").count(), 1);
    }

    #[test]
    fn test_parse_time_parts() {
        assert!(approx_eq(parse_time_parts("01", "02.50"), 62.5, 1e-9));
        assert!(approx_eq(parse_time_parts("00", "10,25"), 10.25, 1e-9));
        assert!(approx_eq(parse_time_parts("xx", "05"), 5.0, 1e-9));
        assert!(approx_eq(parse_time_parts("02", "abc"), 120.0, 1e-9));
    }

    #[test]
    fn test_format_lrc_time() {
        assert_eq!(format_lrc_time(0.0), "00:00.00");
        assert_eq!(format_lrc_time(62.5), "01:02.50");
        assert_eq!(format_lrc_time(11.999), "00:12.00");
        assert_eq!(format_lrc_time(-1.0), "00:00.00");
        assert_eq!(format_lrc_time(6000.0), "100:00.00");
    }
}
