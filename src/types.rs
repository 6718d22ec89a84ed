// 导入 serde 的序列化特征，供命令行以 JSON 形式输出文档
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// 哨兵时间：表示“没有可用的时间戳”。
///
/// 带有此时间的行（例如出现在任何时间行之前的段落标签）不参与高亮定位，
/// 也不能被当作 0 秒处理。
pub const NO_TIME: f64 = -1.0;

/// 文档头部的元数据键。
///
/// 对应 `[ti:..]`、`[ar:..]`、`[al:..]`、`[by:..]` 四种头部标签，解析时不区分大小写。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum HeaderKey {
    #[strum(serialize = "ti")]
    Title,
    #[strum(serialize = "ar")]
    Artist,
    #[strum(serialize = "al")]
    Album,
    #[strum(serialize = "by")]
    By,
}

/// 逐字时间单元，即一行中的一个“词”。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub time: f64,    // 开始时间 (秒)，相对于文档开头
    pub text: String, // 显示文本，非空
}

impl Token {
    pub fn new(time: f64, text: impl Into<String>) -> Self {
        Self {
            time,
            text: text.into(),
        }
    }
}

/// 歌词文档中的一行。
///
/// 一行要么带有逐字 `tokens`，要么带有段落标签 `label`（如 "Chorus"），或者两者皆无
/// （只有时间戳的空行，用作上一行的结束标记）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricLine {
    pub start_time: f64, // 行时间戳 (秒)，缺失时为 NO_TIME
    pub tokens: Vec<Token>,
    pub label: Option<String>,
}

impl Default for LyricLine {
    fn default() -> Self {
        Self {
            start_time: NO_TIME,
            tokens: Vec::new(),
            label: None,
        }
    }
}

impl LyricLine {
    /// 创建一个只有时间戳的行。
    pub fn timed(start_time: f64) -> Self {
        Self {
            start_time,
            ..Default::default()
        }
    }

    /// 创建一个段落标签行，`anchor` 为锚定时间（可能是 NO_TIME）。
    pub fn label(anchor: f64, label: impl Into<String>) -> Self {
        Self {
            start_time: anchor,
            tokens: Vec::new(),
            label: Some(label.into()),
        }
    }

    pub fn is_label(&self) -> bool {
        self.label.is_some()
    }

    pub fn has_time(&self) -> bool {
        self.start_time >= 0.0
    }

    /// 参与计时的行：有逐字时间，或有行时间戳且不是段落标签。
    pub fn is_timed(&self) -> bool {
        !self.tokens.is_empty() || (!self.is_label() && self.has_time())
    }

    /// 行的实际起始时间：有逐字时间时以第一个词为准，否则使用行时间戳。
    pub fn effective_start(&self) -> f64 {
        self.tokens.first().map_or(self.start_time, |t| t.time)
    }

    /// 行内最后一个词的时间，没有词时返回行时间戳。
    pub fn last_time(&self) -> f64 {
        self.tokens.last().map_or(self.start_time, |t| t.time)
    }

    /// 把所有词的文本用空格连接起来，用于显示或调试输出。
    pub fn text(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// 一次解析得到的完整歌词文档。
///
/// 文档是一个值：每次编辑都会重新解析并整体替换，不做增量修改。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LyricsDocument {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub by: Option<String>,
    pub lines: Vec<LyricLine>,
}

impl LyricsDocument {
    /// 按键读取元数据。
    pub fn metadata(&self, key: HeaderKey) -> Option<&str> {
        match key {
            HeaderKey::Title => self.title.as_deref(),
            HeaderKey::Artist => self.artist.as_deref(),
            HeaderKey::Album => self.album.as_deref(),
            HeaderKey::By => self.by.as_deref(),
        }
    }

    /// 按键写入元数据，后写入的值覆盖先前的值。
    pub fn set_metadata(&mut self, key: HeaderKey, value: impl Into<String>) {
        let slot = match key {
            HeaderKey::Title => &mut self.title,
            HeaderKey::Artist => &mut self.artist,
            HeaderKey::Album => &mut self.album,
            HeaderKey::By => &mut self.by,
        };
        *slot = Some(value.into());
    }

    /// 所有参与计时的行在 `lines` 中的下标。
    pub fn timed_line_indices(&self) -> Vec<usize> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.is_timed())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn token_count(&self) -> usize {
        self.lines.iter().map(|l| l.tokens.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_header_key_case_insensitive() {
        assert_eq!(HeaderKey::from_str("ti").unwrap(), HeaderKey::Title);
        assert_eq!(HeaderKey::from_str("AR").unwrap(), HeaderKey::Artist);
        assert_eq!(HeaderKey::from_str("Al").unwrap(), HeaderKey::Album);
        assert!(HeaderKey::from_str("offset").is_err());
        assert_eq!(HeaderKey::By.to_string(), "by");
        assert_eq!(HeaderKey::iter().count(), 4);
    }

    #[test]
    fn test_metadata_accessor() {
        let mut doc = LyricsDocument::default();
        doc.set_metadata(HeaderKey::Title, "A");
        doc.set_metadata(HeaderKey::Title, "B");
        doc.set_metadata(HeaderKey::By, "someone");
        assert_eq!(doc.metadata(HeaderKey::Title), Some("B"));
        assert_eq!(doc.metadata(HeaderKey::Artist), None);
        assert_eq!(doc.by.as_deref(), Some("someone"));
    }

    #[test]
    fn test_timed_line_classification() {
        let doc = LyricsDocument {
            lines: vec![
                LyricLine::label(NO_TIME, "Intro"),
                LyricLine::label(3.0, "Verse"),
                LyricLine::timed(4.0),
                LyricLine {
                    start_time: NO_TIME,
                    tokens: vec![Token::new(5.0, "hi")],
                    label: None,
                },
            ],
            ..Default::default()
        };
        assert_eq!(doc.timed_line_indices(), vec![2, 3]);
        assert!(!doc.lines[1].is_timed());
        assert!(!LyricLine::default().is_timed());
        assert_eq!(doc.lines[3].effective_start(), 5.0);
        assert_eq!(doc.lines[2].effective_start(), 4.0);
    }
}
