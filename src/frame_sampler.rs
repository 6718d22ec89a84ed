use serde::Serialize;

use crate::active_span::{ActiveSpan, ResolverOptions, resolve};
use crate::types::LyricsDocument;

/// 单帧的定位结果。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameSample {
    pub frame: u64,
    pub time: f64,
    pub span: Option<ActiveSpan>,
}

/// 按固定帧率逐帧定位当前行和当前词，供导出视频时使用。
///
/// 帧 `n` 的时间为 `n / fps`，共 `ceil(duration * fps)` 帧。
pub struct FrameSampler<'a> {
    doc: &'a LyricsDocument,
    options: ResolverOptions,
    fps: f64,
    frame: u64,
    total_frames: u64,
}

impl<'a> FrameSampler<'a> {
    pub fn new(doc: &'a LyricsDocument, fps: f64, duration: f64, options: ResolverOptions) -> Self {
        let total_frames = if fps.is_finite() && fps > 0.0 && duration.is_finite() && duration > 0.0
        {
            (duration * fps).ceil() as u64
        } else {
            0
        };
        Self {
            doc,
            options,
            fps,
            frame: 0,
            total_frames,
        }
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }
}

impl Iterator for FrameSampler<'_> {
    type Item = FrameSample;

    fn next(&mut self) -> Option<Self::Item> {
        if self.frame >= self.total_frames {
            return None;
        }
        let frame = self.frame;
        self.frame += 1;
        let time = frame as f64 / self.fps;
        Some(FrameSample {
            frame,
            time,
            span: resolve(self.doc, time, &self.options),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.total_frames - self.frame).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}
