use crate::domain::model::GifInfo;
use regex::Regex;
use std::sync::LazyLock;

static LOGICAL_SCREEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"logical screen (\d+)x(\d+)").unwrap());
static IMAGE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\+ image #\d+(?:\s+(\d+)x(\d+))?").unwrap());
static COLOR_TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"color table \[(\d+)\]").unwrap());

/// 解析 `gifsicle --info` 的輸出
///
/// 影格數是 `+ image #` 行數 (至少 1)；尺寸取 logical screen，
/// 沒有的話退而求其次取第一張影像的尺寸；色數取所有色表中最大者。
/// 什麼都讀不到時回傳 None。
pub fn parse_info(output: &str) -> Option<GifInfo> {
    let mut frames = 0usize;
    let mut screen: Option<(u32, u32)> = None;
    let mut first_image: Option<(u32, u32)> = None;
    let mut colors: Option<u32> = None;

    for line in output.lines() {
        if let Some(caps) = LOGICAL_SCREEN.captures(line) {
            if screen.is_none() {
                screen = parse_pair(caps.get(1), caps.get(2));
            }
        }

        if let Some(caps) = IMAGE_LINE.captures(line) {
            frames += 1;
            if first_image.is_none() {
                first_image = parse_pair(caps.get(1), caps.get(2));
            }
        }

        if let Some(caps) = COLOR_TABLE.captures(line) {
            if let Ok(count) = caps[1].parse::<u32>() {
                colors = Some(colors.map_or(count, |c| c.max(count)));
            }
        }
    }

    let dimensions = screen.or(first_image);
    if frames == 0 && dimensions.is_none() && colors.is_none() {
        return None;
    }

    Some(GifInfo {
        frames: frames.max(1),
        width: dimensions.map(|(w, _)| w),
        height: dimensions.map(|(_, h)| h),
        colors,
    })
}

fn parse_pair(a: Option<regex::Match<'_>>, b: Option<regex::Match<'_>>) -> Option<(u32, u32)> {
    let a = a?.as_str().parse().ok()?;
    let b = b?.as_str().parse().ok()?;
    Some((a, b))
}
