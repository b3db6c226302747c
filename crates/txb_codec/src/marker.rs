//! Conversion between clean text with a border list and text with inline markers.
//!
//! A border spanning `"ab"` with color 3 and font 1 is written as `[c]ab[/c=3;1]`.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::MarkerError;
use crate::types::Border;

/// Opening marker
pub const OPEN_TAG: &str = "[c]";

static TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[c\]|\[/c=(\d+);(\d+)\]").expect("marker tag pattern is valid")
});

fn close_tag(border: &Border) -> String {
    format!("[/c={};{}]", border.color, border.font)
}

/// Insert inline markers for `spans` into `text`.
///
/// Spans are ordered by start, outer spans first, so nested spans produce nested markers.
/// Positions past the end of the text are clamped to the end.
pub fn embed(text: &str, spans: &[Border]) -> String {
    if spans.is_empty() {
        return text.to_owned();
    }

    let mut order: Vec<&Border> = spans.iter().collect();
    order.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    // (gap before which the opening goes, gap before which the closing goes)
    let gaps: Vec<(usize, usize)> = order
        .iter()
        .map(|b| {
            let open = (b.start as usize).min(len);
            let close = (b.end as usize + 1).min(len).max(open);
            (open, close)
        })
        .collect();

    let mut out = String::with_capacity(text.len() + spans.len() * 16);
    for gap in 0..=len {
        for (border, &(open, close)) in order.iter().zip(&gaps).rev() {
            if close == gap && open < gap {
                out.push_str(&close_tag(border));
            }
        }

        for (border, &(open, close)) in order.iter().zip(&gaps) {
            if open == gap {
                out.push_str(OPEN_TAG);
                if close == gap {
                    out.push_str(&close_tag(border));
                }
            }
        }

        if let Some(c) = chars.get(gap) {
            out.push(*c);
        }
    }

    out
}

fn attribute(value: &str) -> Result<u8, MarkerError> {
    value.parse().map_err(|_| MarkerError::InvalidAttribute {
        value: value.to_owned(),
    })
}

fn position(value: usize) -> Result<u16, MarkerError> {
    u16::try_from(value)
        .ok()
        .filter(|p| *p < u16::MAX)
        .ok_or(MarkerError::OutOfRange { position: value })
}

/// Strip inline markers from `annotated`, returning the clean text and the borders they described.
///
/// Each closing tag pairs with the nearest unclosed `[c]`, so the nested markers written by
/// [`embed`] come back as the same spans. Tags without a partner and pairs enclosing no
/// text are dropped. Borders are ordered like [`embed`] orders them, with zeroed reserved bytes.
pub fn extract(annotated: &str) -> Result<(String, Vec<Border>), MarkerError> {
    let mut clean = String::with_capacity(annotated.len());
    let mut chars = 0usize;
    let mut last = 0usize;
    let mut borders = Vec::new();
    // character positions of `[c]` tags still waiting for their closing tag
    let mut open = Vec::new();

    for captures in TAG.captures_iter(annotated) {
        let Some(tag) = captures.get(0) else {
            continue;
        };

        let before = &annotated[last..tag.start()];
        clean.push_str(before);
        chars += before.chars().count();
        last = tag.end();

        let (Some(color), Some(font)) = (captures.get(1), captures.get(2)) else {
            open.push(chars);
            continue;
        };

        let Some(start) = open.pop() else {
            debug!(position = chars, tag = tag.as_str(), "dropping stray closing marker");
            continue;
        };
        if start == chars {
            debug!(position = chars, "dropping empty marker pair");
            continue;
        }

        borders.push(Border::new(
            position(start)?,
            position(chars - 1)?,
            attribute(color.as_str())?,
            attribute(font.as_str())?,
            [0, 0],
        ));
    }

    clean.push_str(&annotated[last..]);
    if !open.is_empty() {
        debug!(count = open.len(), "dropping stray opening markers");
    }

    borders.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
    Ok((clean, borders))
}

/// Whether `annotated` contains an opening marker anywhere.
pub fn has_markers(annotated: &str) -> bool {
    annotated.contains(OPEN_TAG)
}
