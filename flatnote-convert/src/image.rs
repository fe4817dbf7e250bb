//! Image width normalization.
//!
//! An image resized by the author carries an inline tag with both its
//! display width and the width of its container, e.g.
//! `{: style="width: 10000px;" parent-style="width: 21%;"}`. Rendered flat,
//! the percentage-of-container width comes out visually smaller than it was
//! in the nested source, so the percentage is bumped by a fixed adjustment
//! and the tag collapses to the single corrected width. Images never
//! resized carry no such tag and are left alone.

use crate::{
    CancelToken, Error,
    patterns::{IMAGE_PARENT_WIDTH, IMAGE_SIZE_TAG, IMAGE_STYLE_WIDTH},
};

pub(crate) fn adjust_image_widths(
    buffer: String,
    adjust: f64,
    cancel: &CancelToken,
) -> Result<String, Error> {
    cancel.check()?;
    let found: Vec<String> = IMAGE_SIZE_TAG
        .find_iter(&buffer)
        .map(|m| m.as_str().to_string())
        .collect();
    let mut buffer = buffer;
    for tag_text in found {
        cancel.check()?;
        let Some(caps) = IMAGE_PARENT_WIDTH.captures(&tag_text) else {
            continue;
        };
        let whole = caps.get(0).map_or("", |m| m.as_str());
        let parent_width = caps.get(1).map_or("", |m| m.as_str());
        if !IMAGE_STYLE_WIDTH.is_match(whole) {
            continue;
        }
        // Only percentage container widths render smaller when flattened;
        // fixed-unit widths keep their meaning and stay untouched.
        if !parent_width.contains('%') {
            continue;
        }
        let digits = parent_width.replace('%', "");
        let Ok(width) = digits.trim().parse::<f64>() else {
            tracing::warn!(width = %parent_width, "unparseable image width, left untouched");
            continue;
        };
        let corrected = format!("{{: style=\"width: {}%;\"}}", width + adjust);
        tracing::debug!(old = %whole, new = %corrected, "image width adjusted");
        buffer = buffer.replacen(whole, &corrected, 1);
    }
    Ok(buffer)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn adjusted(buffer: &str, adjust: f64) -> String {
        adjust_image_widths(buffer.to_string(), adjust, &CancelToken::new()).unwrap()
    }

    #[test]
    fn percentage_parent_width_is_bumped() {
        let buffer = "![1](assets/1.png){: style=\"width: 10000px;\" parent-style=\"width: 21%;\"}";
        assert_eq!(
            adjusted(buffer, 20.0),
            "![1](assets/1.png){: style=\"width: 41%;\"}"
        );
    }

    #[test]
    fn field_order_does_not_matter() {
        let buffer = "![1](a.png){: parent-style=\"width: 30%;\" style=\"width: 482px;\"}";
        assert_eq!(adjusted(buffer, 20.0), "![1](a.png){: style=\"width: 50%;\"}");
    }

    #[test]
    fn fixed_unit_parent_width_is_untouched() {
        let buffer = "![1](a.png){: style=\"width: 482px;\" parent-style=\"width: 300px;\"}";
        assert_eq!(adjusted(buffer, 20.0), buffer);
    }

    #[test]
    fn unresized_images_carry_no_tag_and_pass_through() {
        let buffer = "![3](assets/3.png)";
        assert_eq!(adjusted(buffer, 20.0), buffer);
    }

    #[test]
    fn fractional_widths_keep_their_fraction() {
        let buffer = "![1](a.png){: style=\"width: 10px;\" parent-style=\"width: 21.5%;\"}";
        assert_eq!(adjusted(buffer, 20.0), "![1](a.png){: style=\"width: 41.5%;\"}");
    }
}
