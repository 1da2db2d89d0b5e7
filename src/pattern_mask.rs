//! Mask defined by a template string.
//!
//! * The template consists of mask chars and delimiters:
//!   * `0`: digit
//!   * `a`: letter
//!   * `*`: letter or digit
//!   * everything else is a delimiter.
//!
//!   The mask chars can be replaced with [PatternMask::with_mask_chars].
//!
//! * Delimiters are written when the next accepted char needs them.
//!   Typing a delimiter writes it as well.
//! * Input that doesn't fit is dropped. Input beyond the end of the
//!   template is dropped.
//! * With a placeholder the text always has the full length of the template,
//!   unfilled positions show the placeholder.
//!
//! ```rust
//! use rat_mask::{Mask, PatternMask};
//!
//! let mut mask = PatternMask::new("(000) 000-0000");
//! mask.insert("5551234567");
//! assert_eq!(mask.text(), "(555) 123-4567");
//! ```

use crate::mask_char::{MaskChar, Transformation, find_mask_char};
use crate::mask_core::MaskCore;
use crate::{Mask, impl_mask_display};
use log::debug;
use std::any::Any;

/// Mask defined by a template string.
#[derive(Debug, Clone)]
pub struct PatternMask {
    core: MaskCore,
    mask: String,
    /// The template as chars.
    pattern: Vec<char>,
    mask_chars: Vec<MaskChar>,
    placeholder: Option<char>,
    clean_delimiters: bool,
    transformation: Option<Transformation>,
}

impl_mask_display!(PatternMask);

impl PatternMask {
    /// New mask with the default mask chars.
    pub fn new(mask: impl Into<String>) -> Self {
        let mask = mask.into();
        Self {
            core: MaskCore::new(),
            pattern: mask.chars().collect(),
            mask,
            mask_chars: MaskChar::defaults(),
            placeholder: None,
            clean_delimiters: false,
            transformation: None,
        }
    }

    /// Show unfilled positions with this char.
    pub fn with_placeholder(mut self, placeholder: char) -> Self {
        self.set_placeholder(Some(placeholder));
        self
    }

    /// Remove delimiters from [Mask::clean_text].
    pub fn with_clean_delimiters(mut self, clean: bool) -> Self {
        self.clean_delimiters = clean;
        self
    }

    /// Map every accepted char.
    pub fn with_transformation(mut self, transformation: Transformation) -> Self {
        self.set_transformation(Some(transformation));
        self
    }

    /// Replace the mask chars.
    pub fn with_mask_chars(mut self, mask_chars: Vec<MaskChar>) -> Self {
        self.set_mask_chars(mask_chars);
        self
    }

    /// Change the template. The text is validated against the new template.
    pub fn set_mask(&mut self, mask: impl Into<String>) {
        let old_placeholder = self.placeholder;
        self.switch_mask(mask.into());
        self.revalidate(old_placeholder);
    }

    /// Change the placeholder. The text is validated again.
    pub fn set_placeholder(&mut self, placeholder: Option<char>) {
        let old_placeholder = self.placeholder;
        self.placeholder = placeholder;
        self.revalidate(old_placeholder);
    }

    /// Change the mask chars. The text is validated again.
    pub fn set_mask_chars(&mut self, mask_chars: Vec<MaskChar>) {
        self.mask_chars = mask_chars;
        self.revalidate(self.placeholder);
    }

    /// Change the transformation. The text is validated again.
    pub fn set_transformation(&mut self, transformation: Option<Transformation>) {
        self.transformation = transformation;
        self.revalidate(self.placeholder);
    }

    pub fn set_clean_delimiters(&mut self, clean: bool) {
        self.clean_delimiters = clean;
    }

    pub fn clean_delimiters(&self) -> bool {
        self.clean_delimiters
    }

    pub fn mask_chars(&self) -> &[MaskChar] {
        &self.mask_chars
    }

    pub fn transformation(&self) -> Option<Transformation> {
        self.transformation
    }

    /// Is this position of the template a delimiter?
    /// Positions past the end are not.
    pub fn is_delimiter_at(&self, pos: usize) -> bool {
        match self.pattern.get(pos) {
            Some(c) => find_mask_char(&self.mask_chars, *c).is_none(),
            None => false,
        }
    }

    /// All positions of the template are filled.
    pub fn is_complete(&self) -> bool {
        let chars = self.core.chars();
        chars.len() == self.pattern.len()
            && chars
                .iter()
                .enumerate()
                .all(|(i, c)| self.is_delimiter_at(i) || Some(*c) != self.placeholder)
    }

    /// The template as chars.
    pub(crate) fn pattern(&self) -> &[char] {
        &self.pattern
    }

    /// Change the template and leave the text as it is.
    pub(crate) fn switch_mask(&mut self, mask: String) {
        self.pattern = mask.chars().collect();
        self.mask = mask;
    }

    #[inline]
    fn transform(&self, c: char) -> char {
        match self.transformation {
            Some(t) => t(c),
            None => c,
        }
    }

    /// Walks the template starting at offset and returns the chars of
    /// the input that fit, together with the delimiters in between.
    ///
    /// Delimiters are only written if an accepted char follows them,
    /// or if the input contains the delimiter itself.
    fn align(&self, input: impl IntoIterator<Item = char>, offset: usize) -> Vec<char> {
        let mut aligned = Vec::new();
        let mut pos = offset;
        // delimiters passed over but not yet written
        let mut pending = 0;

        'input: for c in input {
            if c.is_control() {
                continue;
            }
            loop {
                let Some(m) = self.pattern.get(pos).copied() else {
                    // no place for this one
                    pos -= pending;
                    pending = 0;
                    if pos >= self.pattern.len() {
                        break 'input;
                    } else {
                        continue 'input;
                    }
                };

                match find_mask_char(&self.mask_chars, m) {
                    None => {
                        pos += 1;
                        pending += 1;
                        if c == m {
                            aligned.extend_from_slice(&self.pattern[pos - pending..pos]);
                            pending = 0;
                            continue 'input;
                        }
                    }
                    Some(mask_char) => {
                        if mask_char.is_match(c) {
                            aligned.extend_from_slice(&self.pattern[pos - pending..pos]);
                            aligned.push(self.transform(c));
                            pos += 1;
                        } else {
                            pos -= pending;
                        }
                        pending = 0;
                        continue 'input;
                    }
                }
            }
        }

        aligned
    }

    /// Data chars starting at the given position.
    /// Skips delimiters and placeholders.
    fn data_chars(&self, chars: &[char], from: usize) -> Vec<char> {
        chars
            .iter()
            .enumerate()
            .skip(from)
            .filter(|(i, c)| !self.is_delimiter_at(*i) && Some(**c) != self.placeholder)
            .map(|(_, c)| *c)
            .collect()
    }

    /// Pad with placeholders up to the length of the template.
    fn fill(&self, chars: &mut Vec<char>) {
        if let Some(placeholder) = self.placeholder {
            for i in chars.len()..self.pattern.len() {
                if self.is_delimiter_at(i) {
                    chars.push(self.pattern[i]);
                } else {
                    chars.push(placeholder);
                }
            }
        }
    }

    fn commit(&mut self, mut chars: Vec<char>, cursor: usize) {
        self.fill(&mut chars);
        self.core.replace(chars.into_iter().collect(), cursor);
    }

    /// Remove start..end and move the data after it to the left.
    /// Places the caret at start.
    fn remove_range(&mut self, start: usize, end: usize) {
        let mut chars = self.core.chars();
        let after = self.data_chars(&chars, end);
        chars.truncate(start);
        chars.extend(self.align(after, start));
        self.commit(chars, start);
    }

    /// Validate the current text from scratch.
    fn revalidate(&mut self, old_placeholder: Option<char>) {
        let input = self
            .core
            .text()
            .chars()
            .filter(|c| Some(*c) != old_placeholder)
            .collect::<Vec<_>>();
        let mut chars = self.align(input, 0);
        self.fill(&mut chars);
        self.core.replace_text(chars.into_iter().collect());
    }
}

impl Mask for PatternMask {
    fn core(&self) -> &MaskCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut MaskCore {
        &mut self.core
    }

    fn mask(&self) -> &str {
        self.mask.as_str()
    }

    fn placeholder(&self) -> Option<char> {
        self.placeholder
    }

    fn insert(&mut self, input: &str) -> bool {
        let before = self.core.snapshot();

        let (start, end) = match self.core.selection() {
            Some(range) => (range.start, range.end),
            None => (self.core.cursor(), self.core.cursor()),
        };

        let mut chars = self.core.chars();
        let after = self.data_chars(&chars, end);
        chars.truncate(start);

        let aligned = self.align(input.chars(), start);
        let cursor = start + aligned.len();
        chars.extend(aligned);
        chars.extend(self.align(after, cursor));

        self.commit(chars, cursor);
        self.core.changed_since(&before)
    }

    fn delete(&mut self) -> bool {
        let before = self.core.snapshot();

        if let Some(range) = self.core.selection() {
            self.remove_range(range.start, range.end);
        } else {
            let pos = self.core.cursor();
            let len = self.core.len();
            if pos >= len {
                return false;
            }
            // delete the next data char, not a delimiter
            let mut end = pos;
            while end < len && self.is_delimiter_at(end) {
                end += 1;
            }
            self.remove_range(pos, (end + 1).min(len));
        }

        self.core.changed_since(&before)
    }

    fn backspace(&mut self) -> bool {
        let before = self.core.snapshot();

        if let Some(range) = self.core.selection() {
            self.remove_range(range.start, range.end);
        } else {
            let pos = self.core.cursor();
            if pos == 0 {
                return false;
            }
            // skip delimiters left of the caret
            let mut start = pos;
            while start > 0 && self.is_delimiter_at(start - 1) {
                start -= 1;
            }
            self.remove_range(start.saturating_sub(1), pos);
        }

        self.core.changed_since(&before)
    }

    fn clear(&mut self) -> bool {
        let before = self.core.snapshot();
        self.commit(Vec::new(), 0);
        self.core.changed_since(&before)
    }

    fn clean_text(&self) -> String {
        self.core
            .text()
            .chars()
            .enumerate()
            .filter(|(i, c)| {
                if self.is_delimiter_at(*i) {
                    !self.clean_delimiters
                } else {
                    Some(*c) != self.placeholder
                }
            })
            .map(|(_, c)| c)
            .collect()
    }

    fn update_from(&mut self, other: Option<&dyn Mask>) {
        let Some(other) = other else {
            return;
        };
        let Some(other) = other.as_any().downcast_ref::<PatternMask>() else {
            debug!("pattern-mask can't update from {:?}", other);
            return;
        };

        let old_placeholder = self.placeholder;
        self.mask = other.mask.clone();
        self.pattern = other.pattern.clone();
        self.mask_chars = other.mask_chars.clone();
        self.placeholder = other.placeholder;
        self.clean_delimiters = other.clean_delimiters;
        self.transformation = other.transformation;
        self.revalidate(old_placeholder);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::PatternMask;

    #[test]
    fn test_align() {
        let mask = PatternMask::new("(aa) 00-0");
        assert_eq!(mask.align("ab123".chars(), 0), "(ab) 12-3".chars().collect::<Vec<_>>());
        assert_eq!(mask.align("ab".chars(), 0), "(ab".chars().collect::<Vec<_>>());
        // rejected chars don't leave delimiters behind
        assert_eq!(mask.align("abx".chars(), 0), "(ab".chars().collect::<Vec<_>>());
        // typed delimiters are written
        assert_eq!(mask.align("ab)".chars(), 0), "(ab)".chars().collect::<Vec<_>>());
        // offset into the template
        assert_eq!(mask.align("12".chars(), 3), ") 12".chars().collect::<Vec<_>>());
        // overflow
        assert_eq!(mask.align("ab1234".chars(), 0), "(ab) 12-3".chars().collect::<Vec<_>>());
    }

    #[test]
    fn test_data_chars() {
        let mask = PatternMask::new("00-00").with_placeholder('_');
        let chars = "1_-3_".chars().collect::<Vec<_>>();
        assert_eq!(mask.data_chars(&chars, 0), vec!['1', '3']);
        assert_eq!(mask.data_chars(&chars, 2), vec!['3']);
    }
}
