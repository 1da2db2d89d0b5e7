#![doc = include_str!("../readme.md")]
#![allow(clippy::uninlined_format_args)]
use dyn_clone::DynClone;
use std::any::Any;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Range;

pub mod block_mask;
pub mod date_mask;
pub mod mask_char;
pub mod mask_core;
pub mod multi_mask;
pub mod pattern_mask;
pub mod regex_mask;

mod regex_cache;

pub use block_mask::{Block, BlockMask};
pub use date_mask::DateMask;
pub use mask_char::{CharClass, MaskChar, Transformation};
pub use mask_core::{EditSnapshot, MaskCore};
pub use multi_mask::{MaskOption, MultiMask, OptionDetected};
pub use pattern_mask::PatternMask;
pub use regex_mask::RegexMask;

/// Configuration errors.
///
/// These only occur when a mask is constructed or reshaped.
/// Editing never fails, invalid input is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MaskError {
    /// A block mask needs at least one block.
    NoBlocks,
    /// Block with `min > max` or `max == 0`.
    ///
    /// Contains the mask char, min and max in that order.
    InvalidBlock(char, usize, usize),
    /// The regex didn't compile.
    ///
    /// Contains the pattern and the message of the regex crate.
    InvalidRegex(String, String),
    /// The date format can't be used for a date mask.
    InvalidDateFormat(String),
}

impl Display for MaskError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Error for MaskError {}

/// Splits the text at the given char position.
///
/// The position is clamped to `0..=len`, so a negative position
/// gives `("", text)` and anything past the end gives `(text, "")`.
pub fn split_at(text: &str, pos: isize) -> (&str, &str) {
    if pos <= 0 {
        return ("", text);
    }
    match text.char_indices().nth(pos as usize) {
        Some((byte, _)) => text.split_at(byte),
        None => (text, ""),
    }
}

/// Common interface of all masks.
///
/// A mask is an editing state machine. It owns the text, the caret
/// and the selection and enforces some format while the user types.
///
/// The caller forwards the raw input to [Mask::insert], sets
/// caret and selection before [Mask::delete] and [Mask::backspace],
/// and reads back [Mask::text], [Mask::cursor] and [Mask::selection]
/// afterwards. The mask is the source of truth for all of them.
///
/// All positions are char positions.
///
/// The edit functions return true if the text, the caret or the
/// selection changed.
pub trait Mask: DynClone + Debug + Display {
    /// Edit state.
    fn core(&self) -> &MaskCore;

    /// Edit state.
    fn core_mut(&mut self) -> &mut MaskCore;

    /// The mask definition. A template, a regex or the compiled regex
    /// of a block mask.
    fn mask(&self) -> &str;

    /// Character used for unfilled positions.
    fn placeholder(&self) -> Option<char> {
        None
    }

    /// Insert the input at the caret. Replaces the selection if any.
    ///
    /// Characters that don't fit are dropped, newlines and other
    /// control characters are always dropped.
    fn insert(&mut self, input: &str) -> bool;

    /// Remove the char at the caret or the selection.
    fn delete(&mut self) -> bool;

    /// Remove the char before the caret or the selection.
    fn backspace(&mut self) -> bool;

    /// Reset to empty.
    fn clear(&mut self) -> bool;

    /// Replace the text as if it was typed into an empty mask.
    fn set_text(&mut self, text: &str) -> bool {
        let before = self.core().snapshot();
        self.clear();
        self.insert(text);
        self.core().changed_since(&before)
    }

    /// Text without placeholders. Delimiters are removed too,
    /// if the mask is configured for it.
    fn clean_text(&self) -> String;

    /// Takes over the shape of the other mask, if it is of the same kind.
    /// The current text is validated against the new shape, the caret
    /// and the selection stay where they are as far as possible.
    ///
    /// None or a different kind of mask change nothing.
    fn update_from(&mut self, other: Option<&dyn Mask>);

    /// For [Mask::update_from].
    fn as_any(&self) -> &dyn Any;

    /// Current text.
    #[inline]
    fn text(&self) -> &str {
        self.core().text()
    }

    /// Length in chars.
    #[inline]
    fn len(&self) -> usize {
        self.core().len()
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.core().is_empty()
    }

    /// Caret position.
    #[inline]
    fn cursor(&self) -> usize {
        self.core().cursor()
    }

    /// Set the caret. This drops the selection.
    #[inline]
    fn set_cursor(&mut self, pos: usize) -> bool {
        self.core_mut().set_cursor(pos)
    }

    /// Selection, ordered and clamped to the text.
    #[inline]
    fn selection(&self) -> Option<Range<usize>> {
        self.core().selection()
    }

    /// Set the selection. The order of anchor and cursor doesn't matter.
    #[inline]
    fn set_selection(&mut self, anchor: usize, cursor: usize) -> bool {
        self.core_mut().set_selection(anchor, cursor)
    }

    #[inline]
    fn clear_selection(&mut self) -> bool {
        self.core_mut().clear_selection()
    }

    #[inline]
    fn has_selection(&self) -> bool {
        self.core().has_selection()
    }

    #[inline]
    fn selected_text(&self) -> &str {
        self.core().selected_text()
    }
}

dyn_clone::clone_trait_object!(Mask);

/// Display shows the text with the caret as `|` or
/// the selection as `[...]`.
macro_rules! impl_mask_display {
    ($ty:ty) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt($crate::Mask::core(self), f)
            }
        }
    };
}
pub(crate) use impl_mask_display;

#[cfg(test)]
mod tests {
    use super::split_at;

    #[test]
    fn test_split_at() {
        assert_eq!(split_at("abc", -1), ("", "abc"));
        assert_eq!(split_at("abc", 0), ("", "abc"));
        assert_eq!(split_at("abc", 1), ("a", "bc"));
        assert_eq!(split_at("abc", 3), ("abc", ""));
        assert_eq!(split_at("abc", 4), ("abc", ""));
        assert_eq!(split_at("", 2), ("", ""));
        assert_eq!(split_at("äöü", 2), ("äö", "ü"));
    }
}
