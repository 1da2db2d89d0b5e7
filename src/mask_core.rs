//!
//! Edit state shared by all masks.
//!

use std::fmt;
use std::fmt::{Display, Formatter};
use std::ops::Range;

/// Text, caret and selection of a mask.
///
/// Positions are char positions. The caret is always in `0..=len`.
/// The selection is kept as it was set and normalized when read.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MaskCore {
    text: String,
    len: usize,
    cursor: usize,
    selection: Option<(usize, usize)>,
}

/// Copy of the edit state.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EditSnapshot {
    pub text: String,
    pub cursor: usize,
    pub selection: Option<(usize, usize)>,
}

impl MaskCore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text.
    #[inline]
    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    /// Length in chars.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Caret position.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Set the caret. Clamps to the text and drops the selection.
    pub fn set_cursor(&mut self, pos: usize) -> bool {
        let old_cursor = self.cursor;
        let old_selection = self.selection;
        self.cursor = pos.min(self.len);
        self.selection = None;
        old_cursor != self.cursor || old_selection.is_some()
    }

    /// Selection, ordered and clamped to the text.
    /// An empty selection is no selection.
    pub fn selection(&self) -> Option<Range<usize>> {
        let (anchor, cursor) = self.selection?;
        let anchor = anchor.min(self.len);
        let cursor = cursor.min(self.len);
        let range = anchor.min(cursor)..anchor.max(cursor);
        if range.is_empty() { None } else { Some(range) }
    }

    /// Set the selection. The caret goes to the cursor side.
    pub fn set_selection(&mut self, anchor: usize, cursor: usize) -> bool {
        let old_cursor = self.cursor;
        let old_selection = self.selection;
        self.selection = Some((anchor, cursor));
        self.cursor = cursor.min(self.len);
        old_cursor != self.cursor || old_selection != self.selection
    }

    pub fn clear_selection(&mut self) -> bool {
        self.selection.take().is_some()
    }

    #[inline]
    pub fn has_selection(&self) -> bool {
        self.selection().is_some()
    }

    /// Selected part of the text.
    pub fn selected_text(&self) -> &str {
        match self.selection() {
            Some(range) => self.str_slice(range),
            None => "",
        }
    }

    /// Text for a char range.
    pub fn str_slice(&self, range: Range<usize>) -> &str {
        let start = byte_pos(&self.text, range.start);
        let end = byte_pos(&self.text, range.end);
        &self.text[start..end]
    }

    /// The text as chars.
    pub(crate) fn chars(&self) -> Vec<char> {
        self.text.chars().collect()
    }

    /// New text and caret. Drops the selection.
    pub(crate) fn replace(&mut self, text: String, cursor: usize) {
        self.len = text.chars().count();
        self.text = text;
        self.cursor = cursor.min(self.len);
        self.selection = None;
    }

    /// New text. Caret and selection stay.
    pub(crate) fn replace_text(&mut self, text: String) {
        self.len = text.chars().count();
        self.text = text;
        self.cursor = self.cursor.min(self.len);
    }

    /// Copy of the edit state.
    pub fn snapshot(&self) -> EditSnapshot {
        EditSnapshot {
            text: self.text.clone(),
            cursor: self.cursor,
            selection: self.selection,
        }
    }

    /// Reset to a copy of the edit state.
    pub fn restore(&mut self, snapshot: EditSnapshot) {
        self.len = snapshot.text.chars().count();
        self.text = snapshot.text;
        self.cursor = snapshot.cursor.min(self.len);
        self.selection = snapshot.selection;
    }

    /// Anything changed since the snapshot?
    pub fn changed_since(&self, snapshot: &EditSnapshot) -> bool {
        self.text != snapshot.text
            || self.cursor != snapshot.cursor
            || self.selection != snapshot.selection
    }
}

impl Display for MaskCore {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.selection() {
            None => {
                write!(
                    f,
                    "{}|{}",
                    self.str_slice(0..self.cursor),
                    self.str_slice(self.cursor..self.len)
                )
            }
            Some(range) => {
                write!(
                    f,
                    "{}[{}]{}",
                    self.str_slice(0..range.start),
                    self.str_slice(range.clone()),
                    self.str_slice(range.end..self.len)
                )
            }
        }
    }
}

/// Byte position of a char position. Clamps to the end of the text.
pub(crate) fn byte_pos(text: &str, pos: usize) -> usize {
    text.char_indices()
        .nth(pos)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}
