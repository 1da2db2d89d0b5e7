//!
//! Date mask using [chrono](https://docs.rs/chrono/latest/chrono/)
//! for the calendar.
//!
//! The format uses `yyyy` or `yy` for the year, `MM` for the month
//! and `dd` for the day. Everything else is a delimiter. Other
//! chars for year, month and day can be set with [DateMask::with_chars].
//!
//! While typing the mask keeps the date valid:
//! * A month above 12 becomes 12, a month or day of 00 becomes 01.
//! * A first month digit above 1 or a first day digit above 3 completes
//!   the field with a leading 0.
//! * The day is clamped to the length of the month as far as
//!   month and year are known. If the year comes after the day,
//!   a 29th of February is corrected when the year is complete.
//! * Two-digit years are taken as 20yy.
//!
//! Typing writes over the digits at the caret. Delete and backspace
//! remove one digit and close the gap inside its field only, a
//! selection is emptied in place. The other fields never move.
//! Without a placeholder empty positions inside the text show as a
//! space.
//!
//! ```rust
//! use rat_mask::{DateMask, Mask};
//!
//! let mut mask = DateMask::new("yyyy-MM-dd").unwrap();
//! mask.insert("0001 02 29");
//! assert_eq!(mask.text(), "0001-02-28");
//! ```

use crate::mask_char::MaskChar;
use crate::mask_core::{EditSnapshot, MaskCore};
use crate::pattern_mask::PatternMask;
use crate::{Mask, MaskError, impl_mask_display};
use chrono::format::{Item, Numeric, Pad, StrftimeItems};
use chrono::{Datelike, NaiveDate};
use log::debug;
use std::any::Any;
use std::mem;
use std::ops::Range;

/// Empty position when there is no placeholder.
const HOLE: char = ' ';

/// Positions of year, month and day in the format.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct DateFields {
    year: Option<Range<usize>>,
    month: Option<Range<usize>>,
    day: Option<Range<usize>>,
}

/// Date mask.
#[derive(Debug, Clone)]
pub struct DateMask {
    inner: PatternMask,
    year_char: char,
    month_char: char,
    day_char: char,
    fields: DateFields,
}

impl_mask_display!(DateMask);

impl DateMask {
    /// New mask for a format with `y`, `M` and `d`.
    pub fn new(format: &str) -> Result<Self, MaskError> {
        Self::with_chars(format, 'y', 'M', 'd')
    }

    /// New mask with other chars for year, month and day.
    ///
    /// ```rust
    /// use rat_mask::{DateMask, Mask};
    ///
    /// let mut mask = DateMask::with_chars("TT.MM.JJJJ", 'J', 'M', 'T').unwrap();
    /// mask.insert("31042024");
    /// assert_eq!(mask.text(), "30.04.2024");
    /// ```
    pub fn with_chars(
        format: &str,
        year_char: char,
        month_char: char,
        day_char: char,
    ) -> Result<Self, MaskError> {
        let fields = parse_fields(format, year_char, month_char, day_char)?;
        let inner = PatternMask::new(format).with_mask_chars(vec![
            MaskChar::digit(year_char),
            MaskChar::digit(month_char),
            MaskChar::digit(day_char),
        ]);
        Ok(Self {
            inner,
            year_char,
            month_char,
            day_char,
            fields,
        })
    }

    /// New mask from a chrono format string.
    ///
    /// Supports `%Y`, `%y`, `%m`, `%d` and literals.
    pub fn from_strftime(pattern: &str) -> Result<Self, MaskError> {
        let invalid = || MaskError::InvalidDateFormat(pattern.to_string());

        let items = StrftimeItems::new(pattern).parse().map_err(|_| invalid())?;
        let mut format = String::new();
        for item in &items {
            match item {
                Item::Literal(s) | Item::Space(s) => push_literal(&mut format, s, pattern)?,
                Item::OwnedLiteral(s) | Item::OwnedSpace(s) => {
                    push_literal(&mut format, s, pattern)?
                }
                Item::Numeric(Numeric::Year, Pad::Zero) => format.push_str("yyyy"),
                Item::Numeric(Numeric::YearMod100, Pad::Zero) => format.push_str("yy"),
                Item::Numeric(Numeric::Month, Pad::Zero) => format.push_str("MM"),
                Item::Numeric(Numeric::Day, Pad::Zero) => format.push_str("dd"),
                _ => return Err(invalid()),
            }
        }
        Self::new(&format)
    }

    /// Show unfilled positions with this char.
    pub fn with_placeholder(mut self, placeholder: char) -> Self {
        let fields = self.fields.clone();
        self.reshape(fields, |inner| inner.set_placeholder(Some(placeholder)));
        self
    }

    /// Remove delimiters from [Mask::clean_text].
    pub fn with_clean_delimiters(mut self, clean: bool) -> Self {
        self.inner.set_clean_delimiters(clean);
        self
    }

    /// The date format.
    pub fn format(&self) -> &str {
        self.inner.mask()
    }

    /// The date, if all fields are complete and form a valid date.
    pub fn date(&self) -> Option<NaiveDate> {
        let chars = self.inner.core().chars();
        let year = self.year_value(&chars)?;
        let month = field_value(&chars, self.fields.month.as_ref())?;
        let day = field_value(&chars, self.fields.day.as_ref())?;
        NaiveDate::from_ymd_opt(year, month, day)
    }

    /// Set the text from a date.
    pub fn set_date(&mut self, date: NaiveDate) -> bool {
        let mut text = String::new();
        for (i, c) in self.inner.pattern().iter().copied().enumerate() {
            if let Some(range) = in_field(&self.fields.year, i) {
                let year = if range.len() == 2 {
                    date.year().rem_euclid(100)
                } else {
                    date.year().rem_euclid(10000)
                };
                text.push(digit_at(year as u32, range.len(), i - range.start));
            } else if let Some(range) = in_field(&self.fields.month, i) {
                text.push(digit_at(date.month(), range.len(), i - range.start));
            } else if let Some(range) = in_field(&self.fields.day, i) {
                text.push(digit_at(date.day(), range.len(), i - range.start));
            } else {
                text.push(c);
            }
        }
        self.set_text(&text)
    }

    /// Char for an empty position.
    fn hole(&self) -> char {
        self.inner.placeholder().unwrap_or(HOLE)
    }

    /// Extend with delimiters and holes up to len.
    fn pad(&self, chars: &mut Vec<char>, len: usize) {
        let pattern = self.inner.pattern();
        while chars.len() < len.min(pattern.len()) {
            let pos = chars.len();
            if self.inner.is_delimiter_at(pos) {
                chars.push(pattern[pos]);
            } else {
                chars.push(self.hole());
            }
        }
    }

    /// Type c at pos, overwriting what is there.
    /// Returns the position after it.
    fn write_char(&self, chars: &mut Vec<char>, pos: usize, c: char) -> Option<usize> {
        let pattern = self.inner.pattern();
        let mut pos = pos;
        while self.inner.is_delimiter_at(pos) {
            if pattern[pos] == c {
                self.pad(chars, pos + 1);
                return Some(pos + 1);
            }
            pos += 1;
        }
        if pos >= pattern.len() || !c.is_ascii_digit() {
            return None;
        }

        let early = is_field_start(&self.fields.month, pos) && c > '1'
            || is_field_start(&self.fields.day, pos) && c > '3';
        if early {
            self.pad(chars, pos + 2);
            chars[pos] = '0';
            chars[pos + 1] = c;
            Some(pos + 2)
        } else {
            self.pad(chars, pos + 1);
            chars[pos] = c;
            Some(pos + 1)
        }
    }

    /// Field containing pos.
    fn field_at(&self, pos: usize) -> Range<usize> {
        [&self.fields.year, &self.fields.month, &self.fields.day]
            .into_iter()
            .find_map(|v| in_field(v, pos))
            .cloned()
            .unwrap_or(pos..pos + 1)
    }

    /// Remove the digit at pos. The rest of its field moves left,
    /// the other fields stay where they are.
    fn remove_at(&self, chars: &mut Vec<char>, pos: usize) {
        let end = self.field_at(pos).end;
        self.pad(chars, end);
        chars.copy_within(pos + 1..end, pos);
        chars[end - 1] = self.hole();
    }

    /// Empty all digits in the range.
    fn blank(&self, chars: &mut [char], range: Range<usize>) {
        let hole = self.hole();
        for (pos, c) in chars.iter_mut().enumerate().take(range.end).skip(range.start) {
            if !self.inner.is_delimiter_at(pos) {
                *c = hole;
            }
        }
    }

    /// Without a placeholder trailing holes are cut off.
    fn settle(&self, mut chars: Vec<char>) -> String {
        if self.inner.placeholder().is_some() {
            self.pad(&mut chars, self.inner.pattern().len());
        } else {
            let hole = self.hole();
            let end = chars
                .iter()
                .enumerate()
                .rposition(|(pos, c)| !self.inner.is_delimiter_at(pos) && *c != hole)
                .map_or(0, |v| v + 1);
            let trailing_holes = (end..chars.len()).any(|pos| !self.inner.is_delimiter_at(pos));
            if trailing_holes {
                chars.truncate(end);
            }
        }
        chars.into_iter().collect()
    }

    fn commit(&mut self, chars: Vec<char>, cursor: usize) {
        let text = self.settle(chars);
        self.inner.core_mut().replace(text, cursor);
    }

    /// Change the shape of the mask. Each field keeps its digits,
    /// aligned to the right if the width changes.
    fn reshape(&mut self, fields: DateFields, f: impl FnOnce(&mut PatternMask)) {
        let old = self.inner.core().snapshot();
        let old_chars = old.text.chars().collect::<Vec<_>>();
        let old_hole = self.hole();
        let old_fields = mem::replace(&mut self.fields, fields);

        self.inner.core_mut().replace(String::new(), 0);
        f(&mut self.inner);

        let hole = self.hole();
        let mut chars = Vec::new();
        for (pos, c) in self.inner.pattern().iter().copied().enumerate() {
            if self.inner.is_delimiter_at(pos) {
                chars.push(c);
                continue;
            }
            let moved = [
                (&self.fields.year, &old_fields.year),
                (&self.fields.month, &old_fields.month),
                (&self.fields.day, &old_fields.day),
            ]
            .into_iter()
            .find_map(|(new, old)| {
                let back = in_field(new, pos)?.end - pos;
                let old = old.as_ref()?;
                let old_pos = old.end.checked_sub(back).filter(|v| *v >= old.start)?;
                old_chars.get(old_pos).copied().filter(|v| *v != old_hole)
            });
            chars.push(moved.unwrap_or(hole));
        }
        self.correct(&mut chars);

        let text = self.settle(chars);
        self.inner.core_mut().restore(EditSnapshot {
            text,
            cursor: old.cursor,
            selection: old.selection,
        });
    }

    fn year_value(&self, chars: &[char]) -> Option<i32> {
        let range = self.fields.year.as_ref()?;
        let year = field_value(chars, Some(range))? as i32;
        if range.len() == 2 {
            Some(2000 + year)
        } else {
            Some(year)
        }
    }

    /// Clamp month and day to valid values.
    fn correct(&self, chars: &mut [char]) {
        let mut month = field_value(chars, self.fields.month.as_ref());
        if let (Some(range), Some(m)) = (&self.fields.month, month) {
            let fixed = m.clamp(1, 12);
            if fixed != m {
                debug!("date-mask month {} -> {}", m, fixed);
                write_field(chars, range, fixed);
                month = Some(fixed);
            }
        }

        let year = self.year_value(chars);
        let day = field_value(chars, self.fields.day.as_ref());
        if let (Some(range), Some(d)) = (&self.fields.day, day) {
            let fixed = d.clamp(1, days_in_month(year, month));
            if fixed != d {
                debug!("date-mask day {} -> {}", d, fixed);
                write_field(chars, range, fixed);
            }
        }
    }
}

fn push_literal(format: &mut String, s: &str, pattern: &str) -> Result<(), MaskError> {
    if s.contains(['y', 'M', 'd']) {
        return Err(MaskError::InvalidDateFormat(pattern.to_string()));
    }
    format.push_str(s);
    Ok(())
}

/// Find the fields in the format. Each may occur once.
fn parse_fields(
    format: &str,
    year_char: char,
    month_char: char,
    day_char: char,
) -> Result<DateFields, MaskError> {
    let invalid = || MaskError::InvalidDateFormat(format.to_string());

    let mut fields = DateFields::default();
    let chars = format.chars().collect::<Vec<_>>();
    let mut pos = 0;
    while pos < chars.len() {
        let c = chars[pos];
        let mut end = pos + 1;
        while end < chars.len() && chars[end] == c {
            end += 1;
        }

        let field = if c == year_char {
            if end - pos != 2 && end - pos != 4 {
                return Err(invalid());
            }
            Some(&mut fields.year)
        } else if c == month_char || c == day_char {
            if end - pos != 2 {
                return Err(invalid());
            }
            if c == month_char {
                Some(&mut fields.month)
            } else {
                Some(&mut fields.day)
            }
        } else {
            None
        };
        if let Some(field) = field {
            if field.is_some() {
                return Err(invalid());
            }
            *field = Some(pos..end);
        }

        pos = end;
    }

    if fields == DateFields::default() {
        return Err(invalid());
    }
    Ok(fields)
}

#[inline]
fn in_field(field: &Option<Range<usize>>, pos: usize) -> Option<&Range<usize>> {
    field.as_ref().filter(|v| v.contains(&pos))
}

#[inline]
fn is_field_start(field: &Option<Range<usize>>, pos: usize) -> bool {
    field.as_ref().is_some_and(|v| v.start == pos)
}

/// Value of a field if all of its digits are there.
fn field_value(chars: &[char], field: Option<&Range<usize>>) -> Option<u32> {
    let field = field?;
    let digits = chars.get(field.clone())?;
    let mut value = 0;
    for c in digits {
        value = value * 10 + c.to_digit(10)?;
    }
    Some(value)
}

fn write_field(chars: &mut [char], field: &Range<usize>, value: u32) {
    for (i, pos) in field.clone().enumerate() {
        chars[pos] = digit_at(value, field.len(), i);
    }
}

/// Digit i of the zero-padded value with the given width.
fn digit_at(value: u32, width: usize, i: usize) -> char {
    let exp = (width - 1 - i) as u32;
    let digit = (value / 10u32.pow(exp)) % 10;
    char::from_digit(digit, 10).unwrap_or('0')
}

/// Length of the month as far as it is known.
fn days_in_month(year: Option<i32>, month: Option<u32>) -> u32 {
    match (year, month) {
        (_, None) => 31,
        (None, Some(2)) => 29,
        (None, Some(month)) => month_length(2001, month),
        (Some(year), Some(month)) => month_length(year, month),
    }
}

fn month_length(year: i32, month: u32) -> u32 {
    (28..=31)
        .rev()
        .find(|day| NaiveDate::from_ymd_opt(year, month, *day).is_some())
        .unwrap_or(31)
}

impl Mask for DateMask {
    fn core(&self) -> &MaskCore {
        self.inner.core()
    }

    fn core_mut(&mut self) -> &mut MaskCore {
        self.inner.core_mut()
    }

    fn mask(&self) -> &str {
        self.inner.mask()
    }

    fn placeholder(&self) -> Option<char> {
        self.inner.placeholder()
    }

    fn insert(&mut self, input: &str) -> bool {
        let before = self.inner.core().snapshot();
        let mut chars = self.inner.core().chars();
        let mut cursor = self.inner.core().cursor();
        if let Some(range) = self.inner.core().selection() {
            cursor = range.start;
            self.blank(&mut chars, range);
        }

        for c in input.chars() {
            if c.is_control() {
                continue;
            }
            if let Some(next) = self.write_char(&mut chars, cursor, c) {
                cursor = next;
                self.correct(&mut chars);
            }
        }

        self.commit(chars, cursor);
        self.inner.core().changed_since(&before)
    }

    fn delete(&mut self) -> bool {
        let before = self.inner.core().snapshot();
        let mut chars = self.inner.core().chars();
        let cursor = if let Some(range) = self.inner.core().selection() {
            let start = range.start;
            self.blank(&mut chars, range);
            start
        } else {
            let cursor = self.inner.core().cursor();
            let mut pos = cursor;
            while self.inner.is_delimiter_at(pos) {
                pos += 1;
            }
            if pos < chars.len() {
                self.remove_at(&mut chars, pos);
            }
            cursor
        };

        self.correct(&mut chars);
        self.commit(chars, cursor);
        self.inner.core().changed_since(&before)
    }

    fn backspace(&mut self) -> bool {
        let before = self.inner.core().snapshot();
        let mut chars = self.inner.core().chars();
        let cursor = if let Some(range) = self.inner.core().selection() {
            let start = range.start;
            self.blank(&mut chars, range);
            start
        } else {
            let mut pos = self.inner.core().cursor();
            while pos > 0 && self.inner.is_delimiter_at(pos - 1) {
                pos -= 1;
            }
            if pos > 0 {
                pos -= 1;
                self.remove_at(&mut chars, pos);
            }
            pos
        };

        self.correct(&mut chars);
        self.commit(chars, cursor);
        self.inner.core().changed_since(&before)
    }

    fn clear(&mut self) -> bool {
        let before = self.inner.core().snapshot();
        self.commit(Vec::new(), 0);
        self.inner.core().changed_since(&before)
    }

    fn clean_text(&self) -> String {
        let hole = self.hole();
        self.inner
            .core()
            .text()
            .chars()
            .enumerate()
            .filter(|(pos, c)| {
                if self.inner.is_delimiter_at(*pos) {
                    !self.inner.clean_delimiters()
                } else {
                    *c != hole
                }
            })
            .map(|(_, c)| c)
            .collect()
    }

    fn update_from(&mut self, other: Option<&dyn Mask>) {
        let Some(other) = other else {
            return;
        };
        let Some(other) = other.as_any().downcast_ref::<DateMask>() else {
            debug!("date-mask can't update from {:?}", other);
            return;
        };

        self.year_char = other.year_char;
        self.month_char = other.month_char;
        self.day_char = other.day_char;
        self.reshape(other.fields.clone(), |inner| {
            inner.update_from(Some(&other.inner))
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{DateFields, days_in_month, digit_at, field_value, parse_fields};
    use crate::MaskError;

    #[test]
    fn test_parse_fields() {
        let f = parse_fields("yyyy-MM-dd", 'y', 'M', 'd').unwrap();
        assert_eq!(
            f,
            DateFields {
                year: Some(0..4),
                month: Some(5..7),
                day: Some(8..10),
            }
        );

        let f = parse_fields("MM/yy", 'y', 'M', 'd').unwrap();
        assert_eq!(f.year, Some(3..5));
        assert_eq!(f.day, None);

        assert!(matches!(
            parse_fields("yyy-MM-dd", 'y', 'M', 'd'),
            Err(MaskError::InvalidDateFormat(_))
        ));
        assert!(matches!(
            parse_fields("yyyy-M-dd", 'y', 'M', 'd'),
            Err(MaskError::InvalidDateFormat(_))
        ));
        assert!(matches!(
            parse_fields("dd.dd", 'y', 'M', 'd'),
            Err(MaskError::InvalidDateFormat(_))
        ));
        assert!(matches!(
            parse_fields("--", 'y', 'M', 'd'),
            Err(MaskError::InvalidDateFormat(_))
        ));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(None, None), 31);
        assert_eq!(days_in_month(None, Some(2)), 29);
        assert_eq!(days_in_month(None, Some(4)), 30);
        assert_eq!(days_in_month(Some(0), Some(2)), 29);
        assert_eq!(days_in_month(Some(1), Some(2)), 28);
        assert_eq!(days_in_month(Some(1900), Some(2)), 28);
        assert_eq!(days_in_month(Some(2000), Some(2)), 29);
        assert_eq!(days_in_month(Some(2024), Some(2)), 29);
        assert_eq!(days_in_month(Some(2023), Some(12)), 31);
    }

    #[test]
    fn test_digits() {
        assert_eq!(digit_at(7, 2, 0), '0');
        assert_eq!(digit_at(7, 2, 1), '7');
        assert_eq!(digit_at(2024, 4, 0), '2');
        assert_eq!(digit_at(2024, 4, 3), '4');

        let chars = "2024-0_".chars().collect::<Vec<_>>();
        assert_eq!(field_value(&chars, Some(&(0..4))), Some(2024));
        assert_eq!(field_value(&chars, Some(&(5..7))), None);
        assert_eq!(field_value(&chars, Some(&(5..9))), None);
    }
}
