//! Mask defined by a regex.
//!
//! The regex must match the complete text after every accepted char.
//! It has to be written so that every prefix of a valid value matches
//! too, otherwise typing gets stuck.
//!
//! If a char doesn't fit, the mask tries to insert some of its
//! delimiters before it. That's what makes `255255` come out as
//! `255.255` for an IPv4 mask.
//!
//! There are ready-made masks for [email](RegexMask::email),
//! [IPv4](RegexMask::ipv4) and [IPv6](RegexMask::ipv6).

use crate::mask_char::Transformation;
use crate::mask_core::MaskCore;
use crate::regex_cache::compile;
use crate::{Mask, MaskError, impl_mask_display, split_at};
use log::debug;
use regex::Regex;
use std::any::Any;

/// Maximum number of delimiters inserted before one char.
const MAX_FILL: usize = 3;

const EMAIL: &str = r"^[\w\-+]+(\.[\w\-+]+)*\.?(@([\w\-]+(\.[\w\-]+)*\.?)?)?$";

/// One octet, at least one digit.
const OCTET: &str = r"(25[0-5]|2[0-4][0-9]|[01]?[0-9]{1,2})";
const HEX_GROUP: &str = r"[0-9A-Fa-f]{0,4}";

/// Mask defined by a regex.
#[derive(Debug, Clone)]
pub struct RegexMask {
    core: MaskCore,
    regex: Regex,
    /// Display template.
    template: Option<String>,
    /// Auto-filled chars.
    delimiters: Vec<char>,
    clean_delimiters: bool,
    transformation: Option<Transformation>,
}

impl_mask_display!(RegexMask);

impl RegexMask {
    /// New mask. Fails if the regex doesn't compile.
    pub fn new(pattern: &str) -> Result<Self, MaskError> {
        Ok(Self::from_regex(compile(pattern)?))
    }

    fn from_regex(regex: Regex) -> Self {
        Self {
            core: MaskCore::new(),
            regex,
            template: None,
            delimiters: Vec::new(),
            clean_delimiters: false,
            transformation: None,
        }
    }

    /// Mask for email addresses.
    pub fn email() -> Self {
        Self::from_regex(compile(EMAIL).expect("valid email regex"))
    }

    /// Mask for IPv4 addresses.
    ///
    /// Every octet needs a digit, only the last one may still be empty
    /// after its dot. The port can follow the fourth octet.
    ///
    /// The mask_char is used for the [template](RegexMask::template)
    /// only, which is `000.000.000.000` or `000.000.000.000:00000` with
    /// `0` replaced by the mask_char. The text itself never contains
    /// placeholders.
    pub fn ipv4(with_port: bool, mask_char: char) -> Self {
        let address = format!(r"{0}(\.{0}){{0,2}}(\.{0}?)?", OCTET);
        let pattern = if with_port {
            format!(r"^({1}|{0}(\.{0}){{3}}:[0-9]{{0,5}})?$", OCTET, address)
        } else {
            format!(r"^({})?$", address)
        };

        let mut template = "000.000.000.000".replace('0', &mask_char.to_string());
        let mut delimiters = ".".to_string();
        if with_port {
            template.push(':');
            template.push_str(&mask_char.to_string().repeat(5));
            delimiters.push(':');
        }

        Self::from_regex(compile(&pattern).expect("valid ipv4 regex"))
            .with_template(template)
            .with_delimiters(&delimiters)
    }

    /// Mask for IPv6 addresses.
    ///
    /// The template is `XXXX:XXXX:XXXX:XXXX:XXXX:XXXX:XXXX:XXXX` with `X`
    /// replaced by the mask_char. With a port the address is written
    /// in brackets `[...]:00000`, the port uses mask_char_port.
    /// Both chars only show up in the [template](RegexMask::template),
    /// editing goes by the regex alone.
    pub fn ipv6(with_port: bool, mask_char: char, mask_char_port: char) -> Self {
        let host = format!(r"{0}(:{0}){{0,7}}", HEX_GROUP);
        let group = mask_char.to_string().repeat(4);
        let host_template = vec![group; 8].join(":");

        let (pattern, template, delimiters) = if with_port {
            (
                format!(r"^(\[{}(\](:[0-9]{{0,5}})?)?)?$", host),
                format!("[{}]:{}", host_template, mask_char_port.to_string().repeat(5)),
                "[]:",
            )
        } else {
            (format!("^{}$", host), host_template, ":")
        };

        Self::from_regex(compile(&pattern).expect("valid ipv6 regex"))
            .with_template(template)
            .with_delimiters(delimiters)
    }

    /// Display template.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// These chars are inserted automatically if the next char
    /// needs them.
    pub fn with_delimiters(mut self, delimiters: &str) -> Self {
        self.delimiters = delimiters.chars().collect();
        self
    }

    /// Remove delimiters from [Mask::clean_text].
    pub fn with_clean_delimiters(mut self, clean: bool) -> Self {
        self.clean_delimiters = clean;
        self
    }

    /// Map every char before it is validated.
    pub fn with_transformation(mut self, transformation: Transformation) -> Self {
        self.transformation = Some(transformation);
        self.revalidate();
        self
    }

    /// Display template.
    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    pub fn delimiters(&self) -> &[char] {
        &self.delimiters
    }

    pub fn set_clean_delimiters(&mut self, clean: bool) {
        self.clean_delimiters = clean;
    }

    pub fn clean_delimiters(&self) -> bool {
        self.clean_delimiters
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Change the regex and the delimiters. The text is validated again.
    pub(crate) fn reshape(&mut self, regex: Regex, delimiters: Vec<char>) {
        self.regex = regex;
        self.delimiters = delimiters;
        self.revalidate();
    }

    /// Does the text with c appended still match?
    /// Returns the chars to append, which may include some delimiters.
    fn accept(&self, buf: &str, c: char) -> Option<String> {
        let c = match self.transformation {
            Some(t) => t(c),
            None => c,
        };

        let mut trial = String::with_capacity(buf.len() + 4);
        trial.push_str(buf);
        trial.push(c);
        if self.regex.is_match(&trial) {
            return Some(c.to_string());
        }

        // shortest run of delimiters first
        let mut fill = String::new();
        for depth in 1..=self.delimiters.len().min(MAX_FILL) {
            if self.fill_delimiters(buf, c, &mut fill, depth) {
                fill.push(c);
                return Some(fill);
            }
        }
        None
    }

    /// Depth-first search for a run of delimiters that lets c through.
    /// Every step of the run must be valid itself.
    fn fill_delimiters(&self, buf: &str, c: char, fill: &mut String, depth: usize) -> bool {
        if depth == 0 {
            return false;
        }
        for d in self.delimiters.iter().copied() {
            fill.push(d);
            let mut trial = format!("{}{}", buf, fill);
            if self.regex.is_match(&trial) {
                trial.push(c);
                if depth == 1 && self.regex.is_match(&trial) {
                    return true;
                }
                if self.fill_delimiters(buf, c, fill, depth - 1) {
                    return true;
                }
            }
            fill.pop();
        }
        false
    }

    /// Append everything that fits.
    fn append(&self, buf: &mut String, input: impl IntoIterator<Item = char>) {
        for c in input {
            if c.is_control() {
                continue;
            }
            if let Some(s) = self.accept(buf, c) {
                buf.push_str(&s);
            }
        }
    }

    /// Remove start..end and validate everything after it again.
    fn remove_range(&mut self, start: usize, end: usize) {
        let text = self.core.text();
        let (before, _) = split_at(text, start as isize);
        let (_, after) = split_at(text, end as isize);

        let mut buf = before.to_string();
        self.append(&mut buf, after.chars());
        self.core.replace(buf, start);
    }

    /// Validate the current text from scratch.
    fn revalidate(&mut self) {
        let mut buf = String::new();
        self.append(&mut buf, self.core.text().chars());
        self.core.replace_text(buf);
    }
}

impl Mask for RegexMask {
    fn core(&self) -> &MaskCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut MaskCore {
        &mut self.core
    }

    fn mask(&self) -> &str {
        self.regex.as_str()
    }

    fn insert(&mut self, input: &str) -> bool {
        let before_state = self.core.snapshot();

        let (start, end) = match self.core.selection() {
            Some(range) => (range.start, range.end),
            None => (self.core.cursor(), self.core.cursor()),
        };

        let text = self.core.text();
        let (before, _) = split_at(text, start as isize);
        let (_, after) = split_at(text, end as isize);
        let after = after.to_string();

        let mut buf = before.to_string();
        self.append(&mut buf, input.chars());
        let cursor = buf.chars().count();
        self.append(&mut buf, after.chars());

        self.core.replace(buf, cursor);
        self.core.changed_since(&before_state)
    }

    fn delete(&mut self) -> bool {
        let before = self.core.snapshot();
        if let Some(range) = self.core.selection() {
            self.remove_range(range.start, range.end);
        } else {
            let pos = self.core.cursor();
            if pos >= self.core.len() {
                return false;
            }
            self.remove_range(pos, pos + 1);
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
            self.remove_range(pos - 1, pos);
        }
        self.core.changed_since(&before)
    }

    fn clear(&mut self) -> bool {
        let before = self.core.snapshot();
        self.core.replace(String::new(), 0);
        self.core.changed_since(&before)
    }

    fn clean_text(&self) -> String {
        if self.clean_delimiters {
            self.core
                .text()
                .chars()
                .filter(|c| !self.delimiters.contains(c))
                .collect()
        } else {
            self.core.text().to_string()
        }
    }

    fn update_from(&mut self, other: Option<&dyn Mask>) {
        let Some(other) = other else {
            return;
        };
        let Some(other) = other.as_any().downcast_ref::<RegexMask>() else {
            debug!("regex-mask can't update from {:?}", other);
            return;
        };

        self.regex = other.regex.clone();
        self.template = other.template.clone();
        self.delimiters = other.delimiters.clone();
        self.clean_delimiters = other.clean_delimiters;
        self.transformation = other.transformation;
        self.revalidate();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::RegexMask;

    #[test]
    fn test_accept() {
        let mask = RegexMask::ipv4(false, '_');
        assert_eq!(mask.accept("25", '5'), Some("5".to_string()));
        assert_eq!(mask.accept("255", '2'), Some(".2".to_string()));
        assert_eq!(mask.accept("1.2.3.4", '.'), None);
        assert_eq!(mask.accept("", 'x'), None);
        assert_eq!(mask.accept("", '.'), None);
        assert_eq!(mask.accept("1.", '.'), None);
    }

    #[test]
    fn test_accept_two_delimiters() {
        let mask = RegexMask::ipv6(true, 'X', '0');
        assert_eq!(mask.accept("", '1'), Some("[1".to_string()));
        assert_eq!(
            mask.accept("[1111:2222:3333:4444:5555:6666:7777:8888", '9'),
            Some("]:9".to_string())
        );
    }
}
