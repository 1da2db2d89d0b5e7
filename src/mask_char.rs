use crate::MaskError;
use crate::regex_cache::compile;
use regex::Regex;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};

/// Maps an accepted char before it is stored.
pub type Transformation = fn(char) -> char;

/// Which chars are accepted at a mask position.
#[derive(Clone)]
#[non_exhaustive]
pub enum CharClass {
    /// 0-9
    Digit,
    /// Any alphabetic char.
    Letter,
    /// Letter or 0-9
    LetterOrDigit,
    /// The regex must match the single char.
    Regex(Regex),
}

/// One placeholder char of a mask template and its class.
#[derive(Clone)]
pub struct MaskChar {
    pub ch: char,
    pub class: CharClass,
}

impl PartialEq for CharClass {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CharClass::Digit, CharClass::Digit) => true,
            (CharClass::Letter, CharClass::Letter) => true,
            (CharClass::LetterOrDigit, CharClass::LetterOrDigit) => true,
            (CharClass::Regex(a), CharClass::Regex(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl Eq for CharClass {}

impl PartialEq for MaskChar {
    fn eq(&self, other: &Self) -> bool {
        self.ch == other.ch && self.class == other.class
    }
}

impl Eq for MaskChar {}

impl Display for CharClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CharClass::Digit => write!(f, "digit"),
            CharClass::Letter => write!(f, "letter"),
            CharClass::LetterOrDigit => write!(f, "letter-or-digit"),
            CharClass::Regex(re) => write!(f, "{}", re.as_str()),
        }
    }
}

impl Debug for CharClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CharClass::Digit => write!(f, "\\d"),
            CharClass::Letter => write!(f, "\\p{{L}}"),
            CharClass::LetterOrDigit => write!(f, "[\\p{{L}}\\d]"),
            CharClass::Regex(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

impl Debug for MaskChar {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'={:?}", self.ch, self.class)
    }
}

impl CharClass {
    /// Is the char accepted?
    #[inline]
    pub fn is_match(&self, c: char) -> bool {
        match self {
            CharClass::Digit => c.is_ascii_digit(),
            CharClass::Letter => c.is_alphabetic(),
            CharClass::LetterOrDigit => c.is_alphabetic() || c.is_ascii_digit(),
            CharClass::Regex(re) => {
                let mut buf = [0u8; 4];
                re.is_match(c.encode_utf8(&mut buf))
            }
        }
    }

    /// Regex fragment matching exactly one char of this class.
    pub fn regex_atom(&self) -> String {
        match self {
            CharClass::Digit => r"\d".to_string(),
            CharClass::Letter => r"\p{L}".to_string(),
            CharClass::LetterOrDigit => r"[\p{L}\d]".to_string(),
            CharClass::Regex(re) => {
                let s = re.as_str();
                let s = s.strip_prefix("^(?:").unwrap_or(s);
                let s = s.strip_suffix(")$").unwrap_or(s);
                format!("(?:{})", s)
            }
        }
    }
}

impl MaskChar {
    /// Accepts 0-9.
    pub fn digit(ch: char) -> Self {
        Self {
            ch,
            class: CharClass::Digit,
        }
    }

    /// Accepts letters.
    pub fn letter(ch: char) -> Self {
        Self {
            ch,
            class: CharClass::Letter,
        }
    }

    /// Accepts letters and 0-9.
    pub fn letter_or_digit(ch: char) -> Self {
        Self {
            ch,
            class: CharClass::LetterOrDigit,
        }
    }

    /// Accepts every char the regex matches.
    ///
    /// The regex is anchored, it must match the complete char.
    pub fn regex(ch: char, pattern: &str) -> Result<Self, MaskError> {
        let re = compile(&format!("^(?:{})$", pattern))?;
        Ok(Self {
            ch,
            class: CharClass::Regex(re),
        })
    }

    /// `a` letter, `0` digit, `*` letter or digit.
    pub fn defaults() -> Vec<MaskChar> {
        vec![
            MaskChar::letter('a'),
            MaskChar::digit('0'),
            MaskChar::letter_or_digit('*'),
        ]
    }

    /// Is the char accepted?
    #[inline]
    pub fn is_match(&self, c: char) -> bool {
        self.class.is_match(c)
    }
}

/// Find the mask char for a template char.
#[inline]
pub(crate) fn find_mask_char(mask_chars: &[MaskChar], ch: char) -> Option<&MaskChar> {
    mask_chars.iter().find(|v| v.ch == ch)
}

/// Transformation to upper-case.
pub fn upper_case(c: char) -> char {
    c.to_uppercase().next().unwrap_or(c)
}

/// Transformation to lower-case.
pub fn lower_case(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

#[cfg(test)]
mod tests {
    use super::{MaskChar, lower_case, upper_case};

    #[test]
    fn test_classes() {
        let d = MaskChar::digit('0');
        assert!(d.is_match('7'));
        assert!(!d.is_match('x'));

        let l = MaskChar::letter('a');
        assert!(l.is_match('x'));
        assert!(l.is_match('ä'));
        assert!(!l.is_match('1'));

        let ld = MaskChar::letter_or_digit('*');
        assert!(ld.is_match('x'));
        assert!(ld.is_match('1'));
        assert!(!ld.is_match('-'));

        let hex = MaskChar::regex('h', "[0-9a-fA-F]").unwrap();
        assert!(hex.is_match('f'));
        assert!(hex.is_match('A'));
        assert!(!hex.is_match('g'));
        assert_eq!(hex.class.regex_atom(), "(?:[0-9a-fA-F])");
    }

    #[test]
    fn test_transform() {
        assert_eq!(upper_case('a'), 'A');
        assert_eq!(upper_case('1'), '1');
        assert_eq!(lower_case('Q'), 'q');
    }
}
