//!
//! Mask that switches its template depending on the text.
//!
//! Each [MaskOption] has a regex and a template. After every edit
//! the text is tested against the regex of each option in order,
//! the first match wins. If the detected option changes, the edit is
//! undone and done again with the template of the new option, or with
//! the default template if no option matches anymore.
//!
//! Because the first match wins, the order of the options matters
//! if two regexes match the same text.
//!
//! ```rust
//! use rat_mask::{Mask, MaskOption, MultiMask};
//!
//! let mut mask = MultiMask::new(
//!     "0000 0000 0000 0000",
//!     vec![MaskOption::new("American Express", "0000 000000 00000", r"^(34|37)").unwrap()],
//! );
//! mask.set_text("341234567890123");
//! assert_eq!(mask.text(), "3412 345678 90123");
//! assert_eq!(mask.detected_option().map(|v| v.id.as_str()), Some("American Express"));
//! ```

use crate::mask_core::MaskCore;
use crate::pattern_mask::PatternMask;
use crate::regex_cache::compile;
use crate::{Mask, MaskError, impl_mask_display};
use log::debug;
use regex::Regex;
use std::any::Any;
use std::fmt;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

/// Called when the detected option changes.
///
/// Gets the new option, or None if the default template is active
/// again, and the text after the edit.
pub type OptionDetected = Rc<dyn Fn(Option<&MaskOption>, &str)>;

/// Alternate template that is used when the regex matches the text.
#[derive(Debug, Clone)]
pub struct MaskOption {
    pub id: String,
    pub mask: String,
    regex: Regex,
}

impl MaskOption {
    /// New option. Fails if the regex doesn't compile.
    pub fn new(
        id: impl Into<String>,
        mask: impl Into<String>,
        regex: &str,
    ) -> Result<Self, MaskError> {
        Ok(Self {
            id: id.into(),
            mask: mask.into(),
            regex: compile(regex)?,
        })
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    #[inline]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Mask that switches its template depending on the text.
#[derive(Clone)]
pub struct MultiMask {
    inner: PatternMask,
    default_mask: String,
    options: Vec<MaskOption>,
    /// Index into options.
    detected: Option<usize>,
    option_detected: Option<OptionDetected>,
}

impl_mask_display!(MultiMask);

impl Debug for MultiMask {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiMask")
            .field("inner", &self.inner)
            .field("default_mask", &self.default_mask)
            .field("options", &self.options)
            .field("detected", &self.detected)
            .field("option_detected", &self.option_detected.is_some())
            .finish()
    }
}

impl MultiMask {
    /// New mask with a default template and the options.
    pub fn new(default_mask: impl Into<String>, options: Vec<MaskOption>) -> Self {
        let default_mask = default_mask.into();
        Self {
            inner: PatternMask::new(default_mask.clone()),
            default_mask,
            options,
            detected: None,
            option_detected: None,
        }
    }

    /// Show unfilled positions with this char.
    pub fn with_placeholder(mut self, placeholder: char) -> Self {
        self.inner.set_placeholder(Some(placeholder));
        self
    }

    /// Remove delimiters from [Mask::clean_text].
    pub fn with_clean_delimiters(mut self, clean: bool) -> Self {
        self.inner.set_clean_delimiters(clean);
        self
    }

    /// Called when the detected option changes.
    pub fn with_option_detected(
        mut self,
        option_detected: impl Fn(Option<&MaskOption>, &str) + 'static,
    ) -> Self {
        self.option_detected = Some(Rc::new(option_detected));
        self
    }

    pub fn set_option_detected(&mut self, option_detected: Option<OptionDetected>) {
        self.option_detected = option_detected;
    }

    /// The option that matches the text.
    pub fn detected_option(&self) -> Option<&MaskOption> {
        self.detected.and_then(|v| self.options.get(v))
    }

    pub fn options(&self) -> &[MaskOption] {
        &self.options
    }

    /// Template used if no option matches.
    pub fn default_mask(&self) -> &str {
        self.default_mask.as_str()
    }

    /// First option that matches the text.
    fn detect(&self) -> Option<usize> {
        let text = self.inner.text();
        self.options.iter().position(|v| v.is_match(text))
    }

    /// Activate the template for the detected option.
    fn activate(&mut self, detected: Option<usize>) {
        let mask = match detected.and_then(|v| self.options.get(v)) {
            Some(option) => option.mask.clone(),
            None => self.default_mask.clone(),
        };
        debug!(
            "multi-mask detected {:?} -> {:?}",
            detected.and_then(|v| self.options.get(v)).map(|v| &v.id),
            mask
        );
        self.detected = detected;
        if mask != self.inner.mask() {
            self.inner.set_mask(mask);
        }
    }

    fn notify(&self, before: Option<usize>) {
        if before != self.detected {
            if let Some(option_detected) = &self.option_detected {
                option_detected(self.detected_option(), self.inner.text());
            }
        }
    }

    /// Run the edit, and if the detected option changes run it again
    /// with the new template.
    fn edit(&mut self, op: impl Fn(&mut PatternMask) -> bool) -> bool {
        let before = self.detected;
        let snapshot = self.inner.core().snapshot();

        op(&mut self.inner);

        let detected = self.detect();
        if detected != self.detected {
            self.inner.core_mut().restore(snapshot.clone());
            self.activate(detected);
            op(&mut self.inner);

            // the new template can change the text enough to
            // change the detection again.
            let detected = self.detect();
            if detected != self.detected {
                self.activate(detected);
            }
        }

        self.notify(before);
        self.inner.core().changed_since(&snapshot)
    }
}

impl Mask for MultiMask {
    fn core(&self) -> &MaskCore {
        self.inner.core()
    }

    fn core_mut(&mut self) -> &mut MaskCore {
        self.inner.core_mut()
    }

    /// The active template.
    fn mask(&self) -> &str {
        self.inner.mask()
    }

    fn placeholder(&self) -> Option<char> {
        self.inner.placeholder()
    }

    fn insert(&mut self, input: &str) -> bool {
        self.edit(|m| m.insert(input))
    }

    fn delete(&mut self) -> bool {
        self.edit(|m| m.delete())
    }

    fn backspace(&mut self) -> bool {
        self.edit(|m| m.backspace())
    }

    fn clear(&mut self) -> bool {
        self.edit(|m| m.clear())
    }

    fn set_text(&mut self, text: &str) -> bool {
        self.edit(|m| m.set_text(text))
    }

    fn clean_text(&self) -> String {
        self.inner.clean_text()
    }

    fn update_from(&mut self, other: Option<&dyn Mask>) {
        let Some(other) = other else {
            return;
        };
        let Some(other) = other.as_any().downcast_ref::<MultiMask>() else {
            debug!("multi-mask can't update from {:?}", other);
            return;
        };

        let before = self.detected_option().map(|v| v.id.clone());
        self.default_mask = other.default_mask.clone();
        self.options = other.options.clone();
        self.inner.set_placeholder(other.inner.placeholder());
        self.inner.set_clean_delimiters(other.inner.clean_delimiters());

        let detected = self.detect();
        self.activate(detected);
        let detected = self.detect();
        if detected != self.detected {
            self.activate(detected);
        }

        // indexes into the old options can't be compared
        let after = self.detected_option().map(|v| v.id.clone());
        if before != after {
            if let Some(option_detected) = &self.option_detected {
                option_detected(self.detected_option(), self.inner.text());
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
