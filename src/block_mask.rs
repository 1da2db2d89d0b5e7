//! Mask composed of blocks.
//!
//! Each block has a mask char and a minimum and maximum length.
//! Blocks are separated by one of the delimiters. A mask char that
//! is not in the list of mask chars is a literal block.
//!
//! The blocks are compiled into a regex where each char nests
//! everything after it in an optional group. Every prefix of a valid
//! value matches that regex, so a [RegexMask] can do the editing.
//!
//! ```rust
//! use rat_mask::{Block, BlockMask, Mask};
//!
//! let mask = BlockMask::new(".", vec![Block::new('0', 1, 2), Block::new('0', 1, 2)]).unwrap();
//! assert_eq!(mask.mask(), r"^(\d(\d)?([\.](\d(\d)?)?)?)?$");
//! ```

use crate::mask_char::{MaskChar, find_mask_char};
use crate::mask_core::MaskCore;
use crate::regex_mask::RegexMask;
use crate::{Mask, MaskError, impl_mask_display};
use log::debug;
use std::any::Any;

/// One block of a [BlockMask].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub mask_char: char,
    pub min: usize,
    pub max: usize,
}

impl Block {
    pub fn new(mask_char: char, min: usize, max: usize) -> Self {
        Self { mask_char, min, max }
    }
}

/// Mask composed of blocks.
#[derive(Debug, Clone)]
pub struct BlockMask {
    inner: RegexMask,
    blocks: Vec<Block>,
    delimiters: String,
    mask_chars: Vec<MaskChar>,
}

impl_mask_display!(BlockMask);

/// Part of the compiled regex.
#[derive(Debug)]
enum Atom {
    /// Starts a nested group that contains the rest.
    Required(String),
    /// Optional on its own.
    Optional(String),
}

impl BlockMask {
    /// New mask with the default mask chars.
    ///
    /// Fails if there are no blocks or if a block has `min > max` or `max == 0`.
    pub fn new(delimiters: &str, blocks: Vec<Block>) -> Result<Self, MaskError> {
        Self::with_mask_chars(delimiters, blocks, MaskChar::defaults())
    }

    /// New mask with the given mask chars.
    pub fn with_mask_chars(
        delimiters: &str,
        blocks: Vec<Block>,
        mask_chars: Vec<MaskChar>,
    ) -> Result<Self, MaskError> {
        let pattern = build_regex(delimiters, &blocks, &mask_chars)?;
        let fill = fill_chars(delimiters, &blocks, &mask_chars);
        let inner = RegexMask::new(&pattern)?.with_delimiters(&fill);

        Ok(Self {
            inner,
            blocks,
            delimiters: delimiters.to_string(),
            mask_chars,
        })
    }

    /// Remove delimiters and literal blocks from [Mask::clean_text].
    pub fn with_clean_delimiters(mut self, clean: bool) -> Self {
        self.inner.set_clean_delimiters(clean);
        self
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn delimiters(&self) -> &str {
        self.delimiters.as_str()
    }

    pub fn mask_chars(&self) -> &[MaskChar] {
        &self.mask_chars
    }
}

/// Compile the blocks to a regex.
fn build_regex(
    delimiters: &str,
    blocks: &[Block],
    mask_chars: &[MaskChar],
) -> Result<String, MaskError> {
    if blocks.is_empty() {
        return Err(MaskError::NoBlocks);
    }

    let delimiter = if delimiters.is_empty() {
        None
    } else {
        Some(format!("[{}]", regex::escape(delimiters)))
    };

    let mut atoms = Vec::new();
    for (i, block) in blocks.iter().enumerate() {
        if block.min > block.max || block.max == 0 {
            return Err(MaskError::InvalidBlock(block.mask_char, block.min, block.max));
        }

        if i > 0 {
            if let Some(delimiter) = &delimiter {
                atoms.push(Atom::Required(delimiter.clone()));
            }
        }

        let atom = match find_mask_char(mask_chars, block.mask_char) {
            Some(mask_char) => mask_char.class.regex_atom(),
            None => regex::escape(&block.mask_char.to_string()),
        };
        for _ in 0..block.min {
            atoms.push(Atom::Required(atom.clone()));
        }
        for _ in block.min..block.max {
            atoms.push(Atom::Optional(atom.clone()));
        }
    }

    Ok(format!("^{}$", nest(&atoms)))
}

/// Builds the nested groups from the back.
fn nest(atoms: &[Atom]) -> String {
    match atoms.split_first() {
        None => String::new(),
        Some((Atom::Required(s), rest)) => format!("({}{})?", s, nest(rest)),
        Some((Atom::Optional(s), rest)) => format!("({})?{}", s, nest(rest)),
    }
}

/// Delimiters and literal blocks are filled in automatically.
fn fill_chars(delimiters: &str, blocks: &[Block], mask_chars: &[MaskChar]) -> String {
    let mut fill = String::new();
    let literals = blocks
        .iter()
        .filter(|v| find_mask_char(mask_chars, v.mask_char).is_none())
        .map(|v| v.mask_char);
    for c in delimiters.chars().chain(literals) {
        if !fill.contains(c) {
            fill.push(c);
        }
    }
    fill
}

impl Mask for BlockMask {
    fn core(&self) -> &MaskCore {
        self.inner.core()
    }

    fn core_mut(&mut self) -> &mut MaskCore {
        self.inner.core_mut()
    }

    /// The compiled regex.
    fn mask(&self) -> &str {
        self.inner.mask()
    }

    fn insert(&mut self, input: &str) -> bool {
        self.inner.insert(input)
    }

    fn delete(&mut self) -> bool {
        self.inner.delete()
    }

    fn backspace(&mut self) -> bool {
        self.inner.backspace()
    }

    fn clear(&mut self) -> bool {
        self.inner.clear()
    }

    fn clean_text(&self) -> String {
        self.inner.clean_text()
    }

    fn update_from(&mut self, other: Option<&dyn Mask>) {
        let Some(other) = other else {
            return;
        };
        let Some(other) = other.as_any().downcast_ref::<BlockMask>() else {
            debug!("block-mask can't update from {:?}", other);
            return;
        };

        self.blocks = other.blocks.clone();
        self.delimiters = other.delimiters.clone();
        self.mask_chars = other.mask_chars.clone();
        self.inner.set_clean_delimiters(other.inner.clean_delimiters());
        self.inner.reshape(
            other.inner.regex().clone(),
            other.inner.delimiters().to_vec(),
        );
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{Block, build_regex, fill_chars};
    use crate::MaskError;
    use crate::mask_char::MaskChar;

    #[test]
    fn test_build_regex() {
        let r = build_regex(
            ".",
            &[Block::new('0', 1, 2), Block::new('0', 1, 2), Block::new('0', 1, 2)],
            &MaskChar::defaults(),
        )
        .unwrap();
        assert_eq!(r, r"^(\d(\d)?([\.](\d(\d)?([\.](\d(\d)?)?)?)?)?)?$");

        let r = build_regex("", &[Block::new('a', 2, 3)], &MaskChar::defaults()).unwrap();
        assert_eq!(r, r"^(\p{L}(\p{L}(\p{L})?)?)?$");
    }

    #[test]
    fn test_invalid() {
        assert_eq!(build_regex(".", &[], &MaskChar::defaults()), Err(MaskError::NoBlocks));
        assert_eq!(
            build_regex(".", &[Block::new('0', 3, 2)], &MaskChar::defaults()),
            Err(MaskError::InvalidBlock('0', 3, 2))
        );
        assert_eq!(
            build_regex(".", &[Block::new('0', 0, 0)], &MaskChar::defaults()),
            Err(MaskError::InvalidBlock('0', 0, 0))
        );
    }

    #[test]
    fn test_fill_chars() {
        let fill = fill_chars(
            ".",
            &[Block::new('(', 1, 1), Block::new('0', 2, 2), Block::new(')', 1, 1)],
            &MaskChar::defaults(),
        );
        assert_eq!(fill, ".()");
    }
}
