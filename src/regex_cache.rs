//!
//! Compiled regexes are shared between all masks of a thread.
//! Reshaping a mask back and forth doesn't compile anything twice.
//!

use crate::MaskError;
use log::debug;
use regex::Regex;
use rustc_hash::FxHashMap;
use std::cell::RefCell;

thread_local! {
    static CACHE: RefCell<FxHashMap<String, Regex>> = RefCell::new(FxHashMap::default());
}

/// Compile the pattern or take it from the cache.
pub(crate) fn compile(pattern: &str) -> Result<Regex, MaskError> {
    if let Some(re) = CACHE.with_borrow(|cache| cache.get(pattern).cloned()) {
        return Ok(re);
    }

    let re = Regex::new(pattern)
        .map_err(|e| MaskError::InvalidRegex(pattern.to_string(), e.to_string()))?;
    debug!("compiled mask regex {:?}", pattern);

    CACHE.with_borrow_mut(|cache| {
        cache.insert(pattern.to_string(), re.clone());
    });
    Ok(re)
}
