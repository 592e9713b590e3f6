#![forbid(unsafe_code)]

//! Construction options for [`ArrayState`](crate::ArrayState).

use std::fmt;
use std::rc::Rc;

use crate::notify::ChangeCallback;

/// Configuration consumed by [`ArrayState::with_options`](crate::ArrayState::with_options).
///
/// The initial value is copied into a frozen snapshot that
/// [`reset`](crate::ArrayState::reset) restores; later mutations never touch it.
pub struct ArrayStateOptions<T> {
    /// Items the controller starts with (default: empty).
    pub initial_value: Vec<T>,
    /// Hook called with the full sequence after every committed change.
    pub on_change: Option<ChangeCallback<T>>,
}

impl<T> Default for ArrayStateOptions<T> {
    fn default() -> Self {
        Self {
            initial_value: Vec::new(),
            on_change: None,
        }
    }
}

impl<T> ArrayStateOptions<T> {
    /// Empty initial value, no change hook.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial value.
    #[must_use]
    pub fn with_initial_value(mut self, items: impl IntoIterator<Item = T>) -> Self {
        self.initial_value = items.into_iter().collect();
        self
    }

    /// Set the change hook. Replaces any hook set earlier.
    #[must_use]
    pub fn with_on_change(mut self, on_change: impl Fn(&[T]) + 'static) -> Self
    where
        T: 'static,
    {
        self.on_change = Some(Rc::new(on_change));
        self
    }
}

impl<T: fmt::Debug> fmt::Debug for ArrayStateOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayStateOptions")
            .field("initial_value", &self.initial_value)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_empty() {
        let opts: ArrayStateOptions<u8> = ArrayStateOptions::new();
        assert!(opts.initial_value.is_empty());
        assert!(opts.on_change.is_none());
    }

    #[test]
    fn builder_sets_fields() {
        let opts = ArrayStateOptions::new()
            .with_initial_value(["a", "b"])
            .with_on_change(|_: &[&str]| {});
        assert_eq!(opts.initial_value, vec!["a", "b"]);
        assert!(opts.on_change.is_some());
    }

    #[test]
    fn debug_hides_callback() {
        let opts = ArrayStateOptions::new()
            .with_initial_value([1, 2])
            .with_on_change(|_: &[i32]| {});
        let dbg = format!("{opts:?}");
        assert!(dbg.contains("[1, 2]"));
        assert!(dbg.contains("on_change: true"));
    }
}
