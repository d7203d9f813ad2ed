//! The mutable context cell shared by all handlers of a machine.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

/// Mutable context threaded through every guard, handler, and subscriber
/// of a machine.
///
/// The cell holds the user's own record in `data` plus a keyed map of
/// values injected at runtime. Every callback of a dispatch receives the
/// same live cell by reference; nothing is cloned, so a mutation made in
/// one handler is visible to every later handler of the same dispatch.
///
/// # Example
///
/// ```rust
/// use statecraft::core::Context;
///
/// struct Session {
///     user: String,
/// }
///
/// let mut ctx = Context::new(Session { user: "ada".into() });
/// ctx.data.user.push_str("@example.com");
/// ctx.inject("retries", 3u32);
///
/// assert_eq!(ctx.data.user, "ada@example.com");
/// assert_eq!(ctx.get::<u32>("retries"), Some(&3));
/// ```
pub struct Context<C> {
    /// The user-supplied record, mutable in place.
    pub data: C,
    injected: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl<C> Context<C> {
    /// Wrap a user record in a fresh cell with no injected keys.
    pub fn new(data: C) -> Self {
        Self {
            data,
            injected: HashMap::new(),
        }
    }

    /// Set or replace an injected key.
    ///
    /// All guards, handlers, and subscribers that run after this call
    /// observe the new value.
    pub fn inject<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.injected.insert(key.into(), Box::new(value));
    }

    /// Look up an injected value by key and type.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.injected.get(key)?.downcast_ref()
    }

    /// Mutable access to an injected value.
    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.injected.get_mut(key)?.downcast_mut()
    }

    /// Whether a key has been injected, regardless of its type.
    pub fn contains(&self, key: &str) -> bool {
        self.injected.contains_key(key)
    }
}

impl<C: fmt::Debug> fmt::Debug for Context<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("data", &self.data)
            .field("injected", &self.injected.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inject_sets_and_replaces() {
        let mut ctx = Context::new(());
        ctx.inject("limit", 5usize);
        assert_eq!(ctx.get::<usize>("limit"), Some(&5));

        ctx.inject("limit", 9usize);
        assert_eq!(ctx.get::<usize>("limit"), Some(&9));
    }

    #[test]
    fn get_with_wrong_type_is_none() {
        let mut ctx = Context::new(());
        ctx.inject("limit", 5usize);
        assert_eq!(ctx.get::<String>("limit"), None);
    }

    #[test]
    fn get_mut_mutates_in_place() {
        let mut ctx = Context::new(());
        ctx.inject("tags", vec!["a".to_string()]);

        ctx.get_mut::<Vec<String>>("tags")
            .unwrap()
            .push("b".to_string());

        assert_eq!(ctx.get::<Vec<String>>("tags").unwrap().len(), 2);
    }

    #[test]
    fn data_is_mutable_in_place() {
        let mut ctx = Context::new(vec![1, 2]);
        ctx.data.push(3);
        assert_eq!(ctx.data, vec![1, 2, 3]);
    }

    #[test]
    fn contains_reports_injected_keys() {
        let mut ctx = Context::new(());
        assert!(!ctx.contains("seen"));
        ctx.inject("seen", true);
        assert!(ctx.contains("seen"));
    }
}
