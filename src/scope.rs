use std::collections::BTreeMap;

use crate::interface::ValuesProvider;
use crate::value::Value;

/// A single level of variable bindings.
///
/// The root scope owns no bindings and forwards every lookup to the
/// provider; every other scope owns a private map that starts empty.
pub(crate) struct Scope<'p> {
    bindings: Option<BTreeMap<String, Value>>,
    provider: &'p dyn ValuesProvider,
}

impl<'p> Scope<'p> {
    pub(crate) fn root(provider: &'p dyn ValuesProvider) -> Self {
        Self {
            bindings: None,
            provider,
        }
    }

    pub(crate) fn child(provider: &'p dyn ValuesProvider) -> Self {
        Self {
            bindings: Some(BTreeMap::new()),
            provider,
        }
    }

    pub(crate) const fn is_root(&self) -> bool {
        self.bindings.is_none()
    }

    /// Binds `name` in this scope. Does nothing on the root scope.
    pub(crate) fn bind<N: Into<String>>(&mut self, name: N, value: Value) {
        if let Some(bindings) = self.bindings.as_mut() {
            bindings.insert(name.into(), value);
        }
    }

    /// Resolves the first segment of a path in this scope only.
    fn head(&self, name: &str) -> Option<Value> {
        let value = match &self.bindings {
            Some(bindings) => bindings.get(name).cloned(),
            None => self.provider.property(None, name),
        };
        value.filter(|v| !v.is_null())
    }

    /// Threads the remaining segments of a path through the provider.
    fn tail<'s, I>(&self, start: Value, mut rest: I) -> Option<Value>
    where
        I: Iterator<Item = &'s str>,
    {
        rest.try_fold(start, |current, segment| {
            self.provider
                .property(Some(&current), segment)
                .filter(|v| !v.is_null())
        })
    }

    /// Resolves a dotted path like `a.b.c` starting in this scope.
    pub(crate) fn resolve(&self, path: &str) -> Option<Value> {
        let mut segments = path.split('.');
        let head = self.head(segments.next()?)?;
        self.tail(head, segments)
    }

    /// A variable bound to null is indistinguishable from an unbound one.
    pub(crate) fn has(&self, path: &str) -> bool {
        self.resolve(path).is_some()
    }
}

/// The chain of active scopes. The root scope sits at the bottom and is
/// never popped; lookups walk from the top (innermost) down.
pub(crate) struct ScopeStack<'p> {
    provider: &'p dyn ValuesProvider,
    scopes: Vec<Scope<'p>>,
}

impl<'p> ScopeStack<'p> {
    pub(crate) fn new(provider: &'p dyn ValuesProvider) -> Self {
        let mut scopes = Vec::with_capacity(8);
        scopes.push(Scope::root(provider));
        Self { provider, scopes }
    }

    #[cfg(test)]
    pub(crate) fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub(crate) fn provider(&self) -> &'p dyn ValuesProvider {
        self.provider
    }

    pub(crate) fn push(&mut self) {
        self.scopes.push(Scope::child(self.provider));
    }

    /// Pops the innermost scope. The root scope stays in place.
    pub(crate) fn pop(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
        debug_assert!(self.scopes.first().is_some_and(Scope::is_root));
    }

    /// Binds `name` in the innermost scope.
    pub(crate) fn bind<N: Into<String>>(&mut self, name: N, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.bind(name, value);
        }
    }

    /// Resolves a dotted path against the first scope, innermost first, that
    /// knows its leading segment. Once a scope claims the head, a missing
    /// property further down the path is final: outer scopes are not tried.
    pub(crate) fn lookup(&self, path: &str) -> Option<Value> {
        let first = path.split('.').next()?;
        self.scopes
            .iter()
            .rev()
            .find(|scope| scope.has(first))
            .and_then(|scope| scope.resolve(path))
    }
}
