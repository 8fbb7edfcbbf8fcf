//! Function tables merged into every compiled template.
//!
//! A [`FunctionTable`] is an ordered list of name → callable pairs. Tables are
//! passed to the compiler through [`CompileOptions`](super::CompileOptions),
//! never through global state, so two independently configured template sets
//! cannot see each other's functions.
//!
//! Every entry is registered twice: as a global function (`{{ upper(name) }}`)
//! and as a filter (`{{ name | upper }}`).

use minijinja::functions::Function;
use minijinja::value::{FunctionArgs, FunctionResult, Rest};
use minijinja::{Environment, State, Value};

/// An ordered set of named callables.
///
/// # Example
///
/// ```rust
/// use stencil_render::FunctionTable;
///
/// let table = FunctionTable::new()
///     .function("shout", |s: String| format!("{}!", s.to_uppercase()))
///     .function("year", || 2021);
/// assert_eq!(table.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    entries: Vec<(String, Value)>,
}

impl FunctionTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a Rust function or closure under `name`.
    pub fn function<F, Rv, Args>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Function<Rv, Args> + for<'a> Function<Rv, <Args as FunctionArgs<'a>>::Output>,
        Rv: FunctionResult,
        Args: for<'a> FunctionArgs<'a>,
    {
        self.value(name, Value::from_function::<F, Rv, Args>(f))
    }

    /// Adds an already-built callable value under `name`.
    ///
    /// A later entry with the same name replaces an earlier one.
    pub fn value(mut self, name: impl Into<String>, callable: Value) -> Self {
        let name = name.into();
        self.entries.retain(|(existing, _)| *existing != name);
        self.entries.push((name, callable));
        self
    }

    /// Returns an iterator over entry names, in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registers every entry as a global function and as a filter.
    pub(crate) fn register(&self, env: &mut Environment<'static>) {
        for (name, callable) in &self.entries {
            env.add_global(name.clone(), callable.clone());

            let callable = callable.clone();
            env.add_filter(
                name.clone(),
                move |state: &State, args: Rest<Value>| -> Result<Value, minijinja::Error> {
                    callable.call(state, &args.0)
                },
            );
        }
    }
}
