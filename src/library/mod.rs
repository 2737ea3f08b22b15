//! Library contract for Runiq
//!
//! The interpreter resolves every name through the [`Library`] trait and
//! knows nothing about how functions are stored or implemented.
//! [`LibraryTable`] is the shipped implementation; its `define_*` methods
//! double as the builder used to register functions.

#[cfg(feature = "stdlib")]
pub mod stdlib;

use crate::error::Result;
use crate::parser::Node;
use crate::runtime::{Event, Scope, SeededRng, Storage};
use crate::types::Signature;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Everything a function sees when it is called
pub struct CallContext<'a> {
    /// Step id of the invocation
    pub id: u64,
    /// Seed of the running interpreter
    pub seed: u64,
    /// Name the program called (before any function-missing fallback)
    pub name: &'a str,
    /// The list being invoked, arguments still quoted
    pub list: &'a [Node],
    /// Arguments the run was started with
    pub argv: &'a [Node],
    /// Event the run was started with
    pub event: Option<&'a Event>,
    /// Storage handle for impure functions
    pub storage: &'a dyn Storage,
    /// Scope the invocation resolved in
    pub scope: &'a Scope,
    pub(crate) rng: &'a Mutex<SeededRng>,
}

impl CallContext<'_> {
    /// Next value of the interpreter's seeded random stream, in `[0, 1)`
    pub fn random(&self) -> f64 {
        self.rng.lock().next_f64()
    }
}

/// Everything a preprocessor sees
pub struct PreprocessContext<'a> {
    /// Step counter when preprocessing ran
    pub id: u64,
    /// Seed of the running interpreter
    pub seed: u64,
    /// Arguments the run was started with
    pub argv: &'a [Node],
    /// Event the run was started with
    pub event: Option<&'a Event>,
    /// Storage handle
    pub storage: &'a dyn Storage,
}

/// A callable builtin
#[async_trait]
pub trait Function: Send + Sync {
    /// Declared inputs; `None` leaves calls unchecked
    fn signature(&self) -> Option<Signature> {
        None
    }

    /// Impure functions are subject to the interpreter's impurity policy
    fn is_impure(&self) -> bool {
        false
    }

    /// Runs the function on already unquoted arguments
    ///
    /// The returned node replaces the call in the program.
    async fn call(&self, ctx: &CallContext<'_>, args: Vec<Node>) -> Result<Node>;
}

/// Synchronous conversion applied when a name resolves to a type
pub trait TypeCaster: Send + Sync {
    /// Converts the call's arguments into a value
    fn cast(&self, args: &[Node]) -> Result<Node>;
}

impl<F> TypeCaster for F
where
    F: Fn(&[Node]) -> Result<Node> + Send + Sync,
{
    fn cast(&self, args: &[Node]) -> Result<Node> {
        self(args)
    }
}

/// Program transform applied to the forms following a leading preprocessor form
pub trait Preprocessor: Send + Sync {
    /// Rewrites `program` given the preprocessor's own `form`
    fn expand(
        &self,
        ctx: &PreprocessContext<'_>,
        form: Vec<Node>,
        program: Vec<Node>,
    ) -> Result<Vec<Node>>;
}

impl<F> Preprocessor for F
where
    F: Fn(&PreprocessContext<'_>, Vec<Node>, Vec<Node>) -> Result<Vec<Node>> + Send + Sync,
{
    fn expand(
        &self,
        ctx: &PreprocessContext<'_>,
        form: Vec<Node>,
        program: Vec<Node>,
    ) -> Result<Vec<Node>> {
        self(ctx, form, program)
    }
}

/// Name resolution consulted by the interpreter
///
/// Every lookup takes the current scope; implementations try the innermost
/// scope first and fall back to their global table. Lookups must not depend
/// on the program being evaluated.
pub trait Library: Send + Sync {
    /// Function bound to `name`
    fn lookup_function(&self, name: &str, scope: &Scope) -> Option<Arc<dyn Function>>;
    /// Type caster bound to `name`
    fn lookup_type_caster(&self, name: &str, scope: &Scope) -> Option<Arc<dyn TypeCaster>>;
    /// Constant bound to `name`
    fn lookup_constant(&self, name: &str, scope: &Scope) -> Option<Node>;
    /// Preprocessor bound to `name`
    fn lookup_preprocessor(&self, name: &str, scope: &Scope) -> Option<Arc<dyn Preprocessor>>;
    /// Declared inputs of the function bound to `name`
    fn lookup_inputs(&self, name: &str, scope: &Scope) -> Option<Signature>;
    /// Extra balance debit for calling `name`
    fn lookup_price(&self, name: &str, scope: &Scope) -> Option<f64>;
    /// Whether the function bound to `name` is impure
    fn is_impure_function(&self, name: &str, scope: &Scope) -> bool;
    /// Whether `name` opens a scope
    fn lookup_scope(&self, name: &str, scope: &Scope) -> bool;
}

/// Signature of synchronous builtins registered through [`LibraryTable::define_fn`]
pub type NativeFn = dyn Fn(&CallContext<'_>, Vec<Node>) -> Result<Node> + Send + Sync;

/// Function backed by a synchronous closure
pub struct NativeFunction {
    signature: Signature,
    impure: bool,
    body: Box<NativeFn>,
}

impl NativeFunction {
    /// Wraps a closure
    pub fn new<F>(signature: Signature, impure: bool, body: F) -> Self
    where
        F: Fn(&CallContext<'_>, Vec<Node>) -> Result<Node> + Send + Sync + 'static,
    {
        NativeFunction {
            signature,
            impure,
            body: Box::new(body),
        }
    }
}

#[async_trait]
impl Function for NativeFunction {
    fn signature(&self) -> Option<Signature> {
        Some(self.signature.clone())
    }

    fn is_impure(&self) -> bool {
        self.impure
    }

    async fn call(&self, ctx: &CallContext<'_>, args: Vec<Node>) -> Result<Node> {
        (self.body)(ctx, args)
    }
}

/// Name tables for functions, casters, constants and preprocessors
///
/// Scopes are nested tables keyed by the scope's name; a scope's name is
/// also bound to a function in the enclosing table.
#[derive(Default)]
pub struct LibraryTable {
    functions: HashMap<String, Arc<dyn Function>>,
    casters: HashMap<String, Arc<dyn TypeCaster>>,
    constants: HashMap<String, Node>,
    preprocessors: HashMap<String, Arc<dyn Preprocessor>>,
    prices: HashMap<String, f64>,
    scopes: HashMap<String, LibraryTable>,
}

impl LibraryTable {
    /// Create new table with the standard library
    pub fn new() -> Self {
        #[allow(unused_mut)]
        let mut table = Self::empty();

        #[cfg(feature = "stdlib")]
        stdlib::register_all(&mut table);

        table
    }

    /// Create empty table (for testing and custom libraries)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register a function
    pub fn define_function<F: Function + 'static>(&mut self, name: &str, function: F) -> &mut Self {
        self.insert_function(name, Arc::new(function))
    }

    /// Register a pure synchronous function
    pub fn define_fn<F>(&mut self, name: &str, signature: Signature, body: F) -> &mut Self
    where
        F: Fn(&CallContext<'_>, Vec<Node>) -> Result<Node> + Send + Sync + 'static,
    {
        self.define_function(name, NativeFunction::new(signature, false, body))
    }

    /// Register an impure synchronous function
    pub fn define_impure_fn<F>(&mut self, name: &str, signature: Signature, body: F) -> &mut Self
    where
        F: Fn(&CallContext<'_>, Vec<Node>) -> Result<Node> + Send + Sync + 'static,
    {
        self.define_function(name, NativeFunction::new(signature, true, body))
    }

    /// Bind `alias` to the function already bound to `name`
    pub fn alias_function(&mut self, alias: &str, name: &str) -> &mut Self {
        match self.functions.get(name).cloned() {
            Some(function) => {
                if let Some(price) = self.prices.get(name).copied() {
                    self.prices.insert(alias.to_string(), price);
                }
                self.insert_function(alias, function)
            }
            None => {
                tracing::warn!(alias, name, "cannot alias undefined function `{}`", name);
                self
            }
        }
    }

    /// Register a type caster
    pub fn define_type<C: TypeCaster + 'static>(&mut self, name: &str, caster: C) -> &mut Self {
        if self.casters.contains_key(name) {
            tracing::warn!(name, "redefining type `{}`", name);
        }
        self.casters.insert(name.to_string(), Arc::new(caster));
        self
    }

    /// Bind `alias` to the type caster already bound to `name`
    pub fn alias_type(&mut self, alias: &str, name: &str) -> &mut Self {
        if let Some(caster) = self.casters.get(name).cloned() {
            self.casters.insert(alias.to_string(), caster);
        } else {
            tracing::warn!(alias, name, "cannot alias undefined type `{}`", name);
        }
        self
    }

    /// Register a constant
    pub fn define_constant(&mut self, name: &str, value: Node) -> &mut Self {
        if self.constants.contains_key(name) {
            tracing::warn!(name, "redefining constant `{}`", name);
        }
        self.constants.insert(name.to_string(), value);
        self
    }

    /// Register a preprocessor
    pub fn define_preprocessor<P: Preprocessor + 'static>(&mut self, name: &str, preprocessor: P) -> &mut Self {
        if self.preprocessors.contains_key(name) {
            tracing::warn!(name, "redefining preprocessor `{}`", name);
        }
        self.preprocessors.insert(name.to_string(), Arc::new(preprocessor));
        self
    }

    /// Set the extra balance debit for calling the function `name`
    pub fn define_price(&mut self, name: &str, price: f64) -> &mut Self {
        self.prices.insert(name.to_string(), price);
        self
    }

    /// Register a scope: `name` is bound to `function`, and names defined by
    /// `configure` take precedence inside lists headed by `name`
    pub fn define_scope<F, C>(&mut self, name: &str, function: F, configure: C) -> &mut Self
    where
        F: Function + 'static,
        C: FnOnce(&mut LibraryTable),
    {
        let mut table = self.scopes.remove(name).unwrap_or_default();
        configure(&mut table);
        self.scopes.insert(name.to_string(), table);
        self.define_function(name, function)
    }

    /// Check if a function exists in this table (ignoring scopes)
    pub fn has(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// List all function names
    pub fn function_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get function count
    pub fn count(&self) -> usize {
        self.functions.len()
    }

    fn insert_function(&mut self, name: &str, function: Arc<dyn Function>) -> &mut Self {
        if self.functions.contains_key(name) {
            tracing::warn!(name, "redefining function `{}`", name);
        }
        self.functions.insert(name.to_string(), function);
        self
    }

    /// Tables for the frames of `scope`, innermost first
    ///
    /// A frame's table is looked up among the enclosing frames' tables
    /// (innermost first) and then among the global scopes.
    fn scope_tables(&self, scope: &Scope) -> Vec<&LibraryTable> {
        let mut resolved: Vec<&LibraryTable> = Vec::with_capacity(scope.depth());
        for frame in scope.frames() {
            let table = resolved
                .iter()
                .rev()
                .copied()
                .find_map(|t| t.scopes.get(frame))
                .or_else(|| self.scopes.get(frame));
            if let Some(table) = table {
                resolved.push(table);
            }
        }
        resolved.reverse();
        resolved
    }

    fn scoped<T>(&self, scope: &Scope, lookup: impl Fn(&LibraryTable) -> Option<T>) -> Option<T> {
        if scope.is_global() {
            return lookup(self);
        }
        self.scope_tables(scope)
            .into_iter()
            .find_map(&lookup)
            .or_else(|| lookup(self))
    }
}

impl Library for LibraryTable {
    fn lookup_function(&self, name: &str, scope: &Scope) -> Option<Arc<dyn Function>> {
        self.scoped(scope, |t| t.functions.get(name).cloned())
    }

    fn lookup_type_caster(&self, name: &str, scope: &Scope) -> Option<Arc<dyn TypeCaster>> {
        self.scoped(scope, |t| t.casters.get(name).cloned())
    }

    fn lookup_constant(&self, name: &str, scope: &Scope) -> Option<Node> {
        self.scoped(scope, |t| t.constants.get(name).cloned())
    }

    fn lookup_preprocessor(&self, name: &str, scope: &Scope) -> Option<Arc<dyn Preprocessor>> {
        self.scoped(scope, |t| t.preprocessors.get(name).cloned())
    }

    fn lookup_inputs(&self, name: &str, scope: &Scope) -> Option<Signature> {
        self.lookup_function(name, scope).and_then(|f| f.signature())
    }

    fn lookup_price(&self, name: &str, scope: &Scope) -> Option<f64> {
        self.scoped(scope, |t| t.prices.get(name).copied())
    }

    fn is_impure_function(&self, name: &str, scope: &Scope) -> bool {
        self.lookup_function(name, scope)
            .map_or(false, |f| f.is_impure())
    }

    fn lookup_scope(&self, name: &str, scope: &Scope) -> bool {
        self.scoped(scope, |t| t.scopes.contains_key(name).then_some(()))
            .is_some()
    }
}
