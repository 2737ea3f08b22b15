//! Reduction engine for Runiq programs
//!
//! A run is a loop of reduction passes. Each pass walks the tree once:
//! quoting forms yield their payload, call-ready invocable lists are
//! invoked, and everything else is reduced as a sequence whose list
//! children are reduced concurrently. Between passes the result is settled:
//! values end the run, lists go around again unless they stopped changing.

use super::stack::StackGuarded;
use super::{Config, Event, MemoryStorage, Meter, Scope, SeededRng, Storage};
use crate::error::{Error, Result};
use crate::library::{CallContext, Library, PreprocessContext};
use crate::parser::{head_name, is_call_ready, is_invocable, render_list, Node, QUOTE_KEY};
use crate::types::{check_arity, preflight};
use futures_util::future::join_all;
use futures_util::FutureExt;
use parking_lot::Mutex;
use serde::Serialize;
use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Inputs shared by every branch of one run or step
struct RunInputs<'a> {
    argv: &'a [Node],
    event: Option<&'a Event>,
}

/// What to do after a pass
enum Settled {
    Done(Node),
    Continue(Node),
}

/// Snapshot of an interpreter's mutable state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterpreterState {
    /// Seed of the random stream
    pub seed: u64,
    /// Reduction steps taken since the last `run` started
    pub counter: u64,
    /// Remaining balance
    pub balance: f64,
    /// Exported storage contents
    pub storage: Node,
}

/// Runiq interpreter
///
/// One instance may serve a single `run` or a series of `step` calls. The
/// budget (balance and deadline) is fixed at construction and is only ever
/// spent, never reset.
pub struct Interpreter {
    config: Config,
    library: Arc<dyn Library>,
    storage: Arc<dyn Storage>,
    meter: Mutex<Meter>,
    counter: AtomicU64,
    seed: u64,
    rng: Mutex<SeededRng>,
}

impl Interpreter {
    /// Creates an interpreter with in-memory storage
    pub fn new(library: Arc<dyn Library>, config: Config) -> Self {
        Self::with_storage(library, config, Arc::new(MemoryStorage::new()))
    }

    /// Creates an interpreter with the given storage
    pub fn with_storage(library: Arc<dyn Library>, config: Config, storage: Arc<dyn Storage>) -> Self {
        let seed = config.seed.unwrap_or_else(random_seed);
        let meter = Meter::new(config.balance, config.timeout());
        Interpreter {
            config,
            library,
            storage,
            meter: Mutex::new(meter),
            counter: AtomicU64::new(0),
            seed,
            rng: Mutex::new(SeededRng::new(seed)),
        }
    }

    /// Configuration in effect
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Library used for name resolution
    pub fn library(&self) -> &Arc<dyn Library> {
        &self.library
    }

    /// Storage handed to functions
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Seed of the random stream
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Remaining balance
    pub fn balance(&self) -> f64 {
        self.meter.lock().balance()
    }

    /// Reduction steps taken since the last `run` started
    pub fn counter(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    /// Snapshot of seed, counter, balance and storage
    pub fn state(&self) -> InterpreterState {
        InterpreterState {
            seed: self.seed,
            counter: self.counter(),
            balance: self.balance(),
            storage: self.storage.export(),
        }
    }

    /// Names invoked by `program` that resolve to nothing; each is logged once
    pub fn preflight(&self, program: &Node) -> Vec<String> {
        preflight(self.library.as_ref(), program)
    }

    /// Reduces `program` to a final value
    ///
    /// `argv` is appended to the top-level list on the first pass and stays
    /// available to functions through their call context.
    pub async fn run(&self, program: Node, argv: Vec<Node>, event: Option<Event>) -> Result<Node> {
        self.counter.store(0, Ordering::SeqCst);
        if self.config.preflight_type_check {
            self.preflight(&program);
        }

        let inputs = RunInputs {
            argv: &argv,
            event: event.as_ref(),
        };
        let scope = Scope::global();
        let mut current = program;
        let mut first_pass = true;

        loop {
            let reduced = self.pass(current.clone(), &inputs, &scope, first_pass).await?;
            first_pass = false;
            match self.settle(&current, reduced, &scope) {
                Settled::Done(value) => return Ok(value),
                Settled::Continue(next) => current = next,
            }
        }
    }

    /// Performs exactly one reduction pass in the global scope
    pub async fn step(&self, program: Node, argv: Vec<Node>, event: Option<Event>) -> Result<Node> {
        self.step_in_scope(program, argv, event, &Scope::global()).await
    }

    /// Performs exactly one reduction pass in `scope`
    ///
    /// The result may still be reducible; feed it back in to continue.
    pub async fn step_in_scope(
        &self,
        program: Node,
        argv: Vec<Node>,
        event: Option<Event>,
        scope: &Scope,
    ) -> Result<Node> {
        let inputs = RunInputs {
            argv: &argv,
            event: event.as_ref(),
        };
        self.pass(program, &inputs, scope, true).await
    }

    async fn pass(
        &self,
        program: Node,
        inputs: &RunInputs<'_>,
        scope: &Scope,
        append_argv: bool,
    ) -> Result<Node> {
        if program.is_null() {
            return Err(self.fail(Error::BadInput));
        }

        match self.preprocess(program.denest(), inputs)? {
            Node::List(mut list) => {
                if append_argv {
                    list.extend(inputs.argv.iter().cloned());
                }
                self.branch(list, inputs, scope).await
            }
            value => Ok(value),
        }
    }

    /// Applies leading preprocessor forms, in order, to the rest of the program
    fn preprocess(&self, node: Node, inputs: &RunInputs<'_>) -> Result<Node> {
        let Node::List(mut program) = node else {
            return Ok(node);
        };

        let global = Scope::global();
        let mut found = Vec::new();
        while let Some(preprocessor) = program
            .first()
            .and_then(Node::head_name)
            .and_then(|name| self.library.lookup_preprocessor(name, &global))
        {
            found.push((preprocessor, program.remove(0)));
        }
        if found.is_empty() {
            return Ok(Node::List(program));
        }

        let ctx = PreprocessContext {
            id: self.counter(),
            seed: self.seed,
            argv: inputs.argv,
            event: inputs.event,
            storage: self.storage.as_ref(),
        };
        for (preprocessor, form) in found {
            let form = match form {
                Node::List(items) => items,
                other => vec![other],
            };
            program = preprocessor
                .expand(&ctx, form, program)
                .map_err(|e| self.fail(e))?;
        }
        Ok(Node::List(program))
    }

    fn branch<'a>(
        &'a self,
        list: Vec<Node>,
        inputs: &'a RunInputs<'a>,
        scope: &'a Scope,
    ) -> StackGuarded<'a, Result<Node>> {
        StackGuarded::new(self.unload(list, inputs, scope).boxed())
    }

    async fn unload(&self, list: Vec<Node>, inputs: &RunInputs<'_>, scope: &Scope) -> Result<Node> {
        let id = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        if self.config.debug {
            tracing::debug!(step = id, scope = %scope, "reducing {}", render_list(&list));
        }

        if is_quote_form(&list) {
            return self.quote(list);
        }
        if is_invocable(&list) && is_call_ready(&list) {
            return self.invoke(id, list, inputs, scope).await;
        }
        self.sequence(list, inputs, scope).await
    }

    fn quote(&self, mut list: Vec<Node>) -> Result<Node> {
        self.charge(self.config.quote_transaction, &list)?;
        let payload = list.pop().unwrap_or_default();
        if payload.is_value() {
            Ok(payload)
        } else {
            Ok(Node::quote(payload))
        }
    }

    async fn invoke(
        &self,
        id: u64,
        list: Vec<Node>,
        inputs: &RunInputs<'_>,
        scope: &Scope,
    ) -> Result<Node> {
        self.charge(self.config.invoke_transaction, &list)?;

        let requested = head_name(&list).unwrap_or_default().to_string();
        let args: Vec<Node> = list[1..]
            .iter()
            .cloned()
            .map(|arg| self.valuefy(arg.unquoted(), scope))
            .collect();

        let library = self.library.as_ref();
        let resolved = library
            .lookup_function(&requested, scope)
            .map(|function| (requested.clone(), function))
            .or_else(|| {
                let fallback = &self.config.function_missing_name;
                library
                    .lookup_function(fallback, scope)
                    .map(|function| (fallback.clone(), function))
            });

        if let Some((name, function)) = resolved {
            if let Some(price) = library.lookup_price(&name, scope) {
                self.charge(-price, &list)?;
            }
            if self.config.runtime_type_check {
                let signature = library.lookup_inputs(&name, scope);
                check_arity(&name, signature.as_ref(), &args).map_err(|e| self.fail(e))?;
            }
            if library.is_impure_function(&name, scope) {
                if !self.config.allow_impure_functions {
                    return Err(self.fail(Error::Impurity { name }));
                }
                if self.config.warn_on_impure_functions {
                    tracing::warn!(name = %name, "calling impure function `{}`", name);
                }
            }

            let ctx = CallContext {
                id,
                seed: self.seed,
                name: &requested,
                list: &list,
                argv: inputs.argv,
                event: inputs.event,
                storage: self.storage.as_ref(),
                scope,
                rng: &self.rng,
            };
            return function.call(&ctx, args).await.map_err(|e| self.fail(e));
        }

        if let Some(caster) = library.lookup_type_caster(&requested, scope) {
            return caster.cast(&args).map_err(|e| self.fail(e));
        }

        if let Some(constant) = library.lookup_constant(&requested, scope) {
            if args.is_empty() {
                return Ok(constant);
            }
            // Constants may denote sub-programs; splice and reduce again
            let mut list = list;
            list[0] = constant;
            return Ok(Node::List(list));
        }

        // Unknown names degrade to literals; unknown calls wait for a later pass
        if args.is_empty() {
            Ok(Node::String(requested))
        } else {
            Ok(Node::List(list))
        }
    }

    async fn sequence(&self, mut list: Vec<Node>, inputs: &RunInputs<'_>, scope: &Scope) -> Result<Node> {
        if list.is_empty() {
            return Ok(Node::List(list));
        }

        let scope: Cow<'_, Scope> = match head_name(&list) {
            Some(name) if self.library.lookup_scope(name, scope) => Cow::Owned(scope.push(name)),
            _ => Cow::Borrowed(scope),
        };
        self.charge(self.config.sequence_transaction * list.len() as f64, &list)?;

        let (indices, children): (Vec<usize>, Vec<Vec<Node>>) = list
            .iter_mut()
            .enumerate()
            .filter_map(|(index, node)| match node {
                Node::List(items) => Some((index, std::mem::take(items))),
                _ => None,
            })
            .unzip();

        // All siblings start before any is awaited; the join is a barrier
        let results = join_all(
            children
                .into_iter()
                .map(|items| self.branch(items, inputs, &scope)),
        )
        .await;

        for (index, result) in indices.into_iter().zip(results) {
            list[index] = result?;
        }

        if is_invocable(&list) {
            Ok(Node::List(list))
        } else {
            Ok(list.pop().unwrap_or_default())
        }
    }

    fn settle(&self, input: &Node, reduced: Node, scope: &Scope) -> Settled {
        match reduced {
            Node::Quote(inner) => Settled::Done(*inner),
            Node::List(items) if !items.is_empty() => {
                let compacted = Node::List(items.into_iter().filter(|n| !n.is_null()).collect());
                if self.config.irreducible_list_check && compacted.same_structure(input) {
                    tracing::warn!("irreducible list, returning it as is: {}", compacted);
                    Settled::Done(compacted)
                } else {
                    Settled::Continue(compacted)
                }
            }
            value => Settled::Done(self.valuefy(value, scope)),
        }
    }

    /// Replaces a bare constant name with the constant
    fn valuefy(&self, node: Node, scope: &Scope) -> Node {
        match node {
            Node::String(name) => self
                .library
                .lookup_constant(&name, scope)
                .unwrap_or(Node::String(name)),
            other => other,
        }
    }

    fn charge(&self, amount: f64, list: &[Node]) -> Result<()> {
        if self.meter.lock().transact(amount) {
            return Ok(());
        }
        Err(self.fail(Error::OutOfGas {
            node: Box::new(Node::List(list.to_vec())),
        }))
    }

    fn fail(&self, error: Error) -> Error {
        tracing::error!(error = %error, "reduction failed");
        error
    }
}

fn is_quote_form(list: &[Node]) -> bool {
    matches!(head_name(list), Some(name) if name == "quote" || name == QUOTE_KEY)
}

fn random_seed() -> u64 {
    uuid::Uuid::new_v4().as_u128() as u64
}
