//! End-to-end reduction tests for the Runiq interpreter

use runiq::{Config, Error, Event, Interpreter, LibraryTable, Node, NativeFunction, Result, Signature};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

fn interpreter(config: Config) -> Interpreter {
    Interpreter::new(Arc::new(LibraryTable::new()), config)
}

async fn run(program: Value) -> Result<Node> {
    run_with(program, vec![], None, Config::default()).await
}

async fn run_with(
    program: Value,
    argv: Vec<Node>,
    event: Option<Event>,
    config: Config,
) -> Result<Node> {
    interpreter(config).run(Node::from(program), argv, event).await
}

/// Standard library plus `foo`, which joins its arguments' text
fn joining_library() -> LibraryTable {
    let mut library = LibraryTable::new();
    library.define_fn("foo", Signature::Any, |_, args| {
        Ok(Node::String(args.iter().map(Node::to_text).collect()))
    });
    library
}

// ====================
// Values and arithmetic
// ====================

#[tokio::test]
async fn test_simple_arithmetic() {
    let result = run(json!(["+", 1, ["*", 2, 3]])).await.unwrap();
    assert_eq!(result, Node::Number(7.0));
}

#[tokio::test]
async fn test_empty_list_argument_coerces_to_text() {
    let result = run(json!(["+", 1, ["list"]])).await.unwrap();
    assert_eq!(result, Node::from("1"));
}

#[tokio::test]
async fn test_constants() {
    let result = run(json!(["+", "PI", "E"])).await.unwrap();
    assert_eq!(result, Node::Number(5.859874482048838));
    assert_eq!(run(json!(["true"])).await.unwrap(), Node::Bool(true));
}

#[tokio::test]
async fn test_quote_returns_payload() {
    let result = run(json!(["quote", ["+", 1, 2]])).await.unwrap();
    assert_eq!(result, Node::from(json!(["+", 1, 2])));
}

#[tokio::test]
async fn test_deeply_wrapped_program() {
    let result = run(json!([[[[[[1, [[12, [[0]]]], [[[["+", 0, 123]]]]]]]]]])).await.unwrap();
    assert_eq!(result, Node::Number(123.0));
}

#[tokio::test]
async fn test_eval_parses_and_runs() {
    assert_eq!(run(json!(["eval", "(+ 1 2)"])).await.unwrap(), Node::Number(3.0));
}

// ====================
// Parallel siblings
// ====================

#[tokio::test]
async fn test_sequence_keeps_last_sibling() {
    let program = json!([[
        ["+", 1, 2],
        ["-", 3, 2],
        ["*", 5, 2],
        ["/", 7, 2],
        ["+", 9, 2],
        ["-", 1, 2],
        ["*", 3, 2]
    ]]);
    assert_eq!(run(program).await.unwrap(), Node::Number(6.0));
}

#[tokio::test]
async fn test_nested_siblings_keep_positions() {
    let program = json!([[
        "foo",
        ["+", 1, 2],
        ["-", 3, 2],
        ["*", 5, 2],
        ["/", 7, [["+", 3, 3], ["-", 3, 3], ["*", 5, 3], ["/", 7, 3], ["+", 9, 3], ["-", 1, 3], ["*", 1, 2]]],
        ["+", 9, 2],
        ["-", 1, 2],
        ["*", 3, 2]
    ]]);
    let interp = Interpreter::new(Arc::new(joining_library()), Config::default());
    let result = interp.run(Node::from(program), vec![], None).await.unwrap();
    assert_eq!(result, Node::from("31103.511-16"));
}

#[tokio::test]
async fn test_timed_siblings_join_in_position_order() {
    // Later siblings finish first; results still land by position
    let program = json!([[
        "foo",
        ["after", 50, {"'": ["+", 1, 2]}],
        ["after", 40, {"'": ["-", 3, 2]}],
        ["after", 30, {"'": ["*", 5, 2]}],
        ["after", 20, {"'": ["/", 7, 2]}],
        ["after", 10, {"'": ["+", 9, 2]}]
    ]]);
    let interp = Interpreter::new(Arc::new(joining_library()), Config::default());
    let result = interp.run(Node::from(program), vec![], None).await.unwrap();
    assert_eq!(result, Node::from("31103.511"));
}

// ====================
// Lambdas and binding
// ====================

#[tokio::test]
async fn test_argv_applies_to_top_level_lambda() {
    let program = json!(["lambda", "a", "b", "c", ["quote", ["+", "a", ["-", "b", "c"]]]]);
    let argv = vec![Node::Number(1.0), Node::Number(11.0), Node::Number(7.0)];
    let result = run_with(program, argv, None, Config::default()).await.unwrap();
    assert_eq!(result, Node::Number(5.0));
}

#[tokio::test]
async fn test_if_else_inside_lambda() {
    let program = json!([[
        "call",
        ["lambda", "a", "b", "c", ["quote",
            ["if", [">=", "c", 6],
                ["quote", ["-", "b", 23]],
             "else",
                ["quote", ["a"]]]
        ]],
        1, 3, 7
    ]]);
    assert_eq!(run(program).await.unwrap(), Node::Number(-20.0));
}

#[tokio::test]
async fn test_lambda_partial_application() {
    let program = json!([["lambda", "a", "b", "c", ["quote", ["+", "a", ["-", "b", "c"]]], 1, 2]]);
    assert_eq!(
        run(program).await.unwrap(),
        Node::from(json!(["lambda", "c", {"'": ["+", 1, ["-", 2, "c"]]}]))
    );
}

#[tokio::test]
async fn test_lambda_partial_then_call() {
    let program = json!([
        "call", ["lambda", "a", "b", "c", ["quote", ["+", "a", ["-", "b", "c"]]], 1, 2], 3
    ]);
    assert_eq!(run(program).await.unwrap(), Node::Number(0.0));
}

#[tokio::test]
async fn test_let_binds_quoted_lambda() {
    let program = json!([
        "let", "wow", ["quote", ["lambda", "n", ["quote", ["+", "n", "n"]]]],
        "call", "wow", 123
    ]);
    assert_eq!(run(program).await.unwrap(), Node::Number(246.0));
}

#[tokio::test]
async fn test_recursive_fibonacci() {
    let program = json!([[
        "ycomb",
        ["lambda", "fn", "n", ["quote",
            ["if", ["<=", "n", 2],
                ["quote", [1]],
             "else",
                ["quote", ["+",
                    ["ycomb", "fn", ["-", "n", 1]],
                    ["ycomb", "fn", ["-", "n", 2]]
                ]]
            ]
        ]],
        16
    ]]);
    assert_eq!(run(program).await.unwrap(), Node::Number(987.0));
}

// ====================
// Lists
// ====================

#[tokio::test]
async fn test_list_results() {
    assert_eq!(
        run(json!([["list", 1, 2, 3]])).await.unwrap(),
        Node::from(json!([1, 2, 3]))
    );
    assert_eq!(
        run(json!([["list", 1, 2, 3, ["list", 4, 5, 6]]])).await.unwrap(),
        Node::from(json!([1, 2, 3, [4, 5, 6]]))
    );
    assert_eq!(
        run(json!([["list", 1, 2, 3, ["list", "+", 5, 6]]])).await.unwrap(),
        Node::from(json!([1, 2, 3, ["+", 5, 6]]))
    );
}

#[tokio::test]
async fn test_list_filter() {
    let program = json!([
        "list.filter", ["quote", [1, 2, 3]], ["lambda", "e", ["quote", [">", "e", 1]]]
    ]);
    assert_eq!(run(program).await.unwrap(), Node::from(json!([2, 3])));
}

#[tokio::test]
async fn test_list_find_index() {
    let program = json!([[
        "list.find-index", ["quote", [1, 2, 3]], ["lambda", "e", ["quote", ["==", "e", 3]]]
    ]]);
    assert_eq!(run(program).await.unwrap(), Node::Number(2.0));
}

#[tokio::test]
async fn test_list_map() {
    let program = json!([
        "list.map", ["quote", [1, 2, 3]], ["lambda", "e", ["quote", ["*", "e", 10]]]
    ]);
    assert_eq!(run(program).await.unwrap(), Node::from(json!([10, 20, 30])));
}

#[tokio::test]
async fn test_hash_casting() {
    let program = json!([[
        "hash.to-json",
        ["hash",
            "a", 1,
            "b", 2,
            "c", 3,
            "d", ["number", "1"],
            "e", ["string", 1],
            "f", ["bool", 1],
            "g", ["hash", "foo", "bar"],
            "h", ["list", 1, 2, 3]
        ]
    ]]);
    let expected = r#"{"a":1,"b":2,"c":3,"d":1,"e":"1","f":true,"g":{"foo":"bar"},"h":[1,2,3]}"#;
    assert_eq!(run(program).await.unwrap(), Node::from(expected));
}

// ====================
// Events
// ====================

#[tokio::test]
async fn test_event_runs_matching_reaction_only() {
    let program = json!([
        "list",
        ["event", "foobar", "foobar-payload", ["quote", [
            ["+", ["hash.fetch", "foobar-payload", "value"], 11]
        ]]],
        ["event", "barfoo", "barfoo-payload", ["quote", [
            ["+", ["hash.fetch", "barfoo-payload", "value"], 10000]
        ]]]
    ]);
    let event = Event::new("foobar", Node::from(json!({"value": 12})));
    let result = run_with(program, vec![], Some(event), Config::default()).await.unwrap();
    assert_eq!(result, Node::from(json!([23])));
}

#[tokio::test]
async fn test_event_wildcard() {
    let program = json!([["event", "*", "p", ["quote", ["+", "p", 1]]]]);
    let event = Event::new("anything", Node::Number(41.0));
    let result = run_with(program, vec![], Some(event), Config::default()).await.unwrap();
    assert_eq!(result, Node::Number(42.0));
}

#[tokio::test]
async fn test_irreducible_list_is_returned() {
    let program = json!([["event", "ready", "_", ["quote", ["dom-text", "howdy"]]]]);
    let event = Event::new("ready", Node::Number(123.0));
    let result = run_with(program, vec![], Some(event), Config::default()).await.unwrap();
    assert_eq!(result, Node::from(json!(["dom-text", "howdy"])));
}

#[tokio::test]
async fn test_irreducible_list_holding_nan_terminates() {
    let result = run(json!(["mystery", ["/", 0, 0]])).await.unwrap();
    match result {
        Node::List(items) => {
            assert_eq!(items[0], Node::from("mystery"));
            assert!(matches!(items[1], Node::Number(n) if n.is_nan()));
        }
        other => panic!("expected the stuck call back, got {}", other),
    }
}

// ====================
// Budget and policy errors
// ====================

#[tokio::test]
async fn test_zero_balance_is_out_of_gas() {
    let config = Config::default().with_balance(0.0);
    let err = run_with(json!(["+", 1, 2]), vec![], None, config).await.unwrap_err();
    assert!(matches!(err, Error::OutOfGas { .. }));
}

#[tokio::test]
async fn test_expired_deadline_is_out_of_gas() {
    let config = Config::default().with_timeout(Duration::ZERO);
    let err = run_with(json!(["+", 1, 2]), vec![], None, config).await.unwrap_err();
    assert!(matches!(err, Error::OutOfGas { .. }));
}

#[tokio::test]
async fn test_balance_is_spent_per_operation() {
    let interp = interpreter(Config::default().with_balance(100.0));
    interp.run(Node::from(json!(["+", 1, ["*", 2, 3]])), vec![], None).await.unwrap();
    // two invocations plus one sequenced list of three elements
    assert_eq!(interp.balance(), 95.0);
}

#[tokio::test]
async fn test_too_many_arguments() {
    let err = run(json!(["+", 1, 2, 3])).await.unwrap_err();
    assert!(matches!(err, Error::Signature { ref name, .. } if name == "+"));
}

#[tokio::test]
async fn test_impure_function_rejected() {
    let config = Config {
        allow_impure_functions: false,
        ..Config::default()
    };
    let err = run_with(json!(["time.now"]), vec![], None, config).await.unwrap_err();
    assert!(matches!(err, Error::Impurity { ref name } if name == "time.now"));
}

#[tokio::test]
async fn test_failed_run_leaves_interpreter_usable() {
    let interp = interpreter(Config::default());
    assert!(interp.run(Node::from(json!(["+", 1, 2, 3])), vec![], None).await.is_err());
    let result = interp.run(Node::from(json!(["+", 1, 2])), vec![], None).await.unwrap();
    assert_eq!(result, Node::Number(3.0));
}

// ====================
// Scopes
// ====================

#[tokio::test]
async fn test_scope_overrides_function() {
    let mut library = LibraryTable::new();
    library.define_fn("greet", Signature::Nothing, |_, _| Ok(Node::from("hello")));
    library.define_scope(
        "french",
        NativeFunction::new(Signature::Any, false, |_, args| {
            Ok(args.into_iter().next().unwrap_or_default())
        }),
        |scope| {
            scope.define_fn("greet", Signature::Nothing, |_, _| Ok(Node::from("bonjour")));
        },
    );
    let interp = Interpreter::new(Arc::new(library), Config::default());

    let scoped = interp.run(Node::from(json!(["french", ["greet"]])), vec![], None).await.unwrap();
    assert_eq!(scoped, Node::from("bonjour"));

    let global = interp.run(Node::from(json!([["greet"]])), vec![], None).await.unwrap();
    assert_eq!(global, Node::from("hello"));
}

// ====================
// Stepping
// ====================

#[tokio::test]
async fn test_step_reduces_one_level_per_pass() {
    let steps = [
        json!(["+", 1, ["-", 2, ["*", 3, ["/", 4, 5]]]]),
        json!(["+", 1, ["-", 2, ["*", 3, 0.8]]]),
        json!(["+", 1, ["-", 2, 2.4000000000000004]]),
        json!(["+", 1, -0.40000000000000036]),
        json!(0.5999999999999996),
    ];
    let interp = interpreter(Config::default());
    for pair in steps.windows(2) {
        let next = interp.step(Node::from(pair[0].clone()), vec![], None).await.unwrap();
        assert_eq!(next, Node::from(pair[1].clone()));
    }

    let run = interp.run(Node::from(steps[0].clone()), vec![], None).await.unwrap();
    assert_eq!(run, Node::from(steps[4].clone()));
}

#[tokio::test]
async fn test_step_counter_survives_steps_and_resets_on_run() {
    let interp = interpreter(Config::default());
    interp.step(Node::from(json!(["+", 1, 2])), vec![], None).await.unwrap();
    interp.step(Node::from(json!(["+", 1, 2])), vec![], None).await.unwrap();
    assert_eq!(interp.counter(), 2);

    interp.run(Node::from(json!(["+", 1, 2])), vec![], None).await.unwrap();
    assert_eq!(interp.counter(), 1);
}

// ====================
// Storage and state
// ====================

#[tokio::test]
async fn test_storage_persists_across_runs() {
    let interp = interpreter(Config::default());
    interp
        .run(Node::from(json!(["store.set", "user.name", "ada"])), vec![], None)
        .await
        .unwrap();
    let name = interp
        .run(Node::from(json!(["store.get", "user.name"])), vec![], None)
        .await
        .unwrap();
    assert_eq!(name, Node::from("ada"));
    assert_eq!(interp.state().storage, Node::from(json!({"user": {"name": "ada"}})));
}

#[tokio::test]
async fn test_storage_rejects_out_of_range_list_index() {
    let interp = interpreter(Config::default());
    interp
        .run(Node::from(json!(["store.set", "a", {"'": [1]}])), vec![], None)
        .await
        .unwrap();
    let err = interp
        .run(Node::from(json!(["store.set", "a.18446744073709551615", 1])), vec![], None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TypeError { .. }));

    // the interpreter and its storage stay usable
    interp
        .run(Node::from(json!(["store.set", "a.1", 2])), vec![], None)
        .await
        .unwrap();
    assert_eq!(interp.state().storage, Node::from(json!({"a": [1, 2]})));
}

#[tokio::test]
async fn test_seeded_random_is_reproducible() {
    let first = run_with(json!(["math.rand"]), vec![], None, Config::default().with_seed(42))
        .await
        .unwrap();
    let second = run_with(json!(["math.rand"]), vec![], None, Config::default().with_seed(42))
        .await
        .unwrap();
    assert_eq!(first, second);
    let value = first.as_f64().unwrap();
    assert!((0.0..1.0).contains(&value));
}

// ====================
// Stack resilience
// ====================

fn nested_additions(depth: usize) -> Node {
    let mut node = Node::Number(0.0);
    for _ in 0..depth {
        node = Node::List(vec![Node::from("+"), Node::Number(1.0), node]);
    }
    node
}

#[test]
fn test_deep_program_grows_stack() {
    // A small thread stack forces the reducer to grow it on demand
    let handle = std::thread::Builder::new()
        .stack_size(4 * 1024 * 1024)
        .spawn(|| {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async {
                let interp = interpreter(Config::default());
                let stepped = interp.step(nested_additions(4_000), vec![], None).await.unwrap();
                assert!(stepped.is_list());

                let value = interp.run(nested_additions(300), vec![], None).await.unwrap();
                assert_eq!(value, Node::Number(300.0));
            });
        })
        .unwrap();
    handle.join().unwrap();
}
