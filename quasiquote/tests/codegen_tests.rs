//! End-to-end tests compiling fragments with the system C compiler.
//!
//! Every test returns early when no compiler can be run.

#[macro_use]
mod common;

use common::Workspace;
use quasiquote::{
    cleanup, collect_fragments, FromFile, MapScope, QuoteError, QuoteKind, Quoter,
    QuoterRegistry, Value,
};
use quasiquote_lexer::transform_source;

#[test]
fn test_stmt_discovers_capture_with_one_retry() {
    require_cc!();
    let ws = Workspace::new();
    let quoter = ws.quoter();
    let mut scope = MapScope::new().with_local("x", 21);

    quoter
        .quote_stmt("    x = qq_int(qq_as_int(x) * 2);\n", &ws.site(2, 0), &mut scope)
        .unwrap();

    assert_eq!(scope.local("x"), Some(&Value::I64(42)));
    let stats = quoter.stats();
    assert_eq!(stats.generations, 1);
    assert_eq!(stats.retries, 1);
    assert_eq!(stats.compiler_invocations, 2);
}

#[test]
fn test_discovered_capture_matches_declared_version() {
    require_cc!();
    let ws = Workspace::new();
    let quoter = ws.quoter();
    let scope = MapScope::new().with_local("x", 21);

    let discovered = quoter
        .quote_expr("qq_int(qq_as_int(x) * 2)", &ws.site(3, 4), &scope)
        .unwrap();
    assert_eq!(quoter.stats().retries, 1);

    let declared = quoter
        .quote_expr(
            "({ qq_value x = qq_int(21); qq_int(qq_as_int(x) * 2); })",
            &ws.site(4, 4),
            &MapScope::new(),
        )
        .unwrap();
    assert_eq!(quoter.stats().retries, 1);
    assert_eq!(discovered, declared);
    assert_eq!(declared, Value::I64(42));
}

#[test]
fn test_syntax_error_is_not_retried() {
    require_cc!();
    let ws = Workspace::new();
    let quoter = ws.quoter();

    let err = quoter
        .quote_stmt("    int a = ;\n", &ws.site(2, 0), &mut MapScope::new())
        .unwrap_err();

    match err {
        QuoteError::CompilationError { diagnostics, location } => {
            assert!(diagnostics.contains("error"));
            assert_eq!(location.line, 2);
        }
        other => panic!("expected a compilation error, got {other:?}"),
    }
    assert_eq!(quoter.stats().compiler_invocations, 1);
    assert_eq!(quoter.stats().retries, 0);
    assert!(ws.generated_files().is_empty());
}

#[test]
fn test_retry_that_still_fails() {
    require_cc!();
    let ws = Workspace::new();
    let quoter = ws.quoter();
    let mut scope = MapScope::new().with_local("x", 1);

    let err = quoter
        .quote_stmt("    x = qq_int(1)\n", &ws.site(2, 0), &mut scope)
        .unwrap_err();

    assert!(matches!(err, QuoteError::CompilationError { .. }));
    let stats = quoter.stats();
    assert_eq!(stats.generations, 1);
    assert_eq!(stats.retries, 1);
    assert_eq!(stats.compiler_invocations, 2);
    assert_eq!(scope.local("x"), Some(&Value::I64(1)));
    assert_eq!(quoter.cached(), 0);
    assert!(ws.generated_files().is_empty());
}

#[test]
fn test_repeated_site_compiles_once() {
    require_cc!();
    let ws = Workspace::new();
    let quoter = ws.quoter();
    let site = ws.site(5, 4);

    for _ in 0..5 {
        let value = quoter.quote_expr("qq_int(7)", &site, &MapScope::new()).unwrap();
        assert_eq!(value, Value::I64(7));
    }

    let stats = quoter.stats();
    assert_eq!(stats.compiler_invocations, 1);
    assert_eq!(stats.memory_hits, 4);
    assert_eq!(quoter.cached(), 1);
}

#[test]
fn test_repeated_site_with_captures() {
    require_cc!();
    let ws = Workspace::new();
    let quoter = ws.quoter();
    let site = ws.site(5, 4);

    let mut results = Vec::new();
    for n in 0..4 {
        let scope = MapScope::new().with_local("n", n);
        results.push(quoter.quote_expr("qq_int(qq_as_int(n) + 1)", &site, &scope).unwrap());
    }

    assert_eq!(results, vec![Value::I64(1), Value::I64(2), Value::I64(3), Value::I64(4)]);
    assert_eq!(quoter.stats().compiler_invocations, 2);
    assert_eq!(quoter.stats().memory_hits, 3);
}

#[test]
fn test_artifact_reused_by_fresh_quoter() {
    require_cc!();
    let ws = Workspace::new();
    let site = ws.site(3, 0);
    let code = "    total = qq_int(qq_as_int(total) + 5);\n";

    {
        let first = ws.quoter();
        let mut scope = MapScope::new().with_local("total", 1);
        first.quote_stmt(code, &site, &mut scope).unwrap();
        assert_eq!(scope.local("total"), Some(&Value::I64(6)));
    }
    // Sources go, the artifact stays
    let files = ws.generated_files();
    assert_eq!(files.len(), 1);
    assert!(!files[0].ends_with(".c"));

    let second = ws.quoter();
    let mut scope = MapScope::new().with_local("total", 10);
    second.quote_stmt(code, &site, &mut scope).unwrap();

    assert_eq!(scope.local("total"), Some(&Value::I64(15)));
    assert_eq!(second.stats().artifact_hits, 1);
    assert_eq!(second.stats().compiler_invocations, 0);
}

#[test]
fn test_artifact_removed_when_not_kept() {
    require_cc!();
    let ws = Workspace::new();
    let quoter = ws.builder().keep_artifact(false).build();

    let value = quoter.quote_expr("qq_int(1)", &ws.site(2, 0), &MapScope::new()).unwrap();

    assert_eq!(value, Value::I64(1));
    assert!(ws.generated_files().is_empty());
    // Still answered from memory
    quoter.quote_expr("qq_int(1)", &ws.site(2, 0), &MapScope::new()).unwrap();
    assert_eq!(quoter.stats().compiler_invocations, 1);
}

#[test]
fn test_kept_source_is_rebuilt() {
    require_cc!();
    let ws = Workspace::new();
    let site = ws.site(2, 0);
    let code = "    y = qq_int(qq_as_int(y) - 1);\n";

    {
        let first = ws.builder().keep_source(true).keep_artifact(false).build();
        first.quote_stmt(code, &site, &mut MapScope::new().with_local("y", 3)).unwrap();
    }
    let files = ws.generated_files();
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with(".c"));

    let second = ws.builder().keep_source(true).keep_artifact(false).build();
    let mut scope = MapScope::new().with_local("y", 10);
    second.quote_stmt(code, &site, &mut scope).unwrap();

    assert_eq!(scope.local("y"), Some(&Value::I64(9)));
    let stats = second.stats();
    assert_eq!(stats.source_builds, 1);
    assert_eq!(stats.generations, 0);
    assert_eq!(stats.compiler_invocations, 1);
}

#[test]
fn test_same_text_at_two_sites() {
    require_cc!();
    let ws = Workspace::new();
    let quoter = ws.quoter();

    quoter.quote_expr("qq_int(2)", &ws.site(2, 0), &MapScope::new()).unwrap();
    quoter.quote_expr("qq_int(2)", &ws.site(9, 0), &MapScope::new()).unwrap();

    assert_eq!(ws.generated_files().len(), 2);
    assert_eq!(quoter.stats().compiler_invocations, 2);
}

#[test]
fn test_write_back_only_touches_existing_locals() {
    require_cc!();
    let ws = Workspace::new();
    let quoter = ws.quoter();
    let mut scope = MapScope::new().with_local("x", 1).with_global("g", 5);

    quoter
        .quote_stmt(
            "    x = qq_int(qq_as_int(g) + 1);\n    g = qq_int(0);\n",
            &ws.site(2, 0),
            &mut scope,
        )
        .unwrap();

    assert_eq!(scope.local("x"), Some(&Value::I64(6)));
    assert_eq!(scope.local("g"), None);
    assert_eq!(scope.globals.get("g"), Some(&Value::I64(5)));
}

#[test]
fn test_block_locals_are_not_captured() {
    require_cc!();
    let ws = Workspace::new();
    let quoter = ws.quoter();
    let mut scope = MapScope::new().with_local("x", 0);

    quoter
        .quote_stmt(
            "    int64_t i, acc = 0;\n    for (i = 1; i <= 4; ++i) {\n        acc += i;\n    }\n    x = qq_int(acc);\n",
            &ws.site(2, 0),
            &mut scope,
        )
        .unwrap();

    assert_eq!(scope.local("x"), Some(&Value::I64(10)));
    assert_eq!(scope.locals.len(), 1);
}

#[test]
fn test_missing_capture_is_name_error() {
    require_cc!();
    let ws = Workspace::new();
    let quoter = ws.quoter();

    let err = quoter
        .quote_expr("qq_int(qq_as_int(missing))", &ws.site(6, 4), &MapScope::new())
        .unwrap_err();

    assert!(matches!(err, QuoteError::NameNotDefined { ref name, .. } if name == "missing"));
}

#[test]
fn test_qq_fail_reports_message() {
    require_cc!();
    let ws = Workspace::new();
    let quoter = ws.quoter();

    let err = quoter
        .quote_stmt("    qq_fail(\"bad input\");\n", &ws.site(2, 0), &mut MapScope::new())
        .unwrap_err();

    match err {
        QuoteError::FragmentFailed { message, location } => {
            assert_eq!(message, "bad input");
            assert_eq!(location.line, 2);
        }
        other => panic!("expected a fragment failure, got {other:?}"),
    }
}

#[test]
fn test_warnings_are_collected() {
    require_cc!();
    let ws = Workspace::new();
    let quoter = ws.builder().extra_flag("-Wall").build();

    quoter
        .quote_stmt("    int unused_local;\n", &ws.site(2, 0), &mut MapScope::new())
        .unwrap();

    let warnings = quoter.take_warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].diagnostics.contains("unused_local"));
    assert!(quoter.take_warnings().is_empty());
}

#[test]
fn test_string_and_float_values() {
    require_cc!();
    let ws = Workspace::new();
    let quoter = ws.quoter();
    let scope = MapScope::new().with_local("s", "hello").with_local("f", 3.0);

    let len = quoter
        .quote_expr("qq_int((int64_t)strlen(qq_as_str(s)))", &ws.site(2, 0), &scope)
        .unwrap();
    assert_eq!(len, Value::I64(5));

    let half = quoter.quote_expr("qq_float(qq_as_float(f) / 2)", &ws.site(3, 0), &scope).unwrap();
    assert_eq!(half, Value::F64(1.5));

    let text = quoter.quote_expr("qq_str(\"hi\")", &ws.site(4, 0), &scope).unwrap();
    assert_eq!(text, Value::from("hi"));
}

#[test]
fn test_evicted_site_reloads_from_disk() {
    require_cc!();
    let ws = Workspace::new();
    let quoter = ws.quoter();
    let site = ws.site(2, 0);

    quoter.quote_expr("qq_bool(1)", &site, &MapScope::new()).unwrap();
    assert!(quoter.evict(QuoteKind::Expr, &site));
    let value = quoter.quote_expr("qq_bool(1)", &site, &MapScope::new()).unwrap();

    assert_eq!(value, Value::Bool(true));
    assert_eq!(quoter.stats().artifact_hits, 1);
}

#[test]
fn test_rewritten_source_through_registry() {
    require_cc!();
    let ws = Workspace::new();
    let source = "x = 20\nwith $c:\n    x = qq_int(qq_as_int(x) + 1);\ny = [$c|qq_int(qq_as_int(x) * 2)|]\n";
    let rewritten = transform_source(source).unwrap();
    let fragments = collect_fragments(&ws.unit(), &rewritten).unwrap();
    assert_eq!(fragments.len(), 2);

    let mut registry = QuoterRegistry::new();
    registry.register("c", ws.quoter());
    let mut scope = MapScope::new().with_local("x", 20);

    let results: Vec<Value> = fragments
        .iter()
        .map(|fragment| registry.dispatch(fragment, &mut scope).unwrap())
        .collect();

    assert_eq!(results, vec![Value::Nothing, Value::I64(42)]);
    assert_eq!(scope.local("x"), Some(&Value::I64(21)));
}

#[test]
fn test_fromfile_over_c() {
    require_cc!();
    let ws = Workspace::new();
    ws.write("double.c", "qq_int(qq_as_int(x) * 2)\n");
    ws.write("bump.c", "    x = qq_int(qq_as_int(x) + 1);\n");
    let quoter = FromFile::new(ws.quoter()).with_base_dir(ws.path());
    let mut scope = MapScope::new().with_local("x", 4);

    let value = quoter.quote_expr(" double.c ", &ws.site(2, 4), &scope).unwrap();
    assert_eq!(value, Value::I64(8));

    quoter.quote_stmt("    bump.c\n", &ws.site(3, 0), &mut scope).unwrap();
    assert_eq!(scope.local("x"), Some(&Value::I64(5)));
}

#[test]
fn test_cleanup_removes_generated_files() {
    require_cc!();
    let ws = Workspace::new();
    let quoter = ws.builder().keep_source(true).build();
    quoter.quote_expr("qq_int(3)", &ws.site(2, 0), &MapScope::new()).unwrap();
    assert_eq!(ws.generated_files().len(), 2);

    let removed = cleanup(ws.path(), false).unwrap();

    assert_eq!(removed.len(), 2);
    assert!(ws.generated_files().is_empty());
    assert!(ws.path().join("include").join("quasiquote.h").exists());
}
