use expect_test::{Expect, expect};
use monkey_syntax::{SyntaxElement, SyntaxKind, SyntaxNode};
use text_size::{TextRange, TextSize};

use crate::{Edit, EditError, Parse, parse, parse_incremental};

fn check(text: &str, expect: Expect) {
    expect.assert_eq(&parse(text).tree().dump());
}

/// Applies `(start, old_len, replacement)` changes to `text` and
/// returns the edited text together with the equivalent edit list.
fn apply(text: &str, changes: &[(u32, u32, &str)]) -> (String, Vec<Edit>) {
    let mut new_text = text.to_string();
    for &(start, old_len, replacement) in changes.iter().rev() {
        new_text.replace_range(start as usize..(start + old_len) as usize, replacement);
    }
    let edits = changes
        .iter()
        .map(|&(start, old_len, replacement)| {
            Edit::replace(start.into(), old_len.into(), TextSize::of(replacement))
        })
        .collect();
    (new_text, edits)
}

/// Incremental parse after `changes` must match a scratch parse of the
/// edited text node-for-node, diagnostics included.
fn check_incremental(text: &str, changes: &[(u32, u32, &str)]) -> Parse {
    let base = parse(text);
    let (new_text, edits) = apply(text, changes);
    let scratch = parse(&new_text);
    let incremental = parse_incremental(base.tree(), &edits, &new_text).unwrap();

    assert_eq!(incremental.tree().dump(), scratch.tree().dump(), "editing {text:?}");
    assert_eq!(incremental.tree().root_green(), scratch.tree().root_green());
    assert_eq!(incremental.errors(), scratch.errors());
    incremental
}

fn assert_coverage(node: &SyntaxNode<'_>) {
    let mut pos = node.range().start();
    let mut has_children = false;
    for child in node.children() {
        has_children = true;
        assert_eq!(child.range().start(), pos, "gap or overlap inside {:?}", node.kind());
        pos = child.range().end();
        if let SyntaxElement::Node(child) = child {
            assert_coverage(&child);
        }
    }
    if has_children {
        assert_eq!(pos, node.range().end(), "children fall short of {:?}", node.kind());
    }
}

fn assert_full_coverage(text: &str) {
    let file = parse(text);
    let root = file.root();
    assert_eq!(root.range(), TextRange::new(0.into(), TextSize::of(text)), "for {text:?}");
    assert_coverage(&root);
}

fn single_statement(file: &Parse) -> SyntaxNode<'_> {
    let mut nodes = file.root().child_nodes();
    let statement = nodes.next().expect("expected one statement");
    assert!(nodes.next().is_none(), "expected exactly one statement");
    statement
}

fn child_kinds(node: &SyntaxNode<'_>) -> Vec<SyntaxKind> {
    node.children().map(|child| child.kind()).collect()
}

#[test]
fn scenario_let_statement() {
    check(
        "let x = 5;",
        expect![[r#"
            PROGRAM@0..10
              LET_STMT@0..10
                LET_KW@0..3 "let"
                IDENT@4..5 "x"
                EQ@6..7 "="
                INT@8..9 "5"
                SEMICOLON@9..10 ";"
              EOF@10..10 ""
        "#]],
    );
    assert!(parse("let x = 5;").errors().is_empty());
}

#[test]
fn scenario_function_literal() {
    let file = parse("fn(a, b) { a + b }");
    assert!(file.errors().is_empty());

    let statement = single_statement(&file);
    assert_eq!(statement.kind(), SyntaxKind::EXPR_STMT);

    let function = statement.child_nodes().next().unwrap();
    assert_eq!(function.kind(), SyntaxKind::FN_LITERAL);
    assert_eq!(
        child_kinds(&function),
        [
            SyntaxKind::FN_KW,
            SyntaxKind::L_PAREN,
            SyntaxKind::IDENT,
            SyntaxKind::COMMA,
            SyntaxKind::IDENT,
            SyntaxKind::R_PAREN,
            SyntaxKind::BLOCK,
        ]
    );

    let parameters: Vec<&str> = function
        .children()
        .filter_map(|child| match child {
            SyntaxElement::Token(token) if token.kind() == SyntaxKind::IDENT => {
                Some(token.text())
            }
            _ => None,
        })
        .collect();
    assert_eq!(parameters, ["a", "b"]);

    let block = function.child_nodes().next().unwrap();
    let body = block.child_nodes().next().unwrap();
    assert_eq!(body.kind(), SyntaxKind::EXPR_STMT);
    let sum = body.child_nodes().next().unwrap();
    assert_eq!(sum.kind(), SyntaxKind::INFIX_EXPR);
    assert_eq!(child_kinds(&sum), [SyntaxKind::IDENT, SyntaxKind::PLUS, SyntaxKind::IDENT]);
}

#[test]
fn scenario_product_binds_tighter_than_sum() {
    check(
        "1 + 2 * 3",
        expect![[r#"
            PROGRAM@0..9
              EXPR_STMT@0..9
                INFIX_EXPR@0..9
                  INT@0..1 "1"
                  PLUS@2..3 "+"
                  INFIX_EXPR@3..9
                    INT@4..5 "2"
                    STAR@6..7 "*"
                    INT@8..9 "3"
              EOF@9..9 ""
        "#]],
    );
}

#[test]
fn infix_operators_are_left_associative() {
    let file = parse("6 - 3 - 2;");
    assert!(file.errors().is_empty());
    let statement = single_statement(&file);
    let outer = statement.child_nodes().next().unwrap();
    assert_eq!(outer.kind(), SyntaxKind::INFIX_EXPR);
    assert_eq!(
        child_kinds(&outer),
        [SyntaxKind::INFIX_EXPR, SyntaxKind::MINUS, SyntaxKind::INT]
    );
}

#[test]
fn scenario_missing_expression() {
    check(
        "let x = ;",
        expect![[r#"
            PROGRAM@0..9
              LET_STMT@0..9
                LET_KW@0..3 "let"
                IDENT@4..5 "x"
                EQ@6..7 "="
                IDENT@7..7 (missing)
                SEMICOLON@8..9 ";"
              EOF@9..9 ""
        "#]],
    );

    let file = parse("let x = ;");
    assert_eq!(file.errors().len(), 1);
    assert_eq!(file.errors()[0].message(), "missing identifier");
    assert!(file.tree().root_green().has_missing());
}

#[test]
fn parsing_resumes_after_a_broken_statement() {
    let file = parse("let x = ;\nlet y = 2;");
    assert!(!file.errors().is_empty());

    let statements: Vec<_> = file.root().child_nodes().collect();
    assert_eq!(statements.len(), 2);
    assert_eq!(statements[1].kind(), SyntaxKind::LET_STMT);
    assert!(!statements[1].green().has_missing());
    assert!(!statements[1].green().has_error());
}

#[test]
fn scenario_edit_matches_scratch_parse() {
    // `let x = 5;` -> `let x = 5 + 1;`
    let file = check_incremental("let x = 5;", &[(9, 0, " + 1")]);
    assert!(file.errors().is_empty());
    let statement = single_statement(&file);
    assert_eq!(statement.kind(), SyntaxKind::LET_STMT);
}

#[test]
fn untouched_leading_statement_is_shared() {
    let text = "let a = 1;\nlet b = 2;";
    let base = parse(text);
    let (new_text, edits) = apply(text, &[(19, 1, "42")]);
    let incremental = parse_incremental(base.tree(), &edits, &new_text).unwrap();

    let old_first = base.root().child_nodes().next().unwrap().green().clone();
    let new_first = incremental.root().child_nodes().next().unwrap().green().clone();
    assert!(old_first.ptr_eq(&new_first), "first statement should be spliced, not rebuilt");

    assert_eq!(incremental.tree().root_green(), parse(&new_text).tree().root_green());
}

#[test]
fn untouched_trailing_statement_is_shared() {
    let text = "let a = 1;\nlet b = 2;";
    let base = parse(text);
    let (new_text, edits) = apply(text, &[(8, 1, "9")]);
    let incremental = parse_incremental(base.tree(), &edits, &new_text).unwrap();

    let old_second = base.root().child_nodes().nth(1).unwrap().green().clone();
    let new_second = incremental.root().child_nodes().nth(1).unwrap().green().clone();
    assert!(old_second.ptr_eq(&new_second), "second statement should be spliced, not rebuilt");
}

#[test]
fn incremental_equivalence() {
    // a token appended across the old statement boundary must defeat
    // reuse of that statement, not corrupt the tree
    check_incremental("1 + 2", &[(5, 0, " * 3")]);

    check_incremental("let x = 5;", &[(8, 1, "\"five\"")]);
    check_incremental("", &[(0, 0, "let a = [1, 2][0];")]);
    check_incremental("let a = 1;\nlet b = 2;\nlet c = 3;", &[(15, 1, "bb"), (26, 1, "cc")]);
    check_incremental("let a = 1;\nlet b = 2;", &[(0, 21, "a")]);
    check_incremental("a; b; c;", &[(3, 1, "if (x) { y }")]);
    check_incremental("let s = \"abc\";", &[(10, 0, "xyz ")]);
    check_incremental("let x = ;\nlet y = 2;", &[(18, 1, "42")]);
    check_incremental("fn(a) { a }(1);", &[(12, 1, "2")]);
    check_incremental("{\"k\": 1};", &[(6, 1, "2")]);
}

#[test]
fn malformed_edits_are_rejected() {
    let base = parse("let x = 5;");

    let out_of_bounds = [Edit::delete(TextSize::new(8), TextSize::new(10))];
    assert_eq!(
        parse_incremental(base.tree(), &out_of_bounds, "let x = ").unwrap_err(),
        EditError::OutOfBounds
    );

    let unsorted = [Edit::insert(5.into(), 1.into()), Edit::insert(2.into(), 1.into())];
    assert_eq!(
        parse_incremental(base.tree(), &unsorted, "let xy = 5;x").unwrap_err(),
        EditError::Unsorted
    );

    let mismatched = [Edit::insert(0.into(), 3.into())];
    assert_eq!(
        parse_incremental(base.tree(), &mismatched, "let x = 5;").unwrap_err(),
        EditError::LengthMismatch { expected: TextSize::new(13), actual: TextSize::new(10) }
    );
}

#[test]
fn determinism() {
    for text in [
        "",
        "let x = 5;",
        "fn(a, b) { a + b }",
        "let x = ;",
        "@@@ let ~~~",
        "if (a < b) { a } else { b }",
        "{\"one\": 1, \"two\": 2};",
    ] {
        let first = parse(text);
        let second = parse(text);
        assert_eq!(first.tree().root_green(), second.tree().root_green(), "for {text:?}");
        assert_eq!(first.errors(), second.errors(), "for {text:?}");
    }
}

#[test]
fn every_tree_covers_the_whole_input() {
    for text in [
        "",
        "   ",
        "let x = 5;",
        "let x = ;",
        "let = 5;",
        "let x 5;",
        "@#%",
        "\"unterminated",
        "\"unterminated\nlet x = 1;",
        "}}}}",
        ")))(((",
        "if (x",
        "fn(",
        "let a = [1, 2, 3][",
        "1 + + 2;",
        "return",
        "return;",
        "{1: 2, 3};",
    ] {
        assert_full_coverage(text);
    }
}

#[test]
fn empty_input() {
    check(
        "",
        expect![[r#"
            PROGRAM@0..0
              EOF@0..0 ""
        "#]],
    );
    assert!(parse("").errors().is_empty());
}

#[test]
fn recovery_terminates_on_growing_garbage() {
    for length in [1usize, 8, 64, 256] {
        let garbage = "@| ".repeat(length);
        assert_full_coverage(&garbage);

        let truncated: String = "let x = 5;".chars().cycle().take(length).collect();
        assert_full_coverage(&truncated);
    }
}

#[test]
fn lexical_errors_are_reported_and_contained() {
    let file = parse("let @ = 5;");
    assert!(file.errors().iter().any(|error| error.message() == "unrecognized character"));
    assert_full_coverage("let @ = 5;");

    let file = parse("let s = \"oops;\nlet t = 1;");
    assert!(file.errors().iter().any(|error| error.message() == "unterminated string literal"));
}

#[test]
fn missing_semicolon_is_repaired() {
    let file = parse("let x = 1 let y = 2;");
    assert_eq!(file.errors().len(), 1);
    assert_eq!(file.errors()[0].message(), "missing ';'");

    let statements: Vec<_> = file.root().child_nodes().collect();
    assert_eq!(statements.len(), 2);
    assert!(statements[0].green().has_missing());
    assert!(!statements[1].green().has_missing());
}

#[test]
fn keywords_degrade_to_names_where_only_names_fit() {
    // a reserved word in a binding position lexes as an identifier
    let file = parse("let let = 5;");
    assert!(file.errors().is_empty());
    let statement = single_statement(&file);
    assert_eq!(statement.kind(), SyntaxKind::LET_STMT);
}

#[test]
fn block_final_expression_needs_no_semicolon() {
    let file = parse("let add = fn(a, b) { a + b };");
    assert!(file.errors().is_empty());
}

#[test]
fn if_else_parses_as_expression() {
    let file = parse("let m = if (a < b) { a } else { b };");
    assert!(file.errors().is_empty());

    let statement = single_statement(&file);
    let if_expr = statement.child_nodes().next().unwrap();
    assert_eq!(if_expr.kind(), SyntaxKind::IF_EXPR);
    assert_eq!(
        child_kinds(&if_expr),
        [
            SyntaxKind::IF_KW,
            SyntaxKind::L_PAREN,
            SyntaxKind::INFIX_EXPR,
            SyntaxKind::R_PAREN,
            SyntaxKind::BLOCK,
            SyntaxKind::ELSE_KW,
            SyntaxKind::BLOCK,
        ]
    );
}

#[test]
fn calls_and_indexing_bind_tightest() {
    let file = parse("-a[0] + f(1)(2);");
    assert!(file.errors().is_empty());

    let statement = single_statement(&file);
    let sum = statement.child_nodes().next().unwrap();
    assert_eq!(sum.kind(), SyntaxKind::INFIX_EXPR);

    let operands: Vec<_> = sum.child_nodes().collect();
    // -a[0] parses as -(a[0])
    assert_eq!(operands[0].kind(), SyntaxKind::PREFIX_EXPR);
    let indexed = operands[0].child_nodes().next().unwrap();
    assert_eq!(indexed.kind(), SyntaxKind::INDEX_EXPR);
    // f(1)(2) parses as (f(1))(2)
    assert_eq!(operands[1].kind(), SyntaxKind::CALL_EXPR);
    let inner = operands[1].child_nodes().next().unwrap();
    assert_eq!(inner.kind(), SyntaxKind::CALL_EXPR);
}

#[test]
fn hash_and_array_literals() {
    let file = parse("let h = {\"one\": 1, \"two\": 2};\nlet a = [1, \"x\", true];");
    assert!(file.errors().is_empty());

    let statements: Vec<_> = file.root().child_nodes().collect();
    let hash = statements[0].child_nodes().next().unwrap();
    assert_eq!(hash.kind(), SyntaxKind::HASH_LITERAL);
    assert_eq!(hash.child_nodes().filter(|n| n.kind() == SyntaxKind::HASH_PAIR).count(), 2);

    let array = statements[1].child_nodes().next().unwrap();
    assert_eq!(array.kind(), SyntaxKind::ARRAY_LITERAL);
}
