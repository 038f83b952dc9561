//! Unit tests for type inference.

use crate::{
    ast::{
        ast::{Flags, NodeId, NodeKind},
        expressions::NumberValue,
        types::TypeDescriptor,
    },
    check_source, Checked,
};

use super::{algebra::primitives_match, type_checker::TypeChecker};

fn check(source: &str) -> Checked {
    match check_source(source, "test.lang") {
        Ok(checked) => checked,
        Err(errors) => panic!("unexpected errors: {:?}", errors),
    }
}

fn error_names(source: &str) -> Vec<String> {
    match check_source(source, "test.lang") {
        Ok(_) => panic!("expected errors"),
        Err(errors) => errors.iter().map(|error| error.get_error_name().to_string()).collect(),
    }
}

fn binding(checked: &Checked, name: &str) -> NodeId {
    let ast = &checked.ast;
    ast.nodes
        .iter()
        .find(|(_, node)| {
            node.flags.contains(Flags::BINDING)
                && matches!(&node.kind, NodeKind::Identifier(ident) if ast.name(ident.atom) == name)
        })
        .map(|(id, _)| id)
        .unwrap_or_else(|| panic!("no binding named `{}`", name))
}

/// The rendered type of the binding called `name`.
fn type_of(checked: &Checked, name: &str) -> String {
    let node = binding(checked, name);
    let ty = checked.ast[node].resolved().expect("binding was not resolved");
    checked.ast.describe(ty)
}

#[test]
fn test_unsized_categories_absorb_sizes() {
    assert!(primitives_match(TypeDescriptor::INTLIKE, TypeDescriptor::U32));
    assert!(primitives_match(TypeDescriptor::U32, TypeDescriptor::INTLIKE));
    assert!(primitives_match(TypeDescriptor::NUMBERLIKE, TypeDescriptor::F32));
    assert!(primitives_match(TypeDescriptor::NUMBERLIKE, TypeDescriptor::S8));
    assert!(primitives_match(TypeDescriptor::BOOL8, TypeDescriptor::BOOL32));

    assert!(!primitives_match(TypeDescriptor::U32, TypeDescriptor::U16));
    assert!(!primitives_match(TypeDescriptor::U16, TypeDescriptor::U32));
    assert!(!primitives_match(TypeDescriptor::S32, TypeDescriptor::U32));
    assert!(!primitives_match(TypeDescriptor::F32, TypeDescriptor::S32));
    assert!(!primitives_match(TypeDescriptor::INTLIKE, TypeDescriptor::F64));
    assert!(!primitives_match(TypeDescriptor::VOID, TypeDescriptor::TYPE));
}

#[test]
fn test_literal_defaults() {
    let checked = check("a := 1; b := 1.5; c := true;");

    assert_eq!(type_of(&checked, "a"), "s64");
    assert_eq!(type_of(&checked, "b"), "f64");
    assert_eq!(type_of(&checked, "c"), "bool8");
}

#[test]
fn test_literals_follow_expected_type() {
    let checked = check("a : u8 = 200; b : f32 = 1.5; c : bool16 = false;");

    let initializer = |name: &str| {
        let decl = checked
            .ast
            .declarations
            .iter()
            .find_map(|decl| match checked.ast.kind(*decl) {
                NodeKind::Declaration(decl) if decl.name == binding(&checked, name) => decl.initializer,
                _ => None,
            })
            .unwrap();
        checked.ast.describe(checked.ast.resolved(decl).unwrap())
    };

    assert_eq!(initializer("a"), "u8");
    assert_eq!(initializer("b"), "f32");
    assert_eq!(initializer("c"), "bool16");
}

#[test]
fn test_literal_category_mismatch() {
    assert_eq!(error_names("a : u8 = 1.5;"), ["TypeMatchError"]);
    assert_eq!(error_names("a : f32 = 1;"), ["TypeMatchError"]);
    assert_eq!(error_names("a : s32 = true;"), ["TypeMatchError"]);
}

#[test]
fn test_mismatch_points_at_expected_type() {
    let errors = match check_source("a : u32 = 1;\nb : u16 = a;", "test.lang") {
        Ok(_) => panic!("expected errors"),
        Err(errors) => errors,
    };

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].get_error_name(), "TypeMatchError");
    assert_eq!(errors[0].get_position().0, 23);
    assert_eq!(errors[0].get_related().map(|related| related.0), Some(17));
}

#[test]
fn test_arithmetic_promotion() {
    let checked = check(
        "a : u8 = 1; b : u8 = 2; c : s8 = 3; d : s32 = 4;
         uu := a + b; ss := c + d; us := a + c; mixed := a * 7;",
    );

    assert_eq!(type_of(&checked, "uu"), "u8");
    assert_eq!(type_of(&checked, "ss"), "s32");
    assert_eq!(type_of(&checked, "us"), "s8");
    assert_eq!(type_of(&checked, "mixed"), "s64");
}

#[test]
fn test_int_and_float_do_not_mix() {
    assert_eq!(error_names("a : s32 = 1; b := a + 1.5;"), ["NumberTypesMismatch"]);
}

#[test]
fn test_expected_type_flows_into_operands() {
    let checked = check("a : u16 = 1 + 2 * 3;");
    assert_eq!(type_of(&checked, "a"), "u16");
}

#[test]
fn test_comparison_and_logic() {
    let checked = check("a : f32 = 1.0; t := a < 2.0; u : bool32 = t && !t;");

    assert_eq!(type_of(&checked, "t"), "bool8");
    assert_eq!(type_of(&checked, "u"), "bool32");
}

#[test]
fn test_comparison_operands_are_not_combined() {
    let checked = check("a : f32 = 1.0; b : s32 = 2; t := a < 2; u := a == b;");

    assert_eq!(type_of(&checked, "t"), "bool8");
    assert_eq!(type_of(&checked, "u"), "bool8");
}

#[test]
fn test_unary_sign() {
    let checked = check("a : u16 = -1; x : s8 = 3; b := -x; c := +x;");

    assert_eq!(type_of(&checked, "a"), "u16");
    assert_eq!(type_of(&checked, "b"), "s8");
    assert_eq!(type_of(&checked, "c"), "s8");

    assert_eq!(error_names("n := -true;"), ["TypeMatchError"]);
}

#[test]
fn test_address_of_lvalue() {
    let checked = check(
        "f :: fn () {
             x : s32 = 1;
             p := &x;
             q := &x;
             r : &s32 = &x;
             *r = 5;
             *p = *q + 1;
         }",
    );

    assert_eq!(type_of(&checked, "p"), "&s32");
    // Pointers to the same type share one synthesized node.
    let p = checked.ast[binding(&checked, "p")].resolved();
    let q = checked.ast[binding(&checked, "q")].resolved();
    assert_eq!(p, q);

    let five = checked
        .ast
        .nodes
        .iter()
        .find(|(_, node)| matches!(node.kind, NodeKind::Number(NumberValue::Int(5))))
        .map(|(id, _)| id)
        .unwrap();
    assert_eq!(checked.ast.describe(checked.ast.resolved(five).unwrap()), "s32");
}

#[test]
fn test_address_of_temporary() {
    assert_eq!(
        error_names("f :: fn () { a : s32 = 1; b : s32 = 2; p := &(a + b); }"),
        ["LvalueRequired"]
    );
}

#[test]
fn test_assignment_targets() {
    assert_eq!(error_names("N :: 5; f :: fn () { N = 6; }"), ["AssignToConstant"]);
    assert_eq!(error_names("f :: fn () { 1 = 2; }"), ["LvalueRequired"]);
    assert_eq!(error_names("f :: fn () { a := 1; a += 2; }"), ["NotImplementedError"]);
}

#[test]
fn test_deref_requires_pointer() {
    assert_eq!(error_names("f :: fn (n: s32) { m := *n; }"), ["NotAPointer"]);
    assert_eq!(error_names("f :: fn (n: s32) { n[0] = 1; }"), ["NotAPointer"]);
    check("f :: fn (p: &s32) { p[2] = 1; }");
}

#[test]
fn test_mutual_recursion() {
    check(
        "is_even :: fn (n: u32) -> bool8 {
             if n == 0 { return true; }
             return is_odd(n - 1);
         }
         is_odd :: fn (n: u32) -> bool8 {
             if n == 0 { return false; }
             return is_even(n - 1);
         }",
    );
}

#[test]
fn test_declaration_order_does_not_matter() {
    let checked = check("a := b; b : u32 = c; c : u32 : 7;");

    assert_eq!(type_of(&checked, "a"), "u32");
    assert_eq!(type_of(&checked, "c"), "u32");
}

#[test]
fn test_undeclared_identifier_is_not_stuck() {
    assert_eq!(error_names("x := y;"), ["VariableNotDeclared"]);
}

#[test]
fn test_failures_poison_dependents() {
    assert_eq!(error_names("x := y; z := x + 1; w := z;"), ["VariableNotDeclared"]);
}

#[test]
fn test_cycle_reports_no_progress() {
    let names = error_names("A :: B; B :: A;");

    assert_eq!(names[0], "NoProgress");
    assert!(names.len() > 1);
    assert!(names[1..].iter().all(|name| name == "PendingJob"));
}

#[test]
fn test_struct_member_access() {
    let checked = check(
        "Point :: struct { x: s32; y: s32; ORIGIN :: 0; }
         make :: fn () -> Point { made : Point; return made; }
         f :: fn () {
             p : Point;
             p.x = 1;
             q := &p;
             q.y = 2;
             o := Point.ORIGIN;
             first := p.x;
             second := make().y;
         }",
    );

    assert_eq!(type_of(&checked, "q"), "&Point");
    assert_eq!(type_of(&checked, "o"), "s64");
    assert_eq!(type_of(&checked, "first"), "s32");
    assert_eq!(type_of(&checked, "second"), "s32");

    for (_, node) in checked.ast.nodes.iter() {
        if let NodeKind::Access(access) = &node.kind {
            let member = checked.ast.name(access.member);
            let through_value = checked.ast[access.lhs].is_lvalue();
            assert_eq!(node.is_lvalue(), member != "ORIGIN" && through_value, "lvalue-ness of `{}`", member);
        }
    }
}

#[test]
fn test_member_errors() {
    let point = "Point :: struct { x: s32; }";

    assert_eq!(
        error_names(&format!("{} f :: fn (p: Point) {{ a := p.z; }}", point)),
        ["NoSuchMember"]
    );
    assert_eq!(
        error_names("f :: fn (n: s32) { a := n.x; }"),
        ["NotAStructOrEnum"]
    );
    assert_eq!(
        error_names(&format!("{} f :: fn () {{ a := Point.x; }}", point)),
        ["NoSuchMember"]
    );
}

#[test]
fn test_enum_values() {
    let checked = check("Color :: enum { Red, Green = 2 } c : Color = Color.Green; d := Color.Red;");

    assert_eq!(type_of(&checked, "c"), "Color");
    assert_eq!(type_of(&checked, "d"), "Color");
    assert_eq!(type_of(&checked, "Red"), "Color");
}

#[test]
fn test_types_are_values() {
    let checked = check("T :: s32; P :: &T; x : T = 5; y : s32 = x; p : P = &x;");

    assert_eq!(type_of(&checked, "T"), "type");
    assert_eq!(type_of(&checked, "x"), "T");
    assert_eq!(type_of(&checked, "p"), "P");
}

#[test]
fn test_variable_is_not_a_type() {
    assert_eq!(error_names("T := s32; y : T = 1;"), ["NotAConstant"]);
    assert_eq!(error_names("v := 5; y : v = 1;"), ["TypeMatchError"]);
}

#[test]
fn test_call_arity() {
    assert_eq!(
        error_names("f :: fn (a: s32, b: s32) {} g :: fn () { f(1); f(1, 2, 3); f(1, 2); }"),
        ["MissingArguments", "UnexpectedArguments"]
    );
}

#[test]
fn test_function_type_parameter_count() {
    assert_eq!(
        error_names("F :: fn (s32) -> s32; f : F = fn (a: s32, b: s32) -> s32 { return a; }"),
        ["ParameterCountMismatch"]
    );
    check("F :: fn (s32) -> s32; f : F = fn (a: s32) -> s32 { return a; }");
}

#[test]
fn test_function_type_return_count() {
    assert_eq!(
        error_names("f : fn (s32) -> s32 = h; h : fn (s32) -> (s32, s32);"),
        ["ReturnCountMismatch"]
    );
}

#[test]
fn test_call_results() {
    let checked = check(
        "add :: fn (a: s32, b: s32) -> s32 { return a + b; }
         nothing :: fn () {}
         g :: fn () { r := add(1, 2); v := nothing(); }",
    );

    assert_eq!(type_of(&checked, "r"), "s32");
    assert_eq!(type_of(&checked, "v"), "void");

    assert_eq!(error_names("x := 1; y := x(2);"), ["NotCallable"]);
    assert_eq!(
        error_names("f :: fn () -> (s32, s32) { } g :: fn () { f(); }"),
        ["MultipleReturnValues"]
    );
}

#[test]
fn test_parameter_defaults() {
    let checked = check("f :: fn (a: s32, b := a) -> s32 { return a + b; }");
    assert_eq!(type_of(&checked, "b"), "s32");

    let NodeKind::Declaration(decl) = checked.ast.kind(checked.ast.declarations[0]) else {
        panic!("expected a declaration");
    };
    let prototype = checked.ast.resolved(decl.initializer.unwrap()).unwrap();
    assert_eq!(checked.ast.describe(prototype), "fn (s32, s32) -> s32");
}

#[test]
fn test_return_arity() {
    assert_eq!(error_names("f :: fn () -> s32 { return; }"), ["MissingReturnValue"]);
    assert_eq!(error_names("f :: fn () { return 1; }"), ["ExpectedOneReturnType"]);
}

#[test]
fn test_control_flow() {
    let checked = check(
        "f :: fn (n: s32) {
             total : s64 = 0;
             for i in 0..10 { total = total + i; }
             while total > 3 { total = total - 1; }
             if n < 2 { total = 1; } else if n < 4 { total = 2; } else { total = 3; }
         }",
    );
    assert_eq!(type_of(&checked, "i"), "s64");

    assert_eq!(error_names("f :: fn () { while 1 { } }"), ["TypeMatchError"]);
    assert_eq!(error_names("f :: fn (p: &s32) { for i in p { } }"), ["NotImplementedError"]);
}

#[test]
fn test_unsupported_features() {
    assert_eq!(error_names("s := \"hi\";"), ["NotImplementedError"]);
}

#[test]
fn test_independent_errors_are_all_reported() {
    assert_eq!(
        error_names("a : u8 = 1.5; b := c; d : s32 = true;"),
        ["TypeMatchError", "VariableNotDeclared", "TypeMatchError"]
    );
}

#[test]
fn test_second_run_is_a_no_op() {
    let mut checked = check("a := 1; f :: fn () -> s64 { return a; }");
    let before = checked.ast[binding(&checked, "a")].resolved();
    let nodes = checked.ast.len();

    let declarations = checked.ast.declarations.clone();
    let mut checker = TypeChecker::new(&mut checked.ast, &checked.scopes);
    assert!(checker.run(&declarations));
    assert!(checker.errors().is_empty());

    assert_eq!(checked.ast.len(), nodes);
    assert_eq!(checked.ast[binding(&checked, "a")].resolved(), before);
}
