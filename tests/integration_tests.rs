//! End-to-end tests: source text through lexing, parsing, binding and type
//! checking.

use indoc::indoc;
use typeck::{check_source, errors::errors::Error};

fn errors_of(source: &str) -> Vec<Error> {
    match check_source(source, "main.lang") {
        Ok(_) => panic!("expected errors"),
        Err(errors) => errors,
    }
}

#[test]
fn test_check_full_program() {
    let source = indoc! {r#"
        Vec2 :: struct {
            x: f32;
            y: f32;
        }

        Shape :: enum { Circle, Square = 4 }

        Node :: struct {
            next: &Node;
            value: s64;
        }

        length_squared :: fn (v: &Vec2) -> f32 {
            return v.x * v.x + v.y * v.y;
        }

        sum :: fn (head: &Node, limit := 10) -> s64 {
            total : s64 = 0;
            node := head;
            for i in 0..limit {
                total = total + node.value;
                node = node.next;
            }
            return total;
        }

        main :: fn () -> s32 {
            v : Vec2;
            v.x = 3.0;
            v.y = 4.0;
            l := length_squared(&v);
            shape : Shape = Shape.Square;
            if l > 20.0 && !(l > 30.0) {
                return 0;
            }
            return 1;
        }
    "#};

    let checked = match check_source(source, "main.lang") {
        Ok(checked) => checked,
        Err(errors) => panic!("unexpected errors: {:?}", errors),
    };

    // Every expression reachable from a declaration has a type.
    for (_, node) in checked.ast.nodes.iter() {
        if node.kind.is_expression() {
            assert!(node.resolved().is_some(), "unresolved {} #{}", node.kind.name(), node.serial);
        }
    }
}

#[test]
fn test_self_referential_struct() {
    let source = indoc! {r#"
        List :: struct {
            next: &List;
            value: s32;
        }

        second :: fn (list: &List) -> s32 {
            return list.next.value;
        }
    "#};

    assert!(check_source(source, "main.lang").is_ok());
}

#[test]
fn test_error_location() {
    let source = indoc! {r#"
        count : u32 = 10;

        half :: fn (n: u32) -> u16 {
            return n / 2;
        }
    "#};

    let errors = errors_of(source);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].get_error_name(), "TypeMatchError");
    assert_eq!(errors[0].line_column(source), (4, 12));
    assert!(errors[0].get_related().is_some());
}

#[test]
fn test_independent_errors_across_functions() {
    let source = indoc! {r#"
        a :: fn () -> s32 {
            return missing;
        }

        b :: fn (x: s32) {
            x = true;
        }

        c :: fn () {
            a(1);
        }
    "#};

    let names: Vec<String> = errors_of(source)
        .iter()
        .map(|error| error.get_error_name().to_string())
        .collect();

    assert_eq!(names, ["VariableNotDeclared", "TypeMatchError", "UnexpectedArguments"]);
}

#[test]
fn test_type_cycle_is_reported() {
    let source = indoc! {r#"
        A :: B;
        B :: C;
        C :: A;
        x : A = 1;
    "#};

    let errors = errors_of(source);
    assert_eq!(errors[0].get_error_name(), "NoProgress");
    assert!(errors[1..].iter().all(|error| error.get_error_name() == "PendingJob"));
}

#[test]
fn test_binding_errors_stop_before_checking() {
    let source = indoc! {r#"
        f :: fn () {
            x := 1;
            x := 2;
        }
    "#};

    let errors = errors_of(source);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].get_error_name(), "VariableAlreadyDeclared");
    assert_eq!(errors[0].line_column(source), (3, 5));
}

#[test]
fn test_parse_error_location() {
    let source = indoc! {r#"
        f :: fn () {
            x := (1 + ;
        }
    "#};

    let errors = errors_of(source);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].line_column(source), (2, 15));
}
