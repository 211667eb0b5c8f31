use es1::{JsString, JsValue, evaluate_script};

// Initialize logger for this integration test binary so `RUST_LOG` is honored.
#[ctor::ctor]
fn __init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default())
        .is_test(true)
        .try_init();
}

fn eval(source: &str) -> JsValue {
    evaluate_script(source).expect("evaluation failed")
}

fn num(n: f64) -> JsValue {
    JsValue::Number(n)
}

fn string(s: &str) -> JsValue {
    JsValue::String(JsString::from_str(s))
}

#[test]
fn literals() {
    assert_eq!(eval("undefined"), JsValue::Undefined);
    assert_eq!(eval("null"), JsValue::Null);
    assert_eq!(eval("false"), JsValue::Boolean(false));
    assert_eq!(eval("true"), JsValue::Boolean(true));
    assert_eq!(eval("'te\"st'"), string("te\"st"));
    assert_eq!(eval("\"te'st\""), string("te'st"));
    assert_eq!(eval("42"), num(42.0));
    assert_eq!(eval("0x2a"), num(42.0));
}

#[test]
fn arithmetic() {
    assert_eq!(eval("-7.5 % 2"), num(-1.5));
    assert_eq!(eval("1+2*3"), num(7.0));
    assert_eq!(eval("1/2"), num(0.5));
    assert_eq!(eval("(1+2)*3"), num(9.0));
    assert_eq!(eval("10 - 4 - 3"), num(3.0));
}

#[test]
fn string_concatenation() {
    assert_eq!(
        eval("x = 42; 'test ' + 2 * (6 - 4 + 1) + ' ' + x"),
        string("test 6 42")
    );
    assert_eq!(eval("y=1/2; z='string'; y+z"), string("0.5string"));
    assert_eq!(eval("'' + 60"), string("60"));
}

#[test]
fn increment_and_decrement() {
    assert_eq!(eval("var x=2; x++;"), num(2.0));
    assert_eq!(eval("var x=2; x++; x"), num(3.0));
    assert_eq!(eval("var x=2; x--;"), num(2.0));
    assert_eq!(eval("var x=2; x--; x"), num(1.0));
    assert_eq!(eval("x=4.5; ++x"), num(5.5));
    assert_eq!(eval("x=4.5; --x"), num(3.5));
}

#[test]
fn unary_operators() {
    assert_eq!(eval("void(2+2)"), JsValue::Undefined);
    assert_eq!(eval("typeof(2)"), string("number"));
    assert_eq!(eval("x=42; +x;"), num(42.0));
    assert_eq!(eval("x=42; -x;"), num(-42.0));
    assert_eq!(eval("x=42; !x;"), JsValue::Boolean(false));
    assert_eq!(eval("x=42; ~x;"), num(-43.0));
    assert_eq!(eval("+'3'"), num(3.0));
    assert_eq!(eval("+true"), num(1.0));
}

#[test]
fn typeof_operator() {
    assert_eq!(eval("typeof undefined"), string("undefined"));
    assert_eq!(eval("typeof null"), string("object"));
    assert_eq!(eval("typeof true"), string("boolean"));
    assert_eq!(eval("typeof 'x'"), string("string"));
    assert_eq!(eval("typeof nope"), string("undefined"));
    assert_eq!(eval("o = new Object; typeof o"), string("object"));
    assert_eq!(eval("typeof Object"), string("function"));
    assert_eq!(eval("function f(){} typeof f"), string("function"));
}

#[test]
fn shifts_and_bitwise() {
    assert_eq!(eval("1<<2"), num(4.0));
    assert_eq!(eval("-5>>2"), num(-2.0));
    assert_eq!(eval("-5>>>2"), num(1073741822.0));
    assert_eq!(eval("255 & 128"), num(128.0));
    assert_eq!(eval("255 ^ 128"), num(127.0));
    assert_eq!(eval("64 | 128"), num(192.0));
}

#[test]
fn relational_operators() {
    assert_eq!(eval("1 < 2"), JsValue::Boolean(true));
    assert_eq!(eval("1 > 2"), JsValue::Boolean(false));
    assert_eq!(eval("1 <= 2"), JsValue::Boolean(true));
    assert_eq!(eval("1 >= 2"), JsValue::Boolean(false));
    assert_eq!(eval("2 <= 2"), JsValue::Boolean(true));
    // NaN poisons every comparison
    assert_eq!(eval("NaN < 1"), JsValue::Boolean(false));
    assert_eq!(eval("NaN >= 1"), JsValue::Boolean(false));
    assert_eq!(eval("1 < Infinity"), JsValue::Boolean(true));
    assert_eq!(eval("Infinity < 1"), JsValue::Boolean(false));
}

#[test]
fn string_relational_uses_code_unit_order() {
    assert_eq!(eval("'a' < 'b'"), JsValue::Boolean(true));
    assert_eq!(eval("'abc' < 'abd'"), JsValue::Boolean(true));
    assert_eq!(eval("'a' <= 'a'"), JsValue::Boolean(true));
    assert_eq!(eval("'b' > 'a'"), JsValue::Boolean(true));
    assert_eq!(eval("'a' > 'a'"), JsValue::Boolean(false));
    assert_eq!(eval("'Z' < 'a'"), JsValue::Boolean(true));
    assert_eq!(eval("'ab' < 'b'"), JsValue::Boolean(true));
}

#[test]
fn equality_operators() {
    assert_eq!(eval("1 == 2"), JsValue::Boolean(false));
    assert_eq!(eval("1 != 2"), JsValue::Boolean(true));
    assert_eq!(eval("1 == '1'"), JsValue::Boolean(true));
    assert_eq!(eval("null == undefined"), JsValue::Boolean(true));
    assert_eq!(eval("NaN == NaN"), JsValue::Boolean(false));
    assert_eq!(eval("0 == -0"), JsValue::Boolean(true));
    assert_eq!(eval("\"\" == false"), JsValue::Boolean(true));
    assert_eq!(eval("null == false"), JsValue::Boolean(false));
    assert_eq!(eval("true + true"), num(2.0));
    assert_eq!(eval("o = new Object; o == o"), JsValue::Boolean(true));
    assert_eq!(
        eval("a = new Object; b = new Object; a == b"),
        JsValue::Boolean(false)
    );
}

#[test]
fn logical_operators() {
    assert_eq!(eval("42 || 13"), num(42.0));
    assert_eq!(eval("42 && 13"), num(13.0));
    assert_eq!(eval("0 || 13"), num(13.0));
    assert_eq!(eval("0 && 13"), num(0.0));
    assert_eq!(eval("!!('')"), JsValue::Boolean(false));
    assert_eq!(eval("!!('0' && Object(null))"), JsValue::Boolean(true));
}

#[test]
fn short_circuit_suppresses_right_operand() {
    assert_eq!(eval("x = 0; 0 && (x = 1); x"), num(0.0));
    assert_eq!(eval("x = 0; 1 || (x = 1); x"), num(0.0));
    assert_eq!(eval("x = 0; 1 && (x = 1); x"), num(1.0));
    assert_eq!(eval("x = 0; 0 || (x = 1); x"), num(1.0));
}

#[test]
fn conditional_and_sequence() {
    assert_eq!(eval("1 ? 2 : 3"), num(2.0));
    assert_eq!(eval("0 ? 2 : 1+2"), num(3.0));
    assert_eq!(eval("1,2"), num(2.0));
}

#[test]
fn compound_assignment() {
    assert_eq!(eval("x=2.5; x+=4; x"), num(6.5));
    assert_eq!(eval("x=1; x<<=3; x"), num(8.0));
    assert_eq!(eval("x=7; x%=4; x"), num(3.0));
    assert_eq!(eval("x='a'; x+='b'; x"), string("ab"));
}

#[test]
fn statements_and_control_flow() {
    assert_eq!(eval(";"), JsValue::Undefined);
    assert_eq!(eval("if (1) 2;"), num(2.0));
    assert_eq!(eval("if (0) 2;"), JsValue::Undefined);
    assert_eq!(eval("if (0) 2; else ;"), JsValue::Undefined);
    assert_eq!(eval("if (0) 2; else 3;"), num(3.0));
    assert_eq!(eval("x=5; while(x-3) { x = x - 1; } x"), num(3.0));
    assert_eq!(
        eval(
            "x=2; y=0; while(1) { if(x) {x = x - 1; y = y + 2; continue; y = y + 1000; } \
             else break; y = y + 1;} y"
        ),
        num(4.0)
    );
}

#[test]
fn for_loops() {
    assert_eq!(
        eval("var x = 0; for(var i = 10, dec = 1; i; i = i - dec) x = x + i; x"),
        num(55.0)
    );
    assert_eq!(eval("var x=0; for (i=2; i; i=i-1) x=x+i; x+i"), num(3.0));
    assert_eq!(
        eval("s = 0; for (var i = 0; i < 5; ++i) { if (i == 3) break; s += i; } s"),
        num(3.0)
    );
    assert_eq!(
        eval("s = 0; for (var i = 0; i < 5; ++i) { if (i == 2) continue; s += i; } s"),
        num(8.0)
    );
}

#[test]
fn hoisting() {
    // A hoisted var is bound (to undefined) before its initializer runs
    assert_eq!(eval("t = typeof x; var x = 5; t"), string("undefined"));
    assert_eq!(eval("var x; typeof x"), string("undefined"));
    // Function names are hoisted as plain bindings; the function value
    // arrives when the definition executes
    assert_eq!(eval("t = typeof f; function f(){} t"), string("undefined"));
    assert_eq!(eval("function f(){} typeof f"), string("function"));
}

#[test]
fn undeclared_assignment_creates_a_global() {
    assert_eq!(eval("function f(){ i = 42; } f(); i"), num(42.0));
    assert_eq!(eval("i = 1; function f(){ var i = 42; } f(); i"), num(1.0));
}

#[test]
fn delete_operator() {
    assert_eq!(eval("delete nope"), JsValue::Boolean(true));
    assert_eq!(
        eval("o = new Object; o.x = 1; delete o.x"),
        JsValue::Boolean(true)
    );
    assert_eq!(
        eval("o = new Object; o.x = 1; delete o.x; typeof o.x"),
        string("undefined")
    );
    assert_eq!(eval("var x = 42; delete x"), JsValue::Boolean(true));
    assert_eq!(eval("var x = 42; delete x; typeof x"), string("undefined"));
}

#[test]
fn object_builtin() {
    assert_eq!(eval("''+Object(null)"), string("[object Object]"));
    assert_eq!(eval("o=Object(null); o.x=42; o.y=60; o.x+o['y']"), num(102.0));
    assert_eq!(
        eval("a=Object(null);b=Object(null);a.x=b;a.x.y=42;a['x']['y']"),
        num(42.0)
    );
    assert_eq!(eval("'' + new Object"), string("[object Object]"));
    assert_eq!(eval("'' + new Object()"), string("[object Object]"));
    assert_eq!(eval("'' + new Object(null)"), string("[object Object]"));
    assert_eq!(eval("'' + new Object(undefined)"), string("[object Object]"));
    // Object(o) is o itself
    assert_eq!(eval("o = new Object;o.x=42; new Object(o).x"), num(42.0));
}

#[test]
fn boolean_builtin() {
    assert_eq!(eval("Boolean()"), JsValue::Boolean(false));
    assert_eq!(eval("Boolean(true)"), JsValue::Boolean(true));
    assert_eq!(eval("Boolean(42)"), JsValue::Boolean(true));
    assert_eq!(eval("Boolean(0)"), JsValue::Boolean(false));
    assert_eq!(eval("Boolean('')"), JsValue::Boolean(false));
    assert_eq!(eval("Boolean('x')"), JsValue::Boolean(true));
    assert_eq!(eval("0 + new Boolean()"), num(0.0));
    assert_eq!(eval("0 + new Boolean(1)"), num(1.0));
    assert_eq!(eval("'' + new Boolean(0)"), string("false"));
    assert_eq!(eval("'' + new Boolean(1)"), string("true"));
    assert_eq!(eval("new Boolean(1).valueOf()"), JsValue::Boolean(true));
}

#[test]
fn number_builtin() {
    assert_eq!(eval("Number()"), num(0.0));
    assert_eq!(eval("Number(42.42)"), num(42.42));
    assert_eq!(eval("Number('42.42')"), num(42.42));
    assert_eq!(eval("Number.MIN_VALUE"), num(5e-324));
    assert_eq!(eval("Number.MAX_VALUE"), num(1.7976931348623157e308));
    assert_eq!(eval("new Number(42.42).toString()"), string("42.42"));
    assert_eq!(eval("''+new Number(60)"), string("60"));
    assert_eq!(eval("new Number(60).valueOf()"), num(60.0));
    assert_eq!(eval("isNaN(Number.NaN)"), JsValue::Boolean(true));
    assert_eq!(
        eval("Number.POSITIVE_INFINITY == Infinity"),
        JsValue::Boolean(true)
    );
}

#[test]
fn global_functions() {
    assert_eq!(eval("isNaN(NaN)"), JsValue::Boolean(true));
    assert_eq!(eval("isNaN(42)"), JsValue::Boolean(false));
    assert_eq!(eval("isNaN('x')"), JsValue::Boolean(true));
    assert_eq!(eval("isFinite(42)"), JsValue::Boolean(true));
    assert_eq!(eval("isFinite(Infinity)"), JsValue::Boolean(false));
    assert_eq!(eval("isFinite(NaN)"), JsValue::Boolean(false));
    assert_eq!(eval("alert('hi')"), JsValue::Undefined);
}

#[test]
fn eval_builtin() {
    assert_eq!(eval("eval('1+2')"), num(3.0));
    assert_eq!(eval("eval(42)"), num(42.0));
    assert_eq!(eval("eval()"), JsValue::Undefined);
    // Declarations hoist into the caller's activation
    assert_eq!(eval("eval('var q = 7'); q"), num(7.0));
    assert_eq!(eval("x = 2; eval('x + 1')"), num(3.0));
}

#[test]
fn number_string_coercions() {
    assert_eq!(eval("'' + 1/2"), string("0.5"));
    assert_eq!(eval("1 + '0x10'"), string("10x10"));
    assert_eq!(eval("'0x10' - 0"), num(16.0));
    assert_eq!(eval("' 7 ' - 0"), num(7.0));
    assert_eq!(eval("'' - 0"), num(0.0));
    assert_eq!(eval("isNaN('bogus' - 0)"), JsValue::Boolean(true));
}

#[test]
fn heap_survives_collection() {
    // One statement allocates far past the GC threshold; the collector runs
    // at the next statement boundary and must keep everything reachable.
    assert_eq!(
        eval("for (var i = 0; i < 10000; i = i + 1) { o = new Object; o.x = i; } o.x"),
        num(9999.0)
    );
}
