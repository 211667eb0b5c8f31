use es1::{JsString, JsValue, evaluate_script};

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
fn calls_and_returns() {
    assert_eq!(eval("function f(x,y) { return x*x+y; } f(2, 3)"), num(7.0));
    assert_eq!(eval("function f() { return; } f()"), JsValue::Undefined);
    assert_eq!(eval("function f() { 42; } f()"), JsValue::Undefined);
    assert_eq!(eval("function f() { return 1; 2; } f()"), num(1.0));
}

#[test]
fn missing_parameters_are_undefined() {
    assert_eq!(eval("function f(a, b) { return typeof b; } f(1)"), string("undefined"));
    assert_eq!(eval("function f(a) { return a; } f(1, 2, 3)"), num(1.0));
}

#[test]
fn arguments_object() {
    assert_eq!(
        eval(
            "function sum() { var s = 0; for (var i = 0; i < arguments.length; ++i) \
             s += arguments[i]; return s; } sum(1,2,3)"
        ),
        num(6.0)
    );
    assert_eq!(eval("function f() { return arguments.length; } f()"), num(0.0));
    assert_eq!(
        eval("function f(a) { return arguments[2]; } f('x', 'y', 'z')"),
        string("z")
    );
}

#[test]
fn arguments_callee_supports_anonymous_recursion() {
    assert_eq!(
        eval(
            "function f(n) { if (n) return n + arguments.callee(n - 1); return 0; } f(3)"
        ),
        num(6.0)
    );
}

#[test]
fn closures_capture_their_defining_scope() {
    assert_eq!(
        eval(
            "function counter() { var n = 0; function inc() { n += 1; return n; } \
             return inc; } c = counter(); c(); c(); c()"
        ),
        num(3.0)
    );
    // Two instances do not share state
    assert_eq!(
        eval(
            "function counter() { var n = 0; function inc() { n += 1; return n; } \
             return inc; } a = counter(); b = counter(); a(); a(); b()"
        ),
        num(1.0)
    );
}

#[test]
fn nested_functions_see_enclosing_locals() {
    assert_eq!(
        eval(
            "function outer(x) { function inner(y) { return x + y; } return inner(10); } \
             outer(1)"
        ),
        num(11.0)
    );
}

#[test]
fn parameter_and_local_collisions() {
    // A hoisted var that collides with a parameter keeps the argument...
    assert_eq!(eval("function g(a) { var a; return a; } g(7)"), num(7.0));
    // ...until an initializer overwrites it
    assert_eq!(eval("function f(a) { var a = 5; return a; } f(1)"), num(5.0));
}

#[test]
fn this_binding() {
    // A method call receives its base object
    assert_eq!(
        eval(
            "function getV() { return this.v; } o = new Object; o.v = 42; o.getV = getV; \
             o.getV()"
        ),
        num(42.0)
    );
    // A call through an activation binding has no receiver
    assert_eq!(
        eval(
            "function outer() { function inner() { return this; } return inner(); } outer()"
        ),
        JsValue::Null
    );
    // A call through the global object receives the global object
    assert_eq!(eval("function f() { return typeof this; } f()"), string("object"));
}

#[test]
fn constructors_and_prototypes() {
    assert_eq!(
        eval("function Point(v) { this.v = v; } p = new Point(42); p.v"),
        num(42.0)
    );
    // The class tag of a constructed object is the constructor's name
    assert_eq!(
        eval("function Point(v) { this.v = v; } '' + new Point(1)"),
        string("[object Point]")
    );
    // Methods come from the prototype property
    assert_eq!(
        eval(
            "function Point(v) { this.v = v; } function getV() { return this.v; } \
             Point.prototype.getV = getV; p = new Point(42); p.getV()"
        ),
        num(42.0)
    );
    // Instances share the prototype
    assert_eq!(
        eval(
            "function Point(v) { this.v = v; } Point.prototype.kind = 'point'; \
             a = new Point(1); b = new Point(2); a.kind + b.kind"
        ),
        string("pointpoint")
    );
    // prototype.constructor points back at the function
    assert_eq!(
        eval("function Point() {} Point.prototype.constructor == Point"),
        JsValue::Boolean(true)
    );
}

#[test]
fn constructor_returning_an_object_wins() {
    assert_eq!(
        eval(
            "function F() { o = new Object; o.tag = 'other'; return o; } new F().tag"
        ),
        string("other")
    );
    // A primitive return is discarded in favor of the fresh object
    assert_eq!(
        eval("function F() { this.tag = 'own'; return 42; } new F().tag"),
        string("own")
    );
}

#[test]
fn new_without_argument_list() {
    assert_eq!(eval("function F() { this.x = 1; } (new F).x"), num(1.0));
}

#[test]
fn function_length_is_read_only() {
    assert_eq!(eval("function f(a, b) {} f.length"), num(2.0));
    assert_eq!(eval("function f(a, b) {} f.length = 99; f.length"), num(2.0));
}

#[test]
fn functions_inherit_object_prototype() {
    assert_eq!(eval("function f() {} '' + f"), string("[object Function]"));
    assert_eq!(eval("'' + Function.prototype()"), string("undefined"));
}

#[test]
fn wrapper_objects_box_primitives() {
    assert_eq!(eval("typeof (0).constructor"), string("function"));
    assert_eq!(eval("typeof true.constructor"), string("function"));
    assert_eq!(eval("b = true; typeof b.missing"), string("undefined"));
}

#[test]
fn functions_are_values() {
    assert_eq!(
        eval("function f() { return 1; } g = f; g()"),
        num(1.0)
    );
    assert_eq!(
        eval(
            "function apply(fn, x) { return fn(x); } function double(n) { return n * 2; } \
             apply(double, 21)"
        ),
        num(42.0)
    );
}

#[test]
fn recursion() {
    assert_eq!(
        eval("function fib(n) { if (n < 2) return n; return fib(n-1) + fib(n-2); } fib(10)"),
        num(55.0)
    );
    assert_eq!(
        eval("function fact(n) { return n ? n * fact(n - 1) : 1; } fact(6)"),
        num(720.0)
    );
}
