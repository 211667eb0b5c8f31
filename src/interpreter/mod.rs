use crate::ast::*;
use crate::error::{ErrorKind, EvalError};
use crate::types::{JsObject, JsString, JsValue};
use log::trace;
use std::cell::RefCell;
use std::rc::Rc;

mod builtins;
mod eval;
mod exec;
mod gc;
mod helpers;
mod types;

pub(crate) use exec::hoisted_names;
pub(crate) use helpers::*;
pub use types::*;

/// Callback fired after each executed statement, nested statements included.
pub type StatementObserver = Rc<dyn Fn(&Statement, &Completion)>;

/// The evaluator. Owns the object heap, the global object, and the current
/// scope chain; single-threaded and synchronous throughout.
pub struct Interpreter {
    objects: Vec<Option<ObjRef>>,
    free_list: Vec<usize>,
    gc_alloc_count: usize,
    global: ObjRef,
    object_prototype: ObjRef,
    function_prototype: ObjRef,
    boolean_prototype: Option<ObjRef>,
    number_prototype: Option<ObjRef>,
    scopes: ScopeRef,
    on_statement_executed: Option<StatementObserver>,
}

impl Interpreter {
    /// Build a global object, install the built-ins (including `eval` bound
    /// to this interpreter), and hoist the program's top-level names.
    pub fn new(program: &Program, on_statement_executed: Option<StatementObserver>) -> Self {
        let global = Rc::new(RefCell::new(JsObjectData::new("Global", None)));
        let object_prototype = Rc::new(RefCell::new(JsObjectData::new("Object", None)));
        let function_prototype = Rc::new(RefCell::new(JsObjectData::new("Function", None)));
        let mut interp = Interpreter {
            objects: Vec::new(),
            free_list: Vec::new(),
            gc_alloc_count: 0,
            scopes: Scope::new(global.clone(), None),
            global,
            object_prototype,
            function_prototype,
            boolean_prototype: None,
            number_prototype: None,
            on_statement_executed,
        };
        interp.allocate_object_slot(interp.global.clone());
        interp.allocate_object_slot(interp.object_prototype.clone());
        interp.allocate_object_slot(interp.function_prototype.clone());
        interp.function_prototype.borrow_mut().prototype = Some(interp.object_prototype.clone());
        interp.setup_globals();
        interp.hoist(program);
        interp
    }

    /// Bind every name the program hoists to `undefined` in the current
    /// activation. Names that are already bound keep their value, so REPL
    /// lines and repeated `eval` calls do not reset live state.
    pub fn hoist(&mut self, program: &Program) {
        let activation = self.scopes.activation.clone();
        for name in hoisted_names(&program.body) {
            if !activation.borrow().has_own_property(&name) {
                activation.borrow_mut().put(&name, JsValue::Undefined);
            }
        }
    }

    /// Execute every top-level statement and return the last completion's
    /// value. The collector runs between statements with the running result
    /// rooted.
    pub fn run(&mut self, program: &Program) -> Result<JsValue, EvalError> {
        let mut result = JsValue::Undefined;
        for stmt in &program.body {
            self.maybe_gc(&[&result]);
            let completion = self.exec_statement(stmt)?;
            if let Completion::Break | Completion::Continue = completion {
                return Err(EvalError::type_error(
                    "break or continue outside of a loop",
                    self.stack_trace(None),
                ));
            }
            result = completion.value();
        }
        Ok(result)
    }

    pub fn eval_statement(&mut self, stmt: &Statement) -> Result<Completion, EvalError> {
        self.exec_statement(stmt)
    }

    /// Evaluate an expression to a language value.
    pub fn eval_expression(&mut self, expr: &Expression) -> Result<JsValue, EvalError> {
        let v = self.eval_expr(expr)?;
        self.get_value(&v)
    }

    /// The global object, for installing host properties.
    pub fn global_object(&self) -> ObjRef {
        self.global.clone()
    }

    //
    // Heap access
    //

    pub(crate) fn allocate(&mut self, data: JsObjectData) -> ObjRef {
        let obj = Rc::new(RefCell::new(data));
        self.allocate_object_slot(obj.clone());
        obj
    }

    pub(crate) fn get_object(&self, id: u64) -> Option<ObjRef> {
        self.objects.get(id as usize).and_then(|slot| slot.clone())
    }

    /// The heap object behind a value known to be an object.
    pub(crate) fn expect_object(&self, val: &JsValue) -> Result<ObjRef, EvalError> {
        if let JsValue::Object(o) = val
            && let Some(obj) = self.get_object(o.id)
        {
            return Ok(obj);
        }
        Err(EvalError::type_error(
            format!("{val} is not an object"),
            self.stack_trace(None),
        ))
    }

    /// ToObject. Undefined and null cannot convert; boolean and number box
    /// into wrapper objects; the dialect has no String object to box into.
    pub(crate) fn to_object(&mut self, val: &JsValue) -> Result<ObjRef, EvalError> {
        match val {
            JsValue::Object(_) => self.expect_object(val),
            JsValue::Undefined | JsValue::Null => Err(EvalError::type_error(
                format!("Cannot convert {val} to object"),
                self.stack_trace(None),
            )),
            JsValue::Boolean(_) => {
                let proto = self
                    .boolean_prototype
                    .clone()
                    .unwrap_or_else(|| self.object_prototype.clone());
                let obj = self.allocate(JsObjectData::new("Boolean", Some(proto)));
                obj.borrow_mut().internal_value = Some(val.clone());
                Ok(obj)
            }
            JsValue::Number(_) => {
                let proto = self
                    .number_prototype
                    .clone()
                    .unwrap_or_else(|| self.object_prototype.clone());
                let obj = self.allocate(JsObjectData::new("Number", Some(proto)));
                obj.borrow_mut().internal_value = Some(val.clone());
                Ok(obj)
            }
            JsValue::String(_) => Err(EvalError::not_implemented(
                "converting a string to an object",
                self.stack_trace(None),
            )),
        }
    }

    //
    // Function machinery
    //

    /// A bare function object: class "Function", the function prototype both
    /// as [[Prototype]] and as initial `prototype` property.
    pub(crate) fn make_raw_function(&mut self) -> ObjRef {
        let obj = self.allocate(JsObjectData::new(
            "Function",
            Some(self.function_prototype.clone()),
        ));
        let proto_handle = object_handle(&self.function_prototype);
        obj.borrow_mut().put("prototype", proto_handle);
        obj
    }

    /// A native function: the handler serves as both call and construct
    /// thunk.
    pub fn make_function<F>(&mut self, f: F, declared_length: usize) -> ObjRef
    where
        F: Fn(&mut Interpreter, &JsValue, &[JsValue]) -> Result<JsValue, EvalError> + 'static,
    {
        let handler: NativeHandler = Rc::new(f);
        let obj = self.make_raw_function();
        {
            let mut o = obj.borrow_mut();
            o.put_with_attributes(
                "length",
                JsValue::Number(declared_length as f64),
                PropertyAttributes::READ_ONLY
                    | PropertyAttributes::DONT_ENUM
                    | PropertyAttributes::DONT_DELETE,
            );
            o.call = Some(JsFunction::Native(handler.clone()));
            o.construct = Some(Construct::Native(handler));
        }
        obj
    }

    /// Evaluate a function-definition statement: build the callable object,
    /// close over the current scope, and bind the name in the enclosing
    /// activation.
    pub(crate) fn define_function(&mut self, decl: &FunctionDecl) -> Result<(), EvalError> {
        let callee = self.make_raw_function();
        let callee_handle = object_handle(&callee);
        let JsValue::Object(callee_ref) = callee_handle else {
            unreachable!("make_raw_function registers the object");
        };
        let user = Rc::new(UserFunction {
            name: decl.name.clone(),
            params: decl.params.clone(),
            locals: hoisted_names(&decl.body),
            body: decl.body.clone(),
            scope: self.scopes.clone(),
            object_id: callee_ref.id,
        });
        {
            let mut c = callee.borrow_mut();
            c.put_with_attributes(
                "length",
                JsValue::Number(decl.params.len() as f64),
                PropertyAttributes::READ_ONLY
                    | PropertyAttributes::DONT_ENUM
                    | PropertyAttributes::DONT_DELETE,
            );
            c.call = Some(JsFunction::User(user));
            c.construct = Some(Construct::Default {
                class_name: decl.name.clone(),
            });
        }

        // Fresh prototype object for `new`, with a constructor back-reference
        let proto = self.allocate(JsObjectData::new(
            "Object",
            Some(self.object_prototype.clone()),
        ));
        proto.borrow_mut().put_with_attributes(
            "constructor",
            JsValue::Object(callee_ref),
            PropertyAttributes::DONT_ENUM,
        );
        callee.borrow_mut().put("prototype", object_handle(&proto));

        self.scopes
            .activation
            .borrow_mut()
            .put(&decl.name, JsValue::Object(callee_ref));
        Ok(())
    }

    /// Invoke a call thunk.
    pub(crate) fn invoke(
        &mut self,
        thunk: &JsFunction,
        this: &JsValue,
        args: &[JsValue],
    ) -> Result<JsValue, EvalError> {
        match thunk {
            JsFunction::Native(f) => f(self, this, args),
            JsFunction::User(user) => self.call_user_function(user, this, args),
        }
    }

    /// Invoke a call thunk, recording the call-site extent on the current
    /// scope link for the duration.
    pub(crate) fn invoke_at(
        &mut self,
        thunk: &JsFunction,
        this: &JsValue,
        args: &[JsValue],
        extent: &SourceExtent,
    ) -> Result<JsValue, EvalError> {
        let saved = self.scopes.call_site.replace(Some(extent.clone()));
        let result = self.invoke(thunk, this, args);
        *self.scopes.call_site.borrow_mut() = saved;
        result
    }

    fn call_user_function(
        &mut self,
        user: &Rc<UserFunction>,
        this: &JsValue,
        args: &[JsValue],
    ) -> Result<JsValue, EvalError> {
        trace!("call {}({} args)", user.name, args.len());
        let callee = JsValue::Object(JsObject {
            id: user.object_id,
        });
        let arguments = self.make_arguments_object(args, callee);

        let activation = self.allocate(JsObjectData::new("Activation", None));
        {
            let mut act = activation.borrow_mut();
            act.put_with_attributes(
                "this",
                this.clone(),
                PropertyAttributes::READ_ONLY
                    | PropertyAttributes::DONT_ENUM
                    | PropertyAttributes::DONT_DELETE,
            );
            act.put_with_attributes("arguments", arguments, PropertyAttributes::DONT_DELETE);
            for (i, param) in user.params.iter().enumerate() {
                act.put(param, args.get(i).cloned().unwrap_or(JsValue::Undefined));
            }
            for name in &user.locals {
                // A parameter of the same name keeps its value
                if !act.has_own_property(name) {
                    act.put(name, JsValue::Undefined);
                }
            }
        }

        // Push the callee chain; the swap-back below runs on every exit path,
        // including when the body fails.
        let callee_chain = Scope::new(activation, Some(user.scope.clone()));
        let saved = std::mem::replace(&mut self.scopes, callee_chain);
        let result = self.exec_function_body(&user.body);
        self.scopes = saved;
        result
    }

    /// The arguments object: a plain object carrying `callee`, `length`, and
    /// the actuals under their indices, all non-enumerable.
    fn make_arguments_object(&mut self, args: &[JsValue], callee: JsValue) -> JsValue {
        let obj = self.allocate(JsObjectData::new(
            "Object",
            Some(self.object_prototype.clone()),
        ));
        {
            let mut o = obj.borrow_mut();
            o.put_with_attributes("callee", callee, PropertyAttributes::DONT_ENUM);
            o.put_with_attributes(
                "length",
                JsValue::Number(args.len() as f64),
                PropertyAttributes::DONT_ENUM,
            );
            for (i, arg) in args.iter().enumerate() {
                o.put_with_attributes(&i.to_string(), arg.clone(), PropertyAttributes::DONT_ENUM);
            }
        }
        object_handle(&obj)
    }

    /// Extents of the call sites currently in flight, innermost first,
    /// optionally preceded by the extent of the failing node itself.
    pub(crate) fn stack_trace(&self, current: Option<&SourceExtent>) -> Vec<SourceExtent> {
        let mut trace = Vec::new();
        if let Some(extent) = current {
            trace.push(extent.clone());
        }
        let mut scope = Some(self.scopes.clone());
        while let Some(s) = scope {
            if let Some(site) = s.call_site.borrow().as_ref() {
                trace.push(site.clone());
            }
            scope = s.prev.clone();
        }
        trace
    }

    /// Human-oriented rendering of a value for the REPL.
    pub fn format_value(&self, val: &JsValue) -> String {
        match val {
            JsValue::String(s) => format!("'{s}'"),
            JsValue::Object(o) => {
                let Some(obj) = self.get_object(o.id) else {
                    return "[object]".to_string();
                };
                let obj = obj.borrow();
                match &obj.call {
                    Some(JsFunction::User(user)) => format!("function {}()", user.name),
                    Some(JsFunction::Native(_)) => "function()".to_string(),
                    None => {
                        let fields: Vec<String> = obj
                            .enumerable_keys()
                            .iter()
                            .map(|k| format!("{k}: {}", obj.get(k)))
                            .collect();
                        if fields.is_empty() {
                            format!("[object {}]", obj.class_name)
                        } else {
                            format!("{{{}}}", fields.join(", "))
                        }
                    }
                }
            }
            other => other.to_string(),
        }
    }
}
