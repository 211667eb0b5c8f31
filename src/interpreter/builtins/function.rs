use super::*;

impl Interpreter {
    pub(crate) fn make_function_constructor(&mut self) -> ObjRef {
        // Function.prototype is itself callable and returns undefined
        self.function_prototype.borrow_mut().call = Some(JsFunction::Native(Rc::new(
            |_interp: &mut Interpreter, _this: &JsValue, _args: &[JsValue]| Ok(JsValue::Undefined),
        )));

        let ctor = self.make_function(
            |interp: &mut Interpreter, _this: &JsValue, _args: &[JsValue]| {
                Err(EvalError::not_implemented(
                    "the Function constructor",
                    interp.stack_trace(None),
                ))
            },
            1,
        );
        ctor.borrow_mut().put_with_attributes(
            "prototype",
            object_handle(&self.function_prototype),
            PROTOTYPE_ATTR,
        );
        self.function_prototype
            .borrow_mut()
            .put("constructor", object_handle(&ctor));

        ctor
    }
}
