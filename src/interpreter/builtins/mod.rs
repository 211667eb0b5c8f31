use super::*;

mod boolean;
mod function;
mod number;
mod object;

pub(crate) const PROTOTYPE_ATTR: PropertyAttributes = PropertyAttributes {
    read_only: true,
    dont_enum: true,
    dont_delete: true,
};

impl Interpreter {
    /// Populate the global object. Everything is installed dont_enum.
    pub(crate) fn setup_globals(&mut self) {
        let attr = PropertyAttributes::DONT_ENUM;

        let object_ctor = self.make_object_constructor();
        let function_ctor = self.make_function_constructor();
        let boolean_ctor = self.make_boolean_constructor();
        let number_ctor = self.make_number_constructor();
        {
            let global = self.global.clone();
            let mut g = global.borrow_mut();
            g.put_with_attributes("Object", object_handle(&object_ctor), attr);
            g.put_with_attributes("Function", object_handle(&function_ctor), attr);
            g.put_with_attributes("Boolean", object_handle(&boolean_ctor), attr);
            g.put_with_attributes("Number", object_handle(&number_ctor), attr);
            g.put_with_attributes("NaN", JsValue::Number(f64::NAN), attr);
            g.put_with_attributes("Infinity", JsValue::Number(f64::INFINITY), attr);
        }

        let eval_fn = self.make_function(
            |interp: &mut Interpreter, _this: &JsValue, args: &[JsValue]| {
                let Some(first) = args.first() else {
                    return Ok(JsValue::Undefined);
                };
                let JsValue::String(source) = first else {
                    return Ok(first.clone());
                };
                let program = crate::parser::parse("eval", &source.to_rust_string())
                    .map_err(|e| EvalError {
                        kind: ErrorKind::Syntax,
                        message: e.message,
                        stack_trace: interp.stack_trace(None),
                    })?;
                // Declarations land in the calling activation
                interp.hoist(&program);
                let mut result = JsValue::Undefined;
                for stmt in &program.body {
                    let completion = interp.exec_statement(stmt)?;
                    if completion.is_abrupt() {
                        return Ok(JsValue::Undefined);
                    }
                    result = completion.value();
                }
                Ok(result)
            },
            1,
        );

        let is_nan = self.make_function(
            |interp: &mut Interpreter, _this: &JsValue, args: &[JsValue]| {
                let arg = args.first().cloned().unwrap_or(JsValue::Undefined);
                let n = interp.to_number_value(&arg)?;
                Ok(JsValue::Boolean(n.is_nan()))
            },
            1,
        );

        let is_finite = self.make_function(
            |interp: &mut Interpreter, _this: &JsValue, args: &[JsValue]| {
                let arg = args.first().cloned().unwrap_or(JsValue::Undefined);
                let n = interp.to_number_value(&arg)?;
                Ok(JsValue::Boolean(n.is_finite()))
            },
            1,
        );

        let alert = self.make_function(
            |interp: &mut Interpreter, _this: &JsValue, args: &[JsValue]| {
                match args.first() {
                    Some(arg) => {
                        let text = interp.to_string_value(arg)?;
                        println!("ALERT: {text}");
                    }
                    None => println!("ALERT"),
                }
                Ok(JsValue::Undefined)
            },
            1,
        );

        let global = self.global.clone();
        let mut g = global.borrow_mut();
        g.put_with_attributes("eval", object_handle(&eval_fn), attr);
        g.put_with_attributes("isNaN", object_handle(&is_nan), attr);
        g.put_with_attributes("isFinite", object_handle(&is_finite), attr);
        g.put_with_attributes("alert", object_handle(&alert), attr);
    }

    /// The receiver must be an object of the given class; wrapper prototype
    /// methods refuse anything else.
    pub(crate) fn validate_type(
        &self,
        val: &JsValue,
        expected: &str,
    ) -> Result<ObjRef, EvalError> {
        if let JsValue::Object(o) = val
            && let Some(obj) = self.get_object(o.id)
        {
            if obj.borrow().class_name == expected {
                return Ok(obj);
            }
        }
        Err(EvalError::type_error(
            format!("{val} is not a {expected}"),
            self.stack_trace(None),
        ))
    }
}
