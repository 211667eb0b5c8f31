use super::*;
use crate::types::number_ops;

impl Interpreter {
    pub(crate) fn eval_expr(&mut self, expr: &Expression) -> Result<ExprValue, EvalError> {
        match expr {
            Expression::Literal(lit) => Ok(ExprValue::Value(eval_literal(lit))),
            Expression::Identifier(name) => Ok(ExprValue::Ref(self.scopes.lookup(name))),
            Expression::Member(obj, prop) => self.eval_member(obj, prop),
            Expression::Call(callee, args, extent) => self.eval_call(callee, args, extent),
            Expression::New(callee, args, extent) => self.eval_new(callee, args, extent),
            Expression::Unary(op, operand) => self.eval_unary(*op, operand),
            Expression::Update(op, prefix, operand) => self.eval_update(*op, *prefix, operand),
            Expression::Typeof(operand) => self.eval_typeof(operand),
            Expression::Void(operand) => {
                let operand = self.eval_expr(operand)?;
                self.get_value(&operand)?;
                Ok(ExprValue::undefined())
            }
            Expression::Delete(operand) => self.eval_delete(operand),
            Expression::Binary(op, left, right) => {
                let l = self.eval_expr(left)?;
                let l = self.get_value(&l)?;
                let r = self.eval_expr(right)?;
                let r = self.get_value(&r)?;
                Ok(ExprValue::Value(self.apply_binary(*op, l, r)?))
            }
            Expression::Logical(op, left, right) => {
                let l = self.eval_expr(left)?;
                let l = self.get_value(&l)?;
                let short_circuits = match op {
                    LogicalOp::And => !to_boolean(&l),
                    LogicalOp::Or => to_boolean(&l),
                };
                if short_circuits {
                    return Ok(ExprValue::Value(l));
                }
                let r = self.eval_expr(right)?;
                Ok(ExprValue::Value(self.get_value(&r)?))
            }
            Expression::Assign(op, left, right) => self.eval_assign(*op, left, right),
            Expression::Conditional(test, consequent, alternate) => {
                let t = self.eval_expr(test)?;
                let t = self.get_value(&t)?;
                let chosen = if to_boolean(&t) { consequent } else { alternate };
                let v = self.eval_expr(chosen)?;
                Ok(ExprValue::Value(self.get_value(&v)?))
            }
            Expression::Sequence(exprs) => {
                let mut result = JsValue::Undefined;
                for e in exprs {
                    let v = self.eval_expr(e)?;
                    result = self.get_value(&v)?;
                }
                Ok(ExprValue::Value(result))
            }
        }
    }

    /// Resolve a reference to the value it names. A base-less reference is an
    /// unresolved identifier: reading it is an error.
    pub(crate) fn get_value(&self, v: &ExprValue) -> Result<JsValue, EvalError> {
        match v {
            ExprValue::Value(v) => Ok(v.clone()),
            ExprValue::Ref(r) => match &r.base {
                None => Err(EvalError::type_error(
                    format!("{} is not defined", r.name),
                    self.stack_trace(None),
                )),
                Some(base) => Ok(base.borrow().get(&r.name)),
            },
        }
    }

    /// Store through a reference. A base-less reference targets the global
    /// object: assigning to an undeclared name creates a global property.
    pub(crate) fn put_value(&mut self, v: &ExprValue, value: JsValue) -> Result<(), EvalError> {
        match v {
            ExprValue::Value(_) => Err(EvalError::type_error(
                "invalid assignment target",
                self.stack_trace(None),
            )),
            ExprValue::Ref(r) => {
                let base = r.base.clone().unwrap_or_else(|| self.global.clone());
                base.borrow_mut().put(&r.name, value);
                Ok(())
            }
        }
    }

    fn eval_member(
        &mut self,
        obj: &Expression,
        prop: &MemberProperty,
    ) -> Result<ExprValue, EvalError> {
        let base = self.eval_expr(obj)?;
        let base = self.get_value(&base)?;
        let base = self.to_object(&base)?;
        let name = match prop {
            MemberProperty::Dot(name) => name.clone(),
            MemberProperty::Computed(key) => {
                let key = self.eval_expr(key)?;
                let key = self.get_value(&key)?;
                self.to_string_value(&key)?.to_rust_string()
            }
        };
        Ok(ExprValue::Ref(Reference {
            base: Some(base),
            name,
        }))
    }

    fn eval_call(
        &mut self,
        callee: &Expression,
        args: &[Expression],
        extent: &SourceExtent,
    ) -> Result<ExprValue, EvalError> {
        let target = self.eval_expr(callee)?;
        let func_val = self.get_value(&target)?;
        let args = self.eval_argument_list(args)?;

        let JsValue::Object(o) = &func_val else {
            return Err(EvalError::type_error(
                format!("{func_val} is not a function"),
                self.stack_trace(Some(extent)),
            ));
        };
        let func_obj = self.get_object(o.id).ok_or_else(|| {
            EvalError::type_error(
                format!("{func_val} is not a function"),
                self.stack_trace(Some(extent)),
            )
        })?;
        let Some(thunk) = func_obj.borrow().call.clone() else {
            return Err(EvalError::type_error(
                format!("{} is not callable", self.format_value(&func_val)),
                self.stack_trace(Some(extent)),
            ));
        };

        // `this` is the base of the callee reference, unless that base is an
        // activation, in which case there is no receiver.
        let mut this = JsValue::Null;
        if let ExprValue::Ref(r) = &target
            && let Some(base) = &r.base
            && base.borrow().class_name != "Activation"
        {
            this = object_handle(base);
        }

        let result = self.invoke_at(&thunk, &this, &args, extent)?;
        Ok(ExprValue::Value(result))
    }

    fn eval_new(
        &mut self,
        callee: &Expression,
        args: &[Expression],
        extent: &SourceExtent,
    ) -> Result<ExprValue, EvalError> {
        let target = self.eval_expr(callee)?;
        let func_val = self.get_value(&target)?;
        let args = self.eval_argument_list(args)?;

        let JsValue::Object(o) = &func_val else {
            return Err(EvalError::type_error(
                format!("{func_val} is not an object"),
                self.stack_trace(Some(extent)),
            ));
        };
        let func_obj = self.get_object(o.id).ok_or_else(|| {
            EvalError::type_error(
                format!("{func_val} is not an object"),
                self.stack_trace(Some(extent)),
            )
        })?;
        let Some(construct) = func_obj.borrow().construct.clone() else {
            return Err(EvalError::type_error(
                format!("{} is not constructable", self.format_value(&func_val)),
                self.stack_trace(Some(extent)),
            ));
        };

        let result = match construct {
            Construct::Native(f) => {
                let saved = self.scopes.call_site.replace(Some(extent.clone()));
                let result = f(self, &JsValue::Undefined, &args);
                *self.scopes.call_site.borrow_mut() = saved;
                result?
            }
            Construct::Default { class_name } => {
                // Allocate from the function's prototype property, run the
                // body against the fresh object, and keep the body's result
                // only if it produced an object of its own.
                let proto_val = func_obj.borrow().get("prototype");
                let proto = match &proto_val {
                    JsValue::Object(p) => self
                        .get_object(p.id)
                        .unwrap_or_else(|| self.object_prototype.clone()),
                    _ => self.object_prototype.clone(),
                };
                let fresh = self.allocate(JsObjectData::new(&class_name, Some(proto)));
                let this = object_handle(&fresh);
                let thunk = func_obj.borrow().call.clone().ok_or_else(|| {
                    EvalError::type_error(
                        format!("{} is not constructable", self.format_value(&func_val)),
                        self.stack_trace(Some(extent)),
                    )
                })?;
                let result = self.invoke_at(&thunk, &this, &args, extent)?;
                if result.is_object() { result } else { this }
            }
        };
        Ok(ExprValue::Value(result))
    }

    fn eval_unary(&mut self, op: UnaryOp, operand: &Expression) -> Result<ExprValue, EvalError> {
        let v = self.eval_expr(operand)?;
        let v = self.get_value(&v)?;
        let result = match op {
            UnaryOp::Plus => JsValue::Number(self.to_number_value(&v)?),
            UnaryOp::Minus => JsValue::Number(-self.to_number_value(&v)?),
            UnaryOp::BitNot => JsValue::Number(number_ops::bitwise_not(self.to_number_value(&v)?)),
            UnaryOp::Not => JsValue::Boolean(!to_boolean(&v)),
        };
        Ok(ExprValue::Value(result))
    }

    fn eval_typeof(&mut self, operand: &Expression) -> Result<ExprValue, EvalError> {
        let v = self.eval_expr(operand)?;
        if let ExprValue::Ref(r) = &v
            && r.base.is_none()
        {
            return Ok(ExprValue::Value(JsValue::String(JsString::from_str(
                "undefined",
            ))));
        }
        let v = self.get_value(&v)?;
        let name = match &v {
            JsValue::Object(o) => {
                let callable = self
                    .get_object(o.id)
                    .is_some_and(|obj| obj.borrow().call.is_some());
                if callable { "function" } else { "object" }
            }
            other => typeof_primitive(other),
        };
        Ok(ExprValue::Value(JsValue::String(JsString::from_str(name))))
    }

    fn eval_delete(&mut self, operand: &Expression) -> Result<ExprValue, EvalError> {
        let v = self.eval_expr(operand)?;
        match v {
            ExprValue::Ref(r) => {
                let removed = match &r.base {
                    None => true,
                    Some(base) => base.borrow_mut().delete(&r.name),
                };
                Ok(ExprValue::Value(JsValue::Boolean(removed)))
            }
            ExprValue::Value(_) => Err(EvalError::not_implemented(
                "delete of a non-reference operand",
                self.stack_trace(None),
            )),
        }
    }

    fn eval_update(
        &mut self,
        op: UpdateOp,
        prefix: bool,
        operand: &Expression,
    ) -> Result<ExprValue, EvalError> {
        let target = self.eval_expr(operand)?;
        if matches!(target, ExprValue::Value(_)) {
            return Err(EvalError::type_error(
                "invalid increment/decrement operand",
                self.stack_trace(None),
            ));
        }
        let old = self.get_value(&target)?;
        let old = self.to_number_value(&old)?;
        let new = match op {
            UpdateOp::Increment => old + 1.0,
            UpdateOp::Decrement => old - 1.0,
        };
        self.put_value(&target, JsValue::Number(new))?;
        Ok(ExprValue::Value(JsValue::Number(if prefix {
            new
        } else {
            old
        })))
    }

    fn eval_assign(
        &mut self,
        op: AssignOp,
        left: &Expression,
        right: &Expression,
    ) -> Result<ExprValue, EvalError> {
        // The target reference is established before the right-hand side runs
        let target = self.eval_expr(left)?;
        let rhs = self.eval_expr(right)?;
        let rhs = self.get_value(&rhs)?;
        let result = match op.binary_op() {
            None => rhs,
            Some(binary) => {
                let current = self.get_value(&target)?;
                self.apply_binary(binary, current, rhs)?
            }
        };
        self.put_value(&target, result.clone())?;
        Ok(ExprValue::Value(result))
    }

    fn eval_argument_list(&mut self, args: &[Expression]) -> Result<Vec<JsValue>, EvalError> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            let v = self.eval_expr(arg)?;
            values.push(self.get_value(&v)?);
        }
        Ok(values)
    }

    pub(crate) fn apply_binary(
        &mut self,
        op: BinaryOp,
        l: JsValue,
        r: JsValue,
    ) -> Result<JsValue, EvalError> {
        let (l, r) = match op {
            BinaryOp::Add => {
                let l = self.to_primitive(&l, None)?;
                let r = self.to_primitive(&r, None)?;
                if l.is_string() || r.is_string() {
                    let ls = self.to_string_value(&l)?;
                    let rs = self.to_string_value(&r)?;
                    return Ok(JsValue::String(ls.concat(&rs)));
                }
                (l, r)
            }
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::LtEq | BinaryOp::GtEq => {
                let l = self.to_primitive(&l, Some(PreferredType::Number))?;
                let r = self.to_primitive(&r, Some(PreferredType::Number))?;
                if let (JsValue::String(ls), JsValue::String(rs)) = (&l, &r) {
                    // Code-unit lexicographic order
                    let less_lr = ls.code_units < rs.code_units;
                    let less_rl = rs.code_units < ls.code_units;
                    let result = match op {
                        BinaryOp::Lt => less_lr,
                        BinaryOp::Gt => less_rl,
                        BinaryOp::LtEq => !less_rl,
                        BinaryOp::GtEq => !less_lr,
                        _ => unreachable!(),
                    };
                    return Ok(JsValue::Boolean(result));
                }
                let ln = to_number(&l);
                let rn = to_number(&r);
                let result = match op {
                    BinaryOp::Lt => tri_compare(ln, rn).unwrap_or(false),
                    BinaryOp::Gt => tri_compare(rn, ln).unwrap_or(false),
                    BinaryOp::LtEq => matches!(tri_compare(rn, ln), Some(false)),
                    BinaryOp::GtEq => matches!(tri_compare(ln, rn), Some(false)),
                    _ => unreachable!(),
                };
                return Ok(JsValue::Boolean(result));
            }
            BinaryOp::Eq => {
                let eq = self.loose_equals(&l, &r)?;
                return Ok(JsValue::Boolean(eq));
            }
            BinaryOp::NotEq => {
                let eq = self.loose_equals(&l, &r)?;
                return Ok(JsValue::Boolean(!eq));
            }
            _ => (l, r),
        };

        let ln = self.to_number_value(&l)?;
        let rn = self.to_number_value(&r)?;
        let result = match op {
            BinaryOp::Add => ln + rn,
            BinaryOp::Sub => ln - rn,
            BinaryOp::Mul => ln * rn,
            BinaryOp::Div => ln / rn,
            BinaryOp::Mod => ln % rn,
            BinaryOp::LShift => number_ops::left_shift(ln, rn),
            BinaryOp::RShift => number_ops::signed_right_shift(ln, rn),
            BinaryOp::URShift => number_ops::unsigned_right_shift(ln, rn),
            BinaryOp::BitAnd => number_ops::bitwise_and(ln, rn),
            BinaryOp::BitXor => number_ops::bitwise_xor(ln, rn),
            BinaryOp::BitOr => number_ops::bitwise_or(ln, rn),
            BinaryOp::Eq
            | BinaryOp::NotEq
            | BinaryOp::Lt
            | BinaryOp::Gt
            | BinaryOp::LtEq
            | BinaryOp::GtEq => unreachable!("handled above"),
        };
        Ok(JsValue::Number(result))
    }
}

fn eval_literal(lit: &Literal) -> JsValue {
    match lit {
        Literal::Undefined => JsValue::Undefined,
        Literal::Null => JsValue::Null,
        Literal::Boolean(b) => JsValue::Boolean(*b),
        Literal::Number(n) => JsValue::Number(*n),
        Literal::String(s) => JsValue::String(JsString::from_str(s)),
    }
}
