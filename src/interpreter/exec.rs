use super::*;

/// Collect the names a block binds at activation time: every variable
/// declarator and every function-definition name. Descends into blocks,
/// branches, and loop bodies (including a `var` for-init), but never into
/// nested function bodies; those hoist into their own activation.
pub(crate) fn hoisted_names(stmts: &[Statement]) -> Vec<String> {
    let mut names = Vec::new();
    for stmt in stmts {
        scan_statement(stmt, &mut names);
    }
    names
}

fn scan_statement(stmt: &Statement, names: &mut Vec<String>) {
    match stmt {
        Statement::Variable(declarations) => {
            for d in declarations {
                names.push(d.name.clone());
            }
        }
        Statement::FunctionDeclaration(f) => names.push(f.name.clone()),
        Statement::Block(body) => {
            for s in body {
                scan_statement(s, names);
            }
        }
        Statement::If(s) => {
            scan_statement(&s.consequent, names);
            if let Some(alt) = &s.alternate {
                scan_statement(alt, names);
            }
        }
        Statement::While(s) => scan_statement(&s.body, names),
        Statement::For(s) => {
            if let Some(ForInit::Variable(declarations)) = &s.init {
                for d in declarations {
                    names.push(d.name.clone());
                }
            }
            scan_statement(&s.body, names);
        }
        Statement::Empty
        | Statement::Expression(_)
        | Statement::Continue
        | Statement::Break
        | Statement::Return(_) => {}
    }
}

impl Interpreter {
    pub(crate) fn exec_statement(&mut self, stmt: &Statement) -> Result<Completion, EvalError> {
        let completion = self.exec_statement_inner(stmt)?;
        if let Some(observer) = self.on_statement_executed.clone() {
            observer(stmt, &completion);
        }
        Ok(completion)
    }

    fn exec_statement_inner(&mut self, stmt: &Statement) -> Result<Completion, EvalError> {
        match stmt {
            Statement::Empty => Ok(Completion::Normal(JsValue::Undefined)),
            Statement::Expression(expr) => {
                let v = self.eval_expr(expr)?;
                Ok(Completion::Normal(self.get_value(&v)?))
            }
            Statement::Block(body) => self.exec_block(body),
            Statement::Variable(declarations) => {
                // Bindings were installed at hoist time; only initializers run
                // here, and they write the enclosing activation directly.
                for d in declarations {
                    debug_assert!(self.scopes.activation.borrow().has_property(&d.name));
                    if let Some(init) = &d.init {
                        let v = self.eval_expr(init)?;
                        let v = self.get_value(&v)?;
                        self.scopes.activation.borrow_mut().put(&d.name, v);
                    }
                }
                Ok(Completion::Normal(JsValue::Undefined))
            }
            Statement::If(s) => {
                let test = self.eval_expr(&s.test)?;
                let test = self.get_value(&test)?;
                if to_boolean(&test) {
                    self.exec_statement(&s.consequent)
                } else if let Some(alt) = &s.alternate {
                    self.exec_statement(alt)
                } else {
                    Ok(Completion::Normal(JsValue::Undefined))
                }
            }
            Statement::While(s) => {
                loop {
                    let test = self.eval_expr(&s.test)?;
                    let test = self.get_value(&test)?;
                    if !to_boolean(&test) {
                        break;
                    }
                    match self.exec_statement(&s.body)? {
                        Completion::Normal(_) | Completion::Continue => {}
                        Completion::Break => break,
                        ret @ Completion::Return(_) => return Ok(ret),
                    }
                }
                Ok(Completion::Normal(JsValue::Undefined))
            }
            Statement::For(s) => {
                match &s.init {
                    Some(ForInit::Variable(declarations)) => {
                        let init = Statement::Variable(declarations.clone());
                        self.exec_statement(&init)?;
                    }
                    Some(ForInit::Expression(expr)) => {
                        let v = self.eval_expr(expr)?;
                        self.get_value(&v)?;
                    }
                    None => {}
                }
                loop {
                    if let Some(test) = &s.test {
                        let test_val = self.eval_expr(test)?;
                        if !to_boolean(&self.get_value(&test_val)?) {
                            break;
                        }
                    }
                    match self.exec_statement(&s.body)? {
                        Completion::Normal(_) | Completion::Continue => {}
                        Completion::Break => break,
                        ret @ Completion::Return(_) => return Ok(ret),
                    }
                    if let Some(update) = &s.update {
                        let v = self.eval_expr(update)?;
                        self.get_value(&v)?;
                    }
                }
                Ok(Completion::Normal(JsValue::Undefined))
            }
            Statement::Continue => Ok(Completion::Continue),
            Statement::Break => Ok(Completion::Break),
            Statement::Return(expr) => {
                let value = match expr {
                    Some(e) => {
                        let v = self.eval_expr(e)?;
                        self.get_value(&v)?
                    }
                    None => JsValue::Undefined,
                };
                Ok(Completion::Return(value))
            }
            Statement::FunctionDeclaration(f) => {
                self.define_function(f)?;
                Ok(Completion::Normal(JsValue::Undefined))
            }
        }
    }

    fn exec_block(&mut self, body: &[Statement]) -> Result<Completion, EvalError> {
        for stmt in body {
            let completion = self.exec_statement(stmt)?;
            if completion.is_abrupt() {
                return Ok(completion);
            }
        }
        Ok(Completion::Normal(JsValue::Undefined))
    }

    /// Run a function body (or an eval body) and reduce the completion to the
    /// call's result. `break`/`continue` cannot reach here out of a
    /// well-formed program; report them rather than looping forever somewhere.
    pub(crate) fn exec_function_body(&mut self, body: &[Statement]) -> Result<JsValue, EvalError> {
        for stmt in body {
            match self.exec_statement(stmt)? {
                Completion::Normal(_) => {}
                Completion::Return(v) => return Ok(v),
                Completion::Break | Completion::Continue => {
                    return Err(EvalError::type_error(
                        "break or continue outside of a loop",
                        self.stack_trace(None),
                    ));
                }
            }
        }
        Ok(JsValue::Undefined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn names(source: &str) -> Vec<String> {
        hoisted_names(&parse("test", source).expect("parse error").body)
    }

    #[test]
    fn collects_variables_and_functions() {
        assert_eq!(
            names("var a = 1; function f() {} var b, c = 2;"),
            vec!["a", "f", "b", "c"]
        );
    }

    #[test]
    fn descends_into_blocks_and_branches() {
        assert_eq!(
            names("{ var a; } if (1) { var b; } else var c; while (0) { var d; }"),
            vec!["a", "b", "c", "d"]
        );
    }

    #[test]
    fn collects_var_for_init() {
        assert_eq!(names("for (var i = 0, j = 1; i; ) { var k; }"), vec!["i", "j", "k"]);
    }

    #[test]
    fn does_not_descend_into_function_bodies() {
        assert_eq!(names("function f() { var inner; }"), vec!["f"]);
    }
}
