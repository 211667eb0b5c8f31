use crate::ast::*;
use crate::lexer::{Keyword, LexError, Lexer, Token};
use std::fmt;
use std::rc::Rc;

#[derive(Debug)]
pub struct ParseError {
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SyntaxError: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError {
            message: format!("{} at offset {}", e.message, e.position),
        }
    }
}

impl From<ParseError> for crate::error::EngineError {
    fn from(e: ParseError) -> Self {
        crate::error::EngineError::Syntax(e.message)
    }
}

/// Parse a complete program. `file` names the source in stack traces.
pub fn parse(file: &str, source: &str) -> Result<Program, ParseError> {
    Parser::new(file, source)?.parse_program()
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    file: Rc<str>,
    current: Token,
    current_start: usize,
    prev_token_end: usize,
    in_function: u32,
    in_iteration: u32,
}

impl<'a> Parser<'a> {
    pub fn new(file: &str, source: &'a str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token()?;
        let current_start = lexer.token_start();
        Ok(Self {
            lexer,
            file: Rc::from(file),
            current,
            current_start,
            prev_token_end: 0,
            in_function: 0,
            in_iteration: 0,
        })
    }

    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut body = Vec::new();
        while self.current != Token::Eof {
            body.push(self.parse_statement_or_function_declaration()?);
        }
        Ok(Program { body })
    }

    fn advance(&mut self) -> Result<Token, ParseError> {
        self.prev_token_end = self.lexer.offset();
        let next = self.lexer.next_token()?;
        self.current_start = self.lexer.token_start();
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn accept(&mut self, token: &Token) -> Result<bool, ParseError> {
        if self.current == *token {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn accept_keyword(&mut self, keyword: Keyword) -> Result<bool, ParseError> {
        self.accept(&Token::Keyword(keyword))
    }

    fn expect(&mut self, token: &Token) -> Result<(), ParseError> {
        if self.current == *token {
            self.advance()?;
            Ok(())
        } else {
            Err(self.unexpected(&format!("expected {token}")))
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let Token::Identifier(name) = &self.current {
            let name = name.clone();
            self.advance()?;
            Ok(name)
        } else {
            Err(self.unexpected("expected identifier"))
        }
    }

    fn unexpected(&self, context: &str) -> ParseError {
        ParseError {
            message: format!("{context}, got {}", self.current),
        }
    }

    fn extent_from(&self, start: usize) -> SourceExtent {
        SourceExtent {
            file: self.file.clone(),
            start,
            end: self.prev_token_end,
        }
    }

    //
    // Statements
    //

    fn parse_statement_or_function_declaration(&mut self) -> Result<Statement, ParseError> {
        let stmt = if self.current == Token::Keyword(Keyword::Function) {
            self.parse_function_declaration()?
        } else {
            self.parse_statement()?
        };
        self.accept(&Token::Semicolon)?;
        Ok(stmt)
    }

    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        match &self.current {
            Token::LeftBrace => self.parse_block(),
            Token::Semicolon => {
                self.advance()?;
                Ok(Statement::Empty)
            }
            Token::Keyword(Keyword::Var) => {
                self.advance()?;
                Ok(Statement::Variable(self.parse_variable_declaration_list()?))
            }
            Token::Keyword(Keyword::If) => self.parse_if(),
            Token::Keyword(Keyword::While) => self.parse_while(),
            Token::Keyword(Keyword::For) => self.parse_for(),
            Token::Keyword(Keyword::Continue) => {
                if self.in_iteration == 0 {
                    return Err(ParseError {
                        message: "continue outside of a loop".to_string(),
                    });
                }
                self.advance()?;
                Ok(Statement::Continue)
            }
            Token::Keyword(Keyword::Break) => {
                if self.in_iteration == 0 {
                    return Err(ParseError {
                        message: "break outside of a loop".to_string(),
                    });
                }
                self.advance()?;
                Ok(Statement::Break)
            }
            Token::Keyword(Keyword::Return) => {
                if self.in_function == 0 {
                    return Err(ParseError {
                        message: "return outside of a function".to_string(),
                    });
                }
                self.advance()?;
                let arg = if matches!(
                    self.current,
                    Token::Semicolon | Token::RightBrace | Token::Eof
                ) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                Ok(Statement::Return(arg))
            }
            _ => Ok(Statement::Expression(self.parse_expression()?)),
        }
    }

    fn parse_block(&mut self) -> Result<Statement, ParseError> {
        self.expect(&Token::LeftBrace)?;
        let mut body = Vec::new();
        while !self.accept(&Token::RightBrace)? {
            if self.current == Token::Eof {
                return Err(self.unexpected("expected '}'"));
            }
            body.push(self.parse_statement_or_function_declaration()?);
        }
        Ok(Statement::Block(body))
    }

    fn parse_variable_declaration_list(&mut self) -> Result<Vec<VariableDeclarator>, ParseError> {
        let mut declarations = Vec::new();
        loop {
            let name = self.expect_identifier()?;
            let init = if self.accept(&Token::Assign)? {
                Some(self.parse_assignment_expression()?)
            } else {
                None
            };
            declarations.push(VariableDeclarator { name, init });
            if !self.accept(&Token::Comma)? {
                break;
            }
        }
        Ok(declarations)
    }

    fn parse_if(&mut self) -> Result<Statement, ParseError> {
        self.advance()?;
        self.expect(&Token::LeftParen)?;
        let test = self.parse_expression()?;
        self.expect(&Token::RightParen)?;
        let consequent = Box::new(self.parse_statement()?);
        self.accept(&Token::Semicolon)?;
        let alternate = if self.accept_keyword(Keyword::Else)? {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Statement::If(IfStatement {
            test,
            consequent,
            alternate,
        }))
    }

    fn parse_while(&mut self) -> Result<Statement, ParseError> {
        self.advance()?;
        self.expect(&Token::LeftParen)?;
        let test = self.parse_expression()?;
        self.expect(&Token::RightParen)?;
        self.in_iteration += 1;
        let body = self.parse_statement();
        self.in_iteration -= 1;
        Ok(Statement::While(WhileStatement {
            test,
            body: Box::new(body?),
        }))
    }

    fn parse_for(&mut self) -> Result<Statement, ParseError> {
        self.advance()?;
        self.expect(&Token::LeftParen)?;
        let init = if self.accept(&Token::Semicolon)? {
            None
        } else {
            let init = if self.accept_keyword(Keyword::Var)? {
                ForInit::Variable(self.parse_variable_declaration_list()?)
            } else {
                ForInit::Expression(self.parse_expression()?)
            };
            self.expect(&Token::Semicolon)?;
            Some(init)
        };
        let test = if self.accept(&Token::Semicolon)? {
            None
        } else {
            let test = self.parse_expression()?;
            self.expect(&Token::Semicolon)?;
            Some(test)
        };
        let update = if self.current == Token::RightParen {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(&Token::RightParen)?;
        self.in_iteration += 1;
        let body = self.parse_statement();
        self.in_iteration -= 1;
        Ok(Statement::For(ForStatement {
            init,
            test,
            update,
            body: Box::new(body?),
        }))
    }

    fn parse_function_declaration(&mut self) -> Result<Statement, ParseError> {
        self.expect(&Token::Keyword(Keyword::Function))?;
        let name = self.expect_identifier()?;
        self.expect(&Token::LeftParen)?;
        let mut params = Vec::new();
        if !self.accept(&Token::RightParen)? {
            loop {
                params.push(self.expect_identifier()?);
                if !self.accept(&Token::Comma)? {
                    break;
                }
            }
            self.expect(&Token::RightParen)?;
        }
        // The body is a fresh function context: loops and labels do not leak in
        let saved_iteration = std::mem::replace(&mut self.in_iteration, 0);
        self.in_function += 1;
        let block = self.parse_block();
        self.in_function -= 1;
        self.in_iteration = saved_iteration;
        let body = match block? {
            Statement::Block(body) => body,
            _ => unreachable!("parse_block returns a block"),
        };
        Ok(Statement::FunctionDeclaration(FunctionDecl {
            name,
            params,
            body,
        }))
    }

    //
    // Expressions
    //

    pub fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        let first = self.parse_assignment_expression()?;
        if self.current != Token::Comma {
            return Ok(first);
        }
        let mut exprs = vec![first];
        while self.accept(&Token::Comma)? {
            exprs.push(self.parse_assignment_expression()?);
        }
        Ok(Expression::Sequence(exprs))
    }

    fn parse_assignment_expression(&mut self) -> Result<Expression, ParseError> {
        let lhs = self.parse_conditional_expression()?;
        let op = match self.current {
            Token::Assign => AssignOp::Assign,
            Token::PlusAssign => AssignOp::AddAssign,
            Token::MinusAssign => AssignOp::SubAssign,
            Token::StarAssign => AssignOp::MulAssign,
            Token::SlashAssign => AssignOp::DivAssign,
            Token::PercentAssign => AssignOp::ModAssign,
            Token::LeftShiftAssign => AssignOp::LShiftAssign,
            Token::RightShiftAssign => AssignOp::RShiftAssign,
            Token::UnsignedRightShiftAssign => AssignOp::URShiftAssign,
            Token::AmpersandAssign => AssignOp::BitAndAssign,
            Token::PipeAssign => AssignOp::BitOrAssign,
            Token::CaretAssign => AssignOp::BitXorAssign,
            _ => return Ok(lhs),
        };
        self.advance()?;
        // Right associative; target validity is a runtime question
        let rhs = self.parse_assignment_expression()?;
        Ok(Expression::Assign(op, Box::new(lhs), Box::new(rhs)))
    }

    fn parse_conditional_expression(&mut self) -> Result<Expression, ParseError> {
        let test = self.parse_logical_or()?;
        if !self.accept(&Token::Question)? {
            return Ok(test);
        }
        let consequent = self.parse_assignment_expression()?;
        self.expect(&Token::Colon)?;
        let alternate = self.parse_assignment_expression()?;
        Ok(Expression::Conditional(
            Box::new(test),
            Box::new(consequent),
            Box::new(alternate),
        ))
    }

    fn parse_logical_or(&mut self) -> Result<Expression, ParseError> {
        let mut lhs = self.parse_logical_and()?;
        while self.accept(&Token::LogicalOr)? {
            let rhs = self.parse_logical_and()?;
            lhs = Expression::Logical(LogicalOp::Or, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_logical_and(&mut self) -> Result<Expression, ParseError> {
        let mut lhs = self.parse_bitwise_or()?;
        while self.accept(&Token::LogicalAnd)? {
            let rhs = self.parse_bitwise_or()?;
            lhs = Expression::Logical(LogicalOp::And, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_bitwise_or(&mut self) -> Result<Expression, ParseError> {
        let mut lhs = self.parse_bitwise_xor()?;
        while self.accept(&Token::Pipe)? {
            let rhs = self.parse_bitwise_xor()?;
            lhs = Expression::Binary(BinaryOp::BitOr, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_bitwise_xor(&mut self) -> Result<Expression, ParseError> {
        let mut lhs = self.parse_bitwise_and()?;
        while self.accept(&Token::Caret)? {
            let rhs = self.parse_bitwise_and()?;
            lhs = Expression::Binary(BinaryOp::BitXor, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_bitwise_and(&mut self) -> Result<Expression, ParseError> {
        let mut lhs = self.parse_equality()?;
        while self.accept(&Token::Ampersand)? {
            let rhs = self.parse_equality()?;
            lhs = Expression::Binary(BinaryOp::BitAnd, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> Result<Expression, ParseError> {
        let mut lhs = self.parse_relational()?;
        loop {
            let op = match self.current {
                Token::Equal => BinaryOp::Eq,
                Token::NotEqual => BinaryOp::NotEq,
                _ => return Ok(lhs),
            };
            self.advance()?;
            let rhs = self.parse_relational()?;
            lhs = Expression::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_relational(&mut self) -> Result<Expression, ParseError> {
        let mut lhs = self.parse_shift()?;
        loop {
            let op = match self.current {
                Token::LessThan => BinaryOp::Lt,
                Token::GreaterThan => BinaryOp::Gt,
                Token::LessThanEqual => BinaryOp::LtEq,
                Token::GreaterThanEqual => BinaryOp::GtEq,
                _ => return Ok(lhs),
            };
            self.advance()?;
            let rhs = self.parse_shift()?;
            lhs = Expression::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_shift(&mut self) -> Result<Expression, ParseError> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.current {
                Token::LeftShift => BinaryOp::LShift,
                Token::RightShift => BinaryOp::RShift,
                Token::UnsignedRightShift => BinaryOp::URShift,
                _ => return Ok(lhs),
            };
            self.advance()?;
            let rhs = self.parse_additive()?;
            lhs = Expression::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_additive(&mut self) -> Result<Expression, ParseError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.current {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.advance()?;
            let rhs = self.parse_multiplicative()?;
            lhs = Expression::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expression, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.current {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                Token::Percent => BinaryOp::Mod,
                _ => return Ok(lhs),
            };
            self.advance()?;
            let rhs = self.parse_unary()?;
            lhs = Expression::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_unary(&mut self) -> Result<Expression, ParseError> {
        match self.current {
            Token::Keyword(Keyword::Delete) => {
                self.advance()?;
                Ok(Expression::Delete(Box::new(self.parse_unary()?)))
            }
            Token::Keyword(Keyword::Void) => {
                self.advance()?;
                Ok(Expression::Void(Box::new(self.parse_unary()?)))
            }
            Token::Keyword(Keyword::Typeof) => {
                self.advance()?;
                Ok(Expression::Typeof(Box::new(self.parse_unary()?)))
            }
            Token::Increment => {
                self.advance()?;
                Ok(Expression::Update(
                    UpdateOp::Increment,
                    true,
                    Box::new(self.parse_unary()?),
                ))
            }
            Token::Decrement => {
                self.advance()?;
                Ok(Expression::Update(
                    UpdateOp::Decrement,
                    true,
                    Box::new(self.parse_unary()?),
                ))
            }
            Token::Plus => {
                self.advance()?;
                Ok(Expression::Unary(
                    UnaryOp::Plus,
                    Box::new(self.parse_unary()?),
                ))
            }
            Token::Minus => {
                self.advance()?;
                Ok(Expression::Unary(
                    UnaryOp::Minus,
                    Box::new(self.parse_unary()?),
                ))
            }
            Token::Tilde => {
                self.advance()?;
                Ok(Expression::Unary(
                    UnaryOp::BitNot,
                    Box::new(self.parse_unary()?),
                ))
            }
            Token::Bang => {
                self.advance()?;
                Ok(Expression::Unary(
                    UnaryOp::Not,
                    Box::new(self.parse_unary()?),
                ))
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Result<Expression, ParseError> {
        let expr = self.parse_left_hand_side_expression()?;
        match self.current {
            Token::Increment => {
                self.advance()?;
                Ok(Expression::Update(
                    UpdateOp::Increment,
                    false,
                    Box::new(expr),
                ))
            }
            Token::Decrement => {
                self.advance()?;
                Ok(Expression::Update(
                    UpdateOp::Decrement,
                    false,
                    Box::new(expr),
                ))
            }
            _ => Ok(expr),
        }
    }

    fn parse_left_hand_side_expression(&mut self) -> Result<Expression, ParseError> {
        let start = self.current_start;
        let mut expr = self.parse_member_expression()?;
        loop {
            match self.current {
                Token::LeftParen => {
                    let args = self.parse_arguments()?;
                    expr = Expression::Call(Box::new(expr), args, self.extent_from(start));
                }
                Token::Dot => {
                    self.advance()?;
                    let name = self.expect_identifier()?;
                    expr = Expression::Member(Box::new(expr), MemberProperty::Dot(name));
                }
                Token::LeftBracket => {
                    self.advance()?;
                    let key = self.parse_expression()?;
                    self.expect(&Token::RightBracket)?;
                    expr = Expression::Member(
                        Box::new(expr),
                        MemberProperty::Computed(Box::new(key)),
                    );
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_member_expression(&mut self) -> Result<Expression, ParseError> {
        let start = self.current_start;
        let mut expr = if self.accept_keyword(Keyword::New)? {
            let callee = self.parse_member_expression()?;
            let args = if self.current == Token::LeftParen {
                self.parse_arguments()?
            } else {
                Vec::new()
            };
            Expression::New(Box::new(callee), args, self.extent_from(start))
        } else {
            self.parse_primary_expression()?
        };
        loop {
            match self.current {
                Token::Dot => {
                    self.advance()?;
                    let name = self.expect_identifier()?;
                    expr = Expression::Member(Box::new(expr), MemberProperty::Dot(name));
                }
                Token::LeftBracket => {
                    self.advance()?;
                    let key = self.parse_expression()?;
                    self.expect(&Token::RightBracket)?;
                    expr = Expression::Member(
                        Box::new(expr),
                        MemberProperty::Computed(Box::new(key)),
                    );
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expression>, ParseError> {
        self.expect(&Token::LeftParen)?;
        let mut args = Vec::new();
        if self.accept(&Token::RightParen)? {
            return Ok(args);
        }
        loop {
            args.push(self.parse_assignment_expression()?);
            if !self.accept(&Token::Comma)? {
                break;
            }
        }
        self.expect(&Token::RightParen)?;
        Ok(args)
    }

    fn parse_primary_expression(&mut self) -> Result<Expression, ParseError> {
        match self.advance()? {
            Token::Identifier(name) => Ok(Expression::Identifier(name)),
            Token::NumericLiteral(n) => Ok(Expression::Literal(Literal::Number(n))),
            Token::StringLiteral(s) => Ok(Expression::Literal(Literal::String(s))),
            Token::Keyword(Keyword::Undefined) => Ok(Expression::Literal(Literal::Undefined)),
            Token::Keyword(Keyword::Null) => Ok(Expression::Literal(Literal::Null)),
            Token::Keyword(Keyword::True) => Ok(Expression::Literal(Literal::Boolean(true))),
            Token::Keyword(Keyword::False) => Ok(Expression::Literal(Literal::Boolean(false))),
            Token::LeftParen => {
                let expr = self.parse_expression()?;
                self.expect(&Token::RightParen)?;
                Ok(expr)
            }
            other => Err(ParseError {
                message: format!("unexpected {other}"),
            }),
        }
    }
}
