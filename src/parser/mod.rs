//! Table-driven shift-reduce parser.
//!
//! The driver keeps a stack of automaton states and a parallel stack of
//! semantic values. Reductions run the production's synthesis action from
//! [`grammar`], so the syntax tree is built bottom-up as input is consumed.

pub mod grammar;
pub mod table;

use crate::ast::Program;
use crate::diagnostic::Diagnostic;
use crate::options::{Options, INITIAL_STACK_DEPTH};
use crate::tokens::{Token, TokenKind};
use anyhow::Result;
use grammar::{Value, ERROR_TERMINAL, PRODUCTIONS};
use table::{parse_table, Action, ParseTable};
use thiserror::Error;
use tracing::{debug, trace};

/// Verbose messages list at most this many expected tokens.
const MAX_EXPECTED: usize = 4;

/// Tokens that must be shifted after an error before the next one is reported.
const RECOVERY_SHIFTS: u8 = 3;

#[derive(Error, Debug, PartialEq)]
pub enum ParseError {
    #[error("Parser in bad state.")]
    BadState,
    #[error("Parser stack exhausted at depth {depth:?}.")]
    StackExhausted { depth: usize },
    #[error("Syntax tree nested {depth:?} levels deep.")]
    NestingTooDeep { depth: usize },
}

/// Result of a parse that ran to completion or gave up during recovery.
#[derive(Debug)]
pub struct ParseOutcome {
    /// `None` when recovery ran out of input
    pub program: Option<Program>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutcome {
    pub fn has_errors(&self) -> bool {
        self.program.is_none() || !self.diagnostics.is_empty()
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    last_line: usize,
    options: Options,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Parser {
        Parser::with_options(tokens, Options::default())
    }

    pub fn with_options(mut tokens: Vec<Token>, options: Options) -> Parser {
        let last_line = tokens.last().map_or(1, |token| token.line);
        tokens.reverse();
        Parser {
            tokens,
            last_line,
            options,
        }
    }

    /// Next input token; a missing trailing `Eof` is supplied.
    fn next(&mut self) -> Token {
        self.tokens
            .pop()
            .unwrap_or_else(|| Token::new(TokenKind::Eof, self.last_line))
    }

    pub fn parse(&mut self) -> Result<ParseOutcome> {
        let table = parse_table();
        let mut states: Vec<usize> = Vec::with_capacity(INITIAL_STACK_DEPTH);
        let mut values: Vec<Value> = Vec::with_capacity(INITIAL_STACK_DEPTH);
        // Tree depth of each value; tokens are 0.
        let mut depths: Vec<usize> = Vec::with_capacity(INITIAL_STACK_DEPTH);
        states.push(0);
        let mut diagnostics = Vec::new();
        let mut lookahead: Option<Token> = None;
        let mut recovering: u8 = 0;

        loop {
            if states.len() > self.options.max_stack_depth {
                anyhow::bail!(ParseError::StackExhausted {
                    depth: states.len()
                });
            }
            let state = *states.last().ok_or(ParseError::BadState)?;
            let token = match lookahead.take() {
                Some(token) => token,
                None => self.next(),
            };

            match table.action(state, token.kind.index()) {
                Action::Shift(next) => {
                    trace!(state, next, token = %token, "shift");
                    states.push(next);
                    values.push(Value::Token(token));
                    depths.push(0);
                    recovering = recovering.saturating_sub(1);
                }
                Action::Reduce(index) => {
                    let production = &PRODUCTIONS[index];
                    let len = production.rhs.len();
                    if values.len() < len {
                        anyhow::bail!(ParseError::BadState);
                    }
                    let rhs = values.split_off(values.len() - len);
                    let split = depths.len().saturating_sub(len);
                    let deepest = depths.drain(split..).max().unwrap_or(0);
                    let depth = deepest + usize::from(production.build.nests());
                    if depth > self.options.max_nesting_depth {
                        anyhow::bail!(ParseError::NestingTooDeep { depth });
                    }
                    states.truncate(states.len() - len);
                    let value = grammar::build(production.build, rhs)?;
                    let top = *states.last().ok_or(ParseError::BadState)?;
                    let next = table
                        .goto(top, production.lhs)
                        .ok_or(ParseError::BadState)?;
                    trace!(production = index, lhs = ?production.lhs, next, "reduce");
                    states.push(next);
                    values.push(value);
                    depths.push(depth);
                    lookahead = Some(token);
                }
                Action::Accept => {
                    let program = values
                        .pop()
                        .ok_or(ParseError::BadState)?
                        .into_program()?;
                    debug!(
                        declarations = program.declarations.len(),
                        errors = diagnostics.len(),
                        "parse accepted"
                    );
                    return Ok(ParseOutcome {
                        program: Some(program),
                        diagnostics,
                    });
                }
                Action::Error => {
                    if recovering == 0 {
                        let diagnostic = self.syntax_error(table, state, &token);
                        debug!("{}", diagnostic);
                        diagnostics.push(diagnostic);
                    }
                    if recovering == RECOVERY_SHIFTS {
                        // The token that broke recovery is dropped.
                        if token.kind == TokenKind::Eof {
                            return Ok(Self::aborted(diagnostics));
                        }
                        trace!(token = %token, "discard");
                    } else {
                        lookahead = Some(token);
                    }
                    recovering = RECOVERY_SHIFTS;

                    loop {
                        let top = *states.last().ok_or(ParseError::BadState)?;
                        if let Action::Shift(next) = table.action(top, ERROR_TERMINAL) {
                            trace!(state = top, next, "shift error");
                            states.push(next);
                            values.push(Value::Nothing);
                            depths.push(0);
                            break;
                        }
                        if states.len() == 1 {
                            return Ok(Self::aborted(diagnostics));
                        }
                        states.pop();
                        values.pop();
                        depths.pop();
                    }
                }
            }
        }
    }

    fn aborted(diagnostics: Vec<Diagnostic>) -> ParseOutcome {
        debug!(errors = diagnostics.len(), "parse aborted");
        ParseOutcome {
            program: None,
            diagnostics,
        }
    }

    fn syntax_error(&self, table: &ParseTable, state: usize, token: &Token) -> Diagnostic {
        let mut message = format!("syntax error, unexpected {}", token);
        if self.options.verbose_errors {
            let expected = table.expected(state);
            if !expected.is_empty() && expected.len() <= MAX_EXPECTED {
                let expected = expected
                    .iter()
                    .map(|kind| kind.to_string())
                    .collect::<Vec<String>>()
                    .join(" or ");
                message.push_str(", expecting ");
                message.push_str(&expected);
            }
        }
        Diagnostic::syntax(token.line, message)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ast::NodeKind;
    use crate::lexer::Lexer;

    fn parser_setup(input: &str, options: Options) -> Parser {
        let mut lexer = Lexer::new();
        lexer.scan_tokens(&mut input.chars().peekable()).unwrap();
        Parser::with_options(lexer.into_tokens(), options)
    }

    fn parse_ok(input: &str) -> Program {
        let outcome = parser_setup(input, Options::default()).parse().unwrap();
        assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);
        outcome.program.unwrap()
    }

    fn verbose() -> Options {
        Options {
            verbose_errors: true,
            ..Options::default()
        }
    }

    #[test]
    fn test_minimal_program() {
        let program = parse_ok("int main(void) { int x; x = 1; return x; }");
        assert_eq!(
            program.to_string(),
            "(fun int main void {(int x) (= x 1) (return x)})\n"
        );
    }

    #[test]
    fn test_operator_precedence() {
        let program = parse_ok("void main(void) { x = 1 + 2 * 3 < 4 - 5 / 6; }");
        assert_eq!(
            program.to_string(),
            "(fun void main void {(= x (< (+ 1 (* 2 3)) (- 4 (/ 5 6))))})\n"
        );
    }

    #[test]
    fn test_left_associative_arithmetic() {
        let program = parse_ok("void main(void) { x = 1 - 2 - 3; }");
        assert_eq!(
            program.to_string(),
            "(fun void main void {(= x (- (- 1 2) 3))})\n"
        );
    }

    #[test]
    fn test_multiassign_expr() {
        let program = parse_ok("void main(void) { a = b = c; }");
        assert_eq!(program.to_string(), "(fun void main void {(= a (= b c))})\n");
    }

    #[test]
    fn test_dangling_else_binds_inner_if() {
        let program = parse_ok("void main(void) { if (a) if (b) x = 1; else x = 2; }");
        assert_eq!(
            program.to_string(),
            "(fun void main void {(if a {(if b {(= x 1)} {(= x 2)})})})\n"
        );
    }

    #[test]
    fn test_arrays_params_and_calls() {
        let program = parse_ok(
            "int g[10];
            int f(int a[], int n) { return a[n - 1]; }
            void main(void) { output(f(g, 10)); }",
        );
        assert_eq!(
            program.to_string(),
            "(int g[10])\n\
             (fun int f (params (int a[]) (int n)) {(return a[(- n 1)])})\n\
             (fun void main void {(call output (call f g 10))})\n"
        );
    }

    #[test]
    fn test_nested_blocks_are_flattened() {
        let program = parse_ok(
            "void main(void) { int x; while (x < 3) { int y; y = x; x = x + 1; } { ; } }",
        );
        assert_eq!(
            program.to_string(),
            "(fun void main void {(int x) (while (< x 3) {(int y) (= y x) (= x (+ x 1))})})\n"
        );
    }

    #[test]
    fn test_node_lines() {
        let program = parse_ok("int main(void)\n{\n  int x;\n  x = 1;\n  return x;\n}");
        let main = &program.declarations[0];
        assert_eq!(main.line, 1);
        match &main.kind {
            NodeKind::FuncDecl { body, .. } => {
                let lines: Vec<usize> = body.iter().map(|node| node.line).collect();
                assert_eq!(lines, vec![3, 4, 5]);
            }
            other => panic!("expected a function, found {:?}", other),
        }
    }

    #[test]
    fn test_recovers_at_next_semicolon() {
        let mut parser = parser_setup("int x int y;\nvoid main(void) { }", verbose());
        let outcome = parser.parse().unwrap();
        assert_eq!(
            outcome.diagnostics,
            vec![Diagnostic::syntax(
                1,
                "syntax error, unexpected INT, expecting SEMI or LPAREN or LBRACKETS"
            )]
        );
        let program = outcome.program.unwrap();
        assert_eq!(program.to_string(), "(fun void main void {})\n");
    }

    #[test]
    fn test_recovers_inside_function_body() {
        let mut parser = parser_setup(
            "void main(void) {\n x = ;\n y = 2;\n}",
            Options::default(),
        );
        let outcome = parser.parse().unwrap();
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].line, Some(2));
        assert_eq!(
            outcome.program.unwrap().to_string(),
            "(fun void main void {(= y 2)})\n"
        );
    }

    #[test]
    fn test_unrecoverable_at_end_of_input() {
        let mut parser = parser_setup("int main(void) { x = ;", Options::default());
        let outcome = parser.parse().unwrap();
        assert!(outcome.program.is_none());
        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(outcome.has_errors());
    }

    #[test]
    fn test_empty_input() {
        let mut parser = parser_setup("", Options::default());
        let outcome = parser.parse().unwrap();
        assert!(outcome.program.is_none());
        assert_eq!(
            outcome.diagnostics,
            vec![Diagnostic::syntax(1, "syntax error, unexpected $end")]
        );
    }

    #[test]
    fn test_error_token_is_reported() {
        let mut parser = parser_setup("int x$;", Options::default());
        let outcome = parser.parse().unwrap();
        assert_eq!(
            outcome.diagnostics[0].message,
            "syntax error, unexpected ERROR '$'"
        );
    }

    #[test]
    fn test_verbose_lists_expected_tokens() {
        let mut parser = parser_setup("void main(void) { x = ; }", verbose());
        let outcome = parser.parse().unwrap();
        assert_eq!(
            outcome.diagnostics[0].message,
            "syntax error, unexpected SEMI, expecting ID or NUM or LPAREN"
        );
    }

    #[test]
    fn test_verbose_list_is_bounded() {
        // At the start of a body both declarations and statements are acceptable.
        let mut parser = parser_setup("void main(void) { else }", verbose());
        let outcome = parser.parse().unwrap();
        assert_eq!(
            outcome.diagnostics[0].message,
            "syntax error, unexpected ELSE"
        );
    }

    #[test]
    fn test_stack_grows_past_initial_capacity() {
        let depth = 500;
        let source = format!(
            "void main(void) {{ x = {}1{}; }}",
            "(".repeat(depth),
            ")".repeat(depth)
        );
        let program = parse_ok(&source);
        assert_eq!(program.declarations.len(), 1);
    }

    #[test]
    fn test_stack_exhausted() {
        let options = Options {
            max_stack_depth: 16,
            ..Options::default()
        };
        let source = format!("void main(void) {{ x = {}1{}; }}", "(".repeat(32), ")".repeat(32));
        let mut parser = parser_setup(&source, options);
        let result = parser.parse();
        assert!(matches!(
            result.unwrap_err().downcast::<ParseError>().unwrap(),
            ParseError::StackExhausted { .. }
        ));
    }

    #[test]
    fn test_nesting_limit() {
        let options = Options {
            max_nesting_depth: 8,
            ..Options::default()
        };
        // `a = a[a[0]];` nests Const, two Vectors, Assign and the function.
        let within = "void main(void) { a = a[a[0]]; }";
        assert!(parser_setup(within, options.clone()).parse().is_ok());

        let beyond = format!("void main(void) {{ a = {}0{}; }}", "a[".repeat(6), "]".repeat(6));
        let result = parser_setup(&beyond, options).parse();
        assert_eq!(
            result.unwrap_err().downcast::<ParseError>().unwrap(),
            ParseError::NestingTooDeep { depth: 9 }
        );
    }

    #[test]
    fn test_parentheses_add_no_nesting() {
        let options = Options {
            max_nesting_depth: 4,
            ..Options::default()
        };
        let source = format!("void main(void) {{ x = {}1{}; }}", "(".repeat(50), ")".repeat(50));
        let outcome = parser_setup(&source, options).parse().unwrap();
        assert!(outcome.program.is_some());
    }
}
