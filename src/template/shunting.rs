use crate::error::CompileError;

use super::lexer::Token;
use super::ops::{Fixity, OpKind};

/// One entry of the postfix sequence handed to the expression builder.
#[derive(Debug, Clone, PartialEq)]
pub enum Postfix {
    Word(String),
    At,
    /// A bare `.` (or `$.`) with nothing to access: the root itself
    Root,
    Op(OpKind),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stacked {
    Op(OpKind),
    LParen,
}

fn syntax(token: usize, message: impl Into<String>) -> CompileError {
    CompileError::Syntax {
        token,
        message: message.into(),
    }
}

/// Whether `token` can begin an operand, so a preceding root shorthand
/// applies to it instead of standing for the root alone.
fn starts_operand(token: &Token) -> bool {
    match token {
        Token::Word(_) | Token::At | Token::LParen => true,
        Token::Op(kind) => *kind == OpKind::Field || kind.info().fixity == Fixity::Prefix,
        Token::RParen | Token::Comma => false,
    }
}

/// Convert infix tokens to postfix order.
///
/// `expect_operand` tracks whether the previous token leaves the expression
/// waiting for an operand. In that state a `.` is the root shorthand and `!`
/// is a prefix operator; prefix operators are pushed without popping anything.
pub fn to_postfix(tokens: &[Token]) -> Result<Vec<Postfix>, CompileError> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Stacked> = Vec::new();
    let mut expect_operand = true;

    for (index, token) in tokens.iter().enumerate() {
        match token {
            Token::Word(word) => {
                output.push(Postfix::Word(word.clone()));
                expect_operand = false;
            }
            Token::At => {
                output.push(Postfix::At);
                expect_operand = false;
            }
            Token::LParen => {
                stack.push(Stacked::LParen);
                expect_operand = true;
            }
            Token::RParen => {
                flush_group(&mut stack, &mut output)
                    .ok_or_else(|| syntax(index, "unbalanced ')'"))?;
                stack.pop();
                expect_operand = false;
            }
            Token::Comma => {
                flush_group(&mut stack, &mut output)
                    .ok_or_else(|| syntax(index, "',' outside of parentheses"))?;
                expect_operand = true;
            }
            Token::Op(kind) => {
                let kind = if expect_operand && *kind == OpKind::Field {
                    OpKind::RootField
                } else {
                    *kind
                };
                let info = kind.info();

                if expect_operand {
                    match info.fixity {
                        Fixity::Prefix | Fixity::Either => {}
                        Fixity::Infix | Fixity::Postfix => {
                            return Err(syntax(
                                index,
                                format!("'{}' is missing its left operand", info.spelling),
                            ));
                        }
                    }
                    let takes_operand = tokens.get(index + 1).is_some_and(starts_operand);
                    if kind == OpKind::RootField && !takes_operand {
                        output.push(Postfix::Root);
                        expect_operand = false;
                    } else {
                        stack.push(Stacked::Op(kind));
                    }
                    continue;
                }

                if info.fixity == Fixity::Prefix {
                    return Err(syntax(
                        index,
                        format!("unexpected '{}' after an operand", info.spelling),
                    ));
                }
                while let Some(Stacked::Op(top)) = stack.last() {
                    if top.info().precedence > info.precedence {
                        break;
                    }
                    output.push(Postfix::Op(*top));
                    stack.pop();
                }
                stack.push(Stacked::Op(kind));
                expect_operand = info.expects_operand;
            }
        }
    }

    while let Some(item) = stack.pop() {
        match item {
            Stacked::Op(kind) => output.push(Postfix::Op(kind)),
            Stacked::LParen => return Err(syntax(tokens.len(), "unbalanced '('")),
        }
    }
    Ok(output)
}

/// Move operators to the output down to the innermost `(`, which is left on the
/// stack. Returns `None` when there is no open group.
fn flush_group(stack: &mut Vec<Stacked>, output: &mut Vec<Postfix>) -> Option<()> {
    loop {
        match stack.last()? {
            Stacked::LParen => return Some(()),
            Stacked::Op(kind) => {
                output.push(Postfix::Op(*kind));
                stack.pop();
            }
        }
    }
}
