//! Primitive operators and their value-level semantics.

use crate::ast::{Ty, Value};
use crate::error::Error;
use crate::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum UnOpKind {
    #[display("-")]
    Neg,
    #[display("!")]
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum BinOpKind {
    #[display("+")]
    Add,
    #[display("-")]
    Sub,
    #[display("*")]
    Mul,
    #[display("/")]
    Div,
    #[display("%")]
    Rem,
    #[display("==")]
    Eq,
    #[display("!=")]
    Ne,
    #[display("<")]
    Lt,
    #[display("<=")]
    Le,
    #[display(">")]
    Gt,
    #[display(">=")]
    Ge,
    #[display("&&")]
    And,
    #[display("||")]
    Or,
}

impl UnOpKind {
    pub fn result_ty(&self, operand: &Ty) -> Ty {
        match self {
            UnOpKind::Neg => operand.clone(),
            UnOpKind::Not => Ty::Bool,
        }
    }
}

impl BinOpKind {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinOpKind::Eq | BinOpKind::Ne | BinOpKind::Lt | BinOpKind::Le | BinOpKind::Gt | BinOpKind::Ge
        )
    }
    /// `&&` and `||` skip the right operand when the left decides the result.
    pub fn is_short_circuit(&self) -> bool {
        matches!(self, BinOpKind::And | BinOpKind::Or)
    }
    pub fn result_ty(&self, lhs: &Ty, rhs: &Ty) -> Ty {
        if self.is_comparison() || self.is_short_circuit() {
            return Ty::Bool;
        }
        match (lhs, rhs) {
            (Ty::Float, _) | (_, Ty::Float) => Ty::Float,
            _ => lhs.clone(),
        }
    }
}

pub fn eval_unop(op: UnOpKind, operand: &Value) -> Result<Value> {
    match (op, operand) {
        (UnOpKind::Neg, Value::Int(v)) => v
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| Error::target("arithmetic operation resulted in an overflow")),
        (UnOpKind::Neg, Value::Float(v)) => Ok(Value::Float(-v)),
        (UnOpKind::Not, Value::Bool(v)) => Ok(Value::Bool(!v)),
        _ => Err(Error::target(format!(
            "operator {} is not defined for {}",
            op,
            operand.type_name()
        ))),
    }
}

pub fn eval_binop(op: BinOpKind, lhs: &Value, rhs: &Value) -> Result<Value> {
    match op {
        BinOpKind::Eq => return Ok(Value::Bool(lhs == rhs)),
        BinOpKind::Ne => return Ok(Value::Bool(lhs != rhs)),
        _ => {}
    }
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => eval_int(op, *a, *b),
        (Value::Float(a), Value::Float(b)) => eval_float(op, *a, *b),
        (Value::Int(a), Value::Float(b)) => eval_float(op, *a as f64, *b),
        (Value::Float(a), Value::Int(b)) => eval_float(op, *a, *b as f64),
        (Value::Bool(a), Value::Bool(b)) => match op {
            BinOpKind::And => Ok(Value::Bool(*a && *b)),
            BinOpKind::Or => Ok(Value::Bool(*a || *b)),
            _ => Err(undefined(op, lhs, rhs)),
        },
        (Value::String(a), Value::String(b)) => match op {
            BinOpKind::Add => Ok(Value::string(format!("{}{}", a, b))),
            BinOpKind::Lt => Ok(Value::Bool(a < b)),
            BinOpKind::Le => Ok(Value::Bool(a <= b)),
            BinOpKind::Gt => Ok(Value::Bool(a > b)),
            BinOpKind::Ge => Ok(Value::Bool(a >= b)),
            _ => Err(undefined(op, lhs, rhs)),
        },
        _ => Err(undefined(op, lhs, rhs)),
    }
}

fn eval_int(op: BinOpKind, a: i64, b: i64) -> Result<Value> {
    let overflow = || Error::target("arithmetic operation resulted in an overflow");
    let value = match op {
        BinOpKind::Add => Value::Int(a.checked_add(b).ok_or_else(overflow)?),
        BinOpKind::Sub => Value::Int(a.checked_sub(b).ok_or_else(overflow)?),
        BinOpKind::Mul => Value::Int(a.checked_mul(b).ok_or_else(overflow)?),
        BinOpKind::Div | BinOpKind::Rem if b == 0 => {
            return Err(Error::target("attempted to divide by zero"))
        }
        BinOpKind::Div => Value::Int(a.checked_div(b).ok_or_else(overflow)?),
        BinOpKind::Rem => Value::Int(a.checked_rem(b).ok_or_else(overflow)?),
        BinOpKind::Lt => Value::Bool(a < b),
        BinOpKind::Le => Value::Bool(a <= b),
        BinOpKind::Gt => Value::Bool(a > b),
        BinOpKind::Ge => Value::Bool(a >= b),
        _ => return Err(undefined(op, &Value::Int(a), &Value::Int(b))),
    };
    Ok(value)
}

fn eval_float(op: BinOpKind, a: f64, b: f64) -> Result<Value> {
    let value = match op {
        BinOpKind::Add => Value::Float(a + b),
        BinOpKind::Sub => Value::Float(a - b),
        BinOpKind::Mul => Value::Float(a * b),
        BinOpKind::Div => Value::Float(a / b),
        BinOpKind::Rem => Value::Float(a % b),
        BinOpKind::Lt => Value::Bool(a < b),
        BinOpKind::Le => Value::Bool(a <= b),
        BinOpKind::Gt => Value::Bool(a > b),
        BinOpKind::Ge => Value::Bool(a >= b),
        _ => return Err(undefined(op, &Value::Float(a), &Value::Float(b))),
    };
    Ok(value)
}

fn undefined(op: BinOpKind, lhs: &Value, rhs: &Value) -> Error {
    Error::target(format!(
        "operator {} is not defined for {} and {}",
        op,
        lhs.type_name(),
        rhs.type_name()
    ))
}
