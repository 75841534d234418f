use core::fmt;

use serde::{Deserialize, Serialize};

// 計算機の式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Number(u32),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Number of nodes on the longest path from the root to a leaf.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut pending: Vec<(&Expr, usize)> = vec![(self, 1)];
        while let Some((expr, level)) = pending.pop() {
            height = height.max(level);
            match expr {
                Expr::Number(_) => {}
                Expr::Unary { operand, .. } => pending.push((operand.as_ref(), level + 1)),
                Expr::Binary { left, right, .. } => {
                    pending.push((left.as_ref(), level + 1));
                    pending.push((right.as_ref(), level + 1));
                }
            }
        }
        height
    }
}

/// Fully parenthesized infix form.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Unary { operand, .. } => write!(f, "(-{})", operand),
            Expr::Binary { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum BinaryOp {
    Add,
    Subtract,
    Mult,
    Divide,
}

impl BinaryOp {
    pub fn symbol(&self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Subtract => '-',
            BinaryOp::Mult => '*',
            BinaryOp::Divide => '/',
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum UnaryOp {
    Negate,
}

// YAMLスカラー値
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Scalar {
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Null => "null",
            Scalar::Bool(_) => "bool",
            Scalar::Integer(_) => "integer",
            Scalar::Float(_) => "float",
            Scalar::String(_) => "string",
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Integer(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::String(s) => write!(f, "{:?}", s),
        }
    }
}

crate::impl_attribute!(Expr, BinaryOp, UnaryOp, Scalar);

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_operator_names() {
        assert_eq!(BinaryOp::Mult.to_string(), "mult");
        assert_eq!(BinaryOp::from_str("subtract").unwrap(), BinaryOp::Subtract);
        assert_eq!(UnaryOp::Negate.to_string(), "negate");
    }

    #[test]
    fn test_expr_display() {
        let expr = Expr::binary(
            BinaryOp::Mult,
            Expr::binary(BinaryOp::Add, Expr::Number(3), Expr::Number(4)),
            Expr::unary(UnaryOp::Negate, Expr::Number(5)),
        );
        assert_eq!(expr.to_string(), "((3 + 4) * (-5))");
    }

    #[test]
    fn test_expr_height() {
        assert_eq!(Expr::Number(7).height(), 1);
        let expr = Expr::binary(
            BinaryOp::Add,
            Expr::Number(1),
            Expr::unary(UnaryOp::Negate, Expr::unary(UnaryOp::Negate, Expr::Number(2))),
        );
        assert_eq!(expr.height(), 4);
    }
}
