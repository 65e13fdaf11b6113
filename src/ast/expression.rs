// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Expression AST node definitions

use super::operator::BinaryOperator;
use smallvec::SmallVec;

/// Function and method arguments (SmallVec for the common case of 0-2 args)
pub type Arguments = SmallVec<[ExpressionNode; 4]>;

/// AST representation of FHIRPath expressions
///
/// Large variants are boxed to keep the enum small.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExpressionNode {
    /// Literal value (string, number, boolean)
    Literal(LiteralValue),

    /// Identifier evaluated against the current focus
    Identifier(String),

    /// Path navigation (object.property)
    Path {
        /// Base expression
        base: Box<ExpressionNode>,
        /// Property path
        path: String,
    },

    /// Binary operation (comparison, logical, union)
    BinaryOp(Box<BinaryOpData>),

    /// Function call without an explicit base (`exists()`)
    FunctionCall(Box<FunctionCallData>),

    /// Method call on an expression (`expression.method(args)`)
    MethodCall(Box<MethodCallData>),

    /// Index access (collection\[index\])
    Index {
        /// Base expression
        base: Box<ExpressionNode>,
        /// Index expression
        index: Box<ExpressionNode>,
    },

    /// Variable reference (`$this`)
    Variable(String),
}

/// Binary operation data
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BinaryOpData {
    /// The operator
    pub op: BinaryOperator,
    /// Left operand
    pub left: ExpressionNode,
    /// Right operand
    pub right: ExpressionNode,
}

/// Function call data
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionCallData {
    /// Function name
    pub name: String,
    /// Function arguments
    pub args: Arguments,
}

/// Method call data
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodCallData {
    /// Base expression to call method on
    pub base: ExpressionNode,
    /// Method name
    pub method: String,
    /// Method arguments
    pub args: Arguments,
}

/// Literal values in FHIRPath
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    /// Boolean literal
    Boolean(bool),
    /// Integer literal
    Integer(i64),
    /// Decimal literal (stored as string to preserve precision)
    Decimal(String),
    /// String literal, escapes already processed
    String(String),
}

impl ExpressionNode {
    /// Create a literal expression
    pub fn literal(value: LiteralValue) -> Self {
        Self::Literal(value)
    }

    /// Create an identifier expression
    pub fn identifier(name: impl Into<String>) -> Self {
        Self::Identifier(name.into())
    }

    /// Create a variable reference
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    /// Create a function call expression
    pub fn function_call(name: impl Into<String>, args: impl Into<Arguments>) -> Self {
        Self::FunctionCall(Box::new(FunctionCallData {
            name: name.into(),
            args: args.into(),
        }))
    }

    /// Create a method call expression
    pub fn method_call(
        base: ExpressionNode,
        method: impl Into<String>,
        args: impl Into<Arguments>,
    ) -> Self {
        Self::MethodCall(Box::new(MethodCallData {
            base,
            method: method.into(),
            args: args.into(),
        }))
    }

    /// Create a binary operation expression
    pub fn binary_op(op: BinaryOperator, left: ExpressionNode, right: ExpressionNode) -> Self {
        Self::BinaryOp(Box::new(BinaryOpData { op, left, right }))
    }

    /// Create a path navigation expression
    pub fn path(base: ExpressionNode, path: impl Into<String>) -> Self {
        Self::Path {
            base: Box::new(base),
            path: path.into(),
        }
    }

    /// Create an index access expression
    pub fn index(base: ExpressionNode, index: ExpressionNode) -> Self {
        Self::Index {
            base: Box::new(base),
            index: Box::new(index),
        }
    }

    /// Create a union expression
    pub fn union(left: ExpressionNode, right: ExpressionNode) -> Self {
        Self::binary_op(BinaryOperator::Union, left, right)
    }
}
