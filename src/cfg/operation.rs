//! Operation nodes of the analyzed unit's expression/statement graph.
//!
//! Every operation is one node with a stable identity within the unit and a
//! typed [`OperationKind`]. The kind enumeration is deliberately exhaustive:
//! the dispatcher matches on it without a wildcard arm, so adding a variant
//! forces every processor decision to be revisited at compile time.

use std::fmt;

use num_bigint::BigInt;
use strum::{EnumCount, EnumIter};

use crate::cfg::SymbolId;

/// Identifier of an [`Operation`] within one analyzed unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId(usize);

impl OperationId {
    /// Creates an operation identifier from a raw index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op{}", self.0)
    }
}

/// A compile-time constant appearing in the operation graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// The null reference.
    Null,
    /// A boolean constant.
    Bool(bool),
    /// An integer constant.
    Number(BigInt),
    /// A string constant. Strings are references and never null when
    /// written as literals.
    String(String),
}

/// Binary numeric operators handled by the arithmetic calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, EnumIter)]
pub enum BinaryOperator {
    /// Addition.
    Add,
    /// Subtraction.
    Subtract,
    /// Multiplication.
    Multiply,
    /// Integer division, truncating toward zero.
    Divide,
    /// Remainder; the sign follows the dividend.
    Remainder,
    /// Bitwise conjunction on two's-complement integers.
    BitAnd,
    /// Bitwise disjunction on two's-complement integers.
    BitOr,
    /// Bitwise exclusive or on two's-complement integers.
    BitXor,
}

/// Comparison operators producing a boolean decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, EnumIter)]
pub enum ComparisonOperator {
    /// `left == right`
    Equals,
    /// `left != right`
    NotEquals,
    /// `left < right`
    LessThan,
    /// `left <= right`
    LessThanOrEqual,
    /// `left > right`
    GreaterThan,
    /// `left >= right`
    GreaterThanOrEqual,
}

impl ComparisonOperator {
    /// The operator holding on the false branch of this comparison.
    #[must_use]
    pub const fn negated(self) -> Self {
        match self {
            Self::Equals => Self::NotEquals,
            Self::NotEquals => Self::Equals,
            Self::LessThan => Self::GreaterThanOrEqual,
            Self::LessThanOrEqual => Self::GreaterThan,
            Self::GreaterThan => Self::LessThanOrEqual,
            Self::GreaterThanOrEqual => Self::LessThan,
        }
    }

    /// The operator with swapped operands (`a < b` becomes `b > a`).
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Equals => Self::Equals,
            Self::NotEquals => Self::NotEquals,
            Self::LessThan => Self::GreaterThan,
            Self::LessThanOrEqual => Self::GreaterThanOrEqual,
            Self::GreaterThan => Self::LessThan,
            Self::GreaterThanOrEqual => Self::LessThanOrEqual,
        }
    }

    /// Returns `true` for the equality pair, `false` for the relational
    /// operators.
    #[must_use]
    pub const fn is_equality(self) -> bool {
        matches!(self, Self::Equals | Self::NotEquals)
    }
}

/// How a conversion operation treats its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionKind {
    /// A widening or otherwise always-succeeding conversion; constraints
    /// flow through unchanged.
    Implicit,
    /// A checked conversion that throws on failure; on the surviving path
    /// constraints flow through unchanged.
    Explicit,
    /// A `as`-style downcast that yields null on failure. The outcome is
    /// inherently uncertain and handled by the multi-state processor.
    TryDowncast,
}

/// The shape a pattern test matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// Matches exactly the null reference.
    Null,
    /// Matches any non-null value (`is not null`, `is {}`).
    NotNull,
    /// Matches non-null values of a given type.
    Type {
        /// `true` when the operand's static type guarantees the pattern
        /// matches every non-null value, so the only way the test can fail
        /// is a null operand.
        operand_compatible: bool,
    },
    /// Matches anything; tests against it learn nothing.
    Discard,
}

/// The typed payload of one operation node.
///
/// Operand references are [`OperationId`]s into the same unit; storage
/// references are [`SymbolId`]s. The front-end guarantees that operand
/// operations are evaluated before their consumers within a block.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationKind {
    /// A compile-time constant.
    Literal(Literal),
    /// Reads the current value of a symbol.
    SymbolRead(SymbolId),
    /// Stores the value of an operation into a symbol.
    Assignment {
        /// The symbol being written.
        target: SymbolId,
        /// The operation producing the stored value.
        value: OperationId,
    },
    /// Converts the operand value.
    Conversion {
        /// How the conversion treats failure.
        kind: ConversionKind,
        /// The operation producing the converted value.
        operand: OperationId,
    },
    /// Increments a numeric symbol by one.
    Increment {
        /// The symbol being incremented.
        target: SymbolId,
    },
    /// Decrements a numeric symbol by one.
    Decrement {
        /// The symbol being decremented.
        target: SymbolId,
    },
    /// A binary numeric operation.
    Binary {
        /// The operator.
        operator: BinaryOperator,
        /// Left operand.
        left: OperationId,
        /// Right operand.
        right: OperationId,
    },
    /// A comparison producing a boolean decision.
    Comparison {
        /// The operator.
        operator: ComparisonOperator,
        /// Left operand.
        left: OperationId,
        /// Right operand.
        right: OperationId,
    },
    /// Logical negation of a boolean operand.
    LogicalNot {
        /// The negated operand.
        operand: OperationId,
    },
    /// A type/shape pattern test producing a boolean decision.
    PatternTest {
        /// The tested operand.
        operand: OperationId,
        /// The pattern matched against.
        pattern: PatternKind,
    },
    /// Reads a named property of a symbol (e.g. a collection's size
    /// accessor).
    PropertyRead {
        /// The symbol whose property is read.
        instance: SymbolId,
        /// The property name, matched against the classifier tables.
        property: String,
    },
    /// Invokes a named method.
    Invocation {
        /// The receiver symbol, when resolvable.
        instance: Option<SymbolId>,
        /// The method name, matched against the classifier tables.
        method: String,
        /// Argument operations.
        arguments: Vec<OperationId>,
    },
    /// Allocates a new object; the result is never null.
    ObjectCreation {
        /// Constructor argument operations.
        arguments: Vec<OperationId>,
    },
}

/// One node of the operation graph: stable identity plus typed kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    id: OperationId,
    kind: OperationKind,
}

impl Operation {
    /// Creates an operation node.
    #[must_use]
    pub const fn new(id: OperationId, kind: OperationKind) -> Self {
        Self { id, kind }
    }

    /// The stable identity of this node.
    #[must_use]
    pub const fn id(&self) -> OperationId {
        self.id
    }

    /// The typed payload.
    #[must_use]
    pub const fn kind(&self) -> &OperationKind {
        &self.kind
    }
}
