//! Interval and bitwise transfer functions for binary numeric operators.
//!
//! Given the [`NumberConstraint`] intervals of two operands and a
//! [`BinaryOperator`], [`calculate`] produces the narrowest sound interval
//! for the result, or `None` when nothing useful can be said. An absent
//! input bound means unbounded on that side and propagates to the output
//! side it influences.
//!
//! Division and remainder follow truncated (toward-zero) integer semantics.
//! The bitwise operators treat operands as arbitrary-width two's-complement
//! integers; their bounds lean on a shared magnitude-rounding helper that
//! finds the smallest `2^n - 1` (or its negated twin `-2^n`) dominating a
//! value, instead of giving up and reporting unbounded results.
//!
//! Inside loop bodies per-iteration tightening is unsound because the
//! iteration count is unknown; [`calculate_in_loop`] therefore evaluates
//! only additions of two operands with a provable, matching sign, and
//! produces a one-sided open interval.

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

use crate::{cfg::BinaryOperator, constraint::NumberConstraint};

/// Computes the result interval of `left <operator> right`.
///
/// Returns `None` when the operands admit every integer result - "no
/// constraint", not an error. In particular a divisor interval that is
/// exactly `{0}` produces no constraint: the operation is practically
/// unreachable and the defect, if any, is a different check's business.
#[must_use]
pub fn calculate(
    operator: BinaryOperator,
    left: &NumberConstraint,
    right: &NumberConstraint,
) -> Option<NumberConstraint> {
    match operator {
        BinaryOperator::Add => NumberConstraint::new(
            add_bounds(left.min(), right.min()),
            add_bounds(left.max(), right.max()),
        ),
        BinaryOperator::Subtract => NumberConstraint::new(
            sub_bounds(left.min(), right.max()),
            sub_bounds(left.max(), right.min()),
        ),
        BinaryOperator::Multiply => multiply(left, right),
        BinaryOperator::Divide => divide(left, right),
        BinaryOperator::Remainder => remainder(left, right),
        BinaryOperator::BitAnd => bit_and(left, right),
        BinaryOperator::BitOr => bit_or(left, right),
        BinaryOperator::BitXor => bit_xor(left, right),
    }
}

/// Loop-body variant of [`calculate`].
///
/// Only `Add` on operands with a provable, matching sign is evaluated, and
/// the tightening side stays open: `[l.min + r.min, +inf)` for two
/// non-negative operands, `(-inf, l.max + r.max]` for two non-positive
/// ones. Every other operator or sign combination yields no constraint.
#[must_use]
pub fn calculate_in_loop(
    operator: BinaryOperator,
    left: &NumberConstraint,
    right: &NumberConstraint,
) -> Option<NumberConstraint> {
    if operator != BinaryOperator::Add {
        return None;
    }
    if left.is_non_negative() && right.is_non_negative() {
        return NumberConstraint::new(add_bounds(left.min(), right.min()), None);
    }
    if left.is_non_positive() && right.is_non_positive() {
        return NumberConstraint::new(None, add_bounds(left.max(), right.max()));
    }
    None
}

/// Smallest `2^n - 1` that dominates `value`.
///
/// `value` must be non-negative; the result is `0, 1, 3, 7, 15, ...`.
fn smallest_bit_mask_above(value: &BigInt) -> BigInt {
    debug_assert!(!value.is_negative());
    let mut mask = BigInt::zero();
    while &mask < value {
        mask = (mask << 1u8) | BigInt::one();
    }
    mask
}

/// The negated twin of the magnitude mask: the largest `-2^n` admitting
/// every negative value of magnitude at most `magnitude`.
fn negated_power_bound(magnitude: &BigInt) -> BigInt {
    -(smallest_bit_mask_above(&(magnitude - BigInt::one())) + BigInt::one())
}

fn add_bounds(a: Option<&BigInt>, b: Option<&BigInt>) -> Option<BigInt> {
    Some(a? + b?)
}

fn sub_bounds(a: Option<&BigInt>, b: Option<&BigInt>) -> Option<BigInt> {
    Some(a? - b?)
}

/// The larger of two lower bounds where an absent bound means `-inf`.
fn larger_min(a: Option<&BigInt>, b: Option<&BigInt>) -> Option<BigInt> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b).clone()),
        (Some(a), None) => Some(a.clone()),
        (None, Some(b)) => Some(b.clone()),
        (None, None) => None,
    }
}

/// The smaller of two upper bounds where an absent bound means `+inf`.
fn smaller_max(a: Option<&BigInt>, b: Option<&BigInt>) -> Option<BigInt> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b).clone()),
        (Some(a), None) => Some(a.clone()),
        (None, Some(b)) => Some(b.clone()),
        (None, None) => None,
    }
}

/// Sign-aware interval multiplication.
///
/// The candidate bounds are the four corner products of finite endpoint
/// pairs. A bound escalates to unbounded only when an unbounded input side
/// meets an operand whose opposite-sign range can push the corresponding
/// corner to infinity - not whenever any input side is unbounded.
fn multiply(left: &NumberConstraint, right: &NumberConstraint) -> Option<NumberConstraint> {
    if left.is_zero_only() || right.is_zero_only() {
        return Some(NumberConstraint::exact(0));
    }

    let min_unbounded = (left.min().is_none() && right.can_be_positive())
        || (right.min().is_none() && left.can_be_positive())
        || (left.max().is_none() && right.can_be_negative())
        || (right.max().is_none() && left.can_be_negative());
    let max_unbounded = (left.max().is_none() && right.can_be_positive())
        || (right.max().is_none() && left.can_be_positive())
        || (left.min().is_none() && right.can_be_negative())
        || (right.min().is_none() && left.can_be_negative());

    let mut products = Vec::with_capacity(4);
    for a in [left.min(), left.max()].into_iter().flatten() {
        for b in [right.min(), right.max()].into_iter().flatten() {
            products.push(a * b);
        }
    }

    let min = if min_unbounded {
        None
    } else {
        products.iter().min().cloned()
    };
    let max = if max_unbounded {
        None
    } else {
        products.iter().max().cloned()
    };
    NumberConstraint::new(min, max)
}

/// Moves a zero endpoint of the divisor inward by one.
///
/// A divisor of exactly zero is handled before this; a range merely
/// touching zero loses the zero on the side closer to it, which keeps the
/// interval contiguous. A range properly straddling zero is returned
/// unchanged for the caller's fallback handling.
fn exclude_zero_endpoint(divisor: &NumberConstraint) -> Option<NumberConstraint> {
    if divisor.min().is_some_and(Zero::is_zero) {
        NumberConstraint::new(Some(BigInt::one()), divisor.max().cloned())
    } else if divisor.max().is_some_and(Zero::is_zero) {
        NumberConstraint::new(divisor.min().cloned(), Some(-BigInt::one()))
    } else {
        Some(divisor.clone())
    }
}

/// Quotient of a finite bound by an upper divisor bound; an unbounded
/// divisor drives the quotient toward zero.
fn quotient_toward_zero(bound: &BigInt, divisor_max: Option<&BigInt>) -> BigInt {
    divisor_max.map_or_else(BigInt::zero, |d| bound / d)
}

/// Closed-form quotient bounds for a strictly positive divisor.
fn divide_by_positive(
    dividend_min: Option<&BigInt>,
    dividend_max: Option<&BigInt>,
    divisor_min: &BigInt,
    divisor_max: Option<&BigInt>,
) -> Option<NumberConstraint> {
    let min = dividend_min.map(|lo| {
        if lo.is_negative() {
            lo / divisor_min
        } else {
            quotient_toward_zero(lo, divisor_max)
        }
    });
    let max = dividend_max.map(|hi| {
        if hi.is_negative() {
            quotient_toward_zero(hi, divisor_max)
        } else {
            hi / divisor_min
        }
    });
    NumberConstraint::new(min, max)
}

/// Mirrors an interval through zero.
fn negated(interval: &NumberConstraint) -> Option<NumberConstraint> {
    NumberConstraint::new(
        interval.max().map(|hi| -hi),
        interval.min().map(|lo| -lo),
    )
}

/// Truncated interval division with sign-quadrant closed forms.
fn divide(dividend: &NumberConstraint, divisor: &NumberConstraint) -> Option<NumberConstraint> {
    if divisor.is_zero_only() {
        return None;
    }
    let divisor = exclude_zero_endpoint(divisor)?;

    if divisor.is_positive() {
        let divisor_min = divisor.min()?;
        divide_by_positive(dividend.min(), dividend.max(), divisor_min, divisor.max())
    } else if divisor.is_negative() {
        // n / d == -(n / -d) for truncated division.
        let mirrored_min = -divisor.max()?;
        let mirrored_max = divisor.min().map(|lo| -lo);
        let quotient = divide_by_positive(
            dividend.min(),
            dividend.max(),
            &mirrored_min,
            mirrored_max.as_ref(),
        )?;
        negated(&quotient)
    } else {
        // A fully unresolved straddling divisor: with a bounded dividend the
        // magnitude of a truncated quotient never exceeds the dividend's.
        match (dividend.min(), dividend.max()) {
            (Some(lo), Some(hi)) => {
                let magnitude = lo.abs().max(hi.abs());
                NumberConstraint::new(Some(-magnitude.clone()), Some(magnitude))
            }
            _ => None,
        }
    }
}

/// Remainder bounds; the result's sign follows the dividend.
fn remainder(dividend: &NumberConstraint, divisor: &NumberConstraint) -> Option<NumberConstraint> {
    if divisor.is_zero_only() {
        return None;
    }
    let (Some(divisor_min), Some(divisor_max)) = (divisor.min(), divisor.max()) else {
        // An arbitrarily large divisor cannot reduce the dividend's
        // magnitude; the result keeps the dividend's own interval.
        return NumberConstraint::new(dividend.min().cloned(), dividend.max().cloned());
    };

    let magnitude = divisor_min.abs().max(divisor_max.abs()) - BigInt::one();
    let min = if dividend.can_be_negative() {
        dividend
            .min()
            .map_or_else(|| -magnitude.clone(), |lo| (-magnitude.clone()).max(lo.clone()))
    } else {
        BigInt::zero()
    };
    let max = if dividend.can_be_positive() {
        dividend
            .max()
            .map_or_else(|| magnitude.clone(), |hi| magnitude.clone().min(hi.clone()))
    } else {
        BigInt::zero()
    };
    NumberConstraint::new(Some(min), Some(max))
}

/// Bitwise conjunction bounds.
///
/// Conjunction only clears bits: the result is non-negative unless both
/// operands can be negative, and an operand that is definitely
/// non-negative caps the maximum at its own maximum.
fn bit_and(left: &NumberConstraint, right: &NumberConstraint) -> Option<NumberConstraint> {
    let min = if left.can_be_negative() && right.can_be_negative() {
        match (left.min(), right.min()) {
            (Some(a), Some(b)) => Some(negated_power_bound(&a.abs().max(b.abs()))),
            _ => None,
        }
    } else {
        Some(BigInt::zero())
    };

    let max = if left.is_non_negative() && right.is_non_negative() {
        smaller_max(left.max(), right.max())
    } else if left.is_non_negative() {
        left.max().cloned()
    } else if right.is_non_negative() {
        right.max().cloned()
    } else if left.is_negative() && right.is_negative() {
        smaller_max(left.max(), right.max())
    } else {
        match (left.max(), right.max()) {
            (Some(a), Some(b)) => Some(a.max(b).clone()),
            _ => None,
        }
    };

    NumberConstraint::new(min, max)
}

/// Bitwise disjunction bounds - the dual of [`bit_and`].
///
/// Disjunction only sets bits: same-sign operands raise the minimum to the
/// larger of the two minima, a definitely negative operand forces a
/// negative result, and otherwise the maximum falls back to the magnitude
/// mask of the larger operand maximum.
fn bit_or(left: &NumberConstraint, right: &NumberConstraint) -> Option<NumberConstraint> {
    let min = if left.is_non_negative() && right.is_non_negative() {
        larger_min(left.min(), right.min())
    } else if left.is_negative() && right.is_negative() {
        larger_min(left.min(), right.min())
    } else if left.is_negative() {
        left.min().cloned()
    } else if right.is_negative() {
        right.min().cloned()
    } else if left.is_non_negative() {
        right.min().cloned()
    } else if right.is_non_negative() {
        left.min().cloned()
    } else {
        match (left.min(), right.min()) {
            (Some(a), Some(b)) => Some(a.min(b).clone()),
            _ => None,
        }
    };

    let max = if left.is_negative() || right.is_negative() {
        // A definitely negative operand keeps the sign bit set.
        Some(-BigInt::one())
    } else {
        match (left.max(), right.max()) {
            (Some(a), Some(b)) => Some(smallest_bit_mask_above(a.max(b))),
            _ => None,
        }
    };

    NumberConstraint::new(min, max)
}

/// Largest magnitude an operand can reach, when both bounds are finite.
fn magnitude_bound(interval: &NumberConstraint) -> Option<BigInt> {
    match (interval.min(), interval.max()) {
        (Some(lo), Some(hi)) => Some(lo.abs().max(hi.abs())),
        _ => None,
    }
}

/// Bitwise exclusive-or bounds.
///
/// Same-sign operands produce a non-negative result whose minimum is the
/// gap between disjoint ranges (`a - b <= a ^ b`; overlapping ranges can
/// cancel to zero) and whose maximum is magnitude-mask bounded. Mixed-sign
/// operands bound the leading-bit run through the magnitude masks of both
/// operands.
fn bit_xor(left: &NumberConstraint, right: &NumberConstraint) -> Option<NumberConstraint> {
    if left.is_non_negative() && right.is_non_negative() {
        let min = range_gap(left, right);
        let max = match (left.max(), right.max()) {
            (Some(a), Some(b)) => Some(smallest_bit_mask_above(a.max(b))),
            _ => None,
        };
        NumberConstraint::new(Some(min), max)
    } else if left.is_negative() && right.is_negative() {
        // Equal sign bits cancel; the magnitude of the most negative bound
        // limits the surviving low bits.
        let min = range_gap(left, right);
        let max = match (left.min(), right.min()) {
            (Some(a), Some(b)) => {
                Some(smallest_bit_mask_above(&(a.abs().max(b.abs()) - BigInt::one())))
            }
            _ => None,
        };
        NumberConstraint::new(Some(min), max)
    } else {
        let opposite = (left.is_non_negative() && right.is_negative())
            || (left.is_negative() && right.is_non_negative());
        match (magnitude_bound(left), magnitude_bound(right)) {
            (Some(a), Some(b)) => {
                let mask = smallest_bit_mask_above(&a.max(b));
                let max = if opposite { -BigInt::one() } else { mask.clone() };
                NumberConstraint::new(Some(-(mask + BigInt::one())), Some(max))
            }
            _ => NumberConstraint::new(None, opposite.then(|| -BigInt::one())),
        }
    }
}

/// The guaranteed distance between two same-sign ranges, or zero when they
/// can overlap (overlapping values can exclusive-or to zero).
fn range_gap(left: &NumberConstraint, right: &NumberConstraint) -> BigInt {
    let mut gap = BigInt::zero();
    if let (Some(lo), Some(hi)) = (left.min(), right.max()) {
        gap = gap.max(lo - hi);
    }
    if let (Some(lo), Some(hi)) = (right.min(), left.max()) {
        gap = gap.max(lo - hi);
    }
    gap
}
