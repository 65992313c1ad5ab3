//! Two's-complement views over the unsigned word.

use core::cmp::Ordering;
use primitives::U256;

const MIN_NEGATIVE_VALUE: U256 = U256::from_limbs([0, 0, 0, 0x8000000000000000]);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Sign {
    Plus,
    Zero,
    Minus,
}

#[inline]
fn i256_sign(value: &U256) -> Sign {
    if value.bit(255) {
        Sign::Minus
    } else if value.is_zero() {
        Sign::Zero
    } else {
        Sign::Plus
    }
}

#[inline]
fn two_compl(value: U256) -> U256 {
    value.wrapping_neg()
}

/// Signed comparison of two words.
#[inline]
pub fn i256_cmp(first: &U256, second: &U256) -> Ordering {
    let first_sign = i256_sign(first);
    let second_sign = i256_sign(second);
    match (first_sign, second_sign) {
        (Sign::Minus, Sign::Zero | Sign::Plus) => Ordering::Less,
        (Sign::Zero | Sign::Plus, Sign::Minus) => Ordering::Greater,
        // Same sign: two's-complement order matches unsigned order.
        _ => first.cmp(second),
    }
}

/// Signed division with truncation toward zero. Division by zero yields
/// zero; `MIN / -1` wraps back to `MIN`.
#[inline]
pub fn i256_div(mut first: U256, mut second: U256) -> U256 {
    let second_sign = i256_sign(&second);
    if second_sign == Sign::Zero {
        return U256::ZERO;
    }
    if second_sign == Sign::Minus {
        second = two_compl(second);
    }

    let first_sign = i256_sign(&first);
    if first_sign == Sign::Minus {
        first = two_compl(first);
    }
    if first_sign == Sign::Minus && first == MIN_NEGATIVE_VALUE && second == U256::from(1) {
        return MIN_NEGATIVE_VALUE;
    }

    let d = first / second;
    if d.is_zero() {
        return U256::ZERO;
    }

    // Result is negative when operand signs differ.
    if (first_sign == Sign::Minus) != (second_sign == Sign::Minus) {
        two_compl(d)
    } else {
        d
    }
}

/// Signed remainder; the result carries the sign of the dividend.
#[inline]
pub fn i256_mod(mut first: U256, mut second: U256) -> U256 {
    let first_sign = i256_sign(&first);
    if first_sign == Sign::Zero {
        return U256::ZERO;
    }
    if first_sign == Sign::Minus {
        first = two_compl(first);
    }

    if i256_sign(&second) == Sign::Minus {
        second = two_compl(second);
    }
    if second.is_zero() {
        return U256::ZERO;
    }

    let r = first % second;
    if r.is_zero() {
        return U256::ZERO;
    }
    if first_sign == Sign::Minus {
        two_compl(r)
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neg(value: u64) -> U256 {
        two_compl(U256::from(value))
    }

    #[test]
    fn div_truncates_toward_zero() {
        assert_eq!(i256_div(U256::from(100), U256::from(2)), U256::from(50));
        assert_eq!(i256_div(U256::from(7), neg(2)), neg(3));
        assert_eq!(i256_div(neg(7), U256::from(2)), neg(3));
        assert_eq!(i256_div(neg(7), neg(2)), U256::from(3));
        assert_eq!(i256_div(U256::from(100), U256::ZERO), U256::ZERO);
    }

    #[test]
    fn div_min_by_minus_one_wraps() {
        assert_eq!(i256_div(MIN_NEGATIVE_VALUE, neg(1)), MIN_NEGATIVE_VALUE);
        assert_eq!(i256_div(MIN_NEGATIVE_VALUE, U256::from(1)), MIN_NEGATIVE_VALUE);
    }

    #[test]
    fn rem_has_the_sign_of_the_dividend() {
        assert_eq!(i256_mod(U256::from(7), U256::from(3)), U256::from(1));
        assert_eq!(i256_mod(neg(7), U256::from(3)), neg(1));
        assert_eq!(i256_mod(U256::from(7), neg(3)), U256::from(1));
        assert_eq!(i256_mod(neg(7), neg(3)), neg(1));
        assert_eq!(i256_mod(U256::from(7), U256::ZERO), U256::ZERO);
    }

    #[test]
    fn cmp_is_signed() {
        assert_eq!(i256_cmp(&neg(1), &U256::from(1)), Ordering::Less);
        assert_eq!(i256_cmp(&U256::from(1), &neg(1)), Ordering::Greater);
        assert_eq!(i256_cmp(&neg(2), &neg(1)), Ordering::Less);
        assert_eq!(i256_cmp(&U256::ZERO, &U256::ZERO), Ordering::Equal);
    }
}
