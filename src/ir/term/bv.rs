//! Fixed-width bit-vector values
//!
//! Every operation works on the unsigned value and then keeps the low `width` bits, so results
//! wrap the way SMT-LIB bit-vectors do.

use rug::Integer;

use std::fmt::{self, Display, Formatter};
use std::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Neg, Not, Rem, Sub};

/// A bit-vector value: an unsigned integer below `2^width`.
#[derive(Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct BitVector {
    bits: Integer,
    width: usize,
}

impl BitVector {
    /// A bit-vector of `width` bits holding `uint`, which must already fit.
    pub fn new(uint: Integer, width: usize) -> Self {
        debug_assert!(
            uint >= 0 && uint.significant_bits() as usize <= width,
            "{} does not fit in {} bits",
            uint,
            width
        );
        Self { bits: uint, width }
    }

    /// The low `width` bits of `i`, read as two's complement when `i` is negative.
    pub fn wrapping(i: Integer, width: usize) -> Self {
        Self {
            bits: i.keep_bits(width as u32),
            width,
        }
    }

    /// All bits set.
    pub fn ones(width: usize) -> Self {
        Self::wrapping(Integer::from(-1), width)
    }

    /// No bits set.
    pub fn zeros(width: usize) -> Self {
        Self::new(Integer::new(), width)
    }

    /// The unsigned value.
    pub fn uint(&self) -> &Integer {
        &self.bits
    }

    /// The value as a two's complement signed integer.
    pub fn as_sint(&self) -> Integer {
        if self.width > 0 && self.bits.get_bit(self.width as u32 - 1) {
            &self.bits - (Integer::from(1) << self.width as u32)
        } else {
            self.bits.clone()
        }
    }

    /// The number of bits.
    pub fn width(&self) -> usize {
        self.width
    }

    fn zip_with(self, rhs: &Self, f: impl FnOnce(Integer, &Integer) -> Integer) -> Self {
        assert_eq!(self.width, rhs.width, "bit-vector width mismatch");
        Self::wrapping(f(self.bits, &rhs.bits), self.width)
    }
}

macro_rules! wrapping_op {
    ($($Trait:ident::$method:ident => $f:expr;)*) => {$(
        impl $Trait for BitVector {
            type Output = BitVector;
            fn $method(self, rhs: BitVector) -> BitVector {
                self.zip_with(&rhs, $f)
            }
        }
    )*};
}

wrapping_op! {
    Add::add => |a, b| a + b;
    Sub::sub => |a, b| a - b;
    Mul::mul => |a, b| a * b;
    BitAnd::bitand => |a, b| a & b;
    BitOr::bitor => |a, b| a | b;
    BitXor::bitxor => |a, b| a ^ b;
}

/// `bvudiv`: dividing by zero gives all ones.
impl Div<&BitVector> for BitVector {
    type Output = BitVector;
    fn div(self, rhs: &BitVector) -> BitVector {
        if rhs.bits == 0 {
            BitVector::ones(self.width)
        } else {
            self.zip_with(rhs, |a, b| a / b)
        }
    }
}

/// `bvurem`: the remainder by zero is the dividend.
impl Rem<&BitVector> for BitVector {
    type Output = BitVector;
    fn rem(self, rhs: &BitVector) -> BitVector {
        if rhs.bits == 0 {
            self
        } else {
            self.zip_with(rhs, |a, b| a % b)
        }
    }
}

impl Neg for BitVector {
    type Output = BitVector;
    fn neg(self) -> BitVector {
        BitVector::wrapping(-self.bits, self.width)
    }
}

impl Not for BitVector {
    type Output = BitVector;
    fn not(self) -> BitVector {
        BitVector::wrapping(!self.bits, self.width)
    }
}

impl Display for BitVector {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "#b{:0>1$}", self.bits.to_string_radix(2), self.width)
    }
}
