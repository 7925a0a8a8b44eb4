use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Sub, SubAssign};

use super::Bitmap;

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.minimum(), self.maximum()) {
            (Some(min), Some(max)) if self.cardinality() >= 32 => write!(
                f,
                "Bitmap<{:?} values between {:?} and {:?}>",
                self.cardinality(),
                min,
                max
            ),
            _ => write!(f, "Bitmap<{:?}>", self.to_vec()),
        }
    }
}

impl PartialEq for Bitmap {
    /// Bitmaps are equal when they hold the same values, whatever their container kinds
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let mut bitmap1: Bitmap = (0..1000).collect();
    /// let bitmap2 = bitmap1.clone();
    /// bitmap1.run_optimize();
    ///
    /// assert!(bitmap1.has_run_compression());
    /// assert!(!bitmap2.has_run_compression());
    /// assert_eq!(bitmap1, bitmap2);
    /// ```
    #[inline]
    fn eq(&self, other: &Bitmap) -> bool {
        self.containers.len() == other.containers.len()
            && self
                .containers
                .iter()
                .zip(&other.containers)
                .all(|((k1, c1), (k2, c2))| k1 == k2 && c1 == c2)
    }
}

impl Eq for Bitmap {}

macro_rules! binary_op {
    ($trait:ident, $fn:ident, $method:ident, $op:tt, $in_set:literal) => {
        impl $trait for Bitmap {
            type Output = Bitmap;

            #[doc = concat!("Syntactic sugar for `.", stringify!($method), "`")]
            ///
            /// # Examples
            ///
            /// ```
            /// use roaring_core::Bitmap;
            ///
            /// let bitmap1 = Bitmap::of(&[1, 2]);
            /// let bitmap2 = Bitmap::of(&[2, 3]);
            ///
            #[doc = concat!("let bitmap3 = bitmap1 ", stringify!($op), " bitmap2;")]
            ///
            #[doc = concat!("assert_eq!(bitmap3.to_vec(), ", $in_set, ");")]
            /// ```
            #[inline]
            fn $fn(self, other: Bitmap) -> Bitmap {
                self.$method(&other)
            }
        }

        impl<'a> $trait<&'a Bitmap> for Bitmap {
            type Output = Bitmap;

            #[doc = concat!("Syntactic sugar for `.", stringify!($method), "`")]
            #[inline]
            fn $fn(self, other: &'a Bitmap) -> Bitmap {
                self.$method(other)
            }
        }

        impl<'a, 'b> $trait<&'a Bitmap> for &'b Bitmap {
            type Output = Bitmap;

            #[doc = concat!("Syntactic sugar for `.", stringify!($method), "`")]
            ///
            /// # Examples
            ///
            /// ```
            /// use roaring_core::Bitmap;
            ///
            /// let bitmap1 = Bitmap::of(&[1, 2]);
            /// let bitmap2 = Bitmap::of(&[2, 3]);
            ///
            #[doc = concat!("let bitmap3 = &bitmap1 ", stringify!($op), " &bitmap2;")]
            ///
            #[doc = concat!("assert_eq!(bitmap3.to_vec(), ", $in_set, ");")]
            /// ```
            #[inline]
            fn $fn(self, other: &'a Bitmap) -> Bitmap {
                self.$method(other)
            }
        }
    };
}

macro_rules! assign_op {
    ($trait:ident, $fn:ident, $method:ident) => {
        impl $trait for Bitmap {
            #[doc = concat!("Syntactic sugar for `.", stringify!($method), "`")]
            #[inline]
            fn $fn(&mut self, other: Bitmap) {
                self.$method(&other)
            }
        }

        impl<'a> $trait<&'a Bitmap> for Bitmap {
            #[doc = concat!("Syntactic sugar for `.", stringify!($method), "`")]
            #[inline]
            fn $fn(&mut self, other: &'a Bitmap) {
                self.$method(other)
            }
        }
    };
}

binary_op!(BitAnd, bitand, and, &, "[2]");
binary_op!(BitOr, bitor, or, |, "[1, 2, 3]");
binary_op!(BitXor, bitxor, xor, ^, "[1, 3]");
binary_op!(Sub, sub, andnot, -, "[1]");

assign_op!(BitAndAssign, bitand_assign, and_inplace);
assign_op!(BitOrAssign, bitor_assign, or_inplace);
assign_op!(BitXorAssign, bitxor_assign, xor_inplace);
assign_op!(SubAssign, sub_assign, andnot_inplace);
