//! Key ordering used by the tree.
//!
//! The engine is written once against [`Comparator`]. Scalar keys use their
//! native total order through [`ScalarOrder`]; byte-sequence keys use
//! lexicographic comparison through [`ByteOrder`]. Any `Fn(&K, &K) -> Ordering`
//! closure works as a comparator too.

use std::cmp::Ordering;

/// A total order over `K`.
pub trait Comparator<K: ?Sized> {
    fn compare(&self, a: &K, b: &K) -> Ordering;

    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        self.compare(a, b) == Ordering::Less
    }

    #[inline]
    fn equal(&self, a: &K, b: &K) -> bool {
        self.compare(a, b) == Ordering::Equal
    }
}

impl<K: ?Sized, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}

/// Keys with a native total order.
///
/// Floating point keys are ordered with `total_cmp`, so `-0.0 < 0.0` and NaN
/// sorts above every other value instead of comparing unequal to everything.
pub trait ScalarKey {
    fn scalar_cmp(&self, other: &Self) -> Ordering;
}

/// Native ordering for [`ScalarKey`] types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScalarOrder;

impl<K: ScalarKey + ?Sized> Comparator<K> for ScalarOrder {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.scalar_cmp(b)
    }
}

/// Lexicographic byte ordering for anything viewable as `[u8]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ByteOrder;

impl<K: AsRef<[u8]> + ?Sized> Comparator<K> for ByteOrder {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.as_ref().cmp(b.as_ref())
    }
}

impl ScalarKey for f32 {
    #[inline]
    fn scalar_cmp(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}

impl ScalarKey for f64 {
    #[inline]
    fn scalar_cmp(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}

impl ScalarKey for str {
    #[inline]
    fn scalar_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

scalar_keys!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, char, bool, String,
);
scalar_tree_aliases!(f32, f64);

/// A [`BPlusTree`](crate::BPlusTree) keyed by byte strings in lexicographic order.
pub type ByteTree<V> = crate::types::BPlusTree<Vec<u8>, V, ByteOrder>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_order_follows_native_order() {
        assert_eq!(ScalarOrder.compare(&1_i32, &2), Ordering::Less);
        assert_eq!(ScalarOrder.compare(&"b".to_string(), &"a".to_string()), Ordering::Greater);
        assert!(ScalarOrder.equal(&7_u64, &7));
    }

    #[test]
    fn float_order_is_total() {
        assert!(ScalarOrder.less(&-0.0_f64, &0.0));
        assert!(ScalarOrder.less(&f64::INFINITY, &f64::NAN));
        assert!(ScalarOrder.equal(&f64::NAN, &f64::NAN));
    }

    #[test]
    fn byte_order_is_lexicographic() {
        let cmp = ByteOrder;
        assert!(cmp.less(&b"abc".to_vec(), &b"abd".to_vec()));
        assert!(cmp.less(&b"ab".to_vec(), &b"abc".to_vec()));
        assert!(cmp.less(&vec![0x7f_u8], &vec![0x80_u8]));
        assert!(cmp.equal(&"same", &"same"));
    }

    #[test]
    fn closures_are_comparators() {
        let reverse = |a: &i32, b: &i32| b.cmp(a);
        assert!(reverse.less(&5, &1));
    }
}
