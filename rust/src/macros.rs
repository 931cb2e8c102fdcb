//! Macros that stamp out per-key-type support.

/// Implements [`ScalarKey`](crate::comparator::ScalarKey) through `Ord` and
/// declares a `<Type>Tree<V>` alias for each listed type, e.g. `I64Tree<V>`.
macro_rules! scalar_keys {
    ($($ty:ident),* $(,)?) => {
        $(
            impl $crate::comparator::ScalarKey for $ty {
                #[inline]
                fn scalar_cmp(&self, other: &Self) -> ::std::cmp::Ordering {
                    ::std::cmp::Ord::cmp(self, other)
                }
            }
        )*
        scalar_tree_aliases!($($ty),*);
    };
}

/// Declares `<Type>Tree<V>` aliases over [`ScalarOrder`](crate::comparator::ScalarOrder).
macro_rules! scalar_tree_aliases {
    ($($ty:ident),* $(,)?) => {
        paste::paste! {
            $(
                #[doc = "A [`BPlusTree`](crate::BPlusTree) keyed by `" $ty "` in native order."]
                pub type [<$ty:camel Tree>]<V> =
                    $crate::types::BPlusTree<$ty, V, $crate::comparator::ScalarOrder>;
            )*
        }
    };
}
