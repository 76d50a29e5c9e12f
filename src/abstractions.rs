/*!

Types/type aliases that abstract over the implementing backing type.

# Background and Motivation

The arbitrary precision numbers are provided by `rug`, which wraps GMP and MPFR. The rest of the crate refers to
`BigInteger`, `BigRational`, and `BigFloat` only, so switching to a different arbitrary precision library means
redefining the aliases here and fixing whatever API differences the compiler points out:

```ignore
pub use num_bigint::BigInt as BigInteger;
```

For types or infrastructure with very different backing implementations, we define an abstraction layer over the
implementation. The numeric kernel (`crate::kernel`) is such a layer.

*/

pub use rug::{
  Integer  as BigInteger,
  Rational as BigRational,
  Float    as BigFloat,
};

/// Hash map used for symbol tables. FNV is fast for the short keys (interned symbols) we use.
pub use fnv::FnvHashMap as HashMap;
pub use fnv::FnvHashSet as HashSet;
