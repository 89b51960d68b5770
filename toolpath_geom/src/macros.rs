/// Assert two values are fuzzy equal, optionally with an explicit epsilon.
#[doc(hidden)]
#[macro_export]
macro_rules! assert_fuzzy_eq {
    ($left:expr, $right:expr) => {{
        #[allow(unused_imports)]
        use $crate::core::traits::FuzzyEq as _;
        match (&$left, &$right) {
            (left_val, right_val) => {
                if !(left_val.fuzzy_eq(*right_val)) {
                    panic!(
                        r#"assertion failed: `left.fuzzy_eq(right)`
  left: `{:?}`,
 right: `{:?}`"#,
                        &*left_val, &*right_val
                    )
                }
            }
        }
    }};
    ($left:expr, $right:expr, $eps:expr) => {{
        #[allow(unused_imports)]
        use $crate::core::traits::FuzzyEq as _;
        match (&$left, &$right, &$eps) {
            (left_val, right_val, eps_val) => {
                if !(left_val.fuzzy_eq_eps(*right_val, *eps_val)) {
                    panic!(
                        r#"assertion failed: `left.fuzzy_eq_eps(right, eps)`
  left: `{:?}`,
 right: `{:?}`
 eps: `{:?}`"#,
                        &*left_val, &*right_val, &*eps_val
                    )
                }
            }
        }
    }};
}

/// Construct an open [Polyline](crate::shape::Polyline) from `(x, y, bulge)` tuples.
///
/// # Examples
///
/// ```
/// # use toolpath_geom::pline_open;
/// # use toolpath_geom::shape::*;
/// let polyline = pline_open![(0.0, 1.0, 1.0), (2.0, 0.0, 0.0)];
/// assert!(!polyline.is_closed);
/// assert_eq!(polyline.vertexes[1], PlineVertex::new(2.0, 0.0, 0.0));
/// ```
#[macro_export]
macro_rules! pline_open {
    ($( $x:expr ),* $(,)?) => {
        {
            let mut pl = $crate::shape::Polyline::new(false);
            $(
                pl.add($x.0, $x.1, $x.2);
            )*
            pl
        }
    };
}

/// Construct a closed [Polyline](crate::shape::Polyline) from `(x, y, bulge)` tuples.
///
/// # Examples
///
/// ```
/// # use toolpath_geom::pline_closed;
/// let polyline = pline_closed![(0.0, 0.0, 0.0), (2.0, 0.0, 0.0), (2.0, 2.0, 0.0)];
/// assert!(polyline.is_closed);
/// assert_eq!(polyline.vertex_count(), 3);
/// ```
#[macro_export]
macro_rules! pline_closed {
    ($( $x:expr ),* $(,)?) => {
        {
            let mut pl = $crate::shape::Polyline::new(true);
            $(
                pl.add($x.0, $x.1, $x.2);
            )*
            pl
        }
    };
}
