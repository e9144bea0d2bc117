mod conversion;
mod difference;

// conversion
pub(crate) use conversion::rgb_to_oklrab;

// difference
pub(crate) use difference::{delta_e_ok, find_closest};

/// Test macro for asserting that two sets of color coordinates are the same
/// within floating point error.
#[cfg(test)]
macro_rules! assert_close_coordinates {
    ($cs1:expr , $cs2:expr $(,)?) => {
        let (cs1, cs2): (&[$crate::Float; 3], &[$crate::Float; 3]) = ($cs1, $cs2);
        for index in 0..3 {
            assert!(
                (cs1[index] - cs2[index]).abs() < 1e-9,
                "color coordinates differ:\n{:?}\n{:?}",
                cs1,
                cs2
            );
        }
    };
}

#[cfg(test)]
pub(crate) use assert_close_coordinates;
