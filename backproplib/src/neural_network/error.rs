/// Length of a vector given to a neuron, layer or network
/// doesn't match the length its structure requires.
///
/// This always indicates a topology or caller bug, so it is
/// reported back instead of being silently corrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionMismatch {
    /// What was being checked, e.g. `"neuron inputs"`.
    pub context: &'static str,

    /// Length required by the structure.
    pub expected: usize,

    /// Length actually given.
    pub actual: usize
}

impl DimensionMismatch {
    #[inline]
    pub const fn new(context: &'static str, expected: usize, actual: usize) -> Self {
        Self {
            context,
            expected,
            actual
        }
    }

    #[inline]
    /// Return `Ok(())` if lengths are equal, otherwise the mismatch error.
    pub const fn check(context: &'static str, expected: usize, actual: usize) -> Result<(), Self> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::new(context, expected, actual))
        }
    }
}

impl std::fmt::Display for DimensionMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "dimension mismatch in {}: expected {}, got {}", self.context, self.expected, self.actual)
    }
}

impl std::error::Error for DimensionMismatch {}

#[test]
fn test_dimension_mismatch() {
    assert!(DimensionMismatch::check("layer inputs", 3, 3).is_ok());

    let err = DimensionMismatch::check("layer inputs", 3, 2).unwrap_err();

    assert_eq!(err, DimensionMismatch::new("layer inputs", 3, 2));
    assert_eq!(err.to_string(), "dimension mismatch in layer inputs: expected 3, got 2");

    // Converts into anyhow errors used by the dataset loader and the CLI.
    let err = anyhow::Error::from(err);

    assert!(err.downcast_ref::<DimensionMismatch>().is_some());
}
