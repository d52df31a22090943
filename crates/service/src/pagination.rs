//! Window size for "latest transactions" queries.

/// How many of the newest transactions to return.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LastN {
    pub count: u32,
}

impl LastN {
    pub const DEFAULT_COUNT: u32 = 20;

    pub fn new(count: u32) -> Self { Self { count } }

    /// Use the caller's count, or the default when none was given.
    pub fn from_param(count: Option<u32>) -> Self {
        count.map(Self::new).unwrap_or_default()
    }

    pub fn limit(self) -> u64 { u64::from(self.count) }
}

impl Default for LastN {
    fn default() -> Self { Self { count: Self::DEFAULT_COUNT } }
}

#[cfg(test)]
mod tests {
    use super::LastN;

    #[test]
    fn missing_count_uses_default() {
        assert_eq!(LastN::from_param(None).count, 20);
    }

    #[test]
    fn explicit_count_is_kept_without_clamping() {
        assert_eq!(LastN::from_param(Some(500)).limit(), 500);
        assert_eq!(LastN::from_param(Some(0)).limit(), 0);
    }
}
