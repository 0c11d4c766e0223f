use crate::artifacts::branch::INVALID_BRANCH_NAME_REGEX;
use crate::errors::Error;
use anyhow::Context;

/// Name of a branch below `refs/heads/`, validated with git's rules
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: String) -> anyhow::Result<Self> {
        if name.is_empty() {
            return Err(Error::InvalidBranchName(name).into());
        }

        let re = regex::Regex::new(INVALID_BRANCH_NAME_REGEX)
            .with_context(|| format!("invalid branch name regex: {INVALID_BRANCH_NAME_REGEX}"))?;

        if re.is_match(&name) {
            Err(Error::InvalidBranchName(name).into())
        } else {
            Ok(Self(name))
        }
    }

    /// Full reference name, e.g. `refs/heads/main`
    pub fn to_ref_name(&self) -> String {
        format!("refs/heads/{}", self.0)
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::proptest;
    use rstest::rstest;

    proptest! {
        #[test]
        fn plain_names_are_valid(branch_name in "[a-zA-Z0-9_-]+") {
            assert!(BranchName::try_parse(branch_name).is_ok());
        }

        #[test]
        fn hierarchical_names_are_valid(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+"
        ) {
            assert!(BranchName::try_parse(format!("{prefix}/{suffix}")).is_ok());
        }

        #[test]
        fn names_ending_with_lock_are_invalid(prefix in "[a-zA-Z0-9_-]+") {
            assert!(BranchName::try_parse(format!("{prefix}.lock")).is_err());
        }

        #[test]
        fn special_characters_are_invalid(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+",
            special_char in r"[\*:\?\[\\^~ ]"
        ) {
            assert!(BranchName::try_parse(format!("{prefix}{special_char}{suffix}")).is_err());
        }
    }

    #[rstest]
    #[case("")]
    #[case(".hidden")]
    #[case("a..b")]
    #[case("/lead")]
    #[case("trail/")]
    #[case("a/.b")]
    #[case("x@{1}")]
    fn malformed_names_are_rejected(#[case] name: &str) {
        let err = BranchName::try_parse(name.to_string()).unwrap_err();
        assert_eq!(
            crate::errors::kind_of(&err),
            Some(&Error::InvalidBranchName(name.to_string()))
        );
    }

    #[test]
    fn ref_name_lives_under_heads() {
        let name = BranchName::try_parse("feature/x".to_string()).unwrap();
        assert_eq!(name.to_ref_name(), "refs/heads/feature/x");
    }
}
