use std::num::NonZeroU32;

use thumbtier_db::tiers::Tier;

use crate::Error;

pub const BASIC: &str = "Basic";
pub const PREMIUM: &str = "Premium";
pub const ENTERPRISE: &str = "Enterprise";

const fn height(h: u32) -> NonZeroU32 {
    match NonZeroU32::new(h) {
        Some(h) => h,
        None => panic!("thumbnail height must be nonzero"),
    }
}

const SMALL: NonZeroU32 = height(200);
const LARGE: NonZeroU32 = height(400);

/// What an upload produces for a user of a given tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierPolicy {
    Basic,
    Premium,
    Enterprise,
    /// Any tier without a built-in name, configured entirely from its record.
    Custom {
        height: NonZeroU32,
        expose_original: bool,
        allow_expiring_link: bool,
    },
}

impl TierPolicy {
    /// Resolve the policy for a user's tier. A user without a tier, or a custom tier without a
    /// usable thumbnail height, is a configuration error.
    pub fn for_tier(tier: Option<&Tier>) -> Result<Self, Error> {
        let tier =
            tier.ok_or_else(|| Error::TierMisconfigured("user has no tier".to_string()))?;

        let policy = match tier.name.as_str() {
            BASIC => Self::Basic,
            PREMIUM => Self::Premium,
            ENTERPRISE => Self::Enterprise,
            _ => Self::Custom {
                height: custom_height(tier)?,
                expose_original: tier.presence_of_original_file_link,
                allow_expiring_link: tier.ability_to_fetch_expiring_link,
            },
        };

        Ok(policy)
    }

    /// Thumbnail heights to generate, in the order their links appear in the response.
    pub fn sizes(&self) -> Vec<NonZeroU32> {
        match self {
            Self::Basic => vec![SMALL],
            Self::Premium | Self::Enterprise => vec![LARGE, SMALL],
            Self::Custom { height, .. } => vec![*height],
        }
    }

    pub fn expose_original(&self) -> bool {
        match self {
            Self::Basic => false,
            Self::Premium | Self::Enterprise => true,
            Self::Custom {
                expose_original, ..
            } => *expose_original,
        }
    }

    pub fn allow_expiring_link(&self) -> bool {
        match self {
            Self::Basic | Self::Premium => false,
            Self::Enterprise => true,
            Self::Custom {
                allow_expiring_link,
                ..
            } => *allow_expiring_link,
        }
    }
}

fn custom_height(tier: &Tier) -> Result<NonZeroU32, Error> {
    let h = tier.thumbnail_height.ok_or_else(|| {
        Error::TierMisconfigured(format!("tier {} has no thumbnail height", tier.name))
    })?;

    u32::try_from(h)
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or_else(|| {
            Error::TierMisconfigured(format!("tier {} has thumbnail height {h}", tier.name))
        })
}

pub fn is_builtin(name: &str) -> bool {
    matches!(name, BASIC | PREMIUM | ENTERPRISE)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use thumbtier_db::object_id::TierId;

    use super::*;

    fn tier(name: &str, thumbnail_height: Option<i32>, original: bool, expiring: bool) -> Tier {
        Tier {
            tier_id: TierId::new(),
            name: name.to_string(),
            thumbnail_height,
            presence_of_original_file_link: original,
            ability_to_fetch_expiring_link: expiring,
        }
    }

    fn heights(policy: &TierPolicy) -> Vec<u32> {
        policy.sizes().iter().map(|h| h.get()).collect()
    }

    #[test]
    fn builtin_tiers() {
        // The stored flags of built-in tiers don't matter.
        let basic = TierPolicy::for_tier(Some(&tier(BASIC, Some(999), true, true))).unwrap();
        assert_eq!(basic, TierPolicy::Basic);
        assert_eq!(heights(&basic), vec![200]);
        assert!(!basic.expose_original());
        assert!(!basic.allow_expiring_link());

        let premium = TierPolicy::for_tier(Some(&tier(PREMIUM, None, false, false))).unwrap();
        assert_eq!(heights(&premium), vec![400, 200]);
        assert!(premium.expose_original());
        assert!(!premium.allow_expiring_link());

        let enterprise =
            TierPolicy::for_tier(Some(&tier(ENTERPRISE, None, false, false))).unwrap();
        assert_eq!(heights(&enterprise), vec![400, 200]);
        assert!(enterprise.expose_original());
        assert!(enterprise.allow_expiring_link());
    }

    #[test]
    fn custom_tier_uses_its_record() {
        let policy = TierPolicy::for_tier(Some(&tier("Gold", Some(150), true, false))).unwrap();
        assert_eq!(heights(&policy), vec![150]);
        assert!(policy.expose_original());
        assert!(!policy.allow_expiring_link());
    }

    #[test]
    fn names_are_case_sensitive() {
        let policy = TierPolicy::for_tier(Some(&tier("basic", Some(50), false, true))).unwrap();
        assert_matches!(policy, TierPolicy::Custom { .. });
        assert_eq!(heights(&policy), vec![50]);
    }

    #[test]
    fn misconfigured_tiers() {
        assert_matches!(TierPolicy::for_tier(None), Err(Error::TierMisconfigured(_)));
        assert_matches!(
            TierPolicy::for_tier(Some(&tier("Gold", None, true, true))),
            Err(Error::TierMisconfigured(_))
        );
        assert_matches!(
            TierPolicy::for_tier(Some(&tier("Gold", Some(0), true, true))),
            Err(Error::TierMisconfigured(_))
        );
        assert_matches!(
            TierPolicy::for_tier(Some(&tier("Gold", Some(-5), true, true))),
            Err(Error::TierMisconfigured(_))
        );
    }
}
