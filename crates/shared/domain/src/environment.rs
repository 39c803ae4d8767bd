use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// Deployment environment. The single input every downstream decision follows from.
///
/// Parsing is case-insensitive; anything outside `dev`, `stage`, `prod` is rejected,
/// there is no fallback value.
///
/// ```rust
/// use sdeck_domain::Environment;
///
/// assert_eq!("Prod".parse::<Environment>().unwrap(), Environment::Prod);
/// assert!("production".parse::<Environment>().is_err());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Environment {
    Dev,
    Stage,
    Prod,
}

impl Environment {
    pub const ALL: [Self; 3] = [Self::Dev, Self::Stage, Self::Prod];

    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Prod)
    }
}
