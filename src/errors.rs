use std::fmt::Display;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum AdaptError
{
    LevelOverflow,
    OrderOverflow,
    InvalidLevelBounds,
    InvalidDimensions,
    ThreadPoolFailed,
    TargetFailure,
}
impl std::error::Error for AdaptError {}

impl Display for AdaptError
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", *self)
    }
}
