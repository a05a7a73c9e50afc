pub const NAME: &str = "Ann";
pub const RELATIONSHIP: &str = "daughter";
pub const AGE: i32 = 43;
pub const NOTES: &str = "Visits every Sunday with flowers.";

/// Gray levels far enough apart that the in-memory face collection tells them apart.
pub const ANN_SHADE: u8 = 30;
pub const BOB_SHADE: u8 = 140;
pub const STRANGER_SHADE: u8 = 250;
