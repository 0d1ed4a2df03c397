//! Wizard stages

/// Age and age-penalty allocation
pub const STAGE_AGE: u8 = 1;
pub const STAGE_CHARACTERISTICS: u8 = 2;
/// Review only, adds no checks
pub const STAGE_DERIVED: u8 = 3;
pub const STAGE_OCCUPATION: u8 = 4;
pub const STAGE_OCCUPATION_CHOICES: u8 = 5;
pub const STAGE_OCCUPATION_SKILLS: u8 = 6;
pub const STAGE_PERSONAL_SKILLS: u8 = 7;
pub const STAGE_IDENTITY: u8 = 8;
pub const STAGE_BACKGROUND: u8 = 9;
pub const STAGE_EQUIPMENT: u8 = 10;

pub const FIRST_STAGE: u8 = STAGE_AGE;
pub const FINAL_STAGE: u8 = STAGE_EQUIPMENT;

/// Clamp a caller-supplied stage id into `FIRST_STAGE..=FINAL_STAGE`
#[inline]
pub fn clamp_stage(stage: i64) -> u8 {
    stage.clamp(FIRST_STAGE as i64, FINAL_STAGE as i64) as u8
}
